//! Segmentation channel types

use serde::{Deserialize, Serialize};

/// One tissue class produced by the segmentation backend, plus the
/// unsegmented original volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentationChannel {
    #[serde(rename = "gm")]
    GreyMatter,
    #[serde(rename = "wm")]
    WhiteMatter,
    Csf,
    Original,
}

impl SegmentationChannel {
    /// The three tissue channels the poller fetches after a successful run.
    pub const TISSUES: [SegmentationChannel; 3] =
        [Self::GreyMatter, Self::WhiteMatter, Self::Csf];

    /// Value of the `type` query parameter on the preview endpoint.
    pub fn query_value(&self) -> &'static str {
        match self {
            Self::GreyMatter => "gm",
            Self::WhiteMatter => "wm",
            Self::Csf => "csf",
            Self::Original => "original",
        }
    }
}

impl std::str::FromStr for SegmentationChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gm" => Ok(Self::GreyMatter),
            "wm" => Ok(Self::WhiteMatter),
            "csf" => Ok(Self::Csf),
            "original" => Ok(Self::Original),
            other => Err(format!(
                "unknown channel '{other}' (expected gm, wm, csf or original)"
            )),
        }
    }
}

impl std::fmt::Display for SegmentationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.query_value())
    }
}

/// A decoded preview image for one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewImage {
    pub channel: SegmentationChannel,
    /// Raw PNG bytes, already base64-decoded.
    pub png: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_values_round_trip() {
        for channel in [
            SegmentationChannel::GreyMatter,
            SegmentationChannel::WhiteMatter,
            SegmentationChannel::Csf,
            SegmentationChannel::Original,
        ] {
            let parsed: SegmentationChannel = channel.query_value().parse().unwrap();
            assert_eq!(parsed, channel);
        }
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("brainstem".parse::<SegmentationChannel>().is_err());
    }
}
