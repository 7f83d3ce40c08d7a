//! Volumetric measurement types

use serde::{Deserialize, Serialize};

use crate::domain::segmentation::SegmentationChannel;

/// Volumetric results of a completed segmentation.
///
/// All volumes are in cubic millimeters. TIV (total intracranial volume)
/// is the denominator used to express the three tissue classes as
/// fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumetricResults {
    pub gm_volume: f64,
    pub wm_volume: f64,
    pub csf_volume: f64,
    pub tiv_volume: f64,
}

impl VolumetricResults {
    /// Volume of a single tissue channel in mm³.
    ///
    /// Returns `None` for [`SegmentationChannel::Original`], which has no
    /// associated measurement.
    pub fn volume(&self, channel: SegmentationChannel) -> Option<f64> {
        match channel {
            SegmentationChannel::GreyMatter => Some(self.gm_volume),
            SegmentationChannel::WhiteMatter => Some(self.wm_volume),
            SegmentationChannel::Csf => Some(self.csf_volume),
            SegmentationChannel::Original => None,
        }
    }

    /// Fraction of TIV occupied by a tissue channel, in `[0, 1]`.
    ///
    /// Returns `None` when TIV is zero (nothing to divide by) or for the
    /// original channel.
    pub fn tissue_fraction(&self, channel: SegmentationChannel) -> Option<f64> {
        if self.tiv_volume <= 0.0 {
            return None;
        }
        self.volume(channel).map(|v| v / self.tiv_volume)
    }

    /// All four quantities are finite and non-negative.
    pub fn is_plausible(&self) -> bool {
        [
            self.gm_volume,
            self.wm_volume,
            self.csf_volume,
            self.tiv_volume,
        ]
        .iter()
        .all(|v| v.is_finite() && *v >= 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> VolumetricResults {
        VolumetricResults {
            gm_volume: 450_000.0,
            wm_volume: 520_000.0,
            csf_volume: 150_000.0,
            tiv_volume: 1_120_000.0,
        }
    }

    #[test]
    fn test_tissue_fraction() {
        let r = sample();
        let gm = r.tissue_fraction(SegmentationChannel::GreyMatter).unwrap();
        assert!((gm - 450_000.0 / 1_120_000.0).abs() < 1e-12);
        assert!(r.tissue_fraction(SegmentationChannel::Original).is_none());
    }

    #[test]
    fn test_tissue_fraction_zero_tiv() {
        let r = VolumetricResults {
            gm_volume: 1.0,
            wm_volume: 1.0,
            csf_volume: 1.0,
            tiv_volume: 0.0,
        };
        assert!(r.tissue_fraction(SegmentationChannel::GreyMatter).is_none());
    }

    #[test]
    fn test_is_plausible() {
        assert!(sample().is_plausible());

        let mut bad = sample();
        bad.wm_volume = -1.0;
        assert!(!bad.is_plausible());

        bad.wm_volume = f64::NAN;
        assert!(!bad.is_plausible());
    }
}
