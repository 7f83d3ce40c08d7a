//! Wire-format objects for the segmentation backend's REST API
//!
//! These structs mirror the JSON payloads exactly as the backend emits
//! them, raw status strings included. Translation onto the canonical
//! domain types happens in the client crate, at the boundary.

use serde::{Deserialize, Serialize};

use crate::domain::volumetrics::VolumetricResults;

/// Response to `POST /process/{image_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessStarted {
    pub task_id: String,
}

/// Response to `GET /status/{task_id}`.
///
/// `status` is the raw backend string; the backend is inconsistent about
/// its vocabulary, so no enum here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub progress: Option<i64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub log: Option<String>,
}

impl StatusResponse {
    /// Progress clamped into 0-100; absent progress reads as 0.
    pub fn clamped_progress(&self) -> u8 {
        self.progress.unwrap_or(0).clamp(0, 100) as u8
    }
}

/// Response to `GET /results/{task_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsResponse {
    pub status: String,
    pub results: VolumetricResults,
}

/// Response to `GET /preview/{task_id}?type=...`.
///
/// The image is base64-embedded PNG inside the JSON body rather than a
/// separate binary response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub status: String,
    pub image: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_response_deserializes_minimal_payload() {
        let resp: StatusResponse =
            serde_json::from_str(r#"{"status": "processing"}"#).unwrap();
        assert_eq!(resp.status, "processing");
        assert_eq!(resp.clamped_progress(), 0);
        assert!(resp.error.is_none());
        assert!(resp.log.is_none());
    }

    #[test]
    fn test_progress_clamping() {
        let mut resp: StatusResponse =
            serde_json::from_str(r#"{"status": "processing", "progress": 42}"#).unwrap();
        assert_eq!(resp.clamped_progress(), 42);

        resp.progress = Some(140);
        assert_eq!(resp.clamped_progress(), 100);

        resp.progress = Some(-5);
        assert_eq!(resp.clamped_progress(), 0);
    }

    #[test]
    fn test_results_response_deserializes() {
        let resp: ResultsResponse = serde_json::from_str(
            r#"{
                "status": "completed",
                "results": {
                    "gm_volume": 450000.0,
                    "wm_volume": 520000.0,
                    "csf_volume": 150000.0,
                    "tiv_volume": 1120000.0
                }
            }"#,
        )
        .unwrap();
        assert_eq!(resp.results.gm_volume, 450_000.0);
        assert_eq!(resp.results.tiv_volume, 1_120_000.0);
    }
}
