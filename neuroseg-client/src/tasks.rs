//! Task-related API endpoints

use async_trait::async_trait;

use crate::SegmentationClient;
use crate::error::Result;
use neuroseg_core::domain::segmentation::{PreviewImage, SegmentationChannel};
use neuroseg_core::domain::task::{TaskSnapshot, TaskStatus};
use neuroseg_core::domain::volumetrics::VolumetricResults;
use neuroseg_core::dto::{ProcessStarted, ResultsResponse, StatusResponse};

/// The slice of the backend API the poller depends on.
///
/// [`SegmentationClient`] is the production implementation; tests drive
/// the poller against an in-memory fake.
#[async_trait]
pub trait SegmentationApi: Send + Sync {
    /// Fetch one status snapshot for a task.
    async fn task_status(&self, task_id: &str) -> Result<TaskSnapshot>;

    /// Fetch the volumetric results of a completed task.
    async fn task_results(&self, task_id: &str) -> Result<VolumetricResults>;

    /// Fetch the preview image for one segmentation channel.
    async fn channel_preview(
        &self,
        task_id: &str,
        channel: SegmentationChannel,
    ) -> Result<PreviewImage>;
}

impl SegmentationClient {
    /// Start server-side processing of an uploaded scan
    ///
    /// # Arguments
    /// * `image_id` - Identifier of the uploaded image to process
    ///
    /// # Returns
    /// The opaque task id issued by the server. The client never
    /// generates or predicts task ids.
    pub async fn start_processing(&self, image_id: &str) -> Result<String> {
        let url = format!("{}/process/{}", self.base_url(), image_id);
        let started: ProcessStarted = self.post_json(&url).await?;
        Ok(started.task_id)
    }
}

#[async_trait]
impl SegmentationApi for SegmentationClient {
    async fn task_status(&self, task_id: &str) -> Result<TaskSnapshot> {
        let url = format!("{}/status/{}", self.base_url(), task_id);
        let response: StatusResponse = self.get_json(&url).await?;
        Ok(snapshot_from_wire(response))
    }

    async fn task_results(&self, task_id: &str) -> Result<VolumetricResults> {
        let url = format!("{}/results/{}", self.base_url(), task_id);
        let response: ResultsResponse = self.get_json(&url).await?;

        if !response.results.is_plausible() {
            tracing::warn!(
                task_id,
                results = ?response.results,
                "backend returned implausible volumetrics"
            );
        }

        Ok(response.results)
    }

    async fn channel_preview(
        &self,
        task_id: &str,
        channel: SegmentationChannel,
    ) -> Result<PreviewImage> {
        self.fetch_preview(task_id, channel).await
    }
}

/// Translate a raw status payload onto the canonical snapshot.
///
/// Status strings the client has never seen are treated as non-terminal
/// so the poller keeps watching rather than guessing an outcome.
fn snapshot_from_wire(response: StatusResponse) -> TaskSnapshot {
    let status = TaskStatus::from_wire(&response.status).unwrap_or_else(|| {
        tracing::warn!(
            raw = %response.status,
            "unknown task status from backend, treating as processing"
        );
        TaskStatus::Processing
    });

    TaskSnapshot {
        status,
        progress: response.clamped_progress(),
        error: response.error,
        log: response.log,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(status: &str) -> StatusResponse {
        StatusResponse {
            status: status.to_string(),
            progress: Some(50),
            error: None,
            log: None,
        }
    }

    #[test]
    fn test_snapshot_maps_all_backend_spellings() {
        assert_eq!(snapshot_from_wire(raw("completed")).status, TaskStatus::Completed);
        assert_eq!(snapshot_from_wire(raw("success")).status, TaskStatus::Completed);
        assert_eq!(snapshot_from_wire(raw("failed")).status, TaskStatus::Failed);
        assert_eq!(snapshot_from_wire(raw("error")).status, TaskStatus::Failed);
        assert_eq!(snapshot_from_wire(raw("pending")).status, TaskStatus::Pending);
    }

    #[test]
    fn test_snapshot_unknown_status_is_nonterminal() {
        let snapshot = snapshot_from_wire(raw("reticulating"));
        assert_eq!(snapshot.status, TaskStatus::Processing);
        assert!(!snapshot.status.is_terminal());
    }

    #[test]
    fn test_snapshot_clamps_progress() {
        let mut response = raw("processing");
        response.progress = Some(250);
        assert_eq!(snapshot_from_wire(response).progress, 100);
    }
}
