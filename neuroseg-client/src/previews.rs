//! Segmentation preview endpoints

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::SegmentationClient;
use crate::error::{ClientError, Result};
use neuroseg_core::domain::segmentation::{PreviewImage, SegmentationChannel};
use neuroseg_core::dto::PreviewResponse;

impl SegmentationClient {
    /// Fetch and decode the preview image for one channel
    ///
    /// The backend embeds the PNG as base64 inside the JSON body instead
    /// of serving raw bytes; decoding happens here so callers only ever
    /// see [`PreviewImage`].
    pub(crate) async fn fetch_preview(
        &self,
        task_id: &str,
        channel: SegmentationChannel,
    ) -> Result<PreviewImage> {
        let url = format!(
            "{}/preview/{}?type={}",
            self.base_url(),
            task_id,
            channel.query_value()
        );
        let response: PreviewResponse = self.get_json(&url).await?;

        let png = BASE64.decode(response.image.as_bytes()).map_err(|e| {
            ClientError::ParseError(format!("invalid base64 preview image: {}", e))
        })?;

        Ok(PreviewImage { channel, png })
    }
}
