//! Configuration module
//!
//! Handles CLI configuration including the backend URL.

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the segmentation backend
    pub server_url: String,
}
