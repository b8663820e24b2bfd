pub mod image_client;

use async_trait::async_trait;

use crate::{error::Result, models::GenerationRequest};

pub use image_client::ImageClient;

/// The remote "prompt in, encoded images out" capability.
///
/// Returns the base64 payloads that carried image data, in response order.
/// Any failure of the remote call is a single error; callers do not inspect it
/// beyond reporting.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<String>>;
}
