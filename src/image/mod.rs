//! Image decoding, sizing and re-encoding
//!
//! The sizing engine in [`sizing`] is pure and synchronous. [`ImageService`]
//! wraps decode, resize-and-crop and JPEG encode behind an async seam so the
//! job orchestrator can swap in [`MockImageProcessor`] under test.

pub mod format;
pub mod mock;
pub mod processor;
pub mod sizing;

pub use mock::MockImageProcessor;
pub use processor::ImageProcessor;

use crate::models::TargetDimensions;
use crate::Result;
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub source_width: u32,
    pub source_height: u32,
    pub content_type: &'static str,
}

#[async_trait]
pub trait ImageService: Send + Sync {
    async fn process_image(
        &self,
        image_data: &[u8],
        target: TargetDimensions,
    ) -> Result<ProcessedImage>;
}
