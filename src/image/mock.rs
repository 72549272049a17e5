use super::{ImageService, ProcessedImage};
use crate::models::TargetDimensions;
use crate::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Stand-in processor that returns fixed bytes at the requested size.
#[derive(Clone)]
pub struct MockImageProcessor {
    process_count: Arc<Mutex<usize>>,
    output: Vec<u8>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockImageProcessor {
    pub fn new() -> Self {
        Self {
            process_count: Arc::new(Mutex::new(0)),
            output: vec![0xFF, 0xD8, 0xFF, 0xD9],
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_output(mut self, output: Vec<u8>) -> Self {
        self.output = output;
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_process_count(&self) -> usize {
        *self.process_count.lock().unwrap()
    }
}

impl Default for MockImageProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageService for MockImageProcessor {
    async fn process_image(
        &self,
        _image_data: &[u8],
        target: TargetDimensions,
    ) -> Result<ProcessedImage> {
        *self.process_count.lock().unwrap() += 1;

        if *self.should_fail.lock().unwrap() {
            return Err(crate::Error::Decode("Mock failure".to_string()));
        }

        Ok(ProcessedImage {
            data: self.output.clone(),
            width: target.width,
            height: target.height,
            source_width: target.width,
            source_height: target.height,
            content_type: "image/jpeg",
        })
    }
}
