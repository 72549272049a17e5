use super::sizing::resize_and_crop;
use super::{ImageService, ProcessedImage};
use crate::models::{Config, TargetDimensions, DEFAULT_JPEG_QUALITY};
use crate::{Error, Result};
use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tracing::debug;

pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// Decodes JPEG or PNG bytes, sizes them to the target and re-encodes as JPEG.
pub struct ImageProcessor {
    jpeg_quality: u8,
    filter: FilterType,
}

impl Default for ImageProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY, FilterType::Lanczos3)
    }
}

impl ImageProcessor {
    pub fn new(jpeg_quality: u8, filter: FilterType) -> Self {
        Self {
            jpeg_quality,
            filter,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.jpeg_quality, config.resize_filter)
    }

    fn decode(image_data: &[u8]) -> Result<DynamicImage> {
        debug!("Decoding image: {} bytes", image_data.len());
        image::load_from_memory(image_data).map_err(|e| Error::Decode(e.to_string()))
    }

    fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
        // JPEG has no alpha channel.
        let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
        let mut data = Vec::new();
        rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut data, quality))
            .map_err(|e| Error::Encode(e.to_string()))?;
        Ok(data)
    }

    fn process_sync(
        image_data: &[u8],
        target: TargetDimensions,
        quality: u8,
        filter: FilterType,
    ) -> Result<ProcessedImage> {
        let image = Self::decode(image_data)?;
        let (source_width, source_height) = image.dimensions();

        let sized = resize_and_crop(image, target, filter)?;
        let (width, height) = sized.dimensions();
        let data = Self::encode_jpeg(&sized, quality)?;

        Ok(ProcessedImage {
            data,
            width,
            height,
            source_width,
            source_height,
            content_type: JPEG_CONTENT_TYPE,
        })
    }
}

#[async_trait]
impl ImageService for ImageProcessor {
    async fn process_image(
        &self,
        image_data: &[u8],
        target: TargetDimensions,
    ) -> Result<ProcessedImage> {
        let image_data = image_data.to_vec();
        let quality = self.jpeg_quality;
        let filter = self.filter;

        tokio::task::spawn_blocking(move || Self::process_sync(&image_data, target, quality, filter))
            .await
            .map_err(|e| Error::Invariant(format!("Image processing task join error: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut bytes), format)
            .unwrap();
        bytes
    }

    fn create_test_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 128]));
        encode(DynamicImage::ImageRgba8(img), ImageFormat::Png)
    }

    fn create_test_jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([10, 120, 30]));
        encode(DynamicImage::ImageRgb8(img), ImageFormat::Jpeg)
    }

    fn target(width: u32, height: u32) -> TargetDimensions {
        TargetDimensions::new(width, height).unwrap()
    }

    #[tokio::test]
    async fn test_jpeg_is_resized_cropped_and_reencoded() {
        let processor = ImageProcessor::default();

        let result = processor
            .process_image(&create_test_jpeg(300, 56), target(220, 50))
            .await
            .unwrap();

        assert_eq!((result.width, result.height), (220, 50));
        assert_eq!((result.source_width, result.source_height), (300, 56));
        assert_eq!(result.content_type, "image/jpeg");

        let decoded = image::load_from_memory_with_format(&result.data, ImageFormat::Jpeg).unwrap();
        assert_eq!(decoded.dimensions(), (220, 50));
    }

    #[tokio::test]
    async fn test_png_with_alpha_is_encoded_as_jpeg() {
        let processor = ImageProcessor::new(90, FilterType::Triangle);

        let result = processor
            .process_image(&create_test_png(40, 40), target(20, 10))
            .await
            .unwrap();

        assert_eq!(image::guess_format(&result.data).unwrap(), ImageFormat::Jpeg);
        assert_eq!((result.width, result.height), (20, 10));
    }

    #[tokio::test]
    async fn test_garbage_bytes_fail_to_decode() {
        let processor = ImageProcessor::default();

        let err = processor
            .process_image(b"definitely not an image", target(10, 10))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Decode(_)));
    }

    #[tokio::test]
    async fn test_empty_bytes_fail_to_decode() {
        let processor = ImageProcessor::default();

        let err = processor.process_image(&[], target(10, 10)).await.unwrap_err();
        assert_eq!(err.kind(), "decode");
    }

    #[test]
    fn test_from_config_uses_quality_and_filter() {
        let config = Config {
            jpeg_quality: 55,
            resize_filter: FilterType::Nearest,
            ..Config::default()
        };

        let processor = ImageProcessor::from_config(&config);
        assert_eq!(processor.jpeg_quality, 55);
        assert_eq!(processor.filter, FilterType::Nearest);
    }
}
