//! # Image Preprocessing Module
//!
//! Prepares a price tag photo for text detection: the contrast is doubled around
//! the mean gray level, both dimensions are doubled, and the result is re-encoded
//! as PNG.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageOutputFormat, Rgba, RgbaImage};
use log::debug;

use crate::errors::ScanError;

/// Fixed-parameter preprocessing applied to every upload
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    contrast_factor: f32,
    scale_factor: u32,
}

impl ImagePreprocessor {
    const CONTRAST_FACTOR: f32 = 2.0;
    const SCALE_FACTOR: u32 = 2;

    pub fn new() -> Self {
        Self {
            contrast_factor: Self::CONTRAST_FACTOR,
            scale_factor: Self::SCALE_FACTOR,
        }
    }

    /// Decode, enhance, enlarge and re-encode an uploaded image as PNG bytes
    ///
    /// # Errors
    ///
    /// Returns `ScanError::ImageDecode` for unreadable input and
    /// `ScanError::ImageEncode` if the PNG cannot be written.
    pub fn preprocess(&self, image_bytes: &[u8]) -> Result<Vec<u8>, ScanError> {
        let image = image::load_from_memory(image_bytes)
            .map_err(|e| ScanError::ImageDecode(e.to_string()))?;

        let (width, height) = image.dimensions();
        debug!("Preprocessing {}x{} image", width, height);

        let enhanced = self.enhance_contrast(&image);
        let resized = self.enlarge(&enhanced)?;

        let mut png = Vec::new();
        resized
            .write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)
            .map_err(|e| ScanError::ImageEncode(e.to_string()))?;

        debug!(
            "Preprocessed image to {}x{} PNG ({} bytes)",
            resized.width(),
            resized.height(),
            png.len()
        );
        Ok(png)
    }

    /// Push every color channel away from the mean luminance by the contrast factor
    ///
    /// Alpha is left untouched.
    pub fn enhance_contrast(&self, image: &DynamicImage) -> DynamicImage {
        let mean = mean_luminance(image);
        let rgba = image.to_rgba8();

        let enhanced = RgbaImage::from_fn(rgba.width(), rgba.height(), |x, y| {
            let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
            Rgba([
                self.stretch(r, mean),
                self.stretch(g, mean),
                self.stretch(b, mean),
                a,
            ])
        });

        DynamicImage::ImageRgba8(enhanced)
    }

    fn enlarge(&self, image: &DynamicImage) -> Result<DynamicImage, ScanError> {
        let (width, height) = image.dimensions();
        let new_width = width.checked_mul(self.scale_factor);
        let new_height = height.checked_mul(self.scale_factor);

        match (new_width, new_height) {
            (Some(new_width), Some(new_height)) => {
                Ok(image.resize_exact(new_width, new_height, FilterType::CatmullRom))
            }
            _ => Err(ScanError::ImageDecode(format!(
                "image of {width}x{height} is too large to enlarge"
            ))),
        }
    }

    fn stretch(&self, channel: u8, mean: f32) -> u8 {
        let value = mean + self.contrast_factor * (channel as f32 - mean);
        value.round().clamp(0.0, 255.0) as u8
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

fn mean_luminance(image: &DynamicImage) -> f32 {
    let luma = image.to_luma8();
    let pixel_count = luma.width() as u64 * luma.height() as u64;
    if pixel_count == 0 {
        return 0.0;
    }

    let total: u64 = luma.pixels().map(|pixel| pixel.0[0] as u64).sum();
    (total as f64 / pixel_count as f64).round() as f32
}
