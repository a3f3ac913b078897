//! Implements ImageDecoderPort with the `image` crate.
//!
//! decode -> resize to 64x64 (bilinear) -> BGR channel order -> scale to [0, 1].
//! The weights were trained on OpenCV-decoded (BGR) input, so the channel order is load-bearing.
//!
//! Resizing samples the two nearest source pixels per axis with pixel centres
//! aligned, like OpenCV's `INTER_LINEAR`. It does not average over the whole
//! footprint when shrinking, so large photos see the same sampling as training.

use image::{DynamicImage, Rgb, RgbImage};

use crate::domain::{CHANNELS, DomainError, IMAGE_SIZE, ImageTensor};
use crate::ports::ImageDecoderPort;

/// File extensions accepted by the upload prompt.
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Debug, Default, Clone, Copy)]
pub struct ImagePreprocessor;

impl ImagePreprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Resize and normalize an already decoded image.
    pub fn tensor_from_image(image: &DynamicImage) -> Result<ImageTensor, DomainError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(DomainError::Image("image has no pixels".into()));
        }
        let rgb = resize_linear(&image.to_rgb8(), IMAGE_SIZE as u32);

        let mut data = Vec::with_capacity(ImageTensor::LEN);
        for pixel in rgb.pixels() {
            let [r, g, b] = pixel.0;
            for v in [b, g, r] {
                data.push(f32::from(v) / 255.0);
            }
        }
        let len = data.len();
        ImageTensor::from_hwc(data).ok_or_else(|| {
            DomainError::Image(format!(
                "expected {} values after resize, got {len}",
                IMAGE_SIZE * IMAGE_SIZE * CHANNELS
            ))
        })
    }
}

/// Source pixel pair and blend weight for destination index `dst` on one axis.
fn source_axis(dst: u32, scale: f64, len: u32) -> (u32, u32, f64) {
    let pos = (f64::from(dst) + 0.5) * scale - 0.5;
    let last = len - 1;
    if pos <= 0.0 {
        return (0, 0, 0.0);
    }
    let lo = pos.floor();
    if lo >= f64::from(last) {
        return (last, last, 0.0);
    }
    (lo as u32, lo as u32 + 1, pos - lo)
}

/// Bilinear resize to `side` x `side`. `src` must be non-empty.
fn resize_linear(src: &RgbImage, side: u32) -> RgbImage {
    let (w, h) = src.dimensions();
    let (scale_x, scale_y) = (f64::from(w) / f64::from(side), f64::from(h) / f64::from(side));
    RgbImage::from_fn(side, side, |x, y| {
        let (x0, x1, fx) = source_axis(x, scale_x, w);
        let (y0, y1, fy) = source_axis(y, scale_y, h);
        let [tl, tr, bl, br] =
            [(x0, y0), (x1, y0), (x0, y1), (x1, y1)].map(|(px, py)| src.get_pixel(px, py).0);
        Rgb(std::array::from_fn(|c| {
            let top = f64::from(tl[c]) * (1.0 - fx) + f64::from(tr[c]) * fx;
            let bottom = f64::from(bl[c]) * (1.0 - fx) + f64::from(br[c]) * fx;
            (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8
        }))
    })
}

/// True if `path` ends in one of [`ACCEPTED_EXTENSIONS`] (case-insensitive).
pub fn has_accepted_extension(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|a| a.eq_ignore_ascii_case(e))
        })
        .unwrap_or(false)
}

impl ImageDecoderPort for ImagePreprocessor {
    fn preprocess(&self, bytes: &[u8]) -> Result<(ImageTensor, (u32, u32)), DomainError> {
        let image =
            image::load_from_memory(bytes).map_err(|e| DomainError::Image(e.to_string()))?;
        let dims = (image.width(), image.height());
        Ok((Self::tensor_from_image(&image)?, dims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::path::Path;

    fn png_bytes(img: &RgbImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_solid_color_is_bgr_and_unit_range() {
        let img = RgbImage::from_pixel(200, 120, Rgb([255, 0, 51]));
        let (tensor, dims) = ImagePreprocessor::new().preprocess(&png_bytes(&img)).unwrap();

        assert_eq!(dims, (200, 120));
        assert_eq!(tensor.as_hwc().len(), ImageTensor::LEN);
        let blue = tensor.get(10, 10, 0).unwrap();
        assert!((blue - 0.2).abs() < 1e-6);
        assert_eq!(tensor.get(10, 10, 1), Some(0.0)); // green
        assert_eq!(tensor.get(63, 63, 2), Some(1.0)); // red
        assert!(tensor.as_hwc().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_downscale_samples_nearest_pixels_only() {
        // Every 4-column group is [0, 255, 255, 0]. Shrinking 4x lands each
        // sample between the two lit columns; an area filter would blur to grey.
        let img = RgbImage::from_fn(256, 64, |x, _| {
            let v = if matches!(x % 4, 1 | 2) { 255 } else { 0 };
            Rgb([v, v, v])
        });
        let tensor = ImagePreprocessor::tensor_from_image(&DynamicImage::ImageRgb8(img)).unwrap();
        assert!(tensor.as_hwc().iter().all(|v| *v == 1.0));
    }

    #[test]
    fn test_upscale_keeps_corners() {
        let img = RgbImage::from_fn(2, 2, |x, y| Rgb([(x * 255) as u8, (y * 255) as u8, 0]));
        let tensor = ImagePreprocessor::tensor_from_image(&DynamicImage::ImageRgb8(img)).unwrap();
        // BGR: channel 2 is red (x), channel 1 is green (y).
        assert_eq!(tensor.get(0, 0, 2), Some(0.0));
        assert_eq!(tensor.get(0, 63, 2), Some(1.0));
        assert_eq!(tensor.get(63, 0, 1), Some(1.0));
        let mid = tensor.get(0, 32, 2).unwrap();
        assert!(mid > 0.0 && mid < 1.0);
    }

    #[test]
    fn test_undecodable_bytes_fail() {
        let err = ImagePreprocessor::new()
            .preprocess(b"not an image")
            .unwrap_err();
        assert!(matches!(err, DomainError::Image(_)));
    }

    #[test]
    fn test_accepted_extensions() {
        assert!(has_accepted_extension(Path::new("leaf.JPG")));
        assert!(has_accepted_extension(Path::new("dir/leaf.png")));
        assert!(has_accepted_extension(Path::new("leaf.jpeg")));
        assert!(!has_accepted_extension(Path::new("leaf.gif")));
        assert!(!has_accepted_extension(Path::new("leaf")));
    }
}
