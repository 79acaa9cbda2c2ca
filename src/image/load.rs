//! Image loading and preprocessing.

use std::path::Path;

use image::{imageops::FilterType, DynamicImage};
use ndarray::Array4;

use crate::error::{Error, Result};

use super::{ImageTensor, MODEL_INPUT_SIZE, RGB_CHANNELS};

/// Load an image from disk.
///
/// The format is inferred from the file contents. Decoding is the only
/// validation performed here; an image that decodes is accepted at any size.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    let path = path.as_ref();

    image::open(path).map_err(|source| Error::ImageLoad {
        path: path.to_path_buf(),
        source,
    })
}

/// Convert an image to a normalized NHWC model input tensor.
///
/// The image is:
/// 1. Resampled to 224x224 with bilinear filtering, both axes scaled
///    independently (no aspect-ratio preservation)
/// 2. Converted to RGB if necessary
/// 3. Normalized from [0, 255] to [0, 1]
/// 4. Returned as an NHWC tensor (1, 224, 224, 3)
///
/// Iterating the result in memory order yields the pixels row by row with
/// interleaved R,G,B channels, which is the layout both models were
/// exported with. Pure function of the input; identical images produce
/// identical tensors.
#[allow(clippy::cast_possible_truncation)]
pub fn to_tensor(img: &DynamicImage) -> ImageTensor {
    let resized = img.resize_exact(MODEL_INPUT_SIZE, MODEL_INPUT_SIZE, FilterType::Triangle);
    let rgb = resized.to_rgb8();

    let size = MODEL_INPUT_SIZE as usize;

    let mut tensor = Array4::<f32>::zeros((1, size, size, RGB_CHANNELS));

    for y in 0..size {
        for x in 0..size {
            // Safe: x and y are bounded by MODEL_INPUT_SIZE (224) which fits in u32
            let pixel = rgb.get_pixel(x as u32, y as u32);
            tensor[[0, y, x, 0]] = f32::from(pixel[0]) / 255.0;
            tensor[[0, y, x, 1]] = f32::from(pixel[1]) / 255.0;
            tensor[[0, y, x, 2]] = f32::from(pixel[2]) / 255.0;
        }
    }

    tensor
}

#[cfg(test)]
mod tests {
    use super::super::TENSOR_LEN;
    use super::*;
    use image::{ImageBuffer, Rgb};

    #[test]
    fn test_tensor_shape() {
        let img = DynamicImage::new_rgb8(100, 100);
        let tensor = to_tensor(&img);

        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
        assert_eq!(tensor.len(), TENSOR_LEN);
    }

    #[test]
    fn test_tensor_shape_is_fixed_for_any_input() {
        for (w, h) in [(1, 1), (640, 480), (33, 517)] {
            let img = DynamicImage::new_rgb8(w, h);
            assert_eq!(to_tensor(&img).len(), TENSOR_LEN);
        }
    }

    #[test]
    fn test_normalization_range() {
        let gradient = ImageBuffer::from_fn(300, 200, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        let tensor = to_tensor(&DynamicImage::ImageRgb8(gradient));

        assert!(tensor.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_extremes() {
        let black = DynamicImage::new_rgb8(50, 50);
        assert!(to_tensor(&black).iter().all(|&v| v == 0.0));

        let white = ImageBuffer::from_pixel(50, 50, Rgb([255u8, 255, 255]));
        let tensor = to_tensor(&DynamicImage::ImageRgb8(white));
        assert!(tensor.iter().all(|&v| (v - 1.0).abs() < f32::EPSILON));
    }

    #[test]
    fn test_channel_interleaving() {
        // Solid red: every pixel must contribute (1, 0, 0) in R,G,B order.
        let red = ImageBuffer::from_pixel(224, 224, Rgb([255u8, 0, 0]));
        let tensor = to_tensor(&DynamicImage::ImageRgb8(red));

        let flat: Vec<f32> = tensor.iter().copied().collect();
        for chunk in flat.chunks_exact(3) {
            assert_eq!(chunk, &[1.0, 0.0, 0.0][..]);
        }
    }

    #[test]
    fn test_deterministic() {
        let gradient = ImageBuffer::from_fn(123, 77, |x, y| {
            Rgb([(x * 2 % 256) as u8, (y * 3 % 256) as u8, 128])
        });
        let img = DynamicImage::ImageRgb8(gradient);

        assert_eq!(to_tensor(&img), to_tensor(&img));
    }
}
