use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array4;

use crate::models::{ModelCharacteristics, Preprocessing};

// ImageNet channel means in BGR order, used by Caffe-style models.
const IMAGENET_BGR_MEANS: [f32; 3] = [103.939, 116.779, 123.68];

/// Converts a decoded image into the model input tensor.
///
/// The transform is fixed: resize to the model's input geometry, convert to
/// RGB, then apply the normalization the model was trained with. The output
/// is NHWC `[1, height, width, 3]`, matching Keras-exported graphs.
pub(crate) fn image_to_input(
    image: &DynamicImage,
    characteristics: &ModelCharacteristics,
) -> Array4<f32> {
    let width = characteristics.input_width;
    let height = characteristics.input_height;
    let rgb = image
        .resize_exact(width, height, FilterType::Triangle)
        .to_rgb8();

    let mut input = Array4::<f32>::zeros((1, height as usize, width as usize, 3));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        match characteristics.preprocessing {
            Preprocessing::TfStyle => {
                for c in 0..3 {
                    input[[0, y, x, c]] = pixel[c] as f32 / 127.5 - 1.0;
                }
            }
            Preprocessing::CaffeStyle => {
                // Channel order flips to BGR before mean subtraction.
                for c in 0..3 {
                    input[[0, y, x, c]] = pixel[2 - c] as f32 - IMAGENET_BGR_MEANS[c];
                }
            }
        }
    }

    input
}
