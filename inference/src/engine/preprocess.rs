use image::imageops::FilterType;
use ndarray::Array4;

/// Model input resolution.
pub const INPUT_SIZE: u32 = 224;
/// Channel statistics the classifier was trained with.
pub const CHANNEL_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
pub const CHANNEL_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Decodes an uploaded image into a normalized NCHW tensor. Undecodable
/// bytes yield a zero-filled tensor of the expected shape instead of an
/// error, so the model always sees a well-formed input.
pub fn image_to_tensor(image_data: &[u8]) -> Array4<f32> {
    let size = INPUT_SIZE as usize;
    let image = match image::load_from_memory(image_data) {
        Ok(image) => image,
        Err(e) => {
            log::warn!("Image decode failed, substituting neutral input: {}", e);
            return Array4::zeros((1, 3, size, size));
        }
    };

    let resized =
        image::imageops::resize(&image.to_rgb8(), INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);

    let mut tensor = Array4::zeros((1, 3, size, size));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..3 {
            let value = pixel[c] as f32 / 255.0;
            tensor[[0, c, y as usize, x as usize]] = (value - CHANNEL_MEAN[c]) / CHANNEL_STD[c];
        }
    }
    tensor
}
