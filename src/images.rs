use crate::mnist_data::IMAGE_DIM;
use anyhow::Result;
use std::path::Path;

/// Convert grayscale pixel values in `[0, 1]` into triplicated RGB bytes
/// (R = G = B), clamped to `[0, 255]`.
pub fn rgb_bytes(pixels: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(pixels.len() * 3);
    for &val in pixels {
        let v = (val * 255.).clamp(0., 255.) as u8;
        bytes.push(v);
        bytes.push(v);
        bytes.push(v);
    }
    bytes
}

/// Save one decoded digit (a flattened 28 x 28 row in `[0, 1]`) as a
/// JPEG file.
pub fn save_digit_image(pixels: &[f32], path: &Path) -> Result<()> {
    let side = IMAGE_DIM as u32;

    anyhow::ensure!(
        pixels.len() == IMAGE_DIM * IMAGE_DIM,
        "expected {} pixels, found {}",
        IMAGE_DIM * IMAGE_DIM,
        pixels.len()
    );

    let img = image::RgbImage::from_raw(side, side, rgb_bytes(pixels))
        .ok_or_else(|| anyhow::anyhow!("pixel buffer does not fill a {0} x {0} image", side))?;
    img.save(path)?;

    Ok(())
}
