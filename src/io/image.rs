use crate::core::color::unpack_rgb;
use image::RgbImage;
use log::info;
use rayon::prelude::*;
use std::path::Path;

/// Saves a packed `0xAARRGGBB` buffer to an image file; the format follows the extension.
/// Alpha is dropped.
pub fn save_buffer_to_image(
    buffer: &[u32],
    width: usize,
    height: usize,
    path: &str,
) -> Result<(), String> {
    if buffer.len() != width * height {
        return Err(format!(
            "Buffer holds {} pixels, expected {}x{}",
            buffer.len(),
            width,
            height
        ));
    }

    let mut bytes = vec![0u8; width * height * 3];
    bytes
        .par_chunks_mut(3)
        .zip(buffer.par_iter())
        .for_each(|(out, &argb)| out.copy_from_slice(&unpack_rgb(argb)));

    let img = RgbImage::from_raw(width as u32, height as u32, bytes)
        .ok_or_else(|| "Image buffer has the wrong size".to_string())?;
    img.save(Path::new(path))
        .map_err(|e| format!("Failed to save image to '{}': {}", path, e))?;

    info!("Saved {}x{} image to {}", width, height, path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_mismatch_is_an_error() {
        let err = save_buffer_to_image(&[0; 5], 2, 2, "unused.png").unwrap_err();
        assert!(err.contains("expected 2x2"));
    }

    #[test]
    fn test_writes_png() {
        let path = std::env::temp_dir().join(format!("painter-image-{}.png", std::process::id()));
        let path_str = path.to_string_lossy().to_string();
        save_buffer_to_image(&[0xFFFF0000, 0xFF00FF00, 0xFF0000FF, 0xFF101010], 2, 2, &path_str)
            .unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(1, 0).0, [0, 255, 0]);
        assert_eq!(img.get_pixel(1, 1).0, [16, 16, 16]);
        let _ = std::fs::remove_file(path);
    }
}
