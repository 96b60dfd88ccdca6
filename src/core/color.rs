use nalgebra::Vector3;

pub const OPAQUE_BLACK: u32 = 0xFF00_0000;

/// Packs an RGB colour in 0.0..1.0 into opaque `0xAARRGGBB`.
/// Channels are clamped first, so over-bright lighting saturates instead of wrapping.
#[inline]
pub fn pack_argb(color: &Vector3<f32>) -> u32 {
    let r = (color.x.clamp(0.0, 1.0) * 255.0) as u32;
    let g = (color.y.clamp(0.0, 1.0) * 255.0) as u32;
    let b = (color.z.clamp(0.0, 1.0) * 255.0) as u32;
    (255 << 24) | (r << 16) | (g << 8) | b
}

/// Splits a packed `0xAARRGGBB` pixel into its RGB bytes.
#[inline]
pub fn unpack_rgb(argb: u32) -> [u8; 3] {
    [
        ((argb >> 16) & 0xFF) as u8,
        ((argb >> 8) & 0xFF) as u8,
        (argb & 0xFF) as u8,
    ]
}

/// Parses `#RRGGBB` / `RRGGBB` / `#AARRGGBB` into a packed pixel. Missing alpha means opaque.
pub fn parse_hex_color(text: &str) -> Result<u32, String> {
    let digits = text.trim().trim_start_matches('#');
    let value = u32::from_str_radix(digits, 16)
        .map_err(|e| format!("Invalid colour '{}': {}", text, e))?;
    match digits.len() {
        6 => Ok(OPAQUE_BLACK | value),
        8 => Ok(value),
        _ => Err(format!(
            "Invalid colour '{}': expected 6 or 8 hex digits",
            text
        )),
    }
}
