use crate::core::color::parse_hex_color;
use crate::scene::light::PointLight;
use nalgebra::{Point3, Vector3};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub transform: TransformConfig,
    #[serde(default)]
    pub light: LightConfig,
    #[serde(default)]
    pub wireframe: WireframeConfig,
}

#[derive(Debug, Deserialize)]
pub struct RenderConfig {
    // --- Output ---
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    #[serde(default = "default_output")]
    pub output: String,
    /// `#RRGGBB` or `#AARRGGBB`.
    #[serde(default = "default_clear_color")]
    pub clear_color: String,

    // --- Pipeline ---
    #[serde(default = "default_true")]
    pub solid: bool,
    #[serde(default = "default_false")]
    pub wireframe: bool,
    #[serde(default = "default_true")]
    pub cull_back_face: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            output: default_output(),
            clear_color: default_clear_color(),
            solid: true,
            wireframe: false,
            cull_back_face: true,
        }
    }
}

fn default_width() -> usize {
    800
}
fn default_height() -> usize {
    600
}
fn default_output() -> String {
    "output.png".to_string()
}
fn default_clear_color() -> String {
    "#000000".to_string()
}
fn default_false() -> bool {
    false
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct ModelConfig {
    /// `.dat` or `.obj`. Without one a built-in cube is drawn.
    #[serde(default)]
    pub path: Option<String>,
}

/// Edits applied after the model has been fitted to the view, in this order:
/// scale, rotation X / Y / Z, translation.
#[derive(Debug, Deserialize)]
pub struct TransformConfig {
    /// Degrees about the model's own axes.
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default = "default_scale")]
    pub scale: f32,
    /// In multiples of the model's extent, along the world axes.
    #[serde(default)]
    pub translation: [f32; 3],
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            rotation: [0.0; 3],
            scale: default_scale(),
            translation: [0.0; 3],
        }
    }
}

fn default_scale() -> f32 {
    1.0
}

#[derive(Debug, Deserialize)]
pub struct LightConfig {
    #[serde(default = "default_light_position")]
    pub position: [f32; 3],
    #[serde(default = "default_light_brightness")]
    pub brightness: [f32; 3],
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: default_light_position(),
            brightness: default_light_brightness(),
        }
    }
}

impl LightConfig {
    pub fn to_light(&self) -> PointLight {
        PointLight::new(
            Point3::from(self.position),
            Vector3::from(self.brightness),
        )
    }
}

fn default_light_position() -> [f32; 3] {
    [10.0, 5.0, -5.0]
}
fn default_light_brightness() -> [f32; 3] {
    [0.0, 0.0, 6.0]
}

#[derive(Debug, Deserialize)]
pub struct WireframeConfig {
    #[serde(default = "default_wire_color")]
    pub color: String,
}

impl Default for WireframeConfig {
    fn default() -> Self {
        Self {
            color: default_wire_color(),
        }
    }
}

fn default_wire_color() -> String {
    "#8C0000".to_string()
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content =
            fs::read_to_string(path).map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::parse(&content)
    }

    /// Parses and validates TOML text.
    pub fn parse(content: &str) -> Result<Self, String> {
        let config: Self =
            toml::from_str(content).map_err(|e| format!("Failed to parse TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if self.render.width == 0 || self.render.height == 0 {
            return Err(format!(
                "Invalid render size {}x{}",
                self.render.width, self.render.height
            ));
        }
        if self.transform.scale.is_nan() || self.transform.scale <= 0.0 {
            return Err(format!(
                "Transform scale must be positive, got {}",
                self.transform.scale
            ));
        }
        self.clear_color()?;
        self.wire_color()?;
        Ok(())
    }

    pub fn clear_color(&self) -> Result<u32, String> {
        parse_hex_color(&self.render.clear_color)
    }

    pub fn wire_color(&self) -> Result<u32, String> {
        parse_hex_color(&self.wireframe.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.render.width, 800);
        assert_eq!(config.render.height, 600);
        assert!(config.render.solid);
        assert!(!config.render.wireframe);
        assert!(config.render.cull_back_face);
        assert!(config.model.path.is_none());
        assert_eq!(config.transform.scale, 1.0);
        assert_eq!(config.light.to_light(), PointLight::default());
        assert_eq!(config.wire_color(), Ok(0xFF8C_0000));
        assert_eq!(config.clear_color(), Ok(0xFF00_0000));
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::parse(
            r##"
            [render]
            width = 320
            wireframe = true
            clear_color = "#202020"

            [model]
            path = "models/teapot.dat"

            [transform]
            rotation = [0.0, 45.0, 0.0]
            translation = [0.5, 0.0, 0.0]

            [light]
            brightness = [3.0, 3.0, 3.0]
            "##,
        )
        .unwrap();

        assert_eq!(config.render.width, 320);
        assert_eq!(config.render.height, 600);
        assert!(config.render.wireframe);
        assert_eq!(config.clear_color(), Ok(0xFF20_2020));
        assert_eq!(config.model.path.as_deref(), Some("models/teapot.dat"));
        assert_eq!(config.transform.rotation, [0.0, 45.0, 0.0]);
        assert_eq!(config.light.position, [10.0, 5.0, -5.0]);
        assert_eq!(config.light.brightness, [3.0, 3.0, 3.0]);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(Config::parse("[render]\nwidth = 0").is_err());
        assert!(Config::parse("[transform]\nscale = -1.0").is_err());
        assert!(Config::parse("[wireframe]\ncolor = \"red\"").is_err());
        assert!(Config::parse("[render\nwidth = 1").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("does/not/exist.toml").unwrap_err();
        assert!(err.starts_with("Failed to read config file"));
    }
}
