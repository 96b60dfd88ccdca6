use crate::io::config::Config;
use clap::Parser;
use log::info;

/// Headless renderer: loads a model, orders it back to front and writes one frame.
#[derive(Parser, Debug, Default)]
#[command(name = "painter")]
#[command(about = "Software scanline renderer using the painter's algorithm")]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,

    /// Model to render (.dat or .obj), overrides the config
    #[arg(short, long, value_name = "FILE")]
    pub model: Option<String>,

    /// Output image path, overrides the config
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<String>,

    #[arg(long)]
    pub width: Option<usize>,

    #[arg(long)]
    pub height: Option<usize>,

    /// Skip the shaded fill
    #[arg(long)]
    pub no_solid: bool,

    /// Draw triangle edges on top of (or instead of) the fill
    #[arg(short, long)]
    pub wireframe: bool,

    /// Draw triangles facing away from the camera too
    #[arg(long)]
    pub no_cull: bool,
}

impl Cli {
    /// Parses the command line and returns the resulting configuration.
    pub fn process() -> Result<Config, String> {
        Self::parse().into_config()
    }

    /// Loads the config file (or defaults) and applies the command-line overrides.
    pub fn into_config(self) -> Result<Config, String> {
        let mut config = match &self.config {
            Some(path) => {
                info!("Loading config file: {}", path);
                Config::load(path).map_err(|e| format!("Config file '{}': {}", path, e))?
            }
            None => {
                info!("Using default settings");
                Config::default()
            }
        };

        if let Some(model) = self.model {
            config.model.path = Some(model);
        }
        if let Some(output) = self.output {
            config.render.output = output;
        }
        if let Some(width) = self.width {
            config.render.width = width;
        }
        if let Some(height) = self.height {
            config.render.height = height;
        }
        if self.no_solid {
            config.render.solid = false;
        }
        if self.wireframe {
            config.render.wireframe = true;
        }
        if self.no_cull {
            config.render.cull_back_face = false;
        }

        if config.render.width == 0 || config.render.height == 0 {
            return Err("Width and height must be at least 1".to_string());
        }
        Ok(config)
    }
}
