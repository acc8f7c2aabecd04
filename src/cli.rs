// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

use crate::export::DEFAULT_EXPORT_FILE_NAME;
use crate::math::Rgb;
use crate::params::{FontId, MaterialParams, TextParams};
use crate::texture::DEFAULT_TIMEOUT_SECS;

#[derive(Parser, Debug, Clone)]
#[command(name = "glyphcast")]
#[command(about = "Extrude text into a 3D mesh and export it as binary glTF", long_about = None)]
pub struct Cli {
    /// Text to extrude
    #[arg(short, long, default_value = "text-to-glb")]
    pub text: String,

    /// Font family
    #[arg(long, default_value = "helvetiker", value_parser = parse_font)]
    pub font: FontId,

    /// Extrusion depth in world units
    #[arg(long, default_value_t = 0.5)]
    pub depth: f32,

    /// Bevel thickness; zero disables the bevel entirely
    #[arg(long, default_value_t = 0.05)]
    pub bevel_thickness: f32,

    /// Bevel size (silhouette flare)
    #[arg(long, default_value_t = 0.05)]
    pub bevel_size: f32,

    /// Straight segments per outline curve
    #[arg(long, default_value_t = 12)]
    pub curve_segments: u32,

    /// Base color as #rrggbb hex
    #[arg(long, default_value = "#667eea", value_parser = parse_color)]
    pub color: Rgb,

    /// Metalness factor, 0 to 1
    #[arg(long, default_value_t = 0.5, allow_negative_numbers = true)]
    pub metalness: f32,

    /// Roughness factor, 0 to 1
    #[arg(long, default_value_t = 0.5, allow_negative_numbers = true)]
    pub roughness: f32,

    /// Local image file to map onto the mesh
    #[arg(long)]
    pub texture: Option<PathBuf>,

    /// Prompt for the texture-generation service; wins over --texture when
    /// both are given
    #[arg(long)]
    pub texture_prompt: Option<String>,

    /// Directory with <font>_regular.typeface.json files; falls back to the
    /// font CDN when omitted
    #[arg(long)]
    pub fonts_dir: Option<PathBuf>,

    /// Font download base URL (env GLYPHCAST_FONT_URL)
    #[arg(long)]
    pub font_url: Option<String>,

    /// Texture service URL (env GLYPHCAST_TEXTURE_URL)
    #[arg(long)]
    pub texture_url: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Output file
    #[arg(short, long, default_value = DEFAULT_EXPORT_FILE_NAME)]
    pub output: PathBuf,

    /// Export lights along with the mesh
    #[arg(long, default_value = "false")]
    pub full_scene: bool,

    /// Re-import the exported file and log what it contains
    #[arg(long, default_value = "false")]
    pub validate: bool,

    /// Viewport size as WIDTHxHEIGHT, sets the camera aspect
    #[arg(long, default_value = "800x600", value_parser = parse_viewport)]
    pub viewport: (u32, u32),
}

impl Cli {
    pub fn text_params(&self) -> TextParams {
        TextParams {
            content: self.text.clone(),
            font: self.font,
            depth: self.depth,
            bevel_thickness: self.bevel_thickness,
            bevel_size: self.bevel_size,
            curve_segments: self.curve_segments,
        }
    }

    pub fn material_params(&self) -> MaterialParams {
        MaterialParams {
            base_color: self.color,
            metalness: self.metalness,
            roughness: self.roughness,
            texture: None,
        }
        .normalized()
    }
}

fn parse_font(s: &str) -> Result<FontId, String> {
    s.parse()
}

fn parse_color(s: &str) -> Result<Rgb, String> {
    Rgb::from_hex(s).ok_or_else(|| format!("expected #rrggbb hex color, got {s:?}"))
}

fn parse_viewport(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let width = w.trim().parse().map_err(|_| format!("bad width {w:?}"))?;
    let height = h.trim().parse().map_err(|_| format!("bad height {h:?}"))?;
    if width == 0 || height == 0 {
        return Err("viewport sides must be nonzero".to_string());
    }
    Ok((width, height))
}
