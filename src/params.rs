use std::fmt;
use std::str::FromStr;

use crate::math::Rgb;
use crate::texture::TextureHandle;

/// Fonts bundled with the three.js examples CDN.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FontId {
    Helvetiker,
    Optimer,
    Gentilis,
    DroidSans,
    DroidSerif,
}

impl FontId {
    pub const ALL: [FontId; 5] = [
        FontId::Helvetiker,
        FontId::Optimer,
        FontId::Gentilis,
        FontId::DroidSans,
        FontId::DroidSerif,
    ];

    /// File name under the font base URL or font directory.
    pub fn resource_name(self) -> &'static str {
        match self {
            FontId::Helvetiker => "helvetiker_regular.typeface.json",
            FontId::Optimer => "optimer_regular.typeface.json",
            FontId::Gentilis => "gentilis_regular.typeface.json",
            FontId::DroidSans => "droid/droid_sans_regular.typeface.json",
            FontId::DroidSerif => "droid/droid_serif_regular.typeface.json",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FontId::Helvetiker => "helvetiker",
            FontId::Optimer => "optimer",
            FontId::Gentilis => "gentilis",
            FontId::DroidSans => "droid-sans",
            FontId::DroidSerif => "droid-serif",
        }
    }
}

impl fmt::Display for FontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FontId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "helvetiker" => Ok(FontId::Helvetiker),
            "optimer" => Ok(FontId::Optimer),
            "gentilis" => Ok(FontId::Gentilis),
            "droid-sans" => Ok(FontId::DroidSans),
            "droid-serif" => Ok(FontId::DroidSerif),
            other => Err(format!(
                "unknown font {:?}, expected one of: helvetiker, optimer, gentilis, droid-sans, droid-serif",
                other
            )),
        }
    }
}

/// Everything that is baked into the extruded topology. Any change here
/// requires a full geometry rebuild.
#[derive(Clone, Debug, PartialEq)]
pub struct TextParams {
    pub content: String,
    pub font: FontId,
    pub depth: f32,
    pub bevel_thickness: f32,
    pub bevel_size: f32,
    pub curve_segments: u32,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            content: "text-to-glb".to_string(),
            font: FontId::Helvetiker,
            depth: 0.5,
            bevel_thickness: 0.05,
            bevel_size: 0.05,
            curve_segments: 12,
        }
    }
}

impl TextParams {
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.content.trim().is_empty() {
            return Err(crate::error::Error::EmptyText);
        }
        Ok(())
    }

    /// Copy with out-of-range values clamped to something extrudable.
    pub fn normalized(&self) -> TextParams {
        TextParams {
            content: self.content.clone(),
            font: self.font,
            depth: self.depth.max(0.0),
            bevel_thickness: self.bevel_thickness.max(0.0),
            bevel_size: self.bevel_size.max(0.0),
            curve_segments: self.curve_segments.max(1),
        }
    }

    /// A bevel with no thickness adds no geometry, so it is treated as off.
    pub fn bevel_enabled(&self) -> bool {
        self.bevel_thickness > 0.0
    }
}

/// Surface appearance. Changes here never require rebuilding geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialParams {
    pub base_color: Rgb,
    pub metalness: f32,
    pub roughness: f32,
    pub texture: Option<TextureHandle>,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            base_color: Rgb::new(0x66 as f32 / 255.0, 0x7e as f32 / 255.0, 0xea as f32 / 255.0),
            metalness: 0.5,
            roughness: 0.5,
            texture: None,
        }
    }
}

impl MaterialParams {
    pub fn with_texture(mut self, texture: Option<TextureHandle>) -> Self {
        self.texture = texture;
        self
    }

    /// Copy with the factor fields clamped to the unit range glTF allows.
    pub fn normalized(&self) -> MaterialParams {
        MaterialParams {
            base_color: self.base_color,
            metalness: self.metalness.clamp(0.0, 1.0),
            roughness: self.roughness.clamp(0.0, 1.0),
            texture: self.texture.clone(),
        }
    }
}

/// How the scene must react to a new parameter snapshot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UpdateKind {
    /// Nothing changed, leave the mesh alone.
    NoChange,
    /// Appearance changed, mutate the live material in place.
    MaterialPatch,
    /// Topology changed, the mesh must be rebuilt from scratch.
    FullRebuild,
}

impl UpdateKind {
    pub fn classify(
        old_text: &TextParams,
        old_material: &MaterialParams,
        new_text: &TextParams,
        new_material: &MaterialParams,
    ) -> UpdateKind {
        if old_text != new_text {
            UpdateKind::FullRebuild
        } else if old_material != new_material {
            UpdateKind::MaterialPatch
        } else {
            UpdateKind::NoChange
        }
    }
}
