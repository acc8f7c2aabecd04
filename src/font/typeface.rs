use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{Error, Result};

/// One drawing instruction from a glyph outline program. Coordinates are in
/// font units (y up, baseline at y = 0); curve end points come before their
/// control points, matching the typeface JSON layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutlineCommand {
    MoveTo { x: f32, y: f32 },
    LineTo { x: f32, y: f32 },
    QuadTo { x: f32, y: f32, cx: f32, cy: f32 },
    CubicTo { x: f32, y: f32, cx1: f32, cy1: f32, cx2: f32, cy2: f32 },
}

#[derive(Debug, Clone)]
pub struct Glyph {
    /// Horizontal advance in font units.
    pub advance: f32,
    /// Empty for blank glyphs such as the space.
    pub outline: Vec<OutlineCommand>,
}

/// A parsed typeface JSON font. Outline programs are decoded once at load
/// time so extrusion never re-parses strings.
#[derive(Debug)]
pub struct FontFace {
    family: String,
    resolution: f32,
    glyphs: HashMap<char, Glyph>,
}

#[derive(Deserialize)]
struct RawFont {
    #[serde(rename = "familyName")]
    family_name: String,
    resolution: f32,
    glyphs: HashMap<String, RawGlyph>,
}

#[derive(Deserialize)]
struct RawGlyph {
    ha: f32,
    #[serde(default)]
    o: String,
}

impl FontFace {
    pub fn from_slice(bytes: &[u8]) -> Result<FontFace> {
        let raw: RawFont =
            serde_json::from_slice(bytes).map_err(|e| Error::FontParse(e.to_string()))?;
        if raw.resolution <= 0.0 {
            return Err(Error::FontParse(format!(
                "resolution must be positive, got {}",
                raw.resolution
            )));
        }

        let mut glyphs = HashMap::with_capacity(raw.glyphs.len());
        for (key, glyph) in raw.glyphs {
            let mut chars = key.chars();
            let (Some(ch), None) = (chars.next(), chars.next()) else {
                // Some faces carry multi-character ligature keys; skip them.
                continue;
            };
            let outline = parse_outline(&glyph.o)
                .map_err(|detail| Error::FontParse(format!("glyph {:?}: {}", ch, detail)))?;
            glyphs.insert(
                ch,
                Glyph {
                    advance: glyph.ha,
                    outline,
                },
            );
        }

        if glyphs.is_empty() {
            return Err(Error::FontParse("font contains no glyphs".to_string()));
        }

        Ok(FontFace {
            family: raw.family_name,
            resolution: raw.resolution,
            glyphs,
        })
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    /// Font units per em; coordinates scale by `size / resolution`.
    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Exact lookup, no substitution.
    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch)
    }
}

fn parse_outline(program: &str) -> std::result::Result<Vec<OutlineCommand>, String> {
    fn num<'a>(
        tokens: &mut impl Iterator<Item = &'a str>,
    ) -> std::result::Result<f32, String> {
        let token = tokens.next().ok_or("outline program truncated")?;
        token
            .parse::<f32>()
            .map_err(|_| format!("bad coordinate {:?}", token))
    }

    let mut tokens = program.split_ascii_whitespace();
    let mut commands = Vec::new();
    while let Some(op) = tokens.next() {
        let command = match op {
            "m" => OutlineCommand::MoveTo {
                x: num(&mut tokens)?,
                y: num(&mut tokens)?,
            },
            "l" => OutlineCommand::LineTo {
                x: num(&mut tokens)?,
                y: num(&mut tokens)?,
            },
            "q" => OutlineCommand::QuadTo {
                x: num(&mut tokens)?,
                y: num(&mut tokens)?,
                cx: num(&mut tokens)?,
                cy: num(&mut tokens)?,
            },
            "b" => OutlineCommand::CubicTo {
                x: num(&mut tokens)?,
                y: num(&mut tokens)?,
                cx1: num(&mut tokens)?,
                cy1: num(&mut tokens)?,
                cx2: num(&mut tokens)?,
                cy2: num(&mut tokens)?,
            },
            other => return Err(format!("unknown outline op {:?}", other)),
        };
        commands.push(command);
    }
    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINI_FONT: &str = r#"{
        "familyName": "Mini",
        "resolution": 1000,
        "glyphs": {
            "a": { "ha": 600, "o": "m 0 0 l 500 0 l 500 700 l 0 700" },
            "?": { "ha": 500, "o": "m 0 0 l 400 0 q 400 600 200 650" },
            " ": { "ha": 300 }
        }
    }"#;

    #[test]
    fn test_parses_mini_font() {
        let face = FontFace::from_slice(MINI_FONT.as_bytes()).unwrap();
        assert_eq!(face.family(), "Mini");
        assert_eq!(face.resolution(), 1000.0);
        assert_eq!(face.glyph_count(), 3);

        let a = face.glyph('a').unwrap();
        assert_eq!(a.advance, 600.0);
        assert_eq!(a.outline.len(), 4);
        assert_eq!(a.outline[0], OutlineCommand::MoveTo { x: 0.0, y: 0.0 });
    }

    #[test]
    fn test_blank_glyph_has_empty_outline() {
        let face = FontFace::from_slice(MINI_FONT.as_bytes()).unwrap();
        let space = face.glyph(' ').unwrap();
        assert_eq!(space.advance, 300.0);
        assert!(space.outline.is_empty());
    }

    #[test]
    fn test_quadratic_end_point_comes_first() {
        let face = FontFace::from_slice(MINI_FONT.as_bytes()).unwrap();
        let q = face.glyph('?').unwrap();
        assert_eq!(
            q.outline[2],
            OutlineCommand::QuadTo {
                x: 400.0,
                y: 600.0,
                cx: 200.0,
                cy: 650.0
            }
        );
    }

    #[test]
    fn test_missing_glyph_is_none() {
        let face = FontFace::from_slice(MINI_FONT.as_bytes()).unwrap();
        assert!(face.glyph('z').is_none());
    }

    #[test]
    fn test_truncated_outline_is_an_error() {
        let json = r#"{
            "familyName": "Broken",
            "resolution": 1000,
            "glyphs": { "a": { "ha": 600, "o": "m 0" } }
        }"#;
        let err = FontFace::from_slice(json.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::FontParse(_)));
    }

    #[test]
    fn test_unknown_op_is_an_error() {
        let json = r#"{
            "familyName": "Broken",
            "resolution": 1000,
            "glyphs": { "a": { "ha": 600, "o": "z 1 2" } }
        }"#;
        assert!(FontFace::from_slice(json.as_bytes()).is_err());
    }

    #[test]
    fn test_not_json_is_an_error() {
        let err = FontFace::from_slice(b"<html>").unwrap_err();
        assert!(matches!(err, Error::FontParse(_)));
    }

    #[test]
    fn test_zero_resolution_is_an_error() {
        let json = r#"{
            "familyName": "Broken",
            "resolution": 0,
            "glyphs": { "a": { "ha": 600, "o": "" } }
        }"#;
        assert!(FontFace::from_slice(json.as_bytes()).is_err());
    }
}
