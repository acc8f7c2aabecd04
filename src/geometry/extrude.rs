use glam::Vec3;
use lyon::math::point;
use lyon::path::Path;
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, FillVertexConstructor,
    VertexBuffers,
};

use crate::error::{Error, Result};
use crate::font::{FontFace, Glyph};
use crate::geometry::outline::{flatten_glyph, normalize_windings, offset_contour, Contour};
use crate::geometry::TextGeometry;
use crate::math::Aabb;
use crate::params::TextParams;

/// Quarter-circle steps for each bevel rim.
pub const BEVEL_SEGMENTS: u32 = 3;

/// World-space height of one em.
pub const GLYPH_SIZE: f32 = 1.0;

const BAND_EPSILON: f32 = 1e-7;

/// Turns text plus a font face into extruded triangle geometry.
pub trait TextEngine: Send + Sync {
    /// Pure with respect to the scene: the result is handed back, never
    /// attached. Fails rather than producing an empty mesh.
    fn extrude(&self, face: &FontFace, params: &TextParams) -> Result<TextGeometry>;
}

/// Extrudes glyph outlines along +z. The front face sits at z = 0, walls run
/// to `depth`, and an enabled bevel pushes both caps outward by its
/// thickness while flaring the silhouette by its size.
#[derive(Debug, Clone)]
pub struct ExtrudedTextEngine {
    pub glyph_size: f32,
}

impl ExtrudedTextEngine {
    pub fn new() -> Self {
        Self {
            glyph_size: GLYPH_SIZE,
        }
    }
}

impl Default for ExtrudedTextEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextEngine for ExtrudedTextEngine {
    fn extrude(&self, face: &FontFace, params: &TextParams) -> Result<TextGeometry> {
        params.validate()?;
        let params = params.normalized();
        let scale = self.glyph_size / face.resolution();
        let rings = ring_profile(&params);

        let mut acc = MeshAcc::default();
        let mut pen_x = 0.0f32;
        let mut matched = 0usize;

        for ch in params.content.chars() {
            let Some(glyph) = lookup(face, ch) else {
                continue;
            };
            matched += 1;

            if !glyph.outline.is_empty() {
                let contours =
                    normalize_windings(flatten_glyph(glyph, params.curve_segments, scale, pen_x));
                if !contours.is_empty() {
                    for contour in &contours {
                        add_walls(&mut acc, contour, &rings);
                    }
                    add_caps(&mut acc, &contours, rings[0].0, rings[rings.len() - 1].0)?;
                }
            }
            pen_x += glyph.advance * scale;
        }

        if matched == 0 {
            return Err(Error::MissingGlyphs {
                text: params.content.clone(),
            });
        }
        if acc.indices.is_empty() {
            return Err(Error::DegenerateGeometry);
        }

        // Center on the origin so framing and orbiting pivot through the text.
        let bounds = Aabb::from_points(acc.positions.iter().map(|p| Vec3::from_array(*p)));
        let center = bounds.center();
        for p in &mut acc.positions {
            p[0] -= center.x;
            p[1] -= center.y;
            p[2] -= center.z;
        }
        let bounds = bounds.translated(-center);

        let uvs = planar_uvs(&acc.positions, bounds);
        let geometry = TextGeometry::new(acc.positions, acc.normals, uvs, acc.indices);
        log::debug!(
            "extruded {:?}: {} vertices, {} triangles",
            params.content,
            geometry.vertex_count(),
            geometry.triangle_count()
        );
        Ok(geometry)
    }
}

fn lookup<'a>(face: &'a FontFace, ch: char) -> Option<&'a Glyph> {
    if let Some(glyph) = face.glyph(ch) {
        return Some(glyph);
    }
    log::warn!(
        "font {:?} has no glyph for {:?}, substituting '?'",
        face.family(),
        ch
    );
    face.glyph('?')
}

#[derive(Default)]
struct MeshAcc {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    indices: Vec<u32>,
}

impl MeshAcc {
    fn push_vertex(&mut self, p: Vec3, normal: [f32; 3]) {
        self.positions.push(p.to_array());
        self.normals.push(normal);
    }
}

/// The (z, silhouette offset) stops the walls sweep through, front to back.
/// Without a bevel this is a single straight band from 0 to depth. With one,
/// each cap gains a quarter-circle rim: the caps sit at -thickness and
/// depth + thickness with the unexpanded outline, and the straight walls run
/// at the outline flared by the bevel size.
fn ring_profile(params: &TextParams) -> Vec<(f32, f32)> {
    let depth = params.depth;
    if !params.bevel_enabled() {
        return vec![(0.0, 0.0), (depth, 0.0)];
    }

    let bt = params.bevel_thickness;
    let bs = params.bevel_size;
    let steps = BEVEL_SEGMENTS;
    let mut rings = Vec::with_capacity(2 * steps as usize + 2);
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let (s, c) = (t * std::f32::consts::FRAC_PI_2).sin_cos();
        rings.push((-bt * c, bs * s));
    }
    rings.push((depth, bs));
    for i in (0..steps).rev() {
        let t = i as f32 / steps as f32;
        let (s, c) = (t * std::f32::consts::FRAC_PI_2).sin_cos();
        rings.push((depth + bt * c, bs * s));
    }
    rings
}

fn add_walls(acc: &mut MeshAcc, contour: &Contour, rings: &[(f32, f32)]) {
    let ring_points: Vec<Contour> = rings
        .iter()
        .map(|(_, offset)| offset_contour(contour, *offset))
        .collect();
    let n = contour.len();

    for k in 0..rings.len() - 1 {
        let (za, oa) = rings[k];
        let (zb, ob) = rings[k + 1];
        if (zb - za).abs() < BAND_EPSILON && (ob - oa).abs() < BAND_EPSILON {
            continue;
        }
        let ring_a = &ring_points[k];
        let ring_b = &ring_points[k + 1];

        for i in 0..n {
            let j = (i + 1) % n;
            let a0 = Vec3::new(ring_a[i].x, ring_a[i].y, za);
            let a1 = Vec3::new(ring_a[j].x, ring_a[j].y, za);
            let b1 = Vec3::new(ring_b[j].x, ring_b[j].y, zb);
            let b0 = Vec3::new(ring_b[i].x, ring_b[i].y, zb);

            let normal = (a1 - a0).cross(b1 - a0);
            if normal.length_squared() < 1e-12 {
                continue;
            }
            let normal = normal.normalize().to_array();

            let base = acc.positions.len() as u32;
            acc.push_vertex(a0, normal);
            acc.push_vertex(a1, normal);
            acc.push_vertex(b1, normal);
            acc.push_vertex(b0, normal);
            acc.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
    }
}

struct CapVertexCtor;

impl FillVertexConstructor<[f32; 2]> for CapVertexCtor {
    fn new_vertex(&mut self, vertex: FillVertex) -> [f32; 2] {
        let p = vertex.position();
        [p.x, p.y]
    }
}

/// Tessellates the glyph's contours once and stamps the result at both cap
/// planes. Holes are handled by the non-zero fill rule, which is what font
/// outlines are authored for.
fn add_caps(acc: &mut MeshAcc, contours: &[Contour], z_front: f32, z_back: f32) -> Result<()> {
    let mut builder = Path::builder();
    for contour in contours {
        builder.begin(point(contour[0].x, contour[0].y));
        for p in &contour[1..] {
            builder.line_to(point(p.x, p.y));
        }
        builder.close();
    }
    let path = builder.build();

    let mut buffers: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();
    let mut tess = FillTessellator::new();
    let options = FillOptions::default().with_fill_rule(FillRule::NonZero);
    tess.tessellate_path(
        &path,
        &options,
        &mut BuffersBuilder::new(&mut buffers, CapVertexCtor),
    )
    .map_err(|e| Error::Tessellation(format!("{e:?}")))?;

    emit_cap(acc, &buffers, z_back, 1.0);
    emit_cap(acc, &buffers, z_front, -1.0);
    Ok(())
}

fn emit_cap(acc: &mut MeshAcc, buffers: &VertexBuffers<[f32; 2], u32>, z: f32, facing: f32) {
    let base = acc.positions.len() as u32;
    let normal = [0.0, 0.0, facing];
    for p in &buffers.vertices {
        acc.push_vertex(Vec3::new(p[0], p[1], z), normal);
    }
    for tri in buffers.indices.chunks_exact(3) {
        let a = buffers.vertices[tri[0] as usize];
        let b = buffers.vertices[tri[1] as usize];
        let c = buffers.vertices[tri[2] as usize];
        let cross = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
        // 2D winding must agree with the cap's facing direction.
        if cross * facing >= 0.0 {
            acc.indices
                .extend_from_slice(&[base + tri[0], base + tri[1], base + tri[2]]);
        } else {
            acc.indices
                .extend_from_slice(&[base + tri[0], base + tri[2], base + tri[1]]);
        }
    }
}

/// Texture coordinates projected through the front face: x and y normalized
/// over the whole text's bounds. Side walls reuse the projection, which
/// stretches the image across them instead of leaving them unmapped.
fn planar_uvs(positions: &[[f32; 3]], bounds: Aabb) -> Vec<[f32; 2]> {
    let size = bounds.size();
    let w = size.x.max(f32::EPSILON);
    let h = size.y.max(f32::EPSILON);
    positions
        .iter()
        .map(|p| {
            [
                (p[0] - bounds.min.x) / w,
                (p[1] - bounds.min.y) / h,
            ]
        })
        .collect()
}
