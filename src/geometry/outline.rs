use glam::Vec2;

use crate::font::{Glyph, OutlineCommand};

/// Closed polygonal contour in world units. The closing edge from the last
/// point back to the first is implicit.
pub(crate) type Contour = Vec<Vec2>;

const POINT_EPSILON: f32 = 1e-6;
const AREA_EPSILON: f32 = 1e-9;

/// Degenerate-corner guard for mitered offsets, limits spikes to sqrt(10)x.
const MITER_CLAMP: f32 = 0.1;

/// Flattens a glyph outline into closed contours, scaling font units by
/// `scale` and shifting by the pen position. Each curve is divided into
/// `segments` uniform pieces, so the same parameter always produces the
/// same topology.
pub(crate) fn flatten_glyph(
    glyph: &Glyph,
    segments: u32,
    scale: f32,
    pen_x: f32,
) -> Vec<Contour> {
    let segments = segments.max(1);
    let map = |p: Vec2| Vec2::new(p.x * scale + pen_x, p.y * scale);

    let mut contours = Vec::new();
    let mut current: Contour = Vec::new();
    let mut cursor = Vec2::ZERO;

    for command in &glyph.outline {
        match *command {
            OutlineCommand::MoveTo { x, y } => {
                finish_contour(&mut contours, std::mem::take(&mut current));
                cursor = Vec2::new(x, y);
                current.push(map(cursor));
            }
            OutlineCommand::LineTo { x, y } => {
                cursor = Vec2::new(x, y);
                push_point(&mut current, map(cursor));
            }
            OutlineCommand::QuadTo { x, y, cx, cy } => {
                let start = cursor;
                let ctrl = Vec2::new(cx, cy);
                let end = Vec2::new(x, y);
                for i in 1..=segments {
                    let t = i as f32 / segments as f32;
                    push_point(&mut current, map(quad_point(start, ctrl, end, t)));
                }
                cursor = end;
            }
            OutlineCommand::CubicTo {
                x,
                y,
                cx1,
                cy1,
                cx2,
                cy2,
            } => {
                let start = cursor;
                let c1 = Vec2::new(cx1, cy1);
                let c2 = Vec2::new(cx2, cy2);
                let end = Vec2::new(x, y);
                for i in 1..=segments {
                    let t = i as f32 / segments as f32;
                    push_point(&mut current, map(cubic_point(start, c1, c2, end, t)));
                }
                cursor = end;
            }
        }
    }
    finish_contour(&mut contours, current);
    contours
}

fn push_point(contour: &mut Contour, p: Vec2) {
    if let Some(last) = contour.last() {
        if last.distance_squared(p) < POINT_EPSILON * POINT_EPSILON {
            return;
        }
    }
    contour.push(p);
}

fn finish_contour(contours: &mut Vec<Contour>, mut contour: Contour) {
    // Drop an explicit closing point; the closing edge is implicit.
    if contour.len() >= 2 {
        let first = contour[0];
        let last = contour[contour.len() - 1];
        if first.distance_squared(last) < POINT_EPSILON * POINT_EPSILON {
            contour.pop();
        }
    }
    if contour.len() >= 3 {
        contours.push(contour);
    }
}

fn quad_point(p0: Vec2, c: Vec2, p1: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    p0 * (u * u) + c * (2.0 * u * t) + p1 * (t * t)
}

fn cubic_point(p0: Vec2, c1: Vec2, c2: Vec2, p1: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    p0 * (u * u * u) + c1 * (3.0 * u * u * t) + c2 * (3.0 * u * t * t) + p1 * (t * t * t)
}

/// Shoelace area; positive for counter-clockwise contours.
pub(crate) fn signed_area(contour: &[Vec2]) -> f32 {
    let n = contour.len();
    let mut sum = 0.0;
    for i in 0..n {
        let a = contour[i];
        let b = contour[(i + 1) % n];
        sum += a.x * b.y - b.x * a.y;
    }
    sum * 0.5
}

/// Forces the dominant (largest-area) contour counter-clockwise and every
/// opposite-winding contour, i.e. every hole, clockwise. Slivers with no
/// area are dropped. After this, a positive [`offset_contour`] moves outer
/// boundaries outward and hole boundaries into the hole.
pub(crate) fn normalize_windings(mut contours: Vec<Contour>) -> Vec<Contour> {
    contours.retain(|c| signed_area(c).abs() > AREA_EPSILON);
    let Some(dominant_sign) = contours
        .iter()
        .map(|c| signed_area(c))
        .max_by(|a, b| a.abs().total_cmp(&b.abs()))
        .map(f32::signum)
    else {
        return contours;
    };

    for contour in &mut contours {
        let area = signed_area(contour);
        let is_outer = area.signum() == dominant_sign;
        if (area > 0.0) != is_outer {
            contour.reverse();
        }
    }
    contours
}

/// Offsets a closed contour along its edge normals with mitered corners.
/// Expects normalized winding; the offset direction is the right-hand edge
/// normal, which points away from the filled region for outer boundaries
/// and holes alike.
pub(crate) fn offset_contour(contour: &[Vec2], amount: f32) -> Contour {
    if amount == 0.0 {
        return contour.to_vec();
    }

    let n = contour.len();
    let edge_normal = |i: usize| -> Option<Vec2> {
        let a = contour[i];
        let b = contour[(i + 1) % n];
        let d = b - a;
        let len = d.length();
        if len < POINT_EPSILON {
            None
        } else {
            Some(Vec2::new(d.y, -d.x) / len)
        }
    };

    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let n_prev = edge_normal((i + n - 1) % n);
        let n_next = edge_normal(i);
        let (n_prev, n_next) = match (n_prev, n_next) {
            (Some(a), Some(b)) => (a, b),
            (Some(a), None) => (a, a),
            (None, Some(b)) => (b, b),
            (None, None) => (Vec2::ZERO, Vec2::ZERO),
        };

        let avg = n_prev + n_next;
        let len = avg.length();
        if len < POINT_EPSILON {
            // Hairpin corner, the normals cancel; fall back to one side.
            out.push(contour[i] + n_prev * amount);
            continue;
        }

        let dot = n_prev.dot(n_next);
        let cos_half_sq = ((1.0 + dot) * 0.5).max(MITER_CLAMP);
        let scale = 1.0 / cos_half_sq.sqrt();
        out.push(contour[i] + (avg / len) * amount * scale);
    }
    out
}
