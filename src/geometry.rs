//! Interpolation and coordinate-mapping math used by the pick-info extractors.
use glam::{DMat4, DVec2, DVec3, DVec4};

use crate::artist::{DrawStyle, ImageOrigin};

const EPSILON_DET: f64 = 1e-12;

/// The point of a polyline nearest to a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolylinePoint {
    /// The nearest point itself.
    pub point: DVec2,
    /// Vertex index when `at_vertex`, otherwise the index of the segment's first vertex.
    pub segment: usize,
    /// Whether the nearest point is one of the vertices.
    pub at_vertex: bool,
}

/// Find the point of `vertices` (taken as a polyline) nearest to `query`.
///
/// Every vertex and every clamped perpendicular projection onto a segment is
/// considered and the global minimum returned. Ties go to the earlier
/// candidate, with vertices before segment interiors. Non-finite vertices are
/// skipped.
pub fn nearest_point_on_polyline(vertices: &[DVec2], query: DVec2) -> Option<PolylinePoint> {
    let mut best: Option<(PolylinePoint, f64)> = None;
    let mut consider = |candidate: PolylinePoint| {
        let d2 = candidate.point.distance_squared(query);
        if d2.is_finite() && best.is_none_or(|(_, best_d2)| d2 < best_d2) {
            best = Some((candidate, d2));
        }
    };

    for (i, &v) in vertices.iter().enumerate() {
        consider(PolylinePoint {
            point: v,
            segment: i,
            at_vertex: true,
        });
    }

    for (i, pair) in vertices.windows(2).enumerate() {
        let (a, b) = (pair[0], pair[1]);
        let ab = b - a;
        let len2 = ab.length_squared();
        if !(len2.is_finite() && len2 > 0.0) {
            continue;
        }
        let t = (query - a).dot(ab) / len2;
        // Endpoints are already covered by the vertex pass.
        if t <= 0.0 || t >= 1.0 {
            continue;
        }
        consider(PolylinePoint {
            point: a + ab * t,
            segment: i,
            at_vertex: false,
        });
    }

    best.map(|(p, _)| p)
}

/// Expand the segment `p0 -> p1` into the vertices drawn for `style`.
///
/// Returns `None` for styles without a known shape.
pub fn step_vertices(p0: DVec2, p1: DVec2, style: &DrawStyle) -> Option<Vec<DVec2>> {
    let out = match style {
        DrawStyle::Default => vec![p0, p1],
        DrawStyle::StepsPre => vec![p0, DVec2::new(p0.x, p1.y), p1],
        DrawStyle::StepsPost => vec![p0, DVec2::new(p1.x, p0.y), p1],
        DrawStyle::StepsMid => {
            let xm = 0.5 * (p0.x + p1.x);
            vec![p0, DVec2::new(xm, p0.y), DVec2::new(xm, p1.y), p1]
        }
        DrawStyle::Other(_) => return None,
    };
    Some(out)
}

/// Nearest point to `query` on the segment `p0 -> p1` as drawn with `style`.
pub fn step_interpolate(p0: DVec2, p1: DVec2, style: &DrawStyle, query: DVec2) -> Option<DVec2> {
    let vertices = step_vertices(p0, p1, style)?;
    nearest_point_on_polyline(&vertices, query).map(|p| p.point)
}

/// Nearest point to `query` on a whole series drawn with `style`.
///
/// `segment` and `at_vertex` of the result refer to the original series, not the
/// expanded shape: a step corner is not a data vertex.
pub fn nearest_point_on_steps(
    vertices: &[DVec2],
    style: &DrawStyle,
    query: DVec2,
) -> Option<PolylinePoint> {
    if matches!(style, DrawStyle::Default) || vertices.len() < 2 {
        return nearest_point_on_polyline(vertices, query);
    }

    let mut best: Option<(PolylinePoint, f64)> = None;
    for (i, pair) in vertices.windows(2).enumerate() {
        let Some(point) = step_interpolate(pair[0], pair[1], style, query) else {
            continue;
        };
        let d2 = point.distance_squared(query);
        if d2.is_finite() && best.is_none_or(|(_, best_d2)| d2 < best_d2) {
            let at_vertex = point == pair[0] || point == pair[1];
            let segment = if point == pair[1] { i + 1 } else { i };
            best = Some((
                PolylinePoint {
                    point,
                    segment,
                    at_vertex,
                },
                d2,
            ));
        }
    }
    best.map(|(p, _)| p)
}

fn oriented_y_range(extent: [f64; 4], origin: ImageOrigin) -> (f64, f64) {
    let [_, _, ymin, ymax] = extent;
    match origin {
        ImageOrigin::Lower => (ymin, ymax),
        ImageOrigin::Upper => (ymax, ymin),
    }
}

/// Map the data position (`x`, `y`) onto the (`row`, `col`) of a raster of
/// `shape = (rows, cols)` drawn over `extent = [xmin, xmax, ymin, ymax]`.
///
/// Indices are floored. Positions outside the extent yield `None`; positions
/// exactly on the far edge belong to the last row/column.
pub fn data_to_index(
    extent: [f64; 4],
    origin: ImageOrigin,
    shape: (usize, usize),
    x: f64,
    y: f64,
) -> Option<(usize, usize)> {
    let (rows, cols) = shape;
    if rows == 0 || cols == 0 {
        return None;
    }
    let [xmin, xmax, _, _] = extent;
    let (y0, y1) = oriented_y_range(extent, origin);

    let fx = (x - xmin) / (xmax - xmin);
    let fy = (y - y0) / (y1 - y0);
    if !(fx.is_finite() && fy.is_finite()) || !(0.0..=1.0).contains(&fx) || !(0.0..=1.0).contains(&fy)
    {
        return None;
    }

    let col = ((fx * cols as f64).floor() as usize).min(cols - 1);
    let row = ((fy * rows as f64).floor() as usize).min(rows - 1);
    Some((row, col))
}

/// Inverse of [`data_to_index`]: the data position of the centre of cell (`row`, `col`).
pub fn index_to_data(
    extent: [f64; 4],
    origin: ImageOrigin,
    shape: (usize, usize),
    row: usize,
    col: usize,
) -> DVec2 {
    let (rows, cols) = shape;
    let [xmin, xmax, _, _] = extent;
    let (y0, y1) = oriented_y_range(extent, origin);
    let fx = (col as f64 + 0.5) / cols.max(1) as f64;
    let fy = (row as f64 + 0.5) / rows.max(1) as f64;
    DVec2::new(xmin + fx * (xmax - xmin), y0 + fy * (y1 - y0))
}

/// The 12 edges of the axis-aligned cuboid spanned by `min` and `max`.
pub fn cuboid_edges(min: DVec3, max: DVec3) -> [[DVec3; 2]; 12] {
    let corner = |i: usize| {
        DVec3::new(
            if i & 1 == 0 { min.x } else { max.x },
            if i & 2 == 0 { min.y } else { max.y },
            if i & 4 == 0 { min.z } else { max.z },
        )
    };
    // Corner pairs differing in exactly one bit.
    const PAIRS: [(usize, usize); 12] = [
        (0, 1),
        (2, 3),
        (4, 5),
        (6, 7),
        (0, 2),
        (1, 3),
        (4, 6),
        (5, 7),
        (0, 4),
        (1, 5),
        (2, 6),
        (3, 7),
    ];
    PAIRS.map(|(a, b)| [corner(a), corner(b)])
}

/// Apply `projection` to a data-space point, with perspective division.
pub fn project_point(projection: &DMat4, point: DVec3) -> Option<DVec3> {
    let v = *projection * point.extend(1.0);
    (v.w != 0.0 && v.is_finite()).then(|| v.truncate() / v.w)
}

/// Project data-space edges into (screen x, screen y, depth).
pub fn project_edges(edges: &[[DVec3; 2]], projection: &DMat4) -> Option<Vec<[DVec3; 2]>> {
    edges
        .iter()
        .map(|[a, b]| Some([project_point(projection, *a)?, project_point(projection, *b)?]))
        .collect()
}

fn segment_distance(a: DVec2, b: DVec2, p: DVec2) -> f64 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 <= 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Recover the 3D data position under a 2D pointer from the projected axes box.
///
/// `edges` are the screen-projected cuboid edges (x, y, depth). The nearest edge
/// to `screen` is chosen, its depth interpolated by the pointer's distance to
/// the two endpoints, and the result inverse-projected through `projection`.
/// Returns `None` without a projection (view not yet drawn), with a singular
/// projection, or without edges.
pub fn nearest_edge_projection(
    edges: &[[DVec3; 2]],
    screen: DVec2,
    projection: Option<&DMat4>,
) -> Option<DVec3> {
    let projection = projection?;
    if projection.determinant().abs() < EPSILON_DET {
        return None;
    }

    let [p0, p1] = edges
        .iter()
        .map(|edge| (edge, segment_distance(edge[0].truncate(), edge[1].truncate(), screen)))
        .filter(|(_, d)| d.is_finite())
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(edge, _)| *edge)?;

    let d0 = p0.truncate().distance(screen);
    let d1 = p1.truncate().distance(screen);
    let dt = d0 + d1;
    let depth = if dt > 0.0 {
        d1 / dt * p0.z + d0 / dt * p1.z
    } else {
        p0.z
    };

    let v = projection.inverse() * DVec4::new(screen.x, screen.y, depth, 1.0);
    (v.w != 0.0 && v.is_finite()).then(|| v.truncate() / v.w)
}
