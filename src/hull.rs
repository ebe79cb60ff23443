//! Convex hull fitting over integer boundary points.
//!
//! A Graham scan, plus the shoelace polygon area used to compare hull area
//! against raw blob area (an open hand has plenty of hull area that isn't
//! blob, a fist does not).

use itertools::Itertools;

/// Computes the convex hull of `points` using a Graham scan.
///
/// Returns the hull vertices as a closed polygon (the last point connects
/// back to the first). Collinear points on a hull edge are not included.
///
/// Degenerate inputs are well defined: fewer than 3 distinct points are
/// returned as-is (in first-occurrence order), and 3 or more collinear
/// points reduce to the two extreme ones. The [`polygon_area`] of any such
/// degenerate hull is 0.
pub fn convex_hull(points: &[(i32, i32)]) -> Vec<(i32, i32)> {
    let mut distinct: Vec<(i32, i32)> = points.iter().copied().unique().collect();
    if distinct.len() < 3 {
        return distinct;
    }

    // Pivot: lowest row, leftmost on ties.
    let pivot_idx = distinct
        .iter()
        .enumerate()
        .min_by_key(|(_, &(x, y))| (y, x))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let pivot = distinct.swap_remove(pivot_idx);

    distinct.sort_by(|&a, &b| {
        let c = cross(pivot, a, b);
        c.cmp(&0).reverse().then_with(|| {
            let da = dist_sq(pivot, a);
            let db = dist_sq(pivot, b);
            da.cmp(&db)
        })
    });

    let mut hull = vec![pivot, distinct[0]];
    for &point in &distinct[1..] {
        while hull.len() > 1 && cross(hull[hull.len() - 2], hull[hull.len() - 1], point) <= 0 {
            hull.pop();
        }
        hull.push(point);
    }

    hull
}

/// Computes the area of a polygon via the shoelace formula.
///
/// The result is the absolute value, so the winding direction of the
/// polygon does not matter. Polygons with fewer than 3 vertices have an
/// area of 0.
pub fn polygon_area(polygon: &[(i32, i32)]) -> f64 {
    let n = polygon.len();
    let mut area = 0i64;
    for i in 0..n {
        let (xi, yi) = polygon[i];
        let (xj, yj) = polygon[(i + 1) % n];
        area += i64::from(xi) * i64::from(yj);
        area -= i64::from(yi) * i64::from(xj);
    }

    (area as f64 / 2.0).abs()
}

fn cross(o: (i32, i32), a: (i32, i32), b: (i32, i32)) -> i64 {
    i64::from(a.0 - o.0) * i64::from(b.1 - o.1) - i64::from(a.1 - o.1) * i64::from(b.0 - o.0)
}

fn dist_sq(a: (i32, i32), b: (i32, i32)) -> i64 {
    let dx = i64::from(a.0 - b.0);
    let dy = i64::from(a.1 - b.1);
    dx * dx + dy * dy
}
