//! Connected-component extraction and per-component shape measures.
//!
//! Components are grown breadth-first with 8-connectivity from seeds taken in
//! row-major scan order, so the output order is a pure function of the mask.

use std::collections::VecDeque;

use crate::types::BoundingBox;

use super::morphology::BinaryMask;

/// One 8-connected region of set pixels.
#[derive(Debug, Clone)]
pub struct Component {
    pub pixels: Vec<(u32, u32)>,
    pub bbox: BoundingBox,
}

impl Component {
    pub fn area(&self) -> u32 {
        self.pixels.len() as u32
    }

    /// Long side over short side of the bounding box, always >= 1.
    pub fn aspect_ratio(&self) -> f64 {
        let w = f64::from(self.bbox.width.max(1));
        let h = f64::from(self.bbox.height.max(1));
        w.max(h) / w.min(h)
    }

    /// Pixel area over convex hull area, in (0, 1].
    pub fn solidity(&self) -> f64 {
        let hull_area = convex_hull_area(&self.hull_candidates());
        if hull_area <= 0.0 {
            return 1.0;
        }
        (f64::from(self.area()) / hull_area).min(1.0)
    }

    /// Corner points of the leftmost and rightmost pixel in every row.
    ///
    /// Each pixel is a unit square, so a filled rectangle has a hull area
    /// equal to its pixel count.
    fn hull_candidates(&self) -> Vec<(i64, i64)> {
        let rows = self.bbox.height as usize;
        let mut extents: Vec<Option<(u32, u32)>> = vec![None; rows];
        for &(x, y) in &self.pixels {
            let row = &mut extents[(y - self.bbox.y) as usize];
            *row = Some(match *row {
                Some((lo, hi)) => (lo.min(x), hi.max(x)),
                None => (x, x),
            });
        }

        let mut points = Vec::with_capacity(rows * 4);
        for (i, extent) in extents.iter().enumerate() {
            if let Some((lo, hi)) = extent {
                let y = i64::from(self.bbox.y) + i as i64;
                let (lo, hi) = (i64::from(*lo), i64::from(*hi) + 1);
                points.extend_from_slice(&[(lo, y), (lo, y + 1), (hi, y), (hi, y + 1)]);
            }
        }
        points
    }
}

/// Extract all 8-connected components of `mask` in row-major seed order.
pub fn find_components(mask: &BinaryMask) -> Vec<Component> {
    let (w, h) = (mask.width(), mask.height());
    let mut visited = BinaryMask::new(w, h);
    let mut components = Vec::new();

    for y in 0..h {
        for x in 0..w {
            if !mask.get(x, y) || visited.get(x, y) {
                continue;
            }
            components.push(grow_component(mask, &mut visited, (x, y)));
        }
    }
    components
}

fn grow_component(mask: &BinaryMask, visited: &mut BinaryMask, seed: (u32, u32)) -> Component {
    let (w, h) = (i64::from(mask.width()), i64::from(mask.height()));
    let mut queue = VecDeque::from([seed]);
    visited.set(seed.0, seed.1, true);

    let mut pixels = Vec::new();
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (seed.0, seed.1, seed.0, seed.1);

    while let Some((x, y)) = queue.pop_front() {
        pixels.push((x, y));
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);

        for dy in -1..=1_i64 {
            for dx in -1..=1_i64 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = i64::from(x) + dx;
                let ny = i64::from(y) + dy;
                if nx < 0 || ny < 0 || nx >= w || ny >= h {
                    continue;
                }
                let (nx, ny) = (nx as u32, ny as u32);
                if mask.get(nx, ny) && !visited.get(nx, ny) {
                    visited.set(nx, ny, true);
                    queue.push_back((nx, ny));
                }
            }
        }
    }

    Component {
        pixels,
        bbox: BoundingBox {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        },
    }
}

fn cross(o: (i64, i64), a: (i64, i64), b: (i64, i64)) -> i64 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

/// Andrew's monotone chain hull, returned counter-clockwise.
fn convex_hull(points: &[(i64, i64)]) -> Vec<(i64, i64)> {
    let mut pts = points.to_vec();
    pts.sort_unstable();
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut lower: Vec<(i64, i64)> = Vec::new();
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0 {
            lower.pop();
        }
        lower.push(p);
    }
    let mut upper: Vec<(i64, i64)> = Vec::new();
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0 {
            upper.pop();
        }
        upper.push(p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Shoelace area of the convex hull of `points`.
fn convex_hull_area(points: &[(i64, i64)]) -> f64 {
    let hull = convex_hull(points);
    if hull.len() < 3 {
        return 0.0;
    }
    let twice: i64 = hull
        .iter()
        .zip(hull.iter().cycle().skip(1))
        .map(|(a, b)| a.0 * b.1 - b.0 * a.1)
        .sum();
    twice.abs() as f64 / 2.0
}
