//! Convex hull of a formation (Andrew's monotone chain)

use crate::error::{FeatureError, Result};
use crate::models::Point;

/// Hull vertices in counter-clockwise order, no collinear points
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexHull {
    pub vertices: Vec<Point>,
}

impl ConvexHull {
    pub fn perimeter(&self) -> f64 {
        let n = self.vertices.len();
        (0..n)
            .map(|i| self.vertices[i].distance(&self.vertices[(i + 1) % n]))
            .sum()
    }

    /// Shoelace formula
    pub fn area(&self) -> f64 {
        let n = self.vertices.len();
        let twice: f64 = (0..n)
            .map(|i| {
                let a = self.vertices[i];
                let b = self.vertices[(i + 1) % n];
                a.x * b.y - b.x * a.y
            })
            .sum();
        twice.abs() / 2.0
    }
}

/// z component of (a - o) x (b - o); positive for a left turn
fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn half_hull<'a, I: Iterator<Item = &'a Point>>(points: I) -> Vec<Point> {
    let mut chain: Vec<Point> = Vec::new();
    for &p in points {
        while chain.len() >= 2 && cross(chain[chain.len() - 2], chain[chain.len() - 1], p) <= 0.0 {
            chain.pop();
        }
        chain.push(p);
    }
    chain
}

/// Fails when the points span fewer than 3 hull vertices (all collinear or
/// coincident).
pub fn convex_hull(points: &[Point]) -> Result<ConvexHull> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();

    if sorted.len() < 3 {
        return Err(FeatureError::DegenerateFormation(format!(
            "{} distinct points cannot form a hull",
            sorted.len()
        )));
    }

    let mut lower = half_hull(sorted.iter());
    let mut upper = half_hull(sorted.iter().rev());
    lower.pop();
    upper.pop();
    lower.extend(upper);

    if lower.len() < 3 {
        return Err(FeatureError::DegenerateFormation(
            "formation points are collinear".to_string(),
        ));
    }
    Ok(ConvexHull { vertices: lower })
}
