//! Planar point-in-polygon test.

use geo::Coord;

/// Even-odd ray casting over a closed vertex ring.
///
/// A horizontal ray is cast from `point` towards +x and every edge it crosses
/// toggles the result. The ring must not repeat its first vertex. Points that
/// sit exactly on an edge or vertex may land on either side.
pub fn ring_contains(ring: &[Coord<f64>], point: Coord<f64>) -> bool {
    let (x, y) = (point.x, point.y);
    let mut inside = false;

    let mut j = match ring.len() {
        0 => return false,
        n => n - 1,
    };
    for i in 0..ring.len() {
        let (xi, yi) = (ring[i].x, ring[i].y);
        let (xj, yj) = (ring[j].x, ring[j].y);

        let crosses = ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi);
        if crosses {
            inside = !inside;
        }
        j = i;
    }

    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    fn square() -> Vec<Coord<f64>> {
        vec![c(0.0, 1.0), c(1.0, 1.0), c(1.0, 0.0), c(0.0, 0.0)]
    }

    #[test]
    fn test_inside_square() {
        assert!(ring_contains(&square(), c(0.5, 0.5)));
        assert!(ring_contains(&square(), c(0.01, 0.99)));
    }

    #[test]
    fn test_outside_square() {
        assert!(!ring_contains(&square(), c(1.5, 0.5)));
        assert!(!ring_contains(&square(), c(-0.5, 0.5)));
        assert!(!ring_contains(&square(), c(0.5, 2.0)));
        assert!(!ring_contains(&square(), c(0.5, -0.1)));
    }

    #[test]
    fn test_winding_does_not_matter() {
        let mut ring = square();
        ring.reverse();
        assert!(ring_contains(&ring, c(0.5, 0.5)));
        assert!(!ring_contains(&ring, c(2.0, 0.5)));
    }

    #[test]
    fn test_skewed_quad() {
        // Parallelogram leaning to the right
        let ring = vec![c(1.0, 1.0), c(3.0, 1.0), c(2.0, 0.0), c(0.0, 0.0)];
        assert!(ring_contains(&ring, c(2.4, 0.9)));
        assert!(!ring_contains(&ring, c(0.2, 0.9)));
        assert!(!ring_contains(&ring, c(2.8, 0.1)));
    }

    #[test]
    fn test_nan_is_outside() {
        assert!(!ring_contains(&square(), c(f64::NAN, 0.5)));
        assert!(!ring_contains(&square(), c(0.5, f64::NAN)));
    }

    #[test]
    fn test_empty_ring() {
        assert!(!ring_contains(&[], c(0.0, 0.0)));
    }
}
