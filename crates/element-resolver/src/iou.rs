//! Bounding-box Intersection-over-Union.

/// IoU of two corner boxes `[x0, y0, x1, y1]`. A zero-area union yields 0,
/// never a division by zero.
pub fn iou(a: [f64; 4], b: [f64; 4]) -> f64 {
    let ix0 = a[0].max(b[0]);
    let iy0 = a[1].max(b[1]);
    let ix1 = a[2].min(b[2]);
    let iy1 = a[3].min(b[3]);

    let intersection = (ix1 - ix0).max(0.0) * (iy1 - iy0).max(0.0);
    let union = area(a) + area(b) - intersection;
    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}

fn area(b: [f64; 4]) -> f64 {
    (b[2] - b[0]).max(0.0) * (b[3] - b[1]).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_one() {
        let b = [10.0, 10.0, 50.0, 30.0];
        assert_eq!(iou(b, b), 1.0);
    }

    #[test]
    fn test_symmetry() {
        let a = [0.0, 0.0, 10.0, 10.0];
        let b = [5.0, 5.0, 15.0, 15.0];
        assert_eq!(iou(a, b), iou(b, a));
        assert!(iou(a, b) > 0.0);
    }

    #[test]
    fn test_disjoint_is_zero() {
        let a = [0.0, 0.0, 10.0, 10.0];
        let b = [20.0, 20.0, 30.0, 30.0];
        assert_eq!(iou(a, b), 0.0);
    }

    #[test]
    fn test_degenerate_union_is_zero_not_nan() {
        let empty = [5.0, 5.0, 5.0, 5.0];
        let result = iou(empty, empty);
        assert_eq!(result, 0.0);
        assert!(!result.is_nan());
    }

    #[test]
    fn test_known_overlap() {
        // 5x10 overlap over a 150-unit union.
        let a = [0.0, 0.0, 10.0, 10.0];
        let b = [5.0, 0.0, 15.0, 10.0];
        let expected = 50.0 / 150.0;
        assert!((iou(a, b) - expected).abs() < 1e-9);
    }
}
