//! Box geometry and greedy non-maximum suppression.
//!
//! Leaf module: pure functions over corner-form boxes, no I/O. Boxes with
//! `x2 < x1` or `y2 < y1` are a caller precondition and are not validated.

/// Axis-aligned bounding box in corner form.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x1: f32,
    /// Top edge.
    pub y1: f32,
    /// Right edge.
    pub x2: f32,
    /// Bottom edge.
    pub y2: f32,
}

impl BoundingBox {
    /// Create a box from corner coordinates.
    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Box area. Zero-area boxes are legal and participate in NMS.
    pub fn area(&self) -> f32 {
        (self.x2 - self.x1) * (self.y2 - self.y1)
    }

    /// Overlap area with another box, clamped to zero for disjoint boxes.
    pub fn intersection_area(&self, other: &Self) -> f32 {
        let w = (self.x2.min(other.x2) - self.x1.max(other.x1)).max(0.0);
        let h = (self.y2.min(other.y2) - self.y1.max(other.y1)).max(0.0);
        w * h
    }

    /// Intersection-over-union with another box.
    ///
    /// Returns 0.0 when the union is empty, so two zero-area boxes never
    /// suppress each other.
    pub fn iou(&self, other: &Self) -> f32 {
        let inter = self.intersection_area(other);
        let union = self.area() + other.area() - inter;
        if union > 0.0 { inter / union } else { 0.0 }
    }
}

/// Greedy non-maximum suppression over `(box, confidence)` pairs.
///
/// Returns indices of the kept entries, ordered by descending confidence.
/// The sort is stable, so confidence ties preserve input order. The highest
/// remaining candidate is kept and every candidate overlapping it with IoU
/// strictly above `iou_threshold` is removed from the pool.
pub fn nms_indices(candidates: &[(BoundingBox, f32)], iou_threshold: f32) -> Vec<usize> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| {
        candidates[b]
            .1
            .partial_cmp(&candidates[a].1)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut kept = Vec::new();
    while let Some(&best) = order.first() {
        kept.push(best);
        let best_box = candidates[best].0;
        order.retain(|&i| i != best && best_box.iou(&candidates[i].0) <= iou_threshold);
    }

    kept
}
