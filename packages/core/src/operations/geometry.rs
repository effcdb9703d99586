//! Geometry Classifier
//!
//! Turns a cursor position and a candidate row's bounding box into a drop
//! zone. The row is split into three horizontal bands:
//!
//! ```text
//! top      ┌──────────────────┐
//!          │  Before          │  threshold × height
//!          ├──────────────────┤
//!          │  Into            │  centre band (nest-capable targets only)
//!          ├──────────────────┤
//!          │  After           │  threshold × height
//! bottom   └──────────────────┘
//! ```
//!
//! A target that cannot hold children never resolves to `Into`; its centre
//! band is split at the midpoint between `Before` and `After` instead.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box in viewport coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Rect {
    pub fn new(top: f64, bottom: f64, left: f64, right: f64) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Inclusive on every edge
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x <= self.right
            && point.y >= self.top
            && point.y <= self.bottom
    }
}

/// Where a drop would land relative to a target row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropZone {
    #[default]
    None,
    Before,
    After,
    Into,
}

impl DropZone {
    pub fn is_reorder(&self) -> bool {
        matches!(self, Self::Before | Self::After)
    }
}

/// Row reported by the UI layer as a possible drop target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetCandidate {
    pub id: String,
    pub rect: Rect,
    pub nest_capable: bool,
}

impl TargetCandidate {
    pub fn new(id: impl Into<String>, rect: Rect, nest_capable: bool) -> Self {
        Self {
            id: id.into(),
            rect,
            nest_capable,
        }
    }
}

/// Classify `cursor` against `rect`
///
/// `threshold` is the fraction of the height given to each edge band.
pub fn classify(cursor: Point, rect: &Rect, threshold: f64, nest_capable: bool) -> DropZone {
    if !rect.contains(cursor) {
        return DropZone::None;
    }

    let height = rect.height();
    if height <= 0.0 {
        return DropZone::Before;
    }

    let relative_y = cursor.y - rect.top;
    let edge = threshold * height;

    if relative_y < edge {
        DropZone::Before
    } else if relative_y > height - edge {
        DropZone::After
    } else if nest_capable {
        DropZone::Into
    } else if relative_y < height / 2.0 {
        DropZone::Before
    } else {
        DropZone::After
    }
}

/// Classifier bound to a configured threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryClassifier {
    threshold: f64,
}

impl Default for GeometryClassifier {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_ZONE_THRESHOLD)
    }
}

impl GeometryClassifier {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Classify a candidate row; the dragged node is never its own target
    pub fn classify_target(
        &self,
        cursor: Point,
        candidate: &TargetCandidate,
        dragged_id: &str,
    ) -> DropZone {
        self.classify_target_for(cursor, candidate, dragged_id, true)
    }

    /// Classify a candidate row whose node may itself refuse children
    ///
    /// The row only offers `Into` when both the candidate and the node are
    /// nest-capable.
    pub fn classify_target_for(
        &self,
        cursor: Point,
        candidate: &TargetCandidate,
        dragged_id: &str,
        node_nest_capable: bool,
    ) -> DropZone {
        if candidate.id == dragged_id {
            return DropZone::None;
        }
        let nest_capable = candidate.nest_capable && node_nest_capable;
        classify(cursor, &candidate.rect, self.threshold, nest_capable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 40px tall row: bands are [0,10) before, [10,30] into, (30,40] after.
    fn row() -> Rect {
        Rect::new(100.0, 140.0, 0.0, 200.0)
    }

    #[test]
    fn test_outside_is_none() {
        assert_eq!(classify(Point::new(50.0, 99.0), &row(), 0.25, true), DropZone::None);
        assert_eq!(classify(Point::new(50.0, 141.0), &row(), 0.25, true), DropZone::None);
        assert_eq!(classify(Point::new(201.0, 120.0), &row(), 0.25, true), DropZone::None);
    }

    #[test]
    fn test_bands_for_nest_capable_target() {
        let r = row();
        assert_eq!(classify(Point::new(10.0, 100.0), &r, 0.25, true), DropZone::Before);
        assert_eq!(classify(Point::new(10.0, 109.9), &r, 0.25, true), DropZone::Before);
        assert_eq!(classify(Point::new(10.0, 110.0), &r, 0.25, true), DropZone::Into);
        assert_eq!(classify(Point::new(10.0, 130.0), &r, 0.25, true), DropZone::Into);
        assert_eq!(classify(Point::new(10.0, 130.1), &r, 0.25, true), DropZone::After);
        assert_eq!(classify(Point::new(10.0, 140.0), &r, 0.25, true), DropZone::After);
    }

    #[test]
    fn test_leaf_target_never_nests() {
        let r = row();
        for y in [100.0, 110.0, 119.9, 120.0, 125.0, 130.0, 140.0] {
            let zone = classify(Point::new(10.0, y), &r, 0.25, false);
            assert!(zone.is_reorder(), "y={} gave {:?}", y, zone);
        }
        assert_eq!(classify(Point::new(10.0, 115.0), &r, 0.25, false), DropZone::Before);
        assert_eq!(classify(Point::new(10.0, 125.0), &r, 0.25, false), DropZone::After);
    }

    #[test]
    fn test_zero_height_row() {
        let r = Rect::new(50.0, 50.0, 0.0, 10.0);
        assert_eq!(classify(Point::new(5.0, 50.0), &r, 0.25, true), DropZone::Before);
    }

    #[test]
    fn test_self_target_forced_none() {
        let classifier = GeometryClassifier::default();
        let candidate = TargetCandidate::new("a", row(), true);
        assert_eq!(
            classifier.classify_target(Point::new(10.0, 120.0), &candidate, "a"),
            DropZone::None
        );
        assert_eq!(
            classifier.classify_target(Point::new(10.0, 120.0), &candidate, "b"),
            DropZone::Into
        );
    }

    #[test]
    fn test_leaf_node_overrides_candidate_flag() {
        let classifier = GeometryClassifier::default();
        let candidate = TargetCandidate::new("n", row(), true);
        let cursor = Point::new(10.0, 125.0);
        assert_eq!(
            classifier.classify_target_for(cursor, &candidate, "m", false),
            DropZone::After
        );
        assert_eq!(
            classifier.classify_target_for(cursor, &candidate, "m", true),
            DropZone::Into
        );
    }

    #[test]
    fn test_candidate_wire_shape() {
        let candidate: TargetCandidate = serde_json::from_str(
            r#"{"id":"f1","rect":{"top":0,"bottom":20,"left":0,"right":100},"nestCapable":true}"#,
        )
        .unwrap();
        assert_eq!(candidate.rect.height(), 20.0);
        assert!(candidate.nest_capable);
    }
}
