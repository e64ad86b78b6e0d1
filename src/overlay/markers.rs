//! Tappable hotspot markers placed over the frozen result

use crate::geometry::Point;

/// Tag prefix shared by every hotspot marker
pub const MARKER_TAG_PREFIX: &str = "arrow_";

/// A hotspot marker in layout space
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayMarker {
    /// Center of the marker in layout pixels
    pub anchor: Point,
    /// Decoded content forwarded when the marker is tapped
    pub content: String,
    /// Tag used to find the marker again for removal
    pub tag: String,
}

impl OverlayMarker {
    /// Create a marker for `content` centered at `anchor`
    pub fn new(anchor: Point, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            anchor,
            tag: format!("{MARKER_TAG_PREFIX}{content}"),
            content,
        }
    }

    /// Left/top margin and size of a square marker of side `size`
    pub fn bounds(&self, size: u32) -> (f32, f32, f32, f32) {
        let half = (size / 2) as f32;
        (self.anchor.x - half, self.anchor.y - half, size as f32, size as f32)
    }

    /// Whether `point` lies on a marker of side `size`
    pub fn hit(&self, point: Point, size: u32) -> bool {
        let (left, top, width, height) = self.bounds(size);
        point.x >= left && point.x < left + width && point.y >= top && point.y < top + height
    }
}

/// The set of markers currently attached to the result view
#[derive(Debug, Clone)]
pub struct MarkerLayer {
    markers: Vec<OverlayMarker>,
    marker_size: u32,
}

impl MarkerLayer {
    pub fn new(marker_size: u32) -> Self {
        Self {
            markers: Vec::new(),
            marker_size,
        }
    }

    pub fn add(&mut self, marker: OverlayMarker) {
        self.markers.push(marker);
    }

    /// Remove every marker whose tag starts with `prefix`; returns how many went
    pub fn remove_tagged(&mut self, prefix: &str) -> usize {
        let before = self.markers.len();
        self.markers.retain(|m| !m.tag.starts_with(prefix));
        before - self.markers.len()
    }

    /// Topmost marker under `point` (most recently added wins)
    pub fn hit_test(&self, point: Point) -> Option<&OverlayMarker> {
        self.markers.iter().rev().find(|m| m.hit(point, self.marker_size))
    }

    pub fn find(&self, tag: &str) -> Option<&OverlayMarker> {
        self.markers.iter().find(|m| m.tag == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OverlayMarker> {
        self.markers.iter()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn marker_size(&self) -> u32 {
        self.marker_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_tag_and_bounds() {
        let marker = OverlayMarker::new(Point::new(300.0, 400.0), "https://example.com");
        assert_eq!(marker.tag, "arrow_https://example.com");
        assert_eq!(marker.bounds(100), (250.0, 350.0, 100.0, 100.0));
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let mut layer = MarkerLayer::new(100);
        layer.add(OverlayMarker::new(Point::new(100.0, 100.0), "bottom"));
        layer.add(OverlayMarker::new(Point::new(130.0, 130.0), "top"));

        assert_eq!(layer.hit_test(Point::new(120.0, 120.0)).unwrap().content, "top");
        assert_eq!(layer.hit_test(Point::new(60.0, 60.0)).unwrap().content, "bottom");
        assert!(layer.hit_test(Point::new(500.0, 500.0)).is_none());
    }

    #[test]
    fn test_remove_tagged_only_touches_prefix() {
        let mut layer = MarkerLayer::new(100);
        layer.add(OverlayMarker::new(Point::new(0.0, 0.0), "a"));
        layer.add(OverlayMarker::new(Point::new(0.0, 0.0), "b"));
        layer.add(OverlayMarker {
            anchor: Point::new(0.0, 0.0),
            content: "other".to_string(),
            tag: "badge".to_string(),
        });

        assert_eq!(layer.remove_tagged(MARKER_TAG_PREFIX), 2);
        assert_eq!(layer.len(), 1);
        assert!(layer.find("badge").is_some());
    }
}
