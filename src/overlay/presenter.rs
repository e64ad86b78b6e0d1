//! Result view model, owned by the UI thread
//!
//! Holds the frozen annotated frame and the hotspot markers for the cycle on
//! screen. Taps forward a marker's content; dismissal clears everything and
//! tells the capture thread to resume.

use crossbeam_channel::Sender;
use image::RgbaImage;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::geometry::{Point, Size};
use crate::overlay::markers::{MarkerLayer, OverlayMarker, MARKER_TAG_PREFIX};
use crate::session::SharedForwarder;
use crate::shared::UiToCapture;

/// Presents one detection result at a time
pub struct ResultPresenter {
    image: Option<RgbaImage>,
    visible: bool,
    cycle: Option<Uuid>,
    markers: MarkerLayer,
    view: Size,
    forwarder: SharedForwarder,
    to_capture: Sender<UiToCapture>,
}

impl ResultPresenter {
    pub fn new(marker_size: u32, forwarder: SharedForwarder, to_capture: Sender<UiToCapture>) -> Self {
        Self {
            image: None,
            visible: false,
            cycle: None,
            markers: MarkerLayer::new(marker_size),
            view: Size::default(),
            forwarder,
            to_capture,
        }
    }

    /// Record the laid-out view size and pass it to the capture thread
    pub fn measure(&mut self, size: Size) {
        self.view = size;
        let _ = self.to_capture.send(UiToCapture::ViewMeasured(size));
    }

    pub fn view(&self) -> Size {
        self.view
    }

    /// Freeze on `image` and attach `markers`; refused while a result is showing
    pub fn show_result(&mut self, cycle: Uuid, image: RgbaImage, markers: Vec<OverlayMarker>) -> bool {
        if self.visible {
            warn!("Result already showing, ignoring cycle {}", cycle);
            return false;
        }

        info!("Showing result for cycle {} with {} marker(s)", cycle, markers.len());
        for marker in markers {
            self.markers.add(marker);
        }
        self.image = Some(image);
        self.cycle = Some(cycle);
        self.visible = true;
        true
    }

    pub fn is_result_showing(&self) -> bool {
        self.visible
    }

    /// The frozen frame, when showing
    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    pub fn markers(&self) -> &MarkerLayer {
        &self.markers
    }

    /// Tap at a layout-space point; forwards and returns the hit marker's content
    pub fn tap_at(&self, point: Point) -> Option<String> {
        if !self.visible {
            return None;
        }
        let marker = self.markers.hit_test(point)?;
        self.forward(marker)
    }

    /// Tap the marker carrying `tag`
    pub fn tap_marker(&self, tag: &str) -> Option<String> {
        if !self.visible {
            return None;
        }
        let marker = self.markers.find(tag)?;
        self.forward(marker)
    }

    fn forward(&self, marker: &OverlayMarker) -> Option<String> {
        debug!("Marker {} tapped", marker.tag);
        self.forwarder.forward(&marker.content);
        Some(marker.content.clone())
    }

    /// Clear markers, hide the frozen frame and resume capture
    pub fn dismiss(&mut self) -> bool {
        if !self.visible {
            return false;
        }

        let removed = self.markers.remove_tagged(MARKER_TAG_PREFIX);
        self.image = None;
        self.visible = false;
        debug!("Dismissed result, removed {} marker(s)", removed);

        if let Some(cycle) = self.cycle.take() {
            let _ = self.to_capture.send(UiToCapture::Dismissed { cycle });
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::recording_forwarder;
    use crossbeam_channel::{unbounded, Receiver};

    fn presenter() -> (ResultPresenter, Receiver<UiToCapture>, std::sync::Arc<parking_lot::Mutex<Vec<String>>>) {
        let (tx, rx) = unbounded();
        let (forwarder, forwarded) = recording_forwarder();
        (ResultPresenter::new(100, forwarder, tx), rx, forwarded)
    }

    fn two_markers() -> Vec<OverlayMarker> {
        vec![
            OverlayMarker::new(Point::new(200.0, 200.0), "first"),
            OverlayMarker::new(Point::new(800.0, 900.0), "second"),
        ]
    }

    #[test]
    fn test_measure_reports_view_size() {
        let (mut presenter, rx, _) = presenter();
        presenter.measure(Size::new(1080, 1920));

        assert_eq!(presenter.view(), Size::new(1080, 1920));
        assert_eq!(rx.try_recv().unwrap(), UiToCapture::ViewMeasured(Size::new(1080, 1920)));
    }

    #[test]
    fn test_each_marker_forwards_its_own_content() {
        let (mut presenter, _rx, forwarded) = presenter();
        presenter.show_result(Uuid::new_v4(), RgbaImage::new(4, 4), two_markers());

        assert_eq!(presenter.tap_at(Point::new(210.0, 190.0)).as_deref(), Some("first"));
        assert_eq!(presenter.tap_marker("arrow_second").as_deref(), Some("second"));
        assert_eq!(presenter.tap_at(Point::new(500.0, 500.0)), None);
        assert_eq!(*forwarded.lock(), vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_dismiss_clears_everything_and_resumes_capture() {
        let (mut presenter, rx, forwarded) = presenter();
        let cycle = Uuid::new_v4();
        presenter.show_result(cycle, RgbaImage::new(4, 4), two_markers());
        assert!(presenter.is_result_showing());

        assert!(presenter.dismiss());
        assert!(!presenter.is_result_showing());
        assert!(presenter.image().is_none());
        assert!(presenter.markers().is_empty());
        assert_eq!(rx.try_recv().unwrap(), UiToCapture::Dismissed { cycle });

        // Taps after dismissal do nothing
        assert!(presenter.tap_at(Point::new(200.0, 200.0)).is_none());
        assert!(forwarded.lock().is_empty());
        assert!(!presenter.dismiss());
    }

    #[test]
    fn test_only_one_result_at_a_time() {
        let (mut presenter, _rx, _) = presenter();
        assert!(presenter.show_result(Uuid::new_v4(), RgbaImage::new(4, 4), two_markers()));
        assert!(!presenter.show_result(Uuid::new_v4(), RgbaImage::new(4, 4), Vec::new()));
        assert_eq!(presenter.markers().len(), 2);
    }
}
