/// Zoom factor bounds. 1.0 is the fit-to-view baseline.
pub const MIN_ZOOM: f32 = 1.0;
pub const MAX_ZOOM: f32 = 5.0;

/// Per-event zoom increments.
pub const WHEEL_ZOOM_STEP: f32 = 0.1;
pub const KEY_ZOOM_STEP: f32 = 0.25;

/// Pinch distance-to-zoom conversion: 100 units of finger spread equal one
/// full zoom step.
const PINCH_DISTANCE_DIVISOR: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn distance_to(self, other: Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelDirection {
    ZoomIn,
    ZoomOut,
}

/// Numeric state for the viewer's zoom and pan. Pure transitions, no input
/// plumbing: callers translate pointer, wheel, touch and key events into the
/// methods below. `dragging` and `pinching` state exists only for the
/// duration of the gesture and is cleared on `reset()`.
#[derive(Debug, Clone)]
pub struct GestureEngine {
    zoom: f32,
    pan: Point,
    drag_anchor: Option<Point>,
    pinch_baseline: Option<f32>,
}

impl Default for GestureEngine {
    fn default() -> Self {
        Self {
            zoom: MIN_ZOOM,
            pan: Point::default(),
            drag_anchor: None,
            pinch_baseline: None,
        }
    }
}

impl GestureEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    pub fn is_zoomed(&self) -> bool {
        self.zoom > MIN_ZOOM
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    /// One discrete scroll-wheel notch.
    pub fn wheel_step(&mut self, direction: WheelDirection) {
        let delta = match direction {
            WheelDirection::ZoomIn => WHEEL_ZOOM_STEP,
            WheelDirection::ZoomOut => -WHEEL_ZOOM_STEP,
        };
        self.apply_zoom_delta(delta);
    }

    /// One keyboard zoom step (`+` / `-`).
    pub fn key_zoom_in(&mut self) {
        self.apply_zoom_delta(KEY_ZOOM_STEP);
    }

    pub fn key_zoom_out(&mut self) {
        self.apply_zoom_delta(-KEY_ZOOM_STEP);
    }

    /// Begin a pointer drag. Ignored at baseline zoom: panning an unzoomed
    /// image would have no visible effect.
    pub fn drag_start(&mut self, pointer: Point) {
        if !self.is_zoomed() {
            return;
        }
        self.drag_anchor = Some(Point::new(
            pointer.x - self.pan.x,
            pointer.y - self.pan.y,
        ));
    }

    pub fn drag_move(&mut self, pointer: Point) {
        if !self.is_zoomed() {
            return;
        }
        if let Some(anchor) = self.drag_anchor {
            self.pan = Point::new(pointer.x - anchor.x, pointer.y - anchor.y);
        }
    }

    /// End the drag. The accumulated pan offset persists until the next
    /// reset.
    pub fn drag_end(&mut self) {
        self.drag_anchor = None;
    }

    /// One frame of a two-finger pinch. The first frame only records the
    /// inter-touch distance; later frames zoom by the distance change since
    /// the previous frame and advance the baseline.
    pub fn pinch_move(&mut self, first: Point, second: Point) {
        let distance = first.distance_to(second);
        match self.pinch_baseline {
            None => {
                self.pinch_baseline = Some(distance);
            }
            Some(baseline) => {
                self.apply_zoom_delta((distance - baseline) / PINCH_DISTANCE_DIVISOR);
                self.pinch_baseline = Some(distance);
            }
        }
    }

    /// Fingers lifted (or dropped below two): the next pinch starts fresh.
    pub fn touch_end(&mut self) {
        self.pinch_baseline = None;
    }

    /// Back to baseline: zoom 1, centered, no gesture in flight.
    pub fn reset(&mut self) {
        self.zoom = MIN_ZOOM;
        self.pan = Point::default();
        self.drag_anchor = None;
        self.pinch_baseline = None;
    }

    fn apply_zoom_delta(&mut self, delta: f32) {
        self.zoom = (self.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);
    }
}
