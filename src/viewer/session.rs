use log::debug;

use crate::content::{ContentTree, NodeId};
use crate::viewer::gestures::{GestureEngine, Point, WheelDirection};

/// One viewable image as captured into a session snapshot. Navigation
/// identity is the `source` string.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageDescriptor {
    pub source: String,
    pub alt_text: Option<String>,
    pub caption: Option<String>,
    pub title: Option<String>,
}

impl ImageDescriptor {
    /// Read a descriptor off a content node. Caption and title come from
    /// the attributes upstream renderers set (`data-caption` falling back
    /// to alt text, `data-title` falling back to a bare `title`).
    pub fn from_node(tree: &ContentTree, id: NodeId) -> Option<Self> {
        let node = tree.get(id)?;
        let image = node.image()?;
        let alt_text = (!image.alt_text.is_empty()).then(|| image.alt_text.clone());
        let caption = node
            .attrs
            .get("data-caption")
            .cloned()
            .or_else(|| alt_text.clone());
        let title = node
            .attrs
            .get("data-title")
            .cloned()
            .or_else(|| node.attrs.get("title").cloned());
        Some(Self {
            source: image.source.clone(),
            alt_text,
            caption,
            title,
        })
    }
}

/// The modal viewer state machine: `Closed` until an eligible image is
/// activated, then `Open` over a fixed snapshot until dismissed. Reopening
/// always starts from a fresh snapshot; nothing survives a close.
pub struct ViewerSession {
    open: bool,
    images: Vec<ImageDescriptor>,
    current_index: usize,
    gestures: GestureEngine,
}

impl ViewerSession {
    pub fn new() -> Self {
        Self {
            open: false,
            images: Vec::new(),
            current_index: 0,
            gestures: GestureEngine::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn images(&self) -> &[ImageDescriptor] {
        &self.images
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_image(&self) -> Option<&ImageDescriptor> {
        if !self.open {
            return None;
        }
        self.images.get(self.current_index)
    }

    pub fn has_multiple(&self) -> bool {
        self.images.len() > 1
    }

    pub fn gestures(&self) -> &GestureEngine {
        &self.gestures
    }

    /// Open over `snapshot`, positioned at `clicked_source`. An unknown
    /// source lands on index 0; an empty snapshot leaves the session closed
    /// (nothing to show is not an error).
    pub fn open(&mut self, snapshot: Vec<ImageDescriptor>, clicked_source: &str) {
        if snapshot.is_empty() {
            debug!("viewer open requested with empty snapshot, staying closed");
            return;
        }
        let index = snapshot
            .iter()
            .position(|img| img.source == clicked_source)
            .unwrap_or(0);
        debug!(
            "viewer opening at {index} of {} for '{clicked_source}'",
            snapshot.len()
        );
        self.images = snapshot;
        self.current_index = index;
        self.gestures.reset();
        self.open = true;
    }

    /// Move by `delta` images, clamped to the snapshot bounds. The view
    /// resets only when the index actually changes, so bumping against an
    /// end keeps the current zoom and pan.
    pub fn navigate(&mut self, delta: isize) {
        if !self.open {
            return;
        }
        let last = self.images.len().saturating_sub(1) as isize;
        let target = (self.current_index as isize + delta).clamp(0, last) as usize;
        if target != self.current_index {
            self.current_index = target;
            self.gestures.reset();
        }
    }

    /// Dismiss the viewer and discard the snapshot. Any gesture still in
    /// flight is unwound here. Idempotent.
    pub fn close(&mut self) {
        self.open = false;
        self.images.clear();
        self.current_index = 0;
        self.gestures.reset();
    }

    /// Reset zoom and pan without moving off the current image.
    pub fn reset_view(&mut self) {
        if self.open {
            self.gestures.reset();
        }
    }

    // Gesture input is routed through the session so everything is a no-op
    // while closed.

    pub fn wheel_step(&mut self, direction: WheelDirection) {
        if self.open {
            self.gestures.wheel_step(direction);
        }
    }

    pub fn zoom_in(&mut self) {
        if self.open {
            self.gestures.key_zoom_in();
        }
    }

    pub fn zoom_out(&mut self) {
        if self.open {
            self.gestures.key_zoom_out();
        }
    }

    pub fn drag_start(&mut self, pointer: Point) {
        if self.open {
            self.gestures.drag_start(pointer);
        }
    }

    pub fn drag_move(&mut self, pointer: Point) {
        if self.open {
            self.gestures.drag_move(pointer);
        }
    }

    pub fn drag_end(&mut self) {
        if self.open {
            self.gestures.drag_end();
        }
    }

    pub fn pinch_move(&mut self, first: Point, second: Point) {
        if self.open {
            self.gestures.pinch_move(first, second);
        }
    }

    pub fn touch_end(&mut self) {
        if self.open {
            self.gestures.touch_end();
        }
    }
}

impl Default for ViewerSession {
    fn default() -> Self {
        Self::new()
    }
}
