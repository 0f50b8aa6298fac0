pub mod activation;
pub mod classifier;
pub mod gestures;
pub mod keys;
pub mod popup;
pub mod registry;
pub mod session;

pub use activation::ActivationBus;
pub use classifier::{is_trigger_image, TRIGGER_CLASS};
pub use gestures::{GestureEngine, Point, WheelDirection};
pub use keys::{KeyboardController, ViewerCommand};
pub use popup::ViewerPopup;
pub use registry::TriggerRegistry;
pub use session::{ImageDescriptor, ViewerSession};
