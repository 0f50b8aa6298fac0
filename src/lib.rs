// Export modules for use in tests
pub mod app;
pub mod content;
pub mod document;
pub mod event_source;
pub mod render;
pub mod sections;
pub mod settings;
pub mod viewer;

// Re-export main app components
pub use app::{run_app_with_event_source, App};
pub use viewer::{
    GestureEngine, ImageDescriptor, KeyboardController, TriggerRegistry, ViewerCommand,
    ViewerSession,
};
