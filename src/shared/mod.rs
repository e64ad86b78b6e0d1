//! Shared state and messaging between the capture thread and the UI thread
//!
//! The capture thread never touches view state; everything it wants shown
//! travels as a [`CaptureToUi`] message, and user actions travel back as
//! [`UiToCapture`] messages.

pub mod messages;
pub mod state;

pub use messages::{CaptureToUi, UiToCapture};
pub use state::{RuntimeStats, SharedStats};
