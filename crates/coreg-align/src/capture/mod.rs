//! Interactive collection of point correspondences.
//!
//! A [`CaptureSession`] drives a [`CaptureSurface`]: it shows the reference and
//! the resized sensor image, receives clicks and control events, and draws a
//! numbered marker at every accepted click so the operator can check the
//! pairing order.

mod scripted;
mod session;
mod surface;
mod terminal;

pub use scripted::ScriptedSurface;
pub use session::{CaptureMode, CaptureOutcome, CaptureSession, MarkerStyle, BULK_MIN_POINTS};
pub use surface::{CaptureEvent, CaptureSurface, CaptureView};
pub use terminal::TerminalSurface;
