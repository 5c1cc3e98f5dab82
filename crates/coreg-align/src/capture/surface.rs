use coreg_image::Image;
use serde::{Deserialize, Serialize};

use crate::error::CoregResult;

/// The two images shown to the operator during a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureView {
    /// The visible reference image. Clicks here are correspondence targets.
    Reference,
    /// The resized thermal image. Clicks here are correspondence sources.
    Sensor,
}

impl std::fmt::Display for CaptureView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureView::Reference => write!(f, "reference"),
            CaptureView::Sensor => write!(f, "sensor"),
        }
    }
}

/// An operator action delivered by a [`CaptureSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CaptureEvent {
    /// A click at pixel `(x, y)` of one view.
    Click {
        /// The view that was clicked.
        view: CaptureView,
        /// Column of the click.
        x: i32,
        /// Row of the click.
        y: i32,
    },
    /// The operator is done clicking.
    Finish,
    /// Discard every point of the session and start over.
    Reset,
    /// Give up on the current pair.
    Skip,
}

/// Something that can show images to an operator and report clicks back.
///
/// Calls are synchronous: the session blocks on [`CaptureSurface::next_event`]
/// until the operator acts.
pub trait CaptureSurface {
    /// Display the current rendering of `view`.
    fn show(&mut self, view: CaptureView, image: &Image<u8, 3>) -> CoregResult<()>;

    /// Wait for the next operator event.
    ///
    /// Returns `None` once the surface is closed and no more events will come.
    fn next_event(&mut self) -> CoregResult<Option<CaptureEvent>>;
}

impl<S: CaptureSurface + ?Sized> CaptureSurface for &mut S {
    fn show(&mut self, view: CaptureView, image: &Image<u8, 3>) -> CoregResult<()> {
        (**self).show(view, image)
    }

    fn next_event(&mut self) -> CoregResult<Option<CaptureEvent>> {
        (**self).next_event()
    }
}

impl<S: CaptureSurface + ?Sized> CaptureSurface for Box<S> {
    fn show(&mut self, view: CaptureView, image: &Image<u8, 3>) -> CoregResult<()> {
        (**self).show(view, image)
    }

    fn next_event(&mut self) -> CoregResult<Option<CaptureEvent>> {
        (**self).next_event()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_json_shape() -> Result<(), serde_json::Error> {
        let events: Vec<CaptureEvent> = serde_json::from_str(
            r#"[
                { "event": "click", "view": "sensor", "x": 10, "y": 20 },
                { "event": "reset" },
                { "event": "finish" }
            ]"#,
        )?;
        assert_eq!(
            events,
            vec![
                CaptureEvent::Click {
                    view: CaptureView::Sensor,
                    x: 10,
                    y: 20
                },
                CaptureEvent::Reset,
                CaptureEvent::Finish,
            ]
        );
        Ok(())
    }
}
