use std::collections::{HashMap, VecDeque};
use std::path::Path;

use coreg_image::Image;

use super::surface::{CaptureEvent, CaptureSurface, CaptureView};
use crate::error::CoregResult;

/// A surface that replays a fixed list of events.
///
/// Once the list is exhausted the surface reports itself as closed.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSurface {
    events: VecDeque<CaptureEvent>,
    shown: HashMap<CaptureView, Image<u8, 3>>,
}

impl ScriptedSurface {
    /// Create a surface replaying `events` in order.
    pub fn new(events: impl IntoIterator<Item = CaptureEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            shown: HashMap::new(),
        }
    }

    /// Load the events from a JSON array.
    ///
    /// ```json
    /// [{ "event": "click", "view": "reference", "x": 120, "y": 80 }, { "event": "finish" }]
    /// ```
    pub fn from_json_file(path: impl AsRef<Path>) -> CoregResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let events: Vec<CaptureEvent> = serde_json::from_str(&contents)?;
        Ok(Self::new(events))
    }

    /// Number of events not yet consumed.
    pub fn remaining(&self) -> usize {
        self.events.len()
    }

    /// The last image shown for `view`, markers included.
    pub fn last_shown(&self, view: CaptureView) -> Option<&Image<u8, 3>> {
        self.shown.get(&view)
    }
}

impl CaptureSurface for ScriptedSurface {
    fn show(&mut self, view: CaptureView, image: &Image<u8, 3>) -> CoregResult<()> {
        self.shown.insert(view, image.clone());
        Ok(())
    }

    fn next_event(&mut self) -> CoregResult<Option<CaptureEvent>> {
        Ok(self.events.pop_front())
    }
}
