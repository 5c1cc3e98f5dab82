use coreg_image::Image;
use coreg_imgproc::draw::{draw_filled_circle, draw_number, number_height};

use crate::correspondence::{CorrespondenceSet, PixelPoint};
use crate::error::{CoregError, CoregResult};
use crate::estimate::AFFINE_POINTS;

use super::surface::{CaptureEvent, CaptureSurface, CaptureView};

/// Points a bulk calibration must collect on each view.
pub const BULK_MIN_POINTS: usize = 4;

const REFERENCE_MARKER: [u8; 3] = [0, 255, 0];
const SENSOR_MARKER: [u8; 3] = [255, 0, 0];

/// How a capture session collects and validates points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// One-off calibration: any number of clicks until the operator finishes,
    /// at least [`BULK_MIN_POINTS`] on each view.
    Bulk,
    /// Per pair: exactly three clicks per view, ends as soon as both are full.
    PerPair,
}

impl CaptureMode {
    fn max_points(&self) -> Option<usize> {
        match self {
            CaptureMode::Bulk => None,
            CaptureMode::PerPair => Some(AFFINE_POINTS),
        }
    }

    fn min_points(&self) -> usize {
        match self {
            CaptureMode::Bulk => BULK_MIN_POINTS,
            CaptureMode::PerPair => AFFINE_POINTS,
        }
    }
}

/// Result of a capture session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The operator produced a complete set of correspondences.
    Points(CorrespondenceSet),
    /// The operator skipped the pair or closed the surface.
    Aborted,
}

/// Marker appearance on the displayed images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerStyle {
    /// Radius of the filled circle.
    pub radius: u32,
    /// Horizontal distance from the click to the ordinal label.
    pub label_offset: i64,
    /// Pixel size of one cell of the label font.
    pub label_scale: u32,
}

impl MarkerStyle {
    /// The default style for a capture mode.
    pub fn for_mode(mode: CaptureMode) -> Self {
        match mode {
            CaptureMode::Bulk => Self {
                radius: 10,
                label_offset: 15,
                label_scale: 4,
            },
            CaptureMode::PerPair => Self {
                radius: 5,
                label_offset: 10,
                label_scale: 2,
            },
        }
    }
}

/// One interactive point-capture session over a reference/sensor pair.
///
/// The session owns the click lists; they are cleared at the start of every
/// [`CaptureSession::run`] and on reset.
#[derive(Debug, Clone)]
pub struct CaptureSession {
    mode: CaptureMode,
    style: MarkerStyle,
    reference_points: Vec<PixelPoint>,
    sensor_points: Vec<PixelPoint>,
}

impl CaptureSession {
    /// Create a session for the given mode with its default marker style.
    pub fn new(mode: CaptureMode) -> Self {
        Self {
            mode,
            style: MarkerStyle::for_mode(mode),
            reference_points: Vec::new(),
            sensor_points: Vec::new(),
        }
    }

    /// Override the marker style.
    pub fn with_style(mut self, style: MarkerStyle) -> Self {
        self.style = style;
        self
    }

    /// The capture mode of this session.
    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    /// Run the session until the operator finishes, skips or closes the surface.
    ///
    /// `sensor` must already be resized with the normalization scale factor so
    /// the captured sources live in the resized frame.
    ///
    /// # Errors
    ///
    /// * [`CoregError::InsufficientPoints`] if a bulk session ends with fewer
    ///   than [`BULK_MIN_POINTS`] points on either view.
    /// * [`CoregError::MismatchedPointCount`] if both views have enough points
    ///   but not the same number.
    /// * Any error reported by the surface.
    pub fn run<S: CaptureSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        reference: &Image<u8, 3>,
        sensor: &Image<u8, 3>,
    ) -> CoregResult<CaptureOutcome> {
        self.reference_points.clear();
        self.sensor_points.clear();

        let mut reference_display = reference.clone();
        let mut sensor_display = sensor.clone();
        surface.show(CaptureView::Reference, &reference_display)?;
        surface.show(CaptureView::Sensor, &sensor_display)?;

        loop {
            let Some(event) = surface.next_event()? else {
                log::debug!("capture surface closed");
                match self.mode {
                    CaptureMode::Bulk => break,
                    CaptureMode::PerPair => return Ok(CaptureOutcome::Aborted),
                }
            };
            log::debug!("capture event: {event:?}");

            match event {
                CaptureEvent::Click { view, x, y } => {
                    let (display, points, color) = match view {
                        CaptureView::Reference => (
                            &mut reference_display,
                            &mut self.reference_points,
                            REFERENCE_MARKER,
                        ),
                        CaptureView::Sensor => {
                            (&mut sensor_display, &mut self.sensor_points, SENSOR_MARKER)
                        }
                    };

                    let inside = x >= 0
                        && y >= 0
                        && (x as usize) < display.width()
                        && (y as usize) < display.height();
                    if !inside {
                        log::warn!(
                            "ignoring click at ({x}, {y}) outside the {view} image ({})",
                            display.size()
                        );
                        continue;
                    }

                    if self.mode.max_points().is_some_and(|max| points.len() >= max) {
                        log::debug!("{view} already has {} points, click ignored", points.len());
                        continue;
                    }

                    points.push(PixelPoint::new(x, y));
                    draw_marker(display, (x, y), points.len(), color, &self.style);
                    log::info!("{view} point {}: ({x}, {y})", points.len());
                    surface.show(view, display)?;

                    if let Some(max) = self.mode.max_points() {
                        if self.reference_points.len() == max && self.sensor_points.len() == max {
                            break;
                        }
                    }
                }
                CaptureEvent::Reset => {
                    log::info!("resetting points");
                    self.reference_points.clear();
                    self.sensor_points.clear();
                    reference_display = reference.clone();
                    sensor_display = sensor.clone();
                    surface.show(CaptureView::Reference, &reference_display)?;
                    surface.show(CaptureView::Sensor, &sensor_display)?;
                }
                CaptureEvent::Skip => {
                    log::info!("capture skipped");
                    return Ok(CaptureOutcome::Aborted);
                }
                CaptureEvent::Finish => match self.mode {
                    CaptureMode::Bulk => break,
                    CaptureMode::PerPair => {
                        log::warn!(
                            "need {AFFINE_POINTS} points on each image, have {} reference and {} sensor",
                            self.reference_points.len(),
                            self.sensor_points.len()
                        );
                    }
                },
            }
        }

        self.finish().map(CaptureOutcome::Points)
    }

    fn finish(&self) -> CoregResult<CorrespondenceSet> {
        let (reference, sensor) = (self.reference_points.len(), self.sensor_points.len());
        let required = self.mode.min_points();

        if reference < required || sensor < required {
            return Err(CoregError::InsufficientPoints {
                required,
                reference,
                sensor,
            });
        }
        if reference != sensor {
            return Err(CoregError::MismatchedPointCount { reference, sensor });
        }

        Ok(CorrespondenceSet::from_lists(
            &self.reference_points,
            &self.sensor_points,
        ))
    }
}

fn draw_marker(
    display: &mut Image<u8, 3>,
    (x, y): (i32, i32),
    ordinal: usize,
    color: [u8; 3],
    style: &MarkerStyle,
) {
    let (x, y) = (x as i64, y as i64);
    draw_filled_circle(display, (x, y), style.radius, color);
    // label baseline sits on the click row
    let top = y - number_height(style.label_scale);
    draw_number(display, ordinal, (x + style.label_offset, top), style.label_scale, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::ScriptedSurface;
    use coreg_image::ImageSize;

    fn blank(width: usize, height: usize) -> Image<u8, 3> {
        Image::from_size_val(ImageSize { width, height }, 0).expect("valid size")
    }

    fn click(view: CaptureView, x: i32, y: i32) -> CaptureEvent {
        CaptureEvent::Click { view, x, y }
    }

    fn both(x: i32, y: i32) -> [CaptureEvent; 2] {
        [
            click(CaptureView::Reference, x, y),
            click(CaptureView::Sensor, x, y),
        ]
    }

    #[test]
    fn bulk_requires_four_points() -> CoregResult<()> {
        let mut events: Vec<CaptureEvent> = [both(1, 1), both(5, 1), both(1, 5)].concat();
        events.push(CaptureEvent::Finish);
        let mut surface = ScriptedSurface::new(events);

        let mut session = CaptureSession::new(CaptureMode::Bulk);
        let res = session.run(&mut surface, &blank(20, 20), &blank(20, 20));
        assert!(matches!(
            res,
            Err(CoregError::InsufficientPoints {
                required: 4,
                reference: 3,
                sensor: 3
            })
        ));
        Ok(())
    }

    #[test]
    fn bulk_mismatched_counts() {
        let mut events: Vec<CaptureEvent> =
            [both(1, 1), both(5, 1), both(1, 5), both(5, 5)].concat();
        events.push(click(CaptureView::Reference, 9, 9));
        events.push(CaptureEvent::Finish);
        let mut surface = ScriptedSurface::new(events);

        let mut session = CaptureSession::new(CaptureMode::Bulk);
        let res = session.run(&mut surface, &blank(20, 20), &blank(20, 20));
        assert!(matches!(
            res,
            Err(CoregError::MismatchedPointCount {
                reference: 5,
                sensor: 4
            })
        ));
    }

    #[test]
    fn bulk_closing_surface_finishes() -> CoregResult<()> {
        let events = [both(1, 1), both(5, 1), both(1, 5), both(5, 5)].concat();
        let mut surface = ScriptedSurface::new(events);

        let mut session = CaptureSession::new(CaptureMode::Bulk);
        let outcome = session.run(&mut surface, &blank(20, 20), &blank(20, 20))?;
        let CaptureOutcome::Points(set) = outcome else {
            panic!("expected points");
        };
        assert_eq!(set.len(), 4);
        assert_eq!(set.pairs()[3].source, PixelPoint::new(5, 5));
        Ok(())
    }

    #[test]
    fn out_of_bounds_clicks_are_rejected() -> CoregResult<()> {
        let mut events = vec![
            click(CaptureView::Reference, -1, 3),
            click(CaptureView::Sensor, 10, 0),
        ];
        events.extend([both(1, 1), both(5, 1), both(1, 5)].concat());
        let mut surface = ScriptedSurface::new(events);

        let mut session = CaptureSession::new(CaptureMode::PerPair);
        let outcome = session.run(&mut surface, &blank(20, 20), &blank(10, 20))?;
        let CaptureOutcome::Points(set) = outcome else {
            panic!("expected points");
        };
        assert_eq!(set.pairs()[0].target, PixelPoint::new(1, 1));
        Ok(())
    }

    #[test]
    fn per_pair_ends_at_three_and_ignores_extras() -> CoregResult<()> {
        let events = vec![
            click(CaptureView::Reference, 1, 1),
            click(CaptureView::Reference, 2, 1),
            click(CaptureView::Reference, 1, 2),
            click(CaptureView::Reference, 7, 7),
            click(CaptureView::Sensor, 3, 3),
            click(CaptureView::Sensor, 4, 3),
            click(CaptureView::Sensor, 3, 4),
            // never consumed, the session already ended
            CaptureEvent::Skip,
        ];
        let mut surface = ScriptedSurface::new(events);

        let mut session = CaptureSession::new(CaptureMode::PerPair);
        let outcome = session.run(&mut surface, &blank(20, 20), &blank(20, 20))?;
        let CaptureOutcome::Points(set) = outcome else {
            panic!("expected points");
        };
        assert_eq!(set.len(), 3);
        assert_eq!(set.pairs()[2].target, PixelPoint::new(1, 2));
        assert_eq!(surface.remaining(), 1);
        Ok(())
    }

    #[test]
    fn per_pair_reset_and_skip() -> CoregResult<()> {
        let mut events = vec![
            click(CaptureView::Reference, 1, 1),
            click(CaptureView::Sensor, 1, 1),
            CaptureEvent::Reset,
        ];
        events.extend([both(2, 2), both(8, 2), both(2, 8)].concat());
        let mut surface = ScriptedSurface::new(events);

        let mut session = CaptureSession::new(CaptureMode::PerPair);
        let outcome = session.run(&mut surface, &blank(20, 20), &blank(20, 20))?;
        let CaptureOutcome::Points(set) = outcome else {
            panic!("expected points");
        };
        assert_eq!(set.pairs()[0].source, PixelPoint::new(2, 2));

        let mut surface = ScriptedSurface::new(vec![
            click(CaptureView::Reference, 1, 1),
            CaptureEvent::Skip,
        ]);
        let outcome = session.run(&mut surface, &blank(20, 20), &blank(20, 20))?;
        assert_eq!(outcome, CaptureOutcome::Aborted);
        Ok(())
    }

    #[test]
    fn per_pair_close_is_skip_and_finish_is_ignored() -> CoregResult<()> {
        let mut surface = ScriptedSurface::new(vec![
            click(CaptureView::Reference, 1, 1),
            CaptureEvent::Finish,
        ]);
        let mut session = CaptureSession::new(CaptureMode::PerPair);
        let outcome = session.run(&mut surface, &blank(20, 20), &blank(20, 20))?;
        assert_eq!(outcome, CaptureOutcome::Aborted);
        Ok(())
    }

    #[test]
    fn markers_are_drawn_on_the_clicked_view() -> CoregResult<()> {
        let mut surface = ScriptedSurface::new(vec![
            click(CaptureView::Reference, 20, 20),
            click(CaptureView::Sensor, 30, 30),
            CaptureEvent::Skip,
        ]);
        let mut session = CaptureSession::new(CaptureMode::PerPair);
        let reference = blank(64, 64);
        let sensor = blank(64, 64);
        session.run(&mut surface, &reference, &sensor)?;

        let shown_reference = surface
            .last_shown(CaptureView::Reference)
            .expect("reference shown");
        let shown_sensor = surface.last_shown(CaptureView::Sensor).expect("sensor shown");
        assert_eq!(shown_reference.pixel(20, 20)?, &REFERENCE_MARKER);
        assert_eq!(shown_sensor.pixel(30, 30)?, &SENSOR_MARKER);
        assert_eq!(shown_sensor.pixel(20, 20)?, &[0, 0, 0]);
        // the caller's images are never annotated
        assert_eq!(reference.pixel(20, 20)?, &[0, 0, 0]);
        Ok(())
    }
}
