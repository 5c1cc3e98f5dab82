use std::io::{BufRead, Write};
use std::path::PathBuf;

use coreg_image::Image;

use super::surface::{CaptureEvent, CaptureSurface, CaptureView};
use crate::error::CoregResult;

const HELP: &str = "commands:
  a X Y    click the reference image at (X, Y)
  b X Y    click the sensor image at (X, Y)
  done     finish the session (d)
  reset    clear all points (r)
  skip     skip this pair (q)";

/// A line-oriented capture surface.
///
/// Every redraw is written to a PNG preview so the operator can follow the
/// markers in an image viewer while typing coordinates.
pub struct TerminalSurface<R, W> {
    input: R,
    output: W,
    preview_dir: Option<PathBuf>,
}

impl<R: BufRead, W: Write> TerminalSurface<R, W> {
    /// Create a surface reading commands from `input` and printing prompts to `output`.
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            preview_dir: None,
        }
    }

    /// Write `reference_preview.png` and `sensor_preview.png` into `dir` on every redraw.
    pub fn with_preview_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.preview_dir = Some(dir.into());
        self
    }

    fn write_line(&mut self, line: &str) -> CoregResult<()> {
        writeln!(self.output, "{line}")?;
        self.output.flush()?;
        Ok(())
    }
}

/// Parse one command line. Returns `Err` with a message for malformed input.
fn parse_command(line: &str) -> Result<Option<CaptureEvent>, String> {
    let mut tokens = line.split_whitespace();
    let Some(cmd) = tokens.next() else {
        return Ok(None);
    };

    let view = match cmd.to_ascii_lowercase().as_str() {
        "a" | "ref" | "reference" => CaptureView::Reference,
        "b" | "sensor" | "thermal" => CaptureView::Sensor,
        "d" | "done" | "finish" => return Ok(Some(CaptureEvent::Finish)),
        "r" | "reset" => return Ok(Some(CaptureEvent::Reset)),
        "q" | "skip" => return Ok(Some(CaptureEvent::Skip)),
        other => return Err(format!("unknown command '{other}'")),
    };

    let mut coord = |name: &str| -> Result<i32, String> {
        let token = tokens.next().ok_or_else(|| format!("missing {name}"))?;
        token
            .parse::<i32>()
            .map_err(|_| format!("invalid {name} '{token}'"))
    };
    let x = coord("x")?;
    let y = coord("y")?;

    Ok(Some(CaptureEvent::Click { view, x, y }))
}

impl<R: BufRead, W: Write> CaptureSurface for TerminalSurface<R, W> {
    fn show(&mut self, view: CaptureView, image: &Image<u8, 3>) -> CoregResult<()> {
        let Some(dir) = &self.preview_dir else {
            return Ok(());
        };

        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{view}_preview.png"));
        coreg_io::write_image_rgb8(&path, image, 100)?;

        let line = format!("{view} image ({}) -> {}", image.size(), path.display());
        self.write_line(&line)
    }

    fn next_event(&mut self) -> CoregResult<Option<CaptureEvent>> {
        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }

            if matches!(line.trim(), "help" | "?") {
                self.write_line(HELP)?;
                continue;
            }

            match parse_command(&line) {
                Ok(Some(event)) => return Ok(Some(event)),
                Ok(None) => continue,
                Err(msg) => self.write_line(&format!("{msg}\n{HELP}"))?,
            }
        }
    }
}

impl<R, W> std::fmt::Debug for TerminalSurface<R, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalSurface")
            .field("preview_dir", &self.preview_dir)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coreg_image::ImageSize;

    #[test]
    fn parses_commands() {
        assert_eq!(
            parse_command("a 12 34\n"),
            Ok(Some(CaptureEvent::Click {
                view: CaptureView::Reference,
                x: 12,
                y: 34
            }))
        );
        assert_eq!(
            parse_command("  B 5 6"),
            Ok(Some(CaptureEvent::Click {
                view: CaptureView::Sensor,
                x: 5,
                y: 6
            }))
        );
        assert_eq!(parse_command("done"), Ok(Some(CaptureEvent::Finish)));
        assert_eq!(parse_command("r"), Ok(Some(CaptureEvent::Reset)));
        assert_eq!(parse_command("q"), Ok(Some(CaptureEvent::Skip)));
        assert_eq!(parse_command("   "), Ok(None));
        assert!(parse_command("a 12").is_err());
        assert!(parse_command("a x 3").is_err());
        assert!(parse_command("zoom").is_err());
    }

    #[test]
    fn reads_until_eof_and_writes_previews() -> CoregResult<()> {
        let tmp_dir = tempfile::tempdir()?;
        let input = b"bogus\na 1 2\nskip\n".as_slice();
        let mut output = Vec::new();

        {
            let mut surface =
                TerminalSurface::new(input, &mut output).with_preview_dir(tmp_dir.path());
            let image = Image::<u8, 3>::from_size_val(
                ImageSize {
                    width: 4,
                    height: 3,
                },
                7,
            )?;
            surface.show(CaptureView::Sensor, &image)?;

            assert_eq!(
                surface.next_event()?,
                Some(CaptureEvent::Click {
                    view: CaptureView::Reference,
                    x: 1,
                    y: 2
                })
            );
            assert_eq!(surface.next_event()?, Some(CaptureEvent::Skip));
            assert_eq!(surface.next_event()?, None);
        }

        assert!(tmp_dir.path().join("sensor_preview.png").exists());
        let printed = String::from_utf8_lossy(&output);
        assert!(printed.contains("unknown command 'bogus'"));
        Ok(())
    }
}
