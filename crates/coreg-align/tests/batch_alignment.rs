use std::path::Path;

use approx::assert_relative_eq;
use coreg_align::calibrate::{run_calibration, Calibrator};
use coreg_align::capture::{CaptureEvent, CaptureView, ScriptedSurface};
use coreg_align::{
    AlignConfig, BatchPipeline, CalibrationStore, CoregResult, JsonFileStore, PairStatus,
};
use coreg_image::{Image, ImageSize};
use coreg_imgproc::resize::resize_to;
use coreg_io::{read_image_any_rgb8, write_image_rgb8};

const REFERENCE_SIZE: ImageSize = ImageSize {
    width: 1920,
    height: 1080,
};
const SENSOR_SIZE: ImageSize = ImageSize {
    width: 640,
    height: 480,
};
const RESIZED_SENSOR_SIZE: ImageSize = ImageSize {
    width: 1440,
    height: 1080,
};

fn write_uniform(path: &Path, size: ImageSize, val: u8) -> CoregResult<()> {
    let image = Image::<u8, 3>::from_size_val(size, val)?;
    write_image_rgb8(path, &image, 95)?;
    Ok(())
}

fn config_for(root: &Path) -> AlignConfig {
    AlignConfig {
        input_dir: root.join("input"),
        output_dir: root.join("output"),
        calibration_dir: root.join("calibration"),
        ..Default::default()
    }
}

/// Red grows with x and green with y so every region has distinct content.
fn gradient(size: ImageSize) -> CoregResult<Image<u8, 3>> {
    let mut data = Vec::with_capacity(size.width * size.height * 3);
    for y in 0..size.height {
        for x in 0..size.width {
            data.extend_from_slice(&[(x / 3) as u8, (y / 2) as u8, 50]);
        }
    }
    Ok(Image::new(size, data)?)
}

fn near(a: &[u8], b: &[u8]) -> bool {
    a.iter().zip(b).all(|(&a, &b)| a.abs_diff(b) <= 1)
}

fn clicks(reference: [(i32, i32); 3], sensor: [(i32, i32); 3]) -> Vec<CaptureEvent> {
    reference
        .iter()
        .map(|&(x, y)| CaptureEvent::Click {
            view: CaptureView::Reference,
            x,
            y,
        })
        .chain(sensor.iter().map(|&(x, y)| CaptureEvent::Click {
            view: CaptureView::Sensor,
            x,
            y,
        }))
        .collect()
}

fn scenario_clicks() -> Vec<CaptureEvent> {
    clicks(
        [(200, 150), (1000, 150), (200, 900)],
        [(100, 100), (500, 100), (100, 400)],
    )
}

fn column_is(img: &Image<u8, 3>, x: usize, val: u8) -> bool {
    (0..img.height()).all(|y| img.pixel(x, y).is_ok_and(|px| px.iter().all(|&v| v == val)))
}

#[test]
fn scenario_calibration_maps_points_exactly() -> CoregResult<()> {
    let reference = Image::<u8, 3>::from_size_val(REFERENCE_SIZE, 30)?;
    let sensor = Image::<u8, 3>::from_size_val(SENSOR_SIZE, 90)?;
    let mut surface = ScriptedSurface::new(scenario_clicks());

    let record = Calibrator::per_pair()
        .calibrate(&mut surface, &reference, &sensor)?
        .expect("points captured");

    assert_relative_eq!(record.scale_factor, 2.25);
    let transform = record.transform();
    for pair in record.points.pairs() {
        let [u, v] = transform.apply(pair.source.to_f64());
        assert_relative_eq!(u, pair.target.x as f64, epsilon = 1e-9);
        assert_relative_eq!(v, pair.target.y as f64, epsilon = 1e-9);
    }
    Ok(())
}

#[test]
fn center_fit_without_calibration() -> CoregResult<()> {
    let tmp_dir = tempfile::tempdir()?;
    let config = config_for(tmp_dir.path());
    std::fs::create_dir_all(&config.input_dir)?;
    write_uniform(&config.input_dir.join("DJI_0001_Z.png"), REFERENCE_SIZE, 30)?;
    write_uniform(&config.input_dir.join("DJI_0001_T.png"), SENSOR_SIZE, 200)?;

    let store = JsonFileStore::new(&config.calibration_dir);
    let summary = BatchPipeline::new(config.clone()).run_calibrated(&store)?;
    assert_eq!(summary.fallback, 1);
    assert_eq!(summary.reports[0].status, PairStatus::Fallback);

    let aligned = read_image_any_rgb8(config.output_dir.join("DJI_0001_AT.png"))?;
    assert_eq!(aligned.size(), REFERENCE_SIZE);
    assert!(column_is(&aligned, 239, 0));
    assert!(column_is(&aligned, 240, 200));
    assert!(column_is(&aligned, 1679, 200));
    assert!(column_is(&aligned, 1680, 0));
    Ok(())
}

#[test]
fn calibrate_then_align_batch() -> CoregResult<()> {
    let tmp_dir = tempfile::tempdir()?;
    let config = config_for(tmp_dir.path());
    std::fs::create_dir_all(&config.input_dir)?;
    for id in ["A_01", "A_02"] {
        write_uniform(&config.input_dir.join(format!("{id}_Z.png")), REFERENCE_SIZE, 30)?;
        write_uniform(&config.input_dir.join(format!("{id}_T.png")), SENSOR_SIZE, 120)?;
    }
    // reference without sensor, and a sensor that cannot be decoded
    write_uniform(&config.input_dir.join("A_03_Z.png"), REFERENCE_SIZE, 30)?;
    write_uniform(&config.input_dir.join("A_04_Z.png"), REFERENCE_SIZE, 30)?;
    std::fs::write(config.input_dir.join("A_04_T.png"), b"garbage")?;

    let mut events = scenario_clicks();
    events.push(CaptureEvent::Click {
        view: CaptureView::Reference,
        x: 1500,
        y: 800,
    });
    events.push(CaptureEvent::Click {
        view: CaptureView::Sensor,
        x: 700,
        y: 350,
    });
    events.push(CaptureEvent::Finish);
    let mut surface = ScriptedSurface::new(events);

    let mut store = JsonFileStore::new(&config.calibration_dir);
    let record = run_calibration(&config, &mut surface, &mut store)?.expect("record saved");
    assert_eq!(record.points.len(), 4);
    assert_eq!(store.load(&config.calibration_name)?, Some(record));

    let summary = BatchPipeline::new(config.clone()).run_calibrated(&store)?;
    assert_eq!(summary.calibrated, 2);
    assert_eq!(summary.missing_sensor, 1);
    assert_eq!(summary.failed, 1);

    let aligned = read_image_any_rgb8(config.output_dir.join("A_02_AT.png"))?;
    assert_eq!(aligned.size(), REFERENCE_SIZE);
    assert_eq!(aligned.pixel(0, 0)?, &[120, 120, 120]);

    // every reference is copied through, even when alignment fails
    for id in ["A_01", "A_02", "A_03", "A_04"] {
        assert!(config.output_dir.join(format!("{id}_Z.png")).exists());
    }
    assert!(!config.output_dir.join("A_03_AT.png").exists());
    Ok(())
}

#[test]
fn reference_copy_is_idempotent() -> CoregResult<()> {
    let tmp_dir = tempfile::tempdir()?;
    let config = AlignConfig {
        extensions: vec!["png".to_string()],
        ..config_for(tmp_dir.path())
    };
    std::fs::create_dir_all(&config.input_dir)?;
    let small = ImageSize {
        width: 32,
        height: 24,
    };
    write_uniform(&config.input_dir.join("P_Z.png"), small, 10)?;
    write_uniform(&config.input_dir.join("P_T.png"), small, 20)?;

    let store = JsonFileStore::new(&config.calibration_dir);
    let pipeline = BatchPipeline::new(config.clone());
    pipeline.run_calibrated(&store)?;

    let copy = config.output_dir.join("P_Z.png");
    let original = std::fs::read(&copy)?;
    assert_eq!(original, std::fs::read(config.input_dir.join("P_Z.png"))?);

    // an existing copy is left alone on rerun
    std::fs::write(&copy, b"edited")?;
    let summary = pipeline.run_calibrated(&store)?;
    assert_eq!(summary.fallback, 1);
    assert_eq!(std::fs::read(&copy)?, b"edited");
    Ok(())
}

#[test]
fn interactive_skip_keeps_reference() -> CoregResult<()> {
    let tmp_dir = tempfile::tempdir()?;
    let config = config_for(tmp_dir.path());
    std::fs::create_dir_all(&config.input_dir)?;
    let small = ImageSize {
        width: 64,
        height: 48,
    };
    write_uniform(&config.input_dir.join("S_01_Z.png"), small, 10)?;
    write_uniform(&config.input_dir.join("S_01_T.png"), small, 20)?;
    write_uniform(&config.input_dir.join("S_02_Z.png"), small, 10)?;
    write_uniform(&config.input_dir.join("S_02_T.png"), small, 20)?;

    let mut events = vec![CaptureEvent::Skip];
    for (x, y) in [(1, 1), (30, 1), (1, 30)] {
        events.push(CaptureEvent::Click {
            view: CaptureView::Reference,
            x,
            y,
        });
        events.push(CaptureEvent::Click {
            view: CaptureView::Sensor,
            x,
            y,
        });
    }
    let mut surface = ScriptedSurface::new(events);

    let summary = BatchPipeline::new(config.clone()).run_interactive(&mut surface)?;
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.calibrated, 1);
    assert_eq!(summary.reports[0].id, "S_01");
    assert_eq!(summary.reports[0].status, PairStatus::Skipped);

    assert!(config.output_dir.join("S_01_Z.png").exists());
    assert!(!config.output_dir.join("S_01_AT.png").exists());
    assert!(config.output_dir.join("S_02_AT.png").exists());
    Ok(())
}

#[test]
fn interactive_pairs_use_their_own_points() -> CoregResult<()> {
    let tmp_dir = tempfile::tempdir()?;
    let config = config_for(tmp_dir.path());
    std::fs::create_dir_all(&config.input_dir)?;
    let sensor = gradient(SENSOR_SIZE)?;
    for id in ["G_01", "G_02"] {
        write_uniform(&config.input_dir.join(format!("{id}_Z.png")), REFERENCE_SIZE, 30)?;
        write_image_rgb8(config.input_dir.join(format!("{id}_T.png")), &sensor, 95)?;
    }

    // the second pair is a pure shift of 200 pixels on both axes
    let mut events = scenario_clicks();
    events.extend(clicks(
        [(300, 300), (700, 300), (300, 700)],
        [(100, 100), (500, 100), (100, 500)],
    ));
    let mut surface = ScriptedSurface::new(events);

    let summary = BatchPipeline::new(config.clone()).run_interactive(&mut surface)?;
    assert_eq!(summary.calibrated, 2);
    assert_eq!(surface.remaining(), 0);

    let resized = resize_to(&sensor, RESIZED_SENSOR_SIZE)?;

    let first = read_image_any_rgb8(config.output_dir.join("G_01_AT.png"))?;
    for ((tx, ty), (sx, sy)) in [
        ((200, 150), (100, 100)),
        ((1000, 150), (500, 100)),
        ((200, 900), (100, 400)),
    ] {
        assert!(
            near(first.pixel(tx, ty)?, resized.pixel(sx, sy)?),
            "G_01 ({tx}, {ty}): {:?} vs {:?}",
            first.pixel(tx, ty)?,
            resized.pixel(sx, sy)?
        );
    }

    let second = read_image_any_rgb8(config.output_dir.join("G_02_AT.png"))?;
    for ((tx, ty), (sx, sy)) in [((300, 300), (100, 100)), ((700, 700), (500, 500))] {
        assert!(
            near(second.pixel(tx, ty)?, resized.pixel(sx, sy)?),
            "G_02 ({tx}, {ty}): {:?} vs {:?}",
            second.pixel(tx, ty)?,
            resized.pixel(sx, sy)?
        );
    }
    // above and left of the shifted sensor there is no data
    assert_eq!(second.pixel(100, 100)?, &[0, 0, 0]);
    Ok(())
}
