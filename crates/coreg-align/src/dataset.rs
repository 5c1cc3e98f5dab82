use std::path::{Path, PathBuf};

use coreg_image::Image;
use coreg_io::read_image_any_rgb8;

use crate::config::AlignConfig;
use crate::error::{CoregError, CoregResult};

/// A reference image found on disk and its matching sensor file, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairEntry {
    /// Base name shared by both files, e.g. `DJI_0001` for `DJI_0001_Z.JPG`.
    pub id: String,
    /// Path of the visible reference image.
    pub reference_path: PathBuf,
    /// Path of the thermal sensor image, `None` if it is missing.
    pub sensor_path: Option<PathBuf>,
}

impl PairEntry {
    /// Extension of the reference file, as written on disk.
    pub fn extension(&self) -> &str {
        self.reference_path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
    }

    /// Where the verbatim reference copy goes in `output_dir`.
    pub fn reference_output(&self, output_dir: &Path) -> PathBuf {
        match self.reference_path.file_name() {
            Some(name) => output_dir.join(name),
            None => output_dir.join(&self.id),
        }
    }

    /// Where the aligned sensor image goes in `output_dir`.
    pub fn aligned_output(&self, output_dir: &Path, aligned_suffix: &str) -> PathBuf {
        output_dir.join(format!("{}{}.{}", self.id, aligned_suffix, self.extension()))
    }
}

/// Both images of a pair, decoded.
#[derive(Debug, Clone)]
pub struct ImagePair {
    /// Base name of the pair.
    pub id: String,
    /// The visible reference image.
    pub reference: Image<u8, 3>,
    /// The thermal sensor image at its native resolution.
    pub sensor: Image<u8, 3>,
}

impl ImagePair {
    /// Decode both images of `entry`.
    ///
    /// # Errors
    ///
    /// Returns [`CoregError::InvalidImage`] if the sensor file is missing, or the
    /// decoding error of whichever image cannot be read.
    pub fn load(entry: &PairEntry) -> CoregResult<Self> {
        let Some(sensor_path) = &entry.sensor_path else {
            return Err(CoregError::InvalidImage(format!(
                "no sensor image for {}",
                entry.id
            )));
        };

        let reference = read_image_any_rgb8(&entry.reference_path)?;
        let sensor = read_image_any_rgb8(sensor_path)?;

        Ok(Self {
            id: entry.id.clone(),
            reference,
            sensor,
        })
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Finds the sensor file of `id` among `files`, preferring the reference's extension.
///
/// Extensions are compared without regard to ASCII case.
fn find_sensor(
    files: &[PathBuf],
    id: &str,
    reference_ext: &str,
    config: &AlignConfig,
) -> Option<PathBuf> {
    let stem = format!("{id}{}", config.sensor_suffix);
    let candidates: Vec<&PathBuf> = files
        .iter()
        .filter(|path| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(|s| s == stem)
        })
        .collect();

    let same_ext = candidates.iter().find(|path| {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(reference_ext))
    });

    same_ext.or(candidates.first()).map(|path| path.to_path_buf())
}

/// Scan `config.input_dir` for reference images and pair them with sensor images.
///
/// Entries are sorted by id so runs are reproducible.
///
/// # Errors
///
/// Returns [`CoregError::NoInputPairs`] if no reference image is found, or the
/// I/O error if the directory cannot be read.
pub fn discover_pairs(config: &AlignConfig) -> CoregResult<Vec<PairEntry>> {
    let dir = &config.input_dir;
    let mut files = Vec::new();
    for dir_entry in std::fs::read_dir(dir)? {
        let path = dir_entry?.path();
        if path.is_file() && has_extension(&path, &config.extensions) {
            files.push(path);
        }
    }
    files.sort();

    let mut entries = Vec::new();
    for path in &files {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let Some(id) = stem.strip_suffix(config.reference_suffix.as_str()) else {
            continue;
        };
        if id.is_empty() {
            continue;
        }

        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        let sensor_path = find_sensor(&files, id, ext, config);

        entries.push(PairEntry {
            id: id.to_string(),
            reference_path: path.clone(),
            sensor_path,
        });
    }

    if entries.is_empty() {
        return Err(CoregError::NoInputPairs {
            dir: dir.clone(),
            suffix: config.reference_suffix.clone(),
        });
    }

    entries.sort_by(|a, b| a.id.cmp(&b.id).then(a.reference_path.cmp(&b.reference_path)));
    log::info!("found {} image pairs in {}", entries.len(), dir.display());

    Ok(entries)
}
