use serde::{Deserialize, Serialize};

/// A pixel coordinate in the space of one displayed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelPoint {
    /// Column, growing to the right.
    pub x: i32,
    /// Row, growing downwards.
    pub y: i32,
}

impl PixelPoint {
    /// Create a new point.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The point as real-valued coordinates.
    pub fn to_f64(self) -> [f64; 2] {
        [self.x as f64, self.y as f64]
    }
}

impl From<(i32, i32)> for PixelPoint {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// One manually identified correspondence.
///
/// `source` lives in the resized sensor image, `target` in the reference image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correspondence {
    /// Point on the (resized) sensor image.
    pub source: PixelPoint,
    /// Matching point on the reference image.
    pub target: PixelPoint,
}

/// Ordered correspondences collected during one capture session.
///
/// The k-th sensor click pairs with the k-th reference click.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrespondenceSet {
    pairs: Vec<Correspondence>,
}

impl CorrespondenceSet {
    /// Pair two click lists index by index.
    ///
    /// Both lists are expected to have the same length; surplus points on the
    /// longer side are dropped.
    pub fn from_lists(reference: &[PixelPoint], sensor: &[PixelPoint]) -> Self {
        let pairs = sensor
            .iter()
            .zip(reference.iter())
            .map(|(&source, &target)| Correspondence { source, target })
            .collect();
        Self { pairs }
    }

    /// The correspondences in capture order.
    pub fn pairs(&self) -> &[Correspondence] {
        &self.pairs
    }

    /// Number of correspondences.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no correspondence was captured.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl From<Vec<Correspondence>> for CorrespondenceSet {
    fn from(pairs: Vec<Correspondence>) -> Self {
        Self { pairs }
    }
}
