use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ingest::IngestOutput;

/// Common error type for container construction and ingestion.
#[derive(thiserror::Error, Debug)]
pub enum WaveformError {
    #[error("shape mismatch: {0}")]
    Shape(String),
    #[error("invalid type: {0}")]
    Type(String),
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("sampling rate {explicit} given while the container already carries {carried:?}")]
    ConflictingInput { explicit: f64, carried: Vec<f64> },
    #[error("malformed session: {0}")]
    Parse(String),
    #[error("channel {index} out of range for {nchannels} channels")]
    Channel { index: usize, nchannels: usize },
}

pub type WaveformResult<T> = Result<T, WaveformError>;

/// Parameters handed to an external point detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionParams {
    pub threshold: f64,
    pub min_distance: usize,
}

/// External peak/trough detector. Returns ordered sample indices for one channel.
pub trait PointDetector {
    fn detect(&self, channel: ArrayView1<'_, f64>, params: &DetectionParams) -> Vec<usize>;
}

/// External drawing collaborator. Receives the normalized frame, never called
/// by the core on its own.
pub trait Renderer {
    type Output;

    fn render(&mut self, frame: &IngestOutput) -> WaveformResult<Self::Output>;
}
