//! Data model and ingestion core for reviewing annotated physiological
//! recordings.
//!
//! [`container::WaveformContainer`] owns a multi-channel recording with its
//! detected peaks/troughs and operator-marked artefact ranges, and exposes a
//! masked view that hides rejected detections without deleting them.
//! [`ingest`] turns arrays, containers or delimited text files into a
//! normalized, plot-ready frame for an external renderer.

pub mod container;
pub mod ingest;
pub mod math;
pub mod prelude;
pub mod telemetry;

pub use container::{ContainerOptions, PointKind, RejectRange, SampleRate, WaveformContainer};
pub use ingest::{IngestOutput, IngestPipeline, IngestRequest, WaveformSource};
pub use prelude::{DetectionParams, PointDetector, Renderer, WaveformError, WaveformResult};
