use ndarray::{Array2, ArrayBase, ArrayViewD, Data, Dimension};
use std::path::{Path, PathBuf};

use crate::container::WaveformContainer;
use crate::ingest::reader::read_table;
use crate::math::MatrixHelper;
use crate::prelude::{WaveformError, WaveformResult};
use crate::telemetry::LogManager;

/// Anything ingestion accepts: an in-memory array, a container, or a path to
/// a delimited text file.
#[derive(Debug, Clone)]
pub enum WaveformSource<'a> {
    Matrix(ArrayViewD<'a, f64>),
    Container(&'a WaveformContainer),
    Path(PathBuf),
}

impl<'a, S, D> From<&'a ArrayBase<S, D>> for WaveformSource<'a>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    fn from(array: &'a ArrayBase<S, D>) -> Self {
        WaveformSource::Matrix(array.view().into_dyn())
    }
}

impl<'a> From<&'a WaveformContainer> for WaveformSource<'a> {
    fn from(container: &'a WaveformContainer) -> Self {
        WaveformSource::Container(container)
    }
}

impl<'a> From<&Path> for WaveformSource<'a> {
    fn from(path: &Path) -> Self {
        WaveformSource::Path(path.to_path_buf())
    }
}

impl<'a> From<PathBuf> for WaveformSource<'a> {
    fn from(path: PathBuf) -> Self {
        WaveformSource::Path(path)
    }
}

/// A source reduced to its canonical matrix and rate.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedSource {
    pub samples: Array2<f64>,
    pub rate: Option<f64>,
    pub channel_names: Option<Vec<String>>,
}

impl WaveformSource<'_> {
    pub(crate) fn resolve(
        self,
        explicit_rate: Option<f64>,
        logger: &LogManager,
    ) -> WaveformResult<ResolvedSource> {
        match self {
            WaveformSource::Matrix(view) => Ok(ResolvedSource {
                samples: MatrixHelper::promote(view)?,
                rate: explicit_rate,
                channel_names: None,
            }),
            WaveformSource::Path(path) => {
                let samples = read_table(&path)?;
                logger.trace(&format!(
                    "read {} x {} table from {}",
                    samples.nrows(),
                    samples.ncols(),
                    path.display()
                ));
                Ok(ResolvedSource {
                    samples,
                    rate: explicit_rate,
                    channel_names: None,
                })
            }
            WaveformSource::Container(container) => {
                let rate = match (container.sample_rate(), explicit_rate) {
                    (Some(carried), Some(explicit)) => {
                        return Err(WaveformError::ConflictingInput {
                            explicit,
                            carried: carried.to_vec(),
                        })
                    }
                    (Some(carried), None) => {
                        let reference = container.reference_rate();
                        if carried.iter().any(|&rate| Some(rate) != reference) {
                            logger.caution(&format!(
                                "channels carry different rates {}; using {:?} for the time axis",
                                carried, reference
                            ));
                        }
                        reference
                    }
                    (None, explicit) => explicit,
                };
                Ok(ResolvedSource {
                    samples: container.samples().to_owned(),
                    rate,
                    channel_names: Some(container.channel_names().to_vec()),
                })
            }
        }
    }
}
