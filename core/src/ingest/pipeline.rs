use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use crate::ingest::layout::{FigureLayout, LayoutHint};
use crate::ingest::source::WaveformSource;
use crate::math::MatrixHelper;
use crate::prelude::{Renderer, WaveformResult};
use crate::telemetry::LogManager;

/// Per-request ingestion options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestRequest {
    /// Overrides the rate for arrays and files. Must be unset for containers
    /// that carry their own rate.
    pub sample_rate: Option<f64>,
    pub start_channel: Option<isize>,
    pub end_channel: Option<isize>,
    /// Swap the sample and channel axes before slicing.
    pub transpose: bool,
    pub layout: LayoutHint,
}

/// Normalized, plot-ready frame handed to a [`Renderer`].
#[derive(Debug, Clone, PartialEq)]
pub struct IngestOutput {
    pub samples: Array2<f64>,
    pub time: Option<Array1<f64>>,
    pub sample_rate: Option<f64>,
    pub layout: FigureLayout,
}

impl IngestOutput {
    pub fn nchannels(&self) -> usize {
        self.samples.ncols()
    }

    /// The series drawn in subplot `row`.
    pub fn series(&self, row: usize) -> Option<ArrayView1<'_, f64>> {
        (row < self.samples.ncols()).then(|| self.samples.column(row))
    }
}

pub struct IngestPipeline {
    logger: LogManager,
}

impl IngestPipeline {
    pub fn new() -> Self {
        Self {
            logger: LogManager::new("ingest"),
        }
    }

    pub fn ingest<'a>(
        &self,
        source: impl Into<WaveformSource<'a>>,
        request: &IngestRequest,
    ) -> WaveformResult<IngestOutput> {
        let resolved = source.into().resolve(request.sample_rate, &self.logger)?;

        let (samples, names) = if request.transpose {
            (MatrixHelper::transpose(resolved.samples), None)
        } else {
            (resolved.samples, resolved.channel_names)
        };

        let time = match resolved.rate {
            Some(rate) if rate.is_finite() && rate > 0.0 => Some(Array1::from_shape_fn(
                samples.len_of(Axis(0)),
                |index| index as f64 / rate,
            )),
            Some(rate) => {
                self.logger
                    .caution(&format!("sampling rate {} cannot build a time axis", rate));
                None
            }
            None => None,
        };

        let columns =
            MatrixHelper::resolve_bounds(samples.ncols(), request.start_channel, request.end_channel);
        let selected =
            MatrixHelper::select_columns(samples.view(), request.start_channel, request.end_channel);
        if selected.ncols() == 0 {
            self.logger.caution(&format!(
                "channel selection {:?}..{:?} is empty",
                request.start_channel, request.end_channel
            ));
        }

        let titles = match names {
            Some(names) => names[columns].to_vec(),
            None => (1..=selected.ncols())
                .map(|n| format!("Channel {}", n))
                .collect(),
        };
        let layout = FigureLayout::for_channels(titles, &request.layout);

        self.logger.record(&format!(
            "normalized {} samples x {} channels, time axis {}",
            selected.nrows(),
            selected.ncols(),
            if time.is_some() { "present" } else { "absent" }
        ));

        Ok(IngestOutput {
            samples: selected,
            time,
            sample_rate: resolved.rate,
            layout,
        })
    }

    pub fn ingest_and_render<'a, R: Renderer>(
        &self,
        source: impl Into<WaveformSource<'a>>,
        request: &IngestRequest,
        renderer: &mut R,
    ) -> WaveformResult<R::Output> {
        let frame = self.ingest(source, request)?;
        renderer.render(&frame)
    }
}

impl Default for IngestPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Ingest with a default pipeline.
pub fn ingest<'a>(
    source: impl Into<WaveformSource<'a>>,
    request: &IngestRequest,
) -> WaveformResult<IngestOutput> {
    IngestPipeline::new().ingest(source, request)
}
