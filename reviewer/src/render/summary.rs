use log::debug;
use ndarray::ArrayView1;
use physiocore::ingest::IngestOutput;
use physiocore::prelude::{Renderer, WaveformResult};

use crate::render::model::ChannelSummary;

/// Renderer that reduces every subplot to summary statistics instead of
/// drawing it.
#[derive(Debug, Default)]
pub struct SummaryRenderer {
    frames: usize,
}

impl SummaryRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> usize {
        self.frames
    }
}

fn summarize(title: &str, series: ArrayView1<'_, f64>, rate: Option<f64>) -> ChannelSummary {
    let finite: Vec<f64> = series.iter().copied().filter(|v| v.is_finite()).collect();
    let (min, max, mean) = if finite.is_empty() {
        (f64::NAN, f64::NAN, f64::NAN)
    } else {
        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = finite.iter().sum::<f64>() / finite.len() as f64;
        (min, max, mean)
    };

    ChannelSummary {
        title: title.to_string(),
        samples: series.len(),
        duration_s: rate
            .filter(|rate| rate.is_finite() && *rate > 0.0)
            .map(|rate| series.len() as f64 / rate),
        min,
        max,
        mean,
    }
}

impl Renderer for SummaryRenderer {
    type Output = Vec<ChannelSummary>;

    fn render(&mut self, frame: &IngestOutput) -> WaveformResult<Self::Output> {
        self.frames += 1;
        debug!(
            "summarizing {} subplots in a {:.1} x {:.1} figure",
            frame.layout.rows(),
            frame.layout.width,
            frame.layout.height
        );
        Ok(frame
            .layout
            .slots
            .iter()
            .filter_map(|slot| {
                frame
                    .series(slot.row)
                    .map(|series| summarize(&slot.title, series, frame.sample_rate))
            })
            .collect())
    }
}
