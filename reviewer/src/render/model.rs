use physiocore::container::WaveformContainer;
use serde::{Deserialize, Serialize};

/// Per-subplot statistics produced by the text renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub title: String,
    pub samples: usize,
    pub duration_s: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Annotation counts for one container channel. Visible counts exclude points
/// inside reject ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationSummary {
    pub channel: String,
    pub peaks: usize,
    pub visible_peaks: usize,
    pub troughs: usize,
    pub visible_troughs: usize,
    pub reject_ranges: usize,
}

impl AnnotationSummary {
    pub fn from_container(container: &WaveformContainer) -> Vec<Self> {
        let peaks = container.peaks();
        let troughs = container.troughs();
        container
            .channel_names()
            .iter()
            .zip(peaks.iter().zip(&troughs))
            .zip(container.rejected())
            .map(|((name, (peaks, troughs)), reject)| AnnotationSummary {
                channel: name.clone(),
                peaks: peaks.len(),
                visible_peaks: peaks.visible().count(),
                troughs: troughs.len(),
                visible_troughs: troughs.visible().count(),
                reject_ranges: reject.len(),
            })
            .collect()
    }
}
