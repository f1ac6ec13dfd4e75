use ndarray::{Array1, Array2, ArrayView, ArrayView1, ArrayView2, AsArray, Axis, Dimension};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

use crate::container::history::HistoryRecord;
use crate::container::metadata::{Annotations, MaskedPoints, PointKind, PointMetadata, RejectRange};
use crate::math::MatrixHelper;
use crate::prelude::{DetectionParams, PointDetector, WaveformError, WaveformResult};

/// Sampling rate as supplied by the caller: one value for every channel or one
/// value per channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleRate {
    Uniform(f64),
    PerChannel(Vec<f64>),
}

impl From<f64> for SampleRate {
    fn from(rate: f64) -> Self {
        SampleRate::Uniform(rate)
    }
}

impl From<Vec<f64>> for SampleRate {
    fn from(rates: Vec<f64>) -> Self {
        SampleRate::PerChannel(rates)
    }
}

impl SampleRate {
    fn broadcast(&self, nchannels: usize) -> WaveformResult<Array1<f64>> {
        match self {
            SampleRate::Uniform(rate) => Ok(Array1::from_elem(nchannels, *rate)),
            SampleRate::PerChannel(rates) if rates.len() == nchannels => {
                Ok(Array1::from(rates.clone()))
            }
            SampleRate::PerChannel(rates) => Err(WaveformError::Shape(format!(
                "sampling rate must be a number or have one entry per channel ({} given for {} channels)",
                rates.len(),
                nchannels
            ))),
        }
    }
}

/// Optional construction inputs. Everything is copied into the container.
#[derive(Debug, Clone, Default)]
pub struct ContainerOptions {
    pub sample_rate: Option<SampleRate>,
    pub channel_names: Option<Vec<String>>,
    pub history: Vec<HistoryRecord>,
    pub metadata: Option<PointMetadata>,
}

/// Multi-channel physiological recording with its detected points and
/// artefact annotations.
///
/// `samples` is stored as (n_samples, n_channels). The matrix, rates, names and
/// history are read-only once built; peaks, troughs and reject ranges are
/// replaced a whole channel at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformContainer {
    samples: Array2<f64>,
    sample_rate: Option<Array1<f64>>,
    channel_names: Vec<String>,
    history: Vec<HistoryRecord>,
    annotations: Annotations,
}

impl WaveformContainer {
    pub fn new<'a, V, D>(samples: V, options: &ContainerOptions) -> WaveformResult<Self>
    where
        V: AsArray<'a, f64, D>,
        D: Dimension,
    {
        let view: ArrayView<'a, f64, D> = samples.into();
        let samples = MatrixHelper::promote(view.into_dyn())?;
        let (nsamples, nchannels) = samples.dim();

        let sample_rate = options
            .sample_rate
            .as_ref()
            .map(|rate| rate.broadcast(nchannels))
            .transpose()?;

        let channel_names = match &options.channel_names {
            None => (0..nchannels).map(|index| format!("ch{}", index)).collect(),
            Some(names) if names.len() == nchannels => names.clone(),
            Some(names) => {
                return Err(WaveformError::Type(format!(
                    "channel names must be a list of {} strings, got {}",
                    nchannels,
                    names.len()
                )))
            }
        };

        let mut annotations = Annotations::empty(nchannels);
        if let Some(metadata) = &options.metadata {
            for (kind, supplied) in [
                (PointKind::Peaks, &metadata.peaks),
                (PointKind::Troughs, &metadata.troughs),
            ] {
                if let Some(per_channel) = supplied {
                    check_channel_count(kind.label(), per_channel.len(), nchannels)?;
                    for (channel, indices) in per_channel.iter().enumerate() {
                        check_domain(kind, channel, indices, nsamples)?;
                    }
                    *annotations.points_mut(kind) = per_channel.clone();
                }
            }
            if let Some(reject) = &metadata.reject {
                check_channel_count("reject", reject.len(), nchannels)?;
                annotations.reject = reject.clone();
            }
        }

        Ok(Self {
            samples,
            sample_rate,
            channel_names,
            history: options.history.clone(),
            annotations,
        })
    }

    pub fn samples(&self) -> ArrayView2<'_, f64> {
        self.samples.view()
    }

    /// Per-channel sampling rates, `None` when the recording carries no rate.
    pub fn sample_rate(&self) -> Option<ArrayView1<'_, f64>> {
        self.sample_rate.as_ref().map(|rates| rates.view())
    }

    /// The rate of the first channel, used where a single time base is needed.
    pub fn reference_rate(&self) -> Option<f64> {
        self.sample_rate
            .as_ref()
            .and_then(|rates| rates.get(0).copied())
    }

    pub fn channel_names(&self) -> &[String] {
        &self.channel_names
    }

    pub fn history(&self) -> &[HistoryRecord] {
        &self.history
    }

    pub fn nsamples(&self) -> usize {
        self.samples.nrows()
    }

    pub fn nchannels(&self) -> usize {
        self.samples.ncols()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.samples.dim()
    }

    pub fn ndim(&self) -> usize {
        self.samples.ndim()
    }

    pub fn len(&self) -> usize {
        self.nsamples()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn channel(&self, index: usize) -> WaveformResult<ArrayView1<'_, f64>> {
        self.check_channel(index)?;
        Ok(self.samples.column(index))
    }

    /// Detected peaks per channel, masked where they fall in a reject range.
    pub fn peaks(&self) -> Vec<MaskedPoints> {
        self.annotations.masked(PointKind::Peaks)
    }

    /// Detected troughs per channel, masked where they fall in a reject range.
    pub fn troughs(&self) -> Vec<MaskedPoints> {
        self.annotations.masked(PointKind::Troughs)
    }

    pub fn points(&self, kind: PointKind) -> Vec<MaskedPoints> {
        self.annotations.masked(kind)
    }

    /// Unmasked detections, exactly as stored.
    pub fn raw_points(&self, kind: PointKind) -> &[Vec<usize>] {
        self.annotations.points(kind)
    }

    pub fn rejected(&self) -> &[Vec<RejectRange>] {
        &self.annotations.reject
    }

    pub fn replace_points(
        &mut self,
        kind: PointKind,
        channel: usize,
        indices: Vec<usize>,
    ) -> WaveformResult<()> {
        self.check_channel(channel)?;
        check_domain(kind, channel, &indices, self.nsamples())?;
        self.annotations.points_mut(kind)[channel] = indices;
        Ok(())
    }

    pub fn replace_peaks(&mut self, channel: usize, indices: Vec<usize>) -> WaveformResult<()> {
        self.replace_points(PointKind::Peaks, channel, indices)
    }

    pub fn replace_troughs(&mut self, channel: usize, indices: Vec<usize>) -> WaveformResult<()> {
        self.replace_points(PointKind::Troughs, channel, indices)
    }

    pub fn replace_reject(
        &mut self,
        channel: usize,
        ranges: Vec<RejectRange>,
    ) -> WaveformResult<()> {
        self.check_channel(channel)?;
        self.annotations.reject[channel] = ranges;
        Ok(())
    }

    pub fn record(&mut self, record: HistoryRecord) {
        self.history.push(record);
    }

    /// Run `detector` over every channel and store its output as the raw
    /// point set for `kind`. Nothing is stored if any channel fails the
    /// index-domain check.
    pub fn apply_detector<P>(
        &mut self,
        detector: &P,
        params: &DetectionParams,
        kind: PointKind,
    ) -> WaveformResult<()>
    where
        P: PointDetector + ?Sized,
    {
        let nsamples = self.nsamples();
        let mut detected = Vec::with_capacity(self.nchannels());
        for (channel, column) in self.samples.axis_iter(Axis(1)).enumerate() {
            let indices = detector.detect(column, params);
            check_domain(kind, channel, &indices, nsamples)?;
            detected.push(indices);
        }

        *self.annotations.points_mut(kind) = detected;
        self.record(
            HistoryRecord::new(kind.detection_operation())
                .with_param("threshold", params.threshold)
                .with_param("min_distance", params.min_distance),
        );
        Ok(())
    }

    fn check_channel(&self, index: usize) -> WaveformResult<()> {
        if index < self.nchannels() {
            Ok(())
        } else {
            Err(WaveformError::Channel {
                index,
                nchannels: self.nchannels(),
            })
        }
    }
}

fn check_channel_count(label: &str, supplied: usize, nchannels: usize) -> WaveformResult<()> {
    if supplied == nchannels {
        Ok(())
    } else {
        Err(WaveformError::Shape(format!(
            "{} must have one entry per channel ({} given for {} channels)",
            label, supplied, nchannels
        )))
    }
}

fn check_domain(
    kind: PointKind,
    channel: usize,
    indices: &[usize],
    nsamples: usize,
) -> WaveformResult<()> {
    match indices.iter().find(|&&index| index >= nsamples) {
        Some(index) => Err(WaveformError::Shape(format!(
            "{} index {} in channel {} is outside [0, {})",
            kind.label(),
            index,
            channel,
            nsamples
        ))),
        None => Ok(()),
    }
}

impl Index<[usize; 2]> for WaveformContainer {
    type Output = f64;

    fn index(&self, index: [usize; 2]) -> &f64 {
        &self.samples[index]
    }
}

impl<'a> From<&'a WaveformContainer> for ArrayView2<'a, f64> {
    fn from(container: &'a WaveformContainer) -> Self {
        container.samples.view()
    }
}

impl fmt::Display for WaveformContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sample_rate {
            Some(rates) => write!(
                f,
                "WaveformContainer(size={}, fs={})",
                self.samples.len(),
                rates
            ),
            None => write!(f, "WaveformContainer(size={}, fs=None)", self.samples.len()),
        }
    }
}
