//! JSON persistence for a container and its annotations.
//!
//! Sessions are read as loosely-typed JSON and every field goes back through
//! [`WaveformContainer::new`], so a hand-edited file fails with the same
//! `Shape`/`Type` errors as an in-memory construction would.
//!
//! JSON has no non-finite numbers, so NaN and the infinities are written as
//! the strings `"NaN"`, `"inf"` and `"-inf"`. `null` also reads back as NaN.

use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::container::history::HistoryRecord;
use crate::container::metadata::{PointKind, PointMetadata, RejectRange};
use crate::container::waveform::{ContainerOptions, SampleRate, WaveformContainer};
use crate::prelude::{WaveformError, WaveformResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerSession {
    pub samples: Value,
    /// `[rows, columns]` of the saved matrix. Keeps empty recordings intact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_names: Option<Value>,
    #[serde(default)]
    pub history: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peaks: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub troughs: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reject: Option<Value>,
}

impl WaveformContainer {
    pub fn to_session(&self) -> WaveformResult<ContainerSession> {
        let samples = Value::Array(
            self.samples()
                .rows()
                .into_iter()
                .map(|row| Value::Array(row.iter().copied().map(number_to_value).collect()))
                .collect(),
        );
        let (nsamples, nchannels) = self.shape();

        Ok(ContainerSession {
            samples,
            shape: Some(to_json(&[nsamples, nchannels])?),
            sample_rate: self
                .sample_rate()
                .map(|rates| Value::Array(rates.iter().copied().map(number_to_value).collect())),
            channel_names: Some(to_json(self.channel_names())?),
            history: self
                .history()
                .iter()
                .map(to_json)
                .collect::<WaveformResult<_>>()?,
            peaks: Some(to_json(self.raw_points(PointKind::Peaks))?),
            troughs: Some(to_json(self.raw_points(PointKind::Troughs))?),
            reject: Some(to_json(self.rejected())?),
        })
    }

    pub fn from_session(session: &ContainerSession) -> WaveformResult<Self> {
        let mut samples = array_from_value(&session.samples)?;
        if let Some(shape) = &session.shape {
            samples = reshape_declared(samples, &shape_from_value(shape)?)?;
        }
        let sample_rate = session
            .sample_rate
            .as_ref()
            .map(rate_from_value)
            .transpose()?;
        let channel_names = session
            .channel_names
            .as_ref()
            .map(names_from_value)
            .transpose()?;
        let history = session
            .history
            .iter()
            .map(HistoryRecord::from_value)
            .collect::<WaveformResult<Vec<_>>>()?;

        let metadata = PointMetadata {
            peaks: session
                .peaks
                .as_ref()
                .map(|value| indices_from_value(PointKind::Peaks, value))
                .transpose()?,
            troughs: session
                .troughs
                .as_ref()
                .map(|value| indices_from_value(PointKind::Troughs, value))
                .transpose()?,
            reject: session
                .reject
                .as_ref()
                .map(ranges_from_value)
                .transpose()?,
        };

        let options = ContainerOptions {
            sample_rate,
            channel_names,
            history,
            metadata: Some(metadata),
        };
        WaveformContainer::new(&samples, &options)
    }

    pub fn save_session<P: AsRef<Path>>(&self, path: P) -> WaveformResult<()> {
        let path = path.as_ref();
        let contents = serde_json::to_string_pretty(&self.to_session()?)
            .map_err(|err| WaveformError::Parse(err.to_string()))?;
        fs::write(path, contents).map_err(|source| WaveformError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load_session<P: AsRef<Path>>(path: P) -> WaveformResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| WaveformError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let session: ContainerSession = serde_json::from_str(&contents)
            .map_err(|err| WaveformError::Parse(format!("{}: {}", path.display(), err)))?;
        Self::from_session(&session)
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> WaveformResult<Value> {
    serde_json::to_value(value).map_err(|err| WaveformError::Parse(err.to_string()))
}

fn number_to_value(value: f64) -> Value {
    if value.is_nan() {
        Value::from("NaN")
    } else if value.is_infinite() {
        Value::from(if value > 0.0 { "inf" } else { "-inf" })
    } else {
        Value::from(value)
    }
}

fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => Some(number.as_f64().unwrap_or(f64::NAN)),
        Value::Null => Some(f64::NAN),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "nan" => Some(f64::NAN),
            "inf" | "+inf" | "infinity" | "+infinity" => Some(f64::INFINITY),
            "-inf" | "-infinity" => Some(f64::NEG_INFINITY),
            _ => None,
        },
        _ => None,
    }
}

/// Walks nested JSON arrays, requiring a rectangular shape with numeric
/// leaves all at the same depth.
struct ArrayCollector {
    shape: Vec<usize>,
    leaf_depth: Option<usize>,
    flat: Vec<f64>,
}

impl ArrayCollector {
    fn visit(&mut self, value: &Value, depth: usize) -> WaveformResult<()> {
        match value {
            Value::Array(items) => {
                if self.leaf_depth.map_or(false, |leaf| depth >= leaf) {
                    return Err(WaveformError::Shape("samples are ragged".into()));
                }
                if depth == self.shape.len() {
                    self.shape.push(items.len());
                } else if self.shape[depth] != items.len() {
                    return Err(WaveformError::Shape(format!(
                        "samples are ragged: axis {} has lengths {} and {}",
                        depth,
                        self.shape[depth],
                        items.len()
                    )));
                }
                items.iter().try_for_each(|item| self.visit(item, depth + 1))
            }
            leaf => {
                let sample = number_from_value(leaf).ok_or_else(|| {
                    WaveformError::Type(format!("sample {} is not numeric", leaf))
                })?;
                match self.leaf_depth {
                    None if depth == self.shape.len() => self.leaf_depth = Some(depth),
                    Some(leaf_depth) if leaf_depth == depth => {}
                    _ => return Err(WaveformError::Shape("samples are ragged".into())),
                }
                self.flat.push(sample);
                Ok(())
            }
        }
    }
}

fn array_from_value(value: &Value) -> WaveformResult<ArrayD<f64>> {
    let mut collector = ArrayCollector {
        shape: Vec::new(),
        leaf_depth: None,
        flat: Vec::new(),
    };
    collector.visit(value, 0)?;
    ArrayD::from_shape_vec(IxDyn(&collector.shape), collector.flat)
        .map_err(|err| WaveformError::Shape(err.to_string()))
}

/// A declared shape wins over the nesting only when they agree, except that
/// an empty `samples` list takes the declared empty shape.
fn reshape_declared(samples: ArrayD<f64>, declared: &[usize]) -> WaveformResult<ArrayD<f64>> {
    if samples.shape() == declared {
        Ok(samples)
    } else if samples.is_empty() && declared.iter().product::<usize>() == 0 {
        Ok(ArrayD::zeros(IxDyn(declared)))
    } else {
        Err(WaveformError::Shape(format!(
            "samples have shape {:?} but the session declares {:?}",
            samples.shape(),
            declared
        )))
    }
}

fn shape_from_value(value: &Value) -> WaveformResult<Vec<usize>> {
    serde_json::from_value(value.clone()).map_err(|err| {
        WaveformError::Type(format!("shape {} must be a list of lengths: {}", value, err))
    })
}

fn rate_from_value(value: &Value) -> WaveformResult<SampleRate> {
    let not_numeric = |rate: &Value| WaveformError::Type(format!("sampling rate {} is not numeric", rate));
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Array(_) => Err(WaveformError::Shape(
                    "sampling rate must be a number or a 1D list".into(),
                )),
                other => number_from_value(other).ok_or_else(|| not_numeric(other)),
            })
            .collect::<WaveformResult<Vec<_>>>()
            .map(SampleRate::PerChannel),
        other => number_from_value(other)
            .map(SampleRate::Uniform)
            .ok_or_else(|| not_numeric(other)),
    }
}

/// Ranges that start before the recording are clamped to sample 0.
fn ranges_from_value(value: &Value) -> WaveformResult<Vec<Vec<RejectRange>>> {
    let ranges: Vec<Vec<(i64, i64)>> = serde_json::from_value(value.clone()).map_err(|err| {
        WaveformError::Type(format!("reject must be per-channel [start, end) pairs: {}", err))
    })?;
    let clamp = |bound: i64| usize::try_from(bound.max(0)).unwrap_or(usize::MAX);
    Ok(ranges
        .into_iter()
        .map(|channel| {
            channel
                .into_iter()
                .map(|(start, end)| RejectRange::new(clamp(start), clamp(end)))
                .collect()
        })
        .collect())
}

fn names_from_value(value: &Value) -> WaveformResult<Vec<String>> {
    let not_strings = || {
        WaveformError::Type(format!(
            "channel names {} must be a list of strings",
            value
        ))
    };
    value
        .as_array()
        .ok_or_else(not_strings)?
        .iter()
        .map(|name| name.as_str().map(str::to_string).ok_or_else(not_strings))
        .collect()
}

fn indices_from_value(kind: PointKind, value: &Value) -> WaveformResult<Vec<Vec<usize>>> {
    serde_json::from_value(value.clone()).map_err(|err| {
        WaveformError::Type(format!(
            "{} must be one list of sample indices per channel: {}",
            kind.label(),
            err
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use serde_json::json;
    use tempfile::NamedTempFile;

    fn annotated() -> WaveformContainer {
        let samples = Array2::from_shape_fn((40, 2), |(row, col)| (row + col) as f64);
        let options = ContainerOptions {
            sample_rate: Some(SampleRate::Uniform(50.0)),
            channel_names: Some(vec!["ecg".into(), "resp".into()]),
            history: vec![HistoryRecord::new("load").with_param("source", "bench")],
            metadata: None,
        };
        let mut container = WaveformContainer::new(&samples, &options).unwrap();
        container.replace_peaks(0, vec![5, 12, 20]).unwrap();
        container
            .replace_reject(0, vec![RejectRange::new(10, 15)])
            .unwrap();
        container
    }

    #[test]
    fn session_file_restores_annotations() {
        let container = annotated();
        let file = NamedTempFile::new().unwrap();
        container.save_session(file.path()).unwrap();

        let restored = WaveformContainer::load_session(file.path()).unwrap();
        assert_eq!(restored, container);
        assert_eq!(restored.peaks()[0].mask(), &[false, true, false]);
    }

    #[test]
    fn flat_samples_become_one_channel() {
        let session: ContainerSession =
            serde_json::from_value(json!({"samples": [1.0, 2.0, 3.0], "sample_rate": 4})).unwrap();
        let container = WaveformContainer::from_session(&session).unwrap();
        assert_eq!(container.shape(), (3, 1));
        assert_eq!(container.reference_rate(), Some(4.0));
    }

    #[test]
    fn non_numeric_samples_are_a_type_error() {
        let session: ContainerSession =
            serde_json::from_value(json!({"samples": [[1.0, "a"], [2.0, 3.0]]})).unwrap();
        let err = WaveformContainer::from_session(&session).unwrap_err();
        assert!(matches!(err, WaveformError::Type(_)));
    }

    #[test]
    fn deep_or_ragged_samples_are_a_shape_error() {
        for samples in [json!([[[1.0]]]), json!([[1.0, 2.0], [3.0]]), json!([1.0, [2.0]])] {
            let session: ContainerSession =
                serde_json::from_value(json!({ "samples": samples })).unwrap();
            let err = WaveformContainer::from_session(&session).unwrap_err();
            assert!(matches!(err, WaveformError::Shape(_)), "{:?}", err);
        }
    }

    #[test]
    fn malformed_history_and_names_are_type_errors() {
        let session: ContainerSession = serde_json::from_value(json!({
            "samples": [1.0, 2.0],
            "history": [["filter", {}, "extra"]]
        }))
        .unwrap();
        assert!(matches!(
            WaveformContainer::from_session(&session),
            Err(WaveformError::Type(_))
        ));

        let session: ContainerSession = serde_json::from_value(json!({
            "samples": [1.0, 2.0],
            "channel_names": [7]
        }))
        .unwrap();
        assert!(matches!(
            WaveformContainer::from_session(&session),
            Err(WaveformError::Type(_))
        ));
    }

    #[test]
    fn nested_rate_is_a_shape_error() {
        let session: ContainerSession =
            serde_json::from_value(json!({"samples": [1.0, 2.0], "sample_rate": [[1.0]]})).unwrap();
        assert!(matches!(
            WaveformContainer::from_session(&session),
            Err(WaveformError::Shape(_))
        ));
    }

    fn reload(container: &WaveformContainer) -> WaveformContainer {
        let file = NamedTempFile::new().unwrap();
        container.save_session(file.path()).unwrap();
        WaveformContainer::load_session(file.path()).unwrap()
    }

    fn with_rate(rate: SampleRate) -> WaveformContainer {
        let options = ContainerOptions {
            sample_rate: Some(rate),
            ..ContainerOptions::default()
        };
        WaveformContainer::new(&Array2::<f64>::zeros((4, 2)), &options).unwrap()
    }

    #[test]
    fn non_finite_rates_survive_a_reload() {
        let restored = reload(&with_rate(SampleRate::Uniform(f64::NAN)));
        let rates = restored.sample_rate().unwrap();
        assert_eq!(rates.len(), 2);
        assert!(rates.iter().all(|rate| rate.is_nan()));

        let restored = reload(&with_rate(SampleRate::PerChannel(vec![f64::INFINITY, f64::NEG_INFINITY])));
        assert_eq!(
            restored.sample_rate().unwrap().to_vec(),
            vec![f64::INFINITY, f64::NEG_INFINITY]
        );
    }

    #[test]
    fn non_finite_samples_survive_a_reload() {
        let samples = ndarray::arr2(&[[f64::INFINITY, 1.0], [f64::NAN, f64::NEG_INFINITY]]);
        let container = WaveformContainer::new(&samples, &ContainerOptions::default()).unwrap();

        let session = container.to_session().unwrap();
        assert_eq!(session.samples, json!([["inf", 1.0], ["NaN", "-inf"]]));

        let restored = reload(&container);
        assert_eq!(restored[[0, 0]], f64::INFINITY);
        assert_eq!(restored[[0, 1]], 1.0);
        assert!(restored[[1, 0]].is_nan());
        assert_eq!(restored[[1, 1]], f64::NEG_INFINITY);
    }

    #[test]
    fn null_and_spelled_out_values_read_as_numbers() {
        let session: ContainerSession = serde_json::from_value(json!({
            "samples": [[null, "Infinity"], ["nan", 2.0]],
            "sample_rate": null
        }))
        .unwrap();
        // `"sample_rate": null` deserializes as an absent rate
        let container = WaveformContainer::from_session(&session).unwrap();
        assert!(container.sample_rate().is_none());
        assert!(container[[0, 0]].is_nan());
        assert_eq!(container[[0, 1]], f64::INFINITY);

        let session: ContainerSession =
            serde_json::from_value(json!({"samples": [1.0, 2.0], "sample_rate": [null, "-inf"]})).unwrap();
        let container = WaveformContainer::from_session(&session);
        // one channel, two rates
        assert!(matches!(container, Err(WaveformError::Shape(_))));

        let session: ContainerSession =
            serde_json::from_value(json!({"samples": [[1.0, 2.0]], "sample_rate": [null, "-inf"]})).unwrap();
        let rates = WaveformContainer::from_session(&session).unwrap().sample_rate().unwrap().to_vec();
        assert!(rates[0].is_nan());
        assert_eq!(rates[1], f64::NEG_INFINITY);
    }

    #[test]
    fn empty_recording_keeps_its_channels() {
        let options = ContainerOptions {
            sample_rate: Some(SampleRate::Uniform(10.0)),
            channel_names: Some(vec!["ecg".into(), "resp".into()]),
            ..ContainerOptions::default()
        };
        let container = WaveformContainer::new(&Array2::<f64>::zeros((0, 2)), &options).unwrap();
        assert_eq!(container.to_session().unwrap().shape, Some(json!([0, 2])));

        let restored = reload(&container);
        assert_eq!(restored.shape(), (0, 2));
        assert_eq!(restored.channel_names(), &["ecg".to_string(), "resp".to_string()]);
        assert_eq!(restored, container);
    }

    #[test]
    fn declared_shape_must_match_the_samples() {
        let session: ContainerSession =
            serde_json::from_value(json!({"samples": [[1.0, 2.0]], "shape": [2, 1]})).unwrap();
        assert!(matches!(
            WaveformContainer::from_session(&session),
            Err(WaveformError::Shape(_))
        ));

        let session: ContainerSession =
            serde_json::from_value(json!({"samples": [[1.0, 2.0]], "shape": "wide"})).unwrap();
        assert!(matches!(
            WaveformContainer::from_session(&session),
            Err(WaveformError::Type(_))
        ));
    }

    #[test]
    fn differing_channel_rates_survive_a_reload() {
        let restored = reload(&with_rate(SampleRate::PerChannel(vec![100.0, 25.0])));
        assert_eq!(restored.sample_rate().unwrap().to_vec(), vec![100.0, 25.0]);
        assert_eq!(restored.reference_rate(), Some(100.0));
    }

    #[test]
    fn reject_ranges_before_the_first_sample_are_clamped() {
        let session: ContainerSession = serde_json::from_value(json!({
            "samples": [1.0, 2.0, 3.0, 4.0, 5.0],
            "peaks": [[0, 2, 4]],
            "reject": [[[-5, 3], [-4, -1]]]
        }))
        .unwrap();
        let container = WaveformContainer::from_session(&session).unwrap();
        assert_eq!(
            container.rejected()[0],
            vec![RejectRange::new(0, 3), RejectRange::new(0, 0)]
        );
        assert_eq!(container.peaks()[0].mask(), &[true, true, false]);
    }

    #[test]
    fn missing_session_file_is_an_io_error() {
        let err = WaveformContainer::load_session("/nonexistent/session.json").unwrap_err();
        assert!(matches!(err, WaveformError::Io { .. }));
    }
}
