use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::prelude::{WaveformError, WaveformResult};

pub type HistoryParams = BTreeMap<String, Value>;

/// One audit-log entry: the name of a transformation and its parameters.
///
/// Serialized as a fixed two-element array `[operation, {parameters}]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord(String, HistoryParams);

impl HistoryRecord {
    pub fn new(operation: impl Into<String>) -> Self {
        Self(operation.into(), HistoryParams::new())
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.1.insert(key.into(), value.into());
        self
    }

    pub fn operation(&self) -> &str {
        &self.0
    }

    pub fn parameters(&self) -> &HistoryParams {
        &self.1
    }

    /// Parse a loosely-typed record, rejecting anything that is not a
    /// `[name, {params}]` pair.
    pub fn from_value(value: &Value) -> WaveformResult<Self> {
        let pair = value
            .as_array()
            .filter(|items| items.len() == 2)
            .ok_or_else(|| {
                WaveformError::Type(format!("history record {} must be a [name, params] pair", value))
            })?;
        let operation = pair[0].as_str().ok_or_else(|| {
            WaveformError::Type(format!("history operation {} must be a string", pair[0]))
        })?;
        let parameters: HistoryParams = match &pair[1] {
            Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            Value::Null => HistoryParams::new(),
            other => {
                return Err(WaveformError::Type(format!(
                    "history parameters {} must be an object",
                    other
                )))
            }
        };
        Ok(Self(operation.to_string(), parameters))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_serializes_as_pair() {
        let record = HistoryRecord::new("filter").with_param("cutoff", 1.5);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, json!(["filter", {"cutoff": 1.5}]));
    }

    #[test]
    fn from_value_accepts_pairs() {
        let record = HistoryRecord::from_value(&json!(["detect_peaks", {"threshold": 0.2}])).unwrap();
        assert_eq!(record.operation(), "detect_peaks");
        assert_eq!(record.parameters()["threshold"], json!(0.2));
    }

    #[test]
    fn from_value_rejects_other_arity() {
        let err = HistoryRecord::from_value(&json!(["a", {}, 3])).unwrap_err();
        assert!(matches!(err, WaveformError::Type(_)));
        assert!(HistoryRecord::from_value(&json!("filter")).is_err());
        assert!(HistoryRecord::from_value(&json!([1, {}])).is_err());
    }
}
