use anyhow::Context;
use physiocore::ingest::{IngestRequest, LayoutHint};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    pub sample_rate: Option<f64>,
    pub start_channel: Option<isize>,
    pub end_channel: Option<isize>,
    pub transpose: bool,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl ReviewConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading review config {}", path_ref.display()))?;
        let config: ReviewConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing review config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn to_request(&self) -> IngestRequest {
        IngestRequest {
            sample_rate: self.sample_rate,
            start_channel: self.start_channel,
            end_channel: self.end_channel,
            transpose: self.transpose,
            layout: LayoutHint {
                width: self.width,
                height: self.height,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_produces_ingest_request() {
        let cfg = ReviewConfig {
            sample_rate: Some(250.0),
            start_channel: Some(1),
            width: Some(12.0),
            ..Default::default()
        };
        let request = cfg.to_request();
        assert_eq!(request.sample_rate, Some(250.0));
        assert_eq!(request.start_channel, Some(1));
        assert_eq!(request.layout.width, Some(12.0));
        assert!(request.layout.height.is_none());
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"sample_rate: 100.0\nend_channel: -1\ntranspose: true\n")
            .unwrap();
        let path = temp.into_temp_path();
        let cfg = ReviewConfig::load(&path).unwrap();
        assert_eq!(cfg.sample_rate, Some(100.0));
        assert_eq!(cfg.end_channel, Some(-1));
        assert!(cfg.transpose);
        assert!(cfg.start_channel.is_none());
    }
}
