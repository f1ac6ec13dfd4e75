use crate::generator::profile::{build_recording, GeneratorConfig};
use crate::render::model::{AnnotationSummary, ChannelSummary};
use crate::render::summary::SummaryRenderer;
use crate::workflow::config::ReviewConfig;
use anyhow::Context;
use log::info;
use physiocore::container::{ContainerOptions, HistoryRecord, SampleRate, WaveformContainer};
use physiocore::ingest::IngestPipeline;
use physiocore::prelude::Renderer;
use std::path::PathBuf;

/// Where a review session gets its recording from.
#[derive(Debug, Clone)]
pub enum ReviewInput {
    File(PathBuf),
    Session(PathBuf),
    Synthetic(GeneratorConfig),
}

pub struct ReviewResult {
    pub container: WaveformContainer,
    pub channels: Vec<ChannelSummary>,
    pub annotations: Vec<AnnotationSummary>,
    pub figure: (f64, f64),
}

#[derive(Clone)]
pub struct Runner {
    config: ReviewConfig,
}

impl Runner {
    pub fn new(config: ReviewConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self, input: &ReviewInput) -> anyhow::Result<ReviewResult> {
        let request = self.config.to_request();
        let pipeline = IngestPipeline::new();
        let mut renderer = SummaryRenderer::new();

        let (container, frame) = match input {
            ReviewInput::File(path) => {
                let frame = pipeline
                    .ingest(path.as_path(), &request)
                    .with_context(|| format!("ingesting {}", path.display()))?;
                let options = ContainerOptions {
                    sample_rate: frame.sample_rate.map(SampleRate::Uniform),
                    channel_names: Some(
                        frame
                            .layout
                            .slots
                            .iter()
                            .map(|slot| slot.title.clone())
                            .collect(),
                    ),
                    history: vec![HistoryRecord::new("ingest")
                        .with_param("source", path.display().to_string())
                        .with_param("transpose", request.transpose)],
                    metadata: None,
                };
                let container = WaveformContainer::new(&frame.samples, &options)
                    .context("wrapping ingested recording")?;
                (container, frame)
            }
            ReviewInput::Session(path) => {
                let container = WaveformContainer::load_session(path)
                    .with_context(|| format!("loading session {}", path.display()))?;
                let frame = pipeline
                    .ingest(&container, &request)
                    .context("ingesting session recording")?;
                (container, frame)
            }
            ReviewInput::Synthetic(generator) => {
                let container = build_recording(generator)?;
                let frame = pipeline
                    .ingest(&container, &request)
                    .context("ingesting synthetic recording")?;
                (container, frame)
            }
        };

        let channels = renderer
            .render(&frame)
            .context("summarizing normalized frame")?;
        let annotations = AnnotationSummary::from_container(&container);
        info!(
            "reviewed {} with {} plotted channels over {} frame(s)",
            container,
            channels.len(),
            renderer.frames()
        );

        Ok(ReviewResult {
            container,
            channels,
            annotations,
            figure: (frame.layout.width, frame.layout.height),
        })
    }
}
