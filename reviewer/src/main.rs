use anyhow::{bail, Context};
use clap::Parser;
use generator::profile::GeneratorConfig;
use std::path::PathBuf;
use workflow::config::ReviewConfig;
use workflow::runner::{ReviewInput, Runner};

mod generator;
mod render;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Review annotated physiological recordings")]
struct Args {
    /// Delimited text recording (.csv, .tsv or whitespace separated, optionally .gz)
    input: Option<PathBuf>,
    /// Load a saved review session (JSON) instead of a text recording
    #[arg(long)]
    session: Option<PathBuf>,
    /// Review a generated recording instead of a file
    #[arg(long, default_value_t = false)]
    synthetic: bool,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Load ingestion options from YAML; replaces the flags below
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    sample_rate: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    start_channel: Option<isize>,
    #[arg(long, allow_hyphen_values = true)]
    end_channel: Option<isize>,
    /// Treat rows as channels
    #[arg(long, default_value_t = false)]
    transpose: bool,
    #[arg(long)]
    width: Option<f64>,
    #[arg(long)]
    height: Option<f64>,
    /// Write the reviewed container and its annotations to a session file
    #[arg(long)]
    save_session: Option<PathBuf>,
    /// Print the summary as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let review_config = if let Some(path) = &args.config {
        ReviewConfig::load(path)?
    } else {
        ReviewConfig {
            sample_rate: args.sample_rate,
            start_channel: args.start_channel,
            end_channel: args.end_channel,
            transpose: args.transpose,
            width: args.width,
            height: args.height,
        }
    };

    let input = if let Some(path) = args.session.clone() {
        ReviewInput::Session(path)
    } else if args.synthetic {
        ReviewInput::Synthetic(GeneratorConfig {
            seed: args.seed,
            ..Default::default()
        })
    } else if let Some(path) = args.input.clone() {
        ReviewInput::File(path)
    } else {
        bail!("nothing to review: pass a recording path, --session or --synthetic");
    };

    let runner = Runner::new(review_config);
    let result = runner.execute(&input)?;

    if args.json {
        let report = serde_json::json!({
            "figure": { "width": result.figure.0, "height": result.figure.1 },
            "channels": result.channels,
            "annotations": result.annotations,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("encoding summary")?
        );
    } else {
        println!(
            "{} -> figure {:.1} x {:.1}",
            result.container, result.figure.0, result.figure.1
        );
        for channel in &result.channels {
            println!(
                "  {:<16} n={:<8} min={:<10.4} max={:<10.4} mean={:.4}",
                channel.title, channel.samples, channel.min, channel.max, channel.mean
            );
        }
        for annotation in &result.annotations {
            println!(
                "  {:<16} peaks {}/{} troughs {}/{} reject ranges {}",
                annotation.channel,
                annotation.visible_peaks,
                annotation.peaks,
                annotation.visible_troughs,
                annotation.troughs,
                annotation.reject_ranges
            );
        }
    }

    if let Some(path) = &args.save_session {
        result
            .container
            .save_session(path)
            .with_context(|| format!("saving session {}", path.display()))?;
        println!("Session written to {}", path.display());
    }

    Ok(())
}
