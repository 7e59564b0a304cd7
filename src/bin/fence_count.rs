//! fence-count - count virtual fence crossings in recorded tracker output

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use fence_counter::{
    CounterConfig, CountingPipeline, FenceCounts, FenceLine, JsonLinesSource, TrackSource,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// TOML file with `[[fence]]` entries and optional `retire_after_frames`.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Fence as x1,y1,x2,y2; repeat up to three times. Replaces config fences.
    #[arg(long = "fence", value_name = "X1,Y1,X2,Y2")]
    fences: Vec<FenceLine>,
    /// JSON-lines tracker output, one frame per line ("-" for stdin).
    #[arg(long, default_value = "-")]
    input: String,
    /// Forget tracks after this many frames without an observation.
    #[arg(long)]
    retire_after: Option<u64>,
    /// Only print the final counts instead of one report per frame.
    #[arg(long)]
    summary: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut cfg = match args.config.as_deref() {
        Some(path) => CounterConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => {
            let mut cfg = CounterConfig::default();
            cfg.apply_env()?;
            cfg
        }
    };
    if !args.fences.is_empty() {
        cfg.fences = args.fences.clone();
    }
    if let Some(frames) = args.retire_after {
        cfg.engine.retire_after_frames = Some(frames);
    }
    cfg.validate()?;

    if cfg.fences.is_empty() {
        log::warn!("no fences configured; no crossings will be counted");
    }

    let reader: Box<dyn BufRead> = if args.input == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file =
            File::open(&args.input).with_context(|| format!("open input {}", args.input))?;
        Box::new(BufReader::new(file))
    };

    let registry = cfg.fence_builder().build()?;
    let mut pipeline = CountingPipeline::new(JsonLinesSource::new(reader), registry, cfg.engine);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let counts = stream_reports(&mut pipeline, &mut out, args.summary)?;

    log::info!(
        "processed {} frame(s), {} track(s) flagged",
        pipeline.engine().frame_id(),
        pipeline.engine().trails().len()
    );
    for c in &counts {
        log::info!(
            "fence {}: forward={} backward={}",
            c.fence_id,
            c.forward,
            c.backward
        );
    }
    Ok(())
}

/// Write one JSON report per frame (or only the final counts with `summary`).
///
/// Stops at the first source or write error without draining the rest of the
/// input.
fn stream_reports<S, W>(
    pipeline: &mut CountingPipeline<S>,
    out: &mut W,
    summary: bool,
) -> Result<Vec<FenceCounts>>
where
    S: TrackSource,
    S::Error: std::error::Error + Send + Sync + 'static,
    W: Write,
{
    while let Some(report) = pipeline.process_next()? {
        if summary {
            continue;
        }
        serde_json::to_writer(&mut *out, &report)
            .with_context(|| format!("write report for frame {}", report.frame))?;
        out.write_all(b"\n")
            .with_context(|| format!("write report for frame {}", report.frame))?;
    }

    let counts = pipeline.engine().counts();
    if summary {
        serde_json::to_writer(&mut *out, &counts).context("write summary")?;
        out.write_all(b"\n").context("write summary")?;
    }
    out.flush().context("flush output")?;
    Ok(counts)
}
