// src/main.rs
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use signspeak::{Classifier, FrameSample, HandPose, Keypoint, LetterAccumulator, SessionExporter};
use std::path::PathBuf;
use tracing::{debug, info};

/// One detected hand per frame, as emitted by the external hand-pose
/// detector. An empty keypoint list means no hand was found.
#[derive(Debug, Deserialize)]
struct FrameInput {
    #[serde(default)]
    keypoints: Vec<Keypoint>,
}

struct Args {
    input: PathBuf,
    fps: f64,
    output_dir: Option<PathBuf>,
    session_name: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut input = None;
    let mut fps = 30.0;
    let mut output_dir = None;
    let mut session_name = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--fps" => {
                let value = args.next().context("--fps requires a value")?;
                fps = value.parse().context("--fps expects a number")?;
                if fps <= 0.0 {
                    bail!("--fps must be positive");
                }
            }
            "--out" => {
                output_dir = Some(PathBuf::from(
                    args.next().context("--out requires a directory")?,
                ));
            }
            "--session" => {
                session_name = Some(args.next().context("--session requires a name")?);
            }
            "--help" | "-h" => {
                eprintln!("Usage: signspeak <frames.json> [--fps N] [--out DIR] [--session NAME]");
                std::process::exit(0);
            }
            other if input.is_none() && !other.starts_with('-') => {
                input = Some(PathBuf::from(other));
            }
            other => bail!("unexpected argument: {}", other),
        }
    }

    Ok(Args {
        input: input.context("missing input file; see --help")?,
        fps,
        output_dir,
        session_name,
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = parse_args()?;

    let data = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let frames: Vec<FrameInput> =
        serde_json::from_str(&data).context("parsing frame keypoints")?;
    info!(frames = frames.len(), fps = args.fps, "loaded frame sequence");

    let classifier = Classifier::new();
    let mut accumulator = LetterAccumulator::new();
    let mut exporter = args
        .output_dir
        .as_ref()
        .map(|dir| SessionExporter::new(dir, args.session_name.clone()));

    for (i, frame) in frames.iter().enumerate() {
        let timestamp = i as f64 / args.fps;

        let sample = match HandPose::try_new(frame.keypoints.clone()) {
            Ok(pose) => {
                let letter = classifier.classify(&pose);
                let committed = accumulator.push(letter, timestamp);
                if let Some(letter) = committed {
                    println!("[{:7.3}s] {}", timestamp, letter);
                }
                debug!(frame = i, letter = ?letter, "classified frame");
                FrameSample::detected(
                    timestamp,
                    &pose,
                    classifier.finger_state(&pose),
                    letter,
                    committed,
                )
            }
            Err(_) => {
                accumulator.push(None, timestamp);
                FrameSample::missed(timestamp)
            }
        };

        if let Some(exporter) = exporter.as_mut() {
            exporter.add_sample(sample);
        }
    }

    println!("\nTranscript: {}", accumulator.text());

    if let Some(exporter) = &exporter {
        let csv_path = exporter.export_csv()?;
        let report_path = exporter.generate_report(accumulator.text())?;
        info!(session = exporter.session_name(), "session exported");
        println!("CSV:    {}", csv_path.display());
        println!("Report: {}", report_path.display());
    }

    Ok(())
}
