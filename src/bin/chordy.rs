use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use chordy::analysis::{AnalysisParams, Chord, ChordAnalyzer};
use chordy::audio::wav::read_wav;
use chordy::testing::signals::ToneSource;
use chordy::{ChordPipeline, PipelineConfig};
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "chordy", about = "Real-time major/minor triad detection")]
struct Cli {
    /// JSON configuration file (defaults are used when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Override the number of octaves multiplied into each chroma bin
    #[arg(long, global = true)]
    octaves: Option<usize>,
    /// Override the detection threshold
    #[arg(long, global = true)]
    threshold: Option<f32>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze the last window of a WAV file and print the result as JSON
    Analyze {
        wav: PathBuf,
        /// Exit with status 2 unless this label is detected (e.g. "C Maj")
        #[arg(long)]
        expect: Option<String>,
    },
    /// Stream a WAV file through the full pipeline, printing chord changes
    Replay {
        wav: PathBuf,
        /// Pace frames at the file's sample rate instead of as fast as possible
        #[arg(long)]
        realtime: bool,
    },
    /// Synthesize a triad and stream it through the pipeline
    Demo {
        #[arg(long, default_value = "C")]
        root: String,
        #[arg(long, default_value = "maj")]
        quality: String,
        #[arg(long, default_value_t = 1.0)]
        seconds: f32,
        #[arg(long)]
        realtime: bool,
    },
    /// Print the effective configuration as JSON
    Config,
    /// Detect chords from the default input device
    #[cfg(feature = "live-capture")]
    Live {
        /// Stop after this many seconds (runs until interrupted when omitted)
        #[arg(long)]
        seconds: Option<f32>,
    },
}

#[derive(Serialize)]
struct ChordChange<'a> {
    time_s: f64,
    chord: &'a str,
    confidence: f32,
}

fn main() -> ExitCode {
    chordy::init_logging();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Analyze { wav, expect } => run_analyze(config, &wav, expect.as_deref()),
        Commands::Replay { wav, realtime } => run_replay(config, &wav, realtime),
        Commands::Demo {
            root,
            quality,
            seconds,
            realtime,
        } => run_demo(config, &root, &quality, seconds, realtime),
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(ExitCode::from(0))
        }
        #[cfg(feature = "live-capture")]
        Commands::Live { seconds } => run_live(config, seconds),
    }
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::try_load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(octaves) = cli.octaves {
        config.octave_count = octaves;
    }
    if let Some(threshold) = cli.threshold {
        config.detection_threshold = threshold;
    }
    Ok(config)
}

fn run_analyze(mut config: PipelineConfig, path: &Path, expect: Option<&str>) -> Result<ExitCode> {
    let (samples, sample_rate) = read_wav(path)?;
    config.sample_rate = sample_rate;
    config.validate()?;

    // Last n samples, zero-padded at the front for short files
    let n = config.analysis_frame_count;
    let mut window = vec![0.0; n];
    let take = samples.len().min(n);
    window[n - take..].copy_from_slice(&samples[samples.len() - take..]);

    let mut analyzer = ChordAnalyzer::new(n, sample_rate)?;
    let result = analyzer.analyze(
        &window,
        AnalysisParams {
            octave_count: config.octave_count,
            detection_threshold: config.detection_threshold,
        },
    )?;
    println!("{}", serde_json::to_string_pretty(&*result)?);

    Ok(match expect {
        Some(label) if label != result.chord_label => {
            eprintln!("Expected {}, detected {}", label, result.chord_label);
            ExitCode::from(2)
        }
        _ => ExitCode::from(0),
    })
}

fn run_replay(mut config: PipelineConfig, path: &Path, realtime: bool) -> Result<ExitCode> {
    let (samples, sample_rate) = read_wav(path)?;
    config.sample_rate = sample_rate;

    let mut position = 0;
    stream_through_pipeline(config, samples.len(), realtime, |frame| {
        let end = (position + frame.len()).min(samples.len());
        let chunk = &samples[position..end];
        frame[..chunk.len()].copy_from_slice(chunk);
        frame[chunk.len()..].fill(0.0);
        position = end;
    })?;
    Ok(ExitCode::from(0))
}

fn run_demo(
    config: PipelineConfig,
    root: &str,
    quality: &str,
    seconds: f32,
    realtime: bool,
) -> Result<ExitCode> {
    let chord: Chord = format!("{} {}", root, quality).parse()?;
    if seconds.is_nan() || seconds <= 0.0 {
        bail!("--seconds must be positive");
    }

    let total = (seconds * config.sample_rate as f32) as usize;
    let mut source = ToneSource::for_chord(chord, config.sample_rate);
    let detected = stream_through_pipeline(config, total, realtime, |frame| source.fill(frame))?;

    if detected == chord.label() {
        Ok(ExitCode::from(0))
    } else {
        eprintln!("Synthesized {}, detected {}", chord, detected);
        Ok(ExitCode::from(2))
    }
}

/// Push `total` samples through a pipeline one frame at a time, printing
/// every chord change as a JSON line. Returns the final label.
///
/// Without `realtime`, each window is analyzed before the next frame is
/// pushed, so output does not depend on machine speed.
fn stream_through_pipeline(
    config: PipelineConfig,
    total: usize,
    realtime: bool,
    mut fill: impl FnMut(&mut [f32]),
) -> Result<String> {
    let sample_rate = config.sample_rate;
    let frame_count = config.frame_count;
    let (mut pipeline, mut sink) = ChordPipeline::start(config)?;
    let frame_duration = Duration::from_secs_f64(frame_count as f64 / sample_rate as f64);

    let mut frame = vec![0.0; frame_count];
    let mut pushed = 0;
    let mut last_label = String::new();
    let started = Instant::now();

    while pushed < total {
        fill(&mut frame);
        if !sink.push_frame(&frame) {
            tracing::debug!("[chordy] Capture channel full, frame dropped");
        }
        pushed += frame_count;

        pipeline.tick()?;
        if !realtime {
            wait_for_analysis(&mut pipeline)?;
        }
        report_change(&pipeline, &mut last_label, pushed as f64 / sample_rate as f64)?;

        if realtime {
            let due = frame_duration * (pushed / frame_count) as u32;
            if let Some(wait) = due.checked_sub(started.elapsed()) {
                thread::sleep(wait);
            }
        }
    }

    if realtime {
        // Collect the result of the final window
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline && !pipeline.tick()?.has_new_result() {
            thread::sleep(Duration::from_millis(1));
        }
        report_change(&pipeline, &mut last_label, pushed as f64 / sample_rate as f64)?;
    }

    eprintln!("{}", serde_json::to_string(&pipeline.stats())?);
    let label = pipeline.view().chord_label.to_string();
    pipeline.shutdown();
    Ok(label)
}

/// Tick until every enqueued window has been analyzed
fn wait_for_analysis(pipeline: &mut ChordPipeline) -> Result<()> {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        let stats = pipeline.stats();
        if stats.analyses_completed >= stats.windows_enqueued {
            pipeline.tick()?;
            return Ok(());
        }
        if Instant::now() > deadline {
            bail!("analysis thread stalled");
        }
        thread::sleep(Duration::from_micros(200));
        pipeline.tick()?;
    }
}

fn report_change(pipeline: &ChordPipeline, last_label: &mut String, time_s: f64) -> Result<()> {
    let view = pipeline.view();
    if view.compute_latency_ms.is_some() && view.chord_label != last_label.as_str() {
        let change = ChordChange {
            time_s,
            chord: view.chord_label,
            confidence: view.confidence,
        };
        println!("{}", serde_json::to_string(&change)?);
        *last_label = view.chord_label.to_string();
    }
    Ok(())
}

#[cfg(feature = "live-capture")]
fn run_live(mut config: PipelineConfig, seconds: Option<f32>) -> Result<ExitCode> {
    use chordy::audio::engine_cpal::{default_input_info, LiveCapture};

    let info = default_input_info()?;
    config.sample_rate = info.sample_rate;
    let (mut pipeline, sink) = ChordPipeline::start(config)?;
    let _capture = LiveCapture::start(sink)?;

    let started = Instant::now();
    let mut last_label = String::new();
    loop {
        if let Some(limit) = seconds {
            if started.elapsed().as_secs_f32() >= limit {
                break;
            }
        }
        pipeline.tick()?;
        report_change(&pipeline, &mut last_label, started.elapsed().as_secs_f64())?;
        thread::sleep(Duration::from_millis(33));
    }

    eprintln!("{}", serde_json::to_string(&pipeline.stats())?);
    Ok(ExitCode::from(0))
}
