//! Integration tests for the full capture → analysis → presentation pipeline
//!
//! These tests drive ChordPipeline through its public API only:
//! - Frame-by-frame capture through CaptureSink and FrameChunker
//! - Chord detection end to end, clean and with added noise
//! - Capture from a separate thread while the presentation loop ticks
//! - Shutdown and configuration errors

use std::thread;
use std::time::{Duration, Instant};

use chordy::testing::signals::{self, ToneSource};
use chordy::{
    Chord, ChordPipeline, ChordQuality, ErrorCode, FrameChunker, PipelineConfig, PipelineError,
    NO_CHORD_LABEL,
};

fn tick_until<F: Fn(&ChordPipeline) -> bool>(pipeline: &mut ChordPipeline, done: F) {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        pipeline.tick().expect("pipeline tick");
        if done(pipeline) {
            return;
        }
        assert!(Instant::now() < deadline, "condition not reached within 10s");
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn test_c_major_end_to_end() {
    let (mut pipeline, mut sink) = ChordPipeline::start(PipelineConfig::default()).unwrap();
    let window = signals::c_major_triad(44_100, 8192);
    for frame in window.chunks(1024) {
        assert!(sink.push_frame(frame));
    }

    tick_until(&mut pipeline, |p| p.latest().is_some());
    let view = pipeline.view();
    assert_eq!(view.chord_label, "C Maj");
    assert_eq!(view.history.len(), 256 * 1024);
    // Newest samples sit at the end of the linear history
    assert_eq!(&view.history[view.history.len() - 8192..], window.as_slice());
}

#[test]
fn test_noisy_c_major_through_capture_sink() {
    let (mut pipeline, mut sink) = ChordPipeline::start(PipelineConfig::default()).unwrap();
    let noise = signals::white_noise(0.1, 8192, signals::DEFAULT_NOISE_SEED);
    let window: Vec<f32> = signals::c_major_triad(44_100, 8192)
        .iter()
        .zip(&noise)
        .map(|(s, n)| s + n)
        .collect();
    for frame in window.chunks(1024) {
        assert!(sink.push_frame(frame));
    }

    tick_until(&mut pipeline, |p| p.latest().is_some());
    assert_eq!(pipeline.view().chord_label, "C Maj");
    assert_eq!(pipeline.stats().frames_dropped, 0);
}

#[test]
fn test_variable_blocks_through_chunker() {
    let (mut pipeline, sink) = ChordPipeline::start(PipelineConfig::default()).unwrap();
    let mut chunker = FrameChunker::new(sink);
    let window = signals::c_major_triad(44_100, 8192);

    let mut frames = 0;
    for block in window.chunks(700) {
        frames += chunker.push(block);
    }
    assert_eq!(frames, 8);

    tick_until(&mut pipeline, |p| p.latest().is_some());
    assert_eq!(pipeline.view().chord_label, "C Maj");
}

#[test]
fn test_capture_thread_and_presentation_loop() {
    const FRAMES: usize = 256;
    let config = PipelineConfig {
        capture_channel_frames: 8,
        ..PipelineConfig::default()
    };
    let frame_count = config.frame_count;
    let (mut pipeline, mut sink) = ChordPipeline::start(config).unwrap();

    let capture = thread::spawn(move || {
        let mut source = ToneSource::for_chord(Chord::new(0, ChordQuality::Major), 44_100);
        let mut frame = vec![0.0; frame_count];
        let mut rejected = 0u64;
        for _ in 0..FRAMES {
            source.fill(&mut frame);
            while !sink.push_frame(&frame) {
                rejected += 1;
                thread::sleep(Duration::from_micros(200));
            }
        }
        (sink, rejected)
    });

    let mut received = 0;
    while !capture.is_finished() {
        received += pipeline.tick().unwrap().samples_received;
        thread::sleep(Duration::from_micros(500));
    }
    let (sink, rejected) = capture.join().unwrap();
    received += pipeline.tick().unwrap().samples_received;

    // Every accepted frame arrives, in order
    assert_eq!(received, FRAMES * frame_count);
    assert_eq!(pipeline.stats().frames_dropped, rejected);
    let expected = signals::c_major_triad(44_100, FRAMES * frame_count);
    let history = pipeline.view().history;
    assert_eq!(
        &history[history.len() - 8192..],
        &expected[expected.len() - 8192..]
    );

    tick_until(&mut pipeline, |p| p.latest().is_some());
    assert!(!sink.is_closed());
    pipeline.shutdown();
    drop(pipeline);
    assert!(sink.is_closed());
}

#[test]
fn test_silence_reports_no_chord() {
    let (mut pipeline, mut sink) = ChordPipeline::start(PipelineConfig::default()).unwrap();
    let frame = vec![0.0; 1024];
    for _ in 0..8 {
        assert!(sink.push_frame(&frame));
    }

    tick_until(&mut pipeline, |p| p.latest().is_some());
    let view = pipeline.view();
    assert_eq!(view.chord_label, NO_CHORD_LABEL);
    assert_eq!(view.relative_chroma, [0.0; 12]);
}

#[test]
fn test_invalid_config_fails_fast() {
    let config = PipelineConfig {
        history_capacity: 1024,
        ..PipelineConfig::default()
    };
    let err = ChordPipeline::start(config).err().expect("config must be rejected");
    assert!(matches!(err, PipelineError::Config(_)));
    assert_eq!(err.code(), 3001);
}

#[test]
fn test_tick_after_shutdown_reports_not_running() {
    let (mut pipeline, _sink) = ChordPipeline::start(PipelineConfig::default()).unwrap();
    pipeline.shutdown();
    assert_eq!(pipeline.tick(), Err(PipelineError::NotRunning));
}
