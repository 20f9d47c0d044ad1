// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the scan engine state machine
//!
//! Timing-sensitive tests run on a paused tokio clock and advance it
//! explicitly, so the 3-second cooldown is exercised in simulated time.

use codescan::backends::camera::types::{CameraFrame, PixelFormat};
use codescan::config::{ScannerBackend, ScannerSettings};
use codescan::feedback::SuccessFeedback;
use codescan::scan::{ScanEngine, ScanState};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Counts feedback invocations instead of making noise
#[derive(Default)]
struct CountingFeedback {
    count: AtomicUsize,
}

impl CountingFeedback {
    fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl SuccessFeedback for CountingFeedback {
    fn scan_succeeded(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Grayscale frame containing a CODE_128 pattern for `contents`
fn code128_frame(contents: &str) -> CameraFrame {
    use rxing::{BarcodeFormat, MultiFormatWriter, Writer};

    let matrix = MultiFormatWriter
        .encode(contents, &BarcodeFormat::CODE_128, 400, 120)
        .expect("encode fixture");

    let w = matrix.getWidth();
    let h = matrix.getHeight();
    let mut data = Vec::with_capacity((w * h) as usize);
    for y in 0..h {
        for x in 0..w {
            data.push(if matrix.get(x, y) { 0u8 } else { 255u8 });
        }
    }

    CameraFrame::new(w, h, PixelFormat::Gray8, data)
}

fn blank_frame() -> CameraFrame {
    CameraFrame::new(320, 240, PixelFormat::Gray8, vec![255; 320 * 240])
}

fn engine_with_feedback(backend: ScannerBackend) -> (ScanEngine, Arc<CountingFeedback>) {
    let feedback = Arc::new(CountingFeedback::default());
    let settings = ScannerSettings {
        backend,
        ..ScannerSettings::default()
    };
    let engine = ScanEngine::new(settings, Some(feedback.clone()));
    (engine, feedback)
}

/// Give spawned tasks a chance to run without advancing the clock
async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn frames_while_idle_are_ignored() {
    let (mut engine, feedback) = engine_with_feedback(ScannerBackend::Classic);

    engine.process_frame(code128_frame("12345"));
    settle().await;
    engine.poll();

    assert_eq!(engine.state(), ScanState::Idle);
    assert!(engine.result().is_none());
    assert_eq!(feedback.count(), 0);
}

#[tokio::test(start_paused = true)]
async fn decode_publishes_pauses_and_resumes_after_cooldown() {
    let (mut engine, feedback) = engine_with_feedback(ScannerBackend::Classic);

    engine.start_scanning();
    assert_eq!(engine.state(), ScanState::Scanning);

    engine.process_frame(code128_frame("12345"));
    engine.next_applied().await;

    let result = engine.result().expect("result should be published");
    assert_eq!(result.text, "12345");
    assert_eq!(result.format, "CODE_128");
    assert_eq!(engine.state(), ScanState::Paused);
    assert_eq!(feedback.count(), 1);

    // Frames during the cooldown are dropped
    engine.process_frame(code128_frame("67890"));
    settle().await;
    engine.poll();
    assert_eq!(engine.result().unwrap().text, "12345");

    // Not resumed a moment early...
    tokio::time::advance(Duration::from_millis(2999)).await;
    settle().await;
    engine.poll();
    assert_eq!(engine.state(), ScanState::Paused);

    // ...but exactly at 3000 ms
    tokio::time::advance(Duration::from_millis(1)).await;
    settle().await;
    engine.poll();
    assert_eq!(engine.state(), ScanState::Scanning);

    // Resume does not re-fire feedback or duplicate the transition
    assert_eq!(feedback.count(), 1);
    tokio::time::advance(Duration::from_secs(10)).await;
    settle().await;
    engine.poll();
    assert_eq!(engine.state(), ScanState::Scanning);
}

#[tokio::test(start_paused = true)]
async fn detector_backend_reports_nothing_for_blank_frame() {
    let (mut engine, feedback) = engine_with_feedback(ScannerBackend::Detector);

    engine.start_scanning();
    engine.process_frame(blank_frame());
    engine.next_applied().await;

    assert!(engine.result().is_none());
    assert_eq!(engine.state(), ScanState::Scanning);
    assert_eq!(feedback.count(), 0);
}

#[tokio::test(start_paused = true)]
async fn backend_switch_discards_in_flight_decode() {
    let (mut engine, feedback) = engine_with_feedback(ScannerBackend::Classic);

    engine.start_scanning();
    engine.process_frame(code128_frame("12345"));

    // Switch before the decode resolves; its completion is now stale
    engine.set_backend(ScannerBackend::Detector);
    engine.next_applied().await;

    assert!(engine.result().is_none());
    assert_eq!(feedback.count(), 0);
    assert_eq!(engine.settings().backend, ScannerBackend::Detector);
}

#[tokio::test(start_paused = true)]
async fn backend_switch_while_paused_still_resumes() {
    let (mut engine, feedback) = engine_with_feedback(ScannerBackend::Classic);

    engine.start_scanning();
    engine.process_frame(code128_frame("12345"));
    engine.next_applied().await;
    assert_eq!(engine.state(), ScanState::Paused);

    // The switch stales the pending cooldown; a replacement must be
    // scheduled or the engine would never leave Paused
    engine.set_backend(ScannerBackend::Detector);
    settle().await;

    tokio::time::advance(Duration::from_millis(3000)).await;
    settle().await;
    engine.poll();
    assert_eq!(engine.state(), ScanState::Scanning);
    assert_eq!(feedback.count(), 1);

    // No stray second resume from the staled timer
    tokio::time::advance(Duration::from_secs(60)).await;
    settle().await;
    engine.poll();
    assert_eq!(engine.state(), ScanState::Scanning);
    assert_eq!(engine.result().unwrap().text, "12345");
}

#[tokio::test(start_paused = true)]
async fn stop_then_late_completion_mutates_nothing() {
    let (mut engine, feedback) = engine_with_feedback(ScannerBackend::Classic);

    engine.start_scanning();
    engine.process_frame(code128_frame("12345"));
    engine.stop_scanning();

    // The decode from before the stop resolves now
    engine.next_applied().await;

    assert_eq!(engine.state(), ScanState::Idle);
    assert!(engine.result().is_none());
    assert_eq!(feedback.count(), 0);
    assert_eq!(engine.history().count(), 0);
}

#[tokio::test(start_paused = true)]
async fn clear_result_keeps_flags() {
    let (mut engine, _feedback) = engine_with_feedback(ScannerBackend::Classic);

    engine.start_scanning();
    engine.process_frame(code128_frame("12345"));
    engine.next_applied().await;
    assert_eq!(engine.state(), ScanState::Paused);

    engine.clear_result();

    assert!(engine.result().is_none());
    assert_eq!(engine.state(), ScanState::Paused);

    // History keeps the entry; clearing only affects the published result
    assert_eq!(engine.history().count(), 1);
}

#[tokio::test(start_paused = true)]
async fn start_scanning_clears_previous_result() {
    let (mut engine, _feedback) = engine_with_feedback(ScannerBackend::Classic);

    engine.start_scanning();
    engine.process_frame(code128_frame("12345"));
    engine.next_applied().await;
    assert!(engine.result().is_some());

    engine.stop_scanning();
    engine.start_scanning();

    assert!(engine.result().is_none());
    assert_eq!(engine.state(), ScanState::Scanning);
}

#[tokio::test(start_paused = true)]
async fn history_is_newest_first_and_bounded() {
    let (mut engine, _feedback) = engine_with_feedback(ScannerBackend::Classic);

    engine.start_scanning();

    for i in 0..35 {
        engine.process_frame(code128_frame(&format!("{:05}", i)));
        engine.next_applied().await;
        assert_eq!(engine.state(), ScanState::Paused);

        // Let the cooldown task register its timer before advancing the clock
        settle().await;
        tokio::time::advance(Duration::from_millis(3000)).await;
        settle().await;
        engine.poll();
        assert_eq!(engine.state(), ScanState::Scanning);
    }

    let history: Vec<String> = engine.history().map(|r| r.text.clone()).collect();
    assert_eq!(history.len(), codescan::constants::HISTORY_LIMIT);
    assert_eq!(history[0], "00034"); // newest first
    assert_eq!(history.last().unwrap(), "00003"); // oldest surviving entry
}
