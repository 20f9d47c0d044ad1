// SPDX-License-Identifier: GPL-3.0-only

//! Scan orchestration
//!
//! [`ScanEngine`] is the single writer of all scan state. The UI feeds it
//! intents and camera frames; decode work runs on blocking tasks and reports
//! back through an event channel, as does the post-decode cooldown timer.
//!
//! Every spawned task carries the epoch that was current when it started.
//! The epoch increments on start, stop, and backend switch, so a completion
//! from before any of those transitions is recognized as stale and discarded
//! instead of mutating state it no longer owns. Events are applied strictly
//! in arrival order.

use crate::backends::camera::CameraFrame;
use crate::config::{CameraFacing, ScannerBackend, ScannerSettings};
use crate::constants::{HISTORY_LIMIT, SCAN_COOLDOWN};
use crate::decode::{Decoder, make_decoder};
use crate::feedback::SuccessFeedback;
use crate::scan::types::{ScanResult, ScanState};

use futures::StreamExt;
use futures::channel::mpsc;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Completion events delivered back to the engine
#[derive(Debug)]
enum EngineEvent {
    /// A decode attempt finished (with or without a result)
    DecodeFinished {
        epoch: u64,
        outcome: Option<ScanResult>,
    },
    /// The post-decode cooldown elapsed
    CooldownElapsed { epoch: u64 },
}

pub struct ScanEngine {
    settings: ScannerSettings,
    state: ScanState,
    result: Option<ScanResult>,
    history: VecDeque<ScanResult>,
    decoder: Arc<dyn Decoder>,
    feedback: Option<Arc<dyn SuccessFeedback>>,
    /// Invalidates in-flight work across state transitions
    epoch: u64,
    /// At most one decode attempt runs at a time; frames arriving while one
    /// is in flight are dropped
    decode_in_flight: bool,
    events_tx: mpsc::UnboundedSender<EngineEvent>,
    events_rx: mpsc::UnboundedReceiver<EngineEvent>,
}

impl ScanEngine {
    /// Must be called from within a tokio runtime; decode and cooldown tasks
    /// are spawned on it.
    pub fn new(settings: ScannerSettings, feedback: Option<Arc<dyn SuccessFeedback>>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded();
        Self {
            decoder: make_decoder(settings.backend),
            settings,
            state: ScanState::Idle,
            result: None,
            history: VecDeque::new(),
            feedback,
            epoch: 0,
            decode_in_flight: false,
            events_tx,
            events_rx,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn settings(&self) -> ScannerSettings {
        self.settings
    }

    pub fn result(&self) -> Option<&ScanResult> {
        self.result.as_ref()
    }

    /// Scan history, newest first
    pub fn history(&self) -> impl Iterator<Item = &ScanResult> {
        self.history.iter()
    }

    /// Start scanning; clears the previous result
    pub fn start_scanning(&mut self) {
        self.epoch += 1;
        self.decode_in_flight = false;
        self.result = None;
        self.state = ScanState::Scanning;
        debug!(epoch = self.epoch, "Scanning started");
    }

    /// Stop scanning; any in-flight decode becomes stale
    pub fn stop_scanning(&mut self) {
        self.epoch += 1;
        self.decode_in_flight = false;
        self.state = ScanState::Idle;
        debug!(epoch = self.epoch, "Scanning stopped");
    }

    /// Switch the decoding backend, rebinding the adapter with no carryover
    pub fn set_backend(&mut self, backend: ScannerBackend) {
        if backend == self.settings.backend {
            return;
        }
        self.epoch += 1;
        self.decode_in_flight = false;
        self.settings = ScannerSettings {
            backend,
            ..self.settings
        };
        self.decoder = make_decoder(backend);
        debug!(backend = backend.display_name(), "Backend switched");

        // The epoch bump staled any pending cooldown; without a replacement
        // the engine would sit in Paused forever
        if self.state == ScanState::Paused {
            self.schedule_cooldown();
        }
    }

    /// Change the preferred camera facing (the camera rebind is the UI's job)
    pub fn set_facing(&mut self, facing: CameraFacing) {
        self.settings = ScannerSettings {
            facing,
            ..self.settings
        };
    }

    /// Clear the published result; scanning/paused flags are untouched
    pub fn clear_result(&mut self) {
        self.result = None;
    }

    /// Feed one camera frame
    ///
    /// Frames are dropped silently unless the engine is Scanning with no
    /// decode in flight. Dropped frames are not queued: a stale frame has no
    /// value once the camera has delivered fresher ones.
    pub fn process_frame(&mut self, frame: CameraFrame) {
        if self.state != ScanState::Scanning {
            trace!(state = self.state.display_name(), "Dropping frame");
            return;
        }
        if self.decode_in_flight {
            trace!("Decode in flight, dropping frame");
            return;
        }

        self.decode_in_flight = true;

        let decoder = Arc::clone(&self.decoder);
        let epoch = self.epoch;
        let tx = self.events_tx.clone();

        tokio::spawn(async move {
            let outcome = tokio::task::spawn_blocking(move || {
                decoder
                    .decode(&frame)
                    .map(|d| ScanResult::new(d.text, d.format))
            })
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Decode task panicked");
                None
            });

            // Engine may be gone on shutdown; nothing to do then
            let _ = tx.unbounded_send(EngineEvent::DecodeFinished { epoch, outcome });
        });
    }

    /// Apply all events that have arrived, in arrival order (non-blocking)
    pub fn poll(&mut self) {
        while let Ok(Some(event)) = self.events_rx.try_next() {
            self.apply(event);
        }
    }

    /// Await and apply the next event (used by tests and headless drivers)
    pub async fn next_applied(&mut self) {
        if let Some(event) = self.events_rx.next().await {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::DecodeFinished { epoch, outcome } => {
                if epoch != self.epoch {
                    trace!(epoch, current = self.epoch, "Discarding stale decode");
                    return;
                }
                self.decode_in_flight = false;

                if self.state != ScanState::Scanning {
                    return;
                }

                if let Some(result) = outcome {
                    self.publish(result);
                }
            }
            EngineEvent::CooldownElapsed { epoch } => {
                if epoch != self.epoch {
                    trace!(epoch, current = self.epoch, "Discarding stale cooldown");
                    return;
                }
                if self.state == ScanState::Paused {
                    self.state = ScanState::Scanning;
                    debug!("Cooldown elapsed, scanning resumed");
                }
            }
        }
    }

    fn publish(&mut self, result: ScanResult) {
        debug!(text = %result.text, format = %result.format, "Barcode decoded");

        self.history.push_front(result.clone());
        self.history.truncate(HISTORY_LIMIT);
        self.result = Some(result);
        self.state = ScanState::Paused;

        if let Some(feedback) = &self.feedback {
            feedback.scan_succeeded();
        }

        self.schedule_cooldown();
    }

    fn schedule_cooldown(&self) {
        let epoch = self.epoch;
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(SCAN_COOLDOWN).await;
            let _ = tx.unbounded_send(EngineEvent::CooldownElapsed { epoch });
        });
    }
}
