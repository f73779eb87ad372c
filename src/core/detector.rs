//! Microphone blow detection.
//!
//! The detector is written against three seams so it runs the same way in
//! the browser and under host tests:
//! - [`AudioBackend`] checks platform support and asynchronously acquires an input;
//! - [`AudioInput`] is the acquired device, read once per frame and released
//!   synchronously;
//! - [`TickSource`] schedules the next per-frame callback and cancels it.
//!
//! Device acquisition is the only suspension point. It is split into
//! [`SoundLevelDetector::activate`], which hands out a [`PendingAcquire`],
//! and [`SoundLevelDetector::complete_activation`], which applies the result.
//! Results for a ticket that was superseded or deactivated in the meantime
//! are released on arrival, so at most one input is ever held.

use super::analysis::{weighted_loudness, AudioSample, TriggerGate};
use super::config::DetectorConfig;
use super::error::AcquireError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

pub type AcquireFuture<I> = Pin<Box<dyn Future<Output = Result<I, AcquireError>>>>;

/// An acquired audio input (device stream plus analysis graph).
pub trait AudioInput {
    /// Number of frequency bins produced per frame.
    fn bin_count(&self) -> usize;
    /// Fill `bins` with byte magnitudes for the current frame.
    fn read_frequency_data(&mut self, bins: &mut [u8]);
    /// Disconnect nodes, stop tracks and close the context. Must be idempotent.
    fn release(&mut self);
}

pub trait AudioBackend {
    type Input: AudioInput + 'static;

    /// Synchronous support and secure-transport checks run before any request.
    fn check_support(&self) -> Result<(), AcquireError>;

    /// Start a device request.
    fn acquire(&mut self, config: &DetectorConfig) -> AcquireFuture<Self::Input>;
}

/// Per-frame callback scheduler (display refresh in the browser).
pub trait TickSource {
    /// Schedule exactly one callback for the next frame.
    fn request_tick(&mut self);
    /// Cancel the pending callback, if any, before returning.
    fn cancel_tick(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectorState {
    Idle,
    Unsupported,
    PermissionPending,
    PermissionGranted,
    PermissionDenied,
}

impl DetectorState {
    /// Audio input can no longer be used; only the manual trigger remains.
    #[inline]
    pub fn is_unavailable(self) -> bool {
        matches!(self, DetectorState::Unsupported | DetectorState::PermissionDenied)
    }
}

impl fmt::Display for DetectorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DetectorState::Idle => "idle",
            DetectorState::Unsupported => "unsupported",
            DetectorState::PermissionPending => "pending",
            DetectorState::PermissionGranted => "granted",
            DetectorState::PermissionDenied => "denied",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AcquireTicket(u64);

pub struct PendingAcquire<I> {
    pub ticket: AcquireTicket,
    pub future: AcquireFuture<I>,
}

impl<I> fmt::Debug for PendingAcquire<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingAcquire")
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum Activation<I> {
    /// A device request was started; drive the future and hand the result back.
    Pending(PendingAcquire<I>),
    /// Already sampling or already waiting on a request.
    AlreadyActive,
    /// Audio input cannot be used.
    Failed(AcquireError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActivationOutcome {
    Granted,
    Failed(AcquireError),
    /// The ticket was superseded; any acquired input has been released.
    Stale,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    pub sample: AudioSample,
    pub triggered: bool,
}

pub struct SoundLevelDetector<B: AudioBackend, T: TickSource> {
    config: DetectorConfig,
    backend: B,
    ticks: T,
    state: DetectorState,
    failure: Option<AcquireError>,
    input: Option<B::Input>,
    next_ticket: u64,
    pending: Option<AcquireTicket>,
    gate: TriggerGate,
    bins: Vec<u8>,
    last_sample: AudioSample,
}

impl<B: AudioBackend, T: TickSource> SoundLevelDetector<B, T> {
    pub fn new(config: DetectorConfig, backend: B, ticks: T) -> Self {
        let gate = TriggerGate::new(config.threshold, config.consecutive_frames, config.cooldown);
        Self {
            config,
            backend,
            ticks,
            state: DetectorState::Idle,
            failure: None,
            input: None,
            next_ticket: 0,
            pending: None,
            gate,
            bins: Vec::new(),
            last_sample: AudioSample::default(),
        }
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    /// Reason for the last failed or revoked acquisition.
    pub fn failure(&self) -> Option<&AcquireError> {
        self.failure.as_ref()
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn is_sampling(&self) -> bool {
        self.input.is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn last_sample(&self) -> AudioSample {
        self.last_sample
    }

    pub fn cooldown_active(&self, now: Duration) -> bool {
        self.gate.in_cooldown(now)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn ticks(&self) -> &T {
        &self.ticks
    }

    /// Request the audio input. No-op while sampling or waiting on a request.
    ///
    /// Once the platform has been found unsupported or permission has been
    /// denied, this keeps returning that failure without asking again.
    pub fn activate(&mut self) -> Activation<B::Input> {
        if self.input.is_some() || self.pending.is_some() {
            return Activation::AlreadyActive;
        }
        if self.state.is_unavailable() {
            let reason = self.failure.clone().unwrap_or(AcquireError::PermissionDenied);
            return Activation::Failed(reason);
        }
        if let Err(e) = self.backend.check_support() {
            self.fail(e.clone());
            return Activation::Failed(e);
        }
        self.next_ticket += 1;
        let ticket = AcquireTicket(self.next_ticket);
        self.pending = Some(ticket);
        if self.state == DetectorState::Idle {
            self.state = DetectorState::PermissionPending;
        }
        log::info!("[detector] requesting microphone (ticket {})", ticket.0);
        Activation::Pending(PendingAcquire {
            ticket,
            future: self.backend.acquire(&self.config),
        })
    }

    /// Apply the result of a device request started by [`activate`](Self::activate).
    pub fn complete_activation(
        &mut self,
        ticket: AcquireTicket,
        result: Result<B::Input, AcquireError>,
    ) -> ActivationOutcome {
        if self.pending != Some(ticket) {
            return self.complete_stale(ticket, result);
        }
        self.pending = None;
        match result {
            Ok(input) => {
                if let Some(mut previous) = self.input.take() {
                    previous.release();
                }
                self.bins.clear();
                self.bins.resize(input.bin_count(), 0);
                self.input = Some(input);
                self.state = DetectorState::PermissionGranted;
                self.failure = None;
                self.gate.reset_streak();
                self.ticks.request_tick();
                log::info!("[detector] sampling {} bins", self.bins.len());
                ActivationOutcome::Granted
            }
            Err(e) => {
                self.fail(e.clone());
                ActivationOutcome::Failed(e)
            }
        }
    }

    /// A result for a request that is no longer awaited.
    ///
    /// Inputs are released at once. A refusal for the most recent request is
    /// still recorded when nothing newer was started, so a denial given while
    /// the page was hidden or the candles were blown out by hand is not lost.
    fn complete_stale(
        &mut self,
        ticket: AcquireTicket,
        result: Result<B::Input, AcquireError>,
    ) -> ActivationOutcome {
        match result {
            Ok(mut input) => {
                input.release();
                log::info!("[detector] released stale input (ticket {})", ticket.0);
                ActivationOutcome::Stale
            }
            Err(e) if ticket.0 == self.next_ticket && self.pending.is_none() => {
                self.fail(e.clone());
                ActivationOutcome::Failed(e)
            }
            Err(e) => {
                log::debug!("[detector] dropped stale failure (ticket {}): {}", ticket.0, e);
                ActivationOutcome::Stale
            }
        }
    }

    /// Per-frame callback: sample, evaluate and schedule the next frame.
    ///
    /// Returns `None` when no input is held (late callback after deactivation).
    pub fn on_tick(&mut self, now: Duration) -> Option<FrameReport> {
        let sample = self.sample_frame()?;
        let triggered = self.evaluate(sample, now);
        self.ticks.request_tick();
        Some(FrameReport { sample, triggered })
    }

    /// Read the current frame and reduce it to a weighted loudness.
    pub fn sample_frame(&mut self) -> Option<AudioSample> {
        let input = self.input.as_mut()?;
        input.read_frequency_data(&mut self.bins);
        let sample = weighted_loudness(&self.bins);
        self.last_sample = sample;
        Some(sample)
    }

    /// Debounce and cooldown check; true when a trigger should be emitted.
    pub fn evaluate(&mut self, sample: AudioSample, now: Duration) -> bool {
        let fired = self.gate.feed(sample, now);
        if fired {
            log::info!(
                "[detector] blow detected level={:.1} threshold={:.1}",
                sample.level(),
                self.config.threshold
            );
        }
        fired
    }

    /// Stop sampling and release the device synchronously. Idempotent.
    pub fn deactivate(&mut self) {
        self.ticks.cancel_tick();
        if let Some(ticket) = self.pending.take() {
            log::debug!("[detector] abandoning request (ticket {})", ticket.0);
            if self.state == DetectorState::PermissionPending {
                self.state = DetectorState::Idle;
            }
        }
        if let Some(mut input) = self.input.take() {
            input.release();
            log::info!("[detector] microphone released");
        }
        self.gate.reset_streak();
        self.last_sample = AudioSample::default();
    }

    /// Permission was withdrawn from outside (browser settings, device unplugged).
    pub fn revoke(&mut self) {
        self.deactivate();
        if self.state != DetectorState::Unsupported {
            self.state = DetectorState::PermissionDenied;
            self.failure = Some(AcquireError::PermissionDenied);
            log::warn!("[detector] microphone permission revoked");
        }
    }

    fn fail(&mut self, e: AcquireError) {
        self.state = if e.is_environmental() {
            DetectorState::Unsupported
        } else {
            DetectorState::PermissionDenied
        };
        log::warn!("[detector] microphone unavailable: {}", e);
        self.failure = Some(e);
    }
}

impl<B: AudioBackend, T: TickSource> Drop for SoundLevelDetector<B, T> {
    fn drop(&mut self) {
        self.deactivate();
    }
}
