// Deterministic stand-ins for the browser: an in-memory microphone that
// counts live acquisitions, a manual frame scheduler, and an event recorder.
#![allow(dead_code)]

use candle_wish::celebration::Wish;
use candle_wish::core::*;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

pub const BINS: usize = 128;

/// A frame whose weighted loudness is exactly `level`.
pub fn flat_frame(level: u8) -> Vec<u8> {
    vec![level; BINS]
}

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[derive(Default)]
pub struct DeviceLog {
    pub live: Cell<usize>,
    pub max_live: Cell<usize>,
    pub acquired: Cell<usize>,
    pub released: Cell<usize>,
    pub requests: Cell<usize>,
}

pub type FrameQueue = Rc<RefCell<VecDeque<Vec<u8>>>>;

pub struct FakeInput {
    frames: FrameQueue,
    log: Rc<DeviceLog>,
    released: bool,
}

impl fmt::Debug for FakeInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeInput")
            .field("released", &self.released)
            .finish()
    }
}

impl AudioInput for FakeInput {
    fn bin_count(&self) -> usize {
        BINS
    }

    fn read_frequency_data(&mut self, bins: &mut [u8]) {
        let frame = self.frames.borrow_mut().pop_front().unwrap_or_default();
        bins.fill(0);
        let n = frame.len().min(bins.len());
        bins[..n].copy_from_slice(&frame[..n]);
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.log.live.set(self.log.live.get() - 1);
        self.log.released.set(self.log.released.get() + 1);
    }
}

impl Drop for FakeInput {
    fn drop(&mut self) {
        self.release();
    }
}

pub struct FakeBackend {
    pub support: Rc<RefCell<Result<(), AcquireError>>>,
    pub outcome: Rc<RefCell<Result<(), AcquireError>>>,
    frames: FrameQueue,
    log: Rc<DeviceLog>,
}

impl AudioBackend for FakeBackend {
    type Input = FakeInput;

    fn check_support(&self) -> Result<(), AcquireError> {
        self.support.borrow().clone()
    }

    fn acquire(&mut self, _config: &DetectorConfig) -> AcquireFuture<FakeInput> {
        self.log.requests.set(self.log.requests.get() + 1);
        let outcome = self.outcome.borrow().clone();
        let frames = self.frames.clone();
        let log = self.log.clone();
        Box::pin(async move {
            outcome?;
            log.live.set(log.live.get() + 1);
            log.max_live.set(log.max_live.get().max(log.live.get()));
            log.acquired.set(log.acquired.get() + 1);
            Ok(FakeInput {
                frames,
                log,
                released: false,
            })
        })
    }
}

#[derive(Default)]
pub struct TickLog {
    pub pending: Cell<bool>,
    pub requested: Cell<usize>,
    pub cancelled: Cell<usize>,
}

pub struct ManualTicks(Rc<TickLog>);

impl TickSource for ManualTicks {
    fn request_tick(&mut self) {
        self.0.pending.set(true);
        self.0.requested.set(self.0.requested.get() + 1);
    }

    fn cancel_tick(&mut self) {
        if self.0.pending.replace(false) {
            self.0.cancelled.set(self.0.cancelled.get() + 1);
        }
    }
}

/// Handles the test keeps after the fakes move into the detector.
pub struct Rig {
    pub frames: FrameQueue,
    pub devices: Rc<DeviceLog>,
    pub ticks: Rc<TickLog>,
    pub support: Rc<RefCell<Result<(), AcquireError>>>,
    pub outcome: Rc<RefCell<Result<(), AcquireError>>>,
}

impl Rig {
    pub fn push_levels(&self, levels: &[u8]) {
        let mut q = self.frames.borrow_mut();
        for &l in levels {
            q.push_back(flat_frame(l));
        }
    }

    pub fn fail_with(&self, e: AcquireError) {
        *self.outcome.borrow_mut() = Err(e);
    }
}

pub type TestDetector = SoundLevelDetector<FakeBackend, ManualTicks>;

pub fn detector(config: DetectorConfig) -> (TestDetector, Rig) {
    let frames: FrameQueue = Rc::default();
    let devices: Rc<DeviceLog> = Rc::default();
    let ticks: Rc<TickLog> = Rc::default();
    let support = Rc::new(RefCell::new(Ok(())));
    let outcome = Rc::new(RefCell::new(Ok(())));
    let backend = FakeBackend {
        support: support.clone(),
        outcome: outcome.clone(),
        frames: frames.clone(),
        log: devices.clone(),
    };
    let det = SoundLevelDetector::new(config, backend, ManualTicks(ticks.clone()));
    let rig = Rig {
        frames,
        devices,
        ticks,
        support,
        outcome,
    };
    (det, rig)
}

pub fn resolve(pending: PendingAcquire<FakeInput>) -> (AcquireTicket, Result<FakeInput, AcquireError>) {
    let PendingAcquire { ticket, future } = pending;
    (ticket, pollster::block_on(future))
}

/// Activate and resolve the device request in one go.
pub fn grant(det: &mut TestDetector) -> ActivationOutcome {
    match det.activate() {
        Activation::Pending(p) => {
            let (ticket, result) = resolve(p);
            det.complete_activation(ticket, result)
        }
        Activation::AlreadyActive => panic!("detector already active"),
        Activation::Failed(e) => ActivationOutcome::Failed(e),
    }
}

/// Fire the scheduled frame the way the browser would.
pub fn fire(det: &mut TestDetector, ticks: &TickLog, now: Duration) -> Option<FrameReport> {
    assert!(ticks.pending.get(), "no frame was scheduled");
    ticks.pending.set(false);
    det.on_tick(now)
}

#[derive(Default)]
pub struct Recorder {
    pub extinguished: Vec<TriggerSource>,
    pub relit: usize,
    pub permissions: Vec<DetectorState>,
    pub fallbacks: Vec<AcquireError>,
    pub wishes: Vec<Wish>,
    pub levels: Vec<f32>,
}

impl SessionEvents for Recorder {
    fn extinguished(&mut self, _session: &CandleSession, source: TriggerSource) {
        self.extinguished.push(source);
    }

    fn relit(&mut self, _session: &CandleSession) {
        self.relit += 1;
    }

    fn permission_changed(&mut self, state: DetectorState, _reason: Option<&AcquireError>) {
        self.permissions.push(state);
    }

    fn manual_fallback(&mut self, _session: &CandleSession, reason: &AcquireError) {
        self.fallbacks.push(reason.clone());
    }

    fn wish_made(&mut self, _session: &CandleSession, wish: &Wish) {
        self.wishes.push(wish.clone());
    }

    fn level(&mut self, sample: AudioSample) {
        self.levels.push(sample.level());
    }
}

pub type TestController = CandleSessionController<FakeBackend, ManualTicks, Recorder>;

pub fn controller(config: DetectorConfig) -> (TestController, Rig) {
    let (det, rig) = detector(config);
    (CandleSessionController::new(det, Recorder::default()), rig)
}

/// Resolve a pending request handed out by the controller.
pub fn settle(ctrl: &mut TestController, pending: Option<PendingAcquire<FakeInput>>) -> ActivationOutcome {
    let p = pending.expect("expected a device request");
    let (ticket, result) = resolve(p);
    ctrl.finish_activation(ticket, result)
}

/// Fire the scheduled frame on a controller.
pub fn frame(ctrl: &mut TestController, ticks: &TickLog, now: Duration) {
    assert!(ticks.pending.get(), "no frame was scheduled");
    ticks.pending.set(false);
    ctrl.on_frame(now);
}
