use super::analysis::AudioSample;
use super::detector::{
    AcquireTicket, Activation, ActivationOutcome, AudioBackend, DetectorState, PendingAcquire,
    SoundLevelDetector, TickSource,
};
use super::error::AcquireError;
use crate::celebration::{Recipient, Wish, WishError};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerSource {
    Sound,
    Manual,
}

/// Which sub-panel is shown under the cake once the candles are out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Panel {
    #[default]
    Closed,
    WishForm,
    Sharing,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandleSession {
    pub recipient: Recipient,
    pub lit: bool,
    pub panel: Panel,
    pub wish_sent: bool,
}

impl CandleSession {
    fn new(recipient: Recipient) -> Self {
        Self {
            recipient,
            lit: true,
            panel: Panel::Closed,
            wish_sent: false,
        }
    }
}

/// Side effects requested by the session (toasts, sound cues, vibration,
/// effects). Every hook defaults to doing nothing.
#[allow(unused_variables)]
pub trait SessionEvents {
    fn extinguished(&mut self, session: &CandleSession, source: TriggerSource) {}
    fn relit(&mut self, session: &CandleSession) {}
    fn permission_changed(&mut self, state: DetectorState, reason: Option<&AcquireError>) {}
    /// The microphone cannot be used; the page should point at the manual trigger.
    fn manual_fallback(&mut self, session: &CandleSession, reason: &AcquireError) {}
    fn wish_made(&mut self, session: &CandleSession, wish: &Wish) {}
    fn level(&mut self, sample: AudioSample) {}
}

/// Owns the lit/extinguished state and is the only place a trigger is accepted.
pub struct CandleSessionController<B: AudioBackend, T: TickSource, E: SessionEvents> {
    detector: SoundLevelDetector<B, T>,
    events: E,
    session: Option<CandleSession>,
    visible: bool,
    reported: DetectorState,
    last_frame: Duration,
}

impl<B: AudioBackend, T: TickSource, E: SessionEvents> CandleSessionController<B, T, E> {
    pub fn new(detector: SoundLevelDetector<B, T>, events: E) -> Self {
        let reported = detector.state();
        Self {
            detector,
            events,
            session: None,
            visible: true,
            reported,
            last_frame: Duration::ZERO,
        }
    }

    pub fn session(&self) -> Option<&CandleSession> {
        self.session.as_ref()
    }

    pub fn detector(&self) -> &SoundLevelDetector<B, T> {
        &self.detector
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut E {
        &mut self.events
    }

    pub fn permission(&self) -> DetectorState {
        self.detector.state()
    }

    pub fn is_lit(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.lit)
    }

    pub fn cooldown_active(&self) -> bool {
        self.detector.cooldown_active(self.last_frame)
    }

    /// Begin a viewing with lit candles and start listening if on screen.
    pub fn start_session(&mut self, recipient: Recipient) -> Option<PendingAcquire<B::Input>> {
        if self.session.is_some() {
            self.end_session();
        }
        log::info!("[session] start for {:?} ({:?})", recipient.name(), recipient.variant());
        self.session = Some(CandleSession::new(recipient));
        self.resume_listening()
    }

    pub fn end_session(&mut self) {
        self.detector.deactivate();
        self.sync_permission();
        if self.session.take().is_some() {
            log::info!("[session] ended");
        }
    }

    /// Page visibility changed; hidden pages never hold the microphone.
    pub fn set_visible(&mut self, visible: bool) -> Option<PendingAcquire<B::Input>> {
        self.visible = visible;
        if visible {
            self.resume_listening()
        } else {
            self.detector.deactivate();
            self.sync_permission();
            None
        }
    }

    /// Hand back the result of a device request returned by this controller.
    pub fn finish_activation(
        &mut self,
        ticket: AcquireTicket,
        result: Result<B::Input, AcquireError>,
    ) -> ActivationOutcome {
        let outcome = self.detector.complete_activation(ticket, result);
        self.sync_permission();
        if let ActivationOutcome::Failed(reason) = &outcome {
            // candles already out by hand need no pointer to the manual path
            if let Some(session) = self.session.as_ref().filter(|s| s.lit) {
                self.events.manual_fallback(session, reason);
            }
        }
        outcome
    }

    /// Per-frame callback from the host scheduler.
    pub fn on_frame(&mut self, now: Duration) {
        self.last_frame = now;
        let Some(report) = self.detector.on_tick(now) else {
            return;
        };
        self.events.level(report.sample);
        if report.triggered {
            self.on_external_trigger(TriggerSource::Sound);
        }
    }

    /// Accept a trigger from the detector or a click/tap.
    ///
    /// Returns false when there is nothing to extinguish.
    pub fn on_external_trigger(&mut self, source: TriggerSource) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if !session.lit {
            return false;
        }
        session.lit = false;
        self.detector.deactivate();
        log::info!("[session] candles out ({:?})", source);
        self.events.extinguished(session, source);
        self.sync_permission();
        true
    }

    pub fn on_permission_revoked(&mut self) {
        self.detector.revoke();
        self.sync_permission();
        if let Some(session) = self.session.as_ref().filter(|s| s.lit) {
            self.events.manual_fallback(session, &AcquireError::PermissionDenied);
        }
    }

    /// Light the candles again and resume listening.
    pub fn relight(&mut self) -> Option<PendingAcquire<B::Input>> {
        let session = self.session.as_mut()?;
        if session.lit {
            return None;
        }
        session.lit = true;
        session.panel = Panel::Closed;
        session.wish_sent = false;
        log::info!("[session] relit");
        self.events.relit(session);
        self.resume_listening()
    }

    pub fn open_wish_form(&mut self) -> bool {
        match self.session.as_mut() {
            Some(s) if !s.lit && !s.wish_sent => {
                s.panel = Panel::WishForm;
                true
            }
            _ => false,
        }
    }

    pub fn open_sharing(&mut self) -> bool {
        match self.session.as_mut() {
            Some(s) if !s.lit => {
                s.panel = Panel::Sharing;
                true
            }
            _ => false,
        }
    }

    pub fn close_panel(&mut self) {
        if let Some(s) = self.session.as_mut() {
            s.panel = Panel::Closed;
        }
    }

    pub fn submit_wish(&mut self, text: &str) -> Result<Wish, WishError> {
        let session = self.session.as_mut().ok_or(WishError::NoSession)?;
        if session.lit {
            return Err(WishError::CandlesLit);
        }
        if session.wish_sent {
            return Err(WishError::AlreadySent);
        }
        let wish = Wish::new(&session.recipient, text)?;
        session.wish_sent = true;
        session.panel = Panel::Closed;
        log::info!("[session] wish made ({} chars)", wish.text.chars().count());
        self.events.wish_made(session, &wish);
        Ok(wish)
    }

    /// Start listening if the candles are lit and the page is on screen.
    pub fn resume_listening(&mut self) -> Option<PendingAcquire<B::Input>> {
        if !self.visible || !self.is_lit() {
            return None;
        }
        let activation = self.detector.activate();
        self.sync_permission();
        match activation {
            Activation::Pending(pending) => Some(pending),
            Activation::AlreadyActive => None,
            Activation::Failed(reason) => {
                if let Some(session) = &self.session {
                    self.events.manual_fallback(session, &reason);
                }
                None
            }
        }
    }

    fn sync_permission(&mut self) {
        let state = self.detector.state();
        if state != self.reported {
            self.reported = state;
            log::info!("[session] microphone {}", state);
            self.events.permission_changed(state, self.detector.failure());
        }
    }
}
