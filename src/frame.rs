use crate::core::TickSource;
use instant::Instant;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Monotonic page clock used to timestamp frames and manual triggers alike.
#[derive(Clone, Copy)]
pub struct FrameClock {
    origin: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    #[inline]
    pub fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// `requestAnimationFrame` tick source.
///
/// Clones share the callback slot and the pending frame id, so the page can
/// keep a clone to [`bind`](Self::bind) the frame handler after the detector
/// (which owns the original) has been built.
#[derive(Clone, Default)]
pub struct RafTicker {
    callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
    pending: Rc<Cell<Option<i32>>>,
}

impl RafTicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&self, mut on_frame: impl FnMut() + 'static) {
        let pending = self.pending.clone();
        let closure = Closure::wrap(Box::new(move || {
            // this frame has fired; a new request is needed for the next one
            pending.set(None);
            on_frame();
        }) as Box<dyn FnMut()>);
        *self.callback.borrow_mut() = Some(closure);
    }
}

impl TickSource for RafTicker {
    fn request_tick(&mut self) {
        if self.pending.get().is_some() {
            return;
        }
        let Some(w) = web::window() else {
            return;
        };
        let slot = self.callback.borrow();
        let Some(cb) = slot.as_ref() else {
            log::warn!("[frame] tick requested before a frame handler was bound");
            return;
        };
        match w.request_animation_frame(cb.as_ref().unchecked_ref()) {
            Ok(id) => self.pending.set(Some(id)),
            Err(e) => log::error!("[frame] requestAnimationFrame error: {:?}", e),
        }
    }

    fn cancel_tick(&mut self) {
        if let Some(id) = self.pending.take() {
            if let Some(w) = web::window() {
                _ = w.cancel_animation_frame(id);
            }
        }
    }
}
