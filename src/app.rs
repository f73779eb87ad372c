use crate::audio::BrowserAudio;
use crate::celebration::Recipient;
use crate::core::{CandleSessionController, DetectorConfig, SoundLevelDetector};
use crate::create;
use crate::dom;
use crate::events::{self, PageEvents, SharedController};
use crate::frame::{FrameClock, RafTicker};
use crate::overlay;
use crate::phrases;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use wasm_bindgen::prelude::*;
use web_sys as web;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("candle-wish starting");

    if let Err(e) = init() {
        log::error!("init error: {:?}", e);
    }
    Ok(())
}

/// Recipient from `/<name>?gender=...`; a bad name shows the not-found panel.
fn recipient_from_location(window: &web::Window) -> anyhow::Result<Option<Recipient>> {
    let location = window.location();
    let path = location
        .pathname()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let query = location.search().unwrap_or_default();
    let segment = path.trim_matches('/');
    let decoded: Option<String> = if segment.is_empty() {
        None
    } else {
        let s = js_sys::decode_uri_component(segment)
            .map_err(|e| anyhow::anyhow!("bad path {:?}: {:?}", segment, e))?;
        Some(s.into())
    };
    match Recipient::from_page(decoded.as_deref(), &query) {
        Ok(r) => Ok(Some(r)),
        Err(e) => {
            log::warn!("[page] {}", e);
            Ok(None)
        }
    }
}

fn frame_seed() -> u64 {
    (js_sys::Math::random() * u32::MAX as f64) as u64
}

fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let path = window
        .location()
        .pathname()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    if create::is_create_path(&path) {
        let origin = window
            .location()
            .origin()
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        dom::set_hidden(&document, "celebration", true);
        dom::set_hidden(&document, "create-page", false);
        events::wire_create_page(&document, origin);
        return Ok(());
    }

    let Some(recipient) = recipient_from_location(&window)? else {
        dom::set_hidden(&document, "not-found", false);
        dom::set_hidden(&document, "celebration", true);
        return Ok(());
    };

    static STARTED: AtomicBool = AtomicBool::new(false);
    if STARTED.swap(true, Ordering::SeqCst) {
        log::warn!("[page] already started; ignoring");
        return Ok(());
    }

    let query = window.location().search().unwrap_or_default();
    let config = DetectorConfig::from_query(&query);
    log::info!(
        "[page] threshold={:.1} cooldown={}ms",
        config.threshold,
        config.cooldown.as_millis()
    );

    let ticker = RafTicker::new();
    let binder = ticker.clone();
    let detector = SoundLevelDetector::new(config, BrowserAudio::new(window.clone()), ticker);
    let page_events = PageEvents::new(document.clone(), recipient.variant(), frame_seed());
    let ctrl: SharedController = Rc::new(RefCell::new(CandleSessionController::new(
        detector,
        page_events,
    )));

    // Frame handler: the detector requests each next frame itself
    let clock = FrameClock::new();
    let weak = Rc::downgrade(&ctrl);
    binder.bind(move || {
        let Some(c) = weak.upgrade() else {
            return;
        };
        let was_lit = c.borrow().is_lit();
        c.borrow_mut().on_frame(clock.now());
        if c.borrow().is_lit() != was_lit {
            events::refresh(&c);
        }
    });

    let origin = window
        .location()
        .origin()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    events::fill_share_links(&document, "share", &origin, &recipient);
    events::wire_controls(&ctrl, &document);
    events::wire_keyboard(&ctrl);
    events::wire_visibility(&ctrl, &document);
    events::watch_permission(&ctrl);

    overlay::show_note(&document, &phrases::blow_prompt(&recipient));
    let pending = {
        let mut c = ctrl.borrow_mut();
        if document.hidden() {
            c.set_visible(false);
        }
        c.start_session(recipient)
    };
    events::drive(&ctrl, pending);
    events::refresh(&ctrl);
    Ok(())
}
