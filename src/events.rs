use crate::audio::{self, BrowserAudio, BrowserMicrophone};
use crate::celebration::{Recipient, Variant, Wish};
use crate::constants::*;
use crate::core::{
    AcquireError, AudioInput, AudioSample, CandleSession, CandleSessionController, DetectorState,
    PendingAcquire, SessionEvents, TriggerSource,
};
use crate::create::CreateForm;
use crate::dom;
use crate::effects::Effects;
use crate::frame::RafTicker;
use crate::input::{action_for_key, KeyAction};
use crate::overlay;
use crate::phrases;
use crate::share::{self, Platform};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

pub type PageController = CandleSessionController<BrowserAudio, RafTicker, PageEvents>;
pub type SharedController = Rc<RefCell<PageController>>;

/// Session side effects rendered into the page.
pub struct PageEvents {
    document: web::Document,
    variant: Variant,
    effects: Effects,
}

impl PageEvents {
    pub fn new(document: web::Document, variant: Variant, seed: u64) -> Self {
        Self {
            document,
            variant,
            effects: Effects::new(seed),
        }
    }
}

impl SessionEvents for PageEvents {
    fn extinguished(&mut self, session: &CandleSession, source: TriggerSource) {
        log::info!("[page] extinguished by {:?}", source);
        audio::play_cue(BLOW_SOUND_URL);
        vibrate(&EXTINGUISH_VIBRATION_MS);
        overlay::render_smoke(&self.document, &self.effects.smoke());
        overlay::toast(
            &self.document,
            &phrases::extinguished_notice(&session.recipient),
            TOAST_LONG_MS,
        );
    }

    fn relit(&mut self, session: &CandleSession) {
        overlay::clear_smoke(&self.document);
        overlay::render_confetti(&self.document, &[]);
        overlay::toast(&self.document, &phrases::relit_notice(), TOAST_SHORT_MS);
        overlay::show_note(&self.document, &phrases::blow_prompt(&session.recipient));
    }

    fn permission_changed(&mut self, state: DetectorState, _reason: Option<&AcquireError>) {
        if state == DetectorState::PermissionGranted {
            overlay::toast(
                &self.document,
                &phrases::mic_enabled_notice(self.variant),
                TOAST_SHORT_MS,
            );
        }
    }

    fn manual_fallback(&mut self, _session: &CandleSession, reason: &AcquireError) {
        overlay::toast(
            &self.document,
            &phrases::mic_fallback_notice(self.variant, reason),
            TOAST_LONG_MS,
        );
    }

    fn wish_made(&mut self, _session: &CandleSession, wish: &Wish) {
        audio::play_cue(WISH_SOUND_URL);
        overlay::render_confetti(&self.document, &self.effects.confetti());
        overlay::toast(&self.document, &phrases::wish_sent_notice(wish), TOAST_LONG_MS);
    }

    fn level(&mut self, sample: AudioSample) {
        overlay::set_meter(&self.document, sample);
    }
}

fn vibrate(pattern_ms: &[u32]) {
    let Some(w) = web::window() else {
        return;
    };
    let navigator = w.navigator();
    if !js_sys::Reflect::has(&navigator, &JsValue::from_str("vibrate")).unwrap_or(false) {
        return;
    }
    let pattern = js_sys::Array::new();
    for ms in pattern_ms {
        pattern.push(&JsValue::from(*ms));
    }
    _ = navigator.vibrate_with_pattern(&pattern);
}

/// Await a device request off the current callback and hand the result back.
pub fn drive(ctrl: &SharedController, pending: Option<PendingAcquire<BrowserMicrophone>>) {
    let Some(PendingAcquire { ticket, future }) = pending else {
        return;
    };
    let weak = Rc::downgrade(ctrl);
    spawn_local(async move {
        let result = future.await;
        match weak.upgrade() {
            Some(c) => {
                c.borrow_mut().finish_activation(ticket, result);
                refresh(&c);
            }
            None => {
                if let Ok(mut input) = result {
                    input.release();
                }
            }
        }
    });
}

pub fn refresh(ctrl: &SharedController) {
    if let Some(document) = dom::window_document() {
        let c = ctrl.borrow();
        overlay::render(&document, c.session(), c.permission());
    }
}

fn perform(ctrl: &SharedController, action: KeyAction) {
    let pending = {
        let mut c = ctrl.borrow_mut();
        match action {
            KeyAction::Blow => {
                c.on_external_trigger(TriggerSource::Manual);
                None
            }
            KeyAction::Relight => c.relight(),
            KeyAction::MakeWish => {
                c.open_wish_form();
                None
            }
            KeyAction::Share => {
                c.open_sharing();
                None
            }
            KeyAction::ClosePanel => {
                c.close_panel();
                None
            }
        }
    };
    drive(ctrl, pending);
    refresh(ctrl);
}

/// Mic button: manual blow when the microphone is out of reach, otherwise
/// (re)request it.
fn on_mic_button(ctrl: &SharedController) {
    let pending = {
        let mut c = ctrl.borrow_mut();
        if c.permission().is_unavailable() {
            c.on_external_trigger(TriggerSource::Manual);
            None
        } else if c.detector().is_sampling() {
            log::debug!("[page] microphone already listening");
            None
        } else {
            c.resume_listening()
        }
    };
    drive(ctrl, pending);
    refresh(ctrl);
}

fn wish_textarea(document: &web::Document) -> Option<web::HtmlTextAreaElement> {
    document
        .get_element_by_id("wish-text")
        .and_then(|el| el.dyn_into::<web::HtmlTextAreaElement>().ok())
}

fn submit_wish(ctrl: &SharedController, document: &web::Document) {
    let Some(textarea) = wish_textarea(document) else {
        return;
    };
    let result = ctrl.borrow_mut().submit_wish(&textarea.value());
    match result {
        Ok(_) => {
            textarea.set_value("");
            dom::set_text(document, "wish-count", &format!("0/{}", MAX_WISH_CHARS));
        }
        Err(e) => log::warn!("[page] wish rejected: {}", e),
    }
    refresh(ctrl);
}

fn wire_wish_counter(document: &web::Document) {
    let Some(textarea) = wish_textarea(document) else {
        return;
    };
    let doc = document.clone();
    let ta = textarea.clone();
    let closure = Closure::wrap(Box::new(move || {
        let value = ta.value();
        let chars = value.chars().count();
        if chars > MAX_WISH_CHARS {
            let kept: String = value.chars().take(MAX_WISH_CHARS).collect();
            ta.set_value(&kept);
        }
        let shown = chars.min(MAX_WISH_CHARS);
        dom::set_text(&doc, "wish-count", &format!("{}/{}", shown, MAX_WISH_CHARS));
    }) as Box<dyn FnMut()>);
    _ = textarea.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
    closure.forget();
}

/// Fill a link box and its share buttons (`#<prefix>-url`, `#<prefix>-whatsapp`, ...).
pub fn fill_share_links(document: &web::Document, prefix: &str, origin: &str, recipient: &Recipient) {
    let url_id = format!("{}-url", prefix);
    dom::set_text(document, &url_id, &share::celebration_url(origin, recipient));
    for platform in Platform::ALL {
        let id = format!("{}-{}", prefix, platform.label().to_lowercase());
        dom::set_attr(document, &id, "href", &share::share_url(platform, origin, recipient));
        dom::set_attr(document, &id, "target", "_blank");
        dom::set_attr(document, &id, "rel", "noopener noreferrer");
        dom::set_attr(document, &id, "aria-label", &format!("Share on {}", platform.label()));
    }
}

async fn write_clipboard(text: &str) -> Result<(), JsValue> {
    let window = web::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let clipboard = js_sys::Reflect::get(&window.navigator(), &JsValue::from_str("clipboard"))?;
    if clipboard.is_undefined() || clipboard.is_null() {
        return Err(JsValue::from_str("clipboard unavailable"));
    }
    let write: js_sys::Function =
        js_sys::Reflect::get(&clipboard, &JsValue::from_str("writeText"))?.dyn_into()?;
    let promise: js_sys::Promise = write
        .call1(&clipboard, &JsValue::from_str(text))?
        .dyn_into()?;
    JsFuture::from(promise).await?;
    Ok(())
}

/// Copy button beside a link box; copies whatever `#<prefix>-url` shows.
fn wire_copy(document: &web::Document, prefix: &str) {
    let doc = document.clone();
    let url_id = format!("{}-url", prefix);
    let label_id = format!("{}-copy-label", prefix);
    dom::add_click_listener(document, &format!("{}-copy", prefix), move || {
        let Some(url) = doc.get_element_by_id(&url_id).and_then(|el| el.text_content()) else {
            return;
        };
        let doc = doc.clone();
        let label_id = label_id.clone();
        spawn_local(async move {
            match write_clipboard(&url).await {
                Ok(()) => {
                    overlay::toast(&doc, &phrases::copied_notice(), TOAST_SHORT_MS);
                    dom::set_text(&doc, &label_id, phrases::copy_label(true));
                    let d = doc.clone();
                    dom::after_ms(COPIED_LABEL_MS, move || {
                        dom::set_text(&d, &label_id, phrases::copy_label(false))
                    });
                }
                Err(e) => {
                    log::warn!("[page] copy failed: {:?}", e);
                    overlay::toast(&doc, &phrases::copy_failed_notice(), TOAST_SHORT_MS);
                }
            }
        });
    });
}

type SharedForm = Rc<RefCell<CreateForm>>;

fn render_create(document: &web::Document, form: &CreateForm) {
    let created = form.created().is_some();
    dom::set_hidden(document, "create-form", created);
    dom::set_hidden(document, "create-done", !created);
    dom::set_class(document, "create-male", "selected", form.variant() == Variant::Male);
    dom::set_class(document, "create-female", "selected", form.variant() == Variant::Female);
}

fn submit_create(form: &SharedForm, document: &web::Document, origin: &str) {
    let name = document
        .get_element_by_id("create-name")
        .and_then(|el| el.dyn_into::<web::HtmlInputElement>().ok())
        .map(|input| input.value())
        .unwrap_or_default();
    {
        let mut f = form.borrow_mut();
        match f.submit(&name, origin) {
            Ok(link) => {
                fill_share_links(document, "created", origin, &link.recipient);
                dom::set_text(document, "created-prompt", &phrases::share_prompt(&link.recipient));
                overlay::toast(document, &phrases::created_notice(&link.recipient), TOAST_SHORT_MS);
            }
            Err(e) => {
                log::warn!("[create] rejected name: {}", e);
                overlay::toast(document, &phrases::create_error_notice(&e), TOAST_SHORT_MS);
            }
        }
    }
    render_create(document, &form.borrow());
}

/// Wire the link-creation page served at `/create`.
pub fn wire_create_page(document: &web::Document, origin: String) {
    let form: SharedForm = Rc::new(RefCell::new(CreateForm::new()));
    render_create(document, &form.borrow());

    for (id, variant) in [("create-male", Variant::Male), ("create-female", Variant::Female)] {
        let f = form.clone();
        let doc = document.clone();
        dom::add_click_listener(document, id, move || {
            f.borrow_mut().select(variant);
            render_create(&doc, &f.borrow());
        });
    }

    if let Some(el) = document.get_element_by_id("create-form") {
        let f = form.clone();
        let doc = document.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::Event| {
            ev.prevent_default();
            submit_create(&f, &doc, &origin);
        }) as Box<dyn FnMut(_)>);
        _ = el.add_event_listener_with_callback("submit", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    let f = form.clone();
    dom::add_click_listener(document, "create-go", move || {
        let Some(path) = f.borrow().created().map(|link| link.path.clone()) else {
            return;
        };
        if let Some(w) = web::window() {
            if let Err(e) = w.location().set_href(&path) {
                log::error!("[create] navigation error: {:?}", e);
            }
        }
    });

    let f = form;
    let doc = document.clone();
    dom::add_click_listener(document, "create-again", move || {
        f.borrow_mut().reset();
        render_create(&doc, &f.borrow());
    });
    wire_copy(document, "created");
}

pub fn wire_controls(ctrl: &SharedController, document: &web::Document) {
    let c = ctrl.clone();
    dom::add_click_listener(document, "cake", move || perform(&c, KeyAction::Blow));
    let c = ctrl.clone();
    dom::add_click_listener(document, "mic-button", move || on_mic_button(&c));
    let c = ctrl.clone();
    dom::add_click_listener(document, "relight", move || perform(&c, KeyAction::Relight));
    let c = ctrl.clone();
    dom::add_click_listener(document, "make-wish", move || perform(&c, KeyAction::MakeWish));
    let c = ctrl.clone();
    dom::add_click_listener(document, "share", move || perform(&c, KeyAction::Share));
    let c = ctrl.clone();
    dom::add_click_listener(document, "share-close", move || {
        perform(&c, KeyAction::ClosePanel)
    });
    let c = ctrl.clone();
    let doc = document.clone();
    dom::add_click_listener(document, "wish-submit", move || submit_wish(&c, &doc));
    wire_wish_counter(document);
    wire_copy(document, "share");
}

pub fn wire_keyboard(ctrl: &SharedController) {
    let Some(window) = web::window() else {
        return;
    };
    let c = ctrl.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
        // typing a wish must not blow or relight the candles
        let in_textarea = ev
            .target()
            .and_then(|t| t.dyn_into::<web::HtmlTextAreaElement>().ok())
            .is_some();
        if in_textarea {
            return;
        }
        if let Some(action) = action_for_key(&ev.key()) {
            perform(&c, action);
            ev.prevent_default();
        }
    }) as Box<dyn FnMut(_)>);
    _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
    closure.forget();
}

/// Hidden tabs and closed pages never hold the microphone.
pub fn wire_visibility(ctrl: &SharedController, document: &web::Document) {
    let c = ctrl.clone();
    let doc = document.clone();
    let closure = Closure::wrap(Box::new(move || {
        let visible = !doc.hidden();
        let pending = c.borrow_mut().set_visible(visible);
        drive(&c, pending);
        refresh(&c);
    }) as Box<dyn FnMut()>);
    _ = document
        .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
    closure.forget();

    let Some(window) = web::window() else {
        return;
    };
    // the page may come back from the back/forward cache, so keep the session
    let c = ctrl.clone();
    let closure = Closure::wrap(Box::new(move || {
        c.borrow_mut().set_visible(false);
    }) as Box<dyn FnMut()>);
    _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
    closure.forget();

    let c = ctrl.clone();
    let doc = document.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::PageTransitionEvent| {
        if !ev.persisted() {
            return;
        }
        log::info!("[page] restored from cache");
        let pending = c.borrow_mut().set_visible(!doc.hidden());
        drive(&c, pending);
        refresh(&c);
    }) as Box<dyn FnMut(_)>);
    _ = window.add_event_listener_with_callback("pageshow", closure.as_ref().unchecked_ref());
    closure.forget();
}

/// Follow the microphone permission so a revoke in browser settings stops
/// sampling at once.
pub fn watch_permission(ctrl: &SharedController) {
    let Some(window) = web::window() else {
        return;
    };
    let Ok(permissions) = window.navigator().permissions() else {
        return;
    };
    let descriptor = js_sys::Object::new();
    _ = js_sys::Reflect::set(
        &descriptor,
        &JsValue::from_str("name"),
        &JsValue::from_str("microphone"),
    );
    let Ok(promise) = permissions.query(&descriptor) else {
        return;
    };
    let weak = Rc::downgrade(ctrl);
    spawn_local(async move {
        let status: web::PermissionStatus = match JsFuture::from(promise).await {
            Ok(v) => v.unchecked_into(),
            Err(e) => {
                log::warn!("[page] permission query error: {:?}", e);
                return;
            }
        };
        let st = status.clone();
        let closure = Closure::wrap(Box::new(move || {
            if st.state() != web::PermissionState::Denied {
                return;
            }
            if let Some(c) = weak.upgrade() {
                c.borrow_mut().on_permission_revoked();
                refresh(&c);
            }
        }) as Box<dyn FnMut()>);
        status.set_onchange(Some(closure.as_ref().unchecked_ref()));
        closure.forget();
    });
}
