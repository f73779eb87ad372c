use crate::constants::{CANDLE_COUNT, NOTE_VISIBLE_MS};
use crate::core::{AudioSample, CandleSession, DetectorState, Panel};
use crate::dom;
use crate::effects::{ConfettiPiece, SmokePuff};
use crate::phrases::{self, Notice};
use std::fmt::Write;
use std::sync::atomic::{AtomicU32, Ordering};
use web_sys as web;

static TOAST_SEQ: AtomicU32 = AtomicU32::new(0);

/// Show a toast; a newer toast cancels the pending hide of an older one.
pub fn toast(document: &web::Document, notice: &Notice, visible_ms: u32) {
    dom::set_text(document, "toast-title", &notice.title);
    dom::set_text(document, "toast-body", &notice.body);
    dom::set_hidden(document, "toast", false);
    let seq = TOAST_SEQ.fetch_add(1, Ordering::SeqCst) + 1;
    let doc = document.clone();
    dom::after_ms(visible_ms, move || {
        if TOAST_SEQ.load(Ordering::SeqCst) == seq {
            dom::set_hidden(&doc, "toast", true);
        }
    });
}

/// The "blow the candles" note under the cake, hidden again after a while.
pub fn show_note(document: &web::Document, text: &str) {
    dom::set_text(document, "blow-note", text);
    dom::set_hidden(document, "blow-note", false);
    let doc = document.clone();
    dom::after_ms(NOTE_VISIBLE_MS, move || dom::set_hidden(&doc, "blow-note", true));
}

pub fn set_meter(document: &web::Document, sample: AudioSample) {
    dom::set_attr(
        document,
        "mic-meter-fill",
        "style",
        &format!("width:{:.0}%", sample.meter_percent()),
    );
}

/// Bring the page in line with the session and microphone state.
pub fn render(document: &web::Document, session: Option<&CandleSession>, mic: DetectorState) {
    let Some(s) = session else {
        dom::set_hidden(document, "celebration", true);
        return;
    };
    let r = &s.recipient;
    dom::set_hidden(document, "celebration", false);
    dom::set_text(document, "cake-name", &r.cake_label());
    dom::set_class(document, "cake", "blown", !s.lit);
    let headline = if s.lit {
        phrases::blow_prompt(r)
    } else {
        phrases::happy_birthday(r)
    };
    dom::set_text(document, "headline", &headline);

    dom::set_hidden(document, "relight", s.lit);
    dom::set_hidden(document, "actions", s.lit || s.panel != Panel::Closed);
    dom::set_hidden(document, "make-wish", s.wish_sent);
    dom::set_hidden(document, "wish-panel", s.panel != Panel::WishForm);
    dom::set_hidden(document, "share-panel", s.panel != Panel::Sharing);
    dom::set_attr(
        document,
        "wish-text",
        "placeholder",
        phrases::wish_placeholder(r.variant()),
    );
    dom::set_text(document, "wish-submit", phrases::wish_submit_label(r.variant()));

    let granted = mic == DetectorState::PermissionGranted;
    dom::set_hidden(document, "mic-control", !s.lit);
    dom::set_hidden(document, "mic-meter", !granted);
    dom::set_class(document, "mic-button", "granted", granted);
    dom::set_class(document, "mic-button", "denied", mic.is_unavailable());
    let tooltip = phrases::mic_tooltip(r.variant(), granted);
    dom::set_attr(document, "mic-button", "title", tooltip);
    dom::set_attr(document, "mic-button", "aria-label", tooltip);
}

pub fn render_smoke(document: &web::Document, puffs: &[SmokePuff]) {
    for candle in 0..CANDLE_COUNT {
        let mut html = String::new();
        for p in puffs.iter().filter(|p| p.candle == candle) {
            _ = write!(
                html,
                "<span class='smoke' style='--dx:{:.1}px;--dy:{:.1}px;--o:{:.2};--s:{:.2};--r:{:.0}deg;--t:{:.2}s'></span>",
                p.dx, p.dy, p.opacity, p.scale, p.rotate_deg, p.duration_sec
            );
        }
        if let Some(el) = document.get_element_by_id(&format!("smoke-{}", candle)) {
            el.set_inner_html(&html);
        }
    }
}

pub fn clear_smoke(document: &web::Document) {
    render_smoke(document, &[]);
}

pub fn render_confetti(document: &web::Document, pieces: &[ConfettiPiece]) {
    let mut html = String::new();
    for c in pieces {
        _ = write!(
            html,
            "<i class='confetti' style='left:{:.1}%;width:{:.1}px;height:{:.1}px;background:{};--r:{:.0}deg;animation-delay:{:.2}s;animation-duration:{:.2}s'></i>",
            c.x * 100.0,
            c.size_px,
            c.size_px * 0.4,
            c.color,
            c.rotate_deg,
            c.delay_sec,
            c.fall_sec
        );
    }
    if let Some(el) = document.get_element_by_id("confetti") {
        el.set_inner_html(&html);
    }
}
