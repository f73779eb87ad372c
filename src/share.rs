//! Celebration links and social share URLs.

use crate::celebration::Recipient;
use crate::phrases;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters escaped by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[inline]
pub fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    WhatsApp,
    Facebook,
    Twitter,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::WhatsApp, Platform::Facebook, Platform::Twitter];

    pub fn label(self) -> &'static str {
        match self {
            Platform::WhatsApp => "WhatsApp",
            Platform::Facebook => "Facebook",
            Platform::Twitter => "Twitter",
        }
    }
}

/// Site-relative path of the recipient's page, e.g. `/Sara?gender=female`.
pub fn celebration_path(r: &Recipient) -> String {
    let mut path = format!("/{}", encode_component(r.name()));
    if let Some(g) = r.variant().query_value() {
        path.push_str("?gender=");
        path.push_str(g);
    }
    path
}

pub fn celebration_url(origin: &str, r: &Recipient) -> String {
    format!("{}{}", origin.trim_end_matches('/'), celebration_path(r))
}

pub fn share_url(platform: Platform, origin: &str, r: &Recipient) -> String {
    let url = encode_component(&celebration_url(origin, r));
    let message = encode_component(&phrases::share_message(r));
    match platform {
        Platform::Facebook => format!("https://www.facebook.com/sharer/sharer.php?u={}", url),
        Platform::Twitter => format!(
            "https://twitter.com/intent/tweet?text={}&url={}",
            message, url
        ),
        Platform::WhatsApp => format!("https://api.whatsapp.com/send?text={}%20{}", message, url),
    }
}
