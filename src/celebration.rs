//! Recipient and wish values carried by a celebration page.

use crate::constants::*;
use thiserror::Error;

/// Grammatical variant used to pick phrase forms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Variant {
    #[default]
    Male,
    Female,
}

impl Variant {
    /// `female` selects the feminine forms; anything else is masculine.
    pub fn from_query_value(value: Option<&str>) -> Self {
        match value {
            Some("female") => Variant::Female,
            _ => Variant::Male,
        }
    }

    pub fn query_value(self) -> Option<&'static str> {
        match self {
            Variant::Male => None,
            Variant::Female => Some("female"),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RecipientError {
    #[error("recipient name is empty")]
    Empty,
    #[error("recipient name has {0} characters (max {max})", max = MAX_NAME_CHARS)]
    TooLong(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recipient {
    name: String,
    variant: Variant,
}

impl Recipient {
    /// Validate an already-decoded display name.
    pub fn new(name: &str, variant: Variant) -> Result<Self, RecipientError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RecipientError::Empty);
        }
        let chars = name.chars().count();
        if chars > MAX_NAME_CHARS {
            return Err(RecipientError::TooLong(chars));
        }
        Ok(Self {
            name: name.to_string(),
            variant,
        })
    }

    /// Build from a decoded path segment and the page query string.
    ///
    /// A missing segment falls back to the default display name.
    pub fn from_page(segment: Option<&str>, query: &str) -> Result<Self, RecipientError> {
        let gender = crate::core::query_pairs(query)
            .find(|(k, _)| k == "gender")
            .map(|(_, v)| v);
        let variant = Variant::from_query_value(gender.as_deref());
        match segment {
            Some(s) if !s.trim().is_empty() => Self::new(s, variant),
            _ => Self::new(DEFAULT_RECIPIENT, variant),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Name as written on the cake: at most ten characters, then `...`.
    pub fn cake_label(&self) -> String {
        truncate_chars(&self.name, CAKE_NAME_CHARS)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WishError {
    #[error("wish is empty")]
    Empty,
    #[error("wish has {0} characters (max {max})", max = MAX_WISH_CHARS)]
    TooLong(usize),
    #[error("candles are still lit")]
    CandlesLit,
    #[error("a wish was already sent")]
    AlreadySent,
    #[error("no celebration is running")]
    NoSession,
}

/// A wish written after the candles went out. Never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wish {
    pub recipient: String,
    pub variant: Variant,
    pub text: String,
}

impl Wish {
    pub fn new(recipient: &Recipient, text: &str) -> Result<Self, WishError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(WishError::Empty);
        }
        let chars = text.chars().count();
        if chars > MAX_WISH_CHARS {
            return Err(WishError::TooLong(chars));
        }
        Ok(Self {
            recipient: recipient.name().to_string(),
            variant: recipient.variant(),
            text: text.to_string(),
        })
    }

    /// Short quote used in the confirmation toast.
    pub fn preview(&self) -> String {
        truncate_chars(&self.text, WISH_PREVIEW_CHARS)
    }
}

/// Keep the first `max` characters, appending `...` when something was cut.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
