//! The "create a celebration" form: pick a name and a variant, get a link.

use crate::celebration::{Recipient, RecipientError, Variant};
use crate::share;

/// A link produced by a successful submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatedLink {
    pub recipient: Recipient,
    /// Site-relative path, used by the "go to celebration" button.
    pub path: String,
    /// Absolute URL shown, copied and shared.
    pub url: String,
}

#[derive(Clone, Debug, Default)]
pub struct CreateForm {
    variant: Variant,
    created: Option<CreatedLink>,
}

impl CreateForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Choosing a variant after a link was made starts a new form.
    pub fn select(&mut self, variant: Variant) {
        if self.variant != variant {
            self.variant = variant;
            self.created = None;
        }
    }

    pub fn created(&self) -> Option<&CreatedLink> {
        self.created.as_ref()
    }

    /// Validate the typed name and build the celebration link for `origin`.
    pub fn submit(&mut self, name: &str, origin: &str) -> Result<&CreatedLink, RecipientError> {
        let recipient = Recipient::new(name, self.variant)?;
        let link = CreatedLink {
            path: share::celebration_path(&recipient),
            url: share::celebration_url(origin, &recipient),
            recipient,
        };
        log::info!("[create] link for {:?}: {}", link.recipient.name(), link.path);
        Ok(self.created.insert(link))
    }

    /// Back to an empty form.
    pub fn reset(&mut self) {
        self.created = None;
    }
}

/// `true` when a page path points at the create form rather than a recipient.
pub fn is_create_path(path: &str) -> bool {
    path.trim_matches('/') == crate::constants::CREATE_PATH
}
