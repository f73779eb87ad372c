use thiserror::Error;

/// Why the microphone could not be used.
///
/// Every variant is recoverable: the session falls back to the manual trigger.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AcquireError {
    #[error("Unsupported platform")]
    Unsupported,
    #[error("Requires secure transport")]
    InsecureContext,
    #[error("Permission denied")]
    PermissionDenied,
    #[error("Device not found")]
    DeviceNotFound,
    #[error("Generic failure: {0}")]
    Other(String),
}

impl AcquireError {
    /// Map a `DOMException` name from `getUserMedia` onto a cause.
    pub fn from_dom_name(name: &str, message: &str) -> Self {
        match name {
            "NotAllowedError" | "PermissionDeniedError" | "SecurityError" => {
                AcquireError::PermissionDenied
            }
            "NotFoundError" | "DevicesNotFoundError" | "OverconstrainedError" => {
                AcquireError::DeviceNotFound
            }
            "NotSupportedError" => AcquireError::Unsupported,
            _ => AcquireError::Other(message.to_string()),
        }
    }

    /// Environment problems land in `Unsupported`; everything else is a denial.
    pub fn is_environmental(&self) -> bool {
        matches!(self, AcquireError::Unsupported | AcquireError::InsecureContext)
    }
}
