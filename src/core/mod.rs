pub mod analysis;
pub mod config;
pub mod detector;
pub mod error;
pub mod session;

pub use analysis::*;
pub use config::*;
pub use detector::*;
pub use error::*;
pub use session::*;
