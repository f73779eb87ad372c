//! Birthday candles that go out when you blow at the microphone.
//!
//! Pure logic (detector, session state machine, phrases, links, effects)
//! builds on every target and is what the host tests exercise. The browser
//! bindings and the `#[wasm_bindgen(start)]` entry point only build for
//! `wasm32`.
//!
//! # Page contract
//!
//! The browser side drives the `index.html` shell at the crate root and finds
//! elements by id:
//!
//! - celebration: `celebration`, `headline`, `cake` (class `blown`), `cake-name`,
//!   `smoke-0`..`smoke-2`, `blow-note`, `relight`, `actions`, `make-wish`, `share`,
//!   `confetti`;
//! - microphone: `mic-control`, `mic-button` (classes `granted`/`denied`),
//!   `mic-meter`, `mic-meter-fill`;
//! - wish: `wish-panel`, `wish-text`, `wish-count`, `wish-submit`;
//! - links: `<prefix>-url`, `<prefix>-copy`, `<prefix>-copy-label`,
//!   `<prefix>-whatsapp`, `<prefix>-facebook`, `<prefix>-twitter` with prefix
//!   `share` (plus `share-panel`, `share-close`) or `created`;
//! - create form at `/create`: `create-page`, `create-form`, `create-name`,
//!   `create-male`, `create-female`, `create-done`, `created-prompt`,
//!   `create-go`, `create-again`;
//! - `toast`, `toast-title`, `toast-body` and `not-found`.
//!
//! Sound cues are fetched from `/sounds/blow-candle.mp3` and
//! `/sounds/magic-wand.mp3`.

pub mod celebration;
pub mod constants;
pub mod core;
pub mod create;
pub mod effects;
pub mod input;
pub mod phrases;
pub mod share;

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod audio;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod events;
#[cfg(target_arch = "wasm32")]
mod frame;
#[cfg(target_arch = "wasm32")]
mod overlay;

#[cfg(target_arch = "wasm32")]
pub use app::start;
