//! Cropper WASM - WebAssembly bindings for Cropper
//!
//! This crate exposes a crop session to JavaScript. Previews are rendered in
//! WASM memory and copied out as RGBA for `putImageData`; exports are handed
//! back as object URLs and downloaded through a hidden anchor.
//!
//! # Module Structure
//!
//! - `session` - `JsCropSession`, the per-editor crop session
//! - `browser` - object URL registry and anchor download
//! - `logger` - `log` output routed to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsCropSession } from '@cropper/wasm';
//!
//! await init();
//! const session = new JsCropSession({ output: { type: 'jpeg', quality: 85 } });
//! ```

use wasm_bindgen::prelude::*;

mod browser;
mod logger;
mod session;

pub use browser::{device_pixel_ratio, AnchorDownload, ObjectUrlRegistry};
pub use session::JsCropSession;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logger::init(log::LevelFilter::Info);
}

/// Change the console log level: "error", "warn", "info", "debug" or "trace".
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let filter = parse_level(level).ok_or_else(|| JsValue::from_str("unknown log level"))?;
    logger::init(filter);
    Ok(())
}

fn parse_level(level: &str) -> Option<log::LevelFilter> {
    level.parse().ok()
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
