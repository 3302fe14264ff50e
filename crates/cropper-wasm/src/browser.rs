//! Browser implementations of the publishing seams.
//!
//! Exports become object URLs (`URL.createObjectURL`) and downloads are
//! started by clicking a hidden `<a download>` element.

use std::sync::Arc;

use cropper_core::{BlobHandle, BlobRegistry, CropError, DownloadTrigger, ExportedBlob};
use log::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{BlobPropertyBag, HtmlAnchorElement, Url};

/// Registry backed by the page's object URL store.
#[derive(Debug, Default)]
pub struct ObjectUrlRegistry;

impl BlobRegistry for ObjectUrlRegistry {
    fn mint(&mut self, blob: &Arc<ExportedBlob>) -> Result<BlobHandle, CropError> {
        object_url(blob)
            .map(BlobHandle::new)
            .map_err(|e| CropError::PublishFailed(describe(&e)))
    }

    fn revoke(&mut self, handle: &BlobHandle) {
        if let Err(e) = Url::revoke_object_url(handle.as_str()) {
            warn!("failed to revoke {}: {}", handle, describe(&e));
        }
    }
}

fn object_url(blob: &ExportedBlob) -> Result<String, JsValue> {
    let bytes = js_sys::Uint8Array::from(blob.bytes());
    let parts = js_sys::Array::new();
    parts.push(&bytes);

    let opts = BlobPropertyBag::new();
    opts.set_type(blob.mime_type());
    let js_blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &opts)?;
    Url::create_object_url_with_blob(&js_blob)
}

/// Starts a download by clicking a detached, hidden anchor.
#[derive(Debug, Default)]
pub struct AnchorDownload;

impl DownloadTrigger for AnchorDownload {
    fn trigger(&mut self, handle: &BlobHandle, _blob: &ExportedBlob, filename: &str) {
        if let Err(e) = click_anchor(handle.as_str(), filename) {
            warn!("download of {} failed: {}", filename, describe(&e));
        }
    }
}

fn click_anchor(href: &str, filename: &str) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document available"))?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))?;

    let anchor: HtmlAnchorElement = document
        .create_element("a")?
        .dyn_into()
        .map_err(JsValue::from)?;
    anchor.set_href(href);
    anchor.set_download(filename);
    anchor.set_attribute("style", "display:none;")?;

    body.append_child(&anchor)?;
    anchor.click();
    anchor.remove();
    Ok(())
}

/// The window's device pixel ratio, never below 1.
pub fn device_pixel_ratio() -> f64 {
    normalize_pixel_ratio(
        web_sys::window()
            .map(|w| w.device_pixel_ratio())
            .unwrap_or(1.0),
    )
}

/// Zoomed-out pages report ratios below 1, which would shrink the preview
/// below natural resolution.
pub fn normalize_pixel_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() && ratio >= 1.0 {
        ratio
    } else {
        1.0
    }
}

fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}
