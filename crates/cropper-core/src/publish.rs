//! Publishing exported blobs behind revocable handles.
//!
//! A [`Publisher`] owns a single slot. Publishing a new blob revokes the
//! handle in the slot before the registry mints the next one, so at most one
//! handle is ever live per publisher. Dropping the publisher revokes whatever
//! is left.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::{debug, info};

use crate::error::CropError;
use crate::export::ExportedBlob;

/// A revocable reference to a published blob, typically a `blob:` URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobHandle(String);

impl BlobHandle {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mints and revokes handles for blobs.
pub trait BlobRegistry {
    /// Issue a new live handle for `blob`.
    ///
    /// # Errors
    ///
    /// Returns `CropError::PublishFailed` if no handle can be issued.
    fn mint(&mut self, blob: &Arc<ExportedBlob>) -> Result<BlobHandle, CropError>;

    /// Release `handle`. Revoking an unknown handle is a no-op.
    fn revoke(&mut self, handle: &BlobHandle);
}

/// Hands a freshly minted handle to the user, e.g. by starting a download.
///
/// Fire-and-forget: implementations report their own failures.
pub trait DownloadTrigger {
    fn trigger(&mut self, handle: &BlobHandle, blob: &ExportedBlob, filename: &str);
}

/// The blob currently held by a publisher.
#[derive(Debug, Clone)]
pub struct PublishedArtifact {
    handle: BlobHandle,
    blob: Arc<ExportedBlob>,
    filename: String,
}

impl PublishedArtifact {
    pub fn handle(&self) -> &BlobHandle {
        &self.handle
    }

    pub fn blob(&self) -> &ExportedBlob {
        &self.blob
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }
}

/// Single-slot owner of the most recently published blob.
pub struct Publisher<R: BlobRegistry, D: DownloadTrigger> {
    registry: R,
    download: D,
    current: Option<PublishedArtifact>,
}

impl<R: BlobRegistry, D: DownloadTrigger> Publisher<R, D> {
    pub fn new(registry: R, download: D) -> Self {
        Self {
            registry,
            download,
            current: None,
        }
    }

    /// Revoke the previous handle, mint one for `blob` and trigger a download.
    ///
    /// # Errors
    ///
    /// Returns `CropError::PublishFailed` if the registry cannot mint. The
    /// previous handle is already revoked at that point, so the slot is left
    /// empty.
    pub fn publish(
        &mut self,
        blob: ExportedBlob,
        filename: &str,
    ) -> Result<&PublishedArtifact, CropError> {
        self.release();

        let blob = Arc::new(blob);
        let handle = self.registry.mint(&blob)?;
        info!(
            "published {} ({} bytes, {}x{}) as {}",
            filename,
            blob.len(),
            blob.size().width,
            blob.size().height,
            handle
        );
        self.download.trigger(&handle, &blob, filename);

        let published: &PublishedArtifact = self.current.insert(PublishedArtifact {
            handle,
            blob,
            filename: filename.to_string(),
        });
        Ok(published)
    }

    /// Revoke the live handle, if any.
    pub fn release(&mut self) {
        if let Some(previous) = self.current.take() {
            debug!("revoking {}", previous.handle);
            self.registry.revoke(&previous.handle);
        }
    }

    pub fn current(&self) -> Option<&PublishedArtifact> {
        self.current.as_ref()
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn download(&self) -> &D {
        &self.download
    }
}

impl<R: BlobRegistry, D: DownloadTrigger> Drop for Publisher<R, D> {
    fn drop(&mut self) {
        self.release();
    }
}

/// In-process registry issuing `blob:cropper/<n>` handles.
#[derive(Debug, Default)]
pub struct MemoryBlobRegistry {
    next_id: u64,
    live: HashMap<BlobHandle, Arc<ExportedBlob>>,
}

impl MemoryBlobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the blob behind a live handle.
    pub fn resolve(&self, handle: &BlobHandle) -> Option<&ExportedBlob> {
        self.live.get(handle).map(Arc::as_ref)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

impl BlobRegistry for MemoryBlobRegistry {
    fn mint(&mut self, blob: &Arc<ExportedBlob>) -> Result<BlobHandle, CropError> {
        self.next_id += 1;
        let handle = BlobHandle::new(format!("blob:cropper/{}", self.next_id));
        self.live.insert(handle.clone(), Arc::clone(blob));
        Ok(handle)
    }

    fn revoke(&mut self, handle: &BlobHandle) {
        self.live.remove(handle);
    }
}
