// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Display handles — encoded images registered under an opaque handle so the
// UI, the PDF exporter or the AI client can fetch them without copying.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use inkscan_core::error::{InkscanError, Result};
use inkscan_core::types::ImageHandle;
use tracing::debug;

/// An entry in the registry.
#[derive(Debug, Clone)]
pub struct RegisteredImage {
    pub bytes: Arc<[u8]>,
    pub mime_type: &'static str,
}

/// Thread-safe map from handle to encoded bytes. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct HandleRegistry {
    entries: Arc<Mutex<HashMap<ImageHandle, RegisteredImage>>>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `bytes` and return a fresh handle for them.
    pub fn register(&self, bytes: Arc<[u8]>, mime_type: &'static str) -> ImageHandle {
        let handle = ImageHandle::new();
        debug!(%handle, mime_type, bytes = bytes.len(), "image registered");
        self.lock().insert(handle, RegisteredImage { bytes, mime_type });
        handle
    }

    /// Look up a handle.
    pub fn resolve(&self, handle: &ImageHandle) -> Result<RegisteredImage> {
        self.lock()
            .get(handle)
            .cloned()
            .ok_or(InkscanError::UnknownHandle(*handle))
    }

    /// Release a handle. Returns whether it was registered.
    pub fn revoke(&self, handle: &ImageHandle) -> bool {
        let removed = self.lock().remove(handle).is_some();
        if removed {
            debug!(%handle, "image revoked");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ImageHandle, RegisteredImage>> {
        // Entries are inserted whole; a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_resolve_revoke() {
        let registry = HandleRegistry::new();
        let handle = registry.register(Arc::from(vec![1u8, 2, 3]), "image/png");

        let entry = registry.resolve(&handle).unwrap();
        assert_eq!(&*entry.bytes, &[1, 2, 3]);
        assert_eq!(entry.mime_type, "image/png");
        assert_eq!(registry.len(), 1);

        assert!(registry.revoke(&handle));
        assert!(!registry.revoke(&handle));
        assert!(registry.is_empty());
        assert!(matches!(
            registry.resolve(&handle),
            Err(InkscanError::UnknownHandle(h)) if h == handle
        ));
    }

    #[test]
    fn clones_share_entries() {
        let registry = HandleRegistry::new();
        let other = registry.clone();
        let handle = other.register(Arc::from(vec![9u8]), "image/jpeg");
        assert!(registry.resolve(&handle).is_ok());
    }

    #[test]
    fn concurrent_registration() {
        let registry = HandleRegistry::new();
        let threads: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                std::thread::spawn(move || registry.register(Arc::from(vec![i as u8]), "image/png"))
            })
            .collect();
        let handles: Vec<_> = threads.into_iter().map(|t| t.join().unwrap()).collect();

        assert_eq!(registry.len(), 8);
        for handle in handles {
            assert!(registry.resolve(&handle).is_ok());
        }
    }
}
