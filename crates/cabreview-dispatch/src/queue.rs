// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide Review-Master master queue id.

use std::sync::atomic::{AtomicU64, Ordering};

use cabreview_core::{CabreviewError, Store};
use tracing::info;

/// Master queue id shared by every event handler.
///
/// Set once at startup and replaced only by an explicit [`MasterQueue::refresh`].
#[derive(Debug, Default)]
pub struct MasterQueue {
    id: AtomicU64,
}

impl MasterQueue {
    pub fn new(id: u64) -> Self {
        Self {
            id: AtomicU64::new(id),
        }
    }

    pub fn get(&self) -> u64 {
        self.id.load(Ordering::Acquire)
    }

    pub fn set(&self, id: u64) {
        self.id.store(id, Ordering::Release);
    }

    /// Reload the id from the store. On error the current id is kept.
    pub async fn refresh(&self, store: &dyn Store) -> Result<u64, CabreviewError> {
        let id = store.master_queue_id().await?;
        let previous = self.id.swap(id, Ordering::AcqRel);
        if previous != id {
            info!(previous, id, "master queue id refreshed");
        }
        Ok(id)
    }
}
