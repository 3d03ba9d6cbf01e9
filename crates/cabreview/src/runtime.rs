// SPDX-FileCopyrightText: 2026 Cabreview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Startup wiring shared by the commands.

use std::sync::Arc;

use cabreview_config::CabreviewConfig;
use cabreview_core::CabreviewError;
use cabreview_dispatch::{BarredPrefixes, DispatchEngine, MasterQueue, ReviewMasterEndpoint};
use cabreview_storage::SqliteStore;
use cabreview_transport::HttpSender;
use tracing::{info, warn};

/// Opens the store, migrating it if needed.
pub async fn open_store(config: &CabreviewConfig) -> Result<Arc<SqliteStore>, CabreviewError> {
    let store = SqliteStore::new(config.storage.clone());
    store.initialize().await?;
    Ok(Arc::new(store))
}

/// Builds a ready engine over `store`.
///
/// The barred prefix list is read once here. The master queue id is loaded
/// when configured to; a failure leaves it at 0.
pub async fn build_engine(
    config: &CabreviewConfig,
    store: Arc<SqliteStore>,
) -> Result<DispatchEngine, CabreviewError> {
    let sender = Arc::new(HttpSender::from_config(&config.http)?);
    let barred = match &config.dispatch.barred_prefix_file {
        Some(path) => BarredPrefixes::load(path),
        None => BarredPrefixes::default(),
    };

    let engine = DispatchEngine::new(
        store,
        sender,
        Arc::new(barred),
        Arc::new(MasterQueue::default()),
        ReviewMasterEndpoint {
            url: config.review_master.url.clone(),
            api_token: config.review_master.api_token.clone(),
        },
    );

    if config.dispatch.refresh_master_queue_on_start {
        match engine.refresh_master_queue().await {
            Ok(id) => info!(master_queue_id = id, "master queue loaded"),
            Err(e) => warn!(error = %e, "failed to load master queue id"),
        }
    }
    Ok(engine)
}
