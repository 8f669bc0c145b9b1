pub mod config;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod preview;
pub mod services;
pub mod startup;

use preview::PreviewAggregator;
use services::IdentityBridge;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<IdentityBridge>,
    pub previews: Arc<PreviewAggregator>,
}

impl AppState {
    pub fn new(identity: Arc<IdentityBridge>, previews: Arc<PreviewAggregator>) -> Self {
        Self { identity, previews }
    }
}
