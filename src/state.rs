use std::sync::Arc;

use crate::booking::BookingCommitter;
use crate::config::Config;
use crate::notify::OutboxSignal;
use crate::store::GymStore;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn GymStore>,
    pub committer: BookingCommitter,
    pub outbox: OutboxSignal,
}

impl AppState {
    pub fn new(store: Arc<dyn GymStore>, config: &Config) -> Self {
        let outbox = OutboxSignal::new();
        let committer =
            BookingCommitter::new(store.clone(), outbox.clone(), config.site_url.clone());
        Self {
            store,
            committer,
            outbox,
        }
    }
}
