//! Server state.

use std::sync::Arc;

use hiroba_shared::time::{Clock, SystemClock};

use crate::hub::Hub;

/// Shared application state
pub struct AppState {
    /// Connection and room registry
    pub hub: Hub,
    /// Clock used to stamp relayed messages
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            hub: Hub::default(),
            clock,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
