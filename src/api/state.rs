//! Application state for the API server

use crate::ContentImporter;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
#[derive(Clone)]
pub struct AppState {
    /// Importer every import route delegates to
    pub importer: Arc<ContentImporter>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(importer: Arc<ContentImporter>) -> Self {
        Self { importer }
    }
}
