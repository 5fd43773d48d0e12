//! Shared service state.

use bomline_utils::{AppConfig, SharedReferenceTable, SheetExtractor};

use crate::storage::UploadStore;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: UploadStore,
    pub reference: SharedReferenceTable,
    pub extractor: SheetExtractor,
}
