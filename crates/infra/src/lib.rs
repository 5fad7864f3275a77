//! Infrastructure layer: inventory storage, write-back execution, the
//! inventory service, and CSV export.

pub mod export;
pub mod service;
pub mod store;
pub mod writeback;

pub use export::{ExportError, records_from_json, to_csv};
pub use service::{InventoryService, MutationOutcome, ServiceError};
pub use store::{InMemoryInventoryStore, InventoryStore, PostgresInventoryStore, StoreError};
pub use writeback::{WriteBackReport, WriteFailure, apply_write_back};
