//! Inventory reconciliation and view model.
//!
//! Pure domain logic (no IO, no HTTP, no storage): name normalization,
//! quantity reconciliation with a delete-on-zero write-back plan, scanned item
//! selection, and the filter/paginate view state.

pub mod item;
pub mod merge;
pub mod name;
pub mod scan;
pub mod view;

pub use item::{InventoryItem, ItemDelta};
pub use merge::{WriteOp, adjust_one, merge, write_back_plan};
pub use name::{ItemName, normalize};
pub use scan::{ScanSelection, ScannedItem, clamp_quantity, selected_deltas};
pub use view::{ViewPage, ViewState, filter, paginate, total_pages};
