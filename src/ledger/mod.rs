//! Ledger engine: entries, month buckets, the store that owns them, and derived totals.

pub mod category;
pub mod entry;
pub mod month;
pub mod store;
pub mod totals;

pub use category::{catalog, categories_for, Category};
pub use entry::{Entry, EntryDraft, EntryId, EntryKind, EntryPatch};
pub use month::{days_in_month, shift_one_month, MonthKey};
pub use store::LedgerStore;
pub use totals::{is_overdue, MonthTotals};
