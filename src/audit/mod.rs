//! Audit log for Spendwise
//!
//! Every create, update and delete of a user, category, expense or budget is
//! appended to `audit.log` as one JSON line carrying the acting user, the
//! before/after snapshots and a short diff of the top-level fields.
//!
//! ```rust,ignore
//! let entry = AuditEntry::update(EntityType::Budget, budget.id, Some(user.id), &before, &after);
//! logger.log(&entry)?;
//! ```

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
