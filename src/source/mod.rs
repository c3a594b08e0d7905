//! Row source boundary subsystem
//!
//! The only interface the engine has to external data: a trait with three
//! capabilities (`scan`, `group_aggregate`, `partition_rank_select`), an
//! optional batch extension, deadlines on every call, and the shared row
//! value model. `MemoryRowSource` is the in-process reference adapter.

mod deadline;
mod errors;
mod memory;
pub mod rank;
mod row;
mod source;

pub use deadline::Deadline;
pub use errors::{Severity, SourceError, SourceErrorCode, SourceResult};
pub use memory::{MemoryRowSource, OpCounts};
pub use row::{compare_values, Row};
pub use source::{capability, RowSource};
