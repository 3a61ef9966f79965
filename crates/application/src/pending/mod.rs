mod query;
mod table;

pub use query::{PendingQuery, QueryState, Transport};
pub use table::{IdSource, PendingQueryTable, RandomIdSource};
