mod aggregator;
mod store;
mod types;

pub use aggregator::{days_in_month, StatsAggregator};
pub use store::{CounterStore, EventStore, MemoryCounterStore};
pub use types::{StatRange, StatsSummary};
