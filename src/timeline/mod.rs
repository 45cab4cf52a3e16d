// src/timeline/mod.rs
pub mod aggregate;
pub mod artists;
pub mod cache;
pub mod clock;
pub mod scheduler;
pub mod service;
pub mod store;

pub use aggregate::{merge, AggregateOutcome, Notice};
pub use artists::ArtistResolver;
pub use cache::EventCache;
pub use clock::{Clock, SystemClock};
pub use scheduler::{spawn_scheduler, Staleness};
pub use service::{CycleOutcome, SkipReason, TimelineParts, TimelineService, TimelineSnapshot};
pub use store::{FileStore, KeyValueStore, MemoryStore};
