//! Matcher dataset and suffix-keyed lookup index.

pub mod dataset;
pub mod index;

pub use dataset::{MatcherEntry, RawStatsDataset, load_dataset};
pub use index::{StatsIndex, suffix_key};
