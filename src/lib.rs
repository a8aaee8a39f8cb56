pub mod batch;
pub mod cli;
pub mod client;
pub mod error;
pub mod item;
pub mod query;
pub mod resolve;
pub mod settings;
pub mod stats;
pub mod text;
pub mod tracing;

pub use batch::{BatchHandle, BatchOrchestrator, BatchReport, BatchState};
pub use item::{EquipmentSnapshot, EquippedItem, ModKind};
pub use query::{QuerySynthesizer, SearchMode, TradeQuery};
pub use resolve::{ModResolver, ResolvedModifier};
pub use settings::SearchSettings;
pub use stats::StatsIndex;
