//! Host collaborators: settings aggregate, persistence and reward sink

pub mod rewards;
pub mod settings;
pub mod store;

pub use rewards::{Activity, ActivityKind, Grant, RewardLedger, RewardSink, TracingRewardSink};
pub use settings::Settings;
pub use store::{JsonFileStore, MemoryStore, SettingsStore};
