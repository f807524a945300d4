pub mod context;
pub mod data_manager;
pub mod logger;
pub mod mera_bot;
pub mod performance_tracker;
pub mod predictor;
pub mod snapshot;
pub mod states;

#[cfg(test)]
pub mod testing;

pub use context::BotContext;
pub use data_manager::DataManager;
pub use logger::{BotLogger, FacadeLogger};
pub use mera_bot::MeraBot;
pub use performance_tracker::{PerformanceTracker, TradeOutcome, TradeRecord};
pub use predictor::{Direction, DirectionalPredictor, HttpPredictor};
pub use snapshot::MarketSnapshot;
pub use states::{ActivePositionState, FlatPositionState, PositionState};
