pub mod bot;
pub mod core;
pub mod exchanges;
pub mod utils;

pub use bot::{BotContext, MarketSnapshot, MeraBot, PositionState};
pub use crate::core::{config::*, error::*, exchange::*, types::*};
pub use exchanges::*;
pub use utils::*;
