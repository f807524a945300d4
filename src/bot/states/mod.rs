//! 持仓状态机
//!
//! 三个互斥状态：空仓、多头、空头。驱动循环每个tick调用当前状态的
//! `step()`，返回 `Some(新状态)` 时由驱动循环替换当前状态。

pub mod active;
pub mod flat;

pub use active::ActivePositionState;
pub use flat::FlatPositionState;

use std::fmt;

use crate::bot::context::BotContext;
use crate::core::types::{PositionSide, Result};

/// 当前持仓状态
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionState {
    Flat(FlatPositionState),
    Long(ActivePositionState),
    Short(ActivePositionState),
}

impl PositionState {
    pub fn flat() -> Self {
        PositionState::Flat(FlatPositionState)
    }

    /// 由已开仓的持仓状态构造对应变体
    pub fn active(position: ActivePositionState) -> Self {
        match position.side() {
            PositionSide::Long => PositionState::Long(position),
            PositionSide::Short => PositionState::Short(position),
        }
    }

    /// 执行一个tick
    pub async fn step(&self, ctx: &mut BotContext) -> Result<Option<PositionState>> {
        match self {
            PositionState::Flat(state) => state.step(ctx).await,
            PositionState::Long(state) | PositionState::Short(state) => state.step(ctx).await,
        }
    }

    /// 当前持仓方向，空仓为 None
    pub fn side(&self) -> Option<PositionSide> {
        match self {
            PositionState::Flat(_) => None,
            PositionState::Long(_) => Some(PositionSide::Long),
            PositionState::Short(_) => Some(PositionSide::Short),
        }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, PositionState::Flat(_))
    }
}

impl fmt::Display for PositionState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PositionState::Flat(_) => write!(f, "FLAT"),
            PositionState::Long(state) | PositionState::Short(state) => {
                write!(f, "{} ({})", state.side(), state.target_prices())
            }
        }
    }
}
