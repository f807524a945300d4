//! 持仓状态（多头/空头）：监控止盈止损并在触发后回到空仓

use chrono::Utc;

use crate::bot::context::BotContext;
use crate::bot::data_manager::DataManager;
use crate::bot::performance_tracker::{TradeOutcome, TradeRecord};
use crate::bot::states::PositionState;
use crate::core::types::{PositionSide, Result, TargetPrices};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivePositionState {
    side: PositionSide,
    target_prices: TargetPrices,
}

impl ActivePositionState {
    pub fn new(side: PositionSide, target_prices: TargetPrices) -> Self {
        Self {
            side,
            target_prices,
        }
    }

    pub fn long(target_prices: TargetPrices) -> Self {
        Self::new(PositionSide::Long, target_prices)
    }

    pub fn short(target_prices: TargetPrices) -> Self {
        Self::new(PositionSide::Short, target_prices)
    }

    pub fn side(&self) -> PositionSide {
        self.side
    }

    pub fn target_prices(&self) -> TargetPrices {
        self.target_prices
    }

    /// 判断当前价格是否触及止盈或止损
    pub fn exit_signal(&self, price: f64) -> Option<TradeOutcome> {
        let TargetPrices {
            take_profit,
            stop_loss,
        } = self.target_prices;

        match self.side {
            PositionSide::Long if price >= take_profit => Some(TradeOutcome::Win),
            PositionSide::Long if price <= stop_loss => Some(TradeOutcome::Loss),
            PositionSide::Short if price <= take_profit => Some(TradeOutcome::Win),
            PositionSide::Short if price >= stop_loss => Some(TradeOutcome::Loss),
            _ => None,
        }
    }

    /// 本方向入场前提已重置时解除封锁，另一方向保持不变。
    /// 未重置时封锁保留，由空仓状态在价格越过EMA-100后解除
    pub fn release_block(&self, data_manager: &mut DataManager) -> bool {
        data_manager.release_if_reset(self.side)
    }

    pub async fn step(&self, ctx: &mut BotContext) -> Result<Option<PositionState>> {
        let price = ctx.data_manager.market_snapshot.price;
        let outcome = match self.exit_signal(price) {
            Some(outcome) => outcome,
            None => return Ok(None),
        };

        // 开仓快照只在预测器确认的真实开仓时记录
        let entry = ctx.data_manager.position_snapshot;
        ctx.exit(self.side, price, entry.is_none()).await?;

        match entry {
            Some(entry) => {
                ctx.performance_tracker.record(TradeRecord {
                    side: self.side,
                    entry_price: entry.price,
                    exit_price: price,
                    outcome,
                    exit_time: Utc::now(),
                });
                let reason = match outcome {
                    TradeOutcome::Win => "take profit",
                    TradeOutcome::Loss => "stop loss",
                };
                ctx.logger.log_info(&format!(
                    "Exited {} @ {:.4} ({}, entry {:.4})",
                    self.side, price, reason, entry.price
                ));
                ctx.logger.log_info(&ctx.performance_tracker.to_string());
            }
            None => {
                log::debug!("{} dry-run 持仓结束 @ {:.4} ({:?})", self.side, price, outcome);
            }
        }

        ctx.data_manager.clear_position_snapshot();
        if !self.release_block(&mut ctx.data_manager) {
            log::info!("🔒 {} 入场前提未重置，保持封锁", self.side);
        }

        Ok(Some(PositionState::flat()))
    }
}
