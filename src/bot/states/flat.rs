//! 空仓状态：判断是否开多、开空或继续观望

use crate::bot::context::BotContext;
use crate::bot::data_manager::DataManager;
use crate::bot::snapshot::MarketSnapshot;
use crate::bot::states::{ActivePositionState, PositionState};
use crate::core::types::{PositionSide, Result};

/// RSI多空分界
const RSI_MIDLINE: f64 = 50.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlatPositionState;

impl FlatPositionState {
    /// 做多条件：价格在EMA-100下方、MACD线在信号线上方、RSI-6高于50，且做多未被封锁
    pub fn is_long_entry_condition_met(&self, data_manager: &DataManager) -> bool {
        let s = &data_manager.market_snapshot;
        s.price < s.ema_100
            && s.macd_12 > s.macd_26
            && s.rsi_6 > RSI_MIDLINE
            && !data_manager.is_long_blocked
    }

    /// 做空条件：与做多镜像对称
    pub fn is_short_entry_condition_met(&self, data_manager: &DataManager) -> bool {
        let s = &data_manager.market_snapshot;
        s.price > s.ema_100
            && s.macd_12 < s.macd_26
            && s.rsi_6 < RSI_MIDLINE
            && !data_manager.is_short_blocked
    }

    pub async fn step(&self, ctx: &mut BotContext) -> Result<Option<PositionState>> {
        self.rearm_blocks(ctx);
        self.apply(ctx).await
    }

    /// 入场前提已重置的方向解除封锁
    pub fn rearm_blocks(&self, ctx: &mut BotContext) {
        for side in [PositionSide::Long, PositionSide::Short] {
            if ctx.data_manager.release_if_reset(side) {
                log::info!("🔓 {} 入场前提已重置，解除封锁", side);
            }
        }
    }

    /// 评估入场条件，满足时咨询预测器并开仓
    pub async fn apply(&self, ctx: &mut BotContext) -> Result<Option<PositionState>> {
        let snapshot = ctx.data_manager.market_snapshot;

        if self.is_long_entry_condition_met(&ctx.data_manager) {
            let is_confirmed = self.is_confirmed(ctx, &snapshot, PositionSide::Long).await?;
            return self.apply_long(ctx, is_confirmed).await.map(Some);
        }

        if self.is_short_entry_condition_met(&ctx.data_manager) {
            let is_confirmed = self.is_confirmed(ctx, &snapshot, PositionSide::Short).await?;
            return self.apply_short(ctx, is_confirmed).await.map(Some);
        }

        Ok(None)
    }

    pub async fn apply_long(
        &self,
        ctx: &mut BotContext,
        is_confirmed: bool,
    ) -> Result<PositionState> {
        self.apply_entry(ctx, PositionSide::Long, is_confirmed).await
    }

    pub async fn apply_short(
        &self,
        ctx: &mut BotContext,
        is_confirmed: bool,
    ) -> Result<PositionState> {
        self.apply_entry(ctx, PositionSide::Short, is_confirmed).await
    }

    /// 冻结当前实时快照作为开仓快照
    pub fn update_position_snapshot(&self, ctx: &mut BotContext) -> MarketSnapshot {
        ctx.data_manager.capture_position_snapshot()
    }

    async fn is_confirmed(
        &self,
        ctx: &BotContext,
        snapshot: &MarketSnapshot,
        side: PositionSide,
    ) -> Result<bool> {
        let prediction = ctx.predict(snapshot).await?;
        log::debug!("{} 入场条件满足，预测器输出: {:?}", side, prediction);
        Ok(prediction.map_or(false, |direction| direction.confirms(side)))
    }

    /// 每次入场尝试都会封锁该方向；未确认时以 dry-run 方式调用交易所。
    /// 下单失败时封锁标志回滚，本次尝试不生效
    async fn apply_entry(
        &self,
        ctx: &mut BotContext,
        side: PositionSide,
        is_confirmed: bool,
    ) -> Result<PositionState> {
        let was_blocked = ctx.data_manager.is_blocked(side);
        ctx.data_manager.block(side);

        let price = ctx.data_manager.market_snapshot.price;
        let target_prices = match ctx.enter(side, price, !is_confirmed).await {
            Ok(target_prices) => target_prices,
            Err(e) => {
                ctx.data_manager.restore_block(side, was_blocked);
                return Err(e);
            }
        };

        if is_confirmed {
            let snapshot = self.update_position_snapshot(ctx);
            ctx.logger
                .log_info(&format!("Entered {} @ {:.4} ({})", side, price, target_prices));
            ctx.logger.log_info(&snapshot.to_string());
        } else {
            log::debug!(
                "{} 信号未被预测器确认，dry-run 开仓 @ {:.4} ({})",
                side,
                price,
                target_prices
            );
        }

        Ok(PositionState::active(ActivePositionState::new(
            side,
            target_prices,
        )))
    }
}
