//! 行情与仓位数据管理

use crate::bot::snapshot::MarketSnapshot;
use crate::core::types::PositionSide;

/// 持有实时快照、开仓快照以及两个方向的重入封锁标志
#[derive(Debug, Clone, Default)]
pub struct DataManager {
    /// 实时快照，每个tick覆盖
    pub market_snapshot: MarketSnapshot,
    /// 开仓时冻结的快照，空仓时为 None
    pub position_snapshot: Option<MarketSnapshot>,
    pub is_long_blocked: bool,
    pub is_short_blocked: bool,
}

impl DataManager {
    pub fn new(market_snapshot: MarketSnapshot) -> Self {
        Self {
            market_snapshot,
            ..Self::default()
        }
    }

    /// 封锁做多
    pub fn block_long(&mut self) {
        self.is_long_blocked = true;
    }

    /// 封锁做空
    pub fn block_short(&mut self) {
        self.is_short_blocked = true;
    }

    pub fn block(&mut self, side: PositionSide) {
        match side {
            PositionSide::Long => self.block_long(),
            PositionSide::Short => self.block_short(),
        }
    }

    pub fn is_blocked(&self, side: PositionSide) -> bool {
        match side {
            PositionSide::Long => self.is_long_blocked,
            PositionSide::Short => self.is_short_blocked,
        }
    }

    /// 该方向的入场前提是否已失效：做多要求价格在EMA-100下方，
    /// 价格回到EMA-100上方（含相等）即视为重置；做空镜像
    pub fn is_setup_reset(&self, side: PositionSide) -> bool {
        let s = &self.market_snapshot;
        match side {
            PositionSide::Long => s.price >= s.ema_100,
            PositionSide::Short => s.price <= s.ema_100,
        }
    }

    /// 入场前提重置后解除该方向封锁，返回是否发生了解除
    pub(crate) fn release_if_reset(&mut self, side: PositionSide) -> bool {
        if !self.is_blocked(side) || !self.is_setup_reset(side) {
            return false;
        }
        match side {
            PositionSide::Long => self.is_long_blocked = false,
            PositionSide::Short => self.is_short_blocked = false,
        }
        true
    }

    /// 恢复封锁标志，用于入场失败时回滚
    pub(crate) fn restore_block(&mut self, side: PositionSide, was_blocked: bool) {
        match side {
            PositionSide::Long => self.is_long_blocked = was_blocked,
            PositionSide::Short => self.is_short_blocked = was_blocked,
        }
    }

    /// 用最新快照覆盖实时快照
    pub fn update_market_snapshot(&mut self, snapshot: MarketSnapshot) {
        self.market_snapshot = snapshot;
    }

    /// 冻结当前实时快照作为开仓快照
    pub fn capture_position_snapshot(&mut self) -> MarketSnapshot {
        let frozen = self.market_snapshot;
        self.position_snapshot = Some(frozen);
        frozen
    }

    pub fn clear_position_snapshot(&mut self) {
        self.position_snapshot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocking_flags_are_independent() {
        let mut dm = DataManager::default();
        dm.block_long();
        assert!(dm.is_long_blocked);
        assert!(!dm.is_short_blocked);

        let mut dm = DataManager::default();
        dm.block_short();
        assert!(dm.is_short_blocked);
        assert!(!dm.is_long_blocked);
    }

    #[test]
    fn test_release_waits_for_setup_reset() {
        // 价格在EMA下方：做多前提仍成立，封锁保持
        let mut dm = DataManager::new(MarketSnapshot::new(90.0, 100.0, 0.0, 0.0, 50.0));
        dm.block(PositionSide::Long);
        dm.block(PositionSide::Short);
        assert!(!dm.release_if_reset(PositionSide::Long));
        assert!(dm.is_blocked(PositionSide::Long));

        // 做空前提在EMA下方已失效，只解除做空
        assert!(dm.release_if_reset(PositionSide::Short));
        assert!(!dm.is_blocked(PositionSide::Short));
        assert!(dm.is_blocked(PositionSide::Long));

        dm.update_market_snapshot(MarketSnapshot::new(100.0, 100.0, 0.0, 0.0, 50.0));
        assert!(dm.release_if_reset(PositionSide::Long));
        assert!(!dm.is_blocked(PositionSide::Long));
        assert!(!dm.release_if_reset(PositionSide::Long));
    }

    #[test]
    fn test_restore_block() {
        let mut dm = DataManager::default();
        dm.block_short();
        dm.restore_block(PositionSide::Short, false);
        assert!(!dm.is_short_blocked);
        dm.restore_block(PositionSide::Long, true);
        assert!(dm.is_long_blocked);
    }

    #[test]
    fn test_position_snapshot_survives_live_updates() {
        let mut dm = DataManager::new(MarketSnapshot::new(90.0, 100.0, -0.5, -1.0, 60.0));
        dm.capture_position_snapshot();

        dm.market_snapshot.price = 95.0;
        dm.update_market_snapshot(MarketSnapshot::new(101.0, 99.0, 0.1, 0.2, 45.0));

        let recorded = dm.position_snapshot.unwrap();
        assert_eq!(recorded.price, 90.0);
        assert_eq!(recorded.rsi_6, 60.0);

        dm.clear_position_snapshot();
        assert!(dm.position_snapshot.is_none());
    }
}
