//! 交易胜负统计

use chrono::{DateTime, Utc};
use std::fmt;

use crate::core::types::PositionSide;

/// 单笔交易结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeOutcome {
    /// 触及止盈
    Win,
    /// 触及止损
    Loss,
}

/// 交易记录
#[derive(Debug, Clone)]
pub struct TradeRecord {
    pub side: PositionSide,
    pub entry_price: f64,
    pub exit_price: f64,
    pub outcome: TradeOutcome,
    pub exit_time: DateTime<Utc>,
}

impl TradeRecord {
    /// 收益率（按方向）
    pub fn return_pct(&self) -> f64 {
        if self.entry_price == 0.0 {
            return 0.0;
        }
        match self.side {
            PositionSide::Long => (self.exit_price - self.entry_price) / self.entry_price,
            PositionSide::Short => (self.entry_price - self.exit_price) / self.entry_price,
        }
    }
}

/// 胜负统计器
#[derive(Debug, Clone, Default)]
pub struct PerformanceTracker {
    wins: usize,
    losses: usize,
    history: Vec<TradeRecord>,
}

impl PerformanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一笔完成的交易
    pub fn record(&mut self, record: TradeRecord) {
        match record.outcome {
            TradeOutcome::Win => self.wins += 1,
            TradeOutcome::Loss => self.losses += 1,
        }
        self.history.push(record);
    }

    pub fn wins(&self) -> usize {
        self.wins
    }

    pub fn losses(&self) -> usize {
        self.losses
    }

    pub fn total_trades(&self) -> usize {
        self.wins + self.losses
    }

    /// 胜率（0-100），无交易时为 None
    pub fn win_rate(&self) -> Option<f64> {
        let total = self.total_trades();
        if total == 0 {
            None
        } else {
            Some(self.wins as f64 / total as f64 * 100.0)
        }
    }

    /// 累计收益率
    pub fn cumulative_return_pct(&self) -> f64 {
        self.history.iter().map(TradeRecord::return_pct).sum()
    }

    pub fn history(&self) -> &[TradeRecord] {
        &self.history
    }
}

impl fmt::Display for PerformanceTracker {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Performance(wins={}, losses={}, win_rate={}, cumulative_return={:.2}%)",
            self.wins,
            self.losses,
            self.win_rate()
                .map(|r| format!("{:.1}%", r))
                .unwrap_or_else(|| "n/a".to_string()),
            self.cumulative_return_pct() * 100.0
        )
    }
}
