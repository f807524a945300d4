use crate::core::error::BotError;
use crate::core::types::Result;
use crate::utils::indicators;
use serde::{Deserialize, Serialize};
use std::fmt;

/// EMA周期
pub const EMA_PERIOD: usize = 100;
/// RSI周期
pub const RSI_PERIOD: usize = 6;
/// MACD参数
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

/// 市场指标快照
///
/// 值类型：存入 `DataManager::position_snapshot` 时按值复制，
/// 之后对实时快照的任何修改都不会影响已记录的开仓快照。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// 最新成交价
    pub price: f64,
    /// 100周期EMA
    pub ema_100: f64,
    /// MACD线 (EMA12 - EMA26)
    pub macd_12: f64,
    /// MACD信号线 (MACD线的9周期EMA)
    pub macd_26: f64,
    /// 6周期RSI
    pub rsi_6: f64,
}

impl MarketSnapshot {
    pub fn new(price: f64, ema_100: f64, macd_12: f64, macd_26: f64, rsi_6: f64) -> Self {
        Self {
            price,
            ema_100,
            macd_12,
            macd_26,
            rsi_6,
        }
    }

    /// 由收盘价序列计算快照，最后一个收盘价作为当前价格
    pub fn from_closes(closes: &[f64]) -> Result<Self> {
        if closes.len() < EMA_PERIOD {
            return Err(BotError::InsufficientData {
                required: EMA_PERIOD,
                available: closes.len(),
            });
        }

        let insufficient = || BotError::InsufficientData {
            required: EMA_PERIOD,
            available: closes.len(),
        };

        let price = *closes.last().ok_or_else(insufficient)?;
        let ema_100 = indicators::ema(closes, EMA_PERIOD).ok_or_else(insufficient)?;
        let (macd_line, signal_line, _) =
            indicators::macd(closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL).ok_or_else(insufficient)?;
        let rsi_6 = indicators::rsi(closes, RSI_PERIOD).ok_or_else(insufficient)?;

        Ok(Self::new(price, ema_100, macd_line, signal_line, rsi_6))
    }
}

impl fmt::Display for MarketSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "MarketSnapshot(price={:.4}, ema_100={:.4}, macd_12={:.6}, macd_26={:.6}, rsi_6={:.2})",
            self.price, self.ema_100, self.macd_12, self.macd_26, self.rsi_6
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_rendering() {
        let snapshot = MarketSnapshot::new(90.0, 100.0, -0.5, -1.0, 60.0);
        assert_eq!(
            snapshot.to_string(),
            "MarketSnapshot(price=90.0000, ema_100=100.0000, macd_12=-0.500000, macd_26=-1.000000, rsi_6=60.00)"
        );
    }

    #[test]
    fn test_copy_is_independent() {
        let mut live = MarketSnapshot::new(90.0, 100.0, -0.5, -1.0, 60.0);
        let recorded = live;
        live.price = 120.0;
        live.rsi_6 = 10.0;
        assert_eq!(recorded.price, 90.0);
        assert_eq!(recorded.rsi_6, 60.0);
        assert_eq!(live.price, 120.0);
        assert_eq!(live.rsi_6, 10.0);
    }

    #[test]
    fn test_from_closes() {
        let closes: Vec<f64> = (1..=150).map(|i| 100.0 + i as f64 * 0.5).collect();
        let snapshot = MarketSnapshot::from_closes(&closes).unwrap();
        assert_eq!(snapshot.price, 175.0);
        assert!(snapshot.price > snapshot.ema_100);
        assert!(snapshot.macd_12 > 0.0);
        assert_eq!(snapshot.rsi_6, 100.0);
    }

    #[test]
    fn test_from_closes_requires_history() {
        let closes = vec![100.0; 40];
        match MarketSnapshot::from_closes(&closes) {
            Err(BotError::InsufficientData {
                required,
                available,
            }) => {
                assert_eq!(required, 100);
                assert_eq!(available, 40);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
