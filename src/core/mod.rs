// 核心模块 - 错误、配置、类型与交易所接口
pub mod config;
pub mod error;
pub mod exchange;
pub mod retry_policy;
pub mod types;

pub use self::config::*;
pub use error::*;
pub use exchange::*;
pub use retry_policy::{ExponentialBackoffRetry, RetryConfig};
pub use types::{Interval, Kline, OrderAck, OrderSide, PositionSide, TargetPrices};
