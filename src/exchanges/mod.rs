// 交易所实现
pub mod binance;

pub use binance::BinanceAdapter;
