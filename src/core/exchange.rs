use crate::bot::snapshot::MarketSnapshot;
use crate::core::types::{PositionSide, Result, TargetPrices};
use async_trait::async_trait;

/// 交易所适配器接口
///
/// 状态机只通过这个接口与交易所交互。`dry_run` 为 true 时实现方
/// 不得对账户产生任何副作用，但仍需返回与真实下单一致的止盈/止损价位。
#[async_trait]
pub trait ExchangeAdapter: Send + Sync {
    /// 获取交易所名称
    fn name(&self) -> &str;

    /// 拉取最新的指标快照
    async fn fetch_snapshot(&self) -> Result<MarketSnapshot>;

    /// 开多，返回 (止盈, 止损)
    async fn enter_long(&self, price: f64, dry_run: bool) -> Result<TargetPrices>;

    /// 开空，返回 (止盈, 止损)
    async fn enter_short(&self, price: f64, dry_run: bool) -> Result<TargetPrices>;

    /// 平多
    async fn exit_long(&self, price: f64, dry_run: bool) -> Result<()>;

    /// 平空
    async fn exit_short(&self, price: f64, dry_run: bool) -> Result<()>;

    /// 按方向开仓
    async fn enter(&self, side: PositionSide, price: f64, dry_run: bool) -> Result<TargetPrices> {
        match side {
            PositionSide::Long => self.enter_long(price, dry_run).await,
            PositionSide::Short => self.enter_short(price, dry_run).await,
        }
    }

    /// 按方向平仓
    async fn exit(&self, side: PositionSide, price: f64, dry_run: bool) -> Result<()> {
        match side {
            PositionSide::Long => self.exit_long(price, dry_run).await,
            PositionSide::Short => self.exit_short(price, dry_run).await,
        }
    }
}
