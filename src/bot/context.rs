//! 状态机共享上下文

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::bot::data_manager::DataManager;
use crate::bot::logger::BotLogger;
use crate::bot::performance_tracker::PerformanceTracker;
use crate::bot::predictor::{Direction, DirectionalPredictor};
use crate::bot::snapshot::MarketSnapshot;
use crate::core::error::BotError;
use crate::core::exchange::ExchangeAdapter;
use crate::core::types::{PositionSide, Result, TargetPrices};

/// 各状态 `step()` 读取和修改的全部外部状态
pub struct BotContext {
    pub data_manager: DataManager,
    pub performance_tracker: PerformanceTracker,
    pub exchange: Arc<dyn ExchangeAdapter>,
    pub predictor: Arc<dyn DirectionalPredictor>,
    pub logger: Arc<dyn BotLogger>,
    /// 行情与预测调用的超时；下单调用不在此处截断
    pub call_timeout: Duration,
}

impl BotContext {
    pub fn new(
        exchange: Arc<dyn ExchangeAdapter>,
        predictor: Arc<dyn DirectionalPredictor>,
        logger: Arc<dyn BotLogger>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            data_manager: DataManager::default(),
            performance_tracker: PerformanceTracker::new(),
            exchange,
            predictor,
            logger,
            call_timeout,
        }
    }

    /// 对只读调用施加超时，超时视为可重试错误
    async fn with_timeout<T, F>(&self, operation: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.call_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(BotError::TimeoutError {
                operation: operation.to_string(),
                timeout_ms: self.call_timeout.as_millis() as u64,
            }),
        }
    }

    /// 拉取最新快照并覆盖实时快照
    pub async fn refresh_snapshot(&mut self) -> Result<MarketSnapshot> {
        let exchange = Arc::clone(&self.exchange);
        let snapshot = self
            .with_timeout("fetch_snapshot", exchange.fetch_snapshot())
            .await?;
        self.data_manager.update_market_snapshot(snapshot);
        Ok(snapshot)
    }

    pub async fn predict(&self, snapshot: &MarketSnapshot) -> Result<Option<Direction>> {
        self.with_timeout("predict", self.predictor.predict(snapshot)).await
    }

    /// 开仓，不施加本地超时：已发出的订单请求要等到交易所应答或HTTP客户端超时
    pub async fn enter(
        &self,
        side: PositionSide,
        price: f64,
        dry_run: bool,
    ) -> Result<TargetPrices> {
        self.exchange.enter(side, price, dry_run).await
    }

    /// 平仓，超时处理同开仓
    pub async fn exit(&self, side: PositionSide, price: f64, dry_run: bool) -> Result<()> {
        self.exchange.exit(side, price, dry_run).await
    }
}
