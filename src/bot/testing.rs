//! 单元测试用的协作者替身

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::bot::context::BotContext;
use crate::bot::logger::BotLogger;
use crate::bot::predictor::{Direction, DirectionalPredictor};
use crate::bot::snapshot::MarketSnapshot;
use crate::core::error::BotError;
use crate::core::exchange::ExchangeAdapter;
use crate::core::types::{Result, TargetPrices};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExchangeCall {
    FetchSnapshot,
    EnterLong { price: f64, dry_run: bool },
    EnterShort { price: f64, dry_run: bool },
    ExitLong { price: f64, dry_run: bool },
    ExitShort { price: f64, dry_run: bool },
}

/// 记录所有调用的交易所替身
pub struct RecordingExchange {
    pub calls: Mutex<Vec<ExchangeCall>>,
    pub long_targets: TargetPrices,
    pub short_targets: TargetPrices,
    /// fetch_snapshot 依次返回的快照，耗尽后重复最后一个
    pub snapshots: Mutex<VecDeque<MarketSnapshot>>,
    last_snapshot: Mutex<MarketSnapshot>,
    pub fail_fetch: AtomicBool,
    pub fail_orders: AtomicBool,
    pub fetch_delay: Mutex<Option<Duration>>,
    /// 下单在记录之后、应答之前的延迟
    pub order_delay: Mutex<Option<Duration>>,
}

impl Default for RecordingExchange {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            long_targets: TargetPrices::new(110.0, 90.0),
            short_targets: TargetPrices::new(80.0, 120.0),
            snapshots: Mutex::new(VecDeque::new()),
            last_snapshot: Mutex::new(MarketSnapshot::default()),
            fail_fetch: AtomicBool::new(false),
            fail_orders: AtomicBool::new(false),
            fetch_delay: Mutex::new(None),
            order_delay: Mutex::new(None),
        }
    }
}

impl RecordingExchange {
    pub fn with_targets(long_targets: TargetPrices, short_targets: TargetPrices) -> Self {
        Self {
            long_targets,
            short_targets,
            ..Self::default()
        }
    }

    pub fn push_snapshot(&self, snapshot: MarketSnapshot) {
        self.snapshots.lock().unwrap().push_back(snapshot);
    }

    pub fn calls(&self) -> Vec<ExchangeCall> {
        self.calls.lock().unwrap().clone()
    }

    /// 除 FetchSnapshot 以外的下单类调用
    pub fn order_calls(&self) -> Vec<ExchangeCall> {
        self.calls()
            .into_iter()
            .filter(|c| *c != ExchangeCall::FetchSnapshot)
            .collect()
    }

    async fn record(&self, call: ExchangeCall) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        let delay = *self.order_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_orders.load(Ordering::SeqCst) {
            return Err(BotError::ApiError {
                code: 503,
                message: "Service Unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ExchangeAdapter for RecordingExchange {
    fn name(&self) -> &str {
        "recording"
    }

    async fn fetch_snapshot(&self) -> Result<MarketSnapshot> {
        self.calls.lock().unwrap().push(ExchangeCall::FetchSnapshot);
        let delay = *self.fetch_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(BotError::ApiError {
                code: 502,
                message: "Bad Gateway".to_string(),
            });
        }
        let next = self.snapshots.lock().unwrap().pop_front();
        let mut last = self.last_snapshot.lock().unwrap();
        if let Some(snapshot) = next {
            *last = snapshot;
        }
        Ok(*last)
    }

    async fn enter_long(&self, price: f64, dry_run: bool) -> Result<TargetPrices> {
        self.record(ExchangeCall::EnterLong { price, dry_run }).await?;
        Ok(self.long_targets)
    }

    async fn enter_short(&self, price: f64, dry_run: bool) -> Result<TargetPrices> {
        self.record(ExchangeCall::EnterShort { price, dry_run }).await?;
        Ok(self.short_targets)
    }

    async fn exit_long(&self, price: f64, dry_run: bool) -> Result<()> {
        self.record(ExchangeCall::ExitLong { price, dry_run }).await
    }

    async fn exit_short(&self, price: f64, dry_run: bool) -> Result<()> {
        self.record(ExchangeCall::ExitShort { price, dry_run }).await
    }
}

/// 固定输出的预测器
pub struct FixedPredictor {
    pub result: Option<Direction>,
    pub calls: AtomicUsize,
}

impl FixedPredictor {
    pub fn new(result: Option<Direction>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DirectionalPredictor for FixedPredictor {
    async fn predict(&self, _snapshot: &MarketSnapshot) -> Result<Option<Direction>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.result)
    }
}

/// 收集日志行的日志替身
#[derive(Default)]
pub struct RecordingLogger {
    pub info: Mutex<Vec<String>>,
    pub start: Mutex<Vec<String>>,
}

impl RecordingLogger {
    pub fn info_lines(&self) -> Vec<String> {
        self.info.lock().unwrap().clone()
    }

    pub fn start_lines(&self) -> Vec<String> {
        self.start.lock().unwrap().clone()
    }
}

impl BotLogger for RecordingLogger {
    fn log_info(&self, message: &str) {
        self.info.lock().unwrap().push(message.to_string());
    }

    fn log_start(&self, message: &str) {
        self.start.lock().unwrap().push(message.to_string());
    }
}

/// 组装好的测试上下文及其协作者句柄
pub struct Harness {
    pub ctx: BotContext,
    pub exchange: Arc<RecordingExchange>,
    pub predictor: Arc<FixedPredictor>,
    pub logger: Arc<RecordingLogger>,
}

impl Harness {
    pub fn new(snapshot: MarketSnapshot, prediction: Option<Direction>) -> Self {
        Self::with_exchange(snapshot, prediction, RecordingExchange::default())
    }

    pub fn with_exchange(
        snapshot: MarketSnapshot,
        prediction: Option<Direction>,
        exchange: RecordingExchange,
    ) -> Self {
        let exchange = Arc::new(exchange);
        let predictor = Arc::new(FixedPredictor::new(prediction));
        let logger = Arc::new(RecordingLogger::default());

        let mut ctx = BotContext::new(
            exchange.clone(),
            predictor.clone(),
            logger.clone(),
            Duration::from_secs(5),
        );
        ctx.data_manager.market_snapshot = snapshot;

        Self {
            ctx,
            exchange,
            predictor,
            logger,
        }
    }
}
