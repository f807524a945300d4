use crate::core::error::BotError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 环境变量覆盖前缀，例如 MERABOT_SLEEP_DURATION_SECS=30
pub const ENV_PREFIX: &str = "MERABOT";

/// 机器人主配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotSettings {
    /// 两次轮询之间的休眠时间（秒）
    pub sleep_duration_secs: u64,

    /// 调试模式：每个tick输出实时快照
    pub debug_mode: bool,

    /// 单次外部调用（交易所/预测器）超时（秒）
    pub call_timeout_secs: u64,

    /// 启动时根据价格与EMA-100的关系封锁一个方向，价格越过EMA-100后解除
    pub initial_block: bool,

    /// 交易所配置
    pub exchange: ExchangeSettings,

    /// 预测器配置
    pub predictor: PredictorSettings,

    /// 日志配置
    pub log: LogSettings,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            sleep_duration_secs: 60,
            debug_mode: false,
            call_timeout_secs: 15,
            initial_block: true,
            exchange: ExchangeSettings::default(),
            predictor: PredictorSettings::default(),
            log: LogSettings::default(),
        }
    }
}

/// 交易所配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeSettings {
    /// 期货REST地址
    pub base_url: String,
    /// 交易对（交易所格式）
    pub symbol: String,
    /// K线周期
    pub interval: String,
    /// 每次拉取的K线数量
    pub kline_limit: u32,
    /// 每笔下单数量
    pub quantity: f64,
    /// 止盈百分比（0.02 = 2%）
    pub take_profit_pct: f64,
    /// 止损百分比
    pub stop_loss_pct: f64,
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        Self {
            base_url: "https://fapi.binance.com".to_string(),
            symbol: "BTCUSDT".to_string(),
            interval: "15m".to_string(),
            kline_limit: 300,
            quantity: 0.001,
            take_profit_pct: 0.02,
            stop_loss_pct: 0.01,
        }
    }
}

/// 方向预测器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorSettings {
    /// 模型服务地址，接收快照JSON并返回 {"prediction": "LONG" | "SHORT"}
    pub endpoint: String,
}

impl Default for PredictorSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8501/predict".to_string(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub root_dir: String,
    pub level: String,
    pub console_output: bool,
    pub pattern: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            root_dir: "logs".to_string(),
            level: "INFO".to_string(),
            console_output: true,
            pattern: "[{d(%Y-%m-%d %H:%M:%S%.3f)}] [{l}] [{M}] {m}{n}".to_string(),
        }
    }
}

impl BotSettings {
    /// 加载配置：默认值 -> YAML文件（可选）-> 环境变量
    pub fn load(path: Option<&str>) -> Result<Self, BotError> {
        let defaults = config::Config::try_from(&BotSettings::default())?;

        let mut builder = config::Config::builder().add_source(defaults);
        if let Some(path) = path {
            if !Path::new(path).exists() {
                return Err(BotError::ConfigError(format!("配置文件不存在: {}", path)));
            }
            builder = builder.add_source(config::File::with_name(path));
        }

        let settings: BotSettings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// 参数校验
    pub fn validate(&self) -> Result<(), BotError> {
        if self.sleep_duration_secs == 0 {
            return Err(BotError::ConfigError(
                "sleep_duration_secs 必须大于0".to_string(),
            ));
        }
        if self.call_timeout_secs == 0 {
            return Err(BotError::ConfigError(
                "call_timeout_secs 必须大于0".to_string(),
            ));
        }
        if self.exchange.symbol.is_empty() {
            return Err(BotError::ConfigError("exchange.symbol 不能为空".to_string()));
        }
        if self.exchange.quantity <= 0.0 {
            return Err(BotError::ConfigError(
                "exchange.quantity 必须大于0".to_string(),
            ));
        }
        for (field, pct) in [
            ("exchange.take_profit_pct", self.exchange.take_profit_pct),
            ("exchange.stop_loss_pct", self.exchange.stop_loss_pct),
        ] {
            if pct <= 0.0 || pct >= 1.0 {
                return Err(BotError::ConfigError(format!(
                    "{} 必须在 (0, 1) 区间内: {}",
                    field, pct
                )));
            }
        }
        Ok(())
    }

    /// 导出为YAML
    pub fn to_yaml(&self) -> Result<String, BotError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// API密钥配置
#[derive(Debug, Clone)]
pub struct ApiKeys {
    pub api_key: String,
    pub api_secret: String,
}

impl ApiKeys {
    /// 从环境变量加载API密钥
    pub fn from_env(exchange: &str) -> Result<Self, BotError> {
        dotenv::dotenv().ok(); // 加载.env文件，忽略错误

        let exchange_upper = exchange.to_uppercase();

        let api_key = std::env::var(format!("{}_API_KEY", exchange_upper)).map_err(|_| {
            BotError::ConfigError(format!("未找到{}的API_KEY环境变量", exchange))
        })?;

        // 尝试两种格式的密钥名称
        let api_secret = std::env::var(format!("{}_API_SECRET", exchange_upper))
            .or_else(|_| std::env::var(format!("{}_SECRET_KEY", exchange_upper)))
            .map_err(|_| {
                BotError::ConfigError(format!(
                    "未找到{}的API_SECRET或SECRET_KEY环境变量",
                    exchange
                ))
            })?;

        Ok(ApiKeys {
            api_key,
            api_secret,
        })
    }
}
