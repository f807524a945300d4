use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use std::time::Duration;

use crate::bot::snapshot::MarketSnapshot;
use crate::core::{
    config::{ApiKeys, ExchangeSettings},
    error::BotError,
    exchange::ExchangeAdapter,
    retry_policy::ExponentialBackoffRetry,
    types::{Interval, Kline, OrderAck, OrderSide, PositionSide, Result, TargetPrices},
};
use crate::utils::SignatureHelper;

const KLINES_ENDPOINT: &str = "/fapi/v1/klines";
const ORDER_ENDPOINT: &str = "/fapi/v1/order";
const RECV_WINDOW_MS: u64 = 60_000;

/// 币安U本位合约适配器
pub struct BinanceAdapter {
    client: reqwest::Client,
    api_keys: ApiKeys,
    settings: ExchangeSettings,
    interval: Interval,
    retry: ExponentialBackoffRetry,
}

impl BinanceAdapter {
    pub fn new(settings: ExchangeSettings, api_keys: ApiKeys, timeout: Duration) -> Result<Self> {
        let interval = Interval::from_string(&settings.interval)?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        log::info!(
            "🔗 BinanceAdapter 初始化: {} {} (limit={})",
            settings.symbol,
            interval,
            settings.kline_limit
        );

        Ok(Self {
            client,
            api_keys,
            settings,
            interval,
            retry: ExponentialBackoffRetry::default(),
        })
    }

    /// 根据入场价计算止盈止损价位
    pub fn target_prices(&self, side: PositionSide, price: f64) -> TargetPrices {
        let tp = self.settings.take_profit_pct;
        let sl = self.settings.stop_loss_pct;
        match side {
            PositionSide::Long => TargetPrices::new(price * (1.0 + tp), price * (1.0 - sl)),
            PositionSide::Short => TargetPrices::new(price * (1.0 - tp), price * (1.0 + sl)),
        }
    }

    /// 解析K线数组: [开盘时间, 开, 高, 低, 收, 量, 收盘时间, ...]
    pub fn parse_klines(data: &serde_json::Value) -> Result<Vec<Kline>> {
        let rows = data
            .as_array()
            .ok_or_else(|| BotError::ParseError("K线响应不是数组".to_string()))?;

        rows.iter()
            .enumerate()
            .map(|(i, row)| -> Result<Kline> {
                let fields = row
                    .as_array()
                    .filter(|f| f.len() >= 7)
                    .ok_or_else(|| BotError::ParseError(format!("第{}根K线格式错误", i)))?;

                Ok(Kline {
                    open_time: parse_millis(&fields[0], i)?,
                    open: parse_decimal(&fields[1], "open", i)?,
                    high: parse_decimal(&fields[2], "high", i)?,
                    low: parse_decimal(&fields[3], "low", i)?,
                    close: parse_decimal(&fields[4], "close", i)?,
                    volume: parse_decimal(&fields[5], "volume", i)?,
                    close_time: parse_millis(&fields[6], i)?,
                })
            })
            .collect()
    }

    pub fn parse_order_ack(data: &serde_json::Value) -> Result<OrderAck> {
        let order_id = data["orderId"]
            .as_i64()
            .ok_or_else(|| BotError::ParseError("下单回执缺少orderId".to_string()))?;
        let side = match data["side"].as_str() {
            Some("BUY") => OrderSide::Buy,
            Some("SELL") => OrderSide::Sell,
            other => {
                return Err(BotError::ParseError(format!(
                    "下单回执side无法识别: {:?}",
                    other
                )))
            }
        };

        Ok(OrderAck {
            order_id,
            symbol: data["symbol"].as_str().unwrap_or_default().to_string(),
            side,
            status: data["status"].as_str().unwrap_or_default().to_string(),
            executed_qty: data["executedQty"]
                .as_str()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0.0),
        })
    }

    /// 将失败响应映射为错误类型
    pub fn error_from_response(
        status: StatusCode,
        retry_after: Option<u64>,
        body: &str,
    ) -> BotError {
        // 币安错误体: {"code": -2019, "msg": "..."}
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v["msg"].as_str().map(str::to_string))
            .unwrap_or_else(|| body.to_string());

        match status {
            StatusCode::TOO_MANY_REQUESTS | StatusCode::IM_A_TEAPOT => {
                BotError::RateLimitError(message, retry_after)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BotError::AuthError(message),
            _ => BotError::ApiError {
                code: status.as_u16() as i32,
                message,
            },
        }
    }

    async fn send_public_request(&self, endpoint: &str, query: &str) -> Result<serde_json::Value> {
        let url = format!("{}{}?{}", self.settings.base_url, endpoint, query);
        let response = self.client.get(&url).send().await?;
        Self::read_response(response).await
    }

    async fn send_signed_request(
        &self,
        endpoint: &str,
        mut params: Vec<(&str, String)>,
    ) -> Result<serde_json::Value> {
        params.push(("recvWindow", RECV_WINDOW_MS.to_string()));
        params.push(("timestamp", Utc::now().timestamp_millis().to_string()));

        let query = SignatureHelper::build_query(&params);
        let signature = SignatureHelper::binance_signature(&self.api_keys.api_secret, &query);
        let url = format!(
            "{}{}?{}&signature={}",
            self.settings.base_url, endpoint, query, signature
        );

        let response = self
            .client
            .post(&url)
            .header("X-MBX-APIKEY", &self.api_keys.api_key)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .send()
            .await?;
        Self::read_response(response).await
    }

    async fn read_response(response: reqwest::Response) -> Result<serde_json::Value> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<serde_json::Value>().await?);
        }

        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "未知错误".to_string());
        Err(Self::error_from_response(status, retry_after, &body))
    }

    async fn fetch_klines(&self) -> Result<Vec<Kline>> {
        let query = SignatureHelper::build_query(&[
            ("symbol", self.settings.symbol.clone()),
            ("interval", self.interval.as_str().to_string()),
            ("limit", self.settings.kline_limit.to_string()),
        ]);

        let data = self
            .retry
            .execute_with_retry(|| self.send_public_request(KLINES_ENDPOINT, &query))
            .await?;
        Self::parse_klines(&data)
    }

    /// 市价单；平仓单带 reduceOnly
    async fn place_market_order(&self, side: OrderSide, reduce_only: bool) -> Result<OrderAck> {
        let mut params = vec![
            ("symbol", self.settings.symbol.clone()),
            ("side", side.as_binance().to_string()),
            ("type", "MARKET".to_string()),
            ("quantity", self.settings.quantity.to_string()),
        ];
        if reduce_only {
            params.push(("reduceOnly", "true".to_string()));
        }

        let data = self.send_signed_request(ORDER_ENDPOINT, params).await?;
        let ack = Self::parse_order_ack(&data)?;
        log::info!(
            "📝 订单已提交: #{} {} {} qty={} status={}",
            ack.order_id,
            ack.symbol,
            ack.side,
            ack.executed_qty,
            ack.status
        );
        Ok(ack)
    }

    async fn open_position(
        &self,
        side: PositionSide,
        price: f64,
        dry_run: bool,
    ) -> Result<TargetPrices> {
        let targets = self.target_prices(side, price);
        if dry_run {
            log::info!("🧪 [dry-run] 开{} @ {:.4} ({})", side, price, targets);
        } else {
            self.place_market_order(side.entry_side(), false).await?;
        }
        Ok(targets)
    }

    async fn close_position(&self, side: PositionSide, price: f64, dry_run: bool) -> Result<()> {
        if dry_run {
            log::info!("🧪 [dry-run] 平{} @ {:.4}", side, price);
            return Ok(());
        }
        self.place_market_order(side.exit_side(), true).await?;
        Ok(())
    }
}

fn parse_decimal(value: &serde_json::Value, field: &str, index: usize) -> Result<f64> {
    value
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .or_else(|| value.as_f64())
        .ok_or_else(|| {
            BotError::ParseError(format!("第{}根K线字段{}无效: {}", index, field, value))
        })
}

fn parse_millis(value: &serde_json::Value, index: usize) -> Result<DateTime<Utc>> {
    value
        .as_i64()
        .and_then(DateTime::from_timestamp_millis)
        .ok_or_else(|| BotError::ParseError(format!("第{}根K线时间戳无效: {}", index, value)))
}

#[async_trait]
impl ExchangeAdapter for BinanceAdapter {
    fn name(&self) -> &str {
        "binance"
    }

    async fn fetch_snapshot(&self) -> Result<MarketSnapshot> {
        let klines = self.fetch_klines().await?;
        let closes: Vec<f64> = klines.iter().map(|k| k.close).collect();
        MarketSnapshot::from_closes(&closes)
    }

    async fn enter_long(&self, price: f64, dry_run: bool) -> Result<TargetPrices> {
        self.open_position(PositionSide::Long, price, dry_run).await
    }

    async fn enter_short(&self, price: f64, dry_run: bool) -> Result<TargetPrices> {
        self.open_position(PositionSide::Short, price, dry_run).await
    }

    async fn exit_long(&self, price: f64, dry_run: bool) -> Result<()> {
        self.close_position(PositionSide::Long, price, dry_run).await
    }

    async fn exit_short(&self, price: f64, dry_run: bool) -> Result<()> {
        self.close_position(PositionSide::Short, price, dry_run).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn adapter() -> BinanceAdapter {
        let keys = ApiKeys {
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
        };
        BinanceAdapter::new(ExchangeSettings::default(), keys, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_target_prices() {
        let a = adapter();

        let long = a.target_prices(PositionSide::Long, 100.0);
        assert!((long.take_profit - 102.0).abs() < 1e-9);
        assert!((long.stop_loss - 99.0).abs() < 1e-9);

        let short = a.target_prices(PositionSide::Short, 100.0);
        assert!((short.take_profit - 98.0).abs() < 1e-9);
        assert!((short.stop_loss - 101.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_interval_rejected() {
        let settings = ExchangeSettings {
            interval: "7m".to_string(),
            ..ExchangeSettings::default()
        };
        let keys = ApiKeys {
            api_key: String::new(),
            api_secret: String::new(),
        };
        assert!(BinanceAdapter::new(settings, keys, Duration::from_secs(5)).is_err());
    }

    #[test]
    fn test_parse_klines() {
        let data = json!([
            [
                1499040000000i64,
                "0.0163",
                "0.8000",
                "0.0157",
                "0.0158",
                "148976.1",
                1499644799999i64,
                "2434.19",
                308,
                "1756.87",
                "28.46",
                "0"
            ],
            [
                1499644800000i64,
                "0.0158",
                "0.0170",
                "0.0150",
                "0.0165",
                "1000.0",
                1500249599999i64,
                "10.0",
                10,
                "5.0",
                "0.1",
                "0"
            ]
        ]);

        let klines = BinanceAdapter::parse_klines(&data).unwrap();
        assert_eq!(klines.len(), 2);
        assert_eq!(klines[0].close, 0.0158);
        assert_eq!(klines[1].high, 0.0170);
        assert_eq!(klines[0].open_time.timestamp_millis(), 1499040000000);
    }

    #[test]
    fn test_parse_klines_rejects_bad_rows() {
        assert!(BinanceAdapter::parse_klines(&json!({"code": -1121})).is_err());
        assert!(BinanceAdapter::parse_klines(&json!([[1, "2"]])).is_err());
        assert!(BinanceAdapter::parse_klines(&json!([
            [1499040000000i64, "0.1", "0.1", "0.1", "abc", "1", 1499644799999i64]
        ]))
        .is_err());
    }

    #[test]
    fn test_parse_order_ack() {
        let data = json!({
            "orderId": 22542179,
            "symbol": "BTCUSDT",
            "status": "FILLED",
            "side": "SELL",
            "executedQty": "0.001",
            "type": "MARKET"
        });
        let ack = BinanceAdapter::parse_order_ack(&data).unwrap();
        assert_eq!(ack.order_id, 22542179);
        assert_eq!(ack.side, OrderSide::Sell);
        assert_eq!(ack.executed_qty, 0.001);

        assert!(BinanceAdapter::parse_order_ack(&json!({"side": "BUY"})).is_err());
    }

    #[test]
    fn test_error_from_response() {
        let err = BinanceAdapter::error_from_response(
            StatusCode::TOO_MANY_REQUESTS,
            Some(30),
            r#"{"code":-1003,"msg":"Too many requests"}"#,
        );
        assert!(
            matches!(err, BotError::RateLimitError(ref m, Some(30)) if m == "Too many requests")
        );

        let err = BinanceAdapter::error_from_response(StatusCode::UNAUTHORIZED, None, "denied");
        assert!(matches!(err, BotError::AuthError(_)));

        let err = BinanceAdapter::error_from_response(
            StatusCode::BAD_REQUEST,
            None,
            r#"{"code":-2019,"msg":"Margin is insufficient."}"#,
        );
        assert!(!err.is_retryable());
        match err {
            BotError::ApiError { code, message } => {
                assert_eq!(code, 400);
                assert_eq!(message, "Margin is insufficient.");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_dry_run_has_no_side_effects() {
        // base_url 指向不可达地址，真实请求必然失败
        let settings = ExchangeSettings {
            base_url: "http://127.0.0.1:9".to_string(),
            ..ExchangeSettings::default()
        };
        let keys = ApiKeys {
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
        };
        let a = BinanceAdapter::new(settings, keys, Duration::from_secs(1)).unwrap();

        let targets = a.enter_long(100.0, true).await.unwrap();
        assert_eq!(targets, a.target_prices(PositionSide::Long, 100.0));
        a.exit_short(100.0, true).await.unwrap();
        assert!(a.exit_long(100.0, false).await.is_err());
    }
}
