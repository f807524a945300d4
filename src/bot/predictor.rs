//! 方向预测器

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use crate::bot::snapshot::MarketSnapshot;
use crate::core::error::BotError;
use crate::core::types::{PositionSide, Result};

/// 预测方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// 解析模型输出标签，无法识别时返回 None
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_uppercase().as_str() {
            "LONG" => Some(Direction::Long),
            "SHORT" => Some(Direction::Short),
            _ => None,
        }
    }

    /// 预测方向是否与持仓方向一致
    pub fn confirms(&self, side: PositionSide) -> bool {
        matches!(
            (self, side),
            (Direction::Long, PositionSide::Long) | (Direction::Short, PositionSide::Short)
        )
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

/// 二分类方向预测器
///
/// 返回 `Ok(None)` 表示模型给出了无法识别的标签，调用方按“未确认”处理。
#[async_trait]
pub trait DirectionalPredictor: Send + Sync {
    async fn predict(&self, snapshot: &MarketSnapshot) -> Result<Option<Direction>>;
}

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    prediction: String,
}

/// 通过HTTP调用模型服务的预测器，无内部状态
pub struct HttpPredictor {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPredictor {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// 解析模型服务响应体
    pub fn parse_response(body: &str) -> Result<Option<Direction>> {
        let response: PredictionResponse = serde_json::from_str(body)?;
        let direction = Direction::from_label(&response.prediction);
        if direction.is_none() {
            log::warn!("⚠️ 预测器返回未知标签: {}", response.prediction);
        }
        Ok(direction)
    }
}

#[async_trait]
impl DirectionalPredictor for HttpPredictor {
    async fn predict(&self, snapshot: &MarketSnapshot) -> Result<Option<Direction>> {
        let response = self.client.post(&self.endpoint).json(snapshot).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "未知错误".to_string());
            return Err(BotError::PredictorError(format!("HTTP {}: {}", status, text)));
        }

        let body = response.text().await?;
        Self::parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label() {
        assert_eq!(Direction::from_label("LONG"), Some(Direction::Long));
        assert_eq!(Direction::from_label(" short "), Some(Direction::Short));
        assert_eq!(Direction::from_label("HOLD"), None);
    }

    #[test]
    fn test_confirms() {
        assert!(Direction::Long.confirms(PositionSide::Long));
        assert!(!Direction::Long.confirms(PositionSide::Short));
        assert!(Direction::Short.confirms(PositionSide::Short));
    }

    #[test]
    fn test_parse_response() {
        assert_eq!(
            HttpPredictor::parse_response(r#"{"prediction": "SHORT"}"#).unwrap(),
            Some(Direction::Short)
        );
        assert_eq!(
            HttpPredictor::parse_response(r#"{"prediction": "NEUTRAL"}"#).unwrap(),
            None
        );
        assert!(HttpPredictor::parse_response("not json").is_err());
    }
}
