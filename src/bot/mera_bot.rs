//! 机器人主循环
//!
//! 每个周期先休眠，再刷新行情快照并推进一次状态机。单个周期失败只记日志，
//! 状态保持不变，下个周期继续。

use std::time::Duration;

use crate::bot::context::BotContext;
use crate::bot::states::PositionState;
use crate::core::config::BotSettings;
use crate::core::error::{BotError, ErrorSeverity};
use crate::core::types::Result;

pub struct MeraBot {
    ctx: BotContext,
    state: PositionState,
    sleep_duration: Duration,
    debug_mode: bool,
}

impl MeraBot {
    /// 创建机器人：拉取首个快照，按配置执行启动封锁，从空仓开始
    pub async fn new(mut ctx: BotContext, settings: &BotSettings) -> Result<Self> {
        ctx.logger.log_start("MeraBot is running...");
        log::info!("🔗 交易所: {}", ctx.exchange.name());

        let snapshot = ctx.refresh_snapshot().await?;
        if settings.debug_mode {
            ctx.logger.log_info(&format!("debug: {}", snapshot));
        }

        if settings.initial_block {
            if snapshot.price < snapshot.ema_100 {
                ctx.data_manager.block_long();
                log::info!("🔒 启动封锁: 价格低于EMA-100，暂停做多");
            } else {
                ctx.data_manager.block_short();
                log::info!("🔒 启动封锁: 价格不低于EMA-100，暂停做空");
            }
        }

        Ok(Self {
            ctx,
            state: PositionState::flat(),
            sleep_duration: Duration::from_secs(settings.sleep_duration_secs),
            debug_mode: settings.debug_mode,
        })
    }

    pub fn state(&self) -> &PositionState {
        &self.state
    }

    pub fn context(&self) -> &BotContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut BotContext {
        &mut self.ctx
    }

    /// 刷新快照并推进一步状态机
    pub async fn tick(&mut self) -> Result<()> {
        let snapshot = self.ctx.refresh_snapshot().await?;
        if self.debug_mode {
            self.ctx.logger.log_info(&format!("debug: {}", snapshot));
        }

        if let Some(next) = self.state.step(&mut self.ctx).await? {
            log::info!("🔄 状态切换: {} -> {}", self.state, next);
            self.state = next;
        }
        Ok(())
    }

    /// 无限运行，直到外部取消
    pub async fn run(&mut self) {
        log::info!(
            "▶️ 主循环启动，周期 {}s，当前状态 {}",
            self.sleep_duration.as_secs(),
            self.state
        );
        loop {
            tokio::time::sleep(self.sleep_duration).await;

            if let Err(e) = self.tick().await {
                report_tick_error(&e);
            }
        }
    }
}

/// 按错误严重程度选择日志级别
fn report_tick_error(e: &BotError) {
    match e.severity() {
        ErrorSeverity::Warning => log::warn!("⚠️ 本周期执行失败，下周期重试: {}", e),
        ErrorSeverity::Error => log::error!("❌ 本周期执行失败: {}", e),
        ErrorSeverity::Critical => log::error!("🚨 严重错误，需检查配置或API密钥: {}", e),
    }
}
