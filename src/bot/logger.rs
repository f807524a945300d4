//! 交易事件日志

/// 机器人事件日志接口，发出即忘
pub trait BotLogger: Send + Sync {
    fn log_info(&self, message: &str);
    fn log_start(&self, message: &str);
}

/// 转发到 log 门面的默认实现
#[derive(Debug, Clone, Copy, Default)]
pub struct FacadeLogger;

impl BotLogger for FacadeLogger {
    fn log_info(&self, message: &str) {
        log::info!("{}", message);
    }

    fn log_start(&self, message: &str) {
        log::info!("🚀 {}", message);
    }
}
