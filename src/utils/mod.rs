// 工具模块 - 通用工具函数
pub mod default_config;
pub mod indicators;
pub mod log_setup;
pub mod signature;

pub use default_config::write_default_config;
pub use log_setup::init_logger;
pub use signature::*;
