/// 日志初始化
/// 基于 log4rs 的控制台 + 文件输出，业务代码统一使用 log 宏
use crate::core::config::LogSettings;
use crate::core::error::BotError;
use chrono::Local;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::{Path, PathBuf};

/// 解析日志级别字符串
pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_uppercase().as_str() {
        "TRACE" => LevelFilter::Trace,
        "DEBUG" => LevelFilter::Debug,
        "WARN" | "WARNING" => LevelFilter::Warn,
        "ERROR" => LevelFilter::Error,
        "OFF" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

/// 当日日志文件路径
pub fn log_file_path(settings: &LogSettings) -> PathBuf {
    let date = Local::now().format("%Y%m%d");
    Path::new(&settings.root_dir).join(format!("merabot_{}.log", date))
}

/// 构建 log4rs 配置
pub fn build_config(settings: &LogSettings) -> Result<Config, BotError> {
    let file_path = log_file_path(settings);
    let file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(&settings.pattern)))
        .build(&file_path)
        .map_err(|e| BotError::ConfigError(format!("创建日志文件失败 {:?}: {}", file_path, e)))?;

    let mut builder =
        Config::builder().appender(Appender::builder().build("file", Box::new(file)));
    let mut root = Root::builder().appender("file");

    if settings.console_output {
        let console = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(&settings.pattern)))
            .build();
        builder = builder.appender(Appender::builder().build("console", Box::new(console)));
        root = root.appender("console");
    }

    builder
        .build(root.build(parse_level(&settings.level)))
        .map_err(|e| BotError::ConfigError(format!("日志配置错误: {}", e)))
}

/// 初始化全局日志
pub fn init_logger(settings: &LogSettings) -> Result<(), BotError> {
    let config = build_config(settings)?;
    log4rs::init_config(config)
        .map_err(|e| BotError::ConfigError(format!("日志初始化失败: {}", e)))?;
    Ok(())
}
