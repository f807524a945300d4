use crate::core::config::BotSettings;
use crate::core::error::BotError;
use std::fs;
use std::path::Path;

/// 生成默认配置文件，已存在时拒绝覆盖
pub fn write_default_config(path: &str) -> Result<(), BotError> {
    let target = Path::new(path);
    if target.exists() {
        return Err(BotError::ConfigError(format!(
            "配置文件已存在，拒绝覆盖: {}",
            path
        )));
    }

    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| BotError::ConfigError(format!("创建配置目录失败: {}", e)))?;
        }
    }

    let yaml = BotSettings::default().to_yaml()?;
    fs::write(target, yaml)
        .map_err(|e| BotError::ConfigError(format!("写入配置文件失败: {}", e)))?;

    log::info!("✅ 默认配置已写入: {}", path);
    Ok(())
}
