//! # Config 模块
//!
//! 播放器配置。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (config.json)
//! 3. 默认值（最低）

use std::fs;
use std::path::{Path, PathBuf};

use novel_stage::StageConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// 脚本文件扩展名
pub const SCRIPT_EXTENSION: &str = "txt";

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 脚本根目录
    #[serde(default = "default_scripts_root")]
    pub scripts_root: PathBuf,

    /// 入口脚本（相对于 scripts_root，可省略扩展名）
    ///
    /// `run` 没有指定脚本时必须配置。
    #[serde(default)]
    pub start_script: String,

    /// 立绘目录；未配置时认为所有立绘都存在
    #[serde(default)]
    pub characters_dir: Option<PathBuf>,

    /// 日志级别（可被 RUST_LOG 覆盖）
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// 舞台配置
    #[serde(default)]
    pub stage: StageConfig,
}

fn default_scripts_root() -> PathBuf {
    PathBuf::from("scripts")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scripts_root: default_scripts_root(),
            start_script: String::new(),
            characters_dir: None,
            log_level: default_log_level(),
            stage: StageConfig::default(),
        }
    }
}

impl AppConfig {
    /// 读取并解析配置文件
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&content)?)
    }

    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并打印警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(config) => {
                info!(path = %path.display(), "配置文件加载成功");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "配置文件不可用，使用默认配置");
                Self::default()
            }
        }
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        let stage = &self.stage;
        if stage.chars_per_second <= 0.0 {
            return Err(ConfigError::Validation(
                "文字速度 chars_per_second 必须大于 0".to_string(),
            ));
        }
        if stage.actor_duration < 0.0 {
            return Err(ConfigError::Validation(
                "角色动画时长 actor_duration 不能为负".to_string(),
            ));
        }
        if stage.actor_width < 0.0 || stage.move_distance < 0.0 {
            return Err(ConfigError::Validation(
                "actor_width 与 move_distance 不能为负".to_string(),
            ));
        }
        if let Some(dir) = &self.characters_dir
            && !dir.is_dir()
        {
            return Err(ConfigError::Validation(format!(
                "立绘目录不存在: {}",
                dir.display()
            )));
        }
        Ok(())
    }

    /// 脚本名 → 文件路径
    ///
    /// 没有扩展名时补上 `.txt`。
    pub fn script_path(&self, name: &str) -> PathBuf {
        let path = self.scripts_root.join(name);
        if path.extension().is_some() {
            path
        } else {
            path.with_extension(SCRIPT_EXTENSION)
        }
    }

    /// 入口脚本路径（未配置时为 None）
    pub fn start_script_path(&self) -> Option<PathBuf> {
        if self.start_script.is_empty() {
            None
        } else {
            Some(self.script_path(&self.start_script))
        }
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    Io(#[from] std::io::Error),
    /// 解析失败
    #[error("配置解析失败: {0}")]
    Parse(#[from] serde_json::Error),
    /// 验证失败
    #[error("配置验证失败: {0}")]
    Validation(String),
}
