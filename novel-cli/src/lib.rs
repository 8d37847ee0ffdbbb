//! # Novel CLI
//!
//! 无界面播放器与脚本检查工具。
//!
//! - [`player`]：在终端里播放脚本（交互或自动）
//! - [`check`]：静态检查脚本与立绘引用
//! - [`config`]：`config.json` 配置

pub mod catalog;
pub mod check;
pub mod config;
pub mod console;
pub mod player;

pub use catalog::DirectoryCatalog;
pub use check::{CheckReport, check_files, check_source, collect_script_files, print_report};
pub use config::{AppConfig, ConfigError};
pub use console::ConsolePresentation;
pub use player::{RunOptions, RunSummary, console_stage, load_program, run};
