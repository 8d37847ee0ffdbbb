//! # Runtime 模块
//!
//! 执行引擎核心，负责程序执行和状态管理。
//!
//! ## 模块结构
//!
//! - [`engine`]：动作调度器
//! - [`executor`]：动作到 Command 的转换

pub mod engine;
pub mod executor;

pub use engine::{ActionDispatcher, Tick};
