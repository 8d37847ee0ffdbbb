//! # Script 模块
//!
//! 脚本解析相关功能，包括程序结构、游标和解析器实现。
//!
//! ## 模块结构
//!
//! - [`ast`]：动作与程序定义
//! - [`cursor`]：程序游标
//! - [`parser`]：两阶段解析器实现

pub mod ast;
pub mod cursor;
pub mod parser;

pub use ast::*;
pub use cursor::ScriptCursor;
pub use parser::Parser;
