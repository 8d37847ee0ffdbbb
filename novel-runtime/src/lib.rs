//! # Novel Runtime
//!
//! 分支对话演出的核心运行时库。
//!
//! ## 架构概述
//!
//! `novel-runtime` 是纯逻辑核心，不依赖任何 IO 或渲染引擎。
//! 它通过 **命令驱动模式** 与宿主层（Host）通信：
//!
//! ```text
//! Host                          Runtime
//!   │                              │
//!   │──── DialogueInput ─────────►│
//!   │                              │ tick()
//!   │◄─── Tick { commands, state, transition } ──│
//!   │                              │
//! ```
//!
//! ## 核心类型
//!
//! - [`Parser`]：脚本文本 → [`Program`]
//! - [`ScriptCursor`]：程序上的前向游标
//! - [`VariableStore`]：带类型的变量存储
//! - [`ActionDispatcher`]：挂起/恢复式的动作调度器
//! - [`Command`]：Runtime 向 Host 发出的指令
//! - [`DialogueInput`]：Host 向 Runtime 传递的输入
//!
//! ## 使用示例
//!
//! ```ignore
//! use novel_runtime::{ActionDispatcher, DialogueInput, Parser, VariableStore};
//!
//! let program = Parser::new().parse("intro", script_text);
//! let mut dispatcher = ActionDispatcher::new(program, VariableStore::new());
//!
//! let mut input = None;
//! loop {
//!     let tick = dispatcher.tick(input.take())?;
//!
//!     for cmd in tick.commands {
//!         host.execute(cmd);
//!     }
//!
//!     if let Some(transition) = tick.transition {
//!         // 加载下一个脚本...
//!     }
//!
//!     input = host.collect_input(tick.state);
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`command`]：Command 定义
//! - [`input`]：DialogueInput 定义
//! - [`state`]：DispatchState 定义
//! - [`variables`]：VariableStore
//! - [`error`]：错误类型定义
//! - [`script`]：程序结构、游标与解析器
//! - [`runtime`]：调度器与执行器
//! - [`diagnostic`]：静态检查

pub mod command;
pub mod diagnostic;
pub mod error;
pub mod input;
pub mod runtime;
pub mod script;
pub mod state;
pub mod variables;

// 重导出核心类型
pub use command::{Choice, Command, EntranceStyle, Gesture, SceneTransition};
pub use diagnostic::{
    Diagnostic, DiagnosticLevel, DiagnosticResult, ImageReference, analyze_program,
    extract_image_references, get_defined_labels, get_jump_targets,
};
pub use error::RuntimeError;
pub use input::DialogueInput;
pub use runtime::{ActionDispatcher, Tick};
pub use script::{Assignment, ChoiceOption, Parser, Program, ScriptAction, ScriptCursor};
pub use state::DispatchState;
pub use variables::{VarValue, VariableError, VariableStore};
