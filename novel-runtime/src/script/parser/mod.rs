//! # Parser 模块
//!
//! 两阶段脚本解析器实现（手写，无 regex 依赖）。
//!
//! ## 架构
//!
//! ```text
//! 原始文本 → [预处理] → [阶段1: 行识别] → Vec<Line> → [阶段2: 动作转换] → Program
//! ```
//!
//! ## 设计原则
//!
//! - 解析永不失败：无法识别的标签语法按对话文本处理
//! - 可容忍的问题记录为警告（孤立选择项、重复标签、未知方向/动作/标签、缺少属性）
//! - 行号追踪：`Program::source_map` 记录每个动作的源文件行号
//!
//! ## 模块结构
//!
//! - `helpers`: 辅助解析函数
//! - `phase1`: 行识别
//! - `phase2`: 动作转换

mod helpers;
mod phase1;
mod phase2;


use crate::script::ast::Program;

use phase1::recognize_lines;
use phase2::Phase2Parser;

// 重新导出辅助函数供测试和工具使用
pub use helpers::{normalize_text, parse_attributes, parse_choice_option, parse_tag_line};
pub use phase2::RawTag;

/// 脚本解析器
pub struct Parser {
    /// 阶段2转换器
    phase2: Phase2Parser,
}

impl Parser {
    /// 创建新的解析器
    pub fn new() -> Self {
        Self {
            phase2: Phase2Parser::new(),
        }
    }

    /// 解析脚本文本
    ///
    /// # 参数
    ///
    /// - `program_id`: 程序标识符
    /// - `text`: 脚本文本内容
    ///
    /// 解析是全函数：任何输入都会得到一个 `Program`，
    /// 问题通过 [`Parser::warnings`] 报告。
    pub fn parse(&mut self, program_id: &str, text: &str) -> Program {
        self.phase2.reset();

        let text = normalize_text(text);
        let lines = recognize_lines(&text);
        let (actions, source_map) = self.phase2.convert(lines);

        for warning in &self.phase2.warnings {
            tracing::debug!(program = program_id, "{}", warning);
        }

        Program::with_source_map(program_id, actions, source_map)
    }

    /// 获取上一次解析的警告
    pub fn warnings(&self) -> &[String] {
        &self.phase2.warnings
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
