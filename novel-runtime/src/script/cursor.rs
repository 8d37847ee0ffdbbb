//! # Cursor 模块
//!
//! 程序上的前向游标，支持按标签跳转。
//!
//! `position` 为 `None` 表示"第一个动作之前"；`advance` 与 `jump_to`
//! 是仅有的两个修改位置的操作。

use std::sync::Arc;

use crate::error::RuntimeError;
use crate::script::ast::{Program, ScriptAction};

/// 脚本游标
#[derive(Debug, Clone)]
pub struct ScriptCursor {
    program: Arc<Program>,
    position: Option<usize>,
}

impl ScriptCursor {
    /// 在程序开头之前创建游标
    pub fn new(program: Arc<Program>) -> Self {
        Self {
            program,
            position: None,
        }
    }

    /// 当前程序
    pub fn program(&self) -> &Arc<Program> {
        &self.program
    }

    /// 当前位置（`None` 表示尚未开始）
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    fn next_index(&self) -> usize {
        self.position.map_or(0, |p| p + 1)
    }

    /// 是否还有下一个动作
    pub fn has_next(&self) -> bool {
        self.next_index() < self.program.len()
    }

    /// 前进一步并返回新位置上的动作
    ///
    /// 已到末尾时不移动，返回 `None`。
    pub fn advance(&mut self) -> Option<&ScriptAction> {
        if !self.has_next() {
            return None;
        }
        let index = self.next_index();
        self.position = Some(index);
        self.program.get(index)
    }

    /// 跳转到标签
    ///
    /// 跳转后下一次 `advance` 落在标签之后的动作上。
    /// 标签不存在时返回错误，位置保持不变。
    pub fn jump_to(&mut self, label: &str) -> Result<(), RuntimeError> {
        let resume = self
            .program
            .find_label(label)
            .ok_or_else(|| RuntimeError::LabelNotFound {
                label: label.to_string(),
            })?;
        self.position = resume.checked_sub(1);
        Ok(())
    }

    /// 当前位置上的动作
    pub fn current(&self) -> Option<&ScriptAction> {
        self.position.and_then(|p| self.program.get(p))
    }

    /// 下一个动作（不移动）
    pub fn peek_next(&self) -> Option<&ScriptAction> {
        self.program.get(self.next_index())
    }

    /// 当前动作的源文件行号
    pub fn current_line(&self) -> Option<usize> {
        self.position.and_then(|p| self.program.line_of(p))
    }
}
