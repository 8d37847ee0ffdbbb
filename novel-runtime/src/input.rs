//! # Input 模块
//!
//! 定义 Host 向 Runtime 传递的输入事件。
//!
//! ## 设计说明
//!
//! - Runtime 不直接处理鼠标/键盘事件，只处理语义化的输入
//! - 逐字显示的计时由 Host 负责，显示结束时 Host 发送 `RevealFinished`

use serde::{Deserialize, Serialize};

/// Host 向 Runtime 传递的输入
///
/// - `Advance`：用户点击/按键。逐字显示中表示"立即显示完"并继续（点击继续模式下只显示完），否则继续
/// - `RevealFinished`：表现层报告逐字显示自然结束
/// - `ChoiceSelected`：解除选择等待，并传递用户选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogueInput {
    /// 用户请求继续
    Advance,

    /// 逐字显示完成
    RevealFinished,

    /// 用户选择了某个选项
    ///
    /// `index` 是选项的索引（从 0 开始）
    ChoiceSelected { index: usize },
}

impl DialogueInput {
    /// 创建选择输入
    pub fn choice(index: usize) -> Self {
        Self::ChoiceSelected { index }
    }
}
