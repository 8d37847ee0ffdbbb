//! # State 模块
//!
//! 定义调度器的运行状态。
//!
//! ## 状态转换
//!
//! ```text
//! Idle ──tick──▶ Running ──msg──────▶ AwaitingAdvance ──Advance──▶ Running
//!                   │   └──choices──▶ AwaitingChoice ──ChoiceSelected──▶ Running
//!                   └──末尾 / scene / 致命错误──▶ Finished
//! ```
//!
//! `Finished` 是终止状态，只有 `reset` 能离开。

use std::fmt;

use serde::{Deserialize, Serialize};

/// 调度器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DispatchState {
    /// 尚未开始
    #[default]
    Idle,

    /// 正在连续执行（只在 tick 内部可见）
    Running,

    /// 等待用户继续
    ///
    /// `revealing` 为 true 表示文本仍在逐字显示。
    AwaitingAdvance { revealing: bool },

    /// 等待用户选择
    ///
    /// `choice_count` 记录选项数量，用于验证输入合法性
    AwaitingChoice { choice_count: usize },

    /// 执行结束
    Finished,
}

impl DispatchState {
    /// 是否在等待外部输入
    pub fn is_waiting(&self) -> bool {
        matches!(
            self,
            Self::AwaitingAdvance { .. } | Self::AwaitingChoice { .. }
        )
    }

    /// 是否已结束
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }

    /// 状态名（用于错误信息）
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Running => "Running",
            Self::AwaitingAdvance { .. } => "AwaitingAdvance",
            Self::AwaitingChoice { .. } => "AwaitingChoice",
            Self::Finished => "Finished",
        }
    }
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_predicates() {
        assert!(!DispatchState::Idle.is_waiting());
        assert!(DispatchState::AwaitingAdvance { revealing: true }.is_waiting());
        assert!(DispatchState::AwaitingChoice { choice_count: 2 }.is_waiting());
        assert!(DispatchState::Finished.is_finished());
        assert_eq!(DispatchState::default(), DispatchState::Idle);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(
            DispatchState::AwaitingChoice { choice_count: 3 }.to_string(),
            "AwaitingChoice"
        );
    }
}
