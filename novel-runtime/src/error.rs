//! # Error 模块
//!
//! 定义 novel-runtime 中使用的错误类型。
//!
//! 解析器是容错的，永远不会返回错误（问题以警告形式收集），
//! 因此这里只有运行时错误。

use thiserror::Error;

/// 运行时错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// 标签未找到
    #[error("标签 '{label}' 未找到")]
    LabelNotFound { label: String },

    /// 跳转循环中没有任何挂起点
    #[error("跳转到标签 '{label}' 形成了没有对话或选择的循环")]
    NoProgress { label: String },

    /// 无效的选择索引
    #[error("无效的选择索引 {index}，有效范围是 0..{max}")]
    InvalidChoiceIndex { index: usize, max: usize },

    /// 状态不匹配
    #[error("当前状态不允许此操作：期望 {expected}，实际 {actual}")]
    StateMismatch { expected: String, actual: String },

    /// 脚本执行结束
    #[error("脚本已执行完毕")]
    ScriptEnded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RuntimeError::LabelNotFound {
            label: "ending".to_string(),
        };
        assert!(err.to_string().contains("ending"));

        let err = RuntimeError::InvalidChoiceIndex { index: 3, max: 2 };
        assert_eq!(err.to_string(), "无效的选择索引 3，有效范围是 0..2");
    }
}
