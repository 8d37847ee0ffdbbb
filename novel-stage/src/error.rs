//! 舞台错误类型

use novel_runtime::RuntimeError;
use thiserror::Error;

/// 舞台错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StageError {
    /// 脚本执行错误
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
