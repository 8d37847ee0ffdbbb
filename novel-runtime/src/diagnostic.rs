//! # 诊断模块
//!
//! 提供程序静态检查和诊断 API，不依赖 IO 或引擎。
//!
//! ## 设计原则
//!
//! - 纯函数 API，可在无 IO 环境下运行
//! - 诊断分级：Error（必须修复）、Warn（建议修复）
//! - 复用 parser 产出的 `Program`，不重复解析逻辑

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::script::{Program, ScriptAction};

/// 诊断级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticLevel {
    /// 警告（建议修复）
    Warn,
    /// 错误（必须修复）
    Error,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// 诊断条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 诊断级别
    pub level: DiagnosticLevel,
    /// 程序 ID / 文件路径
    pub program_id: String,
    /// 行号（如果可定位，从 1 开始）
    pub line: Option<usize>,
    /// 诊断消息
    pub message: String,
    /// 诊断详情（可选）
    pub detail: Option<String>,
}

impl Diagnostic {
    fn new(level: DiagnosticLevel, program_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            program_id: program_id.into(),
            line: None,
            message: message.into(),
            detail: None,
        }
    }

    /// 创建错误诊断
    pub fn error(program_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Error, program_id, message)
    }

    /// 创建警告诊断
    pub fn warn(program_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Warn, program_id, message)
    }

    /// 设置行号
    pub fn with_line(mut self, line: Option<usize>) -> Self {
        self.line = line;
        self
    }

    /// 设置详情
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.program_id)?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(detail) = &self.detail {
            write!(f, "\n  | {}", detail)?;
        }
        Ok(())
    }
}

/// 诊断结果
#[derive(Debug, Clone, Default)]
pub struct DiagnosticResult {
    /// 诊断条目列表
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticResult {
    /// 创建空结果
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加诊断
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// 合并另一个结果
    pub fn merge(&mut self, other: DiagnosticResult) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// 获取错误数量
    pub fn error_count(&self) -> usize {
        self.count(DiagnosticLevel::Error)
    }

    /// 获取警告数量
    pub fn warn_count(&self) -> usize {
        self.count(DiagnosticLevel::Warn)
    }

    fn count(&self, level: DiagnosticLevel) -> usize {
        self.diagnostics.iter().filter(|d| d.level == level).count()
    }

    /// 是否有错误
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// 立绘引用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// 引用的动作（`char` 或 `expr`）
    pub kind: &'static str,
    /// 立绘资源名
    pub image: String,
    /// 源文件行号
    pub line: Option<usize>,
}

//=============================================================================
// 程序分析 API
//=============================================================================

/// 分析程序，返回诊断结果
///
/// 执行以下检查：
/// - 未定义的跳转目标（goto/choice 目标 label 不存在）→ Error
/// - 重复定义的标签（以第一次为准）→ Warn
/// - 没有任何选项的选择分支 → Warn
/// - 没有对话或选择的跳转循环（执行时会报 `NoProgress`）→ Error
pub fn analyze_program(program: &Program) -> DiagnosticResult {
    let mut result = DiagnosticResult::new();

    let mut first_seen: HashMap<&str, Option<usize>> = HashMap::new();
    for (index, action) in program.actions.iter().enumerate() {
        let line = program.line_of(index);
        match action {
            ScriptAction::Label { name } => {
                if let Some(first_line) = first_seen.get(name.as_str()) {
                    let mut diag = Diagnostic::warn(
                        &program.id,
                        format!("标签 '{}' 重复定义，此处定义被忽略", name),
                    )
                    .with_line(line);
                    if let Some(first_line) = first_line {
                        diag = diag.with_detail(format!("第一次定义在第 {} 行", first_line));
                    }
                    result.push(diag);
                } else {
                    first_seen.insert(name, line);
                }
            }
            ScriptAction::Choices { options } if options.is_empty() => {
                result.push(
                    Diagnostic::warn(&program.id, "选择分支没有任何选项").with_line(line),
                );
            }
            _ => {}
        }
    }

    for (index, target) in jump_targets(program) {
        if program.find_label(target).is_none() {
            result.push(
                Diagnostic::error(&program.id, format!("未定义的跳转目标: {}", target))
                    .with_line(program.line_of(index))
                    .with_detail(format!("goto 或 choice 引用了不存在的 label '{}'", target)),
            );
        }
    }

    for (index, target) in silent_loops(program) {
        result.push(
            Diagnostic::error(&program.id, format!("跳转到 '{}' 形成了死循环", target))
                .with_line(program.line_of(index))
                .with_detail("循环中没有对话或选择，执行会在这里停止"),
        );
    }

    result
}

/// 找出位于无挂起点循环上的 goto（下标与目标）
///
/// 从每个 goto 出发沿执行路径前进，遇到对话、选择、场景切换或末尾即停；
/// 回到出发的 goto 则说明它在死循环上。
fn silent_loops(program: &Program) -> Vec<(usize, &str)> {
    let mut loops = Vec::new();
    for (start, action) in program.actions.iter().enumerate() {
        let ScriptAction::Goto { target: start_target } = action else {
            continue;
        };

        let mut visited = HashSet::from([start]);
        let mut next = program.find_label(start_target);
        while let Some(index) = next {
            match program.actions.get(index) {
                None
                | Some(ScriptAction::Message { .. })
                | Some(ScriptAction::Scene { .. }) => break,
                Some(ScriptAction::Choices { options }) if !options.is_empty() => break,
                Some(ScriptAction::Goto { target }) => {
                    if index == start {
                        loops.push((start, start_target.as_str()));
                        break;
                    }
                    if !visited.insert(index) {
                        break;
                    }
                    next = program.find_label(target);
                }
                Some(_) => next = Some(index + 1),
            }
        }
    }
    loops
}

/// 收集所有跳转目标及其所在动作下标
fn jump_targets(program: &Program) -> Vec<(usize, &str)> {
    let mut targets = Vec::new();
    for (index, action) in program.actions.iter().enumerate() {
        match action {
            ScriptAction::Goto { target } => targets.push((index, target.as_str())),
            ScriptAction::Choices { options } => {
                targets.extend(options.iter().map(|opt| (index, opt.target.as_str())));
            }
            _ => {}
        }
    }
    targets
}

/// 提取程序中的所有立绘引用（`char` 的 img 与 `expr` 的 expr）
pub fn extract_image_references(program: &Program) -> Vec<ImageReference> {
    program
        .actions
        .iter()
        .enumerate()
        .filter_map(|(index, action)| {
            let (kind, image) = match action {
                ScriptAction::ShowCharacter { image, .. } => ("char", image),
                ScriptAction::Expression { image, .. } => ("expr", image),
                _ => return None,
            };
            Some(ImageReference {
                kind,
                image: image.clone(),
                line: program.line_of(index),
            })
        })
        .collect()
}

/// 获取程序中所有已定义的 label 名称
pub fn get_defined_labels(program: &Program) -> Vec<&str> {
    program
        .actions
        .iter()
        .filter_map(ScriptAction::as_label)
        .collect()
}

/// 获取程序中所有跳转目标（去重）
pub fn get_jump_targets(program: &Program) -> HashSet<&str> {
    jump_targets(program)
        .into_iter()
        .map(|(_, target)| target)
        .collect()
}
