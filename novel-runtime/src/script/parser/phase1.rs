//! # 阶段 1：行识别
//!
//! 将预处理后的文本按行分类（标签行、选择项行、文本行），
//! 空行与 `#` 注释行在此阶段丢弃。

use super::helpers::{parse_choice_option, parse_tag_line};

/// 行类型（阶段 1 输出）
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    /// 标签行 `[name body]`
    Tag {
        name: String,
        body: Option<String>,
        line_number: usize,
    },
    /// 选择项行 `* text > target`
    ChoiceOption {
        text: String,
        target: String,
        line_number: usize,
    },
    /// 普通文本行
    Text { content: String, line_number: usize },
}

impl Line {
    /// 获取行号（1-based）
    pub fn line_number(&self) -> usize {
        match self {
            Line::Tag { line_number, .. }
            | Line::ChoiceOption { line_number, .. }
            | Line::Text { line_number, .. } => *line_number,
        }
    }
}

/// 识别文本中的有效行
pub fn recognize_lines(text: &str) -> Vec<Line> {
    let mut lines = Vec::new();

    for (line_idx, raw) in text.lines().enumerate() {
        let line_number = line_idx + 1;
        let trimmed = raw.trim();

        // 空行与注释
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some((name, body)) = parse_tag_line(trimmed) {
            lines.push(Line::Tag {
                name: name.to_string(),
                body: body.map(str::to_string),
                line_number,
            });
            continue;
        }

        if let Some((text, target)) = parse_choice_option(trimmed) {
            lines.push(Line::ChoiceOption {
                text: text.to_string(),
                target: target.to_string(),
                line_number,
            });
            continue;
        }

        lines.push(Line::Text {
            content: trimmed.to_string(),
            line_number,
        });
    }

    lines
}
