//! # Variables 模块
//!
//! 脚本变量存储：带类型的键值表，支持赋值、累加和文本插值。
//!
//! ## 类型推断
//!
//! 赋值时按 整数 → 浮点数 → 字符串 的顺序尝试解析原始文本，
//! 之后的 `add` 按当前类型累加（字符串为拼接）。
//!
//! 每次运行持有独立的 `VariableStore` 实例，不存在全局单例。

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 脚本变量值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VarValue {
    /// 整数
    Int(i64),
    /// 浮点数
    Float(f64),
    /// 字符串
    String(String),
}

impl VarValue {
    /// 从原始文本推断类型
    ///
    /// 非有限的浮点数（`inf`、`NaN`）按字符串保存。
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Self::Int(i);
        }
        if let Some(f) = parse_finite_float(trimmed) {
            return Self::Float(f);
        }
        Self::String(raw.to_string())
    }

    /// 类型名称（用于诊断输出）
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "Int",
            Self::Float(_) => "Float",
            Self::String(_) => "String",
        }
    }
}

impl fmt::Display for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

fn parse_finite_float(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// 变量累加失败
///
/// 累加失败不是致命错误：变量保持原值，调用方负责报告。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VariableError {
    /// 累加值与当前类型不兼容
    #[error("无法将 '{value}' 累加到变量 '{name}'（类型 {type_name}）")]
    TypeMismatch {
        name: String,
        value: String,
        type_name: &'static str,
    },

    /// 整数累加溢出
    #[error("变量 '{name}' 累加 '{value}' 时溢出")]
    Overflow { name: String, value: String },
}

/// 变量存储
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableStore {
    values: HashMap<String, VarValue>,
}

impl VariableStore {
    /// 创建空的变量存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 赋值（覆盖原值和原类型）
    pub fn set(&mut self, name: impl Into<String>, raw: &str) -> &VarValue {
        let name = name.into();
        let value = VarValue::infer(raw);
        self.values.insert(name.clone(), value);
        &self.values[&name]
    }

    /// 获取变量
    pub fn get(&self, name: &str) -> Option<&VarValue> {
        self.values.get(name)
    }

    /// 累加
    ///
    /// - 变量不存在：等同于 `set`
    /// - Int + 整数文本 → Int
    /// - Float + 浮点文本 → Float
    /// - String + 任意文本 → 拼接
    /// - 其他组合：返回错误，变量保持不变
    pub fn add(&mut self, name: &str, raw: &str) -> Result<&VarValue, VariableError> {
        let Some(current) = self.values.get(name) else {
            return Ok(self.set(name, raw));
        };

        let trimmed = raw.trim();
        let mismatch = || VariableError::TypeMismatch {
            name: name.to_string(),
            value: raw.to_string(),
            type_name: current.type_name(),
        };

        let updated = match current {
            VarValue::Int(i) => {
                let delta = trimmed.parse::<i64>().map_err(|_| mismatch())?;
                let sum = i.checked_add(delta).ok_or_else(|| VariableError::Overflow {
                    name: name.to_string(),
                    value: raw.to_string(),
                })?;
                VarValue::Int(sum)
            }
            VarValue::Float(f) => {
                let delta = parse_finite_float(trimmed).ok_or_else(mismatch)?;
                VarValue::Float(f + delta)
            }
            VarValue::String(s) => VarValue::String(format!("{s}{raw}")),
        };

        self.values.insert(name.to_string(), updated);
        Ok(&self.values[name])
    }

    /// 文本插值
    ///
    /// 把 `{name}` 替换为变量的字符串形式；未定义的占位符原样保留。
    pub fn substitute(&self, text: &str) -> String {
        if !text.contains('{') {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after_open = &rest[open + 1..];

            let resolved = after_open.find('}').and_then(|close| {
                let name = &after_open[..close];
                if name.contains('{') {
                    return None;
                }
                self.values.get(name).map(|v| (v.to_string(), close))
            });

            match resolved {
                Some((value, close)) => {
                    out.push_str(&value);
                    rest = &after_open[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = after_open;
                }
            }
        }

        out.push_str(rest);
        out
    }

    /// 是否存在变量
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// 变量数量
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 遍历所有变量
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VarValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
