//! # Command 模块
//!
//! 定义 Runtime 向 Host 发出的所有指令。
//! Command 是 Runtime 与 Host 之间的**唯一通信方式**。
//!
//! ## 设计原则
//!
//! - **声明式**：Command 描述"做什么"，不描述"怎么做"
//! - **无副作用**：Command 本身不执行任何操作
//! - **引擎无关**：不包含任何渲染或 UI 框架的类型

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 角色入场/退场方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EntranceStyle {
    /// 从左侧
    Left,
    /// 从右侧
    Right,
    /// 从左下
    BottomLeft,
    /// 从右下
    BottomRight,
    /// 中央（从下方）
    #[default]
    Center,
    /// 从上方
    Top,
}

impl EntranceStyle {
    /// 从字符串解析（便捷方法）
    pub fn parse(s: &str) -> Option<Self> {
        Self::from_str(s).ok()
    }
}

impl FromStr for EntranceStyle {
    type Err = ();

    /// 从字符串解析方向（不区分大小写）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "bottomleft" => Ok(Self::BottomLeft),
            "bottomright" => Ok(Self::BottomRight),
            "center" => Ok(Self::Center),
            "top" => Ok(Self::Top),
            _ => Err(()),
        }
    }
}

/// 角色动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gesture {
    /// 向上跳动
    Jump,
    /// 左右摇晃
    Shake,
    /// 上下震动
    ShakeHorizontal,
    /// 点头
    Nod,
    /// 放大回弹
    Punch,
}

impl Gesture {
    /// 从字符串解析（便捷方法）
    pub fn parse(s: &str) -> Option<Self> {
        Self::from_str(s).ok()
    }
}

impl FromStr for Gesture {
    type Err = ();

    /// 从字符串解析动作（不区分大小写）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jump" => Ok(Self::Jump),
            "shake" => Ok(Self::Shake),
            "shakehorizontal" => Ok(Self::ShakeHorizontal),
            "nod" => Ok(Self::Nod),
            "punch" => Ok(Self::Punch),
            _ => Err(()),
        }
    }
}

/// 选择项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// 选项显示文本（已完成变量插值）
    pub text: String,
    /// 跳转目标标签
    pub target_label: String,
}

/// 场景切换请求
///
/// Runtime 不直接加载脚本，只把目标交给 Host。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneTransition {
    /// 目标场景名
    pub scene: String,
    /// 下一个脚本（None 表示由 Host 决定）
    pub script: Option<String>,
}

/// Runtime 向 Host 发出的指令
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// 逐字显示对话文本
    ShowText {
        /// 对话内容（已完成变量插值）
        content: String,
    },

    /// 立即完成当前文本的逐字显示
    CompleteReveal,

    /// 设置说话者名称（None 表示隐藏名牌）
    ShowSpeaker { name: Option<String> },

    /// 显示选择分支
    PresentChoices { choices: Vec<Choice> },

    /// 清除选择分支
    ClearChoices,

    /// 切换背景
    ShowBackground { file: String },

    /// 角色入场
    SpawnActor {
        /// 角色标识符
        actor: String,
        /// 立绘资源名
        image: String,
        /// 入场方向
        entrance: EntranceStyle,
    },

    /// 角色退场
    DespawnActor {
        actor: String,
        /// 退场方向
        exit: EntranceStyle,
    },

    /// 播放角色动作
    PlayGesture { actor: String, gesture: Gesture },

    /// 切换角色表情立绘
    ChangeExpression { actor: String, image: String },
}

impl Command {
    /// 是否作用于某个角色
    pub fn actor(&self) -> Option<&str> {
        match self {
            Self::SpawnActor { actor, .. }
            | Self::DespawnActor { actor, .. }
            | Self::PlayGesture { actor, .. }
            | Self::ChangeExpression { actor, .. } => Some(actor),
            _ => None,
        }
    }
}
