//! # AST 模块
//!
//! 定义解析后的脚本结构：动作列表 [`ScriptAction`] 与程序 [`Program`]。
//!
//! ## 设计说明
//!
//! 解析器只在边界处使用字符串参数表，随后立即转换为强类型的 `ScriptAction`。
//! 执行引擎读取 `Program` 并产生 Command。

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::command::{EntranceStyle, Gesture};

/// 选择项（AST 级别）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOption {
    /// 选项显示文本（未插值）
    pub text: String,
    /// 跳转目标标签
    pub target: String,
}

/// 变量赋值（`name=raw`）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub name: String,
    /// 原始文本，类型在执行时推断
    pub raw: String,
}

/// 脚本动作
///
/// 解析后不可变。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScriptAction {
    /// 标签定义 `[label name]`
    Label { name: String },

    /// 无条件跳转 `[goto target]`
    Goto { target: String },

    /// 对话文本（普通行或 `[msg content=...]`）
    Message { content: String },

    /// 设置说话者 `[spk name=...]`，空名称隐藏名牌
    Speaker { name: String },

    /// 切换背景 `[bg file=...]`
    Background { file: String },

    /// 角色入场 `[char img=... id=... enter=...]`
    ShowCharacter {
        /// 立绘资源名
        image: String,
        /// 角色标识符（默认等于立绘名）
        actor: String,
        entrance: EntranceStyle,
    },

    /// 角色退场 `[remove target=... exit=...]`
    RemoveCharacter { actor: String, exit: EntranceStyle },

    /// 角色动作 `[action target=... anim=...]`
    ///
    /// 未知动作名解析为 `None`，执行时跳过。
    Gesture {
        actor: String,
        gesture: Option<Gesture>,
    },

    /// 切换表情 `[expr target=... expr=...]`
    Expression { actor: String, image: String },

    /// 变量赋值 `[var a=1 b=2]`
    SetVariables { assignments: Vec<Assignment> },

    /// 变量累加 `[add a=1]`
    AddVariables { assignments: Vec<Assignment> },

    /// 选择分支 `[choices]` 及其后的 `* text > target` 行
    Choices { options: Vec<ChoiceOption> },

    /// 场景切换 `[scene file=... script=...]`
    Scene {
        scene: String,
        script: Option<String>,
    },

    /// 未知标签（执行时跳过）
    Unknown {
        tag: String,
        params: BTreeMap<String, String>,
    },
}

impl ScriptAction {
    /// 动作对应的标签名
    pub fn kind(&self) -> &str {
        match self {
            Self::Label { .. } => "label",
            Self::Goto { .. } => "goto",
            Self::Message { .. } => "msg",
            Self::Speaker { .. } => "spk",
            Self::Background { .. } => "bg",
            Self::ShowCharacter { .. } => "char",
            Self::RemoveCharacter { .. } => "remove",
            Self::Gesture { .. } => "action",
            Self::Expression { .. } => "expr",
            Self::SetVariables { .. } => "var",
            Self::AddVariables { .. } => "add",
            Self::Choices { .. } => "choices",
            Self::Scene { .. } => "scene",
            Self::Unknown { tag, .. } => tag,
        }
    }

    /// 判断动作是否会挂起执行
    pub fn causes_wait(&self) -> bool {
        matches!(self, Self::Message { .. } | Self::Choices { .. })
    }

    /// 如果是标签动作，返回标签名
    pub fn as_label(&self) -> Option<&str> {
        match self {
            Self::Label { name } => Some(name),
            _ => None,
        }
    }
}

/// 解析后的程序
///
/// 标签索引指向标签动作**之后**的位置，同名标签以第一次出现为准。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// 程序标识符（通常为脚本名）
    pub id: String,
    /// 动作列表
    pub actions: Vec<ScriptAction>,
    /// 每个动作对应的源文件行号（1-based）
    #[serde(default)]
    pub source_map: Vec<usize>,
    #[serde(skip)]
    labels: HashMap<String, usize>,
}

impl Program {
    /// 创建新程序
    pub fn new(id: impl Into<String>, actions: Vec<ScriptAction>) -> Self {
        Self::with_source_map(id, actions, Vec::new())
    }

    /// 创建带行号映射的程序
    pub fn with_source_map(
        id: impl Into<String>,
        actions: Vec<ScriptAction>,
        source_map: Vec<usize>,
    ) -> Self {
        let mut program = Self {
            id: id.into(),
            actions,
            source_map,
            labels: HashMap::new(),
        };
        program.build_label_index();
        program
    }

    /// 构建标签索引
    ///
    /// 反序列化得到的程序需要调用一次（标签表不参与序列化）。
    pub fn build_label_index(&mut self) {
        self.labels.clear();
        for (index, action) in self.actions.iter().enumerate() {
            if let Some(name) = action.as_label() {
                self.labels.entry(name.to_string()).or_insert(index + 1);
            }
        }
    }

    /// 标签对应的恢复位置
    pub fn find_label(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    /// 标签表
    pub fn labels(&self) -> &HashMap<String, usize> {
        &self.labels
    }

    /// 获取指定索引的动作
    pub fn get(&self, index: usize) -> Option<&ScriptAction> {
        self.actions.get(index)
    }

    /// 获取动作的源文件行号
    pub fn line_of(&self, index: usize) -> Option<usize> {
        self.source_map.get(index).copied()
    }

    /// 动作数量
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(name: &str) -> ScriptAction {
        ScriptAction::Label {
            name: name.to_string(),
        }
    }

    fn msg(content: &str) -> ScriptAction {
        ScriptAction::Message {
            content: content.to_string(),
        }
    }

    #[test]
    fn test_label_points_past_declaration() {
        let program = Program::new("test", vec![label("start"), msg("hi"), label("end")]);

        assert_eq!(program.find_label("start"), Some(1));
        // 末尾标签指向末尾之后
        assert_eq!(program.find_label("end"), Some(3));
        assert_eq!(program.find_label("missing"), None);
    }

    #[test]
    fn test_duplicate_label_first_wins() {
        let program = Program::new("dup", vec![label("a"), msg("one"), label("a"), msg("two")]);
        assert_eq!(program.find_label("a"), Some(1));
        assert_eq!(program.labels().len(), 1);
    }

    #[test]
    fn test_causes_wait() {
        assert!(msg("x").causes_wait());
        assert!(ScriptAction::Choices { options: vec![] }.causes_wait());
        assert!(!label("a").causes_wait());
        assert!(
            !ScriptAction::Goto {
                target: "a".to_string()
            }
            .causes_wait()
        );
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(msg("x").kind(), "msg");
        assert_eq!(
            ScriptAction::Gesture {
                actor: "a".to_string(),
                gesture: None
            }
            .kind(),
            "action"
        );
        let unknown = ScriptAction::Unknown {
            tag: "sfx".to_string(),
            params: BTreeMap::new(),
        };
        assert_eq!(unknown.kind(), "sfx");
    }

    #[test]
    fn test_deserialized_program_rebuilds_labels() {
        let program = Program::new("p", vec![label("a"), msg("hi")]);
        let json = serde_json::to_string(&program).unwrap();

        let mut restored: Program = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.find_label("a"), None);
        restored.build_label_index();
        assert_eq!(restored.find_label("a"), Some(1));
    }
}
