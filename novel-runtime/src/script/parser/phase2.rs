//! # 阶段 2：动作转换
//!
//! 将识别出的行转换为 [`ScriptAction`]。
//!
//! 标签行先收集为 [`RawTag`]（名称 + 字符串参数表），随后立即转换为强类型动作；
//! 字符串参数表不会离开解析器。

use std::collections::{BTreeMap, HashSet};

use crate::command::{EntranceStyle, Gesture};
use crate::script::ast::{Assignment, ChoiceOption, ScriptAction};

use super::helpers::parse_attributes;
use super::phase1::Line;

/// 未转换的标签（解析器边界）
#[derive(Debug, Clone, PartialEq)]
pub struct RawTag {
    /// 标签名（小写）
    pub name: String,
    /// 参数，保持书写顺序；重复的键以后出现的值为准
    pub params: Vec<(String, String)>,
}

impl RawTag {
    /// 由标签名和标签内容构建
    ///
    /// 内容中没有 `=` 时，整段内容作为 `content` 参数。
    pub fn new(name: &str, body: Option<&str>) -> Self {
        let mut params: Vec<(String, String)> = Vec::new();

        match body {
            Some(body) if body.contains('=') => {
                for (key, value) in parse_attributes(body) {
                    match params.iter_mut().find(|(k, _)| *k == key) {
                        Some(slot) => slot.1 = value,
                        None => params.push((key, value)),
                    }
                }
            }
            Some(body) if !body.is_empty() => {
                params.push(("content".to_string(), body.to_string()));
            }
            _ => {}
        }

        Self {
            name: name.to_ascii_lowercase(),
            params,
        }
    }

    /// 获取参数值
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 获取主参数：优先取指定键，缺省时取 `content`
    fn primary(&self, key: &str) -> Option<&str> {
        self.get(key).or_else(|| self.get("content"))
    }

    fn into_unknown(self) -> ScriptAction {
        ScriptAction::Unknown {
            tag: self.name,
            params: self.params.into_iter().collect::<BTreeMap<_, _>>(),
        }
    }
}

/// 阶段 2 转换器
pub struct Phase2Parser {
    /// 解析警告（非致命问题）
    pub warnings: Vec<String>,
    /// 当前正在填充的选择动作下标
    open_choice: Option<usize>,
    seen_labels: HashSet<String>,
}

impl Phase2Parser {
    pub fn new() -> Self {
        Self {
            warnings: Vec::new(),
            open_choice: None,
            seen_labels: HashSet::new(),
        }
    }

    /// 清空上一次解析的状态
    pub fn reset(&mut self) {
        self.warnings.clear();
        self.open_choice = None;
        self.seen_labels.clear();
    }

    /// 转换全部行，返回动作列表和对应行号
    pub fn convert(&mut self, lines: Vec<Line>) -> (Vec<ScriptAction>, Vec<usize>) {
        let mut actions: Vec<ScriptAction> = Vec::new();
        let mut source_map = Vec::new();

        for line in lines {
            let line_number = line.line_number();
            match line {
                Line::Tag { name, body, .. } => {
                    let tag = RawTag::new(&name, body.as_deref());
                    let action = self.convert_tag(tag, line_number);
                    if matches!(action, ScriptAction::Choices { .. }) {
                        self.open_choice = Some(actions.len());
                    }
                    actions.push(action);
                    source_map.push(line_number);
                }
                Line::ChoiceOption { text, target, .. } => {
                    let slot = self.open_choice.and_then(|i| actions.get_mut(i));
                    match slot {
                        Some(ScriptAction::Choices { options }) => {
                            options.push(ChoiceOption { text, target });
                        }
                        _ => self.warnings.push(format!(
                            "第 {} 行：选择项不在任何 [choices] 之后，已忽略: {} > {}",
                            line_number, text, target
                        )),
                    }
                }
                Line::Text { content, .. } => {
                    actions.push(ScriptAction::Message { content });
                    source_map.push(line_number);
                }
            }
        }

        (actions, source_map)
    }

    /// 转换单个标签
    ///
    /// 缺少必需属性的标签降级为 `Unknown`，执行时跳过。
    fn convert_tag(&mut self, tag: RawTag, line_number: usize) -> ScriptAction {
        match tag.name.as_str() {
            "label" => match tag.primary("name") {
                Some(name) => {
                    let name = name.to_string();
                    if !self.seen_labels.insert(name.clone()) {
                        self.warnings.push(format!(
                            "第 {} 行：标签 '{}' 重复定义，以第一次定义为准",
                            line_number, name
                        ));
                    }
                    ScriptAction::Label { name }
                }
                None => self.missing(tag, "content", line_number),
            },
            "goto" => match tag.primary("label") {
                Some(target) => ScriptAction::Goto {
                    target: target.to_string(),
                },
                None => self.missing(tag, "label", line_number),
            },
            "msg" => ScriptAction::Message {
                content: tag.primary("content").unwrap_or_default().to_string(),
            },
            "spk" => ScriptAction::Speaker {
                name: tag.primary("name").unwrap_or_default().to_string(),
            },
            "bg" => match tag.primary("file") {
                Some(file) => ScriptAction::Background {
                    file: file.to_string(),
                },
                None => self.missing(tag, "file", line_number),
            },
            "char" => match tag.primary("img") {
                Some(image) => {
                    let image = image.to_string();
                    let actor = tag.get("id").map_or_else(|| image.clone(), str::to_string);
                    let entrance = self.style(tag.get("enter"), line_number);
                    ScriptAction::ShowCharacter {
                        image,
                        actor,
                        entrance,
                    }
                }
                None => self.missing(tag, "img", line_number),
            },
            "remove" => match tag.primary("target") {
                Some(actor) => {
                    let actor = actor.to_string();
                    let exit = self.style(tag.get("exit"), line_number);
                    ScriptAction::RemoveCharacter { actor, exit }
                }
                None => self.missing(tag, "target", line_number),
            },
            "action" => match (tag.get("target"), tag.get("anim")) {
                (Some(actor), Some(anim)) => {
                    let gesture = Gesture::parse(anim);
                    if gesture.is_none() {
                        self.warnings.push(format!(
                            "第 {} 行：未知的角色动作 '{}'，执行时将跳过",
                            line_number, anim
                        ));
                    }
                    ScriptAction::Gesture {
                        actor: actor.to_string(),
                        gesture,
                    }
                }
                (None, _) => self.missing(tag, "target", line_number),
                (_, None) => self.missing(tag, "anim", line_number),
            },
            "expr" => match (tag.get("target"), tag.get("expr")) {
                (Some(actor), Some(image)) => ScriptAction::Expression {
                    actor: actor.to_string(),
                    image: image.to_string(),
                },
                (None, _) => self.missing(tag, "target", line_number),
                (_, None) => self.missing(tag, "expr", line_number),
            },
            "var" => ScriptAction::SetVariables {
                assignments: assignments(tag),
            },
            "add" => ScriptAction::AddVariables {
                assignments: assignments(tag),
            },
            "choices" => ScriptAction::Choices {
                options: Vec::new(),
            },
            "scene" => match tag.primary("file") {
                Some(scene) => ScriptAction::Scene {
                    scene: scene.to_string(),
                    script: tag.get("script").map(str::to_string),
                },
                None => self.missing(tag, "file", line_number),
            },
            _ => {
                self.warnings.push(format!(
                    "第 {} 行：未知标签 '{}'，执行时将跳过",
                    line_number, tag.name
                ));
                tag.into_unknown()
            }
        }
    }

    /// 解析入场/退场方向，未知值回退为 Center
    fn style(&mut self, value: Option<&str>, line_number: usize) -> EntranceStyle {
        let Some(value) = value else {
            return EntranceStyle::default();
        };
        EntranceStyle::parse(value).unwrap_or_else(|| {
            self.warnings.push(format!(
                "第 {} 行：未知的方向 '{}'，使用 center",
                line_number, value
            ));
            EntranceStyle::default()
        })
    }

    fn missing(&mut self, tag: RawTag, attr: &str, line_number: usize) -> ScriptAction {
        self.warnings.push(format!(
            "第 {} 行：[{}] 缺少属性 '{}'，执行时将跳过",
            line_number, tag.name, attr
        ));
        tag.into_unknown()
    }
}

fn assignments(tag: RawTag) -> Vec<Assignment> {
    tag.params
        .into_iter()
        .map(|(name, raw)| Assignment { name, raw })
        .collect()
}
