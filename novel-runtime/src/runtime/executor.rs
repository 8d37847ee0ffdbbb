//! # Executor 模块
//!
//! 将单个 [`ScriptAction`] 转换为 Command。
//!
//! ## 职责
//!
//! - 读取 ScriptAction，执行变量副作用
//! - 产生对应的 Command（文本、名牌、选项已完成变量插值）
//! - 决定是否需要挂起、跳转或切换场景

use tracing::{debug, warn};

use crate::command::{Choice, Command, SceneTransition};
use crate::script::ScriptAction;
use crate::script::ast::Assignment;
use crate::state::DispatchState;
use crate::variables::VariableStore;

/// 执行结果
#[derive(Debug, Default)]
pub struct ExecuteResult {
    /// 产生的命令
    pub commands: Vec<Command>,
    /// 挂起状态（如果需要等待）
    pub suspend: Option<DispatchState>,
    /// 跳转目标标签
    pub jump_to: Option<String>,
    /// 场景切换请求
    pub transition: Option<SceneTransition>,
}

impl ExecuteResult {
    /// 创建空结果
    fn empty() -> Self {
        Self::default()
    }

    /// 创建带命令的结果
    fn with_commands(commands: Vec<Command>) -> Self {
        Self {
            commands,
            ..Self::default()
        }
    }

    /// 创建带等待的结果
    fn with_wait(commands: Vec<Command>, suspend: DispatchState) -> Self {
        Self {
            commands,
            suspend: Some(suspend),
            ..Self::default()
        }
    }

    /// 创建跳转结果
    fn with_jump(target: &str) -> Self {
        Self {
            jump_to: Some(target.to_string()),
            ..Self::default()
        }
    }
}

/// 动作执行器
///
/// 负责将单个 ScriptAction 转换为 Command。
pub struct Executor {}

impl Executor {
    /// 创建新的执行器
    pub fn new() -> Self {
        Self {}
    }

    /// 执行单个动作
    pub fn execute(&mut self, action: &ScriptAction, vars: &mut VariableStore) -> ExecuteResult {
        match action {
            // 标签只是跳转目标
            ScriptAction::Label { .. } => ExecuteResult::empty(),

            ScriptAction::Goto { target } => ExecuteResult::with_jump(target),

            ScriptAction::Message { content } => ExecuteResult::with_wait(
                vec![Command::ShowText {
                    content: vars.substitute(content),
                }],
                DispatchState::AwaitingAdvance { revealing: true },
            ),

            ScriptAction::Speaker { name } => {
                let name = vars.substitute(name);
                let name = (!name.is_empty()).then_some(name);
                ExecuteResult::with_commands(vec![Command::ShowSpeaker { name }])
            }

            ScriptAction::Background { file } => {
                ExecuteResult::with_commands(vec![Command::ShowBackground { file: file.clone() }])
            }

            ScriptAction::ShowCharacter {
                image,
                actor,
                entrance,
            } => ExecuteResult::with_commands(vec![Command::SpawnActor {
                actor: actor.clone(),
                image: image.clone(),
                entrance: *entrance,
            }]),

            ScriptAction::RemoveCharacter { actor, exit } => {
                ExecuteResult::with_commands(vec![Command::DespawnActor {
                    actor: actor.clone(),
                    exit: *exit,
                }])
            }

            ScriptAction::Gesture { actor, gesture } => match gesture {
                Some(gesture) => ExecuteResult::with_commands(vec![Command::PlayGesture {
                    actor: actor.clone(),
                    gesture: *gesture,
                }]),
                None => {
                    warn!(actor = %actor, "未知的角色动作，已跳过");
                    ExecuteResult::empty()
                }
            },

            ScriptAction::Expression { actor, image } => {
                ExecuteResult::with_commands(vec![Command::ChangeExpression {
                    actor: actor.clone(),
                    image: image.clone(),
                }])
            }

            ScriptAction::SetVariables { assignments } => {
                for Assignment { name, raw } in assignments {
                    let value = vars.set(name.as_str(), raw);
                    debug!(name = %name, value = %value, "设置变量");
                }
                ExecuteResult::empty()
            }

            ScriptAction::AddVariables { assignments } => {
                for Assignment { name, raw } in assignments {
                    match vars.add(name, raw) {
                        Ok(value) => debug!(name = %name, value = %value, "累加变量"),
                        Err(e) => warn!(error = %e, "变量累加失败，保持原值"),
                    }
                }
                ExecuteResult::empty()
            }

            ScriptAction::Choices { options } => {
                if options.is_empty() {
                    warn!("选择分支没有任何选项，已跳过");
                    return ExecuteResult::empty();
                }
                let choices = options
                    .iter()
                    .map(|option| Choice {
                        text: vars.substitute(&option.text),
                        target_label: option.target.clone(),
                    })
                    .collect::<Vec<_>>();
                let choice_count = choices.len();
                ExecuteResult::with_wait(
                    vec![Command::PresentChoices { choices }],
                    DispatchState::AwaitingChoice { choice_count },
                )
            }

            ScriptAction::Scene { scene, script } => ExecuteResult {
                transition: Some(SceneTransition {
                    scene: scene.clone(),
                    script: script.clone(),
                }),
                ..ExecuteResult::default()
            },

            ScriptAction::Unknown { tag, .. } => {
                warn!(tag = %tag, "未知或不完整的标签，已跳过");
                ExecuteResult::empty()
            }
        }
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Gesture;
    use crate::script::ast::ChoiceOption;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    fn assign(name: &str, raw: &str) -> Assignment {
        Assignment {
            name: name.to_string(),
            raw: raw.to_string(),
        }
    }

    #[test]
    fn test_message_substitutes_and_waits() {
        let mut vars = VariableStore::new();
        vars.set("n", "3");

        let result = Executor::new().execute(
            &ScriptAction::Message {
                content: "还剩 {n} 次".to_string(),
            },
            &mut vars,
        );

        assert_eq!(
            result.commands,
            vec![Command::ShowText {
                content: "还剩 3 次".to_string()
            }]
        );
        assert_eq!(
            result.suspend,
            Some(DispatchState::AwaitingAdvance { revealing: true })
        );
    }

    #[test]
    fn test_empty_speaker_hides_plate() {
        let mut vars = VariableStore::new();
        let result = Executor::new().execute(
            &ScriptAction::Speaker {
                name: String::new(),
            },
            &mut vars,
        );
        assert_eq!(result.commands, vec![Command::ShowSpeaker { name: None }]);
        assert!(result.suspend.is_none());
    }

    #[test]
    fn test_variable_actions() {
        let mut vars = VariableStore::new();
        let mut executor = Executor::new();

        executor.execute(
            &ScriptAction::SetVariables {
                assignments: vec![assign("hp", "10"), assign("name", "Alice")],
            },
            &mut vars,
        );
        let result = executor.execute(
            &ScriptAction::AddVariables {
                assignments: vec![assign("hp", "5"), assign("hp", "oops")],
            },
            &mut vars,
        );

        assert!(result.commands.is_empty());
        assert_eq!(vars.get("hp").map(ToString::to_string), Some("15".to_string()));
        assert_eq!(
            vars.get("name").map(ToString::to_string),
            Some("Alice".to_string())
        );
    }

    /// 统计 WARN 级别事件的订阅层
    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn count_warnings(f: impl FnOnce()) -> usize {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(count.clone()));
        tracing::subscriber::with_default(subscriber, f);
        count.load(Ordering::SeqCst)
    }

    #[test]
    fn test_failed_add_warns_and_keeps_value() {
        let mut vars = VariableStore::new();
        vars.set("n", "1");

        let warnings = count_warnings(|| {
            Executor::new().execute(
                &ScriptAction::AddVariables {
                    assignments: vec![assign("n", "x")],
                },
                &mut vars,
            );
        });

        assert_eq!(warnings, 1);
        assert_eq!(vars.get("n").map(ToString::to_string), Some("1".to_string()));

        let warnings = count_warnings(|| {
            Executor::new().execute(
                &ScriptAction::AddVariables {
                    assignments: vec![assign("n", "2")],
                },
                &mut vars,
            );
        });
        assert_eq!(warnings, 0);
    }

    #[test]
    fn test_choices_present_and_wait() {
        let mut vars = VariableStore::new();
        vars.set("who", "Bob");

        let result = Executor::new().execute(
            &ScriptAction::Choices {
                options: vec![
                    ChoiceOption {
                        text: "跟 {who} 走".to_string(),
                        target: "follow".to_string(),
                    },
                    ChoiceOption {
                        text: "留下".to_string(),
                        target: "stay".to_string(),
                    },
                ],
            },
            &mut vars,
        );

        let Some(Command::PresentChoices { choices }) = result.commands.first() else {
            panic!("expected PresentChoices");
        };
        assert_eq!(choices[0].text, "跟 Bob 走");
        assert_eq!(choices[1].target_label, "stay");
        assert_eq!(
            result.suspend,
            Some(DispatchState::AwaitingChoice { choice_count: 2 })
        );
    }

    #[test]
    fn test_empty_choices_do_not_wait() {
        let mut vars = VariableStore::new();
        let result =
            Executor::new().execute(&ScriptAction::Choices { options: vec![] }, &mut vars);
        assert!(result.commands.is_empty());
        assert!(result.suspend.is_none());
    }

    #[test]
    fn test_unknown_gesture_is_skipped() {
        let mut vars = VariableStore::new();
        let mut executor = Executor::new();

        let skipped = executor.execute(
            &ScriptAction::Gesture {
                actor: "alice".to_string(),
                gesture: None,
            },
            &mut vars,
        );
        assert!(skipped.commands.is_empty());

        let played = executor.execute(
            &ScriptAction::Gesture {
                actor: "alice".to_string(),
                gesture: Some(Gesture::Nod),
            },
            &mut vars,
        );
        assert_eq!(played.commands.len(), 1);
    }

    #[test]
    fn test_goto_and_scene() {
        let mut vars = VariableStore::new();
        let mut executor = Executor::new();

        let jump = executor.execute(
            &ScriptAction::Goto {
                target: "end".to_string(),
            },
            &mut vars,
        );
        assert_eq!(jump.jump_to.as_deref(), Some("end"));

        let scene = executor.execute(
            &ScriptAction::Scene {
                scene: "Chapter2".to_string(),
                script: None,
            },
            &mut vars,
        );
        assert_eq!(
            scene.transition,
            Some(SceneTransition {
                scene: "Chapter2".to_string(),
                script: None,
            })
        );
    }
}
