//! # Engine 模块
//!
//! 动作调度器：按顺序执行程序，在挂起点停下等待 Host 输入。
//!
//! ## 执行模型
//!
//! ```text
//! tick(input) -> Tick { commands, state, transition }
//! ```
//!
//! 1. 根据 input 尝试解除当前等待
//! 2. 若不再等待，从游标连续取出动作执行，直到挂起、切换场景或到达末尾
//! 3. 返回执行过程中产生的 Command 和新的状态
//!
//! ## 错误策略
//!
//! 跳转到未定义的标签是致命错误：`tick` 返回 `RuntimeError::LabelNotFound`，
//! 调度器进入 `Finished`，游标位置保持不变。
//!
//! 脚本没有条件分支，同一次 tick 内两次执行同一个 `goto` 意味着循环中没有挂起点，
//! 会永远执行下去：`tick` 返回 `RuntimeError::NoProgress` 并进入 `Finished`。
//!
//! ## 逐字显示
//!
//! 默认情况下，显示自然结束（`RevealFinished`）或显示中点击（`Advance`，
//! 同时发出 `CompleteReveal`）都会进入下一个动作。
//! `with_auto_advance(false)` 切换为点击继续：显示结束后停下，等待下一次点击。

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::command::{Command, SceneTransition};
use crate::error::RuntimeError;
use crate::input::DialogueInput;
use crate::runtime::executor::Executor;
use crate::script::{Program, ScriptAction, ScriptCursor};
use crate::state::DispatchState;
use crate::variables::VariableStore;

/// 单次 tick 的输出
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// 本次 tick 产生的所有指令
    pub commands: Vec<Command>,
    /// 新的调度状态
    pub state: DispatchState,
    /// 场景切换请求（Host 负责加载）
    pub transition: Option<SceneTransition>,
}

impl Tick {
    fn new(commands: Vec<Command>, state: DispatchState) -> Self {
        Self {
            commands,
            state,
            transition: None,
        }
    }
}

/// 动作调度器
///
/// 这是 novel-runtime 的核心类型，负责驱动程序执行。
///
/// # 使用示例
///
/// ```ignore
/// let program = Parser::new().parse("intro", text);
/// let mut dispatcher = ActionDispatcher::new(program, VariableStore::new());
///
/// let mut input = None;
/// loop {
///     let tick = dispatcher.tick(input.take())?;
///
///     // Host 执行 tick.commands...
///
///     // 根据 tick.state 采集输入...
/// }
/// ```
pub struct ActionDispatcher {
    cursor: ScriptCursor,
    variables: VariableStore,
    state: DispatchState,
    executor: Executor,
    /// 逐字显示结束（或被点击完成）后立即继续
    auto_advance: bool,
}

impl ActionDispatcher {
    /// 创建新的调度器
    ///
    /// 变量存储由调用方传入，不同的运行互不影响。
    pub fn new(program: impl Into<Arc<Program>>, variables: VariableStore) -> Self {
        Self {
            cursor: ScriptCursor::new(program.into()),
            variables,
            state: DispatchState::Idle,
            executor: Executor::new(),
            auto_advance: true,
        }
    }

    /// 设置逐字显示结束后是否立即继续
    ///
    /// 为 `false` 时显示结束后停在 `AwaitingAdvance { revealing: false }`，
    /// 显示中的点击只完成显示。
    pub fn with_auto_advance(mut self, auto_advance: bool) -> Self {
        self.auto_advance = auto_advance;
        self
    }

    /// 核心驱动函数
    ///
    /// # 参数
    ///
    /// - `input`: Host 传入的输入（可选）
    ///
    /// # 返回
    ///
    /// 本次 tick 产生的指令、新的状态以及可能的场景切换请求。
    pub fn tick(&mut self, input: Option<DialogueInput>) -> Result<Tick, RuntimeError> {
        if self.state.is_finished() {
            return match input {
                Some(_) => Err(RuntimeError::ScriptEnded),
                None => Ok(Tick::new(Vec::new(), self.state)),
            };
        }

        let mut commands = Vec::new();

        // 1. 处理输入，尝试解除等待
        if let Some(input) = input {
            self.handle_input(input, &mut commands)?;
        }

        // 2. 如果仍在等待，直接返回
        if self.state.is_waiting() {
            return Ok(Tick::new(commands, self.state));
        }

        // 3. 继续执行直到挂起或结束
        self.state = DispatchState::Running;
        let mut jumped_from = HashSet::new();
        loop {
            let Some(action) = self.cursor.advance().cloned() else {
                info!(program = %self.cursor.program().id, "脚本执行完毕");
                self.state = DispatchState::Finished;
                return Ok(Tick::new(commands, self.state));
            };

            debug!(
                line = self.cursor.current_line(),
                kind = action.kind(),
                "执行动作"
            );
            let result = self.executor.execute(&action, &mut self.variables);
            commands.extend(result.commands);

            if let Some(transition) = result.transition {
                info!(scene = %transition.scene, script = ?transition.script, "请求切换场景");
                self.state = DispatchState::Finished;
                return Ok(Tick {
                    commands,
                    state: self.state,
                    transition: Some(transition),
                });
            }

            if let Some(target) = result.jump_to {
                if let Some(position) = self.cursor.position()
                    && !jumped_from.insert(position)
                {
                    error!(
                        program = %self.cursor.program().id,
                        line = self.cursor.current_line(),
                        label = %target,
                        "跳转循环中没有挂起点，终止执行"
                    );
                    self.state = DispatchState::Finished;
                    return Err(RuntimeError::NoProgress { label: target });
                }
                self.jump(&target)?;
                continue;
            }

            if let Some(suspend) = result.suspend {
                self.state = suspend;
                return Ok(Tick::new(commands, self.state));
            }
        }
    }

    /// 处理输入，解除等待状态
    fn handle_input(
        &mut self,
        input: DialogueInput,
        commands: &mut Vec<Command>,
    ) -> Result<(), RuntimeError> {
        match (self.state, input) {
            // 逐字显示中点击：立即显示完
            (DispatchState::AwaitingAdvance { revealing: true }, DialogueInput::Advance) => {
                commands.push(Command::CompleteReveal);
                self.state = self.after_reveal();
                Ok(())
            }

            (DispatchState::AwaitingAdvance { revealing: true }, DialogueInput::RevealFinished) => {
                self.state = self.after_reveal();
                Ok(())
            }

            (DispatchState::AwaitingAdvance { revealing: false }, DialogueInput::Advance) => {
                self.state = DispatchState::Running;
                Ok(())
            }

            // 重复的完成通知
            (DispatchState::AwaitingAdvance { revealing: false }, DialogueInput::RevealFinished) => {
                Ok(())
            }

            (DispatchState::AwaitingChoice { choice_count }, DialogueInput::ChoiceSelected { index }) => {
                if index >= choice_count {
                    return Err(RuntimeError::InvalidChoiceIndex {
                        index,
                        max: choice_count,
                    });
                }

                let target = match self.cursor.current() {
                    Some(ScriptAction::Choices { options }) => {
                        options.get(index).map(|option| option.target.clone())
                    }
                    _ => None,
                };
                let Some(target) = target else {
                    return Err(RuntimeError::StateMismatch {
                        expected: "选择分支".to_string(),
                        actual: format!("{:?}", self.cursor.current().map(ScriptAction::kind)),
                    });
                };

                debug!(index, target = %target, "选择分支");
                commands.push(Command::ClearChoices);
                self.jump(&target)?;
                self.state = DispatchState::Running;
                Ok(())
            }

            // 选择期间的点击被忽略
            (DispatchState::AwaitingChoice { .. }, _) => Ok(()),

            (state, DialogueInput::ChoiceSelected { .. }) => Err(RuntimeError::StateMismatch {
                expected: "AwaitingChoice".to_string(),
                actual: state.to_string(),
            }),

            // 未在等待时收到点击，忽略
            _ => Ok(()),
        }
    }

    /// 逐字显示结束后的状态
    fn after_reveal(&self) -> DispatchState {
        if self.auto_advance {
            DispatchState::Running
        } else {
            DispatchState::AwaitingAdvance { revealing: false }
        }
    }

    /// 跳转到标签；失败时终止执行
    fn jump(&mut self, label: &str) -> Result<(), RuntimeError> {
        if let Err(e) = self.cursor.jump_to(label) {
            error!(
                program = %self.cursor.program().id,
                line = self.cursor.current_line(),
                error = %e,
                "跳转失败，终止执行"
            );
            self.state = DispatchState::Finished;
            return Err(e);
        }
        Ok(())
    }

    /// 用新程序重新开始，保留变量
    pub fn reset(&mut self, program: impl Into<Arc<Program>>) {
        self.cursor = ScriptCursor::new(program.into());
        self.state = DispatchState::Idle;
        info!(program = %self.cursor.program().id, "调度器已重置");
    }

    /// 获取当前状态
    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// 检查是否执行完毕
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// 获取游标
    pub fn cursor(&self) -> &ScriptCursor {
        &self.cursor
    }

    /// 获取当前程序
    pub fn program(&self) -> &Arc<Program> {
        self.cursor.program()
    }

    /// 获取变量存储
    pub fn variables(&self) -> &VariableStore {
        &self.variables
    }

    /// 取出变量存储（用于延续到下一个脚本）
    pub fn into_variables(self) -> VariableStore {
        self.variables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::Parser;

    fn dispatcher(text: &str) -> ActionDispatcher {
        let program = Parser::new().parse("test", text);
        ActionDispatcher::new(program, VariableStore::new())
    }

    fn texts(tick: &Tick) -> Vec<&str> {
        tick.commands
            .iter()
            .filter_map(|c| match c {
                Command::ShowText { content } => Some(content.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_dispatcher_creation() {
        let d = dispatcher("hi");
        assert_eq!(d.state(), DispatchState::Idle);
        assert_eq!(d.cursor().position(), None);
    }

    fn click_to_continue(text: &str) -> ActionDispatcher {
        dispatcher(text).with_auto_advance(false)
    }

    #[test]
    fn test_click_during_reveal_advances() {
        let mut d = dispatcher("Hello\nWorld");
        d.tick(None).unwrap();

        let tick = d.tick(Some(DialogueInput::Advance)).unwrap();
        assert_eq!(tick.commands[0], Command::CompleteReveal);
        assert_eq!(texts(&tick), vec!["World"]);
        assert_eq!(tick.state, DispatchState::AwaitingAdvance { revealing: true });
    }

    #[test]
    fn test_reveal_finished_advances() {
        let mut d = dispatcher("one\ntwo");
        d.tick(None).unwrap();

        let tick = d.tick(Some(DialogueInput::RevealFinished)).unwrap();
        assert_eq!(texts(&tick), vec!["two"]);

        let tick = d.tick(Some(DialogueInput::RevealFinished)).unwrap();
        assert_eq!(tick.state, DispatchState::Finished);
    }

    #[test]
    fn test_message_reveal_then_advance() {
        let mut d = click_to_continue("[spk name=Alice]\nHello\nWorld");

        let tick = d.tick(None).unwrap();
        assert_eq!(
            tick.commands,
            vec![
                Command::ShowSpeaker {
                    name: Some("Alice".to_string())
                },
                Command::ShowText {
                    content: "Hello".to_string()
                },
            ]
        );
        assert_eq!(tick.state, DispatchState::AwaitingAdvance { revealing: true });

        // 逐字显示中点击：只完成显示
        let tick = d.tick(Some(DialogueInput::Advance)).unwrap();
        assert_eq!(tick.commands, vec![Command::CompleteReveal]);
        assert_eq!(tick.state, DispatchState::AwaitingAdvance { revealing: false });

        // 再次点击：进入下一句
        let tick = d.tick(Some(DialogueInput::Advance)).unwrap();
        assert_eq!(texts(&tick), vec!["World"]);
    }

    #[test]
    fn test_click_to_continue_waits_after_reveal() {
        let mut d = click_to_continue("one\ntwo");
        d.tick(None).unwrap();

        let tick = d.tick(Some(DialogueInput::RevealFinished)).unwrap();
        assert!(tick.commands.is_empty());
        assert_eq!(tick.state, DispatchState::AwaitingAdvance { revealing: false });

        // 重复的完成通知不推进
        let tick = d.tick(Some(DialogueInput::RevealFinished)).unwrap();
        assert!(tick.commands.is_empty());

        let tick = d.tick(Some(DialogueInput::Advance)).unwrap();
        assert_eq!(texts(&tick), vec!["two"]);
    }

    #[test]
    fn test_end_of_script_is_terminal() {
        let mut d = dispatcher("[bg file=forest]");

        let tick = d.tick(None).unwrap();
        assert_eq!(tick.commands.len(), 1);
        assert_eq!(tick.state, DispatchState::Finished);
        assert!(d.is_finished());

        // 结束后 tick(None) 无输出，输入报错
        assert!(d.tick(None).unwrap().commands.is_empty());
        assert_eq!(
            d.tick(Some(DialogueInput::Advance)),
            Err(RuntimeError::ScriptEnded)
        );
    }

    #[test]
    fn test_goto_skips_actions() {
        let mut d = dispatcher("开始\n[goto end]\n这句不应该执行\n[label end]\n结束");

        let tick = d.tick(None).unwrap();
        assert_eq!(texts(&tick), vec!["开始"]);

        let tick = d.tick(Some(DialogueInput::Advance)).unwrap();
        assert_eq!(texts(&tick), vec!["结束"]);
    }

    #[test]
    fn test_loop_through_message_keeps_running() {
        let mut d = dispatcher("[label a]\n[var n=1]\n又一次\n[goto a]");
        for _ in 0..3 {
            let tick = d.tick(Some(DialogueInput::Advance)).unwrap();
            assert_eq!(texts(&tick), vec!["又一次"]);
        }
    }

    #[test]
    fn test_jump_cycle_without_suspension_is_fatal() {
        let mut d = dispatcher("[label a]\n[goto a]");
        assert_eq!(
            d.tick(None),
            Err(RuntimeError::NoProgress {
                label: "a".to_string()
            })
        );
        assert!(d.is_finished());

        // 循环经过多个 goto 与非挂起动作
        let mut d = dispatcher("开始\n[label a]\n[add n=1]\n[bg file=x]\n[goto b]\n[label b]\n[goto a]");
        d.tick(None).unwrap();
        let err = d.tick(Some(DialogueInput::Advance)).unwrap_err();
        assert!(matches!(err, RuntimeError::NoProgress { .. }));
        assert_eq!(d.state(), DispatchState::Finished);
    }

    #[test]
    fn test_choice_jumps_to_target() {
        let text = "\
[choices]
* 选项A > a
* 选项B > b
[label a]
选了A
[label b]
选了B";
        let mut d = dispatcher(text);

        let tick = d.tick(None).unwrap();
        assert_eq!(tick.state, DispatchState::AwaitingChoice { choice_count: 2 });

        // 点击被忽略
        let tick = d.tick(Some(DialogueInput::Advance)).unwrap();
        assert!(tick.commands.is_empty());
        assert_eq!(tick.state, DispatchState::AwaitingChoice { choice_count: 2 });

        let tick = d.tick(Some(DialogueInput::choice(1))).unwrap();
        assert_eq!(tick.commands[0], Command::ClearChoices);
        assert_eq!(texts(&tick), vec!["选了B"]);
    }

    #[test]
    fn test_invalid_choice_index_is_recoverable() {
        let mut d = dispatcher("[choices]\n* A > a\n[label a]\nA");
        d.tick(None).unwrap();

        assert_eq!(
            d.tick(Some(DialogueInput::choice(5))),
            Err(RuntimeError::InvalidChoiceIndex { index: 5, max: 1 })
        );
        assert_eq!(d.state(), DispatchState::AwaitingChoice { choice_count: 1 });

        let tick = d.tick(Some(DialogueInput::choice(0))).unwrap();
        assert_eq!(texts(&tick), vec!["A"]);
    }

    #[test]
    fn test_choice_outside_choice_state() {
        let mut d = dispatcher("hello");
        d.tick(None).unwrap();

        let err = d.tick(Some(DialogueInput::choice(0))).unwrap_err();
        assert!(matches!(err, RuntimeError::StateMismatch { .. }));
    }

    #[test]
    fn test_undefined_label_is_fatal() {
        let mut d = dispatcher("before\n[goto nowhere]\nafter");
        d.tick(None).unwrap();

        let err = d.tick(Some(DialogueInput::Advance)).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::LabelNotFound {
                label: "nowhere".to_string()
            }
        );
        assert_eq!(d.state(), DispatchState::Finished);
        // 游标停在 goto 上
        assert_eq!(d.cursor().position(), Some(1));
    }

    #[test]
    fn test_variables_and_substitution() {
        let mut d = dispatcher("[var n=5]\n[add n=3]\n[add n=x]\nHello {n}!");

        let tick = d.tick(None).unwrap();
        assert_eq!(texts(&tick), vec!["Hello 8!"]);
    }

    #[test]
    fn test_scene_requests_transition() {
        let mut d = dispatcher("[var gold=2]\n[scene file=Town script=town]\nnot reached");

        let tick = d.tick(None).unwrap();
        assert_eq!(tick.state, DispatchState::Finished);
        assert_eq!(
            tick.transition,
            Some(SceneTransition {
                scene: "Town".to_string(),
                script: Some("town".to_string()),
            })
        );

        let vars = d.into_variables();
        assert_eq!(vars.get("gold").map(ToString::to_string), Some("2".to_string()));
    }

    #[test]
    fn test_reset_keeps_variables() {
        let mut d = dispatcher("[var n=1]");
        d.tick(None).unwrap();
        assert!(d.is_finished());

        d.reset(Parser::new().parse("next", "n = {n}"));
        assert_eq!(d.state(), DispatchState::Idle);

        let tick = d.tick(None).unwrap();
        assert_eq!(texts(&tick), vec!["n = 1"]);
    }
}
