//! # Stage 模块
//!
//! 宿主侧驱动器：持有调度器、角色导演与表现层，把 `Command` 分发到对应的执行者。
//!
//! ## 帧循环
//!
//! ```text
//! stage.start()?;
//! loop {
//!     stage.update(dt)?;          // 动画 + 逐字显示 + 显示完成通知
//!     stage.advance()?;           // 用户点击
//!     stage.select_choice(i)?;    // 用户选择
//! }
//! ```

use std::sync::Arc;

use novel_runtime::{
    ActionDispatcher, Command, DialogueInput, DispatchState, Program, SceneTransition,
    VariableStore,
};
use tracing::{debug, info, trace};

use crate::config::StageConfig;
use crate::director::LayoutDirector;
use crate::error::StageError;
use crate::presentation::Presentation;

/// 舞台
pub struct Stage<P: Presentation> {
    dispatcher: ActionDispatcher,
    director: LayoutDirector,
    presentation: P,
    /// 等待宿主处理的场景切换
    transition: Option<SceneTransition>,
}

impl<P: Presentation> Stage<P> {
    /// 创建舞台（尚未开始执行，需要调用 [`Stage::start`]）
    pub fn new(
        program: impl Into<Arc<Program>>,
        variables: VariableStore,
        presentation: P,
        director: LayoutDirector,
        config: &StageConfig,
    ) -> Self {
        let dispatcher =
            ActionDispatcher::new(program, variables).with_auto_advance(config.auto_advance);
        Self {
            dispatcher,
            director,
            presentation,
            transition: None,
        }
    }

    /// 开始执行，直到第一个挂起点
    pub fn start(&mut self) -> Result<DispatchState, StageError> {
        self.tick(None)
    }

    /// 推进时间
    ///
    /// 文本显示完成时通知调度器。
    pub fn update(&mut self, dt: f32) -> Result<DispatchState, StageError> {
        self.presentation.update(dt);
        self.director.update(dt);
        self.sync_reveal()
    }

    /// 用户点击
    pub fn advance(&mut self) -> Result<DispatchState, StageError> {
        self.tick(Some(DialogueInput::Advance))
    }

    /// 用户选择选项
    pub fn select_choice(&mut self, index: usize) -> Result<DispatchState, StageError> {
        self.tick(Some(DialogueInput::choice(index)))
    }

    /// 跳过：立即显示完文本并完成所有角色动画
    pub fn skip(&mut self) -> Result<DispatchState, StageError> {
        self.presentation.complete_reveal_now();
        self.director.complete_all();
        self.sync_reveal()
    }

    /// 用新程序重新开始（保留变量，清空舞台）
    pub fn reload(&mut self, program: impl Into<Arc<Program>>) -> Result<DispatchState, StageError> {
        self.director.clear();
        self.presentation.clear_choices();
        self.transition = None;
        self.dispatcher.reset(program);
        info!(program = %self.dispatcher.program().id, "舞台重新加载");
        self.start()
    }

    /// 取走待处理的场景切换
    pub fn take_transition(&mut self) -> Option<SceneTransition> {
        self.transition.take()
    }

    fn sync_reveal(&mut self) -> Result<DispatchState, StageError> {
        let state = self.dispatcher.state();
        if state == (DispatchState::AwaitingAdvance { revealing: true })
            && self.presentation.reveal_finished()
        {
            return self.tick(Some(DialogueInput::RevealFinished));
        }
        Ok(state)
    }

    fn tick(&mut self, input: Option<DialogueInput>) -> Result<DispatchState, StageError> {
        let tick = self.dispatcher.tick(input)?;
        trace!(commands = tick.commands.len(), state = %tick.state, "tick");
        for command in &tick.commands {
            self.execute(command);
        }
        if let Some(transition) = tick.transition {
            self.transition = Some(transition);
        }
        Ok(tick.state)
    }

    /// 分发单个指令
    fn execute(&mut self, command: &Command) {
        match command {
            Command::ShowText { content } => self.presentation.reveal_text(content),
            Command::CompleteReveal => self.presentation.complete_reveal_now(),
            Command::ShowSpeaker { name } => self.presentation.show_speaker_name(name.as_deref()),
            Command::PresentChoices { choices } => {
                let texts: Vec<String> = choices.iter().map(|c| c.text.clone()).collect();
                self.presentation.present_choices(&texts);
            }
            Command::ClearChoices => self.presentation.clear_choices(),
            Command::ShowBackground { file } => {
                debug!(file = %file, "切换背景");
                self.presentation.show_background(file);
            }
            Command::SpawnActor {
                actor,
                image,
                entrance,
            } => {
                self.director.spawn(actor, image, *entrance);
            }
            Command::DespawnActor { actor, exit } => {
                self.director.despawn(actor, *exit);
            }
            Command::PlayGesture { actor, gesture } => {
                self.director.play_gesture(actor, *gesture);
            }
            Command::ChangeExpression { actor, image } => {
                self.director.change_expression(actor, image);
            }
        }
    }

    /// 当前调度状态
    pub fn state(&self) -> DispatchState {
        self.dispatcher.state()
    }

    /// 是否已结束
    pub fn is_finished(&self) -> bool {
        self.dispatcher.is_finished()
    }

    /// 调度器
    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    /// 变量
    pub fn variables(&self) -> &VariableStore {
        self.dispatcher.variables()
    }

    /// 角色导演
    pub fn director(&self) -> &LayoutDirector {
        &self.director
    }

    /// 表现层
    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    /// 可变表现层
    pub fn presentation_mut(&mut self) -> &mut P {
        &mut self.presentation
    }

    /// 拆出表现层
    pub fn into_presentation(self) -> P {
        self.presentation
    }
}
