//! # Actor Task 模块
//!
//! 角色视觉状态与作用在其上的排队任务（入场、退场、动作、表情）。
//!
//! 每个任务只启动 0→1 的进度补间，再把进度映射到自己关心的属性上，
//! 因此强制完成时只需把属性设为终值。

use std::f32::consts::PI;

use novel_runtime::{EntranceStyle, Gesture};

use crate::actor_queue::{QueuedTask, TaskStatus};
use crate::animator::{Animator, TweenId};
use crate::config::StageConfig;

/// 立绘上方叠加的新表情（淡入中）
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionOverlay {
    pub image: String,
    /// 显露进度（0.0 - 1.0）
    pub reveal: f32,
}

/// 角色的视觉状态
#[derive(Debug, Clone, PartialEq)]
pub struct ActorVisual {
    /// 角色标识符
    pub id: String,
    /// 当前立绘
    pub image: String,
    /// 布局槽宽度（0 表示不占位）
    pub width: f32,
    /// 容器偏移（入场/退场移动）
    pub offset: (f32, f32),
    /// 立绘偏移（动作）
    pub motion: (f32, f32),
    /// 缩放
    pub scale: f32,
    /// 透明度
    pub alpha: f32,
    /// 正在切换的表情
    pub overlay: Option<ExpressionOverlay>,
}

impl ActorVisual {
    /// 入场前的初始状态：宽度 0、完全透明
    fn entering(id: &str, image: &str, offset: (f32, f32)) -> Self {
        Self {
            id: id.to_string(),
            image: image.to_string(),
            width: 0.0,
            offset,
            motion: (0.0, 0.0),
            scale: 1.0,
            alpha: 0.0,
            overlay: None,
        }
    }
}

/// 舞台上的角色排列及其动画器
pub struct ActorBoard {
    /// 按槽位从左到右排列
    actors: Vec<ActorVisual>,
    animator: Box<dyn Animator>,
    config: StageConfig,
}

impl ActorBoard {
    /// 创建空舞台
    pub fn new(animator: Box<dyn Animator>, config: StageConfig) -> Self {
        Self {
            actors: Vec::new(),
            animator,
            config,
        }
    }

    /// 所有角色（从左到右）
    pub fn actors(&self) -> &[ActorVisual] {
        &self.actors
    }

    /// 查找角色
    pub fn get(&self, id: &str) -> Option<&ActorVisual> {
        self.actors.iter().find(|a| a.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut ActorVisual> {
        self.actors.iter_mut().find(|a| a.id == id)
    }

    /// 动画器
    pub fn animator(&self) -> &dyn Animator {
        self.animator.as_ref()
    }

    /// 可变动画器
    pub fn animator_mut(&mut self) -> &mut dyn Animator {
        self.animator.as_mut()
    }

    /// 插入新角色
    ///
    /// 左侧入场排在最前，右侧入场排在最后，居中/上方入场插入中间。
    fn insert(&mut self, visual: ActorVisual, entrance: EntranceStyle) {
        let total = self.actors.len() + 1;
        let index = match entrance {
            EntranceStyle::Left | EntranceStyle::BottomLeft => 0,
            EntranceStyle::Right | EntranceStyle::BottomRight => total - 1,
            EntranceStyle::Center | EntranceStyle::Top => (total - 1) / 2,
        };
        self.actors.insert(index, visual);
    }

    fn remove(&mut self, id: &str) {
        self.actors.retain(|a| a.id != id);
    }

    /// 清空舞台（不播放动画）
    pub(crate) fn clear(&mut self) {
        self.actors.clear();
        self.animator.force_complete_all();
    }

    /// 方向向量 × 移动距离
    fn direction(&self, style: EntranceStyle) -> (f32, f32) {
        let d = self.config.move_distance;
        match style {
            EntranceStyle::Left => (-d, 0.0),
            EntranceStyle::Right => (d, 0.0),
            EntranceStyle::Center | EntranceStyle::BottomLeft | EntranceStyle::BottomRight => {
                (0.0, -d)
            }
            EntranceStyle::Top => (0.0, d),
        }
    }

    fn tween(&mut self, duration: f32) -> TweenId {
        self.animator.animate_value(0.0, 1.0, duration)
    }

    /// 补间进度；已结束的补间视为 1.0
    fn progress(&self, id: TweenId) -> f32 {
        if self.animator.is_finished(id) {
            1.0
        } else {
            self.animator.value(id).unwrap_or(1.0)
        }
    }
}

impl std::fmt::Debug for ActorBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorBoard")
            .field("actors", &self.actors)
            .field("animating", &self.animator.has_active())
            .finish()
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// 衰减正弦：t=0 与 t=1 时为 0
fn damped_wave(amplitude: f32, frequency: f32, t: f32) -> f32 {
    if t >= 1.0 {
        return 0.0;
    }
    amplitude * (1.0 - t) * (PI * frequency * t).sin()
}

/// 动作参数：(时长, 位移幅度, 缩放幅度, 频率)
fn gesture_profile(gesture: Gesture) -> (f32, (f32, f32), f32, f32) {
    match gesture {
        Gesture::Jump => (0.5, (0.0, 100.0), 0.0, 2.0),
        Gesture::Shake => (0.5, (50.0, 0.0), 0.0, 10.0),
        Gesture::ShakeHorizontal => (0.5, (0.0, 50.0), 0.0, 10.0),
        Gesture::Punch => (0.4, (0.0, 0.0), 0.2, 1.0),
        // 点头单独处理
        Gesture::Nod => (0.3, (0.0, -30.0), 0.0, 1.0),
    }
}

/// 点头每段时长
const NOD_HALF: f32 = 0.15;
/// 表情切换时长
const EXPRESSION_DURATION: f32 = 0.5;
/// 退场透明度时长占总时长比例
const EXIT_ALPHA_RATIO: f32 = 0.8;

/// 角色任务
#[derive(Debug)]
pub enum ActorTask {
    /// 入场：宽度 0→W，偏移 方向→0，透明度 0→1
    Spawn {
        actor: String,
        image: String,
        entrance: EntranceStyle,
        tween: Option<TweenId>,
    },
    /// 退场：宽度 W→0，偏移 0→方向，透明度在 0.8 倍时长内 1→0，结束后移除
    Despawn {
        actor: String,
        exit: EntranceStyle,
        tweens: Option<(TweenId, TweenId)>,
        from_width: f32,
    },
    /// 动作：结束时位移与缩放回到原值
    Gesture {
        actor: String,
        gesture: Gesture,
        tween: Option<TweenId>,
        /// 点头的第二段（抬头）
        second_half: bool,
    },
    /// 表情：叠加层淡入，结束后替换立绘
    Expression {
        actor: String,
        image: String,
        tween: Option<TweenId>,
    },
}

impl ActorTask {
    pub fn spawn(actor: &str, image: &str, entrance: EntranceStyle) -> Self {
        Self::Spawn {
            actor: actor.to_string(),
            image: image.to_string(),
            entrance,
            tween: None,
        }
    }

    pub fn despawn(actor: &str, exit: EntranceStyle) -> Self {
        Self::Despawn {
            actor: actor.to_string(),
            exit,
            tweens: None,
            from_width: 0.0,
        }
    }

    pub fn gesture(actor: &str, gesture: Gesture) -> Self {
        Self::Gesture {
            actor: actor.to_string(),
            gesture,
            tween: None,
            second_half: false,
        }
    }

    pub fn expression(actor: &str, image: &str) -> Self {
        Self::Expression {
            actor: actor.to_string(),
            image: image.to_string(),
            tween: None,
        }
    }

    /// 任务作用的角色
    pub fn actor(&self) -> &str {
        match self {
            Self::Spawn { actor, .. }
            | Self::Despawn { actor, .. }
            | Self::Gesture { actor, .. }
            | Self::Expression { actor, .. } => actor,
        }
    }

    /// 按进度 `t` 应用属性
    fn apply(&self, board: &mut ActorBoard, t: f32) {
        let width = board.config.actor_width;
        match self {
            Self::Spawn {
                actor, entrance, ..
            } => {
                let (dx, dy) = board.direction(*entrance);
                if let Some(visual) = board.get_mut(actor) {
                    visual.width = lerp(0.0, width, t);
                    visual.offset = (lerp(dx, 0.0, t), lerp(dy, 0.0, t));
                    visual.alpha = t;
                }
            }
            Self::Despawn {
                actor,
                exit,
                tweens,
                from_width,
            } => {
                let (dx, dy) = board.direction(*exit);
                // 透明度有自己的补间，比位移更早结束
                let fade = tweens.map_or(t, |(_, alpha)| board.progress(alpha));
                if let Some(visual) = board.get_mut(actor) {
                    visual.width = lerp(*from_width, 0.0, t);
                    visual.offset = (lerp(0.0, dx, t), lerp(0.0, dy, t));
                    visual.alpha = 1.0 - fade;
                }
            }
            Self::Gesture {
                actor,
                gesture,
                second_half,
                ..
            } => {
                let (_, (mx, my), scale_amp, freq) = gesture_profile(*gesture);
                if let Some(visual) = board.get_mut(actor) {
                    match gesture {
                        Gesture::Nod => {
                            let depth = if *second_half { 1.0 - t } else { t };
                            visual.motion = (0.0, my * depth);
                        }
                        _ => {
                            visual.motion = (damped_wave(mx, freq, t), damped_wave(my, freq, t));
                            visual.scale = 1.0 + damped_wave(scale_amp, freq, t).abs();
                        }
                    }
                }
            }
            Self::Expression { actor, image, .. } => {
                if let Some(visual) = board.get_mut(actor) {
                    if t >= 1.0 {
                        visual.image = image.clone();
                        visual.overlay = None;
                    } else {
                        visual.overlay = Some(ExpressionOverlay {
                            image: image.clone(),
                            reveal: t,
                        });
                    }
                }
            }
        }
    }

    /// 当前阶段的补间
    fn current_tween(&self) -> Option<TweenId> {
        match self {
            Self::Spawn { tween, .. }
            | Self::Gesture { tween, .. }
            | Self::Expression { tween, .. } => *tween,
            // 宽度补间决定退场何时结束
            Self::Despawn { tweens, .. } => tweens.map(|(width, _)| width),
        }
    }
}

impl QueuedTask for ActorTask {
    type Context = ActorBoard;

    fn start(&mut self, board: &mut ActorBoard) {
        let duration = board.config.actor_duration;
        match self {
            Self::Spawn {
                actor,
                image,
                entrance,
                tween,
            } => {
                let offset = board.direction(*entrance);
                board.insert(ActorVisual::entering(actor, image, offset), *entrance);
                *tween = Some(board.tween(duration));
            }
            Self::Despawn {
                actor,
                tweens,
                from_width,
                ..
            } => {
                *from_width = board.get(actor).map_or(0.0, |v| v.width);
                let width = board.tween(duration);
                let alpha = board.tween(duration * EXIT_ALPHA_RATIO);
                *tweens = Some((width, alpha));
            }
            Self::Gesture {
                actor,
                gesture,
                tween,
                ..
            } => {
                // 重置上一次动作残留的位移
                if let Some(visual) = board.get_mut(actor) {
                    visual.motion = (0.0, 0.0);
                    visual.scale = 1.0;
                }
                let length = match gesture {
                    Gesture::Nod => NOD_HALF,
                    other => gesture_profile(*other).0,
                };
                *tween = Some(board.tween(length));
            }
            Self::Expression { tween, .. } => {
                *tween = Some(board.tween(EXPRESSION_DURATION));
            }
        }
        self.apply(board, 0.0);
    }

    fn poll(&mut self, board: &mut ActorBoard) -> TaskStatus {
        let Some(id) = self.current_tween() else {
            return TaskStatus::Done;
        };
        let t = board.progress(id);
        self.apply(board, t);
        if t < 1.0 {
            return TaskStatus::Pending;
        }

        // 点头：下去之后再抬起来
        if let Self::Gesture {
            gesture: Gesture::Nod,
            tween,
            second_half,
            ..
        } = self
            && !*second_half
        {
            *second_half = true;
            *tween = Some(board.tween(NOD_HALF));
            return TaskStatus::Pending;
        }

        if let Self::Despawn { actor, .. } = self {
            board.remove(actor);
        }
        TaskStatus::Done
    }

    fn finish_now(&mut self, board: &mut ActorBoard) {
        if let Some(id) = self.current_tween() {
            board.animator.finish(id);
        }
        if let Self::Despawn {
            tweens: Some((_, alpha)),
            ..
        } = self
        {
            board.animator.finish(*alpha);
        }
        if let Self::Gesture { second_half, .. } = self {
            *second_half = true;
        }
        self.apply(board, 1.0);
        if let Self::Despawn { actor, .. } = self {
            board.remove(actor);
        }
    }
}
