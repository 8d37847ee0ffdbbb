//! # Director 模块
//!
//! 角色表现：把 spawn / despawn / gesture / expression 请求转换为
//! 按角色排队的 [`ActorTask`]。
//!
//! 请求在入队时就做合法性检查，依据的是"逻辑在场名单"而不是当前画面：
//! 一个角色在入场动画还没播完时就已经被视为在场，退场请求发出后即视为离场。

use std::collections::{BTreeSet, HashSet};

use novel_runtime::{EntranceStyle, Gesture};
use tracing::{debug, error, warn};

use crate::actor_queue::ActorQueueScheduler;
use crate::actor_task::{ActorBoard, ActorTask, ActorVisual};
use crate::animator::Animator;
use crate::config::StageConfig;

/// 立绘资源目录
pub trait AssetCatalog {
    /// 资源是否存在
    fn contains(&self, image: &str) -> bool;
}

/// 认为所有资源都存在
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllAssets;

impl AssetCatalog for AllowAllAssets {
    fn contains(&self, _image: &str) -> bool {
        true
    }
}

impl AssetCatalog for HashSet<String> {
    fn contains(&self, image: &str) -> bool {
        HashSet::contains(self, image)
    }
}

/// 角色布局导演
pub struct LayoutDirector {
    scheduler: ActorQueueScheduler<ActorTask>,
    board: ActorBoard,
    /// 逻辑在场的角色
    roster: BTreeSet<String>,
    catalog: Box<dyn AssetCatalog>,
}

impl LayoutDirector {
    pub fn new(
        animator: Box<dyn Animator>,
        catalog: Box<dyn AssetCatalog>,
        config: StageConfig,
    ) -> Self {
        Self {
            scheduler: ActorQueueScheduler::new(),
            board: ActorBoard::new(animator, config),
            roster: BTreeSet::new(),
            catalog,
        }
    }

    /// 角色入场
    ///
    /// 重复入场与缺失立绘会被忽略，返回 false。
    pub fn spawn(&mut self, actor: &str, image: &str, entrance: EntranceStyle) -> bool {
        if self.roster.contains(actor) {
            warn!(actor, "角色已在场，忽略重复入场");
            return false;
        }
        if !self.catalog.contains(image) {
            error!(actor, image, "找不到立绘");
            return false;
        }

        debug!(actor, image, ?entrance, "角色入场");
        self.roster.insert(actor.to_string());
        self.enqueue(ActorTask::spawn(actor, image, entrance));
        true
    }

    /// 角色退场
    pub fn despawn(&mut self, actor: &str, exit: EntranceStyle) -> bool {
        if !self.roster.remove(actor) {
            warn!(actor, "角色不在场，忽略退场");
            return false;
        }

        debug!(actor, ?exit, "角色退场");
        self.enqueue(ActorTask::despawn(actor, exit));
        true
    }

    /// 播放动作
    pub fn play_gesture(&mut self, actor: &str, gesture: Gesture) -> bool {
        if !self.roster.contains(actor) {
            warn!(actor, ?gesture, "角色不在场，忽略动作");
            return false;
        }

        self.enqueue(ActorTask::gesture(actor, gesture));
        true
    }

    /// 切换表情
    pub fn change_expression(&mut self, actor: &str, image: &str) -> bool {
        if !self.roster.contains(actor) {
            warn!(actor, image, "角色不在场，忽略表情切换");
            return false;
        }
        if !self.catalog.contains(image) {
            error!(actor, image, "找不到表情立绘");
            return false;
        }

        self.enqueue(ActorTask::expression(actor, image));
        true
    }

    fn enqueue(&mut self, task: ActorTask) {
        let actor = task.actor().to_string();
        self.scheduler.enqueue(&actor, task, &mut self.board);
    }

    /// 推进动画时间并轮询任务
    pub fn update(&mut self, dt: f32) {
        self.board.animator_mut().update(dt);
        self.scheduler.tick(&mut self.board);
    }

    /// 立即完成所有进行中与排队的任务
    pub fn complete_all(&mut self) {
        self.scheduler.complete_all(&mut self.board);
        self.board.animator_mut().force_complete_all();
    }

    /// 清空舞台（重新加载脚本时使用）
    pub fn clear(&mut self) {
        self.complete_all();
        self.board.clear();
        self.roster.clear();
    }

    /// 是否没有进行中的任务
    pub fn is_idle(&self) -> bool {
        self.scheduler.is_idle()
    }

    /// 角色是否有任务
    pub fn is_busy(&self, actor: &str) -> bool {
        self.scheduler.is_busy(actor)
    }

    /// 角色是否逻辑在场
    pub fn is_present(&self, actor: &str) -> bool {
        self.roster.contains(actor)
    }

    /// 画面上的角色（从左到右，包含正在退场的角色）
    pub fn actors(&self) -> &[ActorVisual] {
        self.board.actors()
    }

    /// 查找角色视觉状态
    pub fn actor(&self, actor: &str) -> Option<&ActorVisual> {
        self.board.get(actor)
    }
}

impl std::fmt::Debug for LayoutDirector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutDirector")
            .field("scheduler", &self.scheduler)
            .field("board", &self.board)
            .field("roster", &self.roster)
            .finish()
    }
}
