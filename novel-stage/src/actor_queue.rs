//! # Actor Queue 模块
//!
//! 按角色分组的有序任务队列。
//!
//! ## 调度模型
//!
//! - 每个角色一个 FIFO 队列，队首任务是该角色的"活动任务"
//! - 同一角色的任务严格按入队顺序执行；不同角色的队列互不影响，可以同时推进
//! - 单线程协作式调度：宿主每帧调用 [`ActorQueueScheduler::tick`]，
//!   活动任务在 `poll` 中检查自己的补间是否完成
//! - [`ActorQueueScheduler::complete_all`] 是唯一的取消手段：同步地把所有活动
//!   任务和排队任务按顺序推进到终态，然后清空全部队列
//!
//! 队列在第一次入队时创建，排空后移除。

use std::collections::{BTreeMap, VecDeque};

use tracing::trace;

/// 任务轮询结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// 仍在进行
    Pending,
    /// 已完成
    Done,
}

/// 可排队的任务
///
/// 任务本身是一个小状态机，所有可变的外部状态都通过 `Context` 传入。
pub trait QueuedTask {
    /// 任务操作的共享上下文
    type Context;

    /// 开始执行（成为活动任务时调用一次）
    fn start(&mut self, ctx: &mut Self::Context);

    /// 推进任务
    fn poll(&mut self, ctx: &mut Self::Context) -> TaskStatus;

    /// 立即进入终态（零耗时）
    ///
    /// 调用前任务一定已经 `start` 过。
    fn finish_now(&mut self, ctx: &mut Self::Context);
}

/// 单个角色的队列
struct ActorQueue<T> {
    active: Option<T>,
    pending: VecDeque<T>,
}

impl<T> ActorQueue<T> {
    fn new() -> Self {
        Self {
            active: None,
            pending: VecDeque::new(),
        }
    }

    fn is_idle(&self) -> bool {
        self.active.is_none() && self.pending.is_empty()
    }
}

/// 按角色分组的任务调度器
pub struct ActorQueueScheduler<T: QueuedTask> {
    queues: BTreeMap<String, ActorQueue<T>>,
}

impl<T: QueuedTask> Default for ActorQueueScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: QueuedTask> std::fmt::Debug for ActorQueueScheduler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorQueueScheduler")
            .field("queues", &self.queues.len())
            .field("tasks", &self.task_count())
            .finish()
    }
}

impl<T: QueuedTask> ActorQueueScheduler<T> {
    /// 创建空调度器
    pub fn new() -> Self {
        Self {
            queues: BTreeMap::new(),
        }
    }

    /// 入队
    ///
    /// 角色当前没有活动任务时，任务立即开始。
    pub fn enqueue(&mut self, actor: &str, mut task: T, ctx: &mut T::Context) {
        let queue = self
            .queues
            .entry(actor.to_string())
            .or_insert_with(ActorQueue::new);

        if queue.active.is_some() {
            queue.pending.push_back(task);
            trace!(actor, pending = queue.pending.len(), "任务排队");
            return;
        }

        task.start(ctx);
        queue.active = Some(task);
        trace!(actor, "任务开始");
    }

    /// 推进所有队列
    ///
    /// 活动任务完成后，同一帧内立即开始下一个任务。
    pub fn tick(&mut self, ctx: &mut T::Context) {
        for (actor, queue) in self.queues.iter_mut() {
            while let Some(task) = queue.active.as_mut() {
                if task.poll(ctx) == TaskStatus::Pending {
                    break;
                }
                trace!(actor = %actor, "任务完成");
                queue.active = queue.pending.pop_front().map(|mut next| {
                    next.start(ctx);
                    next
                });
            }
        }
        self.queues.retain(|_, queue| !queue.is_idle());
    }

    /// 同步完成所有任务
    ///
    /// 每个角色先完成活动任务，再按顺序开始并完成每个排队任务。
    /// 结束后所有队列为空。没有任务时调用是空操作。
    pub fn complete_all(&mut self, ctx: &mut T::Context) {
        if self.queues.is_empty() {
            return;
        }

        let count = self.task_count();
        for (_, mut queue) in std::mem::take(&mut self.queues) {
            if let Some(mut task) = queue.active.take() {
                task.finish_now(ctx);
            }
            while let Some(mut task) = queue.pending.pop_front() {
                task.start(ctx);
                task.finish_now(ctx);
            }
        }
        trace!(count, "所有任务已强制完成");
    }

    /// 是否没有任何任务
    pub fn is_idle(&self) -> bool {
        self.queues.is_empty()
    }

    /// 角色是否有任务（活动或排队）
    pub fn is_busy(&self, actor: &str) -> bool {
        self.queues.get(actor).is_some_and(|q| !q.is_idle())
    }

    /// 角色排队中的任务数（不含活动任务）
    pub fn pending_len(&self, actor: &str) -> usize {
        self.queues.get(actor).map_or(0, |q| q.pending.len())
    }

    /// 所有任务总数（活动 + 排队）
    pub fn task_count(&self) -> usize {
        self.queues
            .values()
            .map(|q| usize::from(q.active.is_some()) + q.pending.len())
            .sum()
    }
}
