//! # Novel Stage
//!
//! 与具体引擎无关的宿主侧胶水层。
//!
//! ## 组成
//!
//! - [`Stage`]：驱动 `ActionDispatcher`，把 `Command` 分发给表现层与角色导演
//! - [`LayoutDirector`]：角色入场、退场、动作、表情
//! - [`ActorQueueScheduler`]：按角色分组的有序任务队列，支持一次性强制完成
//! - [`Animator`]：补间原语；[`TimelineAnimator`] 是线性参考实现
//! - [`Presentation`]：文本、名牌、选项、背景，由宿主实现
//!
//! ## 时序保证
//!
//! 同一角色的任务严格按请求顺序执行，不同角色之间互不等待。
//! [`Stage::skip`] 会把所有角色动画推进到终态。

pub mod actor_queue;
pub mod actor_task;
pub mod animator;
pub mod config;
pub mod director;
pub mod error;
pub mod presentation;
pub mod stage;

pub use actor_queue::{ActorQueueScheduler, QueuedTask, TaskStatus};
pub use actor_task::{ActorBoard, ActorTask, ActorVisual, ExpressionOverlay};
pub use animator::{Animator, TimelineAnimator, TweenId};
pub use config::StageConfig;
pub use director::{AllowAllAssets, AssetCatalog, LayoutDirector};
pub use error::StageError;
pub use presentation::{Presentation, Typewriter};
pub use stage::Stage;
