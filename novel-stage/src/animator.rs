//! # Animator 模块
//!
//! 不透明的补间原语："在 D 秒内把值从 A 变到 B"。
//!
//! 动画器只关注 f32 值的时间轴变化，不假设对象类型；
//! 谁启动补间，谁负责读取当前值并应用到自己的对象上。
//!
//! [`TimelineAnimator`] 是线性、按帧推进的参考实现，不做缓动。

use std::collections::HashMap;

/// 补间 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(pub u64);

/// 补间原语
///
/// 已完成（或从未存在）的补间对 `is_finished` 返回 true，
/// 此时调用方应直接使用自己的目标值。
pub trait Animator {
    /// 启动补间，返回 ID
    fn animate_value(&mut self, from: f32, to: f32, duration: f32) -> TweenId;

    /// 补间当前值
    fn value(&self, id: TweenId) -> Option<f32>;

    /// 补间是否已结束
    fn is_finished(&self, id: TweenId) -> bool;

    /// 立即结束单个补间
    fn finish(&mut self, id: TweenId);

    /// 立即结束所有补间
    fn force_complete_all(&mut self);

    /// 推进时间（秒）
    fn update(&mut self, dt: f32);

    /// 是否还有进行中的补间
    fn has_active(&self) -> bool;
}

/// 单个补间
#[derive(Debug, Clone)]
struct Tween {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
}

impl Tween {
    fn new(from: f32, to: f32, duration: f32) -> Self {
        Self {
            from,
            to,
            duration: duration.max(0.0),
            elapsed: 0.0,
        }
    }

    fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).min(1.0)
        }
    }

    fn current_value(&self) -> f32 {
        self.from + (self.to - self.from) * self.progress()
    }

    fn is_complete(&self) -> bool {
        self.progress() >= 1.0
    }
}

/// 线性时间轴动画器
///
/// 完成的补间在 `update` 中被移除。
#[derive(Debug, Default)]
pub struct TimelineAnimator {
    tweens: HashMap<TweenId, Tween>,
    next_id: u64,
}

impl TimelineAnimator {
    /// 创建新的动画器
    pub fn new() -> Self {
        Self::default()
    }

    /// 进行中的补间数量
    pub fn active_count(&self) -> usize {
        self.tweens.len()
    }
}

impl Animator for TimelineAnimator {
    fn animate_value(&mut self, from: f32, to: f32, duration: f32) -> TweenId {
        self.next_id += 1;
        let id = TweenId(self.next_id);
        let tween = Tween::new(from, to, duration);
        // 零时长补间立即完成
        if !tween.is_complete() {
            self.tweens.insert(id, tween);
        }
        id
    }

    fn value(&self, id: TweenId) -> Option<f32> {
        self.tweens.get(&id).map(Tween::current_value)
    }

    fn is_finished(&self, id: TweenId) -> bool {
        self.tweens.get(&id).is_none_or(Tween::is_complete)
    }

    fn finish(&mut self, id: TweenId) {
        self.tweens.remove(&id);
    }

    fn force_complete_all(&mut self) {
        self.tweens.clear();
    }

    fn update(&mut self, dt: f32) {
        for tween in self.tweens.values_mut() {
            tween.elapsed += dt;
        }
        self.tweens.retain(|_, tween| !tween.is_complete());
    }

    fn has_active(&self) -> bool {
        !self.tweens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tween_progresses_linearly() {
        let mut animator = TimelineAnimator::new();
        let id = animator.animate_value(0.0, 10.0, 1.0);

        assert_eq!(animator.value(id), Some(0.0));
        assert!(!animator.is_finished(id));

        animator.update(0.25);
        assert_eq!(animator.value(id), Some(2.5));

        animator.update(1.0);
        assert!(animator.is_finished(id));
        assert_eq!(animator.value(id), None);
        assert!(!animator.has_active());
    }

    #[test]
    fn test_zero_duration_is_finished() {
        let mut animator = TimelineAnimator::new();
        let id = animator.animate_value(1.0, 0.0, 0.0);
        assert!(animator.is_finished(id));
        assert_eq!(animator.active_count(), 0);
    }

    #[test]
    fn test_finish_and_force_complete() {
        let mut animator = TimelineAnimator::new();
        let a = animator.animate_value(0.0, 1.0, 1.0);
        let b = animator.animate_value(0.0, 1.0, 2.0);
        let c = animator.animate_value(0.0, 1.0, 3.0);

        animator.finish(a);
        assert!(animator.is_finished(a));
        assert!(!animator.is_finished(b));

        animator.force_complete_all();
        assert!(animator.is_finished(b));
        assert!(animator.is_finished(c));
        assert!(!animator.has_active());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut animator = TimelineAnimator::new();
        let a = animator.animate_value(0.0, 1.0, 1.0);
        let b = animator.animate_value(0.0, 1.0, 1.0);
        assert_ne!(a, b);
    }
}
