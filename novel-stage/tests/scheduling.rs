//! 角色队列调度：顺序、独立性与强制完成

use novel_runtime::{EntranceStyle, Gesture};
use novel_stage::{AllowAllAssets, LayoutDirector, StageConfig, TimelineAnimator};

fn director() -> LayoutDirector {
    LayoutDirector::new(
        Box::new(TimelineAnimator::new()),
        Box::new(AllowAllAssets),
        StageConfig::default(),
    )
}

/// 两个角色的一段演出
fn perform(director: &mut LayoutDirector) {
    director.spawn("alice", "alice_smile", EntranceStyle::Left);
    director.play_gesture("alice", Gesture::Jump);
    director.change_expression("alice", "alice_sad");
    director.spawn("bob", "bob", EntranceStyle::Right);
    director.play_gesture("bob", Gesture::Nod);
    director.spawn("carol", "carol", EntranceStyle::Center);
    director.despawn("bob", EntranceStyle::Right);
}

fn layout(director: &LayoutDirector) -> String {
    director
        .actors()
        .iter()
        .map(|a| format!("{}:{} w={} a={}", a.id, a.image, a.width, a.alpha))
        .collect::<Vec<_>>()
        .join(" | ")
}

#[test]
fn test_actors_animate_in_parallel() {
    let mut director = director();
    perform(&mut director);

    // 三个角色的入场同时进行
    director.update(0.25);
    for id in ["alice", "bob", "carol"] {
        let alpha = director.actor(id).unwrap().alpha;
        assert!(alpha > 0.0 && alpha < 1.0, "{id}: {alpha}");
    }

    // carol 只有入场，最先空闲
    director.update(0.3);
    assert!(!director.is_busy("carol"));
    assert!(director.is_busy("alice"));
    assert!(director.is_busy("bob"));
}

#[test]
fn test_same_actor_waits_for_previous_task() {
    let mut director = director();
    director.spawn("alice", "alice_smile", EntranceStyle::Left);
    director.change_expression("alice", "alice_sad");

    // 入场期间表情不会开始
    director.update(0.4);
    let alice = director.actor("alice").unwrap();
    assert!(alice.overlay.is_none());
    assert_eq!(alice.image, "alice_smile");

    // 入场结束的同一帧表情开始
    director.update(0.2);
    assert!(director.actor("alice").unwrap().overlay.is_some());
}

#[test]
fn test_complete_all_matches_natural_end() {
    let mut natural = director();
    perform(&mut natural);
    for _ in 0..300 {
        if natural.is_idle() {
            break;
        }
        natural.update(1.0 / 60.0);
    }
    assert!(natural.is_idle());

    let mut skipped = director();
    perform(&mut skipped);
    skipped.update(0.2);
    skipped.complete_all();

    assert!(skipped.is_idle());
    assert_eq!(skipped.actors(), natural.actors());
    insta::assert_snapshot!(
        layout(&skipped),
        @"alice:alice_sad w=350 a=1 | carol:carol w=350 a=1"
    );

    // 再次调用无副作用
    skipped.complete_all();
    assert_eq!(skipped.actors(), natural.actors());
}

#[test]
fn test_complete_all_on_idle_stage() {
    let mut director = director();
    director.complete_all();
    assert!(director.is_idle());
    assert!(director.actors().is_empty());
}
