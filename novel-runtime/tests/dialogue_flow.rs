//! 端到端脚本执行测试：解析 → 调度 → Command 序列

use novel_runtime::{
    ActionDispatcher, Command, DialogueInput, DispatchState, EntranceStyle, Gesture, Parser,
    RuntimeError, ScriptAction, ScriptCursor, VarValue, VariableStore,
};
use std::sync::Arc;

/// 以"点击到底"的方式运行，选择时总是选 `pick`，返回所有对话文本
fn play(text: &str, pick: usize, max_ticks: usize) -> Vec<String> {
    let program = Parser::new().parse("flow", text);
    let mut dispatcher = ActionDispatcher::new(program, VariableStore::new());
    let mut shown = Vec::new();
    let mut input = None;

    for _ in 0..max_ticks {
        let tick = dispatcher.tick(input.take()).unwrap();
        for cmd in &tick.commands {
            if let Command::ShowText { content } = cmd {
                shown.push(content.clone());
            }
        }
        input = match tick.state {
            DispatchState::AwaitingAdvance { .. } => Some(DialogueInput::Advance),
            DispatchState::AwaitingChoice { .. } => Some(DialogueInput::choice(pick)),
            _ => break,
        };
    }

    shown
}

#[test]
fn test_label_loop_repeats() {
    let program = Arc::new(Parser::new().parse("loop", "[label a]\nhi\n[goto a]"));
    assert_eq!(program.len(), 3);
    assert_eq!(program.find_label("a"), Some(1));

    let mut cursor = ScriptCursor::new(program.clone());
    cursor.jump_to("a").unwrap();
    assert_eq!(
        cursor.advance(),
        Some(&ScriptAction::Message {
            content: "hi".to_string()
        })
    );

    // 无限循环是预期行为
    let shown = play("[label a]\nhi\n[goto a]", 0, 9);
    assert!(shown.len() >= 4);
    assert!(shown.iter().all(|s| s == "hi"));
}

#[test]
fn test_branching_story() {
    let text = "\
# 开场
[spk name=旁白]
你醒了。
[choices]
* 起床 > up
* 继续睡 > sleep

[label up]
[var energy=10]
你起床了，精力 {energy}。
[goto end]

[label sleep]
[var energy=1]
[add energy=1]
你又睡着了，精力 {energy}。

[label end]
完。";

    assert_eq!(
        play(text, 0, 20),
        vec!["你醒了。", "你起床了，精力 10。", "完。"]
    );
    assert_eq!(
        play(text, 1, 20),
        vec!["你醒了。", "你又睡着了，精力 2。", "完。"]
    );
}

#[test]
fn test_actor_commands_in_order() {
    let text = "\
[char img=alice_smile id=alice enter=left]
[action target=alice anim=nod]
[expr target=alice expr=alice_sad]
[remove target=alice exit=right]
done";
    let program = Parser::new().parse("actors", text);
    let mut dispatcher = ActionDispatcher::new(program, VariableStore::new());

    let tick = dispatcher.tick(None).unwrap();
    assert_eq!(
        tick.commands,
        vec![
            Command::SpawnActor {
                actor: "alice".to_string(),
                image: "alice_smile".to_string(),
                entrance: EntranceStyle::Left,
            },
            Command::PlayGesture {
                actor: "alice".to_string(),
                gesture: Gesture::Nod,
            },
            Command::ChangeExpression {
                actor: "alice".to_string(),
                image: "alice_sad".to_string(),
            },
            Command::DespawnActor {
                actor: "alice".to_string(),
                exit: EntranceStyle::Right,
            },
            Command::ShowText {
                content: "done".to_string(),
            },
        ]
    );
}

#[test]
fn test_variables_carry_between_programs() {
    let first = Parser::new().parse("one", "[var gold=5 title=勇者]\n[scene file=Two script=two]");
    let mut dispatcher = ActionDispatcher::new(first, VariableStore::new());

    let tick = dispatcher.tick(None).unwrap();
    let transition = tick.transition.unwrap();
    assert_eq!(transition.script.as_deref(), Some("two"));

    let mut vars = dispatcher.into_variables();
    vars.add("gold", "3").unwrap();
    assert_eq!(vars.get("gold"), Some(&VarValue::Int(8)));

    let second = Parser::new().parse("two", "{title} 有 {gold} 金币");
    let mut dispatcher = ActionDispatcher::new(second, vars);
    let tick = dispatcher.tick(None).unwrap();
    assert_eq!(
        tick.commands,
        vec![Command::ShowText {
            content: "勇者 有 8 金币".to_string()
        }]
    );
}

#[test]
fn test_choice_to_missing_label_is_fatal() {
    let program = Parser::new().parse("broken", "[choices]\n* 走 > nowhere");
    let mut dispatcher = ActionDispatcher::new(program, VariableStore::new());
    dispatcher.tick(None).unwrap();

    let err = dispatcher.tick(Some(DialogueInput::choice(0))).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::LabelNotFound {
            label: "nowhere".to_string()
        }
    );
    assert!(dispatcher.is_finished());
    assert_eq!(
        dispatcher.tick(Some(DialogueInput::Advance)),
        Err(RuntimeError::ScriptEnded)
    );
}

#[test]
fn test_unknown_tags_do_not_stall() {
    let shown = play("[sfx file=boom]\n[action target=nobody anim=dance]\n继续", 0, 5);
    assert_eq!(shown, vec!["继续"]);
}

#[test]
fn test_reveal_end_or_click_both_continue() {
    let program = Parser::new().parse("reveal", "一\n二\n三");
    let mut dispatcher = ActionDispatcher::new(program, VariableStore::new());
    dispatcher.tick(None).unwrap();

    // 自然显示完毕
    let tick = dispatcher.tick(Some(DialogueInput::RevealFinished)).unwrap();
    assert_eq!(
        tick.commands,
        vec![Command::ShowText {
            content: "二".to_string()
        }]
    );

    // 显示中点击：完成显示并继续
    let tick = dispatcher.tick(Some(DialogueInput::Advance)).unwrap();
    assert_eq!(
        tick.commands,
        vec![
            Command::CompleteReveal,
            Command::ShowText {
                content: "三".to_string()
            },
        ]
    );
}

#[test]
fn test_silent_loop_stops_with_error() {
    let text = "[label top]\n[var n=0]\n[add n=1]\n[goto top]";
    let program = Parser::new().parse("silent", text);
    let mut dispatcher = ActionDispatcher::new(program, VariableStore::new());

    assert_eq!(
        dispatcher.tick(None),
        Err(RuntimeError::NoProgress {
            label: "top".to_string()
        })
    );
    assert!(dispatcher.is_finished());
}
