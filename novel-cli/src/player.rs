//! # Player 模块
//!
//! 无界面播放：驱动 [`Stage`]，把文字记录写到输出流。
//!
//! - 交互模式：回车推进，输入序号选择
//! - 自动模式：立即推进，按 `choices` 依次选择（用完后选第一项）
//!
//! 场景切换会加载 `<scripts_root>/<script>.txt`，变量沿用。

use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::Context;
use novel_runtime::{DispatchState, Parser, Program, VariableStore};
use novel_stage::{AllowAllAssets, AssetCatalog, LayoutDirector, Stage, TimelineAnimator};
use tracing::{info, warn};

use crate::catalog::DirectoryCatalog;
use crate::config::AppConfig;
use crate::console::ConsolePresentation;

/// 播放选项
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// 自动推进
    pub auto: bool,
    /// 自动模式下依次使用的选项序号（从 0 开始）
    pub choices: Vec<usize>,
    /// 最多处理的挂起点数量
    pub max_steps: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            auto: false,
            choices: Vec::new(),
            max_steps: 10_000,
        }
    }
}

/// 播放结果
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// 依次加载的脚本
    pub scripts: Vec<String>,
    /// 处理的挂起点数量
    pub steps: usize,
    /// 结束时的变量
    pub variables: VariableStore,
    /// 是否正常播放到结尾
    pub completed: bool,
}

/// 读取并解析脚本，解析警告写入日志
pub fn load_program(path: &Path) -> anyhow::Result<Program> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("无法读取脚本: {}", path.display()))?;
    let id = path.display().to_string();

    let mut parser = Parser::new();
    let program = parser.parse(&id, &text);
    for warning in parser.warnings() {
        warn!(script = %id, "{}", warning);
    }
    info!(script = %id, actions = program.len(), "脚本加载完成");
    Ok(program)
}

/// 根据配置创建立绘目录
pub fn build_catalog(config: &AppConfig) -> anyhow::Result<Box<dyn AssetCatalog>> {
    match &config.characters_dir {
        Some(dir) => {
            let catalog = DirectoryCatalog::scan(dir)
                .with_context(|| format!("无法扫描立绘目录: {}", dir.display()))?;
            Ok(Box::new(catalog))
        }
        None => Ok(Box::new(AllowAllAssets)),
    }
}

/// 播放脚本
pub fn run<R: BufRead, W: Write>(
    config: &AppConfig,
    script: &Path,
    options: &RunOptions,
    mut input: R,
    mut out: W,
) -> anyhow::Result<RunSummary> {
    let program = load_program(script)?;
    let mut scripts = vec![program.id.clone()];

    let mut stage = console_stage(config, program, VariableStore::new())?;

    let mut picks = options.choices.iter().copied();
    let mut state = stage.start()?;
    let mut steps = 0;

    loop {
        flush(&mut stage, &mut out)?;
        if steps >= options.max_steps {
            warn!(steps, "达到最大步数，停止播放");
            break;
        }
        steps += 1;

        state = match state {
            DispatchState::AwaitingAdvance { .. } => {
                if !options.auto && !wait_for_enter(&mut input)? {
                    break;
                }
                // 点击继续模式下，跳过显示后还需要一次点击
                match stage.skip()? {
                    DispatchState::AwaitingAdvance { revealing: false } => stage.advance()?,
                    next => next,
                }
            }
            DispatchState::AwaitingChoice { choice_count } => {
                let index = if options.auto {
                    picks.next().unwrap_or(0)
                } else {
                    match read_choice(&mut input, &mut out, choice_count)? {
                        Some(index) => index,
                        None => break,
                    }
                };
                let text = stage.presentation().choices().get(index).cloned();
                let next = stage
                    .select_choice(index)
                    .with_context(|| format!("无法选择第 {} 项", index + 1))?;
                if let Some(text) = text {
                    writeln!(out, "> {text}")?;
                }
                next
            }
            DispatchState::Finished => {
                let Some(transition) = stage.take_transition() else {
                    writeln!(out, "（完）")?;
                    break;
                };
                let name = transition.script.unwrap_or(transition.scene);
                let path = config.script_path(&name);
                info!(script = %path.display(), "场景切换");

                let program = load_program(&path)?;
                scripts.push(program.id.clone());
                stage.reload(program)?
            }
            DispatchState::Idle | DispatchState::Running => break,
        };
    }

    Ok(RunSummary {
        scripts,
        steps,
        variables: stage.variables().clone(),
        completed: stage.is_finished(),
    })
}

fn flush<W: Write>(stage: &mut Stage<ConsolePresentation>, out: &mut W) -> anyhow::Result<()> {
    for line in stage.presentation_mut().drain_lines() {
        writeln!(out, "{line}")?;
    }
    out.flush()?;
    Ok(())
}

/// 等待回车；输入结束时返回 false
fn wait_for_enter<R: BufRead>(input: &mut R) -> anyhow::Result<bool> {
    let mut line = String::new();
    Ok(input.read_line(&mut line)? > 0)
}

/// 读取 1 开始的选项序号，返回 0 开始的下标；输入结束时返回 None
fn read_choice<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    count: usize,
) -> anyhow::Result<Option<usize>> {
    loop {
        write!(out, "请选择 (1-{count}): ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match line.trim().parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => return Ok(Some(n - 1)),
            _ => writeln!(out, "无效的选择")?,
        }
    }
}

/// 创建以控制台为表现层的舞台
pub fn console_stage(
    config: &AppConfig,
    program: Program,
    variables: VariableStore,
) -> anyhow::Result<Stage<ConsolePresentation>> {
    let director = LayoutDirector::new(
        Box::new(TimelineAnimator::new()),
        build_catalog(config)?,
        config.stage.clone(),
    );
    let presentation = ConsolePresentation::new(config.stage.chars_per_second);
    Ok(Stage::new(program, variables, presentation, director, &config.stage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use novel_stage::Presentation;

    #[test]
    fn test_read_choice_retries() {
        let mut input = "x\n5\n2\n".as_bytes();
        let mut out = Vec::new();
        assert_eq!(read_choice(&mut input, &mut out, 3).unwrap(), Some(1));

        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.matches("无效的选择").count(), 2);
    }

    #[test]
    fn test_read_choice_eof() {
        let mut input = "".as_bytes();
        let mut out = Vec::new();
        assert_eq!(read_choice(&mut input, &mut out, 2).unwrap(), None);
    }

    #[test]
    fn test_console_stage_plays() {
        let program = Parser::new().parse("inline", "[spk name=A]\n你好");
        let mut stage = console_stage(&AppConfig::default(), program, VariableStore::new()).unwrap();
        stage.start().unwrap();
        assert!(!stage.presentation().reveal_finished());
        assert_eq!(stage.presentation_mut().drain_lines(), vec!["【A】你好"]);
    }
}
