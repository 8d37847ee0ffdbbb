//! # novel
//!
//! ```bash
//! novel run                              # 播放 config.json 中的入口脚本
//! novel run scripts/intro.txt --auto --choose 1,0
//! novel check                            # 检查 scripts_root 下所有脚本
//! novel check scripts/intro.txt
//! ```

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use novel_cli::{AppConfig, RunOptions, check_files, collect_script_files, print_report, run};
use novel_stage::AssetCatalog;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "novel")]
#[command(about = "分支对话脚本播放器")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 配置文件（默认：config.json）
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 播放脚本
    Run {
        /// 脚本文件（默认：配置中的 start_script）
        script: Option<PathBuf>,

        /// 自动推进，不等待输入
        #[arg(long)]
        auto: bool,

        /// 自动模式下依次选择的选项（从 0 开始，逗号分隔）
        #[arg(long, value_delimiter = ',')]
        choose: Vec<usize>,

        /// 最多处理的挂起点数量
        #[arg(long, default_value_t = 10_000)]
        max_steps: usize,
    },

    /// 检查脚本（默认：scripts_root 下所有脚本）
    Check {
        /// 脚本文件或目录
        path: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = AppConfig::try_load(&cli.config);
    let level = match (&loaded, cli.verbose) {
        (_, true) => "debug".to_string(),
        (Ok(config), false) => config.log_level.clone(),
        (Err(_), false) => "info".to_string(),
    };
    init_tracing(&level);

    let config = match loaded {
        Ok(config) => {
            debug!(path = %cli.config.display(), "配置文件加载成功");
            config
        }
        Err(e) => {
            warn!(path = %cli.config.display(), error = %e, "配置文件不可用，使用默认配置");
            AppConfig::default()
        }
    };

    match real_main(cli.command, &config) {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn real_main(command: Commands, config: &AppConfig) -> anyhow::Result<ExitCode> {
    config.validate().context("配置无效")?;

    match command {
        Commands::Run {
            script,
            auto,
            choose,
            max_steps,
        } => {
            let script = script.or_else(|| config.start_script_path()).context(
                "没有指定脚本：请在命令行传入脚本路径，或在 config.json 中配置 start_script",
            )?;
            let options = RunOptions {
                auto,
                choices: choose,
                max_steps,
            };

            let summary = run(config, &script, &options, io::stdin().lock(), io::stdout().lock())?;
            info!(
                scripts = summary.scripts.len(),
                steps = summary.steps,
                completed = summary.completed,
                "播放结束"
            );
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { path } => {
            let path = path.unwrap_or_else(|| config.scripts_root.clone());
            let files = collect_script_files(&path)?;
            if files.is_empty() {
                warn!(path = %path.display(), "未找到脚本文件（.txt）");
                return Ok(ExitCode::SUCCESS);
            }

            let catalog = match &config.characters_dir {
                Some(_) => Some(novel_cli::player::build_catalog(config)?),
                None => None,
            };
            let catalog_ref: Option<&dyn AssetCatalog> = catalog.as_deref();
            let report = check_files(&files, catalog_ref);
            print_report(&report, &mut io::stdout().lock())?;

            Ok(if report.has_errors() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            })
        }
    }
}
