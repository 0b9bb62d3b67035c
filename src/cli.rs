//! CLIモジュール

use crate::config::{CliArgs, Config};
use crate::error::LedgerError;
use crate::hooks::GitHooks;
use crate::ledger::{Ledger, StartOutcome};
use crate::report::Report;
use crate::store;
use crate::view;
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use std::env;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info};

/// Took - タスク単位の作業時間トラッキングツール
#[derive(Parser, Debug)]
#[command(name = "took")]
#[command(about = "タスク単位の作業時間トラッキングツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// サブコマンド
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// カレントディレクトリに台帳を作成
    Init {
        /// Gitフックも導入する
        #[arg(long)]
        git: bool,
    },
    /// タスクの計測を開始（タスク省略時は一時停止中のタスクを再開）
    #[command(visible_alias = "s")]
    Start {
        /// タスク名
        #[arg(short, long)]
        task: Option<String>,
    },
    /// 現在のタスクを一時停止
    #[command(visible_alias = "p")]
    Pause,
    /// タスクを完了にする
    Done {
        /// タスク名
        #[arg(short, long)]
        task: String,
    },
    /// タスクを削除
    #[command(visible_alias = "rm")]
    Remove {
        /// タスク名
        #[arg(short, long)]
        task: String,
    },
    /// 現在のタスクの状態を表示
    #[command(visible_alias = "st")]
    Status,
    /// タスク一覧を表示
    #[command(visible_alias = "sa")]
    ShowAll {
        /// 完了済みのタスクも表示
        #[arg(long)]
        done: bool,
    },
    /// タスクの日別ログを表示
    Log {
        /// タスク名
        #[arg(short, long)]
        task: String,
    },
    /// 直近n日のレポートを表示
    #[command(visible_alias = "rp")]
    Report {
        /// 対象日数
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        days: Option<u32>,
    },
}

/// CLIエントリポイント
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let cwd = env::current_dir().context("カレントディレクトリを取得できません")?;

    if let Commands::Init { git } = cli.command {
        return init(&cwd, git);
    }

    let days = match cli.command {
        Commands::Report { days } => days,
        _ => None,
    };
    let config = Config::load(&CliArgs { days })?;

    // 台帳の所在は起動ごとに1回だけ解決する
    let location = store::resolve(&cwd, &config.global_dir)?;
    if location.created {
        println!("グローバル台帳を作成しました: {}", location.dir.display());
    }
    let file = location.file();
    debug!("台帳: {} (global: {})", file.display(), location.global);
    let mut ledger = store::load(&file)
        .with_context(|| format!("台帳を読み込めません: {}", file.display()))?;

    let now = crate::ledger::now();
    ledger.accrue(now);

    let stdout = io::stdout();
    execute(&cli.command, &mut ledger, &config, now, &mut stdout.lock())?;

    store::save(&file, &ledger)
        .with_context(|| format!("台帳を保存できません: {}", file.display()))?;
    Ok(())
}

/// 台帳を作成し、必要ならGitフックを導入
fn init(cwd: &Path, git: bool) -> Result<()> {
    if store::init_local(cwd)? {
        println!("カレントディレクトリに空の台帳を作成しました");
    } else {
        println!("台帳は既に存在します。何もしませんでした");
    }

    if git {
        let hooks = GitHooks::new(cwd);
        if !hooks.is_available() {
            println!(".git ディレクトリが見つかりません。Gitフックは導入しませんでした");
            return Ok(());
        }
        for path in hooks.install()? {
            println!("{}", path.display());
        }
        println!("Gitフックを導入しました");
    }

    Ok(())
}

/// 読み込み済みの台帳に対してコマンドを実行
///
/// 経過時間の積み上げは呼び出し側で済ませておくこと
pub fn execute(
    command: &Commands,
    ledger: &mut Ledger,
    config: &Config,
    now: NaiveDateTime,
    out: &mut impl Write,
) -> Result<()> {
    debug!("コマンド実行: {:?}", command);

    match command {
        Commands::Init { .. } => {}
        Commands::Start { task } => match ledger.start_task(task.as_deref(), now)? {
            StartOutcome::Started { name, created } => {
                if created {
                    writeln!(out, "タスク '{}' を追加しました", name)?;
                }
                writeln!(
                    out,
                    "タスク '{}' の計測を開始しました（{}）",
                    name,
                    now.format("%Y-%m-%d %H:%M:%S")
                )?;
                info!("計測開始: {}", name);
            }
            StartOutcome::Resumed { name } => {
                writeln!(out, "タスク '{}' を再開しました", name)?;
            }
        },
        Commands::Pause => {
            let name = ledger.pause_task()?;
            writeln!(out, "タスク '{}' を一時停止しました", name)?;
        }
        Commands::Done { task } => {
            let was_current = ledger.done_task(task, now)?;
            writeln!(out, "タスク '{}' を完了にしました", task)?;
            if was_current {
                writeln!(out, "実行中のタスクはありません")?;
            }
        }
        Commands::Remove { task } => {
            let was_current = ledger.remove_task(task)?;
            writeln!(out, "タスク '{}' を削除しました", task)?;
            if was_current {
                writeln!(out, "実行中のタスクはありません")?;
            }
        }
        Commands::Status => view::write_status(out, ledger)?,
        Commands::ShowAll { done } => view::write_all_tasks(out, ledger, *done)?,
        Commands::Log { task } => view::write_task_log(out, ledger, task)?,
        Commands::Report { .. } => {
            Report::new(ledger, config.bar_width).write(out, now.date(), config.report_days)?
        }
    }

    Ok(())
}

/// エラーの種類から終了コードを決める
///
/// タスク不在は2、状態遷移の誤りは3、それ以外（IO・設定など）は1
pub fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<LedgerError>() {
        Some(ledger_err) if ledger_err.is_invalid_transition() => 3,
        Some(_) => 2,
        None => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn run_command(ledger: &mut Ledger, args: &[&str], now: NaiveDateTime) -> Result<String> {
        let cli = Cli::try_parse_from(args).unwrap();
        let mut out = Vec::new();
        ledger.accrue(now);
        let config = Config::new(Path::new("/home/test"));
        execute(&cli.command, ledger, &config, now, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_start_command_no_args() {
        let cli = Cli::try_parse_from(["took", "start"]);
        assert!(cli.is_ok());

        if let Commands::Start { task } = cli.unwrap().command {
            assert_eq!(task, None);
        } else {
            panic!("Expected Start command");
        }
    }

    #[test]
    fn test_start_alias_with_task() {
        let cli = Cli::try_parse_from(["took", "s", "-t", "docs"]).unwrap();
        if let Commands::Start { task } = cli.command {
            assert_eq!(task, Some("docs".to_string()));
        } else {
            panic!("Expected Start command");
        }
    }

    #[test]
    fn test_aliases() {
        let cases: [(&[&str], fn(&Commands) -> bool); 5] = [
            (&["took", "p"], |c| matches!(c, Commands::Pause)),
            (&["took", "rm", "-t", "x"], |c| matches!(c, Commands::Remove { .. })),
            (&["took", "st"], |c| matches!(c, Commands::Status)),
            (&["took", "sa"], |c| matches!(c, Commands::ShowAll { done: false })),
            (&["took", "rp"], |c| matches!(c, Commands::Report { days: None })),
        ];
        for (args, check) in cases {
            let cli = Cli::try_parse_from(args).unwrap();
            assert!(check(&cli.command), "{:?}", args);
        }
    }

    #[test]
    fn test_show_all_with_done() {
        let cli = Cli::try_parse_from(["took", "show-all", "--done"]).unwrap();
        assert!(matches!(cli.command, Commands::ShowAll { done: true }));
    }

    #[test]
    fn test_init_with_git() {
        let cli = Cli::try_parse_from(["took", "init", "--git"]).unwrap();
        assert!(matches!(cli.command, Commands::Init { git: true }));
    }

    #[test]
    fn test_done_requires_task() {
        assert!(Cli::try_parse_from(["took", "done"]).is_err());
        assert!(Cli::try_parse_from(["took", "remove"]).is_err());
        assert!(Cli::try_parse_from(["took", "log"]).is_err());
    }

    #[test]
    fn test_report_days() {
        let cli = Cli::try_parse_from(["took", "report", "-d", "7"]).unwrap();
        assert!(matches!(cli.command, Commands::Report { days: Some(7) }));
    }

    #[test]
    fn test_report_days_zero_is_rejected() {
        assert!(Cli::try_parse_from(["took", "report", "--days", "0"]).is_err());
    }

    #[test]
    fn test_execute_start_pause_resume() {
        let mut ledger = Ledger::new();

        let out = run_command(&mut ledger, &["took", "start", "-t", "docs"], at(9, 0)).unwrap();
        assert!(out.contains("タスク 'docs' を追加しました"));

        let out = run_command(&mut ledger, &["took", "pause"], at(10, 0)).unwrap();
        assert!(out.contains("一時停止しました"));
        assert_eq!(ledger.task("docs").unwrap().time_spent, 3600);

        let out = run_command(&mut ledger, &["took", "start"], at(12, 0)).unwrap();
        assert!(out.contains("再開しました"));
        run_command(&mut ledger, &["took", "status"], at(12, 30)).unwrap();
        assert_eq!(ledger.task("docs").unwrap().time_spent, 5400);
    }

    #[test]
    fn test_execute_done_clears_current() {
        let mut ledger = Ledger::new();
        run_command(&mut ledger, &["took", "start", "-t", "docs"], at(9, 0)).unwrap();

        let out = run_command(&mut ledger, &["took", "done", "-t", "docs"], at(9, 30)).unwrap();
        assert!(out.contains("実行中のタスクはありません"));

        let out = run_command(&mut ledger, &["took", "status"], at(10, 0)).unwrap();
        assert!(out.contains("実行中のタスクはありません"));
        assert_eq!(ledger.task("docs").unwrap().time_spent, 1800);
    }

    #[test]
    fn test_execute_remove_missing_task() {
        let mut ledger = Ledger::new();
        let err = run_command(&mut ledger, &["took", "rm", "-t", "ghost"], at(9, 0)).unwrap_err();
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn test_execute_pause_without_task() {
        let mut ledger = Ledger::new();
        let err = run_command(&mut ledger, &["took", "pause"], at(9, 0)).unwrap_err();
        assert_eq!(exit_code(&err), 3);
    }

    #[test]
    fn test_execute_log_missing_task() {
        let mut ledger = Ledger::new();
        let err = run_command(&mut ledger, &["took", "log", "-t", "ghost"], at(9, 0)).unwrap_err();
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn test_execute_report() {
        let mut ledger = Ledger::new();
        run_command(&mut ledger, &["took", "start", "-t", "docs"], at(9, 0)).unwrap();

        let out = run_command(&mut ledger, &["took", "report"], at(10, 0)).unwrap();
        assert!(out.contains("2024-01-01"));
        assert!(out.contains("docs"));
    }

    #[test]
    fn test_exit_code_for_other_errors() {
        let err = anyhow::anyhow!("io failure");
        assert_eq!(exit_code(&err), 1);
    }
}
