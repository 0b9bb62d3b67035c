//! 表示モジュール
//!
//! 台帳の内容を読み取り専用で端末向けに整形する。

use crate::error::LedgerError;
use crate::ledger::{Ledger, Task};
use colored::{Color, Colorize};
use std::io;
use unicode_width::UnicodeWidthStr;

const SECONDS_IN_YEAR: u64 = 60 * 60 * 24 * 365;
const SECONDS_IN_MONTH: u64 = 60 * 60 * 24 * 30;
const SECONDS_IN_DAY: u64 = 60 * 60 * 24;
const SECONDS_IN_HOUR: u64 = 60 * 60;
const SECONDS_IN_MINUTE: u64 = 60;

/// 秒数を「1D-2h-3m-4s」形式にフォーマット
pub fn format_duration(total_seconds: u64) -> String {
    let units = [
        (SECONDS_IN_YEAR, "Y"),
        (SECONDS_IN_MONTH, "M"),
        (SECONDS_IN_DAY, "D"),
        (SECONDS_IN_HOUR, "h"),
        (SECONDS_IN_MINUTE, "m"),
        (1, "s"),
    ];

    let mut remainder = total_seconds;
    let mut parts = Vec::new();
    for (size, suffix) in units {
        let count = remainder / size;
        remainder %= size;
        if count > 0 {
            parts.push(format!("{}{}", count, suffix));
        }
    }

    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join("-")
    }
}

fn format_last_updated(task: &Task) -> String {
    task.last_updated
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// 現在のタスクの状態を出力
pub fn write_status(w: &mut impl io::Write, ledger: &Ledger) -> io::Result<()> {
    let Some(task) = ledger.current() else {
        return writeln!(w, "実行中のタスクはありません");
    };

    let state = if ledger.is_paused() {
        "(一時停止中)".red()
    } else {
        "(計測中)".yellow()
    };
    writeln!(w, "{} {}", format!("現在のタスク: {}", task.name).bold().green(), state)?;
    writeln!(w, "経過時間: {}", format_duration(task.time_spent))?;
    writeln!(w, "最終更新: {}", format_last_updated(task))
}

/// タスク一覧を表形式で出力
pub fn write_all_tasks(
    w: &mut impl io::Write,
    ledger: &Ledger,
    include_done: bool,
) -> io::Result<()> {
    if ledger.is_empty() {
        return writeln!(w, "記録されたタスクはありません");
    }

    let mut rows = Vec::new();
    for task in ledger.tasks() {
        if task.done && !include_done {
            continue;
        }
        let is_current = ledger.current_name() == Some(task.name.as_str());
        let (marker, name, color) = if task.done {
            (" ", format!("(完了) {}", task.name), Some(Color::BrightBlack))
        } else if is_current {
            ("*", task.name.clone(), Some(Color::Green))
        } else {
            (" ", task.name.clone(), None)
        };
        rows.push(Row {
            cells: vec![
                marker.to_string(),
                name,
                format_duration(task.time_spent),
                format_last_updated(task),
            ],
            color,
        });
    }

    let title = if ledger.is_paused() {
        "タスク一覧 [一時停止中]".bold().red()
    } else {
        "タスク一覧".bold().blue()
    };
    writeln!(w, "{}", title)?;
    write_table(w, &["", "タスク", "経過時間", "最終更新"], &rows)
}

/// タスクの日別ログを日付昇順で出力
pub fn write_task_log(w: &mut impl io::Write, ledger: &Ledger, name: &str) -> anyhow::Result<()> {
    let task = ledger
        .task(name)
        .ok_or_else(|| LedgerError::TaskNotFound(name.to_string()))?;

    writeln!(w, "{}", format!("タスクログ: {}", task.name).bold().green())?;
    let rows: Vec<Row> = task
        .log
        .iter()
        .map(|(date, seconds)| Row {
            cells: vec![date.to_string(), format_duration(*seconds)],
            color: None,
        })
        .collect();
    write_table(w, &["日付", "経過時間"], &rows)?;
    Ok(())
}

/// 表の1行
struct Row {
    cells: Vec<String>,
    color: Option<Color>,
}

fn write_table(w: &mut impl io::Write, header: &[&str], rows: &[Row]) -> io::Result<()> {
    let mut widths: Vec<usize> = header.iter().map(|cell| cell.width()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(&row.cells) {
            *width = (*width).max(cell.width());
        }
    }

    let header_cells: Vec<String> = header.iter().map(|cell| cell.to_string()).collect();
    let header_line = pad_cells(&header_cells, &widths);
    writeln!(w, "{}", header_line.bold().magenta())?;

    for row in rows {
        let line = pad_cells(&row.cells, &widths);
        match row.color {
            Some(color) => writeln!(w, "{}", line.color(color))?,
            None => writeln!(w, "{}", line)?,
        }
    }
    Ok(())
}

fn pad_cells(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            // 全角文字を含むため表示幅で埋める
            let padding = width.saturating_sub(cell.width());
            format!("{}{}", cell, " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}
