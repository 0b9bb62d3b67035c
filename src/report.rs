//! レポートモジュール

use crate::ledger::Ledger;
use crate::view::format_duration;
use chrono::{Days, NaiveDate};
use colored::Colorize;
use std::collections::BTreeMap;
use std::io;

/// 1日分のタスク別集計
#[derive(Debug, PartialEq, Eq)]
pub struct DayReport {
    pub date: NaiveDate,
    /// タスク名と秒数（名前順）
    pub entries: Vec<(String, u64)>,
}

impl DayReport {
    /// その日の合計秒数
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, seconds)| seconds).sum()
    }
}

/// レポート生成
pub struct Report<'a> {
    ledger: &'a Ledger,
    bar_width: usize,
}

impl<'a> Report<'a> {
    /// 新しいReportを作成
    pub fn new(ledger: &'a Ledger, bar_width: usize) -> Self {
        Self { ledger, bar_width }
    }

    /// today を含む直近 n 日分の集計（日付昇順）
    pub fn days(&self, today: NaiveDate, n: u32) -> Vec<DayReport> {
        let dates = previous_days(today, n);
        let mut totals: BTreeMap<NaiveDate, BTreeMap<&str, u64>> =
            dates.iter().map(|date| (*date, BTreeMap::new())).collect();

        for task in self.ledger.tasks() {
            for (date, seconds) in &task.log {
                if let Some(per_task) = totals.get_mut(date) {
                    *per_task.entry(task.name.as_str()).or_insert(0) += seconds;
                }
            }
        }

        totals
            .into_iter()
            .map(|(date, per_task)| DayReport {
                date,
                entries: per_task
                    .into_iter()
                    .map(|(name, seconds)| (name.to_string(), seconds))
                    .collect(),
            })
            .collect()
    }

    /// レポートを出力
    pub fn write(&self, w: &mut impl io::Write, today: NaiveDate, n: u32) -> io::Result<()> {
        writeln!(w, "{}", format!("レポート（直近{}日）", n).bold().blue())?;

        for day in self.days(today, n) {
            writeln!(w, "{}", day.date.to_string().bold().yellow())?;
            let total = day.total();
            for (name, seconds) in &day.entries {
                let bar = "█".repeat(bar_length(*seconds, total, self.bar_width));
                writeln!(w, "{}: {} {}", name, bar.green(), format_duration(*seconds))?;
            }
            writeln!(w)?;
        }

        Ok(())
    }
}

/// today を含む直近 n 日（古い順）
pub fn previous_days(today: NaiveDate, n: u32) -> Vec<NaiveDate> {
    (0..n)
        .rev()
        .filter_map(|offset| today.checked_sub_days(Days::new(u64::from(offset))))
        .collect()
}

/// その日の合計に対する割合で棒の長さを求める（端数切り捨て）
pub fn bar_length(seconds: u64, day_total: u64, width: usize) -> usize {
    if day_total == 0 {
        return 0;
    }
    (u128::from(seconds) * width as u128 / u128::from(day_total)) as usize
}
