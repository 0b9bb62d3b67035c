//! タスク台帳モジュール
//!
//! 台帳はタスク一覧と「現在のタスク」を持ち、経過時間を日付ごとのバケットへ
//! 積み上げる。時刻はすべてローカルのナイーブ日時で扱う。

use crate::error::LedgerError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

const SECONDS_PER_DAY: u64 = 86_400;

/// タスク
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    #[serde(default, with = "isoformat")]
    pub last_updated: Option<NaiveDateTime>,
    /// 累計秒数
    pub time_spent: u64,
    /// 日付ごとの秒数
    pub log: BTreeMap<NaiveDate, u64>,
    pub done: bool,
}

impl Task {
    /// 新しいTaskを作成
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            last_updated: None,
            time_spent: 0,
            log: BTreeMap::new(),
            done: false,
        }
    }

    /// last_updatedからnowまでの経過時間を加算し、基準時刻をnowに更新
    fn accrue(&mut self, now: NaiveDateTime, paused: bool) {
        if let (false, Some(last)) = (paused, self.last_updated) {
            let elapsed = (now - last).num_seconds();
            if elapsed > 0 {
                for (day, seconds) in split_by_day(last, now) {
                    *self.log.entry(day).or_insert(0) += seconds;
                }
                self.time_spent += elapsed as u64;
            } else if elapsed < 0 {
                warn!("時計が巻き戻っています: {} -> {}", last, now);
            }
        }
        self.last_updated = Some(now);
    }
}

/// start_taskの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// 指定タスクの計測を開始（createdは新規作成したかどうか）
    Started { name: String, created: bool },
    /// 一時停止中の現在タスクを再開
    Resumed { name: String },
}

/// タスク台帳
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    current_task: Option<String>,
    #[serde(default)]
    paused: bool,
    #[serde(default)]
    tasks: BTreeMap<String, Task>,
}

impl Ledger {
    /// 空の台帳を作成
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Task> {
        self.current_task
            .as_deref()
            .and_then(|name| self.tasks.get(name))
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current_task.as_deref()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    /// 名前順のタスク一覧
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// タスクを作成（既に存在する場合は何もしない）
    ///
    /// 新規作成した場合はtrueを返す
    pub fn create_task(&mut self, name: &str) -> bool {
        if self.tasks.contains_key(name) {
            return false;
        }
        self.tasks.insert(name.to_string(), Task::new(name));
        debug!("タスクを作成しました: {}", name);
        true
    }

    /// 現在のタスクに経過時間を積み上げる
    ///
    /// 一時停止中は加算せず、基準時刻だけをnowに進める
    pub fn accrue(&mut self, now: NaiveDateTime) {
        let Some(name) = self.current_task.as_deref() else {
            return;
        };
        let paused = self.paused;
        match self.tasks.get_mut(name) {
            Some(task) => task.accrue(now, paused),
            None => warn!("現在のタスク '{}' が台帳に存在しません", name),
        }
    }

    /// タスクの計測を開始
    ///
    /// 名前を省略した場合は一時停止中の現在タスクを再開する。
    /// 別のタスクが計測中なら、切り替え前にその経過時間を積み上げる。
    pub fn start_task(
        &mut self,
        name: Option<&str>,
        now: NaiveDateTime,
    ) -> Result<StartOutcome, LedgerError> {
        let Some(name) = name else {
            return self
                .resume_task(now)
                .map(|name| StartOutcome::Resumed { name });
        };

        if self.tasks.get(name).is_some_and(|task| task.done) {
            return Err(LedgerError::TaskDone(name.to_string()));
        }

        self.accrue(now);
        self.paused = false;
        let created = self.create_task(name);
        if let Some(task) = self.tasks.get_mut(name) {
            task.last_updated = Some(now);
        }
        self.current_task = Some(name.to_string());
        debug!("計測開始: {} ({})", name, now);

        Ok(StartOutcome::Started {
            name: name.to_string(),
            created,
        })
    }

    /// 現在のタスクを一時停止
    ///
    /// 経過時間の積み上げは呼び出し側で事前に行うこと
    pub fn pause_task(&mut self) -> Result<String, LedgerError> {
        let name = self.current_task.clone().ok_or(LedgerError::NoCurrentTask)?;
        self.paused = true;
        Ok(name)
    }

    /// 一時停止中の現在タスクを再開
    pub fn resume_task(&mut self, now: NaiveDateTime) -> Result<String, LedgerError> {
        let name = self.current_task.clone().ok_or(LedgerError::NoCurrentTask)?;
        if !self.paused {
            return Err(LedgerError::NotPaused(name));
        }
        // 一時停止中のまま積み上げ、基準時刻のみ更新してから再開する
        self.accrue(now);
        self.paused = false;
        Ok(name)
    }

    /// タスクを削除
    ///
    /// 現在のタスクだった場合はtrueを返し、現在タスクと一時停止状態を解除する
    pub fn remove_task(&mut self, name: &str) -> Result<bool, LedgerError> {
        if self.tasks.remove(name).is_none() {
            return Err(LedgerError::TaskNotFound(name.to_string()));
        }
        Ok(self.detach(name))
    }

    /// タスクを完了にする
    ///
    /// 現在のタスクだった場合はtrueを返し、現在タスクと一時停止状態を解除する
    pub fn done_task(&mut self, name: &str, now: NaiveDateTime) -> Result<bool, LedgerError> {
        if !self.tasks.contains_key(name) {
            return Err(LedgerError::TaskNotFound(name.to_string()));
        }
        self.accrue(now);
        if let Some(task) = self.tasks.get_mut(name) {
            task.done = true;
        }
        Ok(self.detach(name))
    }

    fn detach(&mut self, name: &str) -> bool {
        if self.current_task.as_deref() != Some(name) {
            return false;
        }
        self.current_task = None;
        self.paused = false;
        true
    }
}

/// startからendまでの区間を日付ごとの秒数に分割
///
/// 各日は [その日の0時, 翌日の0時) とし、秒未満は切り捨てる
pub fn split_by_day(start: NaiveDateTime, end: NaiveDateTime) -> Vec<(NaiveDate, u64)> {
    let mut slices = Vec::new();
    if end <= start {
        return slices;
    }

    let first_day = start.date();
    let last_day = end.date();
    let mut day = first_day;

    while day <= last_day {
        let seconds = if day == first_day {
            let day_end = next_midnight(day).min(end);
            (day_end - start).num_seconds().max(0) as u64
        } else if day == last_day {
            (end - day.and_time(NaiveTime::MIN)).num_seconds().max(0) as u64
        } else {
            SECONDS_PER_DAY
        };
        slices.push((day, seconds));

        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }

    slices
}

/// last_updatedのISO-8601表現
///
/// マイクロ秒精度で書き、端数が0なら小数部を省く（例: 2024-01-01T09:00:00.100000）
mod isoformat {
    use chrono::{NaiveDateTime, Timelike};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
    const FORMAT_MICROS: &str = "%Y-%m-%dT%H:%M:%S%.6f";

    pub fn format(ts: &NaiveDateTime) -> String {
        if ts.nanosecond() / 1_000 == 0 {
            ts.format(FORMAT).to_string()
        } else {
            ts.format(FORMAT_MICROS).to_string()
        }
    }

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&format(ts)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f"))
            .transpose()
            .map_err(de::Error::custom)
    }
}

/// 現在時刻（マイクロ秒未満は切り捨て）
pub fn now() -> NaiveDateTime {
    let now = chrono::Local::now().naive_local();
    now.with_nanosecond(now.nanosecond() / 1_000 * 1_000)
        .unwrap_or(now)
}

fn next_midnight(day: NaiveDate) -> NaiveDateTime {
    day.succ_opt()
        .map(|next| next.and_time(NaiveTime::MIN))
        .unwrap_or(NaiveDateTime::MAX)
}
