//! 台帳ファイル管理モジュール
//!
//! 台帳は `.took/took.json` に整形済みJSONで保存する。読み込み・変更・書き戻しの
//! 間にロックは取らないため、同じ台帳を同時に更新するプロセスは1つだけとする。

use crate::error::StoreError;
use crate::ledger::Ledger;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 台帳ディレクトリ名
pub const LEDGER_DIR: &str = ".took";
/// 台帳ファイル名
pub const LEDGER_FILE: &str = "took.json";

/// 解決済みの台帳の所在
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerLocation {
    pub dir: PathBuf,
    /// グローバル台帳へフォールバックしたかどうか
    pub global: bool,
    /// 今回の解決でグローバル台帳を新規作成したかどうか
    pub created: bool,
}

impl LedgerLocation {
    /// 台帳ファイルのパス
    pub fn file(&self) -> PathBuf {
        self.dir.join(LEDGER_FILE)
    }
}

/// startから祖先方向へ台帳ディレクトリを探す
pub fn find_local(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(LEDGER_DIR))
        .find(|candidate| candidate.is_dir())
}

/// 台帳の所在を解決
///
/// 祖先ディレクトリに見つからなければグローバル台帳を使い、必要なら作成する
pub fn resolve(cwd: &Path, global_dir: &Path) -> Result<LedgerLocation, StoreError> {
    if let Some(dir) = find_local(cwd) {
        debug!("台帳を発見しました: {}", dir.display());
        return Ok(LedgerLocation {
            dir,
            global: false,
            created: false,
        });
    }

    let created = !global_dir.exists();
    if created {
        fs::create_dir_all(global_dir).map_err(StoreError::DirectoryCreationError)?;
        save(&global_dir.join(LEDGER_FILE), &Ledger::new())?;
        info!("グローバル台帳を作成しました: {}", global_dir.display());
    }

    Ok(LedgerLocation {
        dir: global_dir.to_path_buf(),
        global: true,
        created,
    })
}

/// カレントディレクトリに空の台帳を作成
///
/// 既に台帳ディレクトリがある場合は何もせずfalseを返す
pub fn init_local(cwd: &Path) -> Result<bool, StoreError> {
    let dir = cwd.join(LEDGER_DIR);
    if dir.exists() {
        return Ok(false);
    }

    fs::create_dir_all(&dir).map_err(StoreError::DirectoryCreationError)?;
    save(&dir.join(LEDGER_FILE), &Ledger::new())?;
    info!("台帳を作成しました: {}", dir.display());
    Ok(true)
}

/// 台帳を読み込む（ファイルがなければ空の台帳）
pub fn load(path: &Path) -> Result<Ledger, StoreError> {
    let raw = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Ledger::new()),
        Err(err) => return Err(StoreError::IoError(err)),
    };

    serde_json::from_str(&raw).map_err(StoreError::DecodeError)
}

/// 台帳を書き込む
///
/// 一時ファイルに書いてから置き換える
pub fn save(path: &Path, ledger: &Ledger) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(StoreError::DirectoryCreationError)?;
        }
    }

    let json = serde_json::to_string_pretty(ledger).map_err(StoreError::EncodeError)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    debug!("台帳を保存しました: {}", path.display());
    Ok(())
}
