//! Gitフック導入モジュール

use crate::error::HookError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// 導入するフック（名前とスクリプト本体）
const HOOKS: [(&str, &str); 4] = [
    ("pre-commit", include_str!("../resources/hooks/pre-commit.sh")),
    ("post-commit", include_str!("../resources/hooks/post-commit.sh")),
    ("post-checkout", include_str!("../resources/hooks/post-checkout.sh")),
    ("post-merge", include_str!("../resources/hooks/post-merge.sh")),
];

/// フックファイルのパーミッション
#[cfg(unix)]
const HOOK_MODE: u32 = 0o775;

/// Gitフックの導入
pub struct GitHooks {
    hooks_dir: PathBuf,
}

impl GitHooks {
    /// リポジトリルートからGitHooksを作成
    pub fn new(repo_root: &Path) -> Self {
        Self {
            hooks_dir: repo_root.join(".git").join("hooks"),
        }
    }

    /// フックディレクトリが存在するかどうか
    pub fn is_available(&self) -> bool {
        self.hooks_dir.is_dir()
    }

    /// フックを書き込み、書き込んだパスを返す
    ///
    /// フックディレクトリがない場合は何もしない
    pub fn install(&self) -> Result<Vec<PathBuf>, HookError> {
        if !self.is_available() {
            return Ok(Vec::new());
        }

        let mut installed = Vec::with_capacity(HOOKS.len());
        for (name, script) in HOOKS {
            let path = self.hooks_dir.join(name);
            fs::write(&path, script)?;
            set_executable(&path)?;
            info!("フックを導入しました: {}", path.display());
            installed.push(path);
        }

        Ok(installed)
    }
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<(), HookError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(HOOK_MODE))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<(), HookError> {
    Ok(())
}
