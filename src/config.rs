//! 設定モジュール

use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// アプリケーション設定
#[derive(Debug, Clone)]
pub struct Config {
    /// 祖先ディレクトリに台帳がない場合に使うグローバル台帳ディレクトリ
    pub global_dir: PathBuf,
    /// reportの対象日数（デフォルト）
    pub report_days: u32,
    /// reportの棒グラフの最大長
    pub bar_width: usize,
}


/// TOML設定ファイル用構造体
#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    global_dir: Option<String>,
    report_days: Option<u32>,
    bar_width: Option<usize>,
}

/// CLI引数
#[derive(Debug, Default)]
pub struct CliArgs {
    pub days: Option<u32>,
}

impl Config {
    /// ホームディレクトリを基準にしたデフォルト設定
    pub fn new(home: &Path) -> Self {
        Self {
            global_dir: home.join(crate::store::LEDGER_DIR),
            report_days: 1,
            bar_width: 30,
        }
    }

    /// 設定を読み込む
    ///
    /// 優先順位: CLI引数 > 設定ファイル > デフォルト値
    pub fn load(cli_args: &CliArgs) -> Result<Self, ConfigError> {
        Self::load_with_home(dirs::home_dir(), cli_args)
    }

    /// ホームディレクトリを指定して設定を読み込む
    ///
    /// ホームディレクトリが不明な場合はエラー
    fn load_with_home(home: Option<PathBuf>, cli_args: &CliArgs) -> Result<Self, ConfigError> {
        let home = home.ok_or(ConfigError::HomeNotFound)?;
        let mut config = Config::new(&home);

        let config_path = config_file_path(&home);
        if config_path.exists() {
            let content = fs::read_to_string(&config_path)?;
            let file_config: FileConfig = toml::from_str(&content)?;
            config.merge_file_config(&file_config);
        }

        config.merge_cli_args(cli_args);
        config.validate()?;

        Ok(config)
    }

    /// ファイル設定をマージ
    fn merge_file_config(&mut self, file_config: &FileConfig) {
        if let Some(ref path) = file_config.global_dir {
            self.global_dir = PathBuf::from(path);
        }
        if let Some(days) = file_config.report_days {
            self.report_days = days;
        }
        if let Some(width) = file_config.bar_width {
            self.bar_width = width;
        }
    }

    /// CLI引数をマージ
    fn merge_cli_args(&mut self, cli_args: &CliArgs) {
        if let Some(days) = cli_args.days {
            self.report_days = days;
        }
    }

    /// 設定値をバリデート
    fn validate(&self) -> Result<(), ConfigError> {
        if self.report_days == 0 {
            return Err(ConfigError::InvalidValue(
                "report_days must be greater than 0".to_string(),
            ));
        }
        if self.bar_width == 0 {
            return Err(ConfigError::InvalidValue(
                "bar_width must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// 設定ファイルのパスを取得
fn config_file_path(home: &Path) -> PathBuf {
    home.join(crate::store::LEDGER_DIR).join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config() -> Config {
        Config::new(Path::new("/home/test"))
    }

    #[test]
    fn test_default_config() {
        let config = test_config();
        assert_eq!(config.report_days, 1);
        assert_eq!(config.bar_width, 30);
        assert_eq!(config.global_dir, PathBuf::from("/home/test/.took"));
    }

    #[test]
    fn test_cli_args_override() {
        let mut config = test_config();
        config.merge_cli_args(&CliArgs { days: Some(7) });
        assert_eq!(config.report_days, 7);
    }

    #[test]
    fn test_file_config_merge() {
        let mut config = test_config();
        let file_config: FileConfig = toml::from_str(
            r#"
            global_dir = "/tmp/took-global"
            report_days = 14
            bar_width = 40
            "#,
        )
        .unwrap();
        config.merge_file_config(&file_config);
        assert_eq!(config.global_dir, PathBuf::from("/tmp/took-global"));
        assert_eq!(config.report_days, 14);
        assert_eq!(config.bar_width, 40);
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut config = test_config();
        let file_config = FileConfig {
            report_days: Some(14),
            bar_width: Some(40),
            ..Default::default()
        };
        config.merge_file_config(&file_config);
        config.merge_cli_args(&CliArgs { days: Some(3) });

        // CLIが優先
        assert_eq!(config.report_days, 3);
        // ファイル設定が維持
        assert_eq!(config.bar_width, 40);
    }

    #[test]
    fn test_validate_report_days_zero() {
        let mut config = test_config();
        config.report_days = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bar_width_zero() {
        let mut config = test_config();
        config.bar_width = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_without_home_dir() {
        let result = Config::load_with_home(None, &CliArgs::default());
        assert!(matches!(result, Err(ConfigError::HomeNotFound)));
    }

    #[test]
    fn test_load_without_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let config =
            Config::load_with_home(Some(temp_dir.path().to_path_buf()), &CliArgs::default())
                .unwrap();
        assert_eq!(config.global_dir, temp_dir.path().join(".took"));
        assert_eq!(config.report_days, 1);
    }

    #[test]
    fn test_load_reads_config_file_from_home() {
        let temp_dir = TempDir::new().unwrap();
        let took_dir = temp_dir.path().join(".took");
        fs::create_dir_all(&took_dir).unwrap();
        fs::write(took_dir.join("config.toml"), "report_days = 7\nbar_width = 20\n").unwrap();

        let config = Config::load_with_home(
            Some(temp_dir.path().to_path_buf()),
            &CliArgs { days: Some(2) },
        )
        .unwrap();
        assert_eq!(config.report_days, 2);
        assert_eq!(config.bar_width, 20);
    }

    #[test]
    fn test_invalid_file_value_is_rejected() {
        let result: Result<FileConfig, _> = toml::from_str("report_days = \"seven\"");
        assert!(result.is_err());
    }
}
