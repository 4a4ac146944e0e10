//! 設定
//!
//! JSON 設定ファイル（任意）とコマンドライン指定をマージして使う

use crate::error::{ConfigError, Result, SweepError};
use crate::file::io;
use crate::search::DEFAULT_WINDOW;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// ステージングファイルの既定名
pub const DEFAULT_INPUT_NAME: &str = "tmp_input.txt";
pub const DEFAULT_OUTPUT_NAME: &str = "tmp_output.txt";
pub const DEFAULT_SCRIPT_NAME: &str = "tmp_script.sh";

/// 実行時設定
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    /// ステージングファイルを置くディレクトリ（未指定時はキャッシュディレクトリ）
    pub staging_dir: Option<PathBuf>,
    /// 終了パターン未指定時の先読み行数
    pub window: usize,
    pub input_name: String,
    pub output_name: String,
    pub script_name: String,
    /// イベントログ（JSON Lines）の出力先
    pub event_log: Option<PathBuf>,
    /// ログレベル（`RUST_LOG` が優先）
    pub log_level: Option<String>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            staging_dir: None,
            window: DEFAULT_WINDOW,
            input_name: DEFAULT_INPUT_NAME.to_string(),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            script_name: DEFAULT_SCRIPT_NAME.to_string(),
            event_log: None,
            log_level: None,
        }
    }
}

/// コマンドラインからの上書き指定
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub staging_dir: Option<PathBuf>,
    pub window: Option<usize>,
    pub event_log: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl SweepConfig {
    /// JSON 設定ファイルを読み込み
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = io::read_file(path)?;
        let config: SweepConfig = serde_json::from_str(&content).map_err(|e| {
            SweepError::Config(ConfigError::InvalidFile {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 指定パス、なければ既定パスの設定ファイルを読む。どちらもなければ既定値
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn merged_with(&self, overrides: &ConfigOverrides) -> Result<SweepConfig> {
        let merged = SweepConfig {
            staging_dir: overrides
                .staging_dir
                .clone()
                .or_else(|| self.staging_dir.clone()),
            window: overrides.window.unwrap_or(self.window),
            input_name: self.input_name.clone(),
            output_name: self.output_name.clone(),
            script_name: self.script_name.clone(),
            event_log: overrides
                .event_log
                .clone()
                .or_else(|| self.event_log.clone()),
            log_level: overrides
                .log_level
                .clone()
                .or_else(|| self.log_level.clone()),
        };
        merged.validate()?;
        Ok(merged)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(invalid_value("window", "0"));
        }
        for (key, name) in [
            ("input_name", &self.input_name),
            ("output_name", &self.output_name),
            ("script_name", &self.script_name),
        ] {
            if name.is_empty() || name.contains('/') || name.contains('\\') {
                return Err(invalid_value(key, name));
            }
        }
        if self.input_name == self.output_name
            || self.input_name == self.script_name
            || self.output_name == self.script_name
        {
            return Err(invalid_value("staging names", "duplicate file name"));
        }
        Ok(())
    }

    /// ステージングディレクトリ（`~` 展開済み）
    pub fn resolve_staging_dir(&self) -> PathBuf {
        match &self.staging_dir {
            Some(path) => expand_path(path),
            None => default_staging_dir(),
        }
    }

    pub fn resolve_event_log(&self) -> Option<PathBuf> {
        self.event_log.as_deref().map(expand_path)
    }
}

/// `~` と環境変数を展開
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match shellexpand::full(&raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(err) => {
            log::warn!("could not expand {}: {}", raw, err);
            path.to_path_buf()
        }
    }
}

fn default_staging_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("blocksweep")
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("blocksweep").join("config.json"))
}

fn invalid_value(key: &str, value: &str) -> SweepError {
    SweepError::Config(ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn loads_partial_json_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "window": 4, "staging_dir": "/tmp/stage" }"#).unwrap();

        let config = SweepConfig::load(&path).unwrap();
        assert_eq!(config.window, 4);
        assert_eq!(config.staging_dir, Some(PathBuf::from("/tmp/stage")));
        assert_eq!(config.output_name, DEFAULT_OUTPUT_NAME);
    }

    #[test]
    fn rejects_unknown_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "windw": 4 }"#).unwrap();

        assert!(matches!(
            SweepConfig::load(&path),
            Err(SweepError::Config(ConfigError::InvalidFile { .. }))
        ));
    }

    #[test]
    fn overrides_take_precedence() {
        let base = SweepConfig {
            window: 3,
            event_log: Some(PathBuf::from("base.log")),
            ..SweepConfig::default()
        };
        let overrides = ConfigOverrides {
            window: Some(7),
            staging_dir: Some(PathBuf::from("/tmp/other")),
            ..ConfigOverrides::default()
        };

        let merged = base.merged_with(&overrides).unwrap();
        assert_eq!(merged.window, 7);
        assert_eq!(merged.event_log, Some(PathBuf::from("base.log")));
        assert_eq!(merged.resolve_staging_dir(), PathBuf::from("/tmp/other"));
    }

    #[test]
    fn zero_window_is_invalid() {
        let overrides = ConfigOverrides {
            window: Some(0),
            ..ConfigOverrides::default()
        };
        assert!(SweepConfig::default().merged_with(&overrides).is_err());
    }

    #[test]
    fn staging_names_must_be_distinct_file_names() {
        let config = SweepConfig {
            output_name: DEFAULT_INPUT_NAME.to_string(),
            ..SweepConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SweepConfig {
            script_name: "sub/run.sh".to_string(),
            ..SweepConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
