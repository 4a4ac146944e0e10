//! ロギングシステム
//!
//! `log` ファサードの初期化と、セッションイベントの JSON Lines 出力

use crate::error::{Result, SweepError};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// `-v` の回数からログレベルを決める（設定値があればそれが基準）
pub fn level_filter(configured: Option<&str>, verbosity: u8) -> String {
    match verbosity {
        0 => configured.unwrap_or("warn").to_string(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// `env_logger` を初期化（`RUST_LOG` が指定されていればそちらを優先）
pub fn init(configured: Option<&str>, verbosity: u8) {
    let filter = level_filter(configured, verbosity);
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp_millis()
        .try_init();
}

/// イベントを JSON Lines 形式で追記するロガー
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Self { path })
    }

    pub fn record<T: Serialize>(&self, tag: &str, payload: &T) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let record = serde_json::json!({
            "tag": tag,
            "ts": timestamp_ms(),
            "payload": payload
        });
        let line = serde_json::to_string(&record)
            .map_err(|e| SweepError::Application(format!("イベントのシリアライズに失敗しました: {e}")))?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn timestamp_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|dur| dur.as_millis())
        .unwrap_or_default()
}
