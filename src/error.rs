//! エラーハンドリングシステム
//!
//! blocksweep 全体で使用される統一されたエラー型とユーティリティを定義
//! ストレージ障害は呼び出し元へ伝播し、外部コマンドの失敗はデータとして扱う

use thiserror::Error;

/// アプリケーション全体のエラー型
#[derive(Error, Debug, Clone)]
pub enum SweepError {
    /// ファイル操作エラー
    #[error("File operation failed: {0}")]
    File(#[from] FileError),

    /// 正規表現・グロブのエラー
    #[error("Pattern error: {0}")]
    Pattern(#[from] PatternError),

    /// セッション操作エラー
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// 設定エラー
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// アプリケーション論理エラー
    #[error("Application error: {0}")]
    Application(String),
}

/// ファイル操作固有のエラー
#[derive(Error, Debug, Clone)]
pub enum FileError {
    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("Invalid path: {path}")]
    InvalidPath { path: String },

    #[error("Encoding error in {path}: {message}")]
    Encoding { path: String, message: String },

    #[error("IO error: {message}")]
    Io { message: String },
}

/// パターン（正規表現・グロブ）のエラー
#[derive(Error, Debug, Clone)]
pub enum PatternError {
    #[error("Invalid regex '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },

    #[error("Invalid glob '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },
}

/// セッション操作固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("No search has been started")]
    NoSearch,

    #[error("No block is selected")]
    NoSelection,

    #[error("No transform output to commit")]
    NoOutput,

    #[error("Line {line} is out of range for {path} ({len} lines)")]
    LineOutOfRange { path: String, line: usize, len: usize },
}

/// 設定固有のエラー
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Invalid configuration file {path}: {message}")]
    InvalidFile { path: String, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// パニックハンドラの設定
pub fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s
        } else {
            "Unknown panic payload"
        };

        log::error!("PANIC at {}: {}", location, message);
        eprintln!("PANIC at {}: {}", location, message);
        eprintln!("Stack trace: {}", std::backtrace::Backtrace::capture());

        std::process::exit(1);
    }));
}

/// プロジェクト標準のResult型
pub type Result<T> = std::result::Result<T, SweepError>;

// std::io::Error から SweepError への変換
impl From<std::io::Error> for SweepError {
    fn from(error: std::io::Error) -> Self {
        SweepError::File(FileError::Io {
            message: error.to_string(),
        })
    }
}

impl PatternError {
    /// 正規表現のコンパイルエラーを変換
    pub fn from_regex(pattern: &str, error: &regex::Error) -> Self {
        PatternError::InvalidRegex {
            pattern: pattern.to_string(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts_to_file_error() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let error: SweepError = io.into();

        match error {
            SweepError::File(FileError::Io { message }) => {
                assert!(message.contains("disk on fire"));
            }
            other => panic!("Expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn regex_error_keeps_pattern_text() {
        let err = regex::Regex::new("(unclosed").unwrap_err();
        let pattern = PatternError::from_regex("(unclosed", &err);
        let message = SweepError::from(pattern).to_string();
        assert!(message.contains("(unclosed"));
    }

    #[test]
    fn session_error_message_names_file() {
        let error = SessionError::LineOutOfRange {
            path: "a.txt".to_string(),
            line: 9,
            len: 3,
        };
        assert_eq!(error.to_string(), "Line 9 is out of range for a.txt (3 lines)");
    }
}
