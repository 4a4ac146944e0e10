//! blocksweep - 正規表現で区切ったブロックを外部スクリプトで一括変換する
//!
//! 選択・変換・コミット・再開を行うセッションと、その周辺モジュール

// コアモジュール
pub mod error;
pub mod logging;
pub mod config;

// データ層
pub mod buffer;
pub mod file;

// ロジック層
pub mod search;
pub mod session;
pub mod transform;
pub mod controller;

// 表示層
pub mod app;
pub mod render;

// 公開API
pub use buffer::{LineBuffer, LineEnding};
pub use controller::{Controller, Event, Request};
pub use error::{Result, SweepError};
pub use search::{FileMatches, LineMatch};
pub use session::{CommitReport, Continuation, Session};
pub use transform::{ShellTransformer, TransformOutcome, Transformer};
