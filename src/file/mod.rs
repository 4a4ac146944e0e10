//! ファイル操作モジュール
//!
//! - 上書き保存のみ（バックアップ・アトミック保存なし）
//! - UTF-8テキストのみ対応
//! - 外部変更検出なし

pub mod corpus;
pub mod io;

pub use corpus::{discover, split_globs};
pub use io::{read_file, write_executable, write_file};
