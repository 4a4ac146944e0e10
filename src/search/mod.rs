//! 検索モジュール
//!
//! 開始パターンのマッチインデックスとブロック終端の決定

pub mod boundary;
pub mod index;
pub mod pattern;

pub use boundary::{resolve_end, resolve_end_with, EndBoundary, DEFAULT_WINDOW};
pub use index::{build_match_index, find_resumption, FileMatches, LineMatch};
