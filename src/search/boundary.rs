//! ブロック終端の決定
//!
//! 終了パターンがあれば開始行の次の行から前方に探索し、一致行を含めた位置を
//! 終端とする。見つからない場合は開始位置をそのまま返す（空ブロック）。

use super::pattern;
use crate::error::Result;
use regex::Regex;

/// 終了パターン未指定時の固定先読み行数
pub const DEFAULT_WINDOW: usize = 10;

/// ブロック終端の決め方
#[derive(Debug, Clone)]
pub enum EndBoundary {
    /// 開始行から固定行数
    Window(usize),
    /// 開始行より後で最初に一致した行まで（一致行を含む）
    Pattern(Regex),
}

impl EndBoundary {
    /// 終了パターン文字列から構築（空文字列なら固定行数）
    pub fn parse(end_pattern: &str, window: usize) -> Result<Self> {
        Ok(match pattern::compile_optional(end_pattern)? {
            Some(regex) => EndBoundary::Pattern(regex),
            None => EndBoundary::Window(window),
        })
    }
}

/// `[begin, end)` の `end` を返す
///
/// 戻り値が `begin` と等しい場合は「終端が見つからなかった」ことを表す。
pub fn resolve_end<S: AsRef<str>>(lines: &[S], begin: usize, boundary: &EndBoundary) -> usize {
    match boundary {
        EndBoundary::Window(window) => begin.saturating_add(*window).min(lines.len()),
        EndBoundary::Pattern(regex) => lines
            .iter()
            .enumerate()
            .skip(begin + 1)
            .find(|(_, line)| regex.is_match(line.as_ref()))
            .map(|(index, _)| index + 1)
            .unwrap_or(begin),
    }
}

/// 終了パターン文字列を直接受け取る版（既定の先読み行数を使う）
pub fn resolve_end_with<S: AsRef<str>>(lines: &[S], begin: usize, end_pattern: &str) -> Result<usize> {
    let boundary = EndBoundary::parse(end_pattern, DEFAULT_WINDOW)?;
    Ok(resolve_end(lines, begin, &boundary))
}
