//! マッチインデックス
//!
//! 開始パターンに一致する行を行番号順に列挙する。インデックスは常に現在の
//! 内容から作り直し、差分更新はしない。

use regex::Regex;
use serde::Serialize;
use std::path::PathBuf;

/// 1件のマッチ（インデックス作成時点の行番号と行テキスト）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineMatch {
    /// 0始まりの行番号
    pub line: usize,
    /// 編集前の行テキスト
    pub text: String,
}

/// 1ファイル分のマッチ一覧
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMatches {
    /// コーパスルートからの相対パス
    pub path: PathBuf,
    pub matches: Vec<LineMatch>,
}

impl FileMatches {
    pub fn new(path: impl Into<PathBuf>, matches: Vec<LineMatch>) -> Self {
        Self {
            path: path.into(),
            matches,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn first(&self) -> Option<&LineMatch> {
        self.matches.first()
    }

    /// 行番号が `line` のマッチの一覧内位置
    pub fn position_of(&self, line: usize) -> Option<usize> {
        self.matches.iter().position(|m| m.line == line)
    }
}

/// `begin_pattern` に一致する行を昇順で返す
pub fn build_match_index<S: AsRef<str>>(lines: &[S], begin_pattern: &Regex) -> Vec<LineMatch> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| begin_pattern.is_match(line.as_ref()))
        .map(|(index, line)| LineMatch {
            line: index,
            text: line.as_ref().to_string(),
        })
        .collect()
}

/// 行番号が `from` 以上の最初のマッチの一覧内位置（`from` と同じ行も含む）
pub fn find_resumption(matches: &[LineMatch], from: usize) -> Option<usize> {
    matches.iter().position(|m| m.line >= from)
}
