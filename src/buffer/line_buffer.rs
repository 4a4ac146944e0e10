//! 行単位のファイルバッファ

use super::line_ending::LineEnding;
use crate::error::Result;
use crate::file::io;
use std::path::Path;

/// 改行コードを取り除いた行の列と、検出済みの改行コード
///
/// `split` と `join` は同じ改行コードで行うため、`to_text` は読み込んだ内容を
/// バイト単位で再現する（末尾の改行は空の最終行として残る）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBuffer {
    lines: Vec<String>,
    eol: LineEnding,
}

impl LineBuffer {
    /// テキストから改行コードを検出して構築
    pub fn from_text(content: &str) -> Self {
        let eol = LineEnding::detect(content);
        Self::with_line_ending(content, eol)
    }

    /// 指定した改行コードで分割して構築
    pub fn with_line_ending(content: &str, eol: LineEnding) -> Self {
        let lines = content.split(eol.as_str()).map(str::to_string).collect();
        Self { lines, eol }
    }

    /// 行の列から構築
    pub fn from_lines<I, S>(lines: I, eol: LineEnding) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            eol,
        }
    }

    /// ファイルから読み込み
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = io::read_file(path)?;
        Ok(Self::from_text(&content))
    }

    /// ファイル全体を上書き保存
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        io::write_file(path, &self.to_text())
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_ending(&self) -> LineEnding {
        self.eol
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// 全体を検出済みの改行コードで連結
    pub fn to_text(&self) -> String {
        self.lines.join(self.eol.as_str())
    }

    /// `[begin, end)` を連結したテキスト（範囲はバッファ長に丸める）
    pub fn block_text(&self, begin: usize, end: usize) -> String {
        let end = end.min(self.lines.len());
        let begin = begin.min(end);
        self.lines[begin..end].join(self.eol.as_str())
    }

    /// `[begin, end)` を `replacement` で置き換える
    ///
    /// 範囲はバッファ長に丸める。置換後の内容の終端位置（次の検索開始位置）を返す。
    pub fn splice(&mut self, begin: usize, end: usize, replacement: Vec<String>) -> usize {
        let end = end.min(self.lines.len());
        let begin = begin.min(end);
        let next = begin + replacement.len();
        self.lines.splice(begin..end, replacement);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trips_crlf_content() {
        let raw = "one\r\ntwo\r\n";
        let buffer = LineBuffer::from_text(raw);
        assert_eq!(buffer.line_ending(), LineEnding::Crlf);
        assert_eq!(buffer.lines(), ["one", "two", ""]);
        assert_eq!(buffer.to_text(), raw);
    }

    #[test]
    fn lone_cr_stays_in_line_for_lf_files() {
        let buffer = LineBuffer::from_text("a\nb\r\nc");
        assert_eq!(buffer.lines(), ["a", "b\r", "c"]);
    }

    #[test]
    fn block_text_joins_with_eol() {
        let buffer = LineBuffer::from_text("a\r\nb\r\nc\r\nd");
        assert_eq!(buffer.block_text(1, 3), "b\r\nc");
        assert_eq!(buffer.block_text(2, 2), "");
        assert_eq!(buffer.block_text(3, 99), "d");
    }

    #[test]
    fn splice_replaces_range_and_returns_next_position() {
        let mut buffer = LineBuffer::from_lines(
            ["a", "MATCH1", "x", "y", "END", "MATCH2", "z"],
            LineEnding::Lf,
        );
        let next = buffer.splice(1, 5, vec!["MATCH1".into(), "x".into()]);
        assert_eq!(next, 3);
        assert_eq!(buffer.lines(), ["a", "MATCH1", "x", "MATCH2", "z"]);
    }

    #[test]
    fn splice_with_empty_range_inserts() {
        let mut buffer = LineBuffer::from_lines(["a", "b"], LineEnding::Lf);
        let next = buffer.splice(1, 1, vec!["new".into()]);
        assert_eq!(next, 2);
        assert_eq!(buffer.lines(), ["a", "new", "b"]);
    }

    #[test]
    fn save_and_load_preserve_line_ending() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("file.txt");
        let buffer = LineBuffer::from_lines(["x", "y", ""], LineEnding::Crlf);
        buffer.save(&path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x\r\ny\r\n");
        assert_eq!(LineBuffer::load(&path).unwrap(), buffer);
    }
}
