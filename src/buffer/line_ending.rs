//! 改行コード検出

use serde::Serialize;

/// ファイル単位の改行コード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum LineEnding {
    /// `\n` (Unix)
    #[default]
    Lf,
    /// `\r\n` (Windows)
    Crlf,
}

impl LineEnding {
    /// 最初の `\n` の直前が `\r` かどうかで判定する
    ///
    /// 改行を含まない内容、先頭が `\n` の内容は LF とみなす。
    pub fn detect(content: &str) -> Self {
        match content.find('\n') {
            Some(pos) if pos > 0 && content.as_bytes()[pos - 1] == b'\r' => LineEnding::Crlf,
            _ => LineEnding::Lf,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Crlf => "\r\n",
        }
    }
}
