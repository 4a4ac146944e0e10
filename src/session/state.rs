//! セッションの状態と結果型

use crate::buffer::LineBuffer;
use crate::search::{EndBoundary, LineMatch};
use crate::transform::TransformOutcome;
use serde::Serialize;
use std::path::PathBuf;

/// セッションの段階
///
/// `Committed` の後は再選択できれば `Selected`（スクリプトがあれば `Applied`）、
/// できなければ `FileExhausted` へ遷移する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// 検索前、または検索直後で未選択
    Idle,
    Selected,
    Applied,
    Committed,
    FileExhausted,
}

/// 現在の選択ブロック
#[derive(Debug, Clone)]
pub struct Selection {
    /// コーパスルートからの相対パス
    pub path: PathBuf,
    pub(crate) buffer: LineBuffer,
    pub begin: usize,
    pub end: usize,
    pub(crate) boundary: EndBoundary,
}

impl Selection {
    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    pub fn boundary(&self) -> &EndBoundary {
        &self.boundary
    }

    /// 終端が見つからなかった空ブロックか
    pub fn is_degenerate(&self) -> bool {
        self.begin == self.end
    }

    pub fn block_text(&self) -> String {
        if self.is_degenerate() {
            String::new()
        } else {
            self.buffer.block_text(self.begin, self.end)
        }
    }
}

/// コミット後の継続
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Continuation {
    /// 再開位置のマッチを選択し直し、同じスクリプトを再適用した
    Resumed {
        before: String,
        after: Option<TransformOutcome>,
    },
    /// 再開位置以降にマッチがない
    FileExhausted,
}

/// コミット結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReport {
    pub path: PathBuf,
    /// 新しい内容の終端（再開位置の基準）
    pub next_pos: usize,
    /// コミット後に作り直したマッチ一覧
    pub matches: Vec<LineMatch>,
    /// `matches` 内の再開マッチの位置
    pub resumption: Option<usize>,
    /// 空ブロックを空の出力で置き換えた場合は `false`（同じマッチに戻る）
    pub progress: bool,
    pub continuation: Continuation,
}

impl CommitReport {
    pub fn is_exhausted(&self) -> bool {
        matches!(self.continuation, Continuation::FileExhausted)
    }
}
