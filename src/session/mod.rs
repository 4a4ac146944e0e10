//! ブロックセッション
//!
//! 選択・変換適用・コミット・再開を行う単一のセッション状態。
//! コミットはバッファを書き換えて保存し、マッチ一覧を現在の内容から作り直してから
//! 新しい内容の直後以降で最初のマッチを再選択する。

pub mod state;

pub use state::{CommitReport, Continuation, Phase, Selection};

use crate::buffer::{LineBuffer, LineEnding};
use crate::error::{FileError, Result, SessionError, SweepError};
use crate::file::{corpus, io};
use crate::search::{
    build_match_index, find_resumption, pattern, resolve_end, EndBoundary, FileMatches,
    DEFAULT_WINDOW,
};
use crate::transform::{TransformOutcome, Transformer};
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// 検索開始時に固定される情報
#[derive(Debug, Clone)]
struct SearchContext {
    root: PathBuf,
    begin_pattern: Regex,
}

/// 単一のアクティブなセッション
pub struct Session<T: Transformer> {
    transformer: T,
    window: usize,
    search: Option<SearchContext>,
    selection: Option<Selection>,
    /// 直近の選択で使った終了パターン
    end_pattern: String,
    /// 直近に適用したスクリプト（コミット後の自動再適用に使う）
    script: Option<String>,
    /// 現在の選択に対する直近の変換結果
    last_outcome: Option<TransformOutcome>,
    /// ファイルごとに最初に検出した改行コード
    line_endings: HashMap<PathBuf, LineEnding>,
    phase: Phase,
}

impl<T: Transformer> Session<T> {
    pub fn new(transformer: T) -> Self {
        Self::with_window(transformer, DEFAULT_WINDOW)
    }

    pub fn with_window(transformer: T, window: usize) -> Self {
        Self {
            transformer,
            window,
            search: None,
            selection: None,
            end_pattern: String::new(),
            script: None,
            last_outcome: None,
            line_endings: HashMap::new(),
            phase: Phase::Idle,
        }
    }

    /// 新しい検索を開始（既存の状態はすべて破棄）
    ///
    /// 開始パターンが不正な場合は状態を変更しない。
    pub fn start_search<P: Into<PathBuf>>(&mut self, root: P, begin_pattern: &str) -> Result<()> {
        let begin_pattern = pattern::compile(begin_pattern)?;
        self.search = Some(SearchContext {
            root: root.into(),
            begin_pattern,
        });
        self.selection = None;
        self.end_pattern.clear();
        self.script = None;
        self.last_outcome = None;
        self.line_endings.clear();
        self.phase = Phase::Idle;
        log::debug!("search started: {:?}", self.search.as_ref().map(|s| &s.root));
        Ok(())
    }

    /// コーパスを走査して、マッチのあるファイルだけを返す
    pub fn scan(&mut self, globs: &str) -> Result<Vec<FileMatches>> {
        let search = self.search.clone().ok_or(SessionError::NoSearch)?;
        let files = corpus::discover(&search.root, globs)?;

        let mut results = Vec::new();
        for path in files {
            let buffer = match self.load(&search.root, &path) {
                Ok(buffer) => buffer,
                Err(SweepError::File(FileError::Encoding { message, .. })) => {
                    log::warn!("skipping non UTF-8 file {}: {}", path.display(), message);
                    continue;
                }
                Err(err) => return Err(err),
            };
            let matches = build_match_index(buffer.lines(), &search.begin_pattern);
            if !matches.is_empty() {
                results.push(FileMatches::new(path, matches));
            }
        }

        log::info!("{} files with matches", results.len());
        Ok(results)
    }

    /// `path` の `line` から始まるブロックを選択し、ブロックのテキストを返す
    ///
    /// 終端が見つからない場合は空文字列を返す。
    pub fn select<P: AsRef<Path>>(&mut self, path: P, line: usize, end_pattern: &str) -> Result<String> {
        let path = path.as_ref();
        let search = self.search.clone().ok_or(SessionError::NoSearch)?;
        let boundary = EndBoundary::parse(end_pattern, self.window)?;
        let buffer = self.load(&search.root, path)?;

        if line >= buffer.len() {
            return Err(SessionError::LineOutOfRange {
                path: path.display().to_string(),
                line,
                len: buffer.len(),
            }
            .into());
        }

        let end = resolve_end(buffer.lines(), line, &boundary);
        let selection = Selection {
            path: path.to_path_buf(),
            buffer,
            begin: line,
            end,
            boundary,
        };
        let text = selection.block_text();

        log::debug!(
            "selected {}:[{}, {}){}",
            path.display(),
            line,
            end,
            if selection.is_degenerate() { " (no end boundary)" } else { "" }
        );

        self.selection = Some(selection);
        self.last_outcome = None;
        self.end_pattern = end_pattern.to_string();
        self.phase = Phase::Selected;
        Ok(text)
    }

    /// 選択ブロックにスクリプトを適用（空スクリプトなら何もしない）
    pub fn apply(&mut self, script: &str) -> Result<Option<TransformOutcome>> {
        if script.is_empty() {
            return Ok(None);
        }
        if self.selection.is_none() {
            return Err(SessionError::NoSelection.into());
        }
        self.script = Some(script.to_string());
        self.run_transform(script).map(Some)
    }

    /// 出力ペイロードをコミットし、次のマッチへ進む
    ///
    /// 直近の変換が失敗していた場合や出力ペイロードがない場合は
    /// `SessionError::NoOutput` を返し、ファイルも選択も変更しない。
    pub fn commit(&mut self) -> Result<CommitReport> {
        let search = self.search.clone().ok_or(SessionError::NoSearch)?;
        if self.selection.is_none() {
            return Err(SessionError::NoSelection.into());
        }
        if self.last_outcome.as_ref().is_some_and(TransformOutcome::is_failure) {
            return Err(SessionError::NoOutput.into());
        }
        let raw = match self.transformer.read_output() {
            Ok(raw) => raw,
            Err(SweepError::File(FileError::NotFound { .. })) => {
                return Err(SessionError::NoOutput.into())
            }
            Err(err) => return Err(err),
        };
        let selection = self.selection.as_mut().ok_or(SessionError::NoSelection)?;

        let new_lines = payload_lines(&raw);
        let (begin, end) = (selection.begin, selection.end);
        let next_pos = selection.buffer.splice(begin, end, new_lines);
        let progress = !(begin == end && next_pos == begin);

        let path = selection.path.clone();
        selection.buffer.save(search.root.join(&path))?;

        let matches = build_match_index(selection.buffer.lines(), &search.begin_pattern);
        let resumption = find_resumption(&matches, next_pos);
        self.phase = Phase::Committed;

        log::info!(
            "committed {}:[{}, {}) -> {} lines, resuming from {}",
            path.display(),
            begin,
            end,
            next_pos - begin,
            next_pos
        );
        if !progress {
            log::warn!(
                "commit at {}:{} made no progress; the same match will be selected again",
                path.display(),
                begin
            );
        }

        let continuation = match resumption {
            Some(index) => {
                let line = matches[index].line;
                self.resume(&path, line)?
            }
            None => {
                log::info!("{} has no more matches", path.display());
                self.selection = None;
                self.phase = Phase::FileExhausted;
                Continuation::FileExhausted
            }
        };

        Ok(CommitReport {
            path,
            next_pos,
            matches,
            resumption,
            progress,
            continuation,
        })
    }

    /// `Committed → Selected → Applied` の遷移
    fn resume(&mut self, path: &Path, line: usize) -> Result<Continuation> {
        let end_pattern = self.end_pattern.clone();
        let before = self.select(path, line, &end_pattern)?;
        let after = match self.script.clone() {
            Some(script) => Some(self.run_transform(&script)?),
            None => None,
        };
        Ok(Continuation::Resumed { before, after })
    }

    fn run_transform(&mut self, script: &str) -> Result<TransformOutcome> {
        let selection = self.selection.as_ref().ok_or(SessionError::NoSelection)?;
        let input = selection.block_text();
        let eol = selection.buffer.line_ending();

        let outcome = match self.transformer.run(&input, script)? {
            TransformOutcome::Output(raw) => {
                TransformOutcome::Output(payload_lines(&raw).join(eol.as_str()))
            }
            failed => failed,
        };
        self.phase = Phase::Applied;
        self.last_outcome = Some(outcome.clone());
        Ok(outcome)
    }

    /// ファイルを読み込む。改行コードはセッション内で最初に検出したものを使い続ける
    fn load(&mut self, root: &Path, path: &Path) -> Result<LineBuffer> {
        let content = io::read_file(root.join(path))?;
        let eol = *self
            .line_endings
            .entry(path.to_path_buf())
            .or_insert_with(|| LineEnding::detect(&content));
        Ok(LineBuffer::with_line_ending(&content, eol))
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn end_pattern(&self) -> &str {
        &self.end_pattern
    }

    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    pub fn last_outcome(&self) -> Option<&TransformOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn root(&self) -> Option<&Path> {
        self.search.as_ref().map(|s| s.root.as_path())
    }

    pub fn begin_pattern(&self) -> Option<&Regex> {
        self.search.as_ref().map(|s| &s.begin_pattern)
    }

    pub fn transformer(&self) -> &T {
        &self.transformer
    }
}

/// 出力ペイロードを行に分割（ペイロード自身の改行コードで分割する）
///
/// 空のペイロードは0行として扱う。
pub fn payload_lines(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    LineBuffer::from_text(raw).lines().to_vec()
}
