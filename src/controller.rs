//! リクエスト処理
//!
//! セッションとコーパス全体のマッチ一覧を所有し、リクエストを1件ずつ処理して
//! イベント列を返す。ファイルを使い切ったら次のファイルへ引き継ぐ。

use crate::error::{Result, SweepError};
use crate::file::corpus;
use crate::logging::EventLog;
use crate::search::{EndBoundary, FileMatches, LineMatch, DEFAULT_WINDOW};
use crate::session::{Continuation, Session};
use crate::transform::{TransformOutcome, Transformer};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender};

/// 外部からのリクエスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// コーパス検索を開始（`globs` はカンマ区切り）
    StartSearch {
        root: PathBuf,
        globs: String,
        begin_pattern: String,
        end_pattern: String,
    },
    Select {
        path: PathBuf,
        line: usize,
        end_pattern: String,
    },
    Apply {
        script: String,
    },
    SelectAndApply {
        path: PathBuf,
        line: usize,
        end_pattern: String,
        script: String,
    },
    Commit,
    /// コミットせずに次のマッチへ進む
    Skip,
}

/// 処理結果として通知するイベント
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum Event {
    /// マッチのあるファイルの一覧
    SearchResult(Vec<FileMatches>),
    /// 選択ブロックの内容（空ブロックなら空文字列）
    Before(String),
    /// 変換結果。失敗時はエラーテキスト
    After { text: String, failed: bool },
    /// コミット後に作り直した1ファイル分の一覧
    FileUpdated {
        path: PathBuf,
        matches: Vec<LineMatch>,
        selected: Option<usize>,
    },
    FileExhausted(PathBuf),
    /// コーパスの最後まで進んだ
    SweepFinished,
    /// パターン不正などの回復可能なエラー
    Error(String),
}

impl Event {
    fn tag(&self) -> &'static str {
        match self {
            Event::SearchResult(_) => "search_result",
            Event::Before(_) => "before",
            Event::After { .. } => "after",
            Event::FileUpdated { .. } => "file_updated",
            Event::FileExhausted(_) => "file_exhausted",
            Event::SweepFinished => "sweep_finished",
            Event::Error(_) => "error",
        }
    }

    fn after(outcome: TransformOutcome) -> Self {
        let failed = outcome.is_failure();
        Event::After {
            text: outcome.into_text(),
            failed,
        }
    }
}

/// 1件のリクエストの処理結果
#[derive(Debug)]
pub struct Handled {
    /// 失敗までに発生したイベント
    pub events: Vec<Event>,
    pub error: Option<SweepError>,
}

/// コーパス一覧上の現在位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub file: usize,
    pub entry: usize,
}

/// セッションを所有するリクエストハンドラ
pub struct Controller<T: Transformer> {
    session: Session<T>,
    window: usize,
    results: Vec<FileMatches>,
    cursor: Option<Cursor>,
    last_before: String,
    last_after: Option<TransformOutcome>,
    event_log: Option<EventLog>,
}

impl<T: Transformer> Controller<T> {
    pub fn new(transformer: T) -> Self {
        Self::with_window(transformer, DEFAULT_WINDOW)
    }

    pub fn with_window(transformer: T, window: usize) -> Self {
        Self {
            session: Session::with_window(transformer, window),
            window,
            results: Vec::new(),
            cursor: None,
            last_before: String::new(),
            last_after: None,
            event_log: None,
        }
    }

    pub fn with_event_log(mut self, event_log: EventLog) -> Self {
        self.event_log = Some(event_log);
        self
    }

    /// リクエストを1件処理する
    ///
    /// 途中で失敗した場合も、失敗前に発生したイベント（コミット済みの
    /// `FileUpdated` など）は `events` に残る。パターン不正などは状態を変更しない。
    pub fn process(&mut self, request: Request) -> Handled {
        log::debug!("handling {:?}", request);
        let mut events = Vec::new();
        let mut error = self.dispatch(request, &mut events).err();

        if let Err(err) = self.log_events(&events) {
            log::warn!("failed to write event log: {}", err);
            if error.is_none() {
                error = Some(err);
            }
        }
        Handled { events, error }
    }

    /// `process` の `Result` 版。失敗時は途中のイベントを捨てる
    pub fn handle(&mut self, request: Request) -> Result<Vec<Event>> {
        let handled = self.process(request);
        match handled.error {
            Some(err) => {
                if !handled.events.is_empty() {
                    log::warn!("dropping {} events of a failed request", handled.events.len());
                }
                Err(err)
            }
            None => Ok(handled.events),
        }
    }

    fn dispatch(&mut self, request: Request, events: &mut Vec<Event>) -> Result<()> {
        match request {
            Request::StartSearch {
                root,
                globs,
                begin_pattern,
                end_pattern,
            } => self.start_search(root, &globs, &begin_pattern, &end_pattern, events),
            Request::Select {
                path,
                line,
                end_pattern,
            } => self.select(path, line, &end_pattern, events),
            Request::Apply { script } => self.apply(&script, events),
            Request::SelectAndApply {
                path,
                line,
                end_pattern,
                script,
            } => {
                self.select(path, line, &end_pattern, events)?;
                self.apply(&script, events)
            }
            Request::Commit => self.commit(events),
            Request::Skip => self.skip(events),
        }
    }

    fn start_search(
        &mut self,
        root: PathBuf,
        globs: &str,
        begin_pattern: &str,
        end_pattern: &str,
        events: &mut Vec<Event>,
    ) -> Result<()> {
        // パターン不正は状態を変える前に検出する
        EndBoundary::parse(end_pattern, self.window)?;
        corpus::build_glob_set(&corpus::split_globs(globs))?;

        self.session.start_search(root, begin_pattern)?;
        self.results.clear();
        self.cursor = None;
        self.last_before.clear();
        self.last_after = None;

        self.results = self.session.scan(globs)?;
        events.push(Event::SearchResult(self.results.clone()));

        if let Some(first) = self.results.first() {
            let path = first.path.clone();
            let line = first.matches[0].line;
            self.select(path, line, end_pattern, events)?;
        }
        Ok(())
    }

    fn select(
        &mut self,
        path: PathBuf,
        line: usize,
        end_pattern: &str,
        events: &mut Vec<Event>,
    ) -> Result<()> {
        let before = self.session.select(&path, line, end_pattern)?;
        self.cursor = self.locate(&path, line);
        self.last_before = before.clone();
        self.last_after = None;
        events.push(Event::Before(before));
        Ok(())
    }

    fn apply(&mut self, script: &str, events: &mut Vec<Event>) -> Result<()> {
        if let Some(outcome) = self.session.apply(script)? {
            self.last_after = Some(outcome.clone());
            events.push(Event::after(outcome));
        }
        Ok(())
    }

    fn commit(&mut self, events: &mut Vec<Event>) -> Result<()> {
        let report = self.session.commit()?;

        let file_index = match self.results.iter().position(|f| f.path == report.path) {
            Some(index) => {
                self.results[index].matches = report.matches.clone();
                index
            }
            None => {
                // 一覧外のファイルを直接選択していた場合
                self.results
                    .push(FileMatches::new(report.path.clone(), report.matches.clone()));
                self.results.len() - 1
            }
        };

        events.push(Event::FileUpdated {
            path: report.path.clone(),
            matches: report.matches.clone(),
            selected: report.resumption,
        });

        match report.continuation {
            Continuation::Resumed { before, after } => {
                self.cursor = report.resumption.map(|entry| Cursor {
                    file: file_index,
                    entry,
                });
                self.last_before = before.clone();
                self.last_after = after.clone();
                events.push(Event::Before(before));
                if let Some(outcome) = after {
                    events.push(Event::after(outcome));
                }
            }
            Continuation::FileExhausted => {
                events.push(Event::FileExhausted(report.path.clone()));
                self.advance_to_file(file_index + 1, events)?;
            }
        }
        Ok(())
    }

    fn skip(&mut self, events: &mut Vec<Event>) -> Result<()> {
        let Some(cursor) = self.cursor else {
            return Ok(());
        };

        let next_entry = cursor.entry + 1;
        match self.results.get(cursor.file).and_then(|f| f.matches.get(next_entry)) {
            Some(entry) => {
                let path = self.results[cursor.file].path.clone();
                let line = entry.line;
                self.select_and_reapply(path, line, events)
            }
            None => self.advance_to_file(cursor.file + 1, events),
        }
    }

    /// `from` 以降で最初にマッチのあるファイルの先頭マッチへ進む
    fn advance_to_file(&mut self, from: usize, events: &mut Vec<Event>) -> Result<()> {
        let next = self
            .results
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, f)| !f.is_empty())
            .map(|(_, f)| (f.path.clone(), f.matches[0].line));

        match next {
            Some((path, line)) => {
                log::info!("moving on to {}", path.display());
                self.select_and_reapply(path, line, events)
            }
            None => {
                log::info!("sweep finished");
                self.cursor = None;
                self.last_before.clear();
                self.last_after = None;
                events.push(Event::SweepFinished);
                Ok(())
            }
        }
    }

    /// 現在の終了パターンとスクリプトで選択・適用する
    fn select_and_reapply(
        &mut self,
        path: PathBuf,
        line: usize,
        events: &mut Vec<Event>,
    ) -> Result<()> {
        let end_pattern = self.session.end_pattern().to_string();
        let script = self.session.script().unwrap_or_default().to_string();
        self.select(path, line, &end_pattern, events)?;
        self.apply(&script, events)
    }

    fn locate(&self, path: &Path, line: usize) -> Option<Cursor> {
        let file = self.results.iter().position(|f| f.path == path)?;
        let entry = self.results[file].position_of(line)?;
        Some(Cursor { file, entry })
    }

    fn log_events(&self, events: &[Event]) -> Result<()> {
        if let Some(log) = &self.event_log {
            for event in events {
                log.record(event.tag(), event)?;
            }
        }
        Ok(())
    }

    /// リクエストキューを1件ずつ処理する
    ///
    /// 失敗したリクエストは途中までのイベントに続けて `Event::Error` を通知し、
    /// 次のリクエストへ進む。キューが空になるか送信先が閉じられたら終了する。
    pub fn run_queue(&mut self, requests: Receiver<Request>, events: Sender<Event>) {
        for request in requests {
            let Handled {
                events: mut emitted,
                error,
            } = self.process(request);
            if let Some(err) = error {
                match &err {
                    SweepError::File(_) => log::error!("request failed: {}", err),
                    _ => log::warn!("request failed: {}", err),
                }
                emitted.push(Event::Error(err.to_string()));
            }
            for event in emitted {
                if events.send(event).is_err() {
                    log::debug!("event receiver closed");
                    return;
                }
            }
        }
    }

    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    pub fn results(&self) -> &[FileMatches] {
        &self.results
    }

    pub fn cursor(&self) -> Option<Cursor> {
        self.cursor
    }

    pub fn last_before(&self) -> &str {
        &self.last_before
    }

    pub fn last_after(&self) -> Option<&TransformOutcome> {
        self.last_after.as_ref()
    }
}
