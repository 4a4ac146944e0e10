//! コマンドライン・アプリケーション
//!
//! 対話モードは標準入力から1行ずつコマンドを読み、コントローラーへリクエストとして渡す。
//! バッチモードはすべてのブロックに適用・コミットを繰り返す。

use crate::controller::{Controller, Event, Request};
use crate::error::{Result, SweepError};
use crate::render::{render_event, render_file, RenderOptions};
use crate::transform::Transformer;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// 検索条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSpec {
    pub root: PathBuf,
    pub globs: String,
    pub begin_pattern: String,
    pub end_pattern: String,
}

impl SearchSpec {
    pub fn to_request(&self) -> Request {
        Request::StartSearch {
            root: self.root.clone(),
            globs: self.globs.clone(),
            begin_pattern: self.begin_pattern.clone(),
            end_pattern: self.end_pattern.clone(),
        }
    }
}

/// 対話コマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Select { path: PathBuf, line: usize },
    /// 引数なしなら起動時のスクリプト
    Apply(Option<String>),
    Commit,
    Skip,
    Show,
    Help,
    Quit,
}

impl Command {
    /// 1行を解析（`select` の行番号は1始まり）
    pub fn parse(input: &str) -> std::result::Result<Self, String> {
        let input = input.trim();
        let (name, rest) = match input.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (input, ""),
        };

        match name {
            "list" | "l" => Ok(Command::List),
            "apply" | "a" => Ok(Command::Apply(if rest.is_empty() {
                None
            } else {
                Some(rest.to_string())
            })),
            "commit" | "c" => Ok(Command::Commit),
            "skip" | "s" => Ok(Command::Skip),
            "show" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            "select" => {
                let (path, line) = rest
                    .rsplit_once(char::is_whitespace)
                    .ok_or_else(|| "usage: select <file> <line>".to_string())?;
                let line: usize = line
                    .parse()
                    .map_err(|_| format!("invalid line number: {}", line))?;
                if line == 0 {
                    return Err("line numbers start at 1".to_string());
                }
                Ok(Command::Select {
                    path: PathBuf::from(path.trim()),
                    line: line - 1,
                })
            }
            "" => Err("empty command".to_string()),
            other => Err(format!("unknown command: {} (try 'help')", other)),
        }
    }
}

const HELP: &str = "\
commands:
  list                 show the match list
  select <file> <line> select the block starting at <line> (1-based)
  apply [script]       run the script (default: the one given at startup)
  commit               write the result back and move to the next block
  skip                 move to the next block without committing
  show                 show the current before/after text
  quit                 exit
";

/// 対話・バッチ実行を行うアプリケーション
pub struct App<T: Transformer> {
    controller: Controller<T>,
    spec: SearchSpec,
    script: String,
    options: RenderOptions,
}

impl<T: Transformer> App<T> {
    pub fn new(controller: Controller<T>, spec: SearchSpec, script: String) -> Self {
        Self {
            controller,
            spec,
            script,
            options: RenderOptions::default(),
        }
    }

    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn controller(&self) -> &Controller<T> {
        &self.controller
    }

    fn emit<W: Write>(&self, out: &mut W, events: &[Event]) -> Result<()> {
        for event in events {
            write!(out, "{}", render_event(event, &self.options))?;
        }
        out.flush()?;
        Ok(())
    }

    /// リクエストを処理してイベントを表示し、リクエストの失敗を返す
    ///
    /// 外側の `Err` は出力先への書き込み失敗。
    fn send<W: Write>(&mut self, out: &mut W, request: Request) -> Result<Option<SweepError>> {
        let handled = self.controller.process(request);
        self.emit(out, &handled.events)?;
        Ok(handled.error)
    }

    /// 検索を開始し、最初のブロックにスクリプトを適用する
    fn start<W: Write>(&mut self, out: &mut W) -> Result<bool> {
        if let Some(err) = self.send(out, self.spec.to_request())? {
            return Err(err);
        }
        let found = self.controller.cursor().is_some();
        if found && !self.script.is_empty() {
            let request = Request::Apply {
                script: self.script.clone(),
            };
            if let Some(err) = self.send(out, request)? {
                writeln!(out, "error: {}", err)?;
            }
        }
        Ok(found)
    }

    /// 対話モード
    pub fn run_interactive<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        self.start(out)?;

        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let command = match Command::parse(&line) {
                Ok(command) => command,
                Err(message) => {
                    writeln!(out, "{}", message)?;
                    continue;
                }
            };

            let request = match command {
                Command::Quit => break,
                Command::Help => {
                    write!(out, "{}", HELP)?;
                    continue;
                }
                Command::List => {
                    let results = self.controller.results().to_vec();
                    let cursor = self.controller.cursor();
                    for (index, file) in results.iter().enumerate() {
                        let selected = cursor.filter(|c| c.file == index).map(|c| c.entry);
                        write!(
                            out,
                            "{}",
                            render_file(&file.path, &file.matches, selected, &self.options)
                        )?;
                    }
                    continue;
                }
                Command::Show => {
                    let mut events = vec![Event::Before(self.controller.last_before().to_string())];
                    if let Some(after) = self.controller.last_after() {
                        events.push(Event::After {
                            text: after.text().to_string(),
                            failed: after.is_failure(),
                        });
                    }
                    self.emit(out, &events)?;
                    continue;
                }
                Command::Commit => {
                    if !self.has_before_and_after() {
                        writeln!(out, "nothing to commit: before or after is empty")?;
                        continue;
                    }
                    Request::Commit
                }
                Command::Skip => Request::Skip,
                Command::Apply(script) => {
                    if let Some(script) = script {
                        self.script = script;
                    }
                    Request::Apply {
                        script: self.script.clone(),
                    }
                }
                Command::Select { path, line } => Request::Select {
                    path,
                    line,
                    end_pattern: self.spec.end_pattern.clone(),
                },
            };

            // 失敗したコマンドは表示だけして次の入力へ進む
            if let Some(err) = self.send(out, request)? {
                writeln!(out, "error: {}", err)?;
            }
        }
        Ok(())
    }

    /// バッチモード：変換に失敗したブロックと空ブロックは飛ばす
    ///
    /// コミット件数を返す。リクエストが失敗した時点で中断する。
    pub fn run_batch<W: Write>(&mut self, out: &mut W) -> Result<usize> {
        let mut committed = 0;
        if !self.start(out)? {
            return Ok(0);
        }

        while self.controller.cursor().is_some() {
            let request = if self.ready_to_commit() {
                Request::Commit
            } else {
                log::warn!("skipping block: empty block or failed transform");
                Request::Skip
            };
            let is_commit = request == Request::Commit;

            let handled = self.controller.process(request);
            self.emit(out, &handled.events)?;
            if let Some(err) = handled.error {
                return Err(err);
            }
            let events = handled.events;
            if is_commit {
                committed += 1;
            }

            if events.iter().any(|e| matches!(e, Event::SweepFinished)) {
                break;
            }
        }

        log::info!("batch finished: {} commits", committed);
        Ok(committed)
    }

    /// 変換前後のテキストがどちらも空でない（空ならコミットしない）
    fn has_before_and_after(&self) -> bool {
        !self.controller.last_before().is_empty()
            && self
                .controller
                .last_after()
                .map(|after| !after.text().is_empty())
                .unwrap_or(false)
    }

    fn ready_to_commit(&self) -> bool {
        self.has_before_and_after()
            && !self
                .controller
                .last_after()
                .map(|after| after.is_failure())
                .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse("commit"), Ok(Command::Commit));
        assert_eq!(Command::parse("  s "), Ok(Command::Skip));
        assert_eq!(Command::parse("apply"), Ok(Command::Apply(None)));
        assert_eq!(
            Command::parse("apply sed 's/a/b/' \"$INPUT\" > \"$OUTPUT\""),
            Ok(Command::Apply(Some(
                "sed 's/a/b/' \"$INPUT\" > \"$OUTPUT\"".to_string()
            )))
        );
    }

    #[test]
    fn parses_select_with_one_based_line() {
        assert_eq!(
            Command::parse("select src/my file.rs 12"),
            Ok(Command::Select {
                path: PathBuf::from("src/my file.rs"),
                line: 11,
            })
        );
        assert!(Command::parse("select a.rs 0").is_err());
        assert!(Command::parse("select a.rs x").is_err());
        assert!(Command::parse("select").is_err());
    }

    #[test]
    fn rejects_unknown_command() {
        assert!(Command::parse("frobnicate").is_err());
    }
}
