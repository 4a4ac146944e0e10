//! `/bin/sh` ラッパー経由の変換

use super::{TransformOutcome, Transformer};
use crate::config::SweepConfig;
use crate::error::Result;
use crate::file::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// 入力・出力ペイロードとラッパースクリプトの固定パス
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingPaths {
    pub input: PathBuf,
    pub output: PathBuf,
    pub script: PathBuf,
}

impl StagingPaths {
    pub fn in_dir<P: AsRef<Path>>(dir: P, config: &SweepConfig) -> Self {
        let dir = dir.as_ref();
        Self {
            input: dir.join(&config.input_name),
            output: dir.join(&config.output_name),
            script: dir.join(&config.script_name),
        }
    }

    pub fn from_config(config: &SweepConfig) -> Self {
        Self::in_dir(config.resolve_staging_dir(), config)
    }

    fn dir(&self) -> Option<&Path> {
        self.script.parent()
    }
}

/// ラッパースクリプトを生成して外部コマンドを実行する変換
#[derive(Debug, Clone)]
pub struct ShellTransformer {
    paths: StagingPaths,
}

impl ShellTransformer {
    pub fn new(paths: StagingPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &StagingPaths {
        &self.paths
    }

    /// `INPUT` と `OUTPUT` を export してからスクリプト本文を実行するラッパー
    pub fn wrapper_script(&self, script: &str) -> String {
        format!(
            "#!/bin/sh\nexport INPUT={}\nexport OUTPUT={}\n{}\n",
            shell_quote(&self.paths.input),
            shell_quote(&self.paths.output),
            script
        )
    }

    fn execute(&self) -> TransformOutcome {
        let script = &self.paths.script;
        // 直接 exec せず sh に読ませる（noexec なステージング先でも動く）
        let output = match Command::new("sh").arg(script).output() {
            Ok(output) => output,
            Err(err) => {
                log::warn!("failed to spawn {}: {}", script.display(), err);
                return TransformOutcome::Failed(format!(
                    "Error: failed to run {}: {}",
                    script.display(),
                    err
                ));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            log::warn!("transform exited with {}", output.status);
            return TransformOutcome::Failed(format!(
                "Error: Command failed: {} ({})\n{}",
                script.display(),
                output.status,
                stderr
            ));
        }

        match io::read_file(&self.paths.output) {
            Ok(text) => TransformOutcome::Output(text),
            Err(err) => {
                log::warn!("transform produced no readable output: {}", err);
                TransformOutcome::Failed(format!("Error: {}", err))
            }
        }
    }
}

impl Transformer for ShellTransformer {
    fn run(&mut self, input: &str, script: &str) -> Result<TransformOutcome> {
        if let Some(dir) = self.paths.dir() {
            io::ensure_dir(dir)?;
        }

        io::write_file(&self.paths.input, input)?;
        // 前回の出力が残っていると失敗時に古い結果を読んでしまう
        io::remove_if_exists(&self.paths.output)?;
        io::write_executable(&self.paths.script, &self.wrapper_script(script))?;

        log::debug!(
            "running transform {} on {} bytes",
            self.paths.script.display(),
            input.len()
        );
        Ok(self.execute())
    }

    fn read_output(&self) -> Result<String> {
        io::read_file(&self.paths.output)
    }
}

fn shell_quote(path: &Path) -> String {
    let raw = path.to_string_lossy();
    format!("'{}'", raw.replace('\'', "'\\''"))
}
