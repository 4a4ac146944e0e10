//! 結合テスト共通のヘルパー

#![allow(dead_code)]

use blocksweep::error::{Result, SweepError};
use blocksweep::{TransformOutcome, Transformer};
use std::fs;
use std::path::Path;

/// 入力テキストに関数を適用するだけのプロセス内変換
pub struct FnTransform<F> {
    f: F,
    output: Option<String>,
    pub runs: usize,
}

impl<F: FnMut(&str) -> String> FnTransform<F> {
    pub fn new(f: F) -> Self {
        Self {
            f,
            output: None,
            runs: 0,
        }
    }
}

impl<F: FnMut(&str) -> String> Transformer for FnTransform<F> {
    fn run(&mut self, input: &str, _script: &str) -> Result<TransformOutcome> {
        self.runs += 1;
        let out = (self.f)(input);
        self.output = Some(out.clone());
        Ok(TransformOutcome::Output(out))
    }

    fn read_output(&self) -> Result<String> {
        self.output
            .clone()
            .ok_or_else(|| SweepError::Application("no output yet".to_string()))
    }
}

pub fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

pub fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap()
}
