//! 変換アダプタ
//!
//! 選択ブロックをステージングし、外部コマンドに渡して結果を受け取る。
//! スクリプト本文は信頼済みのシェルテキストとしてそのまま埋め込む。

pub mod shell;

pub use shell::{ShellTransformer, StagingPaths};

use crate::error::Result;

/// 変換の結果
///
/// 外部コマンドの失敗はセッションを止めず、エラーテキストが結果の代わりになる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformOutcome {
    /// 出力ペイロードの内容
    Output(String),
    /// 失敗内容（そのまま「after」として表示される）
    Failed(String),
}

impl TransformOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, TransformOutcome::Failed(_))
    }

    pub fn text(&self) -> &str {
        match self {
            TransformOutcome::Output(text) | TransformOutcome::Failed(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            TransformOutcome::Output(text) | TransformOutcome::Failed(text) => text,
        }
    }
}

/// 外部変換とのインターフェース
pub trait Transformer {
    /// 入力をステージングしてスクリプトを実行し、出力を返す
    ///
    /// ステージングファイルへの書き込み失敗は `Err`、コマンドの失敗は
    /// `TransformOutcome::Failed` で返す。
    fn run(&mut self, input: &str, script: &str) -> Result<TransformOutcome>;

    /// 現在の出力ペイロード（コミット時に読み直す）
    fn read_output(&self) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_text_accessors() {
        let ok = TransformOutcome::Output("done".into());
        let failed = TransformOutcome::Failed("boom".into());
        assert!(!ok.is_failure());
        assert!(failed.is_failure());
        assert_eq!(ok.text(), "done");
        assert_eq!(failed.into_text(), "boom");
    }
}
