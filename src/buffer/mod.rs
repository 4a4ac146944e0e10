//! 行バッファモジュール
//!
//! ファイル内容を改行コード付きの行列として保持する

pub mod line_buffer;
pub mod line_ending;

pub use line_buffer::LineBuffer;
pub use line_ending::LineEnding;
