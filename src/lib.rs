//! PNGファイルの末尾に追記されたテキストから正規表現で必要な部分を取り出し、
//! 画像の複製に描き込むツールのライブラリ部分。

pub mod config;
pub mod domain;
pub mod error;
