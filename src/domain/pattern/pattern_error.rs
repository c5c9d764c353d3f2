use thiserror::Error;

/// パターンファイルの解析、正規表現のコンパイル、テンプレートの検証で発生するエラー。
///
/// `rule` / `block` はいずれも1始まりの番号です。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("ブロック {block} は「パターン」と「テンプレート」の2行である必要があります ({lines} 行ありました)")]
    MalformedBlock { block: usize, lines: usize },

    #[error("ルール {rule} の正規表現が不正です: {reason}")]
    InvalidRegex { rule: usize, reason: String },

    #[error("テンプレートの書式が不正です (位置 {position}): {reason}")]
    InvalidTemplate { position: usize, reason: String },

    #[error("ルール {rule} のテンプレートが存在しないグループ '{group}' を参照しています")]
    UnknownGroup { rule: usize, group: String },

    #[error("ルール {rule}: {source}")]
    InRule {
        rule: usize,
        #[source]
        source: Box<PatternError>,
    },
}
