use crate::config::ConfigError;
use crate::domain::caption::FontError;
use crate::domain::input_source::path_error::PathError;
use crate::domain::output_png::OutputError;
use crate::domain::pattern::PatternError;
use crate::domain::source_image::SourceImageError;
use crate::domain::trailer::TrailerError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("パス関連のエラー: {0}")]
    Path(#[from] PathError),

    #[error("'{path}' を読み込めません: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("入力と出力が同じファイルです: {0}")]
    SameFile(PathBuf),

    #[error("'{path}': {source}")]
    Source {
        path: PathBuf,
        #[source]
        source: SourceImageError,
    },

    #[error("'{path}': {source}")]
    Trailer {
        path: PathBuf,
        #[source]
        source: TrailerError,
    },

    #[error("パターンファイル '{path}' を読み込めません: {source}")]
    ReadPatterns {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("パターンエラー: {0}")]
    Pattern(#[from] PatternError),

    #[error("設定エラー: {0}")]
    Config(#[from] ConfigError),

    #[error("フォントエラー: {0}")]
    Font(#[from] FontError),

    #[error("出力エラー: {0}")]
    Output(#[from] OutputError),

    #[error("出力先 '{0}' はフォルダではありません")]
    NotAFolder(PathBuf),

    #[error("I/Oエラーが発生しました: {0}")]
    Io(#[from] std::io::Error),

    #[error("処理対象が見つかりませんでした: {0}")]
    NoItemsProcessed(String),
}

/// 利用者に見せるエラーの分類。終了コードと1対1に対応します。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 入力ファイルがない、読めない、PNGではない。
    InvalidInput,
    /// 終端マーカーがない、またはトレーラーが不正なテキスト。
    MalformedInput,
    /// 正規表現やテンプレートの誤り。
    PatternError,
    /// 設定・パターンファイルの読み込み、出力の書き込みの失敗。
    IoError,
    /// 設定値やフォントデータの誤り。
    Config,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::InvalidInput => 3,
            ErrorKind::MalformedInput => 4,
            ErrorKind::PatternError => 5,
            ErrorKind::IoError => 6,
            ErrorKind::Config => 7,
        }
    }
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Path(_)
            | AppError::ReadInput { .. }
            | AppError::SameFile(_)
            | AppError::NotAFolder(_)
            | AppError::NoItemsProcessed(_) => ErrorKind::InvalidInput,
            AppError::Source { source, .. } => match source {
                SourceImageError::Trailer(e) => trailer_kind(e),
                SourceImageError::NotAnImage { .. } => ErrorKind::InvalidInput,
            },
            AppError::Trailer { source, .. } => trailer_kind(source),
            AppError::Pattern(_) => ErrorKind::PatternError,
            AppError::ReadPatterns { .. } | AppError::Output(_) | AppError::Io(_) => {
                ErrorKind::IoError
            }
            AppError::Config(ConfigError::Read { .. }) => ErrorKind::IoError,
            AppError::Config(_) => ErrorKind::Config,
            AppError::Font(FontError::Read { .. }) => ErrorKind::IoError,
            AppError::Font(FontError::InvalidFont(_)) => ErrorKind::Config,
        }
    }
}

fn trailer_kind(e: &TrailerError) -> ErrorKind {
    match e {
        TrailerError::NotPng => ErrorKind::InvalidInput,
        TrailerError::MissingEndMarker | TrailerError::InvalidText { .. } => {
            ErrorKind::MalformedInput
        }
    }
}
