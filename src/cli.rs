use clap::Parser;
use std::path::PathBuf;

/// PNGファイルの末尾に追記されたテキストを、パターンで整形して画像に描き込むツール
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// 入力PNGファイル、またはPNGファイルが含まれるフォルダのパス
    #[arg(required = true)]
    pub input: PathBuf,

    /// 出力PNGファイル（入力がフォルダの場合は出力フォルダ）のパス
    /// (オプション: デフォルトは output-template に従って入力と同じ場所)
    pub output: Option<PathBuf>,

    /// 設定ファイル (TOML) のパス (オプション: デフォルトはカレントディレクトリの config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// パターンファイルのパス
    #[arg(short, long, default_value = "patterns.txt")]
    pub patterns: PathBuf,

    /// 描画に使うTTF/OTFフォントファイルのパス (設定ファイルの font-file より優先)
    #[arg(short, long)]
    pub font_path: Option<PathBuf>,

    /// デバッグログを表示する
    #[arg(short, long)]
    pub verbose: bool,
}
