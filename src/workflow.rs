//! アプリケーションのメインワークフローを定義するモジュール。
//!
//! このモジュールは、UI層（`cli`）とドメイン層（`domain`）を仲介し、
//! 設定の読み込みから単一ファイル／フォルダ単位の処理までの流れを実装します。

use crate::cli::Args;
use png_trailer_caption::config::AppConfig;
use png_trailer_caption::domain::caption::{CaptionFont, CaptionRenderer};
use png_trailer_caption::domain::input_source::directory_path::DirectoryPath;
use png_trailer_caption::domain::input_source::input_source::InputSource;
use png_trailer_caption::domain::input_source::png_file_path::PngFilePath;
use png_trailer_caption::domain::pattern::RuleSet;
use png_trailer_caption::domain::{Captioner, FileReport};
use png_trailer_caption::error::AppError;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

// --- public な main 関数 ---

/// アプリケーションのメインロジックを実行します。
///
/// # 戻り値
/// * `Ok(())`: すべての処理が正常に完了した場合。
/// * `Err(AppError)`: 処理中に回復不可能なエラーが発生した場合。
pub fn run(args: Args) -> Result<(), AppError> {
    // 1. 設定とパターンの読み込み
    let mut config = AppConfig::resolve(args.config.as_deref())?;
    if let Some(font_path) = args.font_path {
        config.font_file = Some(font_path);
    }
    let captioner = build_captioner(&config, &args.patterns)?;

    // 2. 入力の種類に応じて処理を振り分ける
    let source = InputSource::new(&args.input)?;
    debug!("入力: {}", source.as_path().display());
    match source {
        InputSource::PngFile(file) => {
            let output = match args.output {
                Some(path) => path,
                None => {
                    let dir = file.as_path().parent().unwrap_or_else(|| Path::new(""));
                    config.output_path(file.as_path(), dir)?
                }
            };
            let report = captioner.process_file(&file, &output)?;
            log_report(&file, &report);
            Ok(())
        }
        InputSource::Directory(dir) => {
            let output_dir = args.output.unwrap_or_else(|| dir.as_path().to_path_buf());
            process_directory(&captioner, &config, &dir, &output_dir)
        }
    }
}

// --- private なヘルパー関数 ---

fn build_captioner(config: &AppConfig, patterns_path: &Path) -> Result<Captioner, AppError> {
    let text = fs::read_to_string(patterns_path).map_err(|source| AppError::ReadPatterns {
        path: patterns_path.to_path_buf(),
        source,
    })?;
    let rules = RuleSet::parse(&text, config.match_mode)?;
    if rules.is_empty() {
        warn!(
            "パターンファイル '{}' にルールがありません",
            patterns_path.display()
        );
    }

    let font = CaptionFont::new(config.font_file.as_deref())?;
    let renderer = CaptionRenderer::new(font, config.layout()?);
    Ok(Captioner::new(
        rules,
        renderer,
        config.encoding_errors,
        config.preserve_trailer,
    ))
}

/// フォルダ直下のPNGファイルをすべて処理します。
///
/// 個々のファイルの失敗は警告を出して次へ進みます。
/// 1つも処理できなかった場合はエラーを返します。
fn process_directory(
    captioner: &Captioner,
    config: &AppConfig,
    dir: &DirectoryPath,
    output_dir: &Path,
) -> Result<(), AppError> {
    // 出力フォルダが存在しない場合は作成する。
    if !output_dir.exists() {
        fs::create_dir_all(output_dir)?;
    } else if !output_dir.is_dir() {
        return Err(AppError::NotAFolder(output_dir.to_path_buf()));
    }

    // 出力先が入力フォルダと同じなら、以前の実行で書き出したファイルを入力にしない
    let same_folder = fs::canonicalize(output_dir)? == fs::canonicalize(dir.as_path())?;
    let output_names = config.output_name_matcher()?;

    info!("[フォルダ処理開始] {}", dir);
    let mut processed_item_count = 0;
    for path in dir.png_files()? {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if same_folder && output_names.is_match(&file_name) {
            debug!("出力ファイルのためスキップします: {}", path.display());
            continue;
        }

        let result = PngFilePath::new(&path)
            .map_err(AppError::from)
            .and_then(|file| {
                let output = config.output_path(file.as_path(), output_dir)?;
                let report = captioner.process_file(&file, &output)?;
                log_report(&file, &report);
                Ok(report)
            });

        match result {
            Ok(_) => processed_item_count += 1,
            Err(e) => {
                // 特定のファイルの処理に失敗しても、全体は止めずに次のファイルへ進む。
                warn!("'{}' の処理中にエラーが発生しました: {}", path.display(), e);
            }
        }
    }

    if processed_item_count == 0 {
        Err(AppError::NoItemsProcessed(dir.to_string()))
    } else {
        info!("{} 個のファイルを処理しました", processed_item_count);
        Ok(())
    }
}

fn log_report(input: &PngFilePath, report: &FileReport) {
    if report.lines == 0 {
        info!(
            "{} -> {} (一致する行がないため画像はそのまま)",
            input,
            report.output.display()
        );
    } else {
        info!(
            "{} -> {} ({} 行, 未一致のルール {} 件)",
            input,
            report.output.display(),
            report.lines,
            report.unmatched
        );
    }
}
