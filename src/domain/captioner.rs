//! 1ファイル分の処理（読み込み → 抽出 → 描画 → 書き出し）をまとめるモジュール。

use crate::domain::caption::CaptionRenderer;
use crate::domain::input_source::png_file_path::PngFilePath;
use crate::domain::output_png::OutputPng;
use crate::domain::pattern::RuleSet;
use crate::domain::source_image::SourceImage;
use crate::domain::trailer::DecodePolicy;
use crate::error::AppError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 1ファイルの処理結果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub output: PathBuf,
    /// 描画した行数。0 なら画像は元のまま書き出された。
    pub lines: usize,
    /// マッチしなかったルールの数。
    pub unmatched: usize,
}

#[derive(Debug)]
pub struct Captioner {
    rules: RuleSet,
    renderer: CaptionRenderer,
    policy: DecodePolicy,
    preserve_trailer: bool,
}

impl Captioner {
    pub fn new(
        rules: RuleSet,
        renderer: CaptionRenderer,
        policy: DecodePolicy,
        preserve_trailer: bool,
    ) -> Self {
        Self {
            rules,
            renderer,
            policy,
            preserve_trailer,
        }
    }

    /// 入力ファイルを処理し、`output` に新しいPNGを書き出します。
    ///
    /// 失敗した場合、`output` には何も作られません。入力ファイルは変更しません。
    pub fn process_file(&self, input: &PngFilePath, output: &Path) -> Result<FileReport, AppError> {
        let input_path = input.as_path();
        ensure_distinct(input_path, output)?;

        let data = input.read().map_err(|source| AppError::ReadInput {
            path: input_path.to_path_buf(),
            source,
        })?;
        let source = SourceImage::from_bytes(&data, input_path.display().to_string()).map_err(
            |source| AppError::Source {
                path: input_path.to_path_buf(),
                source,
            },
        )?;
        let text = source
            .trailer_text(self.policy)
            .map_err(|source| AppError::Trailer {
                path: input_path.to_path_buf(),
                source,
            })?;
        debug!(
            file = source.name(),
            trailer_bytes = source.trailer().len(),
            "トレーラーを読み込みました"
        );

        let extraction = self.rules.apply(&text);
        for &index in &extraction.unmatched {
            let rule = &self.rules.rules()[index];
            warn!("[{}] が {} に見つかりませんでした", rule.pattern(), source.name());
        }

        let trailer = self.preserve_trailer.then(|| source.trailer());
        let lines = extraction.lines();
        let png = if lines.is_empty() {
            debug!("描画する行がないため、画像をそのまま書き出します");
            OutputPng::passthrough(source.png_data(), trailer)
        } else {
            let image = self.renderer.render(source.image(), &lines);
            OutputPng::encode(&image, trailer)?
        };
        png.save_to_path(output)?;

        Ok(FileReport {
            output: output.to_path_buf(),
            lines: lines.len(),
            unmatched: extraction.unmatched.len(),
        })
    }
}

/// 入力と出力が同じファイルを指していないことを確認します。
pub fn ensure_distinct(input: &Path, output: &Path) -> Result<(), AppError> {
    // 出力がまだ存在しなければ同一ではない
    let (Ok(a), Ok(b)) = (fs::canonicalize(input), fs::canonicalize(output)) else {
        return Ok(());
    };
    if a == b {
        return Err(AppError::SameFile(a));
    }
    Ok(())
}
