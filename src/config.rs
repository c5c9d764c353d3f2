//! 設定ファイル（TOML）の読み込み。
//!
//! キーはケバブケースで、未知のキーはエラーになります。
//! 省略したキーには既定値が使われます。

use crate::domain::caption::layout::{self, Anchor, ColorError, LayoutConfig, Placement};
use crate::domain::pattern::MatchMode;
use crate::domain::trailer::DecodePolicy;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 設定ファイルが指定されなかったときに探すファイル名。
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("設定ファイル '{path}' を読み込めません: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("設定ファイル '{path}' の書式が不正です: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error(transparent)]
    Color(#[from] ColorError),

    #[error("font-size は正の数である必要があります ({0})")]
    FontSize(f32),

    #[error("output-template が不正です: {0}")]
    OutputTemplate(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct AppConfig {
    pub output_template: String,
    pub font_file: Option<PathBuf>,
    pub font_size: f32,
    pub text_color: String,
    pub background_color: String,
    pub placement: Placement,
    pub anchor: Anchor,
    pub margin: Option<u32>,
    pub line_spacing: u32,
    pub encoding_errors: DecodePolicy,
    pub match_mode: MatchMode,
    pub preserve_trailer: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_template: "{stem}-caption.png".to_string(),
            font_file: None,
            font_size: 20.0,
            text_color: "#000000".to_string(),
            background_color: "#FFFFFF".to_string(),
            placement: Placement::default(),
            anchor: Anchor::default(),
            margin: None,
            line_spacing: 4,
            encoding_errors: DecodePolicy::default(),
            match_mode: MatchMode::default(),
            preserve_trailer: true,
        }
    }
}

impl AppConfig {
    /// 設定ファイルを読み込み、値を検証します。
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 明示されたパスがあればそれを、なければカレントディレクトリの
    /// `config.toml` を読み込みます。どちらもなければ既定値を使います。
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::load(default)
                } else {
                    tracing::debug!("設定ファイルがないため既定値を使います");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.layout()?;
        expand_output_template(&self.output_template, Path::new("probe.png"))?;
        Ok(())
    }

    /// 描画用のレイアウト設定に変換します。
    pub fn layout(&self) -> Result<LayoutConfig, ConfigError> {
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(ConfigError::FontSize(self.font_size));
        }
        Ok(LayoutConfig {
            font_size: self.font_size,
            text_color: layout::parse_color(&self.text_color)?,
            background_color: layout::parse_color(&self.background_color)?,
            placement: self.placement,
            anchor: self.anchor,
            margin: self
                .margin
                .unwrap_or_else(|| layout::default_margin(self.font_size)),
            line_spacing: self.line_spacing,
        })
    }

    /// 入力ファイルに対応する出力パスを `dir` の下に作ります。
    pub fn output_path(&self, input: &Path, dir: &Path) -> Result<PathBuf, ConfigError> {
        Ok(dir.join(expand_output_template(&self.output_template, input)?))
    }

    /// `output-template` から作られうるファイル名にマッチする正規表現を返します。
    pub fn output_name_matcher(&self) -> Result<Regex, ConfigError> {
        output_name_pattern(&self.output_template)
    }
}

/// 出力ファイル名テンプレートを、生成されるファイル名にマッチする正規表現に変換します。
///
/// プレースホルダーは任意の文字列に、それ以外はリテラルとしてマッチします。
pub fn output_name_pattern(template: &str) -> Result<Regex, ConfigError> {
    let mut pattern = String::from("^");
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                pattern.push_str(r"\{");
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                pattern.push_str(r"\}");
            }
            '{' => {
                let key: String = chars.by_ref().take_while(|&c| c != '}').collect();
                match key.as_str() {
                    "stem" | "name" => pattern.push_str(".+"),
                    "ext" => pattern.push_str(".*"),
                    _ => {
                        return Err(ConfigError::OutputTemplate(format!(
                            "未知のプレースホルダー '{{{key}}}'"
                        )))
                    }
                }
            }
            c => pattern.push_str(&regex::escape(&c.to_string())),
        }
    }
    pattern.push('$');
    Regex::new(&pattern).map_err(|e| ConfigError::OutputTemplate(e.to_string()))
}

/// 出力ファイル名テンプレートを展開します。
///
/// `{stem}` `{ext}` `{name}` が使え、`{{` `}}` は波括弧そのものになります。
pub fn expand_output_template(template: &str, input: &Path) -> Result<String, ConfigError> {
    let lossy = |s: Option<&std::ffi::OsStr>| s.map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let stem = lossy(input.file_stem());
    let ext = lossy(input.extension());
    let name = lossy(input.file_name());

    let mut out = String::new();
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let key: String = chars.by_ref().take_while(|&c| c != '}').collect();
                match key.as_str() {
                    "stem" => out.push_str(&stem),
                    "ext" => out.push_str(&ext),
                    "name" => out.push_str(&name),
                    _ => {
                        return Err(ConfigError::OutputTemplate(format!(
                            "未知のプレースホルダー '{{{key}}}'"
                        )))
                    }
                }
            }
            '}' => {
                return Err(ConfigError::OutputTemplate(
                    "対応しない '}' があります".to_string(),
                ))
            }
            c => out.push(c),
        }
    }

    if out.is_empty() || out.contains(['/', '\\']) {
        return Err(ConfigError::OutputTemplate(format!(
            "'{template}' はファイル名になりません"
        )));
    }
    Ok(out)
}
