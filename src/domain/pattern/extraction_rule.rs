use super::pattern_error::PatternError;
use super::template::Template;
use regex::{Regex, RegexBuilder};

/// 1つの抽出ルール（正規表現とテンプレートの組）。
///
/// 正規表現は複数行モード（`^`/`$` が各行の先頭・末尾にマッチ）と
/// 冗長モード（空白と `#` 以降のコメントを無視）でコンパイルされます。
/// ただし文字クラス `[...]` の中の空白と `#` は文字そのものとして扱います。
#[derive(Debug, Clone)]
pub struct ExtractionRule {
    regex: Regex,
    template: Template,
}

impl ExtractionRule {
    /// 新しい `ExtractionRule` を作成します。
    ///
    /// # 引数
    /// * `number`: エラーメッセージ用のルール番号（1始まり）。
    /// * `pattern`: 正規表現のソース。
    /// * `template`: 置換テンプレートのソース。
    pub fn new(number: usize, pattern: &str, template: &str) -> Result<Self, PatternError> {
        let regex = RegexBuilder::new(&escape_class_literals(pattern))
            .multi_line(true)
            .ignore_whitespace(true)
            .build()
            .map_err(|e| PatternError::InvalidRegex {
                rule: number,
                reason: e.to_string(),
            })?;

        let template = Template::parse(template).map_err(|e| PatternError::InRule {
            rule: number,
            source: Box::new(e),
        })?;

        template
            .check_groups(&regex)
            .map_err(|group| PatternError::UnknownGroup {
                rule: number,
                group: group.to_string(),
            })?;

        Ok(Self { regex, template })
    }

    /// 最初のマッチだけを展開します。マッチしなければ `None`。
    pub fn first(&self, text: &str) -> Option<String> {
        self.regex
            .captures(text)
            .map(|caps| self.template.expand(&caps))
    }

    /// 重ならないすべてのマッチを、テキスト中の出現順に展開します。
    pub fn all(&self, text: &str) -> Vec<String> {
        self.regex
            .captures_iter(text)
            .map(|caps| self.template.expand(&caps))
            .collect()
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn template(&self) -> &Template {
        &self.template
    }
}

/// 冗長モードでも文字クラス内の空白・`#`・`[` がリテラルになるようにエスケープします。
///
/// `regex` の `x` フラグはクラス内の空白も無視し、`[` をネストしたクラスとして扱うため、
/// クラス内の該当文字だけを前もってエスケープしておきます。クラスの外は変更しません。
fn escape_class_literals(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    let mut in_class = false;
    // クラス先頭の `]` は閉じ括弧ではなくリテラル
    let mut class_start = false;

    while let Some(c) = chars.next() {
        if c == '\\' {
            out.push(c);
            if let Some(next) = chars.next() {
                out.push(next);
            }
            class_start = false;
            continue;
        }
        if !in_class {
            match c {
                '[' => {
                    in_class = true;
                    class_start = true;
                    out.push(c);
                    if chars.peek() == Some(&'^') {
                        chars.next();
                        out.push('^');
                    }
                }
                // コメントは行末まで。中の `[` をクラスと見なさない
                '#' => {
                    out.push(c);
                    for rest in chars.by_ref() {
                        out.push(rest);
                        if rest == '\n' {
                            break;
                        }
                    }
                }
                _ => out.push(c),
            }
            continue;
        }
        match c {
            ']' if class_start => out.push_str("\\]"),
            ']' => {
                in_class = false;
                out.push(c);
            }
            ' ' => out.push_str("\\x20"),
            '\t' => out.push_str("\\t"),
            c if c.is_whitespace() => out.push_str(&format!("\\x{{{:X}}}", c as u32)),
            '#' | '[' | '&' | '~' => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
        class_start = false;
    }
    out
}
