//! 置換テンプレート。
//!
//! テンプレート文字列は一度だけ解析してリテラルとグループ参照の列に変換し、
//! 展開時は各セグメントを順に連結するだけにします。
//! グループ参照の妥当性はルール生成時に正規表現と照合して検証するため、
//! 展開時にエラーが発生することはありません。
//!
//! 書式:
//! - `\1`〜`\99`: 番号付きグループ
//! - `\g<0>` / `\g<1>` / `\g<name>`: マッチ全体、番号付きまたは名前付きグループ
//! - `\0`、`\0nn`、`\nnn`（3桁）: 8進数の文字コード
//! - `\a \b \f \n \r \t \v \\`: 制御文字とバックスラッシュ
//! - 上記以外の英字のエスケープはエラー、英字以外はそのまま残す

use super::pattern_error::PatternError;
use regex::{Captures, Regex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupRef {
    Index(usize),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Group(GroupRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, PatternError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            if c != '\\' {
                literal.push(c);
                continue;
            }
            let Some((_, next)) = chars.next() else {
                return Err(invalid(pos, "末尾に単独のバックスラッシュがあります"));
            };
            let group = match next {
                'g' => Some(parse_g_group(pos, &mut chars)?),
                '0' => {
                    let mut value = 0;
                    for _ in 0..2 {
                        match chars.peek() {
                            Some(&(_, d)) if is_octal(d) => {
                                chars.next();
                                value = value * 8 + digit(d);
                            }
                            _ => break,
                        }
                    }
                    literal.push(octal_char(pos, value)?);
                    None
                }
                '1'..='9' => {
                    let mut index = digit(next);
                    let mut ahead = chars.clone();
                    let second = ahead.next().map(|(_, d)| d);
                    let third = ahead.next().map(|(_, d)| d);
                    match (second, third) {
                        // 3桁の8進数は文字として扱う
                        (Some(d2), Some(d3)) if is_octal(next) && is_octal(d2) && is_octal(d3) => {
                            chars.next();
                            chars.next();
                            let value = (index * 8 + digit(d2)) * 8 + digit(d3);
                            literal.push(octal_char(pos, value)?);
                            None
                        }
                        (Some(d2), _) if d2.is_ascii_digit() => {
                            chars.next();
                            index = index * 10 + digit(d2);
                            Some(GroupRef::Index(index))
                        }
                        _ => Some(GroupRef::Index(index)),
                    }
                }
                _ => {
                    match next {
                        'a' => literal.push('\x07'),
                        'b' => literal.push('\x08'),
                        'f' => literal.push('\x0C'),
                        'n' => literal.push('\n'),
                        'r' => literal.push('\r'),
                        't' => literal.push('\t'),
                        'v' => literal.push('\x0B'),
                        '\\' => literal.push('\\'),
                        c if c.is_ascii_alphabetic() => {
                            return Err(invalid(pos, &format!("不正なエスケープ '\\{c}'")));
                        }
                        c => {
                            literal.push('\\');
                            literal.push(c);
                        }
                    }
                    None
                }
            };
            if let Some(group) = group {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Group(group));
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// テンプレートが参照するすべてのグループが `regex` に存在するか検証します。
    /// 存在しないグループの参照を `GroupRef` として返します。
    pub fn check_groups(&self, regex: &Regex) -> Result<(), GroupRef> {
        for segment in &self.segments {
            let Segment::Group(group) = segment else {
                continue;
            };
            let exists = match group {
                GroupRef::Index(i) => *i < regex.captures_len(),
                GroupRef::Name(name) => regex.capture_names().flatten().any(|n| n == name.as_str()),
            };
            if !exists {
                return Err(group.clone());
            }
        }
        Ok(())
    }

    /// マッチ結果を使ってテンプレートを展開します。
    /// マッチに参加しなかったグループは空文字列になります。
    pub fn expand(&self, caps: &Captures<'_>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Group(GroupRef::Index(i)) => {
                    out.push_str(caps.get(*i).map_or("", |m| m.as_str()))
                }
                Segment::Group(GroupRef::Name(n)) => {
                    out.push_str(caps.name(n).map_or("", |m| m.as_str()))
                }
            }
        }
        out
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl std::fmt::Display for GroupRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupRef::Index(i) => write!(f, "{i}"),
            GroupRef::Name(n) => write!(f, "{n}"),
        }
    }
}

fn parse_g_group(
    pos: usize,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> Result<GroupRef, PatternError> {
    if chars.next().map(|(_, c)| c) != Some('<') {
        return Err(invalid(pos, "\\g の後には '<' が必要です"));
    }
    let mut name = String::new();
    loop {
        match chars.next() {
            Some((_, '>')) => break,
            Some((_, c)) => name.push(c),
            None => return Err(invalid(pos, "\\g<...> が閉じられていません")),
        }
    }
    if name.is_empty() {
        return Err(invalid(pos, "\\g<> のグループ名が空です"));
    }
    if name.chars().all(|c| c.is_ascii_digit()) {
        let index = name
            .parse()
            .map_err(|_| invalid(pos, &format!("グループ番号 '{name}' が大きすぎます")))?;
        return Ok(GroupRef::Index(index));
    }
    let valid_name = name
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_');
    if !valid_name {
        return Err(invalid(pos, &format!("グループ名 '{name}' が不正です")));
    }
    Ok(GroupRef::Name(name))
}

fn is_octal(c: char) -> bool {
    ('0'..='7').contains(&c)
}

fn octal_char(pos: usize, value: usize) -> Result<char, PatternError> {
    if value > 0o377 {
        return Err(invalid(pos, &format!("8進エスケープの値 {value:o} が大きすぎます")));
    }
    char::from_u32(value as u32).ok_or_else(|| invalid(pos, "8進エスケープが不正です"))
}

fn digit(c: char) -> usize {
    c.to_digit(10).unwrap_or(0) as usize
}

fn invalid(position: usize, reason: &str) -> PatternError {
    PatternError::InvalidTemplate {
        position,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(pattern: &str, template: &str, text: &str) -> String {
        let re = Regex::new(pattern).unwrap();
        let caps = re.captures(text).unwrap();
        Template::parse(template).unwrap().expand(&caps)
    }

    #[test]
    fn numbered_groups() {
        assert_eq!(
            expand(r"(\w+)=(\w+)", r"\2 <- \1", "key=value"),
            "value <- key"
        );
    }

    #[test]
    fn two_digit_group_reference() {
        let pattern = r"(a)(b)(c)(d)(e)(f)(g)(h)(i)(j)(k)";
        assert_eq!(expand(pattern, r"\11\1", "abcdefghijk"), "ka");
    }

    #[test]
    fn g_syntax_for_names_and_numbers() {
        assert_eq!(
            expand(r"(?P<id>\d+)-(\d+)", r"\g<id>/\g<2>0", "12-34"),
            "12/340"
        );
    }

    #[test]
    fn whole_match_only_through_g_syntax() {
        assert_eq!(expand(r"b+", r"[\g<0>]", "abbbc"), "[bbb]");
        // `\0` はグループではなくNUL文字
        assert_eq!(expand(r"b+", r"[\0]", "abbbc"), "[\0]");
    }

    #[test]
    fn octal_escapes() {
        assert_eq!(expand(r"a", r"\012x\101", "a"), "\nxA");
        assert_eq!(expand(r"a", r"\07", "a"), "\x07");
        assert!(matches!(
            Template::parse(r"\400"),
            Err(PatternError::InvalidTemplate { position: 0, .. })
        ));
    }

    #[test]
    fn two_digit_reference_is_not_octal() {
        let pattern = r"(a)(b)(c)(d)(e)(f)(g)(h)(i)(j)(k)(l)";
        // \128 は 8 が8進数でないため \12 と "8"
        assert_eq!(expand(pattern, r"\128", "abcdefghijkl"), "l8");
    }

    #[test]
    fn non_participating_group_expands_to_empty() {
        assert_eq!(expand(r"x(y)?z", r"<\1>", "xz"), "<>");
    }

    #[test]
    fn escapes() {
        assert_eq!(expand(r"a", r"1\n2\t3\\4", "a"), "1\n2\t3\\4");
        // 英字以外のエスケープはそのまま残る
        assert_eq!(expand(r"a", r"\.\-", "a"), r"\.\-");
    }

    #[test]
    fn unknown_letter_escape_is_rejected() {
        assert!(matches!(
            Template::parse(r"ok \q"),
            Err(PatternError::InvalidTemplate { position: 3, .. })
        ));
    }

    #[test]
    fn malformed_g_references_are_rejected() {
        for src in [r"\g1", r"\g<1", r"\g<>", r"\g<a-b>", "trailing\\"] {
            assert!(
                matches!(Template::parse(src), Err(PatternError::InvalidTemplate { .. })),
                "{src} は拒否されるべきです"
            );
        }
    }

    #[test]
    fn check_groups_reports_missing_group() {
        let re = Regex::new(r"(?P<id>\w+)").unwrap();
        assert!(Template::parse(r"\1 \g<id>").unwrap().check_groups(&re).is_ok());
        assert_eq!(
            Template::parse(r"\2").unwrap().check_groups(&re),
            Err(GroupRef::Index(2))
        );
        assert_eq!(
            Template::parse(r"\g<name>").unwrap().check_groups(&re),
            Err(GroupRef::Name("name".into()))
        );
    }

    #[test]
    fn literal_only_template() {
        let t = Template::parse("固定テキスト").unwrap();
        let re = Regex::new("x").unwrap();
        let caps = re.captures("x").unwrap();
        assert_eq!(t.expand(&caps), "固定テキスト");
        assert_eq!(t.as_str(), "固定テキスト");
    }
}
