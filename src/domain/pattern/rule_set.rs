use super::extraction_rule::ExtractionRule;
use super::pattern_error::PatternError;
use serde::Deserialize;

/// 1つのルールがテキストに何回マッチしてよいか。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// 最初のマッチだけを使う（1ルール最大1行）。
    #[default]
    First,
    /// 重ならないすべてのマッチを使う（1マッチ1行）。
    All,
}

/// ルールの適用結果。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// 展開されたテキスト。ルールの宣言順に並ぶ。
    pub parts: Vec<String>,
    /// マッチしなかったルールの番号（0始まり）。
    pub unmatched: Vec<usize>,
}

impl Extraction {
    /// 描画する行の一覧。テンプレートに改行が含まれていれば複数行に分かれます。
    pub fn lines(&self) -> Vec<String> {
        if self.parts.is_empty() {
            return Vec::new();
        }
        self.parts
            .join("\n")
            .split('\n')
            .map(str::to_string)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// 宣言順に並んだ抽出ルールの集合。
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<ExtractionRule>,
    mode: MatchMode,
}

impl RuleSet {
    /// パターンファイルの内容を解析します。
    ///
    /// 空行で区切られた各ブロックは「正規表現」「テンプレート」の2行からなります。
    pub fn parse(text: &str, mode: MatchMode) -> Result<Self, PatternError> {
        let text = text.replace("\r\n", "\n");
        let mut rules = Vec::new();

        for (index, block) in blocks(&text).into_iter().enumerate() {
            let number = index + 1;
            match block.as_slice() {
                [pattern, template] => rules.push(ExtractionRule::new(number, pattern, template)?),
                _ => {
                    return Err(PatternError::MalformedBlock {
                        block: number,
                        lines: block.len(),
                    })
                }
            }
        }

        Ok(Self { rules, mode })
    }

    /// すべてのルールをテキストに適用します。
    pub fn apply(&self, text: &str) -> Extraction {
        let mut extraction = Extraction::default();
        for (index, rule) in self.rules.iter().enumerate() {
            let found: Vec<String> = match self.mode {
                MatchMode::First => rule.first(text).into_iter().collect(),
                MatchMode::All => rule.all(text),
            };
            if found.is_empty() {
                extraction.unmatched.push(index);
            }
            extraction.parts.extend(found);
        }
        extraction
    }

    pub fn rules(&self) -> &[ExtractionRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// 空行（空白のみの行を含む）で区切られた、空でないブロックの一覧
fn blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in text.split('\n') {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}
