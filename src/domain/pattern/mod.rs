pub mod extraction_rule;
pub mod pattern_error;
pub mod rule_set;
pub mod template;

pub use extraction_rule::ExtractionRule;
pub use pattern_error::PatternError;
pub use rule_set::{Extraction, MatchMode, RuleSet};
pub use template::Template;
