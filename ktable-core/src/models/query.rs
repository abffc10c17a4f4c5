//! Answer formats and answer rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of constraint a [`Rule`] places on an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    /// The answer must be one of the rule's options.
    MustReturn,
    /// The rule's options are examples of acceptable answers.
    MayReturn,
    /// The answer may contain at most `length` items.
    MaxLength,
}

impl RuleType {
    /// Whether this rule constrains string answers via its options.
    #[must_use]
    pub fn is_string_rule(self) -> bool {
        matches!(self, Self::MustReturn | Self::MayReturn)
    }
}

/// A constraint narrowing or shaping an expected LLM answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// What kind of constraint this is.
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    /// Allowed or example values (string rules).
    #[serde(default)]
    pub options: Option<Vec<String>>,
    /// Maximum item count (`max_length` rules).
    #[serde(default)]
    pub length: Option<u32>,
}

impl Rule {
    /// A `must_return` rule over `options`.
    #[must_use]
    pub fn must_return<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rule_type: RuleType::MustReturn,
            options: Some(options.into_iter().map(Into::into).collect()),
            length: None,
        }
    }

    /// A `may_return` rule over `options`.
    #[must_use]
    pub fn may_return<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rule_type: RuleType::MayReturn,
            options: Some(options.into_iter().map(Into::into).collect()),
            length: None,
        }
    }

    /// A `max_length` rule capping the answer at `length` items.
    #[must_use]
    pub fn max_length(length: u32) -> Self {
        Self {
            rule_type: RuleType::MaxLength,
            options: None,
            length: Some(length),
        }
    }
}

/// Shape an answer is expected to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerFormat {
    /// A single integer.
    Int,
    /// A single string.
    Str,
    /// A yes/no answer.
    Bool,
    /// A list of integers.
    IntArray,
    /// A list of strings.
    StrArray,
}

impl AnswerFormat {
    /// All formats.
    #[must_use]
    pub fn all() -> &'static [AnswerFormat] {
        &[Self::Int, Self::Str, Self::Bool, Self::IntArray, Self::StrArray]
    }
}

impl fmt::Display for AnswerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int => "int",
            Self::Str => "str",
            Self::Bool => "bool",
            Self::IntArray => "int_array",
            Self::StrArray => "str_array",
        };
        write!(f, "{name}")
    }
}

impl FromStr for AnswerFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(Self::Int),
            "str" => Ok(Self::Str),
            "bool" => Ok(Self::Bool),
            "int_array" => Ok(Self::IntArray),
            "str_array" => Ok(Self::StrArray),
            _ => Err(format!("unknown answer format: '{s}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_uses_type_key_on_the_wire() {
        let rule: Rule =
            serde_json::from_str(r#"{"type": "must_return", "options": ["A", "B"]}"#).expect("rule");
        assert_eq!(rule, Rule::must_return(["A", "B"]));

        let json = serde_json::to_value(Rule::max_length(3)).expect("serialize");
        assert_eq!(json["type"], "max_length");
        assert_eq!(json["length"], 3);
    }

    #[test]
    fn string_rule_kinds() {
        assert!(RuleType::MustReturn.is_string_rule());
        assert!(RuleType::MayReturn.is_string_rule());
        assert!(!RuleType::MaxLength.is_string_rule());
    }

    #[test]
    fn answer_format_display_matches_wire_name() {
        for format in AnswerFormat::all() {
            let wire = serde_json::to_value(format).expect("serialize");
            assert_eq!(wire, format.to_string());
            assert_eq!(format.to_string().parse::<AnswerFormat>().expect("parse"), *format);
        }
    }

    #[test]
    fn unknown_answer_format_is_rejected() {
        assert!("float".parse::<AnswerFormat>().is_err());
    }
}
