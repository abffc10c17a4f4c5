//! Prompt templates for knowledge table queries.
//!
//! Templates use `{name}` placeholders. Rendering is a single pass over the
//! template: substituted text is never scanned again, so chunk text or JSON
//! containing braces is safe to insert. A placeholder with no value is an
//! error.
//!
//! The built-in templates can be replaced per deployment by a directory of
//! versioned TOML files (see [`PromptEngine::from_directory`]).

use ktable_core::{Rule, RuleType};

use crate::error::LlmError;

/// Wraps every answer query: the question, the retrieved chunks and the
/// format-specific instructions.
pub const BASE_PROMPT: &str = r#"Your job is to answer the following query using only the raw text chunks provided below.

Query: {query}

Raw text chunks:
{chunks}

{format_specific_instructions}

Base your answer strictly on the raw text chunks. Do not use outside knowledge and do not guess."#;

/// Instructions for yes/no answers.
pub const BOOL_INSTRUCTIONS: &str = r"Return a single boolean. Answer true only if the raw text chunks clearly support an affirmative answer to the query; otherwise answer false.";

/// Instructions for string and string-list answers.
pub const STR_ARRAY_INSTRUCTIONS: &str = r"Return the answer as text. If the query asks for more than one value, return each value as a separate item and do not repeat items. Keep each item short and copy names exactly as written in the raw text chunks.
{str_rule_line}
{int_rule_line}";

/// Instructions for integer and integer-list answers.
pub const INT_ARRAY_INSTRUCTIONS: &str = r"Return the answer as whole numbers only, without units, currency symbols or thousands separators. If the query asks for more than one value, return each value as a separate item.
{int_rule_line}";

/// Extracts search keywords from a query.
pub const KEYWORD_PROMPT: &str = r"Extract the keywords from the following query that would be most useful for finding relevant passages in a document collection. Prefer nouns, names and domain terms; leave out filler words.

Query: {query}";

/// Finds terms in the chunks similar to a set of keywords.
pub const SIMILAR_KEYWORDS_PROMPT: &str = r"You are given a list of keywords and a set of raw text chunks.

Keywords: {rule}

Raw text chunks:
{chunks}

Return the words or short phrases that appear in the raw text chunks and are similar in meaning to any of the keywords, including synonyms, abbreviations and alternative spellings. Return each one exactly as it appears in the chunks.";

/// Breaks a complex query into simpler ones.
pub const DECOMPOSE_QUERY_PROMPT: &str = r"Break the following query into simpler sub-queries that can each be answered on its own from a single passage of text. Keep the sub-queries in the order they should be answered. If the query is already simple, return it unchanged as the only sub-query.

Query: {query}";

/// Proposes relationships between a table's entity types.
pub const SCHEMA_PROMPT: &str = r"You are designing a knowledge graph schema for a table extracted from documents.

Documents: {documents}

Columns (each column answers a question about every document):
{columns}

Entity types: {entity_types}

Propose the relationships between these entity types that the documents are likely to express. Each relationship has a head entity type, a relation label written in snake_case, and a tail entity type. Use only the entity types listed above for head and tail.";

/// Render `template`, replacing each `{name}` with the matching value.
///
/// Braces that do not enclose an identifier are copied as-is.
///
/// # Errors
///
/// Returns [`LlmError::Template`] if a placeholder has no value in `vars`.
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> Result<String, LlmError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let name_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        let name = &after[..name_len];

        if !name.is_empty() && after[name_len..].starts_with('}') {
            let value = vars
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| *value)
                .ok_or_else(|| LlmError::Template(format!("no value for placeholder '{{{name}}}'")))?;
            out.push_str(value);
            rest = &after[name_len + 1..];
        } else {
            out.push('{');
            rest = after;
        }
    }

    out.push_str(rest);
    Ok(out)
}

/// Instruction line for a `must_return` / `may_return` rule.
///
/// Empty when there is no such rule or it has no options.
#[must_use]
pub fn str_rule_line(rule: Option<&Rule>, query: &str) -> String {
    let Some(rule) = rule else {
        return String::new();
    };
    let options = match rule.options.as_deref() {
        Some(options) if !options.is_empty() => options,
        _ => return String::new(),
    };

    match rule.rule_type {
        RuleType::MustReturn => {
            let quoted = options
                .iter()
                .map(|o| format!("\"{o}\""))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "You should only consider these possible values when answering the question: {quoted}. \
                 If these values do not exist in the raw text chunks, or if they do not correctly answer \
                 the question, respond with \"not found\"."
            )
        }
        RuleType::MayReturn => {
            let joined = options.join(", ");
            format!(
                "For example: Query: {query} Response: {joined}, etc... If you cannot find a related, \
                 correct answer in the raw text chunks, respond with \"not found\"."
            )
        }
        RuleType::MaxLength => String::new(),
    }
}

/// Instruction line for a `max_length` rule.
///
/// Empty when there is no such rule or it has no length.
#[must_use]
pub fn int_rule_line(rule: Option<&Rule>) -> String {
    match rule {
        Some(Rule {
            rule_type: RuleType::MaxLength,
            length: Some(length),
            ..
        }) => format!(
            "Your answer should only return up to {length} items. If you have to choose between \
             multiple, return those that answer the question the best."
        ),
        _ => String::new(),
    }
}

/// Format a keyword list for insertion into a prompt: `"a", "b"`.
#[must_use]
pub fn format_keywords(keywords: &[String]) -> String {
    keywords
        .iter()
        .map(|k| format!("\"{k}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Prompt engine: built-in templates with per-file TOML overrides
// ---------------------------------------------------------------------------

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Identifies a prompt template by purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    /// Answer a query from chunks.
    Base,
    /// Boolean format instructions.
    BoolInstructions,
    /// String / string-list format instructions.
    StrArrayInstructions,
    /// Integer / integer-list format instructions.
    IntArrayInstructions,
    /// Keyword extraction.
    Keywords,
    /// Similar-keyword lookup.
    SimilarKeywords,
    /// Query decomposition.
    DecomposeQuery,
    /// Graph schema generation.
    Schema,
}

impl PromptId {
    /// Returns the TOML filename (without path) for this prompt.
    #[must_use]
    pub fn filename(self) -> &'static str {
        match self {
            Self::Base => "base.toml",
            Self::BoolInstructions => "bool_instructions.toml",
            Self::StrArrayInstructions => "str_array_instructions.toml",
            Self::IntArrayInstructions => "int_array_instructions.toml",
            Self::Keywords => "keywords.toml",
            Self::SimilarKeywords => "similar_keywords.toml",
            Self::DecomposeQuery => "decompose_query.toml",
            Self::Schema => "schema.toml",
        }
    }

    /// All prompt IDs.
    #[must_use]
    pub fn all() -> &'static [PromptId] {
        &[
            Self::Base,
            Self::BoolInstructions,
            Self::StrArrayInstructions,
            Self::IntArrayInstructions,
            Self::Keywords,
            Self::SimilarKeywords,
            Self::DecomposeQuery,
            Self::Schema,
        ]
    }

    /// The compiled-in template for this prompt.
    #[must_use]
    pub fn builtin_template(self) -> &'static str {
        match self {
            Self::Base => BASE_PROMPT,
            Self::BoolInstructions => BOOL_INSTRUCTIONS,
            Self::StrArrayInstructions => STR_ARRAY_INSTRUCTIONS,
            Self::IntArrayInstructions => INT_ARRAY_INSTRUCTIONS,
            Self::Keywords => KEYWORD_PROMPT,
            Self::SimilarKeywords => SIMILAR_KEYWORDS_PROMPT,
            Self::DecomposeQuery => DECOMPOSE_QUERY_PROMPT,
            Self::Schema => SCHEMA_PROMPT,
        }
    }
}

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.filename().trim_end_matches(".toml");
        write!(f, "{name}")
    }
}

impl FromStr for PromptId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|id| id.to_string() == s)
            .ok_or_else(|| format!("unknown prompt id: '{s}'"))
    }
}

/// Contents of a TOML prompt file.
#[derive(Debug, Clone, Deserialize)]
struct TomlPromptFile {
    prompt: TomlPromptData,
}

/// Inner `[prompt]` section of a TOML file.
#[derive(Debug, Clone, Deserialize)]
struct TomlPromptData {
    version: String,
    template: String,
}

/// A loaded, ready-to-render prompt template.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// Prompt version string (e.g., "1.0").
    pub version: String,
    /// Template text (contains `{key}` placeholders).
    pub template: String,
}

/// Holds one template per [`PromptId`] and renders them.
///
/// # Example
///
/// ```
/// use ktable_llm::prompt::{PromptEngine, PromptId};
///
/// let engine = PromptEngine::builtin();
/// let prompt = engine
///     .render(PromptId::Keywords, &[("query", "Who audits Acme?")])
///     .expect("keywords prompt renders");
/// assert!(prompt.contains("Who audits Acme?"));
/// ```
#[derive(Debug, Clone)]
pub struct PromptEngine {
    templates: HashMap<PromptId, PromptTemplate>,
}

impl Default for PromptEngine {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PromptEngine {
    /// Create a `PromptEngine` holding the compiled-in templates.
    #[must_use]
    pub fn builtin() -> Self {
        let templates = PromptId::all()
            .iter()
            .map(|id| {
                (
                    *id,
                    PromptTemplate {
                        version: "builtin".into(),
                        template: id.builtin_template().into(),
                    },
                )
            })
            .collect();
        Self { templates }
    }

    /// Load templates from a directory of TOML files, keeping the built-in
    /// template for every prompt without a file.
    ///
    /// Files not named after a [`PromptId`] are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ConfigError`] if the directory does not exist or a
    /// TOML file exists but cannot be read or parsed.
    pub fn from_directory(dir: impl AsRef<Path>) -> Result<Self, LlmError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(LlmError::ConfigError(format!(
                "prompt directory not found: {}",
                dir.display()
            )));
        }

        let mut engine = Self::builtin();
        for id in PromptId::all() {
            let path: PathBuf = dir.join(id.filename());
            if path.exists() {
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    LlmError::ConfigError(format!("failed to read {}: {e}", path.display()))
                })?;
                let parsed: TomlPromptFile = toml::from_str(&content).map_err(|e| {
                    LlmError::ConfigError(format!("failed to parse {}: {e}", path.display()))
                })?;

                engine.templates.insert(
                    *id,
                    PromptTemplate {
                        version: parsed.prompt.version,
                        template: parsed.prompt.template,
                    },
                );
            }
        }

        Ok(engine)
    }

    /// Get a loaded prompt template by ID.
    #[must_use]
    pub fn get(&self, id: PromptId) -> Option<&PromptTemplate> {
        self.templates.get(&id)
    }

    /// Render the template for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Template`] if the prompt is not loaded or a
    /// placeholder has no value.
    pub fn render(&self, id: PromptId, vars: &[(&str, &str)]) -> Result<String, LlmError> {
        let tpl = self
            .get(id)
            .ok_or_else(|| LlmError::Template(format!("prompt template '{id}' not loaded")))?;
        render_template(&tpl.template, vars)
    }

    /// Number of loaded templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether no templates are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
