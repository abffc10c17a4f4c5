//! Query operations over an injected completion client.
//!
//! Each operation renders a prompt, asks for one response model and maps the
//! validated output onto its canonical result. Failures are logged and turned
//! into the operation's fallback; nothing is returned to the caller as an
//! error.

use ktable_core::config::LlmSettings;
use ktable_core::{AnswerFormat, Rule, RuleType, Table};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::client::{CompletionClient, parse_structured};
use crate::error::LlmError;
use crate::prompt::{PromptEngine, PromptId, format_keywords, int_rule_line, str_rule_line};
use crate::response::{
    Answer, AnswerResult, BoolResponse, IntArrayResponse, IntResponse, KeywordsResponse, KeywordsResult,
    ResponseModel, SchemaResponse, SchemaResult, StrArrayResponse, StrResponse, SubQueriesResponse,
    SubQueriesResult,
};
use crate::types::{CompletionRequest, Message, ResponseFormat};

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Runs knowledge table queries against a [`CompletionClient`].
///
/// # Example
///
/// ```no_run
/// use ktable_llm::{NoopClient, QueryService};
///
/// # async fn run() {
/// let service = QueryService::new(NoopClient, "gpt-4o");
/// let result = service.get_keywords("Who audits Acme Corp?").await;
/// assert!(result.keywords.is_empty());
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct QueryService<C> {
    client: C,
    model: String,
    strict_schema: bool,
    prompts: PromptEngine,
}

impl<C: CompletionClient> QueryService<C> {
    /// Create a service using `model` for every call, with the built-in
    /// prompts and strict schemas.
    #[must_use]
    pub fn new(client: C, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            strict_schema: true,
            prompts: PromptEngine::builtin(),
        }
    }

    /// Create a service from settings.
    #[must_use]
    pub fn from_settings(client: C, settings: &LlmSettings) -> Self {
        let model = if settings.model.trim().is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            settings.model.clone()
        };
        Self::new(client, model).with_strict_schema(settings.strict_schema)
    }

    /// Whether the API should enforce response schemas strictly.
    #[must_use]
    pub fn with_strict_schema(mut self, strict: bool) -> Self {
        self.strict_schema = strict;
        self
    }

    /// Replace the prompt templates.
    #[must_use]
    pub fn with_prompts(mut self, prompts: PromptEngine) -> Self {
        self.prompts = prompts;
        self
    }

    /// The model identifier sent with every request.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Answer `query` from `chunks` in the requested `format`.
    ///
    /// The first `must_return`/`may_return` rule and the first `max_length`
    /// rule shape the instructions. Returns `{"answer": null}` on failure.
    pub async fn generate_response(
        &self,
        query: &str,
        chunks: &str,
        rules: &[Rule],
        format: AnswerFormat,
    ) -> AnswerResult {
        info!(query, %format, "generating response");

        match self.try_generate_response(query, chunks, rules, format).await {
            Ok(answer) => AnswerResult { answer: Some(answer) },
            Err(e) => {
                error!(error = %e, "error generating response");
                AnswerResult::default()
            }
        }
    }

    async fn try_generate_response(
        &self,
        query: &str,
        chunks: &str,
        rules: &[Rule],
        format: AnswerFormat,
    ) -> Result<Answer, LlmError> {
        let str_rule = rules.iter().find(|r| r.rule_type.is_string_rule());
        let int_rule = rules.iter().find(|r| r.rule_type == RuleType::MaxLength);

        let instructions = match format {
            AnswerFormat::Bool => self.prompts.render(PromptId::BoolInstructions, &[])?,
            AnswerFormat::Str | AnswerFormat::StrArray => self.prompts.render(
                PromptId::StrArrayInstructions,
                &[
                    ("str_rule_line", str_rule_line(str_rule, query).as_str()),
                    ("int_rule_line", int_rule_line(int_rule).as_str()),
                ],
            )?,
            AnswerFormat::Int | AnswerFormat::IntArray => self.prompts.render(
                PromptId::IntArrayInstructions,
                &[("int_rule_line", int_rule_line(int_rule).as_str())],
            )?,
        };

        let prompt = self.prompts.render(
            PromptId::Base,
            &[
                ("query", query),
                ("chunks", chunks),
                ("format_specific_instructions", instructions.as_str()),
            ],
        )?;

        let answer = match format {
            AnswerFormat::Bool => Answer::Bool(self.structured::<BoolResponse>(prompt).await?.answer),
            AnswerFormat::Int => Answer::Int(self.structured::<IntResponse>(prompt).await?.answer),
            AnswerFormat::Str => Answer::Str(self.structured::<StrResponse>(prompt).await?.answer),
            AnswerFormat::IntArray => {
                Answer::IntArray(self.structured::<IntArrayResponse>(prompt).await?.answer)
            }
            AnswerFormat::StrArray => {
                Answer::StrArray(self.structured::<StrArrayResponse>(prompt).await?.answer)
            }
        };
        Ok(answer)
    }

    /// Extract search keywords from `query`. Returns `{"keywords": []}` on
    /// failure.
    pub async fn get_keywords(&self, query: &str) -> KeywordsResult {
        info!(query, "extracting keywords");

        let result: Result<KeywordsResponse, LlmError> = async {
            let prompt = self.prompts.render(PromptId::Keywords, &[("query", query)])?;
            self.structured::<KeywordsResponse>(prompt).await
        }
        .await;

        match result {
            Ok(response) => KeywordsResult {
                keywords: response.keywords,
            },
            Err(e) => {
                error!(error = %e, "error extracting keywords");
                KeywordsResult::default()
            }
        }
    }

    /// Find terms in `chunks` similar to the keywords in `rule`. Returns
    /// `{"keywords": []}` on failure.
    pub async fn get_similar_keywords(&self, chunks: &str, rule: &[String]) -> KeywordsResult {
        info!(?rule, "retrieving keywords similar to the provided keywords");

        let result: Result<KeywordsResponse, LlmError> = async {
            let prompt = self.prompts.render(
                PromptId::SimilarKeywords,
                &[("rule", format_keywords(rule).as_str()), ("chunks", chunks)],
            )?;
            self.structured::<KeywordsResponse>(prompt).await
        }
        .await;

        match result {
            Ok(response) => KeywordsResult {
                keywords: response.keywords,
            },
            Err(e) => {
                error!(error = %e, "error getting similar keywords");
                KeywordsResult::default()
            }
        }
    }

    /// Break `query` into simpler sub-queries. Returns `{"sub-queries": []}`
    /// on failure.
    pub async fn decompose_query(&self, query: &str) -> SubQueriesResult {
        info!("decomposing query into multiple sub-queries");

        let result: Result<SubQueriesResponse, LlmError> = async {
            let prompt = self.prompts.render(PromptId::DecomposeQuery, &[("query", query)])?;
            self.structured::<SubQueriesResponse>(prompt).await
        }
        .await;

        match result {
            Ok(response) => SubQueriesResult {
                sub_queries: response.sub_queries,
            },
            Err(e) => {
                error!(error = %e, "error decomposing query");
                SubQueriesResult::default()
            }
        }
    }

    /// Propose relationships between the entity types of `table`'s columns.
    /// Returns a schema with no relationships on failure.
    pub async fn generate_schema(&self, table: &Table) -> SchemaResult {
        info!(columns = table.columns.len(), rows = table.rows.len(), "generating schema");

        let result: Result<SchemaResponse, LlmError> = async {
            let vars = SchemaPromptVars::from_table(table)?;
            let prompt = self.prompts.render(
                PromptId::Schema,
                &[
                    ("documents", vars.documents.as_str()),
                    ("columns", vars.columns.as_str()),
                    ("entity_types", vars.entity_types.as_str()),
                ],
            )?;
            self.structured::<SchemaResponse>(prompt).await
        }
        .await;

        match result {
            Ok(schema) => SchemaResult { schema },
            Err(e) => {
                error!(error = %e, "error generating schema");
                SchemaResult::default()
            }
        }
    }

    /// Send `prompt` as a single user message and parse the reply as `T`.
    async fn structured<T: ResponseModel>(&self, prompt: String) -> Result<T, LlmError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![Message::user(prompt)],
            response_format: ResponseFormat::for_model::<T>(T::NAME, self.strict_schema),
        };
        debug!(model = %self.model, schema = T::NAME, "sending structured completion");

        let text = self.client.complete(&request).await?;
        parse_structured::<T>(&text)
    }
}

/// A column as described to the model.
#[derive(Debug, Serialize)]
struct ColumnSummary<'a> {
    id: &'a str,
    entity_type: &'a str,
    #[serde(rename = "type")]
    format: AnswerFormat,
    question: &'a str,
}

/// Placeholder values for the schema prompt.
#[derive(Debug)]
struct SchemaPromptVars {
    documents: String,
    columns: String,
    entity_types: String,
}

impl SchemaPromptVars {
    fn from_table(table: &Table) -> Result<Self, LlmError> {
        let summaries: Vec<ColumnSummary<'_>> = table
            .columns
            .iter()
            .map(|c| ColumnSummary {
                id: &c.id,
                entity_type: &c.prompt.entity_type,
                format: c.prompt.format,
                question: &c.prompt.query,
            })
            .collect();

        let columns = serde_json::to_string_pretty(&summaries)
            .map_err(|e| LlmError::Template(format!("failed to serialize columns: {e}")))?;
        let entity_types = summaries
            .iter()
            .map(|c| c.entity_type)
            .collect::<Vec<_>>()
            .join(", ");

        Ok(Self {
            documents: table.document_names().join(", "),
            columns,
            entity_types,
        })
    }
}
