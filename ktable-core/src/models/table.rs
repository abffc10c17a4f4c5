//! Table structure produced by the extraction pipeline.
//!
//! Only the parts the LLM layer reads are modelled: column prompts and the
//! document behind each row.

use serde::{Deserialize, Serialize};

use super::query::{AnswerFormat, Rule};

/// The question asked for every cell of a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnPrompt {
    /// Entity type the column extracts (e.g. "Company").
    #[serde(rename = "entityType")]
    pub entity_type: String,
    /// Expected answer format.
    #[serde(rename = "type")]
    pub format: AnswerFormat,
    /// The question asked of each document.
    pub query: String,
    /// Constraints on the answer.
    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// A table column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column identifier.
    pub id: String,
    /// The column's question.
    pub prompt: ColumnPrompt,
}

/// A source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Document identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// A table row: one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Row identifier.
    pub id: String,
    /// The document this row extracts from.
    pub document: Document,
}

/// A knowledge table: questions as columns, documents as rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Columns, in display order.
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Rows, in display order.
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl Table {
    /// Distinct document names across all rows, sorted.
    #[must_use]
    pub fn document_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rows.iter().map(|r| r.document.name.clone()).collect();
        names.sort();
        names.dedup();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, doc: &str) -> Row {
        Row {
            id: id.into(),
            document: Document { id: format!("doc-{doc}"), name: doc.into() },
        }
    }

    #[test]
    fn document_names_are_distinct_and_sorted() {
        let table = Table {
            columns: vec![],
            rows: vec![row("1", "b.pdf"), row("2", "a.pdf"), row("3", "b.pdf")],
        };
        assert_eq!(table.document_names(), vec!["a.pdf", "b.pdf"]);
    }

    #[test]
    fn column_prompt_uses_camel_case_entity_type() {
        let column: Column = serde_json::from_str(
            r#"{"id": "c1", "prompt": {"entityType": "Company", "type": "str_array",
                "query": "Which companies are mentioned?"}}"#,
        )
        .expect("column");
        assert_eq!(column.prompt.entity_type, "Company");
        assert_eq!(column.prompt.format, AnswerFormat::StrArray);
        assert!(column.prompt.rules.is_empty());
    }
}
