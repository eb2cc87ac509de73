//! Ranked suspiciousness report serialization
//!
//! Table-shaped JSON document: a schema section describing the columns
//! plus an ordered array of row objects, pretty-printed to the configured
//! destination. Deserializing an emitted report reconstructs the ranked
//! list exactly.

use crate::score::ScoredElement;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One column in the report schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
}

/// Report schema: column descriptions plus the element primary key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSchema {
    pub fields: Vec<SchemaField>,
    #[serde(rename = "primaryKey")]
    pub primary_key: Vec<String>,
}

/// One ranked element row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub file: String,
    pub line: u32,
    pub score: f64,
    pub rank: u32,
}

/// Complete suspiciousness report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub schema: ReportSchema,
    pub data: Vec<ReportRow>,
}

/// Sort scored elements into rank order: score descending, ties broken by
/// (file, line) ascending so repeated runs are byte-identical.
pub fn rank(scores: &mut [ScoredElement]) {
    scores.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.element.cmp(&b.element))
    });
}

impl Report {
    /// Build the ranked report from scored elements (sorts internally;
    /// ranks are 1-based positions).
    pub fn from_scores(mut scores: Vec<ScoredElement>) -> Self {
        rank(&mut scores);
        let data = scores
            .into_iter()
            .enumerate()
            .map(|(idx, scored)| ReportRow {
                file: scored.element.file,
                line: scored.element.line,
                score: scored.score,
                rank: idx as u32 + 1,
            })
            .collect();
        Self {
            schema: Self::schema(),
            data,
        }
    }

    fn schema() -> ReportSchema {
        let field = |name: &str, field_type: &str| SchemaField {
            name: name.to_string(),
            field_type: field_type.to_string(),
        };
        ReportSchema {
            fields: vec![
                field("file", "string"),
                field("line", "integer"),
                field("score", "number"),
                field("rank", "integer"),
            ],
            primary_key: vec!["file".to_string(), "line".to_string()],
        }
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize report")
    }

    /// Write the report to `path`
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json_string()?)
            .with_context(|| format!("failed to write report to {}", path.display()))
    }

    /// Read a previously written report back
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read report {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("invalid report JSON in {}", path.display()))
    }
}
