//! Template rendering for review notes.
//!
//! Simple `${variable}` substitution. Machine-derived metadata comes from the
//! item; analysis content comes from the caller and passes through a
//! field-name alias table first, because free-text producers name the same
//! concept many different ways.

use crate::format::{extract_year, format_creators};
use crate::types::Item;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{(\w+)\}").unwrap());

/// Alternate field name -> canonical template field name.
static FIELD_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        // literature review fields
        ("research_problem", "objective"),
        ("research_objective", "objective"),
        ("problem", "objective"),
        ("goal", "objective"),
        ("research_background", "background"),
        ("prior_work", "background"),
        ("related_work", "background"),
        ("methodology", "methods"),
        ("method", "methods"),
        ("approach", "methods"),
        ("key_findings", "contribution"),
        ("findings", "contribution"),
        ("contributions", "contribution"),
        ("results", "contribution"),
        ("limitations", "gaps"),
        ("research_gaps", "gaps"),
        ("future_directions", "discussion"),
        ("future_work", "discussion"),
        ("implications", "discussion"),
        ("key_quotes", "quotes"),
        ("important_quotes", "quotes"),
        ("references_to_read", "to_read"),
        ("suggested_reading", "to_read"),
        ("relevance", "discussion"),
        ("critical_analysis", "gaps"),
        // comparative review fields
        ("executive_summary", "summary"),
        ("overview", "summary"),
        ("papers_reviewed", "papers"),
        ("methods_comparison", "methods"),
        ("key_findings_comparison", "findings"),
        ("points_of_consensus", "consensus"),
        ("agreements", "consensus"),
        ("conflicts_debates", "conflicts"),
        ("debates", "conflicts"),
        ("disagreements", "conflicts"),
        ("research_evolution", "evolution"),
        ("timeline", "evolution"),
        ("challenges_solutions", "challenges"),
        ("recommendations", "insights"),
        ("takeaways", "insights"),
        ("overall_synthesis", "synthesis"),
        ("conclusion", "synthesis"),
    ])
});

/// Normalize analysis field names through the alias table.
///
/// Lookup is case-insensitive; keys without an alias pass through unchanged.
/// When several input keys collapse onto one canonical key, the first value
/// wins (the input map preserves insertion order).
pub fn normalize_analysis_fields(
    analysis: &serde_json::Map<String, serde_json::Value>,
) -> HashMap<String, String> {
    let mut normalized = HashMap::new();
    for (key, value) in analysis {
        let canonical = FIELD_ALIASES
            .get(key.to_lowercase().as_str())
            .map(|k| k.to_string())
            .unwrap_or_else(|| key.clone());
        normalized
            .entry(canonical)
            .or_insert_with(|| value_to_string(value));
    }
    normalized
}

fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Render a template with metadata and analysis content.
///
/// Analysis keys are alias-normalized, then metadata is merged on top —
/// metadata always wins on collision, so authoritative record data cannot be
/// overridden by free-text input (which also means an analysis field that
/// happens to share a metadata key name is silently dropped). Every
/// `${name}` placeholder is substituted; unmapped names become the empty
/// string rather than an error.
pub fn render_review(
    template: &str,
    metadata: &HashMap<String, String>,
    analysis: &serde_json::Map<String, serde_json::Value>,
) -> String {
    let mut variables = normalize_analysis_fields(analysis);
    for (key, value) in metadata {
        variables.insert(key.clone(), value.clone());
    }

    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| {
            variables.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned()
}

/// Extract the standard template metadata fields from an item.
///
/// Provides: title, authors, year, publicationTitle, DOI, abstractNote,
/// tags, itemLink, itemKey.
pub fn build_metadata(item: &Item) -> HashMap<String, String> {
    let data = &item.data;
    let tags = data
        .tags
        .iter()
        .map(|t| t.tag.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    HashMap::from([
        ("title".to_string(), item.title().to_string()),
        ("authors".to_string(), format_creators(&data.creators)),
        (
            "year".to_string(),
            extract_year(data.date.as_deref().unwrap_or("")),
        ),
        (
            "publicationTitle".to_string(),
            data.publication_title.clone().unwrap_or_default(),
        ),
        ("DOI".to_string(), data.doi.clone().unwrap_or_default()),
        (
            "abstractNote".to_string(),
            data.abstract_note.clone().unwrap_or_default(),
        ),
        ("tags".to_string(), tags),
        (
            "itemLink".to_string(),
            format!("zotero://select/library/items/{}", item.key),
        ),
        ("itemKey".to_string(), item.key.clone()),
    ])
}
