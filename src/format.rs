//! Human-readable formatting of item metadata, plus the text helpers shared
//! by the citation generator and the template engine.

use crate::types::{Creator, Item, ItemType};
use once_cell::sync::Lazy;
use regex::Regex;

/// First 4-digit token in [1900, 2099].
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(19|20)\d{2}\b").unwrap());

static HTML_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Detects actual HTML structure (an element with a closing tag, or <br/>),
/// as opposed to a plain-text mention of a tag.
static HTML_STRUCTURE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)<(?:p|div|span|h[1-6]|ul|ol|li|a|strong|em|b|i)(?:\s[^>]*)?>.*?</(?:p|div|span|h[1-6]|ul|ol|li|a|strong|em|b|i)>|<br\s*/?>",
    )
    .unwrap()
});

/// Extract a 4-digit year from a free-form date string.
///
/// Handles "2024-08-01", "March 2024", "2021", and similar; returns the
/// literal "nodate" when no year in [1900, 2099] is present.
pub fn extract_year(date: &str) -> String {
    YEAR_RE
        .find(date)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "nodate".to_string())
}

/// Format creator names for display.
///
/// Each creator renders as `Last, First` when both parts exist, or as the
/// bare organizational name; entries are joined with "; ". An empty list
/// renders as "No authors listed".
pub fn format_creators(creators: &[Creator]) -> String {
    let names: Vec<String> = creators
        .iter()
        .filter_map(|c| match (&c.first_name, &c.last_name, &c.name) {
            (Some(first), Some(last), _) => Some(format!("{}, {}", last, first)),
            (_, _, Some(name)) => Some(name.clone()),
            _ => None,
        })
        .collect();

    if names.is_empty() {
        "No authors listed".to_string()
    } else {
        names.join("; ")
    }
}

/// Strip HTML tags from note content.
pub fn clean_html(raw: &str) -> String {
    HTML_TAG_RE.replace_all(raw, "").into_owned()
}

/// Convert plain text to HTML paragraphs for Zotero notes.
///
/// Content that already contains HTML structure is returned unchanged.
pub fn text_to_html(content: &str) -> String {
    if HTML_STRUCTURE_RE.is_match(content) {
        return content.to_string();
    }
    content
        .split("\n\n")
        .map(|p| format!("<p>{}</p>", p.replace('\n', "<br/>")))
        .collect()
}

/// Format an item's metadata as a markdown summary.
///
/// Fields that are absent are omitted rather than rendered as placeholders.
/// Journal articles get a venue line (journal, Vol., No., pp.); books get
/// publisher and place.
pub fn format_item_metadata(item: &Item, include_abstract: bool) -> String {
    let data = &item.data;
    let mut lines = vec![
        format!("# {}", item.title()),
        format!("**Type:** {}", data.item_type),
        format!("**Key:** {}", item.key),
    ];

    if let Some(date) = &data.date {
        lines.push(format!("**Date:** {}", date));
    }

    if !data.creators.is_empty() {
        lines.push(format!("**Authors:** {}", format_creators(&data.creators)));
    }

    match data.item_type {
        ItemType::JournalArticle => {
            if let Some(journal) = &data.publication_title {
                let mut info = format!("**Journal:** {}", journal);
                if let Some(volume) = &data.volume {
                    info.push_str(&format!(", Vol. {}", volume));
                }
                if let Some(issue) = &data.issue {
                    info.push_str(&format!(", No. {}", issue));
                }
                if let Some(pages) = &data.pages {
                    info.push_str(&format!(", pp. {}", pages));
                }
                lines.push(info);
            }
        }
        ItemType::Book => {
            if let Some(publisher) = &data.publisher {
                let mut info = format!("**Publisher:** {}", publisher);
                if let Some(place) = &data.place {
                    info.push_str(&format!(", {}", place));
                }
                lines.push(info);
            }
        }
        _ => {}
    }

    if let Some(doi) = &data.doi {
        lines.push(format!("**DOI:** {}", doi));
    }

    if let Some(url) = &data.url {
        lines.push(format!("**URL:** {}", url));
    }

    if !data.tags.is_empty() {
        let tags: Vec<String> = data.tags.iter().map(|t| format!("`{}`", t.tag)).collect();
        lines.push(format!("**Tags:** {}", tags.join(" ")));
    }

    if include_abstract {
        if let Some(abstract_note) = &data.abstract_note {
            lines.push(String::new());
            lines.push("## Abstract".to_string());
            lines.push(abstract_note.clone());
        }
    }

    if !data.collections.is_empty() {
        lines.push(format!("**Collections:** {}", data.collections.len()));
    }

    if item.num_children() > 0 {
        lines.push(format!("**Attachments/Notes:** {}", item.num_children()));
    }

    lines.join("\n\n")
}
