//! BibTeX citation generation.

use crate::error::{Result, ZoteroError};
use crate::format::extract_year;
use crate::types::{Item, ItemType};

/// Map a Zotero item type to its BibTeX entry type. Unmapped types fall
/// back to `misc`.
fn bibtex_type(item_type: &ItemType) -> &'static str {
    match item_type {
        ItemType::JournalArticle => "article",
        ItemType::Book => "book",
        ItemType::BookSection => "incollection",
        ItemType::ConferencePaper => "inproceedings",
        ItemType::Thesis => "phdthesis",
        ItemType::Report => "techreport",
        ItemType::Webpage => "misc",
        ItemType::Manuscript => "unpublished",
        _ => "misc",
    }
}

/// Escape literal braces in a field value.
fn escape_braces(value: &str) -> String {
    value.replace('{', "\\{").replace('}', "\\}")
}

/// Generate a BibTeX entry for an item.
///
/// Attachments and notes have no bibliographic identity and are rejected.
/// The citation key is `<firstAuthorLastName><year>_<itemKey>`; a date with
/// no recognizable year contributes the token "nodate" to the key, and the
/// `year` field is then omitted from the entry body. With `slim` set, long
/// free-text fields (the abstract) are left out to bound output size.
pub fn generate_bibtex(item: &Item, slim: bool) -> Result<String> {
    let data = &item.data;

    if data.item_type.is_non_bibliographic() {
        return Err(ZoteroError::UnsupportedItemType(
            data.item_type.to_string(),
        ));
    }

    // First creator's last name, spaces removed; organizational names
    // contribute their final word.
    let author_part = data
        .creators
        .first()
        .map(|c| {
            c.last_name.clone().unwrap_or_else(|| {
                c.name
                    .as_deref()
                    .and_then(|n| n.split_whitespace().last())
                    .unwrap_or("")
                    .to_string()
            })
        })
        .unwrap_or_default()
        .replace(' ', "");

    let year = extract_year(data.date.as_deref().unwrap_or(""));
    let cite_key = format!("{}{}_{}", author_part, year, item.key);

    let mut lines = vec![format!("@{}{{{},", bibtex_type(&data.item_type), cite_key)];

    let mut fields: Vec<(&str, Option<&String>)> = vec![
        ("title", data.title.as_ref()),
        ("journal", data.publication_title.as_ref()),
        ("volume", data.volume.as_ref()),
        ("number", data.issue.as_ref()),
        ("pages", data.pages.as_ref()),
        ("publisher", data.publisher.as_ref()),
        ("doi", data.doi.as_ref()),
        ("url", data.url.as_ref()),
    ];
    if !slim {
        fields.push(("abstract", data.abstract_note.as_ref()));
    }

    for (name, value) in fields {
        if let Some(value) = value {
            if !value.is_empty() {
                lines.push(format!("  {} = {{{}}},", name, escape_braces(value)));
            }
        }
    }

    // Only creators with the author role become citation authors.
    let authors: Vec<String> = data
        .creators
        .iter()
        .filter(|c| c.is_author())
        .filter_map(|c| match (&c.last_name, &c.first_name, &c.name) {
            (Some(last), Some(first), _) => Some(format!("{}, {}", last, first)),
            (_, _, Some(name)) => Some(name.clone()),
            _ => None,
        })
        .collect();
    if !authors.is_empty() {
        lines.push(format!(
            "  author = {{{}}},",
            escape_braces(&authors.join(" and "))
        ));
    }

    if year != "nodate" {
        lines.push(format!("  year = {{{}}},", year));
    }

    // Strip the trailing comma from the final field.
    if let Some(last) = lines.last_mut() {
        if last.ends_with(',') {
            last.pop();
        }
    }
    lines.push("}".to_string());

    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Creator, ItemData};

    fn author(first: &str, last: &str) -> Creator {
        Creator {
            creator_type: Some("author".to_string()),
            first_name: Some(first.to_string()),
            last_name: Some(last.to_string()),
            name: None,
        }
    }

    fn article() -> Item {
        Item {
            key: "ABCD1234".to_string(),
            version: None,
            meta: None,
            data: ItemData {
                item_type: ItemType::JournalArticle,
                title: Some("On the {Curious} Matter".to_string()),
                date: Some("2023-05-01".to_string()),
                publication_title: Some("ApJ".to_string()),
                abstract_note: Some("Long abstract.".to_string()),
                creators: vec![
                    author("Jane", "Doe"),
                    author("John", "Smith"),
                    Creator {
                        creator_type: Some("editor".to_string()),
                        first_name: Some("Ed".to_string()),
                        last_name: Some("Itor".to_string()),
                        name: None,
                    },
                ],
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_article_entry() {
        let bibtex = generate_bibtex(&article(), true).unwrap();
        assert!(bibtex.starts_with("@article{Doe2023_ABCD1234,"));
        // Braces in field values are escaped.
        assert!(bibtex.contains("title = {On the \\{Curious\\} Matter}"));
        // Editors are not citation authors.
        assert!(bibtex.contains("author = {Doe, Jane and Smith, John}"));
        assert!(bibtex.contains("year = {2023}"));
        assert!(bibtex.ends_with("}"));
        // slim drops the abstract.
        assert!(!bibtex.contains("abstract"));

        let full = generate_bibtex(&article(), false).unwrap();
        assert!(full.contains("abstract = {Long abstract.}"));
    }

    #[test]
    fn test_attachment_and_note_rejected() {
        for item_type in [ItemType::Attachment, ItemType::Note] {
            let item = Item {
                key: "K".to_string(),
                version: None,
                meta: None,
                data: ItemData {
                    item_type,
                    ..Default::default()
                },
            };
            assert!(matches!(
                generate_bibtex(&item, true),
                Err(ZoteroError::UnsupportedItemType(_))
            ));
        }
    }

    #[test]
    fn test_nodate_key_and_omitted_year() {
        let mut item = article();
        item.data.date = None;
        let bibtex = generate_bibtex(&item, true).unwrap();
        assert!(bibtex.starts_with("@article{Doenodate_ABCD1234,"));
        assert!(!bibtex.contains("year ="));
        assert!(!bibtex.contains("{nodate}"));
    }

    #[test]
    fn test_organizational_author_key_and_entry() {
        let mut item = article();
        item.data.creators = vec![Creator {
            creator_type: Some("author".to_string()),
            first_name: None,
            last_name: None,
            name: Some("ATLAS Collaboration".to_string()),
        }];
        let bibtex = generate_bibtex(&item, true).unwrap();
        // Key uses the final word of the organizational name.
        assert!(bibtex.starts_with("@article{Collaboration2023_ABCD1234,"));
        assert!(bibtex.contains("author = {ATLAS Collaboration}"));
    }

    #[test]
    fn test_unmapped_type_falls_back_to_misc() {
        let mut item = article();
        item.data.item_type = ItemType::Other("podcast".to_string());
        let bibtex = generate_bibtex(&item, true).unwrap();
        assert!(bibtex.starts_with("@misc{"));
    }

    #[test]
    fn test_no_creators_key_has_no_author_part() {
        let mut item = article();
        item.data.creators.clear();
        let bibtex = generate_bibtex(&item, true).unwrap();
        assert!(bibtex.starts_with("@article{2023_ABCD1234,"));
    }
}
