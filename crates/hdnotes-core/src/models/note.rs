use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::string_or_number;
use crate::utils::strip_html;

/// Notes per dashboard page.
pub const DEFAULT_PAGE_SIZE: u32 = 6;

/// Font color the editor falls back to when a note carries none.
const DEFAULT_FONT_COLOR: &str = "#000000";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(alias = "_id", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// HTML produced by the rich-text editor.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub is_archived: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub meta: Option<NoteMeta>,
}

impl Note {
    pub fn plain_text(&self) -> String {
        strip_html(&self.content)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteMeta {
    #[serde(default)]
    pub character_count: usize,
    pub last_modified: Option<DateTime<Utc>>,
    pub font_color: Option<String>,
}

/// Body for create and save requests.
#[derive(Debug, Clone, Serialize)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub meta: NoteMeta,
}

impl NoteDraft {
    /// Build a draft, deriving the character count from the text content.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let character_count = strip_html(&content).chars().count();
        Self {
            title: title.into(),
            content,
            meta: NoteMeta {
                character_count,
                last_modified: Some(Utc::now()),
                font_color: Some(DEFAULT_FONT_COLOR.to_string()),
            },
        }
    }

    pub fn with_font_color(mut self, color: impl Into<String>) -> Self {
        self.meta.font_color = Some(color.into());
        self
    }
}

/// Query parameters for the paginated note list.
#[derive(Debug, Clone, Serialize)]
pub struct NoteQuery {
    pub page: u32,
    pub limit: u32,
    pub search: String,
    pub archived: bool,
}

impl Default for NoteQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            search: String::new(),
            archived: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePage {
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_pages: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteStats {
    #[serde(default)]
    pub total_notes: u64,
    #[serde(default)]
    pub archived_notes: u64,
    #[serde(default)]
    pub pinned_notes: u64,
    #[serde(default)]
    pub total_characters: u64,
    #[serde(default)]
    pub total_words: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_note_page() {
        let json = r#"{
            "notes": [
                {"_id":"n1","title":"Groceries","content":"<p>milk</p>","isPinned":true,
                 "isArchived":false,"createdAt":"2024-05-01T10:00:00Z","updatedAt":"2024-05-02T10:00:00Z"}
            ],
            "total": 7,
            "totalPages": 2
        }"#;
        let page: NotePage = serde_json::from_str(json).expect("parse note page");
        assert_eq!(page.total, 7);
        assert_eq!(page.total_pages, 2);
        let note = &page.notes[0];
        assert_eq!(note.id, "n1");
        assert!(note.is_pinned);
        assert!(!note.is_archived);
        assert_eq!(note.plain_text(), "milk");
    }

    #[test]
    fn test_parse_stats() {
        let json = r#"{"totalNotes":3,"archivedNotes":1,"pinnedNotes":2,"totalCharacters":120,"totalWords":25}"#;
        let stats: NoteStats = serde_json::from_str(json).expect("parse stats");
        assert_eq!(stats.total_notes, 3);
        assert_eq!(stats.total_words, 25);
    }

    #[test]
    fn test_draft_counts_text_characters_only() {
        let draft = NoteDraft::new("Title", "<b>héllo</b> <i>you</i>");
        assert_eq!(draft.meta.character_count, "héllo you".chars().count());
        assert_eq!(draft.meta.font_color.as_deref(), Some(DEFAULT_FONT_COLOR));
    }

    #[test]
    fn test_draft_serializes_camel_case_meta() {
        let draft = NoteDraft::new("T", "x").with_font_color("#ff0000");
        let value = serde_json::to_value(&draft).expect("serialize draft");
        assert_eq!(value["meta"]["characterCount"], 1);
        assert_eq!(value["meta"]["fontColor"], "#ff0000");
        assert!(value["meta"]["lastModified"].is_string());
    }

    #[test]
    fn test_default_query() {
        let query = NoteQuery::default();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, DEFAULT_PAGE_SIZE);
        assert!(!query.archived);
    }
}
