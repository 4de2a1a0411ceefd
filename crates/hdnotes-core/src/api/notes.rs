//! Notes endpoints. All of them require a signed-in session.

use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, info};

use super::client::{DataEnvelope, MessageResponse};
use super::{ApiClient, ApiError, ApiResult};
use crate::models::{Note, NoteDraft, NoteMeta, NotePage, NoteQuery, NoteStats};

/// `getnote` may put the editor metadata next to `data` instead of inside it.
#[derive(Debug, Deserialize)]
struct NoteResponse {
    data: Note,
    #[serde(default)]
    meta: Option<NoteMeta>,
}

impl NoteResponse {
    fn into_note(self) -> Note {
        let mut note = self.data;
        if note.meta.is_none() {
            note.meta = self.meta;
        }
        note
    }
}

impl ApiClient {
    /// Fetch one page of notes matching `query`.
    pub async fn list_notes(&self, query: &NoteQuery) -> ApiResult<NotePage> {
        let request = self
            .protected(Method::GET, "notes/get-notes")
            .query(query);
        let envelope: DataEnvelope<NotePage> = self.send_json(request).await?;
        debug!(
            page = query.page,
            count = envelope.data.notes.len(),
            total = envelope.data.total,
            "Fetched notes"
        );
        Ok(envelope.data)
    }

    pub async fn note_stats(&self) -> ApiResult<NoteStats> {
        let envelope: DataEnvelope<NoteStats> = self
            .send_json(self.protected(Method::GET, "notes/stats"))
            .await?;
        Ok(envelope.data)
    }

    pub async fn get_note(&self, id: &str) -> ApiResult<Note> {
        let path = format!("notes/getnote/{}", id);
        let response: NoteResponse = self.send_json(self.protected(Method::GET, &path)).await?;
        Ok(response.into_note())
    }

    pub async fn create_note(&self, draft: &NoteDraft) -> ApiResult<String> {
        check_title(draft)?;
        let response: MessageResponse = self
            .send_json(self.protected(Method::POST, "notes/create").json(draft))
            .await?;
        info!(title = %draft.title, "Note created");
        Ok(or_default(response.message, "Note created successfully"))
    }

    pub async fn save_note(&self, id: &str, draft: &NoteDraft) -> ApiResult<String> {
        check_title(draft)?;
        let path = format!("notes/save/{}", id);
        let response: MessageResponse = self
            .send_json(self.protected(Method::PUT, &path).json(draft))
            .await?;
        info!(id = %id, "Note saved");
        Ok(or_default(response.message, "Note updated successfully"))
    }

    pub async fn delete_note(&self, id: &str) -> ApiResult<String> {
        let path = format!("notes/delete-note/{}", id);
        let response: MessageResponse = self.send_json(self.protected(Method::DELETE, &path)).await?;
        info!(id = %id, "Note deleted");
        Ok(or_default(response.message, "Note deleted successfully"))
    }

    /// Flip the archived flag. Returns the server's description of the change.
    pub async fn toggle_archive(&self, id: &str) -> ApiResult<String> {
        let path = format!("notes/{}/archive", id);
        let response: MessageResponse = self.send_json(self.protected(Method::PATCH, &path)).await?;
        Ok(or_default(response.message, "Archive state updated"))
    }

    /// Flip the pinned flag. Returns the server's description of the change.
    pub async fn toggle_pin(&self, id: &str) -> ApiResult<String> {
        let path = format!("notes/{}/pin", id);
        let response: MessageResponse = self.send_json(self.protected(Method::PATCH, &path)).await?;
        Ok(or_default(response.message, "Pin state updated"))
    }
}

fn check_title(draft: &NoteDraft) -> ApiResult<()> {
    if draft.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Please enter a title for your note".to_string()));
    }
    Ok(())
}

fn or_default(message: String, default: &str) -> String {
    if message.is_empty() {
        default.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_meta_is_merged() {
        let json = r##"{
            "data": {"_id": "n1", "title": "Plan", "content": "<p>x</p>"},
            "meta": {"characterCount": 1, "fontColor": "#ff0000"}
        }"##;
        let response: NoteResponse = serde_json::from_str(json).unwrap();
        let note = response.into_note();
        assert_eq!(note.id, "n1");
        let meta = note.meta.unwrap();
        assert_eq!(meta.font_color.as_deref(), Some("#ff0000"));
        assert_eq!(meta.character_count, 1);
    }

    #[test]
    fn test_inline_meta_wins() {
        let json = r##"{
            "data": {"_id": "n1", "title": "Plan", "meta": {"characterCount": 4, "fontColor": "#00ff00"}},
            "meta": {"characterCount": 1, "fontColor": "#ff0000"}
        }"##;
        let note = serde_json::from_str::<NoteResponse>(json).unwrap().into_note();
        assert_eq!(note.meta.unwrap().font_color.as_deref(), Some("#00ff00"));
    }

    #[tokio::test]
    async fn test_blank_title_rejected_before_sending() {
        // Unroutable base URL: reaching the network would fail differently.
        let api = ApiClient::new("http://127.0.0.1:9/api").unwrap();
        let err = api.create_note(&NoteDraft::new("   ", "body")).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        let err = api.save_note("n1", &NoteDraft::new("", "body")).await.unwrap_err();
        assert_eq!(err.server_message(), Some("Please enter a title for your note"));
    }

    #[test]
    fn test_or_default() {
        assert_eq!(or_default(String::new(), "fallback"), "fallback");
        assert_eq!(or_default("Note pinned".into(), "fallback"), "Note pinned");
    }
}
