//! Lobby chat.
//!
//! Append-only and scoped to one session. There is no edit, no delete,
//! and no per-message access control.

use std::sync::Arc;

use imposter_directory::SessionDirectory;
use imposter_protocol::{ChatMessageView, Slug};
use imposter_store::{GameStore, MessageRow, NewMessage};
use rand::RngCore;

use crate::{GameConfig, GameError};

fn view(row: MessageRow) -> ChatMessageView {
    ChatMessageView {
        id: row.id,
        sender: row.sender,
        body: row.body,
        created_at: row.created_at,
    }
}

/// Posts and lists chat messages for a session.
pub struct LobbyMessaging<S, R> {
    store: Arc<S>,
    directory: SessionDirectory<S, R>,
    config: GameConfig,
}

impl<S, R> Clone for LobbyMessaging<S, R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            directory: self.directory.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S, R> LobbyMessaging<S, R>
where
    S: GameStore,
    R: RngCore + Send + 'static,
{
    pub fn new(store: Arc<S>, directory: SessionDirectory<S, R>, config: GameConfig) -> Self {
        Self {
            store,
            directory,
            config,
        }
    }

    /// Appends a message. A missing or blank sender becomes the default
    /// label.
    ///
    /// # Errors
    /// [`GameError::Validation`] for a blank or overlong body, or an
    /// overlong sender.
    pub async fn post(
        &self,
        slug: &Slug,
        sender: Option<&str>,
        body: &str,
    ) -> Result<ChatMessageView, GameError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(GameError::Validation("message body is required".into()));
        }
        if body.chars().count() > self.config.max_message_body_len {
            return Err(GameError::Validation(format!(
                "message longer than {} characters",
                self.config.max_message_body_len
            )));
        }

        let sender = match sender.map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => self.config.default_sender.as_str(),
        };
        if sender.chars().count() > self.config.max_sender_len {
            return Err(GameError::Validation(format!(
                "sender longer than {} characters",
                self.config.max_sender_len
            )));
        }

        let session = self.directory.session(slug).await?;
        let row = self
            .store
            .append_message(NewMessage {
                session_id: session.id,
                sender: sender.to_string(),
                body: body.to_string(),
            })
            .await?;

        tracing::debug!(session_id = %session.id, message_id = %row.id, "message posted");
        Ok(view(row))
    }

    /// The newest messages, oldest first.
    pub async fn list(&self, slug: &Slug) -> Result<Vec<ChatMessageView>, GameError> {
        let session = self.directory.session(slug).await?;
        let rows = self
            .store
            .recent_messages(session.id, self.config.message_window)
            .await?;
        Ok(rows.into_iter().map(view).collect())
    }
}
