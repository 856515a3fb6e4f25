//! Grouped read endpoint.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use smslog_core::{Conversation, ConversationGrouper, MessageView};

use crate::error::ApiError;
use crate::state::{run_blocking, AppState};

/// Preview length used by the conversation list.
const DEFAULT_PREVIEW_CHARS: usize = 50;

#[derive(Debug, Default, Deserialize)]
pub struct ConversationQuery {
    /// Characters of the latest body to include in `preview`.
    pub preview_chars: Option<usize>,
}

/// One conversation in the list.
#[derive(Debug, Serialize)]
pub struct ConversationSummary {
    pub address: String,
    pub message_count: usize,
    pub latest_timestamp: Option<String>,
    pub preview: String,
    /// Oldest first
    pub messages: Vec<MessageView>,
}

impl ConversationSummary {
    fn new(conversation: &Conversation, preview_chars: usize) -> Self {
        Self {
            address: conversation.address.clone(),
            message_count: conversation.records.len(),
            latest_timestamp: conversation.latest().map(|r| r.timestamp.clone()),
            preview: conversation.preview(preview_chars),
            messages: conversation.records.iter().map(MessageView::from).collect(),
        }
    }
}

/// `GET /conversations`
///
/// Most recently active conversation first.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ConversationQuery>,
) -> Result<Json<Vec<ConversationSummary>>, ApiError> {
    let reader = state.reader.clone();
    let records = run_blocking(move || reader.records()).await?;

    let preview_chars = query.preview_chars.unwrap_or(DEFAULT_PREVIEW_CHARS);
    let summaries = ConversationGrouper::new()
        .group(records)
        .iter()
        .map(|c| ConversationSummary::new(c, preview_chars))
        .collect();

    Ok(Json(summaries))
}
