//! Conversation state and turn records.
//!
//! The transcript is an explicit, append-only object owned by the host
//! and passed into the engine each turn — no ambient session storage.
//! Turns are immutable once appended.

pub mod engine;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dataset::PropertyRecord;
use crate::filters::FilterSet;

/// Seed message for a fresh conversation.
pub const GREETING: &str = "Hello! How can I help you find your dream home today?";

/// Polite reply when the general-chat collaborator call fails.
pub const GENERAL_FALLBACK_MESSAGE: &str =
    "I'm having a little trouble responding right now — please try again in a moment.";

/// Reply for search turns when the property dataset could not be loaded.
pub const DATASET_UNAVAILABLE_MESSAGE: &str =
    "I'm sorry, the property data is currently unavailable, so I can't run a search right now. \
     I'm still happy to chat!";

pub const GENERAL_CHAT_PROMPT: &str = r#"You are a friendly real estate assistant chatting with a user.
Reply to the latest user message in 1-3 sentences. If the conversation drifts far from property search,
gently steer it back by mentioning you can help find properties."#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Display-ready projection of a matched property, owned by the turn it
/// is attached to (records themselves are only borrowed for one turn).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyCard {
    pub project_name: String,
    pub landmark: String,
    pub pincode: Option<u32>,
    pub bhk: Option<f64>,
    pub balcony: Option<f64>,
    pub bathrooms: Option<f64>,
    pub possession_status: String,
    pub price_formatted: String,
}

impl From<&PropertyRecord> for PropertyCard {
    fn from(record: &PropertyRecord) -> Self {
        PropertyCard {
            project_name: record.project_name.clone(),
            landmark: record.landmark.clone(),
            pincode: record.pincode,
            bhk: record.bhk,
            balcony: record.balcony,
            bathrooms: record.bathrooms,
            possession_status: record.possession_status.clone(),
            price_formatted: record.price_formatted.clone(),
        }
    }
}

/// One message in the transcript. Filters and cards are attached only to
/// assistant turns; `filters` records the set resolved as of that turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<FilterSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<PropertyCard>>,
}

impl Turn {
    pub fn user(content: String) -> Self {
        Turn {
            role: Role::User,
            content,
            timestamp: Utc::now(),
            filters: None,
            cards: None,
        }
    }

    pub fn assistant(content: String) -> Self {
        Turn {
            role: Role::Assistant,
            content,
            timestamp: Utc::now(),
            filters: None,
            cards: None,
        }
    }
}

/// Append-only transcript for one conversation. The host owns storage and
/// lifetime; nothing here persists across process restarts. Conversations
/// are fully isolated — no state is shared between two of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    turns: Vec<Turn>,
}

impl ConversationState {
    /// Fresh conversation, seeded with the assistant greeting.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            turns: vec![Turn::assistant(GREETING.to_string())],
        }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last_turn(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// The most recently resolved filter set, scanning backward over
    /// assistant turns. Empty filters for a fresh conversation.
    pub fn last_filters(&self) -> FilterSet {
        self.turns
            .iter()
            .rev()
            .find_map(|t| t.filters.clone())
            .unwrap_or_default()
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_conversation_is_seeded_with_greeting() {
        let state = ConversationState::new();
        assert_eq!(state.turns().len(), 1);
        assert_eq!(state.turns()[0].role, Role::Assistant);
        assert_eq!(state.turns()[0].content, GREETING);
    }

    #[test]
    fn test_last_filters_empty_for_fresh_conversation() {
        assert!(ConversationState::new().last_filters().is_empty());
    }

    #[test]
    fn test_last_filters_scans_backward_past_unfiltered_turns() {
        let mut state = ConversationState::new();
        state.push(Turn::user("2 bhk in pune".to_string()));

        let mut search_reply = Turn::assistant("Found some.".to_string());
        search_reply.filters = Some(FilterSet {
            city: Some("Pune".to_string()),
            bhk_list: vec![2],
            ..Default::default()
        });
        state.push(search_reply);

        state.push(Turn::user("thanks!".to_string()));
        state.push(Turn::assistant("You're welcome!".to_string()));

        let filters = state.last_filters();
        assert_eq!(filters.city.as_deref(), Some("Pune"));
        assert_eq!(filters.bhk_list, vec![2]);
    }

    #[test]
    fn test_card_projection_from_record() {
        let record = PropertyRecord {
            project_name: "Green Acres".to_string(),
            landmark: "Hinjewadi".to_string(),
            pincode: Some(411057),
            bhk: Some(2.0),
            price_formatted: "₹1.1 Cr".to_string(),
            possession_status: "Ready to Move".to_string(),
            ..Default::default()
        };
        let card = PropertyCard::from(&record);
        assert_eq!(card.project_name, "Green Acres");
        assert_eq!(card.pincode, Some(411057));
        assert_eq!(card.price_formatted, "₹1.1 Cr");
    }
}
