//! Workspace-scoped change notifications.
//!
//! A [`ChangeEvent`] is built by the HTTP layer after a mutation succeeds and
//! handed to the broadcaster, which fans it out to live subscribers of the
//! same workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::WorkspaceId;

/// Mutation kinds carried in the event type suffix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeAction {
    /// Entity created.
    Created,
    /// Entity updated.
    Updated,
    /// Entity deleted.
    Deleted,
    /// Item or inventory archived.
    Archived,
    /// Item restored from the archive.
    Restored,
    /// Attachment promoted to primary.
    PrimarySet,
    /// Inventory moved between places.
    Moved,
    /// Label attached to an item.
    LabelAdded,
    /// Label detached from an item.
    LabelRemoved,
    /// Loan returned.
    Returned,
    /// Loan due date extended.
    Extended,
}

impl ChangeAction {
    /// Wire form of the action.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::Archived => "archived",
            Self::Restored => "restored",
            Self::PrimarySet => "primary_set",
            Self::Moved => "moved",
            Self::LabelAdded => "label_added",
            Self::LabelRemoved => "label_removed",
            Self::Returned => "returned",
            Self::Extended => "extended",
        }
    }
}

/// A change that live UI listeners of a workspace should hear about.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// `"<entity>.<action>"`, e.g. `"attachment.primary_set"`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Entity kind, e.g. `"attachment"`.
    pub entity_type: String,
    /// ID of the entity that changed.
    pub entity_id: String,
    /// Workspace the entity belongs to.
    pub workspace_id: WorkspaceId,
    /// Optional payload (usually the serialized entity).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// When the change was published.
    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    /// Build an event stamped with the current time.
    pub fn new(
        workspace_id: &WorkspaceId,
        entity_type: &str,
        action: ChangeAction,
        entity_id: impl ToString,
    ) -> Self {
        Self {
            event_type: format!("{entity_type}.{}", action.as_str()),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            workspace_id: workspace_id.clone(),
            data: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach a serialized payload. Serialization failures leave `data` empty.
    #[must_use]
    pub fn with_data<T: Serialize>(mut self, data: &T) -> Self {
        self.data = serde_json::to_value(data).ok();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_combines_entity_and_action() {
        let ws = WorkspaceId::from("ws-1");
        let event = ChangeEvent::new(&ws, "attachment", ChangeAction::PrimarySet, "att-1");
        assert_eq!(event.event_type, "attachment.primary_set");
        assert_eq!(event.entity_type, "attachment");
        assert_eq!(event.entity_id, "att-1");
        assert_eq!(event.workspace_id, ws);
        assert!(event.data.is_none());
    }

    #[test]
    fn serializes_type_field() {
        let ws = WorkspaceId::from("ws-1");
        let event = ChangeEvent::new(&ws, "label", ChangeAction::Created, "lbl-1")
            .with_data(&serde_json::json!({"name": "fragile"}));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "label.created");
        assert_eq!(json["workspace_id"], "ws-1");
        assert_eq!(json["data"]["name"], "fragile");
    }

    #[test]
    fn data_is_omitted_when_absent() {
        let ws = WorkspaceId::from("ws-1");
        let event = ChangeEvent::new(&ws, "loan", ChangeAction::Returned, "loan-1");
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("data").is_none());
    }
}
