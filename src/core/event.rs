use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque payload carried by every event on the bus.
pub type EventData = Value;

pub const LOAD_PROJECT_NOTIFICATION: &str = "EditorLoadProjectNotification";
pub const CLOSE_PROJECT: &str = "EditorCloseProject";
pub const PLAYER_START_REQUEST: &str = "EditorPlayerStartRequest";
pub const SAVE_RESOURCE_NOTIFICATION: &str = "EditorSaveResourceNotification";
pub const DELETE_RESOURCE_NOTIFICATION: &str = "EditorDeleteResourceNotification";
pub const RENAME_RESOURCE_NOTIFICATION: &str = "EditorRenameResourceNotification";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadProjectEvent {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResourceEvent {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResourceEvent {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameResourceEvent {
    pub path: String,
    #[serde(alias = "new_path")]
    pub new_path: String,
    #[serde(default, alias = "new_name")]
    pub new_name: String,
}

/// Lifecycle notifications the host publishes on behalf of the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    LoadProject(LoadProjectEvent),
    CloseProject,
    PlayerStartRequest,
    SaveResource(SaveResourceEvent),
    DeleteResource(DeleteResourceEvent),
    RenameResource(RenameResourceEvent),
}

impl HostEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            HostEvent::LoadProject(_) => LOAD_PROJECT_NOTIFICATION,
            HostEvent::CloseProject => CLOSE_PROJECT,
            HostEvent::PlayerStartRequest => PLAYER_START_REQUEST,
            HostEvent::SaveResource(_) => SAVE_RESOURCE_NOTIFICATION,
            HostEvent::DeleteResource(_) => DELETE_RESOURCE_NOTIFICATION,
            HostEvent::RenameResource(_) => RENAME_RESOURCE_NOTIFICATION,
        }
    }

    pub fn to_data(&self) -> EventData {
        let data = match self {
            HostEvent::LoadProject(ev) => serde_json::to_value(ev),
            HostEvent::SaveResource(ev) => serde_json::to_value(ev),
            HostEvent::DeleteResource(ev) => serde_json::to_value(ev),
            HostEvent::RenameResource(ev) => serde_json::to_value(ev),
            HostEvent::CloseProject | HostEvent::PlayerStartRequest => Ok(Value::Null),
        };
        // Plain string structs cannot fail to serialize.
        data.unwrap_or(Value::Null)
    }

    /// Rebuilds a typed event from a bus key and payload. Unknown keys yield
    /// `Ok(None)`.
    pub fn from_data(
        event_type: &str,
        data: &EventData,
    ) -> Result<Option<Self>, serde_json::Error> {
        let ev = match event_type {
            LOAD_PROJECT_NOTIFICATION => HostEvent::LoadProject(parse_payload(data)?),
            CLOSE_PROJECT => HostEvent::CloseProject,
            PLAYER_START_REQUEST => HostEvent::PlayerStartRequest,
            SAVE_RESOURCE_NOTIFICATION => HostEvent::SaveResource(parse_payload(data)?),
            DELETE_RESOURCE_NOTIFICATION => HostEvent::DeleteResource(parse_payload(data)?),
            RENAME_RESOURCE_NOTIFICATION => HostEvent::RenameResource(parse_payload(data)?),
            _ => return Ok(None),
        };
        Ok(Some(ev))
    }
}

pub fn parse_payload<T: DeserializeOwned>(data: &EventData) -> Result<T, serde_json::Error> {
    T::deserialize(data)
}

#[cfg(test)]
#[path = "../../tests/unit/core/event.rs"]
mod tests;
