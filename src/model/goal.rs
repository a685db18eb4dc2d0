use serde::{Deserialize, Deserializer, Serialize};

/// Minimum title length (in characters, after trimming) accepted for goals
pub const MIN_TITLE_LEN: usize = 3;
/// Longest goal title the API accepts
pub const MAX_GOAL_TITLE_LEN: usize = 100;
/// Longest goal description the API accepts
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// A goal as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    /// Server-assigned identifier
    pub id: i64,
    pub title: String,
    /// Free-form details; `None` when the goal has no description
    #[serde(default, deserialize_with = "blank_as_none")]
    pub description: Option<String>,
    /// Server-assigned creation timestamp (ISO-8601)
    pub created_at: String,
}

/// Body of `POST /goals`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalCreate {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body of `PUT /goals/{id}`.
///
/// `description` is tri-state: omitted (`None`), explicitly cleared
/// (`Some(None)`, sent as JSON `null`), or replaced (`Some(Some(..))`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GoalUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
}

/// Trim a description; an empty result means "no description".
pub fn normalize_description(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// A blank description from the server reads as absent.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|d| !d.trim().is_empty()))
}

/// Whether a title meets the minimum length once trimmed.
pub fn title_is_valid(title: &str) -> bool {
    title.trim().chars().count() >= MIN_TITLE_LEN
}
