use serde::{Deserialize, Serialize};

/// A task nested under a goal, as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Server-assigned identifier
    pub id: i64,
    /// Owning goal
    pub goal_id: i64,
    pub title: String,
    #[serde(deserialize_with = "bool_or_int")]
    pub is_done: bool,
    /// Server-assigned creation timestamp (ISO-8601)
    pub created_at: String,
}

/// Body of `POST /goals/{id}/tasks`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCreate {
    pub title: String,
}

/// Body of `PUT /tasks/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_done: Option<bool>,
}

/// The back-end stores `is_done` as an integer column; accept `0`/`1` as well
/// as real booleans.
fn bool_or_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(n) => n != 0,
    })
}
