// ABOUTME: Serde data models for Leanote API responses and Hexo frontmatter
// ABOUTME: Tolerant parsing with optional fields, null lists and flexible timestamps

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

/// Leanote sends `""` for a root notebook's parent and `null` for empty tag lists.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Vec<String>> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.and_then(|s| DateTime::parse_from_rfc3339(&s).ok()))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
}

/// Body Leanote returns with a 200 status when a call is rejected.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiFailure {
    pub ok: bool,
    #[serde(default)]
    pub msg: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Notebook {
    #[serde(rename = "NotebookId")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(
        rename = "ParentNotebookId",
        default,
        deserialize_with = "empty_as_none"
    )]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub is_blog: bool,
    #[serde(default)]
    pub seq: i64,
}

#[cfg(test)]
impl Notebook {
    pub fn new(id: &str, title: &str, parent_id: Option<&str>) -> Self {
        Notebook {
            id: id.into(),
            title: title.into(),
            parent_id: parent_id.map(Into::into),
            is_deleted: false,
            is_blog: false,
            seq: 0,
        }
    }

    pub fn deleted(mut self) -> Self {
        self.is_deleted = true;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NoteFlags {
    #[serde(default)]
    pub is_markdown: bool,
    #[serde(default)]
    pub is_blog: bool,
    #[serde(default)]
    pub is_trash: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NoteSummary {
    pub note_id: String,
    #[serde(default)]
    pub notebook_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(flatten)]
    pub flags: NoteFlags,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Note {
    pub note_id: String,
    #[serde(default)]
    pub notebook_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub flags: NoteFlags,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_time: Option<DateTime<FixedOffset>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_time: Option<DateTime<FixedOffset>>,
}

/// Hexo post header written at the top of every exported file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frontmatter {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_id: Option<String>,
}
