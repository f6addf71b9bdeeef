use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// What kind of surface the request is ranking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UseCase {
    Custom,
    Search,
    SearchSuggestions,
    Feed,
    RelatedContent,
    CloseUp,
    CategoryContent,
    MyContent,
    MySavedContent,
    SellerContent,
    Discover,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub anon_user_id: String,
}

impl UserInfo {
    #[must_use]
    pub fn anonymous(anon_user_id: impl Into<String>) -> Self {
        Self {
            user_id: None,
            anon_user_id: anon_user_id.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    pub offset: u32,
    pub size: u32,
}

impl Paging {
    #[must_use]
    pub const fn new(offset: u32, size: u32) -> Self {
        Self { offset, size }
    }
}

/// Free-form key/value properties, wrapped the way the services expect
/// (`{"struct": {...}}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    #[serde(rename = "struct", default)]
    pub fields: Map<String, Value>,
}

impl Properties {
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    /// Milliseconds since the Unix epoch, stamped by the client.
    pub client_log_timestamp: i64,
}

/// One candidate item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insertion {
    pub content_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieval_rank: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insertion_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
}

impl Insertion {
    #[must_use]
    pub fn new(content_id: impl Into<String>, retrieval_rank: u32) -> Self {
        Self {
            content_id: content_id.into(),
            retrieval_rank: Some(retrieval_rank),
            insertion_id: None,
            position: None,
            properties: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub user_info: UserInfo,
    pub use_case: UseCase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
    pub paging: Paging,
    #[serde(default)]
    pub disable_personalization: bool,
    #[serde(default)]
    pub insertion: Vec<Insertion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<Timing>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("request must carry a user id or anonymous user id")]
    MissingUser,
    #[error("paging size must be greater than zero")]
    ZeroPageSize,
    #[error("request has no insertions")]
    NoInsertions,
    #[error("insertion {index} has an empty content id")]
    EmptyContentId { index: usize },
}

impl Request {
    #[must_use]
    pub fn new(user_info: UserInfo, use_case: UseCase, paging: Paging) -> Self {
        Self {
            user_info,
            use_case,
            search_query: None,
            paging,
            disable_personalization: false,
            insertion: Vec::new(),
            properties: None,
            client_request_id: None,
            timing: None,
        }
    }

    #[must_use]
    pub fn with_search_query(mut self, query: impl Into<String>) -> Self {
        self.search_query = Some(query.into());
        self
    }

    pub fn add_insertion(&mut self, insertion: Insertion) {
        self.insertion.push(insertion);
    }

    pub fn validate(&self) -> Result<(), RequestError> {
        let has_user_id = self
            .user_info
            .user_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty());
        if !has_user_id && self.user_info.anon_user_id.trim().is_empty() {
            return Err(RequestError::MissingUser);
        }
        if self.paging.size == 0 {
            return Err(RequestError::ZeroPageSize);
        }
        if self.insertion.is_empty() {
            return Err(RequestError::NoInsertions);
        }
        if let Some(index) = self
            .insertion
            .iter()
            .position(|insertion| insertion.content_id.trim().is_empty())
        {
            return Err(RequestError::EmptyContentId { index });
        }
        Ok(())
    }
}
