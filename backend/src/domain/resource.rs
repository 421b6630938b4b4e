//! Bookable resources.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ResourceId;

/// Maximum resource name length.
pub const NAME_MAX: usize = 100;
/// Maximum resource type length.
pub const KIND_MAX: usize = 50;

/// Validation errors raised while building resources.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceValidationError {
    /// Name missing or blank.
    #[error("name must not be empty")]
    EmptyName,
    /// Name too long.
    #[error("name must be at most {max} characters")]
    NameTooLong { max: usize },
    /// Type missing or blank.
    #[error("type must not be empty")]
    EmptyKind,
    /// Type too long.
    #[error("type must be at most {max} characters")]
    KindTooLong { max: usize },
    /// An update carried no fields.
    #[error("update must change at least one field")]
    EmptyUpdate,
}

fn validate_name(name: &str) -> Result<String, ResourceValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ResourceValidationError::EmptyName);
    }
    if name.chars().count() > NAME_MAX {
        return Err(ResourceValidationError::NameTooLong { max: NAME_MAX });
    }
    Ok(name.to_owned())
}

fn validate_kind(kind: &str) -> Result<String, ResourceValidationError> {
    let kind = kind.trim();
    if kind.is_empty() {
        return Err(ResourceValidationError::EmptyKind);
    }
    if kind.chars().count() > KIND_MAX {
        return Err(ResourceValidationError::KindTooLong { max: KIND_MAX });
    }
    Ok(kind.to_owned())
}

/// A bookable resource such as a room or projector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[schema(value_type = String)]
    pub id: ResourceId,
    #[schema(example = "Room 1")]
    pub name: String,
    #[serde(rename = "type")]
    #[schema(example = "room")]
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

/// Validated input for a new resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDraft {
    name: String,
    kind: String,
}

impl ResourceDraft {
    /// Validate raw resource fields.
    pub fn try_new(name: &str, kind: &str) -> Result<Self, ResourceValidationError> {
        Ok(Self {
            name: validate_name(name)?,
            kind: validate_kind(kind)?,
        })
    }

    /// Materialise the resource.
    pub fn into_resource(self, created_at: DateTime<Utc>) -> Resource {
        Resource {
            id: ResourceId::random(),
            name: self.name,
            kind: self.kind,
            created_at,
        }
    }
}

/// Validated partial update; absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceUpdate {
    name: Option<String>,
    kind: Option<String>,
}

impl ResourceUpdate {
    /// Validate the supplied fields. At least one must be present.
    pub fn try_new(
        name: Option<&str>,
        kind: Option<&str>,
    ) -> Result<Self, ResourceValidationError> {
        if name.is_none() && kind.is_none() {
            return Err(ResourceValidationError::EmptyUpdate);
        }
        Ok(Self {
            name: name.map(validate_name).transpose()?,
            kind: kind.map(validate_kind).transpose()?,
        })
    }

    /// Apply the update to `resource`.
    pub fn apply(self, mut resource: Resource) -> Resource {
        if let Some(name) = self.name {
            resource.name = name;
        }
        if let Some(kind) = self.kind {
            resource.kind = kind;
        }
        resource
    }
}
