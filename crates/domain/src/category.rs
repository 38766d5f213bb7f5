use std::fmt::{Display, Formatter};
use std::str::FromStr;

use agora_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Positive category identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct CategoryId(u64);

impl CategoryId {
    /// Creates a category identifier. Zero is reserved for the site-wide scope.
    pub fn new(value: u64) -> AppResult<Self> {
        if value == 0 {
            return Err(AppError::Validation(
                "category id must be a positive integer".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the raw numeric value.
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for CategoryId {
    type Error = AppError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CategoryId> for u64 {
    fn from(value: CategoryId) -> Self {
        value.0
    }
}

impl FromStr for CategoryId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parsed = value.trim().parse::<u64>().map_err(|_| {
            AppError::Validation(format!("category id '{value}' is not a positive integer"))
        })?;
        Self::new(parsed)
    }
}

impl Display for CategoryId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Forum category record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    cid: CategoryId,
    name: NonEmptyString,
    description: String,
    slug: String,
    parent_cid: Option<CategoryId>,
    order: i64,
    disabled: bool,
}

impl Category {
    /// Creates a validated category. The slug is derived from id and name.
    pub fn new(
        cid: CategoryId,
        name: impl Into<String>,
        description: impl Into<String>,
        parent_cid: Option<CategoryId>,
        order: i64,
        disabled: bool,
    ) -> AppResult<Self> {
        if parent_cid == Some(cid) {
            return Err(AppError::Validation(format!(
                "category '{cid}' cannot be its own parent"
            )));
        }

        let name = NonEmptyString::new(name)?;
        let slug = category_slug(cid, name.as_str());

        Ok(Self {
            cid,
            name,
            description: description.into(),
            slug,
            parent_cid,
            order,
            disabled,
        })
    }

    /// Returns the category identifier.
    #[must_use]
    pub fn cid(&self) -> CategoryId {
        self.cid
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the description text.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the URL slug in `{cid}/{name}` form.
    #[must_use]
    pub fn slug(&self) -> &str {
        self.slug.as_str()
    }

    /// Returns the parent category, if nested.
    #[must_use]
    pub fn parent_cid(&self) -> Option<CategoryId> {
        self.parent_cid
    }

    /// Returns the sibling sort order.
    #[must_use]
    pub fn order(&self) -> i64 {
        self.order
    }

    /// Returns whether the category is hidden from navigation.
    #[must_use]
    pub fn disabled(&self) -> bool {
        self.disabled
    }

    /// Returns a copy with the provided changes applied and re-validated.
    pub fn apply_changes(&self, changes: &CategoryChanges) -> AppResult<Self> {
        let parent_cid = match changes.parent_cid {
            Some(0) => None,
            Some(value) => Some(CategoryId::new(value)?),
            None => self.parent_cid,
        };

        Self::new(
            self.cid,
            changes
                .name
                .clone()
                .unwrap_or_else(|| self.name.as_str().to_owned()),
            changes
                .description
                .clone()
                .unwrap_or_else(|| self.description.clone()),
            parent_cid,
            changes.order.unwrap_or(self.order),
            changes.disabled.unwrap_or(self.disabled),
        )
    }
}

/// Partial category modification. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryChanges {
    /// New display name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New parent id; `0` moves the category to the root.
    pub parent_cid: Option<u64>,
    /// New sort order.
    pub order: Option<i64>,
    /// New disabled flag.
    pub disabled: Option<bool>,
}

impl CategoryChanges {
    /// Returns whether no field would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.parent_cid.is_none()
            && self.order.is_none()
            && self.disabled.is_none()
    }
}

fn category_slug(cid: CategoryId, name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for character in name.trim().chars().flat_map(char::to_lowercase) {
        if character.is_alphanumeric() {
            slug.push(character);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        return cid.to_string();
    }

    format!("{cid}/{slug}")
}
