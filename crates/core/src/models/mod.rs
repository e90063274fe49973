//! Shared domain models.

use std::fmt;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a library member.
///
/// Members may be keyed by a number (e.g. `101`) or by free-form text. The two
/// forms never compare equal, so `101` and `"101"` are distinct members.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MemberId {
    /// Numeric identifier.
    Number(i64),
    /// Textual identifier.
    Text(String),
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for MemberId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for MemberId {
    fn from(value: i32) -> Self {
        Self::Number(i64::from(value))
    }
}

impl From<u32> for MemberId {
    fn from(value: u32) -> Self {
        Self::Number(i64::from(value))
    }
}

impl From<&str> for MemberId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MemberId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&MemberId> for MemberId {
    fn from(value: &MemberId) -> Self {
        value.clone()
    }
}

/// A lendable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// External identifier (e.g. an ISBN).
    pub id: String,
    /// Title of the work.
    pub title: String,
    /// Author or other creator credit.
    pub creator: String,
    /// Shelf category.
    pub category: String,
}

impl Item {
    /// Build an item from its four fields.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        creator: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            creator: creator.into(),
            category: category.into(),
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} · {} [{}] (id {})",
            self.title, self.creator, self.category, self.id
        )
    }
}

/// A registered library member.
///
/// The borrowed list is only changed by the loan ledger, so callers can read
/// it but never edit it directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Unique member identifier.
    pub id: MemberId,
    /// Display name.
    pub name: String,
    #[serde(default)]
    borrowed_item_ids: Vec<String>,
}

impl Member {
    /// Create a member holding no items.
    pub fn new(id: impl Into<MemberId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            borrowed_item_ids: Vec::new(),
        }
    }

    /// Items currently held by this member, in the order they were lent.
    pub fn borrowed_item_ids(&self) -> &[String] {
        &self.borrowed_item_ids
    }

    /// Whether the member currently holds `item_id`.
    pub fn holds(&self, item_id: &str) -> bool {
        self.borrowed_item_ids.iter().any(|held| held == item_id)
    }

    /// Whether the member holds any item at all.
    pub fn has_loans(&self) -> bool {
        !self.borrowed_item_ids.is_empty()
    }

    pub(crate) fn push_loan(&mut self, item_id: &str) {
        self.borrowed_item_ids.push(item_id.to_string());
    }

    pub(crate) fn drop_loan(&mut self, item_id: &str) {
        self.borrowed_item_ids.retain(|held| held != item_id);
    }

    pub(crate) fn clear_loans(&mut self) {
        self.borrowed_item_ids.clear();
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (id {})", self.name, self.id)?;
        if self.has_loans() {
            write!(f, " holding {}", self.borrowed_item_ids.join(", "))?;
        }
        Ok(())
    }
}

/// Availability of a single catalog item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemStatus {
    /// On the shelf and free to lend.
    #[default]
    Available,
    /// Held by the given member.
    Loaned(MemberId),
}

impl ItemStatus {
    /// Whether the item can be lent right now.
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

/// Kind of committed state change recorded in the activity log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    /// An item entered the catalog.
    ItemAdded,
    /// An item left the catalog.
    ItemRemoved,
    /// A member was registered.
    MemberRegistered,
    /// A member was unregistered.
    MemberUnregistered,
    /// An item was lent to a member.
    Loaned,
    /// An item came back from a member.
    Returned,
}

impl ActivityAction {
    /// Stable upper-case label used when rendering history lines.
    pub fn label(self) -> &'static str {
        match self {
            Self::ItemAdded => "ITEM_ADDED",
            Self::ItemRemoved => "ITEM_REMOVED",
            Self::MemberRegistered => "MEMBER_REGISTERED",
            Self::MemberUnregistered => "MEMBER_UNREGISTERED",
            Self::Loaned => "LOANED",
            Self::Returned => "RETURNED",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry in the activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// When the change was committed. Stored in UTC, displayed in local time.
    pub timestamp: DateTime<Utc>,
    /// What happened.
    pub action: ActivityAction,
    /// Member involved, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<MemberId>,
    /// Item involved, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
}

impl ActivityEvent {
    /// Stamp a new event with the current time.
    pub fn now(
        action: ActivityAction,
        member_id: Option<MemberId>,
        item_id: Option<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            action,
            member_id,
            item_id,
        }
    }
}

impl fmt::Display for ActivityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let member = self
            .member_id
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "{} | {} | member={} | item={}",
            self.timestamp
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S"),
            self.action,
            member,
            self.item_id.as_deref().unwrap_or("-")
        )
    }
}
