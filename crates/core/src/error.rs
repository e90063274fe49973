//! Error types returned by library operations.

use std::fmt;

use thiserror::Error;

use crate::models::MemberId;

/// Which collection an identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    /// Catalog item.
    Item,
    /// Registered member.
    Member,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Item => f.write_str("item"),
            Entity::Member => f.write_str("member"),
        }
    }
}

/// Fieldless discriminant of [`LibraryError`], convenient for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ErrorKind {
    DuplicateId,
    NotFound,
    ItemOnLoan,
    HasActiveLoans,
    AlreadyLoaned,
    AlreadyHeldByMember,
    NotOnLoan,
    WrongBorrower,
    ItemNotFound,
    MemberNotFound,
    InvalidSnapshot,
}

/// A rejected library operation.
///
/// Every variant is an expected, recoverable condition. The operation that
/// produced it left all collections untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LibraryError {
    /// The identifier is already taken.
    #[error("{entity} with id {id} already exists")]
    DuplicateId {
        /// Collection that rejected the insert.
        entity: Entity,
        /// Offending identifier.
        id: String,
    },

    /// The identifier is unknown to the collection being modified.
    #[error("no {entity} with id {id}")]
    NotFound {
        /// Collection that was searched.
        entity: Entity,
        /// Missing identifier.
        id: String,
    },

    /// The item cannot leave the catalog while it is lent out.
    #[error("item {item_id} is on loan to member {borrower}")]
    ItemOnLoan {
        /// Item that was to be removed.
        item_id: String,
        /// Member currently holding it.
        borrower: MemberId,
    },

    /// The member still holds items and cannot be unregistered.
    #[error("member {member_id} still holds {}", .items.join(", "))]
    HasActiveLoans {
        /// Member that was to be unregistered.
        member_id: MemberId,
        /// Items still held.
        items: Vec<String>,
    },

    /// The item is already lent out.
    #[error("item {item_id} is already on loan to member {borrower}")]
    AlreadyLoaned {
        /// Requested item.
        item_id: String,
        /// Member currently holding it.
        borrower: MemberId,
    },

    /// The member's own list already records the item.
    #[error("member {member_id} already holds item {item_id}")]
    AlreadyHeldByMember {
        /// Requested item.
        item_id: String,
        /// Member whose list already contains it.
        member_id: MemberId,
    },

    /// The item has no active loan to close.
    #[error("item {item_id} is not on loan")]
    NotOnLoan {
        /// Item that was to be returned.
        item_id: String,
    },

    /// The item is on loan, but to someone else.
    #[error("item {item_id} is on loan to member {borrower}, not {claimed_by}")]
    WrongBorrower {
        /// Item that was to be returned.
        item_id: String,
        /// Actual borrower.
        borrower: MemberId,
        /// Member that attempted the return.
        claimed_by: MemberId,
    },

    /// A loan operation referenced an unknown item.
    #[error("item {0} does not exist")]
    ItemNotFound(String),

    /// A loan or listing operation referenced an unknown member.
    #[error("member {0} does not exist")]
    MemberNotFound(MemberId),

    /// A snapshot could not be restored because it breaks a library invariant.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

impl LibraryError {
    /// Return the fieldless kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateId { .. } => ErrorKind::DuplicateId,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::ItemOnLoan { .. } => ErrorKind::ItemOnLoan,
            Self::HasActiveLoans { .. } => ErrorKind::HasActiveLoans,
            Self::AlreadyLoaned { .. } => ErrorKind::AlreadyLoaned,
            Self::AlreadyHeldByMember { .. } => ErrorKind::AlreadyHeldByMember,
            Self::NotOnLoan { .. } => ErrorKind::NotOnLoan,
            Self::WrongBorrower { .. } => ErrorKind::WrongBorrower,
            Self::ItemNotFound(_) => ErrorKind::ItemNotFound,
            Self::MemberNotFound(_) => ErrorKind::MemberNotFound,
            Self::InvalidSnapshot(_) => ErrorKind::InvalidSnapshot,
        }
    }
}

/// Result alias for library operations.
pub type LibraryResult<T> = Result<T, LibraryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_ids() {
        let err = LibraryError::HasActiveLoans {
            member_id: MemberId::from(102),
            items: vec!["978-2".into(), "978-3".into()],
        };
        assert_eq!(err.to_string(), "member 102 still holds 978-2, 978-3");
        assert_eq!(err.kind(), ErrorKind::HasActiveLoans);

        let err = LibraryError::DuplicateId {
            entity: Entity::Item,
            id: "978-1".into(),
        };
        assert_eq!(err.to_string(), "item with id 978-1 already exists");
    }
}
