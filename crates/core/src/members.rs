//! Member registry.

use std::collections::{HashMap, HashSet};

use crate::{
    error::{Entity, LibraryError, LibraryResult},
    models::{Member, MemberId},
};

/// Registered members keyed by identifier.
///
/// Identifiers are tracked in a dedicated set so uniqueness is checked against
/// exactly one structure; the map and the registration order follow it.
#[derive(Debug, Default, Clone)]
pub struct MemberRegistry {
    ids: HashSet<MemberId>,
    members: HashMap<MemberId, Member>,
    order: Vec<MemberId>,
}

impl MemberRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a member, rejecting identifiers that are already taken.
    pub fn register(&mut self, member: Member) -> LibraryResult<()> {
        if !self.ids.insert(member.id.clone()) {
            return Err(LibraryError::DuplicateId {
                entity: Entity::Member,
                id: member.id.to_string(),
            });
        }
        self.order.push(member.id.clone());
        self.members.insert(member.id.clone(), member);
        Ok(())
    }

    /// Remove a member that holds no items.
    pub fn unregister(&mut self, id: &MemberId) -> LibraryResult<Member> {
        let member = self.members.get(id).ok_or_else(|| LibraryError::NotFound {
            entity: Entity::Member,
            id: id.to_string(),
        })?;
        if member.has_loans() {
            return Err(LibraryError::HasActiveLoans {
                member_id: id.clone(),
                items: member.borrowed_item_ids().to_vec(),
            });
        }

        self.ids.remove(id);
        self.order.retain(|registered| registered != id);
        self.members.remove(id).ok_or_else(|| LibraryError::NotFound {
            entity: Entity::Member,
            id: id.to_string(),
        })
    }

    /// Look up a member.
    pub fn get(&self, id: &MemberId) -> Option<&Member> {
        self.members.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &MemberId) -> Option<&mut Member> {
        self.members.get_mut(id)
    }

    /// Whether the identifier is registered.
    pub fn exists(&self, id: &MemberId) -> bool {
        self.ids.contains(id)
    }

    /// Members in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Member> {
        self.order.iter().filter_map(|id| self.members.get(id))
    }

    /// Number of registered members.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nobody is registered.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn register_enforces_unique_ids() {
        let mut registry = MemberRegistry::new();
        registry.register(Member::new(101, "Anita")).unwrap();
        let err = registry.register(Member::new(101, "Impostor")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateId);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&MemberId::from(101)).unwrap().name, "Anita");

        // Same digits, different identifier shape.
        registry.register(Member::new("101", "Textual")).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn unregister_refuses_members_holding_items() {
        let mut registry = MemberRegistry::new();
        registry.register(Member::new(102, "José")).unwrap();
        let id = MemberId::from(102);
        registry.get_mut(&id).unwrap().push_loan("978-2");

        let err = registry.unregister(&id).unwrap_err();
        assert_eq!(
            err,
            LibraryError::HasActiveLoans {
                member_id: id.clone(),
                items: vec!["978-2".to_string()],
            }
        );
        assert!(registry.exists(&id));

        registry.get_mut(&id).unwrap().drop_loan("978-2");
        let removed = registry.unregister(&id).unwrap();
        assert_eq!(removed.name, "José");
        assert!(!registry.exists(&id));
        assert!(registry.is_empty());
        assert_eq!(registry.iter().count(), 0);
    }

    #[test]
    fn unregister_unknown_member_is_not_found() {
        let mut registry = MemberRegistry::new();
        let err = registry.unregister(&MemberId::from("ghost")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
