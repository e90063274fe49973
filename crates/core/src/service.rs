//! Library service: the single entry point for every library operation.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::{
    activity::ActivityLog,
    catalog::{Catalog, SearchField},
    error::{Entity, LibraryError, LibraryResult},
    ledger::LoanLedger,
    members::MemberRegistry,
    models::{ActivityAction, ActivityEvent, Item, ItemStatus, Member, MemberId},
    snapshot::{LibrarySnapshot, LoanEntry},
};

/// Name used when none is configured.
pub const DEFAULT_LIBRARY_NAME: &str = "Biblioteca";

/// Owns the catalog, member registry, loan ledger and activity log.
///
/// Each mutating operation validates its preconditions in a fixed order and
/// stops at the first failure without changing anything. Successful
/// mutations append exactly one event to the activity log; rejected calls
/// never do.
#[derive(Debug, Clone)]
pub struct LibraryService {
    name: String,
    catalog: Catalog,
    members: MemberRegistry,
    ledger: LoanLedger,
    activity: ActivityLog,
}

impl Default for LibraryService {
    fn default() -> Self {
        Self::new(DEFAULT_LIBRARY_NAME)
    }
}

impl LibraryService {
    /// Create an empty library.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            catalog: Catalog::new(),
            members: MemberRegistry::new(),
            ledger: LoanLedger::new(),
            activity: ActivityLog::new(),
        }
    }

    /// Display name of the library.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add an item to the catalog.
    pub fn add_item(&mut self, item: Item) -> LibraryResult<()> {
        let item_id = item.id.clone();
        self.catalog
            .add(item)
            .map_err(|err| rejected("add_item", err))?;

        info!(item_id = %item_id, "Item added");
        self.record(ActivityAction::ItemAdded, None, Some(item_id));
        Ok(())
    }

    /// Remove an item that is not currently lent out.
    pub fn remove_item(&mut self, item_id: &str) -> LibraryResult<Item> {
        if !self.catalog.exists(item_id) {
            return Err(rejected(
                "remove_item",
                LibraryError::NotFound {
                    entity: Entity::Item,
                    id: item_id.to_string(),
                },
            ));
        }
        if let Some(borrower) = self.ledger.borrower_of(item_id) {
            return Err(rejected(
                "remove_item",
                LibraryError::ItemOnLoan {
                    item_id: item_id.to_string(),
                    borrower: borrower.clone(),
                },
            ));
        }

        let item = self
            .catalog
            .remove(item_id)
            .map_err(|err| rejected("remove_item", err))?;
        info!(item_id = %item.id, title = %item.title, "Item removed");
        self.record(ActivityAction::ItemRemoved, None, Some(item.id.clone()));
        Ok(item)
    }

    /// Register a new member holding no items.
    pub fn register_member(
        &mut self,
        id: impl Into<MemberId>,
        name: impl Into<String>,
    ) -> LibraryResult<()> {
        let member = Member::new(id, name);
        let member_id = member.id.clone();
        self.members
            .register(member)
            .map_err(|err| rejected("register_member", err))?;

        info!(member_id = %member_id, "Member registered");
        self.record(ActivityAction::MemberRegistered, Some(member_id), None);
        Ok(())
    }

    /// Unregister a member that holds no items.
    pub fn unregister_member(&mut self, id: impl Into<MemberId>) -> LibraryResult<Member> {
        let id = id.into();
        let member = self
            .members
            .unregister(&id)
            .map_err(|err| rejected("unregister_member", err))?;

        info!(member_id = %id, name = %member.name, "Member unregistered");
        self.record(ActivityAction::MemberUnregistered, Some(id), None);
        Ok(member)
    }

    /// Lend `item_id` to `member_id`.
    pub fn lend(&mut self, member_id: impl Into<MemberId>, item_id: &str) -> LibraryResult<()> {
        let member_id = member_id.into();
        let member = self
            .members
            .get_mut(&member_id)
            .ok_or_else(|| rejected("lend", LibraryError::MemberNotFound(member_id.clone())))?;
        if !self.catalog.exists(item_id) {
            return Err(rejected(
                "lend",
                LibraryError::ItemNotFound(item_id.to_string()),
            ));
        }
        self.ledger
            .lend(item_id, member)
            .map_err(|err| rejected("lend", err))?;

        info!(member_id = %member_id, item_id, "Item loaned");
        self.record(
            ActivityAction::Loaned,
            Some(member_id),
            Some(item_id.to_string()),
        );
        Ok(())
    }

    /// Take `item_id` back from `member_id`, who must be its current borrower.
    pub fn return_item(
        &mut self,
        member_id: impl Into<MemberId>,
        item_id: &str,
    ) -> LibraryResult<()> {
        let member_id = member_id.into();
        let member = self.members.get_mut(&member_id).ok_or_else(|| {
            rejected("return_item", LibraryError::MemberNotFound(member_id.clone()))
        })?;
        if !self.catalog.exists(item_id) {
            return Err(rejected(
                "return_item",
                LibraryError::ItemNotFound(item_id.to_string()),
            ));
        }
        self.ledger
            .return_item(item_id, member)
            .map_err(|err| rejected("return_item", err))?;

        info!(member_id = %member_id, item_id, "Item returned");
        self.record(
            ActivityAction::Returned,
            Some(member_id),
            Some(item_id.to_string()),
        );
        Ok(())
    }

    /// Items whose title contains `query`, ignoring case.
    pub fn search_by_title(&self, query: &str) -> Vec<&Item> {
        self.catalog.search(SearchField::Title, query)
    }

    /// Items whose creator contains `query`, ignoring case.
    pub fn search_by_creator(&self, query: &str) -> Vec<&Item> {
        self.catalog.search(SearchField::Creator, query)
    }

    /// Items whose category equals `category`, ignoring case.
    pub fn search_by_category(&self, category: &str) -> Vec<&Item> {
        self.catalog.search(SearchField::Category, category)
    }

    /// Search any field. See [`SearchField`] for the matching rule of each.
    pub fn search(&self, field: SearchField, query: &str) -> Vec<&Item> {
        self.catalog.search(field, query)
    }

    /// Items currently held by a member, in the order they were lent.
    pub fn list_loans_of_member(&self, member_id: impl Into<MemberId>) -> LibraryResult<Vec<&Item>> {
        let member_id = member_id.into();
        let member = self.members.get(&member_id).ok_or_else(|| {
            rejected(
                "list_loans_of_member",
                LibraryError::MemberNotFound(member_id.clone()),
            )
        })?;
        Ok(member
            .borrowed_item_ids()
            .iter()
            .filter_map(|item_id| self.catalog.get(item_id))
            .collect())
    }

    /// Every committed change, oldest first.
    pub fn history(&self) -> &[ActivityEvent] {
        self.activity.all()
    }

    /// Look up a catalogued item.
    pub fn item(&self, item_id: &str) -> Option<&Item> {
        self.catalog.get(item_id)
    }

    /// Look up a registered member.
    pub fn member(&self, member_id: impl Into<MemberId>) -> Option<&Member> {
        self.members.get(&member_id.into())
    }

    /// Catalogued items in insertion order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.catalog.iter()
    }

    /// Registered members in registration order.
    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.iter()
    }

    /// Active loans as `(item, borrower)` pairs, oldest loan first.
    pub fn active_loans(&self) -> impl Iterator<Item = (&str, &MemberId)> {
        self.ledger.iter()
    }

    /// Whether the item is lent out.
    pub fn is_loaned(&self, item_id: &str) -> bool {
        self.ledger.is_loaned(item_id)
    }

    /// Current borrower of the item.
    pub fn borrower_of(&self, item_id: &str) -> Option<&MemberId> {
        self.ledger.borrower_of(item_id)
    }

    /// Lending state of a catalogued item; `None` when the item is unknown.
    pub fn item_status(&self, item_id: &str) -> Option<ItemStatus> {
        self.catalog
            .exists(item_id)
            .then(|| self.ledger.status(item_id))
    }

    /// Capture the full library state.
    pub fn snapshot(&self) -> LibrarySnapshot {
        LibrarySnapshot {
            name: self.name.clone(),
            items: self.catalog.iter().cloned().collect(),
            members: self.members.iter().cloned().collect(),
            active_loans: self
                .ledger
                .iter()
                .map(|(item_id, member_id)| LoanEntry {
                    item_id: item_id.to_string(),
                    member_id: member_id.clone(),
                })
                .collect(),
            history: self.activity.all().to_vec(),
        }
    }

    /// Rebuild a library from a snapshot.
    ///
    /// Loans are replayed through the ledger, so a snapshot that references
    /// unknown items or members, lends an item twice, or whose member lists
    /// disagree with its loans is rejected as [`LibraryError::InvalidSnapshot`].
    /// The persisted history is carried over unchanged.
    pub fn restore(snapshot: LibrarySnapshot) -> LibraryResult<Self> {
        let LibrarySnapshot {
            name,
            items,
            members,
            active_loans,
            history,
        } = snapshot;
        let mut service = Self::new(name);

        for item in items {
            service.catalog.add(item).map_err(invalid)?;
        }

        let mut declared: HashMap<MemberId, Vec<String>> = HashMap::new();
        for mut member in members {
            declared.insert(member.id.clone(), member.borrowed_item_ids().to_vec());
            member.clear_loans();
            service.members.register(member).map_err(invalid)?;
        }

        for loan in active_loans {
            if !service.catalog.exists(&loan.item_id) {
                return Err(LibraryError::InvalidSnapshot(format!(
                    "loan references unknown item {}",
                    loan.item_id
                )));
            }
            let member = service.members.get_mut(&loan.member_id).ok_or_else(|| {
                LibraryError::InvalidSnapshot(format!(
                    "loan of {} references unknown member {}",
                    loan.item_id, loan.member_id
                ))
            })?;
            service.ledger.lend(&loan.item_id, member).map_err(invalid)?;
        }

        for member in service.members.iter() {
            let mut expected = declared.remove(&member.id).unwrap_or_default();
            let mut actual = member.borrowed_item_ids().to_vec();
            expected.sort();
            actual.sort();
            if expected != actual {
                return Err(LibraryError::InvalidSnapshot(format!(
                    "member {} lists [{}] but holds [{}]",
                    member.id,
                    expected.join(", "),
                    actual.join(", ")
                )));
            }
        }

        service.activity = ActivityLog::from_events(history);
        info!(
            library = %service.name,
            items = service.catalog.len(),
            members = service.members.len(),
            loans = service.ledger.len(),
            "Library restored from snapshot"
        );
        Ok(service)
    }

    fn record(&mut self, action: ActivityAction, member_id: Option<MemberId>, item_id: Option<String>) {
        self.activity
            .record(ActivityEvent::now(action, member_id, item_id));
    }
}

fn rejected(operation: &'static str, err: LibraryError) -> LibraryError {
    debug!(operation, kind = ?err.kind(), "{err}");
    err
}

fn invalid(err: LibraryError) -> LibraryError {
    LibraryError::InvalidSnapshot(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn actions(service: &LibraryService) -> Vec<ActivityAction> {
        service.history().iter().map(|event| event.action).collect()
    }

    fn ids<'a>(items: impl IntoIterator<Item = &'a Item>) -> Vec<&'a str> {
        items.into_iter().map(|item| item.id.as_str()).collect()
    }

    /// Checks that ledger and member lists describe the same loans.
    fn assert_consistent(service: &LibraryService) {
        for (item_id, borrower) in service.active_loans() {
            assert!(service.item(item_id).is_some(), "loaned item {item_id} missing");
            let member = service
                .member(borrower)
                .unwrap_or_else(|| panic!("borrower {borrower} missing"));
            assert!(member.holds(item_id));
        }
        for member in service.members() {
            for item_id in member.borrowed_item_ids() {
                assert_eq!(service.borrower_of(item_id), Some(&member.id));
            }
        }
    }

    fn seeded() -> LibraryService {
        let mut service = LibraryService::new("Biblioteca Central");
        service
            .add_item(Item::new(
                "978-1",
                "El Principito",
                "Antoine de Saint-Exupéry",
                "Ficción",
            ))
            .unwrap();
        service
            .add_item(Item::new(
                "978-2",
                "Cien Años de Soledad",
                "Gabriel García Márquez",
                "Realismo Mágico",
            ))
            .unwrap();
        service
            .add_item(Item::new("978-3", "POO para Todos", "W. Nuñez", "Tecnología"))
            .unwrap();
        service.register_member(101, "Anita").unwrap();
        service.register_member(102, "José").unwrap();
        service
    }

    #[test]
    fn lend_and_remove_walkthrough() {
        let mut service = LibraryService::default();
        service
            .add_item(Item::new("978-1", "El Principito", "Antoine de Saint-Exupéry", "Ficción"))
            .unwrap();
        service.register_member(101, "Anita").unwrap();

        service.lend(101, "978-1").unwrap();
        assert_eq!(service.borrower_of("978-1"), Some(&MemberId::from(101)));

        let err = service.remove_item("978-1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ItemOnLoan);
        assert_eq!(service.items().count(), 1);

        service.return_item(101, "978-1").unwrap();
        assert_eq!(
            actions(&service),
            [
                ActivityAction::ItemAdded,
                ActivityAction::MemberRegistered,
                ActivityAction::Loaned,
                ActivityAction::Returned,
            ]
        );

        let removed = service.remove_item("978-1").unwrap();
        assert_eq!(removed.title, "El Principito");
        assert_eq!(service.history().len(), 5);
        let last = service.history().last().unwrap();
        assert_eq!(last.action, ActivityAction::ItemRemoved);
        assert_eq!(last.item_id.as_deref(), Some("978-1"));
        assert_eq!(last.member_id, None);
    }

    #[test]
    fn unregister_waits_for_returns() {
        let mut service = seeded();
        service.lend(102, "978-2").unwrap();

        let err = service.unregister_member(102).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::HasActiveLoans);
        assert!(service.member(102).is_some());

        service.return_item(102, "978-2").unwrap();
        let removed = service.unregister_member(102).unwrap();
        assert_eq!(removed.name, "José");
        assert!(service.member(102).is_none());
        assert_eq!(
            service.history().last().map(|event| event.action),
            Some(ActivityAction::MemberUnregistered)
        );
    }

    #[test]
    fn duplicates_fail_and_leave_sizes_alone() {
        let mut service = seeded();
        let before = service.history().len();

        let err = service
            .add_item(Item::new("978-1", "Other", "Other", "Other"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateId);
        let err = service.register_member(101, "Other").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateId);

        assert_eq!(service.items().count(), 3);
        assert_eq!(service.members().count(), 2);
        assert_eq!(service.history().len(), before);
    }

    #[test]
    fn lend_checks_run_in_order() {
        let mut service = seeded();

        // Unknown member wins over unknown item.
        let err = service.lend(999, "missing").unwrap_err();
        assert_eq!(err, LibraryError::MemberNotFound(MemberId::from(999)));
        let err = service.lend(101, "missing").unwrap_err();
        assert_eq!(err, LibraryError::ItemNotFound("missing".into()));

        service.lend(101, "978-1").unwrap();
        let err = service.lend(102, "978-1").unwrap_err();
        assert_eq!(
            err,
            LibraryError::AlreadyLoaned {
                item_id: "978-1".into(),
                borrower: MemberId::from(101),
            }
        );
        // The same member asking again still hits the ledger check first.
        let err = service.lend(101, "978-1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyLoaned);
        assert_eq!(service.history().len(), 6);
    }

    #[test]
    fn return_checks_run_in_order() {
        let mut service = seeded();

        let err = service.return_item(999, "978-1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MemberNotFound);
        let err = service.return_item(101, "missing").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ItemNotFound);
        let err = service.return_item(101, "978-1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotOnLoan);

        service.lend(101, "978-1").unwrap();
        let err = service.return_item(102, "978-1").unwrap_err();
        assert_eq!(
            err,
            LibraryError::WrongBorrower {
                item_id: "978-1".into(),
                borrower: MemberId::from(101),
                claimed_by: MemberId::from(102),
            }
        );
        assert_eq!(service.borrower_of("978-1"), Some(&MemberId::from(101)));
        assert_eq!(service.history().len(), 6);
    }

    #[test]
    fn remove_unknown_item_is_not_found() {
        let mut service = seeded();
        let err = service.remove_item("000").unwrap_err();
        assert_eq!(
            err,
            LibraryError::NotFound {
                entity: Entity::Item,
                id: "000".into(),
            }
        );
        let err = service.unregister_member("nobody").unwrap_err();
        assert_eq!(
            err,
            LibraryError::NotFound {
                entity: Entity::Member,
                id: "nobody".into(),
            }
        );
    }

    #[test]
    fn round_trip_leaves_no_trace_in_state() {
        let mut service = seeded();
        service.lend(101, "978-3").unwrap();
        assert_eq!(
            service.item_status("978-3"),
            Some(ItemStatus::Loaned(MemberId::from(101)))
        );
        service.return_item(101, "978-3").unwrap();

        assert_eq!(service.item_status("978-3"), Some(ItemStatus::Available));
        assert_eq!(service.item_status("unknown"), None);
        assert!(service.member(101).unwrap().borrowed_item_ids().is_empty());
        assert_eq!(service.active_loans().count(), 0);
    }

    #[test]
    fn member_lists_track_the_ledger_through_mixed_sequences() {
        let mut service = seeded();
        let steps: [(bool, i64, &str); 8] = [
            (true, 101, "978-1"),
            (true, 102, "978-2"),
            (true, 101, "978-3"),
            (false, 101, "978-1"),
            (true, 102, "978-1"),
            (false, 102, "978-2"),
            (true, 101, "978-2"),
            (false, 101, "978-3"),
        ];
        for (lend, member, item) in steps {
            if lend {
                service.lend(member, item).unwrap();
            } else {
                service.return_item(member, item).unwrap();
            }
            assert_consistent(&service);
        }

        assert_eq!(ids(service.list_loans_of_member(101).unwrap()), ["978-2"]);
        assert_eq!(ids(service.list_loans_of_member(102).unwrap()), ["978-1"]);
        let err = service.list_loans_of_member(7).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MemberNotFound);
    }

    #[test]
    fn searches_are_read_only() {
        let service = seeded();
        let before = service.history().len();

        assert_eq!(ids(service.search_by_title("principito")), ["978-1"]);
        assert_eq!(ids(service.search_by_creator("García")), ["978-2"]);
        assert_eq!(ids(service.search_by_category("tecnología")), ["978-3"]);
        assert!(service.search_by_title("Programación").is_empty());
        assert_eq!(ids(service.search(SearchField::Title, "")).len(), 3);
        assert_eq!(service.history().len(), before);
    }

    #[test]
    fn snapshot_restores_equivalent_state() {
        let mut service = seeded();
        service.lend(101, "978-1").unwrap();
        service.lend(102, "978-2").unwrap();
        service.lend(101, "978-3").unwrap();

        let snapshot = service.snapshot();
        assert_eq!(snapshot.active_loans.len(), 3);

        let restored = LibraryService::restore(snapshot.clone()).unwrap();
        assert_eq!(restored.name(), "Biblioteca Central");
        assert_eq!(restored.history(), service.history());
        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(
            restored.member(101).unwrap().borrowed_item_ids(),
            ["978-1".to_string(), "978-3".to_string()]
        );
        assert_consistent(&restored);
    }

    #[test]
    fn restore_rejects_inconsistent_snapshots() {
        let mut service = seeded();
        service.lend(101, "978-1").unwrap();
        let good = service.snapshot();

        let mut dangling = good.clone();
        dangling.items.retain(|item| item.id != "978-1");
        let err = LibraryService::restore(dangling).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSnapshot);

        let mut unknown_member = good.clone();
        unknown_member.active_loans[0].member_id = MemberId::from(555);
        assert_eq!(
            LibraryService::restore(unknown_member).unwrap_err().kind(),
            ErrorKind::InvalidSnapshot
        );

        let mut double = good.clone();
        double.active_loans.push(LoanEntry {
            item_id: "978-1".into(),
            member_id: MemberId::from(102),
        });
        assert_eq!(
            LibraryService::restore(double).unwrap_err().kind(),
            ErrorKind::InvalidSnapshot
        );

        let mut forgotten = good.clone();
        forgotten.active_loans.clear();
        let err = LibraryService::restore(forgotten).unwrap_err();
        assert!(err.to_string().contains("member 101"), "{err}");

        let mut duplicate = good;
        let copy = duplicate.items[1].clone();
        duplicate.items.push(copy);
        assert_eq!(
            LibraryService::restore(duplicate).unwrap_err().kind(),
            ErrorKind::InvalidSnapshot
        );
    }
}
