//! Loan ledger: the authoritative record of who holds what.

use std::collections::HashMap;

use crate::{
    error::{LibraryError, LibraryResult},
    models::{ItemStatus, Member, MemberId},
};

/// Active loans keyed by item identifier.
///
/// Each item maps to at most one borrower. Lending and returning also update
/// the borrower's own list so that both sides always agree.
#[derive(Debug, Default, Clone)]
pub struct LoanLedger {
    loans: HashMap<String, MemberId>,
    order: Vec<String>,
}

impl LoanLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `item_id` as lent to `member`.
    ///
    /// All checks run before anything is touched, so a failed call leaves both
    /// the ledger and the member unchanged.
    pub fn lend(&mut self, item_id: &str, member: &mut Member) -> LibraryResult<()> {
        if let Some(borrower) = self.loans.get(item_id) {
            return Err(LibraryError::AlreadyLoaned {
                item_id: item_id.to_string(),
                borrower: borrower.clone(),
            });
        }
        if member.holds(item_id) {
            return Err(LibraryError::AlreadyHeldByMember {
                item_id: item_id.to_string(),
                member_id: member.id.clone(),
            });
        }

        self.loans.insert(item_id.to_string(), member.id.clone());
        self.order.push(item_id.to_string());
        member.push_loan(item_id);
        Ok(())
    }

    /// Close the loan of `item_id` held by `member`.
    pub fn return_item(&mut self, item_id: &str, member: &mut Member) -> LibraryResult<()> {
        let borrower = self
            .loans
            .get(item_id)
            .ok_or_else(|| LibraryError::NotOnLoan {
                item_id: item_id.to_string(),
            })?;
        if *borrower != member.id {
            return Err(LibraryError::WrongBorrower {
                item_id: item_id.to_string(),
                borrower: borrower.clone(),
                claimed_by: member.id.clone(),
            });
        }

        self.loans.remove(item_id);
        self.order.retain(|loaned| loaned != item_id);
        member.drop_loan(item_id);
        Ok(())
    }

    /// Whether the item is currently lent out.
    pub fn is_loaned(&self, item_id: &str) -> bool {
        self.loans.contains_key(item_id)
    }

    /// Current borrower of the item, if any.
    pub fn borrower_of(&self, item_id: &str) -> Option<&MemberId> {
        self.loans.get(item_id)
    }

    /// Availability of the item as seen by the ledger.
    pub fn status(&self, item_id: &str) -> ItemStatus {
        match self.loans.get(item_id) {
            Some(borrower) => ItemStatus::Loaned(borrower.clone()),
            None => ItemStatus::Available,
        }
    }

    /// Active loans as `(item, borrower)` pairs, oldest loan first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MemberId)> {
        self.order.iter().filter_map(|item_id| {
            self.loans
                .get(item_id)
                .map(|borrower| (item_id.as_str(), borrower))
        })
    }

    /// Number of active loans.
    pub fn len(&self) -> usize {
        self.loans.len()
    }

    /// Whether nothing is lent out.
    pub fn is_empty(&self) -> bool {
        self.loans.is_empty()
    }
}
