#![warn(clippy::all, missing_docs)]

//! Core domain logic for the Biblio lending library.
//!
//! This crate hosts the catalog, member registry, loan ledger and
//! activity log, the service that keeps them consistent, and the
//! configuration and snapshot layers used by the command-line driver
//! and any future frontends.

pub mod activity;
pub mod catalog;
pub mod config;
pub mod error;
pub mod ledger;
pub mod members;
pub mod models;
pub mod service;
pub mod shared;
pub mod snapshot;

pub use crate::config::AppConfig;
pub use activity::ActivityLog;
pub use catalog::{Catalog, SearchField};
pub use error::{Entity, ErrorKind, LibraryError, LibraryResult};
pub use ledger::LoanLedger;
pub use members::MemberRegistry;
pub use models::{ActivityAction, ActivityEvent, Item, ItemStatus, Member, MemberId};
pub use service::{LibraryService, DEFAULT_LIBRARY_NAME};
pub use shared::SharedLibrary;
pub use snapshot::{LibrarySnapshot, LoanEntry, SnapshotEntry, SnapshotStore};
