//! Item catalog.

use std::collections::HashMap;

use crate::{
    error::{Entity, LibraryError, LibraryResult},
    models::Item,
};

/// Item field a catalog search runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchField {
    /// Case-insensitive substring match on the title.
    Title,
    /// Case-insensitive substring match on the creator.
    Creator,
    /// Case-insensitive exact match on the category.
    Category,
}

impl SearchField {
    fn matches(self, item: &Item, needle: &str) -> bool {
        match self {
            Self::Title => item.title.to_lowercase().contains(needle),
            Self::Creator => item.creator.to_lowercase().contains(needle),
            Self::Category => item.category.to_lowercase() == needle,
        }
    }
}

/// Items keyed by identifier, iterated in insertion order.
///
/// The catalog only knows whether an item is present. Whether it is lent out
/// is the ledger's business.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    items: Vec<Item>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new item, rejecting identifiers that are already present.
    pub fn add(&mut self, item: Item) -> LibraryResult<()> {
        if self.index.contains_key(&item.id) {
            return Err(LibraryError::DuplicateId {
                entity: Entity::Item,
                id: item.id,
            });
        }
        self.index.insert(item.id.clone(), self.items.len());
        self.items.push(item);
        Ok(())
    }

    /// Remove an item and hand it back.
    pub fn remove(&mut self, id: &str) -> LibraryResult<Item> {
        let position = self.index.remove(id).ok_or_else(|| LibraryError::NotFound {
            entity: Entity::Item,
            id: id.to_string(),
        })?;
        let item = self.items.remove(position);
        for shifted in &self.items[position..] {
            if let Some(slot) = self.index.get_mut(&shifted.id) {
                *slot -= 1;
            }
        }
        Ok(item)
    }

    /// Look up an item by identifier.
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.index.get(id).and_then(|&position| self.items.get(position))
    }

    /// Whether an item with this identifier is catalogued.
    pub fn exists(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Items whose `field` matches `query`, in insertion order.
    pub fn search(&self, field: SearchField, query: &str) -> Vec<&Item> {
        let needle = query.to_lowercase();
        self.items
            .iter()
            .filter(|item| field.matches(item, &needle))
            .collect()
    }

    /// All items in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    /// Number of catalogued items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
