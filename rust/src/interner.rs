//! Child name interning for dense grid indexing.
//!
//! Children are referred to by name in requests; the grid stores them by a
//! small integer so a cell lookup is a plain index computation.

use rustc_hash::FxHashMap;

/// Interned child ID, equal to the child's position in the request.
pub type ChildId = usize;

/// Maps child names to their dense IDs and back.
#[derive(Debug, Clone, Default)]
pub struct ChildInterner {
    to_id: FxHashMap<String, ChildId>,
    names: Vec<String>,
}

impl ChildInterner {
    /// Build an interner from names in request order.
    ///
    /// Returns the first duplicated name as the error.
    pub fn from_names(names: &[String]) -> Result<Self, String> {
        let mut interner = Self {
            to_id: FxHashMap::with_capacity_and_hasher(names.len(), Default::default()),
            names: Vec::with_capacity(names.len()),
        };
        for name in names {
            if interner.to_id.contains_key(name.as_str()) {
                return Err(name.clone());
            }
            interner.to_id.insert(name.clone(), interner.names.len());
            interner.names.push(name.clone());
        }
        Ok(interner)
    }

    /// Get the ID for a child name, if it is known.
    #[inline]
    pub fn get(&self, name: &str) -> Option<ChildId> {
        self.to_id.get(name).copied()
    }

    /// Get the name for an ID.
    #[inline]
    pub fn resolve(&self, id: ChildId) -> Option<&str> {
        self.names.get(id).map(|s| s.as_str())
    }

    /// All IDs in request order.
    pub fn ids(&self) -> impl Iterator<Item = ChildId> {
        0..self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Resolve a participant list; an empty list means every child.
    ///
    /// Returns the first unknown name as the error. Repeated names collapse to
    /// one entry, keeping first-seen order.
    pub fn resolve_participants(&self, participants: &[String]) -> Result<Vec<ChildId>, String> {
        if participants.is_empty() {
            return Ok(self.ids().collect());
        }
        let mut resolved: Vec<ChildId> = Vec::with_capacity(participants.len());
        for name in participants {
            let id = self.get(name).ok_or_else(|| name.clone())?;
            if !resolved.contains(&id) {
                resolved.push(id);
            }
        }
        Ok(resolved)
    }
}
