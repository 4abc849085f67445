use std::fmt;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    instrument::{InstrumentDraft, InstrumentPatch, InstrumentRecord},
    types::{ImageRef, InstrumentId, RequiredField},
};

use super::indices::{VecIndex, remove_from_vec_index};

/// How a caller addressed a record that could not be found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lookup {
    /// Stable identifier.
    Id(InstrumentId),
    /// Exact display name.
    Name(String),
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id {id}"),
            Self::Name(name) => write!(f, "name {name:?}"),
        }
    }
}

/// Typed outcome for rejected store mutations and failed lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A required field was blank at insert; nothing was added.
    #[error("missing required field: {0}")]
    MissingField(RequiredField),
    /// No record matched; nothing was changed.
    #[error("instrument not found by {0}")]
    NotFound(Lookup),
}

/// Ordered instrument collection owned by one session.
#[derive(Debug, Default)]
pub struct InstrumentStore {
    records: HashMap<InstrumentId, InstrumentRecord>,
    order: Vec<InstrumentId>,
    pos: HashMap<InstrumentId, usize>,
    by_name: VecIndex<String>,
    next_id: InstrumentId,
}

impl InstrumentStore {
    /// Empty store; the first insert gets id 1.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Store holding the fixed seed dataset.
    pub fn seeded() -> Self {
        let mut store = Self::new();
        for draft in super::seed::seed_drafts() {
            debug_assert_eq!(draft.missing_field(), None);
            store.append(draft);
        }
        store
    }

    /// Validates required fields and appends a new record, returning its id.
    pub fn insert(&mut self, draft: InstrumentDraft) -> Result<InstrumentId, StoreError> {
        if let Some(field) = draft.missing_field() {
            debug!(%field, "rejecting instrument without required field");
            return Err(StoreError::MissingField(field));
        }

        let name = draft.name.clone();
        let id = self.append(draft);
        info!(id, %name, "instrument inserted");
        Ok(id)
    }

    fn append(&mut self, draft: InstrumentDraft) -> InstrumentId {
        let id = self.next_id;
        self.next_id += 1;

        let rec = draft.into_record(id);
        self.by_name.entry(rec.name.clone()).or_default().push(id);
        self.pos.insert(id, self.order.len());
        self.order.push(id);
        self.records.insert(id, rec);
        id
    }

    /// Overwrites the fields present in `patch` on record `id`.
    pub fn update(&mut self, id: InstrumentId, patch: InstrumentPatch) -> Result<(), StoreError> {
        let rec = self
            .records
            .get_mut(&id)
            .ok_or(StoreError::NotFound(Lookup::Id(id)))?;
        let old_name = rec.name.clone();

        patch.apply_to(rec);

        if rec.name != old_name {
            if let Some(ids) = self.by_name.get_mut(&old_name) {
                remove_from_vec_index(ids, id);
                if ids.is_empty() {
                    self.by_name.remove(&old_name);
                }
            }
            self.by_name.entry(rec.name.clone()).or_default().push(id);
        }

        info!(id, name = %rec.name, "instrument updated");
        Ok(())
    }

    /// Updates the first record named exactly `name` and returns its id.
    pub fn update_by_name(&mut self, name: &str, patch: InstrumentPatch) -> Result<InstrumentId, StoreError> {
        let id = self.id_by_name(name)?;
        self.update(id, patch)?;
        Ok(id)
    }

    /// Replaces the cached image on record `id`.
    pub fn set_image(&mut self, id: InstrumentId, image: ImageRef) -> Result<(), StoreError> {
        let rec = self
            .records
            .get_mut(&id)
            .ok_or(StoreError::NotFound(Lookup::Id(id)))?;
        rec.image = Some(image);
        Ok(())
    }

    /// Record by id.
    pub fn get(&self, id: InstrumentId) -> Option<&InstrumentRecord> {
        self.records.get(&id)
    }

    /// Owned copy of the record by id.
    pub fn get_cloned(&self, id: InstrumentId) -> Option<InstrumentRecord> {
        self.get(id).cloned()
    }

    /// First record in collection order whose name equals `name` exactly.
    pub fn get_by_name(&self, name: &str) -> Result<&InstrumentRecord, StoreError> {
        let id = self.id_by_name(name)?;
        self.records
            .get(&id)
            .ok_or_else(|| StoreError::NotFound(Lookup::Name(name.to_string())))
    }

    /// Id of the first record named exactly `name`.
    pub fn id_by_name(&self, name: &str) -> Result<InstrumentId, StoreError> {
        self.by_name
            .get(name)
            .and_then(|ids| ids.iter().copied().min_by_key(|id| self.pos.get(id).copied()))
            .ok_or_else(|| StoreError::NotFound(Lookup::Name(name.to_string())))
    }

    /// Case-insensitive substring match on name; an empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<&InstrumentRecord> {
        let needle = query.to_lowercase();
        let hits: Vec<&InstrumentRecord> = self
            .records()
            .filter(|rec| needle.is_empty() || rec.name.to_lowercase().contains(&needle))
            .collect();
        debug!(query, hits = hits.len(), "instrument search");
        hits
    }

    /// Owned copies of [`Self::search`] hits.
    pub fn search_cloned(&self, query: &str) -> Vec<InstrumentRecord> {
        self.search(query).into_iter().cloned().collect()
    }

    /// Records in collection order.
    pub fn records(&self) -> impl Iterator<Item = &InstrumentRecord> + '_ {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    /// Ids in collection order.
    pub fn ordered_ids(&self) -> &[InstrumentId] {
        &self.order
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true when the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_store_has_three_records_in_order() {
        let store = InstrumentStore::seeded();
        let names: Vec<&str> = store.records().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Scalpel", "Forceps", "Hemostat"]);
        assert_eq!(store.ordered_ids(), &[1, 2, 3]);
    }

    #[test]
    fn duplicate_names_resolve_to_first_in_collection_order() {
        let mut store = InstrumentStore::new();
        let first = store.insert(InstrumentDraft::new("Clamp", "Clamping", "A1")).unwrap();
        let second = store.insert(InstrumentDraft::new("Other", "Clamping", "A2")).unwrap();
        store
            .update(
                second,
                InstrumentPatch {
                    name: Some("Clamp".to_string()),
                    ..InstrumentPatch::default()
                },
            )
            .unwrap();

        assert_eq!(store.get_by_name("Clamp").unwrap().id, first);

        store
            .update(
                first,
                InstrumentPatch {
                    name: Some("Renamed".to_string()),
                    ..InstrumentPatch::default()
                },
            )
            .unwrap();
        assert_eq!(store.get_by_name("Clamp").unwrap().id, second);
        assert_eq!(store.get_by_name("Renamed").unwrap().id, first);
    }

    #[test]
    fn rename_keeps_id_addressable_and_drops_old_name() {
        let mut store = InstrumentStore::seeded();
        let id = store.id_by_name("Forceps").unwrap();
        store
            .update(
                id,
                InstrumentPatch {
                    name: Some("Tissue Forceps".to_string()),
                    ..InstrumentPatch::default()
                },
            )
            .unwrap();

        assert_eq!(store.get(id).unwrap().name, "Tissue Forceps");
        assert_eq!(
            store.get_by_name("Forceps"),
            Err(StoreError::NotFound(Lookup::Name("Forceps".to_string())))
        );
        assert_eq!(store.ordered_ids(), &[1, 2, 3]);
    }

    #[test]
    fn update_missing_id_is_typed_not_found() {
        let mut store = InstrumentStore::seeded();
        let err = store.update(99, InstrumentPatch::default()).unwrap_err();
        assert_eq!(err, StoreError::NotFound(Lookup::Id(99)));
        assert_eq!(err.to_string(), "instrument not found by id 99");
    }

    #[test]
    fn set_image_caches_reference() {
        let mut store = InstrumentStore::seeded();
        store.set_image(1, ImageRef::Placeholder).unwrap();
        assert_eq!(store.get(1).unwrap().image, Some(ImageRef::Placeholder));
        assert!(store.set_image(42, ImageRef::Placeholder).is_err());
    }
}
