//! Instrument domain record, draft, and patch types.

use serde::{Deserialize, Serialize};

use crate::types::{ImageRef, InstrumentId, RequiredField};

/// Fully materialized instrument record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentRecord {
    /// Stable instrument identifier.
    pub id: InstrumentId,
    /// Display name used for search.
    pub name: String,
    /// Instrument category, e.g. "Cutting".
    pub category: String,
    /// Cabinet location.
    pub cabinet: String,
    /// Shelf within the cabinet.
    pub shelf: String,
    /// Quantity available.
    pub quantity: u32,
    /// Free-text list of trays that also carry this instrument.
    pub trays: String,
    /// Date of the last edit, as entered.
    pub last_updated: Option<String>,
    /// Cached or uploaded picture.
    pub image: Option<ImageRef>,
}

/// Insert payload used to create a new [`InstrumentRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InstrumentDraft {
    /// Display name used for search.
    pub name: String,
    /// Instrument category.
    pub category: String,
    /// Cabinet location.
    pub cabinet: String,
    /// Shelf within the cabinet.
    pub shelf: String,
    /// Quantity available.
    pub quantity: u32,
    /// Free-text list of trays.
    pub trays: String,
    /// Date of the last edit.
    pub last_updated: Option<String>,
    /// Uploaded picture, if any.
    pub image: Option<ImageRef>,
}

impl InstrumentDraft {
    /// Draft with the three required fields set and everything else defaulted.
    pub fn new(name: impl Into<String>, category: impl Into<String>, cabinet: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            cabinet: cabinet.into(),
            ..Self::default()
        }
    }

    /// First required field that is empty, if any. Whitespace counts as a value.
    pub fn missing_field(&self) -> Option<RequiredField> {
        [
            (RequiredField::Name, &self.name),
            (RequiredField::Category, &self.category),
            (RequiredField::Cabinet, &self.cabinet),
        ]
        .into_iter()
        .find(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
    }

    pub(crate) fn into_record(self, id: InstrumentId) -> InstrumentRecord {
        InstrumentRecord {
            id,
            name: self.name,
            category: self.category,
            cabinet: self.cabinet,
            shelf: self.shelf,
            quantity: self.quantity,
            trays: self.trays,
            last_updated: self.last_updated,
            image: self.image,
        }
    }
}

/// Sparse patch where each `Some` field overwrites the record value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InstrumentPatch {
    /// Optional replacement for the name.
    pub name: Option<String>,
    /// Optional replacement for the category.
    pub category: Option<String>,
    /// Optional replacement for the cabinet location.
    pub cabinet: Option<String>,
    /// Optional replacement for the shelf.
    pub shelf: Option<String>,
    /// Optional replacement for the quantity.
    pub quantity: Option<u32>,
    /// Optional replacement for the trays text.
    pub trays: Option<String>,
    /// Optional replacement for the last-updated date.
    pub last_updated: Option<String>,
    /// Optional replacement for the image.
    pub image: Option<ImageRef>,
}

impl InstrumentPatch {
    /// Returns true when no fields are set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Applies this patch in place to `rec`.
    pub fn apply_to(&self, rec: &mut InstrumentRecord) {
        if let Some(v) = &self.name {
            rec.name = v.clone();
        }
        if let Some(v) = &self.category {
            rec.category = v.clone();
        }
        if let Some(v) = &self.cabinet {
            rec.cabinet = v.clone();
        }
        if let Some(v) = &self.shelf {
            rec.shelf = v.clone();
        }
        if let Some(v) = self.quantity {
            rec.quantity = v;
        }
        if let Some(v) = &self.trays {
            rec.trays = v.clone();
        }
        if let Some(v) = &self.last_updated {
            rec.last_updated = Some(v.clone());
        }
        if let Some(v) = &self.image {
            rec.image = Some(v.clone());
        }
    }
}
