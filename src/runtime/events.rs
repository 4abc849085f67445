//! Runtime event stream payloads.

use crate::types::InstrumentId;

/// Events emitted from the single-writer session loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstrumentEvent {
    /// A new instrument was inserted.
    Inserted {
        /// Inserted instrument id.
        id: InstrumentId,
    },
    /// An existing instrument was updated.
    Updated {
        /// Updated instrument id.
        id: InstrumentId,
    },
    /// An image reference was cached on a record.
    ImageCached {
        /// Instrument id.
        id: InstrumentId,
        /// True when the placeholder sentinel was cached.
        placeholder: bool,
    },
}
