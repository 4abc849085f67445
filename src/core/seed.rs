use crate::instrument::InstrumentDraft;

/// Rows loaded into every new session: (name, category, cabinet, shelf, quantity, trays).
const SEED_ROWS: [(&str, &str, &str, &str, u32, &str); 3] = [
    ("Scalpel", "Cutting", "A1", "Top", 5, "Surgery Kit"),
    ("Forceps", "Grasping", "B2", "Middle", 3, "Dental Kit"),
    ("Hemostat", "Clamping", "C3", "Bottom", 7, "General Kit"),
];

/// Drafts for the seed rows, in display order.
pub fn seed_drafts() -> Vec<InstrumentDraft> {
    SEED_ROWS
        .iter()
        .map(|&(name, category, cabinet, shelf, quantity, trays)| InstrumentDraft {
            shelf: shelf.to_string(),
            quantity,
            trays: trays.to_string(),
            ..InstrumentDraft::new(name, category, cabinet)
        })
        .collect()
}
