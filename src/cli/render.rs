//! Plain-text rendering of instrument tables and detail cards.

use std::fmt::Write as _;

use crate::{instrument::InstrumentRecord, types::ImageRef};

const HEADERS: [&str; 6] = ["Instrument Name", "Category", "Cabinet", "Shelf", "Qty", "Trays"];

fn row_cells(rec: &InstrumentRecord) -> [String; 6] {
    [
        rec.name.clone(),
        rec.category.clone(),
        rec.cabinet.clone(),
        rec.shelf.clone(),
        rec.quantity.to_string(),
        rec.trays.clone(),
    ]
}

/// Aligned table with one row per record, or a notice when empty.
pub fn render_table(records: &[InstrumentRecord]) -> String {
    if records.is_empty() {
        return "No instruments match.\n".to_string();
    }

    let rows: Vec<[String; 6]> = records.iter().map(row_cells).collect();
    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &HEADERS.map(str::to_string), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("-+-"));
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String; 6], widths: &[usize; 6]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths.iter())
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    let _ = writeln!(out, "{}", padded.join(" | ").trim_end());
}

/// Detail card for one record.
pub fn render_details(rec: &InstrumentRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "### {}", rec.name);
    let _ = writeln!(out, "Category:            {}", rec.category);
    let _ = writeln!(out, "Cabinet Location:    {}", rec.cabinet);
    let _ = writeln!(out, "Shelf Number:        {}", rec.shelf);
    let _ = writeln!(out, "Quantity Available:  {}", rec.quantity);
    let _ = writeln!(out, "Also found in trays: {}", rec.trays);
    if let Some(date) = &rec.last_updated {
        let _ = writeln!(out, "Last updated:        {date}");
    }
    if let Some(image) = &rec.image {
        let _ = writeln!(out, "Image:               {}", render_image(image));
    }
    out
}

/// One-line description of a picture reference.
pub fn render_image(image: &ImageRef) -> String {
    match image {
        ImageRef::Url(url) => url.clone(),
        ImageRef::Blob(bytes) => format!("<uploaded image, {} bytes>", bytes.len()),
        ImageRef::Placeholder => format!(
            "{} (no match found)",
            image.display_url().unwrap_or_default()
        ),
    }
}
