//! Heuristic priority score for a quote request.
//!
//! Deterministic and side-effect free so the admin "estimated priority"
//! figure can be recomputed live while the visitor edits the form.

use super::domain::{MoveSize, MoveTiming, QuoteForm};

pub const MAX_SCORE: u8 = 10;

const DISTANCE_BONUS: u8 = 2;
const ASAP_BONUS: u8 = 2;

/// Score the form on a 0-10 scale. All terms are non-negative so only the
/// upper bound needs clamping.
pub fn score(form: &QuoteForm) -> u8 {
    let distance = if crosses_zip_prefix(&form.from_zip, &form.to_zip) {
        DISTANCE_BONUS
    } else {
        0
    };
    let timing = if form.timing == MoveTiming::Asap {
        ASAP_BONUS
    } else {
        0
    };

    let raw = distance + size_weight(form.size) + form.services.enabled_count() + timing;
    raw.min(MAX_SCORE)
}

/// A move that leaves the ZIP sectional-center prefix (first three
/// characters) is treated as long-distance. Blank ZIPs never qualify.
fn crosses_zip_prefix(from_zip: &str, to_zip: &str) -> bool {
    if from_zip.is_empty() || to_zip.is_empty() {
        return false;
    }
    zip_prefix(from_zip) != zip_prefix(to_zip)
}

fn zip_prefix(zip: &str) -> &str {
    match zip.char_indices().nth(3) {
        Some((index, _)) => &zip[..index],
        None => zip,
    }
}

fn size_weight(size: MoveSize) -> u8 {
    match size {
        MoveSize::Studio => 1,
        MoveSize::Apartment => 2,
        MoveSize::Townhouse => 3,
        MoveSize::SingleFamilyHome => 4,
        MoveSize::OfficeCommercial => 5,
    }
}
