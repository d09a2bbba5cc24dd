//! `average_dog_weight`: a fixed breed-to-weight table.

use inkloop_core::error::ToolError;

/// Weight reported for any breed not in [`BREED_WEIGHTS`].
pub const DEFAULT_WEIGHT: &str = "50 lbs";

pub const BREED_WEIGHTS: &[(&str, &str)] = &[
    ("Scottish Terrier", "20 lbs"),
    ("Border Collie", "37 lbs"),
    ("Toy Poodle", "7 lbs"),
];

/// Look up `breed` (exact match). Never fails.
pub fn average_dog_weight(breed: &str) -> Result<String, ToolError> {
    let weight = BREED_WEIGHTS
        .iter()
        .find(|(name, _)| *name == breed)
        .map_or(DEFAULT_WEIGHT, |(_, w)| w);
    Ok(format!("An average {breed} weighs {weight}"))
}
