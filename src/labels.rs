//! Class label loading and species-label simplification.

use crate::constants::SIMPLIFIED_SPECIES;
use crate::error::{Error, Result};
use std::path::Path;

/// Load an ordered class label list.
///
/// A `.json` file is parsed as a JSON array of strings; anything else is
/// read as one label per line, skipping blank lines.
pub fn load_labels(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(Error::LabelsFileNotFound {
            path: path.to_path_buf(),
        });
    }

    let contents = std::fs::read_to_string(path).map_err(|e| Error::LabelsLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let labels: Vec<String> = if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("json")) {
        serde_json::from_str(&contents).map_err(|e| Error::LabelsLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?
    } else {
        contents
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect()
    };

    if labels.is_empty() {
        return Err(Error::LabelsLoad {
            path: path.to_path_buf(),
            reason: "label list is empty".to_string(),
        });
    }

    Ok(labels)
}

/// Reduce a raw model label to the recognized species vocabulary.
///
/// Model labels are composite strings such as `"Corvus corone_Carrion Crow"`.
/// The final underscore-delimited token is lowercased and tested for a
/// whole-word match against each recognized species in order; the first
/// match wins. `None` means the label contributes nothing to a persisted
/// summary.
pub fn simplify_species(raw_label: &str) -> Option<&'static str> {
    let common_name = raw_label
        .rsplit('_')
        .next()
        .unwrap_or(raw_label)
        .trim()
        .to_lowercase();

    SIMPLIFIED_SPECIES.iter().copied().find(|species| {
        let target = species.to_lowercase();
        common_name
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word == target)
    })
}
