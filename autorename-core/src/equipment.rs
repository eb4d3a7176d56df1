//! Equipment directories and the order in which they map to new columns

use crate::error::{Error, Result};
use crate::prompt::Prompt;
use std::fs;
use std::path::{Path, PathBuf};

/// Immediate subdirectories of `root` whose name contains `marker`, by name
pub fn discover_equipment_dirs(root: &Path, marker: &str) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(root).map_err(|e| Error::filesystem(root, e))?;

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::filesystem(root, e))?;
        let is_dir = entry
            .file_type()
            .map_err(|e| Error::filesystem(entry.path(), e))?
            .is_dir();
        if is_dir && entry.file_name().to_string_lossy().contains(marker) {
            dirs.push(entry.path());
        }
    }
    dirs.sort();

    tracing::debug!(
        "{} equipment director{} under {}",
        dirs.len(),
        if dirs.len() == 1 { "y" } else { "ies" },
        root.display()
    );
    Ok(dirs)
}

/// One equipment directory per new identifier column
pub fn check_equipment_count(dirs: &[PathBuf], new_columns: usize) -> Result<()> {
    if dirs.len() != new_columns {
        return Err(Error::DataCoherence(format!(
            "found {} equipment director{} but the sheet has {} new identifier column(s)",
            dirs.len(),
            if dirs.len() == 1 { "y" } else { "ies" },
            new_columns
        )));
    }
    Ok(())
}

/// Parse an order such as `"102"` or `"1, 0, 2"` into a permutation of
/// `0..count`. Single digits may be run together.
pub fn parse_order(input: &str, count: usize) -> Option<Vec<usize>> {
    let input = input.trim();
    let parts: Vec<&str> = if input.contains(|c: char| c == ',' || c.is_whitespace()) {
        input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect()
    } else {
        // Unseparated input is one index per character
        input
            .char_indices()
            .map(|(i, c)| &input[i..i + c.len_utf8()])
            .collect()
    };

    if parts.len() != count {
        return None;
    }

    let mut seen = vec![false; count];
    let mut order = Vec::with_capacity(count);
    for part in parts {
        let index: usize = part.parse().ok()?;
        if index >= count || seen[index] {
            return None;
        }
        seen[index] = true;
        order.push(index);
    }
    Some(order)
}

/// Discover the equipment directories and let the user order them so that
/// position `i` receives the identifiers of new column `i`.
pub fn order_equipment(
    root: &Path,
    marker: &str,
    new_columns: usize,
    prompt: &mut dyn Prompt,
    preset: Option<&str>,
) -> Result<Vec<PathBuf>> {
    let dirs = discover_equipment_dirs(root, marker)?;
    check_equipment_count(&dirs, new_columns)?;

    let order = match preset {
        Some(preset) => parse_order(preset, dirs.len()).ok_or_else(|| {
            Error::DataCoherence(format!(
                "order '{}' is not a permutation of 0..{}",
                preset,
                dirs.len()
            ))
        })?,
        None => ask_order(&dirs, prompt)?,
    };

    let ordered: Vec<PathBuf> = order.into_iter().map(|i| dirs[i].clone()).collect();
    for (equipment, dir) in ordered.iter().enumerate() {
        tracing::info!("Equipment {} -> {}", equipment, dir.display());
    }
    Ok(ordered)
}

fn ask_order(dirs: &[PathBuf], prompt: &mut dyn Prompt) -> Result<Vec<usize>> {
    prompt.say("Associate each equipment with a column of new numbers.");
    prompt.say("Enter the equipment indices in column order (e.g. 102).");
    prompt.say("-------------------------");
    for (i, dir) in dirs.iter().enumerate() {
        prompt.say(&format!("| {} | {} |", i, dir.display()));
    }
    prompt.say("-------------------------");

    loop {
        let answer = prompt.ask("Order")?;
        if let Some(order) = parse_order(&answer, dirs.len()) {
            return Ok(order);
        }
        prompt.say(&format!(
            "'{}' is not a valid order of {} equipment(s)",
            answer.trim(),
            dirs.len()
        ));
    }
}
