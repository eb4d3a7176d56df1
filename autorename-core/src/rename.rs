//! Recursive renaming of equipment files
//!
//! Renaming is split in two steps: [`plan_renames`] walks the equipment
//! directories and decides every rename up front, [`apply_renames`] performs
//! them. A plan with a collision is rejected before any file is touched.

use crate::error::{Error, Result};
use crate::numbers::NumberTuple;
use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use walkdir::WalkDir;

/// A single planned rename
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameRecord {
    /// Position of the equipment directory (= new identifier column)
    pub equipment: usize,
    pub from: PathBuf,
    pub to: PathBuf,
    pub old_id: u32,
    pub new_id: String,
}

/// Everything the walk found
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenamePlan {
    pub renames: Vec<RenameRecord>,
    /// Files without any 7-digit number, left as they are
    pub untouched: Vec<PathBuf>,
    /// Files with a 7-digit number that is not in the table, skipped
    pub unmatched: Vec<PathBuf>,
}

fn digit_runs() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[0-9]+").unwrap())
}

/// Byte ranges and values of the runs of exactly seven digits in `stem`
fn seven_digit_runs(stem: &str) -> Vec<(std::ops::Range<usize>, u32)> {
    digit_runs()
        .find_iter(stem)
        .filter(|m| m.len() == 7)
        .filter_map(|m| m.as_str().parse().ok().map(|id| (m.range(), id)))
        .collect()
}

/// Split a file name into stem and extension (with its dot)
fn split_name(name: &str) -> (&str, &str) {
    match Path::new(name).extension().and_then(|e| e.to_str()) {
        Some(ext) => name.split_at(name.len() - ext.len() - 1),
        None => (name, ""),
    }
}

/// Walk every equipment directory and decide the new name of each file
pub fn plan_renames(ordered_dirs: &[PathBuf], table: &[NumberTuple]) -> Result<RenamePlan> {
    let mut lookup: HashMap<u32, &NumberTuple> = HashMap::new();
    for tuple in table {
        if let Some(first) = lookup.get(&tuple.old) {
            tracing::warn!(
                "Identifier {:07} appears on rows {} and {}, using row {}",
                tuple.old,
                first.row,
                tuple.row,
                first.row
            );
        } else {
            lookup.insert(tuple.old, tuple);
        }
    }

    let mut plan = RenamePlan::default();
    let mut targets: HashSet<PathBuf> = HashSet::new();

    for (equipment, dir) in ordered_dirs.iter().enumerate() {
        for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                Error::filesystem(path, io::Error::other(e.to_string()))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.into_path();

            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                tracing::warn!("Not editing non UTF-8 name {}", path.display());
                plan.untouched.push(path);
                continue;
            };
            let (stem, extension) = split_name(name);

            let runs = seven_digit_runs(stem);
            if runs.is_empty() {
                tracing::debug!("Not editing {}", path.display());
                plan.untouched.push(path);
                continue;
            }

            let Some((range, tuple)) = runs
                .into_iter()
                .find_map(|(range, id)| lookup.get(&id).map(|t| (range, *t)))
            else {
                tracing::warn!("No new identifier for {}", path.display());
                plan.unmatched.push(path);
                continue;
            };

            let new_id = tuple.new_for(equipment).ok_or_else(|| {
                Error::DataCoherence(format!(
                    "identifier {:07} has no new identifier for equipment {}",
                    tuple.old, equipment
                ))
            })?;
            if new_id.contains(['/', '\\']) {
                return Err(Error::DataCoherence(format!(
                    "new identifier '{}' (row {}) contains a path separator",
                    new_id, tuple.row
                )));
            }

            let new_name = format!(
                "{}{}{}{}",
                &stem[..range.start],
                new_id,
                &stem[range.end..],
                extension
            );
            let to = path.with_file_name(new_name);
            if to == path {
                plan.untouched.push(path);
                continue;
            }
            if to.exists() || !targets.insert(to.clone()) {
                return Err(Error::filesystem(
                    &to,
                    io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!("rename target of {} already taken", path.display()),
                    ),
                ));
            }

            plan.renames.push(RenameRecord {
                equipment,
                from: path,
                to,
                old_id: tuple.old,
                new_id: new_id.to_string(),
            });
        }
    }

    tracing::info!(
        "Planned {} rename(s), {} untouched, {} without mapping",
        plan.renames.len(),
        plan.untouched.len(),
        plan.unmatched.len()
    );
    Ok(plan)
}

/// Perform the planned renames in order; stops at the first failure
pub fn apply_renames(plan: &RenamePlan) -> Result<usize> {
    for record in &plan.renames {
        if record.to.exists() {
            return Err(Error::filesystem(
                &record.to,
                io::Error::new(io::ErrorKind::AlreadyExists, "rename target already exists"),
            ));
        }
        fs::rename(&record.from, &record.to).map_err(|e| Error::filesystem(&record.from, e))?;
        tracing::info!("Renamed {} -> {}", record.from.display(), record.to.display());
    }
    Ok(plan.renames.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuple(old: u32, new: &[&str]) -> NumberTuple {
        NumberTuple {
            row: 18,
            old,
            new: new.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"data").unwrap();
    }

    #[test]
    fn test_split_name() {
        assert_eq!(split_name("1234567.xlsx"), ("1234567", ".xlsx"));
        assert_eq!(split_name("plan.v2.pdf"), ("plan.v2", ".pdf"));
        assert_eq!(split_name("README"), ("README", ""));
    }

    #[test]
    fn test_seven_digit_runs() {
        let runs = seven_digit_runs("1234567_rev2_12345678_7654321");
        let ids: Vec<u32> = runs.iter().map(|(_, id)| *id).collect();
        assert_eq!(ids, vec![1234567, 7654321]);
        assert_eq!(runs[0].0, 0..7);
    }

    #[test]
    fn test_renames_per_equipment_and_keeps_extension() {
        let root = tempfile::tempdir().unwrap();
        let a = root.path().join("EQUIPT-A");
        let b = root.path().join("EQUIPT-B");
        touch(&a.join("1234567.xlsx"));
        touch(&b.join("sub").join("1234567.xlsx"));
        touch(&b.join("1234567_rev2.pdf"));

        let table = vec![tuple(1234567, &["1000A", "1000B"])];
        let plan = plan_renames(&[a.clone(), b.clone()], &table).unwrap();
        assert_eq!(plan.renames.len(), 3);
        assert_eq!(apply_renames(&plan).unwrap(), 3);

        assert!(a.join("1000A.xlsx").exists());
        assert!(!a.join("1234567.xlsx").exists());
        assert!(b.join("sub").join("1000B.xlsx").exists());
        assert!(b.join("1000B_rev2.pdf").exists());
    }

    #[test]
    fn test_files_without_identifier_are_untouched() {
        let root = tempfile::tempdir().unwrap();
        let a = root.path().join("EQUIPT-A");
        touch(&a.join("notes.txt"));
        touch(&a.join("123456.txt"));

        let plan = plan_renames(&[a.clone()], &[tuple(1234567, &["1000A"])]).unwrap();
        assert!(plan.renames.is_empty());
        assert_eq!(plan.untouched.len(), 2);
        apply_renames(&plan).unwrap();
        assert!(a.join("notes.txt").exists());
    }

    #[test]
    fn test_unknown_identifier_is_skipped_and_reported() {
        let root = tempfile::tempdir().unwrap();
        let a = root.path().join("EQUIPT-A");
        touch(&a.join("9999999.xlsx"));

        let plan = plan_renames(&[a.clone()], &[tuple(1234567, &["1000A"])]).unwrap();
        assert!(plan.renames.is_empty());
        assert_eq!(plan.unmatched, vec![a.join("9999999.xlsx")]);
        apply_renames(&plan).unwrap();
        assert!(a.join("9999999.xlsx").exists());
    }

    #[test]
    fn test_duplicate_old_identifier_uses_first_row() {
        let root = tempfile::tempdir().unwrap();
        let a = root.path().join("EQUIPT-A");
        touch(&a.join("1111111.pdf"));

        let table = vec![
            NumberTuple {
                row: 18,
                old: 1111111,
                new: vec!["A".to_string()],
            },
            NumberTuple {
                row: 19,
                old: 1111111,
                new: vec!["B".to_string()],
            },
        ];
        let plan = plan_renames(&[a.clone()], &table).unwrap();
        assert_eq!(plan.renames.len(), 1);
        assert_eq!(plan.renames[0].new_id, "A");
        assert_eq!(plan.renames[0].to, a.join("A.pdf"));
    }

    #[test]
    fn test_first_known_run_is_replaced() {
        let root = tempfile::tempdir().unwrap();
        let a = root.path().join("EQUIPT-A");
        touch(&a.join("9999999_1234567.pdf"));

        let plan = plan_renames(&[a.clone()], &[tuple(1234567, &["1000A"])]).unwrap();
        assert_eq!(plan.renames.len(), 1);
        assert_eq!(plan.renames[0].to, a.join("9999999_1000A.pdf"));
        assert!(plan.unmatched.is_empty());
    }

    #[test]
    fn test_collision_rejected_before_renaming() {
        let root = tempfile::tempdir().unwrap();
        let a = root.path().join("EQUIPT-A");
        touch(&a.join("1111111.pdf"));
        touch(&a.join("2222222.pdf"));

        let table = vec![tuple(1111111, &["SAME"]), tuple(2222222, &["SAME"])];
        let err = plan_renames(&[a.clone()], &table).unwrap_err();
        assert!(matches!(err, Error::Filesystem { .. }));
        assert!(a.join("1111111.pdf").exists());
        assert!(a.join("2222222.pdf").exists());
    }

    #[test]
    fn test_existing_target_rejected() {
        let root = tempfile::tempdir().unwrap();
        let a = root.path().join("EQUIPT-A");
        touch(&a.join("1234567.pdf"));
        touch(&a.join("1000A.pdf"));

        let err = plan_renames(&[a], &[tuple(1234567, &["1000A"])]).unwrap_err();
        assert!(matches!(err, Error::Filesystem { .. }));
    }

    #[test]
    fn test_separator_in_new_identifier() {
        let root = tempfile::tempdir().unwrap();
        let a = root.path().join("EQUIPT-A");
        touch(&a.join("1234567.pdf"));

        let err = plan_renames(&[a], &[tuple(1234567, &["10/A"])]).unwrap_err();
        assert!(matches!(err, Error::DataCoherence(_)));
    }
}
