//! Output formatters for the run summary

use anyhow::Result;
use autorename_core::RunSummary;
use colored::*;
use std::path::Path;

/// Print the summary table and the rename report with colors
pub fn print_human(summary: &RunSummary) {
    println!();
    println!("{} {}", "Sheet:".bold(), summary.sheet.cyan().bold());
    println!();
    print_number_table(summary);

    println!();
    let title = if summary.applied {
        "Renamed files:"
    } else {
        "Planned renames (dry run):"
    };
    println!("{}", title.bold().underline());
    if summary.plan.renames.is_empty() {
        println!("  {}", "nothing to rename".bright_black());
    }
    for record in &summary.plan.renames {
        println!(
            "  [{}] {} {} {}",
            record.equipment,
            record.from.display(),
            "->".bright_black(),
            file_name(&record.to).green()
        );
    }

    if !summary.plan.untouched.is_empty() {
        println!();
        println!("{}", "Not editing:".bold().underline());
        for path in &summary.plan.untouched {
            println!("  {}", path.display().to_string().bright_black());
        }
    }

    if !summary.plan.unmatched.is_empty() {
        println!();
        println!("{}", "Skipped, no new number in the sheet:".bold().underline());
        for path in &summary.plan.unmatched {
            println!("  {} {}", "WARN".yellow().bold(), path.display());
        }
    }

    println!();
    println!("{}", "Summary:".bold().underline());
    println!("  {} {}", "Renamed:".green().bold(), renamed_count(summary));
    if !summary.applied {
        println!("  {} {}", "Planned:".blue().bold(), summary.plan.renames.len());
    }
    println!("  {} {}", "Untouched:".bold(), summary.plan.untouched.len());
    if !summary.plan.unmatched.is_empty() {
        println!("  {} {}", "Skipped:".yellow().bold(), summary.plan.unmatched.len());
    }
}

fn print_number_table(summary: &RunSummary) {
    let mut header = vec![format!("{} (old)", summary.columns.old_letter())];
    for (equipment, letter) in summary.columns.new_letters().iter().enumerate() {
        let dir = summary
            .equipment
            .get(equipment)
            .map(|d| file_name(d))
            .unwrap_or_default();
        header.push(format!("{} {}", letter, dir));
    }

    let rows: Vec<Vec<String>> = summary
        .table
        .iter()
        .map(|t| {
            let mut row = vec![format!("{:07}", t.old)];
            row.extend(t.new.iter().cloned());
            row
        })
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|i| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(header[i].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let rule = format!(
        "+{}+",
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+")
    );
    let line = |cells: &[String]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!(" {:<w$} ", c, w = w))
            .collect();
        format!("|{}|", padded.join("|"))
    };

    println!("{}", "Summary table:".bold().underline());
    println!("{}", rule);
    println!("{}", line(&header).bold());
    println!("{}", rule);
    for row in &rows {
        println!("{}", line(row));
    }
    println!("{}", rule);
}

fn renamed_count(summary: &RunSummary) -> usize {
    if summary.applied {
        summary.plan.renames.len()
    } else {
        0
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Print the summary in JSON format
pub fn print_json(summary: &RunSummary) -> Result<()> {
    let output = serde_json::json!({
        "sheet": summary.sheet,
        "old_column": summary.columns.old_letter(),
        "new_columns": summary.columns.new_letters(),
        "table": summary.table,
        "equipment": summary.equipment,
        "renames": summary.plan.renames,
        "untouched": summary.plan.untouched,
        "unmatched": summary.plan.unmatched,
        "applied": summary.applied,
        "summary": {
            "renamed": renamed_count(summary),
            "planned": summary.plan.renames.len(),
            "untouched": summary.plan.untouched.len(),
            "skipped": summary.plan.unmatched.len(),
        }
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
