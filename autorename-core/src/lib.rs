//! autorename-core: spreadsheet-driven renumbering of equipment files
//!
//! A renumbering workbook is fetched from SharePoint, one of its sheets is
//! chosen, the old-to-new identifier table is read from fixed cell ranges,
//! and files in the equipment directories are renamed accordingly.

pub mod columns;
pub mod config;
pub mod equipment;
pub mod error;
pub mod fetch;
pub mod numbers;
pub mod prompt;
pub mod reader;
pub mod rename;
pub mod sheet_select;

use serde::Serialize;
use std::fs;
use std::io;
use std::path::PathBuf;

pub use columns::ColumnLabelMap;
pub use config::{Backend, LayoutConfig, RenameConfig};
pub use error::{Error, Result};
pub use fetch::RemoteFetcher;
pub use numbers::NumberTuple;
pub use prompt::{Prompt, ScriptedPrompt, TerminalPrompt};
pub use rename::{RenamePlan, RenameRecord};
pub use sheet_select::{SearchTokens, SheetSelection};

/// Answers supplied up front instead of being asked interactively
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub machine: Option<String>,
    pub invoice: Option<String>,
    /// Exact sheet name, bypasses the search
    pub sheet: Option<String>,
    pub work_dir: Option<PathBuf>,
    pub order: Option<String>,
    /// Plan the renames without performing them
    pub dry_run: bool,
    /// Leave the downloaded workbook in place
    pub keep_temp: bool,
}

/// What a completed run did
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub sheet: String,
    pub columns: ColumnLabelMap,
    pub table: Vec<NumberTuple>,
    pub equipment: Vec<PathBuf>,
    pub plan: RenamePlan,
    /// False for a dry run
    pub applied: bool,
}

/// How a run ended
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Completed(RunSummary),
    /// The user quit during sheet selection
    Quit,
}

/// Main pipeline: fetch, select, map, build, order, rename, clean up
pub struct AutoRenamer {
    config: RenameConfig,
    fetcher: Box<dyn RemoteFetcher>,
}

impl AutoRenamer {
    /// Create a renamer using the backend named in the configuration
    pub fn new(config: RenameConfig) -> Result<Self> {
        let fetcher = fetch::create_fetcher(&config)?;
        Ok(Self::with_fetcher(config, fetcher))
    }

    /// Create a renamer with an explicit workbook source
    pub fn with_fetcher(config: RenameConfig, fetcher: Box<dyn RemoteFetcher>) -> Self {
        Self { config, fetcher }
    }

    /// Run every stage in order. Any error aborts the run and leaves the
    /// temp workbook in place; a completed or quit run removes it.
    pub fn run(&self, prompt: &mut dyn Prompt, options: &RunOptions) -> Result<RunOutcome> {
        let temp_path = &self.config.temp_path;
        tracing::info!("Fetching workbook with the {} backend", self.fetcher.name());
        self.fetcher.fetch(temp_path)?;

        // The workbook handle must be closed before the temp file is removed
        let sheet = {
            let mut workbook = reader::WorkbookFile::open(temp_path)?;
            let sheet_name = match &options.sheet {
                Some(name) => name.clone(),
                None => {
                    let tokens = SearchTokens::new(
                        answer(prompt, &options.machine, "Machine number (empty to search by invoice)")?,
                        answer(prompt, &options.invoice, "Invoice number")?,
                    );
                    match sheet_select::select_sheet(&workbook.sheet_names(), &tokens, prompt)? {
                        SheetSelection::Selected(name) => name,
                        SheetSelection::Quit => {
                            drop(workbook);
                            self.cleanup(options)?;
                            return Ok(RunOutcome::Quit);
                        }
                    }
                }
            };
            workbook.read_sheet(&sheet_name)?
        };

        let layout = &self.config.layout;
        let columns = columns::map_columns(
            &sheet,
            &layout.old_range()?,
            &layout.old_label,
            &layout.new_range()?,
            &layout.new_label,
        )?;
        let table = numbers::build_number_table(&sheet, &columns, layout.first_row, layout.last_row)?;

        let work_dir = match &options.work_dir {
            Some(dir) => dir.clone(),
            None => PathBuf::from(prompt.ask("Working directory (absolute path)")?),
        };
        let equipment = equipment::order_equipment(
            &work_dir,
            &layout.equipment_marker,
            columns.new.len(),
            prompt,
            options.order.as_deref(),
        )?;

        let plan = rename::plan_renames(&equipment, &table)?;
        if options.dry_run {
            tracing::info!("Dry run, {} rename(s) not applied", plan.renames.len());
        } else {
            rename::apply_renames(&plan)?;
        }

        self.cleanup(options)?;

        Ok(RunOutcome::Completed(RunSummary {
            sheet: sheet.name,
            columns,
            table,
            equipment,
            plan,
            applied: !options.dry_run,
        }))
    }

    fn cleanup(&self, options: &RunOptions) -> Result<()> {
        if options.keep_temp {
            return Ok(());
        }
        let path = &self.config.temp_path;
        match fs::remove_file(path) {
            Ok(()) => {
                tracing::debug!("Removed {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::filesystem(path, e)),
        }
    }
}

fn answer(prompt: &mut dyn Prompt, preset: &Option<String>, question: &str) -> Result<String> {
    match preset {
        Some(value) => Ok(value.clone()),
        None => prompt.ask(question),
    }
}
