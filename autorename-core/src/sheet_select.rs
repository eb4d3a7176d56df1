//! Resolving the worksheet from a machine number and an invoice number

use crate::error::{Error, Result};
use crate::prompt::Prompt;

/// The two search strings typed by the user; either may be empty
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTokens {
    pub machine: String,
    pub invoice: String,
}

impl SearchTokens {
    pub fn new(machine: impl Into<String>, invoice: impl Into<String>) -> Self {
        Self {
            machine: machine.into().trim().to_string(),
            invoice: invoice.into().trim().to_string(),
        }
    }

    fn active(&self) -> impl Iterator<Item = &str> {
        [self.machine.as_str(), self.invoice.as_str()]
            .into_iter()
            .filter(|t| !t.is_empty())
    }

    /// Every non-empty token is contained in the name
    pub fn matches_all(&self, name: &str) -> bool {
        let mut tokens = self.active().peekable();
        tokens.peek().is_some() && tokens.all(|t| name.contains(t))
    }

    /// At least one non-empty token is contained in the name
    pub fn matches_any(&self, name: &str) -> bool {
        self.active().any(|t| name.contains(t))
    }
}

/// Outcome of the sheet search before any user choice
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetMatch {
    /// First sheet matching every token
    Exact(String),
    /// Sheets matching some token, in workbook order
    Partial(Vec<String>),
    /// Nothing matched
    None,
}

/// Result of the interactive selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelection {
    Selected(String),
    /// The user asked to leave
    Quit,
}

/// Search sheet names; the first exact match short-circuits
pub fn find_sheet(names: &[String], tokens: &SearchTokens) -> SheetMatch {
    let mut candidates = Vec::new();
    for name in names {
        if tokens.matches_all(name) {
            return SheetMatch::Exact(name.clone());
        } else if tokens.matches_any(name) {
            candidates.push(name.clone());
        }
    }
    if candidates.is_empty() {
        SheetMatch::None
    } else {
        SheetMatch::Partial(candidates)
    }
}

/// Resolve the worksheet, asking the user to choose when the search is not
/// conclusive. With no candidate at all, every sheet is offered.
pub fn select_sheet(
    names: &[String],
    tokens: &SearchTokens,
    prompt: &mut dyn Prompt,
) -> Result<SheetSelection> {
    if names.is_empty() {
        return Err(Error::DataCoherence(
            "the workbook does not contain any worksheet".to_string(),
        ));
    }

    let candidates = match find_sheet(names, tokens) {
        SheetMatch::Exact(name) => {
            tracing::info!("Sheet '{}' matches the search", name);
            return Ok(SheetSelection::Selected(name));
        }
        SheetMatch::Partial(candidates) => {
            prompt.say("No sheet fully matches the search, but some are close:");
            candidates
        }
        SheetMatch::None => {
            prompt.say("No sheet matches the search; all sheets:");
            names.to_vec()
        }
    };

    for (i, name) in candidates.iter().enumerate() {
        prompt.say(&format!("{} : {}", i, name));
    }
    prompt.say("q to quit");

    loop {
        let choice = prompt.ask("Choice")?;
        let choice = choice.trim();
        if choice.eq_ignore_ascii_case("q") || choice.eq_ignore_ascii_case("quit") {
            return Ok(SheetSelection::Quit);
        }
        match choice.parse::<usize>().ok().and_then(|i| candidates.get(i)) {
            Some(name) => return Ok(SheetSelection::Selected(name.clone())),
            None => prompt.say(&format!(
                "'{}' is not a valid choice, enter 0 to {} or q",
                choice,
                candidates.len() - 1
            )),
        }
    }
}
