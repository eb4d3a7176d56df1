//! Console interaction

use crate::error::{Error, Result};
use std::collections::VecDeque;

/// Source of user answers and sink for the lines shown alongside questions
pub trait Prompt {
    /// Ask a free-text question; an empty answer is allowed
    fn ask(&mut self, question: &str) -> Result<String>;

    /// Show an informational line (lists, tables, notices)
    fn say(&mut self, line: &str);
}

/// Interactive prompt on the terminal
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn ask(&mut self, question: &str) -> Result<String> {
        dialoguer::Input::<String>::new()
            .with_prompt(question)
            .allow_empty(true)
            .interact_text()
            .map(|answer| answer.trim().to_string())
            .map_err(|e| Error::Prompt(e.to_string()))
    }

    fn say(&mut self, line: &str) {
        println!("{}", line);
    }
}

/// Prompt answering from a fixed script, recording everything shown
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
    pub transcript: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
        }
    }

    /// Answers not consumed yet
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&mut self, question: &str) -> Result<String> {
        self.transcript.push(format!("? {}", question));
        self.answers
            .pop_front()
            .ok_or_else(|| Error::Prompt(format!("no answer left for '{}'", question)))
    }

    fn say(&mut self, line: &str) {
        self.transcript.push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_prompt_runs_dry() {
        let mut prompt = ScriptedPrompt::new(["101"]);
        prompt.say("hello");
        assert_eq!(prompt.ask("Machine").unwrap(), "101");
        assert!(matches!(prompt.ask("Invoice"), Err(Error::Prompt(_))));
        assert_eq!(prompt.transcript, vec!["hello", "? Machine", "? Invoice"]);
        assert_eq!(prompt.remaining(), 0);
    }
}
