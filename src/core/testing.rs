//! Scripted stand-ins for the operator, used by unit tests.
use std::collections::VecDeque;

use async_trait::async_trait;

use crate::ports::prompt::{InteractivePrompt, PromptError, PromptResult};

/// Prompt that replays pre-programmed answers and records what it was asked.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    selections: VecDeque<usize>,
    lines: VecDeque<String>,
    pub select_calls: usize,
    pub last_count: Option<usize>,
    pub presented: Vec<(String, Vec<String>)>,
    pub asked_labels: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new(selections: Vec<usize>) -> Self {
        Self {
            selections: selections.into(),
            ..Self::default()
        }
    }

    pub fn with_lines(mut self, lines: &[&str]) -> Self {
        self.lines = lines.iter().map(|l| l.to_string()).collect();
        self
    }
}

#[async_trait]
impl InteractivePrompt for ScriptedPrompt {
    async fn present(&mut self, title: &str, choices: &[String]) -> PromptResult<()> {
        self.presented.push((title.to_string(), choices.to_vec()));
        Ok(())
    }

    async fn select_index(&mut self, count: usize) -> PromptResult<usize> {
        self.select_calls += 1;
        self.last_count = Some(count);
        self.selections.pop_front().ok_or(PromptError::InputExhausted)
    }

    async fn read_line(&mut self, label: &str) -> PromptResult<String> {
        self.asked_labels.push(label.to_string());
        self.lines.pop_front().ok_or(PromptError::InputExhausted)
    }
}
