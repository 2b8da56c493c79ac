// crates/wordlink-cli/src/output.rs
//
// Output formatting utilities for the wordlink CLI.
// Supports table and JSON output modes.

use serde::Serialize;
use tabled::{Table, Tabled};

use wordlink_core::game::GameState;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text and tables (default).
    Table,
    /// JSON output for machine consumption.
    Json,
}

/// A row in the chain display table.
#[derive(Tabled)]
pub struct ChainRow {
    #[tabled(rename = "#")]
    pub step: usize,
    #[tabled(rename = "Word")]
    pub word: String,
    #[tabled(rename = "Progress")]
    pub progress: String,
}

/// One row per chain word, then the target.
pub fn chain_rows(state: &GameState) -> Vec<ChainRow> {
    let mut rows: Vec<ChainRow> = state
        .current_chain
        .iter()
        .enumerate()
        .map(|(i, word)| ChainRow {
            step: i,
            word: word.clone(),
            progress: match i {
                0 => "start".to_string(),
                _ => state
                    .word_progresses
                    .get(i - 1)
                    .map(|p| format!("{:.0}%", p))
                    .unwrap_or_default(),
            },
        })
        .collect();

    if !state.is_complete {
        rows.push(ChainRow {
            step: rows.len(),
            word: format!("... {}", state.target_word),
            progress: "target".to_string(),
        });
    }
    rows
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

/// Print `data` as JSON, or `text` otherwise.
pub fn emit<T: Serialize>(format: OutputFormat, data: &T, text: impl FnOnce() -> String) {
    match format {
        OutputFormat::Json => println!("{}", format_json(data)),
        OutputFormat::Table => println!("{}", text()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_rows_include_pending_target() {
        let mut state = GameState::new("cat", "dog");
        state.current_chain.push("pet".to_string());
        state.word_progresses.push(42.4);
        state.score = 1;

        let rows = chain_rows(&state);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].progress, "start");
        assert_eq!(rows[1].progress, "42%");
        assert_eq!(rows[2].word, "... dog");
    }

    #[test]
    fn test_completed_chain_has_no_target_row() {
        let mut state = GameState::new("cat", "dog");
        state.current_chain.push("puppy".to_string());
        state.word_progresses.push(100.0);
        state.is_complete = true;
        assert_eq!(chain_rows(&state).len(), 2);
    }

    #[test]
    fn test_format_table_has_headers() {
        let state = GameState::new("cat", "dog");
        let table = format_table(&chain_rows(&state));
        assert!(table.contains("Word"));
        assert!(table.contains("cat"));
    }
}
