use serde::{Deserialize, Serialize};

/// Cursor position inside the raced file, 1-based like an editor gutter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

/// Whether a typing session is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum RunState {
    Stopped,
    Active,
}

impl Default for RunState {
    fn default() -> Self {
        RunState::Stopped
    }
}
