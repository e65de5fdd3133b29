use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::session::Position;

/// State a remote racer publishes while a match is running.
///
/// The transport that moves these between peers lives outside this
/// crate; locally they only ever sit inside the players cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: String,
    pub name: String,
    /// Characters typed so far; the race's progress measure.
    pub progress: usize,
    pub position: Position,
    pub wpm: Option<f64>,
    pub accuracy: Option<f64>,
    pub ready: bool,
    pub joined_at: DateTime<Local>,
}

impl PlayerState {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            progress: 0,
            position: Position::default(),
            wpm: None,
            accuracy: None,
            ready: false,
            joined_at: Local::now(),
        }
    }
}
