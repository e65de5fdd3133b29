use chrono::{DateTime, Local};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::map::{MapEntries, MapStore, SharedMap};
use crate::player::PlayerState;
use crate::session::{Position, RunState};
use crate::util::format_clock;

/// Editor state: what the user is typing and where.
pub struct EditorStores {
    /// Language of the selected file.
    pub language: Cell<Option<String>>,
    /// Every character typed this session.
    pub typed_chars: Cell<Vec<char>>,
    /// How many of the typed characters were correct.
    pub correct_chars: Cell<usize>,
    /// The local cursor position.
    pub position: Cell<Position>,
}

/// Timer state: raw seconds and the rendered clock.
pub struct TimerStores {
    /// Seconds since the timer started.
    pub elapsed: Cell<u64>,
    /// The clock rendered as `MM:SS`.
    pub display: Cell<String>,
}

/// Last published session metrics; `None` until first published.
pub struct MetricsStores {
    pub wpm: Cell<Option<f64>>,
    pub accuracy: Cell<Option<f64>>,
}

/// Multiplayer match state.
pub struct RaceStores {
    /// States of the remote players.
    pub players: Cell<Vec<PlayerState>>,
    /// Whether the match has started.
    pub started: Cell<bool>,
    /// Whether the local user is ready to race.
    pub user_ready: Cell<bool>,
}

/// The file being raced on.
pub struct FileStores {
    pub content: Cell<String>,
    /// Identifier of the selected file, if any.
    pub selected: Cell<Option<String>>,
}

/// Session lifecycle state.
pub struct SessionStores {
    pub state: Cell<RunState>,
    pub started_at: Cell<Option<DateTime<Local>>>,
}

/// All shared state of a race.
///
/// Built once at startup and passed by reference to every consumer;
/// there are no ambient singletons, so each test constructs a fresh
/// registry. Every field is an independent writable cell; the registry
/// imposes no producer/observer split.
pub struct Stores {
    pub editor: EditorStores,
    pub timer: TimerStores,
    pub metrics: MetricsStores,
    pub race: RaceStores,
    pub file: FileStores,
    pub session: SessionStores,
    /// Shared map holding the file content and url, kept in sync with
    /// peers by whoever owns the [`MapStore`].
    pub files: SharedMap,
}

impl Stores {
    /// Namespace of the shared file map.
    pub const FILE_MAP: &'static str = "file";

    pub fn new(maps: &MapStore) -> Self {
        Self {
            editor: EditorStores {
                language: Cell::new(None),
                typed_chars: Cell::new(Vec::new()),
                correct_chars: Cell::new(0),
                position: Cell::new(Position::default()),
            },
            timer: TimerStores {
                elapsed: Cell::new(0),
                display: Cell::new(format_clock(0)),
            },
            metrics: MetricsStores {
                wpm: Cell::new(None),
                accuracy: Cell::new(None),
            },
            race: RaceStores {
                players: Cell::new(Vec::new()),
                started: Cell::new(false),
                user_ready: Cell::new(false),
            },
            file: FileStores {
                content: Cell::new(String::new()),
                selected: Cell::new(None),
            },
            session: SessionStores {
                state: Cell::new(RunState::Stopped),
                started_at: Cell::new(None),
            },
            files: maps.get_map(Self::FILE_MAP),
        }
    }

    /// Returns every cell to its initial value through ordinary writes,
    /// so subscribers observe the reset. The shared file map belongs to
    /// the map store and is left alone.
    pub fn reset(&self) {
        self.editor.language.set(None);
        self.editor.typed_chars.set(Vec::new());
        self.editor.correct_chars.set(0);
        self.editor.position.set(Position::default());
        self.timer.elapsed.set(0);
        self.timer.display.set(format_clock(0));
        self.metrics.wpm.set(None);
        self.metrics.accuracy.set(None);
        self.race.players.set(Vec::new());
        self.race.started.set(false);
        self.race.user_ready.set(false);
        self.file.content.set(String::new());
        self.file.selected.set(None);
        self.session.state.set(RunState::Stopped);
        self.session.started_at.set(None);
    }

    /// Remote players ordered by progress, furthest along first. Ties
    /// keep join order.
    pub fn standings(&self) -> Vec<PlayerState> {
        self.race
            .players
            .get()
            .into_iter()
            .sorted_by(|a, b| b.progress.cmp(&a.progress))
            .collect()
    }

    /// Captures every current value, for debugging and test assertions.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            language: self.editor.language.get(),
            typed_chars: self.editor.typed_chars.get(),
            correct_chars: self.editor.correct_chars.get(),
            position: self.editor.position.get(),
            elapsed: self.timer.elapsed.get(),
            display: self.timer.display.get(),
            wpm: self.metrics.wpm.get(),
            accuracy: self.metrics.accuracy.get(),
            players: self.race.players.get(),
            started: self.race.started.get(),
            user_ready: self.race.user_ready.get(),
            content: self.file.content.get(),
            selected: self.file.selected.get(),
            state: self.session.state.get(),
            started_at: self.session.started_at.get(),
            files: self.files.cell().get(),
        }
    }
}

/// Point-in-time capture of a [`Stores`] registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub language: Option<String>,
    pub typed_chars: Vec<char>,
    pub correct_chars: usize,
    pub position: Position,
    pub elapsed: u64,
    pub display: String,
    pub wpm: Option<f64>,
    pub accuracy: Option<f64>,
    pub players: Vec<PlayerState>,
    pub started: bool,
    pub user_ready: bool,
    pub content: String,
    pub selected: Option<String>,
    pub state: RunState,
    pub started_at: Option<DateTime<Local>>,
    pub files: MapEntries,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn fresh_registry_holds_the_documented_initial_values() {
        let maps = MapStore::new();
        let stores = Stores::new(&maps);

        assert_eq!(stores.editor.language.get(), None);
        assert_eq!(stores.editor.typed_chars.get(), Vec::<char>::new());
        assert_eq!(stores.editor.correct_chars.get(), 0);
        assert_eq!(stores.editor.position.get(), Position::new(1, 1));
        assert_eq!(stores.timer.elapsed.get(), 0);
        assert_eq!(stores.timer.display.get(), "00:00");
        assert_eq!(stores.metrics.wpm.get(), None);
        assert_eq!(stores.metrics.accuracy.get(), None);
        assert!(stores.race.players.get().is_empty());
        assert!(!stores.race.started.get());
        assert!(!stores.race.user_ready.get());
        assert_eq!(stores.file.content.get(), "");
        assert_eq!(stores.file.selected.get(), None);
        assert_matches!(stores.session.state.get(), RunState::Stopped);
        assert_eq!(stores.session.started_at.get(), None);
        assert!(stores.files.is_empty());
    }

    #[test]
    fn cursor_update_moves_one_column() {
        let maps = MapStore::new();
        let stores = Stores::new(&maps);

        stores
            .editor
            .position
            .update(|p| Position::new(p.line, p.column + 1));
        assert_eq!(stores.editor.position.get(), Position::new(1, 2));
    }

    #[test]
    fn correct_chars_subscriber_sees_every_write_in_order() {
        let maps = MapStore::new();
        let stores = Stores::new(&maps);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = stores
            .editor
            .correct_chars
            .subscribe(move |n| sink.borrow_mut().push(*n));

        stores.editor.correct_chars.set(5);
        stores.editor.correct_chars.set(7);
        assert_eq!(*seen.borrow(), vec![0, 5, 7]);
    }

    #[test]
    fn reset_restores_initial_values_and_notifies() {
        let maps = MapStore::new();
        let stores = Stores::new(&maps);

        stores.editor.language.set(Some("rust".into()));
        stores.editor.typed_chars.set(vec!['f', 'n']);
        stores.editor.correct_chars.set(2);
        stores.timer.elapsed.set(42);
        stores.timer.display.set(format_clock(42));
        stores.race.started.set(true);
        stores.session.state.set(RunState::Active);
        stores.session.started_at.set(Some(Local::now()));

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = stores
            .race
            .started
            .subscribe(move |v| sink.borrow_mut().push(*v));

        stores.reset();

        assert_eq!(*seen.borrow(), vec![true, false]);
        assert_eq!(stores.editor.language.get(), None);
        assert_eq!(stores.editor.correct_chars.get(), 0);
        assert_eq!(stores.timer.display.get(), "00:00");
        assert_matches!(stores.session.state.get(), RunState::Stopped);
        assert_eq!(stores.session.started_at.get(), None);
    }

    #[test]
    fn reset_leaves_the_shared_file_map_alone() {
        let maps = MapStore::new();
        let stores = Stores::new(&maps);
        stores
            .files
            .insert("content", serde_json::json!("fn main() {}"));

        stores.reset();
        assert_eq!(stores.files.len(), 1);
    }

    #[test]
    fn standings_order_by_progress_with_stable_ties() {
        let maps = MapStore::new();
        let stores = Stores::new(&maps);

        let mut ada = PlayerState::new("p1", "ada");
        ada.progress = 40;
        let mut grace = PlayerState::new("p2", "grace");
        grace.progress = 90;
        let mut linus = PlayerState::new("p3", "linus");
        linus.progress = 40;

        stores
            .race
            .players
            .set(vec![ada.clone(), grace.clone(), linus.clone()]);

        let names: Vec<String> = stores
            .standings()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["grace", "ada", "linus"]);
    }

    #[test]
    fn registries_on_the_same_map_store_share_the_file_map() {
        let maps = MapStore::new();
        let ours = Stores::new(&maps);
        let theirs = Stores::new(&maps);

        ours.files
            .insert("url", serde_json::json!("https://example.com/main.rs"));
        assert_eq!(
            theirs.files.get("url"),
            Some(serde_json::json!("https://example.com/main.rs"))
        );
    }

    #[test]
    fn snapshot_captures_current_values_and_roundtrips() {
        let maps = MapStore::new();
        let stores = Stores::new(&maps);

        stores.editor.language.set(Some("rust".into()));
        stores.editor.typed_chars.set(vec!['f', 'n']);
        stores.editor.correct_chars.set(2);
        stores.timer.elapsed.set(61);
        stores.timer.display.set(format_clock(61));
        stores.metrics.wpm.set(Some(64.0));
        stores.race.user_ready.set(true);
        stores.files.insert("content", serde_json::json!("fn"));

        let snapshot = stores.snapshot();
        assert_eq!(snapshot.language.as_deref(), Some("rust"));
        assert_eq!(snapshot.typed_chars, vec!['f', 'n']);
        assert_eq!(snapshot.correct_chars, 2);
        assert_eq!(snapshot.display, "01:01");
        assert_eq!(snapshot.wpm, Some(64.0));
        assert!(snapshot.user_ready);
        assert_eq!(snapshot.files.len(), 1);

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
