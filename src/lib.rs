// Library surface for the shared state layer of a code-typing race.
// Keep this lean: the observable primitives first, the registry on top.
pub mod cell;
pub mod derived;
pub mod map;
pub mod player;
pub mod session;
pub mod stores;
pub mod util;

pub use cell::{Cell, Subscription};
pub use derived::{derive, derive2, ReadCell};
pub use map::{MapEntries, MapStore, SharedMap};
pub use player::PlayerState;
pub use session::{Position, RunState};
pub use stores::{Snapshot, Stores};
