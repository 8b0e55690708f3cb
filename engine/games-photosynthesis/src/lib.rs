//! Photosynthesis game engine.
//!
//! Two players grow trees on a 37-cell hexagonal board for 24 days. Each
//! day both act "simultaneously": they spend sun points to plant seeds, grow
//! trees and harvest mature trees for points, then pass. At the end of the
//! day the sun moves one step round the board and every tree that is not in
//! the shadow of a tree at least as tall earns sun for its owner.
//!
//! # Layout
//!
//! - [`board`]: fixed topology tables (neighbours, mirror cells, richness,
//!   shadows, seed range), built at compile time
//! - [`cells`]: [`CellSet`], the 37-bit set every board property is stored in
//! - [`state`]: [`State`] and its transition, [`State::apply`]
//! - [`movegen`]: legal move enumeration and the search/rollout presets
//! - [`protocol`]: the referee's line protocol, both directions
//! - [`setup`], [`outcome`], [`observation`], [`sample`]: match setup,
//!   result, scorer features and binary training samples
//!
//! # Usage
//!
//! ```rust
//! use games_photosynthesis::{random_start, Action, MoveFilter};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let mut rng = ChaCha20Rng::seed_from_u64(42);
//! let (mut state, arid) = random_start(&mut rng);
//!
//! let actions = state.legal_actions(0, arid, MoveFilter::unblocked());
//! assert_eq!(actions[0], Action::Wait);
//!
//! state.apply(0, Action::Wait, arid).unwrap();
//! assert_eq!(state.next_player(), 1);
//! ```

pub mod action;
pub mod board;
pub mod cells;
pub mod error;
pub mod movegen;
pub mod observation;
pub mod outcome;
pub mod protocol;
pub mod sample;
pub mod setup;
pub mod state;

pub use action::{Action, ParseActionError};
pub use cells::{CellSet, CELL_COUNT};
pub use error::EngineError;
pub use movegen::{rollout_actions, tree_actions, MoveFilter};
pub use observation::{Observation, FEATURE_COUNT};
pub use outcome::{Outcome, Winner};
pub use protocol::{ProtocolError, TurnInput};
pub use sample::{DecodeError, TrainingSample, SAMPLE_BYTES};
pub use setup::random_start;
pub use state::{Pending, State, PLAYERS, TERMINAL_DAY};
