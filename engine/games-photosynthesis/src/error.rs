//! Engine error type.
//!
//! Every variant is a broken contract: an illegal action reached the state
//! engine, the protocol disagreed with our move generator, or an opponent
//! produced output we could not read. Callers are expected to stop the
//! match rather than recover.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("invariant violated: `{condition}` at {file}:{line}")]
    Invariant {
        condition: &'static str,
        file: &'static str,
        line: u32,
    },

    #[error("player {player} produced an unparseable action: {text:?}")]
    InvalidAction { player: usize, text: String },

    #[error("protocol listed {reported} legal actions but the generator produced {generated}")]
    ActionCountMismatch { reported: usize, generated: usize },
}

/// Return [`EngineError::Invariant`] from the enclosing function unless
/// `cond` holds. `invariant!(@violation "text")` builds the error value
/// without returning, for `let ... else` sites.
#[macro_export]
macro_rules! invariant {
    (@violation $condition:expr) => {
        $crate::EngineError::Invariant {
            condition: $condition,
            file: file!(),
            line: line!(),
        }
    };
    ($cond:expr) => {
        if !($cond) {
            return Err($crate::invariant!(@violation stringify!($cond)).into());
        }
    };
}
