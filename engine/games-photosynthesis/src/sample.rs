//! Fixed-size binary training samples.
//!
//! One record per observed position, little-endian:
//!
//! ```text
//! offset  size  field
//!      0    32  tree bitmasks, size 0..=3 (u64 each)
//!     32    16  owner bitmasks, player 0 and 1
//!     48     8  dormant bitmask
//!     56     1  waiting flags (bit 0 player 0, bit 1 player 1)
//!     57     1  day
//!     58     1  nutrients
//!     59     2  sun, player 0 and 1
//!     61     2  score, player 0 and 1
//!     63     2  pending action bits, bit 15 set when present
//!     65     1  pending nutrients
//!     66     1  pending seed cost
//!     67     8  arid bitmask
//!     75     2  player 0 final points (u16)
//!     77     2  player 1 final points (u16)
//!     79     1  winner tag
//! ```

use thiserror::Error;

use crate::action::Action;
use crate::cells::CellSet;
use crate::outcome::Winner;
use crate::state::{Pending, State, PLAYERS};

/// Bytes used by an encoded [`State`].
pub const STATE_BYTES: usize = 67;

/// Bytes used by an encoded [`TrainingSample`].
pub const SAMPLE_BYTES: usize = STATE_BYTES + 8 + 2 + 2 + 1;

const PENDING_PRESENT: u16 = 1 << 15;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A position together with how the match it came from ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingSample {
    pub state: State,
    pub arid: CellSet,
    pub final_points: [u16; PLAYERS],
    pub winner: Winner,
}

fn put_u64(buf: &mut Vec<u8>, v: u64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

/// Cursor over a record being decoded. Length is checked up front.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn u8(&mut self) -> u8 {
        let v = self.bytes[self.pos];
        self.pos += 1;
        v
    }

    fn u16(&mut self) -> u16 {
        let v = u16::from_le_bytes([self.bytes[self.pos], self.bytes[self.pos + 1]]);
        self.pos += 2;
        v
    }

    fn u64(&mut self) -> u64 {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&self.bytes[self.pos..self.pos + 8]);
        self.pos += 8;
        u64::from_le_bytes(raw)
    }

    fn cells(&mut self, what: &str) -> Result<CellSet, DecodeError> {
        let bits = self.u64();
        let set = CellSet::from_bits(bits);
        if set.bits() != bits {
            return Err(DecodeError::CorruptedData(format!(
                "{what} has bits outside the board: {bits:#x}"
            )));
        }
        Ok(set)
    }
}

fn check_length(bytes: &[u8], expected: usize) -> Result<(), DecodeError> {
    if bytes.len() != expected {
        return Err(DecodeError::InvalidLength {
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

/// Append the encoded state to `buf`.
pub fn encode_state(state: &State, buf: &mut Vec<u8>) {
    for trees in state.trees {
        put_u64(buf, trees.bits());
    }
    for owner in state.owner {
        put_u64(buf, owner.bits());
    }
    put_u64(buf, state.dormant.bits());
    buf.push(u8::from(state.waiting[0]) | u8::from(state.waiting[1]) << 1);
    buf.push(state.day);
    buf.push(state.nutrients);
    buf.extend_from_slice(&state.sun);
    buf.extend_from_slice(&state.score);

    let (bits, nutrients, seed_cost) = match state.pending {
        Some(p) => (PENDING_PRESENT | p.action.to_bits(), p.nutrients, p.seed_cost),
        None => (0, 0, 0),
    };
    buf.extend_from_slice(&bits.to_le_bytes());
    buf.push(nutrients);
    buf.push(seed_cost);
}

fn read_state(r: &mut Reader<'_>) -> Result<State, DecodeError> {
    let mut state = State::new();
    for size in 0..state.trees.len() {
        state.trees[size] = r.cells("tree mask")?;
    }
    for player in 0..PLAYERS {
        state.owner[player] = r.cells("owner mask")?;
    }
    state.dormant = r.cells("dormant mask")?;

    let waiting = r.u8();
    if waiting > 0b11 {
        return Err(DecodeError::CorruptedData(format!(
            "waiting flags {waiting:#b}"
        )));
    }
    state.waiting = [waiting & 1 != 0, waiting & 2 != 0];
    state.day = r.u8();
    state.nutrients = r.u8();
    state.sun = [r.u8(), r.u8()];
    state.score = [r.u8(), r.u8()];

    let bits = r.u16();
    let nutrients = r.u8();
    let seed_cost = r.u8();
    state.pending = if bits & PENDING_PRESENT != 0 {
        let action = Action::from_bits(bits & !PENDING_PRESENT).ok_or_else(|| {
            DecodeError::CorruptedData(format!("pending action bits {bits:#x}"))
        })?;
        Some(Pending {
            action,
            nutrients,
            seed_cost,
        })
    } else {
        None
    };

    check_consistency(&state)?;
    Ok(state)
}

fn check_consistency(state: &State) -> Result<(), DecodeError> {
    let mut seen = CellSet::EMPTY;
    for trees in state.trees {
        if !(seen & trees).is_empty() {
            return Err(DecodeError::CorruptedData(
                "cell appears in two size classes".into(),
            ));
        }
        seen |= trees;
    }
    if !(state.owner[0] & state.owner[1]).is_empty() {
        return Err(DecodeError::CorruptedData("cell has two owners".into()));
    }
    if state.owner[0] | state.owner[1] != seen {
        return Err(DecodeError::CorruptedData(
            "owner masks disagree with tree masks".into(),
        ));
    }
    Ok(())
}

pub fn decode_state(bytes: &[u8]) -> Result<State, DecodeError> {
    check_length(bytes, STATE_BYTES)?;
    read_state(&mut Reader { bytes, pos: 0 })
}

impl TrainingSample {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(SAMPLE_BYTES);
        encode_state(&self.state, &mut buf);
        put_u64(&mut buf, self.arid.bits());
        for points in self.final_points {
            buf.extend_from_slice(&points.to_le_bytes());
        }
        buf.push(self.winner.tag());
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        check_length(bytes, SAMPLE_BYTES)?;
        let mut r = Reader { bytes, pos: 0 };
        let state = read_state(&mut r)?;
        let arid = r.cells("arid mask")?;
        let final_points = [r.u16(), r.u16()];
        let tag = r.u8();
        let winner = Winner::from_tag(tag)
            .ok_or_else(|| DecodeError::CorruptedData(format!("winner tag {tag}")))?;

        Ok(Self {
            state,
            arid,
            final_points,
            winner,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mid_game() -> State {
        let mut state = State::new();
        state.place_tree(0, 3, 0, true).unwrap();
        state.place_tree(8, 2, 1, false).unwrap();
        state.place_tree(25, 0, 0, true).unwrap();
        state.set_day(13);
        state.set_nutrients(17);
        state.set_sun(0, 9);
        state.set_sun(1, 14);
        state.set_score(1, 21);
        state.set_waiting(1, true);
        state.pending = Some(Pending {
            action: Action::Seed {
                source: 0,
                target: 25,
            },
            nutrients: 17,
            seed_cost: 2,
        });
        state
    }

    #[test]
    fn test_sample_preserves_every_field() {
        let sample = TrainingSample {
            state: mid_game(),
            arid: [19u8, 28].into_iter().collect(),
            final_points: [64, 71],
            winner: Winner::Player1,
        };
        let bytes = sample.encode();
        assert_eq!(bytes.len(), SAMPLE_BYTES);

        let decoded = TrainingSample::decode(&bytes).unwrap();
        assert_eq!(decoded, sample);
        // Equality on State skips these two.
        assert_eq!(decoded.state.day(), 13);
        assert_eq!(decoded.state.pending(), sample.state.pending());
    }

    #[test]
    fn test_wrong_length() {
        let err = TrainingSample::decode(&[0u8; 10]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidLength {
                expected: SAMPLE_BYTES,
                actual: 10
            }
        );
    }

    #[test]
    fn test_overlapping_size_classes_are_rejected() {
        let mut bytes = Vec::new();
        encode_state(&mid_game(), &mut bytes);
        // Put cell 0 into the size-0 mask as well.
        bytes[0] |= 1;
        assert!(matches!(
            decode_state(&bytes),
            Err(DecodeError::CorruptedData(_))
        ));
    }

    #[test]
    fn test_bad_winner_tag() {
        let sample = TrainingSample {
            state: State::new(),
            arid: CellSet::EMPTY,
            final_points: [0, 0],
            winner: Winner::Tie,
        };
        let mut bytes = sample.encode();
        bytes[SAMPLE_BYTES - 1] = 9;
        assert!(matches!(
            TrainingSample::decode(&bytes),
            Err(DecodeError::CorruptedData(_))
        ));
    }
}
