//! Deterministic host name generation
//!
//! Both ends of the channel derive the same ordered sequence of synthetic host
//! names from a shared 32-bit seed. Every channel cycle consumes exactly one
//! name on both sides, whether or not the cycle issues a query; a side that
//! skips a draw falls out of step and every later bit decodes as noise.
//!
//! Names look like `<label>.<tld>`: a label of `n - 4` lowercase letters, a dot,
//! and a three-letter suffix, `n` in `[MIN_NAME_LEN, MAX_NAME_LEN]`.

use chrono::Utc;

/// Shortest generated name, including the dot and suffix
pub const MIN_NAME_LEN: usize = 7;

/// Longest generated name, including the dot and suffix
pub const MAX_NAME_LEN: usize = 20;

/// Letters in the suffix after the dot
const SUFFIX_LEN: usize = 3;

const LCG_MULTIPLIER: u32 = 1_103_515_245;
const LCG_INCREMENT: u32 = 12_345;

/// Letter scratch space: the longest label rounded up to a whole group of three
const SCRATCH_LEN: usize = MAX_NAME_LEN + 2;

const SECONDS_PER_DAY: i64 = 86_400;

/// Seed derived from the current UTC day number
///
/// Two endpoints started on the same calendar day (UTC) agree on this value
/// without any coordination.
pub fn day_seed() -> u32 {
    (Utc::now().timestamp() / SECONDS_PER_DAY) as u32
}

/// Generator of the shared name sequence
///
/// The sole state is the linear congruential generator word. Computing a
/// name's length reads the state; only drawing letters advances it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameSequencer {
    state: u32,
}

impl NameSequencer {
    /// Create a sequencer positioned at the start of `seed`'s sequence
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Current generator word
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Length of the name the next call to [`next_name`](Self::next_name)
    /// will return. Does not advance the generator.
    pub fn peek_len(&self) -> usize {
        let span = (MAX_NAME_LEN - MIN_NAME_LEN + 1) as u32;
        (self.state % span) as usize + MIN_NAME_LEN
    }

    /// Produce the next name in the sequence
    ///
    /// Precondition for channel use: called exactly once per channel cycle,
    /// in the same order on both endpoints.
    pub fn next_name(&mut self) -> String {
        let n = self.peek_len();
        let label_len = n - SUFFIX_LEN - 1;

        let mut name = Vec::with_capacity(n);
        self.push_letters(label_len, &mut name);
        name.push(b'.');
        self.push_letters(SUFFIX_LEN, &mut name);

        // Only a..z and '.' are ever pushed
        name.into_iter().map(char::from).collect()
    }

    /// Advance the generator and return its 15-bit output
    fn draw(&mut self) -> u16 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        ((self.state / 65_536) & 0x7FFF) as u16
    }

    /// Append `len` letters. One draw per group of three letters, plus one
    /// trailing draw whose low slices overwrite the last `len % 3` letters.
    /// The trailing draw happens even when `len` is a multiple of three.
    fn push_letters(&mut self, len: usize, out: &mut Vec<u8>) {
        debug_assert!((SUFFIX_LEN..=MAX_NAME_LEN).contains(&len));
        let mut scratch = [0u8; SCRATCH_LEN];

        for group in scratch[..len.div_ceil(3) * 3].chunks_exact_mut(3) {
            let bits = self.draw();
            for (slot, letter) in group.iter_mut().enumerate() {
                *letter = letter_from(bits, slot);
            }
        }

        let bits = self.draw();
        for slot in 0..len % 3 {
            scratch[len - 3 + slot] = letter_from(bits, slot);
        }

        out.extend_from_slice(&scratch[..len]);
    }
}

/// Map the `slot`-th 5-bit slice of `bits` onto `a..=z`
fn letter_from(bits: u16, slot: usize) -> u8 {
    b'a' + ((bits >> (5 * slot)) & 0x1F) as u8 % 26
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_sequence_seed_one() {
        let mut seq = NameSequencer::new(1);
        let names: Vec<String> = (0..4).map(|_| seq.next_name()).collect();
        assert_eq!(names, ["gbqe.ldr", "bpfcuwb.wfd", "focyb.bpf", "bqyfvurwye.sbe"]);
        assert_eq!(seq.state(), 1_343_201_072);
    }

    #[test]
    fn test_known_sequence_extreme_seeds() {
        let mut seq = NameSequencer::new(0);
        assert_eq!(seq.next_name(), "aaa.eyj");
        assert_eq!(seq.next_name(), "kndfqqnvpditaal.ffl");

        let mut seq = NameSequencer::new(u32::MAX);
        assert_eq!(seq.next_name(), "zrpzje.eca");
        assert_eq!(seq.next_name(), "csfjb.abh");
    }

    #[test]
    fn test_peek_len_does_not_advance() {
        let seq = NameSequencer::new(20_000);
        let before = seq.state();
        assert_eq!(seq.peek_len(), (20_000 % 14) as usize + MIN_NAME_LEN);
        assert_eq!(seq.state(), before);
    }

    #[test]
    fn test_name_shape() {
        let mut seq = NameSequencer::new(0xDEAD_BEEF);
        for _ in 0..2_000 {
            let expected = seq.peek_len();
            let name = seq.next_name();
            assert_eq!(name.len(), expected);
            assert!((MIN_NAME_LEN..=MAX_NAME_LEN).contains(&name.len()));

            let (label, suffix) = name.split_once('.').unwrap();
            assert_eq!(label.len(), expected - 4);
            assert_eq!(suffix.len(), 3);
            assert!(label.bytes().chain(suffix.bytes()).all(|b| b.is_ascii_lowercase()));
        }
    }

    #[test]
    fn test_draws_per_name() {
        // label of n-4 letters: ceil((n-4)/3) + 1 draws; suffix: 1 + 1 draws
        for seed in [1u32, 7, 99, 12_345, 4_000_000_000] {
            let mut seq = NameSequencer::new(seed);
            let n = seq.peek_len();
            let draws = (n - 4).div_ceil(3) + 1 + 2;

            let mut manual = NameSequencer::new(seed);
            for _ in 0..draws {
                manual.draw();
            }

            seq.next_name();
            assert_eq!(seq.state(), manual.state(), "seed {}", seed);
        }
    }

    #[test]
    fn test_day_seed_is_stable_within_a_call_pair() {
        let a = day_seed();
        let b = day_seed();
        // Only differs if the two calls straddle midnight UTC
        assert!(b == a || b == a + 1);
    }
}
