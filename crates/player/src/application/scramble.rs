//! Word scrambling for display.
//!
//! A uniform Fisher-Yates shuffle of the word's characters. The session
//! keeps the plain word; only the presenter ever sees the scrambled one.

use rand::seq::SliceRandom;
use rand::Rng;

/// Shuffle `word` with the thread-local RNG.
pub fn scramble(word: &str) -> String {
    scramble_with(&mut rand::thread_rng(), word)
}

/// Shuffle `word` with a caller-supplied RNG.
pub fn scramble_with<R: Rng + ?Sized>(rng: &mut R, word: &str) -> String {
    let mut letters: Vec<char> = word.chars().collect();
    letters.shuffle(rng);
    letters.into_iter().collect()
}
