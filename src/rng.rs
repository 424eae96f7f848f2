//! Deterministic pseudo-random streams.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Stream used to sample the surface of the parts.
pub(crate) const SAMPLE_STREAM: u64 = 0;
/// Stream used to shuffle the untried actions of a tree search.
pub(crate) const SEARCH_STREAM: u64 = 1;
/// Stream used to pick the random planes of the search rollouts.
pub(crate) const ROLLOUT_STREAM: u64 = 2;

/// A generator seeded from `seed` and positioned on the substream `stream`.
///
/// Two generators built with the same `(seed, stream)` pair produce the same
/// sequence, regardless of the thread they run on.
pub(crate) fn stream(seed: u64, stream: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(stream);
    rng
}
