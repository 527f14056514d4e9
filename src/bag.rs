//! 7-bag randomizer for piece generation
//!
//! All 7 kinds are shuffled and dealt out before the bag is refilled.
//! This prevents long droughts and long repeats.

use crate::tetromino::PieceKind;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// The 7-bag piece randomizer
#[derive(Debug, Clone)]
pub struct Bag {
    /// Remaining kinds of the current cycle, dealt from the end
    remaining: Vec<PieceKind>,
    rng: ChaCha8Rng,
}

impl Default for Bag {
    fn default() -> Self {
        Self::new()
    }
}

impl Bag {
    /// Create an empty bag with a random seed
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Create an empty bag whose shuffles are reproducible
    pub fn with_seed(seed: u64) -> Self {
        Self {
            remaining: Vec::with_capacity(PieceKind::ALL.len()),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Create a bag that deals `kinds` in order before shuffling normally.
    ///
    /// `kinds` must be unique and at most 7 long, like a real partial bag.
    pub fn with_queue(kinds: &[PieceKind], seed: u64) -> Self {
        debug_assert!(kinds.len() <= PieceKind::ALL.len());
        debug_assert!(
            kinds
                .iter()
                .enumerate()
                .all(|(i, kind)| !kinds[..i].contains(kind)),
            "queued kinds must be unique"
        );

        let mut bag = Self::with_seed(seed);
        bag.remaining = kinds.iter().rev().copied().collect();
        bag
    }

    /// Deal the next piece
    pub fn next(&mut self) -> PieceKind {
        self.refill_if_empty();
        // refill_if_empty guarantees at least one kind
        self.remaining.pop().unwrap_or(PieceKind::I)
    }

    /// Look at the next piece without dealing it
    pub fn peek(&mut self) -> PieceKind {
        self.refill_if_empty();
        self.remaining.last().copied().unwrap_or(PieceKind::I)
    }

    /// Number of kinds left in the current cycle
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    /// Throw away the current cycle; the next deal starts a fresh bag
    pub fn discard(&mut self) {
        self.remaining.clear();
    }

    fn refill_if_empty(&mut self) {
        if self.remaining.is_empty() {
            let mut fresh = PieceKind::ALL.to_vec();
            fresh.shuffle(&mut self.rng);
            self.remaining = fresh;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_bag_contains_all_pieces() {
        let mut bag = Bag::new();
        let pieces: HashSet<_> = (0..7).map(|_| bag.next()).collect();
        assert_eq!(pieces.len(), 7);
    }

    #[test]
    fn test_peek_does_not_deal() {
        let mut bag = Bag::with_seed(7);
        let peeked = bag.peek();
        assert_eq!(bag.remaining(), 7);
        assert_eq!(bag.peek(), peeked);
        assert_eq!(bag.next(), peeked);
        assert_eq!(bag.remaining(), 6);
    }

    #[test]
    fn test_refills_only_when_empty() {
        let mut bag = Bag::with_seed(1);
        for expected in (0..7).rev() {
            bag.next();
            assert_eq!(bag.remaining(), expected);
        }
        bag.next();
        assert_eq!(bag.remaining(), 6);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = Bag::with_seed(42);
        let mut b = Bag::with_seed(42);
        for _ in 0..50 {
            assert_eq!(a.next(), b.next());
        }
    }

    #[test]
    fn test_queue_deals_in_order_then_refills() {
        let mut bag = Bag::with_queue(&[PieceKind::I, PieceKind::O, PieceKind::T], 3);
        assert_eq!(bag.next(), PieceKind::I);
        assert_eq!(bag.peek(), PieceKind::O);
        assert_eq!(bag.next(), PieceKind::O);
        assert_eq!(bag.next(), PieceKind::T);
        let cycle: HashSet<_> = (0..7).map(|_| bag.next()).collect();
        assert_eq!(cycle.len(), 7);
    }

    #[test]
    fn test_discard_starts_new_cycle() {
        let mut bag = Bag::with_seed(9);
        bag.next();
        bag.next();
        bag.discard();
        let cycle: HashSet<_> = (0..7).map(|_| bag.next()).collect();
        assert_eq!(cycle.len(), 7);
    }

    proptest! {
        #[test]
        fn every_cycle_is_a_permutation(seed in any::<u64>(), cycles in 1usize..12) {
            let mut bag = Bag::with_seed(seed);
            for _ in 0..cycles {
                let mut cycle: Vec<_> = (0..7).map(|_| bag.next()).collect();
                cycle.sort();
                prop_assert_eq!(cycle, PieceKind::ALL.to_vec());
            }
        }
    }
}
