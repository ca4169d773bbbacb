// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Range morsel coordinator
//!
//! Hands out disjoint, contiguous offset ranges from `[0, max_offset)` to
//! concurrent workers. Claims are a lock-free CAS loop on a single cursor
//! that only ever increases.

use crate::exec::context::Interrupt;
use crate::storage::INVALID_OFFSET;
use std::sync::atomic::{AtomicU64, Ordering};

/// Half-open offset range `[start, end)` claimed by one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Morsel {
    pub start: u64,
    pub end: u64,
}

impl Morsel {
    /// Sentinel returned once no work remains
    pub const EXHAUSTED: Morsel = Morsel {
        start: INVALID_OFFSET,
        end: INVALID_OFFSET,
    };

    pub fn is_exhausted(&self) -> bool {
        self.start == INVALID_OFFSET
    }

    pub fn len(&self) -> u64 {
        if self.is_exhausted() {
            0
        } else {
            self.end - self.start
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
pub struct RangeMorselCoordinator {
    max_offset: u64,
    cursor: AtomicU64,
    interrupt: Interrupt,
}

impl RangeMorselCoordinator {
    pub fn new(max_offset: u64) -> Self {
        Self::with_interrupt(max_offset, Interrupt::new())
    }

    /// Coordinator that stops handing out morsels once `interrupt` is raised
    pub fn with_interrupt(max_offset: u64, interrupt: Interrupt) -> Self {
        Self {
            max_offset,
            cursor: AtomicU64::new(0),
            interrupt,
        }
    }

    pub fn max_offset(&self) -> u64 {
        self.max_offset
    }

    /// Claim the next `batch` offsets
    ///
    /// Returns [`Morsel::EXHAUSTED`] once the domain is drained or the
    /// execution was interrupted. A zero batch claims a single offset.
    pub fn get_morsel(&self, batch: u64) -> Morsel {
        if self.interrupt.is_raised() {
            return Morsel::EXHAUSTED;
        }
        let batch = batch.max(1);
        let mut start = self.cursor.load(Ordering::Relaxed);
        loop {
            if start >= self.max_offset {
                return Morsel::EXHAUSTED;
            }
            let end = start + batch.min(self.max_offset - start);
            match self.cursor.compare_exchange_weak(
                start,
                end,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Morsel { start, end },
                Err(current) => start = current,
            }
        }
    }

    /// Fraction of the domain claimed so far
    pub fn progress(&self) -> f64 {
        if self.max_offset == 0 {
            return 1.0;
        }
        let claimed = self.cursor.load(Ordering::Relaxed).min(self.max_offset);
        claimed as f64 / self.max_offset as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_ten_offsets_batch_three() {
        let coordinator = RangeMorselCoordinator::new(10);
        let claimed: Vec<(u64, u64)> = std::iter::from_fn(|| {
            let m = coordinator.get_morsel(3);
            (!m.is_exhausted()).then_some((m.start, m.end))
        })
        .collect();

        assert_eq!(claimed, vec![(0, 3), (3, 6), (6, 9), (9, 10)]);
        assert!(coordinator.get_morsel(3).is_exhausted());
        assert_eq!(coordinator.progress(), 1.0);
    }

    #[test]
    fn test_empty_domain() {
        let coordinator = RangeMorselCoordinator::new(0);
        assert!(coordinator.get_morsel(8).is_exhausted());
        assert_eq!(coordinator.progress(), 1.0);
    }

    #[test]
    fn test_zero_batch_claims_one() {
        let coordinator = RangeMorselCoordinator::new(2);
        assert_eq!(coordinator.get_morsel(0), Morsel { start: 0, end: 1 });
        assert_eq!(coordinator.progress(), 0.5);
    }

    #[test]
    fn test_interrupt_returns_sentinel() {
        let interrupt = Interrupt::new();
        let coordinator = RangeMorselCoordinator::with_interrupt(100, interrupt.clone());
        assert!(!coordinator.get_morsel(10).is_exhausted());
        interrupt.raise();
        assert!(coordinator.get_morsel(10).is_exhausted());
    }

    #[test]
    fn test_concurrent_morsels_are_disjoint() {
        let max = 100_003u64;
        let coordinator = Arc::new(RangeMorselCoordinator::new(max));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let coordinator = coordinator.clone();
                std::thread::spawn(move || {
                    let mut mine = Vec::new();
                    loop {
                        let m = coordinator.get_morsel(1 + (t % 5) * 17);
                        if m.is_exhausted() {
                            break;
                        }
                        mine.push(m);
                    }
                    mine
                })
            })
            .collect();

        let mut seen = vec![false; max as usize];
        for handle in handles {
            for m in handle.join().unwrap() {
                for offset in m.start..m.end {
                    assert!(!seen[offset as usize], "offset {} claimed twice", offset);
                    seen[offset as usize] = true;
                }
            }
        }
        assert!(seen.iter().all(|s| *s));
    }
}
