//! Pass-local transfer quota ledger.
//!
//! Seeded from the inventory's quota at the start of each pass. Every fetch
//! reserves its full expected size up front so later files in the same pass
//! are weighed against the shrinking balance, not a stale snapshot.

/// Remaining transfer budget for one scheduling pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaLedger {
    initial: u64,
    available: u64,
}

impl QuotaLedger {
    /// Create a ledger with `available` bytes (e.g. from [`crate::inventory::Inventory::quota`]).
    pub fn new(available: u64) -> Self {
        Self {
            initial: available,
            available,
        }
    }

    /// Bytes still available in this pass.
    pub fn current(&self) -> u64 {
        self.available
    }

    /// Bytes reserved so far in this pass.
    pub fn reserved(&self) -> u64 {
        self.initial - self.available
    }

    /// Reserve `n` bytes. All-or-nothing: returns false and leaves the
    /// balance untouched when `n` exceeds what is available.
    pub fn reserve(&mut self, n: u64) -> bool {
        match self.available.checked_sub(n) {
            Some(rest) => {
                self.available = rest;
                true
            }
            None => false,
        }
    }
}
