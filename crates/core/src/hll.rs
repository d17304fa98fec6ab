// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HyperLogLog cardinality sketch used by the in-process store.
//!
//! Sketches are stored as plain string values: a 4-byte magic followed by
//! one byte per register.

use sha2::{Digest, Sha256};

const PRECISION: u32 = 12;
const REGISTERS: usize = 1 << PRECISION;
const MAGIC: &[u8; 4] = b"HLL1";

/// A dense HyperLogLog sketch with 2^12 registers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sketch {
    registers: Vec<u8>,
}

impl Default for Sketch {
    fn default() -> Self {
        Self::new()
    }
}

impl Sketch {
    pub fn new() -> Self {
        Sketch {
            registers: vec![0; REGISTERS],
        }
    }

    /// Parses a stored sketch. Returns `None` for any other string value.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let registers = bytes.strip_prefix(MAGIC.as_slice())?;
        if registers.len() != REGISTERS {
            return None;
        }
        Some(Sketch {
            registers: registers.to_vec(),
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(MAGIC.len() + REGISTERS);
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&self.registers);
        out
    }

    /// Registers a value. Returns whether any register changed.
    pub fn insert(&mut self, value: &[u8]) -> bool {
        let digest = Sha256::digest(value);
        let mut word = [0u8; 8];
        word.copy_from_slice(&digest[..8]);
        let hash = u64::from_be_bytes(word);

        let index = (hash >> (64 - PRECISION)) as usize;
        let rest = hash << PRECISION;
        let max_rank = (64 - PRECISION + 1) as u8;
        let rank = (rest.leading_zeros() + 1).min(u32::from(max_rank)) as u8;

        if rank > self.registers[index] {
            self.registers[index] = rank;
            true
        } else {
            false
        }
    }

    /// Folds another sketch into this one (register-wise maximum).
    pub fn merge(&mut self, other: &Sketch) {
        for (mine, theirs) in self.registers.iter_mut().zip(&other.registers) {
            *mine = (*mine).max(*theirs);
        }
    }

    /// Estimated number of distinct values inserted.
    pub fn estimate(&self) -> u64 {
        let m = REGISTERS as f64;
        let alpha = 0.7213 / (1.0 + 1.079 / m);
        let sum: f64 = self
            .registers
            .iter()
            .map(|&r| 2f64.powi(-i32::from(r)))
            .sum();
        let raw = alpha * m * m / sum;

        let zeros = self.registers.iter().filter(|&&r| r == 0).count();
        let estimate = if raw <= 2.5 * m && zeros > 0 {
            // Linear counting for small cardinalities.
            m * (m / zeros as f64).ln()
        } else {
            raw
        };
        estimate.round() as u64
    }
}

#[cfg(test)]
#[path = "hll_tests.rs"]
mod tests;
