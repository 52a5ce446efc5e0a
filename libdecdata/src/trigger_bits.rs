use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

use super::constants::{DEFAULT_CUT_HIGH, DEFAULT_CUT_LOW, TRIGGER_PATTERN_WIDTH};

/// Exclusive window a trigger TDC value must fall into for its bit to fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerCut {
    pub low: u32,
    pub high: u32,
}

impl Default for TriggerCut {
    fn default() -> Self {
        Self {
            low: DEFAULT_CUT_LOW,
            high: DEFAULT_CUT_HIGH,
        }
    }
}

impl TriggerCut {
    pub fn accepts(&self, value: u32) -> bool {
        value > self.low && value < self.high
    }
}

/// The trigger bit pattern of an event.
///
/// The trigger inputs are read by multihit TDCs, so a bit is set when any hit in the
/// bit's Location passes the cut. `pattern` is the same information packed as an integer.
#[derive(Debug, Clone)]
pub struct TriggerBits {
    bits: BitArr!(for 32, in u32, Lsb0),
    pattern: u32,
}

impl Default for TriggerBits {
    fn default() -> Self {
        Self {
            bits: BitArray::ZERO,
            pattern: 0,
        }
    }
}

impl TriggerBits {
    pub fn clear(&mut self) {
        self.bits = BitArray::ZERO;
        self.pattern = 0;
    }

    /// Evaluate bit `index` from the hits of its Location. Indices outside the pattern are ignored.
    pub fn apply(&mut self, index: u32, samples: &[u32], cut: &TriggerCut) {
        if index >= TRIGGER_PATTERN_WIDTH {
            return;
        }
        let bit = index as usize;
        self.bits.set(bit, false);
        if samples.iter().any(|value| cut.accepts(*value)) {
            self.bits.set(bit, true);
            self.pattern |= 1 << index;
        }
    }

    pub fn is_set(&self, index: u32) -> bool {
        index < TRIGGER_PATTERN_WIDTH && self.bits[index as usize]
    }

    pub fn pattern(&self) -> u32 {
        self.pattern
    }

    /// Indices of the bits that fired
    pub fn fired(&self) -> Vec<u32> {
        self.bits.iter_ones().map(|idx| idx as u32).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_set_once() {
        let cut = TriggerCut { low: 0, high: 1500 };
        let mut bits = TriggerBits::default();
        bits.apply(3, &[100, 2000], &cut);
        assert!(bits.is_set(3));
        assert_eq!(bits.pattern(), 1 << 3);
        bits.apply(3, &[100, 200, 300], &cut);
        assert_eq!(bits.pattern(), 1 << 3);
        assert_eq!(bits.fired(), vec![3]);
    }

    #[test]
    fn test_cut_is_exclusive() {
        let cut = TriggerCut::default();
        let mut bits = TriggerBits::default();
        bits.apply(1, &[0, 1500], &cut);
        assert!(!bits.is_set(1));
        assert_eq!(bits.pattern(), 0);
        bits.apply(2, &[], &cut);
        assert!(!bits.is_set(2));
    }

    #[test]
    fn test_out_of_range_ignored() {
        let cut = TriggerCut::default();
        let mut bits = TriggerBits::default();
        bits.apply(32, &[100], &cut);
        bits.apply(100, &[100], &cut);
        assert_eq!(bits.pattern(), 0);
        assert!(!bits.is_set(32));
        bits.apply(31, &[100], &cut);
        assert_eq!(bits.pattern(), 1 << 31);
        bits.clear();
        assert_eq!(bits.pattern(), 0);
        assert!(bits.fired().is_empty());
    }
}
