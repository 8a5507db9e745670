// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::*;

/// Packed coils
///
/// Bits are packed LSB first. `quantity` is the number of coils announced by
/// the frame, or `8 * byte count` where the frame does not say.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Coils {
    pub(crate) data: Vec<u8>,
    pub(crate) quantity: usize,
}

impl Coils {
    /// Wrap packed coil bytes.
    #[must_use]
    pub fn new(quantity: usize, data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
            quantity,
        }
    }
    /// Quantity of coils
    #[must_use]
    pub const fn len(&self) -> usize {
        self.quantity
    }
    ///  Returns `true` if the container has no items.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.quantity == 0
    }
    /// Get a specific coil.
    ///
    /// Returns `None` past the announced quantity or past the packed bytes.
    #[must_use]
    pub fn get(&self, idx: usize) -> Option<Coil> {
        if idx + 1 > self.quantity {
            return None;
        }
        let byte = self.data.get(idx / 8)?;
        Some((byte >> (idx % 8)) & 0b1 > 0)
    }

    /// The packed bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.data
    }

    /// Iterate over the coils.
    #[must_use]
    pub fn iter(&self) -> CoilsIter<'_> {
        CoilsIter {
            cnt: 0,
            coils: self,
        }
    }
}

/// Coils iterator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoilsIter<'c> {
    cnt: usize,
    coils: &'c Coils,
}

impl Iterator for CoilsIter<'_> {
    type Item = Coil;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.coils.get(self.cnt);
        self.cnt += 1;
        result
    }
}

impl<'c> IntoIterator for &'c Coils {
    type Item = Coil;
    type IntoIter = CoilsIter<'c>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn coils_len() {
        let coils = Coils::new(5, &[0, 1, 2]);
        assert_eq!(coils.len(), 5);
    }

    #[test]
    fn coils_empty() {
        let coils = Coils::new(0, &[0, 1, 2]);
        assert!(coils.is_empty());
    }

    #[test]
    fn coils_get() {
        let coils = Coils::new(3, &[0b1]);
        assert_eq!(coils.get(0), Some(true));
        assert_eq!(coils.get(1), Some(false));
        assert_eq!(coils.get(2), Some(false));
        assert_eq!(coils.get(3), None);

        let coils = Coils::new(10, &[0xff, 0b11]);
        assert_eq!(coils.get(8), Some(true));
        assert_eq!(coils.get(9), Some(true));
        assert_eq!(coils.get(10), None);
    }

    #[test]
    fn coils_get_beyond_payload() {
        // quantity claims more than the packed bytes carry
        let coils = Coils::new(12, &[0xff]);
        assert_eq!(coils.get(7), Some(true));
        assert_eq!(coils.get(8), None);
    }

    #[test]
    fn coils_iter() {
        let coils = Coils::new(4, &[0b_0000_1101]);
        let bits: Vec<Coil> = coils.iter().collect();
        assert_eq!(bits, [true, false, true, true]);
    }
}
