// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::*;

/// Modbus data (u16 values) as captured from the wire.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Data {
    pub(crate) data: Vec<u8>,
}

impl Data {
    /// Wrap raw payload bytes.
    #[must_use]
    pub fn new(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }
    /// Quantity of complete words (u16 values)
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len() / 2
    }
    ///  Returns `true` if the container has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Get a specific word.
    #[must_use]
    pub fn get(&self, idx: usize) -> Option<Word> {
        if idx + 1 > self.len() {
            return None;
        }
        let idx = idx * 2;
        Some(BigEndian::read_u16(&self.data[idx..idx + 2]))
    }

    /// The raw payload, including a trailing odd byte if present.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.data
    }

    /// Iterate over the words without consuming the payload.
    #[must_use]
    pub fn words(&self) -> DataIter<'_> {
        DataIter { cnt: 0, data: self }
    }
}

/// Data iterator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataIter<'d> {
    cnt: usize,
    data: &'d Data,
}

impl Iterator for DataIter<'_> {
    type Item = Word;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.data.get(self.cnt);
        self.cnt += 1;
        result
    }
}

impl<'d> IntoIterator for &'d Data {
    type Item = Word;
    type IntoIter = DataIter<'d>;

    fn into_iter(self) -> Self::IntoIter {
        self.words()
    }
}
