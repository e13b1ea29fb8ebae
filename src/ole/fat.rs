//! Allocation tables and the chain walker.
//!
//! A stream's sectors form a singly linked list inside an allocation table:
//! `table[sector]` names the next sector, and `ENDOFCHAIN` ends the list. The
//! same walker serves the FAT (regular sectors) and the MiniFAT (64-byte mini
//! sectors inside the mini stream).

use super::consts::ENDOFCHAIN;
use super::file::OleError;
use crate::common::binary::u32_array_le;
use fixedbitset::FixedBitSet;

/// Flat array of sector pointers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationTable {
    entries: Vec<u32>,
}

impl AllocationTable {
    #[inline]
    pub fn new(entries: Vec<u32>) -> Self {
        Self { entries }
    }

    /// Build a table from packed little-endian pointers.
    pub fn from_le_bytes(bytes: &[u8]) -> Self {
        Self::new(u32_array_le(bytes))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn get(&self, sector: u32) -> Option<u32> {
        self.entries.get(sector as usize).copied()
    }

    #[inline]
    pub fn entries(&self) -> &[u32] {
        &self.entries
    }

    /// Walk the chain that starts at `start`.
    ///
    /// # Examples
    ///
    /// ```
    /// use oletext::ole::AllocationTable;
    ///
    /// let fat = AllocationTable::new(vec![2, 0xFFFFFFFE, 1]);
    /// let chain: Result<Vec<u32>, _> = fat.chain(0).collect();
    /// assert_eq!(chain.unwrap(), vec![0, 2, 1]);
    /// ```
    pub fn chain(&self, start: u32) -> Chain<'_> {
        Chain {
            table: self,
            next: start,
            visited: FixedBitSet::with_capacity(self.entries.len()),
            done: false,
        }
    }
}

/// Iterator over the sector ids of one chain.
///
/// Yields an error and stops when a pointer leaves the table or a sector is
/// reached twice.
#[derive(Debug)]
pub struct Chain<'a> {
    table: &'a AllocationTable,
    next: u32,
    visited: FixedBitSet,
    done: bool,
}

impl Iterator for Chain<'_> {
    type Item = Result<u32, OleError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.next == ENDOFCHAIN {
            return None;
        }

        let sector = self.next;
        let index = sector as usize;
        if index >= self.table.len() {
            self.done = true;
            return Some(Err(OleError::DanglingSectorPointer {
                sector,
                table_len: self.table.len(),
            }));
        }
        if self.visited.contains(index) {
            self.done = true;
            return Some(Err(OleError::CyclicChain { sector }));
        }

        self.visited.insert(index);
        self.next = self.table.entries[index];
        Some(Ok(sector))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ole::consts::FREESECT;
    use proptest::prelude::*;

    #[test]
    fn test_chain_follows_links_in_order() {
        let fat = AllocationTable::new(vec![1, 2, ENDOFCHAIN, FREESECT]);
        let chain: Vec<u32> = fat.chain(0).collect::<Result<_, _>>().unwrap();
        assert_eq!(chain, vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_stream_chain() {
        let fat = AllocationTable::new(vec![ENDOFCHAIN]);
        assert_eq!(fat.chain(ENDOFCHAIN).count(), 0);
    }

    #[test]
    fn test_cycle_is_reported() {
        let fat = AllocationTable::new(vec![1, 2, 0]);
        let result: Vec<_> = fat.chain(0).collect();
        assert_eq!(result.len(), 4);
        assert!(matches!(
            result[3],
            Err(OleError::CyclicChain { sector: 0 })
        ));
    }

    #[test]
    fn test_self_loop_is_reported() {
        let fat = AllocationTable::new(vec![0]);
        let result: Result<Vec<u32>, _> = fat.chain(0).collect();
        assert!(matches!(result, Err(OleError::CyclicChain { sector: 0 })));
    }

    #[test]
    fn test_dangling_pointer() {
        let fat = AllocationTable::new(vec![5, ENDOFCHAIN]);
        let result: Result<Vec<u32>, _> = fat.chain(0).collect();
        assert!(matches!(
            result,
            Err(OleError::DanglingSectorPointer {
                sector: 5,
                table_len: 2
            })
        ));
        // A free marker inside a chain is just as dangling.
        let fat = AllocationTable::new(vec![FREESECT]);
        assert!(fat.chain(0).any(|r| r.is_err()));
    }

    #[test]
    fn test_from_le_bytes() {
        let mut bytes = Vec::new();
        for v in [1u32, ENDOFCHAIN] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        assert_eq!(AllocationTable::from_le_bytes(&bytes).entries(), &[1, ENDOFCHAIN]);
    }

    proptest! {
        #[test]
        fn chain_walk_terminates_without_repeats(
            links in prop::collection::vec(0u32..40, 1..32),
            start in 0u32..32,
        ) {
            // Link values past the table length dangle, the rest may cycle.
            let fat = AllocationTable::new(links.clone());
            let mut seen = std::collections::HashSet::new();
            let mut steps = 0usize;
            for item in fat.chain(start) {
                steps += 1;
                prop_assert!(steps <= links.len() + 1);
                match item {
                    Ok(sector) => prop_assert!(seen.insert(sector)),
                    Err(_) => break,
                }
            }
        }
    }
}
