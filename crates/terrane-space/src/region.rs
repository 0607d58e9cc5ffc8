//! Boolean node masks over a grid.

use crate::error::SpaceError;
use terrane_core::NodeId;

/// A subset of a grid's nodes, stored as a bitset.
///
/// The mask length is fixed at construction and always equals the
/// node count of the grid it was built for. Set algebra between masks of
/// different lengths fails with [`SpaceError::LengthMismatch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    bits: Vec<u64>,
    node_count: usize,
}

impl Region {
    const BITS_PER_WORD: usize = 64;

    /// An empty region over `node_count` nodes.
    pub fn new(node_count: usize) -> Self {
        Self {
            bits: vec![0; node_count.div_ceil(Self::BITS_PER_WORD)],
            node_count,
        }
    }

    /// A region containing every one of `node_count` nodes.
    pub fn full(node_count: usize) -> Self {
        Self::new(node_count).complement()
    }

    /// Build a region from one flag per node.
    pub fn from_mask(mask: &[bool]) -> Self {
        let mut region = Self::new(mask.len());
        for (n, &on) in mask.iter().enumerate() {
            if on {
                region.set_bit(n);
            }
        }
        region
    }

    /// Build a region containing the listed nodes.
    ///
    /// Returns `Err(SpaceError::NodeOutOfRange)` for a node outside
    /// `0..node_count`.
    pub fn from_nodes(
        node_count: usize,
        nodes: impl IntoIterator<Item = NodeId>,
    ) -> Result<Self, SpaceError> {
        let mut region = Self::new(node_count);
        for node in nodes {
            region.insert(node)?;
        }
        Ok(region)
    }

    /// Number of nodes the mask covers (member or not).
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Add a node to the region.
    pub fn insert(&mut self, node: NodeId) -> Result<(), SpaceError> {
        self.check(node)?;
        self.set_bit(node.index());
        Ok(())
    }

    /// Remove a node from the region.
    pub fn remove(&mut self, node: NodeId) -> Result<(), SpaceError> {
        self.check(node)?;
        let n = node.index();
        self.bits[n / Self::BITS_PER_WORD] &= !(1u64 << (n % Self::BITS_PER_WORD));
        Ok(())
    }

    /// Whether the node is a member. Out-of-range nodes never are.
    pub fn contains(&self, node: NodeId) -> bool {
        let n = node.index();
        n < self.node_count
            && self.bits[n / Self::BITS_PER_WORD] & (1u64 << (n % Self::BITS_PER_WORD)) != 0
    }

    /// Number of member nodes.
    pub fn count(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns `true` if no node is a member.
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&w| w == 0)
    }

    /// Nodes in either region.
    pub fn union(&self, other: &Self) -> Result<Self, SpaceError> {
        self.zip_with(other, |a, b| a | b)
    }

    /// Nodes in both regions.
    pub fn intersection(&self, other: &Self) -> Result<Self, SpaceError> {
        self.zip_with(other, |a, b| a & b)
    }

    /// Nodes in `self` but not in `other`.
    pub fn difference(&self, other: &Self) -> Result<Self, SpaceError> {
        self.zip_with(other, |a, b| a & !b)
    }

    /// Nodes of the grid not in `self`.
    pub fn complement(&self) -> Self {
        let mut bits: Vec<u64> = self.bits.iter().map(|w| !w).collect();
        let tail = self.node_count % Self::BITS_PER_WORD;
        if tail != 0 {
            if let Some(last) = bits.last_mut() {
                *last &= (1u64 << tail) - 1;
            }
        }
        Self {
            bits,
            node_count: self.node_count,
        }
    }

    /// Member nodes in ascending order.
    pub fn iter(&self) -> RegionIter<'_> {
        RegionIter {
            bits: &self.bits,
            word_idx: 0,
            current: self.bits.first().copied().unwrap_or(0),
        }
    }

    fn check(&self, node: NodeId) -> Result<(), SpaceError> {
        if node.index() >= self.node_count {
            return Err(SpaceError::NodeOutOfRange {
                node,
                node_count: self.node_count,
            });
        }
        Ok(())
    }

    fn set_bit(&mut self, n: usize) {
        self.bits[n / Self::BITS_PER_WORD] |= 1u64 << (n % Self::BITS_PER_WORD);
    }

    fn zip_with(&self, other: &Self, op: impl Fn(u64, u64) -> u64) -> Result<Self, SpaceError> {
        if self.node_count != other.node_count {
            return Err(SpaceError::LengthMismatch {
                left: self.node_count,
                right: other.node_count,
            });
        }
        let bits = self
            .bits
            .iter()
            .zip(&other.bits)
            .map(|(&a, &b)| op(a, b))
            .collect();
        Ok(Self {
            bits,
            node_count: self.node_count,
        })
    }
}

impl<'a> IntoIterator for &'a Region {
    type Item = NodeId;
    type IntoIter = RegionIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the members of a [`Region`], in ascending order.
#[derive(Clone, Debug)]
pub struct RegionIter<'a> {
    bits: &'a [u64],
    word_idx: usize,
    current: u64,
}

impl Iterator for RegionIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1;
                return Some(NodeId((self.word_idx * Region::BITS_PER_WORD + bit) as u32));
            }
            self.word_idx += 1;
            self.current = *self.bits.get(self.word_idx)?;
        }
    }
}
