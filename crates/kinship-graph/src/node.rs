//! Node identities and the sorted node store.
//!
//! Nodes are identified by phone number. The store keeps them in one
//! contiguous vector sorted ascending, so lookups are a binary search and
//! a node's position doubles as its stable `NodeId`.

use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Prefix used by the default phone number generator.
pub const DEFAULT_PREFIX: &str = "+33";

/// Width of the zero-padded numeric part of generated phone numbers.
pub const PHONE_DIGITS: usize = 10;

/// Index of a node in the sorted store.
///
/// Only meaningful for the graph that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn new(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    /// Generates `<prefix><index padded to 10 digits>`.
    ///
    /// Fixed-width digits keep lexicographic order consistent with
    /// numeric order, which the sorted store relies on.
    pub fn generate(prefix: &str, index: usize) -> Self {
        Self(format!("{}{:0width$}", prefix, index, width = PHONE_DIGITS))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PhoneNumber {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PhoneNumber {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Sorted collection of node identities.
#[derive(Debug, Default, Clone)]
pub struct NodeStore {
    numbers: Vec<PhoneNumber>,
}

impl NodeStore {
    /// Creates `count` nodes named by `generator(i)` and sorts them.
    pub fn build<F>(count: usize, mut generator: F) -> Result<Self>
    where
        F: FnMut(usize) -> PhoneNumber,
    {
        check_node_count(count)?;
        let mut numbers = Vec::with_capacity(count);
        for i in 0..count {
            numbers.push(generator(i));
        }
        Self::from_numbers(numbers)
    }

    /// Builds a store from an explicit list of identities.
    pub fn from_numbers(mut numbers: Vec<PhoneNumber>) -> Result<Self> {
        check_node_count(numbers.len())?;
        numbers.sort_unstable();

        if let Some(pair) = numbers.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(GraphError::DuplicateIdentity(pair[0].to_string()));
        }

        Ok(Self { numbers })
    }

    /// Binary search for a phone number.
    pub fn find(&self, number: &str) -> Option<NodeId> {
        self.numbers
            .binary_search_by(|probe| probe.as_str().cmp(number))
            .ok()
            .map(|index| NodeId(index as u32))
    }

    /// Returns the phone number of a node.
    ///
    /// Panics if `id` does not belong to this store.
    pub fn phone_number(&self, id: NodeId) -> &PhoneNumber {
        &self.numbers[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&PhoneNumber> {
        self.numbers.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    /// Iterates over all nodes in ascending phone number order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &PhoneNumber)> + '_ {
        self.numbers
            .iter()
            .enumerate()
            .map(|(index, number)| (NodeId(index as u32), number))
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.numbers.len() as u32).map(NodeId)
    }

    /// Approximate heap usage of the stored identities.
    pub fn heap_bytes(&self) -> usize {
        let strings: usize = self.numbers.iter().map(|n| n.0.capacity()).sum();
        self.numbers.capacity() * std::mem::size_of::<PhoneNumber>() + strings
    }
}

fn check_node_count(count: usize) -> Result<()> {
    if count > u32::MAX as usize {
        return Err(GraphError::TooManyNodes(count));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_generate_phone_number() {
        assert_eq!(PhoneNumber::generate("+33", 0).as_str(), "+330000000000");
        assert_eq!(PhoneNumber::generate("+33", 42).as_str(), "+330000000042");
        assert_eq!(
            PhoneNumber::generate("+1", 1_234_567_890).as_str(),
            "+11234567890"
        );
    }

    #[test]
    fn test_build_sorts_nodes() {
        // Reverse generator so the sort has work to do
        let store = NodeStore::build(100, |i| PhoneNumber::generate("+33", 99 - i)).unwrap();

        assert_eq!(store.len(), 100);
        let numbers: Vec<&PhoneNumber> = store.iter().map(|(_, n)| n).collect();
        assert!(numbers.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(store.phone_number(NodeId::new(0)).as_str(), "+330000000000");
    }

    #[test]
    fn test_find() {
        let store = NodeStore::build(10, |i| PhoneNumber::generate("+33", i)).unwrap();

        let id = store.find("+330000000007").unwrap();
        assert_eq!(store.phone_number(id).as_str(), "+330000000007");
        assert_eq!(store.find("+330000000010"), None);
        assert_eq!(store.find(""), None);
    }

    #[test]
    fn test_find_in_empty_store() {
        let store = NodeStore::build(0, |i| PhoneNumber::generate("+33", i)).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.find("+330000000000"), None);
    }

    #[test]
    fn test_duplicate_identity_rejected() {
        let result = NodeStore::from_numbers(vec!["a".into(), "b".into(), "a".into()]);
        assert_eq!(result.unwrap_err(), GraphError::DuplicateIdentity("a".into()));
    }

    #[test]
    fn test_numeric_order_matches_lexicographic_order() {
        let small = PhoneNumber::generate("+33", 9);
        let big = PhoneNumber::generate("+33", 10);
        assert!(small < big);
    }

    proptest! {
        #[test]
        fn find_agrees_with_linear_scan(
            numbers in proptest::collection::hash_set("[0-9]{1,6}", 0..64),
            probe in "[0-9]{1,6}",
        ) {
            let store = NodeStore::from_numbers(
                numbers.iter().map(|n| PhoneNumber::new(n.as_str())).collect(),
            ).unwrap();

            let linear = store.iter().find(|(_, n)| n.as_str() == probe).map(|(id, _)| id);
            prop_assert_eq!(store.find(&probe), linear);

            let sorted: Vec<&PhoneNumber> = store.iter().map(|(_, n)| n).collect();
            prop_assert!(sorted.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
