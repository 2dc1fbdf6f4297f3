//! "People you may know" suggestions.
//!
//! Suggestions come from a bounded-depth walk outward from the query node.
//! Every hop carries a score ratio, starting at 1.0:
//!
//! - reaching an existing friend adds nothing but doubles the ratio, so a
//!   friend's network weighs more
//! - reaching anyone else adds the current ratio to their score and halves
//!   the ratio for the next hop
//!
//! There is no visited set. A node reached through several paths (cycles
//! included) collects the contribution of every path.

use crate::edge::EdgeIndex;
use crate::graph::SocialGraph;
use crate::node::NodeId;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Number of suggestions returned by [`SocialGraph::suggest`].
pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

/// Walk depth used when the caller has no preference.
pub const DEFAULT_SUGGESTION_DEPTH: usize = 2;

/// A suggested contact and its accumulated score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Suggestion {
    pub node: NodeId,
    pub score: f64,
}

/// One pending edge traversal: arrive at `node` carrying `ratio`, with
/// `budget` hops left below it.
#[derive(Debug, Clone, Copy)]
struct Hop {
    node: NodeId,
    ratio: f64,
    budget: usize,
}

/// Scores keyed by node, remembering first-scored order.
#[derive(Debug, Default)]
struct ScoreBoard {
    slots: HashMap<NodeId, usize>,
    entries: Vec<Suggestion>,
}

impl ScoreBoard {
    fn add(&mut self, node: NodeId, amount: f64) {
        match self.slots.get(&node) {
            Some(&slot) => self.entries[slot].score += amount,
            None => {
                self.slots.insert(node, self.entries.len());
                self.entries.push(Suggestion {
                    node,
                    score: amount,
                });
            }
        }
    }

    /// Highest score first. The sort is stable, so equal scores keep
    /// first-scored order.
    fn into_ranked(mut self, limit: usize) -> Vec<Suggestion> {
        self.entries.sort_by(|a, b| b.score.total_cmp(&a.score));
        self.entries.truncate(limit);
        self.entries
    }
}

impl<E: EdgeIndex> SocialGraph<E> {
    /// Suggests up to ten contacts for a phone number.
    ///
    /// Unknown numbers and `depth == 0` yield an empty list.
    pub fn suggest(&self, number: &str, depth: usize) -> Vec<Suggestion> {
        self.suggest_with_limit(number, depth, DEFAULT_SUGGESTION_LIMIT)
    }

    /// Like [`suggest`](Self::suggest) with a caller-chosen result size.
    pub fn suggest_with_limit(&self, number: &str, depth: usize, limit: usize) -> Vec<Suggestion> {
        let root = match self.find_node(number) {
            Some(node) => node,
            None => return Vec::new(),
        };

        let friends: HashSet<NodeId> = self.edges.forward_neighbors(root).collect();
        let mut scores = ScoreBoard::default();
        let mut stack: Vec<Hop> = Vec::new();

        if depth > 0 {
            self.push_children(&mut stack, root, 1.0, depth - 1);
        }

        // Children are pushed reversed so pops follow recursive pre-order
        while let Some(hop) = stack.pop() {
            let next_ratio = if friends.contains(&hop.node) {
                hop.ratio * 2.0
            } else {
                scores.add(hop.node, hop.ratio);
                hop.ratio / 2.0
            };

            if hop.budget > 0 {
                self.push_children(&mut stack, hop.node, next_ratio, hop.budget - 1);
            }
        }

        debug!(
            "suggest {} depth {}: {} candidates, {} friends",
            number,
            depth,
            scores.entries.len(),
            friends.len()
        );

        scores.into_ranked(limit)
    }

    fn push_children(&self, stack: &mut Vec<Hop>, node: NodeId, ratio: f64, budget: usize) {
        let start = stack.len();
        stack.extend(self.edges.forward_neighbors(node).map(|child| Hop {
            node: child,
            ratio,
            budget,
        }));
        stack[start..].reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use crate::edge::{FlatEdges, LinkedEdges};
    use crate::node::PhoneNumber;

    const SAMPLE: [(&str, &str); 5] = [("x", "y"), ("x", "z"), ("y", "x"), ("y", "z"), ("p", "x")];

    fn graph<E: EdgeIndex>(numbers: &[&str], edges: &[(&str, &str)]) -> SocialGraph<E> {
        let numbers: Vec<PhoneNumber> = numbers.iter().map(|&n| n.into()).collect();
        GraphBuilder::from_edges(numbers, edges).unwrap()
    }

    fn sample<E: EdgeIndex>() -> SocialGraph<E> {
        graph(&["p", "x", "y", "z"], &SAMPLE)
    }

    fn ranked<E: EdgeIndex>(
        graph: &SocialGraph<E>,
        suggestions: &[Suggestion],
    ) -> Vec<(String, f64)> {
        suggestions
            .iter()
            .map(|s| (graph.phone_number(s.node).to_string(), s.score))
            .collect()
    }

    #[test]
    fn test_sample_depth_two() {
        let graph: SocialGraph<LinkedEdges> = sample();
        let result = graph.suggest("p", 2);

        // x is the only friend: walked through at doubled ratio, never scored
        assert_eq!(
            ranked(&graph, &result),
            vec![("z".to_string(), 2.0), ("y".to_string(), 2.0)]
        );
    }

    #[test]
    fn test_sample_depth_two_flat() {
        let graph: SocialGraph<FlatEdges> = sample();
        let mut result = ranked(&graph, &graph.suggest("p", 2));
        result.sort_by(|a, b| a.0.cmp(&b.0));

        assert_eq!(result, vec![("y".to_string(), 2.0), ("z".to_string(), 2.0)]);
    }

    #[test]
    fn test_sample_depth_three_same_for_both_strategies() {
        let linked: SocialGraph<LinkedEdges> = sample();
        let flat: SocialGraph<FlatEdges> = sample();

        // z collects 2.0 via x and another 1.0 via x -> y
        let expected = vec![("z".to_string(), 3.0), ("y".to_string(), 2.0)];
        assert_eq!(ranked(&linked, &linked.suggest("p", 3)), expected);
        assert_eq!(ranked(&flat, &flat.suggest("p", 3)), expected);
    }

    #[test]
    fn test_unknown_number() {
        let graph: SocialGraph<LinkedEdges> = sample();
        assert!(graph.suggest("q", 2).is_empty());
    }

    #[test]
    fn test_zero_depth() {
        let graph: SocialGraph<LinkedEdges> = sample();
        assert!(graph.suggest("p", 0).is_empty());
    }

    #[test]
    fn test_depth_one_only_reaches_friends() {
        let graph: SocialGraph<LinkedEdges> = sample();
        assert!(graph.suggest("x", 1).is_empty());
    }

    #[test]
    fn test_scores_add_across_paths() {
        // q -> f (friend), f -> s1 -> t, f -> s2 -> t
        let edges = [("q", "f"), ("f", "s1"), ("f", "s2"), ("s1", "t"), ("s2", "t")];
        let graph: SocialGraph<LinkedEdges> = graph(&["q", "f", "s1", "s2", "t"], &edges);

        let result = ranked(&graph, &graph.suggest("q", 3));
        let t = result.iter().find(|(n, _)| n == "t").unwrap();

        // Each path reaches t at ratio 2.0 / 2 = 1.0
        assert_eq!(t.1, 2.0);
    }

    #[test]
    fn test_parallel_edges_count_twice() {
        let edges = [("a", "f"), ("f", "b"), ("f", "b")];
        let graph: SocialGraph<FlatEdges> = graph(&["a", "b", "f"], &edges);

        assert_eq!(ranked(&graph, &graph.suggest("a", 2)), vec![("b".to_string(), 4.0)]);
    }

    #[test]
    fn test_stranger_halves_ratio() {
        // a -> f -> s -> t: f is a friend, s and t are not
        let edges = [("a", "f"), ("f", "s"), ("s", "t")];
        let graph: SocialGraph<LinkedEdges> = graph(&["a", "f", "s", "t"], &edges);

        assert_eq!(
            ranked(&graph, &graph.suggest("a", 3)),
            vec![("s".to_string(), 2.0), ("t".to_string(), 1.0)]
        );
    }

    #[test]
    fn test_cycles_revisit_nodes() {
        // a -> f, f -> b, b -> f: b is reached again via the cycle through f
        let edges = [("a", "f"), ("f", "b"), ("b", "f")];
        let graph: SocialGraph<LinkedEdges> = graph(&["a", "b", "f"], &edges);

        // depth 4: a -f(2.0)-> b += 2.0 -> f (1.0 * 2) -> b += 2.0
        assert_eq!(ranked(&graph, &graph.suggest("a", 4)), vec![("b".to_string(), 4.0)]);
    }

    #[test]
    fn test_limit_and_ordering() {
        let numbers: Vec<String> = (0..15).map(|i| format!("s{:02}", i)).collect();
        let mut all: Vec<&str> = vec!["a", "f"];
        all.extend(numbers.iter().map(String::as_str));

        let mut edges: Vec<(&str, &str)> = vec![("a", "f")];
        for (i, n) in numbers.iter().enumerate() {
            // s00 gets one edge, s01 two, ...
            for _ in 0..=i {
                edges.push(("f", n.as_str()));
            }
        }
        let graph: SocialGraph<FlatEdges> = graph(&all, &edges);

        let result = ranked(&graph, &graph.suggest("a", 2));
        assert_eq!(result.len(), DEFAULT_SUGGESTION_LIMIT);
        assert_eq!(result[0], ("s14".to_string(), 30.0));
        assert!(result.windows(2).all(|w| w[0].1 >= w[1].1));

        assert_eq!(graph.suggest_with_limit("a", 2, 3).len(), 3);
    }

    #[test]
    fn test_ties_keep_first_scored_order() {
        let edges = [("a", "f"), ("f", "m"), ("f", "c"), ("f", "k")];
        let graph: SocialGraph<FlatEdges> = graph(&["a", "c", "f", "k", "m"], &edges);

        let names: Vec<String> = ranked(&graph, &graph.suggest("a", 2))
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, vec!["m", "c", "k"]);
    }
}
