// ============================================================
// Layer 5 — CART Classification Tree Builder
// ============================================================
// Grows a single classification tree by exact-greedy search:
//
//   1. At each node, pick the candidate features for this
//      split (all of them, or a random subset for forests)
//   2. For each candidate, sort the node's samples by that
//      feature and sweep every boundary between two distinct
//      values, tracking class counts on the left incrementally
//   3. Keep the boundary with the largest Gini impurity
//      decrease; the threshold is the midpoint between the two
//      neighbouring values
//   4. Repeat on each child until a stopping rule fires:
//        - max_depth reached
//        - fewer than min_samples_split samples
//        - node is pure
//        - no boundary leaves min_samples_leaf on both sides
//
// Nodes are stored flat in a Vec with child indices, so
// prediction is a simple loop and the tree serialises as a
// plain list. Growth uses an explicit work stack rather than
// recursion, so an unlimited depth cannot exhaust the thread
// stack. Each leaf keeps the class distribution of the
// samples that reached it; forests average those.
//
// Ties between equally good splits go to the first one found.
// The visiting order comes from the seeded RNG, so a tree is
// fully determined by (data, config, seed).

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Gains at or below this are treated as no improvement.
const MIN_GAIN: f64 = 1e-12;

/// One node of a flattened tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Leaf {
        /// Fraction of node samples per class, indexed like the class list
        distribution: Vec<f64>,
    },
    Split {
        feature:   usize,
        threshold: f64,
        left:      usize,
        right:     usize,
    },
}

/// A grown tree; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Class distribution of the leaf `x` falls into.
    pub fn distribution(&self, x: &[f64]) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { distribution } => return distribution,
                Node::Split { feature, threshold, left, right } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack   = vec![(0usize, 0usize)];
        while let Some((idx, depth)) = stack.pop() {
            match self.nodes.get(idx) {
                Some(Node::Split { left, right, .. }) => {
                    stack.push((*left, depth + 1));
                    stack.push((*right, depth + 1));
                }
                Some(Node::Leaf { .. }) => deepest = deepest.max(depth),
                None => {}
            }
        }
        deepest
    }

    /// Check that the node list forms a tree `distribution` can walk.
    ///
    /// Children must come after their parent (the order `grow` emits),
    /// which also rules out cycles.
    pub fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        let len = self.nodes.len();
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { distribution } if distribution.len() != n_classes => {
                    return Err(format!(
                        "leaf {idx} has {} class weights, expected {n_classes}",
                        distribution.len()
                    ));
                }
                Node::Leaf { .. } => {}
                Node::Split { feature, left, right, .. } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "node {idx} splits on feature {feature} of {n_features}"
                        ));
                    }
                    for child in [*left, *right] {
                        if child <= idx || child >= len {
                            return Err(format!("node {idx} points at invalid child {child}"));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Growth limits for one tree.
#[derive(Debug, Clone, Copy)]
pub struct TreeConfig {
    pub max_depth:         Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf:  usize,
    /// Features considered per split (≤ feature count)
    pub max_features:      usize,
}

/// Best boundary found for one node.
#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature:        usize,
    threshold:      f64,
    gain:           f64,
    /// Weighted impurity decrease, for feature importances
    weighted_drop:  f64,
}

/// A node still to be built: its samples, depth and parent link.
struct Pending {
    indices: Vec<usize>,
    depth:   usize,
    /// Parent slot and whether this is its left child
    parent:  Option<(usize, bool)>,
}

enum Expansion {
    Leaf(Node),
    Split {
        node:  Node,
        left:  Vec<usize>,
        right: Vec<usize>,
    },
}

/// Builds one tree over a fixed training matrix.
pub struct CartBuilder<'a> {
    features:    &'a [Vec<f64>],
    targets:     &'a [usize],
    n_classes:   usize,
    n_features:  usize,
    config:      TreeConfig,
    importances: Vec<f64>,
}

impl<'a> CartBuilder<'a> {
    /// `targets[i]` is the class index of `features[i]`.
    pub fn new(
        features:  &'a [Vec<f64>],
        targets:   &'a [usize],
        n_classes: usize,
        config:    TreeConfig,
    ) -> Self {
        let n_features = features.first().map_or(0, |f| f.len());
        Self {
            features,
            targets,
            n_classes,
            n_features,
            config,
            importances: vec![0.0; n_features],
        }
    }

    /// Grow a tree over the samples at `indices` (may repeat, for bootstraps).
    ///
    /// Returns the tree and its normalised feature importances.
    pub fn grow(mut self, indices: Vec<usize>, rng: &mut StdRng) -> (Tree, Vec<f64>) {
        let mut nodes: Vec<Node> = Vec::new();

        // Depth-first with an explicit stack; right is pushed before left so
        // nodes come out in the same pre-order a recursive build would give.
        let mut stack = vec![Pending { indices, depth: 0, parent: None }];
        while let Some(task) = stack.pop() {
            let current_idx = nodes.len();
            if let Some((parent, is_left)) = task.parent {
                if let Some(Node::Split { left, right, .. }) = nodes.get_mut(parent) {
                    if is_left { *left = current_idx } else { *right = current_idx }
                }
            }

            match self.expand(task.indices, task.depth, rng) {
                Expansion::Leaf(node) => nodes.push(node),
                Expansion::Split { node, left, right } => {
                    nodes.push(node);
                    let depth = task.depth + 1;
                    stack.push(Pending { indices: right, depth, parent: Some((current_idx, false)) });
                    stack.push(Pending { indices: left,  depth, parent: Some((current_idx, true)) });
                }
            }
        }

        let total: f64 = self.importances.iter().sum();
        if total > 0.0 {
            for v in &mut self.importances {
                *v /= total;
            }
        }

        (Tree { nodes }, self.importances)
    }

    /// Decide whether the samples at one node become a leaf or a split.
    fn expand(&mut self, indices: Vec<usize>, depth: usize, rng: &mut StdRng) -> Expansion {
        let counts   = self.class_counts(&indices);
        let n        = indices.len();
        let impurity = gini(&counts, n);

        let depth_reached = self.config.max_depth.map_or(false, |d| depth >= d);
        if depth_reached
            || n < self.config.min_samples_split
            || n < 2 * self.config.min_samples_leaf
            || impurity <= 0.0
        {
            return Expansion::Leaf(leaf(&counts, n));
        }

        let split = match self.find_best_split(&indices, &counts, impurity, rng) {
            Some(s) => s,
            None => return Expansion::Leaf(leaf(&counts, n)),
        };

        self.importances[split.feature] += split.weighted_drop;

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| self.features[i][split.feature] <= split.threshold);

        // Child slots are patched in when the children are popped
        Expansion::Split {
            node: Node::Split {
                feature:   split.feature,
                threshold: split.threshold,
                left:      0,
                right:     0,
            },
            left,
            right,
        }
    }

    fn find_best_split(
        &self,
        indices:  &[usize],
        counts:   &[usize],
        impurity: f64,
        rng:      &mut StdRng,
    ) -> Option<SplitCandidate> {
        let n         = indices.len();
        let min_leaf  = self.config.min_samples_leaf;
        let mut order: Vec<usize> = (0..self.n_features).collect();
        order.shuffle(rng);
        order.truncate(self.config.max_features.clamp(1, self.n_features.max(1)));

        let mut best: Option<SplitCandidate> = None;
        let mut sorted = indices.to_vec();

        for &feature in &order {
            sorted.sort_by(|&a, &b| self.features[a][feature].total_cmp(&self.features[b][feature]));

            let mut left_counts = vec![0usize; self.n_classes];

            for pos in 0..n - 1 {
                left_counts[self.targets[sorted[pos]]] += 1;

                let here = self.features[sorted[pos]][feature];
                let next = self.features[sorted[pos + 1]][feature];
                if here == next {
                    continue;
                }

                let left_n  = pos + 1;
                let right_n = n - left_n;
                if left_n < min_leaf || right_n < min_leaf {
                    continue;
                }

                let right_counts: Vec<usize> = counts
                    .iter()
                    .zip(&left_counts)
                    .map(|(total, left)| total - left)
                    .collect();

                let child = (left_n as f64 * gini(&left_counts, left_n)
                    + right_n as f64 * gini(&right_counts, right_n))
                    / n as f64;
                let gain = impurity - child;

                if gain > MIN_GAIN && best.map_or(true, |b| gain > b.gain) {
                    let mut threshold = (here + next) / 2.0;
                    // Adjacent floats can round the midpoint up onto `next`
                    if threshold >= next {
                        threshold = here;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        gain,
                        weighted_drop: gain * n as f64,
                    });
                }
            }
        }

        best
    }

    fn class_counts(&self, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &i in indices {
            counts[self.targets[i]] += 1;
        }
        counts
    }
}

fn leaf(counts: &[usize], n: usize) -> Node {
    let distribution = if n == 0 {
        vec![0.0; counts.len()]
    } else {
        counts.iter().map(|&c| c as f64 / n as f64).collect()
    };
    Node::Leaf { distribution }
}

/// Gini impurity: 1 − Σ pᵢ².
fn gini(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts.iter().map(|&c| (c as f64 / n).powi(2)).sum::<f64>()
}

/// Index of the largest entry; ties go to the lowest index.
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn config() -> TreeConfig {
        TreeConfig {
            max_depth:         None,
            min_samples_split: 2,
            min_samples_leaf:  1,
            max_features:      2,
        }
    }

    #[test]
    fn test_gini() {
        assert_eq!(gini(&[4, 0], 4), 0.0);
        assert!((gini(&[2, 2], 4) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_separable_data_gives_pure_leaves() {
        let x = vec![vec![0.0, 5.0], vec![1.0, 5.0], vec![10.0, 5.0], vec![11.0, 5.0]];
        let y = vec![0, 0, 1, 1];
        let mut rng = StdRng::seed_from_u64(1);
        let (tree, importances) = CartBuilder::new(&x, &y, 2, config()).grow((0..4).collect(), &mut rng);

        assert_eq!(tree.depth(), 1);
        assert_eq!(argmax(tree.distribution(&[0.5, 5.0])), 0);
        assert_eq!(argmax(tree.distribution(&[10.5, 5.0])), 1);
        // Only feature 0 separates the classes
        assert_eq!(importances, vec![1.0, 0.0]);
        match &tree.nodes[0] {
            Node::Split { feature, threshold, .. } => {
                assert_eq!(*feature, 0);
                assert_eq!(*threshold, 5.5);
            }
            other => panic!("expected split at root, got {other:?}"),
        }
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let x: Vec<Vec<f64>> = (0..8).map(|i| vec![i as f64]).collect();
        let y = vec![0, 1, 0, 1, 0, 1, 0, 1];
        let cfg = TreeConfig { max_depth: Some(2), ..config() };
        let mut rng = StdRng::seed_from_u64(3);
        let (tree, _) = CartBuilder::new(&x, &y, 2, cfg).grow((0..8).collect(), &mut rng);
        assert!(tree.depth() <= 2);
    }

    #[test]
    fn test_constant_features_give_single_leaf() {
        let x = vec![vec![1.0], vec![1.0], vec![1.0]];
        let y = vec![0, 1, 1];
        let mut rng = StdRng::seed_from_u64(0);
        let (tree, importances) = CartBuilder::new(&x, &y, 2, config()).grow((0..3).collect(), &mut rng);
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(importances, vec![0.0]);
        assert_eq!(argmax(tree.distribution(&[1.0])), 1);
    }

    #[test]
    fn test_unlimited_depth_on_long_chain_does_not_overflow() {
        // Alternating labels on a sorted feature force one level per row
        let x: Vec<Vec<f64>> = (0..6000).map(|i| vec![i as f64]).collect();
        let y: Vec<usize>    = (0..6000).map(|i| i % 2).collect();
        let cfg = TreeConfig { max_features: 1, ..config() };
        let mut rng = StdRng::seed_from_u64(9);

        let (tree, _) = CartBuilder::new(&x, &y, 2, cfg).grow((0..6000).collect(), &mut rng);

        assert!(tree.depth() > 100);
        assert!(tree.validate(1, 2).is_ok());
        assert_eq!(argmax(tree.distribution(&[4.0])), 0);
        assert_eq!(argmax(tree.distribution(&[4999.0])), 1);
    }

    #[test]
    fn test_children_follow_parents() {
        let x: Vec<Vec<f64>> = (0..8).map(|i| vec![i as f64, (i % 3) as f64]).collect();
        let y = vec![0, 1, 0, 1, 1, 0, 0, 1];
        let mut rng = StdRng::seed_from_u64(5);
        let (tree, _) = CartBuilder::new(&x, &y, 2, config()).grow((0..8).collect(), &mut rng);

        assert!(tree.validate(2, 2).is_ok());
        assert_eq!(argmax(tree.distribution(&x[1])), 1);
    }

    #[test]
    fn test_validate_rejects_broken_structure() {
        let leaf = || Node::Leaf { distribution: vec![1.0, 0.0] };
        let split = |feature, left, right| Node::Split { feature, threshold: 0.5, left, right };

        assert!(Tree { nodes: vec![] }.validate(1, 2).is_err());
        // Child out of range
        assert!(Tree { nodes: vec![split(0, 1, 9999), leaf()] }.validate(1, 2).is_err());
        // Child pointing back at an ancestor
        assert!(Tree { nodes: vec![split(0, 1, 2), split(0, 0, 2), leaf()] }.validate(1, 2).is_err());
        // Feature beyond the fitted dimension
        assert!(Tree { nodes: vec![split(3, 1, 2), leaf(), leaf()] }.validate(1, 2).is_err());
        // Wrong number of class weights
        assert!(Tree { nodes: vec![leaf()] }.validate(1, 3).is_err());

        assert!(Tree { nodes: vec![split(0, 1, 2), leaf(), leaf()] }.validate(1, 2).is_ok());
    }

    #[test]
    fn test_argmax_prefers_first_on_tie() {
        assert_eq!(argmax(&[0.5, 0.5]), 0);
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), 1);
    }
}
