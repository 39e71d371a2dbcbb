//! Decision forest evaluation
//!
//! Trees use the flat array layout exported by common training libraries:
//! node `i` splits on `feature[i]` at `threshold[i]`, going to
//! `children_left[i]` when `x[feature] <= threshold` and to
//! `children_right[i]` otherwise. A node whose left child is `-1` is a leaf
//! and `value[i]` holds its per-class weights.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Marker used for "no child" in the exported arrays
pub const TREE_LEAF: i64 = -1;

#[derive(Debug, Error, PartialEq)]
pub enum ForestError {
    #[error("forest has no trees")]
    EmptyForest,

    #[error("forest must have at least two classes, got {0}")]
    TooFewClasses(usize),

    #[error("tree {tree}: no nodes")]
    EmptyTree { tree: usize },

    #[error("tree {tree}: `{field}` has {found} entries, expected {expected}")]
    LengthMismatch {
        tree: usize,
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("tree {tree}, node {node}: child {child} is out of range or not after its parent")]
    BadChild { tree: usize, node: usize, child: i64 },

    #[error("tree {tree}, node {node}: feature {feature} outside 0..{n_features}")]
    BadFeature {
        tree: usize,
        node: usize,
        feature: i64,
        n_features: usize,
    },

    #[error("tree {tree}, node {node}: {found} class weights, expected {expected}")]
    BadValueRow {
        tree: usize,
        node: usize,
        expected: usize,
        found: usize,
    },
}

/// One fitted tree in array form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    pub fn node_count(&self) -> usize {
        self.children_left.len()
    }

    /// Check structure so that [`Self::predict_proba`] can index freely.
    ///
    /// Children must come after their parent, which rules out cycles.
    pub fn validate(&self, index: usize, n_features: usize, n_classes: usize) -> Result<(), ForestError> {
        let nodes = self.node_count();
        if nodes == 0 {
            return Err(ForestError::EmptyTree { tree: index });
        }

        let lengths = [
            ("children_right", self.children_right.len()),
            ("feature", self.feature.len()),
            ("threshold", self.threshold.len()),
            ("value", self.value.len()),
        ];
        for (field, found) in lengths {
            if found != nodes {
                return Err(ForestError::LengthMismatch { tree: index, field, expected: nodes, found });
            }
        }

        for node in 0..nodes {
            let row = &self.value[node];
            if row.len() != n_classes {
                return Err(ForestError::BadValueRow {
                    tree: index,
                    node,
                    expected: n_classes,
                    found: row.len(),
                });
            }

            let left = self.children_left[node];
            if left == TREE_LEAF {
                continue;
            }

            let right = self.children_right[node];
            for child in [left, right] {
                if child <= node as i64 || child >= nodes as i64 {
                    return Err(ForestError::BadChild { tree: index, node, child });
                }
            }

            let feature = self.feature[node];
            if feature < 0 || feature >= n_features as i64 {
                return Err(ForestError::BadFeature { tree: index, node, feature, n_features });
            }
        }

        Ok(())
    }

    fn leaf_for(&self, x: &[f64]) -> usize {
        let mut node = 0usize;
        loop {
            let left = self.children_left[node];
            if left == TREE_LEAF {
                return node;
            }
            let feature = self.feature[node] as usize;
            node = if x[feature] <= self.threshold[node] {
                left as usize
            } else {
                self.children_right[node] as usize
            };
        }
    }

    /// Class distribution at the leaf reached by `x`
    pub fn predict_proba(&self, x: &[f64]) -> Vec<f64> {
        let row = &self.value[self.leaf_for(x)];
        let total: f64 = row.iter().sum();
        if total > 0.0 {
            row.iter().map(|w| w / total).collect()
        } else {
            vec![1.0 / row.len() as f64; row.len()]
        }
    }
}

/// Averaging ensemble of [`DecisionTree`]s
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
    n_classes: usize,
}

impl RandomForest {
    pub fn new(trees: Vec<DecisionTree>, n_features: usize, n_classes: usize) -> Result<Self, ForestError> {
        if trees.is_empty() {
            return Err(ForestError::EmptyForest);
        }
        if n_classes < 2 {
            return Err(ForestError::TooFewClasses(n_classes));
        }
        for (index, tree) in trees.iter().enumerate() {
            tree.validate(index, n_features, n_classes)?;
        }

        Ok(Self { trees, n_features, n_classes })
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Mean of per-tree class probabilities.
    ///
    /// `x` must hold at least `n_features` values.
    pub fn predict_proba(&self, x: &[f64]) -> Vec<f64> {
        debug_assert!(x.len() >= self.n_features);

        let mut sum = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in sum.iter_mut().zip(tree.predict_proba(x)) {
                *acc += p;
            }
        }

        let n = self.trees.len() as f64;
        sum.into_iter().map(|s| s / n).collect()
    }

    /// Most probable class; ties resolve to the lowest index
    pub fn predict(&self, x: &[f64]) -> usize {
        let proba = self.predict_proba(x);
        let mut best = 0;
        for (class, p) in proba.iter().enumerate().skip(1) {
            if *p > proba[best] {
                best = class;
            }
        }
        best
    }
}
