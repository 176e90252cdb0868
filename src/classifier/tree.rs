// Binary decision tree grown best-first.
//
// Splits are chosen by Gini impurity decrease. Growth stops when the leaf
// budget is spent or no split leaves at least `min_samples_leaf` samples on
// both sides. Leaves store the fraction of positive samples that reached them.

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        proba: f32,
    },
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

struct SplitCandidate {
    node: usize,
    feature: usize,
    threshold: f32,
    gain: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

impl DecisionTree {
    /// Grow a tree on the rows listed in `samples` (duplicates allowed).
    pub fn fit(
        x: ArrayView2<'_, f32>,
        y: &[bool],
        samples: &[usize],
        min_samples_leaf: usize,
        max_leaf_nodes: usize,
    ) -> Self {
        let min_leaf = min_samples_leaf.max(1);
        let mut tree = Self {
            nodes: vec![Node::Leaf {
                proba: positive_fraction(y, samples),
            }],
        };

        let mut pending: Vec<SplitCandidate> =
            best_split(x, y, 0, samples, min_leaf).into_iter().collect();
        let mut leaves = 1;

        while leaves < max_leaf_nodes {
            let Some(best) = pending
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.gain.total_cmp(&b.1.gain).then(b.0.cmp(&a.0)))
                .map(|(i, _)| i)
            else {
                break;
            };
            let split = pending.swap_remove(best);

            let left = tree.nodes.len();
            let right = left + 1;
            tree.nodes.push(Node::Leaf {
                proba: positive_fraction(y, &split.left),
            });
            tree.nodes.push(Node::Leaf {
                proba: positive_fraction(y, &split.right),
            });
            tree.nodes[split.node] = Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };
            leaves += 1;

            pending.extend(best_split(x, y, left, &split.left, min_leaf));
            pending.extend(best_split(x, y, right, &split.right, min_leaf));
        }

        tree
    }

    /// Positive-class probability for one feature row.
    pub fn predict_row(&self, row: &[f32]) -> f32 {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = row.get(*feature).copied().unwrap_or(0.0);
                    idx = if value <= *threshold { *left } else { *right };
                }
                Some(Node::Leaf { proba }) => return *proba,
                None => return 0.0,
            }
        }
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }
}

fn positive_fraction(y: &[bool], samples: &[usize]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let positives = samples.iter().filter(|&&s| y[s]).count();
    positives as f32 / samples.len() as f32
}

fn gini(positives: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let p = positives as f64 / total as f64;
    2.0 * p * (1.0 - p)
}

/// Best impurity-reducing split of `samples`, if any.
fn best_split(
    x: ArrayView2<'_, f32>,
    y: &[bool],
    node: usize,
    samples: &[usize],
    min_leaf: usize,
) -> Option<SplitCandidate> {
    let total = samples.len();
    if total < 2 * min_leaf {
        return None;
    }
    let total_pos = samples.iter().filter(|&&s| y[s]).count();
    let parent = gini(total_pos, total);
    if parent == 0.0 {
        return None;
    }

    let mut best: Option<(usize, f32, f64)> = None;
    let mut order = samples.to_vec();
    for feature in 0..x.ncols() {
        order.sort_by(|&a, &b| x[[a, feature]].total_cmp(&x[[b, feature]]));

        let mut left_pos = 0;
        for i in 1..total {
            if y[order[i - 1]] {
                left_pos += 1;
            }
            if i < min_leaf || total - i < min_leaf {
                continue;
            }
            let lo = x[[order[i - 1], feature]];
            let hi = x[[order[i], feature]];
            if lo == hi {
                continue;
            }
            let right_pos = total_pos - left_pos;
            let weighted = (i as f64 * gini(left_pos, i)
                + (total - i) as f64 * gini(right_pos, total - i))
                / total as f64;
            let gain = parent - weighted;
            if best.map_or(true, |(_, _, g)| gain > g + 1e-12) {
                let mid = lo + (hi - lo) / 2.0;
                let threshold = if mid < hi { mid } else { lo };
                best = Some((feature, threshold, gain));
            }
        }
    }

    let (feature, threshold, gain) = best?;
    if gain <= 0.0 {
        return None;
    }
    let (left, right): (Vec<usize>, Vec<usize>) = samples
        .iter()
        .partition(|&&s| x[[s, feature]] <= threshold);
    Some(SplitCandidate {
        node,
        feature,
        threshold,
        gain,
        left,
        right,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_separable_data_is_learned() {
        let x = array![[0.1f32], [0.2], [0.3], [0.7], [0.8], [0.9]];
        let y = [false, false, false, true, true, true];
        let samples: Vec<usize> = (0..6).collect();
        let tree = DecisionTree::fit(x.view(), &y, &samples, 1, 10);

        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.predict_row(&[0.15]), 0.0);
        assert_eq!(tree.predict_row(&[0.85]), 1.0);
    }

    #[test]
    fn test_min_samples_leaf_blocks_small_splits() {
        let x = array![[0.0f32], [1.0], [2.0], [3.0]];
        let y = [true, false, false, false];
        let samples: Vec<usize> = (0..4).collect();
        let tree = DecisionTree::fit(x.view(), &y, &samples, 2, 10);

        // The only pure split isolates one sample, which is not allowed
        assert!(tree.predict_row(&[0.0]) > 0.0);
        assert!(tree.predict_row(&[0.0]) < 1.0);
    }

    #[test]
    fn test_leaf_budget() {
        let x = array![[0.0f32], [1.0], [2.0], [3.0], [4.0], [5.0]];
        let y = [true, false, true, false, true, false];
        let samples: Vec<usize> = (0..6).collect();
        let tree = DecisionTree::fit(x.view(), &y, &samples, 1, 3);
        assert!(tree.n_leaves() <= 3);
    }

    #[test]
    fn test_pure_node_stays_leaf() {
        let x = array![[0.0f32], [1.0]];
        let y = [true, true];
        let tree = DecisionTree::fit(x.view(), &y, &[0, 1], 1, 10);
        assert_eq!(tree.n_leaves(), 1);
        assert_eq!(tree.predict_row(&[5.0]), 1.0);
    }
}
