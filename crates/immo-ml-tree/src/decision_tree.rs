use immo_ml_core::{check_fit_inputs, Estimator, Matrix, MlError, MlResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// A node in the flattened tree. Children are indices into the node arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Internal node: rows with `x[feature_idx] <= threshold` go left.
    Split {
        feature_idx: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Leaf: predicts the mean target of its training rows.
    Leaf { value: f64 },
}

/// Decision Tree Regressor using CART (MSE criterion).
///
/// Split search runs on per-feature presorted row lists that are partitioned
/// stably at every split, so each level costs `O(n · p)` rather than a full
/// re-sort. Nodes live in a flat arena which keeps serialized trees shallow
/// regardless of their depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeRegressor {
    /// `None` grows until leaves are pure or too small to split.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features considered at each split; `None` means all of them.
    pub max_features: Option<usize>,
    pub seed: u64,
    nodes: Vec<TreeNode>,
    n_features: usize,
}

struct NodeTask {
    node: usize,
    depth: usize,
    /// `sorted[f]` holds the node's row ids ordered by feature `f`.
    sorted: Vec<Vec<usize>>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl DecisionTreeRegressor {
    pub fn new(max_depth: Option<usize>, min_samples_split: usize, min_samples_leaf: usize) -> Self {
        DecisionTreeRegressor {
            max_depth,
            min_samples_split: min_samples_split.max(2),
            min_samples_leaf: min_samples_leaf.max(1),
            max_features: None,
            seed: 0,
            nodes: Vec::new(),
            n_features: 0,
        }
    }

    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[TreeNode], idx: usize) -> usize {
            match &nodes[idx] {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    /// Fit on the rows listed in `rows` (repeats allowed, as in a bootstrap draw).
    pub fn fit_rows(&mut self, x: &Matrix, y: &[f64], rows: &[usize]) -> MlResult<()> {
        check_fit_inputs(x, y)?;
        if rows.is_empty() {
            return Err(MlError::EmptyInput);
        }
        if let Some(&bad) = rows.iter().find(|&&r| r >= x.rows()) {
            return Err(MlError::IndexOutOfBounds {
                row: bad,
                col: 0,
                rows: x.rows(),
                cols: x.cols(),
            });
        }

        let p = x.cols();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut goes_left = vec![false; x.rows()];

        let root_sorted: Vec<Vec<usize>> = (0..p)
            .map(|f| {
                let mut ids = rows.to_vec();
                ids.sort_by(|&a, &b| x.at(a, f).total_cmp(&x.at(b, f)));
                ids
            })
            .collect();

        self.nodes = vec![TreeNode::Leaf { value: 0.0 }];
        self.n_features = p;

        let mut stack = vec![NodeTask {
            node: 0,
            depth: 0,
            sorted: root_sorted,
        }];

        while let Some(task) = stack.pop() {
            let ids = &task.sorted[0];
            let m = ids.len();
            let (sum, min_y, max_y) = ids.iter().fold((0.0, f64::INFINITY, f64::NEG_INFINITY), |(s, lo, hi), &i| {
                (s + y[i], lo.min(y[i]), hi.max(y[i]))
            });
            let mean = sum / m as f64;

            let depth_exhausted = self.max_depth.map_or(false, |d| task.depth >= d);
            let too_small = m < self.min_samples_split || m < 2 * self.min_samples_leaf;
            if depth_exhausted || too_small || min_y == max_y {
                self.nodes[task.node] = TreeNode::Leaf { value: mean };
                continue;
            }

            let candidates = self.candidate_features(p, &mut rng);
            let best = match self.best_split(x, y, &task.sorted, &candidates, sum) {
                Some(b) => b,
                None => {
                    self.nodes[task.node] = TreeNode::Leaf { value: mean };
                    continue;
                }
            };

            for &i in &task.sorted[best.feature] {
                goes_left[i] = x.at(i, best.feature) <= best.threshold;
            }
            let mut left_sorted = Vec::with_capacity(p);
            let mut right_sorted = Vec::with_capacity(p);
            for list in task.sorted {
                let (l, r): (Vec<usize>, Vec<usize>) = list.into_iter().partition(|&i| goes_left[i]);
                left_sorted.push(l);
                right_sorted.push(r);
            }

            let left = self.nodes.len();
            let right = left + 1;
            self.nodes.push(TreeNode::Leaf { value: 0.0 });
            self.nodes.push(TreeNode::Leaf { value: 0.0 });
            self.nodes[task.node] = TreeNode::Split {
                feature_idx: best.feature,
                threshold: best.threshold,
                left,
                right,
            };

            stack.push(NodeTask {
                node: right,
                depth: task.depth + 1,
                sorted: right_sorted,
            });
            stack.push(NodeTask {
                node: left,
                depth: task.depth + 1,
                sorted: left_sorted,
            });
        }

        Ok(())
    }

    fn candidate_features(&self, p: usize, rng: &mut StdRng) -> Vec<usize> {
        let mut features: Vec<usize> = (0..p).collect();
        match self.max_features {
            Some(k) if k < p => {
                features.shuffle(rng);
                features.truncate(k.max(1));
                features.sort_unstable();
                features
            }
            _ => features,
        }
    }

    /// Scan every candidate feature's sorted rows and keep the split that
    /// maximizes the MSE proxy `S_l²/n_l + S_r²/n_r`. Ties keep the first found.
    fn best_split(
        &self,
        x: &Matrix,
        y: &[f64],
        sorted: &[Vec<usize>],
        candidates: &[usize],
        total: f64,
    ) -> Option<BestSplit> {
        let mut best: Option<BestSplit> = None;
        for &f in candidates {
            let ids = &sorted[f];
            let m = ids.len();
            let mut left_sum = 0.0;
            for k in 1..m {
                left_sum += y[ids[k - 1]];
                let lo = x.at(ids[k - 1], f);
                let hi = x.at(ids[k], f);
                if lo == hi {
                    continue;
                }
                if k < self.min_samples_leaf || m - k < self.min_samples_leaf {
                    continue;
                }
                let right_sum = total - left_sum;
                let gain = left_sum * left_sum / k as f64 + right_sum * right_sum / (m - k) as f64;
                if best.as_ref().map_or(true, |b| gain > b.gain) {
                    let mut threshold = lo + (hi - lo) / 2.0;
                    if threshold >= hi {
                        threshold = lo;
                    }
                    best = Some(BestSplit {
                        feature: f,
                        threshold,
                        gain,
                    });
                }
            }
        }
        best
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature_idx] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

impl Estimator for DecisionTreeRegressor {
    fn fit(&mut self, x: &Matrix, y: &[f64]) -> MlResult<()> {
        let rows: Vec<usize> = (0..x.rows()).collect();
        self.fit_rows(x, y, &rows)
    }

    fn predict(&self, x: &Matrix) -> MlResult<Vec<f64>> {
        if self.nodes.is_empty() {
            return Err(MlError::NotFitted);
        }
        if x.cols() != self.n_features {
            return Err(MlError::DimensionMismatch(format!(
                "tree was fitted on {} features, got {}",
                self.n_features,
                x.cols()
            )));
        }
        (0..x.rows()).map(|i| Ok(self.predict_row(x.row(i)?))).collect()
    }

    fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }

    fn n_features(&self) -> Option<usize> {
        self.is_fitted().then_some(self.n_features)
    }
}
