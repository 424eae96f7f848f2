use super::{cut_outcome, cut_outcomes};
use crate::candidates::{coarse_planes, filter_planes, MIN_AXIS_EXTENT};
use crate::cost::search_cost;
use crate::math::Real;
use crate::rng::{self, ROLLOUT_STREAM, SEARCH_STREAM};
use crate::{Axis, Mesh, Parameters, Plane};
use ordered_float::OrderedFloat;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Exploration constant of the selection policy.
const EXPLORATION: Real = std::f64::consts::FRAC_1_SQRT_2;

/// The index of a node in a [`MonteCarloTree`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    /// The root of every tree.
    pub const ROOT: NodeIndex = NodeIndex(0);

    fn get(self) -> usize {
        self.0 as usize
    }
}

/// The result of a tree search.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SearchOutcome {
    /// The plane of the best child of the root.
    pub plane: Plane,
    /// The quality of the best child of the root.
    pub quality: Real,
    /// The lowest cost of all the simulations run by the search.
    pub best_rollout: Real,
}

struct NodeState {
    // `None` if the cut leading to this node was invalid.
    part: Option<Mesh>,
    remaining_depth: u32,
    chain_cost: Real,
    current_cost: Real,
    terminal: bool,
    untried: Vec<Plane>,
}

impl NodeState {
    fn terminal_cost(&self) -> Real {
        if self.part.is_none() {
            Real::INFINITY
        } else {
            self.chain_cost.max(self.current_cost)
        }
    }
}

struct Node {
    parent: Option<NodeIndex>,
    children: Vec<NodeIndex>,
    plane: Option<Plane>,
    state: NodeState,
    visits: u32,
    quality: Real,
}

impl Node {
    fn new(parent: Option<NodeIndex>, plane: Option<Plane>, state: NodeState) -> Self {
        Self {
            parent,
            children: vec![],
            plane,
            state,
            visits: 0,
            quality: Real::INFINITY,
        }
    }
}

/// A search tree over sequences of cutting planes.
///
/// Nodes are stored in an arena and addressed by [`NodeIndex`]. The whole
/// tree is released at once when dropped.
pub struct MonteCarloTree {
    nodes: Vec<Node>,
    search_rng: ChaCha8Rng,
    rollout_rng: ChaCha8Rng,
    best_rollout: Real,
}

impl MonteCarloTree {
    /// Creates the tree rooted at `part`.
    ///
    /// The actions of the root are the coarse planes cutting `part` into two
    /// valid parts, in a random order. Returns `None` if there are none.
    pub fn new(part: &Mesh, params: &Parameters) -> Option<Self> {
        let mut search_rng = rng::stream(params.seed, SEARCH_STREAM);
        let rollout_rng = rng::stream(params.seed, ROLLOUT_STREAM);

        let candidates = coarse_planes(part, params.prep_resolution);
        let mut untried = filter_planes(part, &candidates, params.min_cut_area);

        if untried.is_empty() {
            log::debug!("no valid cutting plane among {} candidates", candidates.len());
            return None;
        }

        untried.shuffle(&mut search_rng);

        let root = NodeState {
            part: Some(part.clone()),
            remaining_depth: params.mcts_max_depth.max(1),
            chain_cost: 0.0,
            current_cost: search_cost(part, params, false),
            terminal: false,
            untried,
        };

        Some(Self {
            nodes: vec![Node::new(None, None, root)],
            search_rng,
            rollout_rng,
            best_rollout: Real::INFINITY,
        })
    }

    /// The number of nodes of this tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Does this tree contain only its root?
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Runs the search until `params.mcts_iteration` cycles have been
    /// simulated or `params.mcts_nodes` nodes have been expanded, and returns
    /// the best child of the root.
    pub fn search(&mut self, params: &Parameters) -> Option<SearchOutcome> {
        let mut expansions = 0;

        for _ in 0..params.mcts_iteration.max(1) {
            let (leaf, expanded) = self.tree_policy(params);
            let cost = self.default_policy(leaf, params);
            self.best_rollout = self.best_rollout.min(cost);
            self.backpropagate(leaf, cost);

            if expanded {
                expansions += 1;
                if expansions >= params.mcts_nodes {
                    break;
                }
            }
        }

        let best = self.best_child(NodeIndex::ROOT, 0.0)?;
        let node = &self.nodes[best.get()];

        Some(SearchOutcome {
            plane: node.plane?,
            quality: node.quality,
            best_rollout: self.best_rollout,
        })
    }

    /// The planes of the children of the root with their quality, best
    /// first. Ties are broken by expansion order.
    pub fn ranked_root_children(&self) -> Vec<(Plane, Real)> {
        let mut children: Vec<_> = self.nodes[0]
            .children
            .iter()
            .filter_map(|child| {
                let node = &self.nodes[child.get()];
                Some((node.plane?, node.quality))
            })
            .collect();
        children.sort_by(|a, b| a.1.total_cmp(&b.1));
        children
    }

    /// Walks down the tree with the selection policy until reaching a node to
    /// simulate. Returns that node, and whether it was just created.
    fn tree_policy(&mut self, params: &Parameters) -> (NodeIndex, bool) {
        let mut curr = NodeIndex::ROOT;

        loop {
            let node = &self.nodes[curr.get()];

            if node.state.terminal {
                return (curr, false);
            }

            if !node.state.untried.is_empty() {
                return (self.expand(curr, params), true);
            }

            match self.best_child(curr, EXPLORATION) {
                Some(child) => curr = child,
                None => return (curr, false),
            }
        }
    }

    /// Creates the child of `parent` reached by its next untried action.
    fn expand(&mut self, parent: NodeIndex, params: &Parameters) -> NodeIndex {
        let parent_state = &mut self.nodes[parent.get()].state;
        let Some(plane) = parent_state.untried.pop() else {
            return parent;
        };

        let remaining_depth = parent_state.remaining_depth.saturating_sub(1);
        let chain_cost = parent_state.chain_cost;
        let outcome = parent_state
            .part
            .as_ref()
            .and_then(|part| cut_outcome(part, &plane, params, false));

        let state = match outcome {
            None => NodeState {
                part: None,
                remaining_depth,
                chain_cost: Real::INFINITY,
                current_cost: Real::INFINITY,
                terminal: true,
                untried: vec![],
            },
            Some(outcome) => {
                let terminal = outcome.kept_cost < params.threshold || remaining_depth == 0;
                let mut untried = if terminal {
                    vec![]
                } else {
                    coarse_planes(&outcome.kept, params.prep_resolution)
                };
                untried.shuffle(&mut self.search_rng);

                NodeState {
                    part: Some(outcome.kept),
                    remaining_depth,
                    chain_cost: chain_cost.max(outcome.discarded_cost),
                    current_cost: outcome.kept_cost,
                    terminal,
                    untried,
                }
            }
        };

        let child = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(Node::new(Some(parent), Some(plane), state));
        self.nodes[parent.get()].children.push(child);
        child
    }

    /// Simulates greedy cuts from `node` until the depth budget is exhausted
    /// or the remaining part is convex enough. Returns the cost of the whole
    /// cut sequence.
    fn default_policy(&mut self, node: NodeIndex, params: &Parameters) -> Real {
        let state = &self.nodes[node.get()].state;

        let Some(part) = state.part.as_ref().filter(|_| !state.terminal) else {
            return state.terminal_cost();
        };

        let mut part = part.clone();
        let mut cost = state.chain_cost;
        let mut current = state.current_cost;

        for _ in 0..state.remaining_depth {
            if current < params.threshold {
                break;
            }

            let planes = random_planes(&part, params.prep_resolution, &mut self.rollout_rng);
            let best = cut_outcomes(&part, &planes, params, false)
                .into_iter()
                .flatten()
                .min_by_key(|outcome| OrderedFloat(outcome.kept_cost));

            let Some(best) = best else {
                break;
            };

            cost = cost.max(best.discarded_cost);
            current = best.kept_cost;
            part = best.kept;
        }

        cost.max(current)
    }

    fn backpropagate(&mut self, node: NodeIndex, cost: Real) {
        let mut curr = Some(node);

        while let Some(id) = curr {
            let node = &mut self.nodes[id.get()];
            node.visits += 1;
            node.quality = node.quality.min(cost);
            curr = node.parent;
        }
    }

    /// The child of `node` minimizing `quality - exploration * sqrt(2 ln N / n)`.
    ///
    /// Ties are broken by expansion order.
    fn best_child(&self, node: NodeIndex, exploration: Real) -> Option<NodeIndex> {
        let node = &self.nodes[node.get()];
        let ln_visits = (node.visits.max(1) as Real).ln();

        node.children.iter().copied().min_by_key(|child| {
            let child = &self.nodes[child.get()];
            let bonus = if exploration > 0.0 {
                exploration * (2.0 * ln_visits / child.visits.max(1) as Real).sqrt()
            } else {
                0.0
            };
            OrderedFloat(child.quality - bonus)
        })
    }
}

/// One plane per axis, picked among the coarse planes of `part`.
fn random_planes(part: &Mesh, resolution: u32, rng: &mut ChaCha8Rng) -> Vec<Plane> {
    let aabb = part.aabb();
    let mut planes = Vec::with_capacity(3);

    for axis in Axis::ALL {
        let min = aabb.mins[axis.index()];
        let extent = aabb.maxs[axis.index()] - min;
        let i = rng.gen_range(1..=resolution.max(1));

        if extent >= MIN_AXIS_EXTENT {
            let offset = min + extent * i as Real / (resolution + 1) as Real;
            planes.push(Plane::axis_aligned(axis, offset));
        }
    }

    planes
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hull::box_hull;
    use crate::math::Point;
    use parry::bounding_volume::Aabb;

    fn two_boxes() -> Mesh {
        let a = box_hull(&Aabb::new(Point::new(-1.0, -0.2, -0.2), Point::new(-0.6, 0.2, 0.2)));
        let b = box_hull(&Aabb::new(Point::new(0.6, -0.2, -0.2), Point::new(1.0, 0.2, 0.2)));
        a.merged_with(&b)
    }

    fn params() -> Parameters {
        Parameters {
            prep_resolution: 9,
            resolution: 300,
            mcts_iteration: 40,
            mcts_nodes: 40,
            mcts_max_depth: 2,
            ..Parameters::default()
        }
    }

    #[test]
    fn search_separates_disjoint_boxes() {
        let mesh = two_boxes();
        let params = params();
        let mut tree = MonteCarloTree::new(&mesh, &params).unwrap();
        let outcome = tree.search(&params).unwrap();

        assert_eq!(outcome.plane.axis, Some(Axis::X));
        let x = outcome.plane.origin().x;
        assert!(x > -0.6 - 1.0e-9 && x < 0.6 + 1.0e-9, "{x}");
        assert!(outcome.quality < params.threshold);
        assert!(tree.len() > 1);
    }

    #[test]
    fn chosen_child_is_no_worse_than_best_rollout() {
        let mesh = two_boxes();
        let params = params();
        let mut tree = MonteCarloTree::new(&mesh, &params).unwrap();
        let outcome = tree.search(&params).unwrap();
        assert!(outcome.quality <= outcome.best_rollout);

        let ranked = tree.ranked_root_children();
        assert_eq!(ranked[0], (outcome.plane, outcome.quality));
        assert!(ranked.windows(2).all(|w| w[0].1 <= w[1].1));
    }

    #[test]
    fn expansions_are_bounded() {
        let mesh = two_boxes();
        let params = Parameters {
            mcts_nodes: 5,
            ..params()
        };
        let mut tree = MonteCarloTree::new(&mesh, &params).unwrap();
        let _ = tree.search(&params);
        assert_eq!(tree.len(), 6);
    }

    #[test]
    fn search_is_deterministic() {
        let mesh = two_boxes();
        let params = params();
        let a = MonteCarloTree::new(&mesh, &params).unwrap().search(&params);
        let b = MonteCarloTree::new(&mesh, &params).unwrap().search(&params);
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn random_planes_stay_inside_the_part() {
        let mesh = two_boxes();
        let mut rng = rng::stream(0, ROLLOUT_STREAM);
        let aabb = mesh.aabb();

        for _ in 0..20 {
            let planes = random_planes(&mesh, 9, &mut rng);
            assert_eq!(planes.len(), 3);
            for plane in planes {
                let i = plane.axis.unwrap().index();
                let offset = plane.origin()[i];
                assert!(offset > aabb.mins[i] && offset < aabb.maxs[i]);
            }
        }
    }
}
