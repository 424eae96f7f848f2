use crate::math::Real;
use crate::AcdError;
use std::str::FromStr;

/// Controls whether the input is remeshed into a manifold before decomposition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum PreprocessMode {
    /// Remesh only if the input fails the manifoldness test.
    Auto,
    /// Always remesh.
    On,
    /// Never remesh.
    Off,
}

/// The shape used to approximate each part.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum ApproximationMode {
    /// The convex hull of the part.
    ConvexHull,
    /// The axis-aligned bounding box of the part.
    BoundingBox,
}

impl TryFrom<i32> for PreprocessMode {
    type Error = AcdError;

    fn try_from(tag: i32) -> Result<Self, AcdError> {
        match tag {
            0 => Ok(PreprocessMode::Auto),
            1 => Ok(PreprocessMode::On),
            2 => Ok(PreprocessMode::Off),
            _ => Err(AcdError::InvalidParameter {
                name: "preprocess_mode",
                reason: format!("unknown tag {tag} (expected 0, 1 or 2)"),
            }),
        }
    }
}

impl FromStr for PreprocessMode {
    type Err = AcdError;

    fn from_str(mode: &str) -> Result<Self, AcdError> {
        match mode {
            "auto" => Ok(PreprocessMode::Auto),
            "on" => Ok(PreprocessMode::On),
            "off" => Ok(PreprocessMode::Off),
            _ => Err(AcdError::InvalidParameter {
                name: "preprocess_mode",
                reason: format!("unknown mode `{mode}` (expected auto, on or off)"),
            }),
        }
    }
}

impl TryFrom<i32> for ApproximationMode {
    type Error = AcdError;

    fn try_from(tag: i32) -> Result<Self, AcdError> {
        match tag {
            0 => Ok(ApproximationMode::ConvexHull),
            1 => Ok(ApproximationMode::BoundingBox),
            _ => Err(AcdError::InvalidParameter {
                name: "apx_mode",
                reason: format!("unknown tag {tag} (expected 0 or 1)"),
            }),
        }
    }
}

impl FromStr for ApproximationMode {
    type Err = AcdError;

    fn from_str(mode: &str) -> Result<Self, AcdError> {
        match mode {
            "ch" => Ok(ApproximationMode::ConvexHull),
            "box" => Ok(ApproximationMode::BoundingBox),
            _ => Err(AcdError::InvalidParameter {
                name: "apx_mode",
                reason: format!("unknown mode `{mode}` (expected ch or box)"),
            }),
        }
    }
}

/// Parameters controlling the approximate convex decomposition.
///
/// The default values are a reasonable starting point for meshes of a few
/// thousand triangles. [`Parameters::fast`] and [`Parameters::quality`]
/// trade accuracy for speed in either direction.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Parameters {
    /// Concavity below which a part is accepted as convex.
    ///
    /// Must lie in `[0.01, 1]`.
    ///
    /// Default: `0.05`.
    pub threshold: Real,
    /// Maximum number of output parts. Zero or negative means unlimited.
    ///
    /// Default: `-1`.
    pub max_convex_hull: i32,
    /// Manifold preprocessing policy.
    ///
    /// Default: `PreprocessMode::Auto`.
    pub preprocess_mode: PreprocessMode,
    /// Resolution of the manifold remeshing grid and number of candidate
    /// planes per axis.
    ///
    /// Must lie in `[5, 1000]`.
    ///
    /// Default: `50`.
    pub prep_resolution: u32,
    /// Number of surface samples used to evaluate the concavity of a part.
    ///
    /// Default: `2000`.
    pub resolution: u32,
    /// Maximum number of node expansions of one tree search.
    ///
    /// Default: `20`.
    pub mcts_nodes: u32,
    /// Maximum number of selection/expansion/simulation cycles of one tree search.
    ///
    /// Default: `150`.
    pub mcts_iteration: u32,
    /// Number of consecutive cuts simulated by one tree search.
    ///
    /// Default: `3`.
    pub mcts_max_depth: u32,
    /// Align the mesh with its principal axes before cutting it.
    ///
    /// Default: `false`.
    pub pca: bool,
    /// Merge adjacent parts whose union stays below the concavity threshold.
    ///
    /// Default: `true`.
    pub merge: bool,
    /// Limit the number of vertices of each output hull to `max_ch_vertex`.
    ///
    /// Default: `false`.
    pub decimate: bool,
    /// Vertex budget of each hull when `decimate` is enabled.
    ///
    /// Default: `256`.
    pub max_ch_vertex: u32,
    /// Push the faces created by cuts outward by `extrude_margin`.
    ///
    /// This closes the gaps between neighboring hulls of thin shells.
    ///
    /// Default: `false`.
    pub extrude: bool,
    /// Extrusion distance, in the input mesh units.
    ///
    /// Default: `0.01`.
    pub extrude_margin: Real,
    /// Hull approximation used for the parts.
    ///
    /// Default: `ApproximationMode::ConvexHull`.
    pub apx_mode: ApproximationMode,
    /// Seed of every random choice made by the decomposition.
    ///
    /// Default: `0`.
    pub seed: u64,
    /// Weight of the residual-volume penalty in the concavity cost.
    ///
    /// Default: `0.3`.
    pub rv_k: Real,
    /// Candidate planes whose cut area is below this value are discarded.
    ///
    /// Default: `0.0`.
    pub min_cut_area: Real,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            threshold: 0.05,
            max_convex_hull: -1,
            preprocess_mode: PreprocessMode::Auto,
            prep_resolution: 50,
            resolution: 2000,
            mcts_nodes: 20,
            mcts_iteration: 150,
            mcts_max_depth: 3,
            pca: false,
            merge: true,
            decimate: false,
            max_ch_vertex: 256,
            extrude: false,
            extrude_margin: 0.01,
            apx_mode: ApproximationMode::ConvexHull,
            seed: 0,
            rv_k: 0.3,
            min_cut_area: 0.0,
        }
    }
}

impl Parameters {
    /// Parameters favoring speed over the quality of the decomposition.
    pub fn fast() -> Self {
        Self {
            prep_resolution: 30,
            resolution: 1000,
            mcts_nodes: 10,
            mcts_iteration: 80,
            mcts_max_depth: 2,
            ..Self::default()
        }
    }

    /// Parameters favoring the quality of the decomposition over speed.
    pub fn quality() -> Self {
        Self {
            threshold: 0.03,
            prep_resolution: 80,
            resolution: 4000,
            mcts_nodes: 40,
            mcts_iteration: 250,
            mcts_max_depth: 4,
            ..Self::default()
        }
    }

    /// The maximum number of parts, or `None` if unlimited.
    pub fn part_budget(&self) -> Option<usize> {
        if self.max_convex_hull > 0 {
            Some(self.max_convex_hull as usize)
        } else {
            None
        }
    }

    /// Checks that every parameter lies in its accepted range.
    pub fn validate(&self) -> Result<(), AcdError> {
        fn invalid(name: &'static str, reason: impl Into<String>) -> Result<(), AcdError> {
            Err(AcdError::InvalidParameter {
                name,
                reason: reason.into(),
            })
        }

        if !(self.threshold >= 0.01) {
            return invalid("threshold", format!("{} < 0.01 (should be 0.01-1)", self.threshold));
        }
        if self.threshold > 1.0 {
            return invalid("threshold", format!("{} > 1 (should be 0.01-1)", self.threshold));
        }
        if self.prep_resolution > 1000 {
            return invalid(
                "prep_resolution",
                format!("{} > 1000 (should be 20-100)", self.prep_resolution),
            );
        }
        if self.prep_resolution < 5 {
            return invalid(
                "prep_resolution",
                format!("{} < 5 (should be 20-100)", self.prep_resolution),
            );
        }
        if self.resolution == 0 {
            return invalid("resolution", "at least one sample is needed");
        }
        if self.mcts_nodes == 0 {
            return invalid("mcts_nodes", "at least one expansion is needed");
        }
        if self.mcts_iteration == 0 {
            return invalid("mcts_iteration", "at least one iteration is needed");
        }
        if self.decimate && self.max_ch_vertex < 4 {
            return invalid(
                "max_ch_vertex",
                format!("{} < 4 (a hull needs at least 4 vertices)", self.max_ch_vertex),
            );
        }
        if !(self.extrude_margin >= 0.0) || !self.extrude_margin.is_finite() {
            return invalid("extrude_margin", "must be finite and non-negative");
        }
        if !(self.rv_k >= 0.0) || !self.rv_k.is_finite() {
            return invalid("rv_k", "must be finite and non-negative");
        }
        if !(self.min_cut_area >= 0.0) {
            return invalid("min_cut_area", "must be non-negative");
        }

        Ok(())
    }

    pub(crate) fn log_summary(&self) {
        log::info!("threshold               {}", self.threshold);
        log::info!("max # convex hull       {}", self.max_convex_hull);
        log::info!("preprocess mode         {:?}", self.preprocess_mode);
        log::info!("preprocess resolution   {}", self.prep_resolution);
        log::info!("pca                     {}", self.pca);
        log::info!("mcts max depth          {}", self.mcts_max_depth);
        log::info!("mcts nodes              {}", self.mcts_nodes);
        log::info!("mcts iterations         {}", self.mcts_iteration);
        log::info!("merge                   {}", self.merge);
        log::info!("decimate                {}", self.decimate);
        log::info!("max_ch_vertex           {}", self.max_ch_vertex);
        log::info!("extrude                 {}", self.extrude);
        log::info!("extrude margin          {}", self.extrude_margin);
        log::info!("approximate mode        {:?}", self.apx_mode);
        log::info!("seed                    {}", self.seed);
    }
}
