/// Information on a training run.
///
/// Filled in by [`Clusterer::train`](crate::Clusterer::train). Gives
/// information about how the run went.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct RunInfo {
    /// Number of iterations the algorithm underwent.
    pub iterations: usize,

    /// Whether the last iteration left every centroid in place.
    pub converged: bool,
}

impl RunInfo {
    /// A run on an input that had nothing to cluster.
    pub fn skip() -> RunInfo {
        RunInfo {
            iterations: 0,
            converged: true,
        }
    }
}
