//! An iterative k-means clustering engine for 2D points.
//!
//! # Crate Layout
//!
//! The engine is the [`Clusterer`], a small state machine that owns a set of
//! points, `k` centroids and one display color per cluster. Callers feed it
//! points, then drive it one [iteration][Clusterer::iterate] at a time or let
//! it [train][Clusterer::train] until convergence. Its state can be read back
//! at any time, for instance to draw it.
//!
//! For one-shot use, [`KMeans`] implements the [`Partition`] trait and writes
//! the cluster of each point into a slice.
//!
//! All randomness is drawn from a caller-provided [`rand::Rng`], so that runs
//! can be reproduced with a seeded generator.

#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    rust_2018_idioms
)]

mod algorithms;
mod clusterer;
mod color;
mod geometry;
mod run_info;


pub use crate::algorithms::*;
pub use crate::clusterer::{Clusterer, DataPoint, TOLERANCE};
pub use crate::color::Color;
pub use crate::geometry::{uniform_points, Bounds, Point2D};
pub use crate::run_info::RunInfo;

pub use nalgebra;
pub use rand;

/// The `Partition` trait allows for partitioning data.
///
/// The generic argument `M` defines the input of the algorithm (e.g. a set of
/// 2D points).
///
/// The input partition must be of the correct size and its contents are
/// overwritten.
pub trait Partition<M> {
    /// Diagnostic data returned for a specific run of the algorithm.
    type Metadata;

    /// Error details, should the algorithm fail to run.
    type Error;

    /// Partition the given data and output the part ID of each element in
    /// `part_ids`.
    ///
    /// Part IDs are contiguous and start from zero. If a lower ID does not
    /// appear in the array, the part is empty.
    fn partition(&mut self, part_ids: &mut [usize], data: M)
        -> Result<Self::Metadata, Self::Error>;
}
