use anyhow::Context as _;
use anyhow::Result;
use kmeans2d::Bounds;
use kmeans2d::Clusterer;
use kmeans2d::Color;
use kmeans2d::Point2D;
use kmeans2d::RunInfo;
use rand::Rng;
use std::fs;
use std::io;

/// Side of the square SVG canvas, in pixels.
pub const CANVAS_SIZE: f64 = 800.0;

/// Iteration cap used when none is given on the command line.
pub const DEFAULT_MAX_ITER: usize = 100;

const BACKGROUND: Color = Color::new(20, 20, 20);
const POINT_RADIUS: f64 = 4.0;
const CENTROID_RADIUS: f64 = 8.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Svg,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "text" | "txt" => Self::Text,
            "svg" => Self::Svg,
            _ => anyhow::bail!("expected 'text' or 'svg'"),
        })
    }
}

/// Returns a buffered writer to `filename`, or to standard output if `None`.
pub fn writer(filename: Option<&String>) -> Result<Box<dyn io::Write>> {
    Ok(match filename {
        Some(filename) => {
            let file = fs::File::create(filename)
                .with_context(|| format!("failed to create {filename:?}"))?;
            Box::new(io::BufWriter::new(file))
        }
        None => Box::new(io::BufWriter::new(io::stdout())),
    })
}

/// Maps a point of `bounds` onto a canvas of `size` pixels, the y axis
/// pointing down.
pub fn canvas_position(bounds: &Bounds, point: &Point2D, size: f64) -> (f64, f64) {
    let normalized = bounds.normalize(point);
    (normalized.x * size, (1.0 - normalized.y) * size)
}

/// Empties `clusterer`, fills it with `count` random points drawn from `rng`
/// within its bounds, then places its centroids.
pub fn repopulate<R, P>(clusterer: &mut Clusterer<R>, rng: &mut P, count: usize)
where
    R: Rng,
    P: Rng,
{
    clusterer.reset();
    let bounds = *clusterer.bounds();
    for point in kmeans2d::uniform_points(rng, &bounds, count) {
        clusterer.add_data_point(point);
    }
    clusterer.initialize_centroids_randomly();
}

/// Iterates one step at a time, logging every step, until convergence or
/// `max_iter` steps.
pub fn run_steps<R>(clusterer: &mut Clusterer<R>, max_iter: usize) -> RunInfo
where
    R: Rng,
{
    let mut info = RunInfo::default();
    while info.iterations < max_iter {
        let changed = clusterer.iterate();
        info.iterations += 1;
        tracing::info!(
            iteration = info.iterations,
            changed,
            inertia = clusterer.inertia()
        );
        if !changed {
            info.converged = true;
            break;
        }
    }
    info
}

/// Runs k-means on the current dataset, step by step if `step` is set, up to
/// `max_iter` iterations.
pub fn run<R>(clusterer: &mut Clusterer<R>, step: bool, max_iter: usize) -> Result<RunInfo>
where
    R: Rng,
{
    let point_count = clusterer.data_points().len();
    anyhow::ensure!(point_count != 0, "cannot run k-means without data points");
    if clusterer.k() > point_count {
        // Some cluster is then empty after every pass and keeps being
        // reseeded, so the run cannot converge.
        tracing::warn!(
            k = clusterer.k(),
            point_count,
            "more clusters than points, stopping at the iteration cap"
        );
    }
    if step {
        Ok(run_steps(clusterer, max_iter))
    } else {
        clusterer.train(max_iter).context("failed to train")
    }
}

/// Writes the bounds (`bounds min_x max_x min_y max_y`), then one line per
/// point (`point x y cluster`), then one per centroid
/// (`centroid index x y color`).
///
/// Unassigned points have a `-` cluster.
pub fn write_text<W, R>(mut w: W, clusterer: &Clusterer<R>) -> Result<()>
where
    W: io::Write,
{
    let bounds = clusterer.bounds();
    writeln!(
        w,
        "bounds {} {} {} {}",
        bounds.min_x(),
        bounds.max_x(),
        bounds.min_y(),
        bounds.max_y(),
    )?;
    for point in clusterer.data_points() {
        let (x, y) = (point.position.x, point.position.y);
        match point.cluster {
            Some(cluster) => writeln!(w, "point {x} {y} {cluster}")?,
            None => writeln!(w, "point {x} {y} -")?,
        }
    }
    for (index, (centroid, color)) in clusterer
        .centroids()
        .iter()
        .zip(clusterer.cluster_colors())
        .enumerate()
    {
        writeln!(w, "centroid {index} {} {} {color}", centroid.x, centroid.y)?;
    }
    w.flush()?;
    Ok(())
}

/// Draws points and centroids with their cluster colors.
pub fn write_svg<W, R>(mut w: W, clusterer: &Clusterer<R>) -> Result<()>
where
    W: io::Write,
{
    let bounds = clusterer.bounds();
    writeln!(
        w,
        r#"<svg viewBox="0 0 {CANVAS_SIZE} {CANVAS_SIZE}" xmlns="http://www.w3.org/2000/svg">"#,
    )?;
    writeln!(
        w,
        r#"<rect width="{CANVAS_SIZE}" height="{CANVAS_SIZE}" fill="{BACKGROUND}"/>"#,
    )?;

    for point in clusterer.data_points() {
        let (cx, cy) = canvas_position(bounds, &point.position, CANVAS_SIZE);
        writeln!(
            w,
            r#"<circle cx="{cx}" cy="{cy}" r="{POINT_RADIUS}" fill="{}"/>"#,
            point.color,
        )?;
    }
    for (centroid, color) in clusterer.centroids().iter().zip(clusterer.cluster_colors()) {
        let (cx, cy) = canvas_position(bounds, centroid, CANVAS_SIZE);
        writeln!(
            w,
            r#"<circle cx="{cx}" cy="{cy}" r="{CENTROID_RADIUS}" fill="{color}" stroke="{}" stroke-width="2"/>"#,
            Color::WHITE,
        )?;
    }

    writeln!(w, "</svg>")?;
    w.flush()?;
    Ok(())
}
