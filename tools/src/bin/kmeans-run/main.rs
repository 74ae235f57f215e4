use anyhow::Context as _;
use anyhow::Result;
use kmeans2d::Bounds;
use kmeans2d::Clusterer;
use kmeans2d::RunInfo;
use kmeans2d_tools::OutputFormat;
use kmeans2d_tools::DEFAULT_MAX_ITER;
use rand::Rng as _;
use rand::SeedableRng as _;
use rand_pcg::Pcg64;
use std::env;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::Registry;
use tracing_tree::HierarchicalLayer;

const USAGE: &str = "Usage: kmeans-run [options] [out-file] >out.txt";

fn report(info: RunInfo) {
    if info.converged {
        eprintln!("Converged after {} iterations.", info.iterations);
    } else {
        eprintln!("Stopped after {} iterations.", info.iterations);
    }
}

fn main() -> Result<()> {
    let mut options = getopts::Options::new();
    options.optflag("h", "help", "print this help menu");
    options.optopt(
        "a",
        "add",
        "add random points after the first run, then run again",
        "COUNT",
    );
    options.optopt("f", "format", "output format: text (default) or svg", "FORMAT");
    options.optopt(
        "i",
        "max-iter",
        "maximum number of iterations per run (default: 100)",
        "COUNT",
    );
    options.optopt("k", "clusters", "number of clusters (default: 5)", "COUNT");
    options.optopt("n", "points", "number of random points (default: 200)", "COUNT");
    options.optopt(
        "r",
        "restarts",
        "reset and run again on fresh random points, COUNT times",
        "COUNT",
    );
    options.optopt("s", "seed", "seed of the random number generator", "SEED");
    options.optflag("", "step", "iterate one step at a time and log every step");
    options.optopt("t", "trace", "emit a chrome trace", "FILE");

    let matches = options.parse(env::args().skip(1))?;

    if matches.opt_present("h") {
        eprintln!("{}", options.usage(USAGE));
        return Ok(());
    }
    if matches.free.len() > 1 {
        anyhow::bail!("too many arguments\n\n{}", options.usage(USAGE));
    }

    let registry = Registry::default().with(EnvFilter::from_env("LOG")).with(
        HierarchicalLayer::new(4)
            .with_targets(true)
            .with_bracketed_fields(true),
    );
    let _chrome_trace_guard = match matches.opt_str("t") {
        Some(filename) => {
            let (chrome_layer, guard) = tracing_chrome::ChromeLayerBuilder::new()
                .file(filename)
                .build();
            registry.with(chrome_layer).init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    };

    let k: usize = matches
        .opt_get_default("k", 5)
        .context("invalid value for option 'clusters'")?;
    let point_count: usize = matches
        .opt_get_default("n", 200)
        .context("invalid value for option 'points'")?;
    let added_count: Option<usize> = matches
        .opt_get("a")
        .context("invalid value for option 'add'")?;
    let max_iter: usize = matches
        .opt_get_default("i", DEFAULT_MAX_ITER)
        .context("invalid value for option 'max-iter'")?;
    let restarts: usize = matches
        .opt_get_default("r", 0)
        .context("invalid value for option 'restarts'")?;
    let seed: Option<u64> = matches
        .opt_get("s")
        .context("invalid value for option 'seed'")?;
    let format: OutputFormat = matches
        .opt_get_default("f", OutputFormat::Text)
        .context("invalid value for option 'format'")?;
    let step = matches.opt_present("step");

    let mut rng = match seed {
        Some(seed) => Pcg64::seed_from_u64(seed),
        None => Pcg64::from_entropy(),
    };
    let bounds = Bounds::default();
    let engine_rng = Pcg64::seed_from_u64(rng.gen());
    let mut clusterer = Clusterer::new(k, bounds, engine_rng).context("invalid settings")?;

    kmeans2d_tools::repopulate(&mut clusterer, &mut rng, point_count);

    let info = kmeans2d_tools::run(&mut clusterer, step, max_iter)?;
    report(info);

    if let Some(added_count) = added_count {
        for point in kmeans2d::uniform_points(&mut rng, &bounds, added_count) {
            clusterer.add_data_point(point);
        }
        eprintln!("Added {added_count} points.");
        let info = kmeans2d_tools::run(&mut clusterer, step, max_iter)?;
        report(info);
    }

    for restart in 1..=restarts {
        kmeans2d_tools::repopulate(&mut clusterer, &mut rng, point_count);
        eprintln!("Restart {restart}: reset with {point_count} new points.");
        let info = kmeans2d_tools::run(&mut clusterer, step, max_iter)?;
        report(info);
    }

    let output = kmeans2d_tools::writer(matches.free.first())?;
    match format {
        OutputFormat::Text => kmeans2d_tools::write_text(output, &clusterer),
        OutputFormat::Svg => kmeans2d_tools::write_svg(output, &clusterer),
    }
    .context("failed to write output")?;

    Ok(())
}
