use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use segmented_stack::{ByteStack, SearchDepth, SegmentedStack};
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::FmtSubscriber;
use workload::{Checked, Counts, Subject};

pub(crate) mod workload;

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum Workload {
    Fill,
    Sawtooth,
    Random,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum Layout {
    /// `SegmentedStack<u64>`
    Typed,
    /// `ByteStack` with 8 byte blocks
    Bytes,
}

#[derive(Debug, Parser)]
struct Cli {
    #[arg(long, value_enum)]
    workload: Workload,
    #[arg(long, value_enum, default_value_t = Layout::Typed)]
    layout: Layout,
    #[arg(long, default_value_t = 16)]
    initial_capacity: usize,
    #[arg(long, default_value_t = 100_000)]
    elements: usize,
    /// Number of elements a search examines, negative for the whole stack.
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    search_depth: i64,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    #[arg(long)]
    stats: Option<PathBuf>,
    #[arg(long)]
    log_level: Option<Level>,
}

fn write_stats(cli: &Cli, time: Option<Duration>, status: &str) -> Result<(), Box<dyn Error>> {
    let Some(stats) = &cli.stats else {
        return Ok(());
    };
    let mut out = BufWriter::new(File::create(stats)?);
    let workload = cli.workload.to_possible_value().ok_or("skipped workload")?.get_name().to_string();
    let layout = cli.layout.to_possible_value().ok_or("skipped layout")?.get_name().to_string();
    let elements = cli.elements;
    let time = time.map(|t| t.as_secs_f64()).unwrap_or(f64::NAN);
    writeln!(
        out,
        "{{\"workload\": \"{workload}\", \"layout\": \"{layout}\", \"elements\": {elements}, \"time\": {time}, \"status\": \"{status}\"}}"
    )?;
    Ok(())
}

fn run<S: Subject>(stack: S, cli: &Cli) -> Result<Counts, Box<dyn Error>> {
    let mut checked = Checked::new(stack, SearchDepth::from(cli.search_depth));
    match cli.workload {
        Workload::Fill => workload::fill(&mut checked, cli.elements)?,
        Workload::Sawtooth => workload::sawtooth(&mut checked, cli.elements, cli.initial_capacity)?,
        Workload::Random => workload::random(&mut checked, cli.elements, &mut StdRng::seed_from_u64(cli.seed))?,
    }
    checked.finish()
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(level) = cli.log_level {
        let subscriber = FmtSubscriber::builder().with_max_level(level).with_span_events(FmtSpan::CLOSE).finish();

        subscriber.init();
    };

    write_stats(&cli, None, "unfinished")?;

    let start = Instant::now();
    let counts = match cli.layout {
        Layout::Typed => run(SegmentedStack::<u64>::with_capacity(cli.initial_capacity)?, &cli)?,
        Layout::Bytes => run(ByteStack::new(cli.initial_capacity, 8)?, &cli)?,
    };
    let t = start.elapsed();

    info!(
        pushes = counts.pushes,
        pops = counts.pops,
        searches = counts.searches,
        hits = counts.hits,
        max_segments = counts.max_segments
    );
    println!(
        "{:?} {:?}  {:9} μs  pushes {}  pops {}  searches {} ({} hits)  max segments {}",
        cli.workload,
        cli.layout,
        t.as_micros(),
        counts.pushes,
        counts.pops,
        counts.searches,
        counts.hits,
        counts.max_segments,
    );

    write_stats(&cli, Some(t), "finished")?;
    Ok(())
}
