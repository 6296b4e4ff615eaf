use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;

use enclose::{
    bound::{BoundConfig, DEFAULT_MAX_ITERATIONS, DEFAULT_ROUNDS},
    context::Tree,
    eval::{ThreadPool, eval_eqs_with},
    solver::{ExprObjective, MultiStartConfig},
    types::Interval,
    var::Domain,
};

/// Computes guaranteed bounds on math expressions
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    cmd: Command,

    #[clap(flatten)]
    input: Input,

    /// Number of threads to use (defaults to the global pool)
    #[clap(short, long, global = true)]
    threads: Option<NonZeroUsize>,
}

#[derive(Parser)]
struct Input {
    /// Expression to evaluate, in terms of the `--var` names (repeatable)
    #[clap(short, long, conflicts_with = "script")]
    expr: Vec<String>,

    /// Variable interval, as `name=lo,hi` (repeatable)
    #[clap(short, long = "var", value_parser = parse_var)]
    vars: Vec<(String, Interval)>,

    /// Rhai script which declares variables with `var(name, lo, hi)` and
    /// expressions with `bound(expr)`
    #[clap(short, long)]
    script: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Single-shot interval evaluation
    Eval,

    /// Refined evaluation by branch-and-bound
    Bound {
        /// Target gap between each bound and an attained value
        #[clap(long)]
        tolerance: Option<f64>,

        /// Only refine the lower bound
        #[clap(long)]
        lower_only: bool,

        /// Maximum number of splits per bound, when a tolerance is given
        #[clap(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
        max_iterations: usize,

        /// Number of splits per bound, when no tolerance is given
        #[clap(long, default_value_t = DEFAULT_ROUNDS)]
        rounds: usize,

        /// Number of times to evaluate (for benchmarking)
        #[clap(short = 'N', default_value_t = 1)]
        n: usize,
    },

    /// Multi-start local minimization, sampling starts from the domain
    Minimize {
        /// Number of starting points, including the center
        #[clap(long, default_value_t = 8)]
        starts: usize,

        /// Seed for sampling starting points
        #[clap(long, default_value_t = 0)]
        seed: u64,
    },
}

fn parse_var(s: &str) -> Result<(String, Interval), String> {
    let (name, range) = s
        .split_once('=')
        .ok_or_else(|| format!("expected `name=lo,hi`, got `{s}`"))?;
    let (lo, hi) = range
        .split_once(',')
        .ok_or_else(|| format!("expected `lo,hi`, got `{range}`"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid bound `{v}`: {e}"))
    };
    let i = Interval::try_new(parse(lo)?, parse(hi)?)
        .map_err(|e| e.to_string())?;
    Ok((name.trim().to_owned(), i))
}

/// Loads expressions and their shared domain from the command line
fn load(input: &Input) -> Result<(Vec<Tree>, Domain)> {
    let mut engine = enclose::rhai::Engine::new();
    let (exprs, mut domain) = if let Some(path) = &input.script {
        let script = std::fs::read_to_string(path)?;
        let ctx = engine.run(&script)?;
        (ctx.exprs, ctx.domain)
    } else {
        let names = input
            .vars
            .iter()
            .map(|(n, _)| n.as_str())
            .collect::<Vec<_>>();
        let exprs = input
            .expr
            .iter()
            .map(|e| engine.eval(e, &names))
            .collect::<Result<Vec<_>, _>>()?;
        (exprs, Domain::new())
    };
    for (name, i) in &input.vars {
        domain.insert(name, *i);
    }
    if exprs.is_empty() {
        bail!("no expressions given; use `--expr` or `--script`");
    }
    Ok((exprs, domain))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .init();

    let now = Instant::now();
    let args = Args::parse();
    let (exprs, domain) = load(&args.input)?;
    info!("Loaded {} expressions in {:?}", exprs.len(), now.elapsed());

    let pool = match args.threads {
        None => Some(ThreadPool::Global),
        Some(n) if n.get() == 1 => None,
        Some(n) => Some(ThreadPool::Custom(
            rayon::ThreadPoolBuilder::new()
                .num_threads(n.get())
                .build()?,
        )),
    };
    let threads = pool.as_ref();
    let domains = vec![domain.clone(); exprs.len()];

    match args.cmd {
        Command::Eval => {
            let start = Instant::now();
            let out = eval_eqs_with(&exprs, &domains, threads)?;
            info!("Evaluated in {:?}", start.elapsed());
            for i in out {
                println!("{i}");
            }
        }
        Command::Bound {
            tolerance,
            lower_only,
            max_iterations,
            rounds,
            n,
        } => {
            let cfg = BoundConfig {
                tolerance,
                refine_upper: !lower_only,
                max_iterations,
                rounds,
                threads,
                ..BoundConfig::default()
            };
            let start = Instant::now();
            let mut out = vec![];
            for _ in 0..n {
                out = cfg.run(&exprs, &domains)?;
            }
            info!(
                "Bounded {}x at {:?} ms/run",
                n,
                start.elapsed().as_micros() as f64 / 1000.0 / (n as f64)
            );
            for i in out {
                println!("{i}");
            }
        }
        Command::Minimize { starts, seed } => {
            let names = domain.iter().map(|(k, _)| k).collect::<Vec<_>>();
            let bbox = domain.iter().map(|(_, v)| v).collect::<Vec<_>>();
            let cfg = MultiStartConfig {
                starts,
                seed,
                threads,
                ..MultiStartConfig::default()
            };
            for e in &exprs {
                let start = Instant::now();
                let m = cfg.minimize(&ExprObjective::new(e, &names), &bbox)?;
                info!(
                    "Minimized in {:?} ({} iterations)",
                    start.elapsed(),
                    m.iterations
                );
                let point = names
                    .iter()
                    .zip(&m.point)
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>();
                println!("{} at {}", m.value, point.join(", "));
            }
        }
    }
    Ok(())
}
