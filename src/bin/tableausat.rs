use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use tableausat::formula::{Formula, parse_formula};
use tableausat::generate::random_formula;
use tableausat::suite::{SuiteConfig, load_suite, run_suite};
use tableausat::tableau::{Outcome, SolveOptions, Tableau};

#[derive(Debug, Parser)]
#[command(name = "tableausat")]
#[command(about = "Semantic tableau satisfiability for and/or formulas")]
struct Cli {
    /// Verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Decide one formula, e.g. "(a || !b) && b"
    Solve {
        formula: String,
        #[arg(long)]
        max_depth: Option<usize>,
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Print the canonical rendering of a formula
    Render { formula: String },
    /// Run a suite file of `sat <formula>` / `unsat <formula>` lines
    Check {
        path: String,
        #[arg(long)]
        csv: Option<String>,
        #[arg(long, default_value_t = 10_000)]
        timeout_ms: u64,
        #[arg(long)]
        max_depth: Option<usize>,
        #[arg(long, default_value_t = false)]
        progress: bool,
    },
    /// Print seeded random formulas with their verdicts
    Random {
        #[arg(long, default_value_t = 4)]
        vars: usize,
        #[arg(long, default_value_t = 4)]
        depth: usize,
        #[arg(long, default_value_t = 5)]
        count: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Compare tableau verdicts against a truth-table search
    Crosscheck {
        #[arg(long, default_value_t = 5)]
        vars: usize,
        #[arg(long, default_value_t = 6)]
        depth: usize,
        #[arg(long, default_value_t = 200)]
        count: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Cmd::Solve {
            formula,
            max_depth,
            timeout_ms,
        } => solve_cmd(&formula, max_depth, timeout_ms)?,
        Cmd::Render { formula } => render_cmd(&formula)?,
        Cmd::Check {
            path,
            csv,
            timeout_ms,
            max_depth,
            progress,
        } => check_cmd(&path, csv.as_deref(), timeout_ms, max_depth, progress)?,
        Cmd::Random {
            vars,
            depth,
            count,
            seed,
        } => random_cmd(vars, depth, count, seed),
        Cmd::Crosscheck {
            vars,
            depth,
            count,
            seed,
        } => crosscheck_cmd(vars, depth, count, seed)?,
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn parse_arg(src: &str) -> Result<Formula<String>> {
    parse_formula(src).with_context(|| format!("invalid formula '{}'", src))
}

fn solve_cmd(src: &str, max_depth: Option<usize>, timeout_ms: Option<u64>) -> Result<()> {
    let formula = parse_arg(src)?;
    let mut tableau = Tableau::new(SolveOptions {
        max_depth,
        timeout: timeout_ms.map(Duration::from_millis),
    });
    let outcome = tableau.solve(&formula)?;
    let stats = tableau.stats();
    match &outcome {
        Outcome::Satisfiable(model) => println!("SAT {}", model),
        Outcome::Unsatisfiable => println!("UNSAT"),
    }
    println!(
        "formula={} vars={} connectives={} steps={} branches={} conflicts={} max_depth={}",
        formula,
        formula.variables().len(),
        formula.num_connectives(),
        stats.steps,
        stats.branches,
        stats.conflicts,
        stats.max_depth
    );
    Ok(())
}

fn render_cmd(src: &str) -> Result<()> {
    let formula = parse_arg(src)?;
    println!("{}", formula);
    Ok(())
}

fn check_cmd(
    path: &str,
    csv: Option<&str>,
    timeout_ms: u64,
    max_depth: Option<usize>,
    progress: bool,
) -> Result<()> {
    let cases = load_suite(Path::new(path))?;
    let csv_path = csv.map(PathBuf::from);
    let rows = run_suite(
        &cases,
        SuiteConfig {
            timeout: Duration::from_millis(timeout_ms),
            max_depth,
            progress,
        },
        csv_path.as_deref(),
    )?;

    let mut failed = 0usize;
    for row in rows.iter().filter(|r| !r.passed()) {
        failed += 1;
        println!(
            "FAILED line {}: {} (expected {}, status {})",
            row.line,
            row.formula,
            row.expected.as_str(),
            row.status
        );
    }
    println!("CHECK SUMMARY: {}/{} passed", rows.len() - failed, rows.len());
    if failed > 0 {
        bail!("{} suite case(s) failed", failed);
    }
    Ok(())
}

fn random_cmd(vars: usize, depth: usize, count: usize, seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for idx in 0..count {
        let formula = random_formula(&mut rng, vars, depth);
        let verdict = match tableausat::solve(&formula) {
            Outcome::Satisfiable(model) => format!("SAT {}", model),
            Outcome::Unsatisfiable => "UNSAT".to_string(),
        };
        println!("#{} {} => {}", idx, formula, verdict);
    }
}

fn crosscheck_cmd(vars: usize, depth: usize, count: usize, seed: u64) -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut sat = 0usize;
    for idx in 0..count {
        let formula = random_formula(&mut rng, vars, depth);
        let oracle = formula.brute_force_sat()?;
        let outcome = tableausat::solve(&formula);
        if outcome.is_sat() != oracle {
            bail!(
                "verdict mismatch on #{} {}: tableau sat={} truth table sat={}",
                idx,
                formula,
                outcome.is_sat(),
                oracle
            );
        }
        if let Some(model) = outcome.assignment() {
            if formula.eval_partial(&|v| model.value(v)) != Some(true) {
                bail!("model {} does not satisfy #{} {}", model, idx, formula);
            }
            sat += 1;
        }
    }
    println!(
        "CROSSCHECK: {} formulas agree | sat={} unsat={} seed={}",
        count,
        sat,
        count - sat,
        seed
    );
    Ok(())
}
