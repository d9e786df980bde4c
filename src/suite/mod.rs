use std::fs::{self, File};
use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use log::{info, warn};

use crate::formula::{Formula, parse_formula};
use crate::tableau::{Outcome, SolveError, SolveOptions, SolveStats, Tableau};

// extra wait on the worker beyond its own deadline
const JOIN_GRACE: Duration = Duration::from_millis(250);
// the search recurses once per expansion step
const WORKER_STACK_BYTES: usize = 256 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    Sat,
    Unsat,
}

impl Expect {
    pub fn as_str(self) -> &'static str {
        match self {
            Expect::Sat => "sat",
            Expect::Unsat => "unsat",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
    pub line: usize,
    pub expect: Expect,
    pub formula: Formula<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuiteConfig {
    pub timeout: Duration,
    pub max_depth: Option<usize>,
    pub progress: bool,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(10_000),
            max_depth: None,
            progress: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteRow {
    pub line: usize,
    pub formula: String,
    pub expected: Expect,
    pub status: String,
    pub verdict: Option<Expect>,
    pub model: Option<String>,
    pub wall_ms: Option<u128>,
    pub stats: Option<SolveStats>,
}

impl SuiteRow {
    pub fn csv_header() -> &'static str {
        "line,formula,expected,status,verdict,wall_ms,steps,branches,conflicts,model"
    }

    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{},{}",
            self.line,
            esc_csv(&self.formula),
            self.expected.as_str(),
            self.status,
            self.verdict.map(Expect::as_str).unwrap_or_default(),
            self.wall_ms.map(|x| x.to_string()).unwrap_or_default(),
            opt_stat(self.stats, |s| s.steps),
            opt_stat(self.stats, |s| s.branches),
            opt_stat(self.stats, |s| s.conflicts),
            esc_csv(self.model.as_deref().unwrap_or("")),
        )
    }

    pub fn passed(&self) -> bool {
        self.status == "pass"
    }
}

pub fn parse_suite_str(s: &str) -> Result<Vec<Case>> {
    parse_suite_reader(std::io::Cursor::new(s.as_bytes()))
}

/// One case per line: `sat <formula>` or `unsat <formula>`. Text after `#`
/// and blank lines are ignored.
pub fn parse_suite_reader<R: BufRead>(r: R) -> Result<Vec<Case>> {
    let mut cases = Vec::<Case>::new();
    for (idx, line) in r.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.context("failed to read suite line")?;
        let clean = strip_comment(&line).trim();
        if clean.is_empty() {
            continue;
        }

        let (tag, rest) = clean
            .split_once(char::is_whitespace)
            .ok_or_else(|| anyhow::anyhow!("line {}: expected '<sat|unsat> <formula>'", line_no))?;
        let expect = match tag {
            "sat" => Expect::Sat,
            "unsat" => Expect::Unsat,
            _ => bail!("line {}: unknown expectation '{}'", line_no, tag),
        };
        let formula =
            parse_formula(rest).with_context(|| format!("line {}: invalid formula", line_no))?;
        cases.push(Case {
            line: line_no,
            expect,
            formula,
        });
    }
    Ok(cases)
}

pub fn load_suite(path: &Path) -> Result<Vec<Case>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read suite {}", path.display()))?;
    parse_suite_str(&text)
}

/// Solves one case on a worker thread, bounded by `cfg.timeout`.
///
/// The worker gets a large stack since search depth grows with formula
/// size. A stack overflow still aborts the process.
pub fn run_case(case: &Case, cfg: SuiteConfig) -> SuiteRow {
    let start = Instant::now();
    let formula = case.formula.clone();
    let options = SolveOptions {
        max_depth: cfg.max_depth,
        timeout: Some(cfg.timeout),
    };
    let (tx, rx) = mpsc::channel();

    let spawned = thread::Builder::new()
        .name(format!("suite-line-{}", case.line))
        .stack_size(WORKER_STACK_BYTES)
        .spawn(move || {
            let mut tableau = Tableau::new(options);
            let result = tableau.solve(&formula);
            // soundness check walks the whole tree, so keep it on the big stack
            let holds = match &result {
                Ok(Outcome::Satisfiable(model)) => formula.eval_partial(&|v| model.value(v)),
                _ => None,
            };
            let _ = tx.send((result, tableau.stats(), holds));
        });
    // on failure the sender is dropped and the row becomes internal_error
    if let Err(e) = spawned {
        warn!("line {}: failed to spawn worker: {}", case.line, e);
    }

    let mut row = SuiteRow {
        line: case.line,
        formula: case.formula.to_string(),
        expected: case.expect,
        status: String::new(),
        verdict: None,
        model: None,
        wall_ms: None,
        stats: None,
    };

    match rx.recv_timeout(cfg.timeout + JOIN_GRACE) {
        Ok((result, stats, holds)) => {
            row.stats = Some(stats);
            match result {
                Ok(outcome) => judge(case, &outcome, holds, &mut row),
                Err(SolveError::Timeout { .. }) => row.status = "timeout".to_string(),
                Err(SolveError::DepthLimit { .. }) => row.status = "depth_limit".to_string(),
            }
        }
        Err(mpsc::RecvTimeoutError::Timeout) => row.status = "timeout".to_string(),
        Err(mpsc::RecvTimeoutError::Disconnected) => row.status = "internal_error".to_string(),
    }
    row.wall_ms = Some(start.elapsed().as_millis());
    row
}

fn judge(case: &Case, outcome: &Outcome<String>, holds: Option<bool>, row: &mut SuiteRow) {
    match outcome {
        Outcome::Satisfiable(model) => {
            row.verdict = Some(Expect::Sat);
            row.model = Some(model.to_string());
            row.status = if holds != Some(true) {
                "unsound".to_string()
            } else if case.expect == Expect::Sat {
                "pass".to_string()
            } else {
                "fail".to_string()
            };
        }
        Outcome::Unsatisfiable => {
            row.verdict = Some(Expect::Unsat);
            row.status = if case.expect == Expect::Unsat {
                "pass".to_string()
            } else {
                "fail".to_string()
            };
        }
    }
}

/// Runs every case in order, optionally streaming rows to a CSV file.
pub fn run_suite(
    cases: &[Case],
    cfg: SuiteConfig,
    csv_path: Option<&Path>,
) -> Result<Vec<SuiteRow>> {
    let mut csv = match csv_path {
        Some(p) => {
            let mut f = File::create(p)
                .with_context(|| format!("failed to create csv {}", p.display()))?;
            writeln!(f, "{}", SuiteRow::csv_header())?;
            f.flush()?;
            Some(f)
        }
        None => None,
    };

    let mut rows = Vec::with_capacity(cases.len());
    for case in cases {
        let row = run_case(case, cfg);
        if cfg.progress {
            println!(
                "line={} status={} verdict={} wall_ms={} formula={}",
                row.line,
                row.status,
                row.verdict.map(Expect::as_str).unwrap_or("-"),
                row.wall_ms.unwrap_or_default(),
                row.formula
            );
        }
        if let Some(f) = csv.as_mut() {
            writeln!(f, "{}", row.to_csv_line())?;
            f.flush()?;
        }
        rows.push(row);
    }

    let passed = rows.iter().filter(|r| r.passed()).count();
    info!("suite finished: {}/{} passed", passed, rows.len());
    Ok(rows)
}

fn opt_stat(stats: Option<SolveStats>, pick: fn(&SolveStats) -> usize) -> String {
    stats.map(|s| pick(&s).to_string()).unwrap_or_default()
}

fn strip_comment(s: &str) -> &str {
    if let Some(idx) = s.find('#') {
        &s[..idx]
    } else {
        s
    }
}

fn esc_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{Expect, parse_suite_str};

    #[test]
    fn parse_cases_with_comments() {
        let src = "\
# curated cases
sat   (a || !b) && b   # picks a
unsat x && !x

";
        let cases = match parse_suite_str(src) {
            Ok(v) => v,
            Err(e) => panic!("parse failed: {e}"),
        };
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].line, 2);
        assert_eq!(cases[0].expect, Expect::Sat);
        assert_eq!(cases[0].formula.to_string(), "((a || !b) && b)");
        assert_eq!(cases[1].expect, Expect::Unsat);
    }

    #[test]
    fn unknown_tag_reports_line() {
        let err = match parse_suite_str("sat a\nmaybe b\n") {
            Ok(_) => panic!("expected failure"),
            Err(e) => e,
        };
        assert!(err.to_string().contains("line 2"));
    }
}
