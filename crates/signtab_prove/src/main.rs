use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
    process,
};

use clap::Parser;
use log::{error, info};

use signtab::{
    calculus::prove,
    parse::{dimacs::parse_dimacs, prove::parse_prove, ParseErr},
    session, Method, Params, ProofReport, SignedFormula,
};

#[derive(Parser, Debug)]
#[command(name = "prove", about = "Signed tableau prover for propositional logic")]
struct Cli {
    /// Calculus and strategy: analytic, analytic+BU, ke, ke+V, ke+P, kes3 or kes3+PB.
    #[arg(short, long, default_value = "analytic")]
    method: Method,
    /// Print the tableau before and after closing.
    #[arg(short, long)]
    verbose: bool,
    /// Print the proof report as JSON.
    #[arg(long)]
    json: bool,
    /// Problem file, `%.prove` or `%.cnf`.
    #[arg(short, long)]
    file: PathBuf,
}

#[derive(Debug)]
enum ProveErr {
    Usage(String),
    Io(PathBuf, io::Error),
    Parse(ParseErr),
    Json(serde_json::Error),
}

impl fmt::Display for ProveErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProveErr::Usage(msg) => write!(
                f,
                "{}\nUsage: prove [-m analytic|analytic+BU|ke|ke+V|ke+P|kes3|kes3+PB] [-v] [--json] -f %.prove|%.cnf",
                msg
            ),
            ProveErr::Io(path, e) => write!(f, "Cannot read {}: {}", path.display(), e),
            ProveErr::Parse(e) => write!(f, "Parse error: {}", e),
            ProveErr::Json(e) => write!(f, "Cannot serialize report: {}", e),
        }
    }
}

impl From<ParseErr> for ProveErr {
    fn from(e: ParseErr) -> Self {
        Self::Parse(e)
    }
}

impl From<serde_json::Error> for ProveErr {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Cnf,
    Prove,
}

impl Format {
    fn of(path: &Path) -> Result<Self, ProveErr> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("cnf") => Ok(Format::Cnf),
            Some("prove") => Ok(Format::Prove),
            _ => Err(ProveErr::Usage(format!(
                "Unknown problem format for {}",
                path.display()
            ))),
        }
    }

    fn read(self, text: &str) -> Result<Vec<SignedFormula>, ParseErr> {
        match self {
            Format::Cnf => parse_dimacs(text),
            Format::Prove => parse_prove(text),
        }
    }
}

fn print_verbose(report: &ProofReport, before: &str) {
    println!();
    println!("{}", before);
    println!("-------------------------------");
    println!();
    let after = report.tableau.as_deref().unwrap_or_default();
    if report.closed {
        println!("{}x", after);
    } else {
        println!("{}", after);
    }
    println!();
    println!("Total number of nodes:    {}", report.nodes);
    println!("Total number of formulae: {}", report.formulae);
    println!("Elapsed time (s):         {:.6}", report.seconds);
    if report.relevance_set.is_some() {
        println!("Relevant atoms:           {}", report.relevance_size());
    }
}

fn print_row(report: &ProofReport) {
    let s = match report.relevance_set {
        Some(_) => report.relevance_size().to_string(),
        None => String::new(),
    };
    println!(
        "{} & {} & {:.6} & {} &",
        report.nodes, report.formulae, report.seconds, s
    );
}

fn run(cli: Cli) -> Result<(), ProveErr> {
    let format = Format::of(&cli.file)?;
    let text = fs::read_to_string(&cli.file).map_err(|e| ProveErr::Io(cli.file.clone(), e))?;

    session(|| {
        let items = format.read(&text)?;
        info!(
            "read {} formulae from {}",
            items.len(),
            cli.file.display()
        );

        let before = cli.verbose.then(|| cli.method.build(items.clone()).render(0));
        let params = Params {
            method: cli.method,
            trace: cli.verbose || cli.json,
        };
        let report = prove(items, &params);

        if cli.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else if let Some(before) = before {
            print_verbose(&report, &before);
        } else {
            print_row(&report);
        }
        Ok(())
    })
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{}", e);
        eprintln!("{}", e);
        process::exit(1);
    }
}
