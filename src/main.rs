//! fraud-infer - exact inference on the credit-card fraud network
//!
//! Usage:
//!   fraud-infer --list                                  # List the named scenarios
//!   fraud-infer 3                                       # Run scenario 3
//!   fraud-infer fraud-prior --parameters realistic      # Run a scenario by name
//!   fraud-infer --query Fraud --evidence FP=+fp,IP=-ip  # Run an ad hoc query
//!   fraud-infer 5 -o json                               # Output the distribution as JSON

use clap::{Parser, ValueEnum};
use fraud_infer::fraud::{FraudNetwork, FraudParameters};
use fraud_infer::inference::{DeclarationOrder, EliminationOrdering, MaxCardinality, MinFill};
use fraud_infer::logging::init_tracing;
use fraud_infer::query::{parse_evidence, scenarios, EngineKind, Query, QueryRunner, Scenario};
use std::process;

#[derive(Parser)]
#[command(name = "fraud-infer")]
#[command(version)]
#[command(about = "Exact inference on the credit-card fraud Bayesian network")]
struct Cli {
    /// Scenario id or name (see --list)
    #[arg(value_name = "SCENARIO", conflicts_with = "query")]
    scenario: Option<String>,

    /// Variable to query instead of a named scenario
    #[arg(short, long, value_name = "VARIABLE")]
    query: Option<String>,

    /// Evidence for --query, as name=value pairs separated by commas
    #[arg(short, long, value_name = "EVIDENCE", requires = "query")]
    evidence: Option<String>,

    /// CPT parameter set
    #[arg(short, long, value_enum, default_value_t = Parameters::Textbook)]
    parameters: Parameters,

    /// Inference engine
    #[arg(long, value_enum, default_value_t = Engine::Ve)]
    engine: Engine,

    /// Elimination ordering used by variable elimination
    #[arg(long, value_enum, default_value_t = Ordering::Declaration)]
    ordering: Ordering,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Output::Summary)]
    output: Output,

    /// List the named scenarios instead of running one
    #[arg(short, long)]
    list: bool,

    /// Log inference steps to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Parameters {
    Textbook,
    Realistic,
}

#[derive(Clone, Copy, ValueEnum)]
enum Engine {
    Ve,
    Enumeration,
}

#[derive(Clone, Copy, ValueEnum)]
enum Ordering {
    Declaration,
    MinFill,
    MaxCardinality,
}

#[derive(Clone, Copy, ValueEnum)]
enum Output {
    Summary,
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.list {
        println!("Scenarios:");
        for s in scenarios() {
            println!("  {:>2}  {:<26} {}", s.id, s.slug, s.query);
            println!("      {}", s.description);
        }
        return;
    }

    let query = match (&cli.scenario, &cli.query) {
        (Some(key), _) => match Scenario::find(key) {
            Some(s) => s.query,
            None => {
                eprintln!("Unknown scenario '{}'; run with --list to see the scenarios", key);
                process::exit(1);
            }
        },
        (None, Some(target)) => {
            let evidence = match parse_evidence(cli.evidence.as_deref().unwrap_or("")) {
                Ok(e) => e,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(1);
                }
            };
            Query::new(target, evidence)
        },
        (None, None) => {
            eprintln!("Nothing to run: give a scenario, --query, or --list");
            process::exit(1);
        }
    };

    let params = match cli.parameters {
        Parameters::Textbook => FraudParameters::TEXTBOOK,
        Parameters::Realistic => FraudParameters::REALISTIC,
    };

    let fraud = match FraudNetwork::build(&params) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error building the {} network: {}", params.name, e);
            process::exit(1);
        }
    };

    let ordering: Box<dyn EliminationOrdering> = match cli.ordering {
        Ordering::Declaration => Box::new(DeclarationOrder),
        Ordering::MinFill => Box::new(MinFill),
        Ordering::MaxCardinality => Box::new(MaxCardinality),
    };
    let kind = match cli.engine {
        Engine::Ve => EngineKind::VariableElimination,
        Engine::Enumeration => EngineKind::Enumeration,
    };
    let runner = QueryRunner::with_engine(&fraud.network, kind, ordering);

    let dist = match runner.run(&query) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error answering {}: {}", query, e);
            process::exit(1);
        }
    };

    match cli.output {
        Output::Json => match serde_json::to_string_pretty(&dist) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing to JSON: {}", e);
                process::exit(1);
            }
        },
        Output::Summary => print!("{}", dist),
    }
}
