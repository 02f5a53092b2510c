use std::process;

use clap::Parser;
use rv_algebra::VariableDescription;
use rv_calc::{compare_all, load_description, log_filter, summarize, CalcError, Comparison};
use tracing::info;

#[derive(Debug, Parser)]
struct Args {
    #[arg(short, long)]
    file: String,

    #[arg(long)]
    lt: Option<f64>,

    #[arg(long)]
    le: Option<f64>,

    #[arg(long)]
    gt: Option<f64>,

    #[arg(long)]
    ge: Option<f64>,

    #[arg(long)]
    eq: Option<f64>,

    /// Print the probability mass function of a discrete variable.
    #[arg(long)]
    pmf: bool,

    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,
}

impl Args {
    fn queries(&self) -> Vec<(Comparison, f64)> {
        [
            (Comparison::Lt, self.lt),
            (Comparison::Le, self.le),
            (Comparison::Gt, self.gt),
            (Comparison::Ge, self.ge),
            (Comparison::Eq, self.eq),
        ]
        .into_iter()
        .filter_map(|(cmp, threshold)| threshold.map(|t| (cmp, t)))
        .collect()
    }
}

fn main() {
    tracing_subscriber::fmt().with_env_filter(log_filter()).init();

    let args = Args::parse();
    info!(file = %args.file, "loading description");

    let desc: VariableDescription = load_description(&args.file).unwrap_or_else(|err| {
        eprintln!("Problem loading description: {}", err);
        process::exit(err.exit_code());
    });
    let var = desc.to_variable().unwrap_or_else(|err| {
        eprintln!("Problem building random variable: {:?}", err);
        process::exit(CalcError::from(err).exit_code());
    });

    let summary = summarize(&var).unwrap_or_else(|err| {
        eprintln!("Problem summarizing random variable: {:?}", err);
        process::exit(4);
    });
    if args.json {
        let text = serde_json::to_string_pretty(&summary).unwrap_or_else(|err| {
            eprintln!("Problem writing summary: {}", err);
            process::exit(5);
        });
        println!("{}", text);
    } else {
        println!("{}", summary);
    }

    let results = compare_all(&var, &args.queries()).unwrap_or_else(|err| {
        eprintln!("Problem comparing random variable: {:?}", err);
        process::exit(4);
    });
    for (label, event) in results {
        println!("{} = {}", label, event.probability());
    }

    if args.pmf {
        match var.pmf() {
            Some(pmf) => {
                for (k, p) in pmf.to_f64_pairs() {
                    println!("{:>10} {:.6}", k, p);
                }
            },
            None => eprintln!("{} has no mass function", args.file),
        }
    }
}
