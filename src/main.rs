//! split-engine CLI
//!
//! Compute shared-expense balances from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Who owes whom, directly per pair
//! split-engine balances --input working-set.json --target USD
//!
//! # Minimal settlement plan
//! split-engine balances --input working-set.json --simplified
//!
//! # Simplify an existing balance list
//! split-engine simplify --input balances.json
//!
//! # Generate a random expense network for testing
//! split-engine generate --people 5 --expenses 20
//! ```

use split_engine::aggregate::aggregator::{BalanceAggregator, BalanceOptions};
use split_engine::aggregate::provider::{JsonFileProvider, WorkingSetFile};
use split_engine::convert::cache::InMemoryRateCache;
use split_engine::convert::converter::CurrencyConverter;
use split_engine::convert::fetcher::{HttpRateFetcher, OfflineRateFetcher, RateFetcher};
use split_engine::core::balance::{BalanceEntry, BalanceResult};
use split_engine::core::currency::CurrencyCode;
use split_engine::core::person::TruncatedIdResolver;
use split_engine::simplify::simplify_debts;
use split_engine::simulate::{generate_random_network, NetworkConfig};
use std::fs;
use std::process;
use std::sync::Arc;

fn print_usage() {
    eprintln!(
        r#"split-engine — shared-expense balances, conversion, and debt simplification

USAGE:
    split-engine <COMMAND> [OPTIONS]

COMMANDS:
    balances    Aggregate expenses and settlements into pairwise balances
    simplify    Reduce a balance list to a minimal settlement plan
    generate    Generate a random expense network (for testing)
    help        Show this message

OPTIONS (balances):
    --input <FILE>      Path to JSON working-set file (expenses + settlements)
    --target <CUR>      Target currency (default: USD)
    --simplified        Run the debt simplifier over the result
    --offline           Never fetch live rates; degrade through the cache
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (simplify):
    --input <FILE>      Path to a JSON array of balance entries
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (generate):
    --people <N>        Number of people (default: 5)
    --expenses <N>      Number of expenses (default: 20)
    --currencies <LIST> Comma-separated currency codes (default: USD)
    --output <FILE>     Write to file instead of stdout

EXAMPLES:
    split-engine balances --input working-set.json --target EUR --simplified
    split-engine simplify --input balances.json --format json
    split-engine generate --people 8 --expenses 40 --currencies USD,EUR"#
    );
}

fn print_entries(entries: &[BalanceEntry]) {
    let resolver = TruncatedIdResolver;
    if entries.is_empty() {
        println!("All settled up.");
        return;
    }
    for entry in entries {
        println!("{}", entry.describe(&resolver));
        for contribution in &entry.expenses {
            println!(
                "    {} ({}): {}",
                contribution.description,
                contribution.date.format("%Y-%m-%d"),
                contribution.split_amount,
            );
        }
    }
}

fn print_result(result: &BalanceResult) {
    println!("=== Balances ({}) ===", result.currency);
    print_entries(&result.balances);
    println!("Total expenses: {} {}", result.total_expenses, result.currency);
}

async fn cmd_balances(args: &[String]) {
    let mut input_path = None;
    let mut target = "USD".to_string();
    let mut simplified = false;
    let mut offline = false;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--input requires a file path");
                    process::exit(1);
                }));
            }
            "--target" => {
                i += 1;
                target = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--target requires a currency code");
                    process::exit(1);
                });
            }
            "--simplified" => simplified = true,
            "--offline" => offline = true,
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    let fetcher: Arc<dyn RateFetcher> = if offline {
        Arc::new(OfflineRateFetcher)
    } else {
        Arc::new(HttpRateFetcher::new())
    };
    let converter = CurrencyConverter::new(Arc::new(InMemoryRateCache::new()), fetcher);
    let aggregator = BalanceAggregator::new(Arc::new(JsonFileProvider::new(&path)), converter);

    let options = BalanceOptions {
        simplified,
        target_currency: CurrencyCode::new(target),
    };

    let result = match aggregator.calculate_balances(&options).await {
        Ok(result) => result,
        Err(e) => {
            log::error!("balance computation failed: {e}");
            eprintln!("Failed to load balances: {e}");
            process::exit(1);
        }
    };

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&result).unwrap());
    } else {
        print_result(&result);
    }
}

fn cmd_simplify(args: &[String]) {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--input requires a file path");
                    process::exit(1);
                }));
            }
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    let content = fs::read_to_string(&path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });
    let entries: Vec<BalanceEntry> = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected a JSON array of balance entries:");
        eprintln!(
            r#"[
  {{ "from": {{ "user_id": "bob" }}, "to": {{ "user_id": "alice" }}, "amount": "42.50", "currency": "USD" }}
]"#
        );
        process::exit(1);
    });

    let simplified = simplify_debts(&entries);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&simplified).unwrap());
    } else {
        println!(
            "=== Settlement plan ({} payment{}) ===",
            simplified.len(),
            if simplified.len() == 1 { "" } else { "s" }
        );
        print_entries(&simplified);
    }
}

fn cmd_generate(args: &[String]) {
    let mut people = 5usize;
    let mut expenses = 20usize;
    let mut currencies_str = "USD".to_string();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--people" => {
                i += 1;
                people = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--people requires a number");
                    process::exit(1);
                });
            }
            "--expenses" => {
                i += 1;
                expenses = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--expenses requires a number");
                    process::exit(1);
                });
            }
            "--currencies" => {
                i += 1;
                currencies_str = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--currencies requires a comma-separated list");
                    process::exit(1);
                });
            }
            "--output" => {
                i += 1;
                output_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--output requires a file path");
                    process::exit(1);
                }));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let currencies: Vec<CurrencyCode> = currencies_str
        .split(',')
        .map(|s| CurrencyCode::new(s.trim()))
        .collect();

    let config = NetworkConfig {
        people_count: people.max(2),
        expense_count: expenses,
        currencies,
        ..Default::default()
    };

    let working_set = WorkingSetFile {
        expenses: generate_random_network(&config),
        settlements: Vec::new(),
    };

    let json = serde_json::to_string_pretty(&working_set).unwrap();

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!(
            "Generated {} expenses across {} people → {}",
            working_set.expenses.len(),
            config.people_count,
            path
        );
    } else {
        println!("{}", json);
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "balances" => cmd_balances(rest).await,
        "simplify" => cmd_simplify(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
