#![cfg(feature = "cli")]

use ansi_term::Colour;
use clap::{Parser, ValueEnum};
use log::{info, warn};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use iprange_store::trie::builder::AddressIndexBuilder;
use iprange_store::trie::config::{IndexConfig, Priority};
use iprange_store::AddressTrie;

use std::error::Error;
use std::fs::File;
use std::net::IpAddr;
use std::path::PathBuf;

const HISTORY_FILE: &str = "/tmp/iprange-store-history.txt";

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PriorityArg {
    MostSpecific,
    InsertionOrder,
}

impl From<PriorityArg> for Priority {
    fn from(value: PriorityArg) -> Self {
        match value {
            PriorityArg::MostSpecific => Priority::MostSpecific,
            PriorityArg::InsertionOrder => Priority::InsertionOrder,
        }
    }
}

/// Query an index of IP address ranges built from a CSV file.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// CSV file with `spec,payload` rows, without a header
    csv: PathBuf,

    /// Which of overlapping ranges provides the payload
    #[arg(short, long, value_enum, default_value = "most-specific")]
    priority: PriorityArg,
}

fn load_specs(
    builder: &mut AddressIndexBuilder<String>,
    path: &PathBuf,
) -> Result<(), Box<dyn Error>> {
    let file = File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    for (line, result) in rdr.records().enumerate() {
        let record = result?;
        let Some(spec) = record.get(0) else {
            continue;
        };
        let payload = record.get(1).unwrap_or_default().trim().to_string();

        if let Err(err) = builder.push_str(spec, payload) {
            warn!("skipping line {} {:?}: {}", line + 1, spec, err);
        }
    }
    Ok(())
}

fn query(trie: &AddressTrie<String>, line: &str) {
    let addr = match line.parse::<IpAddr>() {
        Ok(addr) => addr,
        Err(err) => {
            println!(
                "{} can't parse address {:?}: {}",
                Colour::Red.paint("Error:"),
                line,
                err
            );
            return;
        }
    };

    let start = std::time::Instant::now();
    let found = trie.lookup_most_specific(addr);
    let elapsed = start.elapsed();

    match found {
        Some(payload) => println!(
            "{} {} {}",
            Colour::Green.paint("found"),
            addr,
            Colour::Yellow.paint(payload.as_str())
        ),
        None => println!("{} {}", Colour::Red.paint("not found"), addr),
    }
    println!("query took {} nsecs", elapsed.as_nanos());
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let config = IndexConfig {
        priority: cli.priority.into(),
    };
    let mut builder = AddressIndexBuilder::new(config);
    load_specs(&mut builder, &cli.csv)?;
    println!("finished loading {} specs...", builder.len());

    let start = std::time::Instant::now();
    let (trie, report) = builder.build_with_report();
    println!(
        "finished building index in {} msecs ({} nodes, {} marked)...",
        start.elapsed().as_millis(),
        report.nodes_created,
        report.marks_set
    );

    let mut rl = DefaultEditor::new()?;
    if rl.load_history(HISTORY_FILE).is_err() {
        info!("No previous history.");
    }

    loop {
        let readline = rl.readline("(iprange-store)> ");
        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);
                match line {
                    "q" => break,
                    "s" => println!(
                        "{}",
                        serde_json::to_string_pretty(&trie.stats())?
                    ),
                    _ => query(&trie, line),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    rl.save_history(HISTORY_FILE)?;
    Ok(())
}
