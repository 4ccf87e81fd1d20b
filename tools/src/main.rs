// tools/src/main.rs
//
// inspect_hints: run word detection and label allocation over a text file
// (or stdin) and print the resulting assignment table. Useful for checking
// how a viewport would be segmented and labelled without a host editor.

use anyhow::{Context, Result};
use clap::Parser;
use libhint_core::{allocate, HintConfig, Line, WordDetector, WordDictionary};
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser)]
struct Args {
    /// Text file to inspect; stdin when omitted
    input: Option<PathBuf>,

    /// TOML configuration file (defaults apply when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the minimum word length from the config
    #[arg(long)]
    min_length: Option<usize>,

    /// Trigger key for per-key minimum-length overrides
    #[arg(long)]
    trigger_key: Option<String>,

    /// Extra allow-listed words, comma separated
    #[arg(long, value_delimiter = ',')]
    words: Vec<String>,

    /// Emit the table as JSON instead of aligned text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Row<'a> {
    label: &'a str,
    line: u32,
    col: u32,
    text: &'a str,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => HintConfig::load_toml(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => HintConfig::default(),
    };
    if let Some(min) = args.min_length {
        config.default_min_word_length = min;
    }

    let text = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            buf
        }
    };

    let lines: Vec<Line> = text
        .lines()
        .enumerate()
        .map(|(i, l)| Line::new((i + 1) as u32, l))
        .collect();

    let mut dictionary = WordDictionary::with_defaults();
    dictionary.extend(args.words.iter().cloned());

    let mut detector = WordDetector::new(&dictionary);
    if let Some(key) = args.trigger_key.as_deref() {
        detector = detector.with_trigger_key(key);
    }

    let targets = detector.detect(&lines, &config);
    let table = allocate(&targets, &config);

    if args.json {
        let rows: Vec<Row> = table
            .assignments()
            .iter()
            .map(|a| Row {
                label: &a.label,
                line: a.target.line,
                col: a.target.start_col,
                text: &a.target.text,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for a in table.assignments() {
            println!(
                "{:<4} {:>4}:{:<4} {}",
                a.label, a.target.line, a.target.start_col, a.target.text
            );
        }
        if table.dropped() > 0 {
            eprintln!("({} targets over label capacity, dropped)", table.dropped());
        }
    }

    Ok(())
}
