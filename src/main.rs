//! Gridcalc - a small table with an arithmetic formula engine, driven from the command line

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{LevelFilter, debug};

use gridcalc_core::{CellRef, Document, GridcalcError, Limits};

#[derive(Parser, Debug)]
#[command(name = "gridcalc", version)]
#[command(about = "Evaluate spreadsheet-style formulas over a small table")]
#[command(after_help = "\
Examples:
  gridcalc --sample
  gridcalc --columns 3 --rows 2 --set A1=10 --set B1=5 --set 'C1==A1*B1'
  gridcalc --sample -c 'D1*1.1'
  gridcalc --sample --set 'A3==D1+D2' --dependents D1")]
struct Cli {
    /// Number of rows in the table
    #[arg(long)]
    rows: Option<usize>,

    /// Number of columns in the table
    #[arg(long)]
    columns: Option<usize>,

    /// Start from the sample people table instead of an empty one
    #[arg(long, conflicts_with_all = ["rows", "columns"])]
    sample: bool,

    /// Set a cell as if typed into the editor (repeatable)
    #[arg(long = "set", value_name = "CELL=VALUE")]
    set: Vec<String>,

    /// Evaluate FORMULA and print the result; `=` is optional
    #[arg(short = 'c', long = "command", value_name = "FORMULA")]
    command: Option<String>,

    /// Cell the --command formula is evaluated as
    #[arg(long, value_name = "CELL", default_value = "A1")]
    cell: String,

    /// Print the formula cells that reference CELL
    #[arg(long, value_name = "CELL")]
    dependents: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Limits configuration file (TOML)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn parse_cell(name: &str) -> Result<CellRef> {
    let upper = name.trim().to_ascii_uppercase();
    CellRef::parse(&upper)
        .ok_or_else(|| GridcalcError::InvalidCellRef(name.to_string()).into())
}

fn build_document(cli: &Cli, limits: Limits) -> Result<Document> {
    let mut doc = if cli.sample {
        Document::sample(limits)?
    } else {
        let columns = cli
            .columns
            .unwrap_or_else(|| 4usize.clamp(limits.min_columns, limits.max_columns));
        let rows = cli
            .rows
            .unwrap_or_else(|| 3usize.clamp(limits.min_rows, limits.max_rows));
        Document::with_size(limits, columns, rows)?
    };

    for assignment in &cli.set {
        let Some((cell, input)) = assignment.split_once('=') else {
            bail!("--set expects CELL=VALUE, got '{}'", assignment);
        };
        let cell = parse_cell(cell)?;
        doc.set_cell_from_input(&cell, input)
            .with_context(|| format!("setting {}", cell))?;
        debug!("set {} = {}", cell, input);
    }
    Ok(doc)
}

/// Plain-text table: a header of column labels, then one line per row.
fn render_table(doc: &Document) -> String {
    let rows: Vec<Vec<String>> = doc
        .render_rows()
        .iter()
        .map(|row| row.iter().map(|value| value.to_string()).collect())
        .collect();
    let header: Vec<String> = doc
        .columns
        .iter()
        .map(|c| format!("{} ({})", c.label, c.id))
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, text) in widths.iter_mut().zip(row) {
            *width = (*width).max(text.chars().count());
        }
    }
    let row_width = doc.row_count().to_string().len();

    let mut out = String::new();
    let cells: Vec<String> = header
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!("{:<w$}", h, w = *w))
        .collect();
    out.push_str(&format!("{:>row_width$} | {}\n", "", cells.join(" | ")));
    for (i, row) in rows.iter().enumerate() {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(text, w)| format!("{:<w$}", text, w = *w))
            .collect();
        out.push_str(&format!("{:>row_width$} | {}\n", i + 1, cells.join(" | ")));
    }
    out
}

fn run(cli: Cli) -> Result<ExitCode> {
    let limits = Limits::load_or_default(cli.config.as_deref())?;
    let doc = build_document(&cli, limits)?;
    let mut status = ExitCode::SUCCESS;

    if let Some(target) = &cli.dependents {
        let target = parse_cell(target)?;
        let dependents = doc.dependents_of(&target);
        if cli.json {
            println!("{}", serde_json::to_string(&dependents)?);
        } else {
            for cell in dependents {
                println!("{}", cell);
            }
        }
    }

    if let Some(formula) = &cli.command {
        let cell = parse_cell(&cli.cell)?;
        let result = doc.evaluate(formula, &cell);
        if cli.json {
            println!("{}", serde_json::to_string(&result)?);
        } else if let Some(message) = result.error_message() {
            println!("#ERROR: {}", message);
        } else if let Some(value) = result.value {
            println!("{}", gridcalc_engine::engine::format_number(value));
        }
        if result.is_error() {
            status = ExitCode::FAILURE;
        }
    }

    if cli.command.is_none() && cli.dependents.is_none() {
        if cli.json {
            let labels: Vec<&str> = doc.columns.iter().map(|c| c.label.as_str()).collect();
            let ids: Vec<&str> = doc.columns.iter().map(|c| c.id.as_str()).collect();
            let table = serde_json::json!({
                "columns": ids,
                "labels": labels,
                "rows": doc.render_rows(),
            });
            println!("{}", table);
        } else {
            print!("{}", render_table(&doc));
        }
    }

    Ok(status)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(status) => status,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
