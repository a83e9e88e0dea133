mod errors;
mod handlers;
mod state;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use fleetgrid_core::{parse_criteria, PageItem, TableState, TableView};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use errors::map_error;
use handlers::{apply_command, group_report, parse_command, stats_report, view_report, Outcome};
use state::AppState;

/// Fleet Grid - Search, sort and page through a JSON record snapshot
///
/// Examples:
///   # Show the first page, columns inferred from the records
///   fleetgrid vehicles.json
///
///   # Use a table definition for headers, formats and page size
///   fleetgrid vehicles.json --table vehicles.table.json
///
///   # Search, then sort by mileage descending (sort twice)
///   fleetgrid vehicles.json --search ford --sort mileage --sort mileage
///
///   # Structured filters (OR within a column, AND across columns)
///   fleetgrid vehicles.json --where status=active --where status=service --where plate~AB
///
///   # Counts per status, then browse interactively
///   fleetgrid vehicles.json --stats --interactive
#[derive(Parser, Debug)]
#[command(name = "fleetgrid")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Search:\n  \
    - Case-insensitive substring match over searchable columns\n  \
    - Searching or changing the page size returns to page 1\n\n\
Sorting:\n  \
    - Each --sort on a column cycles ascending, descending, unsorted\n  \
    - Records without a value always come last\n\n\
Criteria (--where):\n  \
    - column=value   equal (numbers and dates compare by value)\n  \
    - column~text    contains, ignoring case\n  \
    - column/regex   regular expression\n\n\
Logging:\n  \
    - Set RUST_LOG (e.g. RUST_LOG=fleetgrid_core=debug) for diagnostics on stderr")]
struct Cli {
    /// Path to the JSON record snapshot
    #[arg(value_name = "RECORDS")]
    records: PathBuf,

    /// Table definition file (columns, formats, page size)
    #[arg(short, long = "table", value_name = "FILE")]
    table: Option<PathBuf>,

    /// Search text
    #[arg(short, long, value_name = "TEXT")]
    search: Option<String>,

    /// Sort by a column (repeat to cycle the direction)
    #[arg(short = 'o', long = "sort", value_name = "COLUMN")]
    sort: Vec<String>,

    /// Page to show, starting at 1
    #[arg(short, long, value_name = "N")]
    page: Option<usize>,

    /// Rows per page
    #[arg(short = 'n', long = "page-size", value_name = "N")]
    page_size: Option<usize>,

    /// Structured filter (can be specified multiple times)
    #[arg(short = 'w', long = "where", value_name = "CRITERION")]
    criteria: Vec<String>,

    /// Group the filtered records by a field
    #[arg(short = 'G', long = "group-by", value_name = "FIELD")]
    group_by: Option<String>,

    /// Show counts per status and the numeric summary
    #[arg(long)]
    stats: bool,

    /// Keep reading commands from stdin after the first render
    #[arg(short, long)]
    interactive: bool,

    /// Print the view as JSON instead of a table
    #[arg(long, conflicts_with = "interactive")]
    json: bool,

    /// Debug logging when RUST_LOG is unset
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    state: &'a TableState,
    view: TableView<'a>,
    page_numbers: Vec<PageItem>,
    diagnostics: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(&cli) {
        report_error(&err);
        process::exit(1);
    }
}

fn report_error(err: &anyhow::Error) {
    let (title, message, details) = map_error(err);
    eprintln!("{} {}", format!("{}:", title).red().bold(), message);
    if !details.is_empty() {
        eprintln!("{}", details);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let criteria = parse_criteria(&cli.criteria)?;
    let mut app = AppState::load(cli.records.clone(), cli.table.clone(), criteria)
        .with_context(|| format!("loading {}", cli.records.display()))?;

    apply_flags(&mut app, cli);

    if cli.json {
        return print_json(&app);
    }

    println!("{}", view_report(&app));
    if let Some(field) = &cli.group_by {
        println!("\n{}", group_report(&app, field));
    }
    if cli.stats {
        println!("\n{}", stats_report(&app));
    }

    if cli.interactive {
        interactive(&mut app)?;
    }
    Ok(())
}

/// Replay the command-line flags through the controller's mutators, in the
/// order a user would click: page size, search, sort headers, then page.
fn apply_flags(app: &mut AppState, cli: &Cli) {
    if let Some(size) = cli.page_size {
        app.controller.set_page_size(size);
    }
    if let Some(search) = &cli.search {
        app.controller.set_search(search.as_str());
    }
    for column in &cli.sort {
        if !app.controller.request_sort(column) {
            eprintln!(
                "{} '{}' is not a sortable column; ignored",
                "Warning:".yellow().bold(),
                column
            );
        }
    }
    if let Some(page) = cli.page {
        app.controller.go_to_page(page);
    }
}

fn print_json(app: &AppState) -> Result<()> {
    let report = JsonReport {
        state: app.controller.state(),
        view: app.controller.view(),
        page_numbers: app.controller.page_numbers(),
        diagnostics: app.diagnostics.iter().map(|d| d.to_string()).collect(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn interactive(app: &mut AppState) -> Result<()> {
    println!("\n{}", "Type 'help' for commands, 'quit' to leave.".dimmed());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{} ", ">".cyan().bold());
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("reading from stdin")?;

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                report_error(&err);
                continue;
            }
        };

        match apply_command(app, command) {
            Ok(Outcome::Redraw) => println!("{}", view_report(app)),
            Ok(Outcome::Print(text)) => println!("{}", text),
            Ok(Outcome::Quit) => break,
            Err(err) => report_error(&err),
        }
    }
    Ok(())
}
