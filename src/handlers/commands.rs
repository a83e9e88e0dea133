use crate::state::AppState;
use crate::ui;
use anyhow::{anyhow, bail, Context, Result};
use fleetgrid_core::*;
use tracing::debug;

/// One line typed at the interactive prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Sort(String),
    Page(usize),
    Size(usize),
    Next,
    Prev,
    Where(String),
    ClearWhere,
    Group(String),
    Stats,
    Reload,
    Help,
    Quit,
}

/// What the prompt should do after a command ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The table changed and should be drawn again.
    Redraw,
    /// Print this text and leave the table as it is.
    Print(String),
    Quit,
}

pub const HELP: &str = "\
Commands:
  search <text>      filter rows containing <text> (empty clears)
  sort <column>      cycle ascending, descending, unsorted
  page <n>           go to page <n>
  size <n>           rows per page
  next, prev         move one page
  where <criterion>  add a filter: col=value, col~text or col/regex
  clear              remove every where filter
  group <field>      list records grouped by <field>
  stats              counts per status and numeric summary
  reload             re-read the input files
  help               show this text
  quit               leave";

/// Parse a prompt line. Blank lines parse to `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "search" | "s" => Command::Search(rest.to_string()),
        "sort" | "o" => Command::Sort(required(rest, "sort <column>")?),
        "page" | "g" => Command::Page(number(rest, "page <n>")?),
        "size" => Command::Size(number(rest, "size <n>")?),
        "next" | "n" => Command::Next,
        "prev" | "p" => Command::Prev,
        "where" | "w" => Command::Where(required(rest, "where <criterion>")?),
        "clear" => Command::ClearWhere,
        "group" => Command::Group(required(rest, "group <field>")?),
        "stats" => Command::Stats,
        "reload" => Command::Reload,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => bail!("unknown command '{}' (type 'help' for a list)", other),
    };
    Ok(Some(command))
}

fn required(rest: &str, usage: &str) -> Result<String> {
    if rest.is_empty() {
        bail!("usage: {}", usage);
    }
    Ok(rest.to_string())
}

fn number(rest: &str, usage: &str) -> Result<usize> {
    rest.parse().map_err(|_| anyhow!("usage: {}", usage))
}

/// Run a command against the application state.
pub fn apply_command(app: &mut AppState, command: Command) -> Result<Outcome> {
    debug!(?command, "applying command");

    let outcome = match command {
        Command::Search(text) => {
            app.controller.set_search(text);
            Outcome::Redraw
        }
        Command::Sort(column) => {
            if !app.controller.request_sort(&column) {
                bail!("'{}' is not a sortable column", column);
            }
            Outcome::Redraw
        }
        Command::Page(page) => {
            app.controller.go_to_page(page);
            Outcome::Redraw
        }
        Command::Size(size) => {
            app.controller.set_page_size(size);
            Outcome::Redraw
        }
        Command::Next => {
            app.controller.next_page();
            Outcome::Redraw
        }
        Command::Prev => {
            app.controller.previous_page();
            Outcome::Redraw
        }
        Command::Where(raw) => {
            let added = parse_criteria(std::slice::from_ref(&raw))?;
            let mut criteria = app.criteria.clone();
            for (column, options) in added.columns {
                for criterion in options {
                    criteria.add(column.clone(), criterion);
                }
            }
            app.set_criteria(criteria);
            Outcome::Redraw
        }
        Command::ClearWhere => {
            app.set_criteria(Criteria::new());
            Outcome::Redraw
        }
        Command::Group(field) => Outcome::Print(group_report(app, &field)),
        Command::Stats => Outcome::Print(stats_report(app)),
        Command::Reload => {
            app.reload().context("reload failed")?;
            Outcome::Redraw
        }
        Command::Help => Outcome::Print(HELP.to_string()),
        Command::Quit => Outcome::Quit,
    };
    Ok(outcome)
}

/// Table, page links and status line for the current view.
pub fn view_report(app: &AppState) -> String {
    let controller = &app.controller;
    let view = controller.view();

    let mut out = ui::format_table(controller.columns(), &view, &controller.state().sort);
    out.push_str("\n\n");
    if view.total_pages > 1 {
        out.push_str(&ui::format_page_nav(&view.page_numbers(), view.clamped_page));
        out.push('\n');
    }
    out.push_str(&ui::format_status(&view, controller.state(), app.all_records.len()));
    out
}

/// Records passing the where filters, grouped by `field`.
pub fn group_report(app: &AppState, field: &str) -> String {
    let records = app.filtered_records();
    let groups = group_by_field(records, field);
    let names = sorted_group_names(&groups);
    ui::format_groups(&groups, &names, field, app.controller.columns())
}

/// Status counts and numeric summary over the records passing the where
/// filters.
pub fn stats_report(app: &AppState) -> String {
    let records = app.filtered_records();
    let status_field = app.status_field();

    match app.average_field() {
        Some(field) => {
            let stats = collection_stats(records, status_field, field);
            let summary = field_summary(records, field);
            ui::format_stats(&stats, status_field, Some((field, &summary)))
        }
        None => {
            let stats = CollectionStats {
                total: records.len(),
                by_status: count_by(records, status_field),
                average: 0.0,
            };
            ui::format_stats(&stats, status_field, None)
        }
    }
}
