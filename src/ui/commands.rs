use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::app::{App, InputMode, PendingAction, Screen};
use crate::db::Database;
use crate::interpret::CommandOutcome;
use crate::ledger::{record_voice_command, Ledger, NewEntry};
use crate::models::{Category, Currency, Source, TransactionType, Trip};
use crate::run::{is_valid_month, parse_amount, shellexpand};
use crate::ui::util::format_amount;

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Database) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit VoiceBudget", cmd_quit, r);
    register_command!("quit", "Quit VoiceBudget", cmd_quit, r);
    register_command!("d", "Go to Dashboard", cmd_dashboard, r);
    register_command!("dashboard", "Go to Dashboard", cmd_dashboard, r);
    register_command!("t", "Go to Transactions", cmd_transactions, r);
    register_command!("transactions", "Go to Transactions", cmd_transactions, r);
    register_command!("trips", "Go to Trips", cmd_trips, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!("month", "Set month (e.g. :month 2024-01)", cmd_month, r);
    register_command!("m", "Set month (e.g. :m 2024-01)", cmd_month, r);
    register_command!("next-month", "Go to next month", cmd_next_month, r);
    register_command!("prev-month", "Go to previous month", cmd_prev_month, r);
    register_command!(
        "search",
        "Search transactions (e.g. :search uber)",
        cmd_search,
        r
    );
    register_command!("s", "Search transactions (e.g. :s uber)", cmd_search, r);
    register_command!(
        "voice",
        "Record a phrase (e.g. :voice gravar 12 euros almoço)",
        cmd_voice,
        r
    );
    register_command!("v", "Record a phrase (e.g. :v paguei 8 reais uber)", cmd_voice, r);
    register_command!(
        "add",
        "Add entry (e.g. :add 12.50 despesa lazer cinema)",
        cmd_add,
        r
    );
    register_command!(
        "delete-txn",
        "Delete selected transaction",
        cmd_delete_txn,
        r
    );
    register_command!(
        "trip",
        "Create trip (e.g. :trip Lisboa 2024-05-01 2024-05-05 500)",
        cmd_trip,
        r
    );
    register_command!("delete-trip", "Delete selected trip", cmd_delete_trip, r);
    register_command!(
        "convert",
        "Convert currency (e.g. :convert 100 EUR BRL)",
        cmd_convert,
        r
    );
    register_command!(
        "recat",
        "Re-categorize entries filed under outros",
        cmd_recat,
        r
    );
    register_command!(
        "export",
        "Export month to CSV (e.g. :export ~/gastos.csv)",
        cmd_export,
        r
    );

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        (cmd.run)(args, app, db)?;
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| (levenshtein(input, k), **k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b): (Vec<char>, Vec<char>) = (a.chars().collect(), b.chars().collect());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_dashboard(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Dashboard;
    app.refresh_dashboard(db)?;
    Ok(())
}

fn cmd_transactions(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Transactions;
    app.refresh_transactions(db)?;
    Ok(())
}

fn cmd_trips(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Trips;
    app.refresh_trips(db)?;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_month(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.current_month = crate::run::current_month();
        app.refresh_dashboard(db)?;
        app.refresh_transactions(db)?;
        app.set_status(format!("Month: {}", app.current_month));
        return Ok(());
    }

    // Accept "2024-01" or a bare month number within the current year
    let month = if args.len() <= 2 {
        let year = app.current_month.get(..4).unwrap_or("1970");
        format!("{year}-{args:0>2}")
    } else {
        args.to_string()
    };

    if is_valid_month(&month) {
        app.set_status(format!("Switched to month: {month}"));
        app.current_month = month;
        app.refresh_dashboard(db)?;
        app.refresh_transactions(db)?;
    } else {
        app.set_status("Invalid month format. Use YYYY-MM (e.g. 2024-01)");
    }

    Ok(())
}

fn cmd_next_month(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    advance_month(app, db, 1)
}

fn cmd_prev_month(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    advance_month(app, db, -1)
}

fn cmd_search(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.search_input = args.to_string();
    app.screen = Screen::Transactions;
    app.transaction_index = 0;
    app.transaction_scroll = 0;
    app.refresh_transactions(db)?;
    if args.is_empty() {
        app.set_status("Search cleared");
    } else {
        app.set_status(format!("{} matches for '{args}'", app.transactions.len()));
    }
    Ok(())
}

fn cmd_voice(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.voice_input.clear();
        app.input_mode = InputMode::Voice;
        return Ok(());
    }
    record_phrase(args, app, db)
}

/// Runs `phrase` through the interpreter and records it when understood.
pub(crate) fn record_phrase(phrase: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let receipt =
        record_voice_command(db, &app.services.interpreter, phrase, app.services.currency)?;
    match &receipt.outcome {
        CommandOutcome::Success(_) => {
            app.refresh_all(db)?;
            app.set_status(receipt.message);
        }
        CommandOutcome::Failure(failure) => {
            let hint = failure
                .examples
                .first()
                .map(|e| format!(". Try: {e}"))
                .unwrap_or_default();
            app.set_status(format!("{}{hint}", failure.reason));
        }
    }
    Ok(())
}

fn cmd_add(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    const USAGE: &str = "Usage: :add <amount> <despesa|ganho> <category> [description]";
    let parts: Vec<&str> = args.split_whitespace().collect();
    if parts.len() < 3 {
        app.set_status(USAGE);
        return Ok(());
    }

    let Some(amount) = parse_amount(parts[0]) else {
        app.set_status(format!("Invalid amount: {}", parts[0]));
        return Ok(());
    };
    let Some(kind) = TransactionType::parse(parts[1]) else {
        app.set_status(format!("Invalid type: {} (use despesa or ganho)", parts[1]));
        return Ok(());
    };
    let Some(category) = Category::parse(parts[2]) else {
        let names: Vec<&str> = Category::all().iter().map(|c| c.as_str()).collect();
        app.set_status(format!(
            "Unknown category: {}. Available: {}",
            parts[2],
            names.join(", ")
        ));
        return Ok(());
    };
    let description = if parts.len() > 3 {
        parts[3..].join(" ")
    } else {
        category.as_str().to_string()
    };

    // Entries added from the Trips screen belong to the selected trip.
    let trip_id = if app.screen == Screen::Trips {
        app.selected_trip().and_then(|s| s.trip.id)
    } else {
        None
    };

    let txn = db.append(NewEntry {
        amount,
        kind,
        category,
        description,
        source: Source::Tui,
        currency: app.services.currency,
        trip_id,
    })?;
    app.refresh_all(db)?;
    app.set_status(format!(
        "Added {} {} - {}",
        txn.kind,
        format_amount(txn.amount, txn.currency),
        txn.description
    ));
    Ok(())
}

fn cmd_delete_txn(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    if app.screen != Screen::Transactions || app.transactions.is_empty() {
        app.set_status("Navigate to Transactions and select one first");
        return Ok(());
    }

    let selected = app
        .selected_transaction()
        .and_then(|t| t.id.map(|id| (id, t.description.clone())));
    if let Some((id, description)) = selected {
        app.confirm_message = format!("Delete '{description}'?");
        app.pending_action = Some(PendingAction::DeleteTransaction { id, description });
        app.input_mode = InputMode::Confirm;
    }

    Ok(())
}

fn cmd_trip(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    const USAGE: &str = "Usage: :trip <name> <YYYY-MM-DD> <YYYY-MM-DD> [budget]";
    let parts: Vec<&str> = args.split_whitespace().collect();
    if parts.len() < 3 {
        app.set_status(USAGE);
        return Ok(());
    }

    let (Ok(start), Ok(end)) = (
        NaiveDate::parse_from_str(parts[1], "%Y-%m-%d"),
        NaiveDate::parse_from_str(parts[2], "%Y-%m-%d"),
    ) else {
        app.set_status(USAGE);
        return Ok(());
    };
    let budget = match parts.get(3) {
        Some(raw) => match parse_amount(raw) {
            Some(b) => b,
            None => {
                app.set_status(format!("Invalid budget: {raw}"));
                return Ok(());
            }
        },
        None => Decimal::ZERO,
    };

    let trip = match Trip::new(parts[0].to_string(), start, end, budget) {
        Ok(trip) => trip,
        Err(e) => {
            app.set_status(e.to_string());
            return Ok(());
        }
    };
    db.insert_trip(&trip)?;
    app.screen = Screen::Trips;
    app.refresh_trips(db)?;
    app.set_status(format!(
        "Created trip '{}' ({} days)",
        trip.name,
        trip.duration_days()
    ));
    Ok(())
}

fn cmd_delete_trip(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    if app.screen != Screen::Trips || app.trips.is_empty() {
        app.set_status("Navigate to Trips and select one first");
        return Ok(());
    }

    let selected = app
        .selected_trip()
        .and_then(|s| s.trip.id.map(|id| (id, s.trip.name.clone())));
    if let Some((id, name)) = selected {
        app.confirm_message = format!("Delete trip '{name}'? Its entries are kept");
        app.pending_action = Some(PendingAction::DeleteTrip { id, name });
        app.input_mode = InputMode::Confirm;
    }

    Ok(())
}

fn cmd_convert(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    let parts: Vec<&str> = args.split_whitespace().collect();
    let Some(amount) = parts.first().and_then(|raw| parse_amount(raw)) else {
        app.set_status("Usage: :convert <amount> [from] [to]");
        return Ok(());
    };
    let from = match parts.get(1) {
        Some(code) => Currency::parse(code),
        None => Some(app.services.currency),
    };
    let to = match parts.get(2) {
        Some(code) => Currency::parse(code),
        None => Some(app.services.base_currency),
    };
    let (Some(from), Some(to)) = (from, to) else {
        app.set_status("Unknown currency (use EUR, USD or BRL)");
        return Ok(());
    };

    match app.services.converter.convert(amount, from, to) {
        Ok(c) => app.set_status(format!(
            "{} = {} (rate {}, {})",
            format_amount(c.original_amount, from),
            format_amount(c.converted_amount, to),
            c.rate_used,
            c.source
        )),
        Err(e) => app.set_status(e.to_string()),
    }
    Ok(())
}

fn cmd_recat(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let mut txns = db.get_transactions(&crate::db::TransactionFilter {
        category: Some(Category::fallback()),
        ..Default::default()
    })?;
    let changed = app.services.interpreter.categorizer().categorize_batch(&mut txns);
    for txn in txns.iter().filter(|t| t.category != Category::fallback()) {
        if let Some(id) = txn.id {
            db.update_transaction_category(id, txn.category)?;
        }
    }
    app.refresh_all(db)?;
    app.set_status(format!("Re-categorized {changed}/{} entries", txns.len()));
    Ok(())
}

fn cmd_export(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let path = if args.is_empty() {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/voicebudget-export-{}.csv", app.current_month)
    } else {
        shellexpand(args)
    };

    let count = db.export_to_csv(&path, Some(app.current_month.as_str()))?;
    if count == 0 {
        app.set_status("No transactions to export");
    } else {
        app.set_status(format!("Exported {count} transactions to {path}"));
    }
    Ok(())
}

fn advance_month(app: &mut App, db: &mut Database, delta: i32) -> anyhow::Result<()> {
    let base = app.current_month.clone();
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{base}-01"), "%Y-%m-%d") {
        let new_date = if delta > 0 {
            date.checked_add_months(chrono::Months::new(1))
        } else {
            date.checked_sub_months(chrono::Months::new(1))
        };

        if let Some(d) = new_date {
            let m = d.format("%Y-%m").to_string();
            app.set_status(format!("Month: {m}"));
            app.current_month = m;
            app.transaction_index = 0;
            app.transaction_scroll = 0;
            app.refresh_dashboard(db)?;
            app.refresh_transactions(db)?;
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
