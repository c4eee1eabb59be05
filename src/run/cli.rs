use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

use super::{current_month, is_valid_month, parse_amount, shellexpand, Services, MAX_ENTRY_AMOUNT};
use crate::db::{Database, TransactionFilter};
use crate::interpret::{CommandOutcome, Confidence};
use crate::ledger::{record_voice_command, Ledger, NewEntry};
use crate::models::{Category, Currency, Source, Transaction, TransactionType, Trip};
use crate::summary::{MonthlySummary, TripSummary};
use crate::ui::util::{format_amount, truncate};

/// Flags that consume the following argument.
const VALUE_FLAGS: &[&str] = &["--month", "--trip", "--currency"];

/// Output switches understood by `voice`; every other word belongs to the phrase.
const VOICE_SWITCHES: &[&str] = &["--json", "--dry-run"];

pub(crate) fn as_cli(args: &[String], db: &mut Database, services: &Services) -> Result<()> {
    match args[1].as_str() {
        "voice" | "v" => cli_voice(&args[2..], db, services),
        "classify" => cli_classify(&args[2..], services),
        "add" => cli_add(&args[2..], db, services),
        "list" | "ls" => cli_list(&args[2..], db),
        "delete" | "rm" => cli_delete(&args[2..], db),
        "summary" | "s" => cli_summary(&args[2..], db, services),
        "trip" => cli_trip(&args[2..], db),
        "convert" => cli_convert(&args[2..], services),
        "categories" => cli_categories(services),
        "recat" => cli_recat(db, services),
        "export" => cli_export(&args[2..], db),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("voicebudget {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("VoiceBudget - local-only expense tracker driven by spoken-style commands");
    println!();
    println!("Usage: voicebudget [command]");
    println!();
    println!("Commands:");
    println!("  (none)                             Launch interactive TUI");
    println!("  voice <phrase...> [--json]         Record a command, e.g. voice gravar 12 euros almoço");
    println!("    --dry-run                        Show the interpretation without recording");
    println!("  classify <text...>                 Guess category and amount of free text");
    println!("  add <amount> <despesa|ganho> <category> [description...]");
    println!("    --trip <id>                      Link the entry to a trip");
    println!("    --currency <EUR|USD|BRL>         Entry currency (default: configured)");
    println!("  list                               List entries");
    println!("    --month <YYYY-MM>                Month to list (default: current)");
    println!("    --trip <id>                      Only entries of a trip");
    println!("  delete <id>                        Delete an entry");
    println!("  summary [YYYY-MM] [--json]         Monthly summary");
    println!("  trip new <name> <start> <end> [budget]");
    println!("  trip list                          List trips");
    println!("  trip show <id> [--json]            Trip summary");
    println!("  trip delete <id>                   Delete a trip (entries are kept)");
    println!("  convert <amount> [from] [to]       Convert at the commercial rate");
    println!("  categories                         List categories and keywords");
    println!("  recat                              Re-categorize entries filed under outros");
    println!("  export [path]                      Export entries to CSV");
    println!("    --month <YYYY-MM>                Month to export (default: current)");
    println!("  --help, -h                         Show this help");
    println!("  --version, -V                      Show version");
}

// ── Argument helpers ─────────────────────────────────────────

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

/// The spoken words of a `voice` invocation, with only the output switches removed.
fn voice_phrase(args: &[String]) -> String {
    args.iter()
        .map(String::as_str)
        .filter(|a| !VOICE_SWITCHES.contains(a))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Arguments that are neither flags nor flag values.
fn positional(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            iter.next();
        } else if !arg.starts_with("--") {
            out.push(arg.as_str());
        }
    }
    out
}

fn parse_id(arg: Option<&str>, usage: &str) -> Result<i64> {
    let raw = arg.ok_or_else(|| anyhow::anyhow!("Usage: {usage}"))?;
    raw.parse()
        .with_context(|| format!("Invalid id: {raw}"))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid date: {raw} (expected YYYY-MM-DD)"))
}

fn parse_currency(raw: &str) -> Result<Currency> {
    Currency::parse(raw).ok_or_else(|| anyhow::anyhow!("Unknown currency: {raw} (use EUR, USD or BRL)"))
}

fn month_arg(raw: Option<&str>) -> Result<String> {
    match raw {
        Some(m) if is_valid_month(m) => Ok(m.to_string()),
        Some(m) => anyhow::bail!("Invalid month: {m} (expected YYYY-MM)"),
        None => Ok(current_month()),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ── Voice ────────────────────────────────────────────────────

fn cli_voice(args: &[String], db: &mut Database, services: &Services) -> Result<()> {
    let phrase = voice_phrase(args);
    if phrase.trim().is_empty() {
        anyhow::bail!("Usage: voicebudget voice <phrase...> [--json] [--dry-run]");
    }

    if has_flag(args, "--dry-run") {
        return explain_phrase(&phrase, services);
    }

    let receipt = record_voice_command(db, &services.interpreter, &phrase, services.currency)?;
    if has_flag(args, "--json") {
        print_json(&receipt)?;
    }

    match &receipt.outcome {
        CommandOutcome::Success(_) => {
            if !has_flag(args, "--json") {
                println!("{}", receipt.message);
            }
            Ok(())
        }
        CommandOutcome::Failure(failure) => {
            if !has_flag(args, "--json") {
                eprintln!("Received: \"{}\"", failure.received_command);
                eprintln!();
                eprintln!("Try one of:");
                for example in &failure.examples {
                    eprintln!("  {example}");
                }
                eprintln!();
                eprintln!("{}", failure.tip);
                let diag = &failure.diagnostics;
                eprintln!(
                    "Diagnostics: length {}, digits {}, {} patterns tested",
                    diag.command_length,
                    if diag.has_numbers { "yes" } else { "no" },
                    diag.patterns_tested
                );
                for rejection in &diag.rejections {
                    eprintln!("  {rejection}");
                }
            }
            anyhow::bail!("{}", failure.reason);
        }
    }
}

/// Shows how a phrase would be interpreted without recording anything.
fn explain_phrase(phrase: &str, services: &Services) -> Result<()> {
    let interpreter = &services.interpreter;
    match interpreter.interpret(phrase) {
        CommandOutcome::Success(interp) => {
            let score = interpreter
                .categorizer()
                .score(&interp.description)
                .get(interp.category);
            println!("Amount:      {}", format_amount(interp.amount, services.currency));
            println!("Description: {}", interp.description);
            println!("Category:    {} (score {score})", interp.category);
            println!(
                "Rule:        #{} {}",
                interp.rule_index,
                interpreter.extractor().pattern(interp.rule_index).unwrap_or("?")
            );
            Ok(())
        }
        CommandOutcome::Failure(failure) => anyhow::bail!("{}", failure.reason),
    }
}

fn cli_classify(args: &[String], services: &Services) -> Result<()> {
    let text = positional(args).join(" ");
    if text.trim().is_empty() {
        anyhow::bail!("Usage: voicebudget classify <text...>");
    }

    let c = services.interpreter.classify(&text);
    if has_flag(args, "--json") {
        return print_json(&c);
    }
    let confidence = match c.confidence {
        Confidence::High => "high",
        Confidence::Medium => "medium",
    };
    println!("Category:   {}", c.category);
    println!("Amount:     {:.2}", c.amount);
    println!("Type:       {}", c.kind);
    println!("Confidence: {confidence}");
    Ok(())
}

// ── Entries ──────────────────────────────────────────────────

fn cli_add(args: &[String], db: &mut Database, services: &Services) -> Result<()> {
    const USAGE: &str =
        "voicebudget add <amount> <despesa|ganho> <category> [description...] [--trip <id>] [--currency <code>]";
    let pos = positional(args);
    if pos.len() < 3 {
        anyhow::bail!("Usage: {USAGE}");
    }

    let amount = parse_amount(pos[0])
        .ok_or_else(|| {
            anyhow::anyhow!("Invalid amount: {} (must be above 0 and at most {MAX_ENTRY_AMOUNT})", pos[0])
        })?;
    let kind = TransactionType::parse(pos[1])
        .ok_or_else(|| anyhow::anyhow!("Invalid type: {} (use despesa or ganho)", pos[1]))?;
    let category = Category::parse(pos[2]).ok_or_else(|| {
        let names: Vec<&str> = Category::all().iter().map(|c| c.as_str()).collect();
        anyhow::anyhow!("Unknown category: {}. Available: {}", pos[2], names.join(", "))
    })?;
    let description = if pos.len() > 3 {
        pos[3..].join(" ")
    } else {
        category.as_str().to_string()
    };

    let currency = match flag_value(args, "--currency") {
        Some(raw) => parse_currency(raw)?,
        None => services.currency,
    };
    let trip_id = match flag_value(args, "--trip") {
        Some(raw) => {
            let id = parse_id(Some(raw), USAGE)?;
            if db.get_trip(id)?.is_none() {
                anyhow::bail!("Trip #{id} not found");
            }
            Some(id)
        }
        None => None,
    };

    let txn = db.append(NewEntry {
        amount,
        kind,
        category,
        description,
        source: Source::Cli,
        currency,
        trip_id,
    })?;
    println!(
        "Added #{}: {} {} - {} ({})",
        txn.id.unwrap_or(0),
        txn.kind,
        format_amount(txn.amount, txn.currency),
        txn.description,
        txn.category
    );
    Ok(())
}

fn cli_list(args: &[String], db: &mut Database) -> Result<()> {
    let trip_id = flag_value(args, "--trip")
        .map(|raw| parse_id(Some(raw), "voicebudget list --trip <id>"))
        .transpose()?;
    // A trip listing spans months unless one is asked for explicitly.
    let month = match (flag_value(args, "--month"), trip_id) {
        (None, Some(_)) => None,
        (raw, _) => Some(month_arg(raw)?),
    };

    let txns = db.get_transactions(&TransactionFilter {
        month: month.as_deref(),
        trip_id,
        ..Default::default()
    })?;
    if txns.is_empty() {
        println!("No entries");
        return Ok(());
    }

    print_transactions(&txns);
    Ok(())
}

fn print_transactions(txns: &[Transaction]) {
    println!(
        "{:<5} {:<10}  {:<7} {:>12}  {:<12} {:<30} Trip",
        "ID", "Date", "Type", "Amount", "Category", "Description"
    );
    println!("{}", "─".repeat(90));
    for txn in txns {
        println!(
            "{:<5} {:<10}  {:<7} {:>12}  {:<12} {:<30} {}",
            txn.id.unwrap_or(0),
            txn.date,
            txn.kind,
            format_amount(txn.signed_amount(), txn.currency),
            txn.category,
            truncate(&txn.description, 30),
            txn.trip_id.map(|id| format!("#{id}")).unwrap_or_default(),
        );
    }
}

fn cli_delete(args: &[String], db: &mut Database) -> Result<()> {
    let id = parse_id(positional(args).first().copied(), "voicebudget delete <id>")?;
    let Some(txn) = db.get_transaction(id)? else {
        anyhow::bail!("Entry #{id} not found");
    };
    db.delete_transaction(id)?;
    println!("Deleted entry #{id}: {}", txn.description);
    Ok(())
}

fn cli_summary(args: &[String], db: &mut Database, services: &Services) -> Result<()> {
    let month = month_arg(positional(args).first().copied())?;
    let txns = db.get_transactions(&TransactionFilter {
        month: Some(month.as_str()),
        ..Default::default()
    })?;
    let summary = MonthlySummary::compute(&month, &txns)?;

    if has_flag(args, "--json") {
        return print_json(&summary);
    }

    let cur = services.currency;
    println!("VoiceBudget {month}");
    println!("{}", "─".repeat(40));
    println!("  Income:         {}", format_amount(summary.total_income, cur));
    println!("  Expenses:       {}", format_amount(summary.total_expenses, cur));
    println!("  Balance:        {}", format_amount(summary.balance, cur));
    println!("  Daily average:  {}", format_amount(summary.avg_daily_expense, cur));
    println!("  Expense ratio:  {}", summary.expense_ratio);
    println!("  Savings rate:   {}%", summary.savings_rate);
    println!("  Entries:        {}", summary.transaction_count);
    if let Some(biggest) = &summary.biggest_expense {
        println!(
            "  Biggest:        {} - {}",
            format_amount(biggest.amount, biggest.currency),
            biggest.description
        );
    }

    if !summary.category_distribution.is_empty() {
        println!();
        println!("Spending by Category:");
        for total in &summary.category_distribution {
            println!("  {:<16} {}", total.category.as_str(), format_amount(total.amount, cur));
        }
    }

    if !summary.source_analysis.is_empty() {
        println!();
        println!("By Source:");
        for stat in &summary.source_analysis {
            println!(
                "  {:<16} {:>4} entries  {}",
                stat.source.as_str(),
                stat.count,
                format_amount(stat.amount, cur)
            );
        }
    }

    Ok(())
}

// ── Trips ────────────────────────────────────────────────────

fn cli_trip(args: &[String], db: &mut Database) -> Result<()> {
    let rest = args.get(1..).unwrap_or_default();
    match args.first().map(String::as_str) {
        Some("new") | Some("add") => cli_trip_new(rest, db),
        Some("list") | Some("ls") | None => cli_trip_list(db),
        Some("show") => cli_trip_show(rest, db),
        Some("delete") | Some("rm") => cli_trip_delete(rest, db),
        Some(other) => anyhow::bail!("Unknown trip command: {other} (use new, list, show or delete)"),
    }
}

fn cli_trip_new(args: &[String], db: &mut Database) -> Result<()> {
    let pos = positional(args);
    if pos.len() < 3 {
        anyhow::bail!("Usage: voicebudget trip new <name> <YYYY-MM-DD> <YYYY-MM-DD> [budget]");
    }
    let budget = match pos.get(3) {
        Some(raw) => parse_amount(raw)
            .ok_or_else(|| anyhow::anyhow!("Invalid budget: {raw}"))?,
        None => Decimal::ZERO,
    };
    let trip = Trip::new(
        pos[0].to_string(),
        parse_date(pos[1])?,
        parse_date(pos[2])?,
        budget,
    )?;
    let id = db.insert_trip(&trip)?;
    info!(id, name = %trip.name, "trip created");
    println!(
        "Created trip #{id}: {} ({} to {}, {} days)",
        trip.name,
        trip.start_date,
        trip.end_date,
        trip.duration_days()
    );
    Ok(())
}

fn cli_trip_list(db: &mut Database) -> Result<()> {
    let trips = db.get_trips()?;
    if trips.is_empty() {
        println!("No trips");
        return Ok(());
    }

    println!("{:<4} {:<24} {:<10}  {:<10}  Budget", "ID", "Name", "Start", "End");
    println!("{}", "─".repeat(64));
    for trip in &trips {
        println!(
            "{:<4} {:<24} {:<10}  {:<10}  {}",
            trip.id.unwrap_or(0),
            truncate(&trip.name, 24),
            trip.start_date,
            trip.end_date,
            if trip.has_budget() {
                format!("{:.2}", trip.budget)
            } else {
                "-".into()
            },
        );
    }
    Ok(())
}

fn cli_trip_show(args: &[String], db: &mut Database) -> Result<()> {
    let id = parse_id(positional(args).first().copied(), "voicebudget trip show <id> [--json]")?;
    let trip = db
        .get_trip(id)?
        .ok_or_else(|| anyhow::anyhow!("Trip #{id} not found"))?;
    let txns = db.get_trip_transactions(id)?;
    let summary = TripSummary::compute(&trip, &txns)?;

    if has_flag(args, "--json") {
        return print_json(&summary);
    }

    println!("{} ({} to {})", trip.name, trip.start_date, trip.end_date);
    println!("{}", "─".repeat(40));
    println!("  Spent:          {:.2}", summary.total_spent);
    println!("  Duration:       {} days", summary.duration);
    println!("  Daily average:  {:.2}", summary.daily_average);
    if trip.has_budget() {
        println!("  Budget:         {:.2}", trip.budget);
        println!("  Remaining:      {:.2}", summary.budget_comparison);
        println!("  Used:           {}%", summary.budget_percentage);
    }
    println!("  Entries:        {}", summary.transaction_count);
    println!("  Status:         {}", summary.status);

    if !summary.category_distribution.is_empty() {
        println!();
        println!("Spending by Category:");
        for total in &summary.category_distribution {
            println!("  {:<16} {:.2}", total.category.as_str(), total.amount);
        }
    }
    Ok(())
}

fn cli_trip_delete(args: &[String], db: &mut Database) -> Result<()> {
    let id = parse_id(positional(args).first().copied(), "voicebudget trip delete <id>")?;
    match db.delete_trip(id)? {
        Some((trip, unlinked)) => {
            println!("Deleted trip '{}' ({unlinked} entries unlinked)", trip.name);
            Ok(())
        }
        None => anyhow::bail!("Trip #{id} not found"),
    }
}

// ── Conversion & categories ──────────────────────────────────

fn cli_convert(args: &[String], services: &Services) -> Result<()> {
    let pos = positional(args);
    let raw = pos
        .first()
        .ok_or_else(|| anyhow::anyhow!("Usage: voicebudget convert <amount> [from] [to]"))?;
    let amount =
        parse_amount(raw).ok_or_else(|| anyhow::anyhow!("Invalid amount: {raw}"))?;
    let from = match pos.get(1) {
        Some(code) => parse_currency(code)?,
        None => services.currency,
    };
    let to = match pos.get(2) {
        Some(code) => parse_currency(code)?,
        None => services.base_currency,
    };

    let conversion = services.converter.convert(amount, from, to)?;
    if has_flag(args, "--json") {
        return print_json(&conversion);
    }
    println!(
        "{} = {}  (rate {}, {})",
        format_amount(conversion.original_amount, from),
        format_amount(conversion.converted_amount, to),
        conversion.rate_used,
        conversion.source
    );
    Ok(())
}

fn cli_categories(services: &Services) -> Result<()> {
    let categorizer = services.interpreter.categorizer();
    for set in categorizer.keyword_sets() {
        println!("{}", set.category);
        println!("  {}", set.keywords().join(", "));
    }
    println!("{} (fallback)", Category::fallback());
    Ok(())
}

fn cli_recat(db: &mut Database, services: &Services) -> Result<()> {
    let mut txns = db.get_transactions(&TransactionFilter {
        category: Some(Category::fallback()),
        ..Default::default()
    })?;
    if txns.is_empty() {
        println!("No entries filed under {}", Category::fallback());
        return Ok(());
    }

    let changed = services.interpreter.categorizer().categorize_batch(&mut txns);
    for txn in txns.iter().filter(|t| t.category != Category::fallback()) {
        if let Some(id) = txn.id {
            db.update_transaction_category(id, txn.category)?;
            println!("  #{id} {} -> {}", truncate(&txn.description, 40), txn.category);
        }
    }
    info!(checked = txns.len(), changed, "recategorized entries");
    println!("Re-categorized {changed}/{} entries", txns.len());
    Ok(())
}

// ── Export ───────────────────────────────────────────────────

fn cli_export(args: &[String], db: &mut Database) -> Result<()> {
    let month = month_arg(flag_value(args, "--month"))?;

    // Output path is the first non-flag argument
    let output_path = positional(args)
        .first()
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            format!("{home}/voicebudget-export-{month}.csv")
        });

    let count = db.export_to_csv(&output_path, Some(&month))?;
    if count == 0 {
        println!("No entries for {month}");
    } else {
        println!("Exported {count} entries to {output_path}");
    }
    Ok(())
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
