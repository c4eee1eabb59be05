mod schema;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::ledger::{Ledger, NewEntry};
use crate::models::*;

const TXN_COLUMNS: &str =
    "t.id, t.date, t.amount, t.kind, t.category, t.description, t.trip_id, t.currency, t.source, t.created_at";

const TRIP_COLUMNS: &str = "id, name, start_date, end_date, budget, created_at";

/// Narrows `get_transactions`. Every field left `None` matches everything.
#[derive(Debug, Default, Clone)]
pub(crate) struct TransactionFilter<'a> {
    /// "YYYY-MM" prefix of the entry date.
    pub(crate) month: Option<&'a str>,
    pub(crate) trip_id: Option<i64>,
    pub(crate) category: Option<Category>,
    pub(crate) search: Option<&'a str>,
    pub(crate) limit: Option<u32>,
}

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);
        if current > schema::CURRENT_VERSION {
            anyhow::bail!(
                "Database schema v{current} is newer than this build supports (v{})",
                schema::CURRENT_VERSION
            );
        }

        Ok(())
    }

    // ── Transactions ──────────────────────────────────────────

    pub(crate) fn insert_transaction(&self, txn: &Transaction) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO transactions (date, amount, kind, category, description, trip_id, currency, source, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    txn.date,
                    txn.amount.to_string(),
                    txn.kind.as_str(),
                    txn.category.as_str(),
                    txn.description,
                    txn.trip_id,
                    txn.currency.code(),
                    txn.source.as_str(),
                    txn.created_at,
                ],
            )
            .context("Failed to insert transaction")?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Entries matching `filter`, newest first.
    pub(crate) fn get_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let mut sql = format!("SELECT {TXN_COLUMNS} FROM transactions t WHERE 1=1");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(m) = filter.month {
            sql.push_str(&format!(" AND t.date LIKE ?{}", param_values.len() + 1));
            param_values.push(Box::new(format!("{m}%")));
        }
        if let Some(trip_id) = filter.trip_id {
            sql.push_str(&format!(" AND t.trip_id = ?{}", param_values.len() + 1));
            param_values.push(Box::new(trip_id));
        }
        if let Some(category) = filter.category {
            sql.push_str(&format!(" AND t.category = ?{}", param_values.len() + 1));
            param_values.push(Box::new(category.as_str()));
        }
        if let Some(s) = filter.search {
            sql.push_str(&format!(
                " AND (t.description LIKE ?{0} OR t.category LIKE ?{0})",
                param_values.len() + 1
            ));
            param_values.push(Box::new(format!("%{s}%")));
        }

        sql.push_str(" ORDER BY t.date DESC, t.id DESC");

        if let Some(l) = filter.limit {
            sql.push_str(&format!(" LIMIT {l}"));
        }

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), transaction_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let result = self.conn.query_row(
            &format!("SELECT {TXN_COLUMNS} FROM transactions t WHERE t.id = ?1"),
            params![id],
            transaction_from_row,
        );
        match result {
            Ok(t) => Ok(Some(t)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn get_transaction_count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?)
    }

    pub(crate) fn update_transaction_category(
        &self,
        transaction_id: i64,
        category: Category,
    ) -> Result<()> {
        self.conn.execute(
            "UPDATE transactions SET category = ?1 WHERE id = ?2",
            params![category.as_str(), transaction_id],
        )?;
        Ok(())
    }

    /// Returns false when no entry had that id.
    pub(crate) fn delete_transaction(&self, id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM transactions WHERE id = ?1", params![id])?;
        if deleted > 0 {
            info!(id, "transaction deleted");
        }
        Ok(deleted > 0)
    }

    /// Writes the entries of `month` (or all entries) to a CSV file and
    /// returns how many rows were written.
    pub(crate) fn export_to_csv(&self, path: &str, month: Option<&str>) -> Result<usize> {
        let txns = self.get_transactions(&TransactionFilter {
            month,
            ..Default::default()
        })?;
        if txns.is_empty() {
            return Ok(0);
        }

        let mut wtr = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create export file: {path}"))?;
        wtr.write_record([
            "id",
            "date",
            "type",
            "amount",
            "currency",
            "category",
            "description",
            "trip_id",
            "source",
        ])?;
        for txn in &txns {
            wtr.write_record([
                txn.id.map(|id| id.to_string()).unwrap_or_default(),
                txn.date.clone(),
                txn.kind.as_str().to_string(),
                format!("{:.2}", txn.amount),
                txn.currency.code().to_string(),
                txn.category.as_str().to_string(),
                txn.description.clone(),
                txn.trip_id.map(|id| id.to_string()).unwrap_or_default(),
                txn.source.as_str().to_string(),
            ])?;
        }
        wtr.flush().context("Failed to write export file")?;
        Ok(txns.len())
    }

    // ── Trips ─────────────────────────────────────────────────

    pub(crate) fn insert_trip(&self, trip: &Trip) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO trips (name, start_date, end_date, budget, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    trip.name,
                    trip.start_date.format("%Y-%m-%d").to_string(),
                    trip.end_date.format("%Y-%m-%d").to_string(),
                    trip.budget.to_string(),
                    trip.created_at,
                ],
            )
            .context("Failed to insert trip")?;
        let id = self.conn.last_insert_rowid();
        info!(id, name = %trip.name, "trip created");
        Ok(id)
    }

    /// All trips, most recent start first.
    pub(crate) fn get_trips(&self) -> Result<Vec<Trip>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TRIP_COLUMNS} FROM trips ORDER BY start_date DESC, id DESC"
        ))?;
        let rows = stmt.query_map([], trip_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_trip(&self, id: i64) -> Result<Option<Trip>> {
        let result = self.conn.query_row(
            &format!("SELECT {TRIP_COLUMNS} FROM trips WHERE id = ?1"),
            params![id],
            trip_from_row,
        );
        match result {
            Ok(t) => Ok(Some(t)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn get_trip_transactions(&self, trip_id: i64) -> Result<Vec<Transaction>> {
        self.get_transactions(&TransactionFilter {
            trip_id: Some(trip_id),
            ..Default::default()
        })
    }

    /// Deletes a trip and clears the trip link of its entries. Returns the
    /// deleted trip and the number of entries unlinked, or `None` when the
    /// trip does not exist.
    pub(crate) fn delete_trip(&mut self, id: i64) -> Result<Option<(Trip, usize)>> {
        let Some(trip) = self.get_trip(id)? else {
            return Ok(None);
        };
        let tx = self.conn.transaction()?;
        let unlinked = tx.execute(
            "UPDATE transactions SET trip_id = NULL WHERE trip_id = ?1",
            params![id],
        )?;
        tx.execute("DELETE FROM trips WHERE id = ?1", params![id])?;
        tx.commit()?;
        info!(id, unlinked, "trip deleted");
        Ok(Some((trip, unlinked)))
    }

    // ── Analytics ─────────────────────────────────────────────

    /// (month, income, expenses) for the last `months` months that have
    /// entries, oldest first.
    pub(crate) fn get_monthly_trend(
        &self,
        months: usize,
    ) -> Result<Vec<(String, Decimal, Decimal)>> {
        let mut stmt = self.conn.prepare(
            "SELECT substr(date, 1, 7) as month,
                    CAST(SUM(CASE WHEN kind = 'ganho' THEN CAST(amount AS REAL) ELSE 0 END) AS TEXT) as income,
                    CAST(SUM(CASE WHEN kind = 'despesa' THEN CAST(amount AS REAL) ELSE 0 END) AS TEXT) as expenses
             FROM transactions
             GROUP BY month
             ORDER BY month DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![months as i64], |row| {
            let month: String = row.get(0)?;
            let inc_str: String = row.get(1)?;
            let exp_str: String = row.get(2)?;
            Ok((
                month,
                Decimal::from_str(&inc_str).unwrap_or_default().round_dp(2),
                Decimal::from_str(&exp_str).unwrap_or_default().round_dp(2),
            ))
        })?;
        let mut result: Vec<_> = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        result.reverse();
        Ok(result)
    }
}

impl Ledger for Database {
    fn append(&mut self, entry: NewEntry) -> Result<Transaction> {
        let mut txn = entry.into_transaction();
        let id = self.insert_transaction(&txn)?;
        txn.id = Some(id);
        info!(id, amount = %txn.amount, kind = %txn.kind, category = %txn.category, "ledger entry appended");
        Ok(txn)
    }
}

fn transaction_from_row(row: &Row) -> rusqlite::Result<Transaction> {
    let amount_str: String = row.get(2)?;
    let kind: String = row.get(3)?;
    let category: String = row.get(4)?;
    let currency: String = row.get(7)?;
    let source: String = row.get(8)?;
    Ok(Transaction {
        id: Some(row.get(0)?),
        date: row.get(1)?,
        amount: Decimal::from_str(&amount_str).unwrap_or_default(),
        kind: TransactionType::parse(&kind).unwrap_or(TransactionType::Expense),
        category: Category::parse(&category).unwrap_or(Category::fallback()),
        description: row.get(5)?,
        trip_id: row.get(6)?,
        currency: Currency::parse(&currency).unwrap_or(Currency::Eur),
        source: Source::parse(&source),
        created_at: row.get(9)?,
    })
}

fn trip_from_row(row: &Row) -> rusqlite::Result<Trip> {
    let budget: String = row.get(4)?;
    Ok(Trip {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        start_date: date_column(row, 2)?,
        end_date: date_column(row, 3)?,
        budget: Decimal::from_str(&budget).unwrap_or_default(),
        created_at: row.get(5)?,
    })
}

fn date_column(row: &Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
