//! Ledger repository
//!
//! Persists postings against PostgreSQL with the same semantics as the
//! in-memory engine: one database transaction per unit of work covering the
//! header insert, the line inserts, and every balance adjustment. Touched
//! account rows are locked for the duration of the posting, and balance
//! updates are atomic increments.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use core_kernel::{AccountId, CompanyId, Currency, EntryId, LineId, Money, PeriodId};
use domain_ledger::entry::transaction_number;
use domain_ledger::strategies::{
    self, asset_name_for_kind, normalize_liability_kind, StrategyPlan, CONTROL_ACCOUNT_NAME,
    RETAINED_EARNINGS_NAME,
};
use domain_ledger::{
    Account, AccountType, EntryDraft, EntryLine, EntryStatus, LedgerEntry, LedgerError,
    NewAccount, Side,
};

use crate::error::DatabaseError;
use crate::repositories::accounts::{
    apply_balance_delta, find_account_by_name, insert_account, load_account,
    load_accounts_for_update, load_investor_equity, retire_account,
};
use crate::repositories::periods::resolve_period;
use crate::repositories::{kind_from_str, kind_to_str, status_from_str, status_to_str};

/// Database row for a transaction header
#[derive(Debug, Clone, sqlx::FromRow)]
struct EntryRow {
    transaction_id: Uuid,
    company_id: Uuid,
    period_id: Uuid,
    transaction_number: String,
    transaction_date: NaiveDate,
    description: String,
    kind: String,
    total_amount: Decimal,
    external_source: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

/// Database row for a transaction line
#[derive(Debug, Clone, sqlx::FromRow)]
struct LineRow {
    line_id: Uuid,
    account_id: Uuid,
    description: Option<String>,
    debit_amount: Decimal,
    credit_amount: Decimal,
}

impl LineRow {
    fn into_domain(self, currency: Currency) -> EntryLine {
        EntryLine {
            id: LineId::from(self.line_id),
            account_id: AccountId::from(self.account_id),
            debit: Money::new(self.debit_amount, currency),
            credit: Money::new(self.credit_amount, currency),
            description: self.description,
        }
    }
}

impl EntryRow {
    fn into_domain(
        self,
        currency: Currency,
        lines: Vec<EntryLine>,
    ) -> Result<LedgerEntry, LedgerError> {
        Ok(LedgerEntry {
            id: EntryId::from(self.transaction_id),
            company_id: CompanyId::from(self.company_id),
            period_id: PeriodId::from(self.period_id),
            transaction_number: self.transaction_number,
            date: self.transaction_date,
            description: self.description,
            kind: kind_from_str(&self.kind)?,
            total_amount: Money::new(self.total_amount, currency),
            external_source: self.external_source,
            status: status_from_str(&self.status)?,
            lines,
            created_at: self.created_at,
        })
    }
}

const SELECT_ENTRY: &str = "SELECT transaction_id, company_id, period_id, transaction_number, \
     transaction_date, description, kind, total_amount, external_source, status, created_at \
     FROM transactions";

const SELECT_LINES: &str = "SELECT line_id, account_id, description, debit_amount, \
     credit_amount FROM transaction_lines";

fn require_active(account: Account) -> Result<Account, LedgerError> {
    if !account.is_active {
        return Err(LedgerError::not_found("Account", account.id));
    }
    Ok(account)
}

async fn load_lines(
    conn: &mut PgConnection,
    currency: Currency,
    entry_id: Uuid,
) -> Result<Vec<EntryLine>, LedgerError> {
    let query = format!("{} WHERE transaction_id = $1 ORDER BY line_id", SELECT_LINES);
    let rows = sqlx::query_as::<_, LineRow>(&query)
        .bind(entry_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;

    Ok(rows.into_iter().map(|r| r.into_domain(currency)).collect())
}

/// Posts a draft inside the caller's transaction
async fn post_in_tx(
    conn: &mut PgConnection,
    currency: Currency,
    draft: EntryDraft,
) -> Result<LedgerEntry, LedgerError> {
    draft.validate()?;

    // Lock every touched account and compute the deltas up front
    let ids: Vec<Uuid> = draft
        .lines
        .iter()
        .map(|l| *l.account_id.as_uuid())
        .collect();
    let accounts: HashMap<AccountId, Account> = load_accounts_for_update(conn, currency, &ids)
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();

    let mut deltas: Vec<(AccountId, Money)> = Vec::with_capacity(draft.lines.len());
    for line in &draft.lines {
        let account = accounts
            .get(&line.account_id)
            .ok_or_else(|| LedgerError::not_found("Account", line.account_id))?;
        if !account.is_active {
            return Err(LedgerError::not_found("Account", account.id));
        }
        if account.company_id != draft.company_id {
            return Err(LedgerError::validation(format!(
                "Account {} belongs to a different company",
                account.code
            )));
        }
        if line.amount().currency() != currency {
            return Err(LedgerError::validation(format!(
                "Line currency {} does not match ledger currency {}",
                line.amount().currency(),
                currency
            )));
        }
        deltas.push((
            line.account_id,
            account.balance_delta(line.side(), line.amount()),
        ));
    }

    let (period_id, is_closed) = resolve_period(conn, draft.company_id, draft.date).await?;
    if is_closed {
        return Err(LedgerError::invalid_state(format!(
            "Period covering {} is closed",
            draft.date
        )));
    }

    // Header insert; the unique (company_id, transaction_number) index
    // arbitrates number collisions and the loop regenerates on a loss
    let entry_id = EntryId::new();
    let created_at = Utc::now();
    let (debits, _) = draft.totals();
    let total = Money::new(debits, currency);

    let mut number = None;
    for _ in 0..5 {
        let candidate = transaction_number(draft.kind, draft.date);
        let inserted: Option<Uuid> = sqlx::query_scalar(
            "INSERT INTO transactions (transaction_id, company_id, period_id, \
             transaction_number, transaction_date, description, kind, total_amount, \
             external_source, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             ON CONFLICT (company_id, transaction_number) DO NOTHING \
             RETURNING transaction_id",
        )
        .bind(entry_id.as_uuid())
        .bind(draft.company_id.as_uuid())
        .bind(period_id.as_uuid())
        .bind(&candidate)
        .bind(draft.date)
        .bind(&draft.description)
        .bind(kind_to_str(draft.kind))
        .bind(total.amount())
        .bind(&draft.external_source)
        .bind(status_to_str(EntryStatus::Posted))
        .bind(created_at)
        .fetch_optional(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        if inserted.is_some() {
            number = Some(candidate);
            break;
        }
    }
    let number = number.ok_or_else(|| {
        LedgerError::Storage("Could not allocate a unique transaction number".to_string())
    })?;

    for line in &draft.lines {
        sqlx::query(
            "INSERT INTO transaction_lines (line_id, transaction_id, account_id, \
             description, debit_amount, credit_amount) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(line.id.as_uuid())
        .bind(entry_id.as_uuid())
        .bind(line.account_id.as_uuid())
        .bind(&line.description)
        .bind(line.debit.amount())
        .bind(line.credit.amount())
        .execute(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;
    }

    for (account_id, delta) in &deltas {
        apply_balance_delta(conn, *account_id, delta.amount()).await?;
    }

    info!(entry_id = %entry_id, %number, lines = draft.lines.len(), "Entry posted");

    Ok(LedgerEntry {
        id: entry_id,
        company_id: draft.company_id,
        period_id,
        transaction_number: number,
        date: draft.date,
        description: draft.description,
        kind: draft.kind,
        total_amount: total,
        external_source: draft.external_source,
        status: EntryStatus::Posted,
        lines: draft.lines,
        created_at,
    })
}

/// Voids a posted entry inside the caller's transaction
async fn void_in_tx(
    conn: &mut PgConnection,
    currency: Currency,
    id: EntryId,
    reason: &str,
) -> Result<LedgerEntry, LedgerError> {
    let query = format!("{} WHERE transaction_id = $1 FOR UPDATE", SELECT_ENTRY);
    let header = sqlx::query_as::<_, EntryRow>(&query)
        .bind(id.as_uuid())
        .fetch_optional(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?
        .ok_or_else(|| LedgerError::not_found("Transaction", id))?;

    if status_from_str(&header.status)? != EntryStatus::Posted {
        return Err(LedgerError::invalid_state(format!(
            "Only posted entries can be voided, entry {} is {}",
            id, header.status
        )));
    }

    let lines = load_lines(conn, currency, *id.as_uuid()).await?;

    let ids: Vec<Uuid> = lines.iter().map(|l| *l.account_id.as_uuid()).collect();
    let accounts: HashMap<AccountId, Account> = load_accounts_for_update(conn, currency, &ids)
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();

    // Exact mirror of posting: the same deltas, sign-flipped
    for line in &lines {
        let account = accounts
            .get(&line.account_id)
            .ok_or_else(|| LedgerError::not_found("Account", line.account_id))?;
        let delta = -account.balance_delta(line.side(), line.amount());
        apply_balance_delta(conn, line.account_id, delta.amount()).await?;
    }

    let description = format!("{} (void: {})", header.description, reason);
    sqlx::query("UPDATE transactions SET status = 'void', description = $2 WHERE transaction_id = $1")
        .bind(id.as_uuid())
        .bind(&description)
        .execute(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;

    info!(entry_id = %id, %reason, "Entry voided");

    let mut entry = header.into_domain(currency, lines)?;
    entry.status = EntryStatus::Void;
    entry.description = description;
    Ok(entry)
}

/// Creates the plan's accounts, posts its legs, retires its stakes
async fn execute_plan_in_tx(
    conn: &mut PgConnection,
    currency: Currency,
    date: NaiveDate,
    plan: StrategyPlan,
) -> Result<LedgerEntry, LedgerError> {
    let mut created: Vec<AccountId> = Vec::with_capacity(plan.new_accounts.len());
    for spec in &plan.new_accounts {
        created.push(insert_account(conn, currency, spec.clone()).await?.id);
    }

    let draft = plan.build_draft(date, &created)?;
    let entry = post_in_tx(conn, currency, draft).await?;

    for id in &plan.deactivate {
        retire_account(conn, *id).await?;
    }

    Ok(entry)
}

async fn ensure_control_account(
    conn: &mut PgConnection,
    currency: Currency,
    company_id: CompanyId,
) -> Result<Account, LedgerError> {
    if let Some(account) = find_account_by_name(
        conn,
        currency,
        company_id,
        AccountType::Asset,
        CONTROL_ACCOUNT_NAME,
    )
    .await?
    {
        return Ok(account);
    }
    insert_account(
        conn,
        currency,
        NewAccount::new(
            company_id,
            CONTROL_ACCOUNT_NAME,
            AccountType::Asset,
            Money::zero(currency),
        )
        .with_description("Contra side for single-leg entries"),
    )
    .await
}

async fn ensure_retained_earnings(
    conn: &mut PgConnection,
    currency: Currency,
    company_id: CompanyId,
) -> Result<Account, LedgerError> {
    if let Some(account) = find_account_by_name(
        conn,
        currency,
        company_id,
        AccountType::Equity,
        RETAINED_EARNINGS_NAME,
    )
    .await?
    {
        return Ok(account);
    }
    insert_account(
        conn,
        currency,
        NewAccount::new(
            company_id,
            RETAINED_EARNINGS_NAME,
            AccountType::Equity,
            Money::zero(currency),
        ),
    )
    .await
}

/// Repository for journal postings and the transaction strategies
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: PgPool,
    currency: Currency,
}

impl LedgerRepository {
    /// Creates a new repository over the given pool and book currency
    pub fn new(pool: PgPool, currency: Currency) -> Self {
        Self { pool, currency }
    }

    /// Posts a balanced entry atomically
    pub async fn post_entry(&self, draft: EntryDraft) -> Result<LedgerEntry, LedgerError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from_sqlx)?;
        let entry = post_in_tx(&mut tx, self.currency, draft).await?;
        tx.commit().await.map_err(DatabaseError::from_sqlx)?;
        Ok(entry)
    }

    /// Voids a posted entry, reversing all balance effects atomically
    pub async fn void_entry(&self, id: EntryId, reason: &str) -> Result<LedgerEntry, LedgerError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from_sqlx)?;
        let entry = void_in_tx(&mut tx, self.currency, id, reason).await?;
        tx.commit().await.map_err(DatabaseError::from_sqlx)?;
        Ok(entry)
    }

    /// Replaces a posted entry with a corrected one: void + re-post as one unit
    pub async fn correct_entry(
        &self,
        id: EntryId,
        replacement: EntryDraft,
    ) -> Result<LedgerEntry, LedgerError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from_sqlx)?;

        let query = format!("{} WHERE transaction_id = $1", SELECT_ENTRY);
        let original = sqlx::query_as::<_, EntryRow>(&query)
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(DatabaseError::from_sqlx)?
            .ok_or_else(|| LedgerError::not_found("Transaction", id))?;
        if CompanyId::from(original.company_id) != replacement.company_id {
            return Err(LedgerError::validation(
                "Correction must stay within the original entry's company",
            ));
        }

        void_in_tx(&mut tx, self.currency, id, "corrected").await?;
        let entry = post_in_tx(&mut tx, self.currency, replacement).await?;

        tx.commit().await.map_err(DatabaseError::from_sqlx)?;
        Ok(entry)
    }

    /// Fetches an entry with its lines
    pub async fn fetch_entry(&self, id: EntryId) -> Result<LedgerEntry, LedgerError> {
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from_sqlx)?;

        let query = format!("{} WHERE transaction_id = $1", SELECT_ENTRY);
        let header = sqlx::query_as::<_, EntryRow>(&query)
            .bind(id.as_uuid())
            .fetch_optional(&mut *conn)
            .await
            .map_err(DatabaseError::from_sqlx)?
            .ok_or_else(|| LedgerError::not_found("Transaction", id))?;

        let lines = load_lines(&mut conn, self.currency, *id.as_uuid()).await?;
        header.into_domain(self.currency, lines)
    }

    /// Lists a company's entries, newest first
    pub async fn entries_for_company(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from_sqlx)?;

        let query = format!(
            "{} WHERE company_id = $1 ORDER BY transaction_date DESC, created_at DESC",
            SELECT_ENTRY
        );
        let headers = sqlx::query_as::<_, EntryRow>(&query)
            .bind(company_id.as_uuid())
            .fetch_all(&mut *conn)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        let mut entries = Vec::with_capacity(headers.len());
        for header in headers {
            let lines = load_lines(&mut conn, self.currency, header.transaction_id).await?;
            entries.push(header.into_domain(self.currency, lines)?);
        }
        Ok(entries)
    }

    /// Posts a single-account entry balanced against the control account
    pub async fn record_simple_entry(
        &self,
        company_id: CompanyId,
        date: NaiveDate,
        account_id: AccountId,
        side: Side,
        amount: Money,
        description: &str,
    ) -> Result<LedgerEntry, LedgerError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from_sqlx)?;

        let account = require_active(load_account(&mut tx, self.currency, account_id, false).await?)?;
        let control = ensure_control_account(&mut tx, self.currency, company_id).await?;
        let plan = strategies::plan_simple_entry(&account, &control, side, amount, description)?;
        let entry = execute_plan_in_tx(&mut tx, self.currency, date, plan).await?;

        tx.commit().await.map_err(DatabaseError::from_sqlx)?;
        Ok(entry)
    }

    /// Records a new liability with its paired asset
    pub async fn record_liability(
        &self,
        company_id: CompanyId,
        date: NaiveDate,
        liability_name: &str,
        raw_kind: &str,
        amount: Money,
        description: Option<&str>,
    ) -> Result<LedgerEntry, LedgerError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from_sqlx)?;

        let liability = find_account_by_name(
            &mut tx,
            self.currency,
            company_id,
            AccountType::Liability,
            liability_name,
        )
        .await?;
        let kind = normalize_liability_kind(raw_kind);
        let asset = find_account_by_name(
            &mut tx,
            self.currency,
            company_id,
            AccountType::Asset,
            asset_name_for_kind(kind),
        )
        .await?;

        let plan = strategies::plan_liability(
            company_id,
            self.currency,
            liability.as_ref(),
            asset.as_ref(),
            liability_name,
            raw_kind,
            amount,
            description,
        )?;
        let entry = execute_plan_in_tx(&mut tx, self.currency, date, plan).await?;

        tx.commit().await.map_err(DatabaseError::from_sqlx)?;
        Ok(entry)
    }

    /// Transfers between two accounts when the type pair is whitelisted
    pub async fn transfer(
        &self,
        company_id: CompanyId,
        date: NaiveDate,
        from: AccountId,
        to: AccountId,
        amount: Money,
        description: &str,
    ) -> Result<LedgerEntry, LedgerError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from_sqlx)?;

        let from = require_active(load_account(&mut tx, self.currency, from, false).await?)?;
        let to = require_active(load_account(&mut tx, self.currency, to, false).await?)?;
        if from.company_id != company_id {
            return Err(LedgerError::validation(
                "Source account belongs to a different company",
            ));
        }
        let plan = strategies::plan_transfer(&from, &to, amount, description)?;
        let entry = execute_plan_in_tx(&mut tx, self.currency, date, plan).await?;

        tx.commit().await.map_err(DatabaseError::from_sqlx)?;
        Ok(entry)
    }

    /// Records an external investor buy-in
    pub async fn record_external_investment(
        &self,
        company_id: CompanyId,
        date: NaiveDate,
        target_asset: AccountId,
        investor_name: &str,
        ownership_percentage: Decimal,
        amount: Money,
    ) -> Result<LedgerEntry, LedgerError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from_sqlx)?;

        let asset = require_active(load_account(&mut tx, self.currency, target_asset, false).await?)?;
        if asset.company_id != company_id {
            return Err(LedgerError::validation(
                "Target asset belongs to a different company",
            ));
        }
        let plan = strategies::plan_external_investment(
            &asset,
            investor_name,
            ownership_percentage,
            amount,
        )?;
        let entry = execute_plan_in_tx(&mut tx, self.currency, date, plan).await?;

        tx.commit().await.map_err(DatabaseError::from_sqlx)?;
        Ok(entry)
    }

    /// Buys out an investor and retires their equity account
    pub async fn investor_exit(
        &self,
        company_id: CompanyId,
        date: NaiveDate,
        equity: AccountId,
        asset: AccountId,
        buyout: Money,
    ) -> Result<LedgerEntry, LedgerError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from_sqlx)?;

        let equity = require_active(load_account(&mut tx, self.currency, equity, true).await?)?;
        let asset = require_active(load_account(&mut tx, self.currency, asset, true).await?)?;
        if equity.company_id != company_id {
            return Err(LedgerError::validation(
                "Equity account belongs to a different company",
            ));
        }
        let retained = ensure_retained_earnings(&mut tx, self.currency, company_id).await?;
        let plan = strategies::plan_investor_exit(&equity, &asset, &retained, buyout)?;
        let entry = execute_plan_in_tx(&mut tx, self.currency, date, plan).await?;

        tx.commit().await.map_err(DatabaseError::from_sqlx)?;
        Ok(entry)
    }

    /// Distributes a profit amount across all investor equity accounts
    pub async fn distribute_profit(
        &self,
        company_id: CompanyId,
        date: NaiveDate,
        total: Money,
    ) -> Result<LedgerEntry, LedgerError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from_sqlx)?;

        let investors = load_investor_equity(&mut tx, self.currency, company_id).await?;
        let retained = ensure_retained_earnings(&mut tx, self.currency, company_id).await?;
        let plan = strategies::plan_profit_distribution(&investors, &retained, total)?;
        let entry = execute_plan_in_tx(&mut tx, self.currency, date, plan).await?;

        tx.commit().await.map_err(DatabaseError::from_sqlx)?;
        Ok(entry)
    }

    /// Draws down investor equity proportionally to shield a company asset
    pub async fn protect_assets(
        &self,
        company_id: CompanyId,
        date: NaiveDate,
        asset: AccountId,
        amount: Money,
    ) -> Result<LedgerEntry, LedgerError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from_sqlx)?;

        let asset = require_active(load_account(&mut tx, self.currency, asset, true).await?)?;
        if asset.company_id != company_id {
            return Err(LedgerError::validation(
                "Protected asset belongs to a different company",
            ));
        }
        let investors = load_investor_equity(&mut tx, self.currency, company_id).await?;
        let plan = strategies::plan_asset_protection(&investors, &asset, amount)?;
        let entry = execute_plan_in_tx(&mut tx, self.currency, date, plan).await?;

        tx.commit().await.map_err(DatabaseError::from_sqlx)?;
        Ok(entry)
    }
}
