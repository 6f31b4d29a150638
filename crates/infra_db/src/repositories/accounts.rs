//! Account repository
//!
//! Database access for the chart of accounts: creation with generated
//! codes, partial updates, atomic balance adjustment, and soft deletion
//! guarded by dependent rows.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use core_kernel::{AccountId, CompanyId, Currency, Money};
use domain_ledger::account::{next_account_code, normalize_opening_balance, InvestorStake};
use domain_ledger::{Account, AccountPatch, AccountType, LedgerError, NewAccount};

use crate::error::DatabaseError;
use crate::repositories::{account_type_from_str, account_type_to_str};

/// Database row for an account
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountRow {
    pub account_id: Uuid,
    pub company_id: Uuid,
    pub account_code: String,
    pub account_name: String,
    pub account_type: String,
    pub is_contra: bool,
    pub is_active: bool,
    pub opening_balance: Decimal,
    pub current_balance: Decimal,
    pub description: Option<String>,
    pub investor_name: Option<String>,
    pub ownership_percentage: Option<Decimal>,
    pub parent_account_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl AccountRow {
    pub(crate) fn into_domain(self, currency: Currency) -> Result<Account, LedgerError> {
        let investor = match (self.investor_name, self.ownership_percentage) {
            (Some(name), Some(percentage)) => Some(InvestorStake {
                investor_name: name,
                ownership_percentage: percentage,
            }),
            _ => None,
        };

        Ok(Account {
            id: AccountId::from(self.account_id),
            company_id: CompanyId::from(self.company_id),
            code: self.account_code,
            name: self.account_name,
            account_type: account_type_from_str(&self.account_type)?,
            is_contra: self.is_contra,
            is_active: self.is_active,
            opening_balance: Money::new(self.opening_balance, currency),
            current_balance: Money::new(self.current_balance, currency),
            description: self.description,
            investor,
            parent_id: self.parent_account_id.map(AccountId::from),
            created_at: self.created_at,
        })
    }
}

pub(crate) const SELECT_ACCOUNT: &str = "SELECT account_id, company_id, account_code, \
     account_name, account_type, is_contra, is_active, opening_balance, current_balance, \
     description, investor_name, ownership_percentage, parent_account_id, created_at \
     FROM accounts";

/// Loads and row-locks a set of accounts for a posting
pub(crate) async fn load_accounts_for_update(
    conn: &mut PgConnection,
    currency: Currency,
    ids: &[Uuid],
) -> Result<Vec<Account>, LedgerError> {
    let query = format!(
        "{} WHERE account_id = ANY($1) ORDER BY account_id FOR UPDATE",
        SELECT_ACCOUNT
    );
    let rows = sqlx::query_as::<_, AccountRow>(&query)
        .bind(ids)
        .fetch_all(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;

    rows.into_iter().map(|r| r.into_domain(currency)).collect()
}

/// Loads one account, optionally taking a row lock for the posting path
pub(crate) async fn load_account(
    conn: &mut PgConnection,
    currency: Currency,
    id: AccountId,
    for_update: bool,
) -> Result<Account, LedgerError> {
    let query = if for_update {
        format!("{} WHERE account_id = $1 FOR UPDATE", SELECT_ACCOUNT)
    } else {
        format!("{} WHERE account_id = $1", SELECT_ACCOUNT)
    };

    let row = sqlx::query_as::<_, AccountRow>(&query)
        .bind(id.as_uuid())
        .fetch_optional(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?
        .ok_or_else(|| LedgerError::not_found("Account", id))?;

    row.into_domain(currency)
}

/// Finds an active account by type and name within a company
pub(crate) async fn find_account_by_name(
    conn: &mut PgConnection,
    currency: Currency,
    company_id: CompanyId,
    account_type: AccountType,
    name: &str,
) -> Result<Option<Account>, LedgerError> {
    let query = format!(
        "{} WHERE company_id = $1 AND account_type = $2 AND account_name = $3 \
         AND is_active = TRUE LIMIT 1",
        SELECT_ACCOUNT
    );
    let row = sqlx::query_as::<_, AccountRow>(&query)
        .bind(company_id.as_uuid())
        .bind(account_type_to_str(account_type))
        .bind(name)
        .fetch_optional(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;

    row.map(|r| r.into_domain(currency)).transpose()
}

/// Loads a company's active investor equity accounts, locked for posting
pub(crate) async fn load_investor_equity(
    conn: &mut PgConnection,
    currency: Currency,
    company_id: CompanyId,
) -> Result<Vec<Account>, LedgerError> {
    let query = format!(
        "{} WHERE company_id = $1 AND account_type = 'equity' AND is_active = TRUE \
         AND investor_name IS NOT NULL AND ownership_percentage > 0 \
         ORDER BY account_code FOR UPDATE",
        SELECT_ACCOUNT
    );
    let rows = sqlx::query_as::<_, AccountRow>(&query)
        .bind(company_id.as_uuid())
        .fetch_all(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;

    rows.into_iter().map(|r| r.into_domain(currency)).collect()
}

/// Inserts an account with a generated code inside the caller's transaction
///
/// Code generation races with concurrent inserts; the unique
/// (company_id, account_code) index arbitrates via ON CONFLICT DO NOTHING
/// and the loop recomputes on a lost race.
pub(crate) async fn insert_account(
    conn: &mut PgConnection,
    currency: Currency,
    spec: NewAccount,
) -> Result<Account, LedgerError> {
    spec.validate()?;
    if spec.opening_balance.currency() != currency {
        return Err(LedgerError::validation(format!(
            "Opening balance currency {} does not match ledger currency {}",
            spec.opening_balance.currency(),
            currency
        )));
    }
    if let Some(parent_id) = spec.parent_id {
        let parent = load_account(&mut *conn, currency, parent_id, false).await?;
        if parent.company_id != spec.company_id {
            return Err(LedgerError::validation(
                "Parent account belongs to a different company",
            ));
        }
    }

    let opening = normalize_opening_balance(spec.account_type, spec.opening_balance);
    let prefix = spec.account_type.code_prefix();
    let account_id = AccountId::new();
    let created_at = Utc::now();

    for _ in 0..5 {
        let codes: Vec<String> = sqlx::query_scalar(
            "SELECT account_code FROM accounts WHERE company_id = $1",
        )
        .bind(spec.company_id.as_uuid())
        .fetch_all(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        let code = next_account_code(prefix, codes.iter().map(String::as_str));

        let inserted: Option<Uuid> = sqlx::query_scalar(
            "INSERT INTO accounts (account_id, company_id, account_code, account_name, \
             account_type, is_contra, is_active, opening_balance, current_balance, \
             description, investor_name, ownership_percentage, parent_account_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7, $7, $8, $9, $10, $11, $12) \
             ON CONFLICT (company_id, account_code) DO NOTHING \
             RETURNING account_id",
        )
        .bind(account_id.as_uuid())
        .bind(spec.company_id.as_uuid())
        .bind(&code)
        .bind(&spec.name)
        .bind(account_type_to_str(spec.account_type))
        .bind(spec.is_contra)
        .bind(opening.amount())
        .bind(&spec.description)
        .bind(spec.investor.as_ref().map(|s| s.investor_name.clone()))
        .bind(spec.investor.as_ref().map(|s| s.ownership_percentage))
        .bind(spec.parent_id.map(|p| *p.as_uuid()))
        .bind(created_at)
        .fetch_optional(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        if inserted.is_some() {
            info!(account_id = %account_id, %code, "Account created");
            return Ok(Account {
                id: account_id,
                company_id: spec.company_id,
                code,
                name: spec.name,
                account_type: spec.account_type,
                is_contra: spec.is_contra,
                is_active: true,
                opening_balance: opening,
                current_balance: opening,
                description: spec.description,
                investor: spec.investor,
                parent_id: spec.parent_id,
                created_at,
            });
        }
    }

    Err(LedgerError::Storage(
        "Could not allocate a unique account code".to_string(),
    ))
}

/// Applies a signed balance delta as a single atomic increment
///
/// Expressed as `current_balance = current_balance + delta`, never
/// read-modify-write, so concurrent postings cannot lose updates.
pub(crate) async fn apply_balance_delta(
    conn: &mut PgConnection,
    id: AccountId,
    delta: Decimal,
) -> Result<(), LedgerError> {
    let result = sqlx::query(
        "UPDATE accounts SET current_balance = current_balance + $2 WHERE account_id = $1",
    )
    .bind(id.as_uuid())
    .bind(delta)
    .execute(&mut *conn)
    .await
    .map_err(DatabaseError::from_sqlx)?;

    if result.rows_affected() == 0 {
        return Err(LedgerError::not_found("Account", id));
    }
    Ok(())
}

/// Retires an account without the dependent-row guards (strategy path)
pub(crate) async fn retire_account(
    conn: &mut PgConnection,
    id: AccountId,
) -> Result<(), LedgerError> {
    let result = sqlx::query("UPDATE accounts SET is_active = FALSE WHERE account_id = $1")
        .bind(id.as_uuid())
        .execute(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;

    if result.rows_affected() == 0 {
        return Err(LedgerError::not_found("Account", id));
    }
    Ok(())
}

/// Repository for the chart of accounts
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: PgPool,
    currency: Currency,
}

impl AccountRepository {
    /// Creates a new repository over the given pool and book currency
    pub fn new(pool: PgPool, currency: Currency) -> Self {
        Self { pool, currency }
    }

    /// Creates an account with a generated sequential code
    pub async fn create(&self, spec: NewAccount) -> Result<Account, LedgerError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from_sqlx)?;
        let account = insert_account(&mut tx, self.currency, spec).await?;
        tx.commit().await.map_err(DatabaseError::from_sqlx)?;
        Ok(account)
    }

    /// Fetches an account by ID, active or not
    pub async fn fetch(&self, id: AccountId) -> Result<Account, LedgerError> {
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from_sqlx)?;
        load_account(&mut conn, self.currency, id, false).await
    }

    /// Lists a company's accounts, active first, ordered by code
    pub async fn list_for_company(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<Account>, LedgerError> {
        let query = format!(
            "{} WHERE company_id = $1 ORDER BY is_active DESC, account_code",
            SELECT_ACCOUNT
        );
        let rows = sqlx::query_as::<_, AccountRow>(&query)
            .bind(company_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        rows.into_iter()
            .map(|r| r.into_domain(self.currency))
            .collect()
    }

    /// Applies a partial update
    ///
    /// Account-type changes are rejected while ledger lines reference the
    /// account; code changes are checked for uniqueness within the company;
    /// parent moves are checked for cycles.
    pub async fn update(
        &self,
        id: AccountId,
        patch: AccountPatch,
    ) -> Result<Account, LedgerError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from_sqlx)?;

        let mut account = load_account(&mut tx, self.currency, id, true).await?;

        if let Some(code) = &patch.code {
            let taken: bool = sqlx::query_scalar(
                "SELECT EXISTS (SELECT 1 FROM accounts \
                 WHERE company_id = $1 AND account_code = $2 AND account_id <> $3)",
            )
            .bind(account.company_id.as_uuid())
            .bind(code)
            .bind(id.as_uuid())
            .fetch_one(&mut *tx)
            .await
            .map_err(DatabaseError::from_sqlx)?;
            if taken {
                return Err(LedgerError::conflict(format!(
                    "Account code {} already exists",
                    code
                )));
            }
            account.code = code.clone();
        }

        if let Some(new_type) = patch.account_type {
            if new_type != account.account_type {
                let has_lines: bool = sqlx::query_scalar(
                    "SELECT EXISTS (SELECT 1 FROM transaction_lines WHERE account_id = $1)",
                )
                .bind(id.as_uuid())
                .fetch_one(&mut *tx)
                .await
                .map_err(DatabaseError::from_sqlx)?;
                if has_lines {
                    return Err(LedgerError::invalid_state(
                        "Cannot change the type of an account with ledger lines",
                    ));
                }
                account.account_type = new_type;
            }
        }

        if let Some(parent_id) = patch.parent_id {
            let parent = load_account(&mut tx, self.currency, parent_id, false).await?;
            if parent.company_id != account.company_id {
                return Err(LedgerError::validation(
                    "Parent account belongs to a different company",
                ));
            }
            // Walk the ancestor chain; the account must not become its own ancestor
            let mut cursor = Some(parent_id);
            while let Some(ancestor_id) = cursor {
                if ancestor_id == id {
                    return Err(LedgerError::validation(
                        "Parent change would create a cycle in the account tree",
                    ));
                }
                cursor = load_account(&mut tx, self.currency, ancestor_id, false)
                    .await?
                    .parent_id;
            }
            account.parent_id = Some(parent_id);
        }

        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(LedgerError::validation("Account name must not be empty"));
            }
            account.name = name;
        }
        if let Some(description) = patch.description {
            account.description = Some(description);
        }
        if let Some(investor) = patch.investor {
            account.investor = Some(investor);
        }

        sqlx::query(
            "UPDATE accounts SET account_code = $2, account_name = $3, account_type = $4, \
             description = $5, investor_name = $6, ownership_percentage = $7, \
             parent_account_id = $8 WHERE account_id = $1",
        )
        .bind(id.as_uuid())
        .bind(&account.code)
        .bind(&account.name)
        .bind(account_type_to_str(account.account_type))
        .bind(&account.description)
        .bind(account.investor.as_ref().map(|s| s.investor_name.clone()))
        .bind(account.investor.as_ref().map(|s| s.ownership_percentage))
        .bind(account.parent_id.map(|p| *p.as_uuid()))
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        tx.commit().await.map_err(DatabaseError::from_sqlx)?;
        Ok(account)
    }

    /// Atomically adds a signed delta to an account's balance
    pub async fn adjust_balance(&self, id: AccountId, delta: Money) -> Result<(), LedgerError> {
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from_sqlx)?;
        apply_balance_delta(&mut conn, id, delta.amount()).await
    }

    /// Soft-deletes an account
    ///
    /// Blocked while ledger lines or child accounts reference it.
    pub async fn soft_delete(&self, id: AccountId) -> Result<(), LedgerError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from_sqlx)?;

        load_account(&mut tx, self.currency, id, true).await?;

        let has_lines: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM transaction_lines WHERE account_id = $1)",
        )
        .bind(id.as_uuid())
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;
        if has_lines {
            return Err(LedgerError::conflict(
                "Account has ledger lines and cannot be deleted",
            ));
        }

        let has_children: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM accounts WHERE parent_account_id = $1)",
        )
        .bind(id.as_uuid())
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;
        if has_children {
            return Err(LedgerError::conflict(
                "Account has child accounts and cannot be deleted",
            ));
        }

        sqlx::query("UPDATE accounts SET is_active = FALSE WHERE account_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        tx.commit().await.map_err(DatabaseError::from_sqlx)?;
        info!(account_id = %id, "Account deactivated");
        Ok(())
    }
}
