//! Account DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_ledger::{Account, AccountType};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccountRequest {
    pub company_id: Uuid,
    #[validate(length(min = 1, max = 120))]
    pub account_name: String,
    pub account_type: AccountType,
    #[serde(default)]
    pub opening_balance: Decimal,
    #[serde(default)]
    pub is_contra: bool,
    pub description: Option<String>,
    pub investor_name: Option<String>,
    pub ownership_percentage: Option<Decimal>,
    pub parent_account_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAccountRequest {
    #[validate(length(min = 1, max = 120))]
    pub account_name: Option<String>,
    #[validate(length(min = 2, max = 12))]
    pub account_code: Option<String>,
    pub account_type: Option<AccountType>,
    pub description: Option<String>,
    pub investor_name: Option<String>,
    pub ownership_percentage: Option<Decimal>,
    pub parent_account_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CompanyQuery {
    pub company_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub account_id: Uuid,
    pub company_id: Uuid,
    pub account_code: String,
    pub account_name: String,
    pub account_type: AccountType,
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

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        let (investor_name, ownership_percentage) = match account.investor {
            Some(stake) => (Some(stake.investor_name), Some(stake.ownership_percentage)),
            None => (None, None),
        };

        Self {
            account_id: *account.id.as_uuid(),
            company_id: *account.company_id.as_uuid(),
            account_code: account.code,
            account_name: account.name,
            account_type: account.account_type,
            is_contra: account.is_contra,
            is_active: account.is_active,
            opening_balance: account.opening_balance.amount(),
            current_balance: account.current_balance.amount(),
            description: account.description,
            investor_name,
            ownership_percentage,
            parent_account_id: account.parent_id.map(|p| *p.as_uuid()),
            created_at: account.created_at,
        }
    }
}
