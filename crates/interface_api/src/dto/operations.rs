//! Transaction-strategy DTOs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use domain_ledger::Side;

use crate::dto::validate_positive;

#[derive(Debug, Deserialize, Validate)]
pub struct SimpleEntryRequest {
    pub company_id: Uuid,
    pub transaction_date: NaiveDate,
    pub account_id: Uuid,
    pub direction: Side,
    #[validate(custom(function = "validate_positive"))]
    pub amount: Decimal,
    #[validate(length(min = 1, max = 500))]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LiabilityRequest {
    pub company_id: Uuid,
    pub transaction_date: NaiveDate,
    #[validate(length(min = 1, max = 120))]
    pub liability_name: String,
    /// Free text, normalized through the alias table (e.g. "tractor")
    #[validate(length(min = 1, max = 60))]
    pub liability_type: String,
    #[validate(custom(function = "validate_positive"))]
    pub amount: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TransferRequest {
    pub company_id: Uuid,
    pub transaction_date: NaiveDate,
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    #[validate(custom(function = "validate_positive"))]
    pub amount: Decimal,
    #[validate(length(min = 1, max = 500))]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct InvestmentRequest {
    pub company_id: Uuid,
    pub transaction_date: NaiveDate,
    pub target_asset_id: Uuid,
    #[validate(length(min = 1, max = 120))]
    pub investor_name: String,
    #[validate(custom(function = "validate_positive"))]
    pub ownership_percentage: Decimal,
    #[validate(custom(function = "validate_positive"))]
    pub amount: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct InvestorExitRequest {
    pub company_id: Uuid,
    pub transaction_date: NaiveDate,
    pub equity_account_id: Uuid,
    pub asset_account_id: Uuid,
    #[validate(custom(function = "validate_positive"))]
    pub buyout_amount: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProfitDistributionRequest {
    pub company_id: Uuid,
    pub transaction_date: NaiveDate,
    #[validate(custom(function = "validate_positive"))]
    pub total_profit: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AssetProtectionRequest {
    pub company_id: Uuid,
    pub transaction_date: NaiveDate,
    pub asset_account_id: Uuid,
    #[validate(custom(function = "validate_positive"))]
    pub protection_amount: Decimal,
}
