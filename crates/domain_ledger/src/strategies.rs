//! Transaction-type strategies
//!
//! Higher-level operations that compute the balanced legs for a posting:
//! liability creation, micro-transfers, investor buy-ins and exits, profit
//! distribution, and asset protection. Each strategy builds a
//! [`StrategyPlan`] from account snapshots; the engine executes the plan as
//! one posting.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use core_kernel::{AccountId, CompanyId, Currency, Money};

use crate::account::{Account, AccountType, NewAccount};
use crate::entry::{EntryDraft, EntryLine, LedgerEntry, Side, TransactionKind};
use crate::error::LedgerError;
use crate::ledger::Ledger;

/// Name of the asset account used as the contra side of single-leg entries
pub const CONTROL_ACCOUNT_NAME: &str = "Suspense Control";

/// Name of the equity account absorbing exit differences and distributions
pub const RETAINED_EARNINGS_NAME: &str = "Retained Earnings";

/// Where a planned leg posts: an existing account, or one the plan creates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegTarget {
    Existing(AccountId),
    /// Index into [`StrategyPlan::new_accounts`]
    Created(usize),
}

/// One leg of a planned posting
#[derive(Debug, Clone)]
pub struct PlannedLeg {
    pub target: LegTarget,
    pub side: Side,
    pub amount: Money,
    pub description: Option<String>,
}

impl PlannedLeg {
    fn new(target: LegTarget, side: Side, amount: Money) -> Self {
        Self {
            target,
            side,
            amount,
            description: None,
        }
    }

    fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A fully computed strategy outcome, ready for atomic execution
///
/// Accounts in `new_accounts` are created first; legs may reference them by
/// index. Accounts in `deactivate` are retired after the entry posts.
#[derive(Debug, Clone)]
pub struct StrategyPlan {
    pub company_id: CompanyId,
    pub kind: TransactionKind,
    pub description: String,
    pub external_source: Option<String>,
    pub new_accounts: Vec<NewAccount>,
    pub legs: Vec<PlannedLeg>,
    pub deactivate: Vec<AccountId>,
}

impl StrategyPlan {
    fn new(company_id: CompanyId, kind: TransactionKind, description: impl Into<String>) -> Self {
        Self {
            company_id,
            kind,
            description: description.into(),
            external_source: None,
            new_accounts: Vec::new(),
            legs: Vec::new(),
            deactivate: Vec::new(),
        }
    }

    /// Resolves the plan's legs into a postable draft
    ///
    /// `created` holds the IDs of the accounts from `new_accounts`, in the
    /// same order, after the executor has created them.
    pub fn build_draft(
        &self,
        date: NaiveDate,
        created: &[AccountId],
    ) -> Result<EntryDraft, LedgerError> {
        let mut draft = EntryDraft::new(self.company_id, date, self.kind, self.description.clone());
        draft.external_source = self.external_source.clone();

        for leg in &self.legs {
            let account_id = match leg.target {
                LegTarget::Existing(id) => id,
                LegTarget::Created(index) => *created.get(index).ok_or_else(|| {
                    LedgerError::validation(
                        "Plan leg references an account the plan never created",
                    )
                })?,
            };
            let mut line = match leg.side {
                Side::Debit => EntryLine::debit(account_id, leg.amount),
                Side::Credit => EntryLine::credit(account_id, leg.amount),
            };
            line.description = leg.description.clone();
            draft.lines.push(line);
        }

        Ok(draft)
    }
}

/// Normalizes a free-text liability kind to a canonical category
pub fn normalize_liability_kind(raw: &str) -> &'static str {
    match raw.trim().to_lowercase().as_str() {
        "equipment" | "tractor" | "harvester" | "machinery" | "machine" => "equipment",
        "vehicle" | "truck" | "car" | "van" | "trailer" => "vehicle",
        "loan" | "bank loan" | "note" | "promissory note" => "loan",
        "mortgage" | "property loan" => "mortgage",
        "credit line" | "line of credit" | "credit" => "credit line",
        _ => "other",
    }
}

/// Asset account name paired with each liability kind
pub fn asset_name_for_kind(kind: &str) -> &'static str {
    match kind {
        "equipment" => "Equipment",
        "vehicle" => "Vehicles",
        "loan" => "Loan Proceeds",
        "mortgage" => "Property",
        "credit line" => "Credit Line Proceeds",
        _ => "Financed Assets",
    }
}

/// Transfer pairs the micro-transaction strategy accepts, as (from, to)
const ALLOWED_TRANSFERS: &[(AccountType, AccountType)] = &[
    (AccountType::Asset, AccountType::Asset),
    (AccountType::Asset, AccountType::Expense),
    (AccountType::Asset, AccountType::Liability),
    (AccountType::Liability, AccountType::Asset),
    (AccountType::Equity, AccountType::Asset),
    (AccountType::Revenue, AccountType::Asset),
];

/// Returns true when a transfer between the two account types is allowed
pub fn transfer_allowed(from: AccountType, to: AccountType) -> bool {
    ALLOWED_TRANSFERS.contains(&(from, to))
}

fn require_positive(amount: Money, what: &str) -> Result<(), LedgerError> {
    if !amount.is_positive() {
        return Err(LedgerError::validation(format!(
            "{} must be positive, got {}",
            what, amount
        )));
    }
    Ok(())
}

/// Plans a single-account entry routed through the control account
///
/// The legacy single-leg shortcut becomes real double-entry: the named
/// control account takes the opposite side of the same amount.
pub fn plan_simple_entry(
    account: &Account,
    control: &Account,
    side: Side,
    amount: Money,
    description: &str,
) -> Result<StrategyPlan, LedgerError> {
    require_positive(amount, "Entry amount")?;
    if account.id == control.id {
        return Err(LedgerError::validation(
            "Cannot post a simple entry against the control account itself",
        ));
    }

    let mut plan = StrategyPlan::new(account.company_id, TransactionKind::General, description);
    plan.legs.push(PlannedLeg::new(
        LegTarget::Existing(account.id),
        side,
        amount,
    ));
    plan.legs.push(
        PlannedLeg::new(LegTarget::Existing(control.id), side.opposite(), amount)
            .describe("Control contra leg"),
    );
    Ok(plan)
}

/// Plans a liability creation: debit the paired asset, credit the liability
///
/// Reuses the named liability and asset accounts when they already exist,
/// otherwise schedules their creation. The free-text kind is normalized
/// through the alias table first.
#[allow(clippy::too_many_arguments)]
pub fn plan_liability(
    company_id: CompanyId,
    currency: Currency,
    liability_account: Option<&Account>,
    asset_account: Option<&Account>,
    liability_name: &str,
    raw_kind: &str,
    amount: Money,
    description: Option<&str>,
) -> Result<StrategyPlan, LedgerError> {
    require_positive(amount, "Liability amount")?;
    if liability_name.trim().is_empty() {
        return Err(LedgerError::validation("Liability name must not be empty"));
    }

    let kind = normalize_liability_kind(raw_kind);
    let description = description
        .map(str::to_owned)
        .unwrap_or_else(|| format!("New {} liability: {}", kind, liability_name));

    let mut plan = StrategyPlan::new(company_id, TransactionKind::Liability, description);

    let liability_target = match liability_account {
        Some(account) => {
            if account.account_type != AccountType::Liability {
                return Err(LedgerError::validation(format!(
                    "Account {} is not a liability account",
                    account.code
                )));
            }
            LegTarget::Existing(account.id)
        }
        None => {
            plan.new_accounts.push(
                NewAccount::new(
                    company_id,
                    liability_name,
                    AccountType::Liability,
                    Money::zero(currency),
                )
                .with_description(format!("{} liability", kind)),
            );
            LegTarget::Created(plan.new_accounts.len() - 1)
        }
    };

    let asset_target = match asset_account {
        Some(account) => LegTarget::Existing(account.id),
        None => {
            plan.new_accounts.push(NewAccount::new(
                company_id,
                asset_name_for_kind(kind),
                AccountType::Asset,
                Money::zero(currency),
            ));
            LegTarget::Created(plan.new_accounts.len() - 1)
        }
    };

    plan.legs
        .push(PlannedLeg::new(asset_target, Side::Debit, amount));
    plan.legs
        .push(PlannedLeg::new(liability_target, Side::Credit, amount));
    Ok(plan)
}

/// Plans a micro-transfer between two existing accounts
///
/// Direction is uniform over the whitelist: debit the destination, credit
/// the source. Pairs outside the table are rejected.
pub fn plan_transfer(
    from: &Account,
    to: &Account,
    amount: Money,
    description: &str,
) -> Result<StrategyPlan, LedgerError> {
    require_positive(amount, "Transfer amount")?;
    if from.id == to.id {
        return Err(LedgerError::validation(
            "Transfer source and destination must differ",
        ));
    }
    if from.company_id != to.company_id {
        return Err(LedgerError::validation(
            "Transfer accounts belong to different companies",
        ));
    }
    if !transfer_allowed(from.account_type, to.account_type) {
        return Err(LedgerError::validation(format!(
            "Transfer from {} to {} is not allowed",
            from.account_type, to.account_type
        )));
    }

    let mut plan = StrategyPlan::new(from.company_id, TransactionKind::Transfer, description);
    plan.legs
        .push(PlannedLeg::new(LegTarget::Existing(to.id), Side::Debit, amount));
    plan.legs
        .push(PlannedLeg::new(LegTarget::Existing(from.id), Side::Credit, amount));
    Ok(plan)
}

/// Plans an external investment: new investor equity against a company asset
pub fn plan_external_investment(
    target_asset: &Account,
    investor_name: &str,
    ownership_percentage: Decimal,
    amount: Money,
) -> Result<StrategyPlan, LedgerError> {
    require_positive(amount, "Investment amount")?;
    if investor_name.trim().is_empty() {
        return Err(LedgerError::validation("Investor name must not be empty"));
    }
    if ownership_percentage <= Decimal::ZERO || ownership_percentage > Decimal::ONE_HUNDRED {
        return Err(LedgerError::validation(format!(
            "Ownership percentage must be in (0, 100], got {}",
            ownership_percentage
        )));
    }
    if target_asset.account_type != AccountType::Asset {
        return Err(LedgerError::validation(format!(
            "Investment target {} is not an asset account",
            target_asset.code
        )));
    }

    let mut plan = StrategyPlan::new(
        target_asset.company_id,
        TransactionKind::Investment,
        format!("External investment from {}", investor_name),
    );
    plan.external_source = Some(investor_name.to_string());
    plan.new_accounts.push(
        NewAccount::new(
            target_asset.company_id,
            format!("{} Equity", investor_name),
            AccountType::Equity,
            Money::zero(amount.currency()),
        )
        .with_investor(investor_name, ownership_percentage),
    );
    plan.legs.push(PlannedLeg::new(
        LegTarget::Existing(target_asset.id),
        Side::Debit,
        amount,
    ));
    plan.legs
        .push(PlannedLeg::new(LegTarget::Created(0), Side::Credit, amount));
    Ok(plan)
}

/// Plans an investor exit: zero the stake, pay the buyout, retire the account
///
/// The stake rarely equals the buyout; the difference posts to retained
/// earnings so the entry stays balanced.
pub fn plan_investor_exit(
    equity: &Account,
    asset: &Account,
    retained: &Account,
    buyout: Money,
) -> Result<StrategyPlan, LedgerError> {
    require_positive(buyout, "Buyout amount")?;
    let stake = match &equity.investor {
        Some(stake) if equity.account_type == AccountType::Equity => stake,
        _ => {
            return Err(LedgerError::validation(format!(
                "Account {} is not an investor equity account",
                equity.code
            )))
        }
    };
    if !equity.current_balance.is_positive() {
        return Err(LedgerError::conflict(format!(
            "Investor account {} is already at zero",
            equity.code
        )));
    }
    if asset.account_type != AccountType::Asset {
        return Err(LedgerError::validation(format!(
            "Buyout source {} is not an asset account",
            asset.code
        )));
    }

    let balance = equity.current_balance;
    let mut plan = StrategyPlan::new(
        equity.company_id,
        TransactionKind::InvestorExit,
        format!("Investor exit: {}", stake.investor_name),
    );
    plan.external_source = Some(stake.investor_name.clone());

    plan.legs.push(
        PlannedLeg::new(LegTarget::Existing(equity.id), Side::Debit, balance)
            .describe("Retire investor stake"),
    );
    plan.legs.push(
        PlannedLeg::new(LegTarget::Existing(asset.id), Side::Credit, buyout)
            .describe("Buyout payment"),
    );

    let difference = balance.checked_sub(&buyout)?;
    if difference.is_positive() {
        plan.legs.push(
            PlannedLeg::new(LegTarget::Existing(retained.id), Side::Credit, difference)
                .describe("Exit settlement gain"),
        );
    } else if difference.is_negative() {
        plan.legs.push(
            PlannedLeg::new(LegTarget::Existing(retained.id), Side::Debit, difference.abs())
                .describe("Exit settlement loss"),
        );
    }

    plan.deactivate.push(equity.id);
    Ok(plan)
}

/// Plans a profit distribution across all investor equity accounts
///
/// Shares are allocated proportionally to the ownership percentages, with
/// the last share absorbing the rounding remainder, so the distributions
/// always sum exactly to the stated profit. Retained earnings take the
/// balancing debit.
pub fn plan_profit_distribution(
    investors: &[Account],
    retained: &Account,
    total: Money,
) -> Result<StrategyPlan, LedgerError> {
    require_positive(total, "Profit amount")?;
    if investors.is_empty() {
        return Err(LedgerError::validation(
            "No investor equity accounts to distribute to",
        ));
    }

    let percentages: Vec<Decimal> = investors
        .iter()
        .map(|a| {
            a.investor
                .as_ref()
                .map(|s| s.ownership_percentage)
                .unwrap_or(Decimal::ZERO)
        })
        .collect();
    let total_percentage: Decimal = percentages.iter().sum();
    if total_percentage > Decimal::ONE_HUNDRED {
        return Err(LedgerError::validation(format!(
            "Ownership percentages sum to {}, which exceeds 100",
            total_percentage
        )));
    }

    let shares = total.allocate_by_ratios(&percentages)?;

    let mut plan = StrategyPlan::new(
        retained.company_id,
        TransactionKind::ProfitDistribution,
        format!("Profit distribution of {}", total),
    );
    plan.legs.push(
        PlannedLeg::new(LegTarget::Existing(retained.id), Side::Debit, total)
            .describe("Distributed profit"),
    );
    for (investor, share) in investors.iter().zip(shares) {
        if share.is_zero() {
            continue;
        }
        plan.legs.push(
            PlannedLeg::new(LegTarget::Existing(investor.id), Side::Credit, share)
                .describe("Profit share"),
        );
    }
    Ok(plan)
}

/// Plans an asset protection draw-down across investor equity
///
/// Each investor account is debited in proportion to its share of total
/// current investor equity — not ownership percentage — and the protected
/// asset account is credited by the full amount.
pub fn plan_asset_protection(
    investors: &[Account],
    asset: &Account,
    amount: Money,
) -> Result<StrategyPlan, LedgerError> {
    require_positive(amount, "Protection amount")?;
    if asset.account_type != AccountType::Asset {
        return Err(LedgerError::validation(format!(
            "Protected account {} is not an asset account",
            asset.code
        )));
    }

    let funded: Vec<&Account> = investors
        .iter()
        .filter(|a| a.current_balance.is_positive())
        .collect();
    if funded.is_empty() {
        return Err(LedgerError::validation(
            "No investor equity balances to draw from",
        ));
    }

    let balances: Vec<Decimal> = funded.iter().map(|a| a.current_balance.amount()).collect();
    let shares = amount.allocate_by_ratios(&balances)?;

    let mut plan = StrategyPlan::new(
        asset.company_id,
        TransactionKind::AssetProtection,
        format!("Asset protection of {}", amount),
    );
    for (investor, share) in funded.iter().zip(shares) {
        if share.is_zero() {
            continue;
        }
        plan.legs.push(
            PlannedLeg::new(LegTarget::Existing(investor.id), Side::Debit, share)
                .describe("Protection contribution"),
        );
    }
    plan.legs.push(
        PlannedLeg::new(LegTarget::Existing(asset.id), Side::Credit, amount)
            .describe("Protected asset"),
    );
    Ok(plan)
}

impl Ledger {
    /// Executes a strategy plan: create accounts, post the entry, retire stakes
    pub fn execute_plan(
        &mut self,
        date: NaiveDate,
        plan: StrategyPlan,
    ) -> Result<LedgerEntry, LedgerError> {
        let mut created: Vec<AccountId> = Vec::with_capacity(plan.new_accounts.len());
        for spec in &plan.new_accounts {
            created.push(self.create_account(spec.clone())?.id);
        }

        let draft = plan.build_draft(date, &created)?;
        let entry = self.post_entry(draft)?;

        for id in &plan.deactivate {
            self.retire_account(*id)?;
        }

        Ok(entry)
    }

    /// Finds or creates the company's control account for single-leg entries
    pub fn ensure_control_account(&mut self, company_id: CompanyId) -> Result<Account, LedgerError> {
        if let Some(account) =
            self.find_account_by_name(company_id, AccountType::Asset, CONTROL_ACCOUNT_NAME)
        {
            return Ok(account.clone());
        }
        self.create_account(
            NewAccount::new(
                company_id,
                CONTROL_ACCOUNT_NAME,
                AccountType::Asset,
                Money::zero(self.currency()),
            )
            .with_description("Contra side for single-leg entries"),
        )
    }

    /// Finds or creates the company's retained earnings account
    pub fn ensure_retained_earnings(
        &mut self,
        company_id: CompanyId,
    ) -> Result<Account, LedgerError> {
        if let Some(account) =
            self.find_account_by_name(company_id, AccountType::Equity, RETAINED_EARNINGS_NAME)
        {
            return Ok(account.clone());
        }
        self.create_account(NewAccount::new(
            company_id,
            RETAINED_EARNINGS_NAME,
            AccountType::Equity,
            Money::zero(self.currency()),
        ))
    }

    /// Posts a single-account entry, balanced against the control account
    pub fn record_simple_entry(
        &mut self,
        company_id: CompanyId,
        date: NaiveDate,
        account_id: AccountId,
        side: Side,
        amount: Money,
        description: &str,
    ) -> Result<LedgerEntry, LedgerError> {
        let account = self.active_account(account_id)?.clone();
        let control = self.ensure_control_account(company_id)?;
        let plan = plan_simple_entry(&account, &control, side, amount, description)?;
        self.execute_plan(date, plan)
    }

    /// Records a new liability with its paired asset
    pub fn record_liability(
        &mut self,
        company_id: CompanyId,
        date: NaiveDate,
        liability_name: &str,
        raw_kind: &str,
        amount: Money,
        description: Option<&str>,
    ) -> Result<LedgerEntry, LedgerError> {
        let liability = self
            .find_account_by_name(company_id, AccountType::Liability, liability_name)
            .cloned();
        let kind = normalize_liability_kind(raw_kind);
        let asset = self
            .find_account_by_name(company_id, AccountType::Asset, asset_name_for_kind(kind))
            .cloned();
        let plan = plan_liability(
            company_id,
            self.currency(),
            liability.as_ref(),
            asset.as_ref(),
            liability_name,
            raw_kind,
            amount,
            description,
        )?;
        self.execute_plan(date, plan)
    }

    /// Transfers between two accounts when the type pair is whitelisted
    pub fn transfer(
        &mut self,
        company_id: CompanyId,
        date: NaiveDate,
        from: AccountId,
        to: AccountId,
        amount: Money,
        description: &str,
    ) -> Result<LedgerEntry, LedgerError> {
        let from = self.active_account(from)?.clone();
        let to = self.active_account(to)?.clone();
        if from.company_id != company_id {
            return Err(LedgerError::validation(
                "Source account belongs to a different company",
            ));
        }
        let plan = plan_transfer(&from, &to, amount, description)?;
        self.execute_plan(date, plan)
    }

    /// Records an external investor buy-in
    pub fn record_external_investment(
        &mut self,
        company_id: CompanyId,
        date: NaiveDate,
        target_asset: AccountId,
        investor_name: &str,
        ownership_percentage: Decimal,
        amount: Money,
    ) -> Result<LedgerEntry, LedgerError> {
        let asset = self.active_account(target_asset)?.clone();
        if asset.company_id != company_id {
            return Err(LedgerError::validation(
                "Target asset belongs to a different company",
            ));
        }
        let plan = plan_external_investment(&asset, investor_name, ownership_percentage, amount)?;
        self.execute_plan(date, plan)
    }

    /// Buys out an investor and retires their equity account
    pub fn investor_exit(
        &mut self,
        company_id: CompanyId,
        date: NaiveDate,
        equity: AccountId,
        asset: AccountId,
        buyout: Money,
    ) -> Result<LedgerEntry, LedgerError> {
        let equity = self.active_account(equity)?.clone();
        let asset = self.active_account(asset)?.clone();
        if equity.company_id != company_id {
            return Err(LedgerError::validation(
                "Equity account belongs to a different company",
            ));
        }
        let retained = self.ensure_retained_earnings(company_id)?;
        let plan = plan_investor_exit(&equity, &asset, &retained, buyout)?;
        self.execute_plan(date, plan)
    }

    /// Distributes a profit amount across all investor equity accounts
    pub fn distribute_profit(
        &mut self,
        company_id: CompanyId,
        date: NaiveDate,
        total: Money,
    ) -> Result<LedgerEntry, LedgerError> {
        let investors: Vec<Account> = self
            .investor_equity_accounts(company_id)
            .into_iter()
            .cloned()
            .collect();
        let retained = self.ensure_retained_earnings(company_id)?;
        let plan = plan_profit_distribution(&investors, &retained, total)?;
        self.execute_plan(date, plan)
    }

    /// Draws down investor equity proportionally to shield a company asset
    pub fn protect_assets(
        &mut self,
        company_id: CompanyId,
        date: NaiveDate,
        asset: AccountId,
        amount: Money,
    ) -> Result<LedgerEntry, LedgerError> {
        let asset = self.active_account(asset)?.clone();
        if asset.company_id != company_id {
            return Err(LedgerError::validation(
                "Protected asset belongs to a different company",
            ));
        }
        let investors: Vec<Account> = self
            .investor_equity_accounts(company_id)
            .into_iter()
            .cloned()
            .collect();
        let plan = plan_asset_protection(&investors, &asset, amount)?;
        self.execute_plan(date, plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_liability_kind_aliases() {
        assert_eq!(normalize_liability_kind("tractor"), "equipment");
        assert_eq!(normalize_liability_kind("  Harvester "), "equipment");
        assert_eq!(normalize_liability_kind("TRUCK"), "vehicle");
        assert_eq!(normalize_liability_kind("bank loan"), "loan");
        assert_eq!(normalize_liability_kind("line of credit"), "credit line");
        assert_eq!(normalize_liability_kind("something else"), "other");
    }

    #[test]
    fn test_transfer_whitelist() {
        assert!(transfer_allowed(AccountType::Asset, AccountType::Expense));
        assert!(transfer_allowed(AccountType::Asset, AccountType::Asset));
        assert!(transfer_allowed(AccountType::Liability, AccountType::Asset));
        assert!(!transfer_allowed(AccountType::Expense, AccountType::Revenue));
        assert!(!transfer_allowed(AccountType::Revenue, AccountType::Expense));
        assert!(!transfer_allowed(AccountType::Expense, AccountType::Asset));
    }

    #[test]
    fn test_profit_distribution_plan_balances() {
        use chrono::Utc;
        use core_kernel::CompanyId;

        let company = CompanyId::new();
        let usd = |d| Money::new(d, Currency::USD);
        let investor = |name: &str, pct, balance| Account {
            id: AccountId::new(),
            company_id: company,
            code: "E001".to_string(),
            name: format!("{} Equity", name),
            account_type: AccountType::Equity,
            is_contra: false,
            is_active: true,
            opening_balance: usd(dec!(0)),
            current_balance: usd(balance),
            description: None,
            investor: Some(crate::account::InvestorStake {
                investor_name: name.to_string(),
                ownership_percentage: pct,
            }),
            parent_id: None,
            created_at: Utc::now(),
        };

        let investors = vec![
            investor("A", dec!(60), dec!(0)),
            investor("B", dec!(40), dec!(0)),
        ];
        let mut retained = investor("RE", dec!(1), dec!(0));
        retained.investor = None;

        let plan = plan_profit_distribution(&investors, &retained, usd(dec!(1000))).unwrap();

        let debits: Decimal = plan
            .legs
            .iter()
            .filter(|l| l.side == Side::Debit)
            .map(|l| l.amount.amount())
            .sum();
        let credits: Decimal = plan
            .legs
            .iter()
            .filter(|l| l.side == Side::Credit)
            .map(|l| l.amount.amount())
            .sum();
        assert_eq!(debits, credits);
        assert_eq!(credits, dec!(1000));
    }

    #[test]
    fn test_profit_distribution_rejects_over_100_percent() {
        use chrono::Utc;
        use core_kernel::CompanyId;

        let company = CompanyId::new();
        let usd = |d| Money::new(d, Currency::USD);
        let account = Account {
            id: AccountId::new(),
            company_id: company,
            code: "E001".to_string(),
            name: "A Equity".to_string(),
            account_type: AccountType::Equity,
            is_contra: false,
            is_active: true,
            opening_balance: usd(dec!(0)),
            current_balance: usd(dec!(0)),
            description: None,
            investor: Some(crate::account::InvestorStake {
                investor_name: "A".to_string(),
                ownership_percentage: dec!(101),
            }),
            parent_id: None,
            created_at: Utc::now(),
        };
        let mut retained = account.clone();
        retained.investor = None;

        let result = plan_profit_distribution(&[account], &retained, usd(dec!(1000)));
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }
}
