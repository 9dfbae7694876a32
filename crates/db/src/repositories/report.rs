//! Read-side reports. Nothing here writes to the store.

use std::collections::HashMap;

use chrono::NaiveDate;

use tally_core::aging::{AgingItem, AgingReport, AgingService};
use tally_core::budget::{BudgetLine, BudgetService, BudgetVsActualReport};
use tally_core::document::{Counterparty, DocumentKind};
use tally_core::fund::{Fund, FundReconciliation, FundService};
use tally_core::reports::{IncomeStatementReport, ReportService, TrialBalanceReport};

use super::Context;
use crate::error::EngineError;
use crate::store::{AccountStore, CounterpartyStore, DocumentStore, FundStore, TransactionStore};

/// Report repository.
#[derive(Clone)]
pub struct ReportRepository {
    ctx: Context,
}

impl ReportRepository {
    pub(crate) fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    /// Payables (bills) or receivables (invoices) aging as of a date.
    pub async fn aging_report(
        &self,
        kind: DocumentKind,
        as_of: NaiveDate,
    ) -> Result<AgingReport, EngineError> {
        let report = match kind {
            DocumentKind::Payable => {
                let names: HashMap<_, String> = self
                    .ctx
                    .store
                    .list_vendors()
                    .await?
                    .into_iter()
                    .map(|v| (v.id, v.name))
                    .collect();
                let bills = self.ctx.store.list_bills().await?;
                AgingService::build_report(
                    kind,
                    as_of,
                    bills.iter().map(|b| AgingItem {
                        counterparty: Counterparty::Vendor(b.vendor_id),
                        name: names.get(&b.vendor_id).map_or("", String::as_str),
                        header: &b.header,
                    }),
                )
            }
            DocumentKind::Receivable => {
                let names: HashMap<_, String> = self
                    .ctx
                    .store
                    .list_customers()
                    .await?
                    .into_iter()
                    .map(|c| (c.id, c.name))
                    .collect();
                let invoices = self.ctx.store.list_invoices().await?;
                AgingService::build_report(
                    kind,
                    as_of,
                    invoices.iter().map(|i| AgingItem {
                        counterparty: Counterparty::Customer(i.customer_id),
                        name: names.get(&i.customer_id).map_or("", String::as_str),
                        header: &i.header,
                    }),
                )
            }
        };
        Ok(report)
    }

    /// Budget versus posted actuals over `[from, to]`.
    pub async fn budget_vs_actual(
        &self,
        lines: &[BudgetLine],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<BudgetVsActualReport, EngineError> {
        let accounts = self.ctx.store.list_accounts().await?;
        let transactions = self.ctx.store.list_transactions().await?;
        Ok(BudgetService::budget_vs_actual(
            lines,
            &accounts,
            &transactions,
            from,
            to,
        )?)
    }

    /// Trial balance over posted activity up to `as_of`.
    pub async fn trial_balance(&self, as_of: NaiveDate) -> Result<TrialBalanceReport, EngineError> {
        let accounts = self.ctx.store.list_accounts().await?;
        let transactions = self.ctx.store.list_transactions().await?;
        Ok(ReportService::trial_balance(&accounts, &transactions, as_of))
    }

    /// Revenue and expenses over `[from, to]`.
    pub async fn income_statement(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<IncomeStatementReport, EngineError> {
        let accounts = self.ctx.store.list_accounts().await?;
        let transactions = self.ctx.store.list_transactions().await?;
        Ok(ReportService::income_statement(
            &accounts,
            &transactions,
            from,
            to,
        )?)
    }

    /// Every fund's stored balance beside its balance recomputed as of a date.
    pub async fn fund_balances(
        &self,
        as_of: NaiveDate,
    ) -> Result<Vec<(Fund, FundReconciliation)>, EngineError> {
        let funds = self.ctx.store.list_funds().await?;
        let transactions = self.ctx.store.list_transactions().await?;
        Ok(funds
            .into_iter()
            .map(|fund| {
                let computed = FundService::compute_balance(fund.id, &transactions, as_of);
                let reconciliation = FundService::reconcile(&fund, computed, as_of);
                (fund, reconciliation)
            })
            .collect())
    }
}
