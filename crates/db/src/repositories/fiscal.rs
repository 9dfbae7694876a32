//! Fiscal calendar repository.

use chrono::NaiveDate;
use tracing::info;

use tally_core::fiscal::{FiscalError, FiscalService, FiscalYear};
use tally_shared::types::{FiscalPeriodId, FiscalYearId};

use super::Context;
use crate::error::EngineError;
use crate::lock::LockKey;
use crate::store::{ChangeSet, FiscalStore, UnitOfWork};

/// Fiscal year repository.
#[derive(Clone)]
pub struct FiscalRepository {
    ctx: Context,
}

impl FiscalRepository {
    pub(crate) fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    /// Opens a fiscal year split into monthly periods.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` or `OverlappingFiscalYear`.
    pub async fn open_fiscal_year(
        &self,
        name: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FiscalYear, EngineError> {
        let _locks = self.ctx.locks.acquire_all([LockKey::FiscalCalendar]).await;

        let existing = self.ctx.store.list_fiscal_years().await?;
        let mut year = FiscalService::open_fiscal_year(name, start, end, &existing)?;
        let mut changes = ChangeSet::new();
        changes.put(&mut year);
        self.ctx.store.commit(changes).await?;

        info!(
            fiscal_year_id = %year.id,
            start = %year.start_date,
            end = %year.end_date,
            periods = year.periods.len(),
            "fiscal year opened"
        );
        Ok(year)
    }

    /// Closes a period. Posting into it is rejected afterwards.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound`, `PeriodAlreadyClosed` or
    /// `EarlierPeriodsNotClosed`.
    pub async fn close_period(&self, period_id: FiscalPeriodId) -> Result<FiscalYear, EngineError> {
        let _locks = self.ctx.locks.acquire_all([LockKey::FiscalCalendar]).await;

        let mut year = self
            .ctx
            .store
            .list_fiscal_years()
            .await?
            .into_iter()
            .find(|y| y.periods.iter().any(|p| p.id == period_id))
            .ok_or(FiscalError::PeriodNotFound(period_id))?;

        FiscalService::close_period(&mut year, period_id)?;
        let mut changes = ChangeSet::new();
        changes.put(&mut year);
        self.ctx.store.commit(changes).await?;

        info!(fiscal_year_id = %year.id, period_id = %period_id, "fiscal period closed");
        Ok(year)
    }

    /// Fetches a fiscal year.
    pub async fn get_fiscal_year(&self, id: FiscalYearId) -> Result<FiscalYear, EngineError> {
        Ok(self
            .ctx
            .store
            .get_fiscal_year(id)
            .await?
            .ok_or(FiscalError::FiscalYearNotFound(id))?)
    }

    /// Lists fiscal years ordered by start date.
    pub async fn list_fiscal_years(&self) -> Result<Vec<FiscalYear>, EngineError> {
        Ok(self.ctx.store.list_fiscal_years().await?)
    }
}
