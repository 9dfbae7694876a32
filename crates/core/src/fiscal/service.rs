//! Fiscal year creation, period closing and posting checks.

use chrono::{Days, NaiveDate};
use tally_shared::types::{FiscalPeriodId, FiscalYearId};

use super::error::FiscalError;
use super::period::{FiscalPeriod, FiscalPeriodStatus, FiscalYear};
use crate::calendar::end_of_month;

/// Stateless fiscal calendar service.
pub struct FiscalService;

impl FiscalService {
    /// Build a fiscal year with one period per calendar month.
    ///
    /// The first and last periods are clamped to the year bounds, so a year
    /// starting mid-month gets a short first period.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `start > end` and
    /// `OverlappingFiscalYear` if any existing year shares a day.
    pub fn open_fiscal_year(
        name: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        existing: &[FiscalYear],
    ) -> Result<FiscalYear, FiscalError> {
        if start > end {
            return Err(FiscalError::InvalidDateRange { start, end });
        }
        if let Some(clash) = existing.iter().find(|y| y.overlaps(start, end)) {
            return Err(FiscalError::OverlappingFiscalYear(clash.id));
        }

        let id = FiscalYearId::new();
        let mut periods = Vec::new();
        let mut cursor = start;
        let mut number = 1;

        loop {
            let period_end = end_of_month(cursor)
                .ok_or(FiscalError::DateOutOfRange)?
                .min(end);
            periods.push(FiscalPeriod {
                id: FiscalPeriodId::new(),
                fiscal_year_id: id,
                period_number: number,
                name: cursor.format("%Y-%m").to_string(),
                start_date: cursor,
                end_date: period_end,
                status: FiscalPeriodStatus::Open,
            });
            if period_end >= end {
                break;
            }
            cursor = period_end
                .checked_add_days(Days::new(1))
                .ok_or(FiscalError::DateOutOfRange)?;
            number += 1;
        }

        Ok(FiscalYear {
            id,
            name: name.into(),
            start_date: start,
            end_date: end,
            periods,
            version: 0,
        })
    }

    /// Close a period; every earlier period of the year must already be closed.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound`, `PeriodAlreadyClosed` or
    /// `EarlierPeriodsNotClosed`.
    pub fn close_period(
        year: &mut FiscalYear,
        period_id: FiscalPeriodId,
    ) -> Result<(), FiscalError> {
        let position = year
            .periods
            .iter()
            .position(|p| p.id == period_id)
            .ok_or(FiscalError::PeriodNotFound(period_id))?;

        if !year.periods[position].is_open() {
            return Err(FiscalError::PeriodAlreadyClosed(period_id));
        }
        if year.periods[..position].iter().any(FiscalPeriod::is_open) {
            return Err(FiscalError::EarlierPeriodsNotClosed);
        }

        year.periods[position].status = FiscalPeriodStatus::Closed;
        Ok(())
    }

    /// Locate the fiscal year and period containing `date`, if any.
    #[must_use]
    pub fn locate(years: &[FiscalYear], date: NaiveDate) -> Option<(&FiscalYear, &FiscalPeriod)> {
        years
            .iter()
            .filter(|y| y.contains_date(date))
            .find_map(|y| y.period_for(date).map(|p| (y, p)))
    }

    /// Ensure posting on `date` is allowed.
    ///
    /// Dates outside every defined fiscal year are allowed.
    ///
    /// # Errors
    ///
    /// Returns `PeriodClosed` if the containing period is closed.
    pub fn ensure_open_for_posting(
        years: &[FiscalYear],
        date: NaiveDate,
    ) -> Result<(), FiscalError> {
        match Self::locate(years, date) {
            Some((_, period)) if !period.is_open() => Err(FiscalError::PeriodClosed(date)),
            _ => Ok(()),
        }
    }
}
