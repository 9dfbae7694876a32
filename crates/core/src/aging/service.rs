//! Aging bucket aggregation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::types::{AgingBucket, AgingBuckets, AgingReport, CounterpartyAging};
use crate::document::{Counterparty, DocumentHeader, DocumentKind, DocumentPaymentStatus};

/// One document as seen by the aging report.
#[derive(Debug, Clone, Copy)]
pub struct AgingItem<'a> {
    /// Vendor or customer.
    pub counterparty: Counterparty,
    /// Counterparty display name.
    pub name: &'a str,
    /// Document amounts and dates.
    pub header: &'a DocumentHeader,
}

/// Stateless aging service.
pub struct AgingService;

impl AgingService {
    /// Whole days between the due date and the aging date.
    #[must_use]
    pub fn days_overdue(as_of: NaiveDate, due_date: NaiveDate) -> i64 {
        (as_of - due_date).num_days()
    }

    /// Bucket a document's outstanding amount, per counterparty and overall.
    ///
    /// PAID and VOIDED documents are skipped.
    #[must_use]
    pub fn build_report<'a, I>(kind: DocumentKind, as_of: NaiveDate, items: I) -> AgingReport
    where
        I: IntoIterator<Item = AgingItem<'a>>,
    {
        let mut buckets = AgingBuckets::default();
        let mut by_counterparty: BTreeMap<Counterparty, CounterpartyAging> = BTreeMap::new();

        for item in items {
            if matches!(
                item.header.payment_status,
                DocumentPaymentStatus::Paid | DocumentPaymentStatus::Voided
            ) {
                continue;
            }

            let days = Self::days_overdue(as_of, item.header.due_date);
            let bucket = AgingBucket::for_days_overdue(days);
            let outstanding = item.header.outstanding();
            buckets.add(bucket, outstanding);

            let row = by_counterparty
                .entry(item.counterparty)
                .or_insert_with(|| CounterpartyAging {
                    counterparty: item.counterparty,
                    name: item.name.to_string(),
                    buckets: AgingBuckets::default(),
                    total: Decimal::ZERO,
                    document_count: 0,
                });
            row.buckets.add(bucket, outstanding);
            row.total += outstanding;
            row.document_count += 1;
        }

        let mut rows: Vec<CounterpartyAging> = by_counterparty.into_values().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.counterparty.cmp(&b.counterparty)));

        AgingReport {
            kind,
            as_of,
            total: buckets.total(),
            buckets,
            by_counterparty: rows,
        }
    }
}
