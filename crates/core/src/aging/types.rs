//! Aging report types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::document::{Counterparty, DocumentKind};

/// Days-past-due bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgingBucket {
    /// Not yet past due.
    #[serde(rename = "current")]
    Current,
    /// 1 to 30 days past due.
    #[serde(rename = "1-30")]
    Days1To30,
    /// 31 to 60 days past due.
    #[serde(rename = "31-60")]
    Days31To60,
    /// 61 to 90 days past due.
    #[serde(rename = "61-90")]
    Days61To90,
    /// More than 90 days past due.
    #[serde(rename = "90Plus")]
    Days90Plus,
}

impl AgingBucket {
    /// Bucket for a number of days past due. Upper edges are inclusive.
    #[must_use]
    pub const fn for_days_overdue(days: i64) -> Self {
        match days {
            i64::MIN..=0 => Self::Current,
            1..=30 => Self::Days1To30,
            31..=60 => Self::Days31To60,
            61..=90 => Self::Days61To90,
            _ => Self::Days90Plus,
        }
    }
}

/// Outstanding amounts per bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingBuckets {
    /// Not yet due.
    pub current: Decimal,
    /// 1-30 days.
    #[serde(rename = "1-30")]
    pub days_1_30: Decimal,
    /// 31-60 days.
    #[serde(rename = "31-60")]
    pub days_31_60: Decimal,
    /// 61-90 days.
    #[serde(rename = "61-90")]
    pub days_61_90: Decimal,
    /// Over 90 days.
    #[serde(rename = "90Plus")]
    pub days_90_plus: Decimal,
}

impl AgingBuckets {
    /// Adds an amount to a bucket.
    pub fn add(&mut self, bucket: AgingBucket, amount: Decimal) {
        let slot = match bucket {
            AgingBucket::Current => &mut self.current,
            AgingBucket::Days1To30 => &mut self.days_1_30,
            AgingBucket::Days31To60 => &mut self.days_31_60,
            AgingBucket::Days61To90 => &mut self.days_61_90,
            AgingBucket::Days90Plus => &mut self.days_90_plus,
        };
        *slot += amount;
    }

    /// Returns the amount in a bucket.
    #[must_use]
    pub const fn get(&self, bucket: AgingBucket) -> Decimal {
        match bucket {
            AgingBucket::Current => self.current,
            AgingBucket::Days1To30 => self.days_1_30,
            AgingBucket::Days31To60 => self.days_31_60,
            AgingBucket::Days61To90 => self.days_61_90,
            AgingBucket::Days90Plus => self.days_90_plus,
        }
    }

    /// Sum of all buckets.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.current + self.days_1_30 + self.days_31_60 + self.days_61_90 + self.days_90_plus
    }
}

/// Aging for one vendor or customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterpartyAging {
    /// The counterparty.
    pub counterparty: Counterparty,
    /// Display name.
    pub name: String,
    /// Outstanding per bucket.
    pub buckets: AgingBuckets,
    /// Outstanding total.
    pub total: Decimal,
    /// Number of open documents.
    pub document_count: usize,
}

/// Payables or receivables aging as of a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingReport {
    /// Payables or receivables.
    pub kind: DocumentKind,
    /// Aging date.
    pub as_of: NaiveDate,
    /// Outstanding per bucket across all counterparties.
    pub buckets: AgingBuckets,
    /// Outstanding total.
    pub total: Decimal,
    /// Per-counterparty breakdown, ordered by name.
    pub by_counterparty: Vec<CounterpartyAging>,
}
