//! One-to-one matching of bank lines against posted cash transactions.
//!
//! Bank lines are processed in `(date, id)` order. For each line the
//! candidates are ledger transactions with the same signed amount whose date
//! is within the tolerance window. Candidates rank by date distance, then
//! earlier date, then id. A unique best candidate is matched and leaves the
//! pool; a tie on date distance is reported as a potential match and nothing
//! is consumed.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashSet;
use tally_shared::types::{AccountId, BankTransactionId, TransactionId};

use super::types::{BankTransaction, MatchStatus};
use crate::ledger::Transaction;
use crate::workflow::TransactionStatus;

/// A posted ledger transaction as seen from one cash account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerCandidate {
    /// The ledger transaction.
    pub transaction_id: TransactionId,
    /// Its date.
    pub date: NaiveDate,
    /// Net (debit - credit) effect on the cash account.
    pub amount: Decimal,
}

/// Result of matching one bank line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchDecision {
    /// Paired with a unique best candidate.
    Matched(TransactionId),
    /// Equally good candidates; ranked, earliest-dated first.
    Potential(Vec<TransactionId>),
    /// No candidate within tolerance.
    Unmatched,
}

/// A decision for one bank line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    /// The bank line.
    pub bank_transaction_id: BankTransactionId,
    /// What the matcher decided.
    pub decision: MatchDecision,
}

/// Collect the candidate pool for a cash account.
///
/// Only POSTED transactions with a non-zero effect on the account, dated
/// within `[from, to]` and not in `already_matched`, are eligible.
#[must_use]
pub fn candidate_pool<'a, I>(
    cash_account_id: AccountId,
    transactions: I,
    from: NaiveDate,
    to: NaiveDate,
    already_matched: &HashSet<TransactionId>,
) -> Vec<LedgerCandidate>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .filter(|t| t.status == TransactionStatus::Posted)
        .filter(|t| t.date >= from && t.date <= to)
        .filter(|t| !already_matched.contains(&t.id))
        .filter_map(|t| {
            let amount = t.net_on_account(cash_account_id);
            (!amount.is_zero()).then_some(LedgerCandidate {
                transaction_id: t.id,
                date: t.date,
                amount,
            })
        })
        .collect()
}

/// Rank the candidates for one bank line, best first.
#[must_use]
pub fn rank_candidates(
    line: &BankTransaction,
    pool: &[LedgerCandidate],
    tolerance_days: i64,
) -> Vec<(i64, LedgerCandidate)> {
    let mut ranked: Vec<(i64, LedgerCandidate)> = pool
        .iter()
        .filter(|c| c.amount == line.amount)
        .map(|c| ((c.date - line.date).num_days().abs(), *c))
        .filter(|(distance, _)| *distance <= tolerance_days)
        .collect();
    ranked.sort_by_key(|(distance, c)| (*distance, c.date, c.transaction_id));
    ranked
}

/// Match bank lines against the pool, consuming matched candidates.
///
/// Lines whose status is not UNMATCHED or POTENTIAL_MATCH are skipped.
#[must_use]
pub fn auto_match(
    lines: &[BankTransaction],
    mut pool: Vec<LedgerCandidate>,
    tolerance_days: i64,
) -> Vec<MatchOutcome> {
    let mut ordered: Vec<&BankTransaction> = lines
        .iter()
        .filter(|l| matches!(l.match_status, MatchStatus::Unmatched | MatchStatus::PotentialMatch))
        .collect();
    ordered.sort_by_key(|l| (l.date, l.id));

    let mut outcomes = Vec::with_capacity(ordered.len());
    for line in ordered {
        let ranked = rank_candidates(line, &pool, tolerance_days);
        let decision = match ranked.as_slice() {
            [] => MatchDecision::Unmatched,
            [(_, best)] => MatchDecision::Matched(best.transaction_id),
            [(best_distance, best), (next_distance, _), ..] if best_distance < next_distance => {
                MatchDecision::Matched(best.transaction_id)
            }
            _ => MatchDecision::Potential(ranked.iter().map(|(_, c)| c.transaction_id).collect()),
        };

        if let MatchDecision::Matched(id) = decision {
            pool.retain(|c| c.transaction_id != id);
        }
        outcomes.push(MatchOutcome {
            bank_transaction_id: line.id,
            decision,
        });
    }
    outcomes
}

/// Write a decision onto its bank line.
pub fn apply_decision(line: &mut BankTransaction, decision: &MatchDecision) {
    match decision {
        MatchDecision::Matched(id) => {
            line.match_status = MatchStatus::Matched;
            line.matched_transaction_id = Some(*id);
            line.candidate_ids.clear();
        }
        MatchDecision::Potential(ids) => {
            line.match_status = MatchStatus::PotentialMatch;
            line.matched_transaction_id = None;
            line.candidate_ids.clone_from(ids);
        }
        MatchDecision::Unmatched => {
            line.match_status = MatchStatus::Unmatched;
            line.matched_transaction_id = None;
            line.candidate_ids.clear();
        }
    }
}
