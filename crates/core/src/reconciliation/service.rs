//! Reconciliation lifecycle and balance check.

use chrono::Utc;
use rust_decimal::Decimal;
use tally_shared::types::{
    AccountId, AdjustmentId, BankTransactionId, ReconciliationId, TransactionId, UserId,
};

use super::error::ReconciliationError;
use super::types::{
    AdjustmentKind, AuditNote, BankAccount, BankReconciliation, BankStatementAdjustment,
    BankTransaction, BankTransactionInput, MatchCounts, MatchStatus, ReconciliationStatus,
    ReconciliationSummary, StartReconciliationInput,
};
use crate::ledger::Transaction;
use crate::workflow::TransactionStatus;

/// Stateless reconciliation service.
pub struct ReconciliationService;

impl ReconciliationService {
    /// Build an UNMATCHED bank line.
    ///
    /// # Errors
    ///
    /// Returns `BankAccountInactive` or `ZeroAmount`.
    pub fn record_bank_transaction(
        account: &BankAccount,
        input: BankTransactionInput,
    ) -> Result<BankTransaction, ReconciliationError> {
        if !account.is_active {
            return Err(ReconciliationError::BankAccountInactive(account.id));
        }
        if input.amount.is_zero() {
            return Err(ReconciliationError::ZeroAmount);
        }

        Ok(BankTransaction {
            id: BankTransactionId::new(),
            bank_account_id: account.id,
            date: input.date,
            description: input.description,
            amount: input.amount,
            reference: input.reference,
            match_status: MatchStatus::Unmatched,
            matched_transaction_id: None,
            candidate_ids: Vec::new(),
            review_note: None,
            reconciliation_id: None,
            version: 0,
        })
    }

    /// Start an IN_PROGRESS reconciliation.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPeriod` or `ReconciliationInProgress`.
    pub fn start(
        input: StartReconciliationInput,
        has_open_reconciliation: bool,
    ) -> Result<BankReconciliation, ReconciliationError> {
        if input.period_end < input.period_start {
            return Err(ReconciliationError::InvalidPeriod {
                start: input.period_start,
                end: input.period_end,
            });
        }
        if has_open_reconciliation {
            return Err(ReconciliationError::ReconciliationInProgress(input.bank_account_id));
        }

        Ok(BankReconciliation {
            id: ReconciliationId::new(),
            bank_account_id: input.bank_account_id,
            period_start: input.period_start,
            period_end: input.period_end,
            statement_beginning_balance: input.statement_beginning_balance,
            statement_ending_balance: input.statement_ending_balance,
            status: ReconciliationStatus::InProgress,
            adjustments: Vec::new(),
            audit_notes: Vec::new(),
            started_by: input.started_by,
            completed_by: None,
            completed_at: None,
            version: 0,
        })
    }

    /// Reject changes to a completed reconciliation.
    ///
    /// # Errors
    ///
    /// Returns `ReconciliationCompleted`.
    pub fn ensure_in_progress(
        reconciliation: &BankReconciliation,
    ) -> Result<(), ReconciliationError> {
        if reconciliation.status == ReconciliationStatus::Completed {
            return Err(ReconciliationError::ReconciliationCompleted(reconciliation.id));
        }
        Ok(())
    }

    /// Require a bank line to belong to the reconciliation's account and period
    /// and not be frozen.
    ///
    /// # Errors
    ///
    /// Returns `WrongBankAccount`, `OutsidePeriod` or `BankTransactionReconciled`.
    pub fn ensure_line_in_scope(
        reconciliation: &BankReconciliation,
        line: &BankTransaction,
    ) -> Result<(), ReconciliationError> {
        if line.bank_account_id != reconciliation.bank_account_id {
            return Err(ReconciliationError::WrongBankAccount(line.id));
        }
        if !reconciliation.contains_date(line.date) {
            return Err(ReconciliationError::OutsidePeriod(line.date));
        }
        Self::ensure_line_open(line)
    }

    /// Match a bank line to a ledger transaction by hand.
    ///
    /// # Errors
    ///
    /// Returns a scope error, `InvalidMatchStatus`, `LedgerTransactionNotPosted`,
    /// `NotOnCashAccount`, `AmountMismatch` or `LedgerTransactionAlreadyMatched`.
    pub fn manual_match(
        reconciliation: &BankReconciliation,
        line: &mut BankTransaction,
        ledger: &Transaction,
        cash_account_id: AccountId,
        ledger_already_matched: bool,
    ) -> Result<(), ReconciliationError> {
        Self::ensure_in_progress(reconciliation)?;
        Self::ensure_line_in_scope(reconciliation, line)?;
        Self::ensure_resolvable(line, MatchStatus::Matched)?;

        if ledger.status != TransactionStatus::Posted {
            return Err(ReconciliationError::LedgerTransactionNotPosted {
                transaction_id: ledger.id,
                status: ledger.status,
            });
        }
        let ledger_amount = ledger.net_on_account(cash_account_id);
        if ledger_amount.is_zero() {
            return Err(ReconciliationError::NotOnCashAccount(ledger.id));
        }
        if ledger_amount != line.amount {
            return Err(ReconciliationError::AmountMismatch {
                bank_amount: line.amount,
                ledger_amount,
            });
        }
        if ledger_already_matched {
            return Err(ReconciliationError::LedgerTransactionAlreadyMatched(ledger.id));
        }

        line.match_status = MatchStatus::Matched;
        line.matched_transaction_id = Some(ledger.id);
        line.candidate_ids.clear();
        Ok(())
    }

    /// Exclude a non-ledger bank line and back it out of the statement.
    ///
    /// The adjustment amount is the negated bank amount.
    ///
    /// # Errors
    ///
    /// Returns a scope error or `InvalidMatchStatus`.
    pub fn exclude(
        reconciliation: &mut BankReconciliation,
        line: &mut BankTransaction,
        kind: AdjustmentKind,
        memo: impl Into<String>,
    ) -> Result<(), ReconciliationError> {
        Self::ensure_in_progress(reconciliation)?;
        Self::ensure_line_in_scope(reconciliation, line)?;
        Self::ensure_resolvable(line, MatchStatus::Excluded)?;

        reconciliation.adjustments.push(BankStatementAdjustment {
            id: AdjustmentId::new(),
            kind,
            amount: -line.amount,
            memo: memo.into(),
            bank_transaction_id: Some(line.id),
            created_at: Utc::now(),
        });
        line.match_status = MatchStatus::Excluded;
        line.matched_transaction_id = None;
        line.candidate_ids.clear();
        Ok(())
    }

    /// Add a statement adjustment not tied to a bank line.
    ///
    /// # Errors
    ///
    /// Returns `ReconciliationCompleted` or `ZeroAmount`.
    pub fn add_adjustment(
        reconciliation: &mut BankReconciliation,
        kind: AdjustmentKind,
        amount: Decimal,
        memo: impl Into<String>,
    ) -> Result<AdjustmentId, ReconciliationError> {
        Self::ensure_in_progress(reconciliation)?;
        if amount.is_zero() {
            return Err(ReconciliationError::ZeroAmount);
        }

        let id = AdjustmentId::new();
        reconciliation.adjustments.push(BankStatementAdjustment {
            id,
            kind,
            amount,
            memo: memo.into(),
            bank_transaction_id: None,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    /// Flag a line for human review; auto-match skips it.
    ///
    /// # Errors
    ///
    /// Returns `NoteRequired`, `BankTransactionReconciled` or `InvalidMatchStatus`.
    pub fn flag_for_review(
        line: &mut BankTransaction,
        note: &str,
    ) -> Result<(), ReconciliationError> {
        if note.trim().is_empty() {
            return Err(ReconciliationError::NoteRequired);
        }
        Self::ensure_line_open(line)?;
        if !matches!(line.match_status, MatchStatus::Unmatched | MatchStatus::PotentialMatch) {
            return Err(ReconciliationError::InvalidMatchStatus {
                from: line.match_status,
                to: MatchStatus::NeedsReview,
            });
        }

        line.match_status = MatchStatus::NeedsReview;
        line.review_note = Some(note.to_string());
        Ok(())
    }

    /// Return a MATCHED or EXCLUDED line to UNMATCHED.
    ///
    /// A matched ledger transaction returns to the candidate pool; an excluded
    /// line's adjustment is removed.
    ///
    /// # Errors
    ///
    /// Returns a scope error or `InvalidMatchStatus`.
    pub fn reset_match(
        reconciliation: &mut BankReconciliation,
        line: &mut BankTransaction,
    ) -> Result<(), ReconciliationError> {
        Self::ensure_in_progress(reconciliation)?;
        Self::ensure_line_in_scope(reconciliation, line)?;

        match line.match_status {
            MatchStatus::Matched => {}
            MatchStatus::Excluded => reconciliation
                .adjustments
                .retain(|a| a.bank_transaction_id != Some(line.id)),
            from => {
                return Err(ReconciliationError::InvalidMatchStatus {
                    from,
                    to: MatchStatus::Unmatched,
                });
            }
        }

        line.match_status = MatchStatus::Unmatched;
        line.matched_transaction_id = None;
        line.candidate_ids.clear();
        Ok(())
    }

    /// Compute the balance summary over the period's bank lines.
    ///
    /// Lines outside the account or period are ignored.
    #[must_use]
    pub fn summarize<'a, I>(
        reconciliation: &BankReconciliation,
        lines: I,
        beginning_ledger_balance: Decimal,
    ) -> ReconciliationSummary
    where
        I: IntoIterator<Item = &'a BankTransaction>,
    {
        let mut counts = MatchCounts::default();
        let mut total_matched = Decimal::ZERO;

        for line in lines {
            if line.bank_account_id != reconciliation.bank_account_id
                || !reconciliation.contains_date(line.date)
            {
                continue;
            }
            counts.record(line.match_status);
            if line.match_status == MatchStatus::Matched {
                total_matched += line.amount;
            }
        }

        let total_adjustments = reconciliation.total_adjustments();
        let adjusted_statement_balance =
            reconciliation.statement_ending_balance + total_adjustments;
        let difference = adjusted_statement_balance - (beginning_ledger_balance + total_matched);

        ReconciliationSummary {
            reconciliation_id: reconciliation.id,
            statement_beginning_balance: reconciliation.statement_beginning_balance,
            statement_ending_balance: reconciliation.statement_ending_balance,
            total_adjustments,
            adjusted_statement_balance,
            beginning_ledger_balance,
            total_matched,
            difference,
            counts,
        }
    }

    /// Complete a reconciliation, freezing it and its bank lines.
    ///
    /// # Errors
    ///
    /// Returns `ReconciliationCompleted`, `LedgerTransactionNotPosted` for a
    /// match whose ledger side was voided, `OutstandingItems` or
    /// `UnbalancedReconciliation`. Nothing is modified on error.
    pub fn complete<F>(
        reconciliation: &mut BankReconciliation,
        lines: &mut [BankTransaction],
        beginning_ledger_balance: Decimal,
        ledger_status: F,
        completed_by: UserId,
    ) -> Result<ReconciliationSummary, ReconciliationError>
    where
        F: Fn(TransactionId) -> Option<TransactionStatus>,
    {
        Self::ensure_in_progress(reconciliation)?;
        Self::ensure_matches_posted(reconciliation, lines, ledger_status)?;

        let summary = Self::summarize(reconciliation, lines.iter(), beginning_ledger_balance);
        let outstanding = summary.counts.outstanding();
        if outstanding > 0 {
            return Err(ReconciliationError::OutstandingItems { count: outstanding });
        }
        if !summary.is_balanced() {
            return Err(ReconciliationError::UnbalancedReconciliation {
                adjusted_statement_balance: summary.adjusted_statement_balance,
                expected_balance: beginning_ledger_balance + summary.total_matched,
                difference: summary.difference,
            });
        }

        for line in lines.iter_mut().filter(|l| {
            l.bank_account_id == reconciliation.bank_account_id
                && reconciliation.contains_date(l.date)
        }) {
            line.reconciliation_id = Some(reconciliation.id);
        }
        reconciliation.status = ReconciliationStatus::Completed;
        reconciliation.completed_by = Some(completed_by);
        reconciliation.completed_at = Some(Utc::now());
        Ok(summary)
    }

    /// Every MATCHED line in scope must still point at a POSTED transaction.
    fn ensure_matches_posted<F>(
        reconciliation: &BankReconciliation,
        lines: &[BankTransaction],
        ledger_status: F,
    ) -> Result<(), ReconciliationError>
    where
        F: Fn(TransactionId) -> Option<TransactionStatus>,
    {
        let matched = lines
            .iter()
            .filter(|l| {
                l.bank_account_id == reconciliation.bank_account_id
                    && reconciliation.contains_date(l.date)
                    && l.match_status == MatchStatus::Matched
            })
            .filter_map(|l| l.matched_transaction_id);
        for transaction_id in matched {
            match ledger_status(transaction_id) {
                Some(TransactionStatus::Posted) => {}
                Some(status) => {
                    return Err(ReconciliationError::LedgerTransactionNotPosted {
                        transaction_id,
                        status,
                    });
                }
                None => return Err(ReconciliationError::MatchedTransactionMissing(transaction_id)),
            }
        }
        Ok(())
    }

    /// Rejects voiding a ledger transaction that still satisfies a bank line.
    ///
    /// # Errors
    ///
    /// Returns `LedgerTransactionMatched` naming the first such line.
    pub fn ensure_not_matched<'a, I>(
        transaction_id: TransactionId,
        lines: I,
    ) -> Result<(), ReconciliationError>
    where
        I: IntoIterator<Item = &'a BankTransaction>,
    {
        let matched = lines.into_iter().find(|l| {
            l.match_status == MatchStatus::Matched
                && l.matched_transaction_id == Some(transaction_id)
        });
        match matched {
            Some(line) => Err(ReconciliationError::LedgerTransactionMatched {
                transaction_id,
                bank_transaction_id: line.id,
            }),
            None => Ok(()),
        }
    }

    /// Append an audit note; the only change a completed reconciliation accepts.
    ///
    /// # Errors
    ///
    /// Returns `NoteRequired`.
    pub fn add_audit_note(
        reconciliation: &mut BankReconciliation,
        note: &str,
        author: UserId,
    ) -> Result<(), ReconciliationError> {
        if note.trim().is_empty() {
            return Err(ReconciliationError::NoteRequired);
        }
        reconciliation.audit_notes.push(AuditNote {
            note: note.to_string(),
            author,
            created_at: Utc::now(),
        });
        Ok(())
    }

    fn ensure_line_open(line: &BankTransaction) -> Result<(), ReconciliationError> {
        if line.reconciliation_id.is_some() {
            return Err(ReconciliationError::BankTransactionReconciled(line.id));
        }
        Ok(())
    }

    fn ensure_resolvable(
        line: &BankTransaction,
        to: MatchStatus,
    ) -> Result<(), ReconciliationError> {
        if !line.match_status.is_outstanding() {
            return Err(ReconciliationError::InvalidMatchStatus {
                from: line.match_status,
                to,
            });
        }
        Ok(())
    }
}
