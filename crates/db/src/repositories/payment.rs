//! Payment application repository.
//!
//! Every call that changes a document's paid amount holds the document lock
//! for the whole read-modify-write, so concurrent payments against one
//! document apply one at a time.

use rust_decimal::Decimal;
use tracing::info;

use tally_core::document::{Counterparty, DocumentRef};
use tally_core::ledger::LedgerService;
use tally_core::payment::{CreatePaymentInput, Payment, PaymentError, PaymentService};
use tally_core::workflow::{TransactionStatus, WorkflowService};
use tally_shared::types::{PaymentId, UserId};

use super::Context;
use super::document::load_document;
use super::transaction::{account_map, stage_post, stage_void};
use crate::error::EngineError;
use crate::lock::{LockKey, LockSet};
use crate::store::{ChangeSet, CounterpartyStore, PaymentStore, TransactionStore, UnitOfWork};

#[derive(Debug, Clone, Copy)]
enum Release {
    Void,
    Fail,
}

/// Payment repository.
#[derive(Clone)]
pub struct PaymentRepository {
    ctx: Context,
}

impl PaymentRepository {
    pub(crate) fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    /// Records a payment and applies it to its document.
    ///
    /// With a cash account the payment also posts its settlement transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The document does not exist (`DocumentNotFound`)
    /// - The document is not POSTED
    /// - The amount is not positive, or exceeds the remaining balance (`Overpayment`)
    /// - The settlement transaction cannot be posted
    pub async fn create_payment(&self, input: CreatePaymentInput) -> Result<Payment, EngineError> {
        let reference = input.document;
        let mut locks = self
            .ctx
            .locks
            .acquire_all([LockKey::Document(reference)])
            .await;
        let mut document = load_document(&self.ctx, reference)
            .await?
            .ok_or(PaymentError::DocumentNotFound(reference))?;
        locks
            .lock([LockKey::Counterparty(document.counterparty())])
            .await;

        let mut payment = PaymentService::create_payment(
            input,
            document.header(),
            document.transaction().status,
        )?;

        let mut changes = ChangeSet::new();
        if let Some(cash_account_id) = payment.cash_account_id {
            let request = PaymentService::settlement_transaction(
                &payment,
                document.header(),
                cash_account_id,
            );
            let accounts = account_map(&self.ctx).await?;
            let mut settlement =
                LedgerService::create_transaction(request, |id| accounts.get(&id))?;
            let approval = WorkflowService::approve(settlement.status, payment.created_by, None)?;
            settlement.apply(&approval);
            stage_post(
                &self.ctx,
                &mut locks,
                &mut settlement,
                payment.created_by,
                &mut changes,
            )
            .await?;
            payment.transaction_id = Some(settlement.id);
        }

        let existing = self.ctx.store.list_payments(reference).await?;
        let position = PaymentService::derive_payment_status(
            document.header().amount_due,
            existing.iter().chain(std::iter::once(&payment)),
        );
        PaymentService::apply_position(document.header_mut(), position);

        changes.put(&mut payment);
        document.stage(&mut changes);
        self.stage_ytd(
            document.counterparty(),
            PaymentService::ytd_delta(&payment, true),
            &mut changes,
        )
        .await?;
        self.ctx.store.commit(changes).await?;

        info!(
            payment_id = %payment.id,
            document = ?reference,
            amount = %payment.amount,
            amount_paid = %position.amount_paid,
            payment_status = %position.status.as_str(),
            "payment applied"
        );
        Ok(payment)
    }

    /// PENDING → PROCESSING, for payments handed to a processor.
    pub async fn begin_processing(&self, id: PaymentId) -> Result<Payment, EngineError> {
        let payment = self.advance(id, PaymentService::begin_processing).await?;
        info!(payment_id = %id, "payment processing");
        Ok(payment)
    }

    /// PENDING → COMPLETED. The document balance already reflects the payment.
    pub async fn process_payment(&self, id: PaymentId) -> Result<Payment, EngineError> {
        let payment = self.advance(id, PaymentService::process).await?;
        info!(payment_id = %id, "payment completed");
        Ok(payment)
    }

    /// PROCESSING → COMPLETED.
    pub async fn complete_processing(&self, id: PaymentId) -> Result<Payment, EngineError> {
        let payment = self.advance(id, PaymentService::complete_processing).await?;
        info!(payment_id = %id, "payment completed after processing");
        Ok(payment)
    }

    /// PENDING | COMPLETED → VOIDED, releasing the amount from the document.
    ///
    /// # Errors
    ///
    /// Returns `ReasonRequired`, `InvalidTransition`, or an error from voiding
    /// the settlement transaction.
    pub async fn void_payment(
        &self,
        id: PaymentId,
        voided_by: UserId,
        reason: impl Into<String>,
    ) -> Result<Payment, EngineError> {
        self.release(id, voided_by, &reason.into(), Release::Void)
            .await
    }

    /// PENDING | PROCESSING → FAILED, releasing the amount like a void.
    pub async fn fail_payment(
        &self,
        id: PaymentId,
        failed_by: UserId,
        reason: impl Into<String>,
    ) -> Result<Payment, EngineError> {
        self.release(id, failed_by, &reason.into(), Release::Fail)
            .await
    }

    /// Fetches a payment.
    pub async fn get_payment(&self, id: PaymentId) -> Result<Payment, EngineError> {
        Ok(self
            .ctx
            .store
            .get_payment(id)
            .await?
            .ok_or(PaymentError::PaymentNotFound(id))?)
    }

    /// Lists the payments recorded against a document.
    pub async fn list_payments(&self, document: DocumentRef) -> Result<Vec<Payment>, EngineError> {
        Ok(self.ctx.store.list_payments(document).await?)
    }

    /// Status change that leaves the document balance alone.
    async fn advance<F>(&self, id: PaymentId, step: F) -> Result<Payment, EngineError>
    where
        F: FnOnce(&mut Payment) -> Result<(), PaymentError>,
    {
        let reference = self.get_payment(id).await?.document;
        let _locks = self
            .ctx
            .locks
            .acquire_all([LockKey::Document(reference)])
            .await;

        let mut payment = self.get_payment(id).await?;
        step(&mut payment)?;
        let mut changes = ChangeSet::new();
        changes.put(&mut payment);
        self.ctx.store.commit(changes).await?;
        Ok(payment)
    }

    async fn release(
        &self,
        id: PaymentId,
        user: UserId,
        reason: &str,
        release: Release,
    ) -> Result<Payment, EngineError> {
        let reference = self.get_payment(id).await?.document;
        let mut locks = self
            .ctx
            .locks
            .acquire_all([LockKey::Document(reference)])
            .await;
        let mut document = load_document(&self.ctx, reference)
            .await?
            .ok_or(PaymentError::DocumentNotFound(reference))?;
        locks
            .lock([LockKey::Counterparty(document.counterparty())])
            .await;

        let mut payment = self.get_payment(id).await?;
        let was_applied = payment.status.is_applied();
        match release {
            Release::Void => PaymentService::void(&mut payment, reason)?,
            Release::Fail => PaymentService::fail(&mut payment, reason)?,
        }

        let mut changes = ChangeSet::new();
        self.stage_settlement_void(&mut locks, &payment, user, reason, &mut changes)
            .await?;

        let others: Vec<Payment> = self
            .ctx
            .store
            .list_payments(reference)
            .await?
            .into_iter()
            .filter(|p| p.id != payment.id)
            .collect();
        let position = PaymentService::derive_payment_status(
            document.header().amount_due,
            others.iter().chain(std::iter::once(&payment)),
        );
        PaymentService::apply_position(document.header_mut(), position);

        changes.put(&mut payment);
        document.stage(&mut changes);
        if was_applied {
            self.stage_ytd(
                document.counterparty(),
                PaymentService::ytd_delta(&payment, false),
                &mut changes,
            )
            .await?;
        }
        self.ctx.store.commit(changes).await?;

        info!(
            payment_id = %id,
            status = %payment.status,
            amount_paid = %position.amount_paid,
            "payment released"
        );
        Ok(payment)
    }

    async fn stage_settlement_void(
        &self,
        locks: &mut LockSet,
        payment: &Payment,
        user: UserId,
        reason: &str,
        changes: &mut ChangeSet,
    ) -> Result<(), EngineError> {
        let Some(transaction_id) = payment.transaction_id else {
            return Ok(());
        };
        locks.lock([LockKey::Transaction(transaction_id)]).await;

        let Some(mut settlement) = self.ctx.store.get_transaction(transaction_id).await? else {
            return Ok(());
        };
        if settlement.status == TransactionStatus::Voided {
            return Ok(());
        }
        stage_void(&self.ctx, locks, &mut settlement, user, reason, changes).await?;
        Ok(())
    }

    async fn stage_ytd(
        &self,
        counterparty: Counterparty,
        delta: Decimal,
        changes: &mut ChangeSet,
    ) -> Result<(), EngineError> {
        match counterparty {
            Counterparty::Vendor(vendor_id) => {
                if let Some(mut vendor) = self.ctx.store.get_vendor(vendor_id).await? {
                    vendor.ytd_payments += delta;
                    changes.put(&mut vendor);
                }
            }
            Counterparty::Customer(customer_id) => {
                if let Some(mut customer) = self.ctx.store.get_customer(customer_id).await? {
                    customer.ytd_receipts += delta;
                    changes.put(&mut customer);
                }
            }
        }
        Ok(())
    }
}
