//! Bill and invoice construction and guards.
//!
//! A bill debits each line's expense account and credits the AP control
//! account; an invoice debits the AR control account and credits each
//! line's revenue account. The underlying transaction starts in DRAFT.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use tally_shared::types::{AccountId, BillId, InvoiceId, LineItemId, UserId};

use super::error::DocumentError;
use super::terms::days_from_terms;
use super::types::{
    Bill, CreateBillInput, CreateInvoiceInput, Customer, DocumentHeader, DocumentPaymentStatus,
    Invoice, LineItem, LineItemInput, Vendor,
};
use crate::ledger::{
    Account, CreateTransactionInput, EntryInput, LedgerService, Transaction, TransactionType,
};

/// Stateless bill/invoice service.
pub struct DocumentService;

impl DocumentService {
    /// Validate lines and return them with their subtotal.
    ///
    /// # Errors
    ///
    /// Returns `NoLineItems`, `InvalidQuantity`, `InvalidUnitPrice` or
    /// `LineAmountMismatch`.
    pub fn build_lines(
        inputs: &[LineItemInput],
    ) -> Result<(Vec<LineItem>, Decimal), DocumentError> {
        if inputs.is_empty() {
            return Err(DocumentError::NoLineItems);
        }

        let mut subtotal = Decimal::ZERO;
        let mut lines = Vec::with_capacity(inputs.len());

        for (line, input) in inputs.iter().enumerate() {
            if input.quantity <= Decimal::ZERO {
                return Err(DocumentError::InvalidQuantity { line });
            }
            if input.unit_price <= Decimal::ZERO {
                return Err(DocumentError::InvalidUnitPrice { line });
            }
            let expected = input.quantity * input.unit_price;
            if input.amount != expected {
                return Err(DocumentError::LineAmountMismatch {
                    line,
                    expected,
                    actual: input.amount,
                });
            }

            subtotal += input.amount;
            lines.push(LineItem {
                id: LineItemId::new(),
                description: input.description.clone(),
                quantity: input.quantity,
                unit_price: input.unit_price,
                amount: input.amount,
                account_id: input.account_id,
                fund_id: input.fund_id,
                category: input.category.clone(),
                taxable: input.taxable,
            });
        }

        Ok((lines, subtotal))
    }

    /// Resolve the due date from an explicit date or the counterparty's terms.
    ///
    /// # Errors
    ///
    /// Returns `DueBeforeInvoiceDate` or `DateOutOfRange`.
    pub fn resolve_due_date(
        invoice_date: NaiveDate,
        explicit: Option<NaiveDate>,
        terms: Option<&str>,
        default_terms_days: i64,
    ) -> Result<NaiveDate, DocumentError> {
        let due_date = match explicit {
            Some(date) => date,
            None => {
                let days = u64::try_from(days_from_terms(terms, default_terms_days))
                    .map_err(|_| DocumentError::DateOutOfRange)?;
                invoice_date
                    .checked_add_days(Days::new(days))
                    .ok_or(DocumentError::DateOutOfRange)?
            }
        };

        if due_date < invoice_date {
            return Err(DocumentError::DueBeforeInvoiceDate {
                invoice_date,
                due_date,
            });
        }
        Ok(due_date)
    }

    /// Build a DRAFT bill and its AP transaction.
    ///
    /// # Errors
    ///
    /// Returns `VendorInactive`, line errors, due-date errors, or the ledger
    /// error raised while building the transaction.
    pub fn create_bill<'a, A>(
        input: CreateBillInput,
        vendor: &Vendor,
        default_terms_days: i64,
        account_lookup: A,
    ) -> Result<Bill, DocumentError>
    where
        A: Fn(AccountId) -> Option<&'a Account>,
    {
        if !vendor.is_active {
            return Err(DocumentError::VendorInactive(vendor.id));
        }

        let (line_items, subtotal) = Self::build_lines(&input.line_items)?;
        let due_date = Self::resolve_due_date(
            input.invoice_date,
            input.due_date,
            vendor.payment_terms.as_deref(),
            default_terms_days,
        )?;

        let mut entries: Vec<EntryInput> = line_items
            .iter()
            .map(|line| {
                EntryInput::debit(line.account_id, line.amount)
                    .with_fund(line.fund_id)
                    .with_memo(line.description.clone())
            })
            .collect();
        entries.push(EntryInput::credit(input.ap_account_id, subtotal));

        let transaction = Self::document_transaction(
            TransactionType::AccountsPayable,
            input.invoice_date,
            input.description,
            &input.number,
            entries,
            input.created_by,
            account_lookup,
        )?;

        Ok(Bill {
            id: BillId::new(),
            vendor_id: vendor.id,
            header: DocumentHeader {
                number: input.number,
                invoice_date: input.invoice_date,
                due_date,
                amount_due: subtotal,
                amount_paid: Decimal::ZERO,
                payment_status: DocumentPaymentStatus::Unpaid,
                control_account_id: input.ap_account_id,
                line_items,
            },
            transaction,
            version: 0,
        })
    }

    /// Build a DRAFT invoice and its AR transaction.
    ///
    /// # Errors
    ///
    /// Returns `CustomerInactive`, line errors, due-date errors, or the ledger
    /// error raised while building the transaction.
    pub fn create_invoice<'a, A>(
        input: CreateInvoiceInput,
        customer: &Customer,
        default_terms_days: i64,
        account_lookup: A,
    ) -> Result<Invoice, DocumentError>
    where
        A: Fn(AccountId) -> Option<&'a Account>,
    {
        if !customer.is_active {
            return Err(DocumentError::CustomerInactive(customer.id));
        }

        let (line_items, subtotal) = Self::build_lines(&input.line_items)?;
        let due_date = Self::resolve_due_date(
            input.invoice_date,
            input.due_date,
            customer.payment_terms.as_deref(),
            default_terms_days,
        )?;

        let mut entries = vec![EntryInput::debit(input.ar_account_id, subtotal)];
        entries.extend(line_items.iter().map(|line| {
            EntryInput::credit(line.account_id, line.amount)
                .with_fund(line.fund_id)
                .with_memo(line.description.clone())
        }));

        let transaction = Self::document_transaction(
            TransactionType::AccountsReceivable,
            input.invoice_date,
            input.description,
            &input.number,
            entries,
            input.created_by,
            account_lookup,
        )?;

        Ok(Invoice {
            id: InvoiceId::new(),
            customer_id: customer.id,
            header: DocumentHeader {
                number: input.number,
                invoice_date: input.invoice_date,
                due_date,
                amount_due: subtotal,
                amount_paid: Decimal::ZERO,
                payment_status: DocumentPaymentStatus::Unpaid,
                control_account_id: input.ar_account_id,
                line_items,
            },
            transaction,
            version: 0,
        })
    }

    /// Reject voiding a document that has received any payment.
    ///
    /// # Errors
    ///
    /// Returns `CannotVoidPaidDocument` if `amount_paid > 0`.
    pub fn ensure_voidable(header: &DocumentHeader) -> Result<(), DocumentError> {
        if header.amount_paid > Decimal::ZERO {
            return Err(DocumentError::CannotVoidPaidDocument {
                amount_paid: header.amount_paid,
            });
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn document_transaction<'a, A>(
        transaction_type: TransactionType,
        date: NaiveDate,
        description: String,
        number: &str,
        entries: Vec<EntryInput>,
        created_by: UserId,
        account_lookup: A,
    ) -> Result<Transaction, DocumentError>
    where
        A: Fn(AccountId) -> Option<&'a Account>,
    {
        let input = CreateTransactionInput {
            transaction_type,
            date,
            description,
            reference: Some(number.to_string()),
            entries,
            created_by,
        };
        Ok(LedgerService::create_transaction(input, account_lookup)?)
    }
}
