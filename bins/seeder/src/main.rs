//! Demo seeder for Tally.
//!
//! Builds an in-memory engine from configuration, walks a small school
//! through a month of activity (chart of accounts, fiscal year, a restricted
//! fund, bills, invoices, payments, a recurring template and a bank
//! reconciliation) and logs the resulting reports.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tally_core::document::{
    Counterparty, CreateBillInput, CreateInvoiceInput, DocumentKind, DocumentRef, LineItemInput,
};
use tally_core::fund::{CreateFundInput, FundType, TransferInput};
use tally_core::ledger::{Account, AccountType, CreateTransactionInput, EntryInput, TransactionType};
use tally_core::payment::{CreatePaymentInput, PaymentMethod};
use tally_core::reconciliation::{AdjustmentKind, BankTransactionInput, StartReconciliationInput};
use tally_core::recurring::{CreateTemplateInput, Frequency};
use tally_db::{Engine, EngineSettings};
use tally_shared::types::UserId;
use tally_shared::{AppConfig, LoggingConfig};

/// Accounts every seed step posts against.
struct Chart {
    cash: Account,
    receivable: Account,
    payable: Account,
    net_assets: Account,
    transfers_out: Account,
    transfers_in: Account,
    tuition: Account,
    gifts: Account,
    supplies: Account,
    rent: Account,
}

fn date(y: i32, m: u32, d: u32) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d).with_context(|| format!("invalid date {y}-{m}-{d}"))
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    let engine = Engine::in_memory(EngineSettings::from(&config.engine));
    let user = UserId::new();

    info!("Seeding chart of accounts...");
    let chart = seed_chart(&engine).await?;

    info!("Opening fiscal year...");
    engine
        .fiscal()
        .open_fiscal_year("FY2026", date(2026, 1, 1)?, date(2026, 12, 31)?)
        .await?;

    info!("Seeding opening balance and restricted gift...");
    seed_funds(&engine, &chart, user).await?;

    info!("Seeding bills, invoices and payments...");
    seed_documents(&engine, &chart, user).await?;

    info!("Seeding recurring rent...");
    seed_recurring(&engine, &chart, user).await?;

    info!("Reconciling January bank statement...");
    seed_reconciliation(&engine, &chart, user).await?;

    let as_of = date(2026, 2, 28)?;
    let payables = engine.reports().aging_report(DocumentKind::Payable, as_of).await?;
    let receivables = engine.reports().aging_report(DocumentKind::Receivable, as_of).await?;
    let trial_balance = engine.reports().trial_balance(as_of).await?;
    info!(
        payables = %serde_json::to_string(&payables.buckets)?,
        receivables = %serde_json::to_string(&receivables.buckets)?,
        balanced = trial_balance.totals.is_balanced,
        total_debit = %trial_balance.totals.total_debit,
        "Seeding complete!"
    );
    Ok(())
}

async fn seed_chart(engine: &Engine) -> anyhow::Result<Chart> {
    let accounts = engine.accounts();
    Ok(Chart {
        cash: accounts.create_account("1000", "Operating Cash", AccountType::Asset, None).await?,
        receivable: accounts
            .create_account("1200", "Tuition Receivable", AccountType::Asset, None)
            .await?,
        payable: accounts
            .create_account("2000", "Accounts Payable", AccountType::Liability, None)
            .await?,
        net_assets: accounts
            .create_account("3000", "Net Assets", AccountType::Equity, None)
            .await?,
        transfers_out: accounts
            .create_account("3900", "Fund Transfers Out", AccountType::Equity, None)
            .await?,
        transfers_in: accounts
            .create_account("3910", "Fund Transfers In", AccountType::Equity, None)
            .await?,
        tuition: accounts
            .create_account("4000", "Tuition Revenue", AccountType::Revenue, None)
            .await?,
        gifts: accounts
            .create_account("4100", "Contributions", AccountType::Revenue, None)
            .await?,
        supplies: accounts
            .create_account("5000", "Classroom Supplies", AccountType::Expense, None)
            .await?,
        rent: accounts.create_account("5100", "Rent", AccountType::Expense, None).await?,
    })
}

async fn post(
    engine: &Engine,
    user: UserId,
    on: NaiveDate,
    description: &str,
    entries: Vec<EntryInput>,
) -> anyhow::Result<()> {
    let txns = engine.transactions();
    let draft = txns
        .create_transaction(CreateTransactionInput {
            transaction_type: TransactionType::JournalEntry,
            date: on,
            description: description.to_string(),
            reference: None,
            entries,
            created_by: user,
        })
        .await?;
    txns.approve(draft.id, user, None).await?;
    txns.post(draft.id, user).await?;
    Ok(())
}

async fn seed_funds(engine: &Engine, chart: &Chart, user: UserId) -> anyhow::Result<()> {
    post(
        engine,
        user,
        date(2026, 1, 2)?,
        "Opening balance",
        vec![
            EntryInput::debit(chart.cash.id, dec!(25000)),
            EntryInput::credit(chart.net_assets.id, dec!(25000)),
        ],
    )
    .await?;

    let funds = engine.funds();
    let library = funds
        .create_fund(CreateFundInput {
            name: "Library Fund".to_string(),
            fund_type: FundType::Restricted,
            restriction: Some("Books and media only".to_string()),
            valid_from: None,
            valid_to: None,
        })
        .await?;
    let operating = funds
        .create_fund(CreateFundInput {
            name: "Operating Fund".to_string(),
            fund_type: FundType::General,
            restriction: None,
            valid_from: None,
            valid_to: None,
        })
        .await?;

    post(
        engine,
        user,
        date(2026, 1, 6)?,
        "Library gift",
        vec![
            EntryInput::debit(chart.cash.id, dec!(2000)),
            EntryInput::credit(chart.gifts.id, dec!(2000)).with_fund(Some(library.id)),
        ],
    )
    .await?;

    funds
        .transfer(TransferInput {
            source_fund_id: library.id,
            destination_fund_id: operating.id,
            amount: dec!(500),
            date: date(2026, 1, 20)?,
            transfer_out_account_id: chart.transfers_out.id,
            transfer_in_account_id: chart.transfers_in.id,
            description: "Release for reading program".to_string(),
            created_by: user,
        })
        .await?;

    for (fund, check) in engine.reports().fund_balances(date(2026, 1, 31)?).await? {
        info!(
            fund = %fund.name,
            balance = %fund.balance,
            reconciled = check.is_reconciled,
            "fund balance"
        );
    }
    Ok(())
}

async fn seed_documents(engine: &Engine, chart: &Chart, user: UserId) -> anyhow::Result<()> {
    let docs = engine.documents();
    let vendor = docs.create_vendor("School Supply Co", Some("Net 15".to_string())).await?;
    let family = docs.create_customer("Rivera Family", None).await?;

    let bill = docs
        .create_bill(CreateBillInput {
            vendor_id: vendor.id,
            number: "SSC-4411".to_string(),
            invoice_date: date(2026, 1, 8)?,
            due_date: None,
            description: "Art supplies".to_string(),
            ap_account_id: chart.payable.id,
            line_items: vec![
                LineItemInput::new("Paint sets", dec!(12), dec!(18.50), chart.supplies.id),
                LineItemInput::new("Paper", dec!(4), dec!(22), chart.supplies.id),
            ],
            created_by: user,
        })
        .await?;
    let bill_ref = DocumentRef::Bill(bill.id);
    docs.submit_document(bill_ref, user).await?;
    docs.approve_document(bill_ref, user, None).await?;
    docs.post_document(bill_ref, user).await?;

    let invoice = docs
        .create_invoice(CreateInvoiceInput {
            customer_id: family.id,
            number: "TUI-2026-01".to_string(),
            invoice_date: date(2026, 1, 3)?,
            due_date: None,
            description: "January tuition".to_string(),
            ar_account_id: chart.receivable.id,
            line_items: vec![LineItemInput::new(
                "Tuition",
                Decimal::ONE,
                dec!(1200),
                chart.tuition.id,
            )],
            created_by: user,
        })
        .await?;
    let invoice_ref = DocumentRef::Invoice(invoice.id);
    docs.approve_document(invoice_ref, user, None).await?;
    docs.post_document(invoice_ref, user).await?;

    let payments = engine.payments();
    let paid = payments
        .create_payment(CreatePaymentInput {
            document: bill_ref,
            amount: dec!(310),
            payment_date: date(2026, 1, 21)?,
            method: PaymentMethod::Check,
            reference: Some("1001".to_string()),
            memo: None,
            cash_account_id: Some(chart.cash.id),
            created_by: user,
        })
        .await?;
    payments.process_payment(paid.id).await?;

    payments
        .create_payment(CreatePaymentInput {
            document: invoice_ref,
            amount: dec!(600),
            payment_date: date(2026, 1, 15)?,
            method: PaymentMethod::Ach,
            reference: None,
            memo: Some("First installment".to_string()),
            cash_account_id: Some(chart.cash.id),
            created_by: user,
        })
        .await?;
    Ok(())
}

async fn seed_recurring(engine: &Engine, chart: &Chart, user: UserId) -> anyhow::Result<()> {
    let landlord = engine
        .documents()
        .create_vendor("Maple Street Properties", Some("Net 10".to_string()))
        .await?;
    let recurring = engine.recurring();
    let template = recurring
        .create_template(CreateTemplateInput {
            name: "Building rent".to_string(),
            counterparty: Counterparty::Vendor(landlord.id),
            line_items: vec![LineItemInput::new("Rent", Decimal::ONE, dec!(3500), chart.rent.id)],
            control_account_id: chart.payable.id,
            description: "Monthly rent".to_string(),
            payment_terms: None,
            frequency: Frequency::Monthly,
            day_of_month: Some(31),
            start_date: date(2026, 1, 31)?,
            end_date: None,
            number_prefix: "RENT".to_string(),
            created_by: user,
        })
        .await?;

    for today in [date(2026, 1, 31)?, date(2026, 2, 28)?] {
        let generated = recurring.generate_from_recurring(template.id, today).await?;
        info!(
            number = %generated.document.header().number,
            next_generation_date = %generated.template.next_generation_date,
            "rent bill generated"
        );
    }
    Ok(())
}

async fn seed_reconciliation(engine: &Engine, chart: &Chart, user: UserId) -> anyhow::Result<()> {
    let recon = engine.reconciliation();
    let account = recon
        .create_bank_account(
            "Operating Checking",
            chart.cash.id,
            Some("Community Bank".to_string()),
        )
        .await?;

    let statement = [
        (date(2026, 1, 2)?, dec!(25000), "OPENING DEPOSIT"),
        (date(2026, 1, 7)?, dec!(2000), "DEPOSIT"),
        (date(2026, 1, 15)?, dec!(600), "ACH TUITION"),
        (date(2026, 1, 23)?, dec!(-310), "CHECK 1001"),
        (date(2026, 1, 31)?, dec!(-15), "SERVICE FEE"),
    ];
    recon
        .record_bank_transactions(
            statement
                .iter()
                .map(|(on, amount, description)| BankTransactionInput {
                    bank_account_id: account.id,
                    date: *on,
                    description: (*description).to_string(),
                    amount: *amount,
                    reference: None,
                })
                .collect(),
        )
        .await?;

    let reconciliation = recon
        .start_reconciliation(StartReconciliationInput {
            bank_account_id: account.id,
            period_start: date(2026, 1, 1)?,
            period_end: date(2026, 1, 31)?,
            statement_beginning_balance: Decimal::ZERO,
            statement_ending_balance: dec!(27275),
            started_by: user,
        })
        .await?;

    let lines = recon.auto_match(reconciliation.id).await?;
    for line in lines.iter().filter(|l| l.amount == dec!(-15)) {
        recon
            .exclude_transaction(
                reconciliation.id,
                line.id,
                AdjustmentKind::BankFee,
                "Monthly service fee",
            )
            .await?;
    }

    let summary = recon.reconciliation_summary(reconciliation.id).await?;
    info!(
        summary = %serde_json::to_string(&summary)?,
        "reconciliation summary"
    );
    if summary.is_balanced() && summary.counts.outstanding() == 0 {
        recon.complete_reconciliation(reconciliation.id, user).await?;
    }
    Ok(())
}
