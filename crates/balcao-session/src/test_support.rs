//! In-memory fakes shared by the session tests.
//!
//! `MemStore` records every write and can inject a one-shot failure via
//! `fail_next_write`, which is how the persist-then-commit contract is
//! exercised.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime, Utc};

use balcao_core::{
    CashMovement, CashRegister, CustomerCredit, Operator, Product, Promotion, PromotionKind,
    UnitOfMeasure,
};

use crate::ports::{
    AuditEvent, AuditSink, Catalog, Customers, PortError, SaleRecord, TransactionStore,
};

// =============================================================================
// Builders
// =============================================================================

/// Installs a compact subscriber so `RUST_LOG=debug cargo test` shows the
/// session's tracing output. Safe to call from any number of tests.
pub(crate) fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub(crate) fn operator() -> Operator {
    Operator {
        id: "op-1".to_string(),
        name: "Ana".to_string(),
    }
}

pub(crate) fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 6, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

pub(crate) fn product(id: &str, price_cents: i64) -> Product {
    Product {
        id: id.to_string(),
        name: format!("Product {}", id),
        category_id: Some("cat-1".to_string()),
        price_cents,
        unit: UnitOfMeasure::Each,
        is_weighted: false,
        stock: 1000,
        min_stock: 0,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub(crate) fn weighted_product(id: &str, price_per_kilo_cents: i64) -> Product {
    let mut p = product(id, price_per_kilo_cents);
    p.unit = UnitOfMeasure::Kilogram;
    p.is_weighted = true;
    p.stock = 100_000;
    p
}

pub(crate) fn percentage_promotion(id: &str, bps: i64) -> Promotion {
    Promotion {
        id: id.to_string(),
        name: format!("Promo {}", id),
        kind: PromotionKind::Percentage,
        value: bps,
        buy_quantity: None,
        get_quantity: None,
        min_quantity: None,
        min_value_cents: None,
        max_discount_cents: None,
        max_rate_bps: None,
        start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
        start_time: None,
        end_time: None,
        days_of_week: None,
        product_ids: vec![],
        category_ids: vec![],
        priority: 0,
        is_cumulative: false,
        is_active: true,
    }
}

pub(crate) fn customer(id: &str, limit_cents: i64, debt_cents: i64) -> CustomerCredit {
    CustomerCredit {
        customer_id: id.to_string(),
        credit_limit_cents: limit_cents,
        current_debt_cents: debt_cents,
    }
}

// =============================================================================
// Fake Catalog
// =============================================================================

pub(crate) struct MemCatalog {
    products: HashMap<String, Product>,
    promotions: Vec<Promotion>,
}

impl MemCatalog {
    pub(crate) fn new(products: Vec<Product>, promotions: Vec<Promotion>) -> Self {
        MemCatalog {
            products: products.into_iter().map(|p| (p.id.clone(), p)).collect(),
            promotions,
        }
    }
}

impl Catalog for MemCatalog {
    async fn get_product(&self, id: &str) -> Result<Product, PortError> {
        self.products.get(id).cloned().ok_or_else(|| PortError::NotFound {
            entity: "Product".to_string(),
            id: id.to_string(),
        })
    }

    async fn list_active_promotions(
        &self,
        _now: NaiveDateTime,
    ) -> Result<Vec<Promotion>, PortError> {
        Ok(self.promotions.clone())
    }
}

// =============================================================================
// Fake Customers
// =============================================================================

pub(crate) struct MemCustomers {
    credits: HashMap<String, CustomerCredit>,
}

impl MemCustomers {
    pub(crate) fn new(credits: Vec<CustomerCredit>) -> Self {
        MemCustomers {
            credits: credits
                .into_iter()
                .map(|c| (c.customer_id.clone(), c))
                .collect(),
        }
    }
}

impl Customers for MemCustomers {
    async fn get_customer_credit(&self, id: &str) -> Result<CustomerCredit, PortError> {
        self.credits.get(id).cloned().ok_or_else(|| PortError::NotFound {
            entity: "Customer".to_string(),
            id: id.to_string(),
        })
    }
}

// =============================================================================
// Fake Transaction Store
// =============================================================================

#[derive(Default)]
pub(crate) struct MemStore {
    sales: Mutex<Vec<SaleRecord>>,
    movements: Mutex<Vec<CashMovement>>,
    opens: Mutex<Vec<CashRegister>>,
    closes: Mutex<Vec<CashRegister>>,
    fail_next: AtomicBool,
}

impl MemStore {
    pub(crate) fn new() -> Self {
        MemStore::default()
    }

    /// Makes the next write fail with `PortError::Unavailable`.
    pub(crate) fn fail_next_write(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn check_fail(&self) -> Result<(), PortError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            Err(PortError::Unavailable("injected failure".to_string()))
        } else {
            Ok(())
        }
    }

    pub(crate) fn sales(&self) -> Vec<SaleRecord> {
        self.sales.lock().unwrap().clone()
    }

    pub(crate) fn movements(&self) -> Vec<CashMovement> {
        self.movements.lock().unwrap().clone()
    }

    pub(crate) fn opens(&self) -> Vec<CashRegister> {
        self.opens.lock().unwrap().clone()
    }

    pub(crate) fn closes(&self) -> Vec<CashRegister> {
        self.closes.lock().unwrap().clone()
    }
}

impl TransactionStore for MemStore {
    async fn record_sale(&self, sale: &SaleRecord) -> Result<(), PortError> {
        self.check_fail()?;
        self.sales.lock().unwrap().push(sale.clone());
        Ok(())
    }

    async fn record_cash_movement(&self, movement: &CashMovement) -> Result<(), PortError> {
        self.check_fail()?;
        self.movements.lock().unwrap().push(movement.clone());
        Ok(())
    }

    async fn record_register_open(&self, register: &CashRegister) -> Result<(), PortError> {
        self.check_fail()?;
        self.opens.lock().unwrap().push(register.clone());
        Ok(())
    }

    async fn record_register_close(&self, register: &CashRegister) -> Result<(), PortError> {
        self.check_fail()?;
        self.closes.lock().unwrap().push(register.clone());
        Ok(())
    }
}

impl TransactionStore for Arc<MemStore> {
    async fn record_sale(&self, sale: &SaleRecord) -> Result<(), PortError> {
        (**self).record_sale(sale).await
    }

    async fn record_cash_movement(&self, movement: &CashMovement) -> Result<(), PortError> {
        (**self).record_cash_movement(movement).await
    }

    async fn record_register_open(&self, register: &CashRegister) -> Result<(), PortError> {
        (**self).record_register_open(register).await
    }

    async fn record_register_close(&self, register: &CashRegister) -> Result<(), PortError> {
        (**self).record_register_close(register).await
    }
}

// =============================================================================
// Fake Audit Sink
// =============================================================================

#[derive(Default)]
pub(crate) struct MemAudit {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemAudit {
    pub(crate) fn new() -> Self {
        MemAudit::default()
    }

    pub(crate) fn actions(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.action.clone())
            .collect()
    }
}

impl AuditSink for MemAudit {
    fn log_event(&self, event: AuditEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl AuditSink for Arc<MemAudit> {
    fn log_event(&self, event: AuditEvent) {
        (**self).log_event(event);
    }
}
