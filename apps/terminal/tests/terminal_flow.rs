//! Command and shell flows with the ERP replaced by in-memory fakes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use payshia_core::{
    Money, OrderRegistry, PaymentMethod, ProductVariant, StockAvailability, StockBatch,
};
use payshia_erp::{
    Catalog, ErpConfig, ErpError, ErpResult, InvoiceAck, InvoiceGateway, InvoicePayload,
    StockResolver,
};
use payshia_terminal::commands::{cart, checkout, order, stock};
use payshia_terminal::error::ErrorCode;
use payshia_terminal::shell::Shell;
use payshia_terminal::state::{ConfigState, ErpState, SessionState};

// =============================================================================
// Fakes
// =============================================================================

#[derive(Default)]
struct FakeStock {
    stock: HashMap<String, StockAvailability>,
    fail: bool,
    /// Opens another item while a lookup is in flight.
    interrupt: Mutex<Option<(SessionState, ProductVariant)>>,
}

#[async_trait]
impl StockResolver for FakeStock {
    async fn resolve(
        &self,
        variant: &ProductVariant,
        _location_id: &str,
    ) -> ErpResult<StockAvailability> {
        if let Some((session, other)) = self.interrupt.lock().unwrap().take() {
            session.with_selection_mut(|s| s.open(other));
        }
        if self.fail {
            return Err(ErpError::stock_fetch(
                &variant.sku,
                ErpError::Api {
                    status: 503,
                    message: "Stock service unavailable".into(),
                },
            ));
        }
        Ok(self.stock.get(&variant.sku).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
struct FakeGateway {
    submitted: Mutex<Vec<InvoicePayload>>,
    reject: bool,
}

#[async_trait]
impl InvoiceGateway for FakeGateway {
    async fn submit(&self, payload: &InvoicePayload) -> ErpResult<InvoiceAck> {
        if self.reject {
            return Err(ErpError::Api {
                status: 422,
                message: "Customer account is on hold".into(),
            });
        }
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push(payload.clone());
        Ok(InvoiceAck {
            invoice_id: format!("{}", 500 + submitted.len()),
            invoice_number: format!("INV-{:04}", 500 + submitted.len()),
        })
    }
}

fn tea() -> ProductVariant {
    ProductVariant::new("1", "10", "TEA-100", "Ceylon Tea 100g", Money::from_cents(1000))
}

fn sugar() -> ProductVariant {
    ProductVariant::new("2", "20", "SUG-1KG", "Sugar 1kg", Money::from_cents(2500))
}

fn tea_stock() -> StockAvailability {
    StockAvailability::new(
        8,
        vec![
            StockBatch::new("1", "10", "B-01", 3)
                .with_expiry(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()),
            StockBatch::new("1", "10", "B-02", 5)
                .with_expiry(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()),
        ],
    )
}

struct Terminal {
    session: SessionState,
    erp: ErpState,
    gateway: Arc<FakeGateway>,
}

fn terminal_with(resolver: FakeStock, gateway: FakeGateway) -> Terminal {
    let mut config = ErpConfig::default();
    config.api.receipt_url = Some("http://print.local/{invoice_number}".into());

    let gateway = Arc::new(gateway);
    let erp = ErpState::new(
        Catalog::new(vec![tea(), sugar()]),
        Arc::new(resolver),
        gateway.clone(),
        &config,
    );
    Terminal {
        session: SessionState::from_registry(OrderRegistry::new()),
        erp,
        gateway,
    }
}

fn terminal() -> Terminal {
    let resolver = FakeStock {
        stock: HashMap::from([("TEA-100".to_string(), tea_stock())]),
        ..FakeStock::default()
    };
    terminal_with(resolver, FakeGateway::default())
}

// =============================================================================
// Add-item dialog
// =============================================================================

#[tokio::test]
async fn test_dialog_preselects_soonest_expiry_and_allows_override() {
    let t = terminal();

    let opened = stock::open_item(&t.session, &t.erp, "tea-100").await.unwrap();
    assert_eq!(opened.total_stock, 8);
    assert_eq!(opened.selected_batch.as_deref(), Some("B-01"));
    assert!(opened.stock_error.is_none());

    let picked = stock::select_batch(&t.session, "B-02").unwrap();
    assert_eq!(picked.selected_batch.as_deref(), Some("B-02"));

    let cart = stock::confirm_item(&t.session, &t.erp, 4, Money::zero()).unwrap();
    assert_eq!(cart.lines.len(), 1);
    assert_eq!(cart.lines[0].batch_code, "B-02");
    assert_eq!(cart.lines[0].quantity, 4);
    assert_eq!(cart.lines[0].available, 5);
    assert_eq!(cart.totals.subtotal, Money::from_cents(4000));
    assert_eq!(cart.totals.tax, Money::from_cents(320));
    assert_eq!(cart.totals.total, Money::from_cents(4320));
}

#[tokio::test]
async fn test_confirm_above_batch_keeps_dialog_open() {
    let t = terminal();
    stock::open_item(&t.session, &t.erp, "TEA-100").await.unwrap();

    let err = stock::confirm_item(&t.session, &t.erp, 4, Money::zero()).unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientStock);
    assert!(t.session.with_selection_mut(|s| s.is_open()));

    let cart = cart::get_cart(&t.session, &t.erp).unwrap();
    assert!(cart.lines.is_empty());

    let cart = stock::confirm_item(&t.session, &t.erp, 3, Money::zero()).unwrap();
    assert_eq!(cart.lines[0].quantity, 3);
    assert!(!t.session.with_selection_mut(|s| s.is_open()));
}

#[tokio::test]
async fn test_repeat_add_merges_and_respects_ceiling() {
    let t = terminal();

    stock::add_item(&t.session, &t.erp, "TEA-100", 2, Money::zero()).await.unwrap();
    let cart = stock::add_item(&t.session, &t.erp, "TEA-100", 1, Money::zero()).await.unwrap();
    assert_eq!(cart.lines.len(), 1);
    assert_eq!(cart.lines[0].quantity, 3);

    let err = stock::add_item(&t.session, &t.erp, "TEA-100", 1, Money::zero())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientStock);

    let cart = cart::get_cart(&t.session, &t.erp).unwrap();
    assert_eq!(cart.lines[0].quantity, 3);
}

#[tokio::test]
async fn test_stock_failure_shows_zero_and_blocks_confirm() {
    let resolver = FakeStock {
        fail: true,
        ..FakeStock::default()
    };
    let t = terminal_with(resolver, FakeGateway::default());

    let opened = stock::open_item(&t.session, &t.erp, "TEA-100").await.unwrap();
    assert_eq!(opened.total_stock, 0);
    assert!(opened.batches.is_empty());
    assert!(opened.stock_error.unwrap().contains("TEA-100"));

    let err = stock::confirm_item(&t.session, &t.erp, 1, Money::zero()).unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientStock);

    let err = stock::add_item(&t.session, &t.erp, "TEA-100", 1, Money::zero())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::StockUnavailable);
}

#[tokio::test]
async fn test_stale_stock_response_is_dropped() {
    let session = SessionState::new();
    // The resolver opens SUG-1KG while TEA-100's lookup is in flight.
    let resolver = FakeStock {
        stock: HashMap::from([("TEA-100".to_string(), tea_stock())]),
        interrupt: Mutex::new(Some((session.clone(), sugar()))),
        ..FakeStock::default()
    };
    let erp = ErpState::new(
        Catalog::new(vec![tea(), sugar()]),
        Arc::new(resolver),
        Arc::new(FakeGateway::default()),
        &ErpConfig::default(),
    );

    let err = stock::open_item(&session, &erp, "TEA-100").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderError);

    let (sku, loaded) = session.with_selection_mut(|s| {
        (s.variant().map(|v| v.sku.clone()), s.stock().is_some())
    });
    assert_eq!(sku.as_deref(), Some("SUG-1KG"));
    assert!(!loaded);
}

#[tokio::test]
async fn test_unknown_sku_is_not_found() {
    let t = terminal();
    let err = stock::open_item(&t.session, &t.erp, "NOPE").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}

// =============================================================================
// Cart edits
// =============================================================================

#[tokio::test]
async fn test_quantity_edit_checks_recorded_ceiling() {
    let t = terminal();
    stock::add_item(&t.session, &t.erp, "TEA-100", 1, Money::zero()).await.unwrap();

    let cart = cart::update_quantity(&t.session, &t.erp, "TEA-100", "B-01", 3).unwrap();
    assert_eq!(cart.lines[0].quantity, 3);

    let err = cart::update_quantity(&t.session, &t.erp, "TEA-100", "B-01", 4).unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientStock);

    let cart = cart::update_quantity(&t.session, &t.erp, "TEA-100", "B-01", 0).unwrap();
    assert!(cart.lines.is_empty());

    let err = cart::remove_item(&t.session, &t.erp, "TEA-100", "B-01").unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn test_charges_and_discounts_flow_into_totals() {
    let t = terminal();
    stock::add_item(&t.session, &t.erp, "TEA-100", 2, Money::from_cents(200))
        .await
        .unwrap();

    cart::set_service_charge(&t.session, &t.erp, Money::from_cents(150)).unwrap();
    let cart = cart::set_order_discount(&t.session, &t.erp, Money::from_cents(100)).unwrap();

    // 20.00 - 2.00 = 18.00, tax 1.44, + 1.50 service - 1.00 discount
    assert_eq!(cart.totals.after_item_discounts, Money::from_cents(1800));
    assert_eq!(cart.totals.tax, Money::from_cents(144));
    assert_eq!(cart.totals.total, Money::from_cents(1994));

    let err = cart::set_order_discount(&t.session, &t.erp, Money::from_cents(-1)).unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn test_park_and_resume_keep_lines() {
    let t = terminal();
    stock::add_item(&t.session, &t.erp, "TEA-100", 2, Money::zero()).await.unwrap();

    let parked = order::park_order(&t.session, &t.erp).unwrap();
    assert_eq!(parked.parked.name, "Order 1");
    assert_eq!(parked.parked.line_count, 1);
    assert_eq!(parked.cart.order_name, "Order 2");
    assert!(parked.cart.lines.is_empty());

    let orders = order::list_orders(&t.session, &t.erp).unwrap();
    assert_eq!(orders.len(), 2);
    assert!(orders[1].current);

    let resumed = order::select_order(&t.session, &t.erp, "1").unwrap();
    assert_eq!(resumed.order_name, "Order 1");
    assert_eq!(resumed.lines[0].quantity, 2);

    let err = order::select_order(&t.session, &t.erp, "1").unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderError);

    let err = order::select_order(&t.session, &t.erp, "9").unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn test_clear_replaces_last_order() {
    let t = terminal();
    let cleared = order::clear_order(&t.session, &t.erp).unwrap();
    assert_eq!(cleared.cleared, "Order 1");
    assert_eq!(cleared.cart.order_name, "Order 2");
    assert_eq!(t.session.with_registry(|r| r.len()), 1);
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn test_pay_cash_submits_and_removes_order() {
    let t = terminal();
    stock::add_item(&t.session, &t.erp, "TEA-100", 2, Money::zero()).await.unwrap();

    let receipt = checkout::pay(
        &t.session,
        &t.erp,
        PaymentMethod::Cash,
        Some(Money::from_cents(5000)),
    )
    .await
    .unwrap();

    assert_eq!(receipt.invoice_number, "INV-0501");
    assert_eq!(receipt.totals.total, Money::from_cents(2160));
    assert_eq!(receipt.change, Money::from_cents(2840));
    assert_eq!(receipt.print_url.as_deref(), Some("http://print.local/INV-0501"));

    let submitted = t.gateway.submitted.lock().unwrap();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].invoice_status, 1);
    assert_eq!(submitted[0].items[0].patch_code, "B-01");
    drop(submitted);

    let cart = cart::get_cart(&t.session, &t.erp).unwrap();
    assert_eq!(cart.order_name, "Order 2");
    assert_eq!(t.session.with_registry(|r| r.len()), 1);
}

#[tokio::test]
async fn test_hold_sends_pending_invoice() {
    let t = terminal();
    stock::add_item(&t.session, &t.erp, "TEA-100", 1, Money::zero()).await.unwrap();

    let receipt = checkout::hold(&t.session, &t.erp).await.unwrap();
    assert!(receipt.payment_method.is_none());
    assert_eq!(t.gateway.submitted.lock().unwrap()[0].invoice_status, 2);
}

#[tokio::test]
async fn test_rejected_checkout_keeps_order() {
    let gateway = FakeGateway {
        reject: true,
        ..FakeGateway::default()
    };
    let resolver = FakeStock {
        stock: HashMap::from([("TEA-100".to_string(), tea_stock())]),
        ..FakeStock::default()
    };
    let t = terminal_with(resolver, gateway);
    stock::add_item(&t.session, &t.erp, "TEA-100", 1, Money::zero()).await.unwrap();

    let err = checkout::pay(&t.session, &t.erp, PaymentMethod::Card, None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::BackendError);
    assert!(err.message.contains("Customer account is on hold"));

    let cart = cart::get_cart(&t.session, &t.erp).unwrap();
    assert_eq!(cart.order_name, "Order 1");
    assert_eq!(cart.lines.len(), 1);
}

#[tokio::test]
async fn test_empty_order_checkout_is_rejected_locally() {
    let t = terminal();
    let err = checkout::pay(&t.session, &t.erp, PaymentMethod::Card, None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CheckoutRejected);
    assert!(t.gateway.submitted.lock().unwrap().is_empty());
}

// =============================================================================
// Shell
// =============================================================================

#[tokio::test]
async fn test_shell_session() {
    let t = terminal();
    let display = ConfigState::default();
    let shell = Shell::new(&t.session, &t.erp, &display);

    let input: &[u8] = b"add TEA-100 2\n\
        qty TEA-100 B-01 99\n\
        bogus\n\
        park\n\
        select 1\n\
        pay cash 50\n\
        quit\n\
        new\n";
    let mut output = Vec::new();
    shell.run(input, &mut output).await.unwrap();
    let output = String::from_utf8(output).unwrap();

    assert!(output.contains("Ceylon Tea 100g"));
    assert!(output.contains("! [INSUFFICIENT_STOCK]"));
    assert!(output.contains("! [VALIDATION_ERROR] Unknown command 'bogus'"));
    assert!(output.contains("Parked Order 1"));
    assert!(output.contains("Invoice INV-0501 paid (cash)"));
    assert!(output.contains("change Rs. 28.40"));

    // Order 1 was invoiced, Order 2 is still parked, Order 3 replaced the
    // invoiced one. The `new` after `quit` never ran.
    let names: Vec<String> = t
        .session
        .with_registry(|r| r.orders().iter().map(|o| o.name().to_string()).collect());
    assert_eq!(names, vec!["Order 2".to_string(), "Order 3".to_string()]);
}

#[tokio::test]
async fn test_shell_refuses_amounts_that_overflow_totals() {
    let t = terminal();
    let display = ConfigState::default();
    let shell = Shell::new(&t.session, &t.erp, &display);

    let input: &[u8] = b"add TEA-100 1\n\
        service 92233720368547758\n\
        discount 92233720368547758.99\n\
        totals\n";
    let mut output = Vec::new();
    shell.run(input, &mut output).await.unwrap();
    let output = String::from_utf8(output).unwrap();

    assert_eq!(output.matches("! [VALIDATION_ERROR]").count(), 2);
    let (service, discount) = t.session.with_registry(|r| {
        let order = r.current().unwrap();
        (order.service_charge(), order.order_discount())
    });
    assert_eq!(service, Money::zero());
    assert_eq!(discount, Money::zero());
}
