//! A full counter day through the public terminal API: open the cash box,
//! sell, withdraw stock, restart mid-day, close.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use caja_client::{Backend, ClientError, ClientResult};
use caja_core::{
    CloseOutcome, CommitReceipt, DailyStats, Money, Product, ProductDraft, Registration,
    SaleRequest, Transaction, WithdrawalReason, WithdrawalRequest,
};
use caja_db::{KeyValueStore, MemoryKv};
use caja_terminal::commands::{cart, cash_box, product, sale, withdrawal};
use caja_terminal::error::ErrorCode;
use caja_terminal::state::TerminalConfig;
use caja_terminal::{now, Terminal};
use chrono::Utc;

/// Backend that owns stock and decrements it on commit.
struct Shop {
    products: Mutex<Vec<Product>>,
    next_id: Mutex<i64>,
}

impl Shop {
    fn new() -> Self {
        Shop {
            products: Mutex::new(vec![
                item(1, "PIS-035", "Pisco Mistral 35°", 3, 8990),
                item(2, "CER-KUN", "Kunstmann Torobayo", 24, 1500),
            ]),
            next_id: Mutex::new(0),
        }
    }

    fn take_stock(&self, lines: &[(i64, i64)]) -> ClientResult<Money> {
        let mut products = self.products.lock().unwrap();
        for (id, quantity) in lines {
            let product = products
                .iter()
                .find(|p| p.id == *id)
                .ok_or_else(|| ClientError::rejected(404, "Producto no encontrado"))?;
            if product.stock < *quantity {
                return Err(ClientError::rejected(
                    400,
                    format!("Stock insuficiente para {}", product.name),
                ));
            }
        }
        let mut value = Money::zero();
        for (id, quantity) in lines {
            if let Some(product) = products.iter_mut().find(|p| p.id == *id) {
                product.stock -= quantity;
                value += product.sale_price * *quantity;
            }
        }
        Ok(value)
    }

    fn receipt(&self, total: Money) -> CommitReceipt {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        CommitReceipt {
            id: *next_id,
            total,
            created_at: now(),
        }
    }
}

fn item(id: i64, code: &str, name: &str, stock: i64, price: i64) -> Product {
    Product {
        id,
        code: code.to_string(),
        name: name.to_string(),
        description: None,
        category: None,
        brand: None,
        purchase_price: Money::from_units(price / 2),
        sale_price: Money::from_units(price),
        stock,
        reorder_threshold: 5,
        active: true,
        volume: None,
        unit: None,
        image_url: None,
        created_at: Utc::now(),
        updated_at: None,
    }
}

#[async_trait]
impl Backend for Shop {
    async fn list_products(&self, limit: usize) -> ClientResult<Vec<Product>> {
        Ok(self.products.lock().unwrap().iter().take(limit).cloned().collect())
    }

    async fn get_product(&self, id: i64) -> ClientResult<Product> {
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| ClientError::rejected(404, "Producto no encontrado"))
    }

    async fn create_product(&self, _draft: &ProductDraft) -> ClientResult<Product> {
        Err(ClientError::rejected(405, "read-only shop"))
    }

    async fn update_product(&self, _id: i64, _draft: &ProductDraft) -> ClientResult<Product> {
        Err(ClientError::rejected(405, "read-only shop"))
    }

    async fn delete_product(&self, _id: i64) -> ClientResult<()> {
        Err(ClientError::rejected(405, "read-only shop"))
    }

    async fn submit_sale(&self, request: &SaleRequest) -> ClientResult<CommitReceipt> {
        let lines: Vec<(i64, i64)> = request
            .items
            .iter()
            .map(|i| (i.product_id, i.quantity))
            .collect();
        self.take_stock(&lines)?;
        Ok(self.receipt(request.total))
    }

    async fn submit_withdrawal(&self, request: &WithdrawalRequest) -> ClientResult<CommitReceipt> {
        let lines: Vec<(i64, i64)> = request
            .items
            .iter()
            .map(|i| (i.product_id, i.quantity))
            .collect();
        let value = self.take_stock(&lines)?;
        Ok(self.receipt(value))
    }

    async fn list_sales(&self, _limit: usize) -> ClientResult<Vec<Transaction>> {
        Ok(Vec::new())
    }

    async fn list_withdrawals(&self, _limit: usize) -> ClientResult<Vec<Transaction>> {
        Ok(Vec::new())
    }

    async fn stats(&self) -> ClientResult<DailyStats> {
        Err(ClientError::Network("not available".to_string()))
    }
}

#[tokio::test]
async fn test_counter_day() {
    let backend: Arc<dyn Backend> = Arc::new(Shop::new());
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryKv::new());
    let terminal = Terminal::new(TerminalConfig::default(), backend.clone(), store.clone())
        .await
        .unwrap();
    assert_eq!(terminal.catalog.with_snapshot(|s| s.len()), 2);

    cash_box::open_cash_box(&terminal.cash_box, Money::from_units(20000), "Marta", now())
        .await
        .unwrap();

    // Cash sale with a discount
    cart::add_code_to_sale_cart(&terminal.catalog, &terminal.sale_cart, "PIS-035").unwrap();
    cart::adjust_sale_line(&terminal.sale_cart, 1, 1).unwrap();
    cart::add_to_sale_cart(&terminal.catalog, &terminal.sale_cart, 2).unwrap();
    let view = cart::set_discount(&terminal.sale_cart, Money::from_units(-480));
    assert_eq!(view.subtotal, Money::from_units(19480));
    assert_eq!(view.total, Money::from_units(19000));

    let committed = sale::commit_sale(
        terminal.backend.as_ref(),
        &terminal.catalog,
        &terminal.sale_cart,
        &terminal.cash_box,
    )
    .await
    .unwrap();
    assert_eq!(committed.cash_box, Registration::Recorded);
    assert_eq!(product::get_product(&terminal.catalog, 1).unwrap().stock, 1);

    // Card sale
    cart::add_to_sale_cart(&terminal.catalog, &terminal.sale_cart, 2).unwrap();
    cart::adjust_sale_line(&terminal.sale_cart, 2, 1).unwrap();
    cart::set_payment_method(&terminal.sale_cart, "tarjeta").unwrap();
    sale::commit_sale(
        terminal.backend.as_ref(),
        &terminal.catalog,
        &terminal.sale_cart,
        &terminal.cash_box,
    )
    .await
    .unwrap();

    // The last pisco broke
    withdrawal::add_to_withdrawal_cart(&terminal.catalog, &terminal.withdrawal_cart, 1).unwrap();
    withdrawal::set_withdrawal_reason(&terminal.withdrawal_cart, "perdida").unwrap();
    let done = withdrawal::commit_withdrawal(
        terminal.backend.as_ref(),
        &terminal.catalog,
        &terminal.withdrawal_cart,
    )
    .await
    .unwrap();
    assert_eq!(done.reason, WithdrawalReason::Breakage);
    assert_eq!(done.receipt.total, Money::from_units(8990));

    let err = cart::add_to_sale_cart(&terminal.catalog, &terminal.sale_cart, 1).unwrap_err();
    assert_eq!(err.code, ErrorCode::ProductUnavailable);

    cash_box::withdraw_cash(&terminal.cash_box, Money::from_units(5000))
        .await
        .unwrap();

    let summary = cash_box::get_cash_box_status(&terminal.cash_box)
        .summary
        .unwrap();
    assert_eq!(summary.cash_sales, Money::from_units(19000));
    assert_eq!(summary.card_sales, Money::from_units(3000));
    assert_eq!(summary.sale_count, 2);
    assert_eq!(summary.expected_cash, Money::from_units(34000));

    // Restart mid-day: the session comes back from the store
    drop(terminal);
    let terminal = Terminal::new(TerminalConfig::default(), backend, store)
        .await
        .unwrap();
    assert_eq!(
        terminal.cash_box.expected_cash(),
        Some(Money::from_units(34000))
    );
    assert!(cart::get_sale_cart(&terminal.sale_cart).lines.is_empty());

    let record = cash_box::close_cash_box(&terminal.cash_box, Money::from_units(34000), now())
        .await
        .unwrap();
    assert_eq!(record.outcome, CloseOutcome::Balanced);
    assert_eq!(record.total_sales, Money::from_units(22000));

    let history = cash_box::get_cash_box_history(&terminal.cash_box, 10)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert!(!terminal.cash_box.is_open());
}

#[tokio::test]
async fn test_insufficient_stock_is_reported_verbatim() {
    let backend: Arc<dyn Backend> = Arc::new(Shop::new());
    let terminal = Terminal::new(
        TerminalConfig::default(),
        backend,
        Arc::new(MemoryKv::new()),
    )
    .await
    .unwrap();

    cart::add_to_sale_cart(&terminal.catalog, &terminal.sale_cart, 1).unwrap();

    // Someone else sold the stock in the meantime
    let other = caja_core::SaleRequest {
        items: vec![caja_core::SaleItemRequest {
            product_id: 1,
            quantity: 3,
            unit_price: Money::from_units(8990),
        }],
        payment_method: caja_core::PaymentMethod::Cash,
        total: Money::from_units(26970),
        discount: Money::zero(),
    };
    terminal.backend.submit_sale(&other).await.unwrap();

    let err = sale::commit_sale(
        terminal.backend.as_ref(),
        &terminal.catalog,
        &terminal.sale_cart,
        &terminal.cash_box,
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::BackendRejected);
    assert_eq!(err.message, "Stock insuficiente para Pisco Mistral 35°");
    assert_eq!(cart::get_sale_cart(&terminal.sale_cart).total_quantity, 1);
}
