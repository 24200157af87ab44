//! Shared fixtures for service tests.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::password::hash_password;
use crate::domain::{
    Actor, Customer, PriceItem, PriceProfile, PriceProfileKind, Product, Seller, SellerRole,
    Session,
};
use crate::infra::{
    CustomerRepository, MockCustomerRepository, MockOrderRepository,
    MockPriceProfileRepository, MockProductRepository, MockSellerRepository,
    MockSessionRepository, OrderRepository, PriceProfileRepository, ProductRepository,
    SellerRepository, SessionRepository, UnitOfWork,
};

/// UnitOfWork over mock repositories. Unconfigured mocks panic when called.
#[derive(Default)]
pub(crate) struct TestUnitOfWork {
    sellers: MockSellerRepository,
    sessions: MockSessionRepository,
    products: MockProductRepository,
    price_profiles: MockPriceProfileRepository,
    customers: MockCustomerRepository,
    orders: MockOrderRepository,
}

impl TestUnitOfWork {
    pub fn with_sellers(mut self, repo: MockSellerRepository) -> Self {
        self.sellers = repo;
        self
    }

    pub fn with_sessions(mut self, repo: MockSessionRepository) -> Self {
        self.sessions = repo;
        self
    }

    pub fn with_products(mut self, repo: MockProductRepository) -> Self {
        self.products = repo;
        self
    }

    pub fn with_price_profiles(mut self, repo: MockPriceProfileRepository) -> Self {
        self.price_profiles = repo;
        self
    }

    pub fn with_customers(mut self, repo: MockCustomerRepository) -> Self {
        self.customers = repo;
        self
    }

    pub fn with_orders(mut self, repo: MockOrderRepository) -> Self {
        self.orders = repo;
        self
    }

    pub fn build(self) -> Arc<BuiltUnitOfWork> {
        Arc::new(BuiltUnitOfWork {
            sellers: Arc::new(self.sellers),
            sessions: Arc::new(self.sessions),
            products: Arc::new(self.products),
            price_profiles: Arc::new(self.price_profiles),
            customers: Arc::new(self.customers),
            orders: Arc::new(self.orders),
        })
    }
}

pub(crate) struct BuiltUnitOfWork {
    sellers: Arc<MockSellerRepository>,
    sessions: Arc<MockSessionRepository>,
    products: Arc<MockProductRepository>,
    price_profiles: Arc<MockPriceProfileRepository>,
    customers: Arc<MockCustomerRepository>,
    orders: Arc<MockOrderRepository>,
}

impl UnitOfWork for BuiltUnitOfWork {
    fn sellers(&self) -> Arc<dyn SellerRepository> {
        self.sellers.clone()
    }

    fn sessions(&self) -> Arc<dyn SessionRepository> {
        self.sessions.clone()
    }

    fn products(&self) -> Arc<dyn ProductRepository> {
        self.products.clone()
    }

    fn price_profiles(&self) -> Arc<dyn PriceProfileRepository> {
        self.price_profiles.clone()
    }

    fn customers(&self) -> Arc<dyn CustomerRepository> {
        self.customers.clone()
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        self.orders.clone()
    }
}

pub(crate) fn seller(role: SellerRole, password: &str) -> Seller {
    let now = Utc::now();
    Seller {
        id: Uuid::new_v4(),
        username: "lan".to_string(),
        display_name: "Lan".to_string(),
        role,
        is_enabled: true,
        password_hash: hash_password(password).expect("hash"),
        must_change_password: false,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn actor(role: SellerRole) -> Actor {
    Actor {
        seller_id: Uuid::new_v4(),
        role,
    }
}

pub(crate) fn session_for(seller_id: Uuid, token_hash: &str) -> Session {
    let now = Utc::now();
    Session {
        id: Uuid::new_v4(),
        seller_id,
        token_hash: token_hash.to_string(),
        expires_at: now + Duration::days(14),
        last_seen_at: now,
        created_at: now,
        user_agent: None,
        ip_address: None,
    }
}

pub(crate) fn product(name: &str) -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::new_v4(),
        name: name.to_string(),
        unit: "kg".to_string(),
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn profile(
    kind: PriceProfileKind,
    seller_id: Option<Uuid>,
    prices: &[(Uuid, i64)],
) -> PriceProfile {
    let now = Utc::now();
    PriceProfile {
        id: Uuid::new_v4(),
        kind,
        name: format!("{} profile", kind),
        seller_id,
        effective_from: now,
        is_active: true,
        items: prices
            .iter()
            .map(|(product_id, price)| PriceItem {
                product_id: *product_id,
                product_name: "Trà Thái".to_string(),
                price_per_kg: Decimal::from(*price),
            })
            .collect(),
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn customer(is_active: bool) -> Customer {
    let now = Utc::now();
    Customer {
        id: Uuid::new_v4(),
        name: "Chị Hoa".to_string(),
        phone: "0912345678".to_string(),
        email: None,
        notes: None,
        is_active,
        order_count: 0,
        total_spent_amount: Decimal::ZERO,
        last_order_at: None,
        created_at: now,
        updated_at: now,
    }
}
