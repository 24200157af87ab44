//! Customer registry service.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Customer, CustomerChanges, NewCustomer};
use crate::errors::{AppResult, OptionExt};
use crate::infra::{CustomerFilter, UnitOfWork};
use crate::types::PaginationParams;

#[async_trait]
pub trait CustomerService: Send + Sync {
    async fn list(
        &self,
        filter: CustomerFilter,
        params: PaginationParams,
    ) -> AppResult<(Vec<Customer>, u64)>;

    async fn get(&self, id: Uuid) -> AppResult<Customer>;

    async fn create(&self, customer: NewCustomer) -> AppResult<Customer>;

    async fn update(&self, id: Uuid, changes: CustomerChanges) -> AppResult<Customer>;

    async fn deactivate(&self, id: Uuid) -> AppResult<Customer>;
}

pub struct CustomerRegistry<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CustomerRegistry<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> CustomerService for CustomerRegistry<U> {
    async fn list(
        &self,
        filter: CustomerFilter,
        params: PaginationParams,
    ) -> AppResult<(Vec<Customer>, u64)> {
        self.uow.customers().list(filter, params).await
    }

    async fn get(&self, id: Uuid) -> AppResult<Customer> {
        self.uow
            .customers()
            .find_by_id(id)
            .await?
            .ok_or_not_found("Customer")
    }

    async fn create(&self, customer: NewCustomer) -> AppResult<Customer> {
        let customer = self.uow.customers().create(customer.normalized()?).await?;
        tracing::info!(customer_id = %customer.id, "Customer created");
        Ok(customer)
    }

    async fn update(&self, id: Uuid, changes: CustomerChanges) -> AppResult<Customer> {
        self.uow.customers().update(id, changes.normalized()?).await
    }

    async fn deactivate(&self, id: Uuid) -> AppResult<Customer> {
        let customer = self.uow.customers().set_active(id, false).await?;
        tracing::info!(customer_id = %id, "Customer deactivated");
        Ok(customer)
    }
}
