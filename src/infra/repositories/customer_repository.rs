//! Customer registry storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::customer::{self, ActiveModel, Entity as CustomerEntity};
use crate::domain::{Customer, CustomerChanges, NewCustomer};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerFilter {
    /// Substring of the name or phone number
    pub search: Option<String>,
    pub include_inactive: bool,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Customer>>;

    /// One page of customers ordered by name, plus the total match count
    async fn list(
        &self,
        filter: CustomerFilter,
        params: PaginationParams,
    ) -> AppResult<(Vec<Customer>, u64)>;

    async fn create(&self, customer: NewCustomer) -> AppResult<Customer>;

    async fn update(&self, id: Uuid, changes: CustomerChanges) -> AppResult<Customer>;

    async fn set_active(&self, id: Uuid, active: bool) -> AppResult<Customer>;

    /// Bump the order aggregates in one statement
    async fn record_order(&self, id: Uuid, amount: Decimal, at: DateTime<Utc>) -> AppResult<()>;
}

pub struct CustomerStore {
    db: DatabaseConnection,
}

impl CustomerStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load(&self, id: Uuid) -> AppResult<customer::Model> {
        CustomerEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found("Customer")
    }
}

#[async_trait]
impl CustomerRepository for CustomerStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Customer>> {
        let result = CustomerEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Customer::from))
    }

    async fn list(
        &self,
        filter: CustomerFilter,
        params: PaginationParams,
    ) -> AppResult<(Vec<Customer>, u64)> {
        let mut query = CustomerEntity::find();
        if !filter.include_inactive {
            query = query.filter(customer::Column::IsActive.eq(true));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(customer::Column::Name.contains(search))
                    .add(customer::Column::Phone.contains(search)),
            );
        }

        let paginator = query
            .order_by_asc(customer::Column::Name)
            .paginate(&self.db, params.limit());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(params.page() - 1).await?;

        Ok((models.into_iter().map(Customer::from).collect(), total))
    }

    async fn create(&self, customer: NewCustomer) -> AppResult<Customer> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(customer.name),
            phone: Set(customer.phone),
            email: Set(customer.email),
            notes: Set(customer.notes),
            is_active: Set(true),
            order_count: Set(0),
            total_spent_amount: Set(Decimal::ZERO),
            last_order_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await.map_err(AppError::from)?;
        Ok(Customer::from(model))
    }

    async fn update(&self, id: Uuid, changes: CustomerChanges) -> AppResult<Customer> {
        let mut active: ActiveModel = self.load(id).await?.into();

        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(phone);
        }
        if let Some(email) = changes.email {
            active.email = Set(Some(email).filter(|e| !e.is_empty()));
        }
        if let Some(notes) = changes.notes {
            active.notes = Set(Some(notes).filter(|n| !n.is_empty()));
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(Customer::from(model))
    }

    async fn set_active(&self, id: Uuid, active_flag: bool) -> AppResult<Customer> {
        let mut active: ActiveModel = self.load(id).await?.into();
        active.is_active = Set(active_flag);
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(Customer::from(model))
    }

    async fn record_order(&self, id: Uuid, amount: Decimal, at: DateTime<Utc>) -> AppResult<()> {
        let result = CustomerEntity::update_many()
            .col_expr(
                customer::Column::OrderCount,
                Expr::col(customer::Column::OrderCount).add(1),
            )
            .col_expr(
                customer::Column::TotalSpentAmount,
                Expr::col(customer::Column::TotalSpentAmount).add(amount),
            )
            .col_expr(customer::Column::LastOrderAt, Expr::value(at))
            .col_expr(customer::Column::UpdatedAt, Expr::value(at))
            .filter(customer::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::not_found("Customer"));
        }
        Ok(())
    }
}
