//! In-memory order store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::application::ports::{OrderFilter, OrderRepositoryPort, RepositoryError};
use crate::domain::order::Order;
use crate::domain::shared::OrderId;

/// In-memory implementation of `OrderRepositoryPort`.
///
/// The engine only depends on the repository contract; swapping in a real
/// database is a deployment concern.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<HashMap<String, Order>>,
}

impl InMemoryOrderStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Order>> {
        self.orders
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Order>> {
        self.orders
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl OrderRepositoryPort for InMemoryOrderStore {
    async fn create(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut orders = self.write();
        if orders.contains_key(order.order_id.as_str()) {
            return Err(RepositoryError::Duplicate {
                order_id: order.order_id.to_string(),
            });
        }
        orders.insert(order.order_id.to_string(), order.clone());
        Ok(())
    }

    async fn update(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut orders = self.write();
        if !orders.contains_key(order.order_id.as_str()) {
            return Err(RepositoryError::NotFound {
                order_id: order.order_id.to_string(),
            });
        }
        orders.insert(order.order_id.to_string(), order.clone());
        Ok(())
    }

    async fn find_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.read().get(order_id.as_str()).cloned())
    }

    async fn delete(&self, order_id: &OrderId) -> Result<(), RepositoryError> {
        self.write()
            .remove(order_id.as_str())
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound {
                order_id: order_id.to_string(),
            })
    }

    async fn list(
        &self,
        filter: &OrderFilter,
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<Order>, usize), RepositoryError> {
        let orders = self.read();
        let mut matching: Vec<Order> = orders
            .values()
            .filter(|order| filter.status.is_none_or(|status| order.status == status))
            .cloned()
            .collect();
        // Newest first, stable across equal timestamps by id.
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.order_id.as_str().cmp(b.order_id.as_str()))
        });

        let total = matching.len();
        let page = matching.into_iter().skip(offset).take(limit).collect();
        Ok((page, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::domain::order::{OrderSpec, OrderStatus, OrderType};
    use crate::domain::shared::Symbol;

    fn order(order_id: &str) -> Order {
        Order::new(OrderSpec {
            order_id: OrderId::new(order_id),
            order_type: OrderType::Market,
            token_in: Symbol::new("SOL"),
            token_out: Symbol::new("USDC"),
            amount_in: dec!(10),
            user_id: None,
        })
    }

    #[tokio::test]
    async fn create_and_find_by_id() {
        let store = InMemoryOrderStore::new();
        store.create(&order("ord-1")).await.unwrap();

        let found = store.find_by_id(&OrderId::new("ord-1")).await.unwrap();
        assert!(found.is_some());
        assert!(store.find_by_id(&OrderId::new("missing")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_rejects_duplicates() {
        let store = InMemoryOrderStore::new();
        store.create(&order("ord-1")).await.unwrap();

        let result = store.create(&order("ord-1")).await;
        assert!(matches!(result, Err(RepositoryError::Duplicate { .. })));
    }

    #[tokio::test]
    async fn update_requires_an_existing_record() {
        let store = InMemoryOrderStore::new();
        let result = store.update(&order("ord-ghost")).await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));

        let mut existing = order("ord-1");
        store.create(&existing).await.unwrap();
        existing.begin_routing().unwrap();
        store.update(&existing).await.unwrap();

        let stored = store.find_by_id(&OrderId::new("ord-1")).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Routing);
    }

    #[tokio::test]
    async fn delete_removes_the_record() {
        let store = InMemoryOrderStore::new();
        store.create(&order("ord-1")).await.unwrap();

        store.delete(&OrderId::new("ord-1")).await.unwrap();
        assert!(store.is_empty());
        assert!(store.delete(&OrderId::new("ord-1")).await.is_err());
    }

    #[tokio::test]
    async fn list_filters_and_paginates() {
        let store = InMemoryOrderStore::new();
        for index in 0..5 {
            store.create(&order(&format!("ord-{index}"))).await.unwrap();
        }
        let mut failed = order("ord-failed");
        failed.fail("boom").unwrap();
        store.create(&failed).await.unwrap();

        let (all, total) = store.list(&OrderFilter::default(), 10, 0).await.unwrap();
        assert_eq!(total, 6);
        assert_eq!(all.len(), 6);

        let (page, total) = store.list(&OrderFilter::default(), 2, 2).await.unwrap();
        assert_eq!(total, 6);
        assert_eq!(page.len(), 2);

        let filter = OrderFilter {
            status: Some(OrderStatus::Failed),
        };
        let (failed_only, total) = store.list(&filter, 10, 0).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(failed_only[0].order_id, OrderId::new("ord-failed"));
    }
}
