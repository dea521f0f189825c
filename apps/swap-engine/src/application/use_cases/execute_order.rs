//! Execute Order Use Case
//!
//! Drives one order through its lifecycle: routing across venues, computing
//! the slippage-protected floor, executing the chosen swap, and confirming or
//! failing the record. Every state entered is persisted and broadcast before
//! the pipeline proceeds.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::application::ports::{
    OrderRepositoryPort, RepositoryError, StatusDetail, StatusEvent, StatusPublisherPort,
};
use crate::application::services::{QuoteRouter, RouterError, RoutingDecision};
use crate::domain::order::{Order, OrderError, OrderSpec, OrderStatus};

/// Errors surfaced by the execution pipeline.
///
/// Whatever fails mid-pipeline is recorded on the order (status `FAILED`,
/// message persisted) and then re-raised so the worker pool's retry policy
/// can act on it.
#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    /// Lifecycle violation or unsupported order type.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Routing or venue execution failure.
    #[error(transparent)]
    Router(#[from] RouterError),

    /// Persistence failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Use case executing one queued order end to end.
pub struct ExecuteOrderUseCase<R, P>
where
    R: OrderRepositoryPort,
    P: StatusPublisherPort,
{
    repository: Arc<R>,
    publisher: Arc<P>,
    router: Arc<QuoteRouter>,
    slippage_tolerance: Decimal,
}

impl<R, P> ExecuteOrderUseCase<R, P>
where
    R: OrderRepositoryPort,
    P: StatusPublisherPort,
{
    /// Create the use case.
    ///
    /// `slippage_tolerance` is the fraction shaved off the best quote's
    /// output to form `min_amount_out` (0.01 = accept up to 1% less).
    pub fn new(
        repository: Arc<R>,
        publisher: Arc<P>,
        router: Arc<QuoteRouter>,
        slippage_tolerance: Decimal,
    ) -> Self {
        Self {
            repository,
            publisher,
            router,
            slippage_tolerance,
        }
    }

    /// Run the full pipeline for one queued order.
    ///
    /// Re-entrant: a redelivered order restarts from scratch (fresh quotes,
    /// fresh execution attempt) — there is no mid-pipeline checkpoint.
    ///
    /// # Errors
    ///
    /// Any pipeline failure is persisted on the order and re-raised for the
    /// caller's retry policy.
    pub async fn execute(&self, spec: &OrderSpec) -> Result<(), ExecuteError> {
        let mut order = self.load(spec).await?;

        tracing::info!(order_id = %order.order_id, order_type = %order.order_type, "starting order execution");

        match self.run_pipeline(&mut order).await {
            Ok(()) => {
                tracing::info!(order_id = %order.order_id, "order execution completed");
                Ok(())
            }
            Err(error) => {
                self.mark_failed(&mut order, &error).await;
                Err(error)
            }
        }
    }

    async fn load(&self, spec: &OrderSpec) -> Result<Order, ExecuteError> {
        self.repository
            .find_by_id(&spec.order_id)
            .await?
            .ok_or_else(|| {
                ExecuteError::Repository(RepositoryError::NotFound {
                    order_id: spec.order_id.to_string(),
                })
            })
    }

    async fn run_pipeline(&self, order: &mut Order) -> Result<(), ExecuteError> {
        // PENDING: redelivered orders re-enter here from FAILED.
        if order.status == OrderStatus::Failed {
            order.reset_for_retry()?;
        }
        self.persist(order).await?;
        self.publisher.publish(StatusEvent::plain(
            order.order_id.clone(),
            OrderStatus::Pending,
        ));

        // ROUTING: only market orders proceed past this gate.
        order.begin_routing()?;
        self.persist(order).await?;
        self.publisher.publish(StatusEvent::plain(
            order.order_id.clone(),
            OrderStatus::Routing,
        ));

        if !order.order_type.is_market() {
            return Err(OrderError::UnsupportedOrderType {
                order_type: order.order_type,
            }
            .into());
        }

        let decision = self
            .router
            .best_quote(&order.token_in, &order.token_out, order.amount_in)
            .await?;
        order.record_routing(&decision.quotes, &decision.best)?;
        self.persist(order).await?;
        self.publish_routing(order, &decision);

        // BUILDING: local computation of the slippage-protected floor.
        order.begin_building()?;
        self.persist(order).await?;
        self.publisher.publish(StatusEvent::plain(
            order.order_id.clone(),
            OrderStatus::Building,
        ));
        let min_amount_out =
            decision.best.amount_out * (Decimal::ONE - self.slippage_tolerance);

        // SUBMITTED: dispatch to the selected venue.
        order.begin_submission()?;
        self.persist(order).await?;
        self.publisher.publish(StatusEvent::plain(
            order.order_id.clone(),
            OrderStatus::Submitted,
        ));

        let receipt = self
            .router
            .execute_swap(
                &decision.best.venue,
                &order.token_in,
                &order.token_out,
                order.amount_in,
                min_amount_out,
            )
            .await?;

        // CONFIRMED
        order.confirm(receipt.clone())?;
        self.persist(order).await?;
        self.publisher.publish(StatusEvent::with_detail(
            order.order_id.clone(),
            OrderStatus::Confirmed,
            StatusDetail::Confirmed {
                tx_ref: receipt.tx_ref,
                executed_price: receipt.executed_price,
                amount_out: receipt.amount_out,
            },
        ));

        Ok(())
    }

    fn publish_routing(&self, order: &Order, decision: &RoutingDecision) {
        self.publisher.publish(StatusEvent::with_detail(
            order.order_id.clone(),
            OrderStatus::Routing,
            StatusDetail::Routing {
                quotes: order.quoted_prices.clone(),
                venue_selected: decision.best.venue.clone(),
            },
        ));
    }

    async fn persist(&self, order: &Order) -> Result<(), RepositoryError> {
        self.repository.update(order).await
    }

    /// Record the failure before re-raising it to the worker pool.
    async fn mark_failed(&self, order: &mut Order, error: &ExecuteError) {
        let message = error.to_string();
        tracing::error!(order_id = %order.order_id, error = %message, "order execution failed");

        if order.fail(&message).is_err() {
            // Already terminal; nothing left to record.
            return;
        }
        if let Err(persist_error) = self.repository.update(order).await {
            tracing::error!(
                order_id = %order.order_id,
                error = %persist_error,
                "failed to persist FAILED status"
            );
        }
        self.publisher.publish(StatusEvent::with_detail(
            order.order_id.clone(),
            OrderStatus::Failed,
            StatusDetail::Failed { error: message },
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::{Mutex, RwLock};

    use crate::application::ports::{OrderFilter, VenueError, VenuePort};
    use crate::domain::order::{OrderType, Quote, SwapReceipt, VenueId};
    use crate::domain::shared::{OrderId, Symbol, TxRef};

    #[derive(Default)]
    struct FakeRepository {
        orders: RwLock<HashMap<String, Order>>,
    }

    impl FakeRepository {
        fn seed(&self, order: Order) {
            self.orders
                .write()
                .unwrap()
                .insert(order.order_id.to_string(), order);
        }

        fn get(&self, order_id: &str) -> Order {
            self.orders.read().unwrap()[order_id].clone()
        }
    }

    #[async_trait]
    impl OrderRepositoryPort for FakeRepository {
        async fn create(&self, order: &Order) -> Result<(), RepositoryError> {
            self.seed(order.clone());
            Ok(())
        }

        async fn update(&self, order: &Order) -> Result<(), RepositoryError> {
            let mut orders = self.orders.write().unwrap();
            if !orders.contains_key(order.order_id.as_str()) {
                return Err(RepositoryError::NotFound {
                    order_id: order.order_id.to_string(),
                });
            }
            orders.insert(order.order_id.to_string(), order.clone());
            Ok(())
        }

        async fn find_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, RepositoryError> {
            Ok(self.orders.read().unwrap().get(order_id.as_str()).cloned())
        }

        async fn delete(&self, order_id: &OrderId) -> Result<(), RepositoryError> {
            self.orders.write().unwrap().remove(order_id.as_str());
            Ok(())
        }

        async fn list(
            &self,
            _filter: &OrderFilter,
            _limit: usize,
            _offset: usize,
        ) -> Result<(Vec<Order>, usize), RepositoryError> {
            Ok((Vec::new(), 0))
        }
    }

    #[derive(Default)]
    struct CollectingPublisher {
        events: Mutex<Vec<StatusEvent>>,
    }

    impl CollectingPublisher {
        fn statuses(&self) -> Vec<OrderStatus> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .map(|event| event.status)
                .collect()
        }
    }

    impl StatusPublisherPort for CollectingPublisher {
        fn publish(&self, event: StatusEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    /// Venue stub quoting one amount and settling another.
    struct SplitVenue {
        id: VenueId,
        quote_out: Decimal,
        settle_out: Decimal,
    }

    impl SplitVenue {
        fn new(id: &str, quote_out: Decimal, settle_out: Decimal) -> Arc<Self> {
            Arc::new(Self {
                id: VenueId::new(id),
                quote_out,
                settle_out,
            })
        }
    }

    #[async_trait]
    impl VenuePort for SplitVenue {
        fn id(&self) -> &VenueId {
            &self.id
        }

        async fn get_quote(
            &self,
            _token_in: &Symbol,
            _token_out: &Symbol,
            amount_in: Decimal,
        ) -> Result<Quote, VenueError> {
            Ok(Quote {
                venue: self.id.clone(),
                price: self.quote_out / amount_in,
                amount_out: self.quote_out,
                fee: dec!(0.0025),
                slippage: dec!(0.001),
                timestamp: Utc::now(),
            })
        }

        async fn execute_swap(
            &self,
            _token_in: &Symbol,
            _token_out: &Symbol,
            amount_in: Decimal,
            min_amount_out: Decimal,
        ) -> Result<SwapReceipt, VenueError> {
            if self.settle_out < min_amount_out {
                return Err(VenueError::SlippageExceeded {
                    amount_out: self.settle_out,
                    min_amount_out,
                });
            }
            Ok(SwapReceipt {
                tx_ref: TxRef::new(format!("tx-{}", self.id)),
                executed_price: self.settle_out / amount_in,
                amount_out: self.settle_out,
            })
        }
    }

    fn spec(order_type: OrderType) -> OrderSpec {
        OrderSpec {
            order_id: OrderId::new("ord-1"),
            order_type,
            token_in: Symbol::new("SOL"),
            token_out: Symbol::new("USDC"),
            amount_in: dec!(10),
            user_id: None,
        }
    }

    fn use_case(
        venues: Vec<Arc<dyn VenuePort>>,
    ) -> (
        ExecuteOrderUseCase<FakeRepository, CollectingPublisher>,
        Arc<FakeRepository>,
        Arc<CollectingPublisher>,
    ) {
        let repository = Arc::new(FakeRepository::default());
        let publisher = Arc::new(CollectingPublisher::default());
        let router = Arc::new(QuoteRouter::new(venues));
        let use_case = ExecuteOrderUseCase::new(
            Arc::clone(&repository),
            Arc::clone(&publisher),
            router,
            dec!(0.01),
        );
        (use_case, repository, publisher)
    }

    #[tokio::test]
    async fn market_order_walks_the_full_lifecycle() {
        let (use_case, repository, publisher) = use_case(vec![
            SplitVenue::new("orca", dec!(990), dec!(990)),
            SplitVenue::new("phoenix", dec!(995), dec!(995)),
        ]);
        let spec = spec(OrderType::Market);
        repository.seed(Order::new(spec.clone()));

        use_case.execute(&spec).await.unwrap();

        assert_eq!(
            publisher.statuses(),
            vec![
                OrderStatus::Pending,
                OrderStatus::Routing,
                OrderStatus::Routing, // routing decision carries the quote detail
                OrderStatus::Building,
                OrderStatus::Submitted,
                OrderStatus::Confirmed,
            ]
        );

        let order = repository.get("ord-1");
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.venue_selected, Some(VenueId::new("phoenix")));
        assert_eq!(order.quoted_prices.len(), 2);
        assert_eq!(order.amount_out, Some(dec!(995)));
        assert!(order.tx_ref.is_some());
    }

    #[tokio::test]
    async fn limit_order_fails_in_routing_as_unsupported() {
        let (use_case, repository, publisher) =
            use_case(vec![SplitVenue::new("orca", dec!(990), dec!(990))]);
        let spec = spec(OrderType::Limit);
        repository.seed(Order::new(spec.clone()));

        let error = use_case.execute(&spec).await.unwrap_err();
        assert!(error.to_string().contains("not supported"));

        let order = repository.get("ord-1");
        assert_eq!(order.status, OrderStatus::Failed);
        assert!(order.error.unwrap().contains("not supported"));
        assert_eq!(publisher.statuses().last(), Some(&OrderStatus::Failed));
    }

    #[tokio::test]
    async fn slippage_failure_leaves_no_tx_ref() {
        // Quote promises 1000 out; settlement only delivers 900, below the
        // 1%-tolerance floor of 990.
        let (use_case, repository, _publisher) =
            use_case(vec![SplitVenue::new("orca", dec!(1000), dec!(900))]);
        let spec = spec(OrderType::Market);
        repository.seed(Order::new(spec.clone()));

        let error = use_case.execute(&spec).await.unwrap_err();
        assert!(matches!(
            error,
            ExecuteError::Router(RouterError::Venue(VenueError::SlippageExceeded { .. }))
        ));

        let order = repository.get("ord-1");
        assert_eq!(order.status, OrderStatus::Failed);
        assert!(order.tx_ref.is_none());
        assert!(order.executed_price.is_none());
    }

    #[tokio::test]
    async fn redelivered_failed_order_runs_again_from_scratch() {
        let (use_case, repository, _publisher) =
            use_case(vec![SplitVenue::new("orca", dec!(990), dec!(990))]);
        let spec = spec(OrderType::Market);
        let mut failed = Order::new(spec.clone());
        failed.fail("transient venue error").unwrap();
        repository.seed(failed);

        use_case.execute(&spec).await.unwrap();

        let order = repository.get("ord-1");
        assert_eq!(order.status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn unknown_order_id_is_a_repository_error() {
        let (use_case, _repository, _publisher) =
            use_case(vec![SplitVenue::new("orca", dec!(990), dec!(990))]);

        let error = use_case.execute(&spec(OrderType::Market)).await.unwrap_err();
        assert!(matches!(
            error,
            ExecuteError::Repository(RepositoryError::NotFound { .. })
        ));
    }
}
