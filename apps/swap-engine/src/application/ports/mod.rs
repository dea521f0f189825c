//! Application ports - interfaces implemented by infrastructure adapters.

mod queue_port;
mod repository_port;
mod status_port;
mod venue_port;

pub use queue_port::{JobQueuePort, QueueError};
pub use repository_port::{OrderFilter, OrderRepositoryPort, RepositoryError};
pub use status_port::{StatusDetail, StatusEvent, StatusPublisherPort};
pub use venue_port::{VenueError, VenuePort};
