//! Data model: `Order`, `Driver`, `Cluster`, `ClusterRoute`, and the
//! assignment result type, grounded on
//! `original_source/app/models/{order,driver,cluster}.py` and
//! `original_source/app/schemas/cluster.py`, with JSON-typed columns
//! modelled as tagged structs the way `stateset-api`'s entity models and
//! `caspers-universe`'s context schemas represent semi-structured fields.

pub mod order;
pub mod driver;
pub mod cluster;
pub mod route;
pub mod assignment;

pub use order::{DeliveryAddress, Items, Order, OrderId, OrderStatus};
pub use driver::{Driver, DriverId, DriverStatus};
pub use cluster::{Cluster, ClusterId, ClusterStatus};
pub use route::{ClusterRoute, DeliveryStep, RouteSegment};
pub use assignment::{AssignmentOutcome, ClusterDeferral, DriverAssignment};
