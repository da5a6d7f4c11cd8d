//! Dependency injection: service wiring

mod service_container;

pub use service_container::{Boundaries, ServiceContainer};
