pub mod api;
pub mod food;
pub mod health;
pub mod metrics;
pub mod middleware;
pub mod order;

pub use api::{create_api_router, ApiError, ApiState};
pub use health::health_check;
pub use metrics::metrics_handler;
pub use middleware::{json_error_middleware, not_found_handler, security_headers_middleware};
