pub mod handlers;
pub mod middleware;
pub mod orchestrator;
pub mod payout;
pub mod routes;
pub mod workers;

pub use routes::create_router;
