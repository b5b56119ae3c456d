//! # HTTP Gateway
//!
//! JSON API over the submission store and aggregation engine:
//!
//! - `GET  /health`
//! - `GET  /api/crossadmit`: all comparisons, or one by `?id=<slug>`, or raw
//!   submissions for `?university1=&university2=`
//! - `GET  /api/crossadmit/majors?university1=&university2=`
//! - `POST /api/crossadmit`: register a new submission

mod server;

pub use server::{GatewayState, SharedGateway, router as gateway_router, run as run_gateway};
