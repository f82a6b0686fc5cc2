//! Emulated vendor APIs for end-to-end tests of the connects.
//!
//! One axum app serves all three vendors under their own prefix:
//! `/kyc`, `/rates` and `/rpc`. Responses are canned and deterministic;
//! the constants in each module name the inputs that select each path.

pub mod kyc;
pub mod rates;
pub mod rpc;

use axum::Router;
use tokio::net::TcpListener;

pub fn app() -> Router {
    Router::new()
        .nest("/kyc", kyc::router())
        .nest("/rates", rates::router())
        .nest("/rpc", rpc::router())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}
