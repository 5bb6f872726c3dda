//! HTTP REST API interface (C11).
//!
//! - `common`: the `ApiResponse` envelope and `ValidatedJson` extractor
//! - `modules`: one `dto`/`handlers` pair per route group
//! - `router`: wires `AppState` and every route together

pub mod common;
pub mod modules;
pub mod router;

pub use router::{build_router, AppState};
