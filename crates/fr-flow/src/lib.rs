//! `fr-flow` — traffic-flow estimates behind a narrow interface.
//!
//! The planner never looks inside the prediction model.  It sees only the
//! [`FlowOracle`] contract: *estimate flow at sensor N near time T*.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`oracle`]  | `FlowOracle` trait, `ConstantOracle`, closure impl        |
//! | [`table`]   | `TableOracle` — lookup table, wide-CSV loader             |
//! | [`adapter`] | `FlowAdapter` — per-run cache, batching, timeouts         |
//! | [`http`]    | `HttpOracle` (feature = `"http"` only)                    |
//! | [`error`]   | `FlowError`, `FlowResult<T>`                              |
//!
//! # Feature flags
//!
//! | Flag   | Effect                                                        |
//! |--------|---------------------------------------------------------------|
//! | `http` | Enables `HttpOracle` via `reqwest`'s blocking client.         |

pub mod adapter;
pub mod error;
pub mod oracle;
pub mod table;

#[cfg(feature = "http")]
pub mod http;


pub use adapter::FlowAdapter;
pub use error::{FlowError, FlowResult};
pub use oracle::{ConstantOracle, FlowOracle};
pub use table::TableOracle;

#[cfg(feature = "http")]
pub use http::HttpOracle;
