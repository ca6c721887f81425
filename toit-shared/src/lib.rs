//! Wire types and gRPC client stubs for the toit device-management API.
//!
//! The code under `proto/` is generated from `proto/toit/**.proto` and checked in.
//! Rebuild with `RUSTFLAGS="--cfg gen_proto"` to regenerate it.

mod proto;

pub mod device;

pub use proto::toit::{api, model};
