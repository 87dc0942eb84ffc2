//! Shared test utilities for eoslog integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Nothing here touches the network; transports are faked
//! through [`fake_transport`].

pub mod assertions;
pub mod builders;
pub mod fake_transport;
pub mod fixtures;

pub use builders::*;
pub use fake_transport::*;
pub use fixtures::*;
