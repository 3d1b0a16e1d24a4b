//! OpenPGP secrets engine: named key pairs plus encrypt, decrypt, sign
//! and verify operations, exposed through a routable path registry.

pub mod adapters;
pub mod backend;
pub mod cli;
pub mod config;
pub mod core;

pub use backend::Backend;
pub use backend::framework::{Operation, Request, Response};
pub use crate::core::context::{CancellationToken, RequestContext};
pub use crate::core::errors::{PgpVaultError, Result};
