//! Mode routing

pub mod server;

pub use server::{run_server, run_server_until};
