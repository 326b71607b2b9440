//! HTTP request handlers

pub mod error;
pub mod health;
pub mod rpc;
pub mod wallet;
