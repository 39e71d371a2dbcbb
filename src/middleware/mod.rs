//! HTTP middleware

pub mod session;
