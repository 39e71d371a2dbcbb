//! HTTP handlers

pub mod health;
pub mod auth;
pub mod dashboard;
pub mod predict;
pub mod upload;
pub mod pages;
