pub mod auth;
pub mod derived;
pub mod error;
pub mod fields;
pub mod ports;
pub mod repo;
pub mod service;
pub mod validation;
