pub mod adapters;
pub mod security;
pub mod storage;
