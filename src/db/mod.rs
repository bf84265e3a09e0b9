pub mod allocation_repository;
pub mod connection;
pub mod transaction_repository;
