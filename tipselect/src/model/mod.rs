pub mod message;
pub mod tip_pool;
