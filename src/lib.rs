pub mod auction;
pub mod bidding;
pub mod config;
pub mod handlers;
pub mod identity;
pub mod message_broker;
pub mod query;
pub mod scheduler;
pub mod store;
