pub mod analysis;
pub mod api;
pub mod assembler;
pub mod catalog;
pub mod collector;
pub mod poller;
pub mod prelude;
pub mod shared;
pub mod store;
