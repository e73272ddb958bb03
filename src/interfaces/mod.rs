pub mod chain;
pub mod proxy;
pub mod scheduler;
pub mod wallet;
