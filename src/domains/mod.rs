pub mod action;
pub mod message;
pub mod snapshot;
