pub mod dispatcher;
pub mod session;
pub mod slot_refresh;
pub mod transcript;
pub mod turn;
