pub mod anthropic;
pub mod proxy;

pub use proxy::ProxyClient;
