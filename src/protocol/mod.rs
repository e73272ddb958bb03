pub mod extract;

pub use extract::{extract_action, parse_amount};
