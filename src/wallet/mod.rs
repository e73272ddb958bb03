pub mod address;
pub mod fee;
pub mod keypair;

pub use address::{format_address, is_valid_solana_address};
pub use fee::{calculate_fee, FeeBreakdown, FeePolicy, LAMPORTS_PER_SOL};
pub use keypair::{KeySource, KeypairWallet};
