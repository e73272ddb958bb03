use serde::{Deserialize, Serialize};

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

pub const DEFAULT_FEE_COLLECTOR: &str = "7VfiZzdzFA9E6SvXfCLbe8EMWCMW1ycmVstgo42WYo4g";

/// Service fee taken out of every assisted transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeePolicy {
    pub fee_percentage: f64,
    pub fee_collector_address: String,
    pub min_fee_lamports: u64,
    pub max_fee_lamports: u64,
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            fee_percentage: 2.5,
            fee_collector_address: DEFAULT_FEE_COLLECTOR.to_string(),
            min_fee_lamports: LAMPORTS_PER_SOL / 1_000,
            max_fee_lamports: LAMPORTS_PER_SOL / 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    pub fee_percentage: f64,
    pub fee_lamports: u64,
    pub fee_sol: f64,
    pub recipient_lamports: u64,
    pub recipient_sol: f64,
    pub total_lamports: u64,
    pub total_sol: f64,
}

pub fn sol_to_lamports(sol: f64) -> Option<u64> {
    if !sol.is_finite() || sol < 0.0 {
        return None;
    }
    let lamports = (sol * LAMPORTS_PER_SOL as f64).round();
    if !lamports.is_finite() || lamports < 0.0 || lamports > u64::MAX as f64 {
        return None;
    }
    Some(lamports as u64)
}

pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Splits `amount_sol` into the recipient share and the service fee.
///
/// The fee is a percentage clamped to `[min, max]`; when that would eat the
/// whole transfer it falls back to half of it.
pub fn calculate_fee(amount_sol: f64, policy: &FeePolicy) -> FeeBreakdown {
    let total_lamports = sol_to_lamports(amount_sol).unwrap_or(0);

    let mut fee_lamports =
        (total_lamports as f64 * (policy.fee_percentage / 100.0)).floor() as u64;
    if fee_lamports < policy.min_fee_lamports {
        fee_lamports = policy.min_fee_lamports;
    } else if fee_lamports > policy.max_fee_lamports {
        fee_lamports = policy.max_fee_lamports;
    }

    if fee_lamports >= total_lamports {
        fee_lamports = total_lamports / 2;
    }

    let recipient_lamports = total_lamports - fee_lamports;

    FeeBreakdown {
        fee_percentage: policy.fee_percentage,
        fee_lamports,
        fee_sol: lamports_to_sol(fee_lamports),
        recipient_lamports,
        recipient_sol: lamports_to_sol(recipient_lamports),
        total_lamports,
        total_sol: amount_sol,
    }
}
