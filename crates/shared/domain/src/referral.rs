//! Referral codes and referral rewards.

use rand::Rng;

use crate::constants::{REFERRAL_CODE_ALPHABET, REFERRAL_CODE_LENGTH, REFERRAL_REWARD_POINTS};
use crate::user::UserId;

/// Draw a referral code of `REFERRAL_CODE_LENGTH` characters over `A-Z0-9`.
///
/// Uniqueness against existing accounts is checked by the caller.
pub fn generate_referral_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..REFERRAL_CODE_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..REFERRAL_CODE_ALPHABET.len());
            char::from(REFERRAL_CODE_ALPHABET[idx])
        })
        .collect()
}

/// Points owed to a referrer, applied atomically with the referred insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferralCredit {
    pub referrer_id: UserId,
    pub points: u32,
}

impl ReferralCredit {
    /// Standard reward for bringing in a new account
    pub fn reward(referrer_id: UserId) -> Self {
        Self {
            referrer_id,
            points: REFERRAL_REWARD_POINTS,
        }
    }
}
