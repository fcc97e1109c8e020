//! Verification code generation.
//!
//! Codes are `HUB-` plus five symbols drawn uniformly from the 36-symbol
//! uppercase base-36 alphabet, with fresh randomness per call — never
//! derived from the display name, the clock, or a prior code. Collisions
//! between attempts for different identities are tolerable: a code is
//! only ever matched against the one motto it was issued for.

use hub_core::{VerificationCode, CODE_PREFIX, CODE_SYMBOLS};
use rand::Rng;

/// The visually unambiguous-enough alphabet codes are drawn from.
const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Draw a fresh verification code.
pub fn generate_code() -> VerificationCode {
    let mut rng = rand::thread_rng();
    let mut code = String::with_capacity(CODE_PREFIX.len() + CODE_SYMBOLS);
    code.push_str(CODE_PREFIX);
    for _ in 0..CODE_SYMBOLS {
        let idx = rng.gen_range(0..ALPHABET.len());
        code.push(ALPHABET[idx] as char);
    }
    VerificationCode::new(code).expect("generated codes are well-formed by construction")
}
