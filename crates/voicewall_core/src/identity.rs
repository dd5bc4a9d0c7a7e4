//! Per-browser pseudo-identity.
//!
//! # Responsibility
//! - Generate and persist the stable `user_{millis}_{suffix}` identity.
//! - Hand it to callers as an explicit value; nothing reads it ambiently.
//!
//! # Invariants
//! - Generated lazily on first use, then stable for the storage lifetime.
//! - The suffix is 9 lowercase base-36 characters.

use crate::db::DbResult;
use crate::storage::kv::KvStore;
use chrono::{DateTime, Utc};
use rand::Rng;

pub const USER_ID_KEY: &str = "grafiter_userID";

const SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Returns the persisted identity, generating and storing one if absent.
pub fn ensure_user_id<S: KvStore>(kv: &mut S, now: DateTime<Utc>) -> DbResult<String> {
    if let Some(existing) = kv.get(USER_ID_KEY)? {
        if !existing.trim().is_empty() {
            return Ok(existing);
        }
    }

    let user_id = generate_user_id(now.timestamp_millis(), &mut rand::thread_rng());
    kv.put(USER_ID_KEY, &user_id)?;
    Ok(user_id)
}

/// Builds an identity string from an epoch instant and an entropy source.
pub fn generate_user_id(epoch_millis: i64, rng: &mut impl Rng) -> String {
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("user_{epoch_millis}_{suffix}")
}
