//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `voicewall_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("voicewall_core version={}", voicewall_core::core_version());
    println!(
        "voicewall_core schema={}",
        voicewall_core::db::migrations::latest_version()
    );
}
