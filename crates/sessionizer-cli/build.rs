//! Stamps `sessionizer --version` with the commit and date it was built from.
//!
//! Release tarballs carry no `.git`, so packagers may pass the commit in
//! `SESSIONIZER_GIT_HASH` instead.

use std::process::Command;

const HASH_OVERRIDE: &str = "SESSIONIZER_GIT_HASH";

fn git_short_hash() -> Option<String> {
    if let Ok(hash) = std::env::var(HASH_OVERRIDE) {
        return Some(hash).filter(|h| !h.is_empty());
    }
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())?;
    let hash = String::from_utf8(output.stdout).ok()?;
    Some(hash.trim().to_string()).filter(|h| !h.is_empty())
}

fn main() {
    let hash = git_short_hash().unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=GIT_HASH={}", hash);
    println!(
        "cargo:rustc-env=BUILD_DATE={}",
        chrono::Utc::now().format("%Y-%m-%d")
    );

    println!("cargo:rerun-if-env-changed={}", HASH_OVERRIDE);
    // The workspace root is two levels up from this crate.
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=../../.git/refs/heads/");
}
