//! Build script for sradio-player
//!
//! Stamps the binary with the git revision, build time and profile, which
//! the player logs at startup.

use std::process::Command;

fn main() {
    let revision = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|hash| hash.trim().to_string())
        .filter(|hash| !hash.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    let built_at = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=SRADIO_GIT_REVISION={}", revision);
    println!("cargo:rustc-env=SRADIO_BUILT_AT={}", built_at);
    println!("cargo:rustc-env=SRADIO_BUILD_PROFILE={}", profile);
    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=build.rs");
}
