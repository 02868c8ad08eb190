use std::process::Command;

/// Short git SHA of the workspace checkout, or "unknown" outside git.
fn git_short_sha(repo_root: &str) -> String {
    Command::new("git")
        .args(["-C", repo_root, "rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let repo_root = format!("{manifest_dir}/..");

    println!("cargo:rerun-if-changed={repo_root}/.git/HEAD");
    println!("cargo:rustc-env=SIFT_BUILD_SHA={}", git_short_sha(&repo_root));
}
