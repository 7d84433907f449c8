fn main() {
    set_git_revision_hash();
}

/// Expose the short git hash of the build as `FASTSPEED_BUILD_GIT_HASH`,
/// used in the user agent sent to the test servers.
fn set_git_revision_hash() {
    use std::process::Command;

    let args = &["rev-parse", "--short=10", "HEAD"];
    let Ok(output) = Command::new("git").args(args).output() else { return };
    let rev = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if rev.is_empty() {
        return;
    }
    println!("cargo:rustc-env=FASTSPEED_BUILD_GIT_HASH={}", rev);
}
