use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output();

    let fallback = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();

    let version = match output {
        Ok(o) if o.status.success() => {
            let git_output = String::from_utf8(o.stdout)
                .unwrap_or_default()
                .trim()
                .to_string();

            // Strip 'v' prefix if present (e.g., "v1.0.0" -> "1.0.0")
            let version = git_output.strip_prefix('v').unwrap_or(&git_output);

            // Bare commit hashes (no tags yet) are not useful as a version
            if version.is_empty() || !version.contains('.') {
                fallback
            } else {
                version.to_string()
            }
        }
        _ => fallback,
    };

    println!("cargo:rustc-env=PLATFORM_UPDATE_VERSION={}", version);
}
