use std::env;
use std::path::PathBuf;

// Records the checkout a binary was built from so `find_repo_root` can prefer
// its scripts/jsonCompletion.lua over the embedded copy during development.
fn main() {
    println!("cargo:rerun-if-env-changed=LAINSCRIPT_ROOT_HINT");
    println!("cargo:rerun-if-changed=scripts/jsonCompletion.lua");
    println!("cargo:rerun-if-changed=schemas/lain_conf.schema.json");

    let hint = env::var("LAINSCRIPT_ROOT_HINT")
        .ok()
        .or_else(|| env::var("CARGO_MANIFEST_DIR").ok());

    if let Some(raw_hint) = hint {
        let candidate = PathBuf::from(raw_hint);
        let canonical = candidate.canonicalize().unwrap_or(candidate);

        println!(
            "cargo:rustc-env=LAINSCRIPT_ROOT_HINT={}",
            canonical.display()
        );
    }
}
