use std::env;

fn main() {
    let version = env::var("EMOTION_LENS_VERSION")
        .unwrap_or_else(|_| env::var("CARGO_PKG_VERSION").unwrap());
    println!("cargo:rustc-env=EMOTION_LENS_VERSION={version}");
}
