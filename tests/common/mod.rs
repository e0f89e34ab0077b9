#![allow(dead_code)]

pub mod command;
pub mod file;

/// Temp files land next to the target dir so tests never depend on /tmp
const PLAYGROUND: &str = "../playground";

pub fn redirect_temp_dir() {
    let playground = std::path::Path::new(PLAYGROUND);
    if !playground.exists() {
        std::fs::create_dir_all(playground).expect("playground dir");
    }

    // The spawned binary resolves TMPDIR against its own working directory,
    // so hand it an absolute path
    let absolute = playground.canonicalize().expect("playground path");
    unsafe {
        std::env::set_var("TMPDIR", absolute);
    }
}
