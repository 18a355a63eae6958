//! Command: print version information.

/// Print the configshift version to stdout.
pub fn run() {
    println!("configshift {}", super::version());
}
