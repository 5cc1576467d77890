//! Command: print version information.

/// Print the kitt version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    let version = option_env!("KITT_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    println!("kitt {version}");
}
