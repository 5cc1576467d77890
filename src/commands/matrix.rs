//! Command: print the host capability matrix.
use crate::matrix;

/// Print the capability matrix to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    print!("{}", matrix::render_table());
}
