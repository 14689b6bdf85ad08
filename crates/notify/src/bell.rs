//! Terminal bell fallback.

use std::io::{self, Write};

/// Writes BEL to stdout. Most terminals beep or flash on it.
pub fn ring() {
    let mut stdout = io::stdout();
    let _ = stdout.write_all(b"\x07");
    let _ = stdout.flush();
}
