//! Copy to the system clipboard through the terminal (OSC 52).

use std::io::{self, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Escape sequence asking the terminal to put `text` on the clipboard
pub fn copy_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}

pub fn copy_to_terminal<W: Write>(writer: &mut W, text: &str) -> io::Result<()> {
    writer.write_all(copy_sequence(text).as_bytes())?;
    writer.flush()
}
