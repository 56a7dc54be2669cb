//! Check a csexp document and mirror it:
//! - Canonical bytes on stdout, i.e. a re-encoding of the input
//! - Debug on stderr - the internal representation from the `csexp` crate.
//!
//! Exits with an error if the input is not exactly one canonical S-expression.
//!
//! ```ignore
//! <input.csexp csexp >output.csexp
//! ```

use std::io::{Read, Write};

fn main() -> std::io::Result<()> {
    // install global collector configured based on RUST_LOG env var.
    tracing_subscriber::fmt::init();

    let mut input = Vec::new();
    std::io::stdin().lock().read_to_end(&mut input)?;

    let value = csexp::decode(&input)?;
    eprintln!("{:?}", value);

    let mut stdout = std::io::stdout().lock();
    value.write_to(&mut stdout)?;
    stdout.flush()
}
