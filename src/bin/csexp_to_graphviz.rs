//! Render a csexp document as Graphviz.
//!
//! Usage:
//!
//! ```ignore
//! <input.csexp csexp_to_graphviz | dot -T png >output.png
//! ```
//!
//! Set `CSEXP_SAVE_GRAPH` to also keep the DOT source in a temporary file.

use std::io::{stdout, Read, Write};

pub fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let mut input: Vec<u8> = Default::default();
    std::io::stdin().read_to_end(&mut input)?;
    let value = csexp::decode(&input)?;
    let out = csexp::render_value(&value);
    if std::env::var_os("CSEXP_SAVE_GRAPH").is_some() {
        csexp::save_graph(&out)?;
    }
    stdout().write_all(&out)
}
