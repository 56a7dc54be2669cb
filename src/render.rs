use std::collections::VecDeque;

use dot_writer::{Attributes, DotWriter, Shape};

use crate::data::Value;

fn node_for_id(id: usize) -> String {
    format!("value_{id}")
}

/// Escape atom contents to go into a record label.
fn escape_label(bytes: &[u8]) -> String {
    // Double-escape: once to make the bytes printable,
    // again so the escapes survive the quoted label.
    let esc1 = bytes.escape_ascii().to_string();
    let mut esc2 = esc1.replace('\\', r#"\\"#).replace('"', r#"\""#);
    for special in ['{', '}', '|', '<', '>'] {
        esc2 = esc2.replace(special, &format!(r#"\{special}"#));
    }
    esc2
}

/// Render a value tree as a Graphviz graph.
///
/// Atoms are records of their length and contents; lists are circles,
/// with edges to each of their children in order.
pub fn render_value(value: &Value) -> Vec<u8> {
    let mut outbuf = Vec::new();
    {
        let mut writer = DotWriter::from(&mut outbuf);
        let mut graph = writer.digraph();
        let mut queue = VecDeque::new();
        let mut next_id = 0;
        queue.push_back((next_id, value));
        next_id += 1;

        while let Some((id, it)) = queue.pop_front() {
            let name = node_for_id(id);
            let mut node = graph.node_named(&name);
            match it {
                Value::Atom(bytes) => {
                    node.set_shape(Shape::Record);
                    node.set_label(&format!("{{{}|{}}}", bytes.len(), escape_label(bytes)));
                }
                Value::List(children) => {
                    node.set_shape(Shape::Circle);
                    node.set_label("()");
                    std::mem::drop(node);
                    for child in children {
                        let child_id = next_id;
                        next_id += 1;
                        graph.edge(&name, node_for_id(child_id));
                        queue.push_back((child_id, child));
                    }
                }
            }
        }
    }
    outbuf
}

/// Keep the DOT source in a temporary file, and log where it is.
pub fn save_graph(graph: &[u8]) -> std::io::Result<std::path::PathBuf> {
    use std::io::Write;

    let mut f = tempfile::Builder::new().suffix(".dot").tempfile()?;
    f.write_all(graph)?;
    let (_, pathbuf) = f.keep()?;
    tracing::info!("DOT source in {}", pathbuf.display());
    Ok(pathbuf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_record_specials() {
        assert_eq!(escape_label(b"abc"), "abc");
        assert_eq!(escape_label(b"{a|b}"), r#"\{a\|b\}"#);
        assert_eq!(escape_label(b"\"q\""), r#"\\\"q\\\""#);
        assert_eq!(escape_label(b"\xff"), r#"\\xff"#);
    }

    #[test]
    fn renders_tree() {
        let value = Value::list([
            Value::from("foo"),
            Value::list([Value::from("bar"), Value::from("baz")]),
        ]);
        let out = String::from_utf8(render_value(&value)).unwrap();
        assert!(out.starts_with("digraph"), "{out}");
        assert_eq!(out.matches("->").count(), 4, "{out}");
        assert!(out.contains("value_4"), "{out}");
        assert!(!out.contains("value_5"), "{out}");
        assert!(out.contains("3|foo"), "{out}");
    }

    #[test]
    fn renders_single_atom() {
        let out = String::from_utf8(render_value(&Value::atom(""))).unwrap();
        assert!(out.contains("value_0"), "{out}");
        assert!(!out.contains("->"), "{out}");
    }

    #[test]
    fn saves_graph() -> std::io::Result<()> {
        let graph = render_value(&Value::atom("x"));
        let path = save_graph(&graph)?;
        let saved = std::fs::read(&path)?;
        std::fs::remove_file(&path)?;
        assert_eq!(saved, graph);
        Ok(())
    }
}
