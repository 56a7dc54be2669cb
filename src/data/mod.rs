//! csexp data types.
//!
//! A document is a tree of [`Value`]s: byte-string atoms and lists of values.
//! Every value owns its children outright; there is no sharing between trees.
//!
//! The canonical encoding of a value is unique:
//! -   An atom is its length in decimal ASCII, a colon, then the raw bytes.
//! -   A list is `(`, the encoding of each child in order, then `)`.
//!

use std::convert::Infallible;
use std::io::Write;

use crate::reader::{decode, DecodeError};

/// A canonical S-expression.
///
/// Trees may be nested arbitrarily deep. Drop, comparison, cloning and
/// rendering all walk the tree with a heap-allocated stack, never the call stack.
pub enum Value {
    /// An arbitrary byte string, possibly empty.
    Atom(Vec<u8>),
    /// An ordered sequence of values, possibly empty.
    List(Vec<Value>),
}

/// One step of a depth-first walk over a value, in encoding order.
enum Walk<'a> {
    Atom(&'a [u8]),
    Open,
    Close,
}

impl Value {
    /// Construct an atom from raw bytes.
    pub fn atom(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Atom(bytes.into())
    }

    /// Construct a list from its children, in order.
    pub fn list(children: impl IntoIterator<Item = Value>) -> Self {
        Value::List(children.into_iter().collect())
    }

    pub fn is_atom(&self) -> bool {
        matches!(self, Value::Atom(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// The bytes of an atom, or None for a list.
    pub fn as_atom(&self) -> Option<&[u8]> {
        match self {
            Value::Atom(bytes) => Some(bytes),
            Value::List(_) => None,
        }
    }

    /// The children of a list, or None for an atom.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::Atom(_) => None,
            Value::List(children) => Some(children),
        }
    }

    /// Visit the value depth-first, stopping at the first error from `visit`.
    fn walk<'a, E>(&'a self, mut visit: impl FnMut(Walk<'a>) -> Result<(), E>) -> Result<(), E> {
        // Children still to visit, for each list we're inside of.
        let mut stack: Vec<std::slice::Iter<'a, Value>> = Vec::new();
        let mut next = Some(self);
        loop {
            match next.take() {
                Some(Value::Atom(bytes)) => visit(Walk::Atom(bytes))?,
                Some(Value::List(children)) => {
                    visit(Walk::Open)?;
                    stack.push(children.iter());
                }
                None => (),
            }
            let Some(top) = stack.last_mut() else {
                return Ok(());
            };
            match top.next() {
                Some(child) => next = Some(child),
                None => {
                    stack.pop();
                    visit(Walk::Close)?;
                }
            }
        }
    }

    /// Walk with a visitor that can't fail.
    fn walk_all<'a>(&'a self, mut visit: impl FnMut(Walk<'a>)) {
        self.walk(|step| -> Result<(), Infallible> {
            visit(step);
            Ok(())
        })
        .unwrap_or_else(|never| match never {})
    }

    /// Number of bytes in the canonical encoding of this value.
    pub fn encoded_len(&self) -> usize {
        let mut len = 0;
        self.walk_all(|step| {
            len += match step {
                Walk::Atom(bytes) => decimal_digits(bytes.len()) + 1 + bytes.len(),
                Walk::Open | Walk::Close => 1,
            }
        });
        len
    }

    /// Render to canonical bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.walk_all(|step| match step {
            Walk::Atom(bytes) => {
                out.extend_from_slice(bytes.len().to_string().as_bytes());
                out.push(b':');
                out.extend_from_slice(bytes);
            }
            Walk::Open => out.push(b'('),
            Walk::Close => out.push(b')'),
        });
        out
    }

    /// Write the canonical encoding to the sink, piece by piece.
    pub fn write_to(&self, out: &mut impl Write) -> std::io::Result<()> {
        self.walk(|step| match step {
            Walk::Atom(bytes) => {
                write!(out, "{}:", bytes.len())?;
                out.write_all(bytes)
            }
            Walk::Open => out.write_all(b"("),
            Walk::Close => out.write_all(b")"),
        })
    }
}

fn decimal_digits(n: usize) -> usize {
    n.checked_ilog10().map_or(1, |d| d as usize + 1)
}

impl Drop for Value {
    fn drop(&mut self) {
        let Value::List(children) = self else {
            return;
        };
        if children.iter().all(Value::is_atom) {
            return;
        }
        // Flatten the subtree onto the heap, so each value is dropped with no children left.
        let mut pending = std::mem::take(children);
        while let Some(mut child) = pending.pop() {
            if let Value::List(grandchildren) = &mut child {
                pending.append(grandchildren);
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some(pair) = pending.pop() {
            match pair {
                (Value::Atom(a), Value::Atom(b)) => {
                    if a != b {
                        return false;
                    }
                }
                (Value::List(a), Value::List(b)) => {
                    if a.len() != b.len() {
                        return false;
                    }
                    pending.extend(a.iter().zip(b.iter()));
                }
                _ => return false,
            }
        }
        true
    }
}

impl Eq for Value {}

impl Clone for Value {
    fn clone(&self) -> Self {
        // Rebuild with the same stack discipline as the reader.
        let mut top_level = Vec::with_capacity(1);
        let mut open: Vec<Vec<Value>> = Vec::new();
        self.walk_all(|step| match step {
            Walk::Atom(bytes) => open
                .last_mut()
                .unwrap_or(&mut top_level)
                .push(Value::Atom(bytes.to_vec())),
            Walk::Open => open.push(Vec::new()),
            Walk::Close => {
                if let Some(children) = open.pop() {
                    open.last_mut()
                        .unwrap_or(&mut top_level)
                        .push(Value::List(children));
                }
            }
        });
        // The walk closes every list it opens, so exactly one value is left.
        top_level.pop().unwrap_or(Value::List(Vec::new()))
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Siblings need a separator; the first child of a list doesn't.
        let mut first = true;
        self.walk(|step| {
            if !first && !matches!(step, Walk::Close) {
                write!(f, ", ")?;
            }
            first = matches!(step, Walk::Open);
            match step {
                Walk::Atom(bytes) => write!(f, "Atom(b\"{}\")", bytes.escape_ascii()),
                Walk::Open => write!(f, "List(["),
                Walk::Close => write!(f, "])"),
            }
        })
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Atom(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Atom(value.to_vec())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Atom(value.as_bytes().to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        Value::list(iter)
    }
}

/// Canonical form, with atom contents converted lossily to UTF-8.
/// Only for diagnostics: the output is not canonical if any atom is not UTF-8.
impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.walk(|step| match step {
            Walk::Atom(bytes) => write!(f, "{}:{}", bytes.len(), String::from_utf8_lossy(bytes)),
            Walk::Open => write!(f, "("),
            Walk::Close => write!(f, ")"),
        })
    }
}

impl std::str::FromStr for Value {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s.as_bytes())
    }
}
