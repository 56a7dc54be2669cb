//! Assemble a tree of values from a stream of tokens.

use crate::data::Value;

use super::{
    token::{Token, TokenOffset},
    DecodeError, ReadResult,
};

/// Consume tokens up to the end of input, producing the single top-level value.
pub fn parse<'a>(tokens: impl IntoIterator<Item = ReadResult<TokenOffset<'a>>>) -> ReadResult<Value> {
    // Expressions at the top level of the document.
    let mut top_level: Vec<Value> = Vec::new();
    // A stack of incomplete lists, by depth.
    // A list is linked into its parent when it is closed; until then, the parent
    // can't receive any other children, so the order is the same as the input.
    let mut open: Vec<Vec<Value>> = Vec::new();

    let mut end = 0;
    for token in tokens {
        let TokenOffset { token, offset } = token?;
        end = offset;
        tracing::trace!("token at {offset}: {token:?}");
        match token {
            Token::LParen => open.push(Vec::new()),
            Token::RParen => {
                let Some(children) = open.pop() else {
                    return Err(DecodeError::UnbalancedParentheses { offset, depth: 0 });
                };
                innermost(&mut open, &mut top_level).push(Value::List(children));
            }
            Token::Atom(bytes) => {
                innermost(&mut open, &mut top_level).push(Value::Atom(bytes.to_vec()))
            }
            Token::End => return finish(open, top_level, offset),
        }
    }

    // Tokens ran out without an explicit end; treat it as one.
    finish(open, top_level, end)
}

/// The list that new values go into: the innermost open one, else the top level.
fn innermost<'s>(open: &'s mut Vec<Vec<Value>>, top_level: &'s mut Vec<Value>) -> &'s mut Vec<Value> {
    open.last_mut().unwrap_or(top_level)
}

/// Check the state of the stack at end of input, and extract the result.
fn finish(open: Vec<Vec<Value>>, mut top_level: Vec<Value>, offset: usize) -> ReadResult<Value> {
    if !open.is_empty() {
        return Err(DecodeError::UnbalancedParentheses {
            offset,
            depth: open.len(),
        });
    }
    match (top_level.pop(), top_level.len()) {
        (Some(value), 0) => Ok(value),
        (None, _) => Err(DecodeError::MalformedTopLevel { count: 0 }),
        (Some(_), rest) => Err(DecodeError::MalformedTopLevel { count: rest + 1 }),
    }
}
