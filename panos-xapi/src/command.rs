//! Conversion of operational command lines into the XML form the API accepts.
//!
//! `show system info` becomes `<show><system><info/></system></show>`. Words
//! open nested elements; a double-quoted token, or any token that cannot be an
//! element name (`2024/01/31`, `10:00:00`), becomes text of the innermost
//! element instead:
//!
//! ```text
//! request system software install version "10.2.4"
//! <request><system><software><install><version>10.2.4</version></install></software></system></request>
//! ```

use thiserror::Error;

use crate::tree::XmlNode;
use crate::writer::{to_xml_string, WriteError};

/// Errors raised while converting a command line.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("command is empty")]
    Empty,
    #[error("unterminated quote in command: {0}")]
    UnterminatedQuote(String),
    #[error("command must start with a keyword, found {0:?}")]
    LeadingValue(String),
    #[error(transparent)]
    Write(#[from] WriteError),
}

#[derive(Debug, PartialEq, Eq)]
enum Token {
    Word(String),
    Value(String),
}

/// Convert a command line into its element tree.
pub fn command_tree(command: &str) -> Result<XmlNode, CommandError> {
    let tokens = tokenize(command)?;
    let mut iter = tokens.into_iter();

    // Elements are collected outermost-first and folded together at the end.
    let mut chain: Vec<XmlNode> = match iter.next() {
        None => return Err(CommandError::Empty),
        Some(Token::Value(value)) => return Err(CommandError::LeadingValue(value)),
        Some(Token::Word(word)) => vec![XmlNode::new(word)],
    };

    for token in iter {
        match token {
            Token::Word(word) => chain.push(XmlNode::new(word)),
            Token::Value(value) => {
                if let Some(innermost) = chain.last_mut() {
                    match &mut innermost.text {
                        Some(text) => {
                            text.push(' ');
                            text.push_str(&value);
                        }
                        None => innermost.text = Some(value),
                    }
                }
            }
        }
    }

    let mut node = chain.pop().ok_or(CommandError::Empty)?;
    while let Some(parent) = chain.pop() {
        node = parent.with_child(node);
    }
    Ok(node)
}

/// Convert a command line into the XML text sent as the `cmd` field.
pub fn command_xml(command: &str) -> Result<String, CommandError> {
    Ok(to_xml_string(&command_tree(command)?)?)
}

fn tokenize(command: &str) -> Result<Vec<Token>, CommandError> {
    let mut tokens = Vec::new();
    let mut chars = command.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c == '"' {
            chars.next();
            let mut value = String::new();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '"' {
                    closed = true;
                    break;
                }
                value.push(c);
            }
            if !closed {
                return Err(CommandError::UnterminatedQuote(command.to_string()));
            }
            tokens.push(Token::Value(value));
            continue;
        }

        let mut word = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_whitespace() || c == '"' {
                break;
            }
            word.push(c);
            chars.next();
        }
        if is_element_name(&word) {
            tokens.push(Token::Word(word));
        } else {
            tokens.push(Token::Value(word));
        }
    }

    Ok(tokens)
}

fn is_element_name(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
