//! Path-tracking walk over an XML document.
//!
//! The cluster services wrap their payloads in SOAP envelopes with vendor-specific prefixes and
//! reuse element names at different depths (`item`, `Name`, `Status`). Callers therefore match on
//! the stack of local names leading to a node rather than on a single tag.

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum XmlError {
    #[error("invalid XML: {0}")]
    Syntax(String),

    #[error("document has no root element")]
    NoRoot,

    #[error("document ended inside <{0}>")]
    Truncated(String),
}

/// One step of the walk. The slice is the path of local names from the root to the node.
#[derive(Debug)]
pub enum Node<'a> {
    Open(&'a [String]),
    Text(&'a [String], &'a str),
    Close(&'a [String]),
}

pub fn walk<F>(xml: &str, mut visit: F) -> Result<(), XmlError>
where
    F: FnMut(Node<'_>),
{
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut saw_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                path.push(local_name(e.local_name().as_ref()));
                saw_root = true;
                visit(Node::Open(&path));
            }
            Ok(Event::Empty(e)) => {
                path.push(local_name(e.local_name().as_ref()));
                saw_root = true;
                visit(Node::Open(&path));
                visit(Node::Close(&path));
                path.pop();
            }
            Ok(Event::End(_)) => {
                visit(Node::Close(&path));
                path.pop();
            }
            Ok(Event::Text(t)) => {
                let text = t.unescape().map_err(|e| XmlError::Syntax(e.to_string()))?;
                if !path.is_empty() {
                    visit(Node::Text(&path, &text));
                }
            }
            Ok(Event::CData(c)) => {
                let bytes = c.into_inner();
                let text = String::from_utf8_lossy(&bytes);
                if !path.is_empty() {
                    visit(Node::Text(&path, &text));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(XmlError::Syntax(e.to_string())),
        }
    }

    if let Some(open) = path.last() {
        return Err(XmlError::Truncated(open.clone()));
    }
    if !saw_root {
        return Err(XmlError::NoRoot);
    }
    Ok(())
}

/// Text of the first element named `name` at any depth, if it has any.
pub fn first_text(xml: &str, name: &str) -> Result<Option<String>, XmlError> {
    let mut found: Option<String> = None;
    walk(xml, |node| {
        if let Node::Text(path, text) = node {
            if found.is_none() && path.last().is_some_and(|last| last == name) {
                found = Some(text.to_string());
            }
        }
    })?;
    Ok(found)
}

pub fn ends_with(path: &[String], suffix: &[&str]) -> bool {
    path.len() >= suffix.len()
        && path[path.len() - suffix.len()..]
            .iter()
            .zip(suffix)
            .all(|(have, want)| have == want)
}

fn local_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}
