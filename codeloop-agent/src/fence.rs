//! Markdown code fences around LLM output
//!
//! Models answer with ```` ```python ... ``` ```` blocks. Tools need the raw
//! source, and the chat loop needs to know whether a reply carried any code.

use crate::signal::Signal;
use regex::Regex;
use std::sync::OnceLock;

static WRAPPER_RE: OnceLock<Regex> = OnceLock::new();
static BLOCK_RE: OnceLock<Regex> = OnceLock::new();

/// Strip a single fence wrapping the whole text.
///
/// Only applies when, after trimming, the text starts with a fence line
/// (optionally tagged, e.g. ```` ```python ````) and ends with a closing
/// fence. Anything else comes back unchanged, so the call is idempotent.
pub fn strip_fence(text: &str) -> &str {
    let re = WRAPPER_RE.get_or_init(|| {
        Regex::new(r"^```[A-Za-z0-9_+-]*\n([\s\S]+?)\n```$").expect("fence wrapper regex")
    });

    match re.captures(text.trim()).and_then(|caps| caps.get(1)) {
        Some(body) => body.as_str(),
        None => text,
    }
}

/// Find the first fenced block anywhere in `text` and return its trimmed body.
///
/// An empty block (```` ```python\n``` ````) is `Found("")`; text with no
/// complete fence is `NotFound`.
pub fn extract_code_block(text: &str) -> Signal<&str> {
    let re = BLOCK_RE.get_or_init(|| {
        Regex::new(r"(?s)```[A-Za-z0-9_+-]*\s*(.*?)```").expect("fence block regex")
    });

    match re.captures(text).and_then(|caps| caps.get(1)) {
        Some(body) => Signal::Found(body.as_str().trim()),
        None => Signal::NotFound,
    }
}
