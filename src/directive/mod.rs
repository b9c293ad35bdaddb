//! Task directive blocks embedded in document text.
//!
//! A directive looks like:
//!
//! ```text
//! {{checktask id="abc123-17357..." dueDate="2025/01/01 09:00" responsible="alice,bob" reminderTimes="h1,d2"}}
//! Review the draft
//! {{/checktask}}
//! ```
//!
//! `id` is optional on input; after reconciliation assigns one, the text is
//! rewritten with the id embedded so the next pass sees a stable identity.
//! Directives live for one synchronization pass only.

#[cfg(test)]
mod tests;

use std::ops::Range;
use tracing::warn;

/// Opening tag prefix. Also the cheap marker probed before any parsing.
pub const OPEN_MARKER: &str = "{{checktask";

/// Closing tag.
pub const CLOSE_MARKER: &str = "{{/checktask}}";

/// One parsed directive block, in raw (unresolved) form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Directive {
    pub id: Option<String>,
    pub due_date: String,
    pub responsible: String,
    pub reminder_times: String,
    pub content: String,
}

impl Directive {
    fn from_params(params: &[RawParam], body: &str) -> Self {
        let mut directive = Self {
            content: body.to_string(),
            ..Self::default()
        };
        for param in params {
            match param.key.as_str() {
                "id" => {
                    if directive.id.is_none() && !param.value.trim().is_empty() {
                        directive.id = Some(param.value.trim().to_string());
                    }
                }
                "dueDate" => directive.due_date = param.value.clone(),
                "responsible" => directive.responsible = param.value.clone(),
                "reminderTimes" => directive.reminder_times = param.value.clone(),
                // Unknown parameters pass through the rewrite untouched.
                _ => {}
            }
        }
        directive
    }
}

/// Cheap check for the opening marker, used to short-circuit documents
/// with no directives at all before any parsing happens.
pub fn contains_directive(text: &str) -> bool {
    text.contains(OPEN_MARKER)
}

/// All directive blocks in the text, in order of appearance.
pub fn scan(text: &str) -> Vec<Directive> {
    blocks(text).into_iter().map(|b| b.directive).collect()
}

/// Embed newly assigned ids in their opening tags, leaving every other
/// byte of the text untouched. `ids[n]` is the id assigned to the n-th
/// scanned block, or `None` when the block keeps the one it carried.
///
/// A tag that already has an `id` parameter (possible when a duplicate id
/// was re-assigned) gets its value replaced; otherwise the parameter is
/// inserted right after the marker.
pub fn annotate_ids(text: &str, ids: &[Option<String>]) -> String {
    let mut out = String::with_capacity(text.len() + ids.len() * 32);
    let mut cursor = 0;

    for (block, id) in blocks(text).iter().zip(ids) {
        let Some(id) = id else { continue };
        match &block.id_value_span {
            Some(span) => {
                out.push_str(&text[cursor..span.start]);
                out.push_str(id);
                cursor = span.end;
            }
            None => {
                out.push_str(&text[cursor..block.params_start]);
                out.push_str(" id=\"");
                out.push_str(id);
                out.push('"');
                cursor = block.params_start;
            }
        }
    }

    out.push_str(&text[cursor..]);
    out
}

struct Block {
    /// Byte offset just past the opening marker, where parameters begin.
    params_start: usize,
    /// Byte range of the existing `id` value inside its quotes, if any.
    id_value_span: Option<Range<usize>>,
    directive: Directive,
}

fn blocks(text: &str) -> Vec<Block> {
    let mut found = Vec::new();
    let mut cursor = 0;

    while let Some(rel) = text[cursor..].find(OPEN_MARKER) {
        let open_start = cursor + rel;
        let params_start = open_start + OPEN_MARKER.len();

        // Guard against a longer word that merely starts with the marker.
        match text[params_start..].chars().next() {
            Some(c) if !c.is_whitespace() && c != '}' => {
                cursor = params_start;
                continue;
            }
            None => break,
            _ => {}
        }

        let Some(params_rel) = text[params_start..].find("}}") else {
            warn!("unterminated directive opening tag, ignoring rest of document");
            break;
        };
        let params_end = params_start + params_rel;
        let body_start = params_end + 2;

        let Some(close_rel) = text[body_start..].find(CLOSE_MARKER) else {
            warn!("directive block missing closing tag, ignoring");
            break;
        };
        let body_end = body_start + close_rel;

        match parse_params(&text[params_start..params_end]) {
            Some(params) => {
                let id_value_span = params.iter().find(|p| p.key == "id").map(|p| {
                    params_start + p.value_span.start..params_start + p.value_span.end
                });
                found.push(Block {
                    params_start,
                    id_value_span,
                    directive: Directive::from_params(&params, text[body_start..body_end].trim()),
                });
            }
            None => warn!("malformed directive parameters, skipping block"),
        }

        cursor = body_end + CLOSE_MARKER.len();
    }

    found
}

struct RawParam {
    key: String,
    value: String,
    /// Byte range of the value between its quotes, relative to the raw
    /// parameter slice.
    value_span: Range<usize>,
}

/// Parse the `key="value"` run of an opening tag. Values are quoted;
/// backslash escapes the next character inside a value.
fn parse_params(raw: &str) -> Option<Vec<RawParam>> {
    let mut params = Vec::new();
    let mut iter = raw.char_indices().peekable();

    loop {
        while matches!(iter.peek(), Some((_, c)) if c.is_whitespace()) {
            iter.next();
        }
        let Some(&(key_start, _)) = iter.peek() else {
            break;
        };

        let mut key_end = key_start;
        while let Some(&(i, c)) = iter.peek() {
            if c == '=' || c.is_whitespace() {
                break;
            }
            iter.next();
            key_end = i + c.len_utf8();
        }
        let key = raw[key_start..key_end].to_string();
        if key.is_empty() {
            return None;
        }

        while matches!(iter.peek(), Some((_, c)) if c.is_whitespace()) {
            iter.next();
        }
        if !matches!(iter.next(), Some((_, '='))) {
            return None;
        }
        while matches!(iter.peek(), Some((_, c)) if c.is_whitespace()) {
            iter.next();
        }
        if !matches!(iter.next(), Some((_, '"'))) {
            return None;
        }

        let value_start = iter.peek().map(|&(i, _)| i)?;
        let mut value = String::new();
        let value_end;
        loop {
            match iter.next() {
                Some((i, '"')) => {
                    value_end = i;
                    break;
                }
                Some((_, '\\')) => {
                    let (_, escaped) = iter.next()?;
                    value.push(escaped);
                }
                Some((_, c)) => value.push(c),
                None => return None,
            }
        }

        params.push(RawParam {
            key,
            value,
            value_span: value_start..value_end,
        });
    }

    Some(params)
}
