//! Tunascript's text-expansion front end (§4.8): strips `$IF(expr)` /
//! `$ENDIF()` blocks from prose, nestable, evaluating each condition and
//! keeping or dropping the block body. When a block is dropped and both its
//! neighbouring text blocks meet at whitespace, one space is collapsed from
//! each side so dropped blocks don't leave a double space behind.

use crate::interpreter::Interpreter;
use crate::parser::parse;
use ictiobus_lexan::{Location, SyntaxError};

enum Segment {
    Literal(String),
    If { body: String, included: bool },
}

pub fn expand(interp: &mut Interpreter, text: &str) -> Result<String, SyntaxError> {
    let chars: Vec<char> = text.chars().collect();
    let mut pos = 0;
    let segments = scan_segments(interp, &chars, &mut pos)?;
    Ok(render_segments(segments))
}

fn scan_segments(interp: &mut Interpreter, chars: &[char], pos: &mut usize) -> Result<Vec<Segment>, SyntaxError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    while *pos < chars.len() {
        if let Some((keyword, after_paren)) = read_marker(chars, *pos) {
            match keyword.as_str() {
                "IF" => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    let cond_end = find_matching_paren(chars, after_paren)?;
                    let cond_text: String = chars[after_paren..cond_end].iter().collect();
                    let mut body_pos = cond_end + 1;
                    let body_start = body_pos;
                    let body_end = find_matching_endif(chars, &mut body_pos)?;
                    let body_text: String = chars[body_start..body_end].iter().collect();
                    *pos = body_pos;
                    let included = eval_condition(interp, &cond_text)?;
                    let body = if included { expand(interp, &body_text)? } else { String::new() };
                    segments.push(Segment::If { body, included });
                    continue;
                }
                "ENDIF" => {
                    return Err(SyntaxError::new("unmatched '$ENDIF()'", Location::unknown()));
                }
                other => {
                    return Err(SyntaxError::new(
                        format!("unknown function '${other}(' in text"),
                        Location::unknown(),
                    ));
                }
            }
        }
        if let Some((name, after)) = read_flag_ref(chars, *pos) {
            literal.push_str(&interp.get_flag(&name).to_string());
            *pos = after;
            continue;
        }
        literal.push(chars[*pos]);
        *pos += 1;
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// Scans forward from a just-opened `$IF(`'s body, tracking nested
/// `$IF`/`$ENDIF` depth (other markers are skipped over, not validated --
/// the recursive `expand` call over the extracted body re-validates them).
/// Returns the index the body text ends at and advances `pos` past the
/// matching `$ENDIF()`'s closing paren.
fn find_matching_endif(chars: &[char], pos: &mut usize) -> Result<usize, SyntaxError> {
    let mut depth = 1;
    let mut i = *pos;
    while i < chars.len() {
        if let Some((keyword, after_paren)) = read_marker(chars, i) {
            let close = find_matching_paren(chars, after_paren)?;
            match keyword.as_str() {
                "IF" => depth += 1,
                "ENDIF" => {
                    depth -= 1;
                    if depth == 0 {
                        let body_end = i;
                        *pos = close + 1;
                        return Ok(body_end);
                    }
                }
                _ => {}
            }
            i = close + 1;
            continue;
        }
        i += 1;
    }
    Err(SyntaxError::new("unmatched '$IF(...)': missing '$ENDIF()'", Location::unknown()))
}

fn read_marker(chars: &[char], pos: usize) -> Option<(String, usize)> {
    if chars.get(pos) != Some(&'$') {
        return None;
    }
    let ident_start = pos + 1;
    let mut i = ident_start;
    while chars.get(i).is_some_and(|c| c.is_ascii_alphanumeric() || *c == '_') {
        i += 1;
    }
    if i == ident_start || chars.get(i) != Some(&'(') {
        return None;
    }
    let ident: String = chars[ident_start..i].iter().collect();
    Some((ident.to_ascii_uppercase(), i + 1))
}

/// A bare `$NAME` flag reference, i.e. `read_marker`'s identifier scan
/// without the trailing `(` it requires for a function-style marker.
fn read_flag_ref(chars: &[char], pos: usize) -> Option<(String, usize)> {
    if chars.get(pos) != Some(&'$') {
        return None;
    }
    let ident_start = pos + 1;
    let mut i = ident_start;
    while chars.get(i).is_some_and(|c| c.is_ascii_alphanumeric() || *c == '_') {
        i += 1;
    }
    if i == ident_start {
        return None;
    }
    let ident: String = chars[ident_start..i].iter().collect();
    Some((ident.to_ascii_uppercase(), i))
}

/// `start` points just past an opening `(` that has already been counted.
fn find_matching_paren(chars: &[char], start: usize) -> Result<usize, SyntaxError> {
    let mut depth = 1;
    let mut i = start;
    while i < chars.len() {
        match chars[i] {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    Err(SyntaxError::new("unmatched '(' in text expansion", Location::unknown()))
}

fn eval_condition(interp: &mut Interpreter, cond_text: &str) -> Result<bool, SyntaxError> {
    let expr = parse(cond_text)?;
    Ok(interp.eval_expr(&expr, true)?.as_bool())
}

fn render_segments(mut segments: Vec<Segment>) -> String {
    let mut out = String::new();
    for i in 0..segments.len() {
        let (body, included) = match &segments[i] {
            Segment::Literal(s) => {
                out.push_str(s);
                continue;
            }
            Segment::If { body, included } => (body.clone(), *included),
        };
        if included {
            out.push_str(&body);
            continue;
        }
        let prev_ends_ws = out.ends_with(|c: char| c.is_whitespace());
        let next_starts_ws = matches!(
            segments.get(i + 1),
            Some(Segment::Literal(s)) if s.starts_with(|c: char| c.is_whitespace())
        );
        if prev_ends_ws && next_starts_ws {
            out.pop();
            if let Some(Segment::Literal(next)) = segments.get_mut(i + 1) {
                let mut chars = next.chars();
                chars.next();
                *next = chars.as_str().to_string();
            }
        }
    }
    out
}
