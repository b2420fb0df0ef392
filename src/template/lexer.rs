use crate::error::{GoatError, Location, Result};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Matches one {{ ... }} action. String literals inside the action may
    // contain "}}" without terminating it.
    static ref ACTION: Regex =
        Regex::new(r#"(?s)\{\{((?:[^"]|"(?:[^"\\]|\\.)*")*?)\}\}"#).unwrap();
}

/// One piece of a lexed template: literal text, or the body of an action.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Text(String),
    Action { body: String, location: Location },
}

struct RawAction {
    body: String,
    location: Location,
    trim_left: bool,
    trim_right: bool,
    comment: bool,
}

enum Raw {
    Text(String),
    Action(RawAction),
}

/// Split template source into text and action tokens.
///
/// Handles trim markers (`{{- ` / ` -}}`) by eating whitespace in the
/// neighboring text, and drops comment actions (`{{/* ... */}}`) entirely.
pub fn lex(source: &str) -> Result<Vec<Token>> {
    let mut raws = Vec::new();
    let mut last_end = 0;

    for cap in ACTION.captures_iter(source) {
        let m = cap.get(0).unwrap();
        push_text(&mut raws, source, last_end, m.start())?;
        raws.push(Raw::Action(parse_action(
            cap.get(1).unwrap().as_str(),
            Location::from_offset(source, m.start()),
        )?));
        last_end = m.end();
    }
    push_text(&mut raws, source, last_end, source.len())?;

    apply_trim(&mut raws);

    let mut tokens = Vec::new();
    for raw in raws {
        match raw {
            Raw::Text(s) => {
                if !s.is_empty() {
                    tokens.push(Token::Text(s));
                }
            }
            Raw::Action(a) => {
                if !a.comment {
                    tokens.push(Token::Action { body: a.body, location: a.location });
                }
            }
        }
    }
    Ok(tokens)
}

/// Literal text between actions. A "{{" here means the lexer could not match
/// a closing "}}", which makes the action unterminated.
fn push_text(raws: &mut Vec<Raw>, source: &str, start: usize, end: usize) -> Result<()> {
    let text = &source[start..end];
    if let Some(i) = text.find("{{") {
        return Err(GoatError::TemplateParse {
            message: "unclosed action".to_string(),
            location: Location::from_offset(source, start + i),
        });
    }
    raws.push(Raw::Text(text.to_string()));
    Ok(())
}

fn parse_action(raw_body: &str, location: Location) -> Result<RawAction> {
    let mut body = raw_body;
    let mut trim_left = false;
    let mut trim_right = false;

    // A trim dash must be separated from the action body by whitespace,
    // so "{{-3}}" stays the number -3.
    if let Some(rest) = body.strip_prefix('-') {
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            trim_left = true;
            body = rest;
        }
    }
    if let Some(rest) = body.strip_suffix('-') {
        if rest.is_empty() || rest.ends_with(char::is_whitespace) {
            trim_right = true;
            body = rest;
        }
    }

    let trimmed = body.trim();
    let mut comment = false;
    if let Some(rest) = trimmed.strip_prefix("/*") {
        match rest.find("*/") {
            Some(i) if i + 2 == rest.len() => comment = true,
            _ => {
                return Err(GoatError::TemplateParse {
                    message: "malformed comment".to_string(),
                    location,
                })
            }
        }
    }

    Ok(RawAction {
        body: trimmed.to_string(),
        location,
        trim_left,
        trim_right,
        comment,
    })
}

fn apply_trim(raws: &mut [Raw]) {
    for i in 0..raws.len() {
        let (trim_left, trim_right) = match &raws[i] {
            Raw::Action(a) => (a.trim_left, a.trim_right),
            Raw::Text(_) => continue,
        };
        if trim_left && i > 0 {
            if let Raw::Text(s) = &mut raws[i - 1] {
                s.truncate(s.trim_end().len());
            }
        }
        if trim_right && i + 1 < raws.len() {
            if let Raw::Text(s) = &mut raws[i + 1] {
                *s = s.trim_start().to_string();
            }
        }
    }
}
