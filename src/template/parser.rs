use crate::error::{GoatError, Location, Result};
use lazy_static::lazy_static;
use regex::Regex;

use super::funcs;
use super::lexer::Token;

lazy_static! {
    // One expression atom: a string literal, a parenthesis, or a bare word
    static ref ATOM: Regex = Regex::new(r#""(?:[^"\\]|\\.)*"|[()]|[^\s()"]+"#).unwrap();
    static ref IDENT: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// One node of a parsed template
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    Action {
        expr: Expr,
        location: Location,
    },
    If {
        cond: Expr,
        then: Vec<Node>,
        els: Vec<Node>,
        location: Location,
    },
    Range {
        expr: Expr,
        body: Vec<Node>,
        els: Vec<Node>,
        location: Location,
    },
}

/// One expression inside an action
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `.`, the current context
    Dot,
    /// `$`, the root context
    Root,
    /// A field chain like `.a.b` or `$.a.b`
    Field { from_root: bool, path: Vec<String> },
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// A function call; the name is checked against the registry at parse time
    Call { name: String, args: Vec<Expr> },
}

/// Build a node tree from lexed tokens.
pub fn parse(tokens: Vec<Token>) -> Result<Vec<Node>> {
    let mut parser = Parser { tokens, pos: 0 };
    let (nodes, _) = parser.parse_nodes(None)?;
    Ok(nodes)
}

/// How a block of nodes ended
enum Stop {
    End,
    Else {
        else_if: Option<String>,
        location: Location,
    },
    Eof,
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Parse nodes until `{{end}}`, `{{else}}` or end of input. `block` names
    /// the enclosing construct, or is None at the top level.
    fn parse_nodes(&mut self, block: Option<(&str, &Location)>) -> Result<(Vec<Node>, Stop)> {
        let mut nodes = Vec::new();

        while self.pos < self.tokens.len() {
            let token = self.tokens[self.pos].clone();
            self.pos += 1;

            let (body, location) = match token {
                Token::Text(s) => {
                    nodes.push(Node::Text(s));
                    continue;
                }
                Token::Action { body, location } => (body, location),
            };

            let (keyword, rest) = split_keyword(&body);
            match keyword {
                "if" => nodes.push(self.parse_if(rest, location)?),
                "range" => nodes.push(self.parse_range(rest, location)?),
                "end" => {
                    if block.is_none() {
                        return Err(parse_err("unexpected {{end}}", &location));
                    }
                    if !rest.is_empty() {
                        return Err(parse_err("unexpected content after end", &location));
                    }
                    return Ok((nodes, Stop::End));
                }
                "else" => {
                    if block.is_none() {
                        return Err(parse_err("unexpected {{else}}", &location));
                    }
                    let else_if = parse_else(rest, &location)?;
                    return Ok((nodes, Stop::Else { else_if, location }));
                }
                _ => {
                    let expr = parse_expr(&body, &location)?;
                    nodes.push(Node::Action { expr, location });
                }
            }
        }

        if let Some((name, location)) = block {
            return Err(parse_err(
                &format!("missing {{{{end}}}} for {}", name),
                location,
            ));
        }
        Ok((nodes, Stop::Eof))
    }

    fn parse_if(&mut self, cond_src: &str, location: Location) -> Result<Node> {
        if cond_src.is_empty() {
            return Err(parse_err("missing condition in if", &location));
        }
        let cond = parse_expr(cond_src, &location)?;

        let (then, stop) = self.parse_nodes(Some(("if", &location)))?;
        let els = match stop {
            Stop::End => Vec::new(),
            Stop::Else { else_if: None, .. } => {
                let (els, stop) = self.parse_nodes(Some(("if", &location)))?;
                match stop {
                    Stop::End => els,
                    Stop::Else { location, .. } => {
                        return Err(parse_err("unexpected {{else}}", &location))
                    }
                    Stop::Eof => unreachable!("parse_nodes rejects EOF inside a block"),
                }
            }
            // {{else if expr}} continues the chain, closed by the same {{end}}
            Stop::Else { else_if: Some(src), location } => {
                vec![self.parse_if(&src, location)?]
            }
            Stop::Eof => unreachable!("parse_nodes rejects EOF inside a block"),
        };

        Ok(Node::If { cond, then, els, location })
    }

    fn parse_range(&mut self, expr_src: &str, location: Location) -> Result<Node> {
        if expr_src.is_empty() {
            return Err(parse_err("missing expression in range", &location));
        }
        let expr = parse_expr(expr_src, &location)?;

        let (body, stop) = self.parse_nodes(Some(("range", &location)))?;
        let els = match stop {
            Stop::End => Vec::new(),
            Stop::Else { else_if: None, .. } => {
                let (els, stop) = self.parse_nodes(Some(("range", &location)))?;
                match stop {
                    Stop::End => els,
                    Stop::Else { location, .. } => {
                        return Err(parse_err("unexpected {{else}}", &location))
                    }
                    Stop::Eof => unreachable!("parse_nodes rejects EOF inside a block"),
                }
            }
            Stop::Else { else_if: Some(_), location } => {
                return Err(parse_err("unexpected {{else if}} in range", &location))
            }
            Stop::Eof => unreachable!("parse_nodes rejects EOF inside a block"),
        };

        Ok(Node::Range { expr, body, els, location })
    }
}

/// Split an `{{else}}` body: plain else, or an `else if <expr>` chain link.
fn parse_else(rest: &str, location: &Location) -> Result<Option<String>> {
    if rest.is_empty() {
        return Ok(None);
    }
    let (keyword, cond) = split_keyword(rest);
    if keyword != "if" {
        return Err(parse_err("malformed else", location));
    }
    if cond.is_empty() {
        return Err(parse_err("missing condition in else if", location));
    }
    Ok(Some(cond.to_string()))
}

fn split_keyword(body: &str) -> (&str, &str) {
    let body = body.trim();
    match body.find(char::is_whitespace) {
        Some(i) => (&body[..i], body[i..].trim_start()),
        None => (body, ""),
    }
}

fn parse_err(message: &str, location: &Location) -> GoatError {
    GoatError::TemplateParse {
        message: message.to_string(),
        location: location.clone(),
    }
}

/// Parse one action body into an expression.
pub fn parse_expr(src: &str, location: &Location) -> Result<Expr> {
    if src.trim().is_empty() {
        return Err(parse_err("empty action", location));
    }
    let atoms = tokenize(src, location)?;
    let mut parser = ExprParser { atoms, pos: 0, location };
    let expr = parser.command()?;
    if parser.pos < parser.atoms.len() {
        let atom = &parser.atoms[parser.pos];
        return Err(parse_err(&format!("unexpected '{}'", atom), location));
    }
    Ok(expr)
}

fn tokenize<'a>(src: &'a str, location: &Location) -> Result<Vec<&'a str>> {
    let mut atoms = Vec::new();
    let mut rest = src;
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        match ATOM.find(rest) {
            Some(m) if m.start() == 0 => {
                atoms.push(m.as_str());
                rest = &rest[m.end()..];
            }
            // Only an unterminated string literal fails to match at 0
            _ => return Err(parse_err("unterminated string literal", location)),
        }
    }
    Ok(atoms)
}

struct ExprParser<'a> {
    atoms: Vec<&'a str>,
    pos: usize,
    location: &'a Location,
}

impl<'a> ExprParser<'a> {
    /// A command is either a single operand or a function name followed by
    /// its arguments.
    fn command(&mut self) -> Result<Expr> {
        let first = match self.peek() {
            Some(atom) => atom,
            None => return Err(self.err("missing expression")),
        };

        if IDENT.is_match(first) && first != "true" && first != "false" {
            let name = first.to_string();
            self.pos += 1;
            if funcs::lookup(&name).is_none() {
                return Err(self.err(&format!("function \"{}\" not defined", name)));
            }
            let mut args = Vec::new();
            while let Some(atom) = self.peek() {
                if atom == ")" {
                    break;
                }
                args.push(self.operand()?);
            }
            return Ok(Expr::Call { name, args });
        }

        self.operand()
    }

    fn operand(&mut self) -> Result<Expr> {
        let atom = match self.next() {
            Some(atom) => atom,
            None => return Err(self.err("missing operand")),
        };

        if atom == "(" {
            let expr = self.command()?;
            match self.next() {
                Some(")") => return Ok(expr),
                _ => return Err(self.err("expected ')'")),
            }
        }
        if atom == ")" {
            return Err(self.err("unexpected ')'"));
        }
        if atom == "." {
            return Ok(Expr::Dot);
        }
        if atom == "$" {
            return Ok(Expr::Root);
        }
        if atom.starts_with('"') {
            return Ok(Expr::Str(self.unescape(atom)?));
        }
        if atom == "true" {
            return Ok(Expr::Bool(true));
        }
        if atom == "false" {
            return Ok(Expr::Bool(false));
        }
        if let Some(dotted) = atom.strip_prefix('$') {
            return self.field(true, dotted);
        }
        if atom.starts_with('.') {
            return self.field(false, atom);
        }
        if IDENT.is_match(atom) {
            // A bare identifier is a zero-argument function call
            if funcs::lookup(atom).is_none() {
                return Err(self.err(&format!("function \"{}\" not defined", atom)));
            }
            return Ok(Expr::Call { name: atom.to_string(), args: Vec::new() });
        }
        if let Ok(i) = atom.parse::<i64>() {
            return Ok(Expr::Int(i));
        }
        if let Ok(f) = atom.parse::<f64>() {
            return Ok(Expr::Float(f));
        }

        Err(self.err(&format!("unexpected '{}'", atom)))
    }

    /// `.a.b` field chains; each segment must be a plain key
    fn field(&self, from_root: bool, dotted: &str) -> Result<Expr> {
        let segments = match dotted.strip_prefix('.') {
            Some(rest) => rest,
            None => return Err(self.err(&format!("unexpected '{}'", dotted))),
        };
        let mut path = Vec::new();
        for seg in segments.split('.') {
            if seg.is_empty() || !seg.chars().all(|c| c.is_alphanumeric() || c == '_') {
                return Err(self.err(&format!("bad field path '{}'", dotted)));
            }
            path.push(seg.to_string());
        }
        Ok(Expr::Field { from_root, path })
    }

    fn unescape(&self, lit: &str) -> Result<String> {
        let inner = &lit[1..lit.len() - 1];
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                _ => return Err(self.err("invalid escape sequence in string literal")),
            }
        }
        Ok(out)
    }

    fn peek(&self) -> Option<&'a str> {
        self.atoms.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<&'a str> {
        let atom = self.peek();
        if atom.is_some() {
            self.pos += 1;
        }
        atom
    }

    fn err(&self, message: &str) -> GoatError {
        parse_err(message, self.location)
    }
}
