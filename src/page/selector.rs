//! Compound CSS selectors for the in-memory page.
//!
//! Supports what the controllers query with: a tag, `#id`, `.class`,
//! `[attr]`, `[attr="v"]` and `[attr^="v"]`, combined into compounds and
//! joined with commas. Combinators are rejected.

use crate::error::{FxError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrOp {
    Exists,
    Equals(String),
    Prefix(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrMatch {
    pub name: String,
    pub op: AttrOp,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<AttrMatch>,
}

/// What a selector needs to know about an element.
pub trait Matchable {
    fn tag_name(&self) -> &str;
    fn attr(&self, name: &str) -> Option<&str>;
    fn has_class(&self, class: &str) -> bool;
}

impl Compound {
    pub fn matches<M: Matchable + ?Sized>(&self, el: &M) -> bool {
        if let Some(tag) = &self.tag {
            if !el.tag_name().eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if el.attr("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| el.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|m| match (&m.op, el.attr(&m.name)) {
            (_, None) => false,
            (AttrOp::Exists, Some(_)) => true,
            (AttrOp::Equals(v), Some(actual)) => actual == v,
            (AttrOp::Prefix(v), Some(actual)) => actual.starts_with(v.as_str()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList(pub Vec<Compound>);

impl SelectorList {
    pub fn parse(input: &str) -> Result<Self> {
        let mut compounds = Vec::new();
        for part in split_top_level(input) {
            let part = part.trim();
            if part.is_empty() {
                return Err(FxError::Selector(input.to_string()));
            }
            compounds.push(parse_compound(part).ok_or_else(|| FxError::Selector(input.to_string()))?);
        }
        Ok(Self(compounds))
    }

    pub fn matches<M: Matchable + ?Sized>(&self, el: &M) -> bool {
        self.0.iter().any(|c| c.matches(el))
    }
}

// Commas inside quoted attribute values do not split.
fn split_top_level(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, ch) in input.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, ',') => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(chars: &[char], pos: &mut usize) -> Option<String> {
    let start = *pos;
    while *pos < chars.len() && is_ident_char(chars[*pos]) {
        *pos += 1;
    }
    (*pos > start).then(|| chars[start..*pos].iter().collect())
}

fn parse_compound(part: &str) -> Option<Compound> {
    let chars: Vec<char> = part.chars().collect();
    let mut pos = 0;
    let mut compound = Compound::default();

    if chars.first().map_or(false, |c| c.is_ascii_alphabetic()) {
        compound.tag = Some(take_ident(&chars, &mut pos)?);
    }

    while pos < chars.len() {
        match chars[pos] {
            '#' => {
                pos += 1;
                compound.id = Some(take_ident(&chars, &mut pos)?);
            }
            '.' => {
                pos += 1;
                compound.classes.push(take_ident(&chars, &mut pos)?);
            }
            '[' => {
                pos += 1;
                compound.attrs.push(parse_attr(&chars, &mut pos)?);
            }
            _ => return None,
        }
    }

    let empty = compound.tag.is_none()
        && compound.id.is_none()
        && compound.classes.is_empty()
        && compound.attrs.is_empty();
    (!empty).then_some(compound)
}

fn parse_attr(chars: &[char], pos: &mut usize) -> Option<AttrMatch> {
    let name = take_ident(chars, pos)?;
    let op = match chars.get(*pos)? {
        ']' => {
            *pos += 1;
            return Some(AttrMatch { name, op: AttrOp::Exists });
        }
        '=' => {
            *pos += 1;
            AttrOp::Equals(parse_value(chars, pos)?)
        }
        '^' if chars.get(*pos + 1) == Some(&'=') => {
            *pos += 2;
            AttrOp::Prefix(parse_value(chars, pos)?)
        }
        _ => return None,
    };
    if chars.get(*pos) != Some(&']') {
        return None;
    }
    *pos += 1;
    Some(AttrMatch { name, op })
}

fn parse_value(chars: &[char], pos: &mut usize) -> Option<String> {
    match *chars.get(*pos)? {
        q @ ('"' | '\'') => {
            let start = *pos + 1;
            let len = chars[start..].iter().position(|&c| c == q)?;
            *pos = start + len + 1;
            Some(chars[start..start + len].iter().collect())
        }
        _ => take_ident(chars, pos),
    }
}
