//! Filename templates: `{field}` placeholders separated by literal text.
//!
//! A template such as
//! `{surfacing_project}_{surfacing_object}_{textureset_element}.{tile_index}.{extension}`
//! is compiled once into a list of segments and then matched against file
//! paths. Field values consist of Unicode letters and digits plus `_`, `.` and
//! `-`, so a field never spans a directory separator. Matching is anchored at the end
//! of the path and starts at the leftmost position that can succeed; each
//! field prefers the longest value that still lets the rest of the template
//! match.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::error::{TextureError, TextureResult};
use crate::record::TextureRecord;

/// Project name field.
pub const FIELD_PROJECT: &str = "surfacing_project";
/// Object name field.
pub const FIELD_OBJECT: &str = "surfacing_object";
/// Textureset element field, e.g. `baseColor`.
pub const FIELD_ELEMENT: &str = "textureset_element";
/// Colorspace field.
pub const FIELD_COLORSPACE: &str = "colorspace";
/// Tile index field, e.g. `1001`.
pub const FIELD_TILE_INDEX: &str = "tile_index";
/// File extension field.
pub const FIELD_EXTENSION: &str = "extension";

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// A compiled filename template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

fn is_field_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '-')
}

fn is_field_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

impl Template {
    /// Compile a template.
    ///
    /// # Errors
    ///
    /// [`TextureError::InvalidTemplate`] for unbalanced braces, empty or
    /// repeated field names, adjacent fields, or a template without fields.
    pub fn new(source: &str) -> TextureResult<Self> {
        let invalid = |reason: String| TextureError::InvalidTemplate(reason);
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars();

        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) if is_field_name_char(c) => name.push(c),
                            Some(c) => {
                                return Err(invalid(format!(
                                    "unexpected {c:?} in field name {{{name}"
                                )));
                            }
                            None => return Err(invalid(format!("unclosed field {{{name}"))),
                        }
                    }
                    if name.is_empty() {
                        return Err(invalid("empty field name".to_string()));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    match segments.last() {
                        Some(Segment::Field(previous)) => {
                            return Err(invalid(format!(
                                "fields {{{previous}}} and {{{name}}} need a separator"
                            )));
                        }
                        _ if segments.contains(&Segment::Field(name.clone())) => {
                            return Err(invalid(format!("field {{{name}}} appears twice")));
                        }
                        _ => segments.push(Segment::Field(name)),
                    }
                }
                '}' => return Err(invalid("unmatched '}'".to_string())),
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        if !segments.iter().any(|s| matches!(s, Segment::Field(_))) {
            return Err(invalid("template has no fields".to_string()));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The template text it was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Field names in template order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Field(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Returns `true` if the template has a field named `name`.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields().any(|field| field == name)
    }

    /// Parse a file path into a texture record.
    ///
    /// # Errors
    ///
    /// [`TextureError::TemplateMismatch`] if the path does not match.
    pub fn parse(&self, path: &str) -> TextureResult<TextureRecord> {
        let mut captures = Vec::with_capacity(self.segments.len());
        let matched = (0..=path.len())
            .filter(|start| path.is_char_boundary(*start))
            .any(|start| {
                captures.clear();
                self.match_from(path, 0, start, &mut captures)
            });
        if !matched {
            return Err(TextureError::TemplateMismatch {
                path: path.to_string(),
                template: self.source.clone(),
            });
        }

        let mut fields = BTreeMap::new();
        let mut tile_span = None;
        for (name, span) in captures {
            if name == FIELD_TILE_INDEX {
                tile_span = Some(span.clone());
            }
            fields.insert(name.to_string(), path[span].to_string());
        }
        Ok(TextureRecord::with_tile_span(path.to_string(), fields, tile_span))
    }

    fn match_from<'t>(
        &'t self,
        path: &str,
        segment: usize,
        pos: usize,
        captures: &mut Vec<(&'t str, Range<usize>)>,
    ) -> bool {
        let Some(current) = self.segments.get(segment) else {
            return pos == path.len();
        };
        match current {
            Segment::Literal(text) => {
                path[pos..].starts_with(text.as_str())
                    && self.match_from(path, segment + 1, pos + text.len(), captures)
            }
            Segment::Field(name) => {
                let run_end = path[pos..]
                    .find(|c: char| !is_field_char(c))
                    .map_or(path.len(), |len| pos + len);
                let ends = (pos + 1..=run_end).rev().filter(|end| path.is_char_boundary(*end));
                for end in ends {
                    captures.push((name.as_str(), pos..end));
                    if self.match_from(path, segment + 1, end, captures) {
                        return true;
                    }
                    captures.pop();
                }
                false
            }
        }
    }
}

impl FromStr for Template {
    type Err = TextureError;

    fn from_str(source: &str) -> TextureResult<Self> {
        Self::new(source)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
