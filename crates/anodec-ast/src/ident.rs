//! Identifiers and multi-part (`a::b::c`) names.

use anodec_util::{Name, SourceSpan};

/// A single identifier with its source span.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ident {
    pub span: SourceSpan,
    pub text: Name,
}

impl Ident {
    pub fn new(span: SourceSpan, text: Name) -> Self {
        Self { span, text }
    }
}

/// A multi-part identifier such as `system::io::open`.
///
/// Always has at least one part. Single-part names are the common case; the
/// namespace-qualified form is resolved by the rules in the symbol search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QualifiedName {
    parts: Vec<Ident>,
}

impl QualifiedName {
    /// Build from parts.
    ///
    /// # Panics
    ///
    /// Panics if `parts` is empty.
    pub fn new(parts: Vec<Ident>) -> Self {
        assert!(!parts.is_empty(), "a qualified name needs at least one part");
        Self { parts }
    }

    /// A one-part name.
    pub fn single(part: Ident) -> Self {
        Self { parts: vec![part] }
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// The first part.
    pub fn front(&self) -> &Ident {
        &self.parts[0]
    }

    /// The last part.
    pub fn back(&self) -> &Ident {
        self.parts.last().unwrap()
    }

    /// Everything between, but not including, the first and last parts.
    pub fn middle(&self) -> &[Ident] {
        if self.parts.len() > 2 {
            &self.parts[1..self.parts.len() - 1]
        } else {
            &[]
        }
    }

    pub fn parts(&self) -> &[Ident] {
        &self.parts
    }

    /// Span covering the whole name.
    pub fn span(&self) -> SourceSpan {
        self.front().span.to(self.back().span)
    }

    /// The `a::b::c` rendering.
    pub fn qualified(&self) -> String {
        let mut out = String::new();
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push_str("::");
            }
            out.push_str(part.text.as_str());
        }
        out
    }
}
