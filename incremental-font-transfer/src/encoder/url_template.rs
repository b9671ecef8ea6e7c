//! Builds URL template byte sequences: the encoder's counterpart to
//! [`crate::url_templates::expand_template`], which only decodes them.
//!
//! See <https://w3c.github.io/IFT/Overview.html#url-templates>.

const MAX_LITERAL_CHUNK: usize = 127;

const OP_ID32: u8 = 128;
const OP_DIGIT_1: u8 = 129;
const OP_DIGIT_2: u8 = 130;
const OP_DIGIT_3: u8 = 131;
const OP_DIGIT_4: u8 = 132;
const OP_ID64: u8 = 133;

/// Which patch id encoding a URL template variable expands to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateVariable {
    /// The full patch id, base32hex encoded. Used when patch ids are placed directly in the
    /// path, e.g. `.../{id32}.patch`.
    Id32,
    /// A single base32hex digit of the id, counting from the end (1-indexed). Used to fan
    /// patches out across directories, e.g. `.../{d1}/{d2}/{id32}.patch`.
    Digit(u8),
    /// The full patch id, base64url encoded. More compact than `Id32` but not directory-safe
    /// without further escaping, since it can contain `/`.
    Id64,
}

/// Appends literal bytes to a template buffer, splitting into chunks no larger than a single
/// opcode byte can address.
fn push_literal(out: &mut Vec<u8>, literal: &str) {
    for chunk in literal.as_bytes().chunks(MAX_LITERAL_CHUNK) {
        out.push(chunk.len() as u8);
        out.extend_from_slice(chunk);
    }
}

fn push_variable(out: &mut Vec<u8>, variable: TemplateVariable) {
    out.push(match variable {
        TemplateVariable::Id32 => OP_ID32,
        TemplateVariable::Digit(1) => OP_DIGIT_1,
        TemplateVariable::Digit(2) => OP_DIGIT_2,
        TemplateVariable::Digit(3) => OP_DIGIT_3,
        TemplateVariable::Digit(4) => OP_DIGIT_4,
        TemplateVariable::Digit(other) => panic!("unsupported digit position: {other}"),
        TemplateVariable::Id64 => OP_ID64,
    });
}

/// Incrementally assembles a URL template's byte encoding from literal strings and variable
/// insertions, in the order a client's decoder will replay them.
#[derive(Debug, Clone, Default)]
pub struct UrlTemplateBuilder {
    bytes: Vec<u8>,
}

impl UrlTemplateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn literal(mut self, literal: &str) -> Self {
        push_literal(&mut self.bytes, literal);
        self
    }

    pub fn variable(mut self, variable: TemplateVariable) -> Self {
        push_variable(&mut self.bytes, variable);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// Builds the common template shape used for glyph keyed patches: a URL prefix, a fan-out
/// directory keyed off the low two base32hex digits of the patch id, then the full id and an
/// extension.
pub fn fanout_template(url_prefix: &str, extension: &str) -> Vec<u8> {
    UrlTemplateBuilder::new()
        .literal(url_prefix)
        .variable(TemplateVariable::Digit(1))
        .literal("/")
        .variable(TemplateVariable::Digit(2))
        .literal("/")
        .variable(TemplateVariable::Id32)
        .literal(extension)
        .build()
}

/// Builds a flat template with no directory fan-out: a URL prefix, the full patch id, and an
/// extension. Suitable when the total patch count is small enough that directory fan-out isn't
/// needed to keep any one directory's listing manageable.
pub fn flat_template(url_prefix: &str, extension: &str) -> Vec<u8> {
    UrlTemplateBuilder::new()
        .literal(url_prefix)
        .variable(TemplateVariable::Id32)
        .literal(extension)
        .build()
}
