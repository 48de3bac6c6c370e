use std::sync::LazyLock;

use anyhow::{Result, bail};
use regex::Regex;

use super::source::SourceFile;

/// Half-open byte range into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn text<'a>(&self, content: &'a str) -> &'a str {
        &content[self.start..self.end]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    TypeAlias,
    Interface,
}

/// A named composite-type definition: a type alias whose value is a
/// composite literal, or an interface.
#[derive(Debug)]
pub struct Declaration {
    pub kind: DeclKind,
    pub name: String,
    /// Header keyword through the closing brace.
    pub span: Span,
    pub body: Composite,
}

/// An inline `{ ... }` body holding an ordered member list.
#[derive(Debug)]
pub struct Composite {
    /// The braces, inclusive.
    pub span: Span,
    pub members: Vec<Member>,
}

/// Mutation tombstone. Members are never physically unlinked from their
/// parent vector; a mutated member flips state and every later touch
/// checks `is_live` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemberState {
    #[default]
    Live,
    Commented,
    Removed,
}

/// One entry of a composite body. `name` is None for index signatures,
/// methods, and other members that cannot be matched by field patterns;
/// those are kept verbatim and never mutated.
#[derive(Debug)]
pub struct Member {
    pub name: Option<String>,
    /// First meaningful char through the trailing separator (or the last
    /// meaningful char when the final member has no separator).
    pub span: Span,
    /// First inline `{ ... }` literal in the member's type, if any. Covers
    /// literals inside generic arguments such as `Array<{ ... }>`.
    pub nested: Option<Composite>,
    pub state: MemberState,
}

impl Member {
    pub fn is_live(&self) -> bool {
        matches!(self.state, MemberState::Live)
    }
}

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:export\s+)?(?:declare\s+)?(type|interface)\s+([A-Za-z_$][A-Za-z0-9_$]*)")
        .expect("header regex is valid")
});

static MEMBER_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(?:readonly\s+)?(?:([A-Za-z_$][A-Za-z0-9_$]*)|"([^"\\]+)"|'([^'\\]+)')\s*\??\s*:"#,
    )
    .expect("member name regex is valid")
});

/// Parse every composite-type declaration out of the source text.
///
/// The scan is linear with comment and string masking; anything that is
/// not a recognized declaration header is passthrough text. Headers are
/// recognized at any brace depth, so declarations inside namespace or
/// module blocks are found too. The only hard failure is a declaration
/// body left unclosed at end of file.
pub fn parse_declarations(source: &SourceFile) -> Result<Vec<Declaration>> {
    let text = source.content();
    let bytes = text.as_bytes();
    let mut decls = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let b = bytes[pos];
        if b == b'/' && bytes.get(pos + 1) == Some(&b'/') {
            pos = skip_line_comment(bytes, pos);
            continue;
        }
        if b == b'/' && bytes.get(pos + 1) == Some(&b'*') {
            pos = skip_block_comment(bytes, pos);
            continue;
        }
        if matches!(b, b'"' | b'\'' | b'`') {
            pos = skip_string(bytes, pos);
            continue;
        }
        if is_ident_start(b) {
            // `config.type` is a property access, not a keyword
            if preceded_by_dot(bytes, pos) {
                pos = ident_end(bytes, pos);
                continue;
            }
            if let Some(caps) = HEADER_RE.captures(&text[pos..]) {
                let (decl, next) = try_declaration(text, bytes, pos, &caps)?;
                if let Some(decl) = decl {
                    decls.push(decl);
                }
                pos = next;
                continue;
            }
            pos = ident_end(bytes, pos);
            continue;
        }
        pos += 1;
    }

    Ok(decls)
}

/// Attempt to parse one declaration at a matched header. Returns the
/// declaration (None when the construct turns out not to be a plain
/// composite literal) and the position to resume scanning from.
fn try_declaration(
    text: &str,
    bytes: &[u8],
    start: usize,
    caps: &regex::Captures<'_>,
) -> Result<(Option<Declaration>, usize)> {
    let kind = match caps.get(1).map(|m| m.as_str()) {
        Some("type") => DeclKind::TypeAlias,
        _ => DeclKind::Interface,
    };
    let name = caps
        .get(2)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    let header_end = start + caps.get(0).map_or(0, |m| m.end());
    let mut pos = skip_trivia(bytes, header_end);

    if bytes.get(pos) == Some(&b'<') {
        pos = match skip_generics(bytes, pos) {
            Some(end) => end,
            None => return Ok((None, header_end)),
        };
        pos = skip_trivia(bytes, pos);
    }

    match kind {
        DeclKind::TypeAlias => {
            if bytes.get(pos) != Some(&b'=') {
                return Ok((None, header_end));
            }
            pos = skip_trivia(bytes, pos + 1);
            if bytes.get(pos) != Some(&b'{') {
                // Alias to a reference, union, or other non-literal type.
                return Ok((None, header_end));
            }
            let (body, end) = parse_composite(text, bytes, pos, &name)?;
            let after = skip_trivia(bytes, end);
            if matches!(bytes.get(after), Some(b'|' | b'&')) {
                // `{...} | ...` is a union, not a plain composite literal.
                return Ok((None, end));
            }
            let decl = Declaration {
                kind,
                name,
                span: Span { start, end },
                body,
            };
            Ok((Some(decl), end))
        }
        DeclKind::Interface => {
            // Skip generics and any extends clause up to the body brace.
            let mut angle = 0usize;
            loop {
                pos = skip_trivia(bytes, pos);
                match bytes.get(pos) {
                    None => bail!("declaration `{name}` has no body"),
                    Some(b'{') if angle == 0 => break,
                    Some(b';') if angle == 0 => return Ok((None, pos + 1)),
                    Some(b'<') => angle += 1,
                    Some(b'>') => {
                        if pos == 0 || bytes[pos - 1] != b'=' {
                            angle = angle.saturating_sub(1);
                        }
                    }
                    Some(b'"' | b'\'' | b'`') => {
                        pos = skip_string(bytes, pos);
                        continue;
                    }
                    Some(_) => {}
                }
                pos += 1;
            }
            let (body, end) = parse_composite(text, bytes, pos, &name)?;
            let decl = Declaration {
                kind,
                name,
                span: Span { start, end },
                body,
            };
            Ok((Some(decl), end))
        }
    }
}

/// Per-chunk accumulator while splitting a composite body into members.
struct Chunk {
    first_meaningful: Option<usize>,
    last_end: usize,
    saw_colon: bool,
    nested: Option<Composite>,
}

impl Chunk {
    fn new(start: usize) -> Self {
        Chunk {
            first_meaningful: None,
            last_end: start,
            saw_colon: false,
            nested: None,
        }
    }

    fn finish(self, span_end: Option<usize>, text: &str, members: &mut Vec<Member>) {
        let Some(first) = self.first_meaningful else {
            return;
        };
        let end = span_end.unwrap_or(self.last_end);
        let span = Span { start: first, end };
        members.push(Member {
            name: member_name(span.text(text)),
            span,
            nested: self.nested,
            state: MemberState::Live,
        });
    }
}

/// Parse one `{ ... }` body starting at its opening brace. Members are
/// split on top-level `;` and `,` boundaries; nesting of every bracket
/// kind plus strings and comments is respected, so separators inside a
/// member's type never split it. Returns the composite and the position
/// just past the closing brace.
fn parse_composite(
    text: &str,
    bytes: &[u8],
    open: usize,
    decl_name: &str,
) -> Result<(Composite, usize)> {
    let mut members = Vec::new();
    let mut chunk = Chunk::new(open + 1);
    let mut pos = open + 1;
    let (mut brace, mut bracket, mut paren, mut angle) = (0usize, 0usize, 0usize, 0usize);

    loop {
        let Some(&b) = bytes.get(pos) else {
            bail!("unterminated body in declaration `{decl_name}`");
        };

        // Trivia never contributes to a member's span. A line that was
        // already commented out therefore never parses as a member again.
        if b == b'/' && bytes.get(pos + 1) == Some(&b'/') {
            pos = skip_line_comment(bytes, pos);
            continue;
        }
        if b == b'/' && bytes.get(pos + 1) == Some(&b'*') {
            pos = skip_block_comment(bytes, pos);
            continue;
        }
        if b.is_ascii_whitespace() {
            pos += 1;
            continue;
        }
        if matches!(b, b'"' | b'\'' | b'`') {
            let end = skip_string(bytes, pos);
            if chunk.first_meaningful.is_none() {
                chunk.first_meaningful = Some(pos);
            }
            chunk.last_end = end;
            pos = end;
            continue;
        }

        // Member boundaries. `;` is never legal inside generic arguments
        // (inline braces are consumed below), so a leftover angle depth at
        // a `;` means the tracker drifted; reset it.
        if b == b';' && brace == 0 && bracket == 0 && paren == 0 {
            angle = 0;
            chunk.finish(Some(pos + 1), text, &mut members);
            chunk = Chunk::new(pos + 1);
            pos += 1;
            continue;
        }
        if b == b',' && brace == 0 && bracket == 0 && paren == 0 && angle == 0 {
            chunk.finish(Some(pos + 1), text, &mut members);
            chunk = Chunk::new(pos + 1);
            pos += 1;
            continue;
        }
        if b == b'}' && brace == 0 {
            chunk.finish(None, text, &mut members);
            let span = Span {
                start: open,
                end: pos + 1,
            };
            return Ok((Composite { span, members }, pos + 1));
        }

        if chunk.first_meaningful.is_none() {
            chunk.first_meaningful = Some(pos);
        }

        match b {
            b'{' => {
                // The first inline literal after the member's top-level
                // colon is its nested composite; parse it recursively so
                // its separators stay internal.
                if chunk.saw_colon && chunk.nested.is_none() && brace == 0 && bracket == 0 && paren == 0 {
                    let (nested, end) = parse_composite(text, bytes, pos, decl_name)?;
                    chunk.nested = Some(nested);
                    chunk.last_end = end;
                    pos = end;
                    continue;
                }
                brace += 1;
            }
            b'}' => brace = brace.saturating_sub(1),
            b'[' => bracket += 1,
            b']' => bracket = bracket.saturating_sub(1),
            b'(' => paren += 1,
            b')' => paren = paren.saturating_sub(1),
            b'<' => angle += 1,
            b'>' => {
                if pos == 0 || bytes[pos - 1] != b'=' {
                    angle = angle.saturating_sub(1);
                }
            }
            b':' if brace == 0 && bracket == 0 && paren == 0 && angle == 0 => {
                chunk.saw_colon = true;
            }
            _ => {}
        }
        chunk.last_end = pos + 1;
        pos += 1;
    }
}

fn member_name(member_text: &str) -> Option<String> {
    let caps = MEMBER_NAME_RE.captures(member_text)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))
        .map(|m| m.as_str().to_string())
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

fn ident_end(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && is_ident_continue(bytes[pos]) {
        pos += 1;
    }
    pos
}

fn preceded_by_dot(bytes: &[u8], pos: usize) -> bool {
    let mut i = pos;
    while i > 0 && bytes[i - 1].is_ascii_whitespace() {
        i -= 1;
    }
    i > 0 && bytes[i - 1] == b'.'
}

fn skip_line_comment(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos] != b'\n' {
        pos += 1;
    }
    pos
}

fn skip_block_comment(bytes: &[u8], mut pos: usize) -> usize {
    pos += 2;
    while pos < bytes.len() {
        if bytes[pos] == b'*' && bytes.get(pos + 1) == Some(&b'/') {
            return pos + 2;
        }
        pos += 1;
    }
    pos
}

/// Skip a string literal starting at its opening quote. Single and double
/// quoted strings stop at an unescaped newline (they cannot span lines);
/// template literals may.
fn skip_string(bytes: &[u8], pos: usize) -> usize {
    let quote = bytes[pos];
    let mut i = pos + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' if quote != b'`' => return i,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Skip whitespace and comments. Returns the position of the next
/// meaningful byte (or end of input).
fn skip_trivia(bytes: &[u8], mut pos: usize) -> usize {
    loop {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if bytes[pos..].starts_with(b"//") {
            pos = skip_line_comment(bytes, pos);
        } else if bytes[pos..].starts_with(b"/*") {
            pos = skip_block_comment(bytes, pos);
        } else {
            return pos;
        }
    }
}

/// Skip a balanced `<...>` generic parameter or argument list, handling
/// inline braces (generic defaults), nested angles, strings, and `=>`
/// arrows. Returns None at end of input.
fn skip_generics(bytes: &[u8], pos: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut brace = 0usize;
    let mut i = pos + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = skip_line_comment(bytes, i);
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = skip_block_comment(bytes, i);
                continue;
            }
            b'"' | b'\'' | b'`' => {
                i = skip_string(bytes, i);
                continue;
            }
            b'{' => brace += 1,
            b'}' => brace = brace.saturating_sub(1),
            b'<' if brace == 0 => depth += 1,
            b'>' if brace == 0 => {
                if bytes[i - 1] != b'=' {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i + 1);
                    }
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}
