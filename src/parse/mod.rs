pub mod decl;
pub mod source;

pub use decl::{Composite, DeclKind, Declaration, Member, MemberState, Span, parse_declarations};
pub use source::SourceFile;
