//! Host-native result types decoded from engine responses
//!
//! All of these are derived, read-only snapshots of the engine's text state
//! at the moment of the query. They own their data outright; nothing here
//! borrows from the engine's linear memory.

/// One completion candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// Index of this suggestion in the engine's current result set
    pub id: u32,
    /// Replacement text inserted when the suggestion is applied
    pub title: String,
    /// Human-readable description of the candidate
    pub description: String,
}

/// One diagnostic over a span of the current text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReason {
    /// First affected UTF-16 code unit index
    pub start: u32,
    /// One past the last affected code unit index
    pub end: u32,
    /// Diagnostic message
    pub message: String,
}

/// Result of applying a suggestion to the current text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditResult {
    /// Cursor position after the edit, in UTF-16 code units
    pub cursor_position: u32,
    /// Full replacement text
    pub new_text: String,
}

/// Syntax classification of one input position
///
/// The engine emits one byte per UTF-16 code unit of the current text.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxTokenKind {
    /// Unclassified input
    Unknown = 0,
    /// Boolean literal
    Boolean = 1,
    /// Floating-point literal
    Float = 2,
    /// Integer literal
    Integer = 3,
    /// Punctuation
    Symbol = 4,
    /// Identifier
    Id = 5,
    /// Target selector
    TargetSelector = 6,
    /// Command name
    Command = 7,
    /// Bracket at nesting depth 1
    Bracket1 = 8,
    /// Bracket at nesting depth 2
    Bracket2 = 9,
    /// Bracket at nesting depth 3
    Bracket3 = 10,
    /// String literal
    String = 11,
    /// Whitespace or other inert input
    Null = 12,
    /// Numeric range
    Range = 13,
    /// Keyword literal
    Literal = 14,
}

impl SyntaxTokenKind {
    /// Convert from the wire classification byte
    #[inline]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(SyntaxTokenKind::Unknown),
            1 => Some(SyntaxTokenKind::Boolean),
            2 => Some(SyntaxTokenKind::Float),
            3 => Some(SyntaxTokenKind::Integer),
            4 => Some(SyntaxTokenKind::Symbol),
            5 => Some(SyntaxTokenKind::Id),
            6 => Some(SyntaxTokenKind::TargetSelector),
            7 => Some(SyntaxTokenKind::Command),
            8 => Some(SyntaxTokenKind::Bracket1),
            9 => Some(SyntaxTokenKind::Bracket2),
            10 => Some(SyntaxTokenKind::Bracket3),
            11 => Some(SyntaxTokenKind::String),
            12 => Some(SyntaxTokenKind::Null),
            13 => Some(SyntaxTokenKind::Range),
            14 => Some(SyntaxTokenKind::Literal),
            _ => None,
        }
    }
}
