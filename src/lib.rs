//! cmdlink - Host-Side Binding for an Embedded Command-Assistance Engine
//!
//! cmdlink is the marshalling layer between a host process and a
//! command-assistance engine that lives entirely inside one contiguous,
//! byte-addressable memory region. The host has no access to the engine's
//! native data structures, no shared runtime and no reflection; everything
//! crosses the boundary as raw addresses into the engine's linear memory.
//! This crate owns that boundary: a fixed set of exported entry points, a
//! manual allocation discipline, and a byte-level wire encoding for every
//! payload type (scalars, length-prefixed arrays, length-prefixed UTF-16
//! text).
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use cmdlink::{Manifest, Session};
//!
//! // Select and load the versioned resource archive
//! let manifest = Manifest::from_file("assets/manifest.json")?;
//! let archive = manifest.load_archive("assets".as_ref(), cmdlink::ARCHIVE_EXT)?;
//!
//! // `engine` is anything implementing EngineAbi, e.g. a WASM instance
//! let mut session = Session::init(engine, &archive)?;
//!
//! session.on_text_changed("say ", 4)?;
//! for s in session.all_suggestions()? {
//!     println!("{}: {}", s.title, s.description);
//! }
//! if let Some(edit) = session.apply_suggestion(0)? {
//!     println!("-> {:?} (cursor {})", edit.new_text, edit.cursor_position);
//! }
//!
//! session.release();
//! # Ok::<(), cmdlink::BindingError>(())
//! ```
//!
//! # Architecture
//!
//! Data flows one way per call:
//!
//! ```text
//! Session (typed surface)
//!    │ encode request        codec + arena writes
//!    ▼
//! EngineAbi entry point ──► raw address (0 = absent/failed)
//!    │ decode response       codec + arena reads, single copying pass
//!    ▼
//! host-owned values (Suggestion, ErrorReason, EditResult, tokens)
//! ```
//!
//! Input buffers are host-owned and freed as soon as the call returns;
//! output buffers are engine-owned and only valid until the next call on
//! the same handle, which is why every decode copies out immediately.
//!
//! The engine is not reentrant and every call is synchronous; `Session`
//! serializes access by requiring `&mut self`. Independent sessions own
//! independent engine instances and may live on independent threads.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Module declarations
/// Engine ABI trait, raw address/handle types, exported symbol names
pub mod abi;
/// Typed, bounds-checked views over linear memory
pub mod arena;
/// Wire schemas: request encoding and response decoding
pub mod codec;
/// Error types for binding operations
pub mod error;
/// Resource archive manifest and version selection
pub mod manifest;
/// Session lifetime and the typed client surface
pub mod session;
/// Host-native result types
pub mod types;

// Re-exports for consumers

pub use crate::abi::{Addr, EngineAbi, RawHandle, EXPORTED_ENTRY_POINTS, NULL_ADDR};
pub use crate::error::{BindingError, Result};
pub use crate::manifest::{Manifest, ARCHIVE_EXT, DEFAULT_CHANNEL};
pub use crate::session::Session;
pub use crate::types::{EditResult, ErrorReason, Suggestion, SyntaxTokenKind};

// Version information
/// Library version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library major version
pub const VERSION_MAJOR: u32 = 0;

/// Library minor version
pub const VERSION_MINOR: u32 = 1;

/// Library patch version
pub const VERSION_PATCH: u32 = 0;
