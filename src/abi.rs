//! Engine ABI: the exported entry points and linear-memory access
//!
//! The engine is a black box living inside one contiguous, byte-addressable
//! memory region. The host drives it through a fixed set of exported entry
//! points and reads results back out of the shared memory at the raw
//! addresses those entry points return. This module pins that contract down
//! as a trait so the rest of the crate never depends on how the engine is
//! actually embedded (WASM instance, dlopen'd library, in-process stub).
//!
//! # Calling convention
//!
//! - All calls are synchronous and non-reentrant; nothing suspends.
//! - Addresses and handles are plain `u32` values; `0` is the universal
//!   "absent / failed" sentinel and is never a valid address or handle.
//! - Buffers the host passes in (`init` archive, `onTextChanged` text) are
//!   host-owned: allocated via [`EngineAbi::allocate`] immediately before the
//!   call and released via [`EngineAbi::free`] immediately after it returns.
//!   The engine does not retain them.
//! - Addresses the engine returns from queries are engine-owned: read-only,
//!   never freed by the host, and only valid until the next call on the same
//!   handle.

/// Raw address into the engine's linear memory (`0` = sentinel)
pub type Addr = u32;

/// Raw engine session handle as returned by `init` (`0` = init failure)
pub type RawHandle = u32;

/// The reserved "absent / failed" address value
pub const NULL_ADDR: Addr = 0;

/// Symbol names every embedding of the engine must export
///
/// An embedder resolving the engine (for example from a WASM module's export
/// table) can check this list up front instead of failing one call at a time.
pub const EXPORTED_ENTRY_POINTS: [&str; 14] = [
    "init",
    "release",
    "onTextChanged",
    "onSelectionChanged",
    "getStructure",
    "getParamHint",
    "getErrorReasons",
    "getSuggestionSize",
    "getSuggestion",
    "getAllSuggestions",
    "onSuggestionClick",
    "getSyntaxTokens",
    "allocate",
    "free",
];

/// The stable entry-point surface of one embedded engine
///
/// One value of an implementing type is one engine instance with its own
/// linear memory; independent instances share no state. Methods mirror the
/// exported symbols one-to-one and perform no marshalling of their own --
/// that is the codec's job.
pub trait EngineAbi {
    /// Read-only view of the engine's linear memory
    fn memory(&self) -> &[u8];

    /// Mutable view of the engine's linear memory
    fn memory_mut(&mut self) -> &mut [u8];

    /// Allocate `size` bytes inside the engine arena, returning the address
    /// of a region the caller now owns, or `0` if the arena is exhausted.
    fn allocate(&mut self, size: u32) -> Addr;

    /// Release a region previously returned by [`EngineAbi::allocate`].
    ///
    /// Must never be called on an address the engine returned from a query;
    /// those are engine-owned.
    fn free(&mut self, addr: Addr);

    /// Create a session from the archive bytes at `archive`..`archive+len`.
    /// Returns the new session handle, or `0` if the archive was rejected.
    /// The archive is consumed synchronously; the pointer is not retained.
    fn init(&mut self, archive: Addr, len: u32) -> RawHandle;

    /// Destroy a session and everything it owns, invalidating `handle` and
    /// every address previously returned for it.
    fn release(&mut self, handle: RawHandle);

    /// Replace the session text with the nul-terminated UTF-16 buffer at
    /// `text` and move the cursor to `cursor`. Triggers a recompute of all
    /// derived state.
    fn on_text_changed(&mut self, handle: RawHandle, text: Addr, cursor: u32);

    /// Move the cursor without changing the text
    fn on_selection_changed(&mut self, handle: RawHandle, cursor: u32);

    /// Command structure preview for the current text; `0` = absent
    fn get_structure(&mut self, handle: RawHandle) -> Addr;

    /// Hint for the parameter under the cursor; `0` = absent
    fn get_param_hint(&mut self, handle: RawHandle) -> Addr;

    /// Diagnostics for the current text; `0` = none
    fn get_error_reasons(&mut self, handle: RawHandle) -> Addr;

    /// Number of suggestions for the current text and cursor
    fn get_suggestion_size(&mut self, handle: RawHandle) -> u32;

    /// Single suggestion record by index; `0` = out of range
    fn get_suggestion(&mut self, handle: RawHandle, which: u32) -> Addr;

    /// All suggestion records; `0` = none
    fn get_all_suggestions(&mut self, handle: RawHandle) -> Addr;

    /// Apply suggestion `which` to the text, returning the resulting edit;
    /// `0` = no edit produced
    fn on_suggestion_click(&mut self, handle: RawHandle, which: u32) -> Addr;

    /// One classification byte per input position; `0` = absent
    fn get_syntax_tokens(&mut self, handle: RawHandle) -> Addr;
}
