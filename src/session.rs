//! Session lifetime and the typed client surface
//!
//! [`Session`] owns one engine instance together with the non-zero handle
//! `init` produced for it, and is the only way to reach the query entry
//! points. The handle state machine (uninitialized, active, released) is
//! enforced by construction: a `Session` can only be obtained from a
//! successful [`Session::init`], every method requires `&mut self`, and
//! [`Session::release`] consumes the value. Use-after-release does not
//! compile.
//!
//! Each call follows the same shape: encode the request into a
//! host-allocated arena region, invoke the entry point, copy the response
//! out of engine-owned memory, and leave the engine free to reuse its
//! output region on the next call. Host input buffers are freed before the
//! call returns to the caller, on error paths included.

use log::{debug, warn};
use std::num::NonZeroU32;

use crate::abi::{EngineAbi, NULL_ADDR};
use crate::arena::{MemView, MemViewMut};
use crate::codec;
use crate::error::{BindingError, Result};
use crate::types::{EditResult, ErrorReason, Suggestion, SyntaxTokenKind};

/// One live engine session
///
/// Created by [`Session::init`] from a resource archive; destroyed by
/// [`Session::release`] or by dropping the value. The engine instance is
/// owned outright, so no two sessions can ever alias one handle.
pub struct Session<E: EngineAbi> {
    engine: E,
    handle: NonZeroU32,
}

impl<E: EngineAbi> Session<E> {
    /// Initialize a fresh engine instance with a resource archive
    ///
    /// The archive bytes are copied into the engine arena, consumed
    /// synchronously by the engine's `init`, and freed before this function
    /// returns. A zero handle from the engine means the archive was
    /// malformed or version-incompatible and surfaces as
    /// [`BindingError::Init`]; no resources stay allocated in that case.
    pub fn init(mut engine: E, archive: &[u8]) -> Result<Self> {
        let len = u32::try_from(archive.len()).map_err(|_| {
            BindingError::Allocation(format!(
                "resource archive of {} bytes exceeds 32-bit arena addressing",
                archive.len()
            ))
        })?;
        let addr = engine.allocate(len);
        if addr == NULL_ADDR {
            return Err(BindingError::Allocation(format!(
                "engine arena could not provide {} bytes for the resource archive",
                len
            )));
        }

        let copied = MemViewMut::new(engine.memory_mut()).write_bytes(addr, archive);
        if let Err(e) = copied {
            engine.free(addr);
            return Err(e);
        }

        let raw = engine.init(addr, len);
        engine.free(addr);

        match NonZeroU32::new(raw) {
            Some(handle) => {
                debug!(
                    "engine session {} initialized from {}-byte archive",
                    handle, len
                );
                Ok(Session { engine, handle })
            }
            None => {
                warn!("engine rejected {}-byte resource archive", len);
                Err(BindingError::Init(
                    "engine rejected the resource archive".to_string(),
                ))
            }
        }
    }

    /// Replace the session text and cursor position
    ///
    /// `cursor` is measured in UTF-16 code units. All derived results
    /// (suggestions, diagnostics, classifications) are recomputed from this
    /// state on demand; addresses returned by earlier queries become stale.
    pub fn on_text_changed(&mut self, text: &str, cursor: u32) -> Result<()> {
        let units: Vec<u16> = text.encode_utf16().collect();
        let size = codec::text_buffer_size(units.len())?;
        let addr = self.engine.allocate(size);
        if addr == NULL_ADDR {
            return Err(BindingError::Allocation(format!(
                "engine arena could not provide {} bytes for the text buffer",
                size
            )));
        }

        let encoded = codec::encode_text(&mut MemViewMut::new(self.engine.memory_mut()), addr, &units);
        if let Err(e) = encoded {
            self.engine.free(addr);
            return Err(e);
        }

        self.engine.on_text_changed(self.handle.get(), addr, cursor);
        self.engine.free(addr);
        Ok(())
    }

    /// Move the cursor without changing the text
    pub fn on_selection_changed(&mut self, cursor: u32) {
        self.engine.on_selection_changed(self.handle.get(), cursor);
    }

    /// Command structure preview for the current text
    pub fn structure(&mut self) -> Result<Option<String>> {
        let addr = self.engine.get_structure(self.handle.get());
        codec::decode_string(MemView::new(self.engine.memory()), addr)
    }

    /// Hint for the parameter under the cursor
    pub fn param_hint(&mut self) -> Result<Option<String>> {
        let addr = self.engine.get_param_hint(self.handle.get());
        codec::decode_string(MemView::new(self.engine.memory()), addr)
    }

    /// Diagnostics for the current text
    pub fn error_reasons(&mut self) -> Result<Vec<ErrorReason>> {
        let addr = self.engine.get_error_reasons(self.handle.get());
        codec::decode_error_reasons(MemView::new(self.engine.memory()), addr)
    }

    /// Number of suggestions for the current text and cursor
    pub fn suggestion_count(&mut self) -> u32 {
        self.engine.get_suggestion_size(self.handle.get())
    }

    /// One suggestion by index; `None` if the index is out of range
    pub fn suggestion(&mut self, which: u32) -> Result<Option<Suggestion>> {
        let addr = self.engine.get_suggestion(self.handle.get(), which);
        codec::decode_suggestion(MemView::new(self.engine.memory()), addr, which)
    }

    /// The full suggestion list for the current text and cursor
    pub fn all_suggestions(&mut self) -> Result<Vec<Suggestion>> {
        let addr = self.engine.get_all_suggestions(self.handle.get());
        codec::decode_suggestions(MemView::new(self.engine.memory()), addr)
    }

    /// Apply suggestion `which`, returning the resulting edit
    ///
    /// `None` means the engine produced no edit (stale index, or no
    /// suggestion set computed yet).
    pub fn apply_suggestion(&mut self, which: u32) -> Result<Option<EditResult>> {
        let addr = self.engine.on_suggestion_click(self.handle.get(), which);
        codec::decode_edit(MemView::new(self.engine.memory()), addr)
    }

    /// Syntax classification of every input position
    pub fn syntax_tokens(&mut self) -> Result<Option<Vec<SyntaxTokenKind>>> {
        let addr = self.engine.get_syntax_tokens(self.handle.get());
        codec::decode_syntax_tokens(MemView::new(self.engine.memory()), addr)
    }

    /// Destroy the session, invalidating the handle and every address the
    /// engine ever returned for it
    ///
    /// Dropping the session has the same effect; this form just states the
    /// intent at the call site.
    pub fn release(self) {}
}

impl<E: EngineAbi> Drop for Session<E> {
    fn drop(&mut self) {
        debug!("engine session {} released", self.handle);
        self.engine.release(self.handle.get());
    }
}
