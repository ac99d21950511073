//! In-process stub engine honoring the `EngineAbi` contract
//!
//! The real engine is an opaque black box; for tests we stand in a small
//! deterministic one. It keeps a `Vec<u8>` linear memory, a bump allocator
//! with last-in-first-out reclaim for host buffers, and a separate output
//! region that gets rewritten on every call, which is exactly the reuse
//! behavior the decode-and-copy discipline has to survive. Result payloads
//! are packed with u32 fields on 4-byte boundaries and garbage in the
//! padding bytes.
//!
//! Fixtures are ASCII, so the stub can treat cursor offsets as byte
//! offsets into its text; the host-side code-unit handling is covered by
//! the codec tests.
//!
//! Its "language" is a flat command list loaded from the archive:
//! suggestions are the commands matching the token under the cursor,
//! diagnostics flag an unknown first word, the parameter hint is the
//! matched command's description, and syntax tokens classify the first
//! word / whitespace / the rest.

#![allow(dead_code)]

use cmdlink::{Addr, EngineAbi, RawHandle};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Magic bytes the stub engine requires at the start of an archive
pub const ARCHIVE_MAGIC: &[u8; 4] = b"CPCK";

const HEAP_BASE: u32 = 8;
const OUT_BASE: u32 = 0x1_0000;

struct SessionState {
    commands: Vec<(String, String)>,
    text: String,
    cursor: u32,
    suggestions: Option<Vec<usize>>,
}

/// Deterministic in-process engine for binding tests
pub struct StubEngine {
    mem: Vec<u8>,
    heap_next: u32,
    allocs: HashMap<u32, u32>,
    out_cursor: u32,
    sessions: HashMap<u32, SessionState>,
    next_handle: u32,
    /// Sessions currently alive inside the engine
    pub live_sessions: Arc<AtomicUsize>,
    /// Host-owned arena regions not yet freed
    pub host_allocs: Arc<AtomicUsize>,
}

impl StubEngine {
    pub fn new() -> Self {
        StubEngine {
            mem: vec![0; OUT_BASE as usize],
            heap_next: HEAP_BASE,
            allocs: HashMap::new(),
            out_cursor: OUT_BASE,
            sessions: HashMap::new(),
            next_handle: 1,
            live_sessions: Arc::new(AtomicUsize::new(0)),
            host_allocs: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn ensure(&mut self, end: usize) {
        if self.mem.len() < end {
            self.mem.resize(end, 0);
        }
    }

    // ---- output region writers (engine-side wire packing) ----

    fn begin_out(&mut self) -> Addr {
        self.out_cursor = OUT_BASE;
        OUT_BASE
    }

    fn out_align4(&mut self) {
        while self.out_cursor % 4 != 0 {
            let at = self.out_cursor as usize;
            self.ensure(at + 1);
            self.mem[at] = 0xEE; // padding content is unspecified
            self.out_cursor += 1;
        }
    }

    fn out_u32(&mut self, v: u32) {
        self.out_align4();
        let at = self.out_cursor as usize;
        self.ensure(at + 4);
        self.mem[at..at + 4].copy_from_slice(&v.to_le_bytes());
        self.out_cursor += 4;
    }

    fn out_u16(&mut self, v: u16) {
        let at = self.out_cursor as usize;
        self.ensure(at + 2);
        self.mem[at..at + 2].copy_from_slice(&v.to_le_bytes());
        self.out_cursor += 2;
    }

    fn out_u8(&mut self, v: u8) {
        let at = self.out_cursor as usize;
        self.ensure(at + 1);
        self.mem[at] = v;
        self.out_cursor += 1;
    }

    fn out_str(&mut self, s: &str) {
        let units: Vec<u16> = s.encode_utf16().collect();
        self.out_u32(units.len() as u32);
        for u in units {
            self.out_u16(u);
        }
    }

    // ---- session helpers ----

    fn token_start(text: &str, cursor: u32) -> usize {
        let upto = &text[..(cursor as usize).min(text.len())];
        upto.rfind(' ').map(|i| i + 1).unwrap_or(0)
    }

    fn first_word(text: &str) -> &str {
        text.split(' ').next().unwrap_or("")
    }

    fn ensure_suggestions(state: &mut SessionState) -> &Vec<usize> {
        if state.suggestions.is_none() {
            let start = Self::token_start(&state.text, state.cursor);
            let end = (state.cursor as usize).min(state.text.len());
            let prefix = &state.text[start..end];
            let matches: Vec<usize> = state
                .commands
                .iter()
                .enumerate()
                .filter(|(_, (title, _))| title.starts_with(prefix))
                .map(|(i, _)| i)
                .collect();
            state.suggestions = Some(matches);
        }
        state.suggestions.as_ref().unwrap()
    }

    fn parse_archive(bytes: &[u8]) -> Option<Vec<(String, String)>> {
        if bytes.len() < 5 || &bytes[..4] != ARCHIVE_MAGIC {
            return None;
        }
        let count = bytes[4] as usize;
        let mut at = 5;
        let mut read_str = |at: &mut usize| -> Option<String> {
            let len = *bytes.get(*at)? as usize;
            *at += 1;
            let s = bytes.get(*at..*at + len)?;
            *at += len;
            String::from_utf8(s.to_vec()).ok()
        };
        let mut commands = Vec::with_capacity(count);
        for _ in 0..count {
            let title = read_str(&mut at)?;
            let desc = read_str(&mut at)?;
            commands.push((title, desc));
        }
        if at != bytes.len() {
            return None; // trailing junk: reject wholesale
        }
        Some(commands)
    }
}

impl EngineAbi for StubEngine {
    fn memory(&self) -> &[u8] {
        &self.mem
    }

    fn memory_mut(&mut self) -> &mut [u8] {
        &mut self.mem
    }

    fn allocate(&mut self, size: u32) -> Addr {
        match self.heap_next.checked_add(size) {
            Some(end) if end <= OUT_BASE => {}
            _ => return 0, // host heap exhausted
        }
        let addr = self.heap_next;
        self.heap_next += size;
        self.allocs.insert(addr, size);
        self.host_allocs.fetch_add(1, Ordering::SeqCst);
        addr
    }

    fn free(&mut self, addr: Addr) {
        let size = self
            .allocs
            .remove(&addr)
            .expect("free of an address the host does not own");
        self.host_allocs.fetch_sub(1, Ordering::SeqCst);
        if addr + size == self.heap_next {
            self.heap_next = addr;
        }
    }

    fn init(&mut self, archive: Addr, len: u32) -> RawHandle {
        let start = archive as usize;
        let bytes = self.mem[start..start + len as usize].to_vec();
        match Self::parse_archive(&bytes) {
            Some(commands) => {
                let handle = self.next_handle;
                self.next_handle += 1;
                self.sessions.insert(
                    handle,
                    SessionState {
                        commands,
                        text: String::new(),
                        cursor: 0,
                        suggestions: None,
                    },
                );
                self.live_sessions.fetch_add(1, Ordering::SeqCst);
                handle
            }
            None => 0,
        }
    }

    fn release(&mut self, handle: RawHandle) {
        self.sessions
            .remove(&handle)
            .expect("release of an unknown handle");
        self.live_sessions.fetch_sub(1, Ordering::SeqCst);
    }

    fn on_text_changed(&mut self, handle: RawHandle, text: Addr, cursor: u32) {
        let mut units = Vec::new();
        let mut at = text as usize;
        loop {
            let u = u16::from_le_bytes([self.mem[at], self.mem[at + 1]]);
            if u == 0 {
                break;
            }
            units.push(u);
            at += 2;
        }
        let new_text = String::from_utf16(&units).expect("host sent malformed UTF-16");
        let state = self.sessions.get_mut(&handle).expect("unknown handle");
        if state.text != new_text {
            state.text = new_text;
            state.suggestions = None;
        }
        if state.cursor != cursor {
            state.cursor = cursor;
            state.suggestions = None;
        }
    }

    fn on_selection_changed(&mut self, handle: RawHandle, cursor: u32) {
        let state = self.sessions.get_mut(&handle).expect("unknown handle");
        if state.cursor != cursor {
            state.cursor = cursor;
            state.suggestions = None;
        }
    }

    fn get_structure(&mut self, handle: RawHandle) -> Addr {
        let state = self.sessions.get(&handle).expect("unknown handle");
        let word = Self::first_word(&state.text);
        let known = state.commands.iter().any(|(t, _)| t == word);
        if !known {
            return 0;
        }
        let structure = format!("{} <args>", word);
        let addr = self.begin_out();
        self.out_str(&structure);
        addr
    }

    fn get_param_hint(&mut self, handle: RawHandle) -> Addr {
        let state = self.sessions.get(&handle).expect("unknown handle");
        let word = Self::first_word(&state.text);
        if state.cursor as usize <= word.len() {
            return 0;
        }
        let hint = state
            .commands
            .iter()
            .find(|(t, _)| t == word)
            .map(|(_, d)| d.clone());
        match hint {
            Some(hint) => {
                let addr = self.begin_out();
                self.out_str(&hint);
                addr
            }
            None => 0,
        }
    }

    fn get_error_reasons(&mut self, handle: RawHandle) -> Addr {
        let state = self.sessions.get(&handle).expect("unknown handle");
        let word = Self::first_word(&state.text);
        let known = state.commands.iter().any(|(t, _)| t == word);
        if word.is_empty() || known {
            return 0;
        }
        let end = word.encode_utf16().count() as u32;
        let message = format!("unknown command: {}", word);
        let addr = self.begin_out();
        self.out_u32(1);
        self.out_u32(0);
        self.out_u32(end);
        self.out_str(&message);
        addr
    }

    fn get_suggestion_size(&mut self, handle: RawHandle) -> u32 {
        let state = self.sessions.get_mut(&handle).expect("unknown handle");
        Self::ensure_suggestions(state).len() as u32
    }

    fn get_suggestion(&mut self, handle: RawHandle, which: u32) -> Addr {
        let state = self.sessions.get_mut(&handle).expect("unknown handle");
        let matches = Self::ensure_suggestions(state).clone();
        match matches.get(which as usize) {
            Some(&idx) => {
                let (title, desc) = state.commands[idx].clone();
                let title_units: Vec<u16> = title.encode_utf16().collect();
                let desc_units: Vec<u16> = desc.encode_utf16().collect();
                let addr = self.begin_out();
                self.out_u32(title_units.len() as u32);
                self.out_u32(desc_units.len() as u32);
                for u in title_units {
                    self.out_u16(u);
                }
                for u in desc_units {
                    self.out_u16(u);
                }
                addr
            }
            None => 0,
        }
    }

    fn get_all_suggestions(&mut self, handle: RawHandle) -> Addr {
        let state = self.sessions.get_mut(&handle).expect("unknown handle");
        let matches = Self::ensure_suggestions(state).clone();
        if matches.is_empty() {
            return 0;
        }
        let entries: Vec<(String, String)> =
            matches.iter().map(|&i| state.commands[i].clone()).collect();
        let addr = self.begin_out();
        self.out_u32(entries.len() as u32);
        for (title, desc) in entries {
            let title_units: Vec<u16> = title.encode_utf16().collect();
            let desc_units: Vec<u16> = desc.encode_utf16().collect();
            self.out_u32(title_units.len() as u32);
            self.out_u32(desc_units.len() as u32);
            for u in title_units {
                self.out_u16(u);
            }
            for u in desc_units {
                self.out_u16(u);
            }
        }
        addr
    }

    fn on_suggestion_click(&mut self, handle: RawHandle, which: u32) -> Addr {
        let state = self.sessions.get_mut(&handle).expect("unknown handle");
        let matches = Self::ensure_suggestions(state).clone();
        let idx = match matches.get(which as usize) {
            Some(&idx) => idx,
            None => return 0,
        };
        let title = state.commands[idx].0.clone();
        let start = Self::token_start(&state.text, state.cursor);
        let end = (state.cursor as usize).min(state.text.len());
        let new_text = format!("{}{}{}", &state.text[..start], title, &state.text[end..]);
        let cursor_position = (start + title.len()) as u32;
        let addr = self.begin_out();
        self.out_u32(cursor_position);
        self.out_str(&new_text);
        addr
    }

    fn get_syntax_tokens(&mut self, handle: RawHandle) -> Addr {
        let state = self.sessions.get(&handle).expect("unknown handle");
        if state.text.is_empty() {
            return 0;
        }
        let word = Self::first_word(&state.text).to_string();
        let known = state.commands.iter().any(|(t, _)| t == &word);
        let classes: Vec<u8> = state
            .text
            .chars()
            .enumerate()
            .map(|(i, c)| {
                if c == ' ' {
                    12 // whitespace
                } else if i < word.len() {
                    if known {
                        7 // command
                    } else {
                        0 // unknown
                    }
                } else {
                    14 // literal argument
                }
            })
            .collect();
        let addr = self.begin_out();
        self.out_u32(classes.len() as u32);
        for c in classes {
            self.out_u8(c);
        }
        addr
    }
}

/// Serialize a command list in the stub engine's archive format
pub fn build_archive(commands: &[(&str, &str)]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(ARCHIVE_MAGIC);
    bytes.push(commands.len() as u8);
    for (title, desc) in commands {
        bytes.push(title.len() as u8);
        bytes.extend_from_slice(title.as_bytes());
        bytes.push(desc.len() as u8);
        bytes.extend_from_slice(desc.as_bytes());
    }
    bytes
}

/// The archive used by the end-to-end fixtures
pub fn fixture_archive() -> Vec<u8> {
    build_archive(&[
        ("say", "Send a chat message"),
        ("seed", "Show the world seed"),
        ("setblock", "Place a block"),
    ])
}
