//! WASM guest host
//!
//! Provides abstractions over wasmtime for loading a game module and reading
//! data out of its linear memory.
//!
//! # Module Organization
//!
//! - [`engine`] - Shared wasmtime engine and module validation
//! - [`cstr`] - NUL-terminated strings in foreign linear memory
//! - [`instance`] - Instantiated guest with its host imports
//!
//! # Key Types
//!
//! - [`WasmEngine`] - Shared WASM engine (one per application)
//! - [`GuestModule`] - Loaded and instantiated guest
//! - [`ForeignModule`] - Anything exposing linear memory plus `dealloc_str`

pub mod cstr;
pub mod engine;
pub mod instance;


pub use cstr::{ForeignError, ForeignModule, read_c_string, scan_c_string};
pub use engine::WasmEngine;
pub use instance::{DEFAULT_RAM_LIMIT, GuestModule, HostState};
