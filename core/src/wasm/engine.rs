//! Compilation of guest modules.
//!
//! A guest hands strings to the host as pointers into its exported linear
//! memory, so the one structural check made before instantiation is that
//! this memory fits the host's RAM limit.

use anyhow::{Context, Result};
use std::path::Path;
use wasmtime::{Engine, ExternType, Module};

/// WASM page size in bytes
pub const WASM_PAGE_SIZE: usize = 64 * 1024;

/// Compiles guest modules; one engine is shared by every guest of a process.
pub struct WasmEngine {
    engine: Engine,
}

impl WasmEngine {
    pub fn new() -> Result<Self> {
        Ok(Self {
            engine: Engine::default(),
        })
    }

    pub(crate) fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Compile a guest from binary or text WASM.
    pub fn load_module(&self, bytes: &[u8]) -> Result<Module> {
        Module::new(&self.engine, bytes).context("Failed to compile guest module")
    }

    /// Load a WASM module from a `.wasm` (or `.wat`) file
    pub fn load_module_file(&self, path: &Path) -> Result<Module> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read module: {}", path.display()))?;
        tracing::debug!("Compiling guest module {} ({} bytes)", path.display(), bytes.len());
        self.load_module(&bytes)
    }

    /// Check that every exported memory's initial size fits in `ram_limit` bytes.
    ///
    /// Growth past the limit is refused later by the store limiter; this only
    /// rejects guests that could never be instantiated.
    pub fn validate_module_memory(module: &Module, ram_limit: usize) -> Result<()> {
        let memories = module.exports().filter_map(|export| match export.ty() {
            ExternType::Memory(ty) => Some((export.name(), ty)),
            _ => None,
        });

        for (name, ty) in memories {
            let initial_bytes = ty.minimum() as usize * WASM_PAGE_SIZE;
            if initial_bytes > ram_limit {
                anyhow::bail!(
                    "Guest memory '{}' starts at {} bytes ({} pages), over the {} byte limit",
                    name,
                    initial_bytes,
                    ty.minimum(),
                    ram_limit
                );
            }
            if ty.maximum().is_none() {
                tracing::debug!("Guest memory '{}' is unbounded, capping at {} bytes", name, ram_limit);
            }
        }
        Ok(())
    }
}
