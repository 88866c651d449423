//! Guest instance implementation for loaded WASM modules

use anyhow::{Context, Result};
use wasmtime::{
    Caller, Instance, Linker, Memory, Module, Store, StoreLimits, StoreLimitsBuilder, TypedFunc,
};

use super::cstr::{ForeignError, ForeignModule, read_c_string, scan_c_string};
use super::engine::WasmEngine;

/// Fallback linear memory limit (16MB)
pub const DEFAULT_RAM_LIMIT: usize = 16 * 1024 * 1024;

/// Host-side state stored in the wasmtime store
pub struct HostState {
    /// Guest linear memory (set after instantiation)
    pub memory: Option<Memory>,
    /// Lines the guest logged through `host_log`
    pub log_lines: Vec<String>,
    limits: StoreLimits,
}

impl HostState {
    fn with_ram_limit(ram_limit: usize) -> Self {
        Self {
            memory: None,
            log_lines: Vec::new(),
            limits: StoreLimitsBuilder::new().memory_size(ram_limit).build(),
        }
    }
}

/// Register the host functions a guest may import
pub fn register_host_ffi(linker: &mut Linker<HostState>) -> Result<()> {
    linker.func_wrap("env", "host_log", host_log)?;
    Ok(())
}

/// Log a NUL-terminated string owned by the guest
///
/// The guest keeps ownership, so nothing is deallocated.
fn host_log(mut caller: Caller<'_, HostState>, ptr: u32) {
    let Some(memory) = caller.data().memory else {
        return;
    };
    let message = match scan_c_string(memory.data(&caller), ptr) {
        Ok(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Err(e) => {
            tracing::warn!("host_log: {}", e);
            return;
        }
    };
    tracing::info!("[GUEST] {}", message);
    caller.data_mut().log_lines.push(message);
}

/// A loaded and instantiated guest
///
/// The guest must export `memory` and `dealloc_str(i32)`.
pub struct GuestModule {
    store: Store<HostState>,
    instance: Instance,
    memory: Memory,
    dealloc_str_fn: TypedFunc<u32, ()>,
    init_fn: Option<TypedFunc<(), ()>>,
}

impl GuestModule {
    /// Instantiate a guest with the fallback RAM limit (16MB)
    pub fn new(engine: &WasmEngine, module: &Module) -> Result<Self> {
        Self::with_ram_limit(engine, module, DEFAULT_RAM_LIMIT)
    }

    /// Instantiate a guest whose linear memory may not grow past `ram_limit` bytes
    pub fn with_ram_limit(engine: &WasmEngine, module: &Module, ram_limit: usize) -> Result<Self> {
        WasmEngine::validate_module_memory(module, ram_limit)?;

        let mut store = Store::new(engine.engine(), HostState::with_ram_limit(ram_limit));
        store.limiter(|state| &mut state.limits);

        let mut linker = Linker::new(engine.engine());
        register_host_ffi(&mut linker)?;

        let instance = linker
            .instantiate(&mut store, module)
            .context("Failed to instantiate WASM module")?;

        let memory = instance
            .get_memory(&mut store, "memory")
            .context("Guest does not export `memory`")?;
        store.data_mut().memory = Some(memory);

        let dealloc_str_fn = instance
            .get_typed_func::<u32, ()>(&mut store, "dealloc_str")
            .context("Guest does not export `dealloc_str(i32)`")?;
        let init_fn = instance.get_typed_func::<(), ()>(&mut store, "init").ok();

        Ok(Self {
            store,
            instance,
            memory,
            dealloc_str_fn,
            init_fn,
        })
    }

    /// Call the guest's `init` export, if it has one
    pub fn init(&mut self) -> Result<()> {
        if let Some(init) = &self.init_fn {
            init.call(&mut self.store, ())
                .context("WASM init() failed")?;
        }
        Ok(())
    }

    /// Call an exported `() -> i32` function
    pub fn call_u32(&mut self, name: &str) -> Result<u32> {
        let func = self
            .instance
            .get_typed_func::<(), u32>(&mut self.store, name)
            .with_context(|| format!("Guest does not export `{}() -> i32`", name))?;
        func.call(&mut self.store, ())
            .with_context(|| format!("WASM {}() failed", name))
    }

    /// Call an export that returns a guest-allocated C string and take it
    ///
    /// The string is copied out and released with `dealloc_str`.
    pub fn call_string_export(&mut self, name: &str) -> Result<String> {
        let ptr = self.call_u32(name)?;
        read_c_string(self, ptr)
            .with_context(|| format!("Failed to read string returned by {}()", name))
    }

    /// Lines the guest has logged through `host_log`
    pub fn log_lines(&self) -> &[String] {
        &self.store.data().log_lines
    }
}

impl ForeignModule for GuestModule {
    fn memory(&self) -> &[u8] {
        self.memory.data(&self.store)
    }

    fn dealloc_str(&mut self, ptr: u32) -> Result<(), ForeignError> {
        self.dealloc_str_fn
            .call(&mut self.store, ptr)
            .map_err(|e| ForeignError::Dealloc {
                ptr,
                message: format!("{:#}", e),
            })
    }
}
