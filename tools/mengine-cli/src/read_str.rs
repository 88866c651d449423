//! Read-str command - print a string handed out by a guest module

use anyhow::Result;
use clap::Args;
use mengine_core::{DEFAULT_RAM_LIMIT, GuestModule, WasmEngine};
use std::path::PathBuf;

/// Arguments for the read-str command
#[derive(Args)]
pub struct ReadStrArgs {
    /// Guest module (.wasm or .wat)
    pub module: PathBuf,

    /// Exported `() -> i32` function returning a NUL-terminated string
    pub export: String,

    /// Skip calling the guest's `init` export first
    #[arg(long)]
    pub no_init: bool,

    /// Linear memory limit in bytes
    #[arg(long, default_value_t = DEFAULT_RAM_LIMIT)]
    pub ram_limit: usize,
}

/// Execute the read-str command
pub fn execute(args: ReadStrArgs) -> Result<()> {
    let text = read_export(&args)?;
    println!("{}", text);
    Ok(())
}

fn read_export(args: &ReadStrArgs) -> Result<String> {
    let engine = WasmEngine::new()?;
    let module = engine.load_module_file(&args.module)?;
    let mut guest = GuestModule::with_ram_limit(&engine, &module, args.ram_limit)?;

    if !args.no_init {
        guest.init()?;
    }
    for line in guest.log_lines() {
        tracing::debug!("guest logged during init: {}", line);
    }
    guest.call_string_export(&args.export)
}
