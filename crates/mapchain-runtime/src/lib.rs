/*
 * mapchain-runtime
 * Copyright (c) 2025 Posit, PBC
 *
 * Host abstraction layer for mapchain.
 *
 * The chain loader never touches the filesystem itself. Everything it needs
 * from the outside world goes through the `ChainHost` trait:
 *
 * - NativeHost: std::fs access (default for native callers)
 * - MemoryHost: in-memory file table (tests, bundler plugins, WASM)
 * - NoopHost: no files and no map discovery
 */

pub mod discovery;
mod memory;
mod native;
pub mod paths;
mod traits;

// Re-export core types (API surface)
pub use traits::{ChainHost, HostError, HostResult, NoopHost};

// Re-export host implementations
pub use memory::MemoryHost;
pub use native::NativeHost;

pub use discovery::{MapLocation, source_mapping_url};

/// Create the default host for the current platform.
pub fn default_host() -> NativeHost {
    NativeHost::new()
}
