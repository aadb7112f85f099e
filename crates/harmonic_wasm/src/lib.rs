//! WASM bridge for `harmonic_core`.
//!
//! The JavaScript front end owns all rendering: these bindings only return
//! curve data, limit cycles and labels as plain JS values.

mod analysis;
mod nonlinearity;
mod shared;

pub use analysis::analyze_describing_function;
pub use nonlinearity::WasmNonlinearity;
