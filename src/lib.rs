//! Script-binding layer for a debugger core.
//!
//! This crate exposes a debugger core's state (breakpoints, tracepoints,
//! registers, symbol tables, disassembly, memory) as named operations that an
//! embedding script or GUI runtime can call, and routes the core's text
//! output either into per-call capture buffers or to the live display.
//!
//! The two external runtimes are consumed behind traits: [`DebuggerCore`]
//! for the debugger engine and [`ScriptRuntime`] for the embedding runtime.
//! All calls go through [`Session::call`], which isolates core errors from
//! the embedding runtime's control flow.

pub mod bindings;
pub mod debugger;
pub mod pump;
pub mod runtime;
pub mod session;
pub mod sink;

pub use bindings::{CallOutcome, CommandError};
pub use debugger::{
    BreakpointInfo, BreakpointKind, ByteOrder, CommandClass, CoreError, CoreOutput, CoreResult,
    DebuggerCore, Disposition, FunctionSym, LineEntry, SourceLocation, TracepointInfo,
};
pub use pump::EventPump;
pub use runtime::{PointEvent, ScriptRuntime};
pub use session::Session;
pub use sink::Stream;
