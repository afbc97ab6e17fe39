//! The debugger-core boundary.
//!
//! Everything hard lives on the other side of [`DebuggerCore`]: symbol and
//! line tables, expression evaluation, target control, disassembly. This
//! crate only marshals. The core's internal error machinery surfaces here
//! as [`CoreError`] values; no unwind ever crosses this boundary.

mod types;

pub use types::{
    BreakpointInfo, BreakpointKind, ByteOrder, CommandClass, Disposition, FunctionSym, LineEntry,
    SourceLocation, TracepointInfo,
};

use crate::sink::Stream;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// An internal error reported by the core's error machinery.
    #[error("{0}")]
    Error(String),
    /// A long operation observed the cancellation flag and stopped.
    #[error("operation cancelled")]
    Cancelled,
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Where core-generated text goes, and the only yield point long operations
/// get. `check_cancelled` services the event pump and reports whether the
/// user asked to cancel; a long operation must poll it and stop cooperatively.
pub trait CoreOutput {
    fn put(&mut self, stream: Stream, text: &str);
    fn check_cancelled(&mut self) -> bool;
}

/// The external debugger engine, consumed as-is.
///
/// Text-producing operations take a [`CoreOutput`] so their output flows
/// through the session's routing funnel. `print_source_lines` prints the
/// half-open line range `[from, to)`.
pub trait DebuggerCore {
    fn execute_command(&mut self, line: &str, out: &mut dyn CoreOutput) -> CoreResult<()>;
    fn command_class(&self, line: &str) -> CommandClass;

    fn breakpoints(&self) -> Vec<BreakpointInfo>;
    fn breakpoint(&self, number: u32) -> Option<BreakpointInfo>;
    fn set_breakpoint(
        &mut self,
        file: &str,
        line: u32,
        kind: BreakpointKind,
        disposition: Disposition,
    ) -> CoreResult<BreakpointInfo>;

    fn tracepoints(&self) -> Vec<TracepointInfo>;
    fn tracepoint(&self, number: u32) -> Option<TracepointInfo>;
    /// Replace a tracepoint's action list. `step_count` is the count parsed
    /// out of a `while-stepping` action, if any.
    fn set_tracepoint_actions(
        &mut self,
        number: u32,
        actions: Vec<String>,
        step_count: Option<u32>,
    ) -> CoreResult<()>;

    fn has_symbols(&self) -> bool;
    /// Resolve a linespec (`file:line`, `function`, `*addr`, ...) to zero or
    /// more source locations.
    fn resolve_line_spec(&self, spec: &str) -> CoreResult<Vec<SourceLocation>>;
    /// Location of the selected frame, falling back to the stop PC.
    fn current_location(&self) -> CoreResult<SourceLocation>;
    fn stop_pc(&self) -> u64;
    fn source_files(&self) -> Vec<String>;
    fn functions_in_file(&self, file: &str) -> CoreResult<Vec<FunctionSym>>;
    /// Names of locals (or arguments) visible at `pc`.
    fn variables_at(&self, pc: u64, arguments: bool) -> Vec<String>;
    fn find_source_file(&self, name: &str) -> Option<String>;
    fn function_at(&self, pc: u64) -> Option<String>;
    /// The line table covering `pc`, together with its source file.
    fn line_table_for_pc(&self, pc: u64) -> Option<(String, Vec<LineEntry>)>;
    fn print_source_lines(
        &self,
        file: &str,
        from: u32,
        to: u32,
        out: &mut dyn CoreOutput,
    ) -> CoreResult<()>;

    fn eval_expression(&mut self, expr: &str, out: &mut dyn CoreOutput) -> CoreResult<()>;
    fn parse_address(&self, expr: &str) -> CoreResult<u64>;
    /// Start and end address of the function containing `pc`.
    fn function_bounds(&self, pc: u64) -> CoreResult<(u64, u64)>;
    /// Best-effort read; returns how many leading bytes of `buf` are valid.
    fn read_memory(&mut self, addr: u64, buf: &mut [u8]) -> CoreResult<usize>;

    fn register_names(&self) -> Vec<String>;
    /// Raw register bytes, or None when the value is unavailable
    /// (optimized out).
    fn read_register_raw(&mut self, regnum: usize) -> Option<Vec<u8>>;
    /// Render a register through the core's value printer. `format` is a
    /// print-format character; 'N' means natural.
    fn format_register(&mut self, regnum: usize, format: char) -> CoreResult<String>;
    fn pc_value(&mut self) -> CoreResult<u64>;
    fn byte_order(&self) -> ByteOrder;

    /// Disassemble one instruction at `pc`, writing its text through `out`,
    /// and return the address of the next instruction.
    fn disassemble_insn(&mut self, pc: u64, out: &mut dyn CoreOutput) -> CoreResult<u64>;

    fn target_stop(&mut self) -> CoreResult<()>;
    fn target_has_execution(&self) -> bool;
    fn trace_running(&self) -> bool;
    fn quit_confirm(&mut self) -> bool;
    fn quit_force(&mut self);
    /// Drop the current executable: kill or detach the target and discard
    /// symbols.
    fn clear_file(&mut self) -> CoreResult<()>;
    fn prompt(&self) -> String;
}
