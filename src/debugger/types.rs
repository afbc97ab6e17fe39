//! Plain data carried across the core boundary.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ByteOrder {
    Little,
    Big,
}

/// Breakpoint flavors, serialized with the names the info display uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakpointKind {
    #[serde(rename = "breakpoint")]
    Breakpoint,
    #[serde(rename = "hardware breakpoint")]
    HardwareBreakpoint,
    #[serde(rename = "watchpoint")]
    Watchpoint,
    #[serde(rename = "hardware watchpoint")]
    HardwareWatchpoint,
    #[serde(rename = "read watchpoint")]
    ReadWatchpoint,
    #[serde(rename = "access watchpoint")]
    AccessWatchpoint,
}

/// What happens to a breakpoint after it is hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Disposition {
    #[serde(rename = "delete")]
    Delete,
    #[serde(rename = "delstop")]
    DeleteAtNextStop,
    #[serde(rename = "disable")]
    Disable,
    #[serde(rename = "donttouch")]
    DontTouch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakpointInfo {
    pub number: u32,
    pub file: String,
    pub function: String,
    pub line: u32,
    pub address: u64,
    pub kind: BreakpointKind,
    pub enabled: bool,
    pub disposition: Disposition,
    pub ignore_count: u32,
    pub commands: Vec<String>,
    pub condition: Option<String>,
    pub thread: i32,
    pub hit_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracepointInfo {
    pub number: u32,
    pub file: String,
    pub function: String,
    pub line: u32,
    pub address: u64,
    pub enabled: bool,
    pub pass_count: u32,
    pub step_count: u32,
    pub thread: i32,
    pub hit_count: u32,
    pub actions: Vec<String>,
}

/// A resolved source location. `function` is absent for addresses outside
/// any known function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub function: Option<String>,
    pub full_path: String,
    pub line: u32,
    pub pc: u64,
}

/// One line-table entry: the first instruction address of a source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineEntry {
    pub line: u32,
    pub pc: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSym {
    pub name: String,
    pub demangled: bool,
}

/// Coarse command classification used to decide busy/idle hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandClass {
    Run,
    Trace,
    Other,
}
