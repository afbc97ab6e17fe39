//! Script-callable operations and the call-isolation wrapper.
//!
//! Every operation is dispatched through [`call`], which installs a fresh
//! pair of capture buffers, runs the handler, and converts any core error
//! into a failed outcome instead of letting it unwind into the embedding
//! runtime. The previously active sinks are restored on every exit path.

mod breakpoints;
mod control;
mod data;
mod source;

use log::{debug, warn};
use serde_json::Value;
use thiserror::Error;

use crate::debugger::CoreError;
use crate::session::Session;

#[derive(Debug, Error)]
pub enum CommandError {
    /// Bad argument shape; the message is the expected usage.
    #[error("wrong # args: should be \"{0}\"")]
    Usage(&'static str),
    /// Operation-local failure (lookup miss, bad number, ...).
    #[error("{0}")]
    Failed(String),
    /// An error that unwound out of the debugger core.
    #[error(transparent)]
    Core(#[from] CoreError),
}

pub(crate) type CmdResult = Result<Option<Value>, CommandError>;

/// What a dispatched call produced. On failure the transcript carries the
/// error text (plus whatever output preceded it).
#[derive(Debug)]
pub struct CallOutcome {
    pub success: bool,
    pub transcript: String,
    pub body: Option<Value>,
}

/// Top level for all core code reachable from the script runtime. Handles
/// the capture save/restore and forces the GUI back to idle when an
/// operation bombs out partway through.
pub(crate) fn call(session: &mut Session, name: &str, args: &[&str]) -> CallOutcome {
    debug!("call {} {:?}", name, args);

    session.sinks.push_capture();

    let (success, body) = match dispatch(session, name, args) {
        Ok(body) => (true, body),
        Err(err) => {
            warn!("{} failed: {}", name, err);

            // The operation may have died mid-transfer or mid-run; put all
            // of that state back before reporting.
            if session.pump.active() {
                session.pump.stop();
            }
            session.load_in_progress = false;
            session.running = false;
            session.runtime.idle();

            // Into the error buffer, after any error-stream text the dead
            // operation already emitted.
            let msg = err.to_string();
            if !session.sinks.append_error(&msg) {
                session.runtime.display(&msg);
            }
            (false, None)
        }
    };

    let (result, error) = session.sinks.pop_capture();
    CallOutcome {
        success,
        transcript: combine(result, error),
        body,
    }
}

/// Best-effort combined transcript: normal output first, then error output.
fn combine(result: String, error: String) -> String {
    if error.is_empty() {
        result
    } else if result.is_empty() {
        error
    } else {
        let mut transcript = result;
        transcript.push_str(&error);
        transcript
    }
}

fn dispatch(session: &mut Session, name: &str, args: &[&str]) -> CmdResult {
    match name {
        "cmd" => control::cmd(session, args),
        "immediate" => control::immediate(session, args),
        "eval" => control::eval(session, args),
        "stop" => control::stop(session, args),
        "confirm_quit" => control::confirm_quit(session, args),
        "force_quit" => control::force_quit(session, args),
        "clear_file" => control::clear_file(session, args),
        "target_has_execution" => control::target_has_execution(session, args),
        "is_tracing" => control::is_tracing(session, args),
        "prompt" => control::prompt(session, args),

        "breakpoint_list" => breakpoints::breakpoint_list(session, args),
        "breakpoint_info" => breakpoints::breakpoint_info(session, args),
        "set_bp" => breakpoints::set_bp(session, args),
        "tracepoint_list" => breakpoints::tracepoint_list(session, args),
        "tracepoint_info" => breakpoints::tracepoint_info(session, args),
        "tracepoint_exists" => breakpoints::tracepoint_exists(session, args),
        "actions" => breakpoints::actions(session, args),

        "mem" => data::mem(session, args),
        "regnames" => data::regnames(session, args),
        "fetch_registers" => data::fetch_registers(session, args),
        "changed_registers" => data::changed_registers(session, args),
        "pc_reg" => data::pc_reg(session, args),
        "disassemble" => data::disassemble(session, args),

        "loc" => source::loc(session, args),
        "listfiles" => source::listfiles(session, args),
        "listfuncs" => source::listfuncs(session, args),
        "get_line" => source::get_line(session, args),
        "get_file" => source::get_file(session, args),
        "get_function" => source::get_function(session, args),
        "get_locals" => source::get_vars(session, args, false),
        "get_args" => source::get_vars(session, args, true),
        "find_file" => source::find_file(session, args),

        _ => Err(CommandError::Failed(format!("undefined command: {}", name))),
    }
}

/// Parse a numeric argument, accepting `0x`-prefixed hex.
pub(crate) fn parse_u64(text: &str) -> Result<u64, CommandError> {
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
    } else {
        text.parse()
    };
    parsed.map_err(|_| CommandError::Failed(format!("bad number: {}", text)))
}
