//! Console command execution, expression evaluation and session control.

use log::debug;
use serde_json::json;

use super::{CmdResult, CommandError};
use crate::debugger::CommandClass;
use crate::session::Session;

/// Send a line into the core's command engine with output captured.
///
/// Bulk transfers (`load`, `while`) would buffer megabytes of progress text,
/// so for those the normal capture is suspended, the event pump runs, and
/// output streams to the display until the command finishes.
pub(super) fn cmd(session: &mut Session, args: &[&str]) -> CmdResult {
    if args.len() != 1 {
        return Err(CommandError::Usage("cmd command-line"));
    }
    if session.running || session.load_in_progress {
        return Ok(None);
    }

    let line = args[0];
    let bulk = line.starts_with("load ") || line.starts_with("while ");
    if bulk {
        session.sinks.suspend_result();
        session.load_in_progress = true;
        session.pump.start();
    }

    let ret = {
        let (core, mut out) = session.parts();
        core.execute_command(line, &mut out)
    };

    if bulk {
        session.pump.stop();
        session.load_in_progress = false;
        session.sinks.resume_result();
    }
    ret?;
    Ok(None)
}

/// Like `cmd`, but unbuffered, and run/trace-class commands get busy/idle
/// hooks around them so the GUI can gray itself out.
pub(super) fn immediate(session: &mut Session, args: &[&str]) -> CmdResult {
    if args.len() != 1 {
        return Err(CommandError::Usage("immediate command-line"));
    }
    if session.running || session.load_in_progress {
        return Ok(None);
    }

    let line = args[0];
    let hooks = matches!(
        session.core.command_class(line),
        CommandClass::Run | CommandClass::Trace
    );

    session.sinks.suspend_result();
    if hooks {
        session.running = true;
        session.runtime.busy();
    }

    let ret = {
        let (core, mut out) = session.parts();
        core.execute_command(line, &mut out)
    };

    if hooks {
        session.running = false;
        session.runtime.idle();
    }
    session.sinks.resume_result();
    ret?;
    Ok(None)
}

pub(super) fn eval(session: &mut Session, args: &[&str]) -> CmdResult {
    if args.len() != 1 {
        return Err(CommandError::Usage("eval expression"));
    }
    let (core, mut out) = session.parts();
    core.eval_expression(args[0], &mut out)?;
    Ok(None)
}

/// Ask the target to stop. When the core can't, fall back to the cancel
/// flag and hope something polls it.
pub(super) fn stop(session: &mut Session, args: &[&str]) -> CmdResult {
    if !args.is_empty() {
        return Err(CommandError::Usage("stop"));
    }
    if let Err(err) = session.core.target_stop() {
        debug!("target stop failed: {}", err);
        session.cancel_requested = true;
    }
    Ok(None)
}

pub(super) fn confirm_quit(session: &mut Session, args: &[&str]) -> CmdResult {
    if !args.is_empty() {
        return Err(CommandError::Usage("confirm_quit"));
    }
    let ok = if session.core.quit_confirm() { 1 } else { 0 };
    Ok(Some(json!(ok)))
}

pub(super) fn force_quit(session: &mut Session, args: &[&str]) -> CmdResult {
    if !args.is_empty() {
        return Err(CommandError::Usage("force_quit"));
    }
    session.core.quit_force();
    Ok(None)
}

pub(super) fn clear_file(session: &mut Session, args: &[&str]) -> CmdResult {
    if !args.is_empty() {
        return Err(CommandError::Usage("clear_file"));
    }
    session.core.clear_file()?;
    session.old_regs.clear();
    Ok(None)
}

pub(super) fn target_has_execution(session: &mut Session, args: &[&str]) -> CmdResult {
    if !args.is_empty() {
        return Err(CommandError::Usage("target_has_execution"));
    }
    Ok(Some(json!(session.core.target_has_execution())))
}

pub(super) fn is_tracing(session: &mut Session, args: &[&str]) -> CmdResult {
    if !args.is_empty() {
        return Err(CommandError::Usage("is_tracing"));
    }
    Ok(Some(json!(session.core.trace_running())))
}

pub(super) fn prompt(session: &mut Session, args: &[&str]) -> CmdResult {
    if !args.is_empty() {
        return Err(CommandError::Usage("prompt"));
    }
    Ok(Some(json!(session.core.prompt())))
}
