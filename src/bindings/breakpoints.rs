//! Breakpoint and tracepoint operations.

use serde_json::{json, Value};

use super::{CmdResult, CommandError};
use crate::debugger::{BreakpointInfo, BreakpointKind, Disposition, TracepointInfo};
use crate::runtime::PointEvent;
use crate::session::Session;

fn parse_number(text: &str, what: &str) -> Result<u32, CommandError> {
    text.parse()
        .map_err(|_| CommandError::Failed(format!("bad {} number: {}", what, text)))
}

fn breakpoint_body(b: &BreakpointInfo) -> Value {
    json!({
        "number": b.number,
        "file": b.file,
        "function": b.function,
        "line": b.line,
        "address": format!("{:#x}", b.address),
        "type": b.kind,
        "enabled": b.enabled,
        "disposition": b.disposition,
        "ignore_count": b.ignore_count,
        "commands": b.commands,
        "condition": b.condition,
        "thread": b.thread,
        "hit_count": b.hit_count,
    })
}

fn tracepoint_body(t: &TracepointInfo) -> Value {
    json!({
        "number": t.number,
        "file": t.file,
        "function": t.function,
        "line": t.line,
        "address": format!("{:#x}", t.address),
        "enabled": t.enabled,
        "pass_count": t.pass_count,
        "step_count": t.step_count,
        "thread": t.thread,
        "hit_count": t.hit_count,
        "actions": t.actions,
    })
}

/// Numbers of all plain breakpoints, in chain order.
pub(super) fn breakpoint_list(session: &mut Session, args: &[&str]) -> CmdResult {
    if !args.is_empty() {
        return Err(CommandError::Usage("breakpoint_list"));
    }
    let numbers: Vec<u32> = session
        .core
        .breakpoints()
        .iter()
        .filter(|b| b.kind == BreakpointKind::Breakpoint)
        .map(|b| b.number)
        .collect();
    Ok(Some(json!(numbers)))
}

pub(super) fn breakpoint_info(session: &mut Session, args: &[&str]) -> CmdResult {
    if args.len() != 1 {
        return Err(CommandError::Usage("breakpoint_info number"));
    }
    let number = parse_number(args[0], "breakpoint")?;
    let info = session
        .core
        .breakpoint(number)
        .filter(|b| b.kind == BreakpointKind::Breakpoint)
        .ok_or_else(|| CommandError::Failed(format!("Breakpoint #{} does not exist", number)))?;
    Ok(Some(breakpoint_body(&info)))
}

fn parse_kind(word: &str) -> Result<BreakpointKind, CommandError> {
    match word {
        "breakpoint" => Ok(BreakpointKind::Breakpoint),
        "hardware" => Ok(BreakpointKind::HardwareBreakpoint),
        _ => Err(CommandError::Failed(format!(
            "bad breakpoint kind: {}",
            word
        ))),
    }
}

fn parse_disposition(word: &str) -> Result<Disposition, CommandError> {
    match word {
        "delete" => Ok(Disposition::Delete),
        "delstop" => Ok(Disposition::DeleteAtNextStop),
        "disable" => Ok(Disposition::Disable),
        "donttouch" => Ok(Disposition::DontTouch),
        _ => Err(CommandError::Failed(format!("bad disposition: {}", word))),
    }
}

/// Set a breakpoint by file and line, then notify the runtime so the GUI
/// can mark the source view.
pub(super) fn set_bp(session: &mut Session, args: &[&str]) -> CmdResult {
    if !(2..=4).contains(&args.len()) {
        return Err(CommandError::Usage("set_bp filename line ?kind? ?disposition?"));
    }
    let file = args[0];
    let line = parse_number(args[1], "line")?;
    let kind = args
        .get(2)
        .map(|w| parse_kind(w))
        .transpose()?
        .unwrap_or(BreakpointKind::Breakpoint);
    let disposition = args
        .get(3)
        .map(|w| parse_disposition(w))
        .transpose()?
        .unwrap_or(Disposition::DontTouch);

    let info = session.core.set_breakpoint(file, line, kind, disposition)?;
    session.notify_breakpoint(PointEvent::Create, &info);
    Ok(Some(breakpoint_body(&info)))
}

pub(super) fn tracepoint_list(session: &mut Session, args: &[&str]) -> CmdResult {
    if !args.is_empty() {
        return Err(CommandError::Usage("tracepoint_list"));
    }
    let numbers: Vec<u32> = session.core.tracepoints().iter().map(|t| t.number).collect();
    Ok(Some(json!(numbers)))
}

pub(super) fn tracepoint_info(session: &mut Session, args: &[&str]) -> CmdResult {
    if args.len() != 1 {
        return Err(CommandError::Usage("tracepoint_info number"));
    }
    let number = parse_number(args[0], "tracepoint")?;
    let info = session
        .core
        .tracepoint(number)
        .ok_or_else(|| CommandError::Failed(format!("Tracepoint #{} does not exist", number)))?;
    Ok(Some(tracepoint_body(&info)))
}

/// Resolve a linespec and report the number of the tracepoint at that
/// address, or -1.
pub(super) fn tracepoint_exists(session: &mut Session, args: &[&str]) -> CmdResult {
    if args.len() != 1 {
        return Err(CommandError::Usage(
            "tracepoint_exists function:line|function|line|*addr",
        ));
    }
    let sals = session.core.resolve_line_spec(args[0])?;
    let number = if sals.len() == 1 {
        session
            .core
            .tracepoints()
            .iter()
            .find(|t| t.address == sals[0].pc)
            .map(|t| t.number as i64)
            .unwrap_or(-1)
    } else {
        -1
    };
    Ok(Some(json!(number)))
}

/// Replace a tracepoint's action list. A `while-stepping N` action also
/// sets the step count.
pub(super) fn actions(session: &mut Session, args: &[&str]) -> CmdResult {
    if args.len() < 2 {
        return Err(CommandError::Usage("actions number action ?action ...?"));
    }
    let number = parse_number(args[0], "tracepoint")?;
    let actions: Vec<String> = args[1..].iter().map(|a| a.to_string()).collect();
    let step_count = actions.iter().find_map(|a| {
        a.strip_prefix("while-stepping")
            .and_then(|rest| rest.trim().parse().ok())
    });
    session
        .core
        .set_tracepoint_actions(number, actions, step_count)?;
    if let Some(info) = session.core.tracepoint(number) {
        session.notify_tracepoint(PointEvent::Modify, &info);
    }
    Ok(None)
}
