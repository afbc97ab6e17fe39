//! Symbol-table and source-file lookups.

use serde_json::json;

use super::{CmdResult, CommandError};
use crate::debugger::SourceLocation;
use crate::session::Session;

/// Resolve a linespec; an empty result is a decoding failure, multiple
/// results mean the spec was ambiguous and the caller has to refine it.
fn resolve_one(session: &mut Session, spec: &str) -> Result<SourceLocation, CommandError> {
    let mut sals = session.core.resolve_line_spec(spec)?;
    match sals.len() {
        0 => Err(CommandError::Failed(format!("error decoding line: {}", spec))),
        1 => Ok(sals.remove(0)),
        _ => Err(CommandError::Failed("Ambiguous line spec".to_string())),
    }
}

/// Describe a location: with no argument, where the target last stopped;
/// with a linespec, where that spec resolves. The body is the six-field
/// record the source window consumes.
pub(super) fn loc(session: &mut Session, args: &[&str]) -> CmdResult {
    if args.len() > 1 {
        return Err(CommandError::Usage("loc ?linespec?"));
    }
    if !session.core.has_symbols() {
        return Err(CommandError::Failed("No symbol table is loaded".to_string()));
    }

    let sal = match args.first() {
        None => session.core.current_location()?,
        Some(spec) => resolve_one(session, spec)?,
    };
    let stop_pc = session.core.stop_pc();

    Ok(Some(json!([
        sal.file,
        sal.function,
        sal.full_path,
        sal.line,
        format!("{:#x}", sal.pc),
        format!("{:#x}", stop_pc),
    ])))
}

fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// All source files with line info, by basename, sorted and deduped. An
/// optional pathname prefix restricts the list.
pub(super) fn listfiles(session: &mut Session, args: &[&str]) -> CmdResult {
    if args.len() > 1 {
        return Err(CommandError::Usage("listfiles ?pathname?"));
    }
    let prefix = args.first().copied();

    let mut files: Vec<String> = session
        .core
        .source_files()
        .iter()
        .filter(|path| match prefix {
            None => true,
            Some(p) => path.as_str() == basename(path) || path.starts_with(p),
        })
        .map(|path| basename(path).to_string())
        .collect();
    files.sort();
    files.dedup();
    Ok(Some(json!(files)))
}

pub(super) fn listfuncs(session: &mut Session, args: &[&str]) -> CmdResult {
    if args.len() != 1 {
        return Err(CommandError::Usage("listfuncs file"));
    }
    let funcs = session.core.functions_in_file(args[0])?;
    Ok(Some(serde_json::to_value(funcs).map_err(|e| {
        CommandError::Failed(format!("encoding function list: {}", e))
    })?))
}

/// Line number for a linespec, or "N/A" when it doesn't resolve uniquely.
pub(super) fn get_line(session: &mut Session, args: &[&str]) -> CmdResult {
    if args.len() != 1 {
        return Err(CommandError::Usage("get_line linespec"));
    }
    let sals = session.core.resolve_line_spec(args[0])?;
    if sals.len() == 1 {
        Ok(Some(json!(sals[0].line)))
    } else {
        Ok(Some(json!("N/A")))
    }
}

pub(super) fn get_file(session: &mut Session, args: &[&str]) -> CmdResult {
    if args.len() != 1 {
        return Err(CommandError::Usage("get_file linespec"));
    }
    let sals = session.core.resolve_line_spec(args[0])?;
    if sals.len() == 1 {
        Ok(Some(json!(sals[0].full_path)))
    } else {
        Ok(Some(json!("N/A")))
    }
}

pub(super) fn get_function(session: &mut Session, args: &[&str]) -> CmdResult {
    if args.len() != 1 {
        return Err(CommandError::Usage("get_function linespec"));
    }
    let sals = session.core.resolve_line_spec(args[0])?;
    if sals.len() == 1 {
        let name = sals[0]
            .function
            .clone()
            .or_else(|| session.core.function_at(sals[0].pc));
        if let Some(name) = name {
            return Ok(Some(json!(name)));
        }
    }
    Ok(Some(json!("N/A")))
}

/// Names of the locals or formal arguments visible at a location.
pub(super) fn get_vars(session: &mut Session, args: &[&str], arguments: bool) -> CmdResult {
    if args.len() != 1 {
        return Err(CommandError::Usage(if arguments {
            "get_args linespec"
        } else {
            "get_locals linespec"
        }));
    }
    let sal = resolve_one(session, args[0])?;
    let names = session.core.variables_at(sal.pc, arguments);
    Ok(Some(json!(names)))
}

/// Map a bare filename to its full path via the core's source search path.
/// Unknown files come back empty rather than failing, so the GUI can fall
/// back to the name it already has.
pub(super) fn find_file(session: &mut Session, args: &[&str]) -> CmdResult {
    if args.len() != 1 {
        return Err(CommandError::Usage("find_file filename"));
    }
    let path = session.core.find_source_file(args[0]).unwrap_or_default();
    Ok(Some(json!(path)))
}
