//! Memory, register and disassembly operations.

use serde_json::json;

use super::{parse_u64, CmdResult, CommandError};
use crate::debugger::{ByteOrder, CoreError, CoreOutput};
use crate::session::Session;
use crate::sink::Stream;

fn scalar_from_bytes(bytes: &[u8], order: ByteOrder) -> u64 {
    let mut value: u64 = 0;
    match order {
        ByteOrder::Little => {
            for &b in bytes.iter().rev() {
                value = (value << 8) | u64::from(b);
            }
        }
        ByteOrder::Big => {
            for &b in bytes {
                value = (value << 8) | u64::from(b);
            }
        }
    }
    value
}

fn sign_extend(value: u64, size: usize) -> i64 {
    let shift = 64 - 8 * size as u32;
    ((value << shift) as i64) >> shift
}

/// Render one element the way the core's scalar printer would for the given
/// format character.
fn format_scalar(value: u64, size: usize, format: char) -> String {
    match format {
        'd' => sign_extend(value, size).to_string(),
        'u' => value.to_string(),
        'o' => format!("0{:o}", value),
        't' => format!("{:b}", value),
        'c' => {
            let c = (value & 0xff) as u8;
            if (32..=126).contains(&c) {
                format!("'{}'", c as char)
            } else {
                format!("'\\{:o}'", c)
            }
        }
        _ => format!("{:#x}", value),
    }
}

/// Dump a block of target memory.
///
/// `mem addr format size bytes bytes-per-row ?ascii-char?` writes formatted
/// elements through the funnel, `N/A` for bytes past what the target could
/// deliver, and (when an ASCII substitute char is given) a quoted ASCII
/// column at the end of each row.
pub(super) fn mem(session: &mut Session, args: &[&str]) -> CmdResult {
    if !(5..=6).contains(&args.len()) {
        return Err(CommandError::Usage(
            "mem addr format size bytes bytes-per-row ?ascii-char?",
        ));
    }

    let addr = parse_u64(args[0])?;
    let format = args[1].chars().next().unwrap_or('x');
    let size: usize = args[2]
        .parse()
        .map_err(|_| CommandError::Failed(format!("bad element size: {}", args[2])))?;
    let nbytes: usize = args[3]
        .parse()
        .map_err(|_| CommandError::Failed(format!("bad byte count: {}", args[3])))?;
    let bpr: usize = args[4]
        .parse()
        .map_err(|_| CommandError::Failed(format!("bad row width: {}", args[4])))?;

    if nbytes == 0 || bpr == 0 {
        return Err(CommandError::Failed("Invalid number of bytes.".to_string()));
    }
    if !matches!(size, 1 | 2 | 4 | 8) {
        return Err(CommandError::Failed(format!("Invalid element size: {}", size)));
    }
    let aschar = args.get(5).and_then(|s| s.chars().next());

    let mut buf = vec![0u8; nbytes];
    let valid = session.core.read_memory(addr, &mut buf)?;
    let order = session.core.byte_order();

    let (_core, mut out) = session.parts();
    let mut row = String::from("\"");
    let mut bc = 0usize;

    let mut i = 0;
    while i < nbytes {
        if i >= valid {
            out.put(Stream::Output, "N/A ");
            if aschar.is_some() {
                for _ in 0..size {
                    row.push('X');
                }
            }
        } else {
            // An element straddling the readable boundary keeps its full
            // width; the unread tail is the buffer's zero fill.
            let end = (i + size).min(nbytes);
            let value = scalar_from_bytes(&buf[i..end], order);
            out.put(Stream::Output, &format_scalar(value, size, format));
            out.put(Stream::Output, " ");
            if let Some(sub) = aschar {
                for &b in &buf[i..end] {
                    let c = if (32..=126).contains(&b) { b as char } else { sub };
                    if c == '"' {
                        row.push('\\');
                    }
                    row.push(c);
                }
            }
        }

        i += size;
        bc += size;

        if aschar.is_some() && bc >= bpr {
            // end of row: emit the ascii column and reset
            bc = 0;
            row.push('"');
            row.push(' ');
            out.put(Stream::Output, &row);
            row = String::from("\"");
        }
    }

    Ok(None)
}

/// Expand a register-number argument list the way every register command
/// does: no arguments means all named registers, anything else must be a
/// valid register number.
fn arg_regnums(names: &[String], args: &[&str]) -> Result<Vec<usize>, CommandError> {
    if args.is_empty() {
        return Ok((0..names.len()).filter(|&i| !names[i].is_empty()).collect());
    }
    args.iter()
        .map(|a| {
            let n: usize = a
                .parse()
                .map_err(|_| CommandError::Failed("bad register number".to_string()))?;
            if n < names.len() && !names[n].is_empty() {
                Ok(n)
            } else {
                Err(CommandError::Failed("bad register number".to_string()))
            }
        })
        .collect()
}

pub(super) fn regnames(session: &mut Session, args: &[&str]) -> CmdResult {
    let names = session.core.register_names();
    let regs = arg_regnums(&names, args)?;
    let listed: Vec<&str> = regs.iter().map(|&r| names[r].as_str()).collect();
    Ok(Some(json!(listed)))
}

/// Fetch register values in the given print format. `r` renders the raw
/// bytes in target order; anything else goes through the core's value
/// printer. Unreadable registers report "Optimized out".
pub(super) fn fetch_registers(session: &mut Session, args: &[&str]) -> CmdResult {
    if args.is_empty() {
        return Err(CommandError::Usage("fetch_registers format ?regnum ...?"));
    }
    let format = args[0].chars().next().unwrap_or('N');
    let names = session.core.register_names();
    let regs = arg_regnums(&names, &args[1..])?;
    let order = session.core.byte_order();

    let mut values = Vec::with_capacity(regs.len());
    for r in regs {
        match session.core.read_register_raw(r) {
            None => values.push("Optimized out".to_string()),
            Some(raw) => {
                if format == 'r' {
                    let mut text = String::from("0x");
                    match order {
                        ByteOrder::Big => {
                            for b in &raw {
                                text.push_str(&format!("{:02x}", b));
                            }
                        }
                        ByteOrder::Little => {
                            for b in raw.iter().rev() {
                                text.push_str(&format!("{:02x}", b));
                            }
                        }
                    }
                    values.push(text);
                } else {
                    values.push(session.core.format_register(r, format)?);
                }
            }
        }
    }
    Ok(Some(json!(values)))
}

/// Diff the registers against the snapshot from the previous call and
/// report the numbers that changed. The snapshot is updated as a side
/// effect, so back-to-back calls report nothing.
pub(super) fn changed_registers(session: &mut Session, args: &[&str]) -> CmdResult {
    let names = session.core.register_names();
    let regs = arg_regnums(&names, args)?;

    let mut changed = Vec::new();
    for r in regs {
        let Some(raw) = session.core.read_register_raw(r) else {
            continue;
        };
        if session.old_regs.get(&r) != Some(&raw) {
            session.old_regs.insert(r, raw);
            changed.push(r);
        }
    }
    Ok(Some(json!(changed)))
}

pub(super) fn pc_reg(session: &mut Session, args: &[&str]) -> CmdResult {
    if !args.is_empty() {
        return Err(CommandError::Usage("pc_reg"));
    }
    let pc = session.core.pc_value()?;
    Ok(Some(json!(format!("{:#x}", pc))))
}

/// One row of the reordered listing used for mixed source/assembly output.
struct DisasmLine {
    line: u32,
    start_pc: u64,
    end_pc: u64,
}

pub(super) fn disassemble(session: &mut Session, args: &[&str]) -> CmdResult {
    if !(2..=3).contains(&args.len()) {
        return Err(CommandError::Usage(
            "disassemble source|nosource start-addr ?end-addr?",
        ));
    }
    let mixed = match args[0] {
        "source" => true,
        "nosource" => false,
        _ => {
            return Err(CommandError::Failed(
                "First arg must be 'source' or 'nosource'".to_string(),
            ))
        }
    };

    let low = session.core.parse_address(args[1])?;
    let (low, high) = if args.len() == 3 {
        (low, session.core.parse_address(args[2])?)
    } else {
        session
            .core
            .function_bounds(low)
            .map_err(|_| CommandError::Failed("No function contains specified address".to_string()))?
    };

    if mixed {
        mixed_listing(session, low, high)?;
    } else {
        plain_listing(session, low, high)?;
    }
    Ok(None)
}

fn emit_insns(session: &mut Session, mut pc: u64, high: u64) -> Result<(), CommandError> {
    while pc < high {
        let (core, mut out) = session.parts();
        if out.check_cancelled() {
            return Err(CoreError::Cancelled.into());
        }
        out.put(Stream::Output, &format!("    {:#x}:\t    ", pc));
        pc = core.disassemble_insn(pc, &mut out)?;
        out.put(Stream::Output, "\n");
    }
    Ok(())
}

fn plain_listing(session: &mut Session, low: u64, high: u64) -> Result<(), CommandError> {
    emit_insns(session, low, high)
}

/// Source-centric listing: everything is presented in source-line order,
/// each line followed by its (possibly out of address order) assembly.
fn mixed_listing(session: &mut Session, low: u64, high: u64) -> Result<(), CommandError> {
    let Some((file, entries)) = session.core.line_table_for_pc(low) else {
        return plain_listing(session, low, high);
    };
    if entries.is_empty() {
        return plain_listing(session, low, high);
    }

    // Convert the line table into rows with explicit end PCs, skipping
    // entries before this function and exact duplicates.
    let mut rows: Vec<DisasmLine> = Vec::new();
    let mut out_of_order = false;

    let mut i = 0;
    while i < entries.len() - 1 && entries[i].pc < low {
        i += 1;
    }
    while i < entries.len() - 1 && entries[i].pc < high {
        if entries[i].line == entries[i + 1].line && entries[i].pc == entries[i + 1].pc {
            i += 1;
            continue;
        }
        if entries[i].line > entries[i + 1].line {
            out_of_order = true;
        }
        rows.push(DisasmLine {
            line: entries[i].line,
            start_pc: entries[i].pc,
            end_pc: entries[i + 1].pc,
        });
        i += 1;
    }
    // The last entry has no successor to bound it; stop at the range end.
    if i == entries.len() - 1 && entries[i].pc < high {
        rows.push(DisasmLine {
            line: entries[i].line,
            start_pc: entries[i].pc,
            end_pc: high,
        });
    }

    if rows.is_empty() {
        return plain_listing(session, low, high);
    }

    if out_of_order {
        rows.sort_by(|a, b| a.line.cmp(&b.line).then(a.start_pc.cmp(&b.start_pc)));
    }

    let mut next_line = 0u32;
    for row in &rows {
        // Print every source line from next_line up to and including this
        // row's line, exactly once.
        if row.line >= next_line {
            let (core, mut out) = session.parts();
            if next_line != 0 {
                core.print_source_lines(&file, next_line, row.line + 1, &mut out)?;
            } else {
                core.print_source_lines(&file, row.line, row.line + 1, &mut out)?;
            }
            next_line = row.line + 1;
        }
        emit_insns(session, row.start_pc, row.end_pc)?;
    }
    Ok(())
}
