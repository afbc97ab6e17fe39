//! Shared test doubles: a scriptable debugger core and a recording runtime.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use debugger_bindings::{
    BreakpointInfo, BreakpointKind, ByteOrder, CommandClass, CoreError, CoreOutput, CoreResult,
    DebuggerCore, Disposition, FunctionSym, LineEntry, PointEvent, ScriptRuntime, Session,
    SourceLocation, Stream, TracepointInfo,
};

/// Scripted behavior for one console command line.
#[derive(Debug, Clone, Default)]
pub struct CommandScript {
    pub output: String,
    pub error_output: String,
    pub error: Option<String>,
    /// How many times to poll the cancellation yield point before producing
    /// output, to simulate a long transfer.
    pub yield_points: u32,
}

pub struct CoreState {
    pub breakpoints: Vec<BreakpointInfo>,
    pub tracepoints: Vec<TracepointInfo>,
    pub next_number: u32,
    pub commands_run: Vec<String>,
    pub scripts: HashMap<String, CommandScript>,
    pub reg_names: Vec<String>,
    pub regs: Vec<Option<Vec<u8>>>,
    pub mem_base: u64,
    pub memory: Vec<u8>,
    pub byte_order: ByteOrder,
    pub source_files: Vec<String>,
    pub functions: HashMap<String, Vec<FunctionSym>>,
    pub linespecs: HashMap<String, Vec<SourceLocation>>,
    pub current: SourceLocation,
    pub stop_pc: u64,
    pub has_symbols: bool,
    pub has_execution: bool,
    pub tracing: bool,
    pub bounds: Option<(u64, u64)>,
    pub line_table: Option<(String, Vec<LineEntry>)>,
    pub locals: Vec<String>,
    pub args: Vec<String>,
    pub funcs_at: HashMap<u64, String>,
    pub paths: HashMap<String, String>,
    pub eval_output: String,
    pub stop_fails: bool,
    pub stops: u32,
    pub quit_ok: bool,
    pub forced_quit: bool,
    pub cleared: bool,
}

impl Default for CoreState {
    fn default() -> Self {
        Self {
            breakpoints: Vec::new(),
            tracepoints: Vec::new(),
            next_number: 1,
            commands_run: Vec::new(),
            scripts: HashMap::new(),
            reg_names: vec![
                "r0".to_string(),
                "r1".to_string(),
                String::new(),
                "pc".to_string(),
            ],
            regs: vec![
                Some(vec![0x01, 0x00, 0x00, 0x00]),
                Some(vec![0x02, 0x00, 0x00, 0x00]),
                None,
                Some(vec![0x00, 0x10, 0x00, 0x00]),
            ],
            mem_base: 0x1000,
            memory: Vec::new(),
            byte_order: ByteOrder::Little,
            source_files: Vec::new(),
            functions: HashMap::new(),
            linespecs: HashMap::new(),
            current: SourceLocation {
                file: "main.c".to_string(),
                function: Some("main".to_string()),
                full_path: "/src/main.c".to_string(),
                line: 10,
                pc: 0x1000,
            },
            stop_pc: 0x1000,
            has_symbols: true,
            has_execution: false,
            tracing: false,
            bounds: None,
            line_table: None,
            locals: Vec::new(),
            args: Vec::new(),
            funcs_at: HashMap::new(),
            paths: HashMap::new(),
            eval_output: String::new(),
            stop_fails: false,
            stops: 0,
            quit_ok: true,
            forced_quit: false,
            cleared: false,
        }
    }
}

pub type SharedCore = Rc<RefCell<CoreState>>;

pub struct MockCore {
    state: SharedCore,
}

impl DebuggerCore for MockCore {
    fn execute_command(&mut self, line: &str, out: &mut dyn CoreOutput) -> CoreResult<()> {
        let script = {
            let mut st = self.state.borrow_mut();
            st.commands_run.push(line.to_string());
            st.scripts.get(line).cloned()
        };
        let Some(script) = script else {
            return Ok(());
        };
        for _ in 0..script.yield_points {
            if out.check_cancelled() {
                return Err(CoreError::Cancelled);
            }
        }
        if !script.output.is_empty() {
            out.put(Stream::Output, &script.output);
        }
        if !script.error_output.is_empty() {
            out.put(Stream::Error, &script.error_output);
        }
        match script.error {
            Some(msg) => Err(CoreError::Error(msg)),
            None => Ok(()),
        }
    }

    fn command_class(&self, line: &str) -> CommandClass {
        let word = line.split_whitespace().next().unwrap_or("");
        match word {
            "run" | "continue" | "step" | "next" => CommandClass::Run,
            "tstart" | "tstop" => CommandClass::Trace,
            _ => CommandClass::Other,
        }
    }

    fn breakpoints(&self) -> Vec<BreakpointInfo> {
        self.state.borrow().breakpoints.clone()
    }

    fn breakpoint(&self, number: u32) -> Option<BreakpointInfo> {
        self.state
            .borrow()
            .breakpoints
            .iter()
            .find(|b| b.number == number)
            .cloned()
    }

    fn set_breakpoint(
        &mut self,
        file: &str,
        line: u32,
        kind: BreakpointKind,
        disposition: Disposition,
    ) -> CoreResult<BreakpointInfo> {
        let mut st = self.state.borrow_mut();
        let info = BreakpointInfo {
            number: st.next_number,
            file: file.to_string(),
            function: "main".to_string(),
            line,
            address: 0x1000 + u64::from(line),
            kind,
            enabled: true,
            disposition,
            ignore_count: 0,
            commands: Vec::new(),
            condition: None,
            thread: -1,
            hit_count: 0,
        };
        st.next_number += 1;
        st.breakpoints.push(info.clone());
        Ok(info)
    }

    fn tracepoints(&self) -> Vec<TracepointInfo> {
        self.state.borrow().tracepoints.clone()
    }

    fn tracepoint(&self, number: u32) -> Option<TracepointInfo> {
        self.state
            .borrow()
            .tracepoints
            .iter()
            .find(|t| t.number == number)
            .cloned()
    }

    fn set_tracepoint_actions(
        &mut self,
        number: u32,
        actions: Vec<String>,
        step_count: Option<u32>,
    ) -> CoreResult<()> {
        let mut st = self.state.borrow_mut();
        let tp = st
            .tracepoints
            .iter_mut()
            .find(|t| t.number == number)
            .ok_or_else(|| CoreError::Error(format!("Tracepoint #{} does not exist", number)))?;
        tp.actions = actions;
        if let Some(count) = step_count {
            tp.step_count = count;
        }
        Ok(())
    }

    fn has_symbols(&self) -> bool {
        self.state.borrow().has_symbols
    }

    fn resolve_line_spec(&self, spec: &str) -> CoreResult<Vec<SourceLocation>> {
        self.state
            .borrow()
            .linespecs
            .get(spec)
            .cloned()
            .ok_or_else(|| CoreError::Error(format!("Function \"{}\" not defined.", spec)))
    }

    fn current_location(&self) -> CoreResult<SourceLocation> {
        Ok(self.state.borrow().current.clone())
    }

    fn stop_pc(&self) -> u64 {
        self.state.borrow().stop_pc
    }

    fn source_files(&self) -> Vec<String> {
        self.state.borrow().source_files.clone()
    }

    fn functions_in_file(&self, file: &str) -> CoreResult<Vec<FunctionSym>> {
        self.state
            .borrow()
            .functions
            .get(file)
            .cloned()
            .ok_or_else(|| CoreError::Error(format!("No source file named {}.", file)))
    }

    fn variables_at(&self, _pc: u64, arguments: bool) -> Vec<String> {
        let st = self.state.borrow();
        if arguments {
            st.args.clone()
        } else {
            st.locals.clone()
        }
    }

    fn find_source_file(&self, name: &str) -> Option<String> {
        self.state.borrow().paths.get(name).cloned()
    }

    fn function_at(&self, pc: u64) -> Option<String> {
        self.state.borrow().funcs_at.get(&pc).cloned()
    }

    fn line_table_for_pc(&self, _pc: u64) -> Option<(String, Vec<LineEntry>)> {
        self.state.borrow().line_table.clone()
    }

    fn print_source_lines(
        &self,
        _file: &str,
        from: u32,
        to: u32,
        out: &mut dyn CoreOutput,
    ) -> CoreResult<()> {
        for line in from..to {
            out.put(Stream::Output, &format!("{}  src{}\n", line, line));
        }
        Ok(())
    }

    fn eval_expression(&mut self, _expr: &str, out: &mut dyn CoreOutput) -> CoreResult<()> {
        let text = self.state.borrow().eval_output.clone();
        out.put(Stream::Output, &text);
        Ok(())
    }

    fn parse_address(&self, expr: &str) -> CoreResult<u64> {
        let parsed = if let Some(hex) = expr.strip_prefix("0x") {
            u64::from_str_radix(hex, 16)
        } else {
            expr.parse()
        };
        parsed.map_err(|_| CoreError::Error(format!("No symbol \"{}\" in current context.", expr)))
    }

    fn function_bounds(&self, _pc: u64) -> CoreResult<(u64, u64)> {
        self.state
            .borrow()
            .bounds
            .ok_or_else(|| CoreError::Error("no function".to_string()))
    }

    fn read_memory(&mut self, addr: u64, buf: &mut [u8]) -> CoreResult<usize> {
        let st = self.state.borrow();
        if addr < st.mem_base {
            return Err(CoreError::Error("Cannot access memory".to_string()));
        }
        let offset = (addr - st.mem_base) as usize;
        if offset >= st.memory.len() {
            return Ok(0);
        }
        let avail = st.memory.len() - offset;
        let n = avail.min(buf.len());
        buf[..n].copy_from_slice(&st.memory[offset..offset + n]);
        Ok(n)
    }

    fn register_names(&self) -> Vec<String> {
        self.state.borrow().reg_names.clone()
    }

    fn read_register_raw(&mut self, regnum: usize) -> Option<Vec<u8>> {
        self.state.borrow().regs.get(regnum).cloned().flatten()
    }

    fn format_register(&mut self, regnum: usize, format: char) -> CoreResult<String> {
        let raw = self
            .read_register_raw(regnum)
            .ok_or_else(|| CoreError::Error("value not available".to_string()))?;
        let mut value = 0u64;
        for &b in raw.iter().rev() {
            value = (value << 8) | u64::from(b);
        }
        Ok(match format {
            'x' => format!("{:#x}", value),
            _ => value.to_string(),
        })
    }

    fn pc_value(&mut self) -> CoreResult<u64> {
        Ok(self.state.borrow().stop_pc)
    }

    fn byte_order(&self) -> ByteOrder {
        self.state.borrow().byte_order
    }

    fn disassemble_insn(&mut self, pc: u64, out: &mut dyn CoreOutput) -> CoreResult<u64> {
        out.put(Stream::Output, &format!("insn_{:x}", pc));
        Ok(pc + 4)
    }

    fn target_stop(&mut self) -> CoreResult<()> {
        let mut st = self.state.borrow_mut();
        if st.stop_fails {
            return Err(CoreError::Error("target cannot stop".to_string()));
        }
        st.stops += 1;
        Ok(())
    }

    fn target_has_execution(&self) -> bool {
        self.state.borrow().has_execution
    }

    fn trace_running(&self) -> bool {
        self.state.borrow().tracing
    }

    fn quit_confirm(&mut self) -> bool {
        self.state.borrow().quit_ok
    }

    fn quit_force(&mut self) {
        self.state.borrow_mut().forced_quit = true;
    }

    fn clear_file(&mut self) -> CoreResult<()> {
        self.state.borrow_mut().cleared = true;
        Ok(())
    }

    fn prompt(&self) -> String {
        "(dbg) ".to_string()
    }
}

#[derive(Debug, Default)]
pub struct RuntimeState {
    pub displayed: String,
    pub busy_calls: u32,
    pub idle_calls: u32,
    pub pump_calls: u32,
    pub cancel: bool,
    pub point_events: Vec<(String, u32)>,
}

pub type SharedRuntime = Rc<RefCell<RuntimeState>>;

pub struct RecordingRuntime {
    state: SharedRuntime,
}

impl ScriptRuntime for RecordingRuntime {
    fn display(&mut self, text: &str) {
        self.state.borrow_mut().displayed.push_str(text);
    }

    fn busy(&mut self) {
        self.state.borrow_mut().busy_calls += 1;
    }

    fn idle(&mut self) {
        self.state.borrow_mut().idle_calls += 1;
    }

    fn pump_events(&mut self) {
        self.state.borrow_mut().pump_calls += 1;
    }

    fn cancel_requested(&mut self) -> bool {
        self.state.borrow().cancel
    }

    fn breakpoint_event(&mut self, event: PointEvent, info: &BreakpointInfo) {
        self.state
            .borrow_mut()
            .point_events
            .push((format!("bp-{}", event.as_str()), info.number));
    }

    fn tracepoint_event(&mut self, event: PointEvent, info: &TracepointInfo) {
        self.state
            .borrow_mut()
            .point_events
            .push((format!("tp-{}", event.as_str()), info.number));
    }
}

/// A session over fresh mock state, with handles kept for inspection. The
/// pump interval is zero so a started pump is always due.
pub fn new_session() -> (Session, SharedCore, SharedRuntime) {
    let core_state = Rc::new(RefCell::new(CoreState::default()));
    let runtime_state = Rc::new(RefCell::new(RuntimeState::default()));
    let mut session = Session::new(
        Box::new(MockCore {
            state: core_state.clone(),
        }),
        Box::new(RecordingRuntime {
            state: runtime_state.clone(),
        }),
    );
    session.set_pump_interval(Duration::ZERO);
    (session, core_state, runtime_state)
}

pub fn make_tracepoint(number: u32, address: u64) -> TracepointInfo {
    TracepointInfo {
        number,
        file: "main.c".to_string(),
        function: "main".to_string(),
        line: 20,
        address,
        enabled: true,
        pass_count: 0,
        step_count: 0,
        thread: -1,
        hit_count: 0,
        actions: Vec::new(),
    }
}

pub fn make_location(file: &str, line: u32, pc: u64) -> SourceLocation {
    SourceLocation {
        file: file.to_string(),
        function: Some("main".to_string()),
        full_path: format!("/src/{}", file),
        line,
        pc,
    }
}
