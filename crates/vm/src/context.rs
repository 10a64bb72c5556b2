//! Execution context: the operand stack and the interpreter loop.
//!
//! One context serves one logical thread of control. The operand stack is a
//! contiguous buffer allocated once at the configured capacity and mutated
//! only by bounds-checked push and pop; frames are implicit regions of that
//! stack, laid out per the contract in [`strata_common::function`]. A
//! nested FUNCTION_CALL grows the same stack rather than allocating a new
//! one, with an explicit call-depth bound standing in for the host's own
//! call-stack limit.

use crate::config::Config;
use crate::error::RuntimeError;
use crate::module::Module;
use strata_common::{Comparison, FunctionSpec, Opcode, Parameter, StackElement};

/// Delta a conditional jump applies: the instruction's own parameter when
/// the relation holds for `left` against `right`, otherwise 0.
pub fn conditional_delta(
    comparison: Comparison,
    left: StackElement,
    right: StackElement,
    delta: Parameter,
) -> Parameter {
    if comparison.holds(left, right) {
        delta
    } else {
        0
    }
}

/// Owns the operand stack and program counter; executes bytecode.
#[derive(Debug)]
pub struct ExecutionContext {
    stack: Vec<StackElement>,
    stack_capacity: usize,
    pc: usize,
    call_depth: usize,
    call_depth_limit: usize,
}

impl ExecutionContext {
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            stack: Vec::with_capacity(config.stack_capacity),
            stack_capacity: config.stack_capacity,
            pc: 0,
            call_depth: 0,
            call_depth_limit: config.call_depth_limit,
        }
    }

    /// Push a value, failing when the configured capacity is reached.
    pub fn push(&mut self, value: StackElement) -> Result<(), RuntimeError> {
        if self.stack.len() >= self.stack_capacity {
            return Err(RuntimeError::StackOverflow {
                at: self.pc,
                limit: self.stack_capacity,
            });
        }
        self.stack.push(value);
        Ok(())
    }

    /// Pop the top value.
    pub fn pop(&mut self) -> Result<StackElement, RuntimeError> {
        self.stack
            .pop()
            .ok_or(RuntimeError::StackUnderflow { at: self.pc })
    }

    /// Read the top value without removing it.
    pub fn peek(&self) -> Result<StackElement, RuntimeError> {
        self.stack
            .last()
            .copied()
            .ok_or(RuntimeError::StackUnderflow { at: self.pc })
    }

    /// Current operand-stack depth (the stack pointer).
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Current program counter.
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Rewind stack, program counter, and call depth to a clean baseline.
    /// Used between independent top-level invocations, never mid-recursion.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.pc = 0;
        self.call_depth = 0;
    }

    /// Run `function` to completion, consuming its `nargs` arguments from
    /// the stack and leaving nothing of its frame behind.
    ///
    /// The caller must already have pushed exactly `nargs` values.
    /// FUNCTION_CALL re-enters this procedure for the callee on the same
    /// stack; depth is bounded by the configured call-depth limit.
    pub fn interpret(
        &mut self,
        module: &Module,
        function: &FunctionSpec,
    ) -> Result<StackElement, RuntimeError> {
        if self.call_depth >= self.call_depth_limit {
            return Err(RuntimeError::CallDepthExceeded {
                limit: self.call_depth_limit,
            });
        }
        self.call_depth += 1;
        let result = self.run_frame(module, function);
        self.call_depth -= 1;
        result
    }

    fn run_frame(
        &mut self,
        module: &Module,
        function: &FunctionSpec,
    ) -> Result<StackElement, RuntimeError> {
        let frame = function
            .frame_base(self.stack.len())
            .ok_or(RuntimeError::StackUnderflow { at: self.pc })?;
        let locals = function
            .local_slots()
            .ok_or_else(|| RuntimeError::InvalidFrameLayout {
                function: function.name.clone(),
                nargs: function.nargs,
                nregs: function.nregs,
            })?;
        for _ in 0..locals {
            self.push(0)?;
        }

        let saved_pc = self.pc;
        self.pc = function.address;
        let result = self.run_loop(module, function, frame);
        self.pc = saved_pc;
        result
    }

    fn run_loop(
        &mut self,
        module: &Module,
        function: &FunctionSpec,
        frame: usize,
    ) -> Result<StackElement, RuntimeError> {
        loop {
            let instruction = module.instruction(self.pc)?;
            let opcode = instruction
                .opcode()
                .map_err(|_| RuntimeError::MalformedBytecode {
                    at: self.pc,
                    byte: instruction.opcode_byte(),
                })?;
            // The pc moves past the current instruction before any jump
            // delta applies; deltas are relative to the next instruction.
            self.pc += 1;

            match opcode {
                Opcode::IntPushConstant => {
                    self.push(StackElement::from(instruction.parameter()))?
                }
                Opcode::StrPushConstant => self.str_push_constant(module, instruction.index())?,
                Opcode::Drop => {
                    self.pop()?;
                }
                Opcode::IntAdd => self.int_add()?,
                Opcode::IntSub => self.int_sub()?,
                Opcode::Jmp => self.branch(instruction.parameter())?,
                Opcode::IntJmpEq => self.compare_and_branch(Comparison::Eq, &instruction)?,
                Opcode::IntJmpNeq => self.compare_and_branch(Comparison::Neq, &instruction)?,
                Opcode::IntJmpGt => self.compare_and_branch(Comparison::Gt, &instruction)?,
                Opcode::IntJmpGe => self.compare_and_branch(Comparison::Ge, &instruction)?,
                Opcode::IntJmpLt => self.compare_and_branch(Comparison::Lt, &instruction)?,
                Opcode::IntJmpLe => self.compare_and_branch(Comparison::Le, &instruction)?,
                Opcode::FunctionCall => {
                    let callee = module.function(instruction.index())?;
                    let value = self.interpret(module, callee)?;
                    self.push(value)?;
                }
                Opcode::PrimitiveCall => {
                    let primitive = module.primitive(instruction.index())?;
                    primitive(self)?;
                }
                Opcode::PushFromVar => {
                    let value = self.read_var(frame, function, instruction.index())?;
                    self.push(value)?;
                }
                Opcode::PopIntoVar => {
                    let value = self.pop()?;
                    self.write_var(frame, function, instruction.index(), value)?;
                }
                Opcode::FunctionReturn => {
                    let result = self.peek()?;
                    self.stack.truncate(frame);
                    return Ok(result);
                }
            }
        }
    }

    fn int_add(&mut self) -> Result<(), RuntimeError> {
        let right = self.pop()?;
        let left = self.pop()?;
        self.push(left.wrapping_add(right))
    }

    fn int_sub(&mut self) -> Result<(), RuntimeError> {
        let right = self.pop()?;
        let left = self.pop()?;
        self.push(left.wrapping_sub(right))
    }

    /// Validate the string index resolves, then push it as an opaque
    /// handle. The machine stays word-typed; the host side of a primitive
    /// turns the handle back into a string via the module.
    fn str_push_constant(&mut self, module: &Module, index: usize) -> Result<(), RuntimeError> {
        module.string(index)?;
        self.push(index as StackElement)
    }

    fn compare_and_branch(
        &mut self,
        comparison: Comparison,
        instruction: &strata_common::Instruction,
    ) -> Result<(), RuntimeError> {
        let right = self.pop()?;
        let left = self.pop()?;
        let delta = conditional_delta(comparison, left, right, instruction.parameter());
        self.branch(delta)
    }

    fn branch(&mut self, delta: Parameter) -> Result<(), RuntimeError> {
        let target = self.pc as i64 + i64::from(delta);
        if target < 0 {
            return Err(RuntimeError::PcOutOfRange { pc: self.pc });
        }
        // The upper bound is enforced by the fetch.
        self.pc = target as usize;
        Ok(())
    }

    fn read_var(
        &self,
        frame: usize,
        function: &FunctionSpec,
        offset: usize,
    ) -> Result<StackElement, RuntimeError> {
        if offset >= function.nregs {
            return Err(RuntimeError::FrameOffsetOutOfRange {
                at: self.pc,
                offset,
                nregs: function.nregs,
            });
        }
        self.stack
            .get(frame + offset)
            .copied()
            .ok_or(RuntimeError::StackUnderflow { at: self.pc })
    }

    fn write_var(
        &mut self,
        frame: usize,
        function: &FunctionSpec,
        offset: usize,
        value: StackElement,
    ) -> Result<(), RuntimeError> {
        if offset >= function.nregs {
            return Err(RuntimeError::FrameOffsetOutOfRange {
                at: self.pc,
                offset,
                nregs: function.nregs,
            });
        }
        match self.stack.get_mut(frame + offset) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(RuntimeError::StackUnderflow { at: self.pc }),
        }
    }
}
