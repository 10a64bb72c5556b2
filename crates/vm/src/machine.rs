//! The virtual machine: tier selection and dispatch.
//!
//! The machine owns the execution context and a per-function
//! compiled-address cache. Each call decides between the interpreter and
//! previously generated native code; the first native-tier call for a
//! function invokes the external code generator, exactly once per function
//! index for the life of the instance.

use crate::config::{CallingConvention, Config};
use crate::context::ExecutionContext;
use crate::error::RuntimeError;
use crate::module::Module;
use crate::native::{CodeGenerator, NativeCode};
use strata_common::{FunctionSpec, StackElement};

/// Mapping from function index to an optionally generated native entry.
///
/// Dense, sized to the module's function count at load time. Each slot
/// transitions at most once from empty to populated and is immutable
/// afterwards.
#[derive(Debug, Default)]
struct CompiledCodeCache {
    slots: Vec<Option<NativeCode>>,
}

impl CompiledCodeCache {
    fn sized(count: usize) -> Self {
        Self {
            slots: vec![None; count],
        }
    }

    /// Lookup past the current bounds answers "none" rather than faulting.
    fn get(&self, index: usize) -> Option<NativeCode> {
        self.slots.get(index).copied().flatten()
    }

    fn set(&mut self, index: usize, code: NativeCode) {
        debug_assert!(index < self.slots.len());
        debug_assert!(self.get(index).is_none());
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Some(code);
        }
    }
}

/// A Strata virtual machine instance.
///
/// Holds the loaded module reference (read-only), the execution context,
/// and the compiled-address cache. One instance serves one logical thread
/// of control; concurrent programs need fully independent instances.
pub struct VirtualMachine<'m> {
    config: Config,
    module: Option<&'m Module>,
    context: ExecutionContext,
    cache: CompiledCodeCache,
    generator: Option<Box<dyn CodeGenerator>>,
}

impl std::fmt::Debug for VirtualMachine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualMachine")
            .field("config", &self.config)
            .field("module", &self.module)
            .field("context", &self.context)
            .field("cache", &self.cache)
            .field("generator", &self.generator.as_ref().map(|_| "dyn CodeGenerator"))
            .finish()
    }
}

impl<'m> VirtualMachine<'m> {
    /// Create a machine without a native backend.
    ///
    /// Fails with [`RuntimeError::NativeTierInit`] if the configuration
    /// requests the native tier: no code generator can exist on this path.
    pub fn new(config: Config) -> Result<Self, RuntimeError> {
        if config.native_tier_enabled {
            return Err(RuntimeError::NativeTierInit {
                reason: "native tier enabled but no code generator supplied".to_string(),
            });
        }
        Ok(Self {
            context: ExecutionContext::new(&config),
            config,
            module: None,
            cache: CompiledCodeCache::default(),
            generator: None,
        })
    }

    /// Create a machine backed by an external code generator.
    ///
    /// The generator's `initialize` hook runs here; failure is fatal and no
    /// instance is produced. Its `shutdown` hook runs on drop.
    pub fn with_code_generator(
        config: Config,
        mut generator: Box<dyn CodeGenerator>,
    ) -> Result<Self, RuntimeError> {
        if config.native_tier_enabled {
            generator
                .initialize()
                .map_err(|e| RuntimeError::NativeTierInit {
                    reason: e.to_string(),
                })?;
        }
        Ok(Self {
            context: ExecutionContext::new(&config),
            config,
            module: None,
            cache: CompiledCodeCache::default(),
            generator: Some(generator),
        })
    }

    /// Attach a module. The module is owned externally and consumed
    /// read-only; loading sizes the compiled-address cache to its function
    /// count and discards any previously cached entries.
    pub fn load(&mut self, module: &'m Module) {
        self.cache = CompiledCodeCache::sized(module.function_count());
        self.module = Some(module);
    }

    /// The engine configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The execution context, for host-side inspection.
    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// Run a function by name. See [`VirtualMachine::run_function`].
    pub fn run(&mut self, name: &str, args: &[StackElement]) -> Result<StackElement, RuntimeError> {
        let module = self.module.ok_or(RuntimeError::NoModuleLoaded)?;
        let index = module.function_index(name)?;
        self.run_function(index, args)
    }

    /// Run a function by index with the given arguments, returning its
    /// single result value.
    ///
    /// An arity mismatch is reported before any stack mutation. After the
    /// top-level call completes — either tier, success or failure — the
    /// context is reset to a clean baseline; stack contents never persist
    /// across independent invocations.
    pub fn run_function(
        &mut self,
        index: usize,
        args: &[StackElement],
    ) -> Result<StackElement, RuntimeError> {
        let module = self.module.ok_or(RuntimeError::NoModuleLoaded)?;
        let function = module.function(index)?;
        if args.len() != function.nargs {
            return Err(RuntimeError::ArityMismatch {
                function: function.name.clone(),
                expected: function.nargs,
                got: args.len(),
            });
        }

        let result = self.dispatch(module, index, function, args);
        self.context.reset();
        result
    }

    fn dispatch(
        &mut self,
        module: &'m Module,
        index: usize,
        function: &'m FunctionSpec,
        args: &[StackElement],
    ) -> Result<StackElement, RuntimeError> {
        // Argument 0 goes on first so it lands at frame offset 0, the same
        // offset PUSH_FROM_VAR / POP_INTO_VAR and generated native code
        // address. Bytecode-internal FUNCTION_CALLs produce this layout
        // naturally by evaluating arguments left to right.
        for &arg in args {
            self.context.push(arg)?;
        }

        if self.config.native_tier_enabled && self.cache.get(index).is_none() {
            // The constructor guarantees a generator when the tier is on.
            if let Some(generator) = self.generator.as_mut() {
                let code = generator
                    .generate(module, function, self.config.calling_convention)
                    .map_err(|e| RuntimeError::CodeGeneration {
                        function: function.name.clone(),
                        reason: e.to_string(),
                    })?;
                self.cache.set(index, code);
            }
        }

        if let Some(code) = self.cache.get(index) {
            return self.call_native(module, function, code);
        }

        self.context.interpret(module, function)
    }

    fn call_native(
        &mut self,
        module: &'m Module,
        function: &FunctionSpec,
        code: NativeCode,
    ) -> Result<StackElement, RuntimeError> {
        match self.config.calling_convention {
            CallingConvention::RegisterPassing => match (function.nargs, code) {
                (0, NativeCode::Arity0(entry)) => Ok(entry()),
                (1, NativeCode::Arity1(entry)) => {
                    let p1 = self.context.pop()?;
                    Ok(entry(p1))
                }
                (2, NativeCode::Arity2(entry)) => {
                    let p2 = self.context.pop()?;
                    let p1 = self.context.pop()?;
                    Ok(entry(p1, p2))
                }
                (3, NativeCode::Arity3(entry)) => {
                    let p3 = self.context.pop()?;
                    let p2 = self.context.pop()?;
                    let p1 = self.context.pop()?;
                    Ok(entry(p1, p2, p3))
                }
                // More than 3 arguments, or generated code whose shape does
                // not match the function: fail, never truncate.
                (nargs, _) => Err(RuntimeError::UnsupportedCallingConvention { nargs }),
            },
            CallingConvention::StackPassing => match code {
                NativeCode::Stack(entry) => entry(&mut self.context, module, function.address),
                _ => Err(RuntimeError::UnsupportedCallingConvention {
                    nargs: function.nargs,
                }),
            },
        }
    }
}

impl Drop for VirtualMachine<'_> {
    fn drop(&mut self) {
        if let Some(generator) = self.generator.as_mut() {
            generator.shutdown();
        }
    }
}
