// SPDX-License-Identifier: GPL-3.0
// cpu.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use crate::object::{ObjectError, TypeInfo, TypeRegistry};

/// This module contains the MicroBlaze CPU model. There may be others in
/// future.
pub mod microblaze;

/// The type name of the abstract base CPU type.
pub const TYPE_CPU: &str = "cpu";

/// The signature of the reset operation held in a CPU class.
pub type ResetFn = fn(&mut dyn Cpu);

/// This trait provides an implementation-opaque way of handling any CPU
/// instance. Every CPU model embeds a CpuState and exposes it here, which is
/// all the generic runtime ever needs to see.
pub trait Cpu: Any + Send + fmt::Debug {

    /// Implementations must return their embedded base state.
    fn cpu_state(&self) -> &CpuState;

    /// Implementations must return their embedded base state mutably.
    fn cpu_state_mut(&mut self) -> &mut CpuState;

    /// Implementations must return themselves for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Implementations must return themselves mutably for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// This trait is implemented by every CPU class. A class embeds a CpuClass
/// holding the operation table, and may append model-specific fields.
pub trait CpuClassObject: Any + Send + Sync + fmt::Debug {

    /// Implementations must return their embedded base class.
    fn cpu_class(&self) -> &CpuClass;

    /// Implementations must return their embedded base class mutably.
    fn cpu_class_mut(&mut self) -> &mut CpuClass;

    /// Implementations must return a copy of themselves for a subtype, with
    /// the supplied base class in place of their own.
    fn derive(&self, cpu_class: CpuClass) -> Box<dyn CpuClassObject>;

    /// Implementations must return themselves for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Classes that embed another class object return it here, so casts can
    /// find an ancestor's class inside a subtype's.
    fn parent_class_object(&self) -> Option<&dyn CpuClassObject> {
        None
    }
}

/// This structure is the base of every CPU class: the type identity plus the
/// table of overridable operations.
#[derive(Clone, Debug)]
pub struct CpuClass {

    // Type identity. The lineage runs from the root type down to this one.
    type_name: &'static str,
    lineage: Vec<&'static str>,
    abstract_type: bool,

    // Operations.
    pub reset: ResetFn,
}

impl CpuClass {

    /// Creates a new root CpuClass whose reset is the common reset.
    pub fn new(type_name: &'static str, abstract_type: bool) -> Self {
        CpuClass {
            type_name,
            lineage: vec![type_name],
            abstract_type,
            reset: cpu_common_reset,
        }
    }

    /// Turns a copy of a parent class into the base class of a subtype.
    pub(crate) fn inherit_as(&mut self, type_name: &'static str, abstract_type: bool) {
        self.type_name = type_name;
        self.lineage.push(type_name);
        self.abstract_type = abstract_type;
    }

    /// Returns the name of the type this class belongs to.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the type names from the root type down to this one.
    pub fn lineage(&self) -> &[&'static str] {
        &self.lineage
    }

    /// Returns true if instances of this class cannot be created.
    pub fn is_abstract(&self) -> bool {
        self.abstract_type
    }

    /// Returns true if this class is of the given type or derives from it.
    pub fn is_a(&self, type_name: &str) -> bool {
        self.lineage.iter().any(|name| *name == type_name)
    }
}

impl CpuClassObject for CpuClass {

    fn cpu_class(&self) -> &CpuClass {
        self
    }

    fn cpu_class_mut(&mut self) -> &mut CpuClass {
        self
    }

    fn derive(&self, cpu_class: CpuClass) -> Box<dyn CpuClassObject> {
        Box::new(cpu_class)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// This structure is the base of every CPU instance. It holds the class,
/// which doubles as the runtime type tag, and the state shared by all models.
pub struct CpuState {

    // Class and identity.
    class: Arc<dyn CpuClassObject>,
    cpu_index: u32,

    // Execution state common to all CPU models.
    halted: bool,
    stopped: bool,
    exception_index: i32,
    interrupt_request: u32,

    // Counts completed common resets.
    reset_count: u64,
}

impl CpuState {

    /// Creates a new CpuState bound to the given class. Only the registry
    /// allocates CPUs, so this is crate-private.
    pub(crate) fn new(class: Arc<dyn CpuClassObject>, cpu_index: u32) -> Self {
        CpuState {
            class,
            cpu_index,
            halted: false,
            stopped: true,
            exception_index: -1,
            interrupt_request: 0,
            reset_count: 0,
        }
    }

    /// Returns the class of this CPU.
    pub fn class(&self) -> &Arc<dyn CpuClassObject> {
        &self.class
    }

    /// Returns the registered type name of this CPU.
    pub fn type_name(&self) -> &'static str {
        self.class.cpu_class().type_name()
    }

    /// Returns true if this CPU is of the given type or derives from it.
    pub fn is_a(&self, type_name: &str) -> bool {
        self.class.cpu_class().is_a(type_name)
    }

    /// Returns the index assigned to this CPU at allocation.
    pub fn cpu_index(&self) -> u32 {
        self.cpu_index
    }

    pub fn halted(&self) -> bool {
        self.halted
    }

    pub fn set_halted(&mut self, halted: bool) {
        self.halted = halted;
    }

    pub fn stopped(&self) -> bool {
        self.stopped
    }

    pub fn set_stopped(&mut self, stopped: bool) {
        self.stopped = stopped;
    }

    pub fn exception_index(&self) -> i32 {
        self.exception_index
    }

    pub fn set_exception_index(&mut self, exception_index: i32) {
        self.exception_index = exception_index;
    }

    pub fn interrupt_request(&self) -> u32 {
        self.interrupt_request
    }

    /// Latches the given interrupt request bits.
    pub fn raise_interrupt(&mut self, mask: u32) {
        self.interrupt_request |= mask;
    }

    /// Clears the given interrupt request bits.
    pub fn lower_interrupt(&mut self, mask: u32) {
        self.interrupt_request &= !mask;
    }

    /// Returns how many times the common reset has run on this CPU.
    pub fn reset_count(&self) -> u64 {
        self.reset_count
    }
}

impl fmt::Debug for CpuState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CpuState")
            .field("type_name", &self.type_name())
            .field("cpu_index", &self.cpu_index)
            .field("halted", &self.halted)
            .field("stopped", &self.stopped)
            .field("exception_index", &self.exception_index)
            .field("interrupt_request", &self.interrupt_request)
            .field("reset_count", &self.reset_count)
            .finish()
    }
}

/// A CpuState on its own is a complete CPU for types that add no state.
impl Cpu for CpuState {

    fn cpu_state(&self) -> &CpuState {
        self
    }

    fn cpu_state_mut(&mut self) -> &mut CpuState {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Resets a CPU through whatever reset its class currently holds.
pub fn cpu_reset(cpu: &mut dyn Cpu) {

    let reset = cpu.cpu_state().class().cpu_class().reset;

    log::trace!(
        "Dispatching reset for CPU {} ({})",
        cpu.cpu_state().cpu_index(),
        cpu.cpu_state().type_name()
    );

    reset(cpu);
}

/// The reset shared by all CPU models. Model overrides call this last, via
/// their saved parent reset.
pub fn cpu_common_reset(cpu: &mut dyn Cpu) {

    let state = cpu.cpu_state_mut();

    log::debug!("CPU {} reset ({})", state.cpu_index, state.type_name());

    state.halted = false;
    state.stopped = false;
    state.exception_index = -1;
    state.interrupt_request = 0;
    state.reset_count += 1;
}

/// Registers the abstract base CPU type.
pub fn register_types(registry: &mut TypeRegistry) -> Result<(), ObjectError> {
    registry.register_type(TypeInfo {
        name: TYPE_CPU,
        parent: None,
        abstract_type: true,
        class_init: None,
        instance_init: None,
    })
}
