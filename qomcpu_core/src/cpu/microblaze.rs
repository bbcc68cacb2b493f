// SPDX-License-Identifier: GPL-3.0
// microblaze.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use std::any::Any;
use std::mem::offset_of;
use super::{Cpu, CpuClass, CpuClassObject, CpuState, ResetFn, TYPE_CPU};
use crate::object::{ObjectError, TypeInfo, TypeMismatch, TypeRegistry};
use env::{CpuMbState, ExecutionMode};

/// This module contains the architectural state block of the MicroBlaze.
pub mod env;

/// The type name of the MicroBlaze CPU.
pub const TYPE_MICROBLAZE_CPU: &str = "microblaze-cpu";

/// The byte offset of the state block within a MicroBlazeCpu.
pub const ENV_OFFSET: usize = offset_of!(MicroBlazeCpu, env);

/// This structure is the class of the MicroBlaze CPU. The base class comes
/// first; `parent_reset` holds the reset this class replaced.
#[derive(Clone, Debug)]
pub struct MicroBlazeCpuClass {
    parent_class: CpuClass,
    parent_reset: ResetFn,
}

impl MicroBlazeCpuClass {

    /// Returns the reset implementation this class overrides.
    pub fn parent_reset(&self) -> ResetFn {
        self.parent_reset
    }
}

impl CpuClassObject for MicroBlazeCpuClass {

    fn cpu_class(&self) -> &CpuClass {
        &self.parent_class
    }

    fn cpu_class_mut(&mut self) -> &mut CpuClass {
        &mut self.parent_class
    }

    fn derive(&self, cpu_class: CpuClass) -> Box<dyn CpuClassObject> {
        Box::new(MicroBlazeCpuClass {
            parent_class: cpu_class,
            parent_reset: self.parent_reset,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn parent_class_object(&self) -> Option<&dyn CpuClassObject> {
        Some(&self.parent_class)
    }
}

/// This structure represents a MicroBlaze CPU: the base CPU state followed
/// by the MicroBlaze architectural state.
#[repr(C)]
#[derive(Debug)]
pub struct MicroBlazeCpu {
    pub parent_obj: CpuState,
    pub env: CpuMbState,
}

impl MicroBlazeCpu {

    /// Selects the execution mode applied at the next reset.
    pub fn set_execution_mode(&mut self, mode: ExecutionMode) {
        self.env.mode = mode;
    }
}

impl Cpu for MicroBlazeCpu {

    fn cpu_state(&self) -> &CpuState {
        &self.parent_obj
    }

    fn cpu_state_mut(&mut self) -> &mut CpuState {
        &mut self.parent_obj
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Checks that a class is the MicroBlaze class or one derived from it.
pub fn try_class_of(class: &dyn CpuClassObject) -> Result<&MicroBlazeCpuClass, TypeMismatch> {

    let cpu_class = class.cpu_class();
    let mismatch = || TypeMismatch::new(cpu_class.type_name(), TYPE_MICROBLAZE_CPU);

    if !cpu_class.is_a(TYPE_MICROBLAZE_CPU) {
        return Err(mismatch());
    }

    // Subtypes may wrap our class in their own, so look through them.
    let mut current = Some(class);
    while let Some(candidate) = current {
        if let Some(mcc) = candidate.as_any().downcast_ref::<MicroBlazeCpuClass>() {
            return Ok(mcc);
        }
        current = candidate.parent_class_object();
    }

    Err(mismatch())
}

/// Converts a class to the MicroBlaze class, stopping the program if it is
/// anything else.
pub fn class_of(class: &dyn CpuClassObject) -> &MicroBlazeCpuClass {
    try_class_of(class).unwrap_or_else(|mismatch| mismatch.fatal())
}

/// Checks that a CPU is a MicroBlaze CPU or one derived from it.
pub fn try_instance_of(cpu: &dyn Cpu) -> Result<&MicroBlazeCpu, TypeMismatch> {

    let type_name = cpu.cpu_state().type_name();
    let mismatch = || TypeMismatch::new(type_name, TYPE_MICROBLAZE_CPU);

    if !cpu.cpu_state().is_a(TYPE_MICROBLAZE_CPU) {
        return Err(mismatch());
    }

    cpu.as_any().downcast_ref::<MicroBlazeCpu>().ok_or_else(mismatch)
}

/// Mutable version of `try_instance_of`.
pub fn try_instance_of_mut(cpu: &mut dyn Cpu) -> Result<&mut MicroBlazeCpu, TypeMismatch> {

    let type_name = cpu.cpu_state().type_name();
    let mismatch = || TypeMismatch::new(type_name, TYPE_MICROBLAZE_CPU);

    if !cpu.cpu_state().is_a(TYPE_MICROBLAZE_CPU) {
        return Err(mismatch());
    }

    cpu.as_any_mut().downcast_mut::<MicroBlazeCpu>().ok_or_else(mismatch)
}

/// Converts a CPU to a MicroBlaze CPU, stopping the program if it is
/// anything else.
pub fn instance_of(cpu: &dyn Cpu) -> &MicroBlazeCpu {
    try_instance_of(cpu).unwrap_or_else(|mismatch| mismatch.fatal())
}

/// Mutable version of `instance_of`.
pub fn instance_of_mut(cpu: &mut dyn Cpu) -> &mut MicroBlazeCpu {
    try_instance_of_mut(cpu).unwrap_or_else(|mismatch| mismatch.fatal())
}

/// Returns the MicroBlaze class of a CPU, stopping the program if the CPU
/// is not a MicroBlaze.
pub fn class_of_instance(cpu: &dyn Cpu) -> &MicroBlazeCpuClass {
    class_of(&**cpu.cpu_state().class())
}

/// Recovers the CPU owning a state block.
///
/// # Safety
///
/// `env` must point at the `env` field of a live `MicroBlazeCpu` and must
/// have been derived from a pointer to that whole CPU (for example with
/// `&raw const (*cpu).env`), not from a reference to the field alone.
/// Nothing is checked.
pub unsafe fn owning_instance(env: *const CpuMbState) -> *const MicroBlazeCpu {
    // SAFETY: the caller guarantees `env` lies ENV_OFFSET bytes into a
    // MicroBlazeCpu, so stepping back stays inside that allocation.
    unsafe { env.byte_sub(ENV_OFFSET).cast::<MicroBlazeCpu>() }
}

/// Mutable version of `owning_instance`.
///
/// # Safety
///
/// As for `owning_instance`, and the pointer must carry write permission
/// for the whole CPU.
pub unsafe fn owning_instance_mut(env: *mut CpuMbState) -> *mut MicroBlazeCpu {
    // SAFETY: see owning_instance.
    unsafe { env.byte_sub(ENV_OFFSET).cast::<MicroBlazeCpu>() }
}

/// Recovers the base state of the CPU owning a state block.
///
/// # Safety
///
/// As for `owning_instance`.
pub unsafe fn env_get_cpu(env: *const CpuMbState) -> *const CpuState {
    // SAFETY: parent_obj sits at offset 0 of the repr(C) owner.
    unsafe { &raw const (*owning_instance(env)).parent_obj }
}

/// The MicroBlaze reset. It puts the state block into its reset condition,
/// then hands over to the reset it replaced for the common bookkeeping.
fn microblaze_cpu_reset(cpu: &mut dyn Cpu) {

    let parent_reset = class_of_instance(cpu).parent_reset;

    let mb = instance_of_mut(cpu);
    mb.env.reset();

    log::trace!("CPU {} state after reset: {:?}", mb.parent_obj.cpu_index(), mb.env);

    parent_reset(cpu);
}

/// Captures the inherited reset and installs the MicroBlaze one in its place.
fn microblaze_cpu_class_init(inherited: Box<dyn CpuClassObject>) -> Box<dyn CpuClassObject> {

    let mut parent_class = inherited.cpu_class().clone();
    let parent_reset = parent_class.reset;
    parent_class.reset = microblaze_cpu_reset;

    Box::new(MicroBlazeCpuClass {
        parent_class,
        parent_reset,
    })
}

/// Builds a MicroBlaze CPU around freshly allocated base state.
fn microblaze_cpu_init(parent_obj: CpuState) -> Box<dyn Cpu> {
    Box::new(MicroBlazeCpu {
        parent_obj,
        env: CpuMbState::new(),
    })
}

/// Registers the MicroBlaze CPU type. The base CPU type must already be
/// registered.
pub fn register_types(registry: &mut TypeRegistry) -> Result<(), ObjectError> {
    registry.register_type(TypeInfo {
        name: TYPE_MICROBLAZE_CPU,
        parent: Some(TYPE_CPU),
        abstract_type: false,
        class_init: Some(microblaze_cpu_class_init),
        instance_init: Some(microblaze_cpu_init),
    })
}
