// SPDX-License-Identifier: GPL-3.0
// object.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use thiserror::Error;
use crate::cpu::{Cpu, CpuClass, CpuClassObject, CpuState};

/// Builds the class for a type from the class it inherited from its parent.
/// Implementations usually capture inherited operations and install their
/// own overrides in the returned class.
pub type ClassInitFn = fn(Box<dyn CpuClassObject>) -> Box<dyn CpuClassObject>;

/// Builds a concrete instance around a freshly allocated base state.
pub type InstanceInitFn = fn(CpuState) -> Box<dyn Cpu>;

/// This error is produced when an object is handed to code expecting a type
/// it neither is nor derives from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("object of type '{actual}' is not an instance of '{expected}'")]
pub struct TypeMismatch {
    pub actual: &'static str,
    pub expected: &'static str,
}

impl TypeMismatch {

    /// Creates a new TypeMismatch for the given actual and expected types.
    pub fn new(actual: &'static str, expected: &'static str) -> Self {
        TypeMismatch {
            actual,
            expected,
        }
    }

    /// Logs the mismatch and aborts the whole process, whatever thread it
    /// happens on. A mismatch means the caller was handed memory of the
    /// wrong shape, so there is nothing sane to carry on with.
    #[cold]
    pub fn fatal(self) -> ! {
        log::error!("{}", self);
        eprintln!("fatal: {}", self);
        std::process::abort();
    }
}

/// Errors the type registry can return to its callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectError {
    #[error("type '{0}' is already registered")]
    DuplicateType(&'static str),

    #[error("type '{name}' names unregistered parent '{parent}'")]
    UnknownParent {
        name: &'static str,
        parent: &'static str,
    },

    #[error("unknown type '{0}'")]
    UnknownType(String),

    #[error("type '{0}' is abstract and cannot be instantiated")]
    AbstractType(&'static str),

    #[error("concrete type '{0}' has no instance initializer")]
    MissingInstanceInit(&'static str),

    #[error("allocator produced the wrong object: {0}")]
    TypeMismatch(#[from] TypeMismatch),
}

/// This structure describes a type to be registered. It mirrors what a CPU
/// model hands to the runtime when it plugs itself in.
#[derive(Clone, Copy)]
pub struct TypeInfo {
    pub name: &'static str,
    pub parent: Option<&'static str>,
    pub abstract_type: bool,
    pub class_init: Option<ClassInitFn>,
    pub instance_init: Option<InstanceInitFn>,
}

/// A registered type: its parent link, its fully initialised class and the
/// instance initialiser it resolved (its own, or the nearest ancestor's).
struct TypeEntry {
    parent: Option<&'static str>,
    class: Arc<dyn CpuClassObject>,
    instance_init: Option<InstanceInitFn>,
}

/// The type registry owns every registered CPU type and allocates instances
/// of them. It is built once at startup and passed to whatever needs it.
pub struct TypeRegistry {
    types: HashMap<&'static str, TypeEntry>,
    next_cpu_index: AtomicU32,
}

impl TypeRegistry {

    /// Creates a new, empty TypeRegistry.
    pub fn new() -> Self {
        TypeRegistry {
            types: HashMap::new(),
            next_cpu_index: AtomicU32::new(0),
        }
    }

    /// Registers a type, building its class immediately. The parent must
    /// already be registered, so class initialisation always sees a fully
    /// built parent class.
    pub fn register_type(&mut self, info: TypeInfo) -> Result<(), ObjectError> {

        if self.types.contains_key(info.name) {
            return Err(ObjectError::DuplicateType(info.name));
        }

        // Inherit the whole parent class, or start a new root class.
        let (inherited, parent_instance_init) = match info.parent {
            Some(parent) => {
                let entry = self.types.get(parent).ok_or(ObjectError::UnknownParent {
                    name: info.name,
                    parent,
                })?;

                let mut cpu_class = entry.class.cpu_class().clone();
                cpu_class.inherit_as(info.name, info.abstract_type);

                (entry.class.derive(cpu_class), entry.instance_init)
            },
            None => {
                let root: Box<dyn CpuClassObject> =
                    Box::new(CpuClass::new(info.name, info.abstract_type));
                (root, None)
            },
        };

        let instance_init = info.instance_init.or(parent_instance_init);
        if !info.abstract_type && instance_init.is_none() {
            return Err(ObjectError::MissingInstanceInit(info.name));
        }

        let class = match info.class_init {
            Some(class_init) => class_init(inherited),
            None => inherited,
        };

        log::debug!(
            "Registered type '{}' (parent: {})",
            info.name,
            info.parent.unwrap_or("none")
        );

        self.types.insert(info.name, TypeEntry {
            parent: info.parent,
            class: Arc::from(class),
            instance_init,
        });

        Ok(())
    }

    /// Allocates and initialises a new CPU of the named type. The CPU is not
    /// reset; callers do that once it is wired up.
    pub fn new_cpu(&self, type_name: &str) -> Result<Box<dyn Cpu>, ObjectError> {

        let entry = self.types.get(type_name)
            .ok_or_else(|| ObjectError::UnknownType(type_name.to_string()))?;

        let cpu_class = entry.class.cpu_class();
        let instance_init = match entry.instance_init {
            Some(instance_init) if !cpu_class.is_abstract() => instance_init,
            _ => return Err(ObjectError::AbstractType(cpu_class.type_name())),
        };

        let cpu_index = self.next_cpu_index.fetch_add(1, Ordering::Relaxed);
        let cpu = instance_init(CpuState::new(Arc::clone(&entry.class), cpu_index));

        // The tag must name the type we were asked for.
        let actual = cpu.cpu_state().type_name();
        if actual != cpu_class.type_name() {
            return Err(TypeMismatch::new(actual, cpu_class.type_name()).into());
        }

        log::debug!("Created CPU {} of type '{}'", cpu_index, actual);

        Ok(cpu)
    }

    /// Returns true if `actual` is `expected` or one of its descendants.
    /// Unknown types are never compatible with anything.
    pub fn is_type_or_subtype(&self, actual: &str, expected: &str) -> bool {

        let mut current = self.types.get_key_value(actual);
        while let Some((name, entry)) = current {
            if *name == expected {
                return true;
            }
            current = entry.parent.and_then(|parent| self.types.get_key_value(parent));
        }

        false
    }

    /// Returns true if the named type is registered.
    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Looks up the class of a registered type.
    pub fn class_by_name(&self, type_name: &str) -> Option<Arc<dyn CpuClassObject>> {
        self.types.get(type_name).map(|entry| Arc::clone(&entry.class))
    }

    /// Returns the parent of a registered type, if it has one.
    pub fn parent_of(&self, type_name: &str) -> Option<&'static str> {
        self.types.get(type_name).and_then(|entry| entry.parent)
    }

    /// Lists, in name order, every type implementing `implements`.
    pub fn type_names(&self, implements: &str, include_abstract: bool) -> Vec<&'static str> {

        let mut names: Vec<&'static str> = self.types.iter()
            .filter(|(_, entry)| include_abstract || !entry.class.cpu_class().is_abstract())
            .filter(|(name, _)| self.is_type_or_subtype(name, implements))
            .map(|(name, _)| *name)
            .collect();

        names.sort_unstable();
        names
    }
}
