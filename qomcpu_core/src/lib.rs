// SPDX-License-Identifier: GPL-3.0
// lib.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

// Crate-wide lines to disable specific lints:

// Types that need registering or resetting before use get an explicit
// constructor rather than a derived Default implementation.
#![allow(clippy::new_without_default)]

use object::{ObjectError, TypeRegistry};

/// This module contains the type registry that CPU models plug into.
pub mod object;

/// This module contains the base CPU type and the CPU models built on it.
pub mod cpu;

/// Builds a registry holding the base CPU type and every CPU model.
pub fn default_registry() -> Result<TypeRegistry, ObjectError> {

    let mut registry = TypeRegistry::new();

    cpu::register_types(&mut registry)?;
    cpu::microblaze::register_types(&mut registry)?;

    Ok(registry)
}
