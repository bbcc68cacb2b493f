// SPDX-License-Identifier: GPL-3.0
// main.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

// This file is the core of the basic client - it exists merely as a CLI-based
// program to list the registered CPU models, create one and reset it.

use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;
use qomcpu_core::{
    cpu::{TYPE_CPU, cpu_reset},
    cpu::microblaze::{self, TYPE_MICROBLAZE_CPU, env::ExecutionMode},
    default_registry,
};

#[derive(Parser)]
#[command(
    version,
    about = "A basic barebones UI for the qomcpu CPU object model",
    long_about = None
)]
struct QomCpuArgs {
    #[arg(
        long = "cpu",
        help = "The CPU type to create",
        default_value = TYPE_MICROBLAZE_CPU
    )]
    cpu: String,

    #[arg(
        long = "list",
        help = "List the CPU types that can be created and exit"
    )]
    list: bool,

    #[arg(
        long = "user-mode",
        help = "Reset a MicroBlaze CPU as a user process rather than a bare system"
    )]
    user_mode: bool,

    #[arg(
        long = "log-level",
        help = "Minimum level of log messages to show",
        default_value = "info"
    )]
    log_level: LevelFilter,
}

fn main() -> ExitCode {
    let qomcpu_args = QomCpuArgs::parse();

    colog::default_builder()
        .filter_level(qomcpu_args.log_level)
        .init();

    let registry = match default_registry() {
        Ok(registry) => registry,
        Err(err) => {
            log::error!("Failed to build the type registry: {}", err);
            return ExitCode::FAILURE;
        },
    };

    if qomcpu_args.list {
        for type_name in registry.type_names(TYPE_CPU, false) {
            println!("{}", type_name);
        }
        return ExitCode::SUCCESS;
    }

    let mut cpu = match registry.new_cpu(&qomcpu_args.cpu) {
        Ok(cpu) => cpu,
        Err(err) => {
            log::error!("Failed to create CPU: {}", err);
            return ExitCode::FAILURE;
        },
    };

    // Only MicroBlaze CPUs know about execution modes.
    match microblaze::try_instance_of_mut(cpu.as_mut()) {
        Ok(mb) if qomcpu_args.user_mode => mb.set_execution_mode(ExecutionMode::User),
        Ok(_) => {},
        Err(_) if qomcpu_args.user_mode => {
            log::warn!("CPU type '{}' has no user mode, ignoring", qomcpu_args.cpu);
        },
        Err(_) => {},
    }

    cpu_reset(cpu.as_mut());

    log::info!("{:?}", cpu.cpu_state());
    if let Ok(mb) = microblaze::try_instance_of(cpu.as_ref()) {
        log::info!(
            "PC: {:#010x}, MSR: {:#010x}, PVR version: {:#x}",
            mb.env.pc(),
            mb.env.sregs[microblaze::env::SR_MSR],
            mb.env.pvr_version()
        );
    }

    ExitCode::SUCCESS
}
