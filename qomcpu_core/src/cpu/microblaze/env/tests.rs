// SPDX-License-Identifier: GPL-3.0
// tests.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use super::{
    CpuMbState, ExecutionMode, MSR_BE, MSR_BIP, MSR_C, MSR_CC, MSR_EE, MSR_EIP, MSR_IE,
    MSR_PVR, MSR_UM, MSR_VM, MmuConfig, PVR0_USE_FPU_MASK, PVR0_USE_MMU, PVR11_USE_MMU,
    PVR2_USE_FPU_MASK, RES_ADDR_NONE, SR_BTR, SR_EAR, SR_EDR, SR_ESR, SR_FSR, SR_MSR, SR_PC,
};

#[test]
fn new_state_should_be_all_zero_in_system_mode() {

    let env = CpuMbState::new();

    assert_eq!(env.regs, [0; 32]);
    assert_eq!(env.pvr, [0; 16]);
    assert_eq!(env.res_addr, 0);
    assert_eq!(env.mode, ExecutionMode::System);
}

#[test]
fn reset_should_clear_registers_and_seed_reset_values() {

    let mut env = CpuMbState::new();
    env.regs[1] = 0xDEADBEEF;
    env.sregs[SR_PC] = 0x2000;
    env.imm = 0x1234;
    env.btaddr = 0x40;

    env.reset();

    assert_eq!(env.regs, [0; 32]);
    assert_eq!(env.pc(), 0);
    assert_eq!(env.imm, 0);
    assert_eq!(env.btaddr, 0);
    assert_eq!(env.res_addr, RES_ADDR_NONE);
    assert_eq!(env.shr, 0xFFFFFFFF);
    assert_eq!(env.slr, 0);
}

#[test]
fn reset_should_advertise_version_and_features() {

    let mut env = CpuMbState::new();
    env.reset();

    assert_eq!(env.pvr_version(), 0xb);
    assert_ne!(env.pvr[0] & PVR0_USE_MMU, 0);
    assert_eq!(env.pvr[10], 0x0c000000);
    assert_eq!(env.pvr[11], PVR11_USE_MMU | (16 << 17));
}

#[test]
fn system_mode_reset_should_leave_msr_clear_and_configure_mmu() {

    let mut env = CpuMbState::new();
    env.sregs[SR_MSR] = 0xFFFF;

    env.reset();

    assert_eq!(env.sregs[SR_MSR], 0);
    assert_eq!(env.mmu, MmuConfig {
        c_mmu: 3,
        c_mmu_tlb_access: 3,
        c_mmu_zones: 16,
    });
}

#[test]
fn user_mode_reset_should_enable_user_and_virtual_mode() {

    let mut env = CpuMbState::new();
    env.mode = ExecutionMode::User;

    env.reset();

    assert_eq!(env.sregs[SR_MSR], MSR_EE | MSR_IE | MSR_VM | MSR_UM);
    assert_eq!(env.mmu, MmuConfig::default());
    assert_eq!(env.mode, ExecutionMode::User);
}

#[test]
fn reset_should_clear_exception_and_fault_registers() {

    let mut env = CpuMbState::new();

    // Given a CPU that took a fault in a branch delay slot,
    for reg in [SR_EAR, SR_ESR, SR_FSR, SR_BTR, SR_EDR] {
        env.sregs[reg] = 0xFFFFFFFF;
    }

    // every exception-related register should read zero after reset.
    env.reset();

    for reg in [SR_EAR, SR_ESR, SR_FSR, SR_BTR, SR_EDR] {
        assert_eq!(env.sregs[reg], 0, "special register {:#x}", reg);
    }
}

#[test]
fn user_mode_reset_should_set_no_other_msr_bits() {

    let mut env = CpuMbState::new();
    env.mode = ExecutionMode::User;
    env.sregs[SR_MSR] = MSR_BE | MSR_C | MSR_BIP | MSR_EIP | MSR_PVR | MSR_CC;

    env.reset();

    let msr = env.sregs[SR_MSR];
    assert_eq!(msr & (MSR_BE | MSR_C | MSR_BIP | MSR_EIP | MSR_PVR | MSR_CC), 0);
}

#[test]
fn reset_should_only_advertise_the_fpu_in_pvr2() {

    let mut env = CpuMbState::new();
    env.reset();

    assert_eq!(env.pvr[0] & PVR0_USE_FPU_MASK, 0);
    assert_ne!(env.pvr[2] & PVR2_USE_FPU_MASK, 0);
}
