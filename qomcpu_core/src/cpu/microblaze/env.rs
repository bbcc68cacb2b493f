// SPDX-License-Identifier: GPL-3.0
// env.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

/// The number of general purpose registers.
pub const REGISTER_COUNT: usize = 32;

/// The number of special register slots.
pub const SPECIAL_REGISTER_COUNT: usize = 24;

/// The number of processor version registers.
pub const PVR_COUNT: usize = 16;

// Special register indices.
pub const SR_PC: usize = 0;
pub const SR_MSR: usize = 1;
pub const SR_EAR: usize = 3;
pub const SR_ESR: usize = 5;
pub const SR_FSR: usize = 7;
pub const SR_BTR: usize = 0xb;
pub const SR_EDR: usize = 0xd;

// Machine status register bits.
pub const MSR_BE: u32 = 1 << 0;
pub const MSR_IE: u32 = 1 << 1;
pub const MSR_C: u32 = 1 << 2;
pub const MSR_BIP: u32 = 1 << 3;
pub const MSR_EE: u32 = 1 << 8;
pub const MSR_EIP: u32 = 1 << 9;
pub const MSR_PVR: u32 = 1 << 10;
pub const MSR_UM: u32 = 1 << 11;
pub const MSR_VM: u32 = 1 << 13;
pub const MSR_CC: u32 = 1 << 31;

/// Marks the reservation register as holding nothing.
pub const RES_ADDR_NONE: u32 = 0xFFFFFFFF;

// PVR0 feature bits.
pub const PVR0_PVR_FULL_MASK: u32 = 0x80000000;
pub const PVR0_USE_BARREL_MASK: u32 = 0x40000000;
pub const PVR0_USE_DIV_MASK: u32 = 0x20000000;
pub const PVR0_USE_HW_MUL_MASK: u32 = 0x10000000;
pub const PVR0_USE_FPU_MASK: u32 = 0x08000000;
pub const PVR0_USE_EXC_MASK: u32 = 0x04000000;
pub const PVR0_USE_ICACHE_MASK: u32 = 0x02000000;
pub const PVR0_USE_DCACHE_MASK: u32 = 0x01000000;
pub const PVR0_USE_MMU: u32 = 0x00800000;
pub const PVR0_VERSION_MASK: u32 = 0x0000FF00;

// PVR2 feature bits.
pub const PVR2_D_OPB_MASK: u32 = 0x80000000;
pub const PVR2_D_LMB_MASK: u32 = 0x40000000;
pub const PVR2_I_OPB_MASK: u32 = 0x20000000;
pub const PVR2_I_LMB_MASK: u32 = 0x10000000;
pub const PVR2_USE_MSR_INSTR: u32 = 0x00020000;
pub const PVR2_USE_PCMP_INSTR: u32 = 0x00010000;
pub const PVR2_USE_BARREL_MASK: u32 = 0x00004000;
pub const PVR2_USE_DIV_MASK: u32 = 0x00002000;
pub const PVR2_USE_HW_MUL_MASK: u32 = 0x00001000;
pub const PVR2_USE_FPU_MASK: u32 = 0x00000800;
pub const PVR2_USE_MUL64_MASK: u32 = 0x00000400;
pub const PVR2_USE_FPU2_MASK: u32 = 0x00000200;
pub const PVR2_FPU_EXC_MASK: u32 = 0x00000001;

// PVR11 bits.
pub const PVR11_USE_MMU: u32 = 0xC0000000;

/// The core version reported in PVR0 after reset.
const PVR0_RESET_VERSION: u32 = 0xb;

/// The FPGA family reported in PVR10 after reset (Spartan-3A DSP).
const PVR10_RESET_FAMILY: u32 = 0x0c000000;

/// This enum selects what the CPU looks like after reset: a bare system
/// with the MMU off, or a user process with exceptions and the virtual
/// mode already enabled.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    #[default]
    System,
    User,
}

/// This structure holds the configuration of the MicroBlaze MMU.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct MmuConfig {
    pub c_mmu: u32,
    pub c_mmu_tlb_access: u32,
    pub c_mmu_zones: u32,
}

/// This structure holds the architectural state of a MicroBlaze CPU. It lives
/// inside the owning CPU and is touched on every emulated instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CpuMbState {

    // Register definitions.
    pub regs: [u32; REGISTER_COUNT],
    pub sregs: [u32; SPECIAL_REGISTER_COUNT],
    pub pvr: [u32; PVR_COUNT],

    // Branch and immediate prefix state.
    pub btaddr: u32,
    pub btarget: u32,
    pub imm: u32,
    pub iflags: u32,

    // Stack protector bounds.
    pub slr: u32,
    pub shr: u32,

    // Exclusive load/store reservation.
    pub res_addr: u32,
    pub res_val: u32,

    // MMU configuration.
    pub mmu: MmuConfig,

    // Selected before reset, survives it.
    pub mode: ExecutionMode,
}

impl CpuMbState {

    /// Creates a new, all-zero CpuMbState in system mode. Nothing is valid
    /// until the owning CPU has been reset.
    pub fn new() -> Self {
        CpuMbState {
            regs: [0; REGISTER_COUNT],
            sregs: [0; SPECIAL_REGISTER_COUNT],
            pvr: [0; PVR_COUNT],
            btaddr: 0,
            btarget: 0,
            imm: 0,
            iflags: 0,
            slr: 0,
            shr: 0,
            res_addr: 0,
            res_val: 0,
            mmu: MmuConfig::default(),
            mode: ExecutionMode::System,
        }
    }

    /// Puts the state into its architectural reset condition, keeping the
    /// execution mode.
    pub fn reset(&mut self) {

        // Clear everything first.
        *self = CpuMbState {
            mode: self.mode,
            ..CpuMbState::new()
        };

        // Nothing reserved, and the stack protector disabled.
        self.res_addr = RES_ADDR_NONE;
        self.shr = !0;

        // Advertise the features this model provides.
        self.pvr[0] = PVR0_PVR_FULL_MASK
            | PVR0_USE_BARREL_MASK
            | PVR0_USE_DIV_MASK
            | PVR0_USE_HW_MUL_MASK
            | PVR0_USE_EXC_MASK
            | PVR0_USE_ICACHE_MASK
            | PVR0_USE_DCACHE_MASK
            | PVR0_USE_MMU
            | (PVR0_RESET_VERSION << 8);

        self.pvr[2] = PVR2_D_OPB_MASK
            | PVR2_D_LMB_MASK
            | PVR2_I_OPB_MASK
            | PVR2_I_LMB_MASK
            | PVR2_USE_MSR_INSTR
            | PVR2_USE_PCMP_INSTR
            | PVR2_USE_BARREL_MASK
            | PVR2_USE_DIV_MASK
            | PVR2_USE_HW_MUL_MASK
            | PVR2_USE_MUL64_MASK
            | PVR2_USE_FPU_MASK
            | PVR2_USE_FPU2_MASK
            | PVR2_FPU_EXC_MASK;

        self.pvr[10] = PVR10_RESET_FAMILY;
        self.pvr[11] = PVR11_USE_MMU | (16 << 17);

        match self.mode {
            ExecutionMode::System => {
                self.sregs[SR_MSR] = 0;
                self.mmu = MmuConfig {
                    c_mmu: 3,
                    c_mmu_tlb_access: 3,
                    c_mmu_zones: 16,
                };
            },
            ExecutionMode::User => {
                self.sregs[SR_MSR] = MSR_EE | MSR_IE | MSR_VM | MSR_UM;
            },
        }
    }

    /// Returns the program counter.
    pub fn pc(&self) -> u32 {
        self.sregs[SR_PC]
    }

    /// Returns the core version field of PVR0.
    pub fn pvr_version(&self) -> u32 {
        (self.pvr[0] & PVR0_VERSION_MASK) >> 8
    }
}

#[cfg(test)]
mod tests;
