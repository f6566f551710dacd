use crate::memory::START_ROM;

pub const STACK_DEPTH: usize = 16;
pub const FLAG: usize = 0xF;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
    /// Chip-8 has 16 general purpose 8-bit registers, usually referred to as Vx, where x is a hexadecimal digit (0 through F).
    /// The VF register should not be used by any program, as it is used as a flag by some instructions.
    pub(crate) vx: [u8; 16],

    pub(crate) i: u16,
    /// The program counter (PC) should be 16-bit, and is used to store the currently executing address.
    pub(crate) pc: u16,
    /// The stack pointer (SP) points one past the topmost level of the stack, so 0 means empty.
    pub(crate) sp: u16,

    pub(crate) delay: u8,
    pub(crate) sound: u8,

    /// The stack is an array of 16 16-bit values, used to store the address that the interpreter should return to when finished with a subroutine. Chip-8 allows for up to 16 levels of nested subroutines.
    pub(crate) stack: [u16; STACK_DEPTH],
}

impl Default for Registers {
    fn default() -> Self {
        Registers {
            vx: [0; 16],
            i: 0,
            pc: START_ROM as u16,
            sp: 0,
            delay: 0,
            sound: 0,
            stack: [0; STACK_DEPTH],
        }
    }
}

impl Registers {
    pub fn v(&self, x: usize) -> u8 {
        self.vx[x & 0xF]
    }

    pub fn vf(&self) -> u8 {
        self.vx[FLAG]
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn sp(&self) -> u16 {
        self.sp
    }

    pub fn delay(&self) -> u8 {
        self.delay
    }

    pub fn sound(&self) -> u8 {
        self.sound
    }

    /// Return addresses currently on the stack, oldest first.
    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.sp as usize]
    }

    /// Pushes `address` and returns `false` without touching the stack if it is full.
    pub(crate) fn push(&mut self, address: u16) -> bool {
        let sp = self.sp as usize;
        if sp >= STACK_DEPTH {
            return false;
        }

        self.stack[sp] = address;
        self.sp += 1;
        true
    }

    pub(crate) fn pop(&mut self) -> Option<u16> {
        if self.sp == 0 {
            return None;
        }

        self.sp -= 1;
        Some(self.stack[self.sp as usize])
    }

    /// Decrements both timers towards zero. Returns `true` when the sound timer runs out on this tick.
    pub(crate) fn tick_timers(&mut self) -> bool {
        if self.delay > 0 {
            self.delay -= 1;
        }

        let tone = self.sound == 1;
        if self.sound > 0 {
            self.sound -= 1;
        }

        tone
    }
}
