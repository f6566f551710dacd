use std::path::Path;

use log::{debug, trace, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    display::{Display, DISPLAY_HEIGHT, DISPLAY_WIDTH},
    instruction::Instruction,
    keyboard::Keyboard,
    memory::Memory,
    registers::{Registers, FLAG},
    MachineError, Result,
};

/// Width of one instruction in bytes.
const INSTRUCTION_SIZE: u16 = 2;

/// When the delay and sound timers count down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimerMode {
    /// Timers tick once after every executed instruction.
    #[default]
    PerCycle,
    /// Timers only tick when [`Interpreter::tick_timers`] is called, usually at 60 Hz.
    External,
}

/// Outcome of a single [`Interpreter::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cycle {
    /// Address the instruction was fetched from.
    pub address: u16,
    pub instruction: Instruction,
    /// The program is blocked on `LD Vx, K` and will re-run it next cycle.
    pub waiting: bool,
    /// The sound timer ran out during this cycle.
    pub tone: bool,
}

/// How the program counter moves after an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProgramCounter {
    Next,
    Skip,
    Jump(u16),
    Hold,
}

impl ProgramCounter {
    fn skip_if(condition: bool) -> Self {
        if condition {
            ProgramCounter::Skip
        } else {
            ProgramCounter::Next
        }
    }
}

#[derive(Debug, Clone)]
pub struct Interpreter {
    registers: Registers,
    memory: Memory,
    display: Display,
    keyboard: Keyboard,
    rng: ChaCha8Rng,
    timer_mode: TimerMode,
}

impl Interpreter {
    /// Fresh machine with its random source seeded from the OS.
    pub fn new() -> Self {
        Self::with_rng(ChaCha8Rng::from_entropy())
    }

    /// Fresh machine whose `RND` results are fully determined by `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn with_rom(bytes: &[u8]) -> Result<Self> {
        let mut interpreter = Self::new();
        interpreter.load_rom(bytes)?;

        Ok(interpreter)
    }

    fn with_rng(rng: ChaCha8Rng) -> Self {
        Interpreter {
            registers: Registers::default(),
            memory: Memory::new(),
            display: Display::new(),
            keyboard: Keyboard::new(),
            rng,
            timer_mode: TimerMode::default(),
        }
    }

    pub fn with_timer_mode(mut self, timer_mode: TimerMode) -> Self {
        self.timer_mode = timer_mode;
        self
    }

    pub fn set_timer_mode(&mut self, timer_mode: TimerMode) {
        self.timer_mode = timer_mode;
    }

    pub fn timer_mode(&self) -> TimerMode {
        self.timer_mode
    }

    /// Copies a ROM image to 0x200. Images that do not fit are rejected and memory is left as it was.
    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<()> {
        self.memory.load_rom(bytes)?;
        debug!("Loaded ROM of {} bytes", bytes.len());

        Ok(())
    }

    pub fn load_rom_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| MachineError::RomRead {
            path: path.to_path_buf(),
            source,
        })?;

        self.load_rom(&bytes)
    }

    /// The instruction word at the program counter.
    pub fn fetch(&self) -> u16 {
        self.memory.read_word(self.registers.pc as usize)
    }

    /// Runs one fetch-decode-execute cycle, followed by a timer tick in [`TimerMode::PerCycle`].
    ///
    /// Stack overflow and underflow are reported as errors; the machine is left exactly as it was
    /// before the faulting instruction, so calling `step` again faults again.
    pub fn step(&mut self) -> Result<Cycle> {
        let address = self.registers.pc;
        let word = self.fetch();
        let instruction = Instruction::decode(word);

        trace!("{:#05X}: {:04X}  {}", address, word, instruction);

        let next = self.execute(instruction)?;

        match next {
            ProgramCounter::Next => self.registers.pc = address.wrapping_add(INSTRUCTION_SIZE),
            ProgramCounter::Skip => self.registers.pc = address.wrapping_add(2 * INSTRUCTION_SIZE),
            ProgramCounter::Jump(target) => self.registers.pc = target,
            ProgramCounter::Hold => {}
        }

        let tone = match self.timer_mode {
            TimerMode::PerCycle => self.tick_timers(),
            TimerMode::External => false,
        };

        Ok(Cycle {
            address,
            instruction,
            waiting: next == ProgramCounter::Hold,
            tone,
        })
    }

    /// Counts both timers down by one. Returns `true` if the sound timer ran out, which is the
    /// signal for the frontend to stop (or play) its tone.
    pub fn tick_timers(&mut self) -> bool {
        let tone = self.registers.tick_timers();
        if tone {
            debug!("Sound timer elapsed");
        }

        tone
    }

    fn execute(&mut self, instruction: Instruction) -> Result<ProgramCounter> {
        let next = match instruction {
            Instruction::Clear => self.handle_clear(),
            Instruction::Return => self.handle_ret()?,
            Instruction::Jump(nnn) => ProgramCounter::Jump(nnn),
            Instruction::Call(nnn) => self.handle_call(nnn)?,
            Instruction::SkipEqualImmediate(x, kk) => ProgramCounter::skip_if(self.v(x) == kk),
            Instruction::SkipNotEqualImmediate(x, kk) => ProgramCounter::skip_if(self.v(x) != kk),
            Instruction::SkipEqualRegister(x, y) => ProgramCounter::skip_if(self.v(x) == self.v(y)),
            Instruction::SkipNotEqualRegister(x, y) => ProgramCounter::skip_if(self.v(x) != self.v(y)),
            Instruction::LoadImmediate(x, kk) => self.set_v(x, kk),
            Instruction::AddImmediate(x, kk) => self.set_v(x, self.v(x).wrapping_add(kk)),
            Instruction::Load(x, y) => self.set_v(x, self.v(y)),
            Instruction::Or(x, y) => self.set_v(x, self.v(x) | self.v(y)),
            Instruction::And(x, y) => self.set_v(x, self.v(x) & self.v(y)),
            Instruction::Xor(x, y) => self.set_v(x, self.v(x) ^ self.v(y)),
            Instruction::Add(x, y) => self.handle_add_register_register(x, y),
            Instruction::Sub(x, y) => self.handle_sub_register_register(x, y),
            Instruction::ShiftRight(x, _) => self.handle_shift_right_register_one(x),
            Instruction::SubNegated(x, y) => self.handle_sub_register_register_negated(x, y),
            Instruction::ShiftLeft(x, _) => self.handle_shift_left_register_one(x),
            Instruction::LoadIndex(nnn) => {
                self.registers.i = nnn;
                ProgramCounter::Next
            }
            Instruction::JumpOffset(nnn) => ProgramCounter::Jump(nnn.wrapping_add(self.v(0) as u16)),
            Instruction::Random(x, kk) => {
                let byte: u8 = self.rng.gen();
                self.set_v(x, byte & kk)
            }
            Instruction::Draw(x, y, n) => self.handle_draw_sprite(x, y, n),
            Instruction::SkipKeyPressed(x) => ProgramCounter::skip_if(self.keyboard.is_pressed(self.v(x))),
            Instruction::SkipKeyNotPressed(x) => ProgramCounter::skip_if(!self.keyboard.is_pressed(self.v(x))),
            Instruction::LoadDelay(x) => self.set_v(x, self.registers.delay),
            Instruction::WaitKey(x) => self.handle_wait_key(x),
            Instruction::SetDelay(x) => {
                self.registers.delay = self.v(x);
                ProgramCounter::Next
            }
            Instruction::SetSound(x) => {
                self.registers.sound = self.v(x);
                ProgramCounter::Next
            }
            Instruction::AddIndex(x) => {
                self.registers.i = self.registers.i.wrapping_add(self.v(x) as u16);
                ProgramCounter::Next
            }
            Instruction::LoadFont(x) => {
                self.registers.i = Memory::font_address(self.v(x));
                ProgramCounter::Next
            }
            Instruction::StoreBcd(x) => self.handle_store_bcd(x),
            Instruction::StoreRegisters(x) => self.handle_store_registers(x),
            Instruction::LoadRegisters(x) => self.handle_load_registers(x),
            Instruction::Unknown(word) => {
                warn!("Unknown instruction {:#06X} at {:#05X}", word, self.registers.pc);
                ProgramCounter::Next
            }
        };

        Ok(next)
    }

    fn v(&self, x: u8) -> u8 {
        self.registers.vx[x as usize]
    }

    fn set_v(&mut self, x: u8, value: u8) -> ProgramCounter {
        self.registers.vx[x as usize] = value;
        ProgramCounter::Next
    }

    /// Writes an instruction result and then its flag, so that with `x = F` the flag wins.
    fn set_v_with_flag(&mut self, x: u8, value: u8, flag: bool) -> ProgramCounter {
        self.registers.vx[x as usize] = value;
        self.registers.vx[FLAG] = flag as u8;
        ProgramCounter::Next
    }

    /// 00E0 - CLS
    /// Clear the display.
    fn handle_clear(&mut self) -> ProgramCounter {
        self.display.clear();
        ProgramCounter::Next
    }

    /// 00EE - RET
    /// Return from a subroutine.
    ///
    /// The interpreter subtracts 1 from the stack pointer, then sets the program counter to the address at the top of the stack.
    fn handle_ret(&mut self) -> Result<ProgramCounter> {
        let address = self.registers.pc;
        let target = self.registers.pop().ok_or(MachineError::StackUnderflow { address })?;

        Ok(ProgramCounter::Jump(target))
    }

    /// 2nnn - CALL addr
    /// Call subroutine at nnn.
    ///
    /// The interpreter puts the address of the following instruction on the top of the stack, then increments the stack pointer. The PC is then set to nnn.
    fn handle_call(&mut self, nnn: u16) -> Result<ProgramCounter> {
        let address = self.registers.pc;
        if !self.registers.push(address.wrapping_add(INSTRUCTION_SIZE)) {
            return Err(MachineError::StackOverflow { address });
        }

        Ok(ProgramCounter::Jump(nnn))
    }

    /// 8xy4 - ADD Vx, Vy
    /// Set Vx = Vx + Vy, set VF = carry.
    ///
    /// The values of Vx and Vy are added together. If the result is greater than 8 bits
    /// (i.e., > 255,) VF is set to 1, otherwise 0. Only the lowest 8 bits of the result are kept, and stored in Vx.
    fn handle_add_register_register(&mut self, x: u8, y: u8) -> ProgramCounter {
        let (result, overflow) = self.v(x).overflowing_add(self.v(y));

        self.set_v_with_flag(x, result, overflow)
    }

    /// 8xy5 - SUB Vx, Vy
    /// Set Vx = Vx - Vy, set VF = NOT borrow.
    ///
    /// If Vx > Vy, then VF is set to 1, otherwise 0. Then Vy is subtracted from Vx, and the results stored in Vx.
    fn handle_sub_register_register(&mut self, x: u8, y: u8) -> ProgramCounter {
        let a = self.v(x);
        let b = self.v(y);

        self.set_v_with_flag(x, a.wrapping_sub(b), a > b)
    }

    /// 8xy6 - SHR Vx {, Vy}
    /// Set Vx = Vx SHR 1.
    ///
    /// If the least-significant bit of Vx is 1, then VF is set to 1, otherwise 0. Then Vx is divided by 2.
    fn handle_shift_right_register_one(&mut self, x: u8) -> ProgramCounter {
        let a = self.v(x);

        self.set_v_with_flag(x, a >> 1, a & 0b0000_0001 != 0)
    }

    /// 8xy7 - SUBN Vx, Vy
    /// Set Vx = Vy - Vx, set VF = NOT borrow.
    ///
    /// If Vy > Vx, then VF is set to 1, otherwise 0. Then Vx is subtracted from Vy, and the results stored in Vx.
    fn handle_sub_register_register_negated(&mut self, x: u8, y: u8) -> ProgramCounter {
        let a = self.v(x);
        let b = self.v(y);

        self.set_v_with_flag(x, b.wrapping_sub(a), b > a)
    }

    /// 8xyE - SHL Vx {, Vy}
    /// Set Vx = Vx SHL 1.
    ///
    /// If the most-significant bit of Vx is 1, then VF is set to 1, otherwise to 0. Then Vx is multiplied by 2.
    fn handle_shift_left_register_one(&mut self, x: u8) -> ProgramCounter {
        let a = self.v(x);

        self.set_v_with_flag(x, a << 1, a & 0b1000_0000 != 0)
    }

    /// Dxyn - DRW Vx, Vy, nibble
    /// Display n-byte sprite starting at memory location I at (Vx, Vy), set VF = collision.
    ///
    /// The interpreter reads n bytes from memory, starting at the address stored in I. These bytes
    /// are then displayed as sprites on screen at coordinates (Vx, Vy). Sprites are XORed onto the
    /// existing screen. If this causes any pixels to be erased, VF is set to 1, otherwise it is set
    /// to 0. The starting position wraps around the screen, but the parts of a sprite that extend
    /// past the right or bottom edge are clipped.
    fn handle_draw_sprite(&mut self, x: u8, y: u8, n: u8) -> ProgramCounter {
        let origin_x = self.v(x) as usize % DISPLAY_WIDTH;
        let origin_y = self.v(y) as usize % DISPLAY_HEIGHT;

        self.registers.vx[FLAG] = 0;

        let mut was_cleared = false;

        for row in 0..n as usize {
            let sprite = self.memory.read(self.registers.i as usize + row);

            for col in 0..8 {
                if sprite & (0b1000_0000 >> col) == 0 {
                    continue;
                }

                if self.display.flip_pixel(origin_x + col, origin_y + row) {
                    was_cleared = true;
                }
            }
        }

        if was_cleared {
            self.registers.vx[FLAG] = 1;
        }

        ProgramCounter::Next
    }

    /// Fx0A - LD Vx, K
    /// Wait for a key press, store the value of the key in Vx.
    ///
    /// Without a pressed key the program counter is held, so the instruction runs again next cycle.
    fn handle_wait_key(&mut self, x: u8) -> ProgramCounter {
        match self.keyboard.first_pressed() {
            Some(key) => self.set_v(x, key),
            None => {
                debug!("Waiting for key press at {:#05X}", self.registers.pc);
                ProgramCounter::Hold
            }
        }
    }

    /// Fx33 - LD B, Vx
    /// Store BCD representation of Vx in memory locations I, I+1, and I+2.
    fn handle_store_bcd(&mut self, x: u8) -> ProgramCounter {
        let value = self.v(x);
        let i = self.registers.i as usize;

        self.memory.write(i, value / 100);
        self.memory.write(i + 1, (value / 10) % 10);
        self.memory.write(i + 2, value % 10);

        ProgramCounter::Next
    }

    /// Fx55 - LD [I], Vx
    /// Store registers V0 through Vx in memory starting at location I.
    fn handle_store_registers(&mut self, x: u8) -> ProgramCounter {
        let i = self.registers.i as usize;
        for r in 0..=x as usize {
            self.memory.write(i + r, self.registers.vx[r]);
        }

        ProgramCounter::Next
    }

    /// Fx65 - LD Vx, [I]
    /// Read registers V0 through Vx from memory starting at location I.
    fn handle_load_registers(&mut self, x: u8) -> ProgramCounter {
        let i = self.registers.i as usize;
        for r in 0..=x as usize {
            self.registers.vx[r] = self.memory.read(i + r);
        }

        ProgramCounter::Next
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    pub fn keyboard_mut(&mut self) -> &mut Keyboard {
        &mut self.keyboard
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn memory(&self) -> &[u8] {
        self.memory.bytes()
    }

    /// The sound timer is running, i.e. a tone should currently be audible.
    pub fn sound_active(&self) -> bool {
        self.registers.sound > 0
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
