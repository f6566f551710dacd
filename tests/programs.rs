use chip8::instruction::Instruction;
use chip8::{Interpreter, MachineError, TimerMode, MAX_ROM_SIZE, START_ROM};
use claim::{assert_err, assert_ok};

fn boot(rom: &[u8]) -> Interpreter {
    let mut interpreter = Interpreter::with_seed(7);
    assert_ok!(interpreter.load_rom(rom));
    interpreter
}

fn run(interpreter: &mut Interpreter, cycles: usize) {
    for _ in 0..cycles {
        assert_ok!(interpreter.step());
    }
}

#[test]
fn test_load_then_add() {
    let mut interpreter = boot(&[0x60, 0x05, 0x70, 0x03]);

    run(&mut interpreter, 2);

    assert_eq!(interpreter.registers().v(0), 8);
    assert_eq!(interpreter.registers().pc(), 0x204);
}

#[test]
fn test_fresh_machines_are_identical() {
    let a = Interpreter::with_seed(3);
    let b = Interpreter::with_seed(3);

    assert_eq!(a.registers(), b.registers());
    assert_eq!(a.memory(), b.memory());
    assert_eq!(a.display(), b.display());
    assert_eq!(a.registers().pc() as usize, START_ROM);
}

#[test]
fn test_nested_subroutines() {
    let rom: &[u8] = &[
        0x22, 0x06, // 0x200: CALL 0x206
        0x12, 0x02, // 0x202: JP 0x202
        0x00, 0x00, // 0x204: padding
        0x71, 0x01, // 0x206: ADD V1, 1
        0x22, 0x0C, // 0x208: CALL 0x20C
        0x00, 0xEE, // 0x20A: RET
        0x72, 0x01, // 0x20C: ADD V2, 1
        0x00, 0xEE, // 0x20E: RET
    ];
    let mut interpreter = boot(rom);

    run(&mut interpreter, 3);
    assert_eq!(interpreter.registers().stack(), &[0x202u16, 0x20A]);

    run(&mut interpreter, 3);
    assert_eq!(interpreter.registers().pc(), 0x202);
    assert_eq!(interpreter.registers().sp(), 0);
    assert_eq!(interpreter.registers().v(1), 1);
    assert_eq!(interpreter.registers().v(2), 1);
}

#[test]
fn test_wait_for_key_then_draw_digit() {
    let rom: &[u8] = &[
        0xF0, 0x0A, // LD V0, K
        0xF0, 0x29, // LD F, V0
        0xD1, 0x15, // DRW V1, V1, 5
    ];
    let mut interpreter = boot(rom);

    for _ in 0..5 {
        let cycle = interpreter.step().unwrap();
        assert!(cycle.waiting);
        assert_eq!(cycle.instruction, Instruction::WaitKey(0));
    }
    assert_eq!(interpreter.registers().pc(), 0x200);

    interpreter.keyboard_mut().press_key(0x8);
    run(&mut interpreter, 3);

    assert_eq!(interpreter.registers().v(0), 0x8);
    // Glyph "8" starts with a full 4 pixel row
    let top: Vec<bool> = (0..5).map(|x| interpreter.display().pixel(x, 0)).collect();
    assert_eq!(top, vec![true, true, true, true, false]);
    assert_eq!(interpreter.registers().vf(), 0);
}

#[test]
fn test_bcd_score_round_trip() {
    let rom: &[u8] = &[
        0x63, 0x9D, // LD V3, 157
        0xA4, 0x00, // LD I, 0x400
        0xF3, 0x33, // LD B, V3
        0xF2, 0x65, // LD V2, [I]
    ];
    let mut interpreter = boot(rom);

    run(&mut interpreter, 4);

    assert_eq!(interpreter.memory()[0x400..0x403], [1u8, 5, 7]);
    assert_eq!(
        (interpreter.registers().v(0), interpreter.registers().v(1), interpreter.registers().v(2)),
        (1, 5, 7)
    );
}

#[test]
fn test_delay_loop_with_external_timers() {
    let rom: &[u8] = &[
        0x60, 0x03, // LD V0, 3
        0xF0, 0x15, // LD DT, V0
        0xF1, 0x07, // LD V1, DT
        0x31, 0x00, // SE V1, 0
        0x12, 0x04, // JP 0x204
        0x12, 0x0A, // JP 0x20A
    ];
    let mut interpreter = boot(rom).with_timer_mode(TimerMode::External);

    run(&mut interpreter, 20);
    assert_eq!(interpreter.registers().delay(), 3);
    assert_ne!(interpreter.registers().pc(), 0x20A);

    for _ in 0..3 {
        interpreter.tick_timers();
    }
    run(&mut interpreter, 4);

    assert_eq!(interpreter.registers().pc(), 0x20A);
}

#[test]
fn test_unknown_instruction_does_not_stall() {
    let mut interpreter = boot(&[0x01, 0x23, 0x8F, 0xF8, 0x60, 0x2A]);

    run(&mut interpreter, 3);

    assert_eq!(interpreter.registers().v(0), 0x2A);
    assert_eq!(interpreter.registers().pc(), 0x206);
}

#[test]
fn test_stack_underflow_is_recoverable() {
    let mut interpreter = boot(&[0x00, 0xEE]);

    let err = interpreter.step().unwrap_err();
    assert!(matches!(err, MachineError::StackUnderflow { address: 0x200 }));
    assert_err!(interpreter.step());

    assert_eq!(interpreter.registers().pc(), 0x200);
}

#[test]
fn test_oversized_rom_is_rejected() {
    let mut interpreter = Interpreter::with_seed(0);
    let pristine = interpreter.memory().to_vec();

    let err = interpreter.load_rom(&vec![0x11; MAX_ROM_SIZE + 1]).unwrap_err();

    assert!(matches!(err, MachineError::RomTooLarge { .. }));
    assert_eq!(interpreter.memory(), &pristine[..]);
}
