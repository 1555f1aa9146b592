//! Klaus Dormann's 6502 functional and decimal test images.
//!
//! Both images are assembled with load address $0000 and finish by
//! branching to themselves. The functional test succeeds at $3469; the
//! decimal test reports through its error byte at $000B.

use emu_core::{Cpu, SimpleBus};
use mos_6502::{Mos6502, Registers};

const FUNCTIONAL_SUCCESS: u16 = 0x3469;

/// Outcome of running an image until it traps.
struct Trap {
    pc: u16,
    instructions: u64,
    cycles: u64,
}

/// Run from `entry` until PC stops changing, or give up after `limit`
/// instructions.
fn run_until_trap(bus: &mut SimpleBus, cpu: &mut Mos6502, entry: u16, limit: u64) -> Option<Trap> {
    cpu.load_registers(Registers {
        pc: entry,
        s: 0xFF,
        ..Registers::default()
    });

    let mut cycles = 0u64;
    let mut instructions = 0u64;
    let mut prev_pc = 0xFFFF_u16;
    let mut same_pc_count = 0;

    while instructions < limit {
        let start_pc = cpu.pc();
        if start_pc == prev_pc {
            same_pc_count += 1;
            if same_pc_count > 2 {
                return Some(Trap {
                    pc: start_pc,
                    instructions,
                    cycles,
                });
            }
        } else {
            same_pc_count = 0;
            prev_pc = start_pc;
        }

        cycles += u64::from(cpu.step_instruction(bus));
        instructions += 1;

        if cpu.is_jammed() {
            eprintln!("\nJammed at ${:04X}", cpu.pc());
            return None;
        }
        if instructions % 100_000 == 0 {
            eprint!("\r[{instructions} instructions, PC=${:04X}]", cpu.pc());
        }
    }

    eprintln!("\nExceeded {limit} instructions");
    None
}

#[test]
#[ignore = "requires tests/data/6502_functional_test.bin"]
fn dormann_functional() {
    let binary = std::fs::read("tests/data/6502_functional_test.bin")
        .expect("tests/data/6502_functional_test.bin not found");
    let mut bus = SimpleBus::new();
    bus.load(0x0000, &binary);
    let mut cpu = Mos6502::default();

    let trap = run_until_trap(&mut bus, &mut cpu, 0x0400, 100_000_000)
        .expect("functional test never trapped");
    eprintln!(
        "\nTrapped at ${:04X} after {} instructions ({} cycles)",
        trap.pc, trap.instructions, trap.cycles
    );
    assert_eq!(trap.pc, FUNCTIONAL_SUCCESS, "functional test failed");
}

#[test]
#[ignore = "requires tests/data/6502_decimal_test.bin"]
fn dormann_decimal() {
    let binary =
        std::fs::read("tests/data/6502_decimal_test.bin").expect("tests/data/6502_decimal_test.bin not found");
    let mut bus = SimpleBus::new();
    bus.load(0x0000, &binary);
    let mut cpu = Mos6502::default();

    let trap = run_until_trap(&mut bus, &mut cpu, 0x0200, 50_000_000)
        .expect("decimal test never trapped");

    // $00=N1 $01=N2 $04=DA $05=DNVZC $06=AR $0A=CF $0B=ERROR
    let error = bus.peek(0x000B);
    if error != 0 {
        eprintln!(
            "N1=${:02X} N2=${:02X} carry_in={}",
            bus.peek(0x00),
            bus.peek(0x01),
            cpu.y()
        );
        eprintln!(
            "actual A=${:02X} P=${:02X}, predicted A=${:02X} C=${:02X}",
            bus.peek(0x04),
            bus.peek(0x05),
            bus.peek(0x06),
            bus.peek(0x0A)
        );
    }
    assert_eq!(error, 0, "decimal test failed at ${:04X}", trap.pc);
}
