//! IRQ, NMI and BRK sequencing, including the polling quirks.

use emu_core::{Bus, Cpu, SimpleBus};
use mos_6502::{Config, Mos6502, Registers, Status, flags};

const IRQ_HANDLER: u16 = 0x0300;
const NMI_HANDLER: u16 = 0x0400;
const NOP: u8 = 0xEA;

/// Bus with vectors installed and NOP-filled handlers, program at $0200.
fn bus_with(program: &[u8]) -> SimpleBus {
    let mut bus = SimpleBus::new();
    bus.load(0xFFFA, &[0x00, 0x04]);
    bus.load(0xFFFE, &[0x00, 0x03]);
    bus.load(IRQ_HANDLER, &[NOP; 16]);
    bus.load(NMI_HANDLER, &[NOP; 16]);
    bus.load(0x0200, program);
    bus
}

fn cpu_with(config: Config, p: u8) -> Mos6502 {
    let mut cpu = Mos6502::new(config);
    cpu.load_registers(Registers {
        pc: 0x0200,
        s: 0xFD,
        p: Status::from_byte(p),
        ..Registers::default()
    });
    cpu
}

fn ticks(cpu: &mut Mos6502, bus: &mut SimpleBus, n: usize) {
    for _ in 0..n {
        cpu.tick(bus);
    }
}

#[test]
fn irq_is_taken_at_next_boundary() {
    let mut bus = bus_with(&[NOP, NOP]);
    let mut cpu = cpu_with(Config::default(), 0);
    cpu.assert_irq();

    assert_eq!(cpu.step_instruction(&mut bus), 2);
    assert_eq!(cpu.step_instruction(&mut bus), 7, "IRQ sequence is 7 cycles");
    assert_eq!(cpu.pc(), IRQ_HANDLER);
    assert!(cpu.is_interrupt_disabled());

    // Return address is the instruction that was pre-empted
    assert_eq!(bus.peek(0x01FD), 0x02);
    assert_eq!(bus.peek(0x01FC), 0x01);
    assert_eq!(bus.peek(0x01FB), flags::U, "IRQ pushes B clear");
}

#[test]
fn irq_is_ignored_while_interrupts_disabled() {
    let mut bus = bus_with(&[NOP, NOP, NOP]);
    let mut cpu = cpu_with(Config::default(), flags::I);
    cpu.assert_irq();

    for _ in 0..3 {
        assert_eq!(cpu.step_instruction(&mut bus), 2);
    }
    assert_eq!(cpu.pc(), 0x0203);
}

#[test]
fn irq_disabled_in_config_is_inert() {
    let mut bus = bus_with(&[NOP, NOP, NOP]);
    let mut cpu = cpu_with(Config::default().with_irq(false), 0);
    cpu.assert_irq();

    for _ in 0..3 {
        cpu.step_instruction(&mut bus);
    }
    assert_eq!(cpu.pc(), 0x0203);
}

#[test]
fn irq_is_level_sensitive() {
    let mut bus = bus_with(&[NOP, NOP]);
    bus.write(IRQ_HANDLER, 0x40); // RTI
    let mut cpu = cpu_with(Config::default(), 0);
    cpu.assert_irq();

    cpu.step_instruction(&mut bus);
    cpu.step_instruction(&mut bus);
    assert_eq!(cpu.pc(), IRQ_HANDLER);

    // RTI restores I clear; the line is still low so the IRQ fires again
    assert_eq!(cpu.step_instruction(&mut bus), 6);
    assert_eq!(cpu.pc(), 0x0201);
    assert_eq!(cpu.step_instruction(&mut bus), 7);
    assert_eq!(cpu.pc(), IRQ_HANDLER);

    cpu.release_irq();
    cpu.step_instruction(&mut bus);
    assert_eq!(cpu.step_instruction(&mut bus), 2, "main program resumes");
    assert_eq!(cpu.pc(), 0x0202);
}

#[test]
fn cli_delays_irq_by_one_instruction() {
    let program = [
        0x58, // CLI  @ $0200
        NOP,  //      @ $0201
        NOP,  //      @ $0202
    ];
    let mut bus = bus_with(&program);
    let mut cpu = cpu_with(Config::default(), flags::I);
    cpu.assert_irq();

    assert_eq!(cpu.step_instruction(&mut bus), 2);
    assert!(!cpu.is_interrupt_disabled(), "I clears immediately");

    // The instruction after CLI still runs
    assert_eq!(cpu.step_instruction(&mut bus), 2);
    assert_eq!(cpu.pc(), 0x0202);

    assert_eq!(cpu.step_instruction(&mut bus), 7);
    assert_eq!(cpu.pc(), IRQ_HANDLER);
    assert_eq!(bus.peek(0x01FC), 0x02, "returns to the second NOP");
}

#[test]
fn taken_branch_delays_nmi_by_one_instruction() {
    let program = [
        0xF0, 0x00, // BEQ +0 (taken, same page)  @ $0200
        NOP,        //                            @ $0202
        NOP,        //                            @ $0203
    ];
    let mut bus = bus_with(&program);
    let mut cpu = cpu_with(Config::default(), flags::Z);

    cpu.tick(&mut bus);
    cpu.assert_nmi();
    ticks(&mut cpu, &mut bus, 2);
    assert!(cpu.is_at_instruction_boundary());
    assert_eq!(cpu.pc(), 0x0202);

    assert_eq!(cpu.step_instruction(&mut bus), 2, "NOP after branch runs");
    assert_eq!(cpu.pc(), 0x0203);
    assert_eq!(cpu.step_instruction(&mut bus), 7);
    assert_eq!(cpu.pc(), NMI_HANDLER);
}

#[test]
fn branch_not_taken_does_not_delay_nmi() {
    let program = [
        0xD0, 0x00, // BNE +0 (not taken)
        NOP,
    ];
    let mut bus = bus_with(&program);
    let mut cpu = cpu_with(Config::default(), flags::Z);

    cpu.tick(&mut bus);
    cpu.assert_nmi();
    cpu.tick(&mut bus);

    assert_eq!(cpu.step_instruction(&mut bus), 7);
    assert_eq!(cpu.pc(), NMI_HANDLER);
}

#[test]
fn branch_across_page_does_not_delay_irq() {
    let mut bus = bus_with(&[]);
    bus.load(0x02FD, &[0xF0, 0x01]); // BEQ to $0300
    let mut cpu = Mos6502::default();
    cpu.load_registers(Registers {
        pc: 0x02FD,
        s: 0xFD,
        p: Status::from_byte(flags::Z),
        ..Registers::default()
    });

    cpu.tick(&mut bus);
    cpu.assert_irq();
    ticks(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.pc(), 0x0300);

    assert_eq!(cpu.step_instruction(&mut bus), 7);
    assert_eq!(cpu.pc(), IRQ_HANDLER);
    assert_eq!(bus.peek(0x01FC), 0x00, "pre-empted the instruction at $0300");
}

#[test]
fn nmi_hijacks_irq_before_status_push() {
    let mut bus = bus_with(&[NOP, NOP]);
    let mut cpu = cpu_with(Config::default(), 0);
    cpu.assert_irq();
    cpu.step_instruction(&mut bus);

    // Fetch (IRQ recognised), T1, T2
    ticks(&mut cpu, &mut bus, 3);
    cpu.assert_nmi();
    // T3 to T6
    ticks(&mut cpu, &mut bus, 4);

    assert!(cpu.is_at_instruction_boundary());
    assert_eq!(cpu.pc(), NMI_HANDLER);
    assert_eq!(bus.peek(0x01FB), flags::U, "status still pushed IRQ-style");

    // The latch was consumed: no second NMI, and I blocks the IRQ
    assert_eq!(cpu.step_instruction(&mut bus), 2);
    assert_eq!(cpu.pc(), NMI_HANDLER + 1);
}

#[test]
fn nmi_after_status_push_waits_for_handler_instruction() {
    let mut bus = bus_with(&[NOP, NOP]);
    let mut cpu = cpu_with(Config::default(), 0);
    cpu.assert_irq();
    cpu.step_instruction(&mut bus);

    // Fetch, T1 to T4
    ticks(&mut cpu, &mut bus, 5);
    cpu.assert_nmi();
    ticks(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.pc(), IRQ_HANDLER);

    // First handler instruction always runs before the NMI is recognised
    assert_eq!(cpu.step_instruction(&mut bus), 2);
    assert_eq!(cpu.pc(), IRQ_HANDLER + 1);
    assert_eq!(cpu.step_instruction(&mut bus), 7);
    assert_eq!(cpu.pc(), NMI_HANDLER);
}

#[test]
fn nmi_hijacks_brk() {
    let mut bus = bus_with(&[0x00, NOP]);
    let mut cpu = cpu_with(Config::default(), 0);

    // Fetch, T1
    ticks(&mut cpu, &mut bus, 2);
    cpu.assert_nmi();
    ticks(&mut cpu, &mut bus, 5);

    assert_eq!(cpu.pc(), NMI_HANDLER);
    assert_eq!(bus.peek(0x01FC), 0x02, "BRK still skips its padding byte");
    assert_eq!(
        bus.peek(0x01FB),
        flags::U | flags::B,
        "BRK's pushed status keeps B"
    );
    assert_eq!(cpu.step_instruction(&mut bus), 2);
}

#[test]
fn nmi_fires_once_per_edge() {
    let mut bus = bus_with(&[NOP, NOP]);
    let mut cpu = cpu_with(Config::default(), 0);
    cpu.assert_nmi();

    assert_eq!(cpu.step_instruction(&mut bus), 7);
    assert_eq!(cpu.pc(), NMI_HANDLER);

    // Line still held: handler runs undisturbed
    for n in 1..=4 {
        assert_eq!(cpu.step_instruction(&mut bus), 2);
        assert_eq!(cpu.pc(), NMI_HANDLER + n);
    }

    cpu.release_nmi();
    cpu.assert_nmi();
    assert_eq!(cpu.step_instruction(&mut bus), 7);
    assert_eq!(cpu.pc(), NMI_HANDLER);
}

#[test]
fn nmi_ignores_interrupt_disable() {
    let mut bus = bus_with(&[NOP]);
    let mut cpu = cpu_with(Config::default(), flags::I);
    cpu.assert_nmi();

    assert_eq!(cpu.step_instruction(&mut bus), 7);
    assert_eq!(cpu.pc(), NMI_HANDLER);
}

#[test]
fn nmi_rti_resumes_interrupted_instruction() {
    let mut bus = bus_with(&[0xE8, 0xE8]); // INX; INX
    bus.write(NMI_HANDLER, 0x40); // RTI
    let mut cpu = cpu_with(Config::default(), 0);

    cpu.step_instruction(&mut bus);
    cpu.assert_nmi();
    cpu.step_instruction(&mut bus);
    cpu.step_instruction(&mut bus);
    assert_eq!(cpu.pc(), 0x0201);

    cpu.step_instruction(&mut bus);
    assert_eq!(cpu.x(), 2);
    assert_eq!(cpu.sp(), 0xFD);
}
