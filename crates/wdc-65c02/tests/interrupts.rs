//! IRQ, NMI and the WAI wake-up.

use emu_core::{Bus, SimpleBus};
use mos_6502::flags::{D, I, U};
use mos_6502::{IRQ_VECTOR, NMI_VECTOR};
use wdc_65c02::{Status, StopState, Wdc65c02};

fn setup(program: &[u8], p: u8) -> (Wdc65c02, SimpleBus) {
    let mut bus = SimpleBus::new();
    bus.load(0x0200, program);
    bus.set_word(IRQ_VECTOR, 0x0400);
    bus.set_word(NMI_VECTOR, 0x0500);
    bus.load(0x0400, &[0x58, 0xEA, 0xEA]); // CLI; NOP; NOP
    bus.load(0x0500, &[0xEA, 0xEA]);
    let mut cpu = Wdc65c02::new();
    let mut regs = cpu.registers();
    regs.pc = 0x0200;
    regs.p = Status::from_byte(p);
    cpu.set_registers(regs);
    (cpu, bus)
}

#[test]
fn irq_is_taken_after_the_instruction_and_clears_decimal() {
    let (mut cpu, mut bus) = setup(&[0xEA, 0xEA], D);
    cpu.set_irq_line(true);
    cpu.step(&mut bus);

    let regs = cpu.registers();
    assert_eq!(regs.pc, 0x0400);
    assert!(regs.p.is_set(I));
    assert!(!regs.p.is_set(D));
    assert_eq!(bus.peek(0x01FD), 0x02);
    assert_eq!(bus.peek(0x01FC), 0x01);
    assert_eq!(bus.peek(0x01FB), D | U, "IRQ pushes P without B");
    assert_eq!(cpu.cycles(), 2 + 7);
}

#[test]
fn irq_is_masked_by_i() {
    let (mut cpu, mut bus) = setup(&[0xEA, 0xEA], I);
    cpu.set_irq_line(true);
    cpu.step(&mut bus);
    assert_eq!(cpu.pc(), 0x0201);
}

#[test]
fn irq_is_level_triggered_until_the_owner_clears_it() {
    let (mut cpu, mut bus) = setup(&[0xEA], 0);
    cpu.set_irq_line(true);

    cpu.step(&mut bus);
    assert_eq!(cpu.pc(), 0x0400);
    assert_eq!(cpu.registers().s, 0xFA);

    // CLI with the line still up re-enters the handler.
    cpu.step(&mut bus);
    assert_eq!(cpu.pc(), 0x0400);
    assert_eq!(cpu.registers().s, 0xF7);

    cpu.set_irq_line(false);
    cpu.step(&mut bus);
    assert_eq!(cpu.pc(), 0x0401);
}

#[test]
fn bus_owned_irq_sources_are_honoured() {
    let (mut cpu, mut bus) = setup(&[0xEA, 0xEA], 0);
    bus.assert_irq_from(0, 0x04);
    cpu.step(&mut bus);
    assert_eq!(cpu.pc(), 0x0400);
    assert_eq!(cpu.registers().lines.irq, 0x04);
}

#[test]
fn nmi_is_edge_triggered() {
    let (mut cpu, mut bus) = setup(&[0xEA, 0xEA], I);
    cpu.set_nmi_line(true);
    cpu.step(&mut bus);
    assert_eq!(cpu.pc(), 0x0500);
    assert!(!cpu.nmi_pending());

    // Held high: no second NMI.
    cpu.step(&mut bus);
    assert_eq!(cpu.pc(), 0x0501);
}

#[test]
fn nmi_wins_over_irq() {
    let (mut cpu, mut bus) = setup(&[0xEA, 0xEA], 0);
    cpu.set_irq_line(true);
    cpu.set_nmi_line(true);
    cpu.step(&mut bus);
    assert_eq!(cpu.pc(), 0x0500);
}

#[test]
fn wai_idles_until_irq() {
    let (mut cpu, mut bus) = setup(&[0xCB, 0xEA], 0); // WAI
    cpu.step(&mut bus);
    assert_eq!(cpu.stop_state(), StopState::WaitingForIrq);
    assert_eq!(cpu.pc(), 0x0201);
    assert!(!cpu.is_halted());

    cpu.step(&mut bus);
    assert_eq!(cpu.stop_state(), StopState::WaitingForIrq);
    assert_eq!(cpu.cycles(), 3);

    cpu.set_irq_line(true);
    cpu.step(&mut bus);
    assert_eq!(cpu.stop_state(), StopState::Running);
    assert_eq!(cpu.pc(), 0x0400);
    assert_eq!(bus.peek(0x01FC), 0x01, "returns to the instruction after WAI");
}

#[test]
fn wai_stays_waiting_while_irq_is_masked() {
    let (mut cpu, mut bus) = setup(&[0xCB, 0xEA], I);
    cpu.step(&mut bus);
    cpu.set_irq_line(true);
    for _ in 0..4 {
        cpu.step(&mut bus);
    }
    assert_eq!(cpu.stop_state(), StopState::WaitingForIrq);
    assert_eq!(cpu.pc(), 0x0201);
}

#[test]
fn wai_wakes_on_nmi() {
    let (mut cpu, mut bus) = setup(&[0xCB, 0xEA], I);
    cpu.step(&mut bus);
    cpu.set_nmi_line(true);
    cpu.step(&mut bus);
    assert_eq!(cpu.stop_state(), StopState::Running);
    assert_eq!(cpu.pc(), 0x0500);
}

#[test]
fn stopped_core_ignores_interrupts() {
    let (mut cpu, mut bus) = setup(&[0xDB], 0); // STP
    cpu.step(&mut bus);
    cpu.set_irq_line(true);
    cpu.set_nmi_line(true);
    cpu.step(&mut bus);
    assert!(cpu.is_halted());
    assert_eq!(cpu.pc(), 0x0201);
}
