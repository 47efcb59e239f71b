//! Bus cycle sequences: dummy reads, dummy writes and page crossings.

use emu_core::{AccessKind, BusOperation, SimpleBus};
use mos_6502::{Mos6502, Variant};

use AccessKind::{DummyRead, ExecOpcode, ExecOperand, Read, Write};

fn setup_at(pc: u16, program: &[u8]) -> (Mos6502, SimpleBus) {
    let mut bus = SimpleBus::new();
    bus.load(pc, program);
    let mut cpu = Mos6502::new(Variant::Ricoh2A03);
    let mut regs = cpu.registers();
    regs.pc = pc;
    cpu.set_registers(regs);
    (cpu, bus)
}

fn with_index(cpu: &mut Mos6502, x: u8, y: u8) {
    let mut regs = cpu.registers();
    regs.x = x;
    regs.y = y;
    cpu.set_registers(regs);
}

fn op(address: u16, value: u8, kind: AccessKind) -> BusOperation {
    BusOperation::new(address, value, kind)
}

#[test]
fn implied_reads_the_next_byte() {
    let (mut cpu, mut bus) = setup_at(0x0200, &[0xE8, 0x55]); // INX
    cpu.step(&mut bus);
    assert_eq!(
        bus.history(),
        &[op(0x0200, 0xE8, ExecOpcode), op(0x0201, 0x55, DummyRead)]
    );
}

#[test]
fn absolute_x_read_without_page_cross_skips_the_dummy() {
    let (mut cpu, mut bus) = setup_at(0x0200, &[0xBD, 0x00, 0x12]); // LDA $1200,X
    with_index(&mut cpu, 0x01, 0);
    cpu.step(&mut bus);
    assert_eq!(bus.history().len(), 4);
    assert_eq!(cpu.cycles(), 4);
}

#[test]
fn absolute_x_read_with_page_cross_reads_the_uncarried_address() {
    let (mut cpu, mut bus) = setup_at(0x0200, &[0xBD, 0xF0, 0x12]); // LDA $12F0,X
    bus.load(0x1310, &[0x99]);
    with_index(&mut cpu, 0x20, 0);
    cpu.step(&mut bus);
    assert_eq!(
        bus.history(),
        &[
            op(0x0200, 0xBD, ExecOpcode),
            op(0x0201, 0xF0, ExecOperand),
            op(0x0202, 0x12, ExecOperand),
            op(0x1210, 0x00, DummyRead),
            op(0x1310, 0x99, Read),
        ]
    );
    assert_eq!(cpu.registers().a, 0x99);
}

#[test]
fn absolute_x_store_always_takes_the_dummy_read() {
    let (mut cpu, mut bus) = setup_at(0x0200, &[0x9D, 0x00, 0x12]); // STA $1200,X
    with_index(&mut cpu, 0x01, 0);
    cpu.step(&mut bus);
    assert_eq!(
        &bus.history()[3..],
        &[op(0x1201, 0x00, DummyRead), op(0x1201, 0x00, Write)]
    );
    assert_eq!(cpu.cycles(), 5);
}

#[test]
fn absolute_x_rmw_takes_seven_cycles() {
    let (mut cpu, mut bus) = setup_at(0x0200, &[0xFE, 0x00, 0x12]); // INC $1200,X
    with_index(&mut cpu, 0x01, 0);
    cpu.step(&mut bus);
    assert_eq!(cpu.cycles(), 7);
}

#[test]
fn zero_page_x_reads_the_base_then_wraps() {
    let (mut cpu, mut bus) = setup_at(0x0200, &[0xB5, 0xF0]); // LDA $F0,X
    bus.load(0x0010, &[0x42]);
    with_index(&mut cpu, 0x20, 0);
    cpu.step(&mut bus);
    assert_eq!(
        &bus.history()[2..],
        &[op(0x00F0, 0x00, DummyRead), op(0x0010, 0x42, Read)]
    );
}

#[test]
fn indexed_indirect_pointer_wraps_in_page_zero() {
    let (mut cpu, mut bus) = setup_at(0x0200, &[0xA1, 0xFF]); // LDA ($FF,X)
    bus.load(0x00FF, &[0x34]);
    bus.load(0x0000, &[0x12]);
    bus.load(0x1234, &[0x99]);
    cpu.step(&mut bus);
    assert_eq!(
        bus.history(),
        &[
            op(0x0200, 0xA1, ExecOpcode),
            op(0x0201, 0xFF, ExecOperand),
            op(0x00FF, 0x34, DummyRead),
            op(0x00FF, 0x34, Read),
            op(0x0000, 0x12, Read),
            op(0x1234, 0x99, Read),
        ]
    );
    assert_eq!(cpu.registers().a, 0x99);
}

#[test]
fn indexed_indirect_index_wraps_the_pointer() {
    let (mut cpu, mut bus) = setup_at(0x0200, &[0xA1, 0xF0]); // LDA ($F0,X)
    bus.load(0x0010, &[0x00, 0x30]);
    bus.load(0x3000, &[0x77]);
    with_index(&mut cpu, 0x20, 0);
    cpu.step(&mut bus);
    assert_eq!(cpu.registers().a, 0x77);
    assert_eq!(cpu.cycles(), 6);
}

#[test]
fn indirect_indexed_pointer_at_ff_and_page_cross() {
    let (mut cpu, mut bus) = setup_at(0x0200, &[0xB1, 0xFF]); // LDA ($FF),Y
    bus.load(0x00FF, &[0xF8]);
    bus.load(0x0000, &[0x12]);
    bus.load(0x1308, &[0x5A]);
    with_index(&mut cpu, 0, 0x10);
    cpu.step(&mut bus);
    assert_eq!(
        &bus.history()[2..],
        &[
            op(0x00FF, 0xF8, Read),
            op(0x0000, 0x12, Read),
            op(0x1208, 0x00, DummyRead),
            op(0x1308, 0x5A, Read),
        ]
    );
}

#[test]
fn branch_cycle_counts() {
    // Not taken: 2 cycles. P starts with Z clear, so BEQ falls through.
    let (mut cpu, mut bus) = setup_at(0x0200, &[0xF0, 0x10]); // BEQ +$10
    cpu.step(&mut bus);
    assert_eq!((cpu.pc(), cpu.cycles()), (0x0202, 2));

    // Taken, same page: 3 cycles.
    let (mut cpu, mut bus) = setup_at(0x0200, &[0xD0, 0x10]); // BNE +$10
    cpu.step(&mut bus);
    assert_eq!((cpu.pc(), cpu.cycles()), (0x0212, 3));
    assert_eq!(bus.history()[2], op(0x0202, 0x00, DummyRead));

    // Taken, page crossing: 4 cycles, the extra read before the carry.
    let (mut cpu, mut bus) = setup_at(0x02F0, &[0xD0, 0x20]); // BNE +$20
    cpu.step(&mut bus);
    assert_eq!((cpu.pc(), cpu.cycles()), (0x0312, 4));
    assert_eq!(
        &bus.history()[2..],
        &[op(0x02F2, 0x00, DummyRead), op(0x0212, 0x00, DummyRead)]
    );

    // Backwards across a page.
    let (mut cpu, mut bus) = setup_at(0x0300, &[0xD0, 0xFC]); // BNE -4
    cpu.step(&mut bus);
    assert_eq!((cpu.pc(), cpu.cycles()), (0x02FE, 4));
}

#[test]
fn stack_wraps_inside_page_one() {
    let (mut cpu, mut bus) = setup_at(
        0x0200,
        &[
            0x48, // PHA
            0x68, // PLA
        ],
    );
    let mut regs = cpu.registers();
    regs.s = 0x00;
    regs.a = 0x5A;
    cpu.set_registers(regs);

    cpu.step(&mut bus);
    assert_eq!(bus.history()[2], op(0x0100, 0x5A, Write));
    assert_eq!(cpu.registers().s, 0xFF);

    bus.clear_history();
    cpu.step(&mut bus);
    assert_eq!(
        &bus.history()[1..],
        &[
            op(0x0202, 0x00, DummyRead),
            op(0x01FF, 0x00, DummyRead),
            op(0x0100, 0x5A, Read),
        ]
    );
    assert_eq!(cpu.registers().s, 0x00);
}

#[test]
fn jsr_cycle_order() {
    let (mut cpu, mut bus) = setup_at(0x0200, &[0x20, 0x34, 0x12]); // JSR $1234
    cpu.step(&mut bus);
    assert_eq!(
        bus.history(),
        &[
            op(0x0200, 0x20, ExecOpcode),
            op(0x0201, 0x34, ExecOperand),
            op(0x01FD, 0x00, DummyRead),
            op(0x01FD, 0x02, Write),
            op(0x01FC, 0x02, Write),
            op(0x0202, 0x12, ExecOperand),
        ]
    );
}

#[test]
fn rts_reads_the_popped_address_before_incrementing() {
    let (mut cpu, mut bus) = setup_at(0x0200, &[0x60]); // RTS
    bus.load(0x01FE, &[0xFF, 0x12]);
    cpu.step(&mut bus);
    assert_eq!(bus.history()[5], op(0x12FF, 0x00, DummyRead));
    assert_eq!(cpu.pc(), 0x1300);
}
