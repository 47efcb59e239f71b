//! Klaus Dormann's 6502 functional and decimal tests.
//!
//! Both binaries are assembled with load address $0000 and finish by
//! branching to themselves. The functional test succeeds if that trap is
//! at $3469; the decimal test leaves its error flag at $000B.

use emu_core::{Bus, SimpleBus};
use mos_6502::{Mos6502, Variant};

/// Run until the CPU sits on the same PC for three instructions. Returns
/// the trap address, or `None` past the instruction limit.
fn run_to_trap(cpu: &mut Mos6502, bus: &mut SimpleBus, limit: u64) -> Option<u16> {
    let mut prev_pc = 0xFFFF;
    let mut same_pc_count = 0;

    for instructions in 0..limit {
        let pc = cpu.pc();
        if pc == prev_pc {
            same_pc_count += 1;
            if same_pc_count > 2 {
                eprintln!(
                    "\nTrapped at ${pc:04X} after {instructions} instructions ({} cycles)",
                    cpu.cycles()
                );
                return Some(pc);
            }
        } else {
            same_pc_count = 0;
            prev_pc = pc;
        }

        cpu.step(bus);
        // The history would otherwise grow for the whole run.
        bus.clear_history();

        if instructions % 100_000 == 0 {
            eprint!("\r[{instructions} instructions, PC=${:04X}]", cpu.pc());
        }
    }
    eprintln!("\nexceeded {limit} instructions");
    None
}

fn load(path: &str, entry: u16) -> Option<(Mos6502, SimpleBus)> {
    let Ok(binary) = std::fs::read(path) else {
        eprintln!("{path} not found, skipping");
        return None;
    };
    let mut bus = SimpleBus::new();
    bus.load(0x0000, &binary);

    let mut cpu = Mos6502::new(Variant::Nmos6502);
    let mut regs = cpu.registers();
    regs.pc = entry;
    cpu.set_registers(regs);
    Some((cpu, bus))
}

#[test]
#[ignore]
fn dormann_functional() {
    let Some((mut cpu, mut bus)) = load("tests/data/6502_functional_test.bin", 0x0400) else {
        return;
    };
    let trap = run_to_trap(&mut cpu, &mut bus, 100_000_000);
    assert_eq!(trap, Some(0x3469), "Klaus Dormann 6502 functional test failed");
}

#[test]
#[ignore]
fn dormann_decimal() {
    let Some((mut cpu, mut bus)) = load("tests/data/6502_decimal_test.bin", 0x0200) else {
        return;
    };
    let trap = run_to_trap(&mut cpu, &mut bus, 50_000_000);
    assert!(trap.is_some(), "decimal test never finished");

    // $00=N1, $01=N2, $04=DA, $05=DNVZC, $06=AR, $0A=CF, $0B=ERROR
    let error = bus.peek(0x000B);
    if error != 0 {
        eprintln!(
            "N1=${:02X} N2=${:02X} carry_in={} actual A=${:02X} P=${:02X}, predicted A=${:02X} C=${:02X}",
            bus.peek(0x00),
            bus.peek(0x01),
            cpu.registers().y,
            bus.peek(0x04),
            bus.peek(0x05),
            bus.peek(0x06),
            bus.peek(0x0A),
        );
    }
    assert_eq!(error, 0, "Klaus Dormann decimal test failed");
}
