//! Integration tests using Tom Harte's `SingleStepTests`.
//!
//! Each opcode file holds 10,000 single-instruction cases with the initial
//! and final register/RAM state and every bus cycle in between. Both the
//! final state and the cycle list are checked.
//!
//! Test data lives in `test-data/65x02/6502/v1/XX.json` (NMOS) and
//! `test-data/65x02/nes6502/v1/XX.json` (2A03, no decimal mode).

use std::fs;
use std::path::{Path, PathBuf};

use emu_core::{Bus, SimpleBus};
use mos_6502::flags::{B, U};
use mos_6502::{Mos6502, Op, Status, Variant, decode};
use serde::Deserialize;

/// JSON test case format.
#[derive(Deserialize)]
struct TestCase {
    name: String,
    initial: CpuState,
    #[serde(rename = "final")]
    final_state: CpuState,
    cycles: Vec<(u16, u8, String)>,
}

/// JSON CPU state format.
#[derive(Deserialize)]
struct CpuState {
    pc: u16,
    s: u8,
    a: u8,
    x: u8,
    y: u8,
    p: u8,
    ram: Vec<(u16, u8)>,
}

fn setup(variant: Variant, state: &CpuState) -> (Mos6502, SimpleBus) {
    let mut bus = SimpleBus::new();
    for &(addr, value) in &state.ram {
        bus.load(addr, &[value]);
    }

    let mut cpu = Mos6502::new(variant);
    let mut regs = cpu.registers();
    regs.pc = state.pc;
    regs.s = state.s;
    regs.a = state.a;
    regs.x = state.x;
    regs.y = state.y;
    regs.p = Status::from_byte(state.p);
    cpu.set_registers(regs);
    (cpu, bus)
}

/// Compare the CPU/bus state and cycle list against expected, returning a
/// list of mismatches.
fn compare(cpu: &Mos6502, bus: &SimpleBus, test: &TestCase) -> Vec<String> {
    let mut errors = Vec::new();
    let regs = cpu.registers();
    let expected = &test.final_state;

    for (name, got, want) in [
        ("S", regs.s, expected.s),
        ("A", regs.a, expected.a),
        ("X", regs.x, expected.x),
        ("Y", regs.y, expected.y),
    ] {
        if got != want {
            errors.push(format!("{name}: got ${got:02X}, want ${want:02X}"));
        }
    }
    if regs.pc != expected.pc {
        errors.push(format!("PC: got ${:04X}, want ${:04X}", regs.pc, expected.pc));
    }

    // B only exists on the stack; U always reads back set.
    let expected_p = (expected.p & !B) | U;
    if regs.p.0 != expected_p {
        errors.push(format!(
            "P: got ${:02X} ({:08b}), want ${expected_p:02X} ({expected_p:08b})",
            regs.p.0, regs.p.0
        ));
    }

    for &(addr, want) in &expected.ram {
        let got = bus.peek(addr);
        if got != want {
            errors.push(format!("RAM[${addr:04X}]: got ${got:02X}, want ${want:02X}"));
        }
    }

    let history = bus.history();
    if history.len() != test.cycles.len() {
        errors.push(format!(
            "cycles: got {}, want {}",
            history.len(),
            test.cycles.len()
        ));
    }
    for (n, (op, (addr, value, kind))) in history.iter().zip(&test.cycles).enumerate() {
        let want_write = kind == "write";
        if op.address != *addr || op.value != *value || op.kind.is_write() != want_write {
            errors.push(format!(
                "cycle {n}: got ${:04X} ${:02X} {:?}, want ${addr:04X} ${value:02X} {kind}",
                op.address, op.value, op.kind
            ));
            break;
        }
    }

    errors
}

fn test_dir(suite: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .join("test-data/65x02")
        .join(suite)
        .join("v1")
}

fn run_suite(suite: &str, variant: Variant) {
    let dir = test_dir(suite);
    if !dir.exists() {
        eprintln!("Test data not found at {}", dir.display());
        eprintln!("Skipping SingleStepTests.");
        return;
    }

    let mut total_pass = 0u64;
    let mut total_fail = 0u64;

    for opcode in 0..=0xFF_u8 {
        if decode(opcode).op == Op::Jam {
            continue;
        }
        let filename = format!("{opcode:02x}.json");
        let path = dir.join(&filename);
        if !path.exists() {
            continue;
        }

        let data = fs::read_to_string(&path).unwrap_or_else(|e| {
            panic!("Failed to read {}: {e}", path.display());
        });
        let tests: Vec<TestCase> = serde_json::from_str(&data).unwrap_or_else(|e| {
            panic!("Failed to parse {}: {e}", path.display());
        });

        let mut file_pass = 0u32;
        let mut file_fail = 0u32;
        let mut first_failures: Vec<String> = Vec::new();

        for test in &tests {
            let (mut cpu, mut bus) = setup(variant, &test.initial);
            cpu.step(&mut bus);

            let errors = compare(&cpu, &bus, test);
            if errors.is_empty() {
                file_pass += 1;
            } else {
                file_fail += 1;
                if first_failures.len() < 5 {
                    first_failures.push(format!("  FAIL [{}]: {}", test.name, errors.join(", ")));
                }
            }
        }

        let status = if file_fail == 0 { "PASS" } else { "FAIL" };
        println!(
            "{variant} ${opcode:02X} ({filename}): {status} {file_pass}/{}",
            file_pass + file_fail
        );
        for msg in &first_failures {
            println!("{msg}");
        }

        total_pass += u64::from(file_pass);
        total_fail += u64::from(file_fail);
    }

    println!("{variant}: {total_pass} passed, {total_fail} failed");
    assert_eq!(total_fail, 0, "{total_fail} tests failed");
}

#[test]
#[ignore = "requires test-data/65x02, run with --ignored"]
fn nmos_6502() {
    run_suite("6502", Variant::Nmos6502);
}

#[test]
#[ignore = "requires test-data/65x02, run with --ignored"]
fn ricoh_2a03() {
    run_suite("nes6502", Variant::Ricoh2A03);
}
