//! 2A03 DMA unit: sprite (OAM) and sample (DMC) transfers.
//!
//! The DMA unit halts the CPU on its next read cycle. While halted, the CPU
//! keeps driving the address it was about to read, which is why halt and
//! alignment cycles repeat that read (as dummy reads) on NTSC parts.
//! Transfers then alternate "get" (read) and "put" (write) cycles by
//! cycle-counter parity.

use emu_core::{AccessKind, Bus, RecordingBus, SimpleBus};

use crate::Mos6502;

/// Sprite transfers always land on the PPU's OAM data port.
const OAM_DATA: u16 = 0x2004;

/// A transfer request raised by the bus (a write to $4014, the APU sample
/// channel running dry) or by the machine directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DmaRequest {
    /// Copy 256 bytes from `page * $100` to OAM.
    Sprite { page: u8 },
    /// Fetch one sample byte from [`DmaBus::sample_address`].
    SampleStart,
    /// Cancel a sample fetch that has not happened yet.
    SampleAbort,
}

/// Bus extension for machines with the 2A03 DMA unit.
///
/// Every method has a default that describes a machine without one, so a
/// plain memory bus only needs an empty impl.
pub trait DmaBus: Bus {
    /// Called at the end of every CPU cycle. Return a request to start it.
    fn take_dma_request(&mut self) -> Option<DmaRequest> {
        None
    }

    /// Address of the next sample byte.
    fn sample_address(&self) -> u16 {
        0
    }

    /// Hand a fetched sample byte to the audio unit.
    fn deliver_sample(&mut self, value: u8) {
        let _ = value;
    }

    /// Last value seen on the data bus.
    fn open_bus(&self) -> u8 {
        0
    }

    /// Bits of controller port `port` (0 = $4016, 1 = $4017) that are not
    /// driven by the controller and read back as open bus.
    fn input_open_bus_mask(&self, port: u8) -> u8 {
        let _ = port;
        0xE0
    }
}

impl DmaBus for SimpleBus {}

/// A trace forwards the side-effect-free queries so a transfer that is
/// already pending runs the same way it will on the real bus. New requests
/// and sample delivery stay with the real bus.
impl<B: DmaBus + ?Sized> DmaBus for RecordingBus<'_, B> {
    fn sample_address(&self) -> u16 {
        self.inner().sample_address()
    }

    fn open_bus(&self) -> u8 {
        self.inner().open_bus()
    }

    fn input_open_bus_mask(&self, port: u8) -> u8 {
        self.inner().input_open_bus_mask(port)
    }
}

/// Transfer flags carried between cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct DmaState {
    need_halt: bool,
    need_dummy_read: bool,
    sprite: bool,
    sprite_page: u8,
    sample_running: bool,
    sample_abort: bool,
}

impl DmaState {
    pub(crate) fn post(&mut self, request: DmaRequest) {
        match request {
            DmaRequest::Sprite { page } => {
                self.sprite = true;
                self.sprite_page = page;
                self.need_halt = true;
            }
            DmaRequest::SampleStart => {
                self.sample_running = true;
                self.need_dummy_read = true;
                self.need_halt = true;
            }
            DmaRequest::SampleAbort => {
                if self.sample_running {
                    if self.need_halt {
                        // Not started yet: drop it outright.
                        self.sample_running = false;
                        self.need_dummy_read = false;
                        self.need_halt = false;
                    } else {
                        self.sample_abort = true;
                    }
                }
            }
        }
    }

    pub(crate) const fn is_pending(&self) -> bool {
        self.need_halt
    }

    const fn sample_ready(&self) -> bool {
        self.sample_running && !self.need_halt && !self.need_dummy_read
    }

    /// Sprite cycles double as the sample transfer's halt and dummy cycles
    /// when both run at once.
    fn advance(&mut self) {
        if self.sample_abort {
            self.sample_running = false;
            self.sample_abort = false;
            self.need_dummy_read = false;
            self.need_halt = false;
        } else if self.need_halt {
            self.need_halt = false;
        } else if self.need_dummy_read {
            self.need_dummy_read = false;
        }
    }
}

/// What the halted CPU was doing when the transfer started.
struct HaltContext {
    /// Address the CPU keeps on the bus while halted.
    address: u16,
    /// Last address the DMA unit read, for the controller-port glitch.
    prev_read: u16,
    /// The halted read targets $4000-$401F, so the CPU's internal
    /// registers also respond to DMA reads.
    internal_regs: bool,
    nes_input: bool,
    ntsc: bool,
}

impl HaltContext {
    const fn on_input_port(&self) -> bool {
        matches!(self.address, 0x4016 | 0x4017)
    }
}

/// One DMA read, with the internal-register bus conflict when the CPU was
/// halted on $4000-$401F.
fn dma_read<B: DmaBus + ?Sized>(bus: &mut B, ctx: &mut HaltContext, address: u16) -> u8 {
    if !ctx.internal_regs {
        let value = if (0x4000..=0x401F).contains(&address) {
            // Nothing drives $4000-$401F on the external bus.
            bus.open_bus()
        } else {
            bus.read(address, AccessKind::DmaRead)
        };
        ctx.prev_read = address;
        return value;
    }

    let internal = 0x4000 | (address & 0x1F);
    let same_address = internal == address;
    let value = match internal {
        0x4015 => {
            let value = bus.read(internal, AccessKind::DmaRead);
            if !same_address {
                bus.read(address, AccessKind::DmaRead);
            }
            value
        }
        0x4016 | 0x4017 => {
            // A second read of the same port in a row does not clock the
            // controller again.
            let value = if !ctx.ntsc || (ctx.nes_input && ctx.prev_read == internal) {
                bus.open_bus()
            } else {
                bus.read(internal, AccessKind::DmaRead)
            };
            if same_address {
                value
            } else {
                let mask = bus.input_open_bus_mask((internal - 0x4016) as u8);
                let external = bus.read(address, AccessKind::DmaRead);
                (external & mask) | (value & external & !mask)
            }
        }
        _ => bus.read(address, AccessKind::DmaRead),
    };
    ctx.prev_read = internal;
    value
}

impl Mos6502 {
    /// Run any pending transfer before the CPU reads `address`.
    pub(crate) fn process_pending_dma<B: DmaBus + ?Sized>(&mut self, bus: &mut B, address: u16) {
        if !self.dma.is_pending() {
            return;
        }

        let mut ctx = HaltContext {
            address,
            prev_read: address,
            internal_regs: address & 0xFFE0 == 0x4000,
            nes_input: !self.famicom_input,
            ntsc: self.variant.dma_repeats_reads(),
        };
        let skip_first_input_clock = ctx.internal_regs
            && self.dma.sample_running
            && ctx.on_input_port()
            && bus.sample_address() & 0x1F == address & 0x1F;
        let skip_dummy_reads = !ctx.ntsc || (ctx.nes_input && ctx.on_input_port());

        self.dma.need_halt = false;
        log::trace!(
            "DMA halt at ${address:04X} (sprite: {}, sample: {})",
            self.dma.sprite,
            self.dma.sample_running
        );

        // Halt cycle.
        self.regs.cycles += 1;
        let abort_on_input = self.dma.sample_abort && ctx.nes_input && ctx.on_input_port();
        if !abort_on_input && !skip_first_input_clock {
            bus.read(address, AccessKind::DummyRead);
        }
        self.end_cycle(bus);

        if self.dma.sample_abort {
            self.dma.sample_running = false;
            self.dma.sample_abort = false;
            if !self.dma.sprite {
                self.dma.need_dummy_read = false;
                return;
            }
        }

        let mut sprite_counter: u16 = 0;
        let mut sprite_offset: u8 = 0;
        let mut value: u8 = 0;

        while self.dma.sample_running || self.dma.sprite {
            let get_cycle = self.regs.cycles & 1 == 0;
            if get_cycle {
                if self.dma.sample_ready() {
                    self.start_dma_cycle();
                    let source = bus.sample_address();
                    value = dma_read(bus, &mut ctx, source);
                    self.end_cycle(bus);
                    self.dma.sample_running = false;
                    self.dma.sample_abort = false;
                    log::trace!("DMA sample ${value:02X} from ${source:04X}");
                    bus.deliver_sample(value);
                } else if self.dma.sprite {
                    self.start_dma_cycle();
                    let source = u16::from_le_bytes([sprite_offset, self.dma.sprite_page]);
                    value = dma_read(bus, &mut ctx, source);
                    self.end_cycle(bus);
                    sprite_offset = sprite_offset.wrapping_add(1);
                    sprite_counter += 1;
                } else {
                    debug_assert!(self.dma.need_halt || self.dma.need_dummy_read);
                    self.alignment_cycle(bus, &ctx, skip_dummy_reads);
                }
            } else if self.dma.sprite && sprite_counter & 1 == 1 {
                self.start_dma_cycle();
                bus.write(OAM_DATA, value, AccessKind::DmaWrite);
                self.end_cycle(bus);
                sprite_counter += 1;
                if sprite_counter == 0x200 {
                    self.dma.sprite = false;
                    log::trace!("DMA sprite transfer done");
                }
            } else {
                self.alignment_cycle(bus, &ctx, skip_dummy_reads);
            }
        }
    }

    fn start_dma_cycle(&mut self) {
        self.dma.advance();
        self.regs.cycles += 1;
    }

    fn alignment_cycle<B: DmaBus + ?Sized>(
        &mut self,
        bus: &mut B,
        ctx: &HaltContext,
        skip_dummy_reads: bool,
    ) {
        self.start_dma_cycle();
        if !skip_dummy_reads {
            bus.read(ctx.address, AccessKind::DummyRead);
        }
        self.end_cycle(bus);
    }
}
