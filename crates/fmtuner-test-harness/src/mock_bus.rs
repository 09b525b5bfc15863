//! Mock register bus for deterministic testing of tuner drivers.
//!
//! [`MockRegisterBus`] implements the [`RegisterBus`] trait over a 256-byte
//! in-memory register file. The paired [`MockChip`] handle stays with the
//! test, which uses it to pre-load register values (chip identity, scan
//! results, RDS group data), script when a hardware-cleared status bit goes
//! low, replay the write log, and inject bus faults.
//!
//! # Example
//!
//! ```
//! use fmtuner_test_harness::MockRegisterBus;
//!
//! let (bus, chip) = MockRegisterBus::new();
//! // Pre-load the chip identity register before handing `bus` to a driver.
//! chip.load(0x06, 0x84);
//! ```

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

use fmtuner_core::error::{Error, Result};
use fmtuner_core::RegisterBus;

/// Scripted "hardware clears a status bit" behavior.
///
/// Emulates operations the chip finishes on its own: after the masked bits
/// of `register` have been read high `after_reads` times, the mock clears
/// them, as the real chip does when its auto-scan engine stops.
#[derive(Debug, Clone)]
struct AutoClear {
    register: u8,
    mask: u8,
    after_reads: u32,
    seen: u32,
}

#[derive(Debug)]
struct ChipState {
    registers: [u8; 256],
    writes: Vec<(u8, u8)>,
    auto_clear: Option<AutoClear>,
    /// Register values the "hardware" loads at the moment the scripted
    /// auto-clear fires (e.g. the channel the scanner stopped on).
    on_clear_loads: Vec<(u8, u8)>,
    fault: bool,
}

/// Control handle for the register file behind a [`MockRegisterBus`].
///
/// Cloneable; all clones and the bus itself share one register file.
#[derive(Debug, Clone)]
pub struct MockChip {
    state: Arc<Mutex<ChipState>>,
}

impl MockChip {
    fn lock(&self) -> MutexGuard<'_, ChipState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Pre-load a register value, bypassing the bus and the write log.
    pub fn load(&self, register: u8, value: u8) {
        self.lock().registers[register as usize] = value;
    }

    /// Read a register value directly, bypassing the bus.
    pub fn peek(&self, register: u8) -> u8 {
        self.lock().registers[register as usize]
    }

    /// Return every `(register, value)` pair written through the bus, in
    /// order.
    pub fn writes(&self) -> Vec<(u8, u8)> {
        self.lock().writes.clone()
    }

    /// Forget previously recorded writes.
    pub fn clear_writes(&self) {
        self.lock().writes.clear();
    }

    /// Script the chip to clear `mask` in `register` after the masked bits
    /// have been read high `after_reads` times.
    ///
    /// With `after_reads = 0` the first read already sees the bits cleared.
    /// Without a script, bits written high stay high forever, which is how
    /// tests exercise the scan timeout path.
    pub fn auto_clear_after(&self, register: u8, mask: u8, after_reads: u32) {
        self.lock().auto_clear = Some(AutoClear {
            register,
            mask,
            after_reads,
            seen: 0,
        });
    }

    /// Queue a register value to be loaded when the scripted auto-clear
    /// fires, emulating result registers the chip updates on completion.
    pub fn load_on_clear(&self, register: u8, value: u8) {
        self.lock().on_clear_loads.push((register, value));
    }

    /// Make every subsequent bus transaction fail (or succeed again).
    pub fn induce_fault(&self, fault: bool) {
        self.lock().fault = fault;
    }
}

/// A mock [`RegisterBus`] for testing drivers without hardware.
///
/// Reads and writes hit a plain 256-byte register file; the driver under
/// test cannot tell it apart from a quiet chip. Dynamic chip behavior
/// (status bits clearing, result registers updating) is scripted through
/// [`MockChip`] by the test.
#[derive(Debug)]
pub struct MockRegisterBus {
    chip: MockChip,
    open: bool,
}

impl MockRegisterBus {
    /// Create a mock bus and its control handle. All registers start at 0.
    pub fn new() -> (MockRegisterBus, MockChip) {
        let chip = MockChip {
            state: Arc::new(Mutex::new(ChipState {
                registers: [0; 256],
                writes: Vec::new(),
                auto_clear: None,
                on_clear_loads: Vec::new(),
                fault: false,
            })),
        };
        (
            MockRegisterBus {
                chip: chip.clone(),
                open: true,
            },
            chip,
        )
    }
}

#[async_trait]
impl RegisterBus for MockRegisterBus {
    async fn read_register(&mut self, register: u8) -> Result<u8> {
        if !self.open {
            return Err(Error::NotOpen);
        }
        let mut guard = self.chip.lock();
        let state = &mut *guard;
        if state.fault {
            return Err(Error::Bus("injected fault".into()));
        }
        if let Some(ref mut auto) = state.auto_clear {
            if auto.register == register
                && state.registers[register as usize] & auto.mask != 0
            {
                if auto.seen >= auto.after_reads {
                    state.registers[register as usize] &= !auto.mask;
                    for (reg, value) in state.on_clear_loads.drain(..) {
                        state.registers[reg as usize] = value;
                    }
                } else {
                    auto.seen += 1;
                }
            }
        }
        Ok(state.registers[register as usize])
    }

    async fn write_register(&mut self, register: u8, value: u8) -> Result<()> {
        if !self.open {
            return Err(Error::NotOpen);
        }
        let mut state = self.chip.lock();
        if state.fault {
            return Err(Error::Bus("injected fault".into()));
        }
        state.registers[register as usize] = value;
        state.writes.push((register, value));
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
