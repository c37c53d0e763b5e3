//! In-memory register file
//!
//! [`FakeRegisters`] implements [`RegisterAccess`] on top of a small map so
//! drivers can be exercised on the host. Registers that were never written
//! read as zero. The write-1-to-set and write-1-to-clear aliases of the RTC
//! IO and ETM blocks are emulated, so reading the target register after a
//! write to an alias behaves like the silicon.

use core::cell::RefCell;

use heapless::{LinearMap, Vec};

use crate::{
    reg_access::RegisterAccess,
    soc::{Chip, rtcio_reg, soc_etm_reg},
};

const REGISTERS: usize = 256;
const ALIASES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AliasKind {
    Set,
    Clear,
}

#[derive(Debug, Clone, Copy)]
struct Alias {
    addr: u32,
    target: u32,
    kind: AliasKind,
}

#[derive(Debug, Clone, Copy, Default)]
struct WriteRecord {
    count: u32,
    last: u32,
}

#[derive(Debug, Default)]
struct Inner {
    values: LinearMap<u32, u32, REGISTERS>,
    writes: LinearMap<u32, WriteRecord, REGISTERS>,
    aliases: Vec<Alias, ALIASES>,
}

impl Inner {
    fn store(&mut self, addr: u32, value: u32) {
        if self.values.insert(addr, value).is_err() {
            error!("register file full, dropping write to {:#x}", addr);
        }
    }

    fn load(&self, addr: u32) -> u32 {
        self.values.get(&addr).copied().unwrap_or(0)
    }
}

/// A register file living in RAM.
#[derive(Debug, Default)]
pub struct FakeRegisters {
    inner: RefCell<Inner>,
}

impl FakeRegisters {
    /// An empty register file without aliases.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty register file emulating the set/clear aliases of `chip`.
    pub fn for_chip(chip: Chip) -> Self {
        let regs = Self::new();

        if let Some(rtcio) = chip.rtcio_layout() {
            for (target, set, clear) in [
                (rtcio_reg::OUT, rtcio_reg::OUT_W1TS, rtcio_reg::OUT_W1TC),
                (rtcio_reg::ENABLE, rtcio_reg::ENABLE_W1TS, rtcio_reg::ENABLE_W1TC),
                (rtcio_reg::STATUS, rtcio_reg::STATUS_W1TS, rtcio_reg::STATUS_W1TC),
            ] {
                regs.add_alias(rtcio.reg(set), rtcio.reg(target), true);
                regs.add_alias(rtcio.reg(clear), rtcio.reg(target), false);
            }
        }

        if let Some(etm) = chip.etm_layout() {
            for (target, set, clear) in [
                (
                    soc_etm_reg::CH_ENA_AD0,
                    soc_etm_reg::CH_ENA_AD0_SET,
                    soc_etm_reg::CH_ENA_AD0_CLR,
                ),
                (
                    soc_etm_reg::CH_ENA_AD1,
                    soc_etm_reg::CH_ENA_AD1_SET,
                    soc_etm_reg::CH_ENA_AD1_CLR,
                ),
            ] {
                regs.add_alias(etm.reg(set), etm.reg(target), true);
                regs.add_alias(etm.reg(clear), etm.reg(target), false);
            }
        }

        regs
    }

    /// Make writes to `addr` set (or clear) the written bits of `target`.
    pub fn add_alias(&self, addr: u32, target: u32, set: bool) {
        let kind = if set { AliasKind::Set } else { AliasKind::Clear };
        if self
            .inner
            .borrow_mut()
            .aliases
            .push(Alias { addr, target, kind })
            .is_err()
        {
            error!("too many aliases, ignoring {:#x}", addr);
        }
    }

    /// Seed a register without recording a write.
    pub fn preset(&self, addr: u32, value: u32) {
        self.inner.borrow_mut().store(addr, value);
    }

    /// How many times `addr` was written through [`RegisterAccess`].
    pub fn writes_to(&self, addr: u32) -> u32 {
        self.inner
            .borrow()
            .writes
            .get(&addr)
            .map(|record| record.count)
            .unwrap_or(0)
    }

    /// The last value written to `addr` through [`RegisterAccess`].
    ///
    /// For alias registers this is the written mask, not the resulting
    /// target value.
    pub fn last_write(&self, addr: u32) -> Option<u32> {
        self.inner
            .borrow()
            .writes
            .get(&addr)
            .map(|record| record.last)
    }
}

impl RegisterAccess for FakeRegisters {
    fn read(&self, addr: u32) -> u32 {
        self.inner.borrow().load(addr)
    }

    fn write(&self, addr: u32, value: u32) {
        let mut inner = self.inner.borrow_mut();

        let mut record = inner.writes.get(&addr).copied().unwrap_or_default();
        record.count += 1;
        record.last = value;
        if inner.writes.insert(addr, record).is_err() {
            error!("write log full, dropping record of {:#x}", addr);
        }

        let alias = inner.aliases.iter().find(|alias| alias.addr == addr).copied();
        match alias {
            Some(Alias {
                target,
                kind: AliasKind::Set,
                ..
            }) => {
                let current = inner.load(target);
                inner.store(target, current | value);
            }
            Some(Alias {
                target,
                kind: AliasKind::Clear,
                ..
            }) => {
                let current = inner.load(target);
                inner.store(target, current & !value);
            }
            None => inner.store(addr, value),
        }
    }
}
