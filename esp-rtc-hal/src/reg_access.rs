//! Register access
//!
//! # Overview
//!
//! Every driver in this crate talks to the hardware through the
//! [`RegisterAccess`] trait instead of dereferencing peripheral pointers
//! directly. On target the [`Mmio`] implementation performs volatile
//! accesses at the absolute addresses found in [`crate::soc`]; on the host a
//! register file such as `FakeRegisters` can stand in for the silicon.

/// Word-wide access to memory mapped peripheral registers.
pub trait RegisterAccess {
    /// Read the 32-bit register at `addr`.
    fn read(&self, addr: u32) -> u32;

    /// Write `value` to the 32-bit register at `addr`.
    fn write(&self, addr: u32, value: u32);

    /// Read-modify-write the register at `addr`.
    fn modify(&self, addr: u32, f: impl FnOnce(u32) -> u32) {
        let value = self.read(addr);
        self.write(addr, f(value));
    }

    /// Set every bit of `mask`.
    fn set_bits(&self, addr: u32, mask: u32) {
        self.modify(addr, |v| v | mask);
    }

    /// Clear every bit of `mask`.
    fn clear_bits(&self, addr: u32, mask: u32) {
        self.modify(addr, |v| v & !mask);
    }

    /// Set or clear every bit of `mask`.
    fn set_bits_to(&self, addr: u32, mask: u32, enable: bool) {
        if enable {
            self.set_bits(addr, mask)
        } else {
            self.clear_bits(addr, mask)
        }
    }

    /// Read the `width` bit wide field starting at bit `shift`.
    fn read_field(&self, addr: u32, shift: u32, width: u32) -> u32 {
        (self.read(addr) >> shift) & field_mask(width)
    }

    /// Replace the `width` bit wide field starting at bit `shift`.
    fn write_field(&self, addr: u32, shift: u32, width: u32, value: u32) {
        let mask = field_mask(width) << shift;
        self.modify(addr, |v| (v & !mask) | ((value << shift) & mask));
    }
}

impl<T: RegisterAccess + ?Sized> RegisterAccess for &T {
    fn read(&self, addr: u32) -> u32 {
        (**self).read(addr)
    }

    fn write(&self, addr: u32, value: u32) {
        (**self).write(addr, value)
    }
}

#[inline(always)]
const fn field_mask(width: u32) -> u32 {
    if width >= 32 {
        u32::MAX
    } else {
        (1 << width) - 1
    }
}

/// Volatile access to the real peripheral address space.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub struct Mmio;

impl Mmio {
    /// Obtain the memory mapped bus.
    ///
    /// # Safety
    ///
    /// Only addresses taken from [`crate::soc`] for the chip the program
    /// actually runs on may be accessed through the returned value, and no
    /// other driver may concurrently own the same peripherals.
    pub const unsafe fn steal() -> Self {
        Self
    }
}

impl RegisterAccess for Mmio {
    #[inline(always)]
    fn read(&self, addr: u32) -> u32 {
        unsafe { (addr as usize as *const u32).read_volatile() }
    }

    #[inline(always)]
    fn write(&self, addr: u32, value: u32) {
        unsafe { (addr as usize as *mut u32).write_volatile(value) }
    }
}
