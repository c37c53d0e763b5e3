//! # Real-Time Control and Low-power Management (RTC_CNTL)
//!
//! ## Overview
//!
//! The RTC_CNTL peripheral is responsible for managing the low-power modes
//! on the chip. It keeps the RTC counter running from the slow clock through
//! every sleep mode and decides which events may end a sleep.
//!
//! ## Configuration
//!
//! [`Rtc`] needs the frequency of the RTC slow clock to convert between
//! ticks and time. Wakeup sources live in [`sleep`]: pass any number of them
//! to [`Rtc::sleep_light`], [`Rtc::sleep_deep`] or [`Rtc::sleep`].
//!
//! ## Examples
//! ### Deep sleep with a timer and an EXT0 wakeup
//! ```rust, no_run
//! # use core::time::Duration;
//! # use esp_rtc_hal::{gpio::rtc_io::RtcIo, peripherals::Peripherals, reg_access::Mmio, soc::Chip};
//! # use esp_rtc_hal::rtc_cntl::{Rtc, sleep::{Ext0WakeupSource, TimerWakeupSource, WakeupLevel}};
//! # use fugit::RateExtU32;
//! let peripherals = Peripherals::take().unwrap();
//! let bus = unsafe { Mmio::steal() };
//! let rtc = Rtc::new(peripherals.LPWR, &bus, Chip::Esp32, 150.kHz()).unwrap();
//! let mut rtc_io = RtcIo::new(peripherals.RTC_IO, &bus, Chip::Esp32).unwrap();
//! let mut pin = rtc_io.pin(4).unwrap();
//!
//! let timer = TimerWakeupSource::new(Duration::from_secs(30));
//! let ext0 = Ext0WakeupSource::new(&mut pin, WakeupLevel::High);
//! rtc.sleep_deep(&[&timer, &ext0]).unwrap();
//! ```

use core::{fmt::Display, time::Duration};

use fugit::HertzU32;

use self::sleep::{RtcSleepConfig, SleepError, WakeSource, WakeTriggers};
use crate::{
    peripherals::LPWR,
    reg_access::RegisterAccess,
    soc::{Chip, RtcCntlLayout, rtc_cntl_reg},
};

pub mod sleep;

/// Upper bound of polls for the RTC counter latch to become valid.
const TIME_VALID_POLL_LIMIT: u32 = 10_000;

/// RTC_CNTL errors.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// The chip has no RTC_CNTL block.
    Unsupported,
    /// The slow clock frequency is zero.
    InvalidClock,
}

impl Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Unsupported => write!(f, "The chip has no RTC_CNTL block"),
            Error::InvalidClock => write!(f, "The slow clock frequency must not be zero"),
        }
    }
}

impl core::error::Error for Error {}

/// Low-power Management
pub struct Rtc<'d, R> {
    regs: &'d R,
    chip: Chip,
    layout: &'static RtcCntlLayout,
    slow_clock: HertzU32,
}

impl<'d, R: RegisterAccess> Rtc<'d, R> {
    /// Create a new instance.
    ///
    /// `slow_clock` is the frequency the RTC counter runs at.
    pub fn new(
        _lpwr: LPWR,
        regs: &'d R,
        chip: Chip,
        slow_clock: HertzU32,
    ) -> Result<Self, Error> {
        let layout = chip.rtc_cntl_layout().ok_or(Error::Unsupported)?;
        if slow_clock.raw() == 0 {
            return Err(Error::InvalidClock);
        }

        Ok(Self {
            regs,
            chip,
            layout,
            slow_clock,
        })
    }

    /// The chip this driver was created for.
    pub fn chip(&self) -> Chip {
        self.chip
    }

    /// Frequency of the RTC slow clock.
    pub fn slow_clock(&self) -> HertzU32 {
        self.slow_clock
    }

    fn reg(&self, offset: u32) -> u32 {
        self.layout.reg(offset)
    }

    /// Read the current value of the RTC counter, in slow clock ticks.
    pub fn time_raw(&self) -> u64 {
        let update = self.reg(self.layout.time_update);
        self.regs.set_bits(update, rtc_cntl_reg::TIME_UPDATE);

        if let Some(valid) = self.layout.time_valid {
            let mut polls = 0;
            while self.regs.read(update) & valid == 0 {
                polls += 1;
                if polls == TIME_VALID_POLL_LIMIT {
                    warn!("RTC counter latch did not become valid");
                    break;
                }
            }
        }

        let low = self.regs.read(self.reg(self.layout.time_low)) as u64;
        let high = (self.regs.read(self.reg(self.layout.time_high)) & 0xffff) as u64;
        (high << 32) | low
    }

    /// Convert slow clock ticks to microseconds.
    pub fn ticks_to_us(&self, ticks: u64) -> u64 {
        (ticks as u128 * 1_000_000 / self.slow_clock.raw() as u128) as u64
    }

    /// Convert microseconds to slow clock ticks.
    pub fn us_to_ticks(&self, us: u64) -> u64 {
        (us as u128 * self.slow_clock.raw() as u128 / 1_000_000) as u64
    }

    /// Get the time since boot.
    pub fn time_since_boot(&self) -> Duration {
        Duration::from_micros(self.ticks_to_us(self.time_raw()))
    }

    /// The events that ended the last sleep.
    pub fn wakeup_cause(&self) -> WakeTriggers {
        let bits = self.regs.read(self.reg(self.layout.wakeup_cause)) & self.layout.wakeup_cause_mask;
        WakeTriggers::from_bits(bits as u16)
    }

    /// Mask of the RTC IO channels that caused an EXT1 wakeup.
    pub fn ext1_wakeup_status(&self) -> u32 {
        self.regs.read_field(
            self.reg(self.layout.ext_wakeup1_status),
            0,
            self.layout.ext_wakeup1_sel_width,
        )
    }

    /// Enter deep sleep and wake with the provided `wake_sources`.
    ///
    /// In Deep-sleep mode, the CPUs, most of the RAM, and all digital
    /// peripherals that are clocked from APB_CLK are powered off. On real
    /// hardware a successful deep sleep ends in a reset, so this only
    /// returns if the sleep was rejected.
    pub fn sleep_deep(&self, wake_sources: &[&dyn WakeSource<R>]) -> Result<(), SleepError> {
        self.sleep(&RtcSleepConfig::deep(), wake_sources)
    }

    /// Enter light sleep and wake with the provided `wake_sources`.
    pub fn sleep_light(&self, wake_sources: &[&dyn WakeSource<R>]) -> Result<(), SleepError> {
        self.sleep(&RtcSleepConfig::default(), wake_sources)
    }

    /// Enter sleep with the provided `config` and wake with the provided
    /// `wake_sources`.
    pub fn sleep(
        &self,
        config: &RtcSleepConfig,
        wake_sources: &[&dyn WakeSource<R>],
    ) -> Result<(), SleepError> {
        let mut config = *config;
        let mut triggers = WakeTriggers::default();
        for wake_source in wake_sources {
            wake_source.apply(self, &mut triggers, &mut config)?;
        }

        config.apply(self);

        let layout = self.layout;
        self.regs.write_field(
            self.reg(layout.wakeup_state),
            layout.wakeup_ena_shift,
            layout.wakeup_ena_width,
            triggers.bits() as u32,
        );
        debug!(
            "entering {} sleep, triggers {:#x}",
            if config.deep_slp() { "deep" } else { "light" },
            triggers.bits()
        );

        self.regs.write(
            self.reg(layout.state0),
            rtc_cntl_reg::SLEEP_EN | rtc_cntl_reg::SLP_WAKEUP,
        );

        let raw = self.regs.read(self.reg(layout.int_raw));
        self.regs.write(
            self.reg(layout.int_clr),
            rtc_cntl_reg::INT_SLP_REJECT | rtc_cntl_reg::INT_SLP_WAKEUP,
        );

        if raw & rtc_cntl_reg::INT_SLP_REJECT != 0 {
            warn!("sleep rejected");
            return Err(SleepError::Rejected);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use fugit::RateExtU32;

    use super::*;
    use crate::mock::FakeRegisters;

    const BASE: u32 = 0x3ff4_8000;

    fn new_rtc(regs: &FakeRegisters, chip: Chip) -> Result<Rtc<'_, FakeRegisters>, Error> {
        Rtc::new(unsafe { LPWR::steal() }, regs, chip, 150.kHz())
    }

    #[test]
    fn new_rejects_missing_block_and_clock() {
        let regs = FakeRegisters::new();
        assert!(matches!(
            new_rtc(&regs, Chip::Esp32c6),
            Err(Error::Unsupported)
        ));
        assert!(matches!(
            Rtc::new(unsafe { LPWR::steal() }, &regs, Chip::Esp32, 0.Hz()),
            Err(Error::InvalidClock)
        ));
    }

    #[test]
    fn time_raw_combines_48_bits() {
        let regs = FakeRegisters::new();
        regs.preset(BASE + 0x0c, 1 << 30);
        regs.preset(BASE + 0x10, 0x89ab_cdef);
        regs.preset(BASE + 0x14, 0xdead_0123);
        let rtc = new_rtc(&regs, Chip::Esp32).unwrap();

        assert_eq!(rtc.time_raw(), 0x0123_89ab_cdef);
        assert_ne!(regs.read(BASE + 0x0c) & rtc_cntl_reg::TIME_UPDATE, 0);
    }

    #[test]
    fn time_raw_gives_up_on_stuck_latch() {
        let regs = FakeRegisters::new();
        regs.preset(BASE + 0x10, 42);
        let rtc = new_rtc(&regs, Chip::Esp32).unwrap();
        assert_eq!(rtc.time_raw(), 42);
    }

    #[test]
    fn time_since_boot_uses_slow_clock() {
        let regs = FakeRegisters::new();
        regs.preset(0x6000_8000 + 0x10, 300_000);
        let rtc = new_rtc(&regs, Chip::Esp32s3).unwrap();
        assert_eq!(rtc.time_since_boot(), Duration::from_secs(2));
        assert_eq!(rtc.us_to_ticks(1_000), 150);
    }

    #[test]
    fn wakeup_cause_is_masked() {
        let regs = FakeRegisters::new();
        regs.preset(BASE + 0x38, 0xffff_f808);
        let rtc = new_rtc(&regs, Chip::Esp32).unwrap();

        let cause = rtc.wakeup_cause();
        assert!(cause.timer());
        assert!(!cause.ext0());
        assert!(!cause.cocpu());
    }

    #[test]
    fn ext1_status_is_masked_to_select_width() {
        let regs = FakeRegisters::new();
        regs.preset(BASE + 0xd0, 0xffff_ffff);
        let rtc = new_rtc(&regs, Chip::Esp32).unwrap();
        assert_eq!(rtc.ext1_wakeup_status(), 0x3_ffff);
    }
}
