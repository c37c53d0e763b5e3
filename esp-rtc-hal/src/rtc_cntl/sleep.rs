//! # RTC Sleep and Wakeup Sources
//!
//! A wake source is applied right before the chip goes to sleep: it
//! programs its hardware, sets its bit in [`WakeTriggers`] and may adjust
//! the [`RtcSleepConfig`] (EXT0 and EXT1 keep the RTC peripherals powered,
//! for example).
//!
//! Every kind of source can be used once per sleep, passing two sources of
//! the same kind fails with [`SleepError::TooManyWakeupSources`].

use core::{fmt::Display, time::Duration};

use super::Rtc;
use crate::{
    gpio::{RtcFunction, rtc_io::RtcPin},
    reg_access::RegisterAccess,
    soc::{Chip, rtc_cntl_reg},
};

/// Most pads an EXT1 source can watch.
pub const MAX_EXT1_PINS: usize = 22;

// Approximate mapping of voltages to RTC_CNTL_DBIAS_WAK, RTC_CNTL_DBIAS_SLP,
// RTC_CNTL_DIG_DBIAS_WAK, RTC_CNTL_DIG_DBIAS_SLP values.
/// 0.90 V
pub const RTC_CNTL_DBIAS_0V90: u8 = 0;
/// 1.10 V
pub const RTC_CNTL_DBIAS_1V10: u8 = 4;

/// Level combination that will trigger wakeup
#[derive(Debug, Default, Eq, PartialEq, Copy, Clone, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WakeupLevel {
    /// Wake when the pin is low (EXT1: all pins are low)
    Low,
    /// Wake when the pin is high (EXT1: any pin is high)
    #[default]
    High,
}

/// Sleep errors.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum SleepError {
    /// The hardware refused to enter sleep because a wakeup event was
    /// already pending.
    Rejected,
    /// The GPIO is not an RTC GPIO.
    InvalidPin,
    /// More than one source of the same kind, or too many EXT1 pins.
    TooManyWakeupSources,
}

impl Display for SleepError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SleepError::Rejected => write!(f, "Sleep was rejected"),
            SleepError::InvalidPin => write!(f, "The GPIO is not an RTC GPIO"),
            SleepError::TooManyWakeupSources => write!(f, "Too many wakeup sources"),
        }
    }
}

impl core::error::Error for SleepError {}

bitfield::bitfield! {
    /// Events that can wake the chip.
    #[derive(Default, Clone, Copy, PartialEq, Eq)]
    pub struct WakeTriggers(u16);
    impl Debug;
    /// EXT0 GPIO wakeup
    pub ext0, set_ext0: 0;
    /// EXT1 GPIO wakeup
    pub ext1, set_ext1: 1;
    /// GPIO wakeup (light sleep only)
    pub gpio, set_gpio: 2;
    /// Timer wakeup
    pub timer, set_timer: 3;
    /// SDIO wakeup (light sleep only)
    pub sdio, set_sdio: 4;
    /// MAC wakeup (light sleep only)
    pub mac, set_mac: 5;
    /// UART0 wakeup (light sleep only)
    pub uart0, set_uart0: 6;
    /// UART1 wakeup (light sleep only)
    pub uart1, set_uart1: 7;
    /// Touch wakeup
    pub touch, set_touch: 8;
    /// ULP wakeup
    pub ulp, set_ulp: 9;
    /// BT wakeup (light sleep only)
    pub bt, set_bt: 10;
    /// ULP-RISCV wakeup
    pub cocpu, set_cocpu: 11;
    /// 32 kHz crystal failure
    pub xtal32k_dead, set_xtal32k_dead: 12;
    /// ULP-RISCV trap
    pub cocpu_trap, set_cocpu_trap: 13;
    /// USB wakeup
    pub usb, set_usb: 14;
}

impl WakeTriggers {
    /// Build from the raw bits.
    pub fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// The raw bits.
    pub fn bits(&self) -> u16 {
        self.0
    }
}

bitfield::bitfield! {
    /// Power settings of a sleep.
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct RtcSleepConfig(u32);
    impl Debug;
    /// force normal voltage in sleep mode (digital domain memory)
    pub lslp_mem_inf_fpu, set_lslp_mem_inf_fpu: 0;
    /// force normal voltage in sleep mode (RTC memory)
    pub rtc_mem_inf_fpu, set_rtc_mem_inf_fpu: 1;
    /// keep low voltage in sleep mode (even if ULP/touch is used)
    pub rtc_mem_inf_follow_cpu, set_rtc_mem_inf_follow_cpu: 2;
    /// power down RTC fast memory
    pub rtc_fastmem_pd_en, set_rtc_fastmem_pd_en: 3;
    /// power down RTC slow memory
    pub rtc_slowmem_pd_en, set_rtc_slowmem_pd_en: 4;
    /// power down RTC peripherals
    pub rtc_peri_pd_en, set_rtc_peri_pd_en: 5;
    /// power down WiFi
    pub wifi_pd_en, set_wifi_pd_en: 6;
    /// Power down Internal 8M oscillator
    pub int_8m_pd_en, set_int_8m_pd_en: 7;
    /// power down main RAM and ROM
    pub rom_mem_pd_en, set_rom_mem_pd_en: 8;
    /// power down digital domain
    pub deep_slp, set_deep_slp: 9;
    /// enable WDT flashboot mode
    pub wdt_flashboot_mod_en, set_wdt_flashboot_mod_en: 10;
    /// bias for digital domain, in active mode
    pub u8, dig_dbias_wak, set_dig_dbias_wak: 13, 11;
    /// bias for digital domain, in sleep mode
    pub u8, dig_dbias_slp, set_dig_dbias_slp: 16, 14;
    /// bias for RTC domain, in active mode
    pub u8, rtc_dbias_wak, set_rtc_dbias_wak: 19, 17;
    /// bias for RTC domain, in sleep mode
    pub u8, rtc_dbias_slp, set_rtc_dbias_slp: 22, 20;
    /// remove all peripheral force power up flags
    pub lslp_meminf_pd, set_lslp_meminf_pd: 23;
    /// power down VDDSDIO regulator
    pub vddsdio_pd_en, set_vddsdio_pd_en: 24;
    /// keep main XTAL powered up in sleep
    pub xtal_fpu, set_xtal_fpu: 25;
    /// enable deep sleep reject
    pub deep_slp_reject, set_deep_slp_reject: 26;
    /// enable light sleep reject
    pub light_slp_reject, set_light_slp_reject: 27;
}

impl Default for RtcSleepConfig {
    fn default() -> Self {
        let mut cfg = Self(Default::default());
        cfg.set_lslp_meminf_pd(true);
        cfg.set_deep_slp_reject(true);
        cfg.set_light_slp_reject(true);
        cfg.set_dig_dbias_wak(RTC_CNTL_DBIAS_1V10);
        cfg.set_dig_dbias_slp(RTC_CNTL_DBIAS_1V10);
        cfg.set_rtc_dbias_wak(RTC_CNTL_DBIAS_1V10);
        cfg.set_rtc_dbias_slp(RTC_CNTL_DBIAS_1V10);
        cfg
    }
}

impl RtcSleepConfig {
    /// Configuration for deep sleep.
    pub fn deep() -> Self {
        let mut cfg = Self::default();
        cfg.set_deep_slp(true);
        cfg.set_dig_dbias_slp(RTC_CNTL_DBIAS_0V90);
        cfg.set_vddsdio_pd_en(true);
        cfg.set_int_8m_pd_en(true);
        cfg.set_xtal_fpu(false);
        cfg.set_wifi_pd_en(true);
        cfg.set_rom_mem_pd_en(true);
        cfg.set_rtc_peri_pd_en(true);
        cfg.set_rtc_fastmem_pd_en(true);
        cfg.set_rtc_slowmem_pd_en(true);
        cfg
    }

    pub(crate) fn apply<R: RegisterAccess>(&self, rtc: &Rtc<'_, R>) {
        use rtc_cntl_reg::*;

        let layout = rtc.layout;
        let regs = rtc.regs;
        let pwc = rtc.reg(layout.pwc);
        let dig_pwc = rtc.reg(layout.dig_pwc);

        regs.set_bits_to(dig_pwc, LSLP_MEM_FORCE_PU, self.lslp_mem_inf_fpu());

        // remove all peripheral force power up flags
        if self.lslp_meminf_pd() {
            regs.clear_bits(dig_pwc, LSLP_MEM_FORCE_PU);
            regs.clear_bits(pwc, SLOWMEM_FORCE_PU | FASTMEM_FORCE_PU);
        }

        regs.set_bits_to(
            pwc,
            SLOWMEM_FOLW_CPU | FASTMEM_FOLW_CPU,
            self.rtc_mem_inf_follow_cpu(),
        );
        regs.set_bits_to(
            pwc,
            FASTMEM_FORCE_PU | FASTMEM_FORCE_LPU | FASTMEM_FORCE_NOISO,
            !self.rtc_fastmem_pd_en(),
        );
        regs.set_bits_to(pwc, SLOWMEM_PD_EN, self.rtc_slowmem_pd_en());
        regs.set_bits_to(
            pwc,
            SLOWMEM_FORCE_PU | SLOWMEM_FORCE_NOISO | SLOWMEM_FORCE_LPU,
            !self.rtc_slowmem_pd_en(),
        );
        regs.set_bits_to(pwc, PD_EN, self.rtc_peri_pd_en());

        regs.set_bits_to(dig_pwc, WIFI_PD_EN, self.wifi_pd_en());
        regs.set_bits_to(dig_pwc, layout.rom0_pd_en, self.rom_mem_pd_en());
        regs.set_bits_to(dig_pwc, DG_WRAP_PD_EN, self.deep_slp());

        regs.set_bits_to(rtc.reg(layout.options0), XTL_FORCE_PU, self.xtal_fpu());
        regs.set_bits_to(rtc.reg(layout.clk_conf), CK8M_FORCE_PU, !self.int_8m_pd_en());

        // enable VDDSDIO control by state machine
        let sdio_conf = rtc.reg(layout.sdio_conf);
        regs.clear_bits(sdio_conf, SDIO_FORCE);
        regs.set_bits_to(sdio_conf, SDIO_PD_EN, self.vddsdio_pd_en());

        if let Some(dbias) = layout.dbias {
            let reg = rtc.reg(dbias);
            regs.write_field(reg, DBIAS_SLP_S, DBIAS_W, self.rtc_dbias_slp() as u32);
            regs.write_field(reg, DBIAS_WAK_S, DBIAS_W, self.rtc_dbias_wak() as u32);
            regs.write_field(reg, DIG_DBIAS_SLP_S, DBIAS_W, self.dig_dbias_slp() as u32);
            regs.write_field(reg, DIG_DBIAS_WAK_S, DBIAS_W, self.dig_dbias_wak() as u32);
        }

        let reject = rtc.reg(layout.slp_reject_conf);
        regs.set_bits_to(reject, layout.deep_slp_reject_en, self.deep_slp_reject());
        regs.set_bits_to(reject, layout.light_slp_reject_en, self.light_slp_reject());
    }
}

/// Trait representing a wakeup source.
pub trait WakeSource<R: RegisterAccess> {
    /// Program the hardware of this source and record it in `triggers`.
    fn apply(
        &self,
        rtc: &Rtc<'_, R>,
        triggers: &mut WakeTriggers,
        sleep_config: &mut RtcSleepConfig,
    ) -> Result<(), SleepError>;
}

/// RTC timer wakeup source
///
/// The RTC timer can be configured to wake up the system after a
/// predefined amount of time.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimerWakeupSource {
    duration: Duration,
}

impl TimerWakeupSource {
    /// Create a new timer wake-up source.
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl<R: RegisterAccess> WakeSource<R> for TimerWakeupSource {
    fn apply(
        &self,
        rtc: &Rtc<'_, R>,
        triggers: &mut WakeTriggers,
        _sleep_config: &mut RtcSleepConfig,
    ) -> Result<(), SleepError> {
        if triggers.timer() {
            return Err(SleepError::TooManyWakeupSources);
        }
        triggers.set_timer(true);

        let micros = u64::try_from(self.duration.as_micros()).unwrap_or(u64::MAX);
        // "alarm" time in slow rtc ticks
        let alarm = rtc.time_raw().wrapping_add(rtc.us_to_ticks(micros));

        let layout = rtc.layout;
        rtc.regs
            .write(rtc.reg(layout.slp_timer0), (alarm & 0xffff_ffff) as u32);
        rtc.regs.write(
            rtc.reg(layout.slp_timer1),
            ((alarm >> 32) & 0xffff) as u32 | rtc_cntl_reg::MAIN_TIMER_ALARM_EN,
        );
        trace!("timer wakeup at tick {}", alarm);
        Ok(())
    }
}

/// An RTC GPIO that [`Ext0WakeupSource`] or [`Ext1WakeupSource`] can watch.
pub trait RtcWakeupPin: crate::private::Sealed {
    /// GPIO number.
    fn gpio_number(&self) -> u8;

    /// RTC IO channel.
    fn rtc_number(&self) -> u8;

    #[doc(hidden)]
    fn chip(&self) -> Chip;

    /// Hand the pad to RTC IO with its input buffer enabled.
    #[doc(hidden)]
    fn route_to_rtc(&self);

    #[doc(hidden)]
    fn select_ext0(&self);

    /// Hand the pad back to IO MUX.
    #[doc(hidden)]
    fn release(&self);
}

impl<R: RegisterAccess, MODE> RtcWakeupPin for RtcPin<'_, R, MODE> {
    fn gpio_number(&self) -> u8 {
        self.pad.gpio_num
    }

    fn rtc_number(&self) -> u8 {
        self.pad.rtc_num
    }

    fn chip(&self) -> Chip {
        self.io.chip()
    }

    fn route_to_rtc(&self) {
        self.io.pad_function_select(self.pad, RtcFunction::Rtc);
        self.io.pad_input_enable(self.pad);
    }

    fn select_ext0(&self) {
        self.io.pad_select_ext0(self.pad);
    }

    fn release(&self) {
        // input enable and function have no effect once the pad is back on
        // IO MUX
        self.io.pad_function_select(self.pad, RtcFunction::Digital);
    }
}

/// External wake-up source (Ext0).
///
/// Monitors a single RTC GPIO. The pad stays in the RTC function until the
/// source is dropped.
pub struct Ext0WakeupSource<'a, P: RtcWakeupPin> {
    pin: &'a mut P,
    level: WakeupLevel,
}

impl<'a, P: RtcWakeupPin> Ext0WakeupSource<'a, P> {
    /// Create a new external wake-up source (Ext0) with the specified pin and
    /// wakeup level.
    pub fn new(pin: &'a mut P, level: WakeupLevel) -> Self {
        Self { pin, level }
    }
}

impl<R: RegisterAccess, P: RtcWakeupPin> WakeSource<R> for Ext0WakeupSource<'_, P> {
    fn apply(
        &self,
        rtc: &Rtc<'_, R>,
        triggers: &mut WakeTriggers,
        sleep_config: &mut RtcSleepConfig,
    ) -> Result<(), SleepError> {
        if triggers.ext0() {
            return Err(SleepError::TooManyWakeupSources);
        }
        if self.pin.chip() != rtc.chip() {
            return Err(SleepError::InvalidPin);
        }

        // don't power down RTC peripherals
        sleep_config.set_rtc_peri_pd_en(false);
        triggers.set_ext0(true);

        self.pin.route_to_rtc();
        self.pin.select_ext0();

        rtc.regs.set_bits_to(
            rtc.reg(rtc.layout.ext_wakeup_conf),
            rtc_cntl_reg::EXT_WAKEUP0_LV,
            self.level == WakeupLevel::High,
        );
        Ok(())
    }
}

impl<P: RtcWakeupPin> Drop for Ext0WakeupSource<'_, P> {
    fn drop(&mut self) {
        self.pin.release();
    }
}

/// External wake-up source (Ext1).
///
/// Monitors a set of RTC GPIOs: with [`WakeupLevel::High`] any of them going
/// high wakes the chip, with [`WakeupLevel::Low`] all of them must be low.
pub struct Ext1WakeupSource<'a, 'b> {
    pins: &'a mut [&'b mut dyn RtcWakeupPin],
    level: WakeupLevel,
}

impl<'a, 'b> Ext1WakeupSource<'a, 'b> {
    /// Create a new external wake-up source (Ext1) with the specified pins
    /// and wakeup level.
    pub fn new(
        pins: &'a mut [&'b mut dyn RtcWakeupPin],
        level: WakeupLevel,
    ) -> Result<Self, SleepError> {
        if pins.is_empty() {
            return Err(SleepError::InvalidPin);
        }
        if pins.len() > MAX_EXT1_PINS {
            return Err(SleepError::TooManyWakeupSources);
        }
        Ok(Self { pins, level })
    }

    /// Mask of the RTC IO channels this source watches.
    pub fn rtc_mask(&self) -> u32 {
        self.pins
            .iter()
            .fold(0, |mask, pin| mask | 1 << pin.rtc_number())
    }
}

impl<R: RegisterAccess> WakeSource<R> for Ext1WakeupSource<'_, '_> {
    fn apply(
        &self,
        rtc: &Rtc<'_, R>,
        triggers: &mut WakeTriggers,
        sleep_config: &mut RtcSleepConfig,
    ) -> Result<(), SleepError> {
        if triggers.ext1() {
            return Err(SleepError::TooManyWakeupSources);
        }
        if self.pins.iter().any(|pin| pin.chip() != rtc.chip()) {
            return Err(SleepError::InvalidPin);
        }

        // don't power down RTC peripherals
        sleep_config.set_rtc_peri_pd_en(false);
        triggers.set_ext1(true);

        for pin in self.pins.iter() {
            pin.route_to_rtc();
        }

        let layout = rtc.layout;
        let ext_wakeup1 = rtc.reg(layout.ext_wakeup1);
        // clear previous wakeup status
        rtc.regs.set_bits(ext_wakeup1, layout.ext_wakeup1_status_clr);
        rtc.regs
            .write_field(ext_wakeup1, 0, layout.ext_wakeup1_sel_width, self.rtc_mask());
        rtc.regs.set_bits_to(
            rtc.reg(layout.ext_wakeup_conf),
            rtc_cntl_reg::EXT_WAKEUP1_LV,
            self.level == WakeupLevel::High,
        );
        Ok(())
    }
}

impl Drop for Ext1WakeupSource<'_, '_> {
    fn drop(&mut self) {
        for pin in self.pins.iter() {
            pin.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use fugit::RateExtU32;

    use super::*;
    use crate::{
        gpio::rtc_io::RtcIo,
        mock::FakeRegisters,
        peripherals::{LPWR, RTC_IO},
    };

    const CNTL: u32 = 0x3ff4_8000;
    const PWC: u32 = CNTL + 0x80;
    const DIG_PWC: u32 = CNTL + 0x84;
    const DBIAS: u32 = CNTL + 0x7c;

    fn new_rtc(regs: &FakeRegisters, chip: Chip) -> Rtc<'_, FakeRegisters> {
        Rtc::new(unsafe { LPWR::steal() }, regs, chip, 150.kHz()).unwrap()
    }

    fn new_io(regs: &FakeRegisters, chip: Chip) -> RtcIo<'_, FakeRegisters> {
        RtcIo::new(unsafe { RTC_IO::steal() }, regs, chip).unwrap()
    }

    #[test]
    fn triggers_match_register_bits() {
        let mut triggers = WakeTriggers::default();
        triggers.set_timer(true);
        triggers.set_ext1(true);
        triggers.set_usb(true);
        assert_eq!(triggers.bits(), 1 << 14 | 1 << 3 | 1 << 1);
        assert!(WakeTriggers::from_bits(1 << 13).cocpu_trap());
    }

    #[test]
    fn deep_config_powers_down_more() {
        let light = RtcSleepConfig::default();
        let deep = RtcSleepConfig::deep();
        assert!(!light.deep_slp());
        assert!(deep.deep_slp());
        assert!(deep.rtc_peri_pd_en());
        assert_eq!(deep.dig_dbias_slp(), RTC_CNTL_DBIAS_0V90);
        assert_eq!(light.rtc_dbias_wak(), RTC_CNTL_DBIAS_1V10);
    }

    #[test]
    fn deep_config_programs_power_domains() {
        let regs = FakeRegisters::for_chip(Chip::Esp32);
        let rtc = new_rtc(&regs, Chip::Esp32);
        regs.preset(CNTL + 0x00, rtc_cntl_reg::XTL_FORCE_PU);
        regs.preset(CNTL + 0x70, rtc_cntl_reg::CK8M_FORCE_PU);
        regs.preset(CNTL + 0x74, rtc_cntl_reg::SDIO_FORCE);

        RtcSleepConfig::deep().apply(&rtc);

        let pwc = regs.read(PWC);
        assert_ne!(pwc & rtc_cntl_reg::PD_EN, 0);
        assert_ne!(pwc & rtc_cntl_reg::SLOWMEM_PD_EN, 0);
        assert_eq!(
            pwc & (rtc_cntl_reg::FASTMEM_FORCE_PU | rtc_cntl_reg::SLOWMEM_FORCE_PU),
            0
        );
        assert_eq!(
            regs.read(DIG_PWC),
            rtc_cntl_reg::DG_WRAP_PD_EN | rtc_cntl_reg::WIFI_PD_EN | 1 << 24
        );
        assert_eq!(regs.read(CNTL + 0x00), 0);
        assert_eq!(regs.read(CNTL + 0x70), 0);
        assert_eq!(regs.read(CNTL + 0x74), rtc_cntl_reg::SDIO_PD_EN);
        // dig_dbias_slp at 0.90 V, the others at 1.10 V
        assert_eq!(regs.read(DBIAS), 4 << 25 | 4 << 22 | 4 << 11);
    }

    #[test]
    fn light_config_keeps_memories_and_oscillator() {
        let regs = FakeRegisters::for_chip(Chip::Esp32);
        let rtc = new_rtc(&regs, Chip::Esp32);

        RtcSleepConfig::default().apply(&rtc);

        let pwc = regs.read(PWC);
        assert_eq!(pwc & rtc_cntl_reg::PD_EN, 0);
        assert_eq!(pwc & rtc_cntl_reg::SLOWMEM_PD_EN, 0);
        assert_ne!(pwc & rtc_cntl_reg::FASTMEM_FORCE_PU, 0);
        assert_eq!(regs.read(DIG_PWC), 0);
        assert_eq!(regs.read(CNTL + 0x70), rtc_cntl_reg::CK8M_FORCE_PU);
    }

    #[test]
    fn s3_config_leaves_voltages_alone() {
        let regs = FakeRegisters::for_chip(Chip::Esp32s3);
        let rtc = new_rtc(&regs, Chip::Esp32s3);

        RtcSleepConfig::deep().apply(&rtc);

        assert_ne!(regs.read(0x6000_8000 + 0x84) & rtc_cntl_reg::PD_EN, 0);
        assert_eq!(
            regs.read(0x6000_8000 + 0x90),
            rtc_cntl_reg::DG_WRAP_PD_EN | rtc_cntl_reg::WIFI_PD_EN
        );
        assert_eq!(regs.writes_to(0x6000_8000 + 0x80), 0);
    }

    #[test]
    fn timer_programs_alarm() {
        let regs = FakeRegisters::new();
        regs.preset(CNTL + 0x0c, 1 << 30);
        regs.preset(CNTL + 0x10, 0xffff_fff0);
        regs.preset(CNTL + 0x14, 0x1);
        let rtc = Rtc::new(unsafe { LPWR::steal() }, &regs, Chip::Esp32, 100.kHz()).unwrap();

        let mut triggers = WakeTriggers::default();
        let mut config = RtcSleepConfig::default();
        let timer = TimerWakeupSource::new(Duration::from_millis(1));
        timer.apply(&rtc, &mut triggers, &mut config).unwrap();

        // 0x1_ffff_fff0 + 100 ticks
        assert!(triggers.timer());
        assert_eq!(regs.read(CNTL + 0x04), 0x54);
        assert_eq!(regs.read(CNTL + 0x08), 0x2 | rtc_cntl_reg::MAIN_TIMER_ALARM_EN);

        assert_eq!(
            timer.apply(&rtc, &mut triggers, &mut config),
            Err(SleepError::TooManyWakeupSources)
        );
    }

    #[test]
    fn ext0_keeps_rtc_peripherals_powered() {
        let regs = FakeRegisters::for_chip(Chip::Esp32);
        let rtc = new_rtc(&regs, Chip::Esp32);
        let mut io = new_io(&regs, Chip::Esp32);
        let mut pin = io.pin(4).unwrap();

        let ext0 = Ext0WakeupSource::new(&mut pin, WakeupLevel::High);
        let mut triggers = WakeTriggers::default();
        let mut config = RtcSleepConfig::deep();
        ext0.apply(&rtc, &mut triggers, &mut config).unwrap();
        config.apply(&rtc);

        assert!(triggers.ext0());
        assert_eq!(regs.read(PWC) & rtc_cntl_reg::PD_EN, 0);
    }

    #[test]
    fn ext_sources_reject_pins_of_another_chip() {
        let regs = FakeRegisters::new();
        let rtc = new_rtc(&regs, Chip::Esp32s3);
        let mut io = new_io(&regs, Chip::Esp32);
        let mut pin = io.pin(4).unwrap();

        let mut triggers = WakeTriggers::default();
        let mut config = RtcSleepConfig::deep();
        let ext0 = Ext0WakeupSource::new(&mut pin, WakeupLevel::High);
        assert_eq!(
            ext0.apply(&rtc, &mut triggers, &mut config),
            Err(SleepError::InvalidPin)
        );
        assert!(!triggers.ext0());
        assert!(config.rtc_peri_pd_en());
    }

    #[test]
    fn ext1_needs_at_least_one_pin() {
        assert!(matches!(
            Ext1WakeupSource::new(&mut [], WakeupLevel::High),
            Err(SleepError::InvalidPin)
        ));
    }

    #[test]
    fn ext1_mask_uses_rtc_numbers() {
        let regs = FakeRegisters::for_chip(Chip::Esp32);
        let mut io = new_io(&regs, Chip::Esp32);
        let mut pin0 = io.pin(0).unwrap();
        let mut pin36 = io.pin(36).unwrap().into_floating_input().unwrap();
        let mut pin39 = io.pin(39).unwrap();

        let mut pins: [&mut dyn RtcWakeupPin; 3] = [&mut pin0, &mut pin36, &mut pin39];
        let ext1 = Ext1WakeupSource::new(&mut pins, WakeupLevel::Low).unwrap();
        assert_eq!(ext1.rtc_mask(), 1 << 11 | 1 << 0 | 1 << 3);
    }
}
