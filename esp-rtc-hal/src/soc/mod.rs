//! # SOC (System-on-Chip) tables
//!
//! ## Overview
//!
//! Fixed hardware facts for the supported chips: the absolute addresses of
//! the RTC IO, RTC control and ETM register blocks, the bit layout of every
//! RTC IO pad, and the clock frequencies the power management code may
//! select. Nothing in here touches the hardware.

mod esp32;
mod esp32c6;
mod esp32s2;
mod esp32s3;

/// Supported chips.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[strum(serialize_all = "kebab-case")]
pub enum Chip {
    /// ESP32
    Esp32,
    /// ESP32-S2
    Esp32s2,
    /// ESP32-S3
    Esp32s3,
    /// ESP32-C6
    Esp32c6,
}

impl Chip {
    /// RTC IO register layout, if the chip has an RTC IO block.
    pub const fn rtcio_layout(self) -> Option<&'static RtcioLayout> {
        match self {
            Chip::Esp32 => Some(&esp32::RTCIO),
            Chip::Esp32s2 => Some(&esp32s2::RTCIO),
            Chip::Esp32s3 => Some(&esp32s3::RTCIO),
            Chip::Esp32c6 => None,
        }
    }

    /// RTC control register layout, if the chip has an `RTC_CNTL` block.
    pub const fn rtc_cntl_layout(self) -> Option<&'static RtcCntlLayout> {
        match self {
            Chip::Esp32 => Some(&esp32::RTC_CNTL),
            Chip::Esp32s2 => Some(&esp32s2::RTC_CNTL),
            Chip::Esp32s3 => Some(&esp32s3::RTC_CNTL),
            Chip::Esp32c6 => None,
        }
    }

    /// Event task matrix layout, if the chip has one.
    pub const fn etm_layout(self) -> Option<&'static EtmLayout> {
        match self {
            Chip::Esp32c6 => Some(&esp32c6::ETM),
            _ => None,
        }
    }

    /// CPU frequencies derived from the PLL, in MHz, ascending.
    pub const fn cpu_frequencies_mhz(self) -> &'static [u32] {
        match self {
            Chip::Esp32 | Chip::Esp32s2 | Chip::Esp32s3 => &[80, 160, 240],
            Chip::Esp32c6 => &[80, 160],
        }
    }

    /// Main crystal frequency in MHz.
    pub const fn xtal_frequency_mhz(self) -> u32 {
        40
    }

    /// Whether `mhz` is a CPU frequency this chip can run at, either from the
    /// PLL or as an integer division of the crystal.
    pub fn is_valid_cpu_frequency(self, mhz: u32) -> bool {
        let xtal = self.xtal_frequency_mhz();
        mhz != 0 && (self.cpu_frequencies_mhz().contains(&mhz) || (mhz <= xtal && xtal % mhz == 0))
    }

    /// Number of GPIOs in the digital IO MUX.
    pub const fn gpio_count(self) -> u8 {
        match self {
            Chip::Esp32 => 40,
            Chip::Esp32s2 => 47,
            Chip::Esp32s3 => 49,
            Chip::Esp32c6 => 31,
        }
    }

    /// RTC IO channel of a GPIO.
    pub fn rtc_io_number(self, gpio: u8) -> Option<u8> {
        self.rtc_pad(gpio).map(|pad| pad.rtc_num)
    }

    /// GPIO number of an RTC IO channel.
    pub fn gpio_number(self, rtc_io: u8) -> Option<u8> {
        self.rtcio_layout()?
            .pads
            .get(rtc_io as usize)
            .map(|pad| pad.gpio_num)
    }

    /// Whether the GPIO can be routed to the RTC IO block.
    pub fn is_valid_rtc_gpio(self, gpio: u8) -> bool {
        self.rtc_pad(gpio).is_some()
    }

    /// Pad descriptor of a GPIO.
    pub fn rtc_pad(self, gpio: u8) -> Option<&'static RtcioPadDesc> {
        self.rtcio_layout()?
            .pads
            .iter()
            .find(|pad| pad.gpio_num == gpio)
    }
}

/// Register offsets shared by every RTC IO block, relative to its base.
pub mod rtcio_reg {
    /// Output data.
    pub const OUT: u32 = 0x00;
    /// Output data, write 1 to set.
    pub const OUT_W1TS: u32 = 0x04;
    /// Output data, write 1 to clear.
    pub const OUT_W1TC: u32 = 0x08;
    /// Output enable.
    pub const ENABLE: u32 = 0x0c;
    /// Output enable, write 1 to set.
    pub const ENABLE_W1TS: u32 = 0x10;
    /// Output enable, write 1 to clear.
    pub const ENABLE_W1TC: u32 = 0x14;
    /// Interrupt status.
    pub const STATUS: u32 = 0x18;
    /// Interrupt status, write 1 to set.
    pub const STATUS_W1TS: u32 = 0x1c;
    /// Interrupt status, write 1 to clear.
    pub const STATUS_W1TC: u32 = 0x20;
    /// Input level.
    pub const IN: u32 = 0x24;
    /// First per-channel `PINn` register, the others follow every 4 bytes.
    pub const PIN0: u32 = 0x28;

    /// `PINn`: open drain driver.
    pub const PIN_PAD_DRIVER: u32 = 1 << 2;
    /// `PINn`: interrupt type field shift.
    pub const PIN_INT_TYPE_S: u32 = 7;
    /// `PINn`: interrupt type field width.
    pub const PIN_INT_TYPE_W: u32 = 3;
    /// `PINn`: wake up enable.
    pub const PIN_WAKEUP_ENABLE: u32 = 1 << 10;

    /// `EXT_WAKEUP0`: select field shift.
    pub const EXT_WAKEUP0_SEL_S: u32 = 27;
    /// `EXT_WAKEUP0`: select field width.
    pub const EXT_WAKEUP0_SEL_W: u32 = 5;

    /// `fun_sel` value routing the pad to its RTC GPIO function.
    pub const FUNC_RTC_GPIO: u32 = 0;
    /// `fun_sel` field width.
    pub const FUN_SEL_W: u32 = 2;
    /// Drive strength field width.
    pub const DRV_W: u32 = 2;
}

/// Register bits shared by every `RTC_CNTL` block.
pub mod rtc_cntl_reg {
    /// `SLP_TIMER1`: main timer alarm enable.
    pub const MAIN_TIMER_ALARM_EN: u32 = 1 << 16;
    /// `TIME_UPDATE`: latch the RTC counter.
    pub const TIME_UPDATE: u32 = 1 << 31;
    /// `STATE0`: start sleeping.
    pub const SLEEP_EN: u32 = 1 << 31;
    /// `STATE0`: leave sleep as soon as a wakeup source fires.
    pub const SLP_WAKEUP: u32 = 1 << 29;
    /// `INT_RAW` / `INT_CLR`: sleep wakeup.
    pub const INT_SLP_WAKEUP: u32 = 1 << 0;
    /// `INT_RAW` / `INT_CLR`: sleep reject.
    pub const INT_SLP_REJECT: u32 = 1 << 1;
    /// `EXT_WAKEUP_CONF`: EXT1 wakeup level.
    pub const EXT_WAKEUP1_LV: u32 = 1 << 31;
    /// `EXT_WAKEUP_CONF`: EXT0 wakeup level.
    pub const EXT_WAKEUP0_LV: u32 = 1 << 30;
    /// `OPTIONS0`: keep the main crystal powered.
    pub const XTL_FORCE_PU: u32 = 1 << 13;
    /// `CLK_CONF`: keep the 8 MHz oscillator powered.
    pub const CK8M_FORCE_PU: u32 = 1 << 26;
    /// `SDIO_CONF`: VDDSDIO is controlled by software, not the sleep state
    /// machine.
    pub const SDIO_FORCE: u32 = 1 << 22;
    /// `SDIO_CONF`: power down VDDSDIO in sleep.
    pub const SDIO_PD_EN: u32 = 1 << 21;
    /// Regulator voltage fields, 3 bits each.
    pub const DBIAS_W: u32 = 3;
    /// RTC domain voltage while awake.
    pub const DBIAS_WAK_S: u32 = 25;
    /// RTC domain voltage in sleep.
    pub const DBIAS_SLP_S: u32 = 22;
    /// Digital domain voltage while awake.
    pub const DIG_DBIAS_WAK_S: u32 = 11;
    /// Digital domain voltage in sleep.
    pub const DIG_DBIAS_SLP_S: u32 = 8;
    /// `PWC`: power down RTC peripherals in sleep.
    pub const PD_EN: u32 = 1 << 20;
    /// `PWC`: power down RTC slow memory in sleep.
    pub const SLOWMEM_PD_EN: u32 = 1 << 17;
    /// `PWC`: keep RTC slow memory powered.
    pub const SLOWMEM_FORCE_PU: u32 = 1 << 16;
    /// `PWC`: keep RTC fast memory powered.
    pub const FASTMEM_FORCE_PU: u32 = 1 << 13;
    /// `PWC`: keep RTC slow memory at normal voltage.
    pub const SLOWMEM_FORCE_LPU: u32 = 1 << 11;
    /// `PWC`: RTC slow memory follows the CPU power state.
    pub const SLOWMEM_FOLW_CPU: u32 = 1 << 9;
    /// `PWC`: keep RTC fast memory at normal voltage.
    pub const FASTMEM_FORCE_LPU: u32 = 1 << 8;
    /// `PWC`: RTC fast memory follows the CPU power state.
    pub const FASTMEM_FOLW_CPU: u32 = 1 << 6;
    /// `PWC`: never isolate RTC slow memory.
    pub const SLOWMEM_FORCE_NOISO: u32 = 1 << 2;
    /// `PWC`: never isolate RTC fast memory.
    pub const FASTMEM_FORCE_NOISO: u32 = 1 << 0;
    /// `DIG_PWC`: power down the digital wrapper in sleep.
    pub const DG_WRAP_PD_EN: u32 = 1 << 31;
    /// `DIG_PWC`: power down WiFi in sleep.
    pub const WIFI_PD_EN: u32 = 1 << 30;
    /// `DIG_PWC`: keep digital memories powered in light sleep.
    pub const LSLP_MEM_FORCE_PU: u32 = 1 << 4;
}

/// Register bits of the ESP32-C6 `SOC_ETM` block, relative to its base.
pub mod soc_etm_reg {
    /// Channel enable status for channels 0 to 31.
    pub const CH_ENA_AD0: u32 = 0x00;
    /// Channel enable for channels 0 to 31, write 1 to set.
    pub const CH_ENA_AD0_SET: u32 = 0x04;
    /// Channel enable for channels 0 to 31, write 1 to clear.
    pub const CH_ENA_AD0_CLR: u32 = 0x08;
    /// Channel enable status for channels 32 to 49.
    pub const CH_ENA_AD1: u32 = 0x0c;
    /// Channel enable for channels 32 to 49, write 1 to set.
    pub const CH_ENA_AD1_SET: u32 = 0x10;
    /// Channel enable for channels 32 to 49, write 1 to clear.
    pub const CH_ENA_AD1_CLR: u32 = 0x14;
    /// Event id of channel 0, the others follow every 8 bytes.
    pub const CH0_EVT_ID: u32 = 0x18;
    /// Task id of channel 0, the others follow every 8 bytes.
    pub const CH0_TASK_ID: u32 = 0x1c;
    /// Clock gate.
    pub const CLK_EN: u32 = 0x1a8;
    /// Width of the event and task id fields.
    pub const ID_W: u32 = 8;
}

/// Register bits of the ESP32-C6 `GPIO_EXT` ETM configuration.
pub mod gpio_ext_reg {
    /// Event channel 0 config, the others follow every 4 bytes.
    pub const ETM_EVENT_CH0_CFG: u32 = 0x60;
    /// Task config for GPIO 0 to 3, the others follow every 4 bytes.
    pub const ETM_TASK_P0_CFG: u32 = 0xa0;
    /// Event channel config: pin select field width.
    pub const EVENT_SEL_W: u32 = 5;
    /// Event channel config: enable.
    pub const EVENT_EN: u32 = 1 << 7;
}

/// Bit layout of one RTC IO pad.
///
/// Masks are absolute bit masks inside the pad register at `reg`. A zero mask
/// means the pad lacks the feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RtcioPadDesc {
    /// Pad register offset from the RTC IO base.
    pub reg: u32,
    /// Route the pad to RTC IO instead of IO MUX.
    pub mux: u32,
    /// Shift of the 2 bit `fun_sel` field.
    pub func: u32,
    /// Input enable.
    pub ie: u32,
    /// Pull-up enable.
    pub pullup: u32,
    /// Pull-down enable.
    pub pulldown: u32,
    /// Use the sleep configuration while sleeping.
    pub slpsel: u32,
    /// Input enable during sleep.
    pub slpie: u32,
    /// Output enable during sleep.
    pub slpoe: u32,
    /// Hold bit in the pad register.
    pub hold: u32,
    /// Bit in the `RTC_CNTL` hold register.
    pub hold_force: u32,
    /// Drive strength field mask (unshifted).
    pub drv_v: u32,
    /// Drive strength field shift.
    pub drv_s: u32,
    /// RTC IO channel.
    pub rtc_num: u8,
    /// GPIO number.
    pub gpio_num: u8,
}

impl RtcioPadDesc {
    pub(crate) const fn has_pullup(&self) -> bool {
        self.pullup != 0
    }

    pub(crate) const fn has_pulldown(&self) -> bool {
        self.pulldown != 0
    }

    pub(crate) const fn has_drive(&self) -> bool {
        self.drv_v != 0
    }

    pub(crate) const fn has_sleep_output(&self) -> bool {
        self.slpoe != 0
    }
}

/// RTC IO block of a chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RtcioLayout {
    /// Absolute base address.
    pub base: u32,
    /// Bit position of channel 0 in the `OUT`, `ENABLE`, `STATUS` and `IN`
    /// registers.
    pub gpio_shift: u32,
    /// `EXT_WAKEUP0` offset.
    pub ext_wakeup0: u32,
    /// Pads, indexed by RTC IO channel.
    pub pads: &'static [RtcioPadDesc],
}

impl RtcioLayout {
    /// Absolute address of a register offset.
    pub const fn reg(&self, offset: u32) -> u32 {
        self.base + offset
    }

    /// Absolute address of the `PINn` register of a channel.
    pub const fn pin_reg(&self, rtc_io: u8) -> u32 {
        self.base + rtcio_reg::PIN0 + 4 * rtc_io as u32
    }

    /// Mask covering every hold bit of the chip.
    pub fn hold_all_mask(&self) -> u32 {
        self.pads.iter().fold(0, |mask, pad| mask | pad.hold_force)
    }
}

/// `RTC_CNTL` block of a chip. Offsets are relative to `base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RtcCntlLayout {
    /// Absolute base address.
    pub base: u32,
    /// Sleep timer alarm, low 32 bits.
    pub slp_timer0: u32,
    /// Sleep timer alarm, high 16 bits and alarm enable.
    pub slp_timer1: u32,
    /// RTC counter latch.
    pub time_update: u32,
    /// RTC counter valid flag in `time_update`, if the chip has one.
    pub time_valid: Option<u32>,
    /// Latched RTC counter, low 32 bits.
    pub time_low: u32,
    /// Latched RTC counter, high 16 bits.
    pub time_high: u32,
    /// Sleep control.
    pub state0: u32,
    /// Wakeup enable register.
    pub wakeup_state: u32,
    /// Shift of the wakeup enable field in `wakeup_state`.
    pub wakeup_ena_shift: u32,
    /// Width of the wakeup enable field in `wakeup_state`.
    pub wakeup_ena_width: u32,
    /// Register holding the cause of the last wakeup.
    pub wakeup_cause: u32,
    /// Mask of the cause field in `wakeup_cause`.
    pub wakeup_cause_mask: u32,
    /// Raw interrupt status.
    pub int_raw: u32,
    /// Interrupt clear.
    pub int_clr: u32,
    /// EXT0/EXT1 wakeup level configuration.
    pub ext_wakeup_conf: u32,
    /// Sleep reject configuration.
    pub slp_reject_conf: u32,
    /// Deep sleep reject enable bit in `slp_reject_conf`.
    pub deep_slp_reject_en: u32,
    /// Light sleep reject enable bit in `slp_reject_conf`.
    pub light_slp_reject_en: u32,
    /// Crystal and bias options.
    pub options0: u32,
    /// Clock configuration.
    pub clk_conf: u32,
    /// VDDSDIO regulator configuration.
    pub sdio_conf: u32,
    /// Regulator voltages, if they are set through `RTC_CNTL` rather than
    /// the analog I2C bus.
    pub dbias: Option<u32>,
    /// RTC domain power control.
    pub pwc: u32,
    /// Digital domain power control.
    pub dig_pwc: u32,
    /// ROM and main RAM power down bit in `dig_pwc`, zero if the chip has
    /// none.
    pub rom0_pd_en: u32,
    /// EXT1 wakeup pin select.
    pub ext_wakeup1: u32,
    /// EXT1 status clear bit in `ext_wakeup1`.
    pub ext_wakeup1_status_clr: u32,
    /// Width of the EXT1 select field.
    pub ext_wakeup1_sel_width: u32,
    /// Pins that caused an EXT1 wakeup.
    pub ext_wakeup1_status: u32,
    /// RTC pad hold register (`HOLD_FORCE` on ESP32, `PAD_HOLD` elsewhere).
    pub pad_hold: u32,
}

impl RtcCntlLayout {
    /// Absolute address of a register offset.
    pub const fn reg(&self, offset: u32) -> u32 {
        self.base + offset
    }
}

/// Event task matrix of a chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EtmLayout {
    /// Absolute base address of `SOC_ETM`.
    pub soc_etm_base: u32,
    /// Absolute base address of `GPIO_EXT`.
    pub gpio_ext_base: u32,
    /// Number of ETM channels.
    pub channels: u8,
    /// Number of GPIO ETM event and task channels.
    pub gpio_channels: u8,
}

impl EtmLayout {
    /// Absolute address of the event id register of a channel.
    pub const fn evt_id_reg(&self, channel: u8) -> u32 {
        self.soc_etm_base + soc_etm_reg::CH0_EVT_ID + 8 * channel as u32
    }

    /// Absolute address of the task id register of a channel.
    pub const fn task_id_reg(&self, channel: u8) -> u32 {
        self.soc_etm_base + soc_etm_reg::CH0_TASK_ID + 8 * channel as u32
    }

    /// Absolute address of a `SOC_ETM` register offset.
    pub const fn reg(&self, offset: u32) -> u32 {
        self.soc_etm_base + offset
    }

    /// Absolute address of a `GPIO_EXT` register offset.
    pub const fn gpio_ext_reg(&self, offset: u32) -> u32 {
        self.gpio_ext_base + offset
    }
}

/// Pad layout shared by the ESP32-S2 and ESP32-S3: 22 pads, GPIO n is RTC IO
/// n, pad registers are contiguous from `TOUCH_PAD0` and hold is `PAD_HOLD`
/// bit n.
pub(crate) const fn touch_style_pads<const N: usize>(first_pad_reg: u32) -> [RtcioPadDesc; N] {
    let mut pads = [RtcioPadDesc {
        reg: 0,
        mux: 0,
        func: 0,
        ie: 0,
        pullup: 0,
        pulldown: 0,
        slpsel: 0,
        slpie: 0,
        slpoe: 0,
        hold: 0,
        hold_force: 0,
        drv_v: 0,
        drv_s: 0,
        rtc_num: 0,
        gpio_num: 0,
    }; N];

    let mut i = 0;
    while i < N {
        pads[i] = RtcioPadDesc {
            reg: first_pad_reg + 4 * i as u32,
            mux: 1 << 19,
            func: 17,
            ie: 1 << 13,
            pullup: 1 << 27,
            pulldown: 1 << 28,
            slpsel: 1 << 16,
            slpie: 1 << 15,
            slpoe: 1 << 14,
            hold: 0,
            hold_force: 1 << i,
            drv_v: 0x3,
            drv_s: 29,
            rtc_num: i as u8,
            gpio_num: i as u8,
        };
        i += 1;
    }

    pads
}
