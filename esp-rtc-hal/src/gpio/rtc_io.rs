//! RTC IO
//!
//! # Overview
//!
//! The hardware provides a couple of GPIO pins with low power (LP)
//! capabilities and analog functions. These pins can be controlled by
//! either IO MUX or RTC IO.
//!
//! If controlled by RTC IO, these pins will bypass IO MUX and GPIO
//! matrix for the use by ULP and peripherals in RTC system.
//!
//! When configured as RTC GPIOs, the pins can still be controlled by ULP or
//! the peripherals in RTC system during chip Deep-sleep, and wake up the
//! chip from Deep-sleep.
//!
//! [`RtcIo`] exposes the low-level accessors of every pad, addressed by GPIO
//! number. [`RtcPin`] wraps a single pad in a typed handle which implements
//! the `embedded-hal` digital traits. Each pad is handed out as an
//! [`RtcPin`] at most once.
//!
//! # Example
//! ```rust, no_run
//! # use esp_rtc_hal::{gpio::rtc_io::RtcIo, peripherals::Peripherals, reg_access::Mmio, soc::Chip};
//! let peripherals = Peripherals::take().unwrap();
//! let bus = unsafe { Mmio::steal() };
//! let mut rtc_io = RtcIo::new(peripherals.RTC_IO, &bus, Chip::Esp32s3).unwrap();
//! // GPIO 4 as a pulled-up input that keeps its state during deep sleep
//! let pin = rtc_io.pin(4).unwrap().into_pull_up_input().unwrap();
//! rtc_io.hold_enable(4).unwrap();
//! # let _ = pin;
//! ```

use core::marker::PhantomData;

use super::{Direction, DriveStrength, Error, Level, OutputMode, Pull, RtcFunction, RtcInterruptType};
use crate::{
    peripherals::RTC_IO,
    reg_access::RegisterAccess,
    soc::{Chip, RtcCntlLayout, RtcioLayout, RtcioPadDesc, rtcio_reg},
};

/// Low-level access to the RTC IO block.
pub struct RtcIo<'d, R> {
    regs: &'d R,
    chip: Chip,
    layout: &'static RtcioLayout,
    cntl: &'static RtcCntlLayout,
    // RTC IO channels handed out by `pin`
    taken: u32,
}

impl<'d, R: RegisterAccess> RtcIo<'d, R> {
    /// Create the driver.
    ///
    /// Fails with [`Error::Unsupported`] if the chip has no RTC IO block.
    pub fn new(_rtc_io: RTC_IO, regs: &'d R, chip: Chip) -> Result<Self, Error> {
        let (Some(layout), Some(cntl)) = (chip.rtcio_layout(), chip.rtc_cntl_layout()) else {
            return Err(Error::Unsupported);
        };

        Ok(Self {
            regs,
            chip,
            layout,
            cntl,
            taken: 0,
        })
    }

    /// The chip this driver was created for.
    pub fn chip(&self) -> Chip {
        self.chip
    }

    /// Typed handle for a single RTC GPIO.
    ///
    /// Fails with [`Error::AlreadyTaken`] if the pad was handed out before.
    pub fn pin(&mut self, gpio: u8) -> Result<RtcPin<'d, R, Unknown>, Error> {
        let pad = self.pad(gpio)?;
        let bit = 1 << pad.rtc_num;
        if self.taken & bit != 0 {
            return Err(Error::AlreadyTaken);
        }
        self.taken |= bit;

        Ok(RtcPin {
            io: self.accessor(),
            pad,
            _mode: PhantomData,
        })
    }

    // Register access for a pin. It cannot hand out further pins.
    fn accessor(&self) -> Self {
        Self {
            regs: self.regs,
            chip: self.chip,
            layout: self.layout,
            cntl: self.cntl,
            taken: u32::MAX,
        }
    }

    pub(crate) fn pad(&self, gpio: u8) -> Result<&'static RtcioPadDesc, Error> {
        self.layout
            .pads
            .iter()
            .find(|pad| pad.gpio_num == gpio)
            .ok_or(Error::InvalidPin)
    }

    fn pad_reg(&self, pad: &RtcioPadDesc) -> u32 {
        self.layout.reg(pad.reg)
    }

    fn gpio_bit(&self, pad: &RtcioPadDesc) -> u32 {
        1 << (pad.rtc_num as u32 + self.layout.gpio_shift)
    }

    /// RTC IO channel of a GPIO.
    pub fn rtc_io_number(&self, gpio: u8) -> Result<u8, Error> {
        Ok(self.pad(gpio)?.rtc_num)
    }

    /// Route the pad to RTC IO or back to IO MUX.
    pub fn function_select(&self, gpio: u8, func: RtcFunction) -> Result<(), Error> {
        let pad = self.pad(gpio)?;
        self.pad_function_select(pad, func);
        Ok(())
    }

    pub(crate) fn pad_function_select(&self, pad: &RtcioPadDesc, func: RtcFunction) {
        let reg = self.pad_reg(pad);
        match func {
            RtcFunction::Rtc => {
                self.regs.set_bits(reg, pad.mux);
                self.regs.write_field(
                    reg,
                    pad.func,
                    rtcio_reg::FUN_SEL_W,
                    rtcio_reg::FUNC_RTC_GPIO,
                );
            }
            RtcFunction::Digital => self.regs.clear_bits(reg, pad.mux),
        }
        trace!("RTC IO {}: function {:?}", pad.rtc_num, func);
    }

    /// Enable the output driver.
    pub fn output_enable(&self, gpio: u8) -> Result<(), Error> {
        let pad = self.pad(gpio)?;
        if !pad.has_sleep_output() {
            return Err(Error::Unsupported);
        }
        self.regs
            .write(self.layout.reg(rtcio_reg::ENABLE_W1TS), self.gpio_bit(pad));
        Ok(())
    }

    /// Disable the output driver.
    pub fn output_disable(&self, gpio: u8) -> Result<(), Error> {
        let pad = self.pad(gpio)?;
        self.pad_output_disable(pad);
        Ok(())
    }

    fn pad_output_disable(&self, pad: &RtcioPadDesc) {
        self.regs
            .write(self.layout.reg(rtcio_reg::ENABLE_W1TC), self.gpio_bit(pad));
    }

    /// Select push-pull or open-drain output.
    pub fn output_mode(&self, gpio: u8, mode: OutputMode) -> Result<(), Error> {
        let pad = self.pad(gpio)?;
        self.regs.set_bits_to(
            self.layout.pin_reg(pad.rtc_num),
            rtcio_reg::PIN_PAD_DRIVER,
            mode == OutputMode::OpenDrain,
        );
        Ok(())
    }

    /// Drive the output level.
    pub fn set_level(&self, gpio: u8, level: Level) -> Result<(), Error> {
        let pad = self.pad(gpio)?;
        let reg = match level {
            Level::High => rtcio_reg::OUT_W1TS,
            Level::Low => rtcio_reg::OUT_W1TC,
        };
        self.regs.write(self.layout.reg(reg), self.gpio_bit(pad));
        Ok(())
    }

    /// Read the input level.
    pub fn get_level(&self, gpio: u8) -> Result<Level, Error> {
        let pad = self.pad(gpio)?;
        Ok(self.pad_input_level(pad))
    }

    fn pad_input_level(&self, pad: &RtcioPadDesc) -> Level {
        let bits = self.regs.read(self.layout.reg(rtcio_reg::IN));
        Level::from(bits & self.gpio_bit(pad) != 0)
    }

    fn pad_output_level(&self, pad: &RtcioPadDesc) -> Level {
        let bits = self.regs.read(self.layout.reg(rtcio_reg::OUT));
        Level::from(bits & self.gpio_bit(pad) != 0)
    }

    /// Enable the input buffer.
    pub fn input_enable(&self, gpio: u8) -> Result<(), Error> {
        let pad = self.pad(gpio)?;
        self.pad_input_enable(pad);
        Ok(())
    }

    pub(crate) fn pad_input_enable(&self, pad: &RtcioPadDesc) {
        self.regs.set_bits(self.pad_reg(pad), pad.ie);
    }

    /// Disable the input buffer.
    pub fn input_disable(&self, gpio: u8) -> Result<(), Error> {
        let pad = self.pad(gpio)?;
        self.regs.clear_bits(self.pad_reg(pad), pad.ie);
        Ok(())
    }

    /// Enable the internal pull-up.
    ///
    /// Fails with [`Error::Unsupported`] on pads without one.
    pub fn pullup_enable(&self, gpio: u8) -> Result<(), Error> {
        let pad = self.pad(gpio)?;
        if !pad.has_pullup() {
            return Err(Error::Unsupported);
        }
        self.regs.set_bits(self.pad_reg(pad), pad.pullup);
        Ok(())
    }

    /// Disable the internal pull-up.
    pub fn pullup_disable(&self, gpio: u8) -> Result<(), Error> {
        let pad = self.pad(gpio)?;
        self.regs.clear_bits(self.pad_reg(pad), pad.pullup);
        Ok(())
    }

    /// Whether the internal pull-up is enabled.
    pub fn is_pullup_enabled(&self, gpio: u8) -> Result<bool, Error> {
        let pad = self.pad(gpio)?;
        Ok(pad.has_pullup() && self.regs.read(self.pad_reg(pad)) & pad.pullup != 0)
    }

    /// Enable the internal pull-down.
    ///
    /// Fails with [`Error::Unsupported`] on pads without one.
    pub fn pulldown_enable(&self, gpio: u8) -> Result<(), Error> {
        let pad = self.pad(gpio)?;
        if !pad.has_pulldown() {
            return Err(Error::Unsupported);
        }
        self.regs.set_bits(self.pad_reg(pad), pad.pulldown);
        Ok(())
    }

    /// Disable the internal pull-down.
    pub fn pulldown_disable(&self, gpio: u8) -> Result<(), Error> {
        let pad = self.pad(gpio)?;
        self.regs.clear_bits(self.pad_reg(pad), pad.pulldown);
        Ok(())
    }

    /// Whether the internal pull-down is enabled.
    pub fn is_pulldown_enabled(&self, gpio: u8) -> Result<bool, Error> {
        let pad = self.pad(gpio)?;
        Ok(pad.has_pulldown() && self.regs.read(self.pad_reg(pad)) & pad.pulldown != 0)
    }

    /// Configure both pull resistors at once.
    pub fn set_pull_mode(&self, gpio: u8, pull: Pull) -> Result<(), Error> {
        match pull {
            Pull::Up => {
                self.pulldown_disable(gpio)?;
                self.pullup_enable(gpio)
            }
            Pull::Down => {
                self.pullup_disable(gpio)?;
                self.pulldown_enable(gpio)
            }
            Pull::None => {
                self.pullup_disable(gpio)?;
                self.pulldown_disable(gpio)
            }
        }
    }

    /// Set the pad drive strength.
    pub fn set_drive_capability(&self, gpio: u8, strength: DriveStrength) -> Result<(), Error> {
        let pad = self.pad(gpio)?;
        if !pad.has_drive() {
            return Err(Error::Unsupported);
        }
        self.regs.write_field(
            self.pad_reg(pad),
            pad.drv_s,
            rtcio_reg::DRV_W,
            strength as u32 & pad.drv_v,
        );
        Ok(())
    }

    /// Read the pad drive strength.
    pub fn get_drive_capability(&self, gpio: u8) -> Result<DriveStrength, Error> {
        let pad = self.pad(gpio)?;
        if !pad.has_drive() {
            return Err(Error::Unsupported);
        }
        let bits = self
            .regs
            .read_field(self.pad_reg(pad), pad.drv_s, rtcio_reg::DRV_W);
        Ok(DriveStrength::from_bits(bits))
    }

    /// Configure the pad direction.
    pub fn set_direction(&self, gpio: u8, direction: Direction) -> Result<(), Error> {
        let (input, output, mode) = match direction {
            Direction::Disabled => (false, false, OutputMode::PushPull),
            Direction::Input => (true, false, OutputMode::PushPull),
            Direction::Output => (false, true, OutputMode::PushPull),
            Direction::OutputOpenDrain => (false, true, OutputMode::OpenDrain),
            Direction::InputOutput => (true, true, OutputMode::PushPull),
            Direction::InputOutputOpenDrain => (true, true, OutputMode::OpenDrain),
        };

        let pad = self.pad(gpio)?;
        if output && !pad.has_sleep_output() {
            return Err(Error::Unsupported);
        }

        self.output_mode(gpio, mode)?;
        if output {
            self.output_enable(gpio)?;
        } else {
            self.output_disable(gpio)?;
        }
        if input {
            self.input_enable(gpio)
        } else {
            self.input_disable(gpio)
        }
    }

    /// Apply the sleep configuration (`slpie`/`slpoe`) while sleeping.
    pub fn enable_sleep_setting(&self, gpio: u8) -> Result<(), Error> {
        let pad = self.pad(gpio)?;
        self.regs.set_bits(self.pad_reg(pad), pad.slpsel);
        Ok(())
    }

    /// Keep the active configuration while sleeping.
    pub fn disable_sleep_setting(&self, gpio: u8) -> Result<(), Error> {
        let pad = self.pad(gpio)?;
        self.regs.clear_bits(self.pad_reg(pad), pad.slpsel);
        Ok(())
    }

    /// Enable the input buffer during sleep.
    pub fn sleep_input_enable(&self, gpio: u8) -> Result<(), Error> {
        let pad = self.pad(gpio)?;
        self.regs.set_bits(self.pad_reg(pad), pad.slpie);
        Ok(())
    }

    /// Disable the input buffer during sleep.
    pub fn sleep_input_disable(&self, gpio: u8) -> Result<(), Error> {
        let pad = self.pad(gpio)?;
        self.regs.clear_bits(self.pad_reg(pad), pad.slpie);
        Ok(())
    }

    /// Enable the output driver during sleep.
    pub fn sleep_output_enable(&self, gpio: u8) -> Result<(), Error> {
        let pad = self.pad(gpio)?;
        if !pad.has_sleep_output() {
            return Err(Error::Unsupported);
        }
        self.regs.set_bits(self.pad_reg(pad), pad.slpoe);
        Ok(())
    }

    /// Disable the output driver during sleep.
    pub fn sleep_output_disable(&self, gpio: u8) -> Result<(), Error> {
        let pad = self.pad(gpio)?;
        self.regs.clear_bits(self.pad_reg(pad), pad.slpoe);
        Ok(())
    }

    /// Latch the current pad configuration and level.
    ///
    /// The latch survives deep sleep and lasts until [`Self::hold_disable`].
    pub fn hold_enable(&self, gpio: u8) -> Result<(), Error> {
        let pad = self.pad(gpio)?;
        self.pad_hold(pad, true);
        Ok(())
    }

    /// Release the latch of [`Self::hold_enable`].
    pub fn hold_disable(&self, gpio: u8) -> Result<(), Error> {
        let pad = self.pad(gpio)?;
        self.pad_hold(pad, false);
        Ok(())
    }

    fn pad_hold(&self, pad: &RtcioPadDesc, enable: bool) {
        if pad.hold != 0 {
            self.regs.set_bits_to(self.pad_reg(pad), pad.hold, enable);
        }
        self.regs
            .set_bits_to(self.cntl.reg(self.cntl.pad_hold), pad.hold_force, enable);
        debug!("RTC IO {}: hold {}", pad.rtc_num, enable);
    }

    /// Whether the pad is currently held.
    pub fn is_hold_enabled(&self, gpio: u8) -> Result<bool, Error> {
        let pad = self.pad(gpio)?;
        Ok(self.regs.read(self.cntl.reg(self.cntl.pad_hold)) & pad.hold_force != 0)
    }

    /// Hold every RTC pad.
    pub fn force_hold_all(&self) {
        self.regs.set_bits(
            self.cntl.reg(self.cntl.pad_hold),
            self.layout.hold_all_mask(),
        );
    }

    /// Release every RTC pad.
    pub fn force_unhold_all(&self) {
        self.regs.clear_bits(
            self.cntl.reg(self.cntl.pad_hold),
            self.layout.hold_all_mask(),
        );
    }

    /// Disconnect the pad from everything and hold it.
    ///
    /// Pulls, input and output are disabled, so the pad draws no current
    /// during deep sleep.
    pub fn isolate(&self, gpio: u8) -> Result<(), Error> {
        let pad = self.pad(gpio)?;
        let reg = self.pad_reg(pad);

        self.regs.clear_bits(reg, pad.pullup | pad.pulldown | pad.ie);
        self.pad_output_disable(pad);
        self.pad_hold(pad, true);
        Ok(())
    }

    /// Configure the interrupt trigger of a pad.
    pub fn set_interrupt_type(&self, gpio: u8, int_type: RtcInterruptType) -> Result<(), Error> {
        let pad = self.pad(gpio)?;
        self.regs.write_field(
            self.layout.pin_reg(pad.rtc_num),
            rtcio_reg::PIN_INT_TYPE_S,
            rtcio_reg::PIN_INT_TYPE_W,
            int_type as u32,
        );
        Ok(())
    }

    /// The interrupt trigger of a pad.
    pub fn interrupt_type(&self, gpio: u8) -> Result<RtcInterruptType, Error> {
        let pad = self.pad(gpio)?;
        let bits = self.regs.read_field(
            self.layout.pin_reg(pad.rtc_num),
            rtcio_reg::PIN_INT_TYPE_S,
            rtcio_reg::PIN_INT_TYPE_W,
        );
        Ok(RtcInterruptType::from_bits(bits))
    }

    /// Pending interrupts, one bit per RTC IO channel.
    pub fn interrupt_status(&self) -> u32 {
        let channels = self.layout.pads.len() as u32;
        (self.regs.read(self.layout.reg(rtcio_reg::STATUS)) >> self.layout.gpio_shift)
            & ((1 << channels) - 1)
    }

    /// Clear pending interrupts, one bit per RTC IO channel.
    pub fn clear_interrupt_status(&self, mask: u32) {
        self.regs.write(
            self.layout.reg(rtcio_reg::STATUS_W1TC),
            mask << self.layout.gpio_shift,
        );
    }

    /// Whether an interrupt is pending on a pad.
    pub fn is_interrupt_pending(&self, gpio: u8) -> Result<bool, Error> {
        let pad = self.pad(gpio)?;
        Ok(self.interrupt_status() & (1 << pad.rtc_num) != 0)
    }

    /// Clear the pending interrupt of a pad.
    pub fn clear_interrupt(&self, gpio: u8) -> Result<(), Error> {
        let pad = self.pad(gpio)?;
        self.clear_interrupt_status(1 << pad.rtc_num);
        Ok(())
    }

    /// Let a level on the pad wake the chip from light sleep.
    pub fn wakeup_enable(&self, gpio: u8, int_type: RtcInterruptType) -> Result<(), Error> {
        if !int_type.is_level() {
            return Err(Error::EdgeTriggeringNotSupported);
        }
        let pad = self.pad(gpio)?;
        let reg = self.layout.pin_reg(pad.rtc_num);

        self.regs.write_field(
            reg,
            rtcio_reg::PIN_INT_TYPE_S,
            rtcio_reg::PIN_INT_TYPE_W,
            int_type as u32,
        );
        self.regs.set_bits(reg, rtcio_reg::PIN_WAKEUP_ENABLE);
        Ok(())
    }

    /// Undo [`Self::wakeup_enable`].
    pub fn wakeup_disable(&self, gpio: u8) -> Result<(), Error> {
        let pad = self.pad(gpio)?;
        let reg = self.layout.pin_reg(pad.rtc_num);

        self.regs.clear_bits(reg, rtcio_reg::PIN_WAKEUP_ENABLE);
        self.regs.write_field(
            reg,
            rtcio_reg::PIN_INT_TYPE_S,
            rtcio_reg::PIN_INT_TYPE_W,
            RtcInterruptType::Disabled as u32,
        );
        Ok(())
    }

    /// Select the pad monitored by the EXT0 wakeup source.
    pub fn select_ext0(&self, gpio: u8) -> Result<(), Error> {
        let pad = self.pad(gpio)?;
        self.pad_select_ext0(pad);
        Ok(())
    }

    pub(crate) fn pad_select_ext0(&self, pad: &RtcioPadDesc) {
        self.regs.write_field(
            self.layout.reg(self.layout.ext_wakeup0),
            rtcio_reg::EXT_WAKEUP0_SEL_S,
            rtcio_reg::EXT_WAKEUP0_SEL_W,
            pad.rtc_num as u32,
        );
    }
}

/// Pin mode marker: not configured yet.
#[non_exhaustive]
pub struct Unknown;

/// Pin mode marker: input.
#[non_exhaustive]
pub struct Input;

/// Pin mode marker: push-pull output.
#[non_exhaustive]
pub struct Output;

/// Pin mode marker: open-drain output with input enabled.
#[non_exhaustive]
pub struct OpenDrain;

/// A GPIO pin configured for RTC IO operation
pub struct RtcPin<'d, R, MODE> {
    pub(crate) io: RtcIo<'d, R>,
    pub(crate) pad: &'static RtcioPadDesc,
    _mode: PhantomData<MODE>,
}

impl<R, MODE> crate::private::Sealed for RtcPin<'_, R, MODE> {}

impl<'d, R: RegisterAccess, MODE> RtcPin<'d, R, MODE> {
    /// GPIO number.
    pub fn number(&self) -> u8 {
        self.pad.gpio_num
    }

    /// RTC IO channel.
    pub fn rtc_number(&self) -> u8 {
        self.pad.rtc_num
    }

    fn into_mode<NEW>(self) -> RtcPin<'d, R, NEW> {
        RtcPin {
            io: self.io,
            pad: self.pad,
            _mode: PhantomData,
        }
    }

    fn configure_input(&self, pull: Pull) -> Result<(), Error> {
        let gpio = self.pad.gpio_num;
        self.io.pad_function_select(self.pad, RtcFunction::Rtc);
        self.io.set_direction(gpio, Direction::Input)?;
        self.io.set_pull_mode(gpio, pull)
    }

    /// Configures the pin as an input with the internal pull-up resistor
    /// enabled.
    pub fn into_pull_up_input(self) -> Result<RtcPin<'d, R, Input>, Error> {
        self.configure_input(Pull::Up)?;
        Ok(self.into_mode())
    }

    /// Configures the pin as an input with the internal pull-down resistor
    /// enabled.
    pub fn into_pull_down_input(self) -> Result<RtcPin<'d, R, Input>, Error> {
        self.configure_input(Pull::Down)?;
        Ok(self.into_mode())
    }

    /// Configures the pin as a floating input pin.
    pub fn into_floating_input(self) -> Result<RtcPin<'d, R, Input>, Error> {
        self.configure_input(Pull::None)?;
        Ok(self.into_mode())
    }

    /// Configures the pin as an output pin.
    pub fn into_push_pull_output(self) -> Result<RtcPin<'d, R, Output>, Error> {
        self.io.pad_function_select(self.pad, RtcFunction::Rtc);
        self.io.set_direction(self.pad.gpio_num, Direction::Output)?;
        Ok(self.into_mode())
    }

    /// Configures the pin as an pullup input and an open drain output pin.
    pub fn into_open_drain_output(self) -> Result<RtcPin<'d, R, OpenDrain>, Error> {
        let gpio = self.pad.gpio_num;
        self.io.pad_function_select(self.pad, RtcFunction::Rtc);
        self.io.set_direction(gpio, Direction::InputOutputOpenDrain)?;
        self.io.set_pull_mode(gpio, Pull::Up)?;
        Ok(self.into_mode())
    }

    /// Hand the pad back to IO MUX.
    pub fn into_digital(self) {
        self.io.pad_function_select(self.pad, RtcFunction::Digital);
    }
}

impl<R: RegisterAccess> RtcPin<'_, R, Input> {
    /// Read the input level.
    pub fn level(&self) -> Level {
        self.io.pad_input_level(self.pad)
    }
}

impl<R: RegisterAccess> RtcPin<'_, R, Output> {
    /// Drive the output level.
    pub fn set_level(&mut self, level: Level) {
        self.drive(level)
    }

    /// The level the pin is driving.
    pub fn output_level(&self) -> Level {
        self.io.pad_output_level(self.pad)
    }
}

impl<R: RegisterAccess> RtcPin<'_, R, OpenDrain> {
    /// Release (high) or pull the line low.
    pub fn set_level(&mut self, level: Level) {
        self.drive(level)
    }

    /// Read the line level.
    pub fn level(&self) -> Level {
        self.io.pad_input_level(self.pad)
    }

    /// The level the pin is driving.
    pub fn output_level(&self) -> Level {
        self.io.pad_output_level(self.pad)
    }
}

impl<R: RegisterAccess, MODE> RtcPin<'_, R, MODE> {
    fn drive(&self, level: Level) {
        let reg = match level {
            Level::High => rtcio_reg::OUT_W1TS,
            Level::Low => rtcio_reg::OUT_W1TC,
        };
        self.io
            .regs
            .write(self.io.layout.reg(reg), self.io.gpio_bit(self.pad));
    }
}

#[cfg(feature = "embedded-hal")]
mod ehal1 {
    use embedded_hal::digital::{ErrorType, InputPin, OutputPin, StatefulOutputPin};

    use super::*;

    impl<R, MODE> ErrorType for RtcPin<'_, R, MODE> {
        type Error = core::convert::Infallible;
    }

    impl<R: RegisterAccess> InputPin for RtcPin<'_, R, Input> {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self.level() == Level::High)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.is_high()?)
        }
    }

    impl<R: RegisterAccess> InputPin for RtcPin<'_, R, OpenDrain> {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self.level() == Level::High)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.is_high()?)
        }
    }

    impl<R: RegisterAccess> OutputPin for RtcPin<'_, R, Output> {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.set_level(Level::Low);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.set_level(Level::High);
            Ok(())
        }
    }

    impl<R: RegisterAccess> OutputPin for RtcPin<'_, R, OpenDrain> {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.set_level(Level::Low);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.set_level(Level::High);
            Ok(())
        }
    }

    impl<R: RegisterAccess> StatefulOutputPin for RtcPin<'_, R, Output> {
        fn is_set_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self.output_level() == Level::High)
        }

        fn is_set_low(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.is_set_high()?)
        }
    }

    impl<R: RegisterAccess> StatefulOutputPin for RtcPin<'_, R, OpenDrain> {
        fn is_set_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self.output_level() == Level::High)
        }

        fn is_set_low(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.is_set_high()?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::FakeRegisters;

    const ESP32_RTCIO: u32 = 0x3ff4_8400;
    const ESP32_HOLD_FORCE: u32 = 0x3ff4_8000 + 0xc8;
    const S3_RTCIO: u32 = 0x6000_8400;
    const S3_PAD_HOLD: u32 = 0x6000_8000 + 0xd8;

    fn new_io(regs: &FakeRegisters, chip: Chip) -> Result<RtcIo<'_, FakeRegisters>, Error> {
        RtcIo::new(unsafe { RTC_IO::steal() }, regs, chip)
    }

    #[test]
    fn unsupported_chip_and_pin() {
        let regs = FakeRegisters::for_chip(Chip::Esp32c6);
        assert_eq!(new_io(&regs, Chip::Esp32c6).err(), Some(Error::Unsupported));

        let regs = FakeRegisters::for_chip(Chip::Esp32);
        let mut io = new_io(&regs, Chip::Esp32).unwrap();
        assert_eq!(io.output_enable(5), Err(Error::InvalidPin));
        assert!(io.pin(16).is_err());
    }

    #[test]
    fn esp32_touch_pad_function_and_pulls() {
        let regs = FakeRegisters::for_chip(Chip::Esp32);
        let io = new_io(&regs, Chip::Esp32).unwrap();
        // GPIO 4 is TOUCH_PAD0
        let reg = ESP32_RTCIO + 0x94;
        regs.preset(reg, 0x3 << 17);

        io.function_select(4, RtcFunction::Rtc).unwrap();
        assert_eq!(regs.read(reg), 1 << 19);

        io.pullup_enable(4).unwrap();
        assert!(io.is_pullup_enabled(4).unwrap());
        assert!(!io.is_pulldown_enabled(4).unwrap());
        io.set_pull_mode(4, Pull::Down).unwrap();
        assert_eq!(regs.read(reg) & (0x3 << 27), 1 << 28);

        io.function_select(4, RtcFunction::Digital).unwrap();
        assert_eq!(regs.read(reg) & (1 << 19), 0);
    }

    #[test]
    fn esp32_input_only_pads_reject_pull_and_output() {
        let regs = FakeRegisters::for_chip(Chip::Esp32);
        let io = new_io(&regs, Chip::Esp32).unwrap();

        assert_eq!(io.pullup_enable(36), Err(Error::Unsupported));
        assert_eq!(io.pulldown_enable(39), Err(Error::Unsupported));
        assert_eq!(io.output_enable(34), Err(Error::Unsupported));
        assert_eq!(io.get_drive_capability(35), Err(Error::Unsupported));
        assert_eq!(io.set_pull_mode(36, Pull::None), Ok(()));
        assert_eq!(io.is_pullup_enabled(36), Ok(false));
    }

    #[test]
    fn level_uses_shifted_channel_bits() {
        let regs = FakeRegisters::for_chip(Chip::Esp32);
        let io = new_io(&regs, Chip::Esp32).unwrap();
        // GPIO 27 is RTC IO 17, data bits start at 14
        let bit = 1 << (17 + 14);

        io.output_enable(27).unwrap();
        assert_eq!(regs.read(ESP32_RTCIO + rtcio_reg::ENABLE), bit);
        io.set_level(27, Level::High).unwrap();
        assert_eq!(regs.read(ESP32_RTCIO + rtcio_reg::OUT), bit);
        io.set_level(27, Level::Low).unwrap();
        assert_eq!(regs.read(ESP32_RTCIO + rtcio_reg::OUT), 0);

        regs.preset(ESP32_RTCIO + rtcio_reg::IN, bit);
        assert_eq!(io.get_level(27), Ok(Level::High));
        assert_eq!(io.get_level(14), Ok(Level::Low));
    }

    #[test]
    fn esp32_dac_drive_strength() {
        let regs = FakeRegisters::for_chip(Chip::Esp32);
        let io = new_io(&regs, Chip::Esp32).unwrap();

        io.set_drive_capability(25, DriveStrength::_20mA).unwrap();
        assert_eq!(regs.read(ESP32_RTCIO + 0x84), 2 << 30);
        assert_eq!(io.get_drive_capability(25), Ok(DriveStrength::_20mA));
    }

    #[test]
    fn esp32_hold_sets_pad_bit_and_hold_force() {
        let regs = FakeRegisters::for_chip(Chip::Esp32);
        let io = new_io(&regs, Chip::Esp32).unwrap();

        // GPIO 32 is 32K_P: pad hold bit 24, hold force bit 16
        io.hold_enable(32).unwrap();
        assert_eq!(regs.read(ESP32_RTCIO + 0x8c), 1 << 24);
        assert_eq!(regs.read(ESP32_HOLD_FORCE), 1 << 16);
        assert!(io.is_hold_enabled(32).unwrap());

        io.hold_disable(32).unwrap();
        assert_eq!(regs.read(ESP32_RTCIO + 0x8c), 0);
        assert!(!io.is_hold_enabled(32).unwrap());

        io.force_hold_all();
        assert_eq!(regs.read(ESP32_HOLD_FORCE), 0x3_ffff);
        io.force_unhold_all();
        assert_eq!(regs.read(ESP32_HOLD_FORCE), 0);
    }

    #[test]
    fn s3_hold_uses_pad_hold_bit_n() {
        let regs = FakeRegisters::for_chip(Chip::Esp32s3);
        let io = new_io(&regs, Chip::Esp32s3).unwrap();

        io.hold_enable(21).unwrap();
        assert_eq!(regs.read(S3_PAD_HOLD), 1 << 21);
        assert_eq!(regs.read(S3_RTCIO + 0x84 + 4 * 21), 0);
    }

    #[test]
    fn isolate_disconnects_and_holds() {
        let regs = FakeRegisters::for_chip(Chip::Esp32s3);
        let mut io = new_io(&regs, Chip::Esp32s3).unwrap();
        let pad = S3_RTCIO + 0x84 + 4 * 3;

        io.pin(3).unwrap().into_pull_up_input().unwrap();
        io.output_enable(3).unwrap();
        io.isolate(3).unwrap();

        assert_eq!(regs.read(pad) & ((1 << 27) | (1 << 28) | (1 << 13)), 0);
        assert_eq!(regs.read(S3_RTCIO + rtcio_reg::ENABLE), 0);
        assert!(io.is_hold_enabled(3).unwrap());
    }

    #[test]
    fn interrupt_type_status_and_clear() {
        let regs = FakeRegisters::for_chip(Chip::Esp32s3);
        let io = new_io(&regs, Chip::Esp32s3).unwrap();

        io.set_interrupt_type(6, RtcInterruptType::NegEdge).unwrap();
        assert_eq!(regs.read(S3_RTCIO + rtcio_reg::PIN0 + 4 * 6), 2 << 7);
        assert_eq!(io.interrupt_type(6), Ok(RtcInterruptType::NegEdge));

        regs.write(S3_RTCIO + rtcio_reg::STATUS_W1TS, (1 << 6) << 10);
        assert_eq!(io.interrupt_status(), 1 << 6);
        assert!(io.is_interrupt_pending(6).unwrap());

        io.clear_interrupt(6).unwrap();
        assert_eq!(io.interrupt_status(), 0);
    }

    #[test]
    fn wakeup_requires_level_trigger() {
        let regs = FakeRegisters::for_chip(Chip::Esp32);
        let io = new_io(&regs, Chip::Esp32).unwrap();
        let pin_reg = ESP32_RTCIO + rtcio_reg::PIN0 + 4 * 11;

        assert_eq!(
            io.wakeup_enable(0, RtcInterruptType::AnyEdge),
            Err(Error::EdgeTriggeringNotSupported)
        );
        io.wakeup_enable(0, RtcInterruptType::LowLevel).unwrap();
        assert_eq!(regs.read(pin_reg), (4 << 7) | rtcio_reg::PIN_WAKEUP_ENABLE);

        io.wakeup_disable(0).unwrap();
        assert_eq!(regs.read(pin_reg), 0);
    }

    #[test]
    fn ext0_select_writes_rtc_number() {
        let regs = FakeRegisters::for_chip(Chip::Esp32);
        let io = new_io(&regs, Chip::Esp32).unwrap();

        io.select_ext0(27).unwrap();
        assert_eq!(regs.read(ESP32_RTCIO + 0xbc), 17 << 27);
    }

    #[test]
    fn typed_pins_drive_and_read() {
        let regs = FakeRegisters::for_chip(Chip::Esp32s2);
        let mut io = new_io(&regs, Chip::Esp32s2).unwrap();

        let mut out = io.pin(8).unwrap().into_push_pull_output().unwrap();
        out.set_level(Level::High);
        assert_eq!(out.output_level(), Level::High);
        out.set_level(Level::Low);
        assert_eq!(out.output_level(), Level::Low);

        let od = io.pin(9).unwrap().into_open_drain_output().unwrap();
        let pin_reg = 0x3f40_8400 + rtcio_reg::PIN0 + 4 * 9;
        assert_ne!(regs.read(pin_reg) & rtcio_reg::PIN_PAD_DRIVER, 0);
        assert!(io.is_pullup_enabled(9).unwrap());
        assert_eq!(od.rtc_number(), 9);
    }

    #[test]
    fn pins_are_handed_out_once() {
        let regs = FakeRegisters::for_chip(Chip::Esp32s3);
        let mut io = new_io(&regs, Chip::Esp32s3).unwrap();

        let pin = io.pin(4).unwrap();
        assert_eq!(io.pin(4).err(), Some(Error::AlreadyTaken));
        assert!(io.pin(5).is_ok());

        pin.into_digital();
        assert_eq!(io.pin(4).err(), Some(Error::AlreadyTaken));
    }

    #[test]
    fn esp32_touch_pad_sleep_settings() {
        let regs = FakeRegisters::for_chip(Chip::Esp32);
        let io = new_io(&regs, Chip::Esp32).unwrap();
        let reg = ESP32_RTCIO + 0x94;

        io.enable_sleep_setting(4).unwrap();
        assert_eq!(regs.read(reg), 1 << 16);
        io.sleep_input_enable(4).unwrap();
        assert_eq!(regs.read(reg), (1 << 16) | (1 << 15));
        io.sleep_output_enable(4).unwrap();
        assert_eq!(regs.read(reg), (1 << 16) | (1 << 15) | (1 << 14));

        io.sleep_output_disable(4).unwrap();
        assert_eq!(regs.read(reg), (1 << 16) | (1 << 15));
        io.sleep_input_disable(4).unwrap();
        io.disable_sleep_setting(4).unwrap();
        assert_eq!(regs.read(reg), 0);
    }

    #[test]
    fn s3_pad_sleep_settings() {
        let regs = FakeRegisters::for_chip(Chip::Esp32s3);
        let io = new_io(&regs, Chip::Esp32s3).unwrap();
        let reg = S3_RTCIO + 0x84 + 4 * 7;

        io.enable_sleep_setting(7).unwrap();
        io.sleep_output_enable(7).unwrap();
        assert_eq!(regs.read(reg), (1 << 16) | (1 << 14));
        io.sleep_input_enable(7).unwrap();
        io.sleep_output_disable(7).unwrap();
        assert_eq!(regs.read(reg), (1 << 16) | (1 << 15));
        io.disable_sleep_setting(7).unwrap();
        io.sleep_input_disable(7).unwrap();
        assert_eq!(regs.read(reg), 0);
    }

    #[test]
    fn esp32_input_only_pads_have_no_sleep_output() {
        let regs = FakeRegisters::for_chip(Chip::Esp32);
        let io = new_io(&regs, Chip::Esp32).unwrap();

        assert_eq!(io.sleep_output_enable(36), Err(Error::Unsupported));
        assert_eq!(io.sleep_output_disable(36), Ok(()));
        assert_eq!(io.sleep_input_enable(36), Ok(()));
    }

    #[test]
    fn output_direction_on_input_only_pad_writes_nothing() {
        let regs = FakeRegisters::for_chip(Chip::Esp32);
        let io = new_io(&regs, Chip::Esp32).unwrap();
        // GPIO 34 is RTC IO 4
        let pin_reg = ESP32_RTCIO + rtcio_reg::PIN0 + 4 * 4;

        assert_eq!(
            io.set_direction(34, Direction::OutputOpenDrain),
            Err(Error::Unsupported)
        );
        assert_eq!(regs.read(pin_reg) & rtcio_reg::PIN_PAD_DRIVER, 0);
        assert_eq!(regs.writes_to(pin_reg), 0);
        assert_eq!(io.set_direction(34, Direction::Input), Ok(()));
    }

    #[test]
    fn floating_input_and_back_to_digital() {
        let regs = FakeRegisters::for_chip(Chip::Esp32s3);
        let mut io = new_io(&regs, Chip::Esp32s3).unwrap();
        let reg = S3_RTCIO + 0x84 + 4 * 2;
        regs.preset(reg, (1 << 27) | (1 << 28));

        let input = io.pin(2).unwrap().into_floating_input().unwrap();
        assert_eq!(regs.read(reg) & ((1 << 27) | (1 << 28)), 0);
        assert_ne!(regs.read(reg) & (1 << 19), 0);
        assert_ne!(regs.read(reg) & (1 << 13), 0);

        regs.preset(S3_RTCIO + rtcio_reg::IN, (1 << 2) << 10);
        assert_eq!(input.level(), Level::High);

        input.into_digital();
        assert_eq!(regs.read(reg) & (1 << 19), 0);
    }
}
