//! # Event Task Matrix (ETM)
//!
//! ## Overview
//!
//! Normally, if a peripheral X needs to notify peripheral Y of a particular
//! event, this could only be done via a CPU interrupt from peripheral X, where
//! the CPU notifies peripheral Y on behalf of peripheral X. However, in
//! time-critical applications, the latency introduced by CPU interrupts is
//! non-negligible.
//!
//! With the help of the Event Task Matrix (ETM) module, some peripherals can
//! directly notify other peripherals of events through pre-set connections
//! without the intervention of CPU interrupts. This allows precise and low
//! latency synchronization between peripherals, and lessens the CPU's workload
//! as the CPU no longer needs to handle these events.
//!
//! The ETM module has multiple programmable channels, they are used to connect
//! a particular Event to a particular Task. When an event is activated, the ETM
//! channel will trigger the corresponding task automatically.
//!
//! ## Examples
//! ```rust, no_run
//! # use esp_rtc_hal::{etm::Etm, gpio::etm::GpioEtmChannels, peripherals::Peripherals, reg_access::Mmio, soc::Chip};
//! let peripherals = Peripherals::take().unwrap();
//! let bus = unsafe { Mmio::steal() };
//!
//! // toggle GPIO 1 on every falling edge of GPIO 9
//! let gpio_ext = GpioEtmChannels::new(peripherals.GPIO_SD, &bus, Chip::Esp32c6).unwrap();
//! let led_task = gpio_ext.channel0_task.toggle(1).unwrap();
//! let button_event = gpio_ext.channel0_event.falling_edge(9).unwrap();
//!
//! let etm = Etm::new(peripherals.SOC_ETM, &bus, Chip::Esp32c6).unwrap();
//! let channel0 = etm.channel0;
//!
//! // make sure the configured channel doesn't get dropped - dropping it will
//! // disable the channel
//! let _configured_channel = channel0.setup(&button_event, &led_task);
//!
//! // the LED is controlled by the button without involving the CPU
//! loop {}
//! ```

use core::fmt::Display;

use crate::{
    peripherals::SOC_ETM,
    reg_access::RegisterAccess,
    soc::{Chip, EtmLayout, soc_etm_reg},
};

/// Event and task ids of the ESP32-C6 matrix.
pub mod id {
    /// GPIO ETM event channel 0, rising edge. Channels 1 to 7 follow.
    pub const GPIO_EVT_CH0_RISE_EDGE: u8 = 1;
    /// GPIO ETM event channel 0, falling edge. Channels 1 to 7 follow.
    pub const GPIO_EVT_CH0_FALL_EDGE: u8 = 9;
    /// GPIO ETM event channel 0, any edge. Channels 1 to 7 follow.
    pub const GPIO_EVT_CH0_ANY_EDGE: u8 = 17;
    /// Timer group 0, timer 0 alarm. Timer group 1 follows.
    pub const TG0_EVT_CNT_CMP_TIMER0: u8 = 48;
    /// System timer comparator 0 alarm. Comparators 1 and 2 follow.
    pub const SYSTIMER_EVT_CNT_CMP0: u8 = 50;

    /// GPIO ETM task channel 0, set. Channels 1 to 7 follow.
    pub const GPIO_TASK_CH0_SET: u8 = 1;
    /// GPIO ETM task channel 0, clear. Channels 1 to 7 follow.
    pub const GPIO_TASK_CH0_CLEAR: u8 = 9;
    /// GPIO ETM task channel 0, toggle. Channels 1 to 7 follow.
    pub const GPIO_TASK_CH0_TOGGLE: u8 = 17;
    /// Timer group 0, timer 0 counter start. Timer group 1 follows.
    pub const TG0_TASK_CNT_START_TIMER0: u8 = 88;
    /// Timer group 0, timer 0 alarm start. Timer group 1 follows.
    pub const TG0_TASK_ALARM_START_TIMER0: u8 = 90;
    /// Timer group 0, timer 0 counter stop. Timer group 1 follows.
    pub const TG0_TASK_CNT_STOP_TIMER0: u8 = 92;
    /// Timer group 0, timer 0 counter reload. Timer group 1 follows.
    pub const TG0_TASK_CNT_RELOAD_TIMER0: u8 = 94;
    /// Timer group 0, timer 0 counter capture. Timer group 1 follows.
    pub const TG0_TASK_CNT_CAP_TIMER0: u8 = 96;
}

/// Errors of the event task matrix drivers.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// The chip has no event task matrix.
    Unsupported,
    /// The GPIO does not exist.
    InvalidPin,
    /// Id 0 means "no event" / "no task".
    InvalidId,
    /// The timer or comparator does not exist.
    InvalidTimer,
}

impl Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Unsupported => write!(f, "The chip has no event task matrix"),
            Error::InvalidPin => write!(f, "The GPIO does not exist"),
            Error::InvalidId => write!(f, "Event and task ids start at 1"),
            Error::InvalidTimer => write!(f, "The timer does not exist"),
        }
    }
}

impl core::error::Error for Error {}

/// Unconfigured EtmChannel.
#[non_exhaustive]
pub struct EtmChannel<'d, R, const C: u8> {
    regs: &'d R,
    layout: &'static EtmLayout,
}

impl<'d, R: RegisterAccess, const C: u8> EtmChannel<'d, R, C> {
    /// Setup the channel
    ///
    /// Enabled the channel and configures the assigned event and task.
    pub fn setup<'a, E, T>(self, event: &'a E, task: &'a T) -> EtmConfiguredChannel<'a, R, E, T, C>
    where
        'd: 'a,
        E: EtmEvent,
        T: EtmTask,
    {
        self.regs.write_field(
            self.layout.evt_id_reg(C),
            0,
            soc_etm_reg::ID_W,
            event.id() as u32,
        );
        self.regs.write_field(
            self.layout.task_id_reg(C),
            0,
            soc_etm_reg::ID_W,
            task.id() as u32,
        );
        if C < 32 {
            self.regs
                .write(self.layout.reg(soc_etm_reg::CH_ENA_AD0_SET), 1 << C);
        } else {
            self.regs
                .write(self.layout.reg(soc_etm_reg::CH_ENA_AD1_SET), 1 << (C - 32));
        }
        debug!("ETM channel {}: event {} -> task {}", C, event.id(), task.id());

        EtmConfiguredChannel {
            regs: self.regs,
            layout: self.layout,
            _event: event,
            _task: task,
        }
    }
}

fn disable_channel<R: RegisterAccess>(regs: &R, layout: &EtmLayout, channel: u8) {
    if channel < 32 {
        regs.write(layout.reg(soc_etm_reg::CH_ENA_AD0_CLR), 1 << channel);
    } else {
        regs.write(layout.reg(soc_etm_reg::CH_ENA_AD1_CLR), 1 << (channel - 32));
    }
}

fn is_channel_enabled<R: RegisterAccess>(regs: &R, layout: &EtmLayout, channel: u8) -> bool {
    if channel < 32 {
        regs.read(layout.reg(soc_etm_reg::CH_ENA_AD0)) & (1 << channel) != 0
    } else {
        regs.read(layout.reg(soc_etm_reg::CH_ENA_AD1)) & (1 << (channel - 32)) != 0
    }
}

/// A readily configured channel
///
/// The channel is enabled and event and task are configured.
#[non_exhaustive]
pub struct EtmConfiguredChannel<'a, R, E, T, const C: u8>
where
    R: RegisterAccess,
    E: EtmEvent,
    T: EtmTask,
{
    regs: &'a R,
    layout: &'static EtmLayout,
    _event: &'a E,
    _task: &'a T,
}

impl<R, E, T, const C: u8> EtmConfiguredChannel<'_, R, E, T, C>
where
    R: RegisterAccess,
    E: EtmEvent,
    T: EtmTask,
{
    /// Whether the hardware reports the channel as enabled.
    pub fn is_enabled(&self) -> bool {
        is_channel_enabled(self.regs, self.layout, C)
    }
}

impl<R, E, T, const C: u8> Drop for EtmConfiguredChannel<'_, R, E, T, C>
where
    R: RegisterAccess,
    E: EtmEvent,
    T: EtmTask,
{
    fn drop(&mut self) {
        debug!("drop {}", C);
        disable_channel(self.regs, self.layout, C);
    }
}

macro_rules! create_etm {
    ($($num:literal),+) => {
        paste::paste! {
            /// ETM Instance
            ///
            /// Provides access to all the [EtmChannel]
            #[allow(missing_docs)]
            pub struct Etm<'d, R> {
                $(pub [< channel $num >]: EtmChannel<'d, R, $num>,)+
            }

            impl<'d, R: RegisterAccess> Etm<'d, R> {
                /// Enable the ETM clock and hand out its channels.
                pub fn new(_etm: SOC_ETM, regs: &'d R, chip: Chip) -> Result<Self, Error> {
                    let layout = chip.etm_layout().ok_or(Error::Unsupported)?;

                    regs.set_bits(layout.reg(soc_etm_reg::CLK_EN), 1);

                    Ok(Self {
                        $([< channel $num >]: EtmChannel { regs, layout },)+
                    })
                }
            }
        }
    };
}

create_etm!(
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25,
    26, 27, 28, 29, 30, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40, 41, 42, 43, 44, 45, 46, 47, 48, 49
);

/// An ETM event source.
pub trait EtmEvent: crate::private::Sealed {
    /// The id routed into `CHn_EVT_ID`.
    fn id(&self) -> u8;
}

/// An ETM task sink.
pub trait EtmTask: crate::private::Sealed {
    /// The id routed into `CHn_TASK_ID`.
    fn id(&self) -> u8;
}

/// Any event from the [`id`] table.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EtmEventId(u8);

impl EtmEventId {
    /// Wrap a raw event id.
    pub fn new(id: u8) -> Result<Self, Error> {
        if id == 0 {
            return Err(Error::InvalidId);
        }
        Ok(Self(id))
    }
}

impl crate::private::Sealed for EtmEventId {}

impl EtmEvent for EtmEventId {
    fn id(&self) -> u8 {
        self.0
    }
}

/// Any task from the [`id`] table.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EtmTaskId(u8);

impl EtmTaskId {
    /// Wrap a raw task id.
    pub fn new(id: u8) -> Result<Self, Error> {
        if id == 0 {
            return Err(Error::InvalidId);
        }
        Ok(Self(id))
    }
}

impl crate::private::Sealed for EtmTaskId {}

impl EtmTask for EtmTaskId {
    fn id(&self) -> u8 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::FakeRegisters;

    const SOC_ETM_BASE: u32 = 0x6001_3000;

    fn new_etm(regs: &FakeRegisters, chip: Chip) -> Result<Etm<'_, FakeRegisters>, Error> {
        Etm::new(unsafe { SOC_ETM::steal() }, regs, chip)
    }

    #[test]
    fn requires_c6() {
        let regs = FakeRegisters::for_chip(Chip::Esp32s3);
        assert!(matches!(new_etm(&regs, Chip::Esp32s3), Err(Error::Unsupported)));
    }

    #[test]
    fn new_enables_clock() {
        let regs = FakeRegisters::for_chip(Chip::Esp32c6);
        let _etm = new_etm(&regs, Chip::Esp32c6).unwrap();
        assert_eq!(regs.read(SOC_ETM_BASE + soc_etm_reg::CLK_EN), 1);
    }

    #[test]
    fn setup_low_channel_and_drop() {
        let regs = FakeRegisters::for_chip(Chip::Esp32c6);
        let etm = new_etm(&regs, Chip::Esp32c6).unwrap();
        let event = EtmEventId::new(id::GPIO_EVT_CH0_RISE_EDGE).unwrap();
        let task = EtmTaskId::new(id::GPIO_TASK_CH0_TOGGLE + 2).unwrap();

        let configured = etm.channel3.setup(&event, &task);
        assert_eq!(regs.read(SOC_ETM_BASE + 0x18 + 8 * 3), 1);
        assert_eq!(regs.read(SOC_ETM_BASE + 0x1c + 8 * 3), 19);
        assert_eq!(regs.read(SOC_ETM_BASE + soc_etm_reg::CH_ENA_AD0), 1 << 3);
        assert!(configured.is_enabled());

        drop(configured);
        assert_eq!(regs.read(SOC_ETM_BASE + soc_etm_reg::CH_ENA_AD0), 0);
        assert_eq!(
            regs.last_write(SOC_ETM_BASE + soc_etm_reg::CH_ENA_AD0_CLR),
            Some(1 << 3)
        );
    }

    #[test]
    fn high_channels_use_second_enable_register() {
        let regs = FakeRegisters::for_chip(Chip::Esp32c6);
        let etm = new_etm(&regs, Chip::Esp32c6).unwrap();
        let event = EtmEventId::new(id::SYSTIMER_EVT_CNT_CMP0).unwrap();
        let task = EtmTaskId::new(id::TG0_TASK_CNT_CAP_TIMER0).unwrap();

        let configured = etm.channel49.setup(&event, &task);
        assert_eq!(regs.read(SOC_ETM_BASE + soc_etm_reg::CH_ENA_AD1), 1 << 17);
        assert_eq!(regs.read(SOC_ETM_BASE + soc_etm_reg::CH_ENA_AD0), 0);
        assert_eq!(regs.read(SOC_ETM_BASE + 0x18 + 8 * 49), 50);

        drop(configured);
        assert_eq!(regs.read(SOC_ETM_BASE + soc_etm_reg::CH_ENA_AD1), 0);
    }

    #[test]
    fn zero_id_is_rejected() {
        assert_eq!(EtmEventId::new(0), Err(Error::InvalidId));
        assert_eq!(EtmTaskId::new(0), Err(Error::InvalidId));
    }
}
