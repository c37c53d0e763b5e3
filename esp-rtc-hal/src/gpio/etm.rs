//! # Event Task Matrix Function
//!
//! ## Overview
//!
//! GPIO supports ETM function, that is, the ETM task of GPIO can be
//! triggered by the ETM event of any peripheral, or the ETM task of any
//! peripheral can be triggered by the ETM event of GPIO.
//!
//! The GPIO ETM provides eight task channels. The ETM tasks that each task
//! channel can receive are:
//! - SET: GPIO goes high when triggered
//! - CLEAR: GPIO goes low when triggered
//! - TOGGLE: GPIO toggle level when triggered.
//!
//! GPIO has eight event channels, and the ETM events that each event
//! channel can generate are:
//! - RISE_EDGE: Indicates that the output signal of the corresponding GPIO has
//!   a rising edge
//! - FALL_EDGE: Indicates that the output signal of the corresponding GPIO has
//!   a falling edge
//! - ANY_EDGE: Indicates that the output signal of the corresponding GPIO is
//!   reversed
//!
//! The pins are expected to be configured as inputs or outputs through IO MUX
//! before they are routed here.

use crate::{
    etm::{EtmEvent, EtmTask, Error, id},
    peripherals::GPIO_SD,
    reg_access::RegisterAccess,
    soc::{Chip, EtmLayout, gpio_ext_reg},
};

macro_rules! create_gpio_etm_channels {
    ($($num:literal),+) => {
        paste::paste! {
            /// All the GPIO ETM channels
            #[non_exhaustive]
            pub struct GpioEtmChannels<'d, R> {
                $(
                    #[doc = concat!("Task channel ", stringify!($num), " for triggering GPIO tasks.")]
                    pub [< channel $num _task >]: GpioEtmTaskChannel<'d, R, $num>,
                    #[doc = concat!("Event channel ", stringify!($num), " for handling GPIO events.")]
                    pub [< channel $num _event >]: GpioEtmEventChannel<'d, R, $num>,
                )+
            }

            impl<'d, R: RegisterAccess> GpioEtmChannels<'d, R> {
                /// Create a new instance
                pub fn new(_gpio_sd: GPIO_SD, regs: &'d R, chip: Chip) -> Result<Self, Error> {
                    let layout = chip.etm_layout().ok_or(Error::Unsupported)?;
                    let pins = chip.gpio_count();

                    Ok(Self {
                        $(
                            [< channel $num _task >]: GpioEtmTaskChannel { regs, layout, pins },
                            [< channel $num _event >]: GpioEtmEventChannel { regs, layout, pins },
                        )+
                    })
                }
            }
        }
    };
}

create_gpio_etm_channels!(0, 1, 2, 3, 4, 5, 6, 7);

/// An ETM controlled GPIO event
pub struct GpioEtmEventChannel<'d, R, const C: u8> {
    regs: &'d R,
    layout: &'static EtmLayout,
    pins: u8,
}

impl<'d, R: RegisterAccess, const C: u8> GpioEtmEventChannel<'d, R, C> {
    fn bind(&self, pin: u8) -> Result<(), Error> {
        if pin >= self.pins {
            return Err(Error::InvalidPin);
        }
        enable_event_channel(self.regs, self.layout, C, pin);
        Ok(())
    }

    /// Trigger at rising edge
    pub fn rising_edge(self, pin: u8) -> Result<GpioEtmEventRising<C>, Error> {
        self.bind(pin)?;
        Ok(GpioEtmEventRising { pin })
    }

    /// Trigger at falling edge
    pub fn falling_edge(self, pin: u8) -> Result<GpioEtmEventFalling<C>, Error> {
        self.bind(pin)?;
        Ok(GpioEtmEventFalling { pin })
    }

    /// Trigger at any edge
    pub fn any_edge(self, pin: u8) -> Result<GpioEtmEventAny<C>, Error> {
        self.bind(pin)?;
        Ok(GpioEtmEventAny { pin })
    }
}

macro_rules! gpio_etm_endpoint {
    ($name:ident, $doc:literal, $trait:ident, $base:expr) => {
        #[doc = $doc]
        #[derive(Debug)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        #[non_exhaustive]
        pub struct $name<const C: u8> {
            pin: u8,
        }

        impl<const C: u8> $name<C> {
            /// The GPIO bound to this channel.
            pub fn pin(&self) -> u8 {
                self.pin
            }
        }

        impl<const C: u8> crate::private::Sealed for $name<C> {}

        impl<const C: u8> $trait for $name<C> {
            fn id(&self) -> u8 {
                $base + C
            }
        }
    };
}

gpio_etm_endpoint!(GpioEtmEventRising, "Event for rising edge", EtmEvent, id::GPIO_EVT_CH0_RISE_EDGE);
gpio_etm_endpoint!(GpioEtmEventFalling, "Event for falling edge", EtmEvent, id::GPIO_EVT_CH0_FALL_EDGE);
gpio_etm_endpoint!(GpioEtmEventAny, "Event for any edge", EtmEvent, id::GPIO_EVT_CH0_ANY_EDGE);
gpio_etm_endpoint!(GpioEtmTaskSet, "Task for set operation", EtmTask, id::GPIO_TASK_CH0_SET);
gpio_etm_endpoint!(GpioEtmTaskClear, "Task for clear operation", EtmTask, id::GPIO_TASK_CH0_CLEAR);
gpio_etm_endpoint!(GpioEtmTaskToggle, "Task for toggle operation", EtmTask, id::GPIO_TASK_CH0_TOGGLE);

/// An ETM controlled GPIO task
pub struct GpioEtmTaskChannel<'d, R, const C: u8> {
    regs: &'d R,
    layout: &'static EtmLayout,
    pins: u8,
}

impl<'d, R: RegisterAccess, const C: u8> GpioEtmTaskChannel<'d, R, C> {
    // In theory we could have multiple pins assigned to the same task. Not sure how
    // useful that would be. If we want to support it, the easiest would be
    // to offer additional functions like `set2`, `set3` etc. where the
    // number is the pin-count

    fn bind(&self, pin: u8) -> Result<(), Error> {
        if pin >= self.pins {
            return Err(Error::InvalidPin);
        }
        enable_task_channel(self.regs, self.layout, C, pin);
        Ok(())
    }

    /// Task to set a high level
    pub fn set(self, pin: u8) -> Result<GpioEtmTaskSet<C>, Error> {
        self.bind(pin)?;
        Ok(GpioEtmTaskSet { pin })
    }

    /// Task to set a low level
    pub fn clear(self, pin: u8) -> Result<GpioEtmTaskClear<C>, Error> {
        self.bind(pin)?;
        Ok(GpioEtmTaskClear { pin })
    }

    /// Task to toggle the level
    pub fn toggle(self, pin: u8) -> Result<GpioEtmTaskToggle<C>, Error> {
        self.bind(pin)?;
        Ok(GpioEtmTaskToggle { pin })
    }
}

fn enable_task_channel<R: RegisterAccess>(regs: &R, layout: &EtmLayout, channel: u8, pin: u8) {
    let addr = layout.gpio_ext_reg(gpio_ext_reg::ETM_TASK_P0_CFG) + 4 * (pin as u32 / 4);
    let shift = 8 * (pin as u32 % 4);
    // bit 0 = en, bit 1-3 = channel
    regs.modify(addr, |v| {
        v & !(0xf << shift) | 1 << shift | (channel as u32) << (shift + 1)
    });
    trace!("GPIO ETM task channel {} -> GPIO {}", channel, pin);
}

fn enable_event_channel<R: RegisterAccess>(regs: &R, layout: &EtmLayout, channel: u8, pin: u8) {
    let addr = layout.gpio_ext_reg(gpio_ext_reg::ETM_EVENT_CH0_CFG) + 4 * channel as u32;
    regs.clear_bits(addr, gpio_ext_reg::EVENT_EN);
    regs.write_field(addr, 0, gpio_ext_reg::EVENT_SEL_W, pin as u32);
    regs.set_bits(addr, gpio_ext_reg::EVENT_EN);
    trace!("GPIO ETM event channel {} <- GPIO {}", channel, pin);
}
