//! # General Purpose Input/Output (GPIO)
//!
//! ## Overview
//!
//! Types shared by the RTC IO driver and the GPIO event task matrix
//! channels.
//!
//! - [rtc_io]: RTC domain GPIO low-level accessors and pins
//! - [etm]: GPIO event and task channels for the event task matrix

use core::fmt::Display;

pub mod etm;
pub mod rtc_io;

/// Digital input or output level.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Low
    Low,
    /// High
    High,
}

impl core::ops::Not for Level {
    type Output = Self;

    fn not(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }
}

impl From<bool> for Level {
    fn from(val: bool) -> Self {
        match val {
            true => Self::High,
            false => Self::Low,
        }
    }
}

impl From<Level> for bool {
    fn from(level: Level) -> bool {
        match level {
            Level::Low => false,
            Level::High => true,
        }
    }
}

/// Pull setting for a GPIO.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    /// No pull
    None,
    /// Pull up
    Up,
    /// Pull down
    Down,
}

/// Drive strength (values are approximates)
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriveStrength {
    /// Drive strength of approximately 5mA.
    _5mA  = 0,
    /// Drive strength of approximately 10mA.
    _10mA = 1,
    /// Drive strength of approximately 20mA.
    _20mA = 2,
    /// Drive strength of approximately 40mA.
    _40mA = 3,
}

impl DriveStrength {
    pub(crate) fn from_bits(bits: u32) -> Self {
        match bits & 0x3 {
            0 => Self::_5mA,
            1 => Self::_10mA,
            2 => Self::_20mA,
            _ => Self::_40mA,
        }
    }
}

/// Output driver configuration.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputMode {
    /// Push-pull output.
    #[default]
    PushPull,
    /// Open-drain output.
    OpenDrain,
}

/// Pin direction of an RTC GPIO.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Input and output disabled.
    Disabled,
    /// Input only.
    Input,
    /// Output only.
    Output,
    /// Open-drain output only.
    OutputOpenDrain,
    /// Input and output.
    InputOutput,
    /// Input and open-drain output.
    InputOutputOpenDrain,
}

/// Which block drives a pad.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtcFunction {
    /// RTC IO.
    Rtc,
    /// IO MUX and the GPIO matrix.
    Digital,
}

/// Interrupt and wakeup trigger of an RTC GPIO.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtcInterruptType {
    /// No interrupt.
    Disabled  = 0,
    /// Rising edge.
    PosEdge   = 1,
    /// Falling edge.
    NegEdge   = 2,
    /// Any edge.
    AnyEdge   = 3,
    /// Low level.
    LowLevel  = 4,
    /// High level.
    HighLevel = 5,
}

impl RtcInterruptType {
    pub(crate) fn from_bits(bits: u32) -> Self {
        match bits {
            1 => Self::PosEdge,
            2 => Self::NegEdge,
            3 => Self::AnyEdge,
            4 => Self::LowLevel,
            5 => Self::HighLevel,
            _ => Self::Disabled,
        }
    }

    pub(crate) fn is_level(self) -> bool {
        matches!(self, Self::LowLevel | Self::HighLevel)
    }
}

/// Errors of the RTC IO driver.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// The GPIO cannot be routed to the RTC IO block.
    InvalidPin,
    /// The chip or pad lacks the requested feature.
    Unsupported,
    /// Only level triggers can wake the chip up.
    EdgeTriggeringNotSupported,
    /// The pin has already been handed out.
    AlreadyTaken,
}

impl Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::InvalidPin => write!(f, "The GPIO is not an RTC GPIO"),
            Error::Unsupported => write!(f, "The feature is not supported by this pad or chip"),
            Error::EdgeTriggeringNotSupported => {
                write!(f, "Edge triggering is not supported for wake-up")
            }
            Error::AlreadyTaken => write!(f, "The pin has already been handed out"),
        }
    }
}

impl core::error::Error for Error {}
