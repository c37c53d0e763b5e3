//! Bare-metal (`no_std`) drivers for the RTC domain of Espressif devices:
//! RTC IO pads, the Event Task Matrix, power management locks and sleep
//! with wakeup sources. Where applicable, drivers implement the
//! [embedded-hal] traits.
//!
//! ## Choosing a device
//!
//! All supported chips are handled by the same build. Drivers take a
//! [`soc::Chip`] at construction and look up the register layout of that
//! chip, so the chip is selected at runtime rather than with a feature.
//!
//! ## Register access
//!
//! Each driver consumes the instance of the block it controls, taken once
//! from [`peripherals::Peripherals::take`].
//!
//! Drivers never touch memory directly. They go through a
//! [`reg_access::RegisterAccess`] implementation: [`reg_access::Mmio`] on
//! the target, or `mock::FakeRegisters` (feature `mock`) on the host.
//!
//! ## Feature Flags
#![doc = document_features::document_features!()]
#![doc(html_logo_url = "https://avatars.githubusercontent.com/u/46717278")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![cfg_attr(not(test), no_std)]
//!
//! [embedded-hal]: https://docs.rs/embedded-hal/latest/embedded_hal/

// MUST be the first module
mod fmt;

pub mod etm;
pub mod gpio;
#[cfg(any(test, feature = "mock"))]
#[cfg_attr(docsrs, doc(cfg(feature = "mock")))]
pub mod mock;
pub mod peripherals;
pub mod pm;
pub mod reg_access;
pub mod rtc_cntl;
pub mod soc;
pub mod timer;

mod private {
    pub trait Sealed {}
}
