//! # Peripheral Instances
//!
//! Every driver of this crate consumes the instance of the hardware block it
//! controls, so each block has at most one driver at a time. The instances
//! are handed out once by [`Peripherals::take`].

use core::cell::Cell;

use critical_section::Mutex;

static TAKEN: Mutex<Cell<bool>> = Mutex::new(Cell::new(false));

macro_rules! create_peripherals {
    ($($(#[$attr:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$attr])*
            #[derive(Debug)]
            #[allow(non_camel_case_types)]
            #[non_exhaustive]
            pub struct $name {
                _inner: (),
            }

            impl $name {
                /// Unsafely create an instance of this peripheral out of thin air.
                ///
                /// # Safety
                ///
                /// You must ensure that you're only using one instance of this type at a time.
                #[inline]
                pub unsafe fn steal() -> Self {
                    Self { _inner: () }
                }
            }

            impl crate::private::Sealed for $name {}
        )+

        /// The `Peripherals` struct provides access to the hardware blocks
        /// driven by this crate.
        #[allow(non_snake_case)]
        pub struct Peripherals {
            $(
                #[doc = concat!("The ", stringify!($name), " block.")]
                pub $name: $name,
            )+
        }

        impl Peripherals {
            /// Unsafely create an instance of every peripheral out of thin air.
            ///
            /// # Safety
            ///
            /// You must ensure that you're only using one instance of each type at a time.
            #[inline]
            pub unsafe fn steal() -> Self {
                Self {
                    $($name: unsafe { $name::steal() },)+
                }
            }
        }
    };
}

create_peripherals!(
    /// Low-power management (`RTC_CNTL`), driven by [`crate::rtc_cntl::Rtc`].
    LPWR,
    /// RTC IO pads, driven by [`crate::gpio::rtc_io::RtcIo`].
    RTC_IO,
    /// Event task matrix, driven by [`crate::etm::Etm`].
    SOC_ETM,
    /// GPIO ETM channels, driven by [`crate::gpio::etm::GpioEtmChannels`].
    GPIO_SD,
);

impl Peripherals {
    /// Returns all the peripherals *once*.
    ///
    /// Later calls return `None`.
    pub fn take() -> Option<Self> {
        critical_section::with(|cs| {
            let taken = TAKEN.borrow(cs);
            if taken.replace(true) {
                return None;
            }
            Some(unsafe { Self::steal() })
        })
    }
}
