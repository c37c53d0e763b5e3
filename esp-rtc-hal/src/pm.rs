//! # Power Management
//!
//! ## Overview
//!
//! Dynamic frequency scaling driven by power management locks. Drivers and
//! applications take a [`LockType`] lock while they need a minimum level of
//! performance, and the [`PowerManager`] keeps the CPU at the lowest
//! frequency that satisfies every held lock:
//!
//! - [`LockType::CpuFreqMax`] keeps the CPU at the configured maximum.
//! - [`LockType::ApbFreqMax`] keeps the APB clock at 80 MHz.
//! - [`LockType::NoLightSleep`] prevents automatic light sleep.
//!
//! With no lock held the CPU runs at the configured minimum and, if enabled,
//! the idle task may enter light sleep.
//!
//! Locks are reference counted and keep statistics about how often and how
//! long they were held, which [`PowerManager::dump`] prints together with
//! the time spent in each [`Mode`].
//!
//! ## Examples
//! ```rust, no_run
//! # use esp_rtc_hal::pm::{CpuFrequencyControl, LockType, PmConfig, PowerManager, TimeSource};
//! # use esp_rtc_hal::soc::Chip;
//! # use fugit::{HertzU32, RateExtU32};
//! # struct Cpu;
//! # impl CpuFrequencyControl for Cpu { fn set_cpu_frequency(&mut self, _: HertzU32) {} }
//! # struct Clock;
//! # impl TimeSource for Clock { fn now_us(&self) -> u64 { 0 } }
//! let pm = PowerManager::new(Chip::Esp32s3, Cpu, Clock, true);
//! pm.configure(
//!     PmConfig::default()
//!         .with_max_freq(240.MHz())
//!         .with_min_freq(40.MHz())
//!         .with_light_sleep_enable(true),
//! )
//! .unwrap();
//!
//! let lock = pm.create_lock(LockType::CpuFreqMax, "spi").unwrap();
//! pm.acquire(lock).unwrap();
//! // ... time critical work at 240 MHz ...
//! pm.release(lock).unwrap();
//! ```

use core::{cell::RefCell, fmt::Display};

use critical_section::Mutex;
use fugit::{HertzU32, RateExtU32};

use crate::soc::Chip;

/// Maximum number of locks that can exist at the same time.
pub const MAX_LOCKS: usize = 16;

/// Idle periods shorter than this never enter light sleep.
pub const LIGHT_SLEEP_MIN_TIME_US: u64 = 200;

/// How early the chip wakes from light sleep before the next scheduled event.
pub const LIGHT_SLEEP_EARLY_WAKEUP_US: u64 = 100;

const APB_MAX_MHZ: u32 = 80;

/// Errors of the power management lock engine.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// An argument (frequency, handle) is not valid.
    InvalidArgument,
    /// The lock is not in a state which allows the operation.
    InvalidState,
    /// The requested feature is not available.
    NotSupported,
    /// The lock table is full.
    NoMem,
}

impl Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::InvalidArgument => write!(f, "Invalid argument"),
            Error::InvalidState => write!(f, "The lock is not in a valid state for this operation"),
            Error::NotSupported => write!(f, "Light sleep is not supported"),
            Error::NoMem => write!(f, "Too many power management locks"),
        }
    }
}

impl core::error::Error for Error {}

/// Kind of constraint a lock places on the power manager.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LockType {
    /// Keep the CPU at the configured maximum frequency.
    CpuFreqMax,
    /// Keep the APB clock at its maximum (80 MHz).
    ApbFreqMax,
    /// Prevent automatic light sleep.
    NoLightSleep,
}

impl LockType {
    /// The mode this lock holds the system in (at least).
    pub fn mode(self) -> Mode {
        match self {
            LockType::CpuFreqMax => Mode::CpuMax,
            LockType::ApbFreqMax => Mode::ApbMax,
            LockType::NoLightSleep => Mode::ApbMin,
        }
    }

    fn name(self) -> &'static str {
        match self {
            LockType::CpuFreqMax => "CPU_FREQ_MAX",
            LockType::ApbFreqMax => "APB_FREQ_MAX",
            LockType::NoLightSleep => "NO_SLEEP",
        }
    }
}

/// Power management mode, ordered from lowest to highest power.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Idle may enter light sleep, CPU at the minimum frequency.
    LightSleep = 0,
    /// CPU at the minimum frequency.
    ApbMin     = 1,
    /// APB at 80 MHz.
    ApbMax     = 2,
    /// CPU at the maximum frequency.
    CpuMax     = 3,
}

impl Mode {
    const ALL: [Mode; 4] = [Mode::LightSleep, Mode::ApbMin, Mode::ApbMax, Mode::CpuMax];

    fn name(self) -> &'static str {
        match self {
            Mode::LightSleep => "SLEEP",
            Mode::ApbMin => "APB_MIN",
            Mode::ApbMax => "APB_MAX",
            Mode::CpuMax => "CPU_MAX",
        }
    }
}

/// Power management configuration.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PmConfig {
    /// CPU frequency while a [`LockType::CpuFreqMax`] lock is held.
    pub max_freq: HertzU32,
    /// CPU frequency while no lock is held.
    pub min_freq: HertzU32,
    /// Let the idle task enter light sleep while no lock is held.
    pub light_sleep_enable: bool,
}

impl Default for PmConfig {
    fn default() -> Self {
        Self {
            max_freq: 160.MHz(),
            min_freq: 40.MHz(),
            light_sleep_enable: false,
        }
    }
}

impl PmConfig {
    /// Set the maximum CPU frequency.
    pub fn with_max_freq(mut self, max_freq: HertzU32) -> Self {
        self.max_freq = max_freq;
        self
    }

    /// Set the minimum CPU frequency.
    pub fn with_min_freq(mut self, min_freq: HertzU32) -> Self {
        self.min_freq = min_freq;
        self
    }

    /// Enable or disable automatic light sleep.
    pub fn with_light_sleep_enable(mut self, enable: bool) -> Self {
        self.light_sleep_enable = enable;
        self
    }

    fn validate(&self, chip: Chip) -> Result<(), Error> {
        if self.max_freq.raw() % 1_000_000 != 0 || self.min_freq.raw() % 1_000_000 != 0 {
            return Err(Error::InvalidArgument);
        }

        let max = self.max_freq.to_MHz();
        let min = self.min_freq.to_MHz();

        if !chip.cpu_frequencies_mhz().contains(&max) || !chip.is_valid_cpu_frequency(min) {
            return Err(Error::InvalidArgument);
        }
        if min > max {
            return Err(Error::InvalidArgument);
        }
        Ok(())
    }

    /// CPU frequency used in `mode`.
    pub fn frequency_for(&self, mode: Mode) -> HertzU32 {
        match mode {
            Mode::CpuMax => self.max_freq,
            Mode::ApbMax => {
                let apb = self.max_freq.to_MHz().min(APB_MAX_MHZ);
                apb.max(self.min_freq.to_MHz()).MHz()
            }
            Mode::ApbMin | Mode::LightSleep => self.min_freq,
        }
    }
}

/// Switches the CPU clock.
pub trait CpuFrequencyControl {
    /// Run the CPU at `freq` from now on.
    fn set_cpu_frequency(&mut self, freq: HertzU32);
}

/// Monotonic microsecond time base used for statistics.
pub trait TimeSource {
    /// Microseconds since an arbitrary, fixed point.
    fn now_us(&self) -> u64;
}

/// Handle of a lock created with [`PowerManager::create_lock`].
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PmLockHandle(u8);

/// Statistics of one lock.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LockStats {
    /// Lock type.
    pub lock_type: LockType,
    /// Name given at creation.
    pub name: &'static str,
    /// Current reference count.
    pub count: u32,
    /// How often the count went from 0 to 1.
    pub times_taken: u32,
    /// Total time the count was above 0, including the current period.
    pub time_held_us: u64,
}

/// Time spent in each mode since the first [`PowerManager::configure`].
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeStats {
    time_in_mode_us: [u64; 4],
}

impl ModeStats {
    /// Time spent in `mode`.
    pub fn time_in(&self, mode: Mode) -> u64 {
        self.time_in_mode_us[mode as usize]
    }

    /// Time spent in all modes together.
    pub fn total(&self) -> u64 {
        self.time_in_mode_us.iter().sum()
    }
}

#[derive(Debug, Clone, Copy)]
struct LockEntry {
    lock_type: LockType,
    name: &'static str,
    count: u32,
    times_taken: u32,
    time_held_us: u64,
    last_taken_us: u64,
}

impl LockEntry {
    fn stats(&self, now: u64) -> LockStats {
        let mut time_held_us = self.time_held_us;
        if self.count > 0 {
            time_held_us += now.saturating_sub(self.last_taken_us);
        }
        LockStats {
            lock_type: self.lock_type,
            name: self.name,
            count: self.count,
            times_taken: self.times_taken,
            time_held_us,
        }
    }
}

struct State<C> {
    cpu: C,
    config: Option<PmConfig>,
    locks: heapless::Vec<Option<LockEntry>, MAX_LOCKS>,
    mode_counts: [u32; 4],
    mode: Mode,
    frequency: Option<HertzU32>,
    last_mode_change_us: u64,
    time_in_mode_us: [u64; 4],
}

impl<C: CpuFrequencyControl> State<C> {
    fn entry_mut(&mut self, handle: PmLockHandle) -> Result<&mut LockEntry, Error> {
        self.locks
            .get_mut(handle.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(Error::InvalidArgument)
    }

    fn mode_stats(&self, now: u64) -> ModeStats {
        let mut time_in_mode_us = self.time_in_mode_us;
        if self.config.is_some() {
            time_in_mode_us[self.mode as usize] += now.saturating_sub(self.last_mode_change_us);
        }
        ModeStats { time_in_mode_us }
    }

    fn entry(&self, handle: PmLockHandle) -> Result<&LockEntry, Error> {
        self.locks
            .get(handle.0 as usize)
            .and_then(Option::as_ref)
            .ok_or(Error::InvalidArgument)
    }

    fn lowest_allowed_mode(&self) -> Mode {
        let light_sleep = self.config.is_some_and(|c| c.light_sleep_enable);

        Mode::ALL
            .iter()
            .rev()
            .copied()
            .find(|mode| self.mode_counts[*mode as usize] > 0)
            .map(|mode| mode.max(Mode::ApbMin))
            .unwrap_or(if light_sleep { Mode::LightSleep } else { Mode::ApbMin })
    }

    fn update_mode(&mut self, now: u64, force_frequency: bool) {
        let Some(config) = self.config else {
            return;
        };

        let new_mode = self.lowest_allowed_mode();
        if new_mode != self.mode {
            self.time_in_mode_us[self.mode as usize] += now.saturating_sub(self.last_mode_change_us);
            self.last_mode_change_us = now;
            trace!("pm mode {:?} -> {:?}", self.mode, new_mode);
            self.mode = new_mode;
        }

        let freq = config.frequency_for(new_mode);
        if force_frequency || self.frequency != Some(freq) {
            debug!("pm switching CPU to {} MHz", freq.to_MHz());
            self.cpu.set_cpu_frequency(freq);
            self.frequency = Some(freq);
        }
    }
}

/// Reference counted power management locks and the frequency policy they
/// drive.
pub struct PowerManager<C, T> {
    chip: Chip,
    time: T,
    light_sleep_supported: bool,
    state: Mutex<RefCell<State<C>>>,
}

impl<C: CpuFrequencyControl, T: TimeSource> PowerManager<C, T> {
    /// Create the power manager.
    ///
    /// No frequency is switched until [`Self::configure`] is called; until
    /// then locks are counted but [`Self::current_mode`] stays
    /// [`Mode::CpuMax`].
    pub fn new(chip: Chip, cpu: C, time: T, light_sleep_supported: bool) -> Self {
        Self {
            chip,
            time,
            light_sleep_supported,
            state: Mutex::new(RefCell::new(State {
                cpu,
                config: None,
                locks: heapless::Vec::new(),
                mode_counts: [0; 4],
                mode: Mode::CpuMax,
                frequency: None,
                last_mode_change_us: 0,
                time_in_mode_us: [0; 4],
            })),
        }
    }

    /// Apply a new configuration.
    pub fn configure(&self, config: PmConfig) -> Result<(), Error> {
        config.validate(self.chip)?;
        if config.light_sleep_enable && !self.light_sleep_supported {
            return Err(Error::NotSupported);
        }

        let now = self.time.now_us();
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            if state.config.is_none() {
                state.last_mode_change_us = now;
            }
            state.config = Some(config);
            state.update_mode(now, true);
        });
        info!(
            "pm configured: max {} MHz, min {} MHz, light sleep {}",
            config.max_freq.to_MHz(),
            config.min_freq.to_MHz(),
            config.light_sleep_enable
        );
        Ok(())
    }

    /// The active configuration, if any.
    pub fn configuration(&self) -> Option<PmConfig> {
        critical_section::with(|cs| self.state.borrow_ref(cs).config)
    }

    /// Create a new lock.
    pub fn create_lock(&self, lock_type: LockType, name: &'static str) -> Result<PmLockHandle, Error> {
        let entry = LockEntry {
            lock_type,
            name,
            count: 0,
            times_taken: 0,
            time_held_us: 0,
            last_taken_us: 0,
        };

        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            if let Some(index) = state.locks.iter().position(Option::is_none) {
                state.locks[index] = Some(entry);
                return Ok(PmLockHandle(index as u8));
            }
            let index = state.locks.len();
            state
                .locks
                .push(Some(entry))
                .map_err(|_| Error::NoMem)?;
            Ok(PmLockHandle(index as u8))
        })
    }

    /// Delete a lock which is not held.
    pub fn delete_lock(&self, handle: PmLockHandle) -> Result<(), Error> {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            if state.entry(handle)?.count != 0 {
                return Err(Error::InvalidState);
            }
            state.locks[handle.0 as usize] = None;
            Ok(())
        })
    }

    /// Take a reference on the lock.
    pub fn acquire(&self, handle: PmLockHandle) -> Result<(), Error> {
        let now = self.time.now_us();
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            let entry = state.entry_mut(handle)?;
            entry.count += 1;
            if entry.count == 1 {
                entry.times_taken += 1;
                entry.last_taken_us = now;
                let mode = entry.lock_type.mode();
                state.mode_counts[mode as usize] += 1;
                state.update_mode(now, false);
            }
            Ok(())
        })
    }

    /// Drop a reference on the lock.
    pub fn release(&self, handle: PmLockHandle) -> Result<(), Error> {
        let now = self.time.now_us();
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            let entry = state.entry_mut(handle)?;
            if entry.count == 0 {
                return Err(Error::InvalidState);
            }
            entry.count -= 1;
            if entry.count == 0 {
                entry.time_held_us += now.saturating_sub(entry.last_taken_us);
                let mode = entry.lock_type.mode();
                state.mode_counts[mode as usize] -= 1;
                state.update_mode(now, false);
            }
            Ok(())
        })
    }

    /// Statistics of a lock.
    pub fn lock_stats(&self, handle: PmLockHandle) -> Result<LockStats, Error> {
        let now = self.time.now_us();
        critical_section::with(|cs| Ok(self.state.borrow_ref(cs).entry(handle)?.stats(now)))
    }

    /// Time spent in each mode, including the current one.
    pub fn mode_stats(&self) -> ModeStats {
        let now = self.time.now_us();
        critical_section::with(|cs| self.state.borrow_ref(cs).mode_stats(now))
    }

    /// The mode the held locks currently demand.
    pub fn current_mode(&self) -> Mode {
        critical_section::with(|cs| self.state.borrow_ref(cs).mode)
    }

    /// The CPU frequency last applied, if any.
    pub fn cpu_frequency(&self) -> Option<HertzU32> {
        critical_section::with(|cs| self.state.borrow_ref(cs).frequency)
    }

    /// How long the idle task should light sleep for an idle period of
    /// `expected_idle_us`, or `None` to stay awake.
    pub fn light_sleep_duration(&self, expected_idle_us: u64) -> Option<u64> {
        if self.current_mode() != Mode::LightSleep || expected_idle_us < LIGHT_SLEEP_MIN_TIME_US {
            return None;
        }
        Some(expected_idle_us - LIGHT_SLEEP_EARLY_WAKEUP_US)
    }

    /// Print mode and lock statistics.
    pub fn dump(&self, out: &mut impl core::fmt::Write) -> core::fmt::Result {
        let now = self.time.now_us();

        let mut locks: heapless::Vec<LockStats, MAX_LOCKS> = heapless::Vec::new();
        let (modes, config) = critical_section::with(|cs| {
            let state = self.state.borrow_ref(cs);
            for entry in state.locks.iter().flatten() {
                // capacities match, so this never fails
                let _ = locks.push(entry.stats(now));
            }
            (state.mode_stats(now), state.config)
        });
        let total = modes.total();

        writeln!(out, "Mode stats:")?;
        writeln!(out, "{:<8} {:>8} {:>12} {:>8}", "Mode", "CPU_freq", "Time(us)", "Time(%)")?;
        for mode in Mode::ALL {
            let freq = config.map(|c| c.frequency_for(mode).to_MHz()).unwrap_or(0);
            let time = modes.time_in(mode);
            writeln!(
                out,
                "{:<8} {:>7}M {:>12} {:>7}%",
                mode.name(),
                freq,
                time,
                percent(time, total)
            )?;
        }

        writeln!(out, "Lock stats:")?;
        writeln!(
            out,
            "{:<16} {:<12} {:>6} {:>11} {:>12} {:>8}",
            "Name", "Type", "Active", "Total_count", "Time(us)", "Time(%)"
        )?;
        for lock in locks {
            writeln!(
                out,
                "{:<16} {:<12} {:>6} {:>11} {:>12} {:>7}%",
                lock.name,
                lock.lock_type.name(),
                lock.count,
                lock.times_taken,
                lock.time_held_us,
                percent(lock.time_held_us, total)
            )?;
        }
        Ok(())
    }
}

// locks also count time before `configure`, so they can outlast the mode total
fn percent(part: u64, total: u64) -> u64 {
    (part.saturating_mul(100) / total.max(1)).min(100)
}
