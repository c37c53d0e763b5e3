//! Power management scenarios: lock accounting and frequency switching.

use core::cell::{Cell, RefCell};

use esp_rtc_hal::{
    pm::{CpuFrequencyControl, Error, LockType, Mode, PmConfig, PowerManager, TimeSource},
    soc::Chip,
};
use fugit::{HertzU32, RateExtU32};

#[derive(Default)]
struct Recorder {
    switches: RefCell<Vec<u32>>,
}

struct Cpu<'a>(&'a Recorder);

impl CpuFrequencyControl for Cpu<'_> {
    fn set_cpu_frequency(&mut self, freq: HertzU32) {
        self.0.switches.borrow_mut().push(freq.to_MHz());
    }
}

#[derive(Default)]
struct Clock(Cell<u64>);

impl Clock {
    fn advance(&self, us: u64) {
        self.0.set(self.0.get() + us);
    }
}

impl TimeSource for &Clock {
    fn now_us(&self) -> u64 {
        self.0.get()
    }
}

fn esp32_config() -> PmConfig {
    PmConfig::default()
        .with_max_freq(240.MHz())
        .with_min_freq(40.MHz())
        .with_light_sleep_enable(true)
}

#[test]
fn switches_only_on_mode_changes() {
    let recorder = Recorder::default();
    let clock = Clock::default();
    let pm = PowerManager::new(Chip::Esp32, Cpu(&recorder), &clock, true);

    let spi = pm.create_lock(LockType::CpuFreqMax, "spi").unwrap();
    let uart = pm.create_lock(LockType::ApbFreqMax, "uart").unwrap();

    // nothing is switched before configuration
    pm.acquire(spi).unwrap();
    pm.release(spi).unwrap();
    assert!(recorder.switches.borrow().is_empty());
    assert_eq!(pm.current_mode(), Mode::CpuMax);
    assert_eq!(pm.cpu_frequency(), None);

    pm.configure(esp32_config()).unwrap();
    pm.acquire(uart).unwrap();
    pm.acquire(uart).unwrap();
    pm.acquire(spi).unwrap();
    pm.release(uart).unwrap();
    pm.release(uart).unwrap();
    pm.release(spi).unwrap();

    assert_eq!(*recorder.switches.borrow(), [40, 80, 240, 40]);
    assert_eq!(pm.cpu_frequency(), Some(40.MHz()));
}

#[test]
fn reconfigure_reapplies_frequency() {
    let recorder = Recorder::default();
    let clock = Clock::default();
    let pm = PowerManager::new(Chip::Esp32s3, Cpu(&recorder), &clock, true);

    pm.configure(esp32_config()).unwrap();
    let lock = pm.create_lock(LockType::CpuFreqMax, "cpu").unwrap();
    pm.acquire(lock).unwrap();

    pm.configure(esp32_config().with_max_freq(160.MHz())).unwrap();
    assert_eq!(pm.current_mode(), Mode::CpuMax);
    assert_eq!(*recorder.switches.borrow(), [40, 240, 160]);
    assert_eq!(pm.configuration().unwrap().max_freq.to_MHz(), 160);
}

#[test]
fn c6_rejects_240_mhz() {
    let recorder = Recorder::default();
    let clock = Clock::default();
    let pm = PowerManager::new(Chip::Esp32c6, Cpu(&recorder), &clock, true);

    assert_eq!(pm.configure(esp32_config()), Err(Error::InvalidArgument));
    assert_eq!(
        pm.configure(esp32_config().with_max_freq(160.MHz())),
        Ok(())
    );
}

#[test]
fn statistics_follow_the_clock() {
    let recorder = Recorder::default();
    let clock = Clock::default();
    let pm = PowerManager::new(Chip::Esp32, Cpu(&recorder), &clock, true);
    pm.configure(esp32_config()).unwrap();

    let wifi = pm.create_lock(LockType::NoLightSleep, "wifi").unwrap();
    let spi = pm.create_lock(LockType::CpuFreqMax, "spi").unwrap();

    clock.advance(1_000);
    pm.acquire(wifi).unwrap();
    clock.advance(500);
    pm.acquire(spi).unwrap();
    clock.advance(250);
    pm.release(spi).unwrap();
    clock.advance(250);
    pm.release(wifi).unwrap();

    let modes = pm.mode_stats();
    assert_eq!(modes.time_in(Mode::LightSleep), 1_000);
    assert_eq!(modes.time_in(Mode::ApbMin), 750);
    assert_eq!(modes.time_in(Mode::ApbMax), 0);
    assert_eq!(modes.time_in(Mode::CpuMax), 250);

    let wifi = pm.lock_stats(wifi).unwrap();
    assert_eq!((wifi.count, wifi.times_taken, wifi.time_held_us), (0, 1, 1_000));
    let spi = pm.lock_stats(spi).unwrap();
    assert_eq!((spi.name, spi.time_held_us), ("spi", 250));
}

#[test]
fn dump_lists_modes_and_locks() {
    let recorder = Recorder::default();
    let clock = Clock::default();
    let pm = PowerManager::new(Chip::Esp32, Cpu(&recorder), &clock, true);
    pm.configure(esp32_config()).unwrap();

    let lock = pm.create_lock(LockType::ApbFreqMax, "rmt").unwrap();
    pm.acquire(lock).unwrap();
    clock.advance(100);

    let mut out = String::new();
    pm.dump(&mut out).unwrap();

    assert!(out.starts_with("Mode stats:"));
    assert!(out.contains("APB_MAX"));
    assert!(out.contains("Lock stats:"));
    let line = out.lines().find(|l| l.starts_with("rmt")).unwrap();
    assert!(line.contains("APB_FREQ_MAX"));
    assert!(line.contains("100"));
}

#[test]
fn idle_hook_sleeps_only_without_locks() {
    let recorder = Recorder::default();
    let clock = Clock::default();
    let pm = PowerManager::new(Chip::Esp32, Cpu(&recorder), &clock, true);

    assert_eq!(pm.light_sleep_duration(10_000), None);
    pm.configure(esp32_config()).unwrap();
    assert_eq!(pm.light_sleep_duration(10_000), Some(9_900));
    assert_eq!(pm.light_sleep_duration(199), None);

    let lock = pm.create_lock(LockType::ApbFreqMax, "i2c").unwrap();
    pm.acquire(lock).unwrap();
    assert_eq!(pm.light_sleep_duration(10_000), None);
}
