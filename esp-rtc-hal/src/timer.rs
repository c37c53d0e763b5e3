//! # Timer ETM endpoints
//!
//! Events raised by the timer group and system timer alarms, and tasks the
//! timer groups execute when an ETM channel fires. Combine them with
//! [`crate::etm::EtmChannel::setup`] to, for example, start a counter on a
//! GPIO edge or toggle a GPIO on every alarm.

use crate::etm::{EtmEvent, EtmTask, Error, id};

/// Timer group.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerGroup {
    /// TIMG0
    Timg0 = 0,
    /// TIMG1
    Timg1 = 1,
}

/// Alarm event of timer 0 of a timer group.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerAlarmEvent {
    group: TimerGroup,
}

impl TimerAlarmEvent {
    /// The alarm event of `group`.
    pub fn new(group: TimerGroup) -> Self {
        Self { group }
    }
}

impl crate::private::Sealed for TimerAlarmEvent {}

impl EtmEvent for TimerAlarmEvent {
    fn id(&self) -> u8 {
        id::TG0_EVT_CNT_CMP_TIMER0 + self.group as u8
    }
}

/// Alarm event of a system timer comparator.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SystimerAlarmEvent {
    comparator: u8,
}

impl SystimerAlarmEvent {
    /// Number of system timer comparators.
    pub const COMPARATORS: u8 = 3;

    /// The alarm event of `comparator`.
    pub fn new(comparator: u8) -> Result<Self, Error> {
        if comparator >= Self::COMPARATORS {
            return Err(Error::InvalidTimer);
        }
        Ok(Self { comparator })
    }
}

impl crate::private::Sealed for SystimerAlarmEvent {}

impl EtmEvent for SystimerAlarmEvent {
    fn id(&self) -> u8 {
        id::SYSTIMER_EVT_CNT_CMP0 + self.comparator
    }
}

/// What a timer does when its ETM task fires.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerTaskKind {
    /// Start counting.
    CounterStart,
    /// Arm the alarm.
    AlarmStart,
    /// Stop counting.
    CounterStop,
    /// Reload the counter.
    CounterReload,
    /// Capture the counter value.
    CounterCapture,
}

/// Task of timer 0 of a timer group.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerTask {
    group: TimerGroup,
    kind: TimerTaskKind,
}

impl TimerTask {
    /// The `kind` task of `group`.
    pub fn new(group: TimerGroup, kind: TimerTaskKind) -> Self {
        Self { group, kind }
    }
}

impl crate::private::Sealed for TimerTask {}

impl EtmTask for TimerTask {
    fn id(&self) -> u8 {
        let base = match self.kind {
            TimerTaskKind::CounterStart => id::TG0_TASK_CNT_START_TIMER0,
            TimerTaskKind::AlarmStart => id::TG0_TASK_ALARM_START_TIMER0,
            TimerTaskKind::CounterStop => id::TG0_TASK_CNT_STOP_TIMER0,
            TimerTaskKind::CounterReload => id::TG0_TASK_CNT_RELOAD_TIMER0,
            TimerTaskKind::CounterCapture => id::TG0_TASK_CNT_CAP_TIMER0,
        };
        base + self.group as u8
    }
}
