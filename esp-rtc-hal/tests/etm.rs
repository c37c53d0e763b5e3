//! Event task matrix scenarios on the ESP32-C6.

use esp_rtc_hal::{
    etm::{Etm, EtmEvent, EtmEventId, EtmTask, EtmTaskId, Error},
    gpio::etm::GpioEtmChannels,
    mock::FakeRegisters,
    peripherals::{GPIO_SD, SOC_ETM},
    reg_access::RegisterAccess,
    soc::{Chip, soc_etm_reg},
    timer::{SystimerAlarmEvent, TimerAlarmEvent, TimerGroup, TimerTask, TimerTaskKind},
};

const CHIP: Chip = Chip::Esp32c6;

fn etm(regs: &FakeRegisters, chip: Chip) -> Result<Etm<'_, FakeRegisters>, Error> {
    Etm::new(unsafe { SOC_ETM::steal() }, regs, chip)
}

fn gpio_etm(
    regs: &FakeRegisters,
    chip: Chip,
) -> Result<GpioEtmChannels<'_, FakeRegisters>, Error> {
    GpioEtmChannels::new(unsafe { GPIO_SD::steal() }, regs, chip)
}

#[test]
fn gpio_edge_toggles_gpio() {
    let regs = FakeRegisters::for_chip(CHIP);
    let layout = CHIP.etm_layout().unwrap();

    let gpio_ext = gpio_etm(&regs, CHIP).unwrap();
    let led_task = gpio_ext.channel0_task.toggle(1).unwrap();
    let button_event = gpio_ext.channel0_event.falling_edge(9).unwrap();

    let channels = etm(&regs, CHIP).unwrap();
    assert_eq!(regs.read(layout.reg(soc_etm_reg::CLK_EN)) & 1, 1);

    let channel = channels.channel0.setup(&button_event, &led_task);
    assert!(channel.is_enabled());
    assert_eq!(regs.read(layout.evt_id_reg(0)), 9);
    assert_eq!(regs.read(layout.task_id_reg(0)), 17);

    drop(channel);
    assert_eq!(regs.read(layout.reg(soc_etm_reg::CH_ENA_AD0)), 0);
}

#[test]
fn timer_alarm_drives_gpio_on_high_channel() {
    let regs = FakeRegisters::for_chip(CHIP);
    let layout = CHIP.etm_layout().unwrap();

    let gpio_ext = gpio_etm(&regs, CHIP).unwrap();
    let set = gpio_ext.channel3_task.set(5).unwrap();
    let alarm = TimerAlarmEvent::new(TimerGroup::Timg1);

    let channels = etm(&regs, CHIP).unwrap();
    let channel = channels.channel40.setup(&alarm, &set);

    assert!(channel.is_enabled());
    assert_eq!(regs.read(layout.reg(soc_etm_reg::CH_ENA_AD1)), 1 << 8);
    assert_eq!(regs.read(layout.evt_id_reg(40)), 49);
    assert_eq!(regs.read(layout.task_id_reg(40)), 4);
}

#[test]
fn channels_are_independent() {
    let regs = FakeRegisters::for_chip(CHIP);
    let layout = CHIP.etm_layout().unwrap();
    let channels = etm(&regs, CHIP).unwrap();

    let systimer = SystimerAlarmEvent::new(1).unwrap();
    let start = TimerTask::new(TimerGroup::Timg0, TimerTaskKind::CounterStart);
    let capture = TimerTask::new(TimerGroup::Timg0, TimerTaskKind::CounterCapture);

    let first = channels.channel1.setup(&systimer, &start);
    let second = channels.channel2.setup(&systimer, &capture);
    assert_eq!(regs.read(layout.reg(soc_etm_reg::CH_ENA_AD0)), 0b110);

    drop(first);
    assert!(second.is_enabled());
    assert_eq!(regs.read(layout.reg(soc_etm_reg::CH_ENA_AD0)), 0b100);
    assert_eq!(regs.read(layout.task_id_reg(2)), 96);
}

#[test]
fn raw_ids() {
    let regs = FakeRegisters::for_chip(CHIP);
    let layout = CHIP.etm_layout().unwrap();
    let channels = etm(&regs, CHIP).unwrap();

    assert_eq!(EtmEventId::new(0), Err(Error::InvalidId));
    assert_eq!(EtmTaskId::new(0), Err(Error::InvalidId));

    let event = EtmEventId::new(120).unwrap();
    let task = EtmTaskId::new(200).unwrap();
    assert_eq!((event.id(), task.id()), (120, 200));

    let _channel = channels.channel49.setup(&event, &task);
    assert_eq!(regs.read(layout.evt_id_reg(49)), 120);
    assert_eq!(regs.read(layout.task_id_reg(49)), 200);
}

#[test]
fn other_chips_have_no_matrix() {
    let regs = FakeRegisters::new();
    for chip in [Chip::Esp32, Chip::Esp32s2, Chip::Esp32s3] {
        assert!(matches!(etm(&regs, chip), Err(Error::Unsupported)));
        assert!(matches!(
            gpio_etm(&regs, chip),
            Err(Error::Unsupported)
        ));
    }
}
