use super::{RtcCntlLayout, RtcioLayout, RtcioPadDesc};

const SENSOR_PADS: u32 = 0x7c;
const ADC_PAD: u32 = 0x80;
const PAD_DAC1: u32 = 0x84;
const PAD_DAC2: u32 = 0x88;
const XTAL_32K_PAD: u32 = 0x8c;
const TOUCH_PAD0: u32 = 0x94;

// Sensor and ADC pads are input only: no pulls, no drive, no sleep output.
#[allow(clippy::too_many_arguments)]
const fn input_only_pad(
    reg: u32,
    mux: u32,
    func: u32,
    ie: u32,
    slpsel: u32,
    slpie: u32,
    hold: u32,
    hold_force: u32,
    rtc_num: u8,
    gpio_num: u8,
) -> RtcioPadDesc {
    RtcioPadDesc {
        reg,
        mux: 1 << mux,
        func,
        ie: 1 << ie,
        pullup: 0,
        pulldown: 0,
        slpsel: 1 << slpsel,
        slpie: 1 << slpie,
        slpoe: 0,
        hold: 1 << hold,
        hold_force: 1 << hold_force,
        drv_v: 0,
        drv_s: 0,
        rtc_num,
        gpio_num,
    }
}

// Touch pads share one layout per register.
const fn touch_pad(touch: u32, rtc_num: u8, gpio_num: u8) -> RtcioPadDesc {
    RtcioPadDesc {
        reg: TOUCH_PAD0 + 4 * touch,
        mux: 1 << 19,
        func: 17,
        ie: 1 << 13,
        pullup: 1 << 27,
        pulldown: 1 << 28,
        slpsel: 1 << 16,
        slpie: 1 << 15,
        slpoe: 1 << 14,
        hold: 1 << 31,
        hold_force: 1 << (8 + touch),
        drv_v: 0x3,
        drv_s: 29,
        rtc_num,
        gpio_num,
    }
}

const fn dac_pad(reg: u32, hold_force: u32, rtc_num: u8, gpio_num: u8) -> RtcioPadDesc {
    RtcioPadDesc {
        reg,
        mux: 1 << 17,
        func: 15,
        ie: 1 << 11,
        pullup: 1 << 27,
        pulldown: 1 << 28,
        slpsel: 1 << 14,
        slpie: 1 << 13,
        slpoe: 1 << 12,
        hold: 1 << 29,
        hold_force: 1 << hold_force,
        drv_v: 0x3,
        drv_s: 30,
        rtc_num,
        gpio_num,
    }
}

const PADS: [RtcioPadDesc; 18] = [
    input_only_pad(SENSOR_PADS, 27, 22, 19, 21, 20, 31, 4, 0, 36),
    input_only_pad(SENSOR_PADS, 26, 17, 14, 16, 15, 30, 5, 1, 37),
    input_only_pad(SENSOR_PADS, 25, 12, 9, 11, 10, 29, 6, 2, 38),
    input_only_pad(SENSOR_PADS, 24, 7, 4, 6, 5, 28, 7, 3, 39),
    input_only_pad(ADC_PAD, 29, 26, 23, 25, 24, 31, 0, 4, 34),
    input_only_pad(ADC_PAD, 28, 21, 18, 20, 19, 30, 1, 5, 35),
    dac_pad(PAD_DAC1, 2, 6, 25),
    dac_pad(PAD_DAC2, 3, 7, 26),
    // 32K_N
    RtcioPadDesc {
        reg: XTAL_32K_PAD,
        mux: 1 << 18,
        func: 15,
        ie: 1 << 11,
        pullup: 1 << 27,
        pulldown: 1 << 28,
        slpsel: 1 << 14,
        slpie: 1 << 13,
        slpoe: 1 << 12,
        hold: 1 << 29,
        hold_force: 1 << 17,
        drv_v: 0x3,
        drv_s: 30,
        rtc_num: 8,
        gpio_num: 33,
    },
    // 32K_P
    RtcioPadDesc {
        reg: XTAL_32K_PAD,
        mux: 1 << 17,
        func: 9,
        ie: 1 << 5,
        pullup: 1 << 22,
        pulldown: 1 << 23,
        slpsel: 1 << 8,
        slpie: 1 << 7,
        slpoe: 1 << 6,
        hold: 1 << 24,
        hold_force: 1 << 16,
        drv_v: 0x3,
        drv_s: 25,
        rtc_num: 9,
        gpio_num: 32,
    },
    touch_pad(0, 10, 4),
    touch_pad(1, 11, 0),
    touch_pad(2, 12, 2),
    touch_pad(3, 13, 15),
    touch_pad(4, 14, 13),
    touch_pad(5, 15, 12),
    touch_pad(6, 16, 14),
    touch_pad(7, 17, 27),
];

pub(super) const RTCIO: RtcioLayout = RtcioLayout {
    base: 0x3ff4_8400,
    gpio_shift: 14,
    ext_wakeup0: 0xbc,
    pads: &PADS,
};

pub(super) const RTC_CNTL: RtcCntlLayout = RtcCntlLayout {
    base: 0x3ff4_8000,
    slp_timer0: 0x04,
    slp_timer1: 0x08,
    time_update: 0x0c,
    time_valid: Some(1 << 30),
    time_low: 0x10,
    time_high: 0x14,
    state0: 0x18,
    wakeup_state: 0x38,
    wakeup_ena_shift: 11,
    wakeup_ena_width: 11,
    wakeup_cause: 0x38,
    wakeup_cause_mask: 0x7ff,
    int_raw: 0x40,
    int_clr: 0x48,
    ext_wakeup_conf: 0x60,
    slp_reject_conf: 0x64,
    deep_slp_reject_en: 1 << 27,
    light_slp_reject_en: 1 << 26,
    options0: 0x00,
    clk_conf: 0x70,
    sdio_conf: 0x74,
    dbias: Some(0x7c),
    pwc: 0x80,
    dig_pwc: 0x84,
    rom0_pd_en: 1 << 24,
    ext_wakeup1: 0xcc,
    ext_wakeup1_status_clr: 1 << 18,
    ext_wakeup1_sel_width: 18,
    ext_wakeup1_status: 0xd0,
    pad_hold: 0xc8,
};
