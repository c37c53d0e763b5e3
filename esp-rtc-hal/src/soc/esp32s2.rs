use super::{RtcCntlLayout, RtcioLayout, RtcioPadDesc, touch_style_pads};

const PADS: [RtcioPadDesc; 22] = touch_style_pads(0x84);

pub(super) const RTCIO: RtcioLayout = RtcioLayout {
    base: 0x3f40_8400,
    gpio_shift: 10,
    ext_wakeup0: 0xdc,
    pads: &PADS,
};

pub(super) const RTC_CNTL: RtcCntlLayout = RtcCntlLayout {
    base: 0x3f40_8000,
    slp_timer0: 0x04,
    slp_timer1: 0x08,
    time_update: 0x0c,
    time_valid: None,
    time_low: 0x10,
    time_high: 0x14,
    state0: 0x18,
    wakeup_state: 0x3c,
    wakeup_ena_shift: 15,
    wakeup_ena_width: 17,
    wakeup_cause: 0x12c,
    wakeup_cause_mask: 0x1_ffff,
    int_raw: 0x44,
    int_clr: 0x4c,
    ext_wakeup_conf: 0x64,
    slp_reject_conf: 0x68,
    deep_slp_reject_en: 1 << 31,
    light_slp_reject_en: 1 << 30,
    options0: 0x00,
    clk_conf: 0x74,
    sdio_conf: 0x7c,
    dbias: Some(0x84),
    pwc: 0x88,
    dig_pwc: 0x8c,
    rom0_pd_en: 1 << 24,
    ext_wakeup1: 0xdc,
    ext_wakeup1_status_clr: 1 << 22,
    ext_wakeup1_sel_width: 22,
    ext_wakeup1_status: 0xe0,
    pad_hold: 0xd4,
};
