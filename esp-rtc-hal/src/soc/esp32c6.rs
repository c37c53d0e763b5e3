use super::EtmLayout;

pub(super) const ETM: EtmLayout = EtmLayout {
    soc_etm_base: 0x6001_3000,
    gpio_ext_base: 0x6009_1f00,
    channels: 50,
    gpio_channels: 8,
};
