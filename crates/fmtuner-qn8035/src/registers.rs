//! QN8035 register map and channel word codec.
//!
//! This module is pure data and arithmetic -- register addresses, bit
//! fields, the fixed auto-scan sensitivity values, and the conversion
//! between MHz and the chip's 10-bit channel word. No I/O happens here;
//! the driver and scan engine consume these definitions.
//!
//! Addresses and bit positions follow the QN8035 datasheet, except for the
//! three sensitivity registers at 0x39/0x3A/0x40 which are undocumented but
//! required for reliable auto-scan operation.

/// I2C address of the QN8035 tuner.
pub const QN8035_ADDRESS: u16 = 0x10;

/// Expected content of the `CID2` identity register.
pub const QN8035_CHIP_ID: u8 = 0x84;

/// Device modes.
pub const REG_SYSTEM1: u8 = 0x00;
/// CCA parameters.
pub const REG_CCA: u8 = 0x01;
/// Estimated RF input CNR value.
pub const REG_SNR: u8 = 0x02;
/// In-band signal RSSI value.
pub const REG_RSSISIG: u8 = 0x03;
/// System status.
pub const REG_STATUS1: u8 = 0x04;
/// Device ID numbers.
pub const REG_CID1: u8 = 0x05;
/// Device ID numbers.
pub const REG_CID2: u8 = 0x06;
/// Lower 8 bits of the 10-bit channel index.
pub const REG_CH: u8 = 0x07;
/// Lower 8 bits of the 10-bit scan start channel index.
pub const REG_CH_START: u8 = 0x08;
/// Lower 8 bits of the 10-bit scan stop channel index.
pub const REG_CH_STOP: u8 = 0x09;
/// Channel scan frequency step. Highest 2 bits of the channel indexes.
pub const REG_CH_STEP: u8 = 0x0A;
/// RDS data byte 0 (block A high).
pub const REG_RDSD0: u8 = 0x0B;
/// RDS data byte 1 (block A low).
pub const REG_RDSD1: u8 = 0x0C;
/// RDS data byte 2 (block B high).
pub const REG_RDSD2: u8 = 0x0D;
/// RDS data byte 3 (block B low).
pub const REG_RDSD3: u8 = 0x0E;
/// RDS data byte 4 (block C high).
pub const REG_RDSD4: u8 = 0x0F;
/// RDS data byte 5 (block C low).
pub const REG_RDSD5: u8 = 0x10;
/// RDS data byte 6 (block D high).
pub const REG_RDSD6: u8 = 0x11;
/// RDS data byte 7 (block D low).
pub const REG_RDSD7: u8 = 0x12;
/// RDS status indicators.
pub const REG_STATUS2: u8 = 0x13;
/// Audio controls.
pub const REG_VOL_CTL: u8 = 0x14;

// Undocumented registers programmed during auto-scan setup.
pub const REG_CCA_SNR_TH_1: u8 = 0x39;
pub const REG_CCA_SNR_TH_2: u8 = 0x3A;
pub const REG_NCCFIR3: u8 = 0x40;

// Bit definitions of REG_SYSTEM1.

/// CH selection method: 0 - CH determined by internal CCA; 1 - CH determined
/// by the content of CH[9:0].
pub const SYSTEM1_CCA_CH_DIS: u8 = 0x01;
/// Channel scan mode enable.
pub const SYSTEM1_CHSC: u8 = 0x02;
/// Force the receiver into mono mode.
pub const SYSTEM1_FORCE_MO: u8 = 0x04;
/// RDS enable.
pub const SYSTEM1_RDSEN: u8 = 0x08;
/// Receiving request: enter receive mode.
pub const SYSTEM1_RXREQ: u8 = 0x10;
/// Request to enter standby mode immediately.
pub const SYSTEM1_STNBY: u8 = 0x20;
/// Reset the state to initial states and recalibrate all blocks.
pub const SYSTEM1_RECAL: u8 = 0x40;
/// Reset all registers to default values.
pub const SYSTEM1_SWRST: u8 = 0x80;

// Bit definitions of REG_STATUS1.

/// Stereo receiving status: set while receiving in mono.
pub const STATUS1_ST_MO_RX: u8 = 0x01;

/// 200 kHz scanning step code for REG_CH_STEP.
pub const CH_STEP_200KHZ: u8 = 0x80;

/// Analog gain bits of REG_VOL_CTL.
pub const VOL_GAIN_MASK: u8 = 0x07;

/// Default auto-scan CCA threshold level.
pub const CCA_LEVEL: u8 = 0x10;
/// Auto-scan SNR threshold, first stage.
pub const CCA_SNR_TH_1_LEVEL: u8 = 0x00;
/// Auto-scan SNR threshold, second stage.
pub const CCA_SNR_TH_2_LEVEL: u8 = 0x05;
/// Auto-scan channel filter coefficient.
pub const NCCFIR3_LEVEL: u8 = 0x05;

// RDS group definitions.

/// Group type/version bits of block B.
pub const RDS_GROUP_TYPE_MASK: u16 = 0xF800;
/// Group code carrying program service text, variant A.
pub const RDS_GROUP_A0: u16 = 0x0000;
/// Group code carrying program service text, variant B.
pub const RDS_GROUP_B0: u16 = 0x0080;

/// Base frequency of the channel word encoding in MHz.
pub const CHANNEL_BASE_MHZ: f64 = 60.0;

/// Channel word resolution in MHz.
pub const CHANNEL_STEP_MHZ: f64 = 0.05;

/// Encode a frequency in MHz as the chip's 10-bit channel word.
pub fn freq_to_word(mhz: f64) -> u16 {
    ((mhz - CHANNEL_BASE_MHZ) / CHANNEL_STEP_MHZ).round() as u16
}

/// Decode a 10-bit channel word back to a frequency in MHz.
pub fn word_to_freq(word: u16) -> f64 {
    word as f64 * CHANNEL_STEP_MHZ + CHANNEL_BASE_MHZ
}

/// Combine the `REG_CH` low byte with the low 2 bits of `REG_CH_STEP` into
/// a channel word.
pub fn channel_word(low: u8, step: u8) -> u16 {
    low as u16 | ((step as u16 & 0x03) << 8)
}

/// Pack the `REG_CH_STEP` byte for a scan: 200 kHz step code plus the high
/// bits of the current channel (bits 0-1), the scan start channel
/// (bits 2-3), and the scan stop channel (bits 4-5).
pub fn scan_step_byte(current: u16, stop: u16) -> u8 {
    CH_STEP_200KHZ
        | ((current >> 8) as u8 & 0x03)
        | ((current >> 6) as u8 & 0x0C)
        | ((stop >> 4) as u8 & 0x30)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_codec_known_values() {
        assert_eq!(freq_to_word(88.0), 560);
        assert_eq!(freq_to_word(98.3), 766);
        assert_eq!(freq_to_word(108.0), 960);
        assert!((word_to_freq(560) - 88.0).abs() < 1e-9);
        assert!((word_to_freq(960) - 108.0).abs() < 1e-9);
    }

    #[test]
    fn word_codec_round_trip_across_band() {
        // Every 50 kHz channel between 88 and 108 MHz must survive the
        // round trip within one quantization step.
        for step in 0..=400u16 {
            let mhz = 88.0 + step as f64 * CHANNEL_STEP_MHZ;
            let word = freq_to_word(mhz);
            assert!(
                (word_to_freq(word) - mhz).abs() < CHANNEL_STEP_MHZ,
                "round trip drifted at {mhz} MHz"
            );
        }
    }

    #[test]
    fn channel_word_combines_high_bits() {
        assert_eq!(channel_word(0x30, 0x02), 0x230);
        // Only the low 2 bits of the step register belong to the word.
        assert_eq!(channel_word(0x30, 0x86), 0x230);
        assert_eq!(channel_word(0xFF, 0x03), 0x3FF);
    }

    #[test]
    fn scan_step_byte_packs_all_fields() {
        // current = 0x230 -> CH hi = 0b10, START hi = 0b10.
        // stop = 0x3C0 -> STOP hi = 0b11.
        let byte = scan_step_byte(0x230, 0x3C0);
        assert_eq!(byte & 0xC0, CH_STEP_200KHZ);
        assert_eq!(byte & 0x03, 0x02);
        assert_eq!(byte & 0x0C, 0x08);
        assert_eq!(byte & 0x30, 0x30);
    }

    #[test]
    fn ten_bit_word_fits_registers() {
        let word = freq_to_word(107.95);
        assert!(word <= 0x3FF);
        let low = (word & 0xFF) as u8;
        let high = ((word >> 8) & 0x03) as u8;
        assert_eq!(channel_word(low, high), word);
    }
}
