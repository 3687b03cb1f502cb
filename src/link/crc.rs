//! # CRC8-DVB-S2
//!
//! Frame checksum of the sensor link.
//!
//! **Polynomial**: 0xD5 (x^8 + x^7 + x^6 + x^4 + x^2 + 1)
//! **Initial Value**: 0x00

const POLY: u8 = 0xD5;

/// Lookup table built at compile time.
const TABLE: [u8; 256] = build_table();

const fn build_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;

    while i < 256 {
        let mut crc = i as u8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x80 != 0 { (crc << 1) ^ POLY } else { crc << 1 };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }

    table
}

/// Calculate the CRC8-DVB-S2 of `data`.
///
/// # Arguments
///
/// * `data` - Length, type and payload bytes of a frame
///
/// # Examples
///
/// ```
/// use magjoy::link::crc::crc8_dvb_s2;
///
/// assert_eq!(crc8_dvb_s2(b"123456789"), 0xBC);
/// ```
#[must_use]
pub fn crc8_dvb_s2(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |crc, &byte| TABLE[(crc ^ byte) as usize])
}

/// Incremental form of [`crc8_dvb_s2`] for a frame assembled in pieces.
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc8 {
    value: u8,
}

impl Crc8 {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.value = TABLE[(self.value ^ byte) as usize];
        }
    }

    #[must_use]
    pub fn finish(self) -> u8 {
        self.value
    }
}
