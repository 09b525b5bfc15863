//! Formatting and validation helpers for tuner front ends.
//!
//! These are small utility functions that virtually every consuming
//! application (status displays, CLI tools) needs.

use crate::error::{Error, Result};
use crate::types::FrequencyBand;

/// Format a frequency in MHz as a human-readable display string.
///
/// Returns a string like `"98.30 MHz"` with two decimal places, which
/// resolves the 50 kHz channel grid used by FM broadcast tuners.
///
/// # Example
///
/// ```
/// use fmtuner_core::format_frequency_mhz;
///
/// assert_eq!(format_frequency_mhz(98.3), "98.30 MHz");
/// assert_eq!(format_frequency_mhz(107.95), "107.95 MHz");
/// ```
pub fn format_frequency_mhz(mhz: f64) -> String {
    format!("{mhz:.2} MHz")
}

/// Parse a user-entered frequency string and validate it against a band.
///
/// Accepts plain decimal MHz values (e.g. `"98.3"`). Rejects anything that
/// is not a number and anything outside the band, so invalid input never
/// reaches a driver.
///
/// # Example
///
/// ```
/// use fmtuner_core::{parse_frequency_mhz, FrequencyBand};
///
/// let band = FrequencyBand::new(88.0, 108.0);
/// assert_eq!(parse_frequency_mhz("98.3", &band).unwrap(), 98.3);
/// assert!(parse_frequency_mhz("85.0", &band).is_err());
/// assert!(parse_frequency_mhz("stereo", &band).is_err());
/// ```
pub fn parse_frequency_mhz(input: &str, band: &FrequencyBand) -> Result<f64> {
    let mhz: f64 = input
        .trim()
        .parse()
        .map_err(|_| Error::InvalidParameter(format!("'{input}' is not a frequency")))?;
    if !mhz.is_finite() || !band.contains(mhz) {
        return Err(Error::InvalidParameter(format!(
            "{mhz} MHz is outside the supported band {band}"
        )));
    }
    Ok(mhz)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_two_decimals() {
        assert_eq!(format_frequency_mhz(88.0), "88.00 MHz");
        assert_eq!(format_frequency_mhz(98.3), "98.30 MHz");
        assert_eq!(format_frequency_mhz(107.95), "107.95 MHz");
    }

    #[test]
    fn parse_valid_frequency() {
        let band = FrequencyBand::new(88.0, 108.0);
        assert_eq!(parse_frequency_mhz("98.3", &band).unwrap(), 98.3);
        assert_eq!(parse_frequency_mhz(" 101.70 ", &band).unwrap(), 101.7);
    }

    #[test]
    fn parse_accepts_band_edges() {
        let band = FrequencyBand::new(88.0, 108.0);
        assert_eq!(parse_frequency_mhz("88.0", &band).unwrap(), 88.0);
        assert_eq!(parse_frequency_mhz("108.0", &band).unwrap(), 108.0);
    }

    #[test]
    fn parse_rejects_out_of_band() {
        let band = FrequencyBand::new(88.0, 108.0);
        assert!(parse_frequency_mhz("87.99", &band).is_err());
        assert!(parse_frequency_mhz("108.05", &band).is_err());
        assert!(parse_frequency_mhz("-98.3", &band).is_err());
    }

    #[test]
    fn parse_rejects_non_numeric() {
        let band = FrequencyBand::new(88.0, 108.0);
        assert!(parse_frequency_mhz("", &band).is_err());
        assert!(parse_frequency_mhz("ninety-eight", &band).is_err());
        assert!(parse_frequency_mhz("98.3 MHz", &band).is_err());
        assert!(parse_frequency_mhz("NaN", &band).is_err());
    }
}
