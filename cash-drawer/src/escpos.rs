//! ESC/POS drawer-kick command
//!
//! `ESC p m t1 t2` pulses connector pin `m` for `t1 × 2ms` on, `t2 × 2ms` off.
//! Caller options are validated into a [`DrawerKick`] before any byte is
//! produced, so a value never wraps into the one-byte fields.

use crate::error::{DrawerError, DrawerResult};
use serde::{Deserialize, Serialize};

/// ESC p prefix
const PULSE_PREFIX: [u8; 2] = [0x1B, 0x70];

/// Length of an encoded drawer kick
pub const DRAWER_KICK_LEN: usize = 5;

pub const DEFAULT_PIN: i64 = 0;
/// ~100ms
pub const DEFAULT_PULSE_ON_TIME: i64 = 50;
/// ~500ms
pub const DEFAULT_PULSE_OFF_TIME: i64 = 250;

/// Drawer options as supplied by the caller
///
/// Fields are wide on purpose: out-of-range input must be seen and rejected,
/// not truncated on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DrawerOptions {
    /// Drawer pin (0 or 1)
    pub pin: i64,
    /// Pulse on time (0-255)
    pub pulse_on_time: i64,
    /// Pulse off time (0-255)
    pub pulse_off_time: i64,
}

impl Default for DrawerOptions {
    fn default() -> Self {
        Self {
            pin: DEFAULT_PIN,
            pulse_on_time: DEFAULT_PULSE_ON_TIME,
            pulse_off_time: DEFAULT_PULSE_OFF_TIME,
        }
    }
}

impl DrawerOptions {
    pub fn new(pin: i64, pulse_on_time: i64, pulse_off_time: i64) -> Self {
        Self {
            pin,
            pulse_on_time,
            pulse_off_time,
        }
    }

    /// Check every field against its domain
    pub fn validate(&self) -> DrawerResult<DrawerKick> {
        let pin = DrawerPin::try_from(self.pin)?;
        let on_time = timing_byte("pulseOnTime", self.pulse_on_time)?;
        let off_time = timing_byte("pulseOffTime", self.pulse_off_time)?;
        Ok(DrawerKick {
            pin,
            on_time,
            off_time,
        })
    }
}

fn timing_byte(field: &str, value: i64) -> DrawerResult<u8> {
    u8::try_from(value).map_err(|_| {
        DrawerError::InvalidArgument(format!("{} must be 0-255, got {}", field, value))
    })
}

/// Drawer connector pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawerPin {
    /// Connector pin 2 (m = 0)
    #[default]
    Pin2,
    /// Connector pin 5 (m = 1)
    Pin5,
}

impl DrawerPin {
    fn selector(self) -> u8 {
        match self {
            DrawerPin::Pin2 => 0x00,
            DrawerPin::Pin5 => 0x01,
        }
    }
}

impl TryFrom<i64> for DrawerPin {
    type Error = DrawerError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DrawerPin::Pin2),
            1 => Ok(DrawerPin::Pin5),
            other => Err(DrawerError::InvalidArgument(format!(
                "pin must be 0 or 1, got {}",
                other
            ))),
        }
    }
}

/// Validated drawer pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawerKick {
    pub pin: DrawerPin,
    pub on_time: u8,
    pub off_time: u8,
}

impl Default for DrawerKick {
    fn default() -> Self {
        Self {
            pin: DrawerPin::Pin2,
            on_time: DEFAULT_PULSE_ON_TIME as u8,
            off_time: DEFAULT_PULSE_OFF_TIME as u8,
        }
    }
}

impl DrawerKick {
    /// Encode as `ESC p m t1 t2`
    pub fn encode(&self) -> [u8; DRAWER_KICK_LEN] {
        [
            PULSE_PREFIX[0],
            PULSE_PREFIX[1],
            self.pin.selector(),
            self.on_time,
            self.off_time,
        ]
    }
}

/// Validate and encode caller options in one step
pub fn encode(options: &DrawerOptions) -> DrawerResult<[u8; DRAWER_KICK_LEN]> {
    Ok(options.validate()?.encode())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::ErrorCode;

    #[test]
    fn test_default_command() {
        let bytes = encode(&DrawerOptions::default()).unwrap();
        assert_eq!(bytes, [0x1B, 0x70, 0x00, 0x32, 0xFA]);
        assert_eq!(DrawerKick::default().encode(), bytes);
    }

    #[test]
    fn test_pin_changes_only_selector() {
        let a = encode(&DrawerOptions::new(0, 25, 250)).unwrap();
        let b = encode(&DrawerOptions::new(1, 25, 250)).unwrap();
        assert_eq!(a[2], 0x00);
        assert_eq!(b[2], 0x01);
        for i in [0, 1, 3, 4] {
            assert_eq!(a[i], b[i]);
        }
    }

    #[test]
    fn test_timing_changes_only_its_byte() {
        let base = encode(&DrawerOptions::new(0, 10, 20)).unwrap();
        let on = encode(&DrawerOptions::new(0, 11, 20)).unwrap();
        let off = encode(&DrawerOptions::new(0, 10, 21)).unwrap();

        assert_eq!(on[3], 11);
        assert_eq!(off[4], 21);
        for i in [0, 1, 2, 4] {
            assert_eq!(base[i], on[i]);
        }
        for i in [0, 1, 2, 3] {
            assert_eq!(base[i], off[i]);
        }
    }

    #[test]
    fn test_full_domain_is_deterministic() {
        for pin in 0..=1 {
            for t in [0i64, 1, 127, 128, 254, 255] {
                let opts = DrawerOptions::new(pin, t, 255 - t);
                let first = encode(&opts).unwrap();
                assert_eq!(first, encode(&opts).unwrap());
                assert_eq!(&first[..2], &[0x1B, 0x70]);
                assert_eq!(first[3] as i64, t);
                assert_eq!(first[4] as i64, 255 - t);
            }
        }
    }

    #[test]
    fn test_out_of_range_rejected() {
        for opts in [
            DrawerOptions::new(2, 50, 250),
            DrawerOptions::new(-1, 50, 250),
            DrawerOptions::new(0, 256, 250),
            DrawerOptions::new(0, -1, 250),
            DrawerOptions::new(0, 50, 300),
        ] {
            let err = encode(&opts).unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidArgument);
        }
    }

    #[test]
    fn test_error_names_field() {
        let err = DrawerOptions::new(0, 50, 999).validate().unwrap_err();
        assert!(err.to_string().contains("pulseOffTime"));
    }

    #[test]
    fn test_options_from_json() {
        let opts: DrawerOptions = serde_json::from_str(r#"{"pin":1,"pulseOnTime":25}"#).unwrap();
        assert_eq!(opts, DrawerOptions::new(1, 25, DEFAULT_PULSE_OFF_TIME));
    }
}
