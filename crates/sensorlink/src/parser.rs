// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Frame parser for the device wire format.
//!
//! One frame per line, fixed-width ASCII:
//!
//! ```text
//! 0   2   4
//! +---+---+-----------------+
//! | id|code| value or "ERR" |\r?\n
//! +---+---+-----------------+
//! ```
//!
//! `ERR` means the device flagged a sensor fault; it is stored as `0`.

use crate::error::ParseError;
use crate::measurement::{Measurement, SensorCodeTable, SensorKind};

/// Value token sent by the device when a sensor read failed.
pub const ERROR_TOKEN: &str = "ERR";

/// Minimum frame length: device id plus sensor code.
pub const HEADER_LEN: usize = 4;

/// Turns raw lines into measurements using a fixed code table.
#[derive(Debug, Clone, Default)]
pub struct FrameParser {
    table: SensorCodeTable,
}

impl FrameParser {
    /// Create a parser over the given code table.
    pub fn new(table: SensorCodeTable) -> Self {
        Self { table }
    }

    /// Code table in use.
    pub fn table(&self) -> &SensorCodeTable {
        &self.table
    }

    /// Resolve a sensor code through the table.
    pub fn sensor_kind(&self, code: &str) -> SensorKind {
        self.table.lookup(code)
    }

    /// Parse one line.
    ///
    /// Line terminators and trailing whitespace are ignored. Unknown sensor
    /// codes are accepted as [`SensorKind::Unknown`].
    pub fn parse(&self, line: &[u8], owner: &str) -> Result<Measurement, ParseError> {
        let frame = line.trim_ascii_end();
        if frame.len() < HEADER_LEN {
            return Err(ParseError::Truncated { len: frame.len() });
        }

        let device_id = String::from_utf8_lossy(&frame[..2]).into_owned();
        let code = String::from_utf8_lossy(&frame[2..HEADER_LEN]);
        let sensor_kind = self.table.lookup(&code);

        let value = match std::str::from_utf8(&frame[HEADER_LEN..]).map(str::trim) {
            Ok(ERROR_TOKEN) => 0,
            Ok(raw) => raw.parse::<i64>().map_err(|_| malformed(line))?,
            Err(_) => return Err(malformed(line)),
        };

        Ok(Measurement {
            device_id,
            sensor_kind,
            value,
            owner: owner.to_string(),
        })
    }
}

fn malformed(line: &[u8]) -> ParseError {
    ParseError::MalformedValue {
        line: String::from_utf8_lossy(line).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Measurement, ParseError> {
        FrameParser::default().parse(line.as_bytes(), "jay")
    }

    #[test]
    fn test_parse_valid_reading() {
        let m = parse("01LI123\n").expect("valid frame");
        assert_eq!(m.device_id, "01");
        assert_eq!(m.sensor_kind, SensorKind::Light);
        assert_eq!(m.value, 123);
        assert_eq!(m.owner, "jay");
    }

    #[test]
    fn test_parse_every_known_code() {
        let cases = [
            ("05LI1", SensorKind::Light),
            ("05HU2", SensorKind::Humidity),
            ("05ST3", SensorKind::SoilTemperature),
            ("05AT4", SensorKind::AirTemperature),
            ("05SM5", SensorKind::SoilMoisture),
        ];
        for (line, kind) in cases {
            assert_eq!(parse(line).expect(line).sensor_kind, kind, "{line}");
        }
    }

    #[test]
    fn test_parse_error_token_is_zero() {
        let m = parse("02HUERR\n").expect("ERR is not a failure");
        assert_eq!(m.device_id, "02");
        assert_eq!(m.sensor_kind, SensorKind::Humidity);
        assert_eq!(m.value, 0);

        assert_eq!(parse("02HUERR\r\n").expect("crlf").value, 0);
    }

    #[test]
    fn test_parse_truncated() {
        assert_eq!(parse(""), Err(ParseError::Truncated { len: 0 }));
        assert_eq!(parse("01L"), Err(ParseError::Truncated { len: 3 }));
        // Terminator bytes do not count towards the header.
        assert_eq!(parse("01L\r\n"), Err(ParseError::Truncated { len: 3 }));
    }

    #[test]
    fn test_parse_malformed_value() {
        let err = parse("03ATabc\n").expect_err("non-integer value");
        assert_eq!(
            err,
            ParseError::MalformedValue {
                line: "03ATabc\n".to_string()
            }
        );

        assert!(matches!(parse("03AT"), Err(ParseError::MalformedValue { .. })));
        assert!(matches!(parse("03AT1.5"), Err(ParseError::MalformedValue { .. })));
        assert!(matches!(parse("03ATerr"), Err(ParseError::MalformedValue { .. })));
    }

    #[test]
    fn test_parse_non_utf8_value_is_malformed() {
        let err = FrameParser::default()
            .parse(b"03AT\xff\xfe\n", "jay")
            .expect_err("binary value");
        assert!(matches!(err, ParseError::MalformedValue { .. }));
    }

    #[test]
    fn test_parse_unknown_code_passes_through() {
        let m = parse("04XX42\n").expect("unknown code is tolerated");
        assert_eq!(m.sensor_kind, SensorKind::Unknown);
        assert_eq!(m.value, 42);
    }

    #[test]
    fn test_parse_signed_and_padded_values() {
        assert_eq!(parse("01ST-5\n").expect("negative").value, -5);
        assert_eq!(parse("01ST 17  \n").expect("padded").value, 17);
    }

    #[test]
    fn test_parse_with_custom_table() {
        let parser = FrameParser::new(SensorCodeTable::empty().with_code("QQ", SensorKind::Humidity));
        let m = parser.parse(b"09QQ7", "lab").expect("custom code");
        assert_eq!(m.sensor_kind, SensorKind::Humidity);
        assert_eq!(m.owner, "lab");
        assert_eq!(parser.sensor_kind("LI"), SensorKind::Unknown);
    }
}
