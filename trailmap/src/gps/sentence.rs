//! NMEA 0183 sentence parsing.
//!
//! Only the two sentence families that carry a position are decoded:
//!
//! - `RMC` (recommended minimum): position, validity status and true course
//! - `GGA` (fix data): position and fix quality, no course
//!
//! Both are accepted from a GPS-only (`$GP`) or multi-constellation (`$GN`)
//! talker. Everything else is reported as [`Sentence::Unrecognized`].

use super::SentenceParseError;

/// Geographic position in signed decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

/// A parsed NMEA sentence.
#[derive(Debug, Clone, PartialEq)]
pub enum Sentence {
    /// `$GNRMC` / `$GPRMC`.
    ///
    /// `position` is `None` when the receiver flags the data void (status `V`).
    /// `course` is the true course over ground in degrees, 0 when not reported.
    PositionAndCourse {
        position: Option<Position>,
        course: f64,
    },

    /// `$GNGGA` / `$GPGGA`.
    PositionOnly { position: Position, fix_quality: u8 },

    /// Any other well-formed sentence, identified by its address field.
    Unrecognized(String),
}

impl Sentence {
    /// Parse one NMEA line.
    ///
    /// Surrounding whitespace (including the `\r\n` terminator) is ignored.
    /// A trailing `*hh` checksum is verified when present.
    ///
    /// # Errors
    ///
    /// Returns [`SentenceParseError`] for a missing `$`, a bad checksum or
    /// missing/invalid fields in a recognized sentence.
    pub fn parse(line: &str) -> Result<Self, SentenceParseError> {
        let line = line.trim();
        let body = line
            .strip_prefix('$')
            .ok_or(SentenceParseError::MissingStart)?;

        let body = match body.split_once('*') {
            Some((body, checksum)) => {
                verify_checksum(body, checksum)?;
                body
            }
            None => body,
        };

        let fields: Vec<&str> = body.split(',').collect();
        match fields[0] {
            "GNRMC" | "GPRMC" => parse_rmc(&fields),
            "GNGGA" | "GPGGA" => parse_gga(&fields),
            other => Ok(Sentence::Unrecognized(other.to_string())),
        }
    }
}

/// XOR of every byte between `$` and `*`.
pub fn checksum(body: &str) -> u8 {
    body.bytes().fold(0, |acc, b| acc ^ b)
}

fn verify_checksum(body: &str, transmitted: &str) -> Result<(), SentenceParseError> {
    let transmitted = transmitted.trim();
    if transmitted.len() != 2 {
        return Err(SentenceParseError::MalformedChecksum(transmitted.to_string()));
    }
    let expected = u8::from_str_radix(transmitted, 16)
        .map_err(|_| SentenceParseError::MalformedChecksum(transmitted.to_string()))?;

    let computed = checksum(body);
    if expected != computed {
        return Err(SentenceParseError::ChecksumMismatch { expected, computed });
    }
    Ok(())
}

// $xxRMC,time,status,lat,N/S,lon,E/W,speed,course,date,...
fn parse_rmc(fields: &[&str]) -> Result<Sentence, SentenceParseError> {
    let status = field(fields, 2, "status")?;

    let position = match status {
        "A" => Some(parse_position(fields, 3)?),
        "V" => None,
        other => {
            return Err(SentenceParseError::InvalidField {
                field: "status",
                value: other.to_string(),
            })
        }
    };

    let course = match fields.get(8).map(|s| s.trim()) {
        None | Some("") => 0.0,
        Some(raw) => parse_number(raw, "course")?,
    };

    Ok(Sentence::PositionAndCourse { position, course })
}

// $xxGGA,time,lat,N/S,lon,E/W,quality,...
fn parse_gga(fields: &[&str]) -> Result<Sentence, SentenceParseError> {
    let position = parse_position(fields, 2)?;

    let fix_quality = match fields.get(6).map(|s| s.trim()) {
        None | Some("") => 0,
        Some(raw) => raw
            .parse::<u8>()
            .map_err(|_| SentenceParseError::InvalidField {
                field: "fix quality",
                value: raw.to_string(),
            })?,
    };

    Ok(Sentence::PositionOnly {
        position,
        fix_quality,
    })
}

/// Parse the four fields `lat, N/S, lon, E/W` starting at `start`.
fn parse_position(fields: &[&str], start: usize) -> Result<Position, SentenceParseError> {
    let latitude = parse_coordinate(
        field(fields, start, "latitude")?,
        field(fields, start + 1, "latitude hemisphere")?,
        'N',
        'S',
        "latitude",
    )?;
    let longitude = parse_coordinate(
        field(fields, start + 2, "longitude")?,
        field(fields, start + 3, "longitude hemisphere")?,
        'E',
        'W',
        "longitude",
    )?;

    Ok(Position {
        latitude,
        longitude,
    })
}

/// Convert `ddmm.mmmm` / `dddmm.mmmm` plus a hemisphere letter to signed degrees.
///
/// The minutes always occupy the two digits before the decimal point; the
/// degrees are whatever precedes them.
fn parse_coordinate(
    raw: &str,
    hemisphere: &str,
    positive: char,
    negative: char,
    name: &'static str,
) -> Result<f64, SentenceParseError> {
    let invalid = || SentenceParseError::InvalidField {
        field: name,
        value: raw.to_string(),
    };

    let dot = raw.find('.').unwrap_or(raw.len());
    if dot < 2 {
        return Err(invalid());
    }
    let (degrees, minutes) = raw.split_at(dot - 2);
    let degrees: f64 = if degrees.is_empty() {
        0.0
    } else {
        degrees.parse().map_err(|_| invalid())?
    };
    let minutes: f64 = minutes.parse().map_err(|_| invalid())?;
    if !(0.0..60.0).contains(&minutes) || degrees < 0.0 {
        return Err(invalid());
    }
    let value = degrees + minutes / 60.0;

    let mut letters = hemisphere.chars();
    match (letters.next(), letters.next()) {
        (Some(c), None) if c == positive => Ok(value),
        (Some(c), None) if c == negative => Ok(-value),
        _ => Err(SentenceParseError::InvalidField {
            field: "hemisphere",
            value: hemisphere.to_string(),
        }),
    }
}

fn field<'a>(
    fields: &[&'a str],
    index: usize,
    name: &'static str,
) -> Result<&'a str, SentenceParseError> {
    match fields.get(index).map(|s| s.trim()) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(SentenceParseError::MissingField(name)),
    }
}

fn parse_number(raw: &str, name: &'static str) -> Result<f64, SentenceParseError> {
    raw.parse().map_err(|_| SentenceParseError::InvalidField {
        field: name,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_active_rmc() {
        let sentence = Sentence::parse(
            "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A\r\n",
        )
        .unwrap();

        match sentence {
            Sentence::PositionAndCourse {
                position: Some(position),
                course,
            } => {
                assert_close(position.latitude, 48.1173);
                assert_close(position.longitude, 11.516666);
                assert_close(course, 84.4);
            }
            other => panic!("unexpected sentence {:?}", other),
        }
    }

    #[test]
    fn test_rmc_empty_course_is_zero() {
        let sentence =
            Sentence::parse("$GNRMC,201512.00,A,3833.06420,N,12127.64440,W,0.012,,161026,,,A*76")
                .unwrap();

        match sentence {
            Sentence::PositionAndCourse {
                position: Some(position),
                course,
            } => {
                assert_close(position.latitude, 38.55107);
                assert_close(position.longitude, -121.46074);
                assert_eq!(course, 0.0);
            }
            other => panic!("unexpected sentence {:?}", other),
        }
    }

    #[test]
    fn test_southern_hemisphere() {
        let sentence =
            Sentence::parse("$GPRMC,081836,A,3751.65,S,14507.36,E,000.0,360.0,130998,011.3,E*62")
                .unwrap();

        let Sentence::PositionAndCourse {
            position: Some(position),
            ..
        } = sentence
        else {
            panic!("expected an active RMC sentence");
        };
        assert_close(position.latitude, -37.860833);
        assert_close(position.longitude, 145.122666);
    }

    #[test]
    fn test_void_rmc_has_no_position() {
        let sentence = Sentence::parse("$GPRMC,123519,V,,,,,,,230394,,,N*51").unwrap();
        assert_eq!(
            sentence,
            Sentence::PositionAndCourse {
                position: None,
                course: 0.0
            }
        );
    }

    #[test]
    fn test_gga() {
        let sentence =
            Sentence::parse("$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47")
                .unwrap();

        let Sentence::PositionOnly {
            position,
            fix_quality,
        } = sentence
        else {
            panic!("expected GGA");
        };
        assert_close(position.latitude, 48.1173);
        assert_eq!(fix_quality, 1);
    }

    #[test]
    fn test_gga_without_position_is_an_error() {
        let result = Sentence::parse("$GPGGA,123519,,,,,0,00,,,M,,M,,*6B");
        assert_eq!(result, Err(SentenceParseError::MissingField("latitude")));
    }

    #[test]
    fn test_unrecognized_sentence() {
        let sentence = Sentence::parse(
            "$GPGSV,3,1,11,03,03,111,00,04,15,270,00,06,01,010,00,13,06,292,00*74",
        )
        .unwrap();
        assert_eq!(sentence, Sentence::Unrecognized("GPGSV".to_string()));
    }

    #[test]
    fn test_checksum_mismatch_rejected() {
        let result =
            Sentence::parse("$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6B");
        assert_eq!(
            result,
            Err(SentenceParseError::ChecksumMismatch {
                expected: 0x6B,
                computed: 0x6A
            })
        );
    }

    #[test]
    fn test_malformed_checksum_rejected() {
        let result = Sentence::parse("$GPRMC,123519,V,,,,,,,230394,,,N*Z1");
        assert!(matches!(
            result,
            Err(SentenceParseError::MalformedChecksum(_))
        ));
    }

    #[test]
    fn test_checksum_is_optional() {
        let sentence =
            Sentence::parse("$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W")
                .unwrap();
        assert!(matches!(
            sentence,
            Sentence::PositionAndCourse {
                position: Some(_),
                ..
            }
        ));
    }

    #[test]
    fn test_missing_dollar_rejected() {
        assert_eq!(
            Sentence::parse("GPRMC,123519,V"),
            Err(SentenceParseError::MissingStart)
        );
        assert_eq!(Sentence::parse(""), Err(SentenceParseError::MissingStart));
    }

    #[test]
    fn test_bad_hemisphere_rejected() {
        let result = Sentence::parse("$GPRMC,123519,A,4807.038,X,01131.000,E,022.4,084.4,230394,,");
        assert!(matches!(
            result,
            Err(SentenceParseError::InvalidField {
                field: "hemisphere",
                ..
            })
        ));
    }

    #[test]
    fn test_truncated_rmc_rejected() {
        let result = Sentence::parse("$GPRMC,123519,A,4807.0");
        assert_eq!(
            result,
            Err(SentenceParseError::MissingField("latitude hemisphere"))
        );
    }

    #[test]
    fn test_checksum_function() {
        assert_eq!(checksum("GPRMC,123519,V,,,,,,,230394,,,N"), 0x51);
    }
}
