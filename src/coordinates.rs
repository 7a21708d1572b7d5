//! Sexagesimal sky coordinates and report file naming.
//!
//! Input lines look like `05 35 24.550 -05 06 59.00`: right ascension in
//! hours/minutes/seconds followed by declination in degrees/arcminutes/
//! arcseconds. Colons are accepted as field separators as well.

use thiserror::Error;

/// Default extension of report files.
pub const REPORT_EXTENSION: &str = ".txt";

/// Errors that can occur while parsing a coordinate line.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoordinateError {
    /// Line does not split into the six expected fields
    #[error(
        "expected 6 fields (hh mm ss dd mm ss) in '{line}', found {found}\n  Suggestion: Use the form '05 35 24.550 -05 06 59.00'"
    )]
    FieldCount {
        /// The offending line
        line: String,
        /// Number of fields found
        found: usize,
    },

    /// A field is not a number
    #[error("invalid number '{value}' in coordinate line '{line}'")]
    InvalidNumber {
        /// The offending line
        line: String,
        /// The field that failed to parse
        value: String,
    },

    /// A component lies outside its valid range
    #[error("{component} out of range in coordinate line '{line}'")]
    OutOfRange {
        /// The offending line
        line: String,
        /// Which component was rejected
        component: &'static str,
    },
}

/// One sexagesimal angle: sign plus whole units, minutes and seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sexagesimal {
    negative: bool,
    whole: u32,
    minutes: u32,
    seconds: f64,
}

impl Sexagesimal {
    /// Decimal value in the angle's own unit (hours or degrees).
    #[must_use]
    pub fn to_decimal(self) -> f64 {
        let magnitude =
            f64::from(self.whole) + f64::from(self.minutes) / 60.0 + self.seconds / 3600.0;
        if self.negative { -magnitude } else { magnitude }
    }

    /// Whether the angle carries a minus sign, including `-00`.
    #[must_use]
    pub fn is_negative(self) -> bool {
        self.negative
    }
}

/// An ICRS position parsed from sexagesimal text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyCoord {
    ra: Sexagesimal,
    dec: Sexagesimal,
}

impl SkyCoord {
    /// Parses `hh mm ss.sss ±dd mm ss.ss`.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError`] when the line has the wrong shape or a
    /// component is out of range.
    pub fn parse(line: &str) -> Result<Self, CoordinateError> {
        let fields: Vec<&str> = line
            .split(|c: char| c.is_whitespace() || c == ':')
            .filter(|field| !field.is_empty())
            .collect();

        if fields.len() != 6 {
            return Err(CoordinateError::FieldCount {
                line: line.to_string(),
                found: fields.len(),
            });
        }

        let ra = parse_angle(line, &fields[0..3])?;
        let dec = parse_angle(line, &fields[3..6])?;

        if ra.negative || ra.to_decimal() >= 24.0 {
            return Err(CoordinateError::OutOfRange {
                line: line.to_string(),
                component: "right ascension",
            });
        }
        if dec.to_decimal().abs() > 90.0 {
            return Err(CoordinateError::OutOfRange {
                line: line.to_string(),
                component: "declination",
            });
        }

        Ok(Self { ra, dec })
    }

    /// Builds a position from separate right ascension and declination strings.
    ///
    /// # Errors
    ///
    /// Same as [`SkyCoord::parse`].
    pub fn from_parts(ra: &str, dec: &str) -> Result<Self, CoordinateError> {
        Self::parse(&format!("{ra} {dec}"))
    }

    /// Right ascension as `(hours, minutes, seconds)`.
    #[must_use]
    pub fn hms(&self) -> (u32, u32, f64) {
        (self.ra.whole, self.ra.minutes, self.ra.seconds)
    }

    /// Declination as `(degrees, arcminutes, arcseconds)`.
    ///
    /// Every component carries the declination's sign, so `-05 06 59.00`
    /// yields `(-5, -6, -59.0)`.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn dms(&self) -> (i32, i32, f64) {
        let (d, m, s) = (
            self.dec.whole as i32,
            self.dec.minutes as i32,
            self.dec.seconds,
        );
        if self.dec.negative { (-d, -m, -s) } else { (d, m, s) }
    }

    /// Right ascension in degrees.
    #[must_use]
    pub fn ra_degrees(&self) -> f64 {
        self.ra.to_decimal() * 15.0
    }

    /// Declination in degrees.
    #[must_use]
    pub fn dec_degrees(&self) -> f64 {
        self.dec.to_decimal()
    }

    /// Great-circle distance to `other` in arcseconds (Vincenty formula).
    #[must_use]
    pub fn separation_arcsec(&self, other: &SkyCoord) -> f64 {
        let (lon1, lat1) = (self.ra_degrees().to_radians(), self.dec_degrees().to_radians());
        let (lon2, lat2) = (
            other.ra_degrees().to_radians(),
            other.dec_degrees().to_radians(),
        );
        let delta = lon2 - lon1;

        let num1 = lat2.cos() * delta.sin();
        let num2 = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta.cos();
        let denominator = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * delta.cos();

        num1.hypot(num2).atan2(denominator).to_degrees() * 3600.0
    }

    /// Text form used in catalog region queries.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let sign = if self.dec.negative { '-' } else { '+' };
        format!(
            "{:02} {:02} {:06.3} {sign}{:02} {:02} {:06.3}",
            self.ra.whole, self.ra.minutes, self.ra.seconds, self.dec.whole, self.dec.minutes,
            self.dec.seconds
        )
    }
}

fn parse_angle(line: &str, fields: &[&str]) -> Result<Sexagesimal, CoordinateError> {
    let invalid = |value: &str| CoordinateError::InvalidNumber {
        line: line.to_string(),
        value: value.to_string(),
    };

    let whole_field = fields[0];
    let negative = whole_field.starts_with('-');
    let whole = whole_field
        .trim_start_matches(['-', '+'])
        .parse::<u32>()
        .map_err(|_| invalid(whole_field))?;
    let minutes = fields[1].parse::<u32>().map_err(|_| invalid(fields[1]))?;
    let seconds = fields[2].parse::<f64>().map_err(|_| invalid(fields[2]))?;

    if minutes >= 60 {
        return Err(CoordinateError::OutOfRange {
            line: line.to_string(),
            component: "minutes",
        });
    }
    if !(0.0..60.0).contains(&seconds) {
        return Err(CoordinateError::OutOfRange {
            line: line.to_string(),
            component: "seconds",
        });
    }

    Ok(Sexagesimal {
        negative,
        whole,
        minutes,
        seconds,
    })
}

/// Returns a report name such as `J053524.550-050659.000.txt`.
///
/// Components are zero-padded to `hh`, `mm` and `ss.sss`; the sign is `+`
/// iff the declination is not negative.
#[must_use]
pub fn output_filename(coords: &SkyCoord, extension: &str) -> String {
    let (h, m, s) = coords.hms();
    let ra = format!("{h:02}{m:02}{s:06.3}");

    let separator = if coords.dec_degrees() >= 0.0 { '+' } else { '-' };
    let (d, m, s) = coords.dms();
    let dec = format!("{:02}{:02}{:06.3}", d.abs(), m.abs(), s.abs());

    format!("J{ra}{separator}{dec}{extension}")
}
