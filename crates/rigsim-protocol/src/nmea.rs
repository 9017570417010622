//! NMEA-0183 sentence generation
//!
//! Renders a [`GpsFix`] into the five sentence types a consumer-grade GPS
//! receiver emits each cycle: GGA, RMC, GSA, GSV and VTG. Generation is pure
//! and deterministic; the same fix always yields byte-identical sentences.

/// Maximum number of satellites carried in a fix
pub const MAX_SATELLITES: usize = 12;

/// Satellites per GSV sentence
pub const GSV_SATS_PER_SENTENCE: usize = 4;

/// Knots to km/h conversion factor used by VTG
pub const KNOTS_TO_KMH: f32 = 1.852;

/// One simulated satellite in view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Satellite {
    /// Pseudo-random noise code identifying the satellite
    pub prn: u8,
    /// Elevation above the horizon in degrees
    pub elevation: u8,
    /// Azimuth in degrees true
    pub azimuth: u16,
    /// Signal-to-noise ratio in dB-Hz
    pub snr: u8,
}

/// Simulated UTC wall clock
///
/// Advances in whole seconds with cascading rollover. Every month is 28 days
/// long; this keeps the clock monotonic without a calendar table and is the
/// behavior clients were tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtcClock {
    /// Hour (0-23)
    pub hour: u8,
    /// Minute (0-59)
    pub minute: u8,
    /// Second (0-59)
    pub second: u8,
    /// Day of month (1-28)
    pub day: u8,
    /// Month (1-12)
    pub month: u8,
    /// Four-digit year
    pub year: u16,
}

impl Default for UtcClock {
    fn default() -> Self {
        Self {
            hour: 12,
            minute: 0,
            second: 0,
            day: 1,
            month: 1,
            year: 2025,
        }
    }
}

impl UtcClock {
    /// Advance the clock by exactly one second
    pub fn advance_second(&mut self) {
        self.second += 1;
        if self.second >= 60 {
            self.second = 0;
            self.minute += 1;
            if self.minute >= 60 {
                self.minute = 0;
                self.hour += 1;
                if self.hour >= 24 {
                    self.hour = 0;
                    self.day += 1;
                    if self.day > 28 {
                        self.day = 1;
                        self.month += 1;
                        if self.month > 12 {
                            self.month = 1;
                            self.year += 1;
                        }
                    }
                }
            }
        }
    }
}

/// Complete GPS fix state rendered into NMEA sentences
#[derive(Debug, Clone, PartialEq)]
pub struct GpsFix {
    /// Latitude in signed decimal degrees (north positive)
    pub latitude: f64,
    /// Longitude in signed decimal degrees (east positive)
    pub longitude: f64,
    /// Altitude above mean sea level in meters
    pub altitude: f32,
    /// Geoid separation in meters
    pub geoid_separation: f32,
    /// Speed over ground in knots
    pub speed_knots: f32,
    /// Course over ground, degrees true
    pub course_true: f32,
    /// Course over ground, degrees magnetic
    pub course_magnetic: f32,
    /// Magnetic variation in degrees (east positive)
    pub mag_variation: f32,
    /// Fix quality (0 = invalid, 1 = GPS, 2 = DGPS)
    pub fix_quality: u8,
    /// Fix mode (1 = none, 2 = 2D, 3 = 3D)
    pub fix_mode: u8,
    /// Satellites used in the fix (GGA field)
    pub satellites_used: u8,
    /// Position dilution of precision
    pub pdop: f32,
    /// Horizontal dilution of precision
    pub hdop: f32,
    /// Vertical dilution of precision
    pub vdop: f32,
    /// Satellites in view, at most [`MAX_SATELLITES`]
    pub satellites: Vec<Satellite>,
    /// Simulated UTC time
    pub clock: UtcClock,
}

impl Default for GpsFix {
    fn default() -> Self {
        Self {
            // San Francisco
            latitude: 37.7749,
            longitude: -122.4194,
            altitude: 10.0,
            geoid_separation: -34.0,
            speed_knots: 0.0,
            course_true: 0.0,
            course_magnetic: 0.0,
            mag_variation: 13.0,
            fix_quality: 1,
            fix_mode: 3,
            satellites_used: 8,
            pdop: 1.5,
            hdop: 1.0,
            vdop: 1.2,
            satellites: default_constellation(),
            clock: UtcClock::default(),
        }
    }
}

/// The fixed constellation the simulator starts with
fn default_constellation() -> Vec<Satellite> {
    [
        (2, 45, 120, 42),
        (5, 67, 230, 45),
        (9, 23, 45, 38),
        (12, 34, 315, 40),
        (15, 56, 180, 44),
        (18, 12, 90, 35),
        (21, 78, 270, 47),
        (25, 41, 150, 41),
    ]
    .into_iter()
    .map(|(prn, elevation, azimuth, snr)| Satellite {
        prn,
        elevation,
        azimuth,
        snr,
    })
    .collect()
}

impl GpsFix {
    /// Whether the receiver currently reports a usable fix
    pub fn has_valid_fix(&self) -> bool {
        self.fix_quality > 0
    }

    /// Hemisphere letter for the current latitude
    pub fn lat_hemisphere(&self) -> char {
        if self.latitude >= 0.0 {
            'N'
        } else {
            'S'
        }
    }

    /// Hemisphere letter for the current longitude
    pub fn lon_hemisphere(&self) -> char {
        if self.longitude >= 0.0 {
            'E'
        } else {
            'W'
        }
    }

    /// Set the position in decimal degrees
    pub fn set_position(&mut self, latitude: f64, longitude: f64, altitude: f32) {
        self.latitude = latitude;
        self.longitude = longitude;
        self.altitude = altitude;
    }

    /// All sentences for one output cycle, in emission order
    pub fn sentences(&self) -> Vec<String> {
        let mut out = vec![self.gga(), self.rmc(), self.gsa()];
        out.extend(self.gsv());
        out.push(self.vtg());
        out
    }

    /// GGA - fix data (time, position, altitude)
    pub fn gga(&self) -> String {
        finish_sentence(format!(
            "$GPGGA,{},{},{},{},{},{},{:02},{:.1},{:.1},M,{:.1},M,,",
            format_time(&self.clock),
            format_latitude(self.latitude),
            self.lat_hemisphere(),
            format_longitude(self.longitude),
            self.lon_hemisphere(),
            self.fix_quality,
            self.satellites_used,
            self.hdop,
            self.altitude,
            self.geoid_separation,
        ))
    }

    /// RMC - recommended minimum navigation data
    pub fn rmc(&self) -> String {
        let status = if self.has_valid_fix() { 'A' } else { 'V' };
        let mag_dir = if self.mag_variation >= 0.0 { 'E' } else { 'W' };
        finish_sentence(format!(
            "$GPRMC,{},{},{},{},{},{},{:.1},{:.1},{},{:.1},{},A",
            format_time(&self.clock),
            status,
            format_latitude(self.latitude),
            self.lat_hemisphere(),
            format_longitude(self.longitude),
            self.lon_hemisphere(),
            self.speed_knots,
            self.course_true,
            format_date(&self.clock),
            self.mag_variation.abs(),
            mag_dir,
        ))
    }

    /// GSA - fix mode, active satellite PRNs and dilution of precision
    pub fn gsa(&self) -> String {
        let mut body = format!("$GPGSA,A,{}", self.fix_mode);
        for i in 0..12 {
            match self.satellites.get(i) {
                Some(sat) if sat.prn > 0 => body.push_str(&format!(",{:02}", sat.prn)),
                _ => body.push(','),
            }
        }
        body.push_str(&format!(",{:.1},{:.1},{:.1}", self.pdop, self.hdop, self.vdop));
        finish_sentence(body)
    }

    /// GSV - satellites in view, four per sentence
    ///
    /// The final sentence carries only the satellites that exist; remaining
    /// fields are not padded.
    pub fn gsv(&self) -> Vec<String> {
        let in_view = self.satellites.len();
        let num_msgs = (in_view + GSV_SATS_PER_SENTENCE - 1) / GSV_SATS_PER_SENTENCE;
        let num_msgs = num_msgs.max(1);

        (0..num_msgs)
            .map(|msg| {
                let mut body = format!("$GPGSV,{},{},{:02}", num_msgs, msg + 1, in_view);
                let start = msg * GSV_SATS_PER_SENTENCE;
                for sat in self.satellites.iter().skip(start).take(GSV_SATS_PER_SENTENCE) {
                    body.push_str(&format!(
                        ",{:02},{:02},{:03},{:02}",
                        sat.prn, sat.elevation, sat.azimuth, sat.snr
                    ));
                }
                finish_sentence(body)
            })
            .collect()
    }

    /// VTG - course and speed over ground
    pub fn vtg(&self) -> String {
        let speed_kmh = self.speed_knots * KNOTS_TO_KMH;
        finish_sentence(format!(
            "$GPVTG,{:.1},T,{:.1},M,{:.1},N,{:.1},K,A",
            self.course_true, self.course_magnetic, self.speed_knots, speed_kmh,
        ))
    }
}

/// XOR checksum over the bytes between `$` and `*` (both exclusive)
pub fn checksum(sentence: &str) -> u8 {
    sentence
        .bytes()
        .skip_while(|&b| b == b'$')
        .take_while(|&b| b != b'*')
        .fold(0, |acc, b| acc ^ b)
}

/// Append the checksum and CRLF terminator to a sentence body
fn finish_sentence(body: String) -> String {
    let sum = checksum(&body);
    format!("{}*{:02X}\r\n", body, sum)
}

/// Latitude as DDMM.MMMM
fn format_latitude(lat: f64) -> String {
    let abs = lat.abs();
    let degrees = abs as u32;
    let minutes = (abs - degrees as f64) * 60.0;
    format!("{:02}{:07.4}", degrees, minutes)
}

/// Longitude as DDDMM.MMMM
fn format_longitude(lon: f64) -> String {
    let abs = lon.abs();
    let degrees = abs as u32;
    let minutes = (abs - degrees as f64) * 60.0;
    format!("{:03}{:07.4}", degrees, minutes)
}

/// Time as HHMMSS.00
fn format_time(clock: &UtcClock) -> String {
    format!("{:02}{:02}{:02}.00", clock.hour, clock.minute, clock.second)
}

/// Date as DDMMYY
fn format_date(clock: &UtcClock) -> String {
    format!("{:02}{:02}{:02}", clock.day, clock.month, clock.year % 100)
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_fix() -> impl Strategy<Value = GpsFix> {
        (
            -90.0f64..90.0,
            -180.0f64..180.0,
            0usize..=MAX_SATELLITES,
            0.0f32..100.0,
        )
            .prop_map(|(lat, lon, sats, speed)| {
                let mut fix = GpsFix::default();
                fix.latitude = lat;
                fix.longitude = lon;
                fix.speed_knots = speed;
                fix.satellites = (0..sats)
                    .map(|i| Satellite {
                        prn: (i + 1) as u8,
                        elevation: (i * 7 % 90) as u8,
                        azimuth: (i * 45 % 360) as u16,
                        snr: (30 + i) as u8,
                    })
                    .collect();
                fix
            })
    }

    proptest! {
        #[test]
        fn every_sentence_checksum_is_valid(fix in arb_fix()) {
            for sentence in fix.sentences() {
                let star = sentence.find('*').unwrap();
                let digits = u8::from_str_radix(&sentence[star + 1..star + 3], 16).unwrap();
                prop_assert_eq!(checksum(&sentence[..star]), digits);
            }
        }

        #[test]
        fn gsv_count_is_ceiling_of_quarters(fix in arb_fix()) {
            let n = fix.satellites.len();
            let expected = if n == 0 { 1 } else { (n + 3) / 4 };
            prop_assert_eq!(fix.gsv().len(), expected);
        }
    }
}
