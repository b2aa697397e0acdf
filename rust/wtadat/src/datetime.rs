//! Conversion between the Unix timestamps stored in data files and local wall-clock
//! datetimes, and the [`DecodeOptions`] that select the local UTC offset.
use time::{
    format_description::FormatItem, macros::format_description, OffsetDateTime,
    PrimitiveDateTime, UtcOffset,
};

/// Seconds added to a timestamp whose local hour is midnight before decoding it
/// again. Corrects a timezone artifact of the file producer.
pub const MIDNIGHT_CORRECTION_SECS: i64 = 2 * 3600;

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
const DATETIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Options controlling how timestamps are decoded and how query date strings are
/// interpreted.
///
/// The producer writes Unix timestamps and readers interpret them in the local
/// timezone. One fixed UTC offset is applied to the whole file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    utc_offset: UtcOffset,
}

impl Default for DecodeOptions {
    /// Interprets timestamps in UTC.
    fn default() -> Self {
        Self {
            utc_offset: UtcOffset::UTC,
        }
    }
}

impl DecodeOptions {
    /// Creates options that interpret timestamps at the process's current local UTC
    /// offset.
    ///
    /// # Errors
    /// This function returns an error if the local offset can't be determined, which
    /// on some platforms is the case once the process has spawned other threads.
    pub fn local() -> crate::Result<Self> {
        let utc_offset = UtcOffset::current_local_offset().map_err(|e| {
            crate::Error::decode(format!("unable to determine the local UTC offset: {e}"))
        })?;
        Ok(Self { utc_offset })
    }

    /// Sets the UTC offset used as local time. Defaults to UTC.
    pub fn with_utc_offset(mut self, utc_offset: UtcOffset) -> Self {
        self.utc_offset = utc_offset;
        self
    }

    /// Returns the UTC offset used as local time.
    pub fn utc_offset(&self) -> UtcOffset {
        self.utc_offset
    }

    /// Converts `secs` since the Unix epoch to a local datetime. If the local hour
    /// is 0, the result is instead the local datetime of `secs` plus
    /// [`MIDNIGHT_CORRECTION_SECS`].
    ///
    /// # Errors
    /// This function returns an error if the timestamp is outside the range of
    /// representable datetimes.
    pub fn decode_unix_timestamp(&self, secs: i64) -> crate::Result<PrimitiveDateTime> {
        let local = self.to_local(secs)?;
        if local.hour() != 0 {
            return Ok(local);
        }
        let corrected = secs.checked_add(MIDNIGHT_CORRECTION_SECS).ok_or_else(|| {
            crate::Error::decode(format!("timestamp {secs} is out of range"))
        })?;
        self.to_local(corrected)
    }

    /// Parses a query bound in `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS` form as local
    /// time and returns seconds since the Unix epoch. A date without a time is
    /// midnight.
    ///
    /// # Errors
    /// This function returns [`Error::BadArgument`](crate::Error::BadArgument)
    /// naming `param_name` if `s` matches neither form.
    pub fn parse_query_time(&self, s: &str, param_name: &str) -> crate::Result<i64> {
        let parsed = if s.contains(' ') {
            PrimitiveDateTime::parse(s, DATETIME_FORMAT)
        } else {
            time::Date::parse(s, DATE_FORMAT).map(|date| date.midnight())
        };
        let datetime = parsed.map_err(|e| {
            crate::Error::bad_argument(
                param_name,
                format!("'{s}' is not a 'YYYY-MM-DD' or 'YYYY-MM-DD HH:MM:SS' date: {e}"),
            )
        })?;
        Ok(datetime.assume_offset(self.utc_offset).unix_timestamp())
    }

    fn to_local(&self, secs: i64) -> crate::Result<PrimitiveDateTime> {
        let shifted = secs
            .checked_add(i64::from(self.utc_offset.whole_seconds()))
            .and_then(|shifted| OffsetDateTime::from_unix_timestamp(shifted).ok())
            .ok_or_else(|| crate::Error::decode(format!("timestamp {secs} is out of range")))?;
        Ok(PrimitiveDateTime::new(shifted.date(), shifted.time()))
    }
}

/// Formats `datetime` as `YYYY-MM-DD HH:MM:SS`.
///
/// # Errors
/// This function returns an error if `datetime` can't be formatted, such as when its
/// year has more than four digits.
pub fn format_datetime(datetime: &PrimitiveDateTime) -> crate::Result<String> {
    datetime
        .format(DATETIME_FORMAT)
        .map_err(|e| crate::Error::encode(format!("formatting datetime {datetime}: {e}")))
}

pub(crate) fn serialize_datetime<S: serde::Serializer>(
    datetime: &PrimitiveDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let formatted = format_datetime(datetime).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&formatted)
}
