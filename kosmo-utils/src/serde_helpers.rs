use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::de::Error;
use serde::{Deserialize, Serialize};

/// LCD nodes encode 64-bit integers as strings, older ones as numbers
struct StringOrNumber(u64);

impl Serialize for StringOrNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if self.0 <= 0x1fffffffffffffu64 || !serializer.is_human_readable() {
            serializer.serialize_u64(self.0)
        } else {
            serializer.serialize_str(&self.0.to_string())
        }
    }
}

impl<'de> Deserialize<'de> for StringOrNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Value<'a> {
            String(#[serde(borrow)] Cow<'a, str>),
            Number(u64),
        }

        match Value::deserialize(deserializer)? {
            Value::String(str) => u64::from_str(str.as_ref())
                .map(Self)
                .map_err(|_| D::Error::custom("Invalid number")),
            Value::Number(value) => Ok(Self(value)),
        }
    }
}

pub mod serde_u64 {
    use super::*;

    pub fn serialize<S>(data: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        StringOrNumber(*data).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        StringOrNumber::deserialize(deserializer).map(|StringOrNumber(x)| x)
    }
}

pub mod serde_optional_u64 {
    use super::*;

    pub fn serialize<S>(data: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        data.map(StringOrNumber).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(|StringOrNumber(x)| x))
    }
}

pub mod serde_duration_ms {
    use super::*;

    pub fn serialize<S>(data: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        StringOrNumber(data.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        StringOrNumber::deserialize(deserializer).map(|StringOrNumber(x)| Duration::from_millis(x))
    }
}

/// Protobuf JSON duration, e.g. `"1814400s"` or `"0.5s"`
pub mod serde_proto_duration {
    use super::*;

    pub fn serialize<S>(data: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let secs = data.as_secs();
        let nanos = data.subsec_nanos();
        if nanos == 0 {
            format!("{secs}s").serialize(serializer)
        } else {
            let fraction = format!("{nanos:09}");
            format!("{secs}.{}s", fraction.trim_end_matches('0')).serialize(serializer)
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let data = Cow::<str>::deserialize(deserializer)?;
        parse(&data).ok_or_else(|| D::Error::custom(format!("Invalid duration: {data}")))
    }

    fn parse(data: &str) -> Option<Duration> {
        let data = data.strip_suffix('s')?;
        let (secs, fraction) = match data.split_once('.') {
            Some((secs, fraction)) => (secs, fraction),
            None => (data, ""),
        };

        let secs = u64::from_str(secs).ok()?;
        if fraction.len() > 9 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let nanos = if fraction.is_empty() {
            0
        } else {
            u32::from_str(&format!("{fraction:0<9}")).ok()?
        };

        Some(Duration::new(secs, nanos))
    }
}

pub mod serde_string {
    use super::*;

    pub fn serialize<S>(data: &dyn fmt::Display, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        data.to_string().serialize(serializer)
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: serde::Deserializer<'de>,
        T: FromStr,
        T::Err: fmt::Display,
    {
        Cow::<str>::deserialize(deserializer)
            .and_then(|data| T::from_str(data.trim()).map_err(D::Error::custom))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Params {
        #[serde(with = "serde_proto_duration")]
        unbonding_time: Duration,
        #[serde(with = "serde_u64")]
        height: u64,
        #[serde(default, with = "serde_optional_u64")]
        total: Option<u64>,
        #[serde(with = "serde_string")]
        amount: u128,
    }

    #[test]
    fn parses_lcd_params() {
        let params: Params = serde_json::from_str(
            r#"{"unbonding_time":"1814400s","height":"12345","total":7,"amount":"1000000"}"#,
        )
        .unwrap();

        assert_eq!(params.unbonding_time, Duration::from_secs(1814400));
        assert_eq!(params.height, 12345);
        assert_eq!(params.total, Some(7));
        assert_eq!(params.amount, 1_000_000);
    }

    #[test]
    fn fractional_proto_duration() {
        #[derive(Deserialize, Serialize)]
        struct Wrapper(#[serde(with = "serde_proto_duration")] Duration);

        let Wrapper(duration) = serde_json::from_str(r#""1.5s""#).unwrap();
        assert_eq!(duration, Duration::from_millis(1500));
        assert_eq!(
            serde_json::to_string(&Wrapper(duration)).unwrap(),
            r#""1.5s""#
        );

        assert!(serde_json::from_str::<Wrapper>(r#""15""#).is_err());
        assert!(serde_json::from_str::<Wrapper>(r#""1.x5s""#).is_err());
    }

    #[test]
    fn rejects_non_numeric_strings() {
        assert!(serde_json::from_str::<Params>(
            r#"{"unbonding_time":"1s","height":"abc","amount":"1"}"#
        )
        .is_err());
    }
}
