//! RFC 3339 timestamp parsing for request fields.

use jiff::Timestamp;
use salvo::prelude::StatusError;

use crate::extensions::*;

pub(crate) trait TimestampFieldExt {
    type Output;

    fn parse_timestamp(self, field: &str) -> Result<Self::Output, StatusError>;
}

impl TimestampFieldExt for String {
    type Output = Timestamp;

    fn parse_timestamp(self, field: &str) -> Result<Timestamp, StatusError> {
        self.parse::<Timestamp>()
            .or_400(&format!("could not parse \"{field}\""))
    }
}

impl TimestampFieldExt for Option<String> {
    type Output = Option<Timestamp>;

    fn parse_timestamp(self, field: &str) -> Result<Option<Timestamp>, StatusError> {
        self.map(|value| value.parse_timestamp(field)).transpose()
    }
}
