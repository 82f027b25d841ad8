//! Utility functions for timestamp handling.

pub mod timestamps;

pub use timestamps::{
    display_stamp, file_stamp, format_iso8601, now_utc, parse_timestamp,
    Timestamp, TimestampError,
};
