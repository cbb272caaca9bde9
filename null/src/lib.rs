//! Nullable value types that tell null apart from zero.
//!
//! A null value always encodes to JSON `null` and binds as SQL `NULL`.
//!
//! - [`NullTime`]: nullable UTC timestamp, RFC 3339 in JSON
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use giztoy_null::NullTime;
//!
//! let t = NullTime::from_time(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());
//! let json = serde_json::to_string(&t).unwrap();
//! assert_eq!(json, r#""2024-01-15T10:30:00Z""#);
//!
//! let null: NullTime = serde_json::from_str("null").unwrap();
//! assert!(null.ptr().is_none());
//! assert_eq!(serde_json::to_string(&null).unwrap(), "null");
//! ```

mod error;
#[cfg(feature = "sqlx")]
mod sql;
mod time;

pub use error::{NullError, NullResult};
pub use time::{is_zero_time, NullTime};
