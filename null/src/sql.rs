//! SQL interop through sqlx.
//!
//! `NullTime` maps to the same column types as `DateTime<Utc>` for every
//! database sqlx supports it on. A null value binds as SQL `NULL` and a SQL
//! `NULL` decodes to the null value. No zero collapse happens here.

use chrono::{DateTime, Utc};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::{Database, Decode, Encode, Type};

use crate::NullTime;

impl<DB: Database> Type<DB> for NullTime
where
    DateTime<Utc>: Type<DB>,
{
    fn type_info() -> DB::TypeInfo {
        <DateTime<Utc> as Type<DB>>::type_info()
    }

    fn compatible(ty: &DB::TypeInfo) -> bool {
        <DateTime<Utc> as Type<DB>>::compatible(ty)
    }
}

impl<'q, DB: Database> Encode<'q, DB> for NullTime
where
    DateTime<Utc>: Encode<'q, DB>,
{
    fn encode_by_ref(
        &self,
        buf: &mut <DB as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, BoxDynError> {
        match self.ptr() {
            Some(t) => <DateTime<Utc> as Encode<'q, DB>>::encode_by_ref(t, buf),
            None => Ok(IsNull::Yes),
        }
    }
}

impl<'r, DB: Database> Decode<'r, DB> for NullTime
where
    DateTime<Utc>: Decode<'r, DB>,
{
    fn decode(value: <DB as Database>::ValueRef<'r>) -> Result<Self, BoxDynError> {
        let time = <Option<DateTime<Utc>> as Decode<'r, DB>>::decode(value)?;
        Ok(NullTime::from_option(time))
    }
}
