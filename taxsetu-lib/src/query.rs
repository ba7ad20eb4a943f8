use std::error::Error;

use bytes::BytesMut;
use postgres_types::{to_sql_checked, Type, IsNull, ToSql};
use serde::{Serialize, Deserialize};

/// zero based page index
pub type Page = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Limit {
    Small,
    Medium,
    Large,
}

impl Limit {
    /// coerces a raw query value to the closest permitted page size
    pub fn from_query(given: Option<u8>) -> Self {
        match given {
            Some(v) if v > 50 => Limit::Large,
            Some(v) if v > 25 => Limit::Medium,
            Some(_) => Limit::Small,
            None => Limit::default()
        }
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            Limit::Small => 25,
            Limit::Medium => 50,
            Limit::Large => 100,
        }
    }

    pub fn sql_offset(&self, page: Page) -> i64 {
        self.as_i64() * (page as i64)
    }
}

impl Default for Limit {
    fn default() -> Limit {
        Limit::Small
    }
}

impl ToSql for Limit {
    fn to_sql(&self, ty: &Type, w: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        self.as_i64().to_sql(ty, w)
    }

    fn accepts(ty: &Type) -> bool {
        <i64 as ToSql>::accepts(ty)
    }

    to_sql_checked!();
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn coercion() {
        assert_eq!(Limit::from_query(None), Limit::Small);
        assert_eq!(Limit::from_query(Some(10)), Limit::Small);
        assert_eq!(Limit::from_query(Some(50)), Limit::Medium);
        assert_eq!(Limit::from_query(Some(100)), Limit::Large);
    }

    #[test]
    fn offsets() {
        assert_eq!(Limit::Small.sql_offset(0), 0);
        assert_eq!(Limit::Small.sql_offset(3), 75);
        assert_eq!(Limit::Large.sql_offset(2), 200);
    }
}
