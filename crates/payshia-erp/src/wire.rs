//! Lenient field decoders for ERP JSON.
//!
//! The backend is not consistent about types: ids and balances arrive as
//! numbers on some endpoints and as strings ("12.000") on others.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
}

/// Decodes an id that may be a string or a number.
pub fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Text(s) => s,
        Scalar::Integer(n) => n.to_string(),
        Scalar::Float(f) => f.to_string(),
    })
}

/// A stock balance as the backend reports it.
///
/// The terminal sells whole units; [`Balance::whole_units`] says what part
/// of the balance can go on a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Balance(f64);

impl Balance {
    pub fn whole_units(&self) -> i64 {
        self.0.floor() as i64
    }

    pub fn is_fractional(&self) -> bool {
        self.0.fract() != 0.0
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Decodes a stock balance without dropping its fraction.
///
/// `null` and empty strings mean zero.
pub fn balance<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Balance, D::Error> {
    let value = Option::<Scalar>::deserialize(deserializer)?;
    let amount = match value {
        None => 0.0,
        Some(Scalar::Integer(n)) => n as f64,
        Some(Scalar::Float(f)) => f,
        Some(Scalar::Text(s)) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>()
                    .map_err(|_| serde::de::Error::custom(format!("invalid quantity: {s}")))?
            }
        }
    };

    if !amount.is_finite() {
        return Err(serde::de::Error::custom(format!("invalid quantity: {amount}")));
    }
    Ok(Balance(amount))
}
