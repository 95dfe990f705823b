//! Reducers turning a round's qualifying prices into one index value

use crate::error::MarketDataError;
use crate::types::parse_price;
use crate::Result;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Aggregation strategy applied to the prices collected for a round.
///
/// Any `Fn(&[String]) -> Result<f64>` is a reducer, so plain functions such
/// as [`mean_price`] can be passed directly.
#[cfg_attr(test, mockall::automock)]
pub trait PriceReducer {
    fn reduce(&self, prices: &[String]) -> Result<f64>;
}

impl<F> PriceReducer for F
where
    F: Fn(&[String]) -> Result<f64>,
{
    fn reduce(&self, prices: &[String]) -> Result<f64> {
        self(prices)
    }
}

/// Reducer selectable by name from configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexMethod {
    #[default]
    Mean,
    Median,
}

impl IndexMethod {
    /// Parse from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mean" | "average" => Some(Self::Mean),
            "median" => Some(Self::Median),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
        }
    }
}

impl std::str::FromStr for IndexMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown index method: {}", s))
    }
}

impl PriceReducer for IndexMethod {
    fn reduce(&self, prices: &[String]) -> Result<f64> {
        match self {
            Self::Mean => mean_price(prices),
            Self::Median => median_price(prices),
        }
    }
}

fn parse_all(prices: &[String]) -> Result<Vec<f64>> {
    if prices.is_empty() {
        return Err(MarketDataError::NoPrices);
    }

    prices
        .iter()
        .enumerate()
        .map(|(index, value)| {
            parse_price(value).map_err(|source| MarketDataError::MalformedPrice {
                index,
                value: value.clone(),
                source,
            })
        })
        .collect()
}

/// Arithmetic mean of the prices.
pub fn mean_price(prices: &[String]) -> Result<f64> {
    let values = parse_all(prices)?;
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median of the prices; the mean of the two middle values for an even count.
pub fn median_price(prices: &[String]) -> Result<f64> {
    let mut values: Vec<OrderedFloat<f64>> =
        parse_all(prices)?.into_iter().map(OrderedFloat).collect();
    values.sort_unstable();

    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Ok((values[mid - 1].0 + values[mid].0) / 2.0)
    } else {
        Ok(values[mid].0)
    }
}
