//! Amount type for handling monetary values with optional currency symbols.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles parsing values the
//! way spreadsheets tend to export them: with or without a currency symbol (`$` or `R$`), with
//! thousands separators, and with either a decimal point or a decimal comma.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// The currency symbol that prefixed an amount.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    #[default]
    None,
    /// `$`
    Dollar,
    /// `R$`
    Real,
}

impl Symbol {
    fn as_str(&self) -> &'static str {
        match self {
            Symbol::None => "",
            Symbol::Dollar => "$",
            Symbol::Real => "R$",
        }
    }
}

/// How the digits of an amount were grouped.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Grouping {
    /// `60000.00`
    #[default]
    None,
    /// `60,000.00`
    Commas,
    /// `60.000,00`, i.e. a decimal comma.
    Dots,
}

/// Represents how amounts were (or should be) formatted.
///
/// # Examples
///  - `Symbol::Dollar, Grouping::Commas` -> `-$60,000.00`
///  - `Symbol::Real, Grouping::Dots` -> `-R$60.000,00`
///  - `Symbol::None, Grouping::None` -> `-60000.00`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AmountFormat {
    symbol: Symbol,
    grouping: Grouping,
}

impl AmountFormat {
    pub const fn new(symbol: Symbol, grouping: Grouping) -> Self {
        Self { symbol, grouping }
    }

    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    pub fn grouping(&self) -> Grouping {
        self.grouping
    }
}

/// Represents a currency amount.
///
/// Formatting is considered significant for the purposes of equality, so for numeric comparisons,
/// you should access the `Decimal` value and use that.
///
/// # Examples
///
/// ```
/// # use cashflow::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("R$ 1.234,50").unwrap();
/// let b = Amount::from_str("1234.5").unwrap();
/// assert_ne!(a, b);
/// assert_eq!(a.value(), b.value());
/// assert_eq!(a.to_string(), "R$1.234,50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    /// The parsed numerical value.
    value: Decimal,
    /// The way the numerical value was parsed from, or should be written to, a `String`.
    format: AmountFormat,
}

impl Amount {
    /// Creates a new Amount from a Decimal value with plain formatting.
    pub const fn new(value: Decimal) -> Self {
        Self {
            value,
            format: AmountFormat::new(Symbol::None, Grouping::None),
        }
    }

    pub const fn new_with_format(value: Decimal, format: AmountFormat) -> Self {
        Self { value, format }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn format(&self) -> AmountFormat {
        self.format
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value.is_sign_negative()
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError {
    input: String,
    source: rust_decimal::Error,
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "AmountError({:?}, {:?})", self.input, self.source)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid amount: {}", self.input, self.source)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim_matches(is_blank);
        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        // The minus sign may come before or after the symbol: "-R$ 5,00" or "R$ -5,00".
        let (mut negative, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start_matches(is_blank)),
            None => (false, trimmed),
        };

        let (symbol, rest) = if let Some(r) = rest.strip_prefix("R$") {
            (Symbol::Real, r)
        } else if let Some(r) = rest.strip_prefix('$') {
            (Symbol::Dollar, r)
        } else {
            (Symbol::None, rest)
        };

        let mut digits = rest.trim_start_matches(is_blank);
        if let Some(r) = digits.strip_prefix('-') {
            negative = !negative;
            digits = r;
        }

        let (grouping, canonical) = canonicalize_separators(digits);
        let canonical = if negative {
            format!("-{canonical}")
        } else {
            canonical
        };

        let value = Decimal::from_str(&canonical).map_err(|source| AmountError {
            input: s.to_string(),
            source,
        })?;
        Ok(Amount::new_with_format(
            value,
            AmountFormat::new(symbol, grouping),
        ))
    }
}

fn is_blank(c: char) -> bool {
    c.is_whitespace() || c == '\u{a0}'
}

/// Rewrites `digits` so that `.` is the decimal point and there are no thousands separators.
///
/// When both `.` and `,` appear, whichever comes last is the decimal separator. A lone comma
/// followed by one or two digits is a decimal comma; any other comma is a thousands separator.
/// Several dots without a comma are thousands separators.
fn canonicalize_separators(digits: &str) -> (Grouping, String) {
    let last_dot = digits.rfind('.');
    let last_comma = digits.rfind(',');
    match (last_dot, last_comma) {
        (Some(dot), Some(comma)) if comma > dot => {
            (Grouping::Dots, digits.replace('.', "").replace(',', "."))
        }
        (Some(_), Some(_)) => (Grouping::Commas, digits.replace(',', "")),
        (None, Some(comma)) => {
            let decimals = digits.len() - comma - 1;
            if digits.matches(',').count() == 1 && (1..=2).contains(&decimals) {
                (Grouping::Dots, digits.replace(',', "."))
            } else {
                (Grouping::Commas, digits.replace(',', ""))
            }
        }
        (Some(_), None) if digits.matches('.').count() > 1 => {
            (Grouping::Dots, digits.replace('.', ""))
        }
        _ => (Grouping::None, digits.to_string()),
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let num = self.value.abs();
        let symbol = self.format.symbol.as_str();
        match self.format.grouping {
            Grouping::None => write!(f, "{sign}{symbol}{num}"),
            Grouping::Commas => write!(f, "{sign}{symbol}{}", with_commas(num)),
            Grouping::Dots => {
                // Swap the separators of the comma-grouped rendering.
                let swapped: String = with_commas(num)
                    .chars()
                    .map(|c| match c {
                        ',' => '.',
                        '.' => ',',
                        other => other,
                    })
                    .collect();
                write!(f, "{sign}{symbol}{swapped}")
            }
        }
    }
}

/// Groups the integer digits of a non-negative `num` in threes with commas. At least two decimal
/// places are shown and none are dropped.
fn with_commas(num: Decimal) -> String {
    let mut num = num;
    if num.scale() < 2 {
        num.rescale(2);
    }
    let text = num.to_string();
    let (int, frac) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let mut grouped = String::with_capacity(text.len() + int.len() / 3);
    for (ix, digit) in int.chars().enumerate() {
        if ix > 0 && (int.len() - ix) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if frac.is_empty() {
        grouped
    } else {
        format!("{grouped}.{frac}")
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Renderers want the bare number, the formatting is only for people.
        serializer.serialize_str(&self.value.to_string())
    }
}

/// Amounts arrive as text from spreadsheets, but inline configuration may hold plain numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match AmountRepr::deserialize(deserializer)? {
            AmountRepr::Integer(i) => Ok(Amount::new(Decimal::from(i))),
            AmountRepr::Float(x) => Decimal::from_f64(x)
                .map(Amount::new)
                .ok_or_else(|| serde::de::Error::custom(format!("{x} is not a valid amount"))),
            AmountRepr::Text(s) => Amount::from_str(&s).map_err(serde::de::Error::custom),
        }
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

/// Adds the values; the result keeps the formatting of the left-hand side.
impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount::new_with_format(self.value + rhs.value, self.format)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.value += rhs.value;
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        let mut iter = iter.peekable();
        let format = iter.peek().map(|a| a.format).unwrap_or_default();
        let value = iter.map(|a| a.value).sum();
        Amount::new_with_format(value, format)
    }
}
