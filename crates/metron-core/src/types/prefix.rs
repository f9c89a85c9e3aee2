//! Decimal and binary unit prefixes

use serde::{Deserialize, Serialize};

use crate::convert::Factor;
use crate::error::{Error, Result};

/// A scaling prefix such as `kilo` (10^3) or `mebi` (2^20)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Prefix {
    pub name: String,
    pub abbreviation: String,
    /// 10 for SI prefixes, 2 for binary prefixes
    pub base: u32,
    pub exponent: i32,
}

/// Which prefix families a unit accepts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefixClass {
    #[default]
    None,
    /// Every decimal prefix
    Metric,
    /// Decimal prefixes with a positive exponent, and every binary prefix
    Data,
}

impl Prefix {
    pub fn is_binary(&self) -> bool {
        self.base == 2
    }

    /// `base ^ exponent` as an exact factor relative to the bare unit
    pub fn scale(&self) -> Result<Factor> {
        let power = i128::from(self.base)
            .checked_pow(self.exponent.unsigned_abs())
            .and_then(|p| rust_decimal::Decimal::try_from_i128_with_scale(p, 0).ok())
            .ok_or_else(|| Error::dataset(format!("prefix '{}' is out of range", self.name)))?;
        let factor = Factor::from_decimal(power)?;
        Ok(if self.exponent < 0 { factor.recip() } else { factor })
    }

    /// Build the prefixed spelling of `unit`.
    ///
    /// A doubled vowel at the join is elided (`kilo` + `ohm` is `kilohm`,
    /// `hecto` + `are` is `hectare`), except for `gigaohm`.
    pub fn apply_to(&self, unit: &str) -> String {
        let prefix = self.name.as_str();
        let last = prefix.chars().last();
        let elide = match unit.chars().next() {
            _ if unit == "ohm" && prefix == "giga" => false,
            Some('o') => matches!(last, Some('o') | Some('a')),
            Some('a') => last == Some('a') || prefix.ends_with("cto"),
            _ => false,
        };

        if elide {
            let mut joined = prefix[..prefix.len() - 1].to_string();
            joined.push_str(unit);
            joined
        } else {
            format!("{prefix}{unit}")
        }
    }
}

impl PrefixClass {
    pub fn accepts(self, prefix: &Prefix) -> bool {
        match self {
            PrefixClass::None => false,
            PrefixClass::Metric => prefix.base == 10,
            PrefixClass::Data => prefix.is_binary() || (prefix.base == 10 && prefix.exponent > 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal as d;
    use test_case::test_case;

    fn prefix(name: &str, abbreviation: &str, base: u32, exponent: i32) -> Prefix {
        Prefix {
            name: name.to_string(),
            abbreviation: abbreviation.to_string(),
            base,
            exponent,
        }
    }

    #[test_case("kilo", "meter" => "kilometer")]
    #[test_case("kilo", "ohm" => "kilohm")]
    #[test_case("mega", "ohm" => "megohm")]
    #[test_case("giga", "ohm" => "gigaohm")]
    #[test_case("hecto", "are" => "hectare")]
    #[test_case("deca", "are" => "decare")]
    #[test_case("milli", "are" => "milliare")]
    #[test_case("micro", "ampere" => "microampere")]
    fn test_apply_to(name: &str, unit: &str) -> String {
        prefix(name, "", 10, 3).apply_to(unit)
    }

    #[test]
    fn test_scale() {
        assert_eq!(
            prefix("kilo", "k", 10, 3).scale().unwrap().to_decimal().unwrap(),
            d("1000")
        );
        assert_eq!(
            prefix("milli", "m", 10, -3).scale().unwrap().to_decimal().unwrap(),
            d("0.001")
        );
        assert_eq!(
            prefix("kibi", "Ki", 2, 10).scale().unwrap().to_decimal().unwrap(),
            d("1024")
        );
    }

    #[test]
    fn test_prefix_classes() {
        let kilo = prefix("kilo", "k", 10, 3);
        let milli = prefix("milli", "m", 10, -3);
        let kibi = prefix("kibi", "Ki", 2, 10);

        assert!(PrefixClass::Metric.accepts(&kilo));
        assert!(PrefixClass::Metric.accepts(&milli));
        assert!(!PrefixClass::Metric.accepts(&kibi));

        assert!(PrefixClass::Data.accepts(&kilo));
        assert!(!PrefixClass::Data.accepts(&milli));
        assert!(PrefixClass::Data.accepts(&kibi));

        assert!(!PrefixClass::None.accepts(&kilo));
    }
}
