//! Conversion scenarios against the bundled dataset

use metron_core::{decimal as d, Engine, Error, UnitExpression};
use rust_decimal::Decimal;
use test_case::test_case;

fn expr(text: &str) -> UnitExpression {
    UnitExpression::parse(text).unwrap()
}

fn convert(value: &str, from: &str, to: &str) -> Result<Decimal, Error> {
    Engine::shared().convert(d(value), &expr(from), &expr(to))
}

#[test_case("1", "mile", "foot" => d("5280") ; "mile to foot")]
#[test_case("1", "chain", "yard" => d("22") ; "chain to yard")]
#[test_case("1", "chain", "foot" => d("66") ; "chain to foot through yard")]
#[test_case("1", "gallon", "inch^3" => d("231") ; "gallon to cubic inch")]
#[test_case("1", "mile", "yard" => d("1760") ; "mile to yard")]
#[test_case("1", "furlong", "yard" => d("220") ; "furlong to yard")]
#[test_case("1", "mile", "kilometer" => d("1.609344") ; "mile to kilometer")]
#[test_case("3", "foot", "meter" => d("0.9144") ; "foot to meter")]
#[test_case("1", "acre", "square_foot" => d("43560") ; "acre to square foot")]
#[test_case("1", "pound", "ounce" => d("16") ; "pound to ounce")]
#[test_case("1", "day", "second" => d("86400") ; "day to second")]
#[test_case("1", "kibibyte", "bit" => d("8192") ; "kibibyte to bit")]
#[test_case("1", "gigabyte", "megabyte" => d("1000") ; "gigabyte to megabyte")]
#[test_case("1", "gross", "unity" => d("144") ; "gross to unity")]
#[test_case("1", "revolution", "arcminute" => d("21600") ; "revolution to arcminute")]
fn test_exact_conversions(value: &str, from: &str, to: &str) -> Decimal {
    convert(value, from, to).unwrap()
}

#[test_case("60", "mile/hour", "foot/second" => d("88") ; "speed by term pairing")]
#[test_case("1", "mile_per_hour", "kilometer/hour" => d("1.609344") ; "speed by reduction")]
#[test_case("1", "kilowatt_hour", "joule" => d("3600000") ; "prefixed energy")]
#[test_case("1", "newton", "kilogram*meter/second^2" => d("1") ; "newton to primitives")]
#[test_case("1", "joule", "newton*meter" => d("1") ; "joule to newton meter")]
#[test_case("1", "liter", "centimeter^3" => d("1000") ; "liter to cubic centimeter")]
#[test_case("1", "hectare", "square_meter" => d("10000") ; "hectare to square meter")]
#[test_case("2", "ampere*hour", "coulomb" => d("7200") ; "charge from current and time")]
fn test_compound_conversions(value: &str, from: &str, to: &str) -> Decimal {
    convert(value, from, to).unwrap()
}

#[test_case("0", "celsius", "fahrenheit" => d("32"))]
#[test_case("100", "celsius", "fahrenheit" => d("212"))]
#[test_case("-40", "fahrenheit", "celsius" => d("-40"))]
#[test_case("0", "kelvin", "celsius" => d("-273.15"))]
#[test_case("491.67", "rankine", "fahrenheit" => d("32"))]
#[test_case("212", "fahrenheit", "kelvin" => d("373.15"))]
fn test_temperature_scales(value: &str, from: &str, to: &str) -> Decimal {
    convert(value, from, to).unwrap().normalize()
}

#[test]
fn test_temperature_in_compound_units_is_linear() {
    // a gradient of 1 celsius per meter is 1.8 fahrenheit per meter
    assert_eq!(
        convert("1", "celsius/meter", "fahrenheit/meter").unwrap(),
        d("1.8")
    );
}

#[test]
fn test_aliases_plurals_and_abbreviations() {
    assert_eq!(convert("2", "feet", "inches").unwrap(), d("24"));
    assert_eq!(convert("1", "mi", "ft").unwrap(), d("5280"));
    assert_eq!(convert("1", "km", "metre").unwrap(), d("1000"));
    assert_eq!(convert("1", "kilometres", "m").unwrap(), d("1000"));
    assert_eq!(convert("1", "MiB", "KiB").unwrap(), d("1024"));
    assert_eq!(convert("1", "h", "min").unwrap(), d("60"));
}

#[test]
fn test_power_shorthand() {
    assert_eq!(convert("1", "square_foot", "square_inch").unwrap(), d("144"));
    assert_eq!(convert("1", "cubic_foot", "inch^3").unwrap(), d("1728"));
    assert_eq!(convert("1", "sq_km", "square_meter").unwrap(), d("1000000"));
}

#[test]
fn test_incompatible_dimensions() {
    assert_eq!(
        convert("3", "mile", "gallon"),
        Err(Error::IncompatibleDimension {
            from: "mile".to_string(),
            to: "gallon".to_string()
        })
    );
    assert!(matches!(
        convert("1", "meter/second", "meter"),
        Err(Error::IncompatibleDimension { .. })
    ));
}

#[test]
fn test_unknown_unit() {
    assert_eq!(
        convert("1", "florp", "meter"),
        Err(Error::UnknownUnit("florp".to_string()))
    );
    assert_eq!(
        convert("1", "meter", "kilomile"),
        Err(Error::UnknownUnit("kilomile".to_string()))
    );
}

#[test]
fn test_same_units_unchanged() {
    assert_eq!(convert("42.5", "meter/second", "meter/second").unwrap(), d("42.5"));
    assert_eq!(convert("7", "feet", "foot").unwrap(), d("7"));
}

#[test]
fn test_conversion_identity() {
    let engine = Engine::shared();
    let pairs = [
        ("mile", "kilometer"),
        ("gallon", "liter"),
        ("degree", "radian"),
        ("horsepower", "watt"),
        ("psi", "atmosphere"),
        ("celsius", "fahrenheit"),
        ("knot", "mile_per_hour"),
    ];
    for (u, u0) in pairs {
        for value in ["1", "0.3", "12345.678"] {
            let v = d(value);
            let there = convert(value, u, u0).unwrap();
            let back = engine.convert(there, &expr(u0), &expr(u)).unwrap();
            assert!(
                engine.settings().approx_eq(back, v),
                "{value} {u} -> {u0} -> {u} gave {back}"
            );
        }
    }
}

#[test]
fn test_transitivity() {
    let engine = Engine::shared();
    let triples = [
        ("chain", "yard", "inch"),
        ("mile", "furlong", "rod"),
        ("gallon", "pint", "teaspoon"),
        ("week", "hour", "second"),
        ("tonne", "pound", "grain"),
    ];
    for (a, b, c) in triples {
        let ab = engine.factor(a, b).unwrap();
        let bc = engine.factor(b, c).unwrap();
        let ac = engine.factor(a, c).unwrap();
        assert!(
            engine.settings().approx_eq(
                ab.checked_mul(bc).unwrap().to_decimal().unwrap(),
                ac.to_decimal().unwrap()
            ),
            "{a} -> {b} -> {c}"
        );
    }
}

#[test]
fn test_conversion_factor_ignores_offsets() {
    let engine = Engine::shared();
    let factor = engine
        .conversion_factor(&expr("celsius"), &expr("fahrenheit"))
        .unwrap();
    assert_eq!(factor.to_decimal().unwrap(), d("1.8"));
}

#[test]
fn test_convert_to_measurement() {
    let engine = Engine::shared();
    let m = engine.measurement(d("26.2"), "mile").unwrap();
    let km = engine.convert_to(&m, "kilometer").unwrap();
    assert_eq!(km.value(), d("42.1648128"));
    assert_eq!(km.units(), &expr("kilometer"));
}

#[test]
fn test_reciprocal_factor_stays_exact() {
    let engine = Engine::shared();
    let per_inch = engine.conversion_factor(&expr("meter"), &expr("inch")).unwrap();
    assert_eq!(per_inch.apply(d("0.0254")).unwrap(), d("1"));
    assert_eq!(convert("0.0254", "meter", "inch").unwrap(), d("1"));
    assert_eq!(convert("0.3048", "meter", "foot").unwrap(), d("1"));
}
