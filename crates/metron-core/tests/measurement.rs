//! Measurement arithmetic, dimensional analysis and the supplementary
//! engine operations

use std::cmp::Ordering;

use metron_core::{decimal as d, Dataset, Engine, Error, Measurement, Settings, UnitExpression, Value};
use test_case::test_case;

fn engine() -> &'static Engine {
    Engine::shared()
}

fn expr(text: &str) -> UnitExpression {
    UnitExpression::parse(text).unwrap()
}

fn m(value: &str, units: &str) -> Measurement {
    engine().measurement(d(value), units).unwrap()
}

#[test]
fn test_parse_serialize_round_trip() {
    let e = expr("kilogram*meter^2/second^3");
    assert_eq!(e.serialize(), "kilogram*meter^2/second^3");
    assert_eq!(expr(&e.serialize()), e);
}

#[test]
fn test_add_mile_and_feet() {
    let sum = m("3", "mile").add(&m("5280", "foot"), engine()).unwrap();
    assert_eq!(sum.value(), d("4"));
    assert_eq!(sum.units(), &expr("mile"));
}

#[test]
fn test_add_mile_and_gallon() {
    let result = m("3", "mile").add(&m("2", "gallon"), engine());
    assert!(matches!(result, Err(Error::IncompatibleDimension { .. })));
}

#[test_case("meter/second", "second" ; "velocity times time")]
#[test_case("newton", "meter" ; "force times length")]
#[test_case("mile", "foot" ; "same category")]
#[test_case("kilogram", "1/second^2" ; "inverse units")]
#[test_case("watt", "hour" ; "power times time")]
fn test_dimension_homomorphism(a: &str, b: &str) {
    let engine = engine();
    let x = m("3", a);
    let y = m("2", b);
    let dims_x = engine.dimensions(x.units()).unwrap();
    let dims_y = engine.dimensions(y.units()).unwrap();

    let product = x.multiply(&y, engine).unwrap().to_measurement();
    assert_eq!(
        engine.dimensions(product.units()).unwrap(),
        dims_x.checked_add(&dims_y).unwrap()
    );

    let quotient = x.divide(&y, engine).unwrap().to_measurement();
    assert_eq!(
        engine.dimensions(quotient.units()).unwrap(),
        dims_x.checked_sub(&dims_y).unwrap()
    );
}

#[test]
fn test_normalization_never_keeps_zero_or_unity() {
    for text in ["meter/meter", "1*meter", "second*1/second", "foot^2/foot^2*1"] {
        let e = expr(text);
        assert!(e.iter().all(|(u, n)| n != 0 && u != UnitExpression::UNITY), "{text}");
    }
    assert!(expr("meter/meter").is_empty());
    assert_eq!(expr("1*meter").serialize(), "meter");
}

#[test]
fn test_dimensions() {
    let engine = engine();
    assert_eq!(
        engine.dimensions(&expr("joule")).unwrap().to_string(),
        "length^2*mass/time^2"
    );
    assert_eq!(
        engine.dimensions(&expr("volt*ampere")).unwrap(),
        engine.dimensions(&expr("watt")).unwrap()
    );
    assert!(engine.dimensions(&expr("dozen")).unwrap().is_dimensionless());
    assert!(engine.dimensions(&expr("square_foot")).unwrap() == engine.dimensions(&expr("acre")).unwrap());
}

#[test]
fn test_dimensions_cancel_advisory() {
    let engine = engine();
    assert!(engine.dimensions_cancel(&expr("meter/foot")).unwrap());
    assert!(engine.dimensions_cancel(&expr("newton*second^2/kilogram")).unwrap());
    assert!(!engine.dimensions_cancel(&expr("kilogram*meter/second^2")).unwrap());

    let parsed = engine.parse_units("meter/foot").unwrap();
    assert!(parsed.dimensions_cancel);
    assert!(parsed.units.is_empty());
}

#[test]
fn test_combine_units_first_match_wins() {
    let engine = engine();
    let base = UnitExpression::from_terms([("foot", 1), ("meter", 1)]).unwrap();
    let (units, factor) = engine.combine_units(&base, "inch", 1).unwrap();
    // inch merges into foot, the first length term
    assert_eq!(units, UnitExpression::from_terms([("foot", 2), ("meter", 1)]).unwrap());
    assert_eq!(factor.apply(d("12")).unwrap(), d("1"));

    let (units, factor) = engine.combine_units(&base, "meter", -1).unwrap();
    assert_eq!(units, expr("foot"));
    assert!(factor.is_one());

    let (units, factor) = engine.combine_units(&base, "second", -1).unwrap();
    assert_eq!(units.serialize(), "foot*meter/second");
    assert!(factor.is_one());
}

#[test]
fn test_measurement_from_mixed_literal() {
    // foot*inch keeps foot and scales by 1/12
    let area = m("12", "foot*inch");
    assert_eq!(area.value(), d("1"));
    assert_eq!(area.units(), &expr("foot^2"));
}

#[test]
fn test_multiply_and_divide() {
    let engine = engine();
    let distance = m("100", "kilometer");
    let time = m("2", "hour");
    let speed = distance.divide(&time, engine).unwrap();
    assert_eq!(speed, Value::Measurement(m("50", "kilometer/hour")));

    let back = speed.multiply(&Value::from(time), engine).unwrap();
    assert_eq!(back, Value::Measurement(distance));
}

#[test]
fn test_dimensionless_result_is_scalar() {
    let engine = engine();
    let ratio = m("1", "kilometer").divide(&m("250", "meter"), engine).unwrap();
    assert_eq!(ratio, Value::Scalar(d("4")));
}

#[test]
fn test_invert() {
    let period = m("0.5", "second");
    let frequency = period.invert().unwrap();
    assert_eq!(frequency.value(), d("2"));
    assert_eq!(frequency.units(), &expr("1/second"));
    assert!(engine().is_category(&frequency, "frequency").unwrap());
}

#[test]
fn test_reduce() {
    let engine = engine();
    let reduced = engine.reduce(&m("1", "mile/hour")).unwrap();
    assert_eq!(reduced.value(), d("0.44704"));
    assert_eq!(reduced.units(), &expr("meter/second"));

    let reduced = engine.reduce(&m("3", "dozen*gram")).unwrap();
    assert_eq!(reduced.value(), d("0.036"));
    assert_eq!(reduced.units(), &expr("kilogram"));
}

#[test]
fn test_convert_split() {
    let engine = engine();
    let parts = engine
        .convert_split(&m("1.75", "hour"), &["hour", "minute"])
        .unwrap();
    assert_eq!(parts, vec![m("1", "hour"), m("45", "minute")]);

    let parts = engine
        .convert_split(&m("10.5125", "degree"), &["degree", "arcminute", "arcsecond"])
        .unwrap();
    let values: Vec<_> = parts.iter().map(|p| p.rounded(engine.settings()).value()).collect();
    assert_eq!(values, vec![d("10"), d("30"), d("45")]);

    assert!(engine.convert_split(&m("1", "hour"), &[]).unwrap().is_empty());
}

#[test]
fn test_compare() {
    let engine = engine();
    assert_eq!(engine.compare(&m("1", "mile"), &m("5280", "foot")).unwrap(), Ordering::Equal);
    assert_eq!(engine.compare(&m("1", "meter"), &m("1", "yard")).unwrap(), Ordering::Greater);
    assert_eq!(engine.compare(&m("0", "celsius"), &m("33", "fahrenheit")).unwrap(), Ordering::Less);
    assert!(engine.compare(&m("1", "meter"), &m("1", "second")).is_err());
}

#[test]
fn test_power() {
    let engine = engine();
    let cube = engine.power(&m("2", "foot"), 3).unwrap();
    assert_eq!(cube, Measurement::new(d("8"), expr("foot^3")));

    let inverse = engine.power(&m("4", "second"), -1).unwrap();
    assert_eq!(inverse.value(), d("0.25"));
    assert_eq!(inverse.units(), &expr("1/second"));
}

#[test]
fn test_category_checks() {
    let engine = engine();
    let speed = m("3", "foot/second");
    assert!(engine.is_category(&speed, "velocity").unwrap());
    assert!(!engine.is_category(&speed, "length").unwrap());
    assert!(engine.validate_category(&speed, "velocity").is_ok());
    assert!(matches!(
        engine.validate_category(&speed, "mass"),
        Err(Error::IncompatibleDimension { .. })
    ));
    assert_eq!(
        engine.which_category(&expr("volt*ampere")).unwrap().map(|c| c.id.as_str()),
        Some("power")
    );
    assert!(engine.which_category(&expr("meter^5")).unwrap().is_none());
}

#[test_case("2", "hour" => Some("approximately 2 times one hour (60 minutes)".to_string()))]
#[test_case("1", "mile" => Some("approximately 16.1 times the length of a football pitch".to_string()))]
#[test_case("1", "femtometer" => Some("approximately 1 times the approximate diameter of a proton".to_string()))]
#[test_case("1", "attometer" => Some("approximately 1000 times smaller than the approximate diameter of a proton".to_string()))]
#[test_case("1", "kelvin" => None)]
fn test_estimate(value: &str, units: &str) -> Option<String> {
    engine().estimate(&m(value, units)).unwrap()
}

#[test]
fn test_units_in_category() {
    let names: Vec<&str> = engine()
        .units_in_category("temperature")
        .filter(|u| !u.generated)
        .map(|u| u.name.as_str())
        .collect();
    assert_eq!(names, vec!["kelvin", "celsius", "rankine", "fahrenheit"]);
}

#[test]
fn test_rounded_to_working_precision() {
    let engine = Engine::builder().precision(5).build().unwrap();
    let third = engine.measurement(d("1"), "foot").unwrap();
    let yards = engine.convert_to(&third, "yard").unwrap();
    assert_eq!(yards.rounded(engine.settings()).value(), d("0.33333"));
    assert_eq!(engine.settings(), &Settings::with_precision(5));
}

#[test]
fn test_engine_from_custom_dataset() {
    let dataset = Dataset::from_json(
        r#"{
            "prefixes": [{ "name": "kilo", "abbreviation": "k", "base": 10, "exponent": 3 }],
            "categories": [
                { "id": "length", "formula": "length", "base_unit": "meter" },
                { "id": "time", "formula": "time", "base_unit": "second" },
                { "id": "velocity", "formula": "length/time", "base_unit": "meter_per_second" }
            ],
            "units": [
                { "name": "meter", "category": "length", "abbreviation": "m", "prefixes": "metric" },
                { "name": "second", "category": "time", "abbreviation": "s" },
                { "name": "minute", "category": "time" },
                { "name": "meter_per_second", "category": "velocity" }
            ],
            "conversions": [{ "from": "minute", "to": "second", "factor": "60" }]
        }"#,
    )
    .unwrap();
    let engine = Engine::builder().dataset(dataset).build().unwrap();

    let value = engine
        .convert(d("6"), &expr("km/minute"), &expr("meter_per_second"))
        .unwrap();
    assert_eq!(value, d("100"));
    assert!(engine.resolve_unit("mile").is_err());
}

#[test]
fn test_invalid_dataset_rejected() {
    let dataset = Dataset::from_json(
        r#"{
            "categories": [{ "id": "length", "formula": "length", "base_unit": "meter" }],
            "units": [{ "name": "meter", "category": "mass" }]
        }"#,
    )
    .unwrap();
    assert!(matches!(
        Engine::builder().dataset(dataset).build(),
        Err(Error::InvalidDataset(_))
    ));
}

#[test]
fn test_value_power_requires_integral_exponent() {
    let engine = engine();
    let area = Value::from(m("3", "meter"));
    assert_eq!(area.power(d("1.5"), engine), Err(Error::NonIntegralExponent));
}

#[test]
fn test_huge_exponents_fail_fast() {
    let engine = engine();
    assert!(matches!(
        engine.parse_units("meter*foot^1000000000000"),
        Err(Error::Overflow(_))
    ));
    assert_eq!(
        engine.dimensions(&expr("square_meter^5000000000000000000")),
        Err(Error::Overflow("unit exponent"))
    );
    assert_eq!(
        engine.power(&m("1", "meter^2"), i64::MAX),
        Err(Error::Overflow("unit exponent"))
    );
    assert!(matches!(
        UnitExpression::parse("meter^-9223372036854775808"),
        Err(Error::MalformedUnitExpression { .. })
    ));
}

#[test]
fn test_simplify_units() {
    let engine = engine();
    assert_eq!(engine.simplify_units(&expr("watt*second")).unwrap(), expr("joule"));
    assert_eq!(engine.simplify_units(&expr("newton*meter/joule")).unwrap(), expr("1"));
    assert_eq!(
        engine.simplify_units(&expr("newton/meter")).unwrap(),
        expr("kilogram/second^2")
    );
    // a factor is involved, or the base unit is not a named SI unit
    assert_eq!(engine.simplify_units(&expr("mile/hour")).unwrap(), expr("mile/hour"));
    assert_eq!(engine.simplify_units(&expr("meter/second")).unwrap(), expr("meter/second"));
    assert_eq!(engine.simplify_units(&expr("celsius*meter")).unwrap(), expr("celsius*meter"));
}

#[test]
fn test_normalize_cancels_across_categories() {
    let engine = engine();
    let ratio = m("1", "watt*hour").divide(&m("1", "joule"), engine).unwrap();
    assert_eq!(ratio, Value::Scalar(d("3600")));

    let ratio = m("1", "mile^2").divide(&m("640", "acre"), engine).unwrap();
    assert_eq!(ratio, Value::Scalar(d("1")));

    let length = m("10", "joule").divide(&m("2", "newton"), engine).unwrap();
    assert_eq!(length, Value::Measurement(m("5", "meter")));

    let kept = engine.normalize(&m("3", "acre/foot")).unwrap();
    assert_eq!(kept, Value::Measurement(m("3", "acre/foot")));
}

#[test]
fn test_normalize_repeated_terms() {
    let engine = engine();
    let units = UnitExpression::from_terms([("foot", 5), ("meter", -5)]).unwrap();
    let ratio = engine.normalize(&Measurement::new(d("1"), units)).unwrap();
    // one foot is 0.3048 meter
    assert_eq!(ratio, Value::Scalar(d("0.00263072113161043968")));
}

#[test]
fn test_modulo() {
    let engine = engine();
    assert_eq!(
        engine.modulo(&m("5", "kilometer"), &m("2000", "meter")).unwrap(),
        Value::Measurement(m("1000", "meter"))
    );
    assert!(matches!(
        engine.modulo(&m("5", "kilometer"), &m("0", "meter")),
        Err(Error::Overflow(_))
    ));
}

#[test_case("9", "meter^2", 2 => "3 meter" ; "square root")]
#[test_case("1", "hectare", 2 => "100 meter" ; "square root through primitive units")]
#[test_case("1", "liter", 3 => "0.1 meter" ; "cube root through primitive units")]
#[test_case("16", "meter^4/second^4", 4 => "2 meter/second" ; "fourth root")]
fn test_root(value: &str, units: &str, n: i64) -> String {
    engine().root(&m(value, units), n).unwrap().to_string()
}

#[test]
fn test_root_errors() {
    let engine = engine();
    assert_eq!(
        engine.root(&m("4", "second"), 2),
        Err(Error::InvalidRoot {
            root: "square".to_string(),
            units: "second".to_string()
        })
    );
    assert!(matches!(engine.root(&m("8", "meter"), 3), Err(Error::InvalidRoot { .. })));
    assert!(matches!(engine.root(&m("4", "meter^2"), 0), Err(Error::InvalidRoot { .. })));
    assert_eq!(engine.root(&m("-4", "meter^2"), 2), Err(Error::NegativeRoot));
}
