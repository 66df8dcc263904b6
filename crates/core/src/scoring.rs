//! Deterministic clinical risk scoring.
//!
//! Each patient is scored on three independent dimensions:
//!
//! | Dimension | 0 | 1 | 2 | 3 |
//! |---|---|---|---|---|
//! | Blood pressure | normal | elevated (120-129 **and** <80) | stage 1 (130-139 **or** 80-89) | stage 2 (≥140 **or** ≥90) |
//! | Temperature (°F) | otherwise | low fever 99.6-100.9 | high fever ≥ 101 | |
//!
//! Ranges are closed, so fractional readings between two bands (139.5 systolic, 100.95 °F) fall
//! through to 0.
//! | Age | < 40 | 40-65 | > 65 | |
//!
//! Every function here is pure and total. Missing, sentinel or unparsable values score 0 and
//! are flagged as invalid rather than rejected, so a malformed record still gets a score and
//! shows up in the data-quality list.

use crate::patient::{FieldValue, Patient};
use serde::Serialize;

const BP_SENTINELS: &[&str] = &["N/A", "INVALID"];
const TEMPERATURE_SENTINELS: &[&str] = &["N/A", "INVALID", "TEMP_ERROR"];
const AGE_SENTINELS: &[&str] = &["n/a", "unknown", "invalid"];

const LOW_FEVER_F: std::ops::RangeInclusive<f64> = 99.6..=100.9;
const HIGH_FEVER_THRESHOLD_F: f64 = 101.0;

/// Score of a single dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DimensionScore {
    pub score: u8,
    pub is_valid: bool,
}

impl DimensionScore {
    pub const INVALID: DimensionScore = DimensionScore {
        score: 0,
        is_valid: false,
    };

    pub fn valid(score: u8) -> Self {
        Self {
            score,
            is_valid: true,
        }
    }
}

/// Temperature score, which additionally carries the fever flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TemperatureScore {
    pub score: u8,
    pub is_valid: bool,
    pub has_fever: bool,
}

impl TemperatureScore {
    pub const INVALID: TemperatureScore = TemperatureScore {
        score: 0,
        is_valid: false,
        has_fever: false,
    };
}

/// Composite score for one patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskScore {
    pub patient_id: String,
    pub bp_score: u8,
    pub temp_score: u8,
    pub age_score: u8,
    pub total_score: u8,
    pub has_data_quality_issue: bool,
    pub has_fever: bool,
}

/// Score a `"systolic/diastolic"` blood pressure reading.
pub fn score_blood_pressure(value: &FieldValue) -> DimensionScore {
    let Some(raw) = value.as_str() else {
        return DimensionScore::INVALID;
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() || BP_SENTINELS.contains(&trimmed) {
        return DimensionScore::INVALID;
    }

    let mut parts = trimmed.split('/');
    let (Some(systolic), Some(diastolic), None) = (parts.next(), parts.next(), parts.next())
    else {
        return DimensionScore::INVALID;
    };

    let (systolic, diastolic) = (systolic.trim(), diastolic.trim());
    if systolic.is_empty() || diastolic.is_empty() {
        return DimensionScore::INVALID;
    }

    let (Some(systolic), Some(diastolic)) =
        (parse_leading_number(systolic), parse_leading_number(diastolic))
    else {
        return DimensionScore::INVALID;
    };

    // First match wins. Elevated needs both readings in range; the stages need either one.
    let score = if systolic >= 140.0 || diastolic >= 90.0 {
        3
    } else if (130.0..=139.0).contains(&systolic) || (80.0..=89.0).contains(&diastolic) {
        2
    } else if (120.0..=129.0).contains(&systolic) && diastolic < 80.0 {
        1
    } else {
        0
    };

    DimensionScore::valid(score)
}

/// Score a body temperature in degrees Fahrenheit.
pub fn score_temperature(value: &FieldValue) -> TemperatureScore {
    let Some(temperature) = numeric_value(value, TEMPERATURE_SENTINELS) else {
        return TemperatureScore::INVALID;
    };

    let (score, has_fever) = if temperature >= HIGH_FEVER_THRESHOLD_F {
        (2, true)
    } else if LOW_FEVER_F.contains(&temperature) {
        (1, true)
    } else {
        (0, false)
    };

    TemperatureScore {
        score,
        is_valid: true,
        has_fever,
    }
}

/// Score an age in years. Negative ages are invalid.
pub fn score_age(value: &FieldValue) -> DimensionScore {
    let Some(age) = numeric_value(value, AGE_SENTINELS) else {
        return DimensionScore::INVALID;
    };

    if age < 0.0 {
        return DimensionScore::INVALID;
    }

    let score = if age > 65.0 {
        2
    } else if age >= 40.0 {
        1
    } else {
        0
    };

    DimensionScore::valid(score)
}

/// Score all three dimensions of a patient.
///
/// Invalid dimensions contribute 0 to the total and raise the data-quality flag.
pub fn calculate_risk_score(patient: &Patient) -> RiskScore {
    let bp = score_blood_pressure(&patient.blood_pressure);
    let temperature = score_temperature(&patient.temperature);
    let age = score_age(&patient.age);

    RiskScore {
        patient_id: patient.patient_id.clone(),
        bp_score: bp.score,
        temp_score: temperature.score,
        age_score: age.score,
        total_score: bp.score + temperature.score + age.score,
        has_data_quality_issue: !bp.is_valid || !temperature.is_valid || !age.is_valid,
        has_fever: temperature.has_fever,
    }
}

/// Whether the patient's temperature falls in either fever band.
pub fn has_fever(patient: &Patient) -> bool {
    score_temperature(&patient.temperature).has_fever
}

/// Numeric reading of a field that may hold a number or a numeric string.
///
/// Sentinels are compared case-insensitively after trimming.
fn numeric_value(value: &FieldValue, sentinels: &[&str]) -> Option<f64> {
    match value {
        FieldValue::Number(n) if n.is_finite() => Some(*n),
        FieldValue::Text(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() || sentinels.iter().any(|s| s.eq_ignore_ascii_case(trimmed)) {
                return None;
            }
            parse_leading_number(trimmed)
        }
        _ => None,
    }
}

/// Parse the longest decimal prefix of `input`, ignoring leading whitespace.
///
/// `"98.6F"` reads as 98.6 and `"80 mmHg"` as 80; text with no numeric prefix yields `None`.
fn parse_leading_number(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_digits = digits_from(end);
    end += int_digits;

    let mut mantissa_digits = int_digits;
    if bytes.get(end) == Some(&b'.') {
        let frac_digits = digits_from(end + 1);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
            mantissa_digits += frac_digits;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = digits_from(exp_end);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bp(s: &str) -> DimensionScore {
        score_blood_pressure(&FieldValue::text(s))
    }

    #[test]
    fn test_blood_pressure_boundaries() {
        assert_eq!(bp("119/79"), DimensionScore::valid(0));
        assert_eq!(bp("120/79"), DimensionScore::valid(1));
        assert_eq!(bp("129/79"), DimensionScore::valid(1));
        assert_eq!(bp("130/79"), DimensionScore::valid(2));
        assert_eq!(bp("139/89"), DimensionScore::valid(2));
        assert_eq!(bp("140/80"), DimensionScore::valid(3));
        assert_eq!(bp("110/90"), DimensionScore::valid(3));
    }

    #[test]
    fn test_blood_pressure_diastolic_alone_raises_stage() {
        // Diastolic ≥ 90 is stage 2 even with an elevated systolic.
        assert_eq!(bp("120/90"), DimensionScore::valid(3));
        // Diastolic 80-89 wins over a normal systolic.
        assert_eq!(bp("115/85"), DimensionScore::valid(2));
        // Elevated needs a normal diastolic as well.
        assert_eq!(bp("125/80"), DimensionScore::valid(2));
    }

    #[test]
    fn test_blood_pressure_stage_one_from_diastolic_with_low_systolic() {
        assert_eq!(bp("120/85"), DimensionScore::valid(2));
        assert_eq!(bp("100/89"), DimensionScore::valid(2));
    }

    #[test]
    fn test_blood_pressure_is_monotone_over_whole_readings() {
        for systolic in (80..200).step_by(3) {
            for diastolic in (50..120).step_by(3) {
                let base = bp(&format!("{systolic}/{diastolic}")).score;
                let higher_s = bp(&format!("{}/{diastolic}", systolic + 1)).score;
                let higher_d = bp(&format!("{systolic}/{}", diastolic + 1)).score;
                assert!(base <= 3);
                assert!(higher_s >= base, "{systolic}/{diastolic}: systolic step lowered score");
                assert!(higher_d >= base, "{systolic}/{diastolic}: diastolic step lowered score");
            }
        }
    }

    #[test]
    fn test_blood_pressure_fractional_readings_between_bands_score_zero() {
        assert_eq!(bp("139.5/70"), DimensionScore::valid(0));
        assert_eq!(bp("129.5/70"), DimensionScore::valid(0));
        assert_eq!(bp("110/89.5"), DimensionScore::valid(0));
        assert_eq!(bp("139.0/70"), DimensionScore::valid(2));
        assert_eq!(bp("139.5/92"), DimensionScore::valid(3));
    }

    #[test]
    fn test_blood_pressure_tolerates_whitespace_and_units() {
        assert_eq!(bp(" 150 / 95 "), DimensionScore::valid(3));
        assert_eq!(bp("118/76 mmHg"), DimensionScore::valid(0));
    }

    #[test]
    fn test_blood_pressure_invalid_inputs() {
        for raw in ["", "   ", "N/A", "INVALID", "150/", "/90", "150", "150/90/80", "abc/def", "150/xx"] {
            assert_eq!(bp(raw), DimensionScore::INVALID, "{raw:?} should be invalid");
        }
        assert_eq!(score_blood_pressure(&FieldValue::Missing), DimensionScore::INVALID);
        assert_eq!(
            score_blood_pressure(&FieldValue::Number(120.0)),
            DimensionScore::INVALID
        );
        assert_eq!(
            score_blood_pressure(&FieldValue::Other(serde_json::json!(["120", "80"]))),
            DimensionScore::INVALID
        );
    }

    #[test]
    fn test_temperature_boundaries() {
        let t = |v: f64| score_temperature(&FieldValue::Number(v));

        assert_eq!((t(99.5).score, t(99.5).has_fever), (0, false));
        assert_eq!((t(99.6).score, t(99.6).has_fever), (1, true));
        assert_eq!((t(100.9).score, t(100.9).has_fever), (1, true));
        assert_eq!((t(101.0).score, t(101.0).has_fever), (2, true));
        assert_eq!((t(104.5).score, t(104.5).has_fever), (2, true));
        assert_eq!((t(97.0).score, t(97.0).has_fever), (0, false));
        assert!(t(99.5).is_valid);
    }

    #[test]
    fn test_temperature_between_bands_is_not_fever() {
        let score = score_temperature(&FieldValue::Number(100.95));
        assert_eq!(
            (score.score, score.is_valid, score.has_fever),
            (0, true, false)
        );

        let score = score_temperature(&FieldValue::text("100.95"));
        assert_eq!((score.score, score.has_fever), (0, false));
    }

    #[test]
    fn test_temperature_numeric_strings() {
        let score = score_temperature(&FieldValue::text("101.2"));
        assert_eq!((score.score, score.is_valid, score.has_fever), (2, true, true));

        let score = score_temperature(&FieldValue::text(" 99.6 "));
        assert_eq!((score.score, score.has_fever), (1, true));

        let score = score_temperature(&FieldValue::text("98.6F"));
        assert_eq!((score.score, score.is_valid), (0, true));
    }

    #[test]
    fn test_temperature_invalid_inputs() {
        for raw in ["", "  ", "N/A", "n/a", "INVALID", "invalid", "TEMP_ERROR", "temp_error", "hot"] {
            assert_eq!(
                score_temperature(&FieldValue::text(raw)),
                TemperatureScore::INVALID,
                "{raw:?} should be invalid"
            );
        }
        assert_eq!(score_temperature(&FieldValue::Missing), TemperatureScore::INVALID);
        assert_eq!(
            score_temperature(&FieldValue::Other(serde_json::json!(true))),
            TemperatureScore::INVALID
        );
    }

    #[test]
    fn test_age_boundaries() {
        let a = |v: f64| score_age(&FieldValue::Number(v));

        assert_eq!(a(0.0), DimensionScore::valid(0));
        assert_eq!(a(39.0), DimensionScore::valid(0));
        assert_eq!(a(40.0), DimensionScore::valid(1));
        assert_eq!(a(65.0), DimensionScore::valid(1));
        assert_eq!(a(65.5), DimensionScore::valid(2));
        assert_eq!(a(66.0), DimensionScore::valid(2));
    }

    #[test]
    fn test_age_strings_and_invalid_inputs() {
        assert_eq!(score_age(&FieldValue::text("72")), DimensionScore::valid(2));
        assert_eq!(score_age(&FieldValue::text(" 45 ")), DimensionScore::valid(1));

        for raw in ["", "n/a", "N/A", "unknown", "Unknown", "INVALID", "fifty-three", "-5"] {
            assert_eq!(
                score_age(&FieldValue::text(raw)),
                DimensionScore::INVALID,
                "{raw:?} should be invalid"
            );
        }
        assert_eq!(score_age(&FieldValue::Number(-1.0)), DimensionScore::INVALID);
        assert_eq!(score_age(&FieldValue::Missing), DimensionScore::INVALID);
    }

    #[test]
    fn test_risk_score_sums_dimensions() {
        let patient = Patient::with_vitals("DEMO001", "145/92", 101.5, 70.0);
        let score = calculate_risk_score(&patient);

        assert_eq!(score.patient_id, "DEMO001");
        assert_eq!((score.bp_score, score.temp_score, score.age_score), (3, 2, 2));
        assert_eq!(score.total_score, 7);
        assert!(score.has_fever);
        assert!(!score.has_data_quality_issue);
    }

    #[test]
    fn test_risk_score_invalid_dimensions_contribute_zero() {
        let patient = Patient::with_vitals("DEMO002", "INVALID", "TEMP_ERROR", 70.0);
        let score = calculate_risk_score(&patient);

        assert_eq!(score.total_score, score.bp_score + score.temp_score + score.age_score);
        assert_eq!(score.total_score, 2);
        assert!(score.has_data_quality_issue);
        assert!(!score.has_fever);
    }

    #[test]
    fn test_risk_score_single_invalid_dimension_flags_record() {
        let patient = Patient::with_vitals("DEMO003", "120/80", 98.6, "unknown");
        assert!(calculate_risk_score(&patient).has_data_quality_issue);
    }

    #[test]
    fn test_risk_score_is_idempotent() {
        let patient = Patient::with_vitals("DEMO004", "138/85", "100.2", "52");
        assert_eq!(calculate_risk_score(&patient), calculate_risk_score(&patient));
        assert!(has_fever(&patient));
    }

    #[test]
    fn test_parse_leading_number() {
        assert_eq!(parse_leading_number("98.6"), Some(98.6));
        assert_eq!(parse_leading_number("  42abc"), Some(42.0));
        assert_eq!(parse_leading_number(".5"), Some(0.5));
        assert_eq!(parse_leading_number("5."), Some(5.0));
        assert_eq!(parse_leading_number("-3"), Some(-3.0));
        assert_eq!(parse_leading_number("1e2x"), Some(100.0));
        assert_eq!(parse_leading_number("1e"), Some(1.0));
        assert_eq!(parse_leading_number("."), None);
        assert_eq!(parse_leading_number("-"), None);
        assert_eq!(parse_leading_number("abc"), None);
        assert_eq!(parse_leading_number("1e999"), None);
    }
}
