// SPDX-FileCopyrightText: 2026 Stratus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Default-value expression evaluation.
//!
//! Catalog defaults are small expressions, not bare literals: numeric kinds
//! allow products of literals (`4*1024`), durations use a fixed constructor
//! vocabulary reduced to canonical seconds, and strings strip one layer of
//! quote wrapping. Everything reduces to a canonical string stored on the
//! descriptor.

use stratus_core::ValueKind;

/// Ticks are 100 ns, the resolution used by duration constructors.
const TICKS_PER_SECOND: f64 = 10_000_000.0;

/// Evaluate a default-value expression to its canonical string form.
///
/// Errors return the human-readable detail only; the loader wraps it with the
/// offending line number.
pub fn eval_default(kind: ValueKind, expr: &str) -> Result<String, String> {
    let expr = expr.trim();
    match kind {
        ValueKind::Bool => eval_bool(expr),
        ValueKind::Int => eval_int_product(expr).map(|v| v.to_string()),
        ValueKind::Uint => eval_uint_product(expr).map(|v| v.to_string()),
        ValueKind::Float => eval_float_product(expr).map(canonical_float),
        ValueKind::Duration => eval_duration(expr).map(canonical_float),
        ValueKind::String | ValueKind::Secret => Ok(unwrap_string_literal(expr)),
    }
}

fn eval_bool(expr: &str) -> Result<String, String> {
    if expr.eq_ignore_ascii_case("true") {
        Ok("true".to_string())
    } else if expr.eq_ignore_ascii_case("false") {
        Ok("false".to_string())
    } else {
        Err(format!("`{expr}` is not a boolean literal"))
    }
}

fn eval_int_product(expr: &str) -> Result<i64, String> {
    product_operands(expr)?.iter().try_fold(1i64, |acc, op| {
        let literal: i64 = op
            .parse()
            .map_err(|_| format!("`{op}` is not an integer literal"))?;
        acc.checked_mul(literal)
            .ok_or_else(|| format!("integer product `{expr}` overflows"))
    })
}

fn eval_uint_product(expr: &str) -> Result<u64, String> {
    product_operands(expr)?.iter().try_fold(1u64, |acc, op| {
        let literal = parse_uint_literal(op)?;
        acc.checked_mul(literal)
            .ok_or_else(|| format!("unsigned product `{expr}` overflows"))
    })
}

/// Unsigned literals additionally allow a `0x` hex prefix.
fn parse_uint_literal(op: &str) -> Result<u64, String> {
    match op.strip_prefix("0x").or_else(|| op.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16)
            .map_err(|_| format!("`{op}` is not a hex literal")),
        None => op
            .parse()
            .map_err(|_| format!("`{op}` is not an unsigned literal")),
    }
}

fn eval_float_product(expr: &str) -> Result<f64, String> {
    product_operands(expr)?.iter().try_fold(1f64, |acc, op| {
        let literal: f64 = op
            .parse()
            .map_err(|_| format!("`{op}` is not a numeric literal"))?;
        Ok(acc * literal)
    })
}

/// Duration vocabulary: `Zero`/`MaxValue`/`MinValue` sentinels, or
/// `From{Seconds,Minutes,Hours,Milliseconds,Ticks}(product)`.
fn eval_duration(expr: &str) -> Result<f64, String> {
    if expr.eq_ignore_ascii_case("zero") {
        return Ok(0.0);
    }
    if expr.eq_ignore_ascii_case("maxvalue") {
        return Ok(f64::INFINITY);
    }
    if expr.eq_ignore_ascii_case("minvalue") {
        return Ok(f64::NEG_INFINITY);
    }

    let open = expr
        .find('(')
        .ok_or_else(|| format!("`{expr}` is not a duration expression"))?;
    let inner = expr[open + 1..]
        .strip_suffix(')')
        .ok_or_else(|| format!("`{expr}` is missing a closing parenthesis"))?;
    let operand = eval_float_product(inner)?;

    let secs = match expr[..open].trim().to_ascii_lowercase().as_str() {
        "fromseconds" => operand,
        "fromminutes" => operand * 60.0,
        "fromhours" => operand * 3600.0,
        "frommilliseconds" => operand / 1000.0,
        "fromticks" => operand / TICKS_PER_SECOND,
        ctor => return Err(format!("unknown duration constructor `{ctor}`")),
    };
    Ok(secs)
}

/// Split a `*`-joined product into trimmed operands.
fn product_operands(expr: &str) -> Result<Vec<&str>, String> {
    if expr.is_empty() {
        return Err("empty expression".to_string());
    }
    let operands: Vec<&str> = expr.split('*').map(str::trim).collect();
    if operands.iter().any(|op| op.is_empty()) {
        return Err(format!("`{expr}` has an empty product operand"));
    }
    Ok(operands)
}

/// Strip one layer of `"..."` wrapping if present.
fn unwrap_string_literal(expr: &str) -> String {
    expr.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(expr)
        .to_string()
}

/// Shortest round-trippable decimal form; infinities keep their parseable
/// `inf`/`-inf` spellings.
fn canonical_float(value: f64) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn int_product_reduces_to_decimal() {
        assert_eq!(eval_default(ValueKind::Int, "4*1024").unwrap(), "4096");
        assert_eq!(eval_default(ValueKind::Int, "-1").unwrap(), "-1");
    }

    #[test]
    fn uint_product_accepts_hex_operands() {
        assert_eq!(eval_default(ValueKind::Uint, "0x10 * 4").unwrap(), "64");
        assert_eq!(eval_default(ValueKind::Uint, "4 * 1024 * 1024").unwrap(), "4194304");
    }

    #[test]
    fn uint_rejects_negative_literal() {
        assert!(eval_default(ValueKind::Uint, "-4").is_err());
    }

    #[test]
    fn duration_constructors_reduce_to_seconds() {
        assert_eq!(eval_default(ValueKind::Duration, "FromSeconds(30)").unwrap(), "30");
        assert_eq!(eval_default(ValueKind::Duration, "FromMinutes(5)").unwrap(), "300");
        assert_eq!(eval_default(ValueKind::Duration, "FromHours(2)").unwrap(), "7200");
        assert_eq!(eval_default(ValueKind::Duration, "FromMilliseconds(500)").unwrap(), "0.5");
        assert_eq!(eval_default(ValueKind::Duration, "FromTicks(10000000)").unwrap(), "1");
    }

    #[test]
    fn duration_constructor_operand_may_be_a_product() {
        assert_eq!(eval_default(ValueKind::Duration, "FromSeconds(60 * 60)").unwrap(), "3600");
    }

    #[test]
    fn duration_sentinels() {
        assert_eq!(eval_default(ValueKind::Duration, "Zero").unwrap(), "0");
        assert_eq!(eval_default(ValueKind::Duration, "MaxValue").unwrap(), "inf");
        assert_eq!(eval_default(ValueKind::Duration, "MinValue").unwrap(), "-inf");
    }

    #[test]
    fn unknown_duration_constructor_is_rejected() {
        let err = eval_default(ValueKind::Duration, "FromFortnights(1)").unwrap_err();
        assert!(err.contains("fromfortnights"));
    }

    #[test]
    fn string_defaults_strip_quote_wrapping() {
        assert_eq!(eval_default(ValueKind::String, "\"None\"").unwrap(), "None");
        assert_eq!(eval_default(ValueKind::String, "bare").unwrap(), "bare");
        assert_eq!(eval_default(ValueKind::String, "\"\"").unwrap(), "");
    }

    #[test]
    fn bool_defaults_are_case_insensitive() {
        assert_eq!(eval_default(ValueKind::Bool, "TRUE").unwrap(), "true");
        assert!(eval_default(ValueKind::Bool, "yes").is_err());
    }

    proptest! {
        #[test]
        fn int_product_equals_arithmetic_product(a in 1i64..10_000, b in 1i64..10_000) {
            let expr = format!("{a}*{b}");
            let evaluated = eval_default(ValueKind::Int, &expr).unwrap();
            prop_assert_eq!(evaluated, (a * b).to_string());
        }

        #[test]
        fn from_seconds_is_identity(secs in 0u32..1_000_000) {
            let expr = format!("FromSeconds({secs})");
            let evaluated = eval_default(ValueKind::Duration, &expr).unwrap();
            prop_assert_eq!(evaluated, f64::from(secs).to_string());
        }
    }
}
