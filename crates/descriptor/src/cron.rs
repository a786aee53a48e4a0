// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Five-field cron expression validation.
//!
//! Schedule matching is exact string equality against the tick's cron line,
//! so only well-formedness is checked here; there is no next-fire
//! arithmetic.

const FIELDS: [(&str, u32, u32); 5] = [
    ("minute", 0, 59),
    ("hour", 0, 23),
    ("day-of-month", 1, 31),
    ("month", 1, 12),
    ("day-of-week", 0, 6),
];

/// Validate a cron line: five fields, each a comma list of `*`, literals,
/// ranges `a-b`, or steps `base/step`.
pub fn validate_cron(expr: &str) -> Result<(), String> {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(format!("expected 5 fields, found {}", fields.len()));
    }
    for (value, (name, min, max)) in fields.iter().zip(FIELDS) {
        validate_field(value, name, min, max)?;
    }
    Ok(())
}

fn validate_field(value: &str, name: &str, min: u32, max: u32) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{name}: empty field"));
    }
    for item in value.split(',') {
        validate_item(item, name, min, max)?;
    }
    Ok(())
}

fn validate_item(item: &str, name: &str, min: u32, max: u32) -> Result<(), String> {
    let (base, step) = match item.split_once('/') {
        Some((base, step)) => (base, Some(step)),
        None => (item, None),
    };

    if let Some(step) = step {
        let step: u32 = step
            .parse()
            .map_err(|_| format!("{name}: invalid step '{step}'"))?;
        if step == 0 {
            return Err(format!("{name}: step must be positive"));
        }
    }

    if base == "*" {
        return Ok(());
    }
    match base.split_once('-') {
        Some((lo, hi)) => {
            let lo = parse_bounded(lo, name, min, max)?;
            let hi = parse_bounded(hi, name, min, max)?;
            if lo > hi {
                return Err(format!("{name}: range {lo}-{hi} is inverted"));
            }
            Ok(())
        }
        None => {
            parse_bounded(base, name, min, max)?;
            Ok(())
        }
    }
}

fn parse_bounded(value: &str, name: &str, min: u32, max: u32) -> Result<u32, String> {
    let n: u32 = value
        .parse()
        .map_err(|_| format!("{name}: invalid value '{value}'"))?;
    if n < min || n > max {
        return Err(format!("{name}: {n} outside {min}-{max}"));
    }
    Ok(n)
}

#[cfg(test)]
#[path = "cron_tests.rs"]
mod tests;
