//! Parser for the TRIGGERS specification string.

use std::collections::HashSet;

use deadswitch_state::TriggerSpec;

use crate::error::{TriggerSpecError, TriggerSpecErrors};

/// Largest accepted delay or interval (15 decimal digits).
pub const MAX_MILLIS: u64 = 999_999_999_999_999;

const MAX_DIGITS: usize = 15;

/// Whether `name` is a valid trigger name: non-empty ASCII word characters.
pub fn is_valid_trigger_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Parse `name:delay[:attempts:interval],...` into trigger specs.
///
/// Returns every field-level error rather than stopping at the first.
pub fn parse_triggers(input: &str) -> Result<Vec<TriggerSpec>, TriggerSpecErrors> {
    let mut specs = Vec::new();
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (i, raw) in input.split(',').enumerate() {
        let entry = i + 1;
        match parse_entry(entry, raw) {
            Ok(spec) => {
                if !seen.insert(spec.name.clone()) {
                    errors.push(TriggerSpecError::Duplicate {
                        entry,
                        name: spec.name,
                    });
                } else {
                    specs.push(spec);
                }
            }
            Err(mut errs) => errors.append(&mut errs),
        }
    }

    if errors.is_empty() {
        Ok(specs)
    } else {
        Err(TriggerSpecErrors(errors))
    }
}

fn parse_entry(entry: usize, raw: &str) -> Result<TriggerSpec, Vec<TriggerSpecError>> {
    let fields: Vec<&str> = raw.split(':').collect();
    let (name, delay, extra) = match fields.as_slice() {
        [name, delay] => (*name, *delay, None),
        [name, delay, attempts, interval] => (*name, *delay, Some((*attempts, *interval))),
        _ => {
            return Err(vec![TriggerSpecError::FieldCount {
                entry,
                fields: fields.len(),
            }]);
        }
    };

    let mut errors = Vec::new();

    if !is_valid_trigger_name(name) {
        errors.push(TriggerSpecError::InvalidName {
            entry,
            name: name.to_string(),
        });
    }

    let delay = collect(&mut errors, parse_bounded(entry, "delay", delay, 1, MAX_MILLIS));

    let (attempts, interval) = match extra {
        Some((attempts, interval)) => (
            collect(
                &mut errors,
                parse_bounded(entry, "attempts", attempts, 1, u64::from(u32::MAX)),
            ),
            collect(
                &mut errors,
                parse_bounded(entry, "interval", interval, 0, MAX_MILLIS),
            ),
        ),
        None => (Some(1), Some(0)),
    };

    match (delay, attempts, interval) {
        (Some(delay), Some(attempts), Some(interval)) if errors.is_empty() => {
            // Bounded to u32 above.
            let attempts = u32::try_from(attempts).unwrap_or(u32::MAX);
            Ok(TriggerSpec::new(name, delay).with_attempts(attempts, interval))
        }
        _ => Err(errors),
    }
}

fn collect(errors: &mut Vec<TriggerSpecError>, result: Result<u64, TriggerSpecError>) -> Option<u64> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            errors.push(e);
            None
        }
    }
}

fn parse_bounded(
    entry: usize,
    field: &'static str,
    value: &str,
    min: u64,
    max: u64,
) -> Result<u64, TriggerSpecError> {
    let not_a_number = || TriggerSpecError::NotANumber {
        entry,
        field,
        value: value.to_string(),
    };

    if value.is_empty() || value.len() > MAX_DIGITS || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(not_a_number());
    }

    let parsed: u64 = value.parse().map_err(|_| not_a_number())?;
    if parsed < min || parsed > max {
        return Err(TriggerSpecError::OutOfRange {
            entry,
            field,
            value: parsed,
            min,
            max,
        });
    }
    Ok(parsed)
}
