//! ISO-8601 duration and repeating-interval parsing for retry cycles.
//!
//! Supported forms (case-insensitive designators):
//! - `P[nW][nD][T[nH][nM][n[.f]S]]` -- e.g. `PT10S`, `PT1H30M`, `P1D`, `P2W`
//! - `R<n>/<duration>` -- e.g. `R5/PT10M`
//!
//! Years and months are rejected: a retry delay needs a fixed length.

use chrono::TimeDelta;

use super::retry::RetryPolicyError;

/// Parse an ISO-8601 duration into a fixed-length delay.
pub fn parse_duration(input: &str) -> Result<TimeDelta, RetryPolicyError> {
    let invalid = |reason: &str| RetryPolicyError::InvalidDuration {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = input.trim();
    let body = trimmed
        .strip_prefix('P')
        .or_else(|| trimmed.strip_prefix('p'))
        .ok_or_else(|| invalid("must start with 'P'"))?;
    if body.is_empty() {
        return Err(invalid("no components"));
    }

    let mut total_millis: i64 = 0;
    let mut in_time = false;
    let mut number = String::new();
    let mut components = 0;
    let mut time_components = 0;
    // Designators must appear at most once and in W, D, H, M, S order.
    let mut last_rank: Option<u8> = None;

    for c in body.chars() {
        match c.to_ascii_uppercase() {
            'T' if !in_time && number.is_empty() => in_time = true,
            d if d.is_ascii_digit() || d == '.' => number.push(d),
            unit => {
                if number.is_empty() {
                    return Err(invalid("designator without a value"));
                }
                let (rank, factor_millis): (u8, f64) = match (in_time, unit) {
                    (false, 'W') => (0, 7.0 * 86_400_000.0),
                    (false, 'D') => (1, 86_400_000.0),
                    (true, 'H') => (2, 3_600_000.0),
                    (true, 'M') => (3, 60_000.0),
                    (true, 'S') => (4, 1_000.0),
                    (false, 'Y') | (false, 'M') => {
                        return Err(invalid("years and months have no fixed length"));
                    }
                    _ => return Err(invalid("unknown designator")),
                };
                if last_rank.is_some_and(|last| rank <= last) {
                    return Err(invalid("designators must appear once, in order"));
                }
                last_rank = Some(rank);
                if number.contains('.') && unit != 'S' {
                    return Err(invalid("only seconds may be fractional"));
                }
                let value: f64 = number.parse().map_err(|_| invalid("malformed number"))?;
                total_millis = total_millis.saturating_add((value * factor_millis).round() as i64);
                number.clear();
                components += 1;
                if in_time {
                    time_components += 1;
                }
            }
        }
    }

    if !number.is_empty() {
        return Err(invalid("trailing number without designator"));
    }
    if components == 0 {
        return Err(invalid("no components"));
    }
    if in_time && time_components == 0 {
        return Err(invalid("'T' must be followed by a time component"));
    }

    TimeDelta::try_milliseconds(total_millis).ok_or_else(|| invalid("out of range"))
}

/// A parsed `R<n>/<duration>` repeating interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatingInterval {
    pub repetitions: u32,
    pub interval: TimeDelta,
}

/// Parse `R<n>/<duration>`.
///
/// Returns `Ok(None)` when `input` is not a repeat expression at all, so the
/// caller can fall back to plain duration parsing.
pub fn parse_repeating_interval(input: &str) -> Result<Option<RepeatingInterval>, RetryPolicyError> {
    let trimmed = input.trim();
    let Some(rest) = trimmed
        .strip_prefix('R')
        .or_else(|| trimmed.strip_prefix('r'))
    else {
        return Ok(None);
    };

    let invalid = |reason: &str| RetryPolicyError::InvalidDuration {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let parts: Vec<&str> = rest.split('/').collect();
    if parts.len() != 2 {
        return Err(invalid("repeat must have the form R<n>/<duration>"));
    }
    if parts[0].is_empty() {
        return Err(invalid("unbounded repeats are not supported"));
    }
    let repetitions: u32 = parts[0]
        .parse()
        .map_err(|_| invalid("repeat count must be a non-negative integer"))?;
    let interval = parse_duration(parts[1])?;

    Ok(Some(RepeatingInterval {
        repetitions,
        interval,
    }))
}
