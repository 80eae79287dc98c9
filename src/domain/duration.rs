//! ISO-8601 style duration parsing (`PT#H#M#S`).
//!
//! The platform reports durations like `PT3M41S`. Only the time part is
//! supported; anything that does not start with `PT` counts as zero seconds.

/// Parse a `PT[nH][nM][nS]` duration into whole seconds.
///
/// Never fails: empty or malformed input yields `0`. Components must appear
/// in H, M, S order and each one is optional. The whole string must match;
/// anything left over makes the duration `0`.
pub fn parse_duration(raw: &str) -> u64 {
    let Some(mut rest) = raw.strip_prefix("PT") else {
        return 0;
    };

    let mut total: u64 = 0;
    for (unit, scale) in [('H', 3600u64), ('M', 60), ('S', 1)] {
        if let Some((value, remaining)) = take_component(rest, unit) {
            total = total.saturating_add(value.saturating_mul(scale));
            rest = remaining;
        }
    }

    if !rest.is_empty() {
        return 0;
    }
    total
}

/// Match `<digits><unit>` at the start of `input`.
fn take_component(input: &str, unit: char) -> Option<(u64, &str)> {
    let digits = input.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }

    let (number, tail) = input.split_at(digits);
    let tail = tail.strip_prefix(unit)?;
    // Saturate absurdly long digit runs instead of rejecting them
    let value = number.parse::<u64>().unwrap_or(u64::MAX);
    Some((value, tail))
}
