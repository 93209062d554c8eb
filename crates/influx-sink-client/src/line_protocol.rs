//! InfluxDB line protocol formatting.
//!
//! One reading becomes `<measurement>,name=<sensor> <field>=<value> <timestamp>\n`.

use std::fmt::Write;

/// Append one line for a reading to `out`.
///
/// Returns `false` without writing anything when `value` is not finite; InfluxDB rejects
/// NaN and infinities and one such line would fail the whole batch.
pub fn write_line(
    out: &mut String,
    measurement: &str,
    field: &str,
    name: &str,
    value: f64,
    timestamp: i64,
) -> bool {
    if !value.is_finite() {
        return false;
    }

    escape_into(out, measurement, &[',', ' ']);
    out.push_str(",name=");
    escape_into(out, name, &[',', '=', ' ']);
    out.push(' ');
    escape_into(out, field, &[',', '=', ' ']);
    // f64 Display is the shortest representation that round-trips.
    let _ = write!(out, "={value} {timestamp}");
    out.push('\n');
    true
}

fn escape_into(out: &mut String, raw: &str, special: &[char]) {
    for c in raw.chars() {
        match c {
            '\n' | '\r' => out.push_str("\\ "),
            c if special.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
}
