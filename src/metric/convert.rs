//! Unit conversion applied to raw measurement values before buffering.

use super::definition::{Unit, UnitSpec};

/// Ticks per second of the native monotonic clock (nanosecond resolution,
/// matching `std::time::Instant` on supported platforms).
pub const NATIVE_TICKS_PER_SECOND: f64 = 1_000_000_000.0;

/// Convert a raw measurement between the declared units.
///
/// Native-time inputs are truncated toward zero first: the source clock
/// hands out integer tick counts, so fractional ticks carry no information.
/// Anything outside the conversion table passes through unchanged.
pub fn convert(value: f64, unit: &UnitSpec) -> f64 {
    let UnitSpec::Convert { from, to } = unit else {
        return value;
    };

    match (from, to) {
        (Unit::Native, Unit::Second) => value.trunc() / NATIVE_TICKS_PER_SECOND,
        (Unit::Native, Unit::Millisecond) => value.trunc() / (NATIVE_TICKS_PER_SECOND / 1_000.0),
        (Unit::Native, Unit::Microsecond) => {
            value.trunc() / (NATIVE_TICKS_PER_SECOND / 1_000_000.0)
        },
        (Unit::Byte, Unit::Kilobyte) => value / 1024.0,
        (Unit::Byte, Unit::Megabyte) => value / (1024.0 * 1024.0),
        (Unit::Byte, Unit::Gigabyte) => value / (1024.0 * 1024.0 * 1024.0),
        (Unit::Microsecond, Unit::Millisecond) => value / 1_000.0,
        _ => value,
    }
}
