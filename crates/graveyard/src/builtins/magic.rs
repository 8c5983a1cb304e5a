//! Random and time sources: the `magic_*` family.

use chrono::Local;
use rand::Rng as _;

use crate::value::Value;

/// Characters `magic_string` draws from: printable ASCII without the double
/// quote and backslash.
const MAGIC_CHARSET: &[u8] =
    b"!#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[]^_`abcdefghijklmnopqrstuvwxyz{|}~";

/// A random 8-digit integer.
pub fn magic_number() -> Value {
    Value::Int(rand::thread_rng().gen_range(10_000_000..=99_999_999))
}

/// A random weight in `[0, 1)`, rounded to 8 decimal places.
pub fn magic_weight() -> Value {
    let raw: f64 = rand::thread_rng().r#gen();
    Value::Float((raw * 1e8).round() / 1e8)
}

/// Lowercase hex of a random 32-bit value, at least 8 hex digits wide.
pub fn magic_uid() -> Value {
    let raw = rand::thread_rng().gen_range(0x1111_1111u32..=0xffff_ffffu32);
    Value::string(format!("{raw:x}"))
}

/// 16 random printable characters.
pub fn magic_string() -> Value {
    let mut rng = rand::thread_rng();
    let text: String = (0..16)
        .map(|_| MAGIC_CHARSET[rng.gen_range(0..MAGIC_CHARSET.len())] as char)
        .collect();
    Value::string(text)
}

/// Seconds since the epoch, with sub-second precision.
pub fn magic_time() -> Value {
    let now = Local::now();
    let micros = f64::from(now.timestamp_subsec_micros());
    Value::Float(now.timestamp() as f64 + micros / 1e6)
}

/// The local wall-clock time as `YYYY-MM-DD HH:MM:SS`.
pub fn magic_date_time() -> Value {
    Value::string(Local::now().format("%Y-%m-%d %H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_number_is_eight_digits() {
        for _ in 0..32 {
            let Value::Int(n) = magic_number() else {
                panic!("expected an integer");
            };
            assert!((10_000_000..=99_999_999).contains(&n));
        }
    }

    #[test]
    fn magic_string_is_sixteen_printable_characters() {
        let Value::Str(s) = magic_string() else {
            panic!("expected a string");
        };
        assert_eq!(s.chars().count(), 16);
        assert!(s.chars().all(|c| c.is_ascii_graphic()));
    }

    #[test]
    fn magic_date_time_has_the_expected_shape() {
        let Value::Str(s) = magic_date_time() else {
            panic!("expected a string");
        };
        assert_eq!(s.len(), 19);
        assert_eq!(&s[4..5], "-");
        assert_eq!(&s[10..11], " ");
        assert_eq!(&s[13..14], ":");
    }
}
