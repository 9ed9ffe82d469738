// src/utils/verification.rs

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;

static CODE_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{6}$").expect("code pattern must compile"));

/// Six digits, zero padded.
pub fn generate_code() -> String {
    let value: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:06}", value)
}

pub fn is_valid_code_format(code: &str) -> bool {
    CODE_FORMAT.is_match(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..500 {
            let code = generate_code();
            assert!(is_valid_code_format(&code), "{}", code);
        }
    }

    #[test]
    fn rejects_other_shapes() {
        assert!(is_valid_code_format("000123"));
        assert!(!is_valid_code_format("12345"));
        assert!(!is_valid_code_format("1234567"));
        assert!(!is_valid_code_format("12a456"));
        assert!(!is_valid_code_format(" 123456"));
    }
}
