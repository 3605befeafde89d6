//! Free-form build option parsing
//!
//! Build options are passed as loose `key[=value]` tokens rather than a fixed
//! flag grammar:
//!
//! ```text
//! crossgo --arch=arm -armv=7 --v --outputDir=out
//! ```
//!
//! Any key is accepted; the resolver picks out the ones it knows and ignores
//! the rest. Values are typed on the way in: a bare key is a flag, a value
//! that reads back identically as a number is numeric, anything else is text.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// Typed value of a single build option
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// Bare key with no value (`--v`)
    Flag(bool),
    /// Value that round-trips losslessly as a number (`--armv=7`)
    Number(f64),
    /// Any other value (`--os=windows`)
    Text(String),
}

impl OptionValue {
    /// Classify a raw value string
    fn from_raw(raw: &str) -> Self {
        if raw.is_empty() {
            return OptionValue::Flag(true);
        }

        match raw.parse::<f64>() {
            Ok(n) if !n.is_nan() && format_number(n) == raw => OptionValue::Number(n),
            _ => OptionValue::Text(raw.to_string()),
        }
    }
}

/// Canonical text of a number, in ECMAScript `Number#toString` form.
///
/// Shortest round-trip digits; plain notation for decimal exponents in
/// `-7..21`, otherwise `d.ddde±x`. Both zeros print as `0`.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let sci = format!("{:e}", n.abs());
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    // Position of the decimal point relative to the first digit
    let point = exponent.parse::<i32>().unwrap_or(0) + 1;

    let body = if k <= point && point <= 21 {
        format!("{}{}", digits, "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{}.{}", int, frac)
    } else if -6 < point && point <= 0 {
        format!("0.{}{}", "0".repeat((-point) as usize), digits)
    } else {
        let (first, rest) = digits.split_at(1);
        let exp = point - 1;
        let sign = if exp < 0 { '-' } else { '+' };
        if rest.is_empty() {
            format!("{}e{}{}", first, sign, exp.abs())
        } else {
            format!("{}.{}e{}{}", first, rest, sign, exp.abs())
        }
    };

    if n < 0.0 {
        format!("-{}", body)
    } else {
        body
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Flag(b) => write!(f, "{}", b),
            OptionValue::Number(n) => f.write_str(&format_number(*n)),
            OptionValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Parsed build options keyed by name with leading dashes stripped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionMap {
    values: BTreeMap<String, OptionValue>,
}

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"([^=\s]+)=?\s*(.*)").expect("token pattern is valid"))
}

/// Strip one or two leading dashes from an option name.
///
/// Only the first two characters are inspected, so `---name` keeps one dash.
fn strip_dashes(name: &str) -> &str {
    let bytes = name.as_bytes();
    if bytes.first() != Some(&b'-') {
        return name;
    }

    let head = &bytes[..bytes.len().min(2)];
    match head.iter().rposition(|&b| b == b'-') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

impl OptionMap {
    /// Parse raw option tokens (program name already removed).
    ///
    /// Never fails: tokens without a usable key are dropped and later
    /// duplicates overwrite earlier ones.
    pub fn parse<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = BTreeMap::new();

        for token in tokens {
            let Some(caps) = token_pattern().captures(token.as_ref()) else {
                continue;
            };

            let key = strip_dashes(&caps[1]);
            if key.is_empty() {
                continue;
            }

            values.insert(key.to_string(), OptionValue::from_raw(&caps[2]));
        }

        Self { values }
    }

    /// Raw typed value for a key
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &OptionValue)> {
        self.values.iter()
    }

    /// Textual value of an option.
    ///
    /// Numbers are rendered back to text; a bare flag carries no text and is
    /// treated as absent.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            OptionValue::Flag(_) => None,
            OptionValue::Number(n) => Some(format_number(*n)),
            OptionValue::Text(s) => Some(s.clone()),
        }
    }

    /// Boolean value of an option, `None` when absent
    pub fn flag(&self, key: &str) -> Option<bool> {
        let value = match self.get(key)? {
            OptionValue::Flag(b) => *b,
            OptionValue::Number(n) => *n != 0.0,
            OptionValue::Text(s) => !matches!(
                s.to_ascii_lowercase().as_str(),
                "false" | "0" | "no" | "off"
            ),
        };
        Some(value)
    }

    /// Positive integer value of an option (e.g. an ARM variant)
    pub fn variant(&self, key: &str) -> Option<u32> {
        match self.get(key)? {
            OptionValue::Number(n) if *n >= 1.0 && n.fract() == 0.0 && *n <= u32::MAX as f64 => {
                Some(*n as u32)
            }
            OptionValue::Text(s) => s.parse::<u32>().ok().filter(|v| *v > 0),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_keys_are_flags() {
        let opts = OptionMap::parse(["--v", "-verbose", "dry"]);
        assert_eq!(opts.get("v"), Some(&OptionValue::Flag(true)));
        assert_eq!(opts.get("verbose"), Some(&OptionValue::Flag(true)));
        assert_eq!(opts.get("dry"), Some(&OptionValue::Flag(true)));
    }

    #[test]
    fn test_numeric_values() {
        let opts = OptionMap::parse(["--armv=7", "--ratio=0.5", "-neg=-3"]);
        assert_eq!(opts.get("armv"), Some(&OptionValue::Number(7.0)));
        assert_eq!(opts.get("ratio"), Some(&OptionValue::Number(0.5)));
        assert_eq!(opts.get("neg"), Some(&OptionValue::Number(-3.0)));
    }

    #[test]
    fn test_lossy_numbers_stay_text() {
        let opts = OptionMap::parse(["--a=07", "--b=7.0", "--c=+7", "--d=7abc", "--e=inf", "--f=NaN"]);
        for key in ["a", "b", "c", "d", "e", "f"] {
            assert!(
                matches!(opts.get(key), Some(OptionValue::Text(_))),
                "{} should stay text",
                key
            );
        }
    }

    #[test]
    fn test_number_classification_follows_ecmascript_formatting() {
        let opts = OptionMap::parse([
            "--a=1e-7",
            "--b=1000000000000000000000",
            "--c=-0",
            "--d=Infinity",
            "--e=1e+21",
            "--f=-Infinity",
            "--g=0.000001",
        ]);
        assert_eq!(opts.get("a"), Some(&OptionValue::Number(1e-7)));
        assert_eq!(
            opts.get("b"),
            Some(&OptionValue::Text("1000000000000000000000".to_string()))
        );
        assert_eq!(opts.get("c"), Some(&OptionValue::Text("-0".to_string())));
        assert_eq!(opts.get("d"), Some(&OptionValue::Number(f64::INFINITY)));
        assert_eq!(opts.get("e"), Some(&OptionValue::Number(1e21)));
        assert_eq!(opts.get("f"), Some(&OptionValue::Number(f64::NEG_INFINITY)));
        assert_eq!(opts.get("g"), Some(&OptionValue::Number(0.000001)));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(7.0), "7");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(123.456), "123.456");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_space_separated_value_is_not_joined() {
        let opts = OptionMap::parse(["--arch", "arm64"]);
        assert_eq!(opts.get("arch"), Some(&OptionValue::Flag(true)));
        assert_eq!(opts.get("arm64"), Some(&OptionValue::Flag(true)));
        assert_eq!(opts.text("arch"), None);
    }

    #[test]
    fn test_text_values() {
        let opts = OptionMap::parse(["--os=windows", "--ccgcc=/opt/x/bin/arm-gcc"]);
        assert_eq!(opts.text("os").as_deref(), Some("windows"));
        assert_eq!(opts.text("ccgcc").as_deref(), Some("/opt/x/bin/arm-gcc"));
    }

    #[test]
    fn test_empty_value_is_flag() {
        let opts = OptionMap::parse(["--os="]);
        assert_eq!(opts.get("os"), Some(&OptionValue::Flag(true)));
        assert_eq!(opts.text("os"), None);
    }

    #[test]
    fn test_dash_stripping() {
        assert_eq!(strip_dashes("--foo"), "foo");
        assert_eq!(strip_dashes("-foo"), "foo");
        assert_eq!(strip_dashes("foo"), "foo");
        assert_eq!(strip_dashes("---foo"), "-foo");
        assert_eq!(strip_dashes("-"), "");
    }

    #[test]
    fn test_value_keeps_later_equals() {
        let opts = OptionMap::parse(["--bflags=main.Mode=prod"]);
        assert_eq!(opts.text("bflags").as_deref(), Some("main.Mode=prod"));
    }

    #[test]
    fn test_last_duplicate_wins() {
        let opts = OptionMap::parse(["--arch=arm", "--arch=arm64"]);
        assert_eq!(opts.text("arch").as_deref(), Some("arm64"));
        assert_eq!(opts.iter().count(), 1);
    }

    #[test]
    fn test_malformed_tokens_are_tolerated() {
        let opts = OptionMap::parse(["", "   ", "--", "-", "--=x", "--arch=arm"]);
        assert_eq!(opts.iter().count(), 1);
        assert!(opts.get("arch").is_some());
    }

    #[test]
    fn test_flag_accessor() {
        let opts = OptionMap::parse(["--a", "--b=false", "--c=0", "--d=1", "--e=yes"]);
        assert_eq!(opts.flag("a"), Some(true));
        assert_eq!(opts.flag("b"), Some(false));
        assert_eq!(opts.flag("c"), Some(false));
        assert_eq!(opts.flag("d"), Some(true));
        assert_eq!(opts.flag("e"), Some(true));
        assert_eq!(opts.flag("missing"), None);
    }

    #[test]
    fn test_variant_accessor() {
        let opts = OptionMap::parse(["--a=7", "--b=6.5", "--c", "--d=x", "--e=-1"]);
        assert_eq!(opts.variant("a"), Some(7));
        assert_eq!(opts.variant("b"), None);
        assert_eq!(opts.variant("c"), None);
        assert_eq!(opts.variant("d"), None);
        assert_eq!(opts.variant("e"), None);
    }
}
