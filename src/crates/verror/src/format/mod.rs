//! Printf-style template rendering.
//!
//! Error messages are built from a template and an ordered list of
//! [`serde_json::Value`] arguments. Directives follow the familiar
//! `%[flags][width][.precision]verb` shape:
//!
//! ```rust
//! use serde_json::json;
//! use verror::format::sprintf;
//!
//! assert_eq!(sprintf("error %d message %s", &[json!(17), json!("msg")]), "error 17 message msg");
//! assert_eq!(sprintf("%05.1f|%-4s|%#x", &[json!(3.14159), json!("ab"), json!(255)]), "003.1|ab  |0xff");
//! ```
//!
//! # Verbs
//!
//! | Verb              | Accepts                  | Output                                   |
//! |-------------------|--------------------------|------------------------------------------|
//! | `%v`              | anything                 | natural form, `<nil>` for null           |
//! | `%s`              | strings, arrays, objects | the string / natural form                |
//! | `%q`              | strings                  | double-quoted, escaped                   |
//! | `%d`              | integers                 | decimal                                  |
//! | `%b` `%o` `%x` `%X` | integers (`%x` also strings) | binary, octal, hex                   |
//! | `%f` `%F`         | numbers                  | fixed point, precision 6 by default      |
//! | `%e` `%E`         | numbers                  | scientific, two-digit signed exponent    |
//! | `%g` `%G`         | numbers                  | shortest representation (see below)      |
//! | `%t`              | booleans                 | `true` / `false`                         |
//! | `%%`              | nothing                  | a literal `%`                            |
//!
//! Flags: `-` left-justify, `+` always print the sign, space for a blank
//! before positive numbers, `0` zero padding (after the sign for numbers,
//! ignored with `-`), `#` alternate form.
//!
//! `%g` and the `%v` form of floats switch to scientific notation when the
//! decimal exponent is below -4 or at least the precision, which is 6 when
//! none is given: `%g` of `1e5` is `100000`, of `1e6` is `1e+06`.
//!
//! Widths and precisions above the configured
//! [`max_width`](FormatterConfig::max_width), and never above
//! [`MAX_WIDTH_LIMIT`](crate::config::MAX_WIDTH_LIMIT), are faults.
//!
//! # Faults
//!
//! Rendering never fails. A directive that cannot be satisfied is replaced by
//! the `Display` text of its [`FormatFault`]:
//!
//! ```text
//! %d   (no argument)      -> %!d(MISSING)
//! %d   "foo"              -> %!d(string=foo)
//! %d   null               -> %!d(<nil>)
//! abc%                    -> abc%!(NOVERB)
//! hi   1, "x"             -> hi%!(EXTRA int=1, string=x)
//! ```
//!
//! [`sprintf`] logs each fault through `tracing`; [`try_sprintf`] returns
//! the first one as an error instead.

use crate::config::{FormatterConfig, MAX_WIDTH_LIMIT};
use crate::error::FormatFault;
use serde_json::{Number, Value};
use std::iter::Peekable;
use std::str::Chars;

/// Render `template` with the process-wide [`FormatterConfig`].
pub fn sprintf(template: &str, args: &[Value]) -> String {
    Formatter::global().sprintf(template, args)
}

/// Render `template`, failing on the first fault.
pub fn try_sprintf(template: &str, args: &[Value]) -> Result<String, FormatFault> {
    Formatter::global().try_sprintf(template, args)
}

/// Template renderer bound to a configuration.
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    config: FormatterConfig,
}

impl Formatter {
    /// Create a formatter with the given configuration.
    pub fn new(config: FormatterConfig) -> Self {
        Self { config }
    }

    /// Create a formatter with the process-wide configuration.
    pub fn global() -> Self {
        Self::new(FormatterConfig::global().clone())
    }

    /// The configuration in use.
    pub fn config(&self) -> &FormatterConfig {
        &self.config
    }

    /// Render leniently, logging every fault.
    pub fn sprintf(&self, template: &str, args: &[Value]) -> String {
        let (rendered, faults) = self.render(template, args);
        for fault in &faults {
            if self.config.warn_on_fault {
                tracing::warn!(template, fault = %fault, "Template formatting fault");
            } else {
                tracing::debug!(template, fault = %fault, "Template formatting fault");
            }
        }
        rendered
    }

    /// Render strictly, returning the first fault as an error.
    pub fn try_sprintf(&self, template: &str, args: &[Value]) -> Result<String, FormatFault> {
        let (rendered, faults) = self.render(template, args);
        match faults.into_iter().next() {
            Some(fault) => Err(fault),
            None => Ok(rendered),
        }
    }

    /// Render and return the text together with every fault encountered.
    pub fn render(&self, template: &str, args: &[Value]) -> (String, Vec<FormatFault>) {
        let mut out = String::with_capacity(template.len());
        let mut faults = Vec::new();
        let mut remaining = args.iter();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }

            let mut directive = Directive::default();
            while let Some(&flag) = chars.peek() {
                match flag {
                    '-' => directive.minus = true,
                    '+' => directive.plus = true,
                    ' ' => directive.space = true,
                    '0' => directive.zero = true,
                    '#' => directive.sharp = true,
                    _ => break,
                }
                chars.next();
            }

            let max_width = self.config.max_width.min(MAX_WIDTH_LIMIT);

            match read_count(&mut chars, max_width) {
                Count::Value(width) => directive.width = Some(width),
                Count::TooLarge => record(&mut out, &mut faults, FormatFault::BadWidth),
                Count::Absent => {}
            }

            if chars.peek() == Some(&'.') {
                chars.next();
                match read_count(&mut chars, max_width) {
                    Count::Value(precision) => directive.precision = Some(precision),
                    Count::Absent => directive.precision = Some(0),
                    Count::TooLarge => record(&mut out, &mut faults, FormatFault::BadPrecision),
                }
            }

            let Some(verb) = chars.next() else {
                record(&mut out, &mut faults, FormatFault::NoVerb);
                break;
            };

            if verb == '%' {
                out.push('%');
                continue;
            }

            let result = match remaining.next() {
                Some(arg) => format_arg(verb, &directive, arg),
                None => Err(FormatFault::MissingArgument { verb }),
            };
            match result {
                Ok(text) => out.push_str(&text),
                Err(fault) => record(&mut out, &mut faults, fault),
            }
        }

        let extra: Vec<String> = remaining.map(describe).collect();
        if !extra.is_empty() {
            record(&mut out, &mut faults, FormatFault::ExtraArguments(extra.join(", ")));
        }

        (out, faults)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Directive {
    minus: bool,
    plus: bool,
    space: bool,
    zero: bool,
    sharp: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

enum Count {
    Absent,
    Value(usize),
    TooLarge,
}

fn read_count(chars: &mut Peekable<Chars<'_>>, max: usize) -> Count {
    let mut value: Option<usize> = None;
    let mut too_large = false;

    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        chars.next();
        let next = value
            .unwrap_or(0)
            .checked_mul(10)
            .and_then(|v| v.checked_add(digit as usize));
        match next {
            Some(v) if v <= max => value = Some(v),
            _ => too_large = true,
        }
    }

    match (too_large, value) {
        (true, _) => Count::TooLarge,
        (false, Some(v)) => Count::Value(v),
        (false, None) => Count::Absent,
    }
}

fn record(out: &mut String, faults: &mut Vec<FormatFault>, fault: FormatFault) {
    out.push_str(&fault.to_string());
    faults.push(fault);
}

fn format_arg(verb: char, d: &Directive, arg: &Value) -> Result<String, FormatFault> {
    if arg.is_null() {
        return if verb == 'v' {
            Ok(pad_text("<nil>", d))
        } else {
            Err(FormatFault::NullArgument { verb })
        };
    }

    match (verb, arg) {
        ('v', Value::Number(n)) => Ok(match integer_of(n) {
            Some(i) => format_integer('d', d, i),
            None => format_float('g', d, n),
        }),
        ('v' | 's', Value::String(s)) => Ok(pad_text(truncate(s, d.precision), d)),
        ('v' | 's', Value::Array(_) | Value::Object(_)) | ('v', Value::Bool(_)) => {
            Ok(pad_text(&natural(arg), d))
        }
        ('q', Value::String(s)) => Ok(pad_text(&format!("{:?}", truncate(s, d.precision)), d)),
        ('t', Value::Bool(b)) => Ok(pad_text(&b.to_string(), d)),
        ('x' | 'X', Value::String(s)) => {
            let hex: String = s
                .bytes()
                .map(|b| if verb == 'X' { format!("{b:02X}") } else { format!("{b:02x}") })
                .collect();
            let prefix = match (d.sharp, verb) {
                (true, 'X') => "0X",
                (true, _) => "0x",
                (false, _) => "",
            };
            Ok(pad_text(&format!("{prefix}{hex}"), d))
        }
        ('d' | 'b' | 'o' | 'x' | 'X', Value::Number(n)) => integer_of(n)
            .map(|i| format_integer(verb, d, i))
            .ok_or_else(|| bad_argument(verb, arg)),
        ('f' | 'F' | 'e' | 'E' | 'g' | 'G', Value::Number(n)) => Ok(format_float(verb, d, n)),
        _ => Err(bad_argument(verb, arg)),
    }
}

fn integer_of(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

fn format_integer(verb: char, d: &Directive, n: i128) -> String {
    let magnitude = n.unsigned_abs();
    let mut digits = match verb {
        'b' => format!("{magnitude:b}"),
        'o' => format!("{magnitude:o}"),
        'x' => format!("{magnitude:x}"),
        'X' => format!("{magnitude:X}"),
        _ => magnitude.to_string(),
    };
    if let Some(precision) = d.precision {
        if digits.len() < precision {
            digits = format!("{}{digits}", "0".repeat(precision - digits.len()));
        }
    }

    let prefix = match (d.sharp, verb) {
        (true, 'b') => "0b",
        (true, 'o') => "0",
        (true, 'x') => "0x",
        (true, 'X') => "0X",
        _ => "",
    };
    let lead = format!("{}{prefix}", sign(n < 0, d));
    pad_numeric(&lead, &digits, d)
}

fn format_float(verb: char, d: &Directive, n: &Number) -> String {
    let value = n.as_f64().unwrap_or_default();
    let magnitude = value.abs();
    let body = match verb {
        'f' | 'F' => format!("{:.*}", d.precision.unwrap_or(6), magnitude),
        'e' | 'E' => fix_exponent(
            &format!("{:.*e}", d.precision.unwrap_or(6), magnitude),
            verb == 'E',
        ),
        _ => general(magnitude, d.precision, verb == 'G'),
    };
    pad_numeric(sign(value.is_sign_negative(), d), &body, d)
}

/// Shortest form; scientific when the exponent is below -4 or at least the
/// precision (6 for the shortest form).
fn general(value: f64, precision: Option<usize>, upper: bool) -> String {
    let Some(precision) = precision else {
        let exp = exponent_of(&format!("{value:e}"));
        return if !(-4..6).contains(&exp) {
            fix_exponent(&format!("{value:e}"), upper)
        } else {
            value.to_string()
        };
    };

    let precision = precision.max(1);
    let raw = format!("{:.*e}", precision - 1, value);
    let exp = exponent_of(&raw);
    if exp < -4 || exp >= precision as i32 {
        let mantissa = raw.split_once('e').map_or(raw.as_str(), |(m, _)| m);
        fix_exponent(&format!("{}e{exp}", trim_fraction(mantissa)), upper)
    } else {
        let decimals = (precision as i32 - 1 - exp).max(0) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn exponent_of(raw: &str) -> i32 {
    raw.split_once('e')
        .and_then(|(_, exp)| exp.parse().ok())
        .unwrap_or(0)
}

fn fix_exponent(raw: &str, upper: bool) -> String {
    let mantissa = raw.split_once('e').map_or(raw, |(m, _)| m);
    let exp = exponent_of(raw);
    let e = if upper { 'E' } else { 'e' };
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{mantissa}{e}{sign}{:02}", exp.unsigned_abs())
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

fn sign(negative: bool, d: &Directive) -> &'static str {
    if negative {
        "-"
    } else if d.plus {
        "+"
    } else if d.space {
        " "
    } else {
        ""
    }
}

fn pad_numeric(lead: &str, body: &str, d: &Directive) -> String {
    let len = lead.chars().count() + body.chars().count();
    match d.width {
        Some(width) if width > len => {
            let fill = width - len;
            if d.minus {
                format!("{lead}{body}{}", " ".repeat(fill))
            } else if d.zero {
                format!("{lead}{}{body}", "0".repeat(fill))
            } else {
                format!("{}{lead}{body}", " ".repeat(fill))
            }
        }
        _ => format!("{lead}{body}"),
    }
}

fn pad_text(body: &str, d: &Directive) -> String {
    let len = body.chars().count();
    match d.width {
        Some(width) if width > len && d.minus => format!("{body}{}", " ".repeat(width - len)),
        Some(width) if width > len && d.zero => format!("{}{body}", "0".repeat(width - len)),
        Some(width) if width > len => format!("{}{body}", " ".repeat(width - len)),
        _ => body.to_string(),
    }
}

fn truncate(s: &str, precision: Option<usize>) -> &str {
    match precision.and_then(|p| s.char_indices().nth(p)) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Natural `%v` text of a value.
fn natural(value: &Value) -> String {
    match value {
        Value::Null => "<nil>".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match integer_of(n) {
            Some(i) => i.to_string(),
            None => general(n.as_f64().unwrap_or_default(), None, false),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(natural).collect();
            format!("[{}]", items.join(" "))
        }
        Value::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{k}:{}", natural(v)))
                .collect();
            format!("map[{}]", entries.join(" "))
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(n) if n.is_i64() => "int",
        Value::Number(_) => "uint",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "<nil>".to_string(),
        other => format!("{}={}", kind(other), natural(other)),
    }
}

fn bad_argument(verb: char, arg: &Value) -> FormatFault {
    FormatFault::BadArgument {
        verb,
        kind: kind(arg),
        value: natural(arg),
    }
}
