/*
    trill_invoke Copyright 2025 The trill_invoke contributors

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.
*/

use std::fmt::Write as _;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use trill_osc_client::osc::{blob_to_floats, OscMessage, OscType};

/// Significant digits used when printing blob contents.
pub const BLOB_PRECISION: usize = 5;

/// [PrinterConfig] holds the switches the operator can flip while the printer is running. Clones
/// share the same state, so the shell and the receive thread each keep one.
#[derive(Clone, Debug)]
pub struct PrinterConfig {
    log_readings: Arc<AtomicBool>,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        PrinterConfig {
            log_readings: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl PrinterConfig {
    pub fn new(log_readings: bool) -> Self {
        PrinterConfig {
            log_readings: Arc::new(AtomicBool::new(log_readings)),
        }
    }

    /// Whether messages under `/trill/readings` are printed.
    pub fn log_readings(&self) -> bool {
        self.log_readings.load(Ordering::Relaxed)
    }

    pub fn set_log_readings(&self, enabled: bool) {
        self.log_readings.store(enabled, Ordering::Relaxed);
    }
}

/// Enough fractional digits for `{:e}` to print any f32 exactly.
const EXACT_DIGITS: usize = 160;

/// The first `digits` significant decimal digits of `v` (positive, finite), rounded half up,
/// together with the decimal exponent of the first digit.
fn significant_digits(v: f64, digits: usize) -> (Vec<u8>, i32) {
    let exact = format!("{:.*e}", EXACT_DIGITS, v);
    let (mantissa, exp) = match exact.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (exact.as_str(), 0),
    };
    let all: Vec<u8> = mantissa.bytes().filter(u8::is_ascii_digit).collect();

    let mut kept = all[..digits.min(all.len())].to_vec();
    kept.resize(digits, b'0');
    let mut exp = exp;

    if all.get(digits).is_some_and(|&d| d >= b'5') {
        let mut i = digits;
        loop {
            if i == 0 {
                // Carried out of the first digit: 99.99 -> 100.0
                kept.insert(0, b'1');
                kept.pop();
                exp += 1;
                break;
            }
            i -= 1;
            if kept[i] == b'9' {
                kept[i] = b'0';
            } else {
                kept[i] += 1;
                break;
            }
        }
    }
    (kept, exp)
}

/// Format `value` with `digits` significant digits the way JavaScript's
/// `Number.prototype.toPrecision` does: ties round away from zero, and fixed notation is used
/// unless the decimal exponent is below -6 or at least `digits`, in which case `d.dddde+x` is.
pub fn to_precision(value: f32, digits: usize) -> String {
    let digits = digits.clamp(1, 100);
    let v = value as f64;

    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let mut out = String::with_capacity(digits + 8);
    if v < 0.0 {
        out.push('-');
    }

    let (kept, exp) = if v == 0.0 {
        (vec![b'0'; digits], 0)
    } else {
        significant_digits(v.abs(), digits)
    };
    let kept: String = kept.into_iter().map(char::from).collect();

    if exp < -6 || exp >= digits as i32 {
        out.push_str(&kept[..1]);
        if digits > 1 {
            out.push('.');
            out.push_str(&kept[1..]);
        }
        let sign = if exp < 0 { '-' } else { '+' };
        let _ = write!(out, "e{}{}", sign, exp.abs());
    } else if exp >= 0 {
        let int_len = exp as usize + 1;
        out.push_str(&kept[..int_len]);
        if int_len < digits {
            out.push('.');
            out.push_str(&kept[int_len..]);
        }
    } else {
        out.push_str("0.");
        out.extend(std::iter::repeat('0').take((-exp - 1) as usize));
        out.push_str(&kept);
    }
    out
}

fn format_arg(out: &mut String, arg: &OscType) {
    match arg {
        OscType::Float(v) => {
            let _ = writeln!(out, "  float {}", v);
        }
        OscType::Int(v) => {
            let _ = writeln!(out, "  integer {}", v);
        }
        OscType::String(s) => {
            let _ = writeln!(out, "  string {}", s);
        }
        OscType::Blob(b) => {
            let floats: Vec<String> = blob_to_floats(b)
                .into_iter()
                .map(|f| to_precision(f, BLOB_PRECISION))
                .collect();
            let _ = writeln!(out, "  blob({} bytes) [{}]", b.len(), floats.join(", "));
        }
    }
}

/// Render a message as printed by [ReadingPrinter]: the address line, then one line per argument.
pub fn format_message(msg: &OscMessage) -> String {
    let mut out = String::with_capacity(32 + msg.args.len() * 16);
    let _ = writeln!(out, "address: {}", msg.address);
    for arg in &msg.args {
        format_arg(&mut out, arg);
    }
    out
}

/// The [ReadingPrinter] writes incoming messages to an output stream, leaving out readings while
/// they are switched off.
pub struct ReadingPrinter<W: Write> {
    config: PrinterConfig,
    out: W,
}

impl<W: Write> ReadingPrinter<W> {
    pub fn new(config: PrinterConfig, out: W) -> Self {
        ReadingPrinter { config, out }
    }

    pub fn config(&self) -> &PrinterConfig {
        &self.config
    }

    /// Print `msg` unless it is filtered. Returns whether anything was written.
    pub fn print(&mut self, msg: &OscMessage) -> io::Result<bool> {
        if msg.is_reading() && !self.config.log_readings() {
            return Ok(false);
        }

        // One write per message, so lines from another writer can't land in the middle.
        self.out.write_all(format_message(msg).as_bytes())?;
        self.out.flush()?;
        Ok(true)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_precision() {
        assert_eq!(to_precision(1.0, 5), "1.0000");
        assert_eq!(to_precision(0.5, 5), "0.50000");
        assert_eq!(to_precision(-2.5, 5), "-2.5000");
        assert_eq!(to_precision(0.1, 5), "0.10000");
        assert_eq!(to_precision(12345.0, 5), "12345");
        assert_eq!(to_precision(123456.0, 5), "1.2346e+5");
        assert_eq!(to_precision(99999.9, 5), "1.0000e+5");
        assert_eq!(to_precision(1e-7, 5), "1.0000e-7");
        assert_eq!(to_precision(0.0, 5), "0.0000");
        assert_eq!(to_precision(-0.0, 5), "0.0000");
        assert_eq!(to_precision(99.999, 5), "99.999");
        assert_eq!(to_precision(0.000123, 5), "0.00012300");
        assert_eq!(to_precision(f32::NAN, 5), "NaN");
        assert_eq!(to_precision(f32::NEG_INFINITY, 5), "-Infinity");
    }

    #[test]
    fn test_to_precision_ties_round_up() {
        assert_eq!(to_precision(12346.5, 5), "12347");
        assert_eq!(to_precision(1.03125, 5), "1.0313");
        assert_eq!(to_precision(-1.03125, 5), "-1.0313");
        assert_eq!(to_precision(0.5, 1), "0.5");
        assert_eq!(to_precision(2.5, 1), "3");
        assert_eq!(to_precision(9.5, 1), "1e+1");
    }

    #[test]
    fn test_to_precision_other_digit_counts() {
        assert_eq!(to_precision(3.14159, 3), "3.14");
        assert_eq!(to_precision(1234.0, 2), "1.2e+3");
        assert_eq!(to_precision(0.00012, 1), "0.0001");
    }
}
