//! Tokenizing symbol strings into modules.
//!
//! A module is a single symbol character, optionally followed by a numeric
//! parameter in parentheses: `F`, `F(2.5)`, `+(30)`. Whitespace between
//! modules is insignificant and skipped.

use crate::error::{LSystemError, Result};

/// One symbol with its optional parameter, borrowed from the source string.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Module<'a> {
    pub symbol: char,
    pub param: Option<f32>,
    /// The exact source text of the module (symbol plus parameter list).
    pub text: &'a str,
}

/// Iterator over the modules of a symbol string.
///
/// Yields an error (and then stops) on a stray parenthesis, an unterminated
/// parameter list or a parameter that is not a finite number.
pub struct Modules<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    done: bool,
}

/// Splits `src` into modules. Errors are reported at line 0.
pub fn modules(src: &str) -> Modules<'_> {
    modules_at(src, 0)
}

/// Splits `src` into modules, reporting errors at the given grammar line.
pub fn modules_at(src: &str, line: usize) -> Modules<'_> {
    Modules {
        src,
        pos: 0,
        line,
        done: false,
    }
}

/// Checks that `src` tokenizes and returns it with insignificant whitespace removed.
pub fn normalize(src: &str, line: usize) -> Result<String> {
    let mut out = String::with_capacity(src.len());
    for module in modules_at(src, line) {
        out.push_str(module?.text);
    }
    Ok(out)
}

impl<'a> Modules<'a> {
    fn fail(&mut self, message: String) -> Option<Result<Module<'a>>> {
        self.done = true;
        Some(Err(LSystemError::parse(self.line, message)))
    }
}

impl<'a> Iterator for Modules<'a> {
    type Item = Result<Module<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let src = self.src;
        let rest = &src[self.pos..];
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();

        let start = self.pos;
        let symbol = trimmed.chars().next()?;
        if symbol == '(' || symbol == ')' {
            return self.fail(format!("unexpected '{symbol}' at offset {start}"));
        }
        let mut end = start + symbol.len_utf8();

        let mut param = None;
        if src[end..].starts_with('(') {
            let Some(close) = src[end..].find(')') else {
                return self.fail(format!("unterminated parameter list after '{symbol}'"));
            };
            let raw = src[end + 1..end + close].trim();
            match raw.parse::<f32>() {
                Ok(v) if v.is_finite() => param = Some(v),
                _ => {
                    return self.fail(format!("invalid parameter '{raw}' for '{symbol}'"));
                }
            }
            end += close + 1;
        }

        self.pos = end;
        Some(Ok(Module {
            symbol,
            param,
            text: &src[start..end],
        }))
    }
}
