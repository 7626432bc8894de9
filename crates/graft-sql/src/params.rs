//! Placeholder handling for `?`-style parameters.
//!
//! Rendered fragments use `?` placeholders. They are either filled with
//! pre-rendered literals at combination time ([`fill_placeholders`]) or
//! rewritten to `$1..$n` just before execution ([`bind_placeholders`]).
//! Both scanners skip `?` inside single-quoted string literals.

use crate::{Error, Literal, Result};

/// Substitute each `?` in `template` with the rendered form of the
/// corresponding value. The value count must match the placeholder
/// count exactly.
pub fn fill_placeholders(template: &str, values: &[Literal]) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut next = 0;
    let mut in_string = false;
    for c in template.chars() {
        match c {
            '\'' => {
                in_string = !in_string;
                out.push(c);
            }
            '?' if !in_string => {
                let value = values.get(next).ok_or_else(|| Error::ArityMismatch {
                    expected: count_placeholders(template),
                    found: values.len(),
                })?;
                out.push_str(&value.render()?);
                next += 1;
            }
            _ => out.push(c),
        }
    }
    if next != values.len() {
        return Err(Error::ArityMismatch {
            expected: next,
            found: values.len(),
        });
    }
    Ok(out)
}

/// Rewrite `?` placeholders to Postgres-style `$1..$n`, checking that
/// the placeholder count matches the number of parameters the caller
/// intends to bind.
pub fn bind_placeholders(sql: &str, params: usize) -> Result<String> {
    let expected = count_placeholders(sql);
    if expected != params {
        return Err(Error::ArityMismatch {
            expected,
            found: params,
        });
    }
    let mut out = String::with_capacity(sql.len());
    let mut idx = 0;
    let mut in_string = false;
    for c in sql.chars() {
        match c {
            '\'' => {
                in_string = !in_string;
                out.push(c);
            }
            '?' if !in_string => {
                idx += 1;
                out.push('$');
                out.push_str(&idx.to_string());
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}

/// Count `?` placeholders outside string literals.
pub fn count_placeholders(sql: &str) -> usize {
    let mut count = 0;
    let mut in_string = false;
    for c in sql.chars() {
        match c {
            '\'' => in_string = !in_string,
            '?' if !in_string => count += 1,
            _ => {}
        }
    }
    count
}
