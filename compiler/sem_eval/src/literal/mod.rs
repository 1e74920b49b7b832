//! Literal decoding: from source text and a target type to a value.
//!
//! Expression literals reach the interpreter already validated. `@Test`
//! literals do not, and additionally use forms expressions cannot write:
//!
//! | Type                  | Literal                                   |
//! |-----------------------|-------------------------------------------|
//! | `Integer`, `Natural`  | decimal, as the literal validators accept |
//! | `Boolean`             | `true`, `false`                           |
//! | `Unicode.String`      | the raw text                              |
//! | `Try<T>`              | `failure`, `success(<T literal>)`         |
//! | `List<T>`             | `[item, item, ...]`                       |
//! | single-member struct  | the member's literal                      |
//!
//! List items are bare text, or quoted with `"` or `'` when they contain
//! commas or brackets. Inside quotes a backslash escapes the next
//! character. Nested lists are written inline: `[[1, 2], []]`.

use std::iter::Peekable;
use std::str::Chars;

use sem_ir::types::parameter_map;
use sem_ir::{EntityId, Type};
use sem_stack::ensure_sufficient_stack;
use sem_types::natives::is_native_module;
use sem_types::LiteralValidator;

use crate::errors::{invalid_literal, requires_failed, EvalError, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::Value;

impl Interpreter {
    /// Decode `literal` as a value of type `ty`.
    pub fn evaluate_literal(&self, ty: &Type, literal: &str) -> EvalResult {
        ensure_sufficient_stack(|| self.decode(ty, literal))
    }

    fn decode(&self, ty: &Type, literal: &str) -> EvalResult {
        match ty {
            Type::Integer => primitive(LiteralValidator::Integer, ty, literal)
                .and_then(|text| text.parse().map_err(|_| invalid(literal, ty)))
                .map(Value::Integer),
            Type::Natural => primitive(LiteralValidator::Natural, ty, literal)
                .and_then(|text| text.parse().map_err(|_| invalid(literal, ty)))
                .map(Value::Natural),
            Type::Boolean => primitive(LiteralValidator::Boolean, ty, literal)
                .map(|text| Value::Boolean(text == "true")),
            Type::Try(inner) => self.decode_try(inner, literal),
            Type::List(element) => split_list(literal)
                .map_err(|reason| invalid_literal(literal, ty, reason))?
                .iter()
                .map(|item| self.evaluate_literal(element, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            Type::Named(named)
                if is_native_module(&named.reference.module)
                    && named.reference.id == EntityId::of("Unicode.String") =>
            {
                Ok(Value::String(literal.to_string()))
            }
            Type::Named(named) => {
                let Some(def) = self.struct_def(&named.reference) else {
                    return Err(invalid_literal(literal, ty, "type has no literal form"));
                };
                let [member] = def.members.as_slice() else {
                    return Err(invalid_literal(literal, ty, "type has no literal form"));
                };
                let replacements = parameter_map(&def.type_parameters, &named.parameters);
                let member_type = member.ty.substitute_parameters(&replacements);
                let members = vec![self.evaluate_literal(&member_type, literal)?];
                if let Some(requires) = &def.requires {
                    if !self.satisfies(&def, requires, &members)? {
                        return Err(requires_failed(&def.id, literal));
                    }
                }
                Ok(Value::Struct { def, members })
            }
            Type::Function(_) | Type::Parameter(_) | Type::InternalParameter(_) => {
                Err(invalid_literal(literal, ty, "type has no literal form"))
            }
        }
    }

    fn decode_try(&self, inner: &Type, literal: &str) -> EvalResult {
        let text = literal.trim();
        if text == "failure" {
            return Ok(Value::failure());
        }
        match text
            .strip_prefix("success(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            Some(value) => Ok(Value::success(self.evaluate_literal(inner, value)?)),
            None => Err(invalid_literal(
                literal,
                Type::try_of(inner.clone()),
                "expected 'failure' or 'success(...)'",
            )),
        }
    }
}

fn primitive<'a>(
    validator: LiteralValidator,
    ty: &Type,
    literal: &'a str,
) -> Result<&'a str, EvalError> {
    let text = literal.trim();
    if validator.validate(text) {
        Ok(text)
    } else {
        Err(invalid(literal, ty))
    }
}

fn invalid(literal: &str, ty: &Type) -> EvalError {
    invalid_literal(literal, ty, "not accepted by the type's literal validator")
}

/// Split a list literal into the literal texts of its items.
pub(crate) fn split_list(literal: &str) -> Result<Vec<String>, &'static str> {
    let inner = literal
        .trim()
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or("expected a list literal in square brackets")?;
    let mut chars = inner.chars().peekable();
    let mut items = Vec::new();
    skip_whitespace(&mut chars);
    if chars.peek().is_none() {
        return Ok(items);
    }
    loop {
        skip_whitespace(&mut chars);
        let item = match chars.peek() {
            None => return Err("expected an item after ','"),
            Some('[') => nested_list(&mut chars)?,
            Some(&quote @ ('"' | '\'')) => {
                chars.next();
                quoted(&mut chars, quote)?
            }
            Some(_) => bare(&mut chars),
        };
        items.push(item);
        skip_whitespace(&mut chars);
        match chars.next() {
            None => return Ok(items),
            Some(',') => {}
            Some(_) => return Err("expected ',' between list items"),
        }
    }
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.next_if(|c| c.is_whitespace()).is_some() {}
}

fn bare(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut text = String::new();
    while let Some(c) = chars.next_if(|&c| c != ',') {
        text.push(c);
    }
    text.trim_end().to_string()
}

/// Contents of a quoted item with escapes resolved; the opening quote is
/// already consumed.
fn quoted(chars: &mut Peekable<Chars<'_>>, quote: char) -> Result<String, &'static str> {
    let mut text = String::new();
    loop {
        match chars.next() {
            None => return Err("unterminated quoted item"),
            Some('\\') => text.push(chars.next().ok_or("unterminated escape")?),
            Some(c) if c == quote => return Ok(text),
            Some(c) => text.push(c),
        }
    }
}

/// A nested list's raw text, brackets included. Quoted text inside is
/// kept verbatim for the nested decode.
fn nested_list(chars: &mut Peekable<Chars<'_>>) -> Result<String, &'static str> {
    let mut text = String::new();
    let mut depth = 0usize;
    let mut quote = None;
    loop {
        let c = chars.next().ok_or("unbalanced '[' in list literal")?;
        text.push(c);
        match (quote, c) {
            (Some(_), '\\') => text.push(chars.next().ok_or("unterminated escape")?),
            (Some(open), c) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => {
                depth -= 1;
                if depth == 0 {
                    return Ok(text);
                }
            }
            (None, _) => {}
        }
    }
}
