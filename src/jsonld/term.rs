//! Scalar and value-object conversion
//!
//! Maps decoded JSON values to literal terms. Node objects and arrays are not
//! handled here: for those the converter returns `Ok(None)` and the caller
//! processes them structurally.

use super::error::{JsonLdError, JsonLdResult};
use super::event::Scalar;
use super::factory::DataFactory;
use super::resolver::{KeyResolver, Keyword};
use crate::rdf::{xsd, NamedNode, RdfObject};
use serde_json::{Number, Value};

/// Largest integer magnitude an `f64` holds exactly (2^53)
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Convert a scalar to a term; `null` converts to nothing
pub fn scalar_to_term(scalar: &Scalar, factory: &mut dyn DataFactory) -> JsonLdResult<Option<RdfObject>> {
    let literal = match scalar {
        Scalar::Null => return Ok(None),
        Scalar::String(s) => factory.literal(s, None, None)?,
        Scalar::Boolean(b) => {
            let datatype = factory.named_node(xsd::BOOLEAN)?;
            factory.literal(if *b { "true" } else { "false" }, Some(datatype), None)?
        }
        Scalar::Number(n) => {
            let (lexical, datatype) = number_lexical(n)?;
            let datatype = factory.named_node(datatype)?;
            factory.literal(&lexical, Some(datatype), None)?
        }
    };
    Ok(Some(literal.into()))
}

/// Convert a whole JSON value
///
/// Returns `Ok(None)` for arrays, node objects and `null`.
pub fn value_to_term(
    value: &Value,
    factory: &mut dyn DataFactory,
    resolver: &dyn KeyResolver,
) -> JsonLdResult<Option<RdfObject>> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => scalar_to_term(&Scalar::Boolean(*b), factory),
        Value::Number(n) => scalar_to_term(&Scalar::Number(n.clone()), factory),
        Value::String(s) => scalar_to_term(&Scalar::String(s.clone()), factory),
        Value::Array(_) => Ok(None),
        Value::Object(map) => {
            if !map.contains_key("@value") {
                return Ok(None);
            }
            let mut builder = ValueObject::default();
            for (key, entry) in map {
                let keyword = Keyword::parse(key)
                    .ok_or_else(|| invalid_value_object(&format!("unexpected key {:?}", key)))?;
                builder.set(keyword, json_scalar(entry)?)?;
            }
            builder.finish(factory, resolver)
        }
    }
}

/// Lexical form and datatype IRI of a JSON number
pub fn number_lexical(number: &Number) -> JsonLdResult<(String, &'static str)> {
    if let Some(i) = number.as_i64() {
        return Ok((i.to_string(), xsd::INTEGER));
    }
    if let Some(u) = number.as_u64() {
        return Ok((u.to_string(), xsd::INTEGER));
    }
    let f = number
        .as_f64()
        .ok_or_else(|| JsonLdError::UnsupportedValue(format!("number {} out of range", number)))?;
    if f.fract() == 0.0 && f.abs() < MAX_SAFE_INTEGER {
        return Ok(((f as i64).to_string(), xsd::INTEGER));
    }
    Ok((render_double(f), xsd::DOUBLE))
}

fn render_double(f: f64) -> String {
    let magnitude = f.abs();
    if magnitude >= 1e21 || (magnitude != 0.0 && magnitude < 1e-6) {
        // Positive exponents carry an explicit sign: 1e+21
        let rendered = format!("{:e}", f);
        match rendered.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => rendered,
        }
    } else {
        format!("{}", f)
    }
}

/// Expand an IRI-valued string (`@type` values, `@id` values)
pub(crate) fn iri_term(
    value: &str,
    factory: &mut dyn DataFactory,
    resolver: &dyn KeyResolver,
) -> JsonLdResult<NamedNode> {
    let iri = resolver
        .expand(value)
        .ok_or_else(|| JsonLdError::InvalidIri(value.to_string()))?;
    factory.named_node(&iri)
}

fn json_scalar(value: &Value) -> JsonLdResult<Scalar> {
    Ok(match value {
        Value::Null => Scalar::Null,
        Value::Bool(b) => Scalar::Boolean(*b),
        Value::Number(n) => Scalar::Number(n.clone()),
        Value::String(s) => Scalar::String(s.clone()),
        Value::Array(_) | Value::Object(_) => {
            return Err(invalid_value_object("members must be scalars"));
        }
    })
}

fn invalid_value_object(detail: &str) -> JsonLdError {
    JsonLdError::UnsupportedValue(format!("invalid value object: {}", detail))
}

/// Accumulates the members of a `{"@value": ...}` object
///
/// Keys may arrive in any order; the literal is built on [`finish`](Self::finish).
#[derive(Debug, Clone, Default)]
pub struct ValueObject {
    value: Option<Scalar>,
    language: Option<String>,
    datatype: Option<String>,
}

impl ValueObject {
    /// True once an `@value` member was seen
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// Record one member
    pub fn set(&mut self, keyword: Keyword, scalar: Scalar) -> JsonLdResult<()> {
        match keyword {
            Keyword::Value => {
                if self.value.is_some() {
                    return Err(invalid_value_object("duplicate @value"));
                }
                self.value = Some(scalar);
            }
            Keyword::Language => {
                if self.language.is_some() {
                    return Err(invalid_value_object("duplicate @language"));
                }
                match scalar {
                    Scalar::String(s) => self.language = Some(s),
                    Scalar::Null => {}
                    other => {
                        return Err(invalid_value_object(&format!(
                            "@language must be a string, found {}",
                            other.type_name()
                        )));
                    }
                }
            }
            Keyword::Type => self.set_type(scalar)?,
            other => {
                return Err(invalid_value_object(&format!("unexpected keyword {:?}", other)));
            }
        }
        Ok(())
    }

    fn set_type(&mut self, scalar: Scalar) -> JsonLdResult<()> {
        if self.datatype.is_some() {
            return Err(invalid_value_object("more than one @type"));
        }
        match scalar {
            Scalar::String(s) => {
                self.datatype = Some(s);
                Ok(())
            }
            other => Err(invalid_value_object(&format!(
                "@type must be a string, found {}",
                other.type_name()
            ))),
        }
    }

    /// Build the literal; `Ok(None)` when `@value` is null
    pub fn finish(
        self,
        factory: &mut dyn DataFactory,
        resolver: &dyn KeyResolver,
    ) -> JsonLdResult<Option<RdfObject>> {
        let value = self
            .value
            .ok_or_else(|| invalid_value_object("missing @value"))?;
        if value == Scalar::Null {
            return Ok(None);
        }

        match (self.language, self.datatype) {
            (Some(_), Some(_)) => Err(invalid_value_object(
                "@language and @type cannot both be present",
            )),
            (Some(language), None) => match value {
                Scalar::String(s) => Ok(Some(factory.literal(&s, None, Some(&language))?.into())),
                other => Err(invalid_value_object(&format!(
                    "@language requires a string @value, found {}",
                    other.type_name()
                ))),
            },
            (None, Some(datatype)) => {
                let datatype = iri_term(&datatype, factory, resolver)?;
                let lexical = match value {
                    Scalar::String(s) => s,
                    Scalar::Boolean(b) => b.to_string(),
                    Scalar::Number(n) => number_lexical(&n)?.0,
                    Scalar::Null => unreachable!("null @value handled above"),
                };
                Ok(Some(factory.literal(&lexical, Some(datatype), None)?.into()))
            }
            (None, None) => scalar_to_term(&value, factory),
        }
    }
}
