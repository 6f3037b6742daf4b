//! Primitive codec: one stored property to one typed scalar

use crate::error::{RepositoryError, RepositoryResult};
use crate::graph::{ElementId, PropertyContainer, PropertyValue};
use crate::model::Scalar;
use crate::typesys::PrimitiveKind;
use chrono::{TimeZone, Utc};

/// Decode `property` of a vertex or edge as `kind`. An unset or null
/// property is `None`.
pub fn decode_primitive<C: PropertyContainer + ?Sized>(
    container: &C,
    property: &str,
    kind: PrimitiveKind,
) -> RepositoryResult<Option<Scalar>> {
    match container.value(property) {
        Some(raw) => decode_value(raw, kind, container.element_id(), property).map(Some),
        None => Ok(None),
    }
}

/// Same as [`decode_primitive`] with the type given by name
/// (case-insensitive)
pub fn decode_primitive_named<C: PropertyContainer + ?Sized>(
    container: &C,
    property: &str,
    type_name: &str,
) -> RepositoryResult<Option<Scalar>> {
    let kind = type_name
        .parse::<PrimitiveKind>()
        .map_err(|reason| RepositoryError::invalid_type(type_name, container.element_id(), reason))?;
    decode_primitive(container, property, kind)
}

/// Decode one raw value, e.g. an array element
pub fn decode_value(
    raw: &PropertyValue,
    kind: PrimitiveKind,
    element: ElementId,
    property: &str,
) -> RepositoryResult<Scalar> {
    let mismatch = || {
        RepositoryError::invalid_type(
            kind.name(),
            element,
            format!("property {} holds {} {}", property, raw.type_name(), raw),
        )
    };

    let scalar = match (kind, raw) {
        (PrimitiveKind::String, PropertyValue::String(s)) => Scalar::String(s.clone()),
        (PrimitiveKind::Short, PropertyValue::Integer(i)) => {
            Scalar::Short(i16::try_from(*i).map_err(|_| mismatch())?)
        }
        (PrimitiveKind::Int, PropertyValue::Integer(i)) => Scalar::Int(i32::try_from(*i).map_err(|_| mismatch())?),
        (PrimitiveKind::Long, PropertyValue::Integer(i)) => Scalar::Long(*i),
        (PrimitiveKind::Byte, PropertyValue::Integer(i)) => Scalar::Byte(i8::try_from(*i).map_err(|_| mismatch())?),
        (PrimitiveKind::Float, PropertyValue::Float(f)) => Scalar::Float(*f as f32),
        (PrimitiveKind::Float, PropertyValue::Integer(i)) => Scalar::Float(*i as f32),
        (PrimitiveKind::Double, PropertyValue::Float(f)) => Scalar::Double(*f),
        (PrimitiveKind::Double, PropertyValue::Integer(i)) => Scalar::Double(*i as f64),
        (PrimitiveKind::Boolean, PropertyValue::Boolean(b)) => Scalar::Boolean(*b),
        (PrimitiveKind::BigInteger, PropertyValue::Integer(i)) => Scalar::BigInteger(i.to_string()),
        (PrimitiveKind::BigInteger, PropertyValue::String(s)) if is_integer_text(s) => {
            Scalar::BigInteger(s.clone())
        }
        (PrimitiveKind::BigDecimal, PropertyValue::Integer(i)) => Scalar::BigDecimal(i.to_string()),
        (PrimitiveKind::BigDecimal, PropertyValue::Float(f)) if f.is_finite() => Scalar::BigDecimal(f.to_string()),
        (PrimitiveKind::BigDecimal, PropertyValue::String(s)) if is_decimal_text(s) => {
            Scalar::BigDecimal(s.clone())
        }
        (PrimitiveKind::Date, PropertyValue::DateTime(ms) | PropertyValue::Integer(ms)) => {
            let date = Utc.timestamp_millis_opt(*ms).single().ok_or_else(mismatch)?;
            Scalar::Date(date)
        }
        _ => return Err(mismatch()),
    };
    Ok(scalar)
}

fn is_integer_text(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_decimal_text(s: &str) -> bool {
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(pos) => (&s[..pos], Some(&s[pos + 1..])),
        None => (s, None),
    };
    if let Some(exp) = exponent {
        if !is_integer_text(exp) {
            return false;
        }
    }

    let unsigned = mantissa.strip_prefix(['-', '+']).unwrap_or(mantissa);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((w, f)) => (w, f),
        None => (unsigned, ""),
    };
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    (!whole.is_empty() || !fraction.is_empty()) && all_digits(whole) && all_digits(fraction)
}
