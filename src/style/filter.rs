use crate::core::{AttributeValue, Feature};
use crate::error::{MapnikError, MapnikResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Equal,
    NotEqual,
}

/// Rule filter expression.
///
/// Supports `true`, `[field] = literal` and `[field] != literal` (also `<>`).
/// Literals are single/double quoted strings or numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Always,
    Compare {
        field: String,
        op: FilterOp,
        value: AttributeValue,
    },
}

impl Filter {
    pub fn parse(text: &str) -> MapnikResult<Self> {
        let expression = text.trim();
        if expression.is_empty() || expression.eq_ignore_ascii_case("true") {
            return Ok(Self::Always);
        }

        let invalid = || MapnikError::Stylesheet(format!("failed to parse filter: \"{expression}\""));

        let rest = expression.strip_prefix('[').ok_or_else(invalid)?;
        let (field, rest) = rest.split_once(']').ok_or_else(invalid)?;
        let rest = rest.trim_start();

        let (op, literal) = if let Some(literal) = rest.strip_prefix("!=") {
            (FilterOp::NotEqual, literal)
        } else if let Some(literal) = rest.strip_prefix("<>") {
            (FilterOp::NotEqual, literal)
        } else if let Some(literal) = rest.strip_prefix("==") {
            (FilterOp::Equal, literal)
        } else if let Some(literal) = rest.strip_prefix('=') {
            (FilterOp::Equal, literal)
        } else {
            return Err(invalid());
        };

        let field = field.trim();
        if field.is_empty() {
            return Err(invalid());
        }

        Ok(Self::Compare {
            field: field.to_owned(),
            op,
            value: parse_literal(literal.trim()).ok_or_else(invalid)?,
        })
    }

    #[must_use]
    pub fn matches(&self, feature: &Feature) -> bool {
        match self {
            Self::Always => true,
            Self::Compare { field, op, value } => {
                let actual = feature.attribute(field).unwrap_or(&AttributeValue::Null);
                let equal = values_equal(actual, value);
                match op {
                    FilterOp::Equal => equal,
                    FilterOp::NotEqual => !equal,
                }
            }
        }
    }
}

fn parse_literal(literal: &str) -> Option<AttributeValue> {
    for quote in ['\'', '"'] {
        if let Some(inner) = literal
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return Some(AttributeValue::String(inner.to_owned()));
        }
    }
    match literal {
        "" => None,
        "null" => Some(AttributeValue::Null),
        "true" => Some(AttributeValue::Bool(true)),
        "false" => Some(AttributeValue::Bool(false)),
        number => number.parse::<f64>().ok().map(AttributeValue::Number),
    }
}

fn values_equal(actual: &AttributeValue, expected: &AttributeValue) -> bool {
    match (actual, expected) {
        (AttributeValue::Number(a), AttributeValue::Number(b)) => a == b,
        (AttributeValue::String(a), AttributeValue::Number(b)) => {
            a.trim().parse::<f64>().is_ok_and(|a| a == *b)
        }
        (AttributeValue::Number(a), AttributeValue::String(b)) => {
            b.trim().parse::<f64>().is_ok_and(|b| *a == b)
        }
        (a, b) => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::{Filter, FilterOp};
    use crate::core::{AttributeValue, Coord, Feature, Geometry};

    fn park() -> Feature {
        Feature::new(1, Geometry::Point(Coord::new(0.0, 0.0)))
            .with_attribute("kind", AttributeValue::String("park".to_owned()))
            .with_attribute("level", AttributeValue::Number(2.0))
    }

    #[test]
    fn equality_filters_match_strings_and_numbers() {
        assert!(Filter::parse("[kind] = 'park'").expect("parse").matches(&park()));
        assert!(Filter::parse("[level]=2").expect("parse").matches(&park()));
        assert!(!Filter::parse("[kind] = \"forest\"").expect("parse").matches(&park()));
    }

    #[test]
    fn inequality_filter_treats_missing_fields_as_null() {
        let filter = Filter::parse("[name] <> 'x'").expect("parse");
        assert!(matches!(
            filter,
            Filter::Compare {
                op: FilterOp::NotEqual,
                ..
            }
        ));
        assert!(filter.matches(&park()));
    }

    #[test]
    fn malformed_filters_are_rejected() {
        assert!(Filter::parse("kind = 'park'").is_err());
        assert!(Filter::parse("[kind] > 3").is_err());
        assert!(Filter::parse("[] = 1").is_err());
    }
}
