// src/constraint.rs

use serde_json::{json, Map, Value};

use crate::geopoint::ParseGeoPoint;

/// A query predicate on a single key, serialized under its Parse operator (`$lt`, `$in`, ...).
///
/// Several constraints on the same key are merged into one operator object, e.g.
/// `{"score": {"$gte": 1000, "$lte": 3000}}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    NotEqualTo(Value),
    LessThan(Value),
    LessThanOrEqualTo(Value),
    GreaterThan(Value),
    GreaterThanOrEqualTo(Value),
    ContainedIn(Vec<Value>),
    NotContainedIn(Vec<Value>),
    ContainsAll(Vec<Value>),
    Exists(bool),
    Regex {
        pattern: String,
        options: Option<String>,
    },
    /// The key must point to an object matched by the inner `where` clause.
    InQuery {
        class_name: String,
        where_clause: Map<String, Value>,
    },
    NotInQuery {
        class_name: String,
        where_clause: Map<String, Value>,
    },
    NearSphere(ParseGeoPoint),
    MaxDistanceInKilometers(f64),
    MaxDistanceInMiles(f64),
    MaxDistanceInRadians(f64),
    WithinBox {
        south_west: ParseGeoPoint,
        north_east: ParseGeoPoint,
    },
}

fn geo_point_value(point: &ParseGeoPoint) -> Value {
    json!({
        "__type": "GeoPoint",
        "latitude": point.latitude,
        "longitude": point.longitude
    })
}

impl Constraint {
    /// The operator key this constraint is stored under.
    pub fn operator(&self) -> &'static str {
        match self {
            Constraint::NotEqualTo(_) => "$ne",
            Constraint::LessThan(_) => "$lt",
            Constraint::LessThanOrEqualTo(_) => "$lte",
            Constraint::GreaterThan(_) => "$gt",
            Constraint::GreaterThanOrEqualTo(_) => "$gte",
            Constraint::ContainedIn(_) => "$in",
            Constraint::NotContainedIn(_) => "$nin",
            Constraint::ContainsAll(_) => "$all",
            Constraint::Exists(_) => "$exists",
            Constraint::Regex { .. } => "$regex",
            Constraint::InQuery { .. } => "$inQuery",
            Constraint::NotInQuery { .. } => "$notInQuery",
            Constraint::NearSphere(_) => "$nearSphere",
            Constraint::MaxDistanceInKilometers(_) => "$maxDistanceInKilometers",
            Constraint::MaxDistanceInMiles(_) => "$maxDistanceInMiles",
            Constraint::MaxDistanceInRadians(_) => "$maxDistanceInRadians",
            Constraint::WithinBox { .. } => "$within",
        }
    }

    fn operand(&self) -> Value {
        match self {
            Constraint::NotEqualTo(v)
            | Constraint::LessThan(v)
            | Constraint::LessThanOrEqualTo(v)
            | Constraint::GreaterThan(v)
            | Constraint::GreaterThanOrEqualTo(v) => v.clone(),
            Constraint::ContainedIn(values)
            | Constraint::NotContainedIn(values)
            | Constraint::ContainsAll(values) => Value::Array(values.clone()),
            Constraint::Exists(exists) => Value::Bool(*exists),
            Constraint::Regex { pattern, .. } => Value::String(pattern.clone()),
            Constraint::InQuery {
                class_name,
                where_clause,
            }
            | Constraint::NotInQuery {
                class_name,
                where_clause,
            } => json!({ "where": where_clause, "className": class_name }),
            Constraint::NearSphere(point) => geo_point_value(point),
            Constraint::MaxDistanceInKilometers(d)
            | Constraint::MaxDistanceInMiles(d)
            | Constraint::MaxDistanceInRadians(d) => json!(d),
            Constraint::WithinBox {
                south_west,
                north_east,
            } => json!({ "$box": [geo_point_value(south_west), geo_point_value(north_east)] }),
        }
    }

    /// Writes this constraint into the operator object of one key.
    ///
    /// A later constraint with the same operator overwrites the earlier one.
    pub(crate) fn apply_to(&self, operators: &mut Map<String, Value>) {
        operators.insert(self.operator().to_string(), self.operand());
        if let Constraint::Regex { options, .. } = self {
            match options {
                Some(options) if !options.is_empty() => {
                    operators.insert("$options".to_string(), Value::String(options.clone()));
                }
                _ => {
                    operators.remove("$options");
                }
            }
        }
    }

    /// Renders the constraint alone as `{"$op": operand}`.
    pub fn to_value(&self) -> Value {
        let mut operators = Map::new();
        self.apply_to(&mut operators);
        Value::Object(operators)
    }
}

/// Whether `value` is an operator object (`{"$lt": ..}`) rather than a literal to compare with.
pub(crate) fn is_operator_object(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|map| !map.is_empty() && map.keys().all(|k| k.starts_with('$')))
}
