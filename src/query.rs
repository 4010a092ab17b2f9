// src/query.rs

use reqwest::Method;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::{AuthType, Parse};
use crate::constraint::{is_operator_object, Constraint};
use crate::endpoint::Endpoint;
use crate::error::ParseError;
use crate::geopoint::ParseGeoPoint;
use crate::object::{validate_class_name, validate_object_id, ParseClass};
use crate::types::Pointer;

/// A query against one Parse class.
///
/// Builder methods take and return `&mut Self` so constraints can be chained:
///
/// ```rust
/// use parse_rest::ParseQuery;
///
/// let mut query = ParseQuery::new("GameScore");
/// query
///     .greater_than_or_equal_to("score", 1000)
///     .less_than_or_equal_to("score", 3000)
///     .order_by_descending("score")
///     .limit(10);
/// let params = query.build_query_params().unwrap();
/// assert_eq!(params[0].1, r#"{"score":{"$gte":1000,"$lte":3000}}"#);
/// ```
///
/// A value that fails to serialize does not abort the chain; the failure is kept and returned
/// as [`ParseError::InvalidQuery`] when the query is built or executed.
#[derive(Debug, Clone)]
pub struct ParseQuery {
    class_name: String,
    conditions: Map<String, Value>,
    limit: Option<isize>,
    skip: Option<usize>,
    order: Option<String>,
    include: Option<String>,
    keys: Option<String>,
    use_master_key: bool,
    errors: Vec<String>,
}

impl ParseQuery {
    /// Creates a new `ParseQuery` for the specified class name.
    pub fn new(class_name: &str) -> Self {
        Self {
            class_name: class_name.to_string(),
            conditions: Map::new(),
            limit: None,
            skip: None,
            order: None,
            include: None,
            keys: None,
            use_master_key: false,
            errors: Vec::new(),
        }
    }

    /// Creates a query on the class of the typed model `T`.
    pub fn for_class<T: ParseClass>() -> Self {
        Self::new(T::CLASS_NAME)
    }

    /// Returns the class name this query targets.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// The `where` clause built so far.
    pub fn where_clause(&self) -> &Map<String, Value> {
        &self.conditions
    }

    /// Checks if this query is configured to use the master key.
    pub fn uses_master_key(&self) -> bool {
        self.use_master_key
    }

    /// Sets whether this query should be executed using the master key.
    pub fn set_master_key(&mut self, use_key: bool) -> &mut Self {
        self.use_master_key = use_key;
        self
    }

    fn record_error(&mut self, message: String) {
        log::warn!("Query on '{}': {}", self.class_name, message);
        self.errors.push(message);
    }

    fn encode<V: Serialize>(&mut self, key: &str, value: V) -> Option<Value> {
        match serde_json::to_value(value) {
            Ok(json_val) => Some(json_val),
            Err(e) => {
                self.record_error(format!("value for key '{}' could not be serialized: {}", key, e));
                None
            }
        }
    }

    fn encode_list<V: Serialize>(&mut self, key: &str, values: Vec<V>) -> Option<Vec<Value>> {
        values
            .into_iter()
            .map(|v| self.encode(key, v))
            .collect::<Option<Vec<Value>>>()
    }

    /// Adds `constraint` on `key`, merging it with the operators already set there.
    ///
    /// An equality set with [`equal_to`](Self::equal_to) is replaced.
    pub fn add_constraint(&mut self, key: &str, constraint: Constraint) -> &mut Self {
        let entry = self
            .conditions
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !is_operator_object(entry) {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(operators) = entry {
            constraint.apply_to(operators);
        }
        self
    }

    fn add_value_constraint<V: Serialize>(
        &mut self,
        key: &str,
        value: V,
        make: fn(Value) -> Constraint,
    ) -> &mut Self {
        match self.encode(key, value) {
            Some(json_val) => self.add_constraint(key, make(json_val)),
            None => self,
        }
    }

    fn add_list_constraint<V: Serialize>(
        &mut self,
        key: &str,
        values: Vec<V>,
        make: fn(Vec<Value>) -> Constraint,
    ) -> &mut Self {
        match self.encode_list(key, values) {
            Some(list) => self.add_constraint(key, make(list)),
            None => self,
        }
    }

    /// Adds a constraint to the query that a field must be equal to a specified value.
    /// Replaces every other constraint on `key`.
    pub fn equal_to<V: Serialize>(&mut self, key: &str, value: V) -> &mut Self {
        if let Some(json_val) = self.encode(key, value) {
            self.conditions.insert(key.to_string(), json_val);
        }
        self
    }

    /// Adds a constraint to the query that a field must not be equal to a specified value.
    pub fn not_equal_to<V: Serialize>(&mut self, key: &str, value: V) -> &mut Self {
        self.add_value_constraint(key, value, Constraint::NotEqualTo)
    }

    pub fn less_than<V: Serialize>(&mut self, key: &str, value: V) -> &mut Self {
        self.add_value_constraint(key, value, Constraint::LessThan)
    }

    pub fn less_than_or_equal_to<V: Serialize>(&mut self, key: &str, value: V) -> &mut Self {
        self.add_value_constraint(key, value, Constraint::LessThanOrEqualTo)
    }

    pub fn greater_than<V: Serialize>(&mut self, key: &str, value: V) -> &mut Self {
        self.add_value_constraint(key, value, Constraint::GreaterThan)
    }

    pub fn greater_than_or_equal_to<V: Serialize>(&mut self, key: &str, value: V) -> &mut Self {
        self.add_value_constraint(key, value, Constraint::GreaterThanOrEqualTo)
    }

    /// Adds a constraint for finding objects where a field's value is contained in the provided list of values.
    pub fn contained_in<V: Serialize>(&mut self, key: &str, values: Vec<V>) -> &mut Self {
        self.add_list_constraint(key, values, Constraint::ContainedIn)
    }

    /// Adds a constraint for finding objects where a field's value is not contained in the provided list of values.
    pub fn not_contained_in<V: Serialize>(&mut self, key: &str, values: Vec<V>) -> &mut Self {
        self.add_list_constraint(key, values, Constraint::NotContainedIn)
    }

    /// Adds a constraint for finding objects where an array field contains all of the provided values.
    pub fn contains_all<V: Serialize>(&mut self, key: &str, values: Vec<V>) -> &mut Self {
        self.add_list_constraint(key, values, Constraint::ContainsAll)
    }

    /// Adds a constraint to the query that a field must exist.
    pub fn exists(&mut self, key: &str) -> &mut Self {
        self.add_constraint(key, Constraint::Exists(true))
    }

    /// Adds a constraint to the query that a field must not exist.
    pub fn does_not_exist(&mut self, key: &str) -> &mut Self {
        self.add_constraint(key, Constraint::Exists(false))
    }

    /// Adds a constraint for finding objects where a string field starts with a given prefix.
    pub fn starts_with(&mut self, key: &str, prefix: &str) -> &mut Self {
        self.matches_regex(key, &format!("^{}", regex::escape(prefix)), None)
    }

    /// Adds a constraint for finding objects where a string field ends with a given suffix.
    pub fn ends_with(&mut self, key: &str, suffix: &str) -> &mut Self {
        self.matches_regex(key, &format!("{}$", regex::escape(suffix)), None)
    }

    /// Adds a constraint for finding objects where a string field contains a given substring.
    pub fn contains(&mut self, key: &str, substring: &str) -> &mut Self {
        self.matches_regex(key, &format!(".*{}.*", regex::escape(substring)), None)
    }

    /// Adds a constraint for finding objects where a string field matches a given regex pattern.
    /// Modifiers can be 'i' for case-insensitive, 'm' for multiline, etc.
    pub fn matches_regex(
        &mut self,
        key: &str,
        regex_pattern: &str,
        modifiers: Option<&str>,
    ) -> &mut Self {
        self.add_constraint(
            key,
            Constraint::Regex {
                pattern: regex_pattern.to_string(),
                options: modifiers.map(str::to_string),
            },
        )
    }

    fn subquery_parts(&mut self, inner: &ParseQuery) -> (String, Map<String, Value>) {
        for error in &inner.errors {
            self.errors.push(format!("in subquery on '{}': {}", inner.class_name, error));
        }
        (inner.class_name.clone(), inner.conditions.clone())
    }

    /// Requires the pointer stored in `key` to reference an object matched by `inner`.
    pub fn matches_query(&mut self, key: &str, inner: &ParseQuery) -> &mut Self {
        let (class_name, where_clause) = self.subquery_parts(inner);
        self.add_constraint(
            key,
            Constraint::InQuery {
                class_name,
                where_clause,
            },
        )
    }

    /// Requires the pointer stored in `key` to reference an object not matched by `inner`.
    pub fn does_not_match_query(&mut self, key: &str, inner: &ParseQuery) -> &mut Self {
        let (class_name, where_clause) = self.subquery_parts(inner);
        self.add_constraint(
            key,
            Constraint::NotInQuery {
                class_name,
                where_clause,
            },
        )
    }

    /// Orders results by distance from `point`, nearest first.
    pub fn near(&mut self, key: &str, point: ParseGeoPoint) -> &mut Self {
        self.add_constraint(key, Constraint::NearSphere(point))
    }

    /// Objects within `max_distance` kilometers of `point`, nearest first.
    pub fn within_kilometers(&mut self, key: &str, point: ParseGeoPoint, max_distance: f64) -> &mut Self {
        self.near(key, point)
            .add_constraint(key, Constraint::MaxDistanceInKilometers(max_distance))
    }

    pub fn within_miles(&mut self, key: &str, point: ParseGeoPoint, max_distance: f64) -> &mut Self {
        self.near(key, point)
            .add_constraint(key, Constraint::MaxDistanceInMiles(max_distance))
    }

    pub fn within_radians(&mut self, key: &str, point: ParseGeoPoint, max_distance: f64) -> &mut Self {
        self.near(key, point)
            .add_constraint(key, Constraint::MaxDistanceInRadians(max_distance))
    }

    /// Objects whose point lies in the box spanned by its south-west and north-east corners.
    pub fn within_geo_box(
        &mut self,
        key: &str,
        south_west: ParseGeoPoint,
        north_east: ParseGeoPoint,
    ) -> &mut Self {
        self.add_constraint(
            key,
            Constraint::WithinBox {
                south_west,
                north_east,
            },
        )
    }

    /// Adds a constraint to the query that objects must be related to a given parent object
    /// through a specific relation field.
    ///
    /// Example: all "Comment" objects in the "comments" relation of one "Post":
    /// ```
    /// use parse_rest::{ParseQuery, Pointer};
    ///
    /// let post = Pointer::new("Post", "postId123");
    /// let mut comments = ParseQuery::new("Comment");
    /// comments.related_to(&post, "comments");
    /// assert!(comments.where_clause().contains_key("$relatedTo"));
    /// ```
    pub fn related_to(&mut self, parent_object: &Pointer, key_on_parent_object: &str) -> &mut Self {
        if let Some(object) = self.encode("$relatedTo", parent_object) {
            let mut related_to_map = Map::new();
            related_to_map.insert("object".to_string(), object);
            related_to_map.insert(
                "key".to_string(),
                Value::String(key_on_parent_object.to_string()),
            );
            self.conditions
                .insert("$relatedTo".to_string(), Value::Object(related_to_map));
        }
        self
    }

    /// Combines queries on the same class into one matching any of them (`$or`).
    ///
    /// Ordering, paging and includes of the parts are ignored; set them on the result.
    pub fn or(queries: &[ParseQuery]) -> Result<ParseQuery, ParseError> {
        let first = queries.first().ok_or_else(|| {
            ParseError::InvalidQuery("an $or query needs at least one subquery".to_string())
        })?;
        if let Some(other) = queries.iter().find(|q| q.class_name != first.class_name) {
            return Err(ParseError::InvalidQuery(format!(
                "all $or subqueries must target the same class, got '{}' and '{}'",
                first.class_name, other.class_name
            )));
        }

        let mut combined = ParseQuery::new(&first.class_name);
        let clauses: Vec<Value> = queries
            .iter()
            .map(|q| Value::Object(q.conditions.clone()))
            .collect();
        for query in queries {
            combined.errors.extend(query.errors.iter().cloned());
        }
        combined.use_master_key = queries.iter().any(|q| q.use_master_key);
        combined
            .conditions
            .insert("$or".to_string(), Value::Array(clauses));
        Ok(combined)
    }

    // --- Pagination and Sorting ---

    /// Sets the maximum number of results to return.
    pub fn limit(&mut self, count: isize) -> &mut Self {
        self.limit = Some(count);
        self
    }

    /// Sets the number of results to skip before returning.
    pub fn skip(&mut self, count: usize) -> &mut Self {
        self.skip = Some(count);
        self
    }

    /// Sets the order of the results. Replaces any existing order.
    /// Takes a comma-separated string of field names. Prefix with '-' for descending order.
    /// e.g., "score,-playerName"
    pub fn order(&mut self, field_names: &str) -> &mut Self {
        self.order = Some(field_names.to_string());
        self
    }

    fn append_order_key(&mut self, key: &str, descending: bool) -> &mut Self {
        let prefix = if descending { "-" } else { "" };
        let new_order_key = format!("{}{}", prefix, key);
        match &mut self.order {
            Some(existing_order) if !existing_order.is_empty() => {
                existing_order.push(',');
                existing_order.push_str(&new_order_key);
            }
            _ => self.order = Some(new_order_key),
        }
        self
    }

    /// Sorts the results by a given key in ascending order. Replaces existing sort order.
    pub fn order_by_ascending(&mut self, key: &str) -> &mut Self {
        self.order = Some(key.to_string());
        self
    }

    /// Sorts the results by a given key in descending order. Replaces existing sort order.
    pub fn order_by_descending(&mut self, key: &str) -> &mut Self {
        self.order = Some(format!("-{}", key));
        self
    }

    /// Adds a key to sort the results by in ascending order. Appends to existing sort order.
    pub fn add_ascending_order(&mut self, key: &str) -> &mut Self {
        self.append_order_key(key, false)
    }

    /// Adds a key to sort the results by in descending order. Appends to existing sort order.
    pub fn add_descending_order(&mut self, key: &str) -> &mut Self {
        self.append_order_key(key, true)
    }

    fn merge_key_list(current: Option<String>, extra: &[&str]) -> Option<String> {
        let current = current.unwrap_or_default();
        let mut parts: Vec<&str> = current.split(',').filter(|s| !s.is_empty()).collect();
        parts.extend(extra.iter().copied().filter(|s| !s.is_empty()));
        parts.sort_unstable();
        parts.dedup();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(","))
        }
    }

    /// Returns the objects behind the given pointer keys inline. Dotted paths
    /// (`post.author`) include nested pointers.
    pub fn include(&mut self, keys_to_include: &[&str]) -> &mut Self {
        self.include = Self::merge_key_list(self.include.take(), keys_to_include);
        self
    }

    /// Restricts the fields returned for all matching objects.
    pub fn select(&mut self, keys_to_select: &[&str]) -> &mut Self {
        self.keys = Self::merge_key_list(self.keys.take(), keys_to_select);
        self
    }

    // --- Execution Methods ---

    /// URL parameters for this query: `where` (JSON), `limit`, `skip`, `order`, `include`, `keys`.
    ///
    /// Fails with [`ParseError::InvalidQuery`] if any builder call recorded an error.
    pub fn build_query_params(&self) -> Result<Vec<(&'static str, String)>, ParseError> {
        if !self.errors.is_empty() {
            return Err(ParseError::InvalidQuery(self.errors.join("; ")));
        }
        let mut params = Vec::new();
        if !self.conditions.is_empty() {
            params.push(("where", serde_json::to_string(&self.conditions)?));
        }
        if let Some(limit_val) = self.limit {
            params.push(("limit", limit_val.to_string()));
        }
        if let Some(skip_val) = self.skip {
            params.push(("skip", skip_val.to_string()));
        }
        if let Some(order_val) = &self.order {
            params.push(("order", order_val.clone()));
        }
        if let Some(include_val) = &self.include {
            params.push(("include", include_val.clone()));
        }
        if let Some(keys_val) = &self.keys {
            params.push(("keys", keys_val.clone()));
        }
        Ok(params)
    }

    fn auth(&self) -> AuthType<'static> {
        if self.use_master_key {
            AuthType::MasterKey
        } else {
            AuthType::Default
        }
    }

    async fn run<R: DeserializeOwned>(
        &self,
        client: &Parse,
        params: &[(&str, String)],
    ) -> Result<R, ParseError> {
        validate_class_name(&self.class_name)?;
        client
            ._request(
                Method::GET,
                Endpoint::Classes(&self.class_name),
                params,
                None::<&Value>,
                self.auth(),
            )
            .await
    }

    /// Retrieves every object matching this query (up to the server's page size or `limit`).
    ///
    /// `T` is typically [`ParseRecord<M>`](crate::ParseRecord) for a typed model or
    /// [`RetrievedParseObject`](crate::object::RetrievedParseObject).
    pub async fn find<T: DeserializeOwned>(&self, client: &Parse) -> Result<Vec<T>, ParseError> {
        let params = self.build_query_params()?;
        let response: FindResponse<T> = self.run(client, &params).await?;
        Ok(response.results)
    }

    /// Retrieves the first object that matches this query, if any.
    pub async fn first<T: DeserializeOwned>(&self, client: &Parse) -> Result<Option<T>, ParseError> {
        let mut query_clone = self.clone();
        query_clone.limit(1);
        let params = query_clone.build_query_params()?;
        let response: FindResponse<T> = self.run(client, &params).await?;
        Ok(response.results.into_iter().next())
    }

    /// Retrieves a specific object by its ID from the class associated with this query.
    ///
    /// Only `include` and `keys` apply; the `where` clause, ordering and paging are ignored.
    pub async fn get<T: DeserializeOwned>(&self, object_id: &str, client: &Parse) -> Result<T, ParseError> {
        validate_class_name(&self.class_name)?;
        validate_object_id(object_id)?;
        let params: Vec<(&str, String)> = self
            .build_query_params()?
            .into_iter()
            .filter(|(name, _)| matches!(*name, "include" | "keys"))
            .collect();
        client
            ._request(
                Method::GET,
                Endpoint::Object(&self.class_name, object_id),
                &params,
                None::<&Value>,
                self.auth(),
            )
            .await
    }

    /// Counts the number of objects that match this query without returning them.
    pub async fn count(&self, client: &Parse) -> Result<u64, ParseError> {
        let mut query_clone = self.clone();
        query_clone.limit(0);
        query_clone.skip = None;
        let mut params = query_clone.build_query_params()?;
        params.push(("count", "1".to_string()));

        let response: CountResponse = self.run(client, &params).await?;
        Ok(response.count)
    }
}

#[derive(Debug, Deserialize)]
struct FindResponse<T> {
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}
