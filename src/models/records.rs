use serde::de::DeserializeOwned;

/// A record shape read from a JSON fixture.
pub trait Record: DeserializeOwned + Clone {
    /// Human name used in logs and error messages ("certificate", "project").
    const KIND: &'static str;

    /// Check required fields and normalise optional ones.
    /// Returns the reason the record is unusable.
    fn validate(&mut self) -> Result<(), String>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// Not JSON, or not an array of objects of the expected shape.
    Malformed(String),
    /// Parsed, but a record failed validation.
    Invalid { index: usize, reason: String },
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaError::Malformed(msg) => write!(f, "malformed data: {}", msg),
            SchemaError::Invalid { index, reason } => {
                write!(f, "record {} is invalid: {}", index, reason)
            }
        }
    }
}

impl std::error::Error for SchemaError {}

/// Parse a JSON array body and validate every record in it.
pub fn parse_records<T: Record>(body: &str) -> Result<Vec<T>, SchemaError> {
    let mut records: Vec<T> =
        serde_json::from_str(body).map_err(|e| SchemaError::Malformed(e.to_string()))?;
    for (index, record) in records.iter_mut().enumerate() {
        record
            .validate()
            .map_err(|reason| SchemaError::Invalid { index, reason })?;
    }
    Ok(records)
}

/// Treat empty or whitespace-only optional strings as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Ordered, position-addressed collection of records.
#[derive(Debug, Clone)]
pub struct RecordSet<T> {
    items: Vec<T>,
}

impl<T> Default for RecordSet<T> {
    fn default() -> Self {
        RecordSet { items: Vec::new() }
    }
}

impl<T> RecordSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a freshly loaded set.
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn add(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}
