//! Ordered field collections.
//!
//! A [`FieldCollection`] is sent positionally: the PLC sees only the values,
//! one write per field, in insertion order. Names exist for diagnostics.
//! [`VehicleAttributes`] maps a vehicle record onto the fixed field order the
//! line PLC expects.

use std::fmt;

/// Key prefix applied to every vehicle attribute field.
pub const FIELD_PREFIX: &str = "EXPECTED_";

/// A named textual value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Field {
    /// Field name (diagnostics only, never sent).
    pub name: String,
    /// Value sent on the wire as ASCII.
    pub value: String,
}

impl Field {
    /// Creates a field.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: \"{}\" ({} chars)",
            self.name,
            self.value,
            self.value.chars().count()
        )
    }
}

/// Ordered sequence of fields. Duplicate names are allowed; order is what matters.
///
/// # Example
///
/// ```
/// use plc_field_link::FieldCollection;
///
/// let fields: FieldCollection = [("A", "1"), ("B", "22")].into_iter().collect();
/// let values: Vec<&str> = fields.iter().map(|f| f.value.as_str()).collect();
/// assert_eq!(values, ["1", "22"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FieldCollection {
    fields: Vec<Field>,
}

impl FieldCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field at the end.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push(Field::new(name, value));
    }

    /// Appends a field and returns the collection.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if there are no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates in transmission order.
    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    /// Returns the value of the first field named `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for FieldCollection {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(name, value)| Field::new(name, value))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FieldCollection {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// The eleven attributes of a vehicle record, in line order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleAttributes {
    /// Model code.
    pub model: String,
    /// Engine code.
    pub engine: String,
    /// Engine displacement.
    pub displacement: String,
    /// Vehicle identification number.
    pub vin: String,
    /// Color code.
    pub color: String,
    /// Trim code.
    pub trim: String,
    /// Gross vehicle mass.
    pub gvm: String,
    /// Transmission code.
    pub transmission: String,
    /// Axle code.
    pub axle: String,
    /// Plant code.
    pub plant: String,
    /// Build date.
    pub built: String,
}

impl VehicleAttributes {
    /// Maps the record onto prefixed fields in declaration order.
    ///
    /// # Example
    ///
    /// ```
    /// use plc_field_link::VehicleAttributes;
    ///
    /// let fields = VehicleAttributes::default().to_fields();
    /// assert_eq!(fields.len(), 11);
    /// assert_eq!(fields.iter().next().unwrap().name, "EXPECTED_Model");
    /// ```
    pub fn to_fields(&self) -> FieldCollection {
        [
            ("Model", &self.model),
            ("Engine", &self.engine),
            ("Displacement", &self.displacement),
            ("VIN", &self.vin),
            ("Color", &self.color),
            ("Trim", &self.trim),
            ("GVM", &self.gvm),
            ("Transmission", &self.transmission),
            ("Axle", &self.axle),
            ("Plant", &self.plant),
            ("Built", &self.built),
        ]
        .into_iter()
        .map(|(name, value)| (format!("{FIELD_PREFIX}{name}"), value.clone()))
        .collect()
    }
}

impl From<&VehicleAttributes> for FieldCollection {
    fn from(attributes: &VehicleAttributes) -> Self {
        attributes.to_fields()
    }
}
