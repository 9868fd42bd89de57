//! InputStore: local text of input fields, grouped by form.
//!
//! The renderer registers every node carrying a `fieldId` (inside the nearest
//! `formId` scope); the host writes user input with [`InputStore::set_value`].
//! `login` and `submitForm` read from here at dispatch time.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use serde_json::{Map, Value};

use super::{read, write};

#[derive(Debug, Default)]
struct Inputs {
    values: HashMap<String, String>,
    /// Form id -> field ids in registration order.
    forms: BTreeMap<String, Vec<String>>,
}

/// Current values of input fields for one mounted screen.
#[derive(Debug, Default)]
pub struct InputStore {
    inner: RwLock<Inputs>,
}

impl InputStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `field_id`, optionally as a member of `form_id`.
    ///
    /// `initial` seeds the value only if the field has none yet, so re-renders
    /// never overwrite what the user typed.
    pub fn register_field(&self, form_id: Option<&str>, field_id: &str, initial: Option<&str>) {
        let mut inputs = write(&self.inner);
        if let Some(initial) = initial {
            inputs
                .values
                .entry(field_id.to_owned())
                .or_insert_with(|| initial.to_owned());
        }
        if let Some(form_id) = form_id {
            let fields = inputs.forms.entry(form_id.to_owned()).or_default();
            if !fields.iter().any(|f| f == field_id) {
                fields.push(field_id.to_owned());
            }
        }
    }

    /// Overwrite a field's value (user input).
    pub fn set_value(&self, field_id: &str, value: impl Into<String>) {
        write(&self.inner)
            .values
            .insert(field_id.to_owned(), value.into());
    }

    /// Current value of a field.
    pub fn value(&self, field_id: &str) -> Option<String> {
        read(&self.inner).values.get(field_id).cloned()
    }

    /// Field ids registered under `form_id`, in registration order.
    pub fn form_fields(&self, form_id: &str) -> Vec<String> {
        read(&self.inner)
            .forms
            .get(form_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether any field has been registered under `form_id`.
    pub fn has_form(&self, form_id: &str) -> bool {
        read(&self.inner).forms.contains_key(form_id)
    }

    /// `{fieldId: value}` for every field of `form_id`; unset fields are `""`.
    pub fn form_values(&self, form_id: &str) -> Map<String, Value> {
        let inputs = read(&self.inner);
        let mut out = Map::new();
        if let Some(fields) = inputs.forms.get(form_id) {
            for field in fields {
                let value = inputs.values.get(field).cloned().unwrap_or_default();
                out.insert(field.clone(), Value::String(value));
            }
        }
        out
    }

    /// Forget every field value. Form memberships come from the rendered
    /// tree and are kept.
    pub fn clear(&self) {
        write(&self.inner).values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn register_seeds_initial_once() {
        let inputs = InputStore::new();
        inputs.register_field(None, "email", Some("a@b.c"));
        assert_eq!(inputs.value("email").as_deref(), Some("a@b.c"));
        inputs.set_value("email", "typed");
        inputs.register_field(None, "email", Some("a@b.c"));
        assert_eq!(inputs.value("email").as_deref(), Some("typed"));
    }

    #[test]
    fn form_membership_is_ordered_and_unique() {
        let inputs = InputStore::new();
        inputs.register_field(Some("f1"), "email", None);
        inputs.register_field(Some("f1"), "password", None);
        inputs.register_field(Some("f1"), "email", None);
        inputs.register_field(Some("f2"), "other", None);
        assert_eq!(inputs.form_fields("f1"), vec!["email", "password"]);
        assert_eq!(inputs.form_fields("f2"), vec!["other"]);
        assert!(inputs.form_fields("nope").is_empty());
        assert!(inputs.has_form("f1"));
        assert!(!inputs.has_form("nope"));
    }

    #[test]
    fn form_values_fill_missing_with_empty() {
        let inputs = InputStore::new();
        inputs.register_field(Some("f1"), "email", None);
        inputs.register_field(Some("f1"), "name", None);
        inputs.set_value("email", "x@y.z");
        assert_eq!(
            Value::Object(inputs.form_values("f1")),
            json!({"email": "x@y.z", "name": ""})
        );
    }

    #[test]
    fn clear_keeps_form_membership() {
        let inputs = InputStore::new();
        inputs.register_field(Some("f1"), "email", Some("x"));
        inputs.clear();
        assert_eq!(inputs.value("email"), None);
        assert!(inputs.has_form("f1"));
        assert_eq!(inputs.form_fields("f1"), vec!["email"]);
        assert_eq!(Value::Object(inputs.form_values("f1")), json!({"email": ""}));
    }
}
