use crate::error::{AuthError, Result};
use serde_json::{Map, Value};
use sso_database::{Database, DatabaseError, ExtraFieldRepository};
use sso_models::{ExtraField, NewExtraField};
use validator::Validate;

/// Build the extra-field document of a new account.
/// Every defined field gets the provided non-null value or its default.
/// Keys without a definition are dropped.
pub fn merge_extra_fields(
    definitions: &[ExtraField],
    provided: &Map<String, Value>,
    enforce_required: bool,
) -> Result<Value> {
    let mut merged = Map::new();

    for field in definitions {
        let value = match provided.get(&field.name) {
            Some(value) if !value.is_null() => value.clone(),
            _ => field.default_value.clone(),
        };

        if enforce_required && field.required && value.is_null() {
            return Err(AuthError::ValidationError(format!(
                "Extra field {} is required",
                field.name
            )));
        }

        merged.insert(field.name.clone(), value);
    }

    Ok(Value::Object(merged))
}

/// Apply a self-service change on top of `current`.
/// Only editable, defined fields may change.
pub fn apply_editable_fields(
    definitions: &[ExtraField],
    current: &Value,
    provided: &Map<String, Value>,
) -> Result<Value> {
    let mut updated = current.as_object().cloned().unwrap_or_default();

    for (name, value) in provided {
        let field = definitions
            .iter()
            .find(|field| &field.name == name)
            .ok_or_else(|| AuthError::ValidationError(format!("Unknown extra field {}", name)))?;

        if !field.editable {
            return Err(AuthError::Forbidden(format!("Extra field {} is not editable", name)));
        }

        if field.required && value.is_null() {
            return Err(AuthError::ValidationError(format!(
                "Extra field {} is required",
                name
            )));
        }

        updated.insert(name.clone(), value.clone());
    }

    Ok(Value::Object(updated))
}

#[derive(Clone)]
pub struct ExtraFieldService {
    fields: ExtraFieldRepository,
}

impl ExtraFieldService {
    pub fn new(db: &Database) -> Self {
        Self {
            fields: ExtraFieldRepository::new(db.pool().clone()),
        }
    }

    pub async fn list(&self) -> Result<Vec<ExtraField>> {
        Ok(self.fields.list().await?)
    }

    pub async fn create(&self, field: NewExtraField) -> Result<ExtraField> {
        field.validate()?;
        let field = self.fields.create(&field).await?;
        tracing::info!("Extra field defined: id={}, name={}", field.id, field.name);
        Ok(field)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        if !self.fields.delete(id).await? {
            return Err(DatabaseError::not_found("ExtraField", &id.to_string()).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(name: &str, default_value: Value, editable: bool, required: bool) -> ExtraField {
        ExtraField {
            id: 1,
            field_type: "string".to_string(),
            name: name.to_string(),
            default_value,
            editable,
            required,
            validators: Value::Null,
        }
    }

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_merge_uses_defaults_and_drops_unknown() {
        let definitions = vec![
            field("company", json!("none"), true, false),
            field("newsletter", json!(false), true, false),
        ];
        let provided = map(json!({"company": "Acme", "newsletter": null, "hacker": 1}));

        let merged = merge_extra_fields(&definitions, &provided, true).unwrap();
        assert_eq!(merged, json!({"company": "Acme", "newsletter": false}));
    }

    #[test]
    fn test_merge_keeps_falsy_values() {
        let definitions = vec![field("count", json!(10), true, false)];
        let merged = merge_extra_fields(&definitions, &map(json!({"count": 0})), true).unwrap();
        assert_eq!(merged, json!({"count": 0}));
    }

    #[test]
    fn test_required_field() {
        let definitions = vec![field("badge", Value::Null, true, true)];

        assert!(merge_extra_fields(&definitions, &Map::new(), true).is_err());
        // Invitations create accounts before the user can fill anything in
        assert!(merge_extra_fields(&definitions, &Map::new(), false).is_ok());
    }

    #[test]
    fn test_apply_editable_fields() {
        let definitions = vec![
            field("company", json!(""), true, false),
            field("employee_id", json!(""), false, false),
        ];
        let current = json!({"company": "Old", "employee_id": "E1"});

        let updated =
            apply_editable_fields(&definitions, &current, &map(json!({"company": "New"}))).unwrap();
        assert_eq!(updated, json!({"company": "New", "employee_id": "E1"}));

        let locked = apply_editable_fields(&definitions, &current, &map(json!({"employee_id": "E2"})));
        assert!(matches!(locked, Err(AuthError::Forbidden(_))));

        let unknown = apply_editable_fields(&definitions, &current, &map(json!({"other": 1})));
        assert!(matches!(unknown, Err(AuthError::ValidationError(_))));
    }
}
