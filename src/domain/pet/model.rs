use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError, ValidationErrors};

pub const COLOR_MAX: usize = 50;
pub const NOTE_MAX: usize = 200;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Pet {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub specie: String,
    pub breed: String,
    pub birth_date: Option<NaiveDate>,
    pub color: Option<Vec<String>>,
    pub distinctive_features: Option<Vec<String>>,
    pub medical_conditions: Option<Vec<String>>,
    pub owner_id: Option<ObjectId>,
    pub created_at: DateTime<Utc>,
}

/// Registration body as sent by the client. Every field is optional here so
/// that a missing field is reported next to the others instead of failing
/// deserialization outright.
#[derive(Serialize, Deserialize, Validate, Clone, Debug, Default)]
pub struct PetRegisterReceive {
    #[validate(length(max = 50, message = "Ensure this field has no more than 50 characters."))]
    pub name: Option<String>,

    #[validate(length(max = 30, message = "Ensure this field has no more than 30 characters."))]
    pub specie: Option<String>,

    #[validate(length(max = 50, message = "Ensure this field has no more than 50 characters."))]
    pub breed: Option<String>,

    pub birth_date: Option<String>,

    #[validate(length(max = 10, message = "Ensure this field has no more than 10 elements."))]
    pub color: Option<Vec<String>>,

    #[validate(length(max = 10, message = "Ensure this field has no more than 10 elements."))]
    pub distinctive_features: Option<Vec<String>>,

    #[validate(length(max = 10, message = "Ensure this field has no more than 10 elements."))]
    pub medical_conditions: Option<Vec<String>>,

    pub owner_id: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PetSend {
    pub id: Option<String>,
    pub name: String,
    pub specie: String,
    pub breed: String,
    pub birth_date: Option<NaiveDate>,
    pub color: Option<Vec<String>>,
    pub distinctive_features: Option<Vec<String>>,
    pub medical_conditions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Pet {
    pub fn to_send(&self) -> PetSend {
        PetSend {
            id: self.id.map(|id| id.to_hex()),
            name: self.name.clone(),
            specie: self.specie.clone(),
            breed: self.breed.clone(),
            birth_date: self.birth_date,
            color: self.color.clone(),
            distinctive_features: self.distinctive_features.clone(),
            medical_conditions: self.medical_conditions.clone(),
            owner_id: self.owner_id.map(|id| id.to_hex()),
            created_at: self.created_at,
        }
    }
}

/// A payload that passed validation, with its typed fields already parsed.
#[derive(Clone, Debug)]
pub struct ValidPet {
    name: String,
    specie: String,
    breed: String,
    birth_date: Option<NaiveDate>,
    color: Option<Vec<String>>,
    distinctive_features: Option<Vec<String>>,
    medical_conditions: Option<Vec<String>>,
    owner_id: Option<ObjectId>,
}

impl ValidPet {
    pub fn into_pet(self, created_at: DateTime<Utc>) -> Pet {
        Pet {
            id: None,
            name: self.name,
            specie: self.specie,
            breed: self.breed,
            birth_date: self.birth_date,
            color: self.color,
            distinctive_features: self.distinctive_features,
            medical_conditions: self.medical_conditions,
            owner_id: self.owner_id,
            created_at,
        }
    }
}

/// Binds a registration payload, normalises it and decides whether it may
/// be stored.
pub struct PetSerializer {
    payload: PetRegisterReceive,
    /// Fields whose JSON type was wrong; their values are dropped from `payload`.
    type_errors: Vec<(&'static str, ValidationError)>,
    today: NaiveDate,
}

impl PetSerializer {
    pub fn new(payload: PetRegisterReceive) -> Self {
        Self::with_today(payload, Utc::now().date_naive())
    }

    /// `today` bounds `birth_date`; taken as a parameter so tests can pin it.
    pub fn with_today(payload: PetRegisterReceive, today: NaiveDate) -> Self {
        PetSerializer {
            payload: normalize(payload),
            type_errors: Vec::new(),
            today,
        }
    }

    /// Binds a raw JSON object. A field of the wrong type becomes an error on
    /// that field instead of failing the whole body.
    pub fn from_json(body: Map<String, Value>) -> Self {
        Self::from_json_with_today(body, Utc::now().date_naive())
    }

    pub fn from_json_with_today(mut body: Map<String, Value>, today: NaiveDate) -> Self {
        let mut type_errors = Vec::new();

        let payload = PetRegisterReceive {
            name: take_string(&mut body, &mut type_errors, "name"),
            specie: take_string(&mut body, &mut type_errors, "specie"),
            breed: take_string(&mut body, &mut type_errors, "breed"),
            birth_date: take_string(&mut body, &mut type_errors, "birth_date"),
            color: take_list(&mut body, &mut type_errors, "color"),
            distinctive_features: take_list(&mut body, &mut type_errors, "distinctive_features"),
            medical_conditions: take_list(&mut body, &mut type_errors, "medical_conditions"),
            owner_id: take_string(&mut body, &mut type_errors, "owner_id"),
        };

        PetSerializer {
            payload: normalize(payload),
            type_errors,
            today,
        }
    }

    #[cfg(test)]
    pub(crate) fn payload(&self) -> &PetRegisterReceive {
        &self.payload
    }

    pub fn is_valid(self) -> Result<ValidPet, ValidationErrors> {
        let mut errors = match self.payload.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        let mistyped: Vec<&'static str> = self.type_errors.iter().map(|(field, _)| *field).collect();
        for (field, error) in self.type_errors {
            errors.add(field, error);
        }

        let p = self.payload;

        let name = check_required(&mut errors, &mistyped, "name", p.name);
        let specie = check_required(&mut errors, &mistyped, "specie", p.specie);
        let breed = check_required(&mut errors, &mistyped, "breed", p.breed);

        let birth_date = p
            .birth_date
            .as_deref()
            .and_then(|raw| parse_birth_date(&mut errors, raw, self.today));

        check_entries(&mut errors, "color", p.color.as_deref(), COLOR_MAX);
        check_entries(&mut errors, "distinctive_features", p.distinctive_features.as_deref(), NOTE_MAX);
        check_entries(&mut errors, "medical_conditions", p.medical_conditions.as_deref(), NOTE_MAX);

        let owner_id = p
            .owner_id
            .as_deref()
            .and_then(|raw| parse_object_id(&mut errors, "owner_id", raw));

        // A missing required value always leaves an error behind.
        match (name, specie, breed) {
            (Some(name), Some(specie), Some(breed)) if errors.is_empty() => Ok(ValidPet {
                name,
                specie,
                breed,
                birth_date,
                color: p.color,
                distinctive_features: p.distinctive_features,
                medical_conditions: p.medical_conditions,
                owner_id,
            }),
            _ => Err(errors),
        }
    }
}

fn take_string(
    body: &mut Map<String, Value>,
    type_errors: &mut Vec<(&'static str, ValidationError)>,
    field: &'static str,
) -> Option<String> {
    match body.remove(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(value)) => Some(value),
        Some(_) => {
            type_errors.push((field, error_with("invalid", "Not a valid string.".to_string())));
            None
        }
    }
}

fn take_list(
    body: &mut Map<String, Value>,
    type_errors: &mut Vec<(&'static str, ValidationError)>,
    field: &'static str,
) -> Option<Vec<String>> {
    let items = match body.remove(field) {
        None | Some(Value::Null) => return None,
        Some(Value::Array(items)) => items,
        Some(_) => {
            type_errors.push((field, error_with("not_a_list", "Expected a list of items.".to_string())));
            return None;
        }
    };

    let mut values = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match item {
            Value::String(value) => values.push(value),
            _ => type_errors.push((field, error_with("invalid", format!("Item {} is not a valid string.", index)))),
        }
    }

    if type_errors.iter().any(|(name, _)| *name == field) {
        None
    } else {
        Some(values)
    }
}

fn normalize(payload: PetRegisterReceive) -> PetRegisterReceive {
    let trim = |value: Option<String>| value.map(|v| v.trim().to_string());
    let trim_all = |values: Option<Vec<String>>| {
        values.map(|vs| vs.into_iter().map(|v| v.trim().to_string()).collect())
    };

    PetRegisterReceive {
        name: trim(payload.name),
        specie: trim(payload.specie),
        breed: trim(payload.breed),
        birth_date: trim(payload.birth_date),
        color: trim_all(payload.color),
        distinctive_features: trim_all(payload.distinctive_features),
        medical_conditions: trim_all(payload.medical_conditions),
        owner_id: trim(payload.owner_id),
    }
}

fn error_with(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn check_required(
    errors: &mut ValidationErrors,
    mistyped: &[&'static str],
    field: &'static str,
    value: Option<String>,
) -> Option<String> {
    match value {
        Some(value) if value.is_empty() => {
            errors.add(field, error_with("blank", "This field may not be blank.".to_string()));
            None
        }
        Some(value) => Some(value),
        None => {
            if !mistyped.contains(&field) {
                errors.add(field, error_with("required", "This field is required.".to_string()));
            }
            None
        }
    }
}

fn check_entries(
    errors: &mut ValidationErrors,
    field: &'static str,
    values: Option<&[String]>,
    max_chars: usize,
) {
    let Some(values) = values else { return };

    for (index, value) in values.iter().enumerate() {
        if value.is_empty() {
            errors.add(field, error_with("blank", format!("Item {} may not be blank.", index)));
        } else if value.chars().count() > max_chars {
            errors.add(
                field,
                error_with("length", format!("Item {} has more than {} characters.", index, max_chars)),
            );
        }
    }
}

fn parse_birth_date(errors: &mut ValidationErrors, raw: &str, today: NaiveDate) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) if date > today => {
            errors.add("birth_date", error_with("future", "Birth date cannot be in the future.".to_string()));
            None
        }
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(
                "birth_date",
                error_with("format", "Date has wrong format. Use YYYY-MM-DD.".to_string()),
            );
            None
        }
    }
}

fn parse_object_id(errors: &mut ValidationErrors, field: &'static str, raw: &str) -> Option<ObjectId> {
    match ObjectId::parse_str(raw) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.add(field, error_with("object_id", format!("\"{}\" is not a valid id.", raw)));
            None
        }
    }
}
