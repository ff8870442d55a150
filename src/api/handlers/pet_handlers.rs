use actix_web::{web, HttpResponse, Responder, ResponseError};
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use serde_json::{Map, Value};

use crate::{
    api::state::AppState,
    domain::pet::model::{PetSend, PetSerializer},
    utils::errors::{non_field_error, ApiError},
};

pub async fn entry_point() -> impl Responder {
    "This is the Pets API. Use the /pets endpoint to register a pet."
}

/// Rejects bodies that are not a JSON object with the same
/// `{ field: [messages] }` shape used for validation failures.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| non_field_error(err.to_string()).into())
}

pub async fn register_pet(
    state: web::Data<AppState>,
    payload: web::Json<Map<String, Value>>
) -> impl Responder {

    let serializer = PetSerializer::from_json(payload.into_inner());

    let valid = match serializer.is_valid() {
        Ok(valid) => valid,
        Err(errors) => {
            log::debug!("Rejected pet registration: {}", errors);
            return ApiError::Validation(errors).error_response();
        }
    };

    match state.pets.create_pet(valid.into_pet(Utc::now())).await {
        Ok(pet) => {
            log::info!("Registered pet {:?}", pet.id.map(|id| id.to_hex()));
            HttpResponse::Created().json(pet.to_send())
        },
        Err(e) => {
            log::error!("Failed to store pet: {}", e);
            e.error_response()
        }
    }
}

pub async fn get_pet(
    state: web::Data<AppState>,
    id: web::Path<String>
) -> impl Responder {

    let id = match ObjectId::parse_str(id.as_str()) {
        Ok(id) => id,
        Err(_) => return ApiError::BadRequest(format!("Invalid pet id: {}", id)).error_response()
    };

    match state.pets.get_pet_by_id(id).await {
        Ok(Some(pet)) => HttpResponse::Ok().json(pet.to_send()),
        Ok(None) => ApiError::NotFound(format!("Pet {} not found", id.to_hex())).error_response(),
        Err(e) => e.error_response()
    }
}

pub async fn get_all_pets(
    state: web::Data<AppState>
) -> impl Responder {

    match state.pets.get_all_pets().await {
        Ok(pets) => {
            let pets: Vec<PetSend> = pets.iter().map(|pet| pet.to_send()).collect();
            HttpResponse::Ok().json(pets)
        },
        Err(e) => e.error_response()
    }
}

// ----------------------------- TESTS --------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{http::StatusCode, test, web, App};
    use async_trait::async_trait;
    use mongodb::bson::oid::ObjectId;
    use serde_json::{json, Value};

    use crate::{
        api::state::AppState,
        domain::pet::{model::Pet, repository::PetRepository},
        infrastructure::InMemoryPetRepository,
        routes::public_routes,
        utils::errors::ApiError,
    };

    struct FailingPetRepository;

    #[async_trait]
    impl PetRepository for FailingPetRepository {
        async fn create_pet(&self, _pet: Pet) -> Result<Pet, ApiError> {
            Err(ApiError::InternalServerError("store unavailable".to_string()))
        }

        async fn get_pet_by_id(&self, _id: ObjectId) -> Result<Option<Pet>, ApiError> {
            Err(ApiError::InternalServerError("store unavailable".to_string()))
        }

        async fn get_all_pets(&self) -> Result<Vec<Pet>, ApiError> {
            Err(ApiError::InternalServerError("store unavailable".to_string()))
        }
    }

    fn luna() -> Value {
        json!({
            "name": "Luna",
            "specie": "dog",
            "breed": "Border Collie",
            "birth_date": "2021-03-14",
            "color": ["black", "white"],
            "medical_conditions": ["hip dysplasia"],
            "owner_id": "65f1c2a9e4b0a1b2c3d4e5f6"
        })
    }

    macro_rules! pets_app {
        ($repo:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(AppState::new($repo)))
                    .configure(public_routes)
            ).await
        };
    }

    #[actix_web::test]
    async fn test_register_pet_returns_created_record() {
        let repo = Arc::new(InMemoryPetRepository::new());
        let app = pets_app!(repo.clone());

        let req = test::TestRequest::post()
            .uri("/pets")
            .set_json(luna())
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["name"], "Luna");
        assert_eq!(body["specie"], "dog");
        assert_eq!(body["breed"], "Border Collie");
        assert_eq!(body["birth_date"], "2021-03-14");
        assert_eq!(body["color"], json!(["black", "white"]));
        assert_eq!(body["distinctive_features"], Value::Null);
        assert_eq!(body["owner_id"], "65f1c2a9e4b0a1b2c3d4e5f6");
        assert_eq!(body["id"].as_str().unwrap().len(), 24);
        assert!(body["created_at"].is_string());

        assert_eq!(repo.len().await, 1);
    }

    #[actix_web::test]
    async fn test_register_pet_normalizes_input() {
        let repo = Arc::new(InMemoryPetRepository::new());
        let app = pets_app!(repo.clone());

        let req = test::TestRequest::post()
            .uri("/pets")
            .set_json(json!({
                "name": "  Milo ",
                "specie": "cat\n",
                "breed": " Siamese",
                "color": [" cream "]
            }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["name"], "Milo");
        assert_eq!(body["specie"], "cat");
        assert_eq!(body["breed"], "Siamese");
        assert_eq!(body["color"], json!(["cream"]));
        assert!(body.get("owner_id").is_none());
    }

    #[actix_web::test]
    async fn test_register_pet_missing_fields_returns_field_errors() {
        let repo = Arc::new(InMemoryPetRepository::new());
        let app = pets_app!(repo.clone());

        let req = test::TestRequest::post()
            .uri("/pets")
            .set_json(json!({ "color": ["brown"] }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        let fields = body.as_object().unwrap();
        assert_eq!(fields.len(), 3);
        for field in ["name", "specie", "breed"] {
            assert_eq!(body[field], json!(["This field is required."]), "field {}", field);
        }

        assert!(repo.is_empty().await);
    }

    #[actix_web::test]
    async fn test_register_pet_invalid_values_are_not_persisted() {
        let repo = Arc::new(InMemoryPetRepository::new());
        let app = pets_app!(repo.clone());

        let mut payload = luna();
        payload["birth_date"] = json!("2999-01-01");
        payload["owner_id"] = json!("owner-42");
        payload["name"] = json!("   ");

        let req = test::TestRequest::post()
            .uri("/pets")
            .set_json(payload)
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["birth_date"], json!(["Birth date cannot be in the future."]));
        assert_eq!(body["name"], json!(["This field may not be blank."]));
        assert!(body["owner_id"][0].as_str().unwrap().contains("owner-42"));
        assert!(body.get("breed").is_none());

        assert!(repo.is_empty().await);
    }

    #[actix_web::test]
    async fn test_register_pet_malformed_json() {
        let repo = Arc::new(InMemoryPetRepository::new());
        let app = pets_app!(repo.clone());

        let req = test::TestRequest::post()
            .uri("/pets")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"name\": \"Luna\",")
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert!(body["non_field_errors"][0].is_string());
        assert!(repo.is_empty().await);
    }

    #[actix_web::test]
    async fn test_register_pet_wrong_field_type() {
        let repo = Arc::new(InMemoryPetRepository::new());
        let app = pets_app!(repo.clone());

        let req = test::TestRequest::post()
            .uri("/pets")
            .set_json(json!({ "name": 123, "specie": "dog" }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({
            "name": ["Not a valid string."],
            "breed": ["This field is required."]
        }));
        assert!(repo.is_empty().await);
    }

    #[actix_web::test]
    async fn test_register_pet_wrong_types_reported_with_other_errors() {
        let repo = Arc::new(InMemoryPetRepository::new());
        let app = pets_app!(repo.clone());

        let mut payload = luna();
        payload["name"] = json!(["Rex"]);
        payload["birth_date"] = json!("bad");
        payload["color"] = json!("black");

        let req = test::TestRequest::post()
            .uri("/pets")
            .set_json(payload)
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["name"], json!(["Not a valid string."]));
        assert_eq!(body["color"], json!(["Expected a list of items."]));
        assert_eq!(body["birth_date"], json!(["Date has wrong format. Use YYYY-MM-DD."]));
        assert!(body.get("non_field_errors").is_none());
        assert!(repo.is_empty().await);
    }

    #[actix_web::test]
    async fn test_register_pet_body_not_an_object() {
        let repo = Arc::new(InMemoryPetRepository::new());
        let app = pets_app!(repo.clone());

        let req = test::TestRequest::post()
            .uri("/pets")
            .set_json(json!(["Luna", "dog"]))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert!(body["non_field_errors"][0].is_string());
        assert!(repo.is_empty().await);
    }

    #[actix_web::test]
    async fn test_register_pet_store_failure() {
        let app = pets_app!(Arc::new(FailingPetRepository));

        let req = test::TestRequest::post()
            .uri("/pets")
            .set_json(luna())
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "store unavailable");
        assert_eq!(body["code"], 500);
    }

    #[actix_web::test]
    async fn test_registered_pet_can_be_fetched() {
        let repo = Arc::new(InMemoryPetRepository::new());
        let app = pets_app!(repo.clone());

        let req = test::TestRequest::post()
            .uri("/pets")
            .set_json(luna())
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let id = created["id"].as_str().unwrap();

        let req = test::TestRequest::get()
            .uri(&format!("/pets/{}", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let fetched: Value = test::read_body_json(resp).await;
        assert_eq!(fetched, created);
    }

    #[actix_web::test]
    async fn test_get_pet_unknown_and_malformed_ids() {
        let app = pets_app!(Arc::new(InMemoryPetRepository::new()));

        let req = test::TestRequest::get()
            .uri(&format!("/pets/{}", ObjectId::new().to_hex()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get()
            .uri("/pets/not-an-id")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_get_all_pets() {
        let app = pets_app!(Arc::new(InMemoryPetRepository::new()));

        let req = test::TestRequest::get().uri("/pets").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!([]));

        for name in ["Rex", "Bella"] {
            let mut payload = luna();
            payload["name"] = json!(name);
            let req = test::TestRequest::post().uri("/pets").set_json(payload).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::CREATED);
        }

        let req = test::TestRequest::get().uri("/pets").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|pet| pet["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Rex", "Bella"]);
    }

    #[actix_web::test]
    async fn test_entry_point() {
        let app = pets_app!(Arc::new(InMemoryPetRepository::new()));

        let req = test::TestRequest::get().uri("/").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert!(String::from_utf8_lossy(&body).contains("/pets"));
    }
}
