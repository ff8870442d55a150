use async_trait::async_trait;
use futures::StreamExt;
use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;

use crate::infrastructure::database::mongo_context::MongoContext;
use crate::domain::pet::model::Pet;
use crate::domain::pet::repository::PetRepository;
use crate::utils::errors::ApiError;

pub struct MongoPetRepository {
    pets: mongodb::Collection<Pet>
}

impl MongoPetRepository {
    pub fn new(context: &MongoContext) -> Self {
        Self {
            pets: context.collection("pets")
        }
    }
}

#[async_trait]
impl PetRepository for MongoPetRepository {

    async fn create_pet(&self, mut pet: Pet) -> Result<Pet, ApiError> {
        let result = self.pets.insert_one(&pet).await?;

        let id = result.inserted_id.as_object_id().ok_or_else(|| {
            ApiError::InternalServerError("Inserted pet did not receive an ObjectId".to_string())
        })?;

        pet.id = Some(id);
        Ok(pet)
    }

    async fn get_pet_by_id(&self, id: ObjectId) -> Result<Option<Pet>, ApiError> {
        match self.pets.find_one(doc! { "_id": id }).await {
            Ok(pet) => Ok(pet),
            Err(e) => Err(ApiError::MongoError(e))
        }
    }

    async fn get_all_pets(&self) -> Result<Vec<Pet>, ApiError> {
        let mut cursor = self.pets.find(doc! {}).await?;
        let mut pets = Vec::new();

        while let Some(doc) = cursor.next().await {
            match doc {
                Ok(pet) => pets.push(pet),
                Err(e) => return Err(ApiError::MongoError(e)),
            }
        }
        Ok(pets)
    }
}
