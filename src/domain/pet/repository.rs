use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use crate::{domain::pet::model::Pet, utils::errors::ApiError};

#[async_trait]
pub trait PetRepository: Send + Sync {
    /// Stores a new pet and returns it with its assigned id.
    async fn create_pet(&self, pet: Pet) -> Result<Pet, ApiError>;
    async fn get_pet_by_id(&self, id: ObjectId) -> Result<Option<Pet>, ApiError>;
    async fn get_all_pets(&self) -> Result<Vec<Pet>, ApiError>;
}
