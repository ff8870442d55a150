use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use crate::domain::pet::model::Pet;
use crate::domain::pet::repository::PetRepository;
use crate::utils::errors::ApiError;

/// Process-local store used when no database is configured, and by tests.
#[derive(Default)]
pub struct InMemoryPetRepository {
    pets: RwLock<Vec<Pet>>
}

impl InMemoryPetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.pets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pets.read().await.is_empty()
    }
}

#[async_trait]
impl PetRepository for InMemoryPetRepository {

    async fn create_pet(&self, mut pet: Pet) -> Result<Pet, ApiError> {
        pet.id = Some(ObjectId::new());
        self.pets.write().await.push(pet.clone());
        Ok(pet)
    }

    async fn get_pet_by_id(&self, id: ObjectId) -> Result<Option<Pet>, ApiError> {
        let pets = self.pets.read().await;
        Ok(pets.iter().find(|pet| pet.id == Some(id)).cloned())
    }

    async fn get_all_pets(&self) -> Result<Vec<Pet>, ApiError> {
        Ok(self.pets.read().await.clone())
    }
}
