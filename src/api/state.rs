use std::sync::Arc;

use crate::domain::pet::repository::PetRepository;

#[derive(Clone)]
pub struct AppState {
    pub pets: Arc<dyn PetRepository>
}

impl AppState {
    pub fn new(pets: Arc<dyn PetRepository>) -> Self {
        AppState { pets }
    }
}
