pub mod model;
pub mod repository;

pub use model::{Pet, PetRegisterReceive, PetSend, PetSerializer};
pub use repository::PetRepository;
