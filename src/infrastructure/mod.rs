pub mod database;
pub mod memory;
pub mod mongodb;

pub use database::mongo_context;
pub use memory::pet_repository::InMemoryPetRepository;
pub use self::mongodb::pet_repository::MongoPetRepository;
