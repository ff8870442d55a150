pub mod pet_handlers;
