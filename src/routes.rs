use actix_web::web;

use crate::api::handlers::pet_handlers::{entry_point, get_all_pets, get_pet, json_config, register_pet};

pub fn public_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config());

    cfg.service(
        web::resource("/")
            .route(web::get().to(entry_point))
    );

    cfg.service(
        web::resource("/pets")
            .route(web::post().to(register_pet))
            .route(web::get().to(get_all_pets))
    );

    cfg.service(
        web::resource("/pets/{id}")
            .route(web::get().to(get_pet))
    );
}
