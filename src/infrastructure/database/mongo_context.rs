use serde::{Deserialize, Serialize};
use mongodb::{options::ClientOptions, Client, Collection, Database};
use regex::Regex;

use crate::utils::errors::ApiError;

#[derive(Clone, Debug)]
pub struct MongoContext {
    db: Database
}

impl MongoContext {

    pub async fn init(uri: &str, db_name: &str) -> Result<MongoContext, ApiError> {
        Self::validate_mongo_uri(uri)?;
        log::info!("Connecting to MongoDB database {}", db_name);

        let mut client_options = ClientOptions::parse(uri).await?;
        client_options.app_name = Some("PetsApp".to_string());

        let client = Client::with_options(client_options)?;

        client.list_database_names()
            .await
            .map_err(|e| {
                log::error!("Failed to connect to MongoDB: {}", e);
                e
            })?;

        log::info!("Connected to MongoDB database {}", db_name);
        Ok(MongoContext { db: client.database(db_name) })
    }

    pub fn collection<T>(&self, name: &str) -> Collection<T>
    where
        T: Send + Sync,
        T: for<'de> Deserialize<'de> + Serialize,
    {
        self.db.collection::<T>(name)
    }

    pub fn validate_mongo_uri(uri: &str) -> Result<(), ApiError> {
        let trimmed_uri = uri.trim();
        if trimmed_uri.is_empty() {
            return Err(ApiError::InvalidData("Invalid MongoDB URI: cannot be empty or whitespace".to_string()));
        }

        let host_part = match trimmed_uri
            .strip_prefix("mongodb://")
            .or_else(|| trimmed_uri.strip_prefix("mongodb+srv://"))
        {
            Some(rest) => rest,
            None => {
                return Err(ApiError::InvalidData(format!(
                    "Invalid MongoDB URI: must start with 'mongodb://' or 'mongodb+srv://'. Got: {}",
                    uri
                )))
            }
        };

        if host_part.trim().is_empty() {
            return Err(ApiError::InvalidData("Invalid MongoDB URI: missing host after protocol".to_string()));
        }

        if uri.contains(char::is_whitespace) {
            return Err(ApiError::InvalidData("Invalid MongoDB URI: cannot contain whitespace".to_string()));
        }

        let re = Regex::new(r"^mongodb(\+srv)?://([^/\s]+)(/.*)?$")
            .map_err(|e| ApiError::InternalServerError(e.to_string()))?;
        if !re.is_match(trimmed_uri) {
            return Err(ApiError::InvalidData(format!(
                "Invalid MongoDB URI format. Expected format: mongodb://host[:port][/database] or mongodb+srv://host[/database]. Got: {}",
                uri
            )));
        }

        Ok(())
    }

}
