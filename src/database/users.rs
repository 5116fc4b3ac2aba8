use super::StoreError;
use crate::error::{DomainError, Failure};
use crate::models::{UserRecord, UserView};
use mongodb::bson::{Bson, Document, doc};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel};

pub const COLLECTION: &str = "users";

const DUPLICATE_KEY: i32 = 11000;

/// Access to the `users` collection
#[derive(Debug, Clone)]
pub struct UserRepository {
    collection: Collection<UserRecord>,
}

impl UserRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(COLLECTION),
        }
    }

    /// Unique ascending index on `email`
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("email_1".to_owned())
                    .build(),
            )
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }

    /// Store a validated user, answering 409 when the email is taken
    pub async fn insert(&self, record: &UserRecord) -> Result<Bson, Failure> {
        match self.collection.insert_one(record).await {
            Ok(result) => Ok(result.inserted_id),
            Err(err) if is_duplicate_key(&err) => {
                Err(DomainError::conflict("Email is already registered").into())
            }
            Err(err) => Err(StoreError::from(err).into()),
        }
    }

    /// Look a user up by email; the password never leaves the store
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserView>, Failure> {
        let user = self
            .collection
            .clone_with_type::<UserView>()
            .find_one(email_filter(email))
            .projection(doc! { "password": 0 })
            .await
            .map_err(StoreError::from)?;
        Ok(user)
    }
}

/// Emails are stored normalized, so lookups normalize too
fn email_filter(email: &str) -> Document {
    doc! { "email": email.trim().to_lowercase() }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewUser, ValidateUserPipe};
    use crate::pipe::Pipe;
    use mongodb::bson::{self, DateTime, oid::ObjectId};

    #[test]
    fn test_email_filter_normalizes() {
        assert_eq!(
            email_filter("  Ada@Example.COM "),
            doc! { "email": "ada@example.com" }
        );
    }

    #[test]
    fn test_view_never_carries_password() {
        let now = DateTime::now();
        let stored = doc! {
            "_id": ObjectId::new(),
            "name": "Ada",
            "email": "ada@example.com",
            "password": "hunter22",
            "createdAt": now,
            "updatedAt": now,
        };

        let view: UserView = bson::from_document(stored).unwrap();
        assert_eq!(view.email, "ada@example.com");

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["name"], "Ada");
        assert!(!bson::to_document(&view).unwrap().contains_key("password"));
    }

    #[tokio::test]
    async fn test_record_document_shape() {
        let record = ValidateUserPipe
            .transform(NewUser {
                name: Some("Ada".to_owned()),
                email: Some("ADA@example.com".to_owned()),
                password: Some("secret1".to_owned()),
            })
            .await
            .unwrap();

        let stored = bson::to_document(&record).unwrap();
        assert!(!stored.contains_key("_id"));
        assert_eq!(stored.get_str("email").unwrap(), "ada@example.com");
        assert_eq!(stored.get_str("password").unwrap(), "secret1");
        assert!(stored.contains_key("createdAt"));
        assert!(stored.contains_key("updatedAt"));
    }
}
