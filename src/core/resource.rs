//! Resource lookups and creation.

use crate::{
    entities::{Resource, resource},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};

/// Creates a resource pool of `quantity` units.
///
/// # Errors
/// Returns an error if the name is blank, the quantity is negative, or the
/// insert fails.
pub async fn create_resource(
    db: &DatabaseConnection,
    name: String,
    quantity: i32,
) -> Result<resource::Model> {
    if name.trim().is_empty() {
        return Err(Error::InvalidName { entity: "resource" });
    }
    if quantity < 0 {
        return Err(Error::InvalidQuantity { quantity });
    }

    let resource = resource::ActiveModel {
        name: Set(name.trim().to_string()),
        quantity: Set(quantity),
        ..Default::default()
    };
    resource.insert(db).await.map_err(Into::into)
}

/// Lists all resources ordered by name.
pub async fn get_all_resources(db: &DatabaseConnection) -> Result<Vec<resource::Model>> {
    Resource::find()
        .order_by_asc(resource::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a resource, failing with `EntityNotFound` when the id doesn't resolve.
pub async fn get_resource<C>(db: &C, resource_id: i64) -> Result<resource::Model>
where
    C: ConnectionTrait,
{
    Resource::find_by_id(resource_id)
        .one(db)
        .await?
        .ok_or(Error::EntityNotFound {
            entity: "resource",
            id: resource_id,
        })
}

/// Retrieves a resource and takes a row lock on it for the rest of the
/// enclosing transaction (`SELECT ... FOR UPDATE`).
///
/// `SQLite` has no row locks; there the query runs without the clause and the
/// database-wide write lock serialises writers instead.
pub async fn lock_resource<C>(db: &C, resource_id: i64) -> Result<resource::Model>
where
    C: ConnectionTrait,
{
    Resource::find_by_id(resource_id)
        .lock_exclusive()
        .one(db)
        .await?
        .ok_or(Error::EntityNotFound {
            entity: "resource",
            id: resource_id,
        })
}
