use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::{
    dto::dogs::DogInput,
    entity::{
        Dogs, Events,
        dogs::{ActiveModel, Column, Model as DogModel},
        events::Column as EventColumn,
    },
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    models::{Dog, prefixed_id},
    state::AppState,
};

pub async fn list_dogs(state: &AppState) -> AppResult<Vec<Dog>> {
    let dogs = Dogs::find()
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(dog_from_entity)
        .collect();
    Ok(dogs)
}

pub async fn get_dog(state: &AppState, id: &str) -> AppResult<Option<Dog>> {
    let dog = Dogs::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(dog_from_entity);
    Ok(dog)
}

pub async fn dog_exists(state: &AppState, id: &str) -> AppResult<bool> {
    let dog = Dogs::find_by_id(id).one(&state.orm).await?;
    Ok(dog.is_some())
}

pub async fn create_dog(state: &AppState, input: DogInput) -> AppResult<Dog> {
    let active = ActiveModel {
        id: Set(prefixed_id("dog")),
        name: Set(input.name),
        approx_age: Set(input.approx_age),
        size: Set(input.size),
        breed_type: Set(input.breed_type),
    };
    let dog = active.insert(&state.orm).await?;
    Ok(dog_from_entity(dog))
}

pub async fn update_dog(state: &AppState, id: &str, input: DogInput) -> AppResult<Option<Dog>> {
    let existing = match Dogs::find_by_id(id).one(&state.orm).await? {
        Some(d) => d,
        None => return Ok(None),
    };

    let mut active: ActiveModel = existing.into();
    active.name = Set(input.name);
    active.approx_age = Set(input.approx_age);
    active.size = Set(input.size);
    active.breed_type = Set(input.breed_type);

    let dog = active.update(&state.orm).await?;
    Ok(Some(dog_from_entity(dog)))
}

/// Returns false when the dog does not exist. An event never outlives its
/// dog, so both deletes run in one transaction.
pub async fn delete_dog(state: &AppState, user: &AuthUser, id: &str) -> AppResult<bool> {
    ensure_admin(user)?;
    let txn = state.orm.begin().await?;

    let dog = match Dogs::find_by_id(id).one(&txn).await? {
        Some(d) => d,
        None => return Ok(false),
    };

    Events::delete_many()
        .filter(EventColumn::DogId.eq(id))
        .exec(&txn)
        .await?;
    dog.delete(&txn).await?;

    txn.commit().await?;
    Ok(true)
}

fn dog_from_entity(model: DogModel) -> Dog {
    Dog {
        id: model.id,
        name: model.name,
        approx_age: model.approx_age,
        size: model.size,
        breed_type: model.breed_type,
    }
}
