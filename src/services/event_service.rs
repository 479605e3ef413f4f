use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, QuerySelect,
    Set,
};

use crate::{
    dto::events::EventInput,
    entity::{
        Events,
        events::{ActiveModel, Column, Model as EventModel},
    },
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    models::{Event, duration_minutes, prefixed_id},
    state::AppState,
};

/// How many events the dog detail page shows.
pub const RECENT_EVENTS_LIMIT: u64 = 50;

pub async fn list_events_for_dog(
    state: &AppState,
    dog_id: &str,
    limit: Option<u64>,
) -> AppResult<Vec<Event>> {
    let mut finder = Events::find()
        .filter(Column::DogId.eq(dog_id))
        .order_by_desc(Column::Timestamp);
    if let Some(limit) = limit {
        finder = finder.limit(limit);
    }
    let events = finder
        .all(&state.orm)
        .await?
        .into_iter()
        .map(event_from_entity)
        .collect();
    Ok(events)
}

pub async fn get_event(state: &AppState, id: &str) -> AppResult<Option<Event>> {
    let event = Events::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(event_from_entity);
    Ok(event)
}

pub async fn create_event(state: &AppState, input: EventInput) -> AppResult<Event> {
    let active = ActiveModel {
        id: Set(prefixed_id("evt")),
        dog_id: Set(input.dog_id),
        event_type: Set(input.event_type),
        timestamp: Set(input.timestamp),
        end_timestamp: Set(input.end_timestamp),
        location: Set(input.location),
        notes: Set(input.notes),
        bristol_stool_scale: Set(input.bristol_stool_scale),
    };
    let event = active.insert(&state.orm).await?;
    Ok(event_from_entity(event))
}

pub async fn update_event(
    state: &AppState,
    id: &str,
    input: EventInput,
) -> AppResult<Option<Event>> {
    let existing = match Events::find_by_id(id).one(&state.orm).await? {
        Some(e) => e,
        None => return Ok(None),
    };

    let mut active: ActiveModel = existing.into();
    active.dog_id = Set(input.dog_id);
    active.event_type = Set(input.event_type);
    active.timestamp = Set(input.timestamp);
    active.end_timestamp = Set(input.end_timestamp);
    active.location = Set(input.location);
    active.notes = Set(input.notes);
    active.bristol_stool_scale = Set(input.bristol_stool_scale);

    let event = active.update(&state.orm).await?;
    Ok(Some(event_from_entity(event)))
}

/// Returns the dog id of the removed event so the caller can redirect back
/// to its page, or None when the event does not exist.
pub async fn delete_event(
    state: &AppState,
    user: &AuthUser,
    id: &str,
) -> AppResult<Option<String>> {
    ensure_admin(user)?;
    let event = match Events::find_by_id(id).one(&state.orm).await? {
        Some(e) => e,
        None => return Ok(None),
    };
    let dog_id = event.dog_id.clone();
    event.delete(&state.orm).await?;
    Ok(Some(dog_id))
}

fn event_from_entity(model: EventModel) -> Event {
    let duration = duration_minutes(model.timestamp, model.end_timestamp);
    Event {
        id: model.id,
        dog_id: model.dog_id,
        event_type: model.event_type,
        timestamp: model.timestamp,
        end_timestamp: model.end_timestamp,
        location: model.location,
        notes: model.notes,
        bristol_stool_scale: model.bristol_stool_scale,
        duration,
    }
}
