use std::sync::Arc;
use validator::Validate;

use crate::dto::ride_dto::{PublishRideForm, RoutePreviewForm};
use crate::dto::view_dto::{PublishView, RoutePreview};
use crate::models::{Identity, NewRide, Ride, RideUpdate};
use crate::services::{RidesApi, RouteComposer};
use crate::state::AppState;
use crate::utils::errors::{bad_request_error, forbidden_error, AppResult};
use crate::utils::validation::{validate_date, validate_time, PHONE_RE};

pub struct PublishController {
    rides: Arc<RidesApi>,
    composer: Arc<RouteComposer>,
}

impl PublishController {
    pub fn new(state: &AppState) -> Self {
        Self {
            rides: state.rides.clone(),
            composer: state.composer.clone(),
        }
    }

    pub async fn view(&self) -> PublishView {
        let draft = self.composer.draft().await;
        PublishView {
            can_publish: draft.is_some(),
            hint: draft
                .is_none()
                .then_some("Enter start and end locations to compute the route and fare"),
            draft,
        }
    }

    pub async fn preview(&self, form: RoutePreviewForm) -> AppResult<RoutePreview> {
        form.validate()?;
        self.composer
            .preview(&form.start_location, &form.end_location, form.seats_available)
            .await
    }

    /// Publish a ride. Nothing is sent unless a route between the two
    /// locations could be composed.
    pub async fn publish(&self, driver: &Identity, form: PublishRideForm) -> AppResult<Ride> {
        form.validate()?;

        let route = self
            .composer
            .route_for_publish(&form.start_location, &form.end_location, form.seats_available)
            .await?;

        let ride = NewRide {
            driver_id: driver.uid.clone(),
            driver_name: form.driver_name.trim().to_string(),
            department: form.department.trim().to_string(),
            year: form.year,
            age: form.age,
            driving_experience: form.experience,
            vehicle: form.car_model.trim().to_string(),
            start_location: route.start_location.clone(),
            end_location: route.end_location.clone(),
            route_description: route.description.clone(),
            date: form.date,
            time: form.time,
            seats_available: form.seats_available,
            price: route.price,
            phone_number: form.phone,
        };

        let published = self.rides.add_ride(&ride).await?;
        self.composer.clear_draft().await;
        Ok(published)
    }

    /// Change one of the driver's own rides
    pub async fn update(&self, driver: &Identity, id: &str, patch: RideUpdate) -> AppResult<Ride> {
        check_update(&patch)?;
        self.owned_ride(driver, id, "update this ride").await?;
        self.rides.update_ride(id, &patch).await?;
        self.rides.fetch_ride_by_id(id).await
    }

    pub async fn delete(&self, driver: &Identity, id: &str) -> AppResult<()> {
        self.owned_ride(driver, id, "delete this ride").await?;
        self.rides.delete_ride(id).await
    }

    async fn owned_ride(&self, driver: &Identity, id: &str, operation: &str) -> AppResult<Ride> {
        let ride = self.rides.fetch_ride_by_id(id).await?;
        if ride.driver_id != driver.uid {
            return Err(forbidden_error(operation, "only its driver can"));
        }
        Ok(ride)
    }
}

fn check_update(patch: &RideUpdate) -> AppResult<()> {
    if patch == &RideUpdate::default() {
        return Err(bad_request_error("Nothing to update"));
    }
    if patch.seats_available == Some(0) {
        return Err(bad_request_error("seatsAvailable must be at least 1"));
    }
    if patch.price.map_or(false, |p| !(p >= 0.0)) {
        return Err(bad_request_error("price must not be negative"));
    }
    if let Some(date) = &patch.date {
        validate_date(date).map_err(|_| bad_request_error("date must be YYYY-MM-DD"))?;
    }
    if let Some(time) = &patch.time {
        validate_time(time).map_err(|_| bad_request_error("time must be HH:MM"))?;
    }
    if let Some(phone) = &patch.phone_number {
        if !PHONE_RE.is_match(phone) {
            return Err(bad_request_error("phoneNumber must have 10 digits"));
        }
    }
    if patch.vehicle.as_deref().map_or(false, |v| v.trim().is_empty()) {
        return Err(bad_request_error("vehicle must not be blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ride_update_checks() {
        assert!(check_update(&RideUpdate::default()).is_err());
        assert!(check_update(&RideUpdate {
            seats_available: Some(0),
            ..Default::default()
        })
        .is_err());
        assert!(check_update(&RideUpdate {
            phone_number: Some("123".to_string()),
            ..Default::default()
        })
        .is_err());
        assert!(check_update(&RideUpdate {
            seats_available: Some(2),
            time: Some("18:45".to_string()),
            ..Default::default()
        })
        .is_ok());
    }
}
