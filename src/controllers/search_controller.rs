use chrono::{Local, NaiveDate};
use std::sync::Arc;

use crate::dto::ride_dto::SearchQuery;
use crate::dto::view_dto::{QueryState, RideCardView, SearchView};
use crate::models::{Identity, Ride};
use crate::services::{RequestsApi, RideSearch, RidesApi};
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub struct SearchController {
    rides: Arc<RidesApi>,
    requests: Arc<RequestsApi>,
}

impl SearchController {
    pub fn new(state: &AppState) -> Self {
        Self {
            rides: state.rides.clone(),
            requests: state.requests.clone(),
        }
    }

    /// Ride list, filtered when criteria are given. A failed read renders
    /// as an error state inside the view.
    pub async fn list(&self, user: &Identity, query: &SearchQuery) -> SearchView {
        let search = RideSearch::from(query);
        let today = Local::now().date_naive();

        let result = match self.rides.fetch_all_rides().await {
            Ok(rides) => {
                let total = rides.len();
                let mut cards = Vec::new();
                for ride in search.filter(rides) {
                    cards.push(self.card(ride, user, today).await);
                }
                Ok((total, cards))
            }
            Err(e) => Err(e),
        };

        let (total_rides, found) = match &result {
            Ok((total, cards)) => (*total, cards.len()),
            Err(_) => (0, 0),
        };
        let empty_message = match &result {
            Ok(_) if found == 0 => Some(search.no_results_message()),
            _ => None,
        };

        SearchView {
            heading: search.heading(found),
            total_rides,
            search_active: search.is_active(),
            rides: QueryState::from_result(result.map(|(_, cards)| cards)),
            empty_message,
        }
    }

    pub async fn detail(&self, user: &Identity, id: &str) -> AppResult<RideCardView> {
        let ride = self.rides.fetch_ride_by_id(id).await?;
        Ok(self.card(ride, user, Local::now().date_naive()).await)
    }

    async fn card(&self, ride: Ride, user: &Identity, today: NaiveDate) -> RideCardView {
        RideCardView {
            expired: ride.is_expired_on(today),
            contact_link: ride.contact_link(),
            already_requested: self.requests.has_requested(&user.uid, &ride.id).await,
            ride,
        }
    }
}
