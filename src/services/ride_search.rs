//! Client-side ride search
//!
//! Filters the full ride list by case-insensitive substring match on the
//! start and end location. Empty criteria leave the list unfiltered.

use crate::dto::ride_dto::SearchQuery;
use crate::models::Ride;
use crate::utils::validation::place_key;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RideSearch {
    start: Option<String>,
    end: Option<String>,
}

impl RideSearch {
    pub fn new(start: Option<&str>, end: Option<&str>) -> Self {
        let clean = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Self {
            start: clean(start),
            end: clean(end),
        }
    }

    pub fn is_active(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    pub fn matches(&self, ride: &Ride) -> bool {
        let hit = |criterion: &Option<String>, location: &str| match criterion {
            Some(wanted) => place_key(location).contains(&place_key(wanted)),
            None => true,
        };
        hit(&self.start, &ride.start_location) && hit(&self.end, &ride.end_location)
    }

    pub fn filter(&self, rides: Vec<Ride>) -> Vec<Ride> {
        if !self.is_active() {
            return rides;
        }
        rides.into_iter().filter(|ride| self.matches(ride)).collect()
    }

    pub fn heading(&self, found: usize) -> String {
        if !self.is_active() {
            return "Available Rides".to_string();
        }

        let mut parts = Vec::new();
        if let Some(start) = &self.start {
            parts.push(format!("from \"{}\"", start));
        }
        if let Some(end) = &self.end {
            parts.push(format!("to \"{}\"", end));
        }
        format!("Rides {} ({} found)", parts.join(" "), found)
    }

    pub fn no_results_message(&self) -> String {
        if !self.is_active() {
            return "No rides available at the moment. Check back later!".to_string();
        }

        let mut criteria = Vec::new();
        if let Some(start) = &self.start {
            criteria.push(format!("start location \"{}\"", start));
        }
        if let Some(end) = &self.end {
            criteria.push(format!("destination \"{}\"", end));
        }
        format!(
            "No rides found matching {}. Try adjusting your search.",
            criteria.join(" and ")
        )
    }
}

impl From<&SearchQuery> for RideSearch {
    fn from(query: &SearchQuery) -> Self {
        RideSearch::new(query.start.as_deref(), query.end.as_deref())
    }
}
