//! Route and fare values
//!
//! `RouteInfo` is derived from the mapping service for one (start, end)
//! pair and only survives as the description string attached to a ride.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Driving route between two points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteInfo {
    pub coordinates: Vec<Coordinates>,
    /// Total distance in meters
    pub distance_m: f64,
    /// Total duration in seconds
    pub duration_s: f64,
    pub name: Option<String>,
}

impl RouteInfo {
    pub fn distance_km(&self) -> f64 {
        self.distance_m / 1000.0
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.duration_s / 60.0).round() as i64
    }

    pub fn describe(&self, start: &str, end: &str) -> String {
        format!(
            "Route: {} to {}. via {}. Total distance: {:.1} km. Estimated travel time: {} minutes.",
            start,
            end,
            self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or("custom route"),
            self.distance_km(),
            self.duration_minutes()
        )
    }
}

/// Fuel-cost fare model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FareCalculator {
    pub fuel_efficiency_km_per_liter: f64,
    pub price_per_liter: f64,
}

impl Default for FareCalculator {
    fn default() -> Self {
        Self {
            fuel_efficiency_km_per_liter: 15.0,
            price_per_liter: 96.62,
        }
    }
}

impl FareCalculator {
    pub fn new(fuel_efficiency_km_per_liter: f64, price_per_liter: f64) -> Self {
        Self {
            fuel_efficiency_km_per_liter,
            price_per_liter,
        }
    }

    /// `total = km / efficiency * price`; split across seats when there are any
    pub fn estimate(&self, distance_km: f64, seats: Option<u32>) -> FareEstimate {
        let total_fare = distance_km / self.fuel_efficiency_km_per_liter * self.price_per_liter;
        let per_seat_fare = match seats {
            Some(n) if n > 0 => total_fare / n as f64,
            _ => total_fare,
        };

        FareEstimate {
            distance_km,
            total_fare,
            per_seat_fare,
            seats,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FareEstimate {
    pub distance_km: f64,
    pub total_fare: f64,
    pub per_seat_fare: f64,
    pub seats: Option<u32>,
}

impl FareEstimate {
    /// Per-seat price as published, rounded to cents
    pub fn published_price(&self) -> f64 {
        round_currency(self.per_seat_fare)
    }
}

pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
