//! Tour generation API.
//!
//! Requests are validated locally before anything touches the network; a
//! non-empty error list is a hard stop. Generation runs under its own
//! timeout class because the backend synthesizes the itinerary with an AI
//! model.

use chrono::DateTime;

use crate::{
    client::{CallOptions, Client},
    config::TimeoutClass,
    error::{Error, Result},
    types::{GeneratedTour, PricingTier, TourRequest},
};

/// Tour duration bounds, in hours.
pub const DURATION_RANGE: std::ops::RangeInclusive<u32> = 1..=24;
/// Group size bounds.
pub const GROUP_SIZE_RANGE: std::ops::RangeInclusive<u32> = 1..=50;

/// Tour Generation API client.
#[derive(Debug)]
pub struct ToursApi<'a> {
    pub(crate) client: &'a Client,
}

impl ToursApi<'_> {
    /// Generate a sample tour (unauthenticated; not saved to any account).
    pub async fn generate_sample(&self, request: &TourRequest) -> Result<GeneratedTour> {
        let errors = validate_request(request);
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        tracing::info!(
            destination = %request.destination,
            duration = request.duration,
            group_size = request.group_size,
            "Generating sample tour"
        );
        self.client
            .post(
                "tour-generation/generate-sample",
                request,
                CallOptions::default().with_timeout(TimeoutClass::Generation),
            )
            .await
    }

    /// Generate a tour and save it to the current account.
    ///
    /// Fails fast with [`Error::AuthRequired`] when no token is stored; a
    /// request that is guaranteed to be rejected is never sent.
    pub async fn generate(&self, request: &TourRequest) -> Result<GeneratedTour> {
        let errors = validate_request(request);
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }
        if self.client.token_store().get().is_none() {
            return Err(Error::AuthRequired);
        }

        tracing::info!(
            destination = %request.destination,
            duration = request.duration,
            group_size = request.group_size,
            "Generating tour for account"
        );
        self.client
            .post(
                "tour-generation/generate",
                request,
                CallOptions::authed().with_timeout(TimeoutClass::Generation),
            )
            .await
    }

    /// List tours saved to the current account.
    pub async fn my_tours(&self) -> Result<Vec<GeneratedTour>> {
        self.client
            .get("tour-generation/my-tours", CallOptions::authed())
            .await
    }

    /// Fetch a tour by id.
    pub async fn get(&self, id: &str) -> Result<GeneratedTour> {
        self.client
            .get(&format!("tour-generation/{id}"), CallOptions::default())
            .await
    }

    /// Duplicate a saved tour into the current account.
    pub async fn duplicate(&self, id: &str) -> Result<GeneratedTour> {
        self.client
            .post_empty(
                &format!("tour-generation/{id}/duplicate"),
                CallOptions::authed(),
            )
            .await
    }
}

/// Validate a generation request. Returns human-readable messages; a
/// non-empty result means the request must not be sent.
#[must_use]
pub fn validate_request(request: &TourRequest) -> Vec<String> {
    let mut errors = Vec::new();

    if request.destination.trim().is_empty() {
        errors.push("Destination is required".to_string());
    }
    if !DURATION_RANGE.contains(&request.duration) {
        errors.push("Duration must be between 1 and 24 hours".to_string());
    }
    if request.interests.iter().all(|i| i.trim().is_empty()) {
        errors.push("Select at least one interest".to_string());
    }
    if request.travel_style.trim().is_empty() {
        errors.push("Travel style is required".to_string());
    }
    if request.budget < 0.0 {
        errors.push("Budget cannot be negative".to_string());
    }
    if !GROUP_SIZE_RANGE.contains(&request.group_size) {
        errors.push("Group size must be between 1 and 50".to_string());
    }

    errors
}

// =============================================================================
// Display helpers (pure; never used for decision-making)
// =============================================================================

/// Human-readable price for a pricing tier, e.g. `"$145"`.
#[must_use]
pub fn tier_price_label(tour: &GeneratedTour, tier: PricingTier) -> String {
    let price = match tier {
        PricingTier::Solo => tour.pricing.solo,
        PricingTier::Couple => tour.pricing.couple,
        PricingTier::Group => tour.pricing.group,
        PricingTier::Family => tour.pricing.family,
    };
    format!("${:.0}", price.round())
}

/// Formatted creation date, e.g. `"March 14, 2026"`. Falls back to the raw
/// value when the timestamp doesn't parse.
#[must_use]
pub fn created_at_label(tour: &GeneratedTour) -> String {
    DateTime::parse_from_rfc3339(&tour.created_at)
        .map(|dt| dt.format("%B %d, %Y").to_string())
        .unwrap_or_else(|_| tour.created_at.clone())
}

/// Number of stops in the itinerary.
#[must_use]
pub fn stop_count(tour: &GeneratedTour) -> usize {
    tour.itinerary.len()
}
