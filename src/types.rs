//! Shared types for the SDK.
//!
//! These types mirror the backend's API DTOs. Response types lean on
//! `#[serde(default)]` for fields the backend has historically omitted,
//! so a sparse payload degrades to empty collections rather than a
//! deserialization error.

use serde::{Deserialize, Serialize};

// =============================================================================
// Auth API Types
// =============================================================================

/// Request body for a login call.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// Username or email address.
    pub username: String,
    /// Plain-text password (sent over HTTPS only).
    pub password: String,
}

/// Request body for account registration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Desired username (letters, digits, underscore; at least 3 chars).
    pub username: String,
    /// Display name.
    pub full_name: String,
    /// Email address.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

/// Response from login/register.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    /// Bearer token for subsequent authenticated calls.
    #[serde(default)]
    pub token: Option<String>,
    /// Profile of the authenticated user.
    #[serde(default)]
    pub user: Option<UserProfile>,
    /// Optional server message.
    #[serde(default)]
    pub message: Option<String>,
}

/// An authenticated user's profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Unique identifier.
    pub id: String,
    /// Username.
    pub username: String,
    /// Display name.
    #[serde(default)]
    pub full_name: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
}

/// Result of checking the stored session at startup.
#[derive(Debug, Clone)]
pub enum AuthStatus {
    /// A stored token was verified against the backend.
    Authenticated(UserProfile),
    /// No token stored, or verification failed (token has been cleared).
    Anonymous,
}

impl AuthStatus {
    /// Whether this status represents an established session.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

// =============================================================================
// Tour Generation API Types
// =============================================================================

/// Request to generate a tour.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TourRequest {
    /// Destination city or region.
    pub destination: String,
    /// Tour length in hours (1–24).
    pub duration: u32,
    /// Interest tags, at least one.
    pub interests: Vec<String>,
    /// Travel style, e.g. "Cultural".
    pub travel_style: String,
    /// Budget in the backend's currency, non-negative.
    pub budget: f64,
    /// Number of travelers (1–50).
    pub group_size: u32,
}

/// Per-tier pricing of a generated tour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TourPricing {
    /// Price for a single traveler.
    #[serde(default)]
    pub solo: f64,
    /// Price for two travelers.
    #[serde(default)]
    pub couple: f64,
    /// Price for a small group.
    #[serde(default)]
    pub group: f64,
    /// Price for a family.
    #[serde(default)]
    pub family: f64,
}

/// One stop in a generated itinerary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryStop {
    /// Scheduled time, e.g. "09:30".
    #[serde(default)]
    pub time: String,
    /// Stop location.
    #[serde(default)]
    pub location: String,
    /// How long to spend here, e.g. "45 min".
    #[serde(default)]
    pub duration: String,
    /// What happens at this stop.
    #[serde(default)]
    pub description: String,
    /// Activity tag, e.g. "food", "museum".
    #[serde(default)]
    pub activity: String,
    /// Practical tips for the stop.
    #[serde(default)]
    pub tips: Vec<String>,
    /// Suggested photo spot, if any.
    #[serde(default)]
    pub photo_spot: Option<String>,
    /// Insider note from a local.
    #[serde(default)]
    pub local_insight: Option<String>,
}

/// A tour synthesized by the backend.
///
/// Immutable on the client; each generation call produces a fresh instance
/// that supersedes the previous one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedTour {
    /// Server-assigned identifier.
    pub id: String,
    /// Headline.
    #[serde(default)]
    pub title: String,
    /// Secondary headline.
    #[serde(default)]
    pub subtitle: String,
    /// Long-form description.
    #[serde(default)]
    pub description: String,
    /// Destination the tour was generated for.
    #[serde(default)]
    pub destination: String,
    /// Display duration, e.g. "4 hours".
    #[serde(default)]
    pub duration: String,
    /// Difficulty label.
    #[serde(default)]
    pub difficulty: String,
    /// Display group size, e.g. "up to 8 people".
    #[serde(default)]
    pub group_size: String,
    /// Aggregate rating.
    #[serde(default)]
    pub rating: f64,
    /// Number of reviews behind the rating.
    #[serde(default)]
    pub reviews: u32,
    /// Price per traveler-count tier.
    #[serde(default)]
    pub pricing: TourPricing,
    /// Languages the tour is offered in.
    #[serde(default)]
    pub languages: Vec<String>,
    /// Highlight phrases; also the source for guide-search specialties.
    #[serde(default)]
    pub highlights: Vec<String>,
    /// Ordered stops.
    #[serde(default)]
    pub itinerary: Vec<ItineraryStop>,
    /// Lifecycle status, e.g. "generated".
    #[serde(default)]
    pub status: String,
    /// Creation timestamp (RFC 3339).
    #[serde(default)]
    pub created_at: String,
    /// Last-update timestamp (RFC 3339).
    #[serde(default)]
    pub updated_at: String,
}

/// Traveler-count pricing tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingTier {
    /// One traveler.
    Solo,
    /// Two travelers.
    Couple,
    /// Small group.
    Group,
    /// Family.
    Family,
}

// =============================================================================
// Guide API Types
// =============================================================================

/// Criteria for searching guides, derived from a generated tour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuideSearchCriteria {
    /// Destination to match guides against.
    pub destination: String,
    /// Tour duration in hours.
    pub duration: u32,
    /// Number of travelers.
    pub group_size: u32,
    /// Up to three specialty tags.
    pub specialties: Vec<String>,
}

/// A guide's pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRange {
    /// Rate for a half-day engagement.
    pub half_day: f64,
    /// Rate for a full-day engagement.
    pub full_day: f64,
    /// ISO currency code.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Self-reported experience tier of a guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExperienceLevel {
    /// A few seasons of guiding.
    #[default]
    Intermediate,
    /// Established guide.
    Advanced,
    /// Veteran guide.
    Expert,
}

/// A local guide known to the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuideRecord {
    /// Unique identifier.
    pub id: String,
    /// Full name.
    pub name: String,
    /// Contact email, if shared.
    #[serde(default)]
    pub email: Option<String>,
    /// Contact phone, if shared.
    #[serde(default)]
    pub phone: Option<String>,
    /// Short biography.
    #[serde(default)]
    pub bio: String,
    /// Home base.
    #[serde(default)]
    pub location: String,
    /// Spoken languages.
    #[serde(default)]
    pub languages: Vec<String>,
    /// Specialty tags.
    #[serde(default)]
    pub specialties: Vec<String>,
    /// Years of guiding experience.
    #[serde(default)]
    pub experience_years: u32,
    /// Aggregate rating.
    #[serde(default)]
    pub rating: f64,
    /// Number of reviews behind the rating.
    #[serde(default)]
    pub review_count: u32,
    /// Half-day/full-day rates.
    pub price_range: PriceRange,
    /// Whether identity has been verified.
    #[serde(default)]
    pub verified: bool,
    /// Largest group the guide takes.
    #[serde(default)]
    pub max_group_size: u32,
    /// Whether the guide provides transportation.
    #[serde(default)]
    pub provides_transportation: bool,
    /// Whether the guide is currently taking bookings.
    #[serde(default = "default_true")]
    pub available: bool,
    /// Experience tier.
    #[serde(default)]
    pub experience_level: ExperienceLevel,
}

fn default_true() -> bool {
    true
}

/// A guide matched against a specific tour. Ephemeral; recomputed per
/// search and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuideRecommendation {
    /// The matched guide.
    pub guide: GuideRecord,
    /// Suitability in [0, 1].
    pub match_score: f64,
    /// Why the guide matched.
    #[serde(default)]
    pub reasons: Vec<String>,
    /// Whether the guide is available for the tour.
    #[serde(default = "default_true")]
    pub availability: bool,
    /// Estimated cost for the tour's duration and group size.
    #[serde(default)]
    pub estimated_cost: f64,
}

/// Response from the on-demand guide research endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GuideResearchResponse {
    /// Destination that was researched.
    #[serde(default)]
    pub destination: String,
    /// Newly discovered (and persisted) guides. May be empty.
    #[serde(default)]
    pub guides: Vec<GuideRecord>,
    /// Optional server message.
    #[serde(default)]
    pub message: Option<String>,
}

/// Where a resolved guide set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideSource {
    /// Existing guides matched the search criteria.
    Search,
    /// On-demand research discovered new guides.
    Research,
    /// Both network paths failed; the built-in demonstration set was used.
    Fallback,
}

/// A guide prepared for display against a specific tour.
#[derive(Debug, Clone)]
pub struct GuideView {
    /// The guide.
    pub guide: GuideRecord,
    /// Suitability in [0, 1]; backend-scored for search matches, locally
    /// scored for research and fallback guides.
    pub match_score: f64,
    /// Match reasons, when available.
    pub reasons: Vec<String>,
    /// Estimated cost for the tour's duration and group size.
    pub estimated_cost: f64,
}

/// The outcome of resolving guides for a tour.
#[derive(Debug, Clone)]
pub struct ResolvedGuides {
    /// Guides to display.
    pub guides: Vec<GuideView>,
    /// Which strategy produced the set.
    pub source: GuideSource,
    /// Soft warning to surface when the set is degraded fallback data.
    pub warning: Option<String>,
}
