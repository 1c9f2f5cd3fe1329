//! Shared test backend: an axum app bound to an ephemeral port.

use std::sync::Once;

use axum::Router;

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: Router) -> String {
    init_tracing();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    format!("http://{addr}")
}

/// A complete generated-tour payload as the backend would emit it.
pub fn sample_tour_json(id: &str, destination: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": format!("Hidden {destination}"),
        "subtitle": "Off the beaten path",
        "description": "A half-day wander through the quarters locals keep to themselves.",
        "destination": destination,
        "duration": "4 hours",
        "difficulty": "Easy",
        "groupSize": "up to 8 people",
        "rating": 4.8,
        "reviews": 12,
        "pricing": { "solo": 89.0, "couple": 145.0, "group": 260.0, "family": 310.0 },
        "languages": ["English"],
        "highlights": ["Street food crawl", "Artisan quarter", "Rooftop views"],
        "itinerary": [
            {
                "time": "09:30",
                "location": "Market hall",
                "duration": "45 min",
                "description": "Breakfast the local way.",
                "activity": "food",
                "tips": ["Bring cash"],
                "photoSpot": "East entrance archway",
                "localInsight": "The third stall from the door has the shortest queue."
            },
            {
                "time": "10:30",
                "location": "Artisan quarter",
                "duration": "90 min",
                "description": "Workshops and galleries.",
                "activity": "culture",
                "tips": [],
                "photoSpot": null,
                "localInsight": null
            }
        ],
        "status": "generated",
        "createdAt": "2026-03-14T09:30:00Z",
        "updatedAt": "2026-03-14T09:30:00Z"
    })
}

/// A guide record payload.
pub fn guide_json(id: &str, name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "email": null,
        "phone": null,
        "bio": "Knows every alley.",
        "location": "Old town",
        "languages": ["English"],
        "specialties": ["food", "history"],
        "experience_years": 7,
        "rating": 4.8,
        "review_count": 120,
        "price_range": { "half_day": 100.0, "full_day": 180.0, "currency": "USD" },
        "verified": true,
        "max_group_size": 8,
        "provides_transportation": false,
        "available": true,
        "experience_level": "Advanced"
    })
}

/// A scored recommendation wrapping [`guide_json`].
pub fn recommendation_json(id: &str, name: &str, score: f64) -> serde_json::Value {
    serde_json::json!({
        "guide": guide_json(id, name),
        "match_score": score,
        "reasons": ["Speaks your language", "Specializes in food"],
        "availability": true,
        "estimated_cost": 100.0
    })
}
