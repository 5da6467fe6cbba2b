// src/species.rs

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;
use warp::{
    http::StatusCode,
    reject::Rejection,
    reply::{self, Reply},
    Filter,
};

/// Common name and poaching pressure of one species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpeciesFacts {
    pub common_name: &'static str,
    pub poaching_reason: &'static str,
}

/// Keyed by lower-case scientific name.
static SPECIES_FACTS: &[(&str, SpeciesFacts)] = &[
    (
        "alligator mississippiensis",
        SpeciesFacts {
            common_name: "American Alligator",
            poaching_reason: "is targeted for its high-grade hide, prized in luxury leather goods.",
        },
    ),
    (
        "crocodylus niloticus",
        SpeciesFacts {
            common_name: "Nile Crocodile",
            poaching_reason: "is hunted for both skin and meat in local and international markets.",
        },
    ),
    (
        "crocodylus porosus",
        SpeciesFacts {
            common_name: "Saltwater Crocodile",
            poaching_reason: "possesses the most valuable crocodilian skin due to its small, uniform scale pattern.",
        },
    ),
    (
        "python bivittatus",
        SpeciesFacts {
            common_name: "Burmese Python",
            poaching_reason: "is exploited for the luxury leather market and exotic pet trade.",
        },
    ),
    (
        "python reticulatus",
        SpeciesFacts {
            common_name: "Reticulated Python",
            poaching_reason: "is the world's longest snake, making its skin highly profitable for large leather items.",
        },
    ),
    (
        "varanus salvator",
        SpeciesFacts {
            common_name: "Asian Water Monitor",
            poaching_reason: "is targeted for its exceptionally durable and flexible skin, used in watchbands.",
        },
    ),
];

/// Look up a taxon, ignoring case and surrounding whitespace.
pub fn lookup(taxon: &str) -> Option<SpeciesFacts> {
    let key = taxon.trim().to_lowercase();
    SPECIES_FACTS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, facts)| *facts)
}

#[derive(Debug, Deserialize)]
struct FactsQuery {
    taxon: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
}

async fn get_species_facts(query: FactsQuery) -> Result<impl Reply, Rejection> {
    let taxon = query.taxon.unwrap_or_default();
    if taxon.is_empty() {
        return Ok(reply::with_status(
            reply::json(&ErrorResponse {
                error: "No taxon provided",
            }),
            StatusCode::BAD_REQUEST,
        ));
    }

    let reply = match lookup(&taxon) {
        Some(facts) => reply::with_status(reply::json(&facts), StatusCode::OK),
        None => {
            debug!(%taxon, "no species facts");
            reply::with_status(
                reply::json(&ErrorResponse {
                    error: "Species facts not found",
                }),
                StatusCode::NOT_FOUND,
            )
        }
    };
    Ok(reply)
}

/// `GET /get_species_facts?taxon=<scientific name>`.
pub fn route() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("get_species_facts")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<FactsQuery>())
        .and_then(get_species_facts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_lookup_normalises_taxon() {
        let facts = lookup("  Crocodylus Porosus ").unwrap();
        assert_eq!(facts.common_name, "Saltwater Crocodile");
        assert!(lookup("Crocodylus").is_none());
    }

    #[tokio::test]
    async fn test_route_statuses() {
        let api = route();

        let ok = warp::test::request()
            .path("/get_species_facts?taxon=Varanus%20salvator")
            .reply(&api)
            .await;
        assert_eq!(ok.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(ok.body()).unwrap();
        assert_eq!(body["common_name"], json!("Asian Water Monitor"));

        let missing = warp::test::request()
            .path("/get_species_facts")
            .reply(&api)
            .await;
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(missing.body()).unwrap();
        assert_eq!(body, json!({"error": "No taxon provided"}));

        let unknown = warp::test::request()
            .path("/get_species_facts?taxon=Homo%20sapiens")
            .reply(&api)
            .await;
        assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
        let body: Value = serde_json::from_slice(unknown.body()).unwrap();
        assert_eq!(body, json!({"error": "Species facts not found"}));
    }
}
