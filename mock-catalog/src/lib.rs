use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

/// Path prefix of the public catalog API.
pub const API_PREFIX: &str = "/api/json/v1/1";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Drink {
    #[serde(rename = "idDrink")]
    pub id: String,
    #[serde(rename = "strDrink")]
    pub name: String,
    #[serde(rename = "strCategory")]
    pub category: String,
    #[serde(rename = "strAlcoholic")]
    pub alcoholic: Option<String>,
    #[serde(rename = "strGlass")]
    pub glass: Option<String>,
    #[serde(rename = "strDrinkThumb")]
    pub thumbnail: String,
}

/// The reduced shape `filter.php` returns for each match.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DrinkSummary {
    #[serde(rename = "strDrink")]
    pub name: String,
    #[serde(rename = "strDrinkThumb")]
    pub thumbnail: String,
    #[serde(rename = "idDrink")]
    pub id: String,
}

impl From<&Drink> for DrinkSummary {
    fn from(drink: &Drink) -> Self {
        Self {
            name: drink.name.clone(),
            thumbnail: drink.thumbnail.clone(),
            id: drink.id.clone(),
        }
    }
}

/// Response envelope. No matches serialize as `{"drinks": null}`, like the
/// real service.
#[derive(Debug, Serialize, Deserialize)]
pub struct Drinks<T> {
    pub drinks: Option<Vec<T>>,
}

impl<T> Drinks<T> {
    fn from_vec(drinks: Vec<T>) -> Self {
        Self {
            drinks: if drinks.is_empty() { None } else { Some(drinks) },
        }
    }
}

#[derive(Debug, Default)]
pub struct Catalog {
    pub drinks: Vec<Drink>,
    /// While set, every endpoint answers 500.
    pub outage: bool,
}

pub type Db = Arc<RwLock<Catalog>>;

#[derive(Deserialize)]
pub struct SearchParams {
    pub s: Option<String>,
    pub f: Option<String>,
}

#[derive(Deserialize)]
pub struct FilterParams {
    pub c: String,
}

/// Router over the seeded catalog.
pub fn app() -> Router {
    router(Arc::new(RwLock::new(Catalog {
        drinks: seed(),
        outage: false,
    })))
}

/// Router over a caller-owned catalog, so tests can mutate it while serving.
pub fn router(db: Db) -> Router {
    let api = Router::new()
        .route("/search.php", get(search))
        .route("/filter.php", get(filter));
    Router::new().nest(API_PREFIX, api).with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, router(db)).await
}

async fn search(
    State(db): State<Db>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Drinks<Drink>>, StatusCode> {
    let catalog = db.read().await;
    if catalog.outage {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let mut found: Vec<Drink> = match (params.s, params.f) {
        (Some(term), _) => {
            let term = term.to_lowercase();
            catalog
                .drinks
                .iter()
                .filter(|d| d.name.to_lowercase().contains(&term))
                .cloned()
                .collect()
        }
        (None, Some(letter)) => {
            let letter = letter.to_lowercase();
            if letter.chars().count() != 1 {
                return Err(StatusCode::BAD_REQUEST);
            }
            catalog
                .drinks
                .iter()
                .filter(|d| d.name.to_lowercase().starts_with(&letter))
                .cloned()
                .collect()
        }
        (None, None) => return Err(StatusCode::BAD_REQUEST),
    };
    found.sort_by_key(|d| d.name.to_lowercase());
    tracing::debug!(matches = found.len(), "search");
    Ok(Json(Drinks::from_vec(found)))
}

async fn filter(
    State(db): State<Db>,
    Query(params): Query<FilterParams>,
) -> Result<Json<Drinks<DrinkSummary>>, StatusCode> {
    let catalog = db.read().await;
    if catalog.outage {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let found: Vec<DrinkSummary> = catalog
        .drinks
        .iter()
        .filter(|d| d.category.eq_ignore_ascii_case(&params.c))
        .map(DrinkSummary::from)
        .collect();
    tracing::debug!(category = %params.c, matches = found.len(), "filter");
    Ok(Json(Drinks::from_vec(found)))
}

fn drink(id: &str, name: &str, category: &str, glass: Option<&str>, thumb: &str) -> Drink {
    Drink {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        alcoholic: Some("Alcoholic".to_string()),
        glass: glass.map(str::to_string),
        thumbnail: format!("https://www.thecocktaildb.com/images/media/drink/{thumb}.jpg"),
    }
}

/// A small slice of the real catalog. Five names start with "a".
pub fn seed() -> Vec<Drink> {
    vec![
        drink("17222", "A1", "Cocktail", Some("Cocktail glass"), "2x8thr1504816928"),
        drink("13501", "ABC", "Shot", Some("Shot glass"), "tqpvqp1472668328"),
        drink("17225", "Ace", "Cocktail", Some("Martini Glass"), "l3cd7f1504818306"),
        drink("17837", "Adam", "Ordinary Drink", None, "zhmdtq1504818526"),
        drink("13938", "AT&T", "Ordinary Drink", Some("Highball Glass"), "rhhwmp1493067619"),
        drink("11000", "Mojito", "Cocktail", Some("Highball glass"), "metwgh1606770327"),
        drink("11007", "Margarita", "Ordinary Drink", Some("Cocktail glass"), "5noda61589575158"),
        drink("17204", "Long Island Iced Tea", "Ordinary Drink", Some("Highball glass"), "wx7hsg1504370510"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drink_serializes_with_catalog_field_names() {
        let json = serde_json::to_value(&seed()[0]).unwrap();
        assert_eq!(json["idDrink"], "17222");
        assert_eq!(json["strDrink"], "A1");
        assert_eq!(json["strCategory"], "Cocktail");
        assert!(json["strDrinkThumb"].as_str().unwrap().ends_with(".jpg"));
    }

    #[test]
    fn missing_optional_fields_serialize_as_null() {
        let adam = seed().into_iter().find(|d| d.name == "Adam").unwrap();
        let json = serde_json::to_value(&adam).unwrap();
        assert!(json["strGlass"].is_null());
    }

    #[test]
    fn empty_envelope_serializes_drinks_as_null() {
        let json = serde_json::to_string(&Drinks::<Drink>::from_vec(Vec::new())).unwrap();
        assert_eq!(json, r#"{"drinks":null}"#);
    }

    #[test]
    fn summary_keeps_only_name_thumb_and_id() {
        let summary = DrinkSummary::from(&seed()[5]);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 3);
        assert_eq!(json["strDrink"], "Mojito");
        assert!(json.get("strCategory").is_none());
    }

    #[test]
    fn seed_has_five_drinks_starting_with_a() {
        let count = seed()
            .iter()
            .filter(|d| d.name.to_lowercase().starts_with('a'))
            .count();
        assert_eq!(count, 5);
    }
}
