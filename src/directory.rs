//! Business directory lookup (Yelp Fusion search API).
//!
//! A search by name returns several businesses; the one whose street address
//! matches the address printed in the post is used. Nothing matching means
//! nothing is known about the restaurant.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::DirectoryConfig;
use crate::error::Result;
use crate::http::check_response;
use crate::model::{Enrichment, PriceTier};

const CARDINALS: [(&str, &str); 4] = [("East", "E"), ("North", "N"), ("South", "S"), ("West", "W")];

#[async_trait]
pub trait DirectoryLookup: Send + Sync {
    /// Price, rating, category and coordinates for a named business at
    /// `address`. An unmatched search yields an empty [`Enrichment`].
    async fn lookup(&self, name: &str, address: &str) -> Result<Enrichment>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    businesses: Vec<Business>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Business {
    pub price: Option<String>,
    pub rating: Option<f64>,
    #[serde(default)]
    pub categories: Vec<Category>,
    pub coordinates: Option<Coordinates>,
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Category {
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Coordinates {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Location {
    pub address1: Option<String>,
}

impl Business {
    fn address1(&self) -> Option<&str> {
        self.location.as_ref()?.address1.as_deref()
    }
}

impl From<&Business> for Enrichment {
    fn from(business: &Business) -> Self {
        let coordinates = business.coordinates.clone().unwrap_or_default();
        Self {
            price: business
                .price
                .as_deref()
                .map(PriceTier::from_symbol)
                .unwrap_or_default(),
            rating: business.rating,
            cuisine: business
                .categories
                .first()
                .and_then(|c| c.title.clone())
                .filter(|t| !t.is_empty()),
            latitude: coordinates.latitude,
            longitude: coordinates.longitude,
        }
    }
}

/// Replaces whole words `East`, `North`, `South`, `West` by their initials.
pub fn abbreviate_cardinals(address: &str) -> String {
    address
        .split(' ')
        .map(|word| {
            CARDINALS
                .iter()
                .find(|(long, _)| *long == word)
                .map_or(word, |(_, short)| *short)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// First business whose `address1` equals `address`, either verbatim or
/// once cardinal directions are abbreviated on both sides.
pub fn select_business<'a>(businesses: &'a [Business], address: &str) -> Option<&'a Business> {
    let abbreviated = abbreviate_cardinals(address);
    businesses.iter().find(|b| {
        b.address1()
            .is_some_and(|a1| a1 == address || abbreviate_cardinals(a1) == abbreviated)
    })
}

/// Search term: each word of the name reduced to its letters.
pub fn search_term(name: &str) -> String {
    name.split(' ')
        .map(|word| word.chars().filter(|c| c.is_alphabetic()).collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct YelpClient {
    http: Client,
    base_url: String,
    api_key: String,
    location: String,
}

impl YelpClient {
    pub fn new(http: Client, config: &DirectoryConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
            location: config.location.clone(),
        }
    }

    async fn search(&self, name: &str) -> Result<Vec<Business>> {
        let url = format!("{}/businesses/search", self.base_url);
        let term = search_term(name);
        let resp = self
            .http
            .get(&url)
            .query(&[("term", term.as_str()), ("location", self.location.as_str())])
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .send()
            .await?;
        let data: SearchResponse = check_response(resp).await?.json().await?;
        Ok(data.businesses)
    }
}

#[async_trait]
impl DirectoryLookup for YelpClient {
    async fn lookup(&self, name: &str, address: &str) -> Result<Enrichment> {
        debug!(name, address, "directory lookup");
        let businesses = self.search(name).await?;
        let enrichment = select_business(&businesses, address)
            .map(Enrichment::from)
            .unwrap_or_default();
        debug!(name, candidates = businesses.len(), matched = !enrichment.is_empty(), "directory result");
        Ok(enrichment)
    }
}
