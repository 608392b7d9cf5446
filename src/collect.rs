use reqwest::Client;
use tracing::{info, warn};

use crate::directory::DirectoryLookup;
use crate::error::Result;
use crate::extract::{extract_candidates, listing_post_links, post_date_from_url};
use crate::geocode::NeighborhoodLookup;
use crate::http::fetch_text;
use crate::model::{Candidate, Enrichment, Recommendation};
use crate::normalize::normalize_recommenders;

/// Builds a row from a block and its directory data. Blocks the directory
/// knows nothing about are dropped.
pub fn assemble(candidate: Candidate, enrichment: Enrichment) -> Option<Recommendation> {
    if enrichment.is_empty() {
        return None;
    }
    Some(Recommendation {
        name: candidate.name.unwrap_or_default(),
        location_str: candidate.address.unwrap_or_default(),
        latitude: enrichment.latitude,
        longitude: enrichment.longitude,
        price: enrichment.price,
        rating: enrichment.rating,
        cuisine: enrichment.cuisine,
        recommender: candidate.recommender.unwrap_or_default(),
        date: candidate.date,
        neighborhood: None,
    })
}

pub struct Collector<D, G> {
    http: Client,
    listing_url: String,
    anchor_class: String,
    directory: D,
    geocoder: G,
}

impl<D: DirectoryLookup, G: NeighborhoodLookup> Collector<D, G> {
    pub fn new(
        http: Client,
        listing_url: String,
        anchor_class: String,
        directory: D,
        geocoder: G,
    ) -> Self {
        Self {
            http,
            listing_url,
            anchor_class,
            directory,
            geocoder,
        }
    }

    /// Listing, then normalization, then neighborhoods.
    pub async fn run(&self) -> Result<Vec<Recommendation>> {
        let mut records = self.collect_listing().await?;
        normalize_recommenders(&mut records);
        self.resolve_neighborhoods(&mut records).await;
        Ok(records)
    }

    /// Every post linked from the listing page, in listing order.
    pub async fn collect_listing(&self) -> Result<Vec<Recommendation>> {
        info!(url = %self.listing_url, "fetching listing");
        let html = fetch_text(&self.http, &self.listing_url).await?;
        let links = listing_post_links(&html, &self.anchor_class);
        info!(posts = links.len(), "found posts");

        let mut records = Vec::new();
        for (post_num, link) in links.iter().enumerate() {
            info!(post = post_num + 1, url = %link, "scraping post");
            let rows = self.collect_post(link).await?;
            records.extend(rows);
        }
        Ok(records)
    }

    pub async fn collect_post(&self, url: &str) -> Result<Vec<Recommendation>> {
        let html = fetch_text(&self.http, url).await?;
        Ok(self.collect_post_html(url, &html).await)
    }

    /// Rows of an already fetched post.
    pub async fn collect_post_html(&self, url: &str, html: &str) -> Vec<Recommendation> {
        let post_date = post_date_from_url(url);
        if post_date.is_none() {
            warn!(url, "no publication date in post URL; block dates left empty");
        }

        let candidates = extract_candidates(html, post_date);
        let blocks = candidates.len();

        let mut rows = Vec::new();
        for candidate in candidates {
            let (Some(name), Some(address)) = (&candidate.name, &candidate.address) else {
                continue;
            };
            let enrichment = match self.directory.lookup(name, address).await {
                Ok(enrichment) => enrichment,
                Err(err) => {
                    warn!(name = %name, %err, "directory lookup failed");
                    Enrichment::default()
                }
            };
            if let Some(row) = assemble(candidate, enrichment) {
                rows.push(row);
            }
        }

        info!(url, blocks, kept = rows.len(), "post done");
        rows
    }

    pub async fn resolve_neighborhoods(&self, records: &mut [Recommendation]) {
        for record in records.iter_mut() {
            let Some((latitude, longitude)) = record.coordinates() else {
                continue;
            };
            record.neighborhood = match self.geocoder.neighborhood(latitude, longitude).await {
                Ok(place) => place,
                Err(err) => {
                    warn!(name = %record.name, %err, "neighborhood lookup failed");
                    None
                }
            };
        }
    }
}
