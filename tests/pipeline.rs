use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use weekend_recs::directory::DirectoryLookup;
use weekend_recs::geocode::NeighborhoodLookup;
use weekend_recs::normalize::normalize_recommenders;
use weekend_recs::{
    read_recommendations, write_recommendations, Collector, Enrichment, PriceTier, RecsError,
    Result,
};

const POST_URL: &str = "https://ny.eater.com/2019/12/20/21031836/restaurants-to-try-this-weekend";

const POST_HTML: &str = r#"
<html><body>
<h2>December 20, 2019</h2>
<p id="b1"><strong>Manhattan:</strong> <strong>Via Carota</strong> for the salad.
   <em>51 Grove St., West Village — SD, editor</em></p>
<p id="b2"><strong>Queens:</strong> <strong>Nowhere Diner</strong>
   <em>1 Missing Rd — Robert Siestema</em></p>
<h3>January 3, 2020</h3>
<p id="b3"><strong>Brooklyn:</strong> <strong>Broken Lookup</strong>
   <em>9 Error Ave — Stefanie Tuder</em></p>
<p id="b4"><strong>Bronx:</strong> <strong>Pizza Loves Emily</strong>
   <em>919 Fulton St.</em></p>
<p id="b5"><strong>No name here</strong> <em>2 Quiet St — Kat Odell</em></p>
<p>Not a recommendation <strong>at all</strong></p>
</body></html>
"#;

struct FakeDirectory {
    known: HashMap<&'static str, Enrichment>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeDirectory {
    fn new(calls: Arc<Mutex<Vec<String>>>) -> Self {
        let mut known = HashMap::new();
        known.insert(
            "Via Carota",
            Enrichment {
                price: PriceTier::LowerPriced,
                rating: Some(4.5),
                cuisine: Some("Italian".to_owned()),
                latitude: Some(40.7333),
                longitude: Some(-74.0039),
            },
        );
        known.insert(
            "Pizza Loves Emily",
            Enrichment {
                price: PriceTier::Cheapest,
                cuisine: Some("Pizza".to_owned()),
                ..Enrichment::default()
            },
        );
        Self { known, calls }
    }
}

#[async_trait]
impl DirectoryLookup for FakeDirectory {
    async fn lookup(&self, name: &str, address: &str) -> Result<Enrichment> {
        self.calls.lock().unwrap().push(format!("{name} @ {address}"));
        if name == "Broken Lookup" {
            return Err(RecsError::Api {
                status: 500,
                message: "boom".to_owned(),
            });
        }
        Ok(self.known.get(name).cloned().unwrap_or_default())
    }
}

struct FakeGeocoder;

#[async_trait]
impl NeighborhoodLookup for FakeGeocoder {
    async fn neighborhood(&self, latitude: f64, _longitude: f64) -> Result<Option<String>> {
        if latitude > 40.0 {
            Ok(Some("West Village".to_owned()))
        } else {
            Ok(None)
        }
    }
}

fn collector_with_calls(calls: Arc<Mutex<Vec<String>>>) -> Collector<FakeDirectory, FakeGeocoder> {
    listing_collector("http://unused.invalid/listing".to_owned(), calls)
}

fn listing_collector(
    listing_url: String,
    calls: Arc<Mutex<Vec<String>>>,
) -> Collector<FakeDirectory, FakeGeocoder> {
    Collector::new(
        reqwest::Client::new(),
        listing_url,
        "c-entry-box--compact__image-wrapper".to_owned(),
        FakeDirectory::new(calls),
        FakeGeocoder,
    )
}

fn collector() -> Collector<FakeDirectory, FakeGeocoder> {
    collector_with_calls(Arc::default())
}

#[tokio::test]
async fn post_rows_keep_block_order_and_drop_unknowns() {
    let collector = collector();
    let rows = collector.collect_post_html(POST_URL, POST_HTML).await;

    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Via Carota", "Pizza Loves Emily"]);

    assert_eq!(rows[0].location_str, "51 Grove St");
    assert_eq!(rows[0].recommender, "SD");
    assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2019, 12, 20));

    assert_eq!(rows[1].location_str, "919 Fulton St");
    assert_eq!(rows[1].recommender, "");
    assert_eq!(rows[1].date, NaiveDate::from_ymd_opt(2020, 1, 3));
    assert_eq!(rows[1].coordinates(), None);
}

#[tokio::test]
async fn blocks_without_a_name_skip_the_directory() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let collector = collector_with_calls(calls.clone());
    let rows = collector.collect_post_html(POST_URL, POST_HTML).await;

    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            "Via Carota @ 51 Grove St".to_owned(),
            "Nowhere Diner @ 1 Missing Rd".to_owned(),
            "Broken Lookup @ 9 Error Ave".to_owned(),
            "Pizza Loves Emily @ 919 Fulton St".to_owned(),
        ]
    );
    assert!(rows.len() <= calls.lock().unwrap().len());
}

#[tokio::test]
async fn normalized_and_geocoded_rows_round_trip_through_csv() {
    let collector = collector();
    let mut rows = collector.collect_post_html(POST_URL, POST_HTML).await;
    normalize_recommenders(&mut rows);
    collector.resolve_neighborhoods(&mut rows).await;

    assert_eq!(rows[0].recommender, "Serena Dai");
    assert_eq!(rows[0].neighborhood.as_deref(), Some("West Village"));
    assert_eq!(rows[1].recommender, "N/A");
    assert_eq!(rows[1].neighborhood, None);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("recommendations.csv");
    write_recommendations(&path, &rows).unwrap();
    assert_eq!(read_recommendations(&path).unwrap(), rows);
}

/// Binds a local listener and returns it with its base URL.
async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    (listener, base)
}

/// Answers each request with the `(status, body)` routed by its path, 404
/// otherwise. One response per connection.
fn serve(listener: TcpListener, routes: HashMap<String, (u16, String)>) {
    let routes = Arc::new(routes);
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let routes = routes.clone();
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let request = String::from_utf8_lossy(&request);
                let path = request.split_whitespace().nth(1).unwrap_or("/");
                let (status, body) = routes
                    .get(path)
                    .cloned()
                    .unwrap_or((404, String::new()));
                let response = format!(
                    "HTTP/1.1 {status} Stub\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
}

const FIRST_POST: &str = "/2019/12/20/21031836/restaurants-to-try-this-weekend";
const SECOND_POST: &str = "/2020/01/03/21046822/restaurants-to-try-this-weekend";

const FIRST_POST_HTML: &str = r#"
<html><body>
<h2>December 20</h2>
<p id="f1"><strong>Manhattan:</strong> <strong>Via Carota</strong>
   <em>51 Grove St., West Village — SD</em></p>
<p id="f2"><strong>Bronx:</strong> <strong>Pizza Loves Emily</strong>
   <em>919 Fulton St. — Robert Siestema</em></p>
</body></html>
"#;

const SECOND_POST_HTML: &str = r#"
<html><body>
<h2>January 3</h2>
<p id="s1"><strong>Manhattan:</strong> <strong>Via Carota</strong>
   <em>51 Grove St. — Stefanie Tuder</em></p>
</body></html>
"#;

fn listing_html(base: &str, posts: &[&str]) -> String {
    posts
        .iter()
        .map(|post| format!(r#"<a class="c-entry-box--compact__image-wrapper" href="{base}{post}">post</a>"#))
        .collect::<Vec<_>>()
        .join("\n")
}

#[tokio::test]
async fn listing_rows_follow_post_then_block_order() {
    let (listener, base) = bind().await;
    let mut routes = HashMap::new();
    routes.insert("/listing".to_owned(), (200, listing_html(&base, &[FIRST_POST, SECOND_POST])));
    routes.insert(FIRST_POST.to_owned(), (200, FIRST_POST_HTML.to_owned()));
    routes.insert(SECOND_POST.to_owned(), (200, SECOND_POST_HTML.to_owned()));
    serve(listener, routes);

    let collector = listing_collector(format!("{base}/listing"), Arc::default());
    let rows = collector.collect_listing().await.unwrap();

    let summary: Vec<(&str, &str, Option<NaiveDate>)> = rows
        .iter()
        .map(|r| (r.name.as_str(), r.recommender.as_str(), r.date))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Via Carota", "SD", NaiveDate::from_ymd_opt(2019, 12, 20)),
            ("Pizza Loves Emily", "Robert Siestema", NaiveDate::from_ymd_opt(2019, 12, 20)),
            ("Via Carota", "Stefanie Tuder", NaiveDate::from_ymd_opt(2020, 1, 3)),
        ]
    );
    assert!(rows.iter().all(|r| r.neighborhood.is_none()));
}

#[tokio::test]
async fn run_normalizes_and_resolves_neighborhoods() {
    let (listener, base) = bind().await;
    let mut routes = HashMap::new();
    routes.insert("/listing".to_owned(), (200, listing_html(&base, &[FIRST_POST, SECOND_POST])));
    routes.insert(FIRST_POST.to_owned(), (200, FIRST_POST_HTML.to_owned()));
    routes.insert(SECOND_POST.to_owned(), (200, SECOND_POST_HTML.to_owned()));
    serve(listener, routes);

    let collector = listing_collector(format!("{base}/listing"), Arc::default());
    let rows = collector.run().await.unwrap();

    let recommenders: Vec<&str> = rows.iter().map(|r| r.recommender.as_str()).collect();
    assert_eq!(recommenders, vec!["Serena Dai", "Robert Sietsema", "Stefanie Tuder"]);
    let neighborhoods: Vec<Option<&str>> = rows.iter().map(|r| r.neighborhood.as_deref()).collect();
    assert_eq!(neighborhoods, vec![Some("West Village"), None, Some("West Village")]);
}

#[tokio::test]
async fn failed_post_fetch_aborts_the_run() {
    let (listener, base) = bind().await;
    let mut routes = HashMap::new();
    routes.insert("/listing".to_owned(), (200, listing_html(&base, &[FIRST_POST, SECOND_POST])));
    routes.insert(FIRST_POST.to_owned(), (200, FIRST_POST_HTML.to_owned()));
    routes.insert(SECOND_POST.to_owned(), (500, "upstream down".to_owned()));
    serve(listener, routes);

    let calls = Arc::new(Mutex::new(Vec::new()));
    let collector = listing_collector(format!("{base}/listing"), calls.clone());
    let err = collector.run().await.unwrap_err();

    assert!(
        matches!(err, RecsError::Api { status: 500, .. }),
        "unexpected error: {err}"
    );
    assert_eq!(calls.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn failed_listing_fetch_is_fatal() {
    let (listener, base) = bind().await;
    serve(listener, HashMap::new());

    let collector = listing_collector(format!("{base}/listing"), Arc::default());
    let err = collector.collect_listing().await.unwrap_err();
    assert!(matches!(err, RecsError::Api { status: 404, .. }), "unexpected error: {err}");
}
