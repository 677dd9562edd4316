//! Market quotes from the Yahoo chart endpoint.
//!
//! Two feeds share the same transport:
//! - `commodities`: the asset's own futures/FX/equity ticker (primary)
//! - `proxy_equities`: a listed company tracking the asset (secondary)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sahayak_core::collaborator::MarketDataSource;
use sahayak_core::error::{Capability, CollaboratorError};
use sahayak_core::keywords::Words;
use sahayak_core::turn::{MarketQuote, QuoteKind};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// A phrase operators use for an asset, the canonical asset name, and its ticker.
struct Listing {
    phrase: &'static str,
    asset: &'static str,
    symbol: &'static str,
}

const fn listing(phrase: &'static str, asset: &'static str, symbol: &'static str) -> Listing {
    Listing {
        phrase,
        asset,
        symbol,
    }
}

const LISTINGS: &[Listing] = &[
    listing("tata steel", "tata steel", "TATASTEEL.NS"),
    listing("tata", "tata steel", "TATASTEEL.NS"),
    listing("steel", "steel", "HRC=F"),
    listing("copper", "copper", "HG=F"),
    listing("aluminum", "aluminum", "ALI=F"),
    listing("aluminium", "aluminum", "ALI=F"),
    listing("gold", "gold", "GC=F"),
    listing("silver", "silver", "SI=F"),
    listing("crude oil", "oil", "CL=F"),
    listing("crude", "oil", "CL=F"),
    listing("oil", "oil", "CL=F"),
    listing("usd/inr", "usd/inr", "INR=X"),
    listing("dollar", "usd/inr", "INR=X"),
    listing("rupee", "usd/inr", "INR=X"),
    listing("euro", "euro", "EURINR=X"),
    listing("tesla", "tesla", "TSLA"),
    listing("google", "google", "GOOGL"),
    listing("apple", "apple", "AAPL"),
    listing("bitcoin", "bitcoin", "BTC-USD"),
];

/// Listed companies whose share price tracks an asset.
const PROXY_EQUITIES: &[(&str, &str)] = &[
    ("copper", "FCX"),
    ("aluminum", "AA"),
    ("steel", "TATASTEEL.NS"),
    ("gold", "NEM"),
    ("silver", "PAAS"),
    ("oil", "XOM"),
];

fn find_listing(words: &Words) -> Option<&'static Listing> {
    // Earliest mention wins; on a tie the longer phrase (listed first) wins.
    LISTINGS
        .iter()
        .filter_map(|l| words.find_phrase(l.phrase).map(|pos| (pos, l)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, l)| l)
}

/// Canonical name of the first known asset mentioned in `text`.
pub fn known_asset(text: &str) -> Option<&'static str> {
    find_listing(&Words::new(text)).map(|l| l.asset)
}

/// A bare ticker such as `HG=F`, `^NSEI` or `TATASTEEL.NS`.
fn as_ticker(text: &str) -> Option<String> {
    let t = text.trim();
    let valid = !t.is_empty()
        && t.len() <= 15
        && t.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '=' | '.' | '^' | '-'));
    valid.then(|| t.to_ascii_uppercase())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Feed {
    Commodities,
    ProxyEquities,
}

/// A [`MarketDataSource`] backed by the Yahoo chart API.
pub struct YahooChartSource {
    name: &'static str,
    feed: Feed,
    chart_url: String,
    client: reqwest::Client,
}

impl YahooChartSource {
    /// Primary feed: quotes the asset's own ticker.
    pub fn commodities(chart_url: impl Into<String>, timeout: Duration) -> Self {
        Self::with_feed("yahoo-commodities", Feed::Commodities, chart_url, timeout)
    }

    /// Secondary feed: quotes a related equity for the asset.
    pub fn proxy_equities(chart_url: impl Into<String>, timeout: Duration) -> Self {
        Self::with_feed("yahoo-proxy-equities", Feed::ProxyEquities, chart_url, timeout)
    }

    fn with_feed(
        name: &'static str,
        feed: Feed,
        chart_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            name,
            feed,
            chart_url: chart_url.into().trim_end_matches('/').to_string(),
            client: crate::http_client(timeout),
        }
    }

    /// Map an operator argument to `(asset, ticker)` for this feed.
    pub fn resolve_symbol(&self, symbol_or_metal: &str) -> Option<(String, String)> {
        let listing = find_listing(&Words::new(symbol_or_metal));
        match self.feed {
            Feed::Commodities => match listing {
                Some(l) => Some((l.asset.to_string(), l.symbol.to_string())),
                None => as_ticker(symbol_or_metal).map(|t| (t.clone(), t)),
            },
            Feed::ProxyEquities => {
                let asset = listing?.asset;
                PROXY_EQUITIES
                    .iter()
                    .find(|(a, _)| *a == asset)
                    .map(|(a, proxy)| (a.to_string(), proxy.to_string()))
            }
        }
    }

    fn chart_endpoint(&self, symbol: &str) -> Result<reqwest::Url, CollaboratorError> {
        let mut url = reqwest::Url::parse(&self.chart_url).map_err(|e| {
            CollaboratorError::unavailable(Capability::MarketData, format!("bad chart url: {e}"))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                CollaboratorError::unavailable(Capability::MarketData, "chart url cannot be a base")
            })?
            .push(symbol);
        url.query_pairs_mut()
            .append_pair("interval", "1d")
            .append_pair("range", "5d");
        Ok(url)
    }
}

#[async_trait]
impl MarketDataSource for YahooChartSource {
    fn name(&self) -> &str {
        self.name
    }

    async fn fetch_quote(&self, symbol_or_metal: &str) -> Result<MarketQuote, CollaboratorError> {
        let (asset, symbol) = self.resolve_symbol(symbol_or_metal).ok_or_else(|| {
            CollaboratorError::malformed(
                Capability::MarketData,
                format!("no {:?} listing for '{symbol_or_metal}'", self.feed),
            )
        })?;

        let url = self.chart_endpoint(&symbol)?;
        debug!(source = self.name, %symbol, "Fetching market quote");

        let response = self.client.get(url).send().await.map_err(|e| {
            CollaboratorError::unavailable(Capability::MarketData, e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(source = self.name, %symbol, status = status.as_u16(), "Chart request failed");
            return Err(CollaboratorError::unavailable(
                Capability::MarketData,
                format!("chart endpoint returned {status}"),
            ));
        }

        let body: ChartEnvelope = response
            .json()
            .await
            .map_err(|e| CollaboratorError::malformed(Capability::MarketData, e.to_string()))?;

        quote_from_chart(body, &asset, &symbol)
    }
}

fn quote_from_chart(
    body: ChartEnvelope,
    asset: &str,
    symbol: &str,
) -> Result<MarketQuote, CollaboratorError> {
    if let Some(err) = body.chart.error {
        return Err(CollaboratorError::unavailable(
            Capability::MarketData,
            format!("{}: {}", err.code, err.description),
        ));
    }

    let meta = body
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .map(|r| r.meta)
        .ok_or_else(|| CollaboratorError::malformed(Capability::MarketData, "empty chart result"))?;

    let price = meta.regular_market_price.ok_or_else(|| {
        CollaboratorError::malformed(Capability::MarketData, "quote has no market price")
    })?;

    Ok(MarketQuote {
        asset: asset.to_string(),
        symbol: meta.symbol.unwrap_or_else(|| symbol.to_string()),
        price,
        currency: meta.currency,
        previous_close: meta.previous_close.or(meta.chart_previous_close),
        as_of: meta
            .regular_market_time
            .and_then(|t| DateTime::<Utc>::from_timestamp(t, 0)),
        kind: QuoteKind::Direct,
    })
}

// --- Yahoo chart API types ---

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: Option<String>,
    currency: Option<String>,
    regular_market_price: Option<f64>,
    previous_close: Option<f64>,
    chart_previous_close: Option<f64>,
    regular_market_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}
