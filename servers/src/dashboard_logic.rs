//! # HTML Dashboard
//!
//! Server-rendered page with an SVG gauge, a market summary, the historical
//! trend and per-indicator bars. No JavaScript; the page is rebuilt from the
//! cached snapshot on every request and `/refresh` drops the cache.

use actix_web::{HttpResponse, Responder, get, http::header, web};
use chrono::Utc;
use lib_common::core::SnapshotCache;
use lib_common::markets::cnn::{
    ComparisonPeriod, CompositeIndex, DataPoint, FearAndGreed, Indicator, SeverityBand,
};
use lib_common::utils::misc::utils::title_case;
use serde::Serialize;
use std::f64::consts::PI;
use std::fmt::Write;
use std::sync::Arc;
use std::time::Duration;

pub struct DashboardState {
    fgi: Arc<FearAndGreed>,
    cache: SnapshotCache<CompositeIndex>,
}

impl DashboardState {
    pub fn new(fgi: Arc<FearAndGreed>, ttl: Duration) -> web::Data<Self> {
        web::Data::new(Self {
            fgi,
            cache: SnapshotCache::new(ttl),
        })
    }
}

#[derive(Serialize)]
struct StatusResponse {
    ts: String,
}

/// Solid color for a band.
pub fn band_color(band: SeverityBand) -> &'static str {
    match band {
        SeverityBand::ExtremeFear => "#8B0000",
        SeverityBand::Fear => "#FF4500",
        SeverityBand::Neutral => "#FFD700",
        SeverityBand::Greed => "#32CD32",
        SeverityBand::ExtremeGreed => "#006400",
    }
}

/// Translucent background tint for a band; `alpha` in 0..=1.
fn band_tint(band: SeverityBand, alpha: f64) -> String {
    let (r, g, b) = match band {
        SeverityBand::ExtremeFear => (139, 0, 0),
        SeverityBand::Fear => (255, 69, 0),
        SeverityBand::Neutral => (255, 215, 0),
        SeverityBand::Greed => (144, 238, 144),
        SeverityBand::ExtremeGreed => (0, 100, 0),
    };
    format!("rgba({}, {}, {}, {})", r, g, b, alpha)
}

pub fn score_color(score: f64) -> &'static str {
    band_color(SeverityBand::from_score(score))
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// Point on the gauge arc for a 0..=100 score: 0 at the left, 100 at the right.
fn gauge_point(score: f64, cx: f64, cy: f64, r: f64) -> (f64, f64) {
    let theta = PI * (1.0 - score.clamp(0.0, 100.0) / 100.0);
    (cx + r * theta.cos(), cy - r * theta.sin())
}

/// Half-circle gauge with one arc per band and a needle at `score`.
pub fn gauge_svg(score: f64, title: &str) -> String {
    let (cx, cy, r) = (160.0, 170.0, 130.0);
    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg class="gauge" viewBox="0 0 320 230" xmlns="http://www.w3.org/2000/svg">"#
    );
    for band in SeverityBand::ALL {
        let (lo, hi) = band.range();
        let (x0, y0) = gauge_point(lo, cx, cy, r);
        let (x1, y1) = gauge_point(hi, cx, cy, r);
        let _ = write!(
            svg,
            r#"<path d="M {:.2} {:.2} A {r} {r} 0 0 1 {:.2} {:.2}" stroke="{}" stroke-width="28" fill="none"/>"#,
            x0, y0, x1, y1, band_tint(band, 0.3)
        );
    }
    let (nx, ny) = gauge_point(score, cx, cy, r - 10.0);
    let _ = write!(
        svg,
        r#"<line x1="{cx}" y1="{cy}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="6" stroke-linecap="round"/>"#,
        nx,
        ny,
        score_color(score)
    );
    let _ = write!(svg, r#"<circle cx="{cx}" cy="{cy}" r="8" fill="black"/>"#);
    let _ = write!(
        svg,
        r#"<text x="{cx}" y="215" text-anchor="middle" font-size="40" font-weight="bold">{:.1}</text>"#,
        score
    );
    let _ = write!(
        svg,
        r#"<text x="{cx}" y="24" text-anchor="middle" font-size="20">{}</text></svg>"#,
        escape_html(title)
    );
    svg
}

/// Line chart of the series over band-colored background stripes.
pub fn history_svg(points: &[DataPoint]) -> String {
    if points.is_empty() {
        return r#"<p class="empty">No historical data available.</p>"#.to_string();
    }
    let (width, height, pad) = (800.0_f64, 300.0_f64, 30.0_f64);
    let plot_h = height - 2.0 * pad;
    let plot_w = width - 2.0 * pad;
    let y_of = |score: f64| pad + plot_h * (1.0 - score.clamp(0.0, 100.0) / 100.0);

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg class="history" viewBox="0 0 {width} {height}" xmlns="http://www.w3.org/2000/svg">"#
    );
    for band in SeverityBand::ALL {
        let (lo, hi) = band.range();
        let _ = write!(
            svg,
            r#"<rect x="{pad}" y="{:.2}" width="{plot_w}" height="{:.2}" fill="{}"/>"#,
            y_of(hi),
            y_of(lo) - y_of(hi),
            band_tint(band, 0.1)
        );
    }

    let step = if points.len() > 1 { plot_w / (points.len() - 1) as f64 } else { 0.0 };
    let polyline: Vec<String> = points
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{:.2},{:.2}", pad + step * i as f64, y_of(p.score)))
        .collect();
    let _ = write!(
        svg,
        r##"<polyline points="{}" fill="none" stroke="#1f77b4" stroke-width="2"/>"##,
        polyline.join(" ")
    );

    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        let _ = write!(
            svg,
            r#"<text x="{pad}" y="{:.0}" font-size="12">{}</text><text x="{:.0}" y="{:.0}" font-size="12" text-anchor="end">{}</text>"#,
            height - 8.0,
            first.timestamp.format("%b %d, %Y"),
            width - pad,
            height - 8.0,
            last.timestamp.format("%b %d, %Y")
        );
    }
    svg.push_str("</svg>");
    svg
}

fn indicator_bar(indicator: &Indicator) -> String {
    let updated = indicator
        .timestamp
        .map(|ts| ts.format("%b %d, %I:%M %p").to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let color = score_color(indicator.score);
    format!(
        concat!(
            r#"<div class="indicator"><div class="bar-label"><span style="color: {color}">&#9679;</span> "#,
            r#"<b>{name}</b>: {score:.1} ({rating})</div>"#,
            r#"<div class="bar-track"><div class="bar" style="width: {width:.1}%; background-color: {color}"></div>"#,
            r#"<div class="midline"></div></div><small>Updated: {updated}</small></div>"#
        ),
        color = color,
        name = escape_html(indicator.name),
        score = indicator.score,
        rating = escape_html(&title_case(&indicator.rating)),
        width = indicator.score.clamp(0.0, 100.0),
        updated = updated,
    )
}

fn summary_block(composite: &CompositeIndex) -> String {
    let mut rows = String::new();
    for delta in composite.comparisons() {
        let _ = write!(
            rows,
            "<tr><td>{}</td><td>{:.1}</td><td>{}</td></tr>",
            delta.period.label(),
            delta.previous,
            delta.signed()
        );
    }
    let from_close = composite.delta(ComparisonPeriod::PreviousClose);
    format!(
        concat!(
            r#"<div class="summary"><h3>Market Summary</h3>"#,
            r#"<p class="metric">Current Score <b>{:.1}</b> <span>{:+.1} from close</span></p>"#,
            "<table><tr><th>Period</th><th>Score</th><th>Change</th></tr>{}</table>",
            r#"<div class="badge" style="background-color: {}">{}</div></div>"#
        ),
        composite.score,
        from_close,
        rows,
        score_color(composite.score),
        escape_html(&composite.rating.to_uppercase())
    )
}

const STYLE: &str = "body{font-family:sans-serif;margin:2em;color:#222}\
.row{display:flex;gap:2em;flex-wrap:wrap}.gauge{width:360px}.history{width:100%;max-width:900px}\
.badge{color:white;padding:10px;border-radius:5px;text-align:center;font-size:18px;font-weight:bold}\
.indicator{margin-bottom:10px}.bar-track{position:relative;background:#eee;height:14px;width:100%;max-width:500px}\
.bar{height:14px}.midline{position:absolute;left:50%;top:0;bottom:0;border-left:1px dashed gray}\
table{border-collapse:collapse}td,th{padding:4px 12px;text-align:left}small{color:gray}";

/// The full dashboard page for `composite`.
pub fn render_page(composite: &CompositeIndex) -> String {
    let bars: String = composite.indicators.iter().map(indicator_bar).collect();
    let updated = composite
        .timestamp
        .map(|ts| ts.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "N/A".to_string());
    format!(
        concat!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>CNN Fear &amp; Greed Index</title>",
            "<style>{style}</style></head><body>",
            "<h1>&#128202; CNN Fear &amp; Greed Index</h1><p>Real-time market sentiment analysis from CNN Business. Updated {updated}.</p>",
            "<div class=\"row\">{gauge}{summary}</div><hr>",
            "<h3>Historical Trend</h3>{history}<hr>",
            "<h3>Individual Indicators</h3>{bars}<hr>",
            "<small>Data sourced from CNN Business Fear &amp; Greed Index. Refreshes every 5 minutes.</small> ",
            "<a href=\"/refresh\">&#128260; Refresh Data</a></body></html>"
        ),
        style = STYLE,
        updated = updated,
        gauge = gauge_svg(composite.score, &title_case(&composite.rating)),
        summary = summary_block(composite),
        history = history_svg(&composite.historical),
        bars = bars,
    )
}

pub fn render_error_page(message: &str) -> String {
    format!(
        concat!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>CNN Fear &amp; Greed Index</title></head><body>",
            "<h1>Unable to load market data</h1><p>{}</p><a href=\"/refresh\">Try again</a></body></html>"
        ),
        escape_html(message)
    )
}

#[get("/")]
async fn index(state: web::Data<DashboardState>) -> impl Responder {
    match state.cache.get_or_try_refresh(|| state.fgi.fetch_latest()).await {
        Ok(snapshot) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(render_page(&snapshot)),
        Err(e) => {
            log::error!("Dashboard fetch failed: {}", e);
            HttpResponse::BadGateway()
                .content_type("text/html; charset=utf-8")
                .body(render_error_page(&e.to_string()))
        }
    }
}

#[get("/refresh")]
async fn refresh(state: web::Data<DashboardState>) -> impl Responder {
    state.cache.invalidate().await;
    log::info!("Dashboard cache cleared");
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/"))
        .finish()
}

#[get("/status")]
async fn status() -> impl Responder {
    HttpResponse::Ok().json(StatusResponse {
        ts: Utc::now().to_rfc3339(),
    })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index).service(refresh).service(status);
}
