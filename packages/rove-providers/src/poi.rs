use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

/// One raw point-of-interest row from the search provider. Address
/// components are kept positional (street number, street, locality, region)
/// so the caller can assemble a display address its own way.
#[derive(Clone, Debug, PartialEq)]
pub struct PoiRecord {
	pub name: String,
	pub lat: f64,
	pub lon: f64,
	pub address_components: [Option<String>; 4],
}

pub async fn search(
	cfg: &rove_config::PoiProviderConfig,
	query: &str,
	center_lat: f64,
	center_lon: f64,
	radius_m: f64,
) -> Result<Vec<PoiRecord>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"query": query,
		"center": { "lat": center_lat, "lon": center_lon },
		"radius_m": radius_m,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_search_response(json)
}

fn parse_search_response(json: Value) -> Result<Vec<PoiRecord>> {
	let results = json
		.get("results")
		.and_then(|v| v.as_array())
		.ok_or_else(|| eyre::eyre!("Search response is missing results array."))?;

	let mut records = Vec::with_capacity(results.len());
	for item in results {
		let name = item
			.get("name")
			.and_then(|v| v.as_str())
			.unwrap_or("Unknown")
			.to_string();
		let lat = item
			.get("lat")
			.and_then(|v| v.as_f64())
			.ok_or_else(|| eyre::eyre!("Search result is missing a numeric lat."))?;
		let lon = item
			.get("lon")
			.and_then(|v| v.as_f64())
			.ok_or_else(|| eyre::eyre!("Search result is missing a numeric lon."))?;
		let address = item.get("address");
		let component = |key: &str| -> Option<String> {
			address
				.and_then(|v| v.get(key))
				.and_then(|v| v.as_str())
				.map(|v| v.to_string())
		};

		records.push(PoiRecord {
			name,
			lat,
			lon,
			address_components: [
				component("street_number"),
				component("street"),
				component("locality"),
				component("region"),
			],
		});
	}

	Ok(records)
}
