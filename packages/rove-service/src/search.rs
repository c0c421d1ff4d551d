//! Multi-variant proximity search: query fan-out, radius expansion, dedup,
//! classification, ranking by distance, and pagination.

pub mod cache;

use std::collections::HashSet;

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use rove_domain::{CandidateLocation, Category, Coordinate, GridCell, format_address, paginate};
use rove_providers::poi::PoiRecord;

use crate::{RoveService, ServiceError, ServiceResult};

#[derive(Clone, Debug)]
pub struct SearchRequest {
	pub text: String,
	pub page: usize,
	/// Explicit search center. The stabilized current fix when absent.
	pub near: Option<Coordinate>,
}

#[derive(Clone, Debug)]
pub struct SearchResponse {
	pub items: Vec<CandidateLocation>,
	pub page: usize,
	/// Size of the full ranked result list behind this page.
	pub total: usize,
}

struct FanOutOutcome {
	records: Vec<PoiRecord>,
	attempts: usize,
	failures: usize,
}

impl RoveService {
	/// Returns one page of nearby candidates for `text`, ranked by distance
	/// from the stabilized fix. Fails with `LocationUnavailable` when no fix
	/// exists and `SearchFailed` only when every query variant failed.
	pub async fn search(&self, req: SearchRequest) -> ServiceResult<SearchResponse> {
		let now = OffsetDateTime::now_utc();

		self.search_at(req, now).await
	}

	/// Same as [`search`](Self::search) with an explicit clock, for callers
	/// and tests that control time.
	pub async fn search_at(
		&self,
		req: SearchRequest,
		now: OffsetDateTime,
	) -> ServiceResult<SearchResponse> {
		let page_size = self.cfg.search.page_size;
		let ttl = Duration::seconds(self.cfg.search.cache_ttl_secs as i64);
		let key = cache::query_key(&req.text);
		let center = {
			let mut state = self.lock_state().await;
			let Some(center) = req.near.or(state.acquisition.current_location) else {
				return Err(ServiceError::LocationUnavailable);
			};

			if let Some(hit) = state.cache.get(&key, ttl, now) {
				tracing::debug!(page = req.page, "Serving search from cache.");

				return Ok(page_of(hit, req.page, page_size));
			}

			center
		};
		let variants = build_query_variants(&req.text);
		let narrow = self.run_fan_out(&variants, center, self.cfg.search.initial_radius_m).await;
		let (records, attempts, failures) =
			if narrow.records.len() < self.cfg.search.min_results {
				let full = self.run_fan_out(&variants, center, self.cfg.search.full_radius_m).await;
				let mut merged = narrow.records;

				merged.extend(full.records);

				(merged, narrow.attempts + full.attempts, narrow.failures + full.failures)
			} else {
				(narrow.records, narrow.attempts, narrow.failures)
			};

		if failures == attempts {
			return Err(ServiceError::SearchFailed {
				message: format!("All {attempts} query variants failed."),
			});
		}

		let ranked = rank_candidates(records, center);

		tracing::info!(results = ranked.len(), variants = variants.len(), "Search completed.");

		{
			let mut state = self.lock_state().await;

			state.cache.put(key, ranked.clone(), now);

			tracing::debug!(entries = state.cache.len(), "Cached search results.");
		}

		Ok(page_of(ranked, req.page, page_size))
	}

	pub async fn clear_search_cache(&self) {
		self.lock_state().await.cache.clear();
	}

	/// Runs every query variant at one radius. A failing variant contributes
	/// zero results instead of failing the pass.
	async fn run_fan_out(
		&self,
		variants: &[String],
		center: Coordinate,
		radius_m: f64,
	) -> FanOutOutcome {
		let mut records = Vec::new();
		let mut failures = 0;

		for variant in variants {
			match self
				.providers()
				.poi
				.search(&self.cfg.search.provider, variant, center, radius_m)
				.await
			{
				Ok(batch) => records.extend(batch),
				Err(err) => {
					failures += 1;

					tracing::warn!(error = %err, variant, radius_m, "Query variant failed.");
				},
			}
		}

		FanOutOutcome { records, attempts: variants.len(), failures }
	}
}

/// Fixed fan-out set. Empty text searches the canonical category vocabulary;
/// otherwise the raw text is widened with each category term.
fn build_query_variants(text: &str) -> Vec<String> {
	let trimmed = text.trim();

	if trimmed.is_empty() {
		let mut variants = vec!["gym fitness".to_string()];

		variants.extend(Category::search_terms().iter().map(|term| (*term).to_string()));

		return variants;
	}

	let mut variants = vec![trimmed.to_string()];

	variants.extend(Category::search_terms().iter().map(|term| format!("{trimmed} {term}")));

	variants
}

/// Classifies, measures, dedups by grid cell (first occurrence wins), and
/// sorts ascending by distance.
fn rank_candidates(records: Vec<PoiRecord>, center: Coordinate) -> Vec<CandidateLocation> {
	let mut seen: HashSet<GridCell> = HashSet::new();
	let mut candidates = Vec::with_capacity(records.len());

	for record in records {
		let coordinate = Coordinate::new(record.lat, record.lon);

		if !seen.insert(coordinate.grid_cell()) {
			continue;
		}

		candidates.push(CandidateLocation {
			id: Uuid::new_v4(),
			category: Category::classify(&record.name),
			distance_m: center.distance_m(&coordinate),
			address: format_address(&record.address_components),
			name: record.name,
			coordinate,
		});
	}

	candidates.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));

	candidates
}

fn page_of(ranked: Vec<CandidateLocation>, page: usize, page_size: usize) -> SearchResponse {
	let total = ranked.len();
	let items = paginate(&ranked, page, page_size).to_vec();

	SearchResponse { items, page, total }
}
