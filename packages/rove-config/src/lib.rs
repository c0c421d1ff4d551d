mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Geofence, Location, PoiProviderConfig, Saved, Search, Service};

use std::{fs, path::Path};

/// Hard ceiling on simultaneously monitored regions, imposed by the position
/// provider. `geofence.region_cap` may tighten it but never exceed it.
pub const PROVIDER_REGION_CEILING: usize = 20;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.location.accuracy_threshold_m <= 0.0 {
		return Err(Error::Validation {
			message: "location.accuracy_threshold_m must be greater than zero.".to_string(),
		});
	}
	if cfg.location.distance_filter_m < 0.0 {
		return Err(Error::Validation {
			message: "location.distance_filter_m must be zero or greater.".to_string(),
		});
	}
	if cfg.search.initial_radius_m <= 0.0 {
		return Err(Error::Validation {
			message: "search.initial_radius_m must be greater than zero.".to_string(),
		});
	}
	if cfg.search.initial_radius_m > cfg.search.full_radius_m {
		return Err(Error::Validation {
			message: "search.initial_radius_m must not exceed search.full_radius_m.".to_string(),
		});
	}
	if cfg.search.page_size == 0 {
		return Err(Error::Validation {
			message: "search.page_size must be greater than zero.".to_string(),
		});
	}
	if cfg.search.cache_ttl_secs == 0 {
		return Err(Error::Validation {
			message: "search.cache_ttl_secs must be greater than zero.".to_string(),
		});
	}
	if cfg.search.cache_max_entries == 0 {
		return Err(Error::Validation {
			message: "search.cache_max_entries must be greater than zero.".to_string(),
		});
	}
	if cfg.search.provider.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "search.provider.api_base must be non-empty.".to_string(),
		});
	}
	if cfg.geofence.region_cap == 0 {
		return Err(Error::Validation {
			message: "geofence.region_cap must be greater than zero.".to_string(),
		});
	}
	if cfg.geofence.region_cap > PROVIDER_REGION_CEILING {
		return Err(Error::Validation {
			message: format!(
				"geofence.region_cap must not exceed the provider ceiling of {PROVIDER_REGION_CEILING}."
			),
		});
	}
	if cfg.geofence.min_radius_m <= 0.0 {
		return Err(Error::Validation {
			message: "geofence.min_radius_m must be greater than zero.".to_string(),
		});
	}
	if cfg.geofence.min_radius_m > cfg.geofence.max_radius_m {
		return Err(Error::Validation {
			message: "geofence.min_radius_m must not exceed geofence.max_radius_m.".to_string(),
		});
	}
	if !(cfg.geofence.min_radius_m..=cfg.geofence.max_radius_m)
		.contains(&cfg.geofence.default_radius_m)
	{
		return Err(Error::Validation {
			message: "geofence.default_radius_m must lie within the configured radius bounds."
				.to_string(),
		});
	}
	if cfg.saved.duplicate_distance_m <= 0.0 {
		return Err(Error::Validation {
			message: "saved.duplicate_distance_m must be greater than zero.".to_string(),
		});
	}
	if cfg.saved.data_dir.trim().is_empty() {
		return Err(Error::Validation { message: "saved.data_dir must be non-empty.".to_string() });
	}

	for (label, key) in
		[("saved.locations_key", &cfg.saved.locations_key), ("saved.visits_key", &cfg.saved.visits_key)]
	{
		if key.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}
	if cfg.saved.locations_key == cfg.saved.visits_key {
		return Err(Error::Validation {
			message: "saved.locations_key and saved.visits_key must differ.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.service.log_level = cfg.service.log_level.trim().to_string();

	if cfg.service.log_level.is_empty() {
		cfg.service.log_level = "info".to_string();
	}

	cfg.saved.locations_key = cfg.saved.locations_key.trim().to_string();
	cfg.saved.visits_key = cfg.saved.visits_key.trim().to_string();
}
