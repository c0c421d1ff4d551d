use serde::{Deserialize, Serialize};

const YOGA_TERMS: [&str; 2] = ["yoga", "pilates"];
const CROSSFIT_TERMS: [&str; 2] = ["crossfit", "cross fit"];
const MARTIAL_ARTS_TERMS: [&str; 5] = ["martial", "karate", "jiu", "judo", "boxing"];

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
	Fitness,
	Crossfit,
	Yoga,
	MartialArts,
	Other,
}

impl Category {
	/// Classifies a venue by case-insensitive keyword match against its name.
	/// Keyword sets are checked in a fixed priority order; anything that
	/// matches nothing falls back to the generic fitness category.
	pub fn classify(name: &str) -> Self {
		let lowered = name.to_lowercase();

		if YOGA_TERMS.iter().any(|term| lowered.contains(term)) {
			return Self::Yoga;
		}
		if CROSSFIT_TERMS.iter().any(|term| lowered.contains(term)) {
			return Self::Crossfit;
		}
		if MARTIAL_ARTS_TERMS.iter().any(|term| lowered.contains(term)) {
			return Self::MartialArts;
		}

		Self::Fitness
	}

	pub fn label(&self) -> &'static str {
		match self {
			Self::Fitness => "Fitness Center",
			Self::Crossfit => "CrossFit",
			Self::Yoga => "Yoga Studio",
			Self::MartialArts => "Martial Arts",
			Self::Other => "Other",
		}
	}

	/// Vocabulary used to build search query variants. `Other` carries no
	/// usable term and is excluded.
	pub fn search_terms() -> [&'static str; 4] {
		["fitness", "crossfit", "yoga", "martial arts"]
	}
}
