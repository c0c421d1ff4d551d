use serde::{Deserialize, Deserializer, Serializer, ser::SerializeSeq};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub fn serialize<S>(values: &[OffsetDateTime], serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	let mut seq = serializer.serialize_seq(Some(values.len()))?;

	for value in values {
		let formatted = value.format(&Rfc3339).map_err(serde::ser::Error::custom)?;

		seq.serialize_element(&formatted)?;
	}

	seq.end()
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<OffsetDateTime>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw: Vec<String> = Vec::deserialize(deserializer)?;

	raw.into_iter()
		.map(|value| OffsetDateTime::parse(&value, &Rfc3339).map_err(serde::de::Error::custom))
		.collect()
}
