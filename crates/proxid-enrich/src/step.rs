//! The attribute enrichment step.
//!
//! Per invocation: read the resolved user identifier from the attribute bag,
//! decide which canonical attributes to fetch (all of them, or only those
//! not already usefully populated upstream), resolve them through the
//! adapter, and write the normalized values into the bag under the
//! configured output names. No state persists across invocations.

use std::collections::HashMap;
use std::sync::Arc;

use proxid_adapter::IdmAdapter;
use serde_json::Value;
use tracing::debug;

use crate::config::{EnrichConfig, Mode};
use crate::error::{EnrichError, EnrichResult};
use crate::factory::create_adapter;

/// The pipeline's mutable attribute bag: attribute name → value.
///
/// Values written by this step are JSON arrays, except structured
/// (string-keyed mapping) attributes which pass through whole.
pub type AttributeBag = HashMap<String, Value>;

/// Bag key under which the upstream identity-resolution step stores the
/// user's internal identifier.
pub const USER_ID_ATTRIBUTE: &str = "idm_id";

/// The request-time enrichment step.
pub struct AttributeEnricher {
    mode: Mode,
    attr_map: Option<HashMap<String, Value>>,
    adapter: Arc<dyn IdmAdapter>,
}

impl AttributeEnricher {
    /// Creates the step, constructing the configured backend adapter.
    ///
    /// ## Errors
    ///
    /// Returns a configuration error when the backend settings or the
    /// attribute translation table cannot be loaded.
    pub fn new(config: &EnrichConfig) -> EnrichResult<Self> {
        let adapter = create_adapter(config.interface, &config.idm_config_file_name)?;
        Ok(Self::with_adapter(config, adapter))
    }

    /// Creates the step over an already-constructed adapter.
    #[must_use]
    pub fn with_adapter(config: &EnrichConfig, adapter: Arc<dyn IdmAdapter>) -> Self {
        Self {
            mode: config.mode,
            attr_map: config.attr_map.clone(),
            adapter,
        }
    }

    /// Runs one enrichment pass over the caller's attribute bag.
    ///
    /// The bag always continues down the pipeline: when the user identifier
    /// or the output map is missing the bag passes through untouched, and
    /// `Err` is reserved for fatal configuration/programmer errors the host
    /// has to decide about.
    pub async fn process(&self, bag: &mut AttributeBag) -> EnrichResult<()> {
        let Some(user_id) = user_id(bag) else {
            debug!(
                "'{USER_ID_ATTRIBUTE}' missing from the attribute bag; \
                 is the identity-resolution step configured before this one?"
            );
            return Ok(());
        };

        let Some(attr_map) = &self.attr_map else {
            debug!("no output attribute map configured, passing through");
            return Ok(());
        };

        let selected = self.select(attr_map, bag);
        if selected.is_empty() {
            debug!("every output attribute is already populated, passing through");
            return Ok(());
        }

        let values = self
            .adapter
            .get_user_attributes_values(&user_id, &selected)
            .await?;

        for (canonical, value) in values {
            let Some(mapping) = attr_map.get(&canonical) else {
                continue;
            };
            let targets = output_targets(&canonical, mapping)?;
            let normalized = normalize(value);

            for target in targets {
                // Partial mode never clobbers a key the bag already holds;
                // full mode overwrites every configured target.
                if self.mode == Mode::Partial && bag.contains_key(&target) {
                    debug!(attribute = %canonical, target = %target, "target already present, skipping");
                    continue;
                }

                debug!(attribute = %canonical, target = %target, "writing enriched attribute");
                bag.insert(target, normalized.clone());
            }
        }

        Ok(())
    }

    /// Computes the canonical attribute names to fetch.
    fn select(&self, attr_map: &HashMap<String, Value>, bag: &AttributeBag) -> Vec<String> {
        match self.mode {
            Mode::Full => attr_map.keys().cloned().collect(),
            Mode::Partial => attr_map
                .iter()
                .filter(|(_, mapping)| needs_fetch(mapping, bag))
                .map(|(canonical, _)| canonical.clone())
                .collect(),
        }
    }
}

/// Reads the resolved user identifier from the bag.
///
/// The upstream step may store it as a scalar or a one-element list, as a
/// string or a number.
fn user_id(bag: &AttributeBag) -> Option<String> {
    let value = bag.get(USER_ID_ATTRIBUTE)?;
    let scalar = match value {
        Value::Array(items) => items.first()?,
        other => other,
    };

    match scalar {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Decides whether a partial-mode fetch is needed for one output mapping:
/// yes when any of its output targets is missing from the bag or present but
/// empty/false. Malformed mappings are fetched so the write stage reports
/// them per attribute.
fn needs_fetch(mapping: &Value, bag: &AttributeBag) -> bool {
    match mapping {
        Value::String(target) => !is_useful(bag.get(target)),
        Value::Array(targets) => targets.iter().any(|target| match target {
            Value::String(name) => !is_useful(bag.get(name)),
            _ => true,
        }),
        _ => true,
    }
}

/// An upstream value counts as useful unless it is absent, null, `false`,
/// zero, or an empty string/sequence/mapping.
fn is_useful(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
    }
}

/// Wraps a fetched value into the bag's uniform list representation.
///
/// Absent becomes the empty list, scalars become one-element lists, and
/// sequences and string-keyed mappings pass through unchanged.
fn normalize(value: Value) -> Value {
    match value {
        Value::Null => Value::Array(Vec::new()),
        scalar @ (Value::Bool(_) | Value::Number(_) | Value::String(_)) => {
            Value::Array(vec![scalar])
        }
        other => other,
    }
}

/// Resolves the output target name(s) of one output-map entry.
fn output_targets(canonical: &str, mapping: &Value) -> EnrichResult<Vec<String>> {
    match mapping {
        Value::String(name) => Ok(vec![name.clone()]),
        Value::Array(names) => names
            .iter()
            .map(|name| {
                name.as_str().map(String::from).ok_or_else(|| {
                    EnrichError::UnsupportedOutputMapping(canonical.to_string())
                })
            })
            .collect(),
        _ => Err(EnrichError::UnsupportedOutputMapping(canonical.to_string())),
    }
}
