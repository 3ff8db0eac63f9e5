//! Thing description rendering.
//!
//! A template is the JSON text of a thing model with placeholder tokens in it.
//! Rendering replaces every token with its runtime value, parses the result,
//! and optionally overrides the security declaration. The whole pipeline is
//! pure so it can be exercised without a broker or a registry.

use std::fmt;

use serde_json::{Map, Value, json};

/// Runtime value a template may refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    BrokerScheme,
    BrokerAddress,
    BaseTopic,
    FriendlyName,
    IeeeAddress,
}

impl Placeholder {
    pub const ALL: [Self; 5] = [
        Self::BrokerScheme,
        Self::BrokerAddress,
        Self::BaseTopic,
        Self::FriendlyName,
        Self::IeeeAddress,
    ];

    /// Literal token as written in templates.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::BrokerScheme => "{{MQTT_BROKER_SCHEME}}",
            Self::BrokerAddress => "{{MQTT_BROKER_ADDRESS}}",
            Self::BaseTopic => "{{BASE_TOPIC}}",
            Self::FriendlyName => "{{FRIENDLY_NAME}}",
            Self::IeeeAddress => "{{IEEE_ADDRESS}}",
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Why a template could not be turned into a description.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("no value available for placeholder {0}")]
    MissingValue(Placeholder),

    #[error("rendered template is not valid JSON")]
    Parse(#[source] serde_json::Error),

    #[error("rendered template is not a JSON object")]
    NotAnObject,
}

/// Complete set of placeholder values for one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitutions {
    broker_scheme: String,
    broker_address: String,
    base_topic: String,
    friendly_name: String,
    ieee_address: String,
}

impl Substitutions {
    #[must_use]
    pub fn builder() -> SubstitutionsBuilder {
        SubstitutionsBuilder::default()
    }

    /// Value substituted for `placeholder`.
    #[must_use]
    pub fn value(&self, placeholder: Placeholder) -> &str {
        match placeholder {
            Placeholder::BrokerScheme => &self.broker_scheme,
            Placeholder::BrokerAddress => &self.broker_address,
            Placeholder::BaseTopic => &self.base_topic,
            Placeholder::FriendlyName => &self.friendly_name,
            Placeholder::IeeeAddress => &self.ieee_address,
        }
    }
}

/// Collects placeholder values; [`build`](Self::build) refuses to produce a
/// partial set.
#[derive(Debug, Default)]
pub struct SubstitutionsBuilder {
    broker_scheme: Option<String>,
    broker_address: Option<String>,
    base_topic: Option<String>,
    friendly_name: Option<String>,
    ieee_address: Option<String>,
}

impl SubstitutionsBuilder {
    #[must_use]
    pub fn broker_scheme(mut self, value: impl Into<String>) -> Self {
        self.broker_scheme = Some(value.into());
        self
    }

    #[must_use]
    pub fn broker_address(mut self, value: Option<String>) -> Self {
        self.broker_address = value;
        self
    }

    #[must_use]
    pub fn base_topic(mut self, value: impl Into<String>) -> Self {
        self.base_topic = Some(value.into());
        self
    }

    #[must_use]
    pub fn friendly_name(mut self, value: impl Into<String>) -> Self {
        self.friendly_name = Some(value.into());
        self
    }

    #[must_use]
    pub fn ieee_address(mut self, value: impl Into<String>) -> Self {
        self.ieee_address = Some(value.into());
        self
    }

    /// # Errors
    ///
    /// Returns [`RenderError::MissingValue`] for the first placeholder whose
    /// value is absent or empty.
    pub fn build(self) -> Result<Substitutions, RenderError> {
        fn require(value: Option<String>, placeholder: Placeholder) -> Result<String, RenderError> {
            value
                .filter(|v| !v.is_empty())
                .ok_or(RenderError::MissingValue(placeholder))
        }

        Ok(Substitutions {
            broker_scheme: require(self.broker_scheme, Placeholder::BrokerScheme)?,
            broker_address: require(self.broker_address, Placeholder::BrokerAddress)?,
            base_topic: require(self.base_topic, Placeholder::BaseTopic)?,
            friendly_name: require(self.friendly_name, Placeholder::FriendlyName)?,
            ieee_address: require(self.ieee_address, Placeholder::IeeeAddress)?,
        })
    }
}

/// Security scheme forced onto a rendered description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityScheme {
    /// Username/password authentication against the broker.
    Basic,
}

impl SecurityScheme {
    fn definition_name(self) -> &'static str {
        match self {
            Self::Basic => "basic_sc",
        }
    }

    fn definition(self) -> Value {
        match self {
            Self::Basic => json!({ "scheme": "basic" }),
        }
    }

    /// Replace the document's security declaration with this scheme.
    pub fn apply(self, document: &mut Map<String, Value>) {
        let name = self.definition_name();
        let mut definitions = Map::new();
        definitions.insert(name.to_string(), self.definition());
        document.insert(
            "securityDefinitions".to_string(),
            Value::Object(definitions),
        );
        document.insert("security".to_string(), json!([name]));
    }
}

/// Replace every occurrence of every placeholder token.
#[must_use]
pub fn substitute(template: &str, substitutions: &Substitutions) -> String {
    Placeholder::ALL
        .iter()
        .fold(template.to_string(), |text, placeholder| {
            text.replace(placeholder.token(), substitutions.value(*placeholder))
        })
}

/// Substitute, parse, and apply the security override.
///
/// # Errors
///
/// Returns [`RenderError::Parse`] when the substituted text is not JSON and
/// [`RenderError::NotAnObject`] when it is JSON but not an object.
pub fn render(
    template: &str,
    substitutions: &Substitutions,
    security: Option<SecurityScheme>,
) -> Result<Value, RenderError> {
    let text = substitute(template, substitutions);
    let mut document: Value = serde_json::from_str(&text).map_err(RenderError::Parse)?;
    let object = document.as_object_mut().ok_or(RenderError::NotAnObject)?;
    if let Some(scheme) = security {
        scheme.apply(object);
    }
    Ok(document)
}

/// Serialise a document with object keys in sorted order, so identical
/// documents always produce identical bytes.
#[must_use]
pub fn to_canonical_json(document: &Value) -> String {
    // serde_json's default map is ordered by key; re-collecting guards against
    // the `preserve_order` feature being switched on elsewhere in the graph.
    canonicalize(document).to_string()
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), canonicalize(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
