//! Configuration providers: per-authority parsers, normalizers, and schema publishers.
//!
//! [`ConfigurationProvider`] is the object-safe view services use while validating raw
//! declarations; [`TypedConfigurationProvider`] pins the settings and configuration types
//! for one authority and also builds the typed [`ProviderConfig`] its factory consumes.

// self
use crate::{
	_prelude::*,
	config::{
		ConfigMap, ConfigSection, ConfigValues, ConfigurableProperties, ProviderConfig,
		ValidationError,
	},
	model::{AuthorityId, ProviderDeclaration},
};

/// Parser, normalizer, and schema generator for one authority's ConfigMaps.
pub trait ConfigurationProvider
where
	Self: Send + Sync,
{
	/// Authority whose maps this provider understands.
	fn authority(&self) -> &AuthorityId;

	/// Returns the schema and defaults for a section.
	fn properties(&self, section: ConfigSection) -> ConfigurableProperties;

	/// Parses a raw map into its normalized form; errors carry section-prefixed field paths.
	fn normalize(
		&self,
		section: ConfigSection,
		raw: &ConfigValues,
	) -> Result<ConfigValues, ValidationError>;
}

/// Configuration provider with statically pinned settings and configuration types.
#[derive(Clone, Debug)]
pub struct TypedConfigurationProvider<S, C> {
	authority: AuthorityId,
	default_settings: S,
	default_configuration: C,
}
impl<S, C> TypedConfigurationProvider<S, C>
where
	S: ConfigMap,
	C: ConfigMap,
{
	/// Creates a provider whose defaults are the maps' `Default` values.
	pub fn new(authority: AuthorityId) -> Self {
		Self { authority, default_settings: S::default(), default_configuration: C::default() }
	}

	/// Overrides the default settings published by the authority.
	pub fn with_default_settings(mut self, settings: S) -> Self {
		self.default_settings = settings;

		self
	}

	/// Overrides the default configuration published by the authority.
	pub fn with_default_configuration(mut self, configuration: C) -> Self {
		self.default_configuration = configuration;

		self
	}

	/// Default settings published by the authority.
	pub fn default_settings(&self) -> &S {
		&self.default_settings
	}

	/// Default configuration published by the authority.
	pub fn default_configuration(&self) -> &C {
		&self.default_configuration
	}

	/// Parses raw settings over the defaults.
	pub fn parse_settings(&self, raw: &ConfigValues) -> Result<S, ValidationError> {
		S::merge(&self.default_settings, raw).map_err(|e| e.within(ConfigSection::Settings))
	}

	/// Parses a raw configuration over the defaults.
	pub fn parse_configuration(&self, raw: &ConfigValues) -> Result<C, ValidationError> {
		C::merge(&self.default_configuration, raw)
			.map_err(|e| e.within(ConfigSection::Configuration))
	}

	/// Builds the runtime configuration for a declaration, reporting both sections' failures.
	pub fn build_config(
		&self,
		declaration: &ProviderDeclaration,
	) -> Result<ProviderConfig<S, C>, ValidationError> {
		match (
			self.parse_settings(&declaration.settings),
			self.parse_configuration(&declaration.configuration),
		) {
			(Ok(settings), Ok(configuration)) =>
				Ok(ProviderConfig::from_declaration(declaration, settings, configuration)),
			(settings, configuration) => {
				let mut violations = Vec::new();

				if let Err(e) = settings {
					violations.extend(e.violations);
				}
				if let Err(e) = configuration {
					violations.extend(e.violations);
				}

				Err(ValidationError::new(violations))
			},
		}
	}
}
impl<S, C> ConfigurationProvider for TypedConfigurationProvider<S, C>
where
	S: ConfigMap,
	C: ConfigMap,
{
	fn authority(&self) -> &AuthorityId {
		&self.authority
	}

	fn properties(&self, section: ConfigSection) -> ConfigurableProperties {
		let (schema, defaults) = match section {
			ConfigSection::Settings => (S::schema(), self.default_settings.to_values()),
			ConfigSection::Configuration =>
				(C::schema(), self.default_configuration.to_values()),
		};

		ConfigurableProperties {
			authority: self.authority.clone(),
			section,
			schema,
			defaults: defaults.unwrap_or_default(),
		}
	}

	fn normalize(
		&self,
		section: ConfigSection,
		raw: &ConfigValues,
	) -> Result<ConfigValues, ValidationError> {
		let normalized = match section {
			ConfigSection::Settings => self.parse_settings(raw)?.to_values(),
			ConfigSection::Configuration => self.parse_configuration(raw)?.to_values(),
		};

		normalized.map_err(|e| e.within(section))
	}
}
