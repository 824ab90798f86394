//! Resource kinds a provider service manages.

// self
use crate::_prelude::*;

/// Kind of resource a provider declaration describes.
///
/// Each [`ConfigurableProviderService`](crate::service::ConfigurableProviderService) handles
/// exactly one resource type, and `(type, provider id)` is unique across the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
	/// Authenticates users (internal, OIDC, SAML, WebAuthn, ...).
	IdentityProvider,
	/// Exposes account management for users of an identity provider.
	AccountService,
	/// Manages user credentials (passwords, keys).
	CredentialsService,
	/// Resolves additional user attributes.
	AttributeProvider,
	/// Renders realm-customized templates.
	TemplateProvider,
	/// Publishes API resources (userinfo, groups, ...).
	ApiResource,
	/// Publishes scopes for API resources.
	ScopeProvider,
}
impl ResourceType {
	/// Returns a stable label suitable for persistence, span fields, and messages.
	pub const fn as_str(self) -> &'static str {
		match self {
			ResourceType::IdentityProvider => "identity_provider",
			ResourceType::AccountService => "account_service",
			ResourceType::CredentialsService => "credentials_service",
			ResourceType::AttributeProvider => "attribute_provider",
			ResourceType::TemplateProvider => "template_provider",
			ResourceType::ApiResource => "api_resource",
			ResourceType::ScopeProvider => "scope_provider",
		}
	}
}
impl Display for ResourceType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
