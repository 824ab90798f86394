//! Registry domain model: identifiers, resource kinds, declarations, and paging.

pub mod declaration;
pub mod id;
pub mod page;
pub mod resource;

pub use declaration::*;
pub use id::*;
pub use page::*;
pub use resource::*;
