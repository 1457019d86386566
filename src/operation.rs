//! generated operation helper
//!
//! operation trait implemented by generated types.

use serde::de::DeserializeOwned;

/// graphql operation contract for generated types
pub trait Operation {
    /// operation name as declared in the source document
    const NAME: &'static str;
    /// executable document text: the operation plus any fragments it spreads
    const QUERY: &'static str;
    /// response payload type
    type Response: DeserializeOwned;
}
