//! typed operations
//!
//! pair a query document with its variable and response types.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// graphql operation with known variable and response shapes
///
/// ```
/// use graphql_fetch::Operation;
/// use serde::{Deserialize, Serialize};
///
/// struct UserName;
///
/// #[derive(Serialize)]
/// struct Vars {
///     id: String,
/// }
///
/// #[derive(Deserialize)]
/// struct Data {
///     user: Option<User>,
/// }
///
/// #[derive(Deserialize)]
/// struct User {
///     name: String,
/// }
///
/// impl Operation for UserName {
///     const QUERY: &'static str = "query($id: ID!) { user(id: $id) { name } }";
///     type Variables = Vars;
///     type Response = Data;
/// }
/// ```
pub trait Operation {
    /// query or mutation document
    const QUERY: &'static str;
    /// variables; must serialize to a json object
    type Variables: Serialize;
    /// shape of `data`
    type Response: DeserializeOwned;
}
