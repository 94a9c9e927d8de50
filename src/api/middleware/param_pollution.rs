//! HTTP parameter pollution guard.
//!
//! When a query key appears more than once, only its **last** value is kept.
//! The surviving pair stays at the position where the key first appeared.
//!
//! JSON bodies need no rewriting: `serde_json` already keeps the last value
//! of a duplicated object key, which is the same policy.

use axum::{extract::Request, middleware::Next, response::Response};
use std::collections::HashMap;
use url::form_urlencoded;

use crate::api::middleware::replace_query;

/// Collapses repeated query keys to their last value.
///
/// Returns `None` when no key repeats.
pub fn collapse_duplicate_params(query: &str) -> Option<String> {
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut polluted = false;

    for (key, value) in form_urlencoded::parse(query.as_bytes()).into_owned() {
        match positions.get(&key) {
            Some(&index) => {
                pairs[index].1 = value;
                polluted = true;
            }
            None => {
                positions.insert(key.clone(), pairs.len());
                pairs.push((key, value));
            }
        }
    }

    if !polluted {
        return None;
    }

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    serializer.extend_pairs(&pairs);
    Some(serializer.finish())
}

pub async fn layer(mut req: Request, next: Next) -> Response {
    if let Some(collapsed) = req.uri().query().and_then(collapse_duplicate_params) {
        tracing::debug!(path = %req.uri().path(), "collapsed duplicate query parameters");
        if let Err(e) = replace_query(&mut req, &collapsed) {
            tracing::warn!(error = %e, "failed to rewrite query string");
        }
    }

    next.run(req).await
}
